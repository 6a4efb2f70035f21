use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use tessella_core::layout::{Region, RegionLabel, Token, cluster_rows, match_regions};
use tessella_core::layout::table::discover_tables;
use tessella_core::params::StructureParams;

struct XorShift64(u64);

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn gen_f64(&mut self, lo: f64, hi: f64) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        lo + (self.0 >> 11) as f64 / (1u64 << 53) as f64 * (hi - lo)
    }
}

/// Deterministic page of tabular tokens: `rows` rows of 4 jittered cells
/// plus a prose paragraph every 10 rows.
fn generate_tokens(seed: u64, rows: usize) -> Vec<Token> {
    let mut rng = XorShift64::new(seed);
    let mut tokens = Vec::with_capacity(rows * 4 + rows / 10);
    for r in 0..rows {
        let y0 = 40.0 + r as f64 * 18.0 + rng.gen_f64(0.0, 1.5);
        for c in 0..4 {
            let x0 = 36.0 + c as f64 * 130.0 + rng.gen_f64(0.0, 3.0);
            tokens.push(Token::new(
                format!("cell_{r}_{c}"),
                (x0, y0, x0 + 60.0, y0 + 10.0),
                0.95,
            ));
        }
        if r % 10 == 9 {
            // Interleaved prose keeps discovery splitting runs instead
            // of growing one giant table.
            let y = y0 + 9.0;
            tokens.push(Token::new(
                "interleaved paragraph text",
                (36.0, y, 540.0, y + 10.0),
                0.95,
            ));
        }
    }
    tokens
}

fn page_regions(rows: usize) -> Vec<Region> {
    let height = 40.0 + rows as f64 * 18.0 + 20.0;
    vec![
        Region {
            bbox: (0.0, 0.0, 600.0, height / 2.0),
            label: RegionLabel::Table,
            score: 0.9,
        },
        Region {
            bbox: (0.0, height / 2.0, 600.0, height),
            label: RegionLabel::Text,
            score: 0.9,
        },
    ]
}

fn bench_cluster_rows(c: &mut Criterion) {
    let params = StructureParams::default();
    let mut group = c.benchmark_group("cluster_rows");
    for &n in &[100usize, 400] {
        let tokens = generate_tokens(0x5EED ^ n as u64, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &tokens, |b, tokens| {
            b.iter(|| black_box(cluster_rows(tokens, params.row_cluster_eps).len()))
        });
    }
    group.finish();
}

fn bench_match_regions(c: &mut Criterion) {
    let params = StructureParams::default();
    let mut group = c.benchmark_group("match_regions");
    for &n in &[100usize, 400] {
        let tokens = generate_tokens(0x5EED ^ n as u64, n);
        let regions = page_regions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &tokens, |b, tokens| {
            b.iter(|| {
                let layout = match_regions(tokens, &regions, &params);
                black_box(layout.tables.len() + layout.unmatched.len());
            })
        });
    }
    group.finish();
}

fn bench_discover_tables(c: &mut Criterion) {
    let params = StructureParams::default();
    let mut group = c.benchmark_group("discover_tables");
    for &n in &[100usize, 400] {
        let tokens = generate_tokens(0x5EED ^ n as u64, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &tokens, |b, tokens| {
            b.iter(|| black_box(discover_tables(tokens, &params).len()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_cluster_rows,
    bench_match_regions,
    bench_discover_tables
);
criterion_main!(benches);
