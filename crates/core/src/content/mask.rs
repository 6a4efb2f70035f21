//! Span masking and demasking.
//!
//! Entity and pattern spans are hidden behind stable `[LABEL_n]`
//! placeholders before the external correction pass so the corrector
//! never touches them, then restored afterwards. The mask map is scoped
//! to one document; placeholders are never reused for different spans.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::layout::types::Token;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[A-Z]+_\d+\]").expect("valid regex"));

/// A substring occurrence to hide, produced by NER/pattern collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Placeholder -> original substring, in mint order.
pub type MaskMap = IndexMap<String, String>;

/// Decides the order in which candidate spans are applied.
///
/// Replacement is substring-based and order-dependent: a short candidate
/// that is a substring of a longer, later candidate corrupts the longer
/// match. The as-provided order preserves that behavior; a policy like
/// [`LongestFirst`] can be swapped in without touching callers.
pub trait MaskPolicy {
    fn order(&self, spans: Vec<EntitySpan>) -> Vec<EntitySpan>;
}

/// Applies spans exactly in the order the collaborators provided them.
pub struct AsProvided;

impl MaskPolicy for AsProvided {
    fn order(&self, spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
        spans
    }
}

/// Applies longer spans first so substring candidates cannot corrupt
/// longer matches. Stable for equal lengths.
pub struct LongestFirst;

impl MaskPolicy for LongestFirst {
    fn order(&self, mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
        spans.sort_by(|a, b| b.text.len().cmp(&a.text.len()));
        spans
    }
}

/// Masks every span occurrence across the token list in place.
///
/// For each token and each candidate span in order: every occurrence of
/// the span text inside the token's current text is replaced by a fresh
/// `[LABEL_n]` placeholder (n is a 1-based per-label counter), and the
/// placeholder is recorded in the returned mask map. The same span text
/// appearing in two tokens mints two placeholders. This is the one
/// sanctioned in-place `Token.text` rewrite; the pre-mask text is kept
/// as provenance.
pub fn mask_tokens(tokens: &mut [Token], spans: &[EntitySpan]) -> MaskMap {
    mask_tokens_with(tokens, spans.to_vec(), &AsProvided)
}

/// [`mask_tokens`] under an explicit ordering policy.
pub fn mask_tokens_with(
    tokens: &mut [Token],
    spans: Vec<EntitySpan>,
    policy: &dyn MaskPolicy,
) -> MaskMap {
    let spans = policy.order(spans);
    let mut counters: IndexMap<String, usize> = IndexMap::new();
    let mut mask_map = MaskMap::new();

    for token in tokens.iter_mut() {
        let mut text = token.text.clone();
        for span in &spans {
            if span.text.is_empty() {
                warn!(label = %span.label, "empty span text, skipping");
                continue;
            }
            if text.contains(&span.text) {
                let label = span.label.to_uppercase();
                let counter = counters.entry(label.clone()).or_insert(0);
                *counter += 1;
                let placeholder = format!("[{label}_{counter}]");
                text = text.replace(&span.text, &placeholder);
                mask_map.insert(placeholder, span.text.clone());
            }
        }
        token.rewrite_text(text);
    }
    mask_map
}

/// Restores placeholders in a text to their original spans. Unknown
/// placeholders are left verbatim.
pub fn demask_text(text: &str, mask_map: &MaskMap) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            mask_map
                .get(token)
                .cloned()
                .unwrap_or_else(|| token.to_string())
        })
        .into_owned()
}

/// Restores placeholders across a corrected token list in place.
pub fn demask_tokens(tokens: &mut [Token], mask_map: &MaskMap) {
    for token in tokens.iter_mut() {
        let restored = demask_text(&token.text, mask_map);
        if restored != token.text {
            token.text = restored;
        }
    }
}
