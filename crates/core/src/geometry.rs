//! Axis-aligned bounding box primitives.
//!
//! All boxes compared in one operation share a single coordinate system
//! (pixel or page-point space); y may increase downward as long as it is
//! consistent per document.

/// A rectangle defined by (x0, y0, x1, y1) with x1 >= x0 and y1 >= y0.
pub type Rect = (f64, f64, f64, f64);

/// Area of a box. Degenerate boxes report 0.
pub fn area(r: Rect) -> f64 {
    (r.2 - r.0).max(0.0) * (r.3 - r.1).max(0.0)
}

/// Area of the intersection of two boxes, 0 if they do not overlap.
pub fn intersection_area(a: Rect, b: Rect) -> f64 {
    let w = (a.2.min(b.2) - a.0.max(b.0)).max(0.0);
    let h = (a.3.min(b.3) - a.1.max(b.1)).max(0.0);
    w * h
}

/// Fraction of `inner`'s own area covered by `outer`.
///
/// This is a directional containment ratio, not IoU: a large region
/// fully claims a small token even though the reverse ratio is tiny.
/// Returns 0.0 when `inner` has zero area.
pub fn overlap_ratio(inner: Rect, outer: Rect) -> f64 {
    let inner_area = area(inner);
    if inner_area <= 0.0 {
        return 0.0;
    }
    intersection_area(inner, outer) / inner_area
}

/// Component-wise min/max union of a set of boxes.
///
/// Returns None for an empty input. Callers must treat None as the
/// empty sentinel rather than substituting a real zero-area box.
pub fn union<I>(boxes: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    let mut iter = boxes.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, b| {
        (
            acc.0.min(b.0),
            acc.1.min(b.1),
            acc.2.max(b.2),
            acc.3.max(b.3),
        )
    }))
}

// Rect key for hashing (bit-exact, used for dedup sets)
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub(crate) struct RectKey(pub u64, pub u64, pub u64, pub u64);

pub(crate) fn rect_key(r: &Rect) -> RectKey {
    RectKey(r.0.to_bits(), r.1.to_bits(), r.2.to_bits(), r.3.to_bits())
}
