//! Top-to-bottom, left-to-right ordering of export photos.
//!
//! Photos are ordered by the layout position of their door. Doors whose
//! `y` values lie within `epsilon` of each other form one visual row and
//! are ordered by `x` inside it.
//!
//! Rows are built by grouping instead of comparing with a tolerance
//! directly: "within epsilon" is not transitive, and a sort comparator
//! that is not a total order yields an unspecified permutation. A row is
//! anchored at its smallest `y` and takes every following door whose `y`
//! is at most `epsilon` above that anchor.

use crate::models::{AircraftLayout, PhotoHeader};

/// Order `items` by the `(x, y)` position `position` returns for each.
///
/// Items tied on row and `x` keep their input order, even when their `y`
/// values differ inside the row. Items without a position go last, in
/// input order.
pub fn order_by_position<T, F>(items: Vec<T>, epsilon: f64, position: F) -> Vec<T>
where
    F: Fn(&T) -> Option<(f64, f64)>,
{
    let epsilon = if epsilon.is_finite() { epsilon.max(0.0) } else { 0.0 };

    let mut placed = Vec::with_capacity(items.len());
    let mut unplaced = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match position(&item) {
            Some((x, y)) => placed.push(Placed { row: 0, index, x, y, item }),
            None => unplaced.push(item),
        }
    }

    placed.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut row = 0usize;
    let mut anchor = f64::NEG_INFINITY;
    for (i, p) in placed.iter_mut().enumerate() {
        if i == 0 {
            anchor = p.y;
        } else if p.y - anchor > epsilon {
            row += 1;
            anchor = p.y;
        }
        p.row = row;
    }

    placed.sort_by(|a, b| {
        a.row
            .cmp(&b.row)
            .then_with(|| a.x.total_cmp(&b.x))
            .then_with(|| a.index.cmp(&b.index))
    });

    placed
        .into_iter()
        .map(|p| p.item)
        .chain(unplaced)
        .collect()
}

/// Order photo headers by the door positions of `layout`.
///
/// With no layout every photo keeps its input order.
pub fn order_headers(
    headers: Vec<PhotoHeader>,
    layout: Option<&AircraftLayout>,
    epsilon: f64,
) -> Vec<PhotoHeader> {
    let Some(layout) = layout else {
        return headers;
    };

    order_by_position(headers, epsilon, |header| {
        layout.door(&header.door_id).map(|door| (door.x, door.y))
    })
}

struct Placed<T> {
    row: usize,
    /// Position in the input
    index: usize,
    x: f64,
    y: f64,
    item: T,
}
