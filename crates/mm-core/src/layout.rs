//! Whole-diagram auto-layout.

use crate::error::{Error, Result};
use crate::model::{Diagram, Position};
use std::f64::consts::TAU;

/// Default radius of [`arrange_in_circle`].
pub const DEFAULT_LAYOUT_RADIUS: f64 = 300.0;

/// Spread every node evenly on one circle around `center`, in list order,
/// starting at angle 0. Edges are untouched.
///
/// Fails with `Validation` when `center` or `radius` is not finite; the
/// diagram is left as it was.
pub fn arrange_in_circle(diagram: &mut Diagram, center: Position, radius: f64) -> Result<()> {
    if !radius.is_finite() {
        return Err(Error::Validation(format!("layout radius {radius} is not finite")));
    }
    if !center.is_finite() {
        return Err(Error::Validation(format!(
            "layout center ({}, {}) is not finite",
            center.x, center.y
        )));
    }
    let count = diagram.nodes.len();
    if count == 0 {
        return Ok(());
    }
    let step = TAU / count as f64;
    for (i, node) in diagram.nodes.iter_mut().enumerate() {
        let angle = i as f64 * step;
        node.position = Position::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        );
    }
    log::debug!("arranged {count} node(s) on a circle of radius {radius}");
    Ok(())
}
