//! Capability traits shared by scene objects.
//!
//! Each object composes the pieces it needs ([`Position`], [`PaintState`]) as fields and
//! exposes them through these traits, so the resolution and diffing code stays generic.

use crate::foundation::core::{BezPath, Point};
use crate::paint::changes::DrawableInfo;
use crate::paint::state::PaintState;
use crate::position::Position;
use crate::position::reference::{DimensionInputs, DimensionRule, ReferenceDims, reference_dimensions};

/// Registered under a unique name.
pub trait Nameable {
    /// Registry name.
    fn name(&self) -> &str;
}

/// Carries position state and a reference-dimension rule.
pub trait Positionable: Nameable {
    /// Position state.
    fn position(&self) -> &Position;

    /// Mutable position state.
    fn position_mut(&mut self) -> &mut Position;

    /// Which rule extracts this object's reference frame.
    fn dimension_rule(&self) -> DimensionRule;

    /// Raw measurements fed to the rule.
    fn dimension_inputs(&self) -> DimensionInputs;

    /// Reference frame for handle resolution.
    fn reference_dims(&self) -> ReferenceDims {
        reference_dimensions(self.dimension_rule(), &self.dimension_inputs())
    }

    /// Refresh the handle cache if stale. Returns `true` when it was recomputed.
    fn refresh_handle(&mut self) -> bool {
        if self.position().current_handle().is_fresh() {
            return false;
        }
        let dims = self.reference_dims();
        self.position_mut().update_current_handle(dims);
        tracing::debug!(name = self.name(), "handle recomputed");
        true
    }

    /// Refresh the start cache against `reference` if stale. Returns `true` when attempted.
    fn refresh_start(&mut self, reference: Option<ReferenceDims>) -> bool {
        if self.position().current_start().is_fresh() {
            return false;
        }
        self.position_mut().update_current_start(reference);
        true
    }
}

/// Owns a paint-state tracker.
pub trait PaintStateOwning {
    /// The tracker.
    fn paint_state(&self) -> &PaintState;

    /// Mutable tracker.
    fn paint_state_mut(&mut self) -> &mut PaintState;
}

/// Something that stamps geometry onto a surface.
pub trait Drawable: Positionable + PaintStateOwning {
    /// Fields the paint-state diff needs.
    fn drawable_info(&self) -> DrawableInfo;

    /// Outline in local (stamp-transform) coordinates.
    fn outline(&self) -> BezPath;

    /// Whether `point`, in surface coordinates, falls inside the outline.
    fn check_hit(&self, point: Point) -> bool;
}
