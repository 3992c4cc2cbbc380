//! Scrawl is a retained-mode 2D scene graph over an immediate-mode paint surface.
//!
//! Callers declare entities with symbolic positions and paint styles, organize them into
//! groups drawn into layered cells, and replay the scene each frame:
//!
//! - Build a [`Scene`] and create a [`Pad`] (a display cell plus a base cell)
//! - Add [`Entity`] values (blocks, wheels, shapes) to the pad's groups
//! - Call [`Scene::render_pad`] to clear, compile and show the pad's cells
//!
//! Coordinates resolve lazily against their reference frames and stay cached until an input
//! changes. Every stamp diffs the entity's intended paint state against the cell's mirrored
//! engine state and writes only what differs.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod attr;
mod design;
mod foundation;
mod paint;
mod position;

/// Per-frame animation callbacks and schedulers.
pub mod animation;
/// Capability loading with dependency expansion and a time budget.
pub mod loader;
pub(crate) mod scene;

pub use crate::attr::{AttrMap, Attributes, Ripple, Ripples, Value};
pub use crate::foundation::config::SceneConfig;
pub use crate::foundation::core::{
    Affine, BezPath, CachedVector, Coord, ImageData, Keyword, Length, Point, Rect, Vec2,
    number_convert,
};
pub use crate::foundation::error::{ScrawlError, ScrawlResult};
pub use crate::foundation::pool::{Pool, PoolOpts, PoolStats, Poolable, Pools};

pub use crate::design::{ColorStop, Design, DesignFrame, DesignKind, LockTo};
pub use crate::paint::changes::{
    ChangeSet, DesignLookup, DrawableInfo, PaintChange, PaintKey, StyleResolver,
};
pub use crate::paint::color::{Color, parse_css_color};
pub use crate::paint::cpu::CpuEngine;
pub use crate::paint::engine::{
    EngineState, Gradient, GradientShape, GradientSpace, GradientStop, Paint, PaintEngine,
    StateWrite, SurfaceImage,
};
pub use crate::paint::scratch::{CpuRasterizer, ScratchOpts, ScratchStats};
pub use crate::paint::state::{CompositeOp, LineCap, LineJoin, PaintState, TextAlign, TextBaseline};
pub use crate::position::Position;
pub use crate::position::pivot::PivotKind;
pub use crate::position::reference::{DimensionInputs, DimensionRule, ReferenceDims};

pub use crate::animation::{Animation, Animator, FrameScheduler, ManualScheduler, StopHandle};
pub use crate::loader::{CapabilityFetcher, Loader};
pub use crate::scene::capability::{Drawable, Nameable, PaintStateOwning, Positionable};
pub use crate::scene::cell::{CLEAR_STYLE, Cell, ReferenceRole, Region};
pub use crate::scene::entity::{Block, DrawMethod, Entity, EntityKind, Shape, Wheel};
pub use crate::scene::group::Group;
pub use crate::scene::names::{NAME_SEPARATOR, Namespace};
pub use crate::scene::pad::Pad;
pub use crate::scene::{EngineFactory, NamedPoint, Scene, TrackerOwner};
