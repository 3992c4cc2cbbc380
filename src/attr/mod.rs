//! String-keyed attribute access layered over typed fields.
//!
//! Every scene object stores its state in ordinary struct fields. [`Attributes`] is the narrow
//! bridge for callers that work with attribute maps: unknown keys are ignored, deltas add, and
//! snapshots feed the clone protocol.

use crate::foundation::core::{Coord, Length, parse_float_prefix};
use smallvec::SmallVec;

pub use serde_json::Value;

/// Attribute map accepted by `set`, `set_delta` and `clone`.
pub type AttrMap = serde_json::Map<String, Value>;

/// Cross-object consequence of an attribute write, applied by the owning scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ripple {
    /// `start` inputs changed.
    Start,
    /// `handle`, `scale`, `width` or `height` changed.
    Handle,
    /// `pivot` was reassigned.
    Pivot,
    /// Draw `order` changed; the owning collection must resort.
    Order,
    /// Primary group reassigned.
    Group,
    /// Target cell reassigned.
    Cell,
    /// Surface compile order changed.
    CompileOrder,
    /// Surface show order changed.
    ShowOrder,
    /// Surface physical dimensions changed.
    Dimensions,
    /// Copy region inputs changed.
    Copy,
    /// Paste region inputs changed.
    Paste,
    /// Group membership list changed.
    Members,
    /// Geometry that depends on the target cell changed.
    Geometry,
}

/// Ripples produced by one `set` call.
pub type Ripples = SmallVec<[Ripple; 4]>;

/// Attribute access by key.
pub trait Attributes {
    /// Current value of `key` (own value or default), `None` for undeclared keys.
    fn get(&self, key: &str) -> Option<Value>;

    /// Assign every declared key in `items`; undeclared keys are ignored.
    fn set(&mut self, items: &AttrMap) -> Ripples;

    /// Additive assignment: numbers add, lengths add with percentage rules.
    fn set_delta(&mut self, items: &AttrMap) -> Ripples;

    /// Full attribute snapshot, suitable for cloning.
    fn snapshot(&self) -> AttrMap;
}

pub(crate) fn push_ripple(ripples: &mut Ripples, r: Ripple) {
    if !ripples.contains(&r) {
        ripples.push(r);
    }
}

/// Numeric read: numbers, or strings with a leading number.
pub(crate) fn num(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

pub(crate) fn boolean(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

pub(crate) fn text(v: &Value) -> Option<&str> {
    v.as_str()
}

pub(crate) fn length(v: &Value) -> Option<Length> {
    Length::from_value(v)
}

/// Read an `{x, y}` object; either component may be absent.
pub(crate) fn coord_parts(v: &Value) -> Option<(Option<Length>, Option<Length>)> {
    let obj = v.as_object()?;
    Some((
        obj.get("x").and_then(length),
        obj.get("y").and_then(length),
    ))
}

/// Replace the missing parts of `into` from an `{x, y}` value.
pub(crate) fn assign_coord(into: &mut Coord, v: &Value) -> bool {
    match coord_parts(v) {
        Some((x, y)) => {
            if let Some(x) = x {
                into.x = x;
            }
            if let Some(y) = y {
                into.y = y;
            }
            true
        }
        None => false,
    }
}

/// Add an `{x, y}` delta onto `into`.
pub(crate) fn delta_coord(into: &mut Coord, v: &Value) -> bool {
    match coord_parts(v) {
        Some((x, y)) => {
            if let Some(x) = x {
                into.x = into.x.add_delta(x);
            }
            if let Some(y) = y {
                into.y = into.y.add_delta(y);
            }
            true
        }
        None => false,
    }
}

pub(crate) fn delta_num(current: f64, v: &Value) -> Option<f64> {
    num(v).map(|d| current + d)
}

pub(crate) fn delta_length(current: Length, v: &Value) -> Option<Length> {
    length(v).map(|d| current.add_delta(d))
}

/// Fold a flat `{flatX, flatY}` pair into a nested `{nested: {x, y}}` entry.
///
/// Existing nested components are kept unless the flat key supplies a replacement.
pub(crate) fn fold_pair(map: &mut AttrMap, flat_x: &str, flat_y: &str, nested: &str) {
    let fx = map.remove(flat_x);
    let fy = map.remove(flat_y);
    if fx.is_none() && fy.is_none() {
        return;
    }
    let mut obj = map
        .get(nested)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(x) = fx {
        obj.insert("x".to_owned(), x);
    }
    if let Some(y) = fy {
        obj.insert("y".to_owned(), y);
    }
    map.insert(nested.to_owned(), Value::Object(obj));
}

/// Build the attribute map for a clone: snapshot, amendments on both sides, exclusions,
/// then overrides on top.
///
/// Nested `{x, y}` overrides merge component-wise into the snapshot's nested value.
pub(crate) fn clone_attributes(
    snapshot: AttrMap,
    overrides: &AttrMap,
    excluded: &[&str],
    amend: impl Fn(&mut AttrMap),
) -> AttrMap {
    let mut out = snapshot;
    amend(&mut out);
    for key in excluded {
        out.remove(*key);
    }
    let mut over = overrides.clone();
    amend(&mut over);
    for (k, v) in over {
        match (out.get_mut(&k), &v) {
            (Some(Value::Object(existing)), Value::Object(patch)) => {
                for (pk, pv) in patch {
                    existing.insert(pk.clone(), pv.clone());
                }
            }
            _ => {
                out.insert(k, v);
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/attr/attr.rs"]
mod tests;
