//! The scene registry: pads, cells, groups, entities, designs and named points, plus the
//! render cycle and pointer interaction that run across them.

pub(crate) mod capability;
pub(crate) mod cell;
pub(crate) mod entity;
pub(crate) mod group;
mod interact;
pub(crate) mod names;
pub(crate) mod pad;
mod render;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::attr::{
    AttrMap, Attributes, Ripple, Ripples, Value, clone_attributes, fold_pair, num, text,
};
use crate::design::{Design, DesignKind};
use crate::foundation::config::SceneConfig;
use crate::foundation::core::{Length, Vec2};
use crate::foundation::error::{ScrawlError, ScrawlResult};
use crate::foundation::pool::Pools;
use crate::paint::cpu::CpuEngine;
use crate::paint::engine::PaintEngine;
use crate::paint::scratch::CpuRasterizer;
use crate::paint::state::PaintState;
use cell::{Cell, ReferenceRole};
use entity::{Block, DrawMethod, Entity, EntityKind, Shape, Wheel};
use group::Group;
use names::{NameRegistry, Namespace};
use pad::Pad;

/// Builds the paint engine behind a new cell.
pub type EngineFactory = Box<dyn Fn(u32, u32) -> ScrawlResult<Box<dyn PaintEngine>>>;

/// A named local point on an entity, usable as a pivot.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedPoint {
    pub(crate) name: String,
    pub(crate) entity: String,
    pub(crate) local: Vec2,
}

impl NamedPoint {
    /// Registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning entity.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Position in the owner's path coordinates.
    pub fn local(&self) -> Vec2 {
        self.local
    }
}

/// Owner of a registered paint-state tracker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackerOwner {
    /// A cell's engine mirror.
    Cell(String),
    /// An entity's intended state.
    Entity(String),
}

/// One independent scene: every registry plus the pools and engine factory they share.
pub struct Scene {
    config: SceneConfig,
    pools: Pools,
    names: NameRegistry,
    engine_factory: EngineFactory,
    pads: HashMap<String, Pad>,
    pad_order: Vec<String>,
    cells: HashMap<String, Cell>,
    groups: HashMap<String, Group>,
    entities: HashMap<String, Entity>,
    designs: HashMap<String, Design>,
    points: HashMap<String, NamedPoint>,
    trackers: HashMap<String, TrackerOwner>,
    current_pad: Option<String>,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("pads", &self.pad_order)
            .field("cells", &self.cells.len())
            .field("groups", &self.groups.len())
            .field("entities", &self.entities.len())
            .field("designs", &self.designs.len())
            .finish_non_exhaustive()
    }
}

fn without(attrs: &AttrMap, keys: &[&str]) -> AttrMap {
    attrs
        .iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn requested_name(attrs: &AttrMap) -> Option<&str> {
    attrs.get("name").and_then(text)
}

fn length_attr(attrs: &AttrMap, keys: &[&str]) -> Option<Length> {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .find_map(Length::from_value)
}

fn unknown(kind: &str, name: &str) -> ScrawlError {
    ScrawlError::registry(format!("unknown {kind} `{name}`"))
}

impl Scene {
    /// Scene drawing into CPU engines that share one rasterizer.
    pub fn new(config: SceneConfig) -> ScrawlResult<Self> {
        let raster = Rc::new(RefCell::new(CpuRasterizer::default()));
        let factory: EngineFactory = Box::new(move |w, h| {
            let engine: Box<dyn PaintEngine> =
                Box::new(CpuEngine::with_rasterizer(w, h, Rc::clone(&raster))?);
            Ok(engine)
        });
        Self::with_engine_factory(config, factory)
    }

    /// Scene drawing into engines built by `factory`.
    pub fn with_engine_factory(config: SceneConfig, factory: EngineFactory) -> ScrawlResult<Self> {
        config.validate()?;
        Ok(Self {
            pools: Pools::new(config.pool),
            names: NameRegistry::new(config.name_seed),
            config,
            engine_factory: factory,
            pads: HashMap::new(),
            pad_order: Vec::new(),
            cells: HashMap::new(),
            groups: HashMap::new(),
            entities: HashMap::new(),
            designs: HashMap::new(),
            points: HashMap::new(),
            trackers: HashMap::new(),
            current_pad: None,
        })
    }

    /// Tunables in effect.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Transient pools, for inspecting their counters.
    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    /// Reserve a unique name in `ns`, sanitized and tagged on collision.
    pub fn make_name(&mut self, ns: Namespace, requested: Option<&str>, fallback: &str) -> String {
        self.names.claim(ns, requested, fallback)
    }

    /// Whether `name` is registered in `ns`.
    pub fn is_registered(&self, ns: Namespace, name: &str) -> bool {
        self.names.contains(ns, name)
    }

    // ----- lookups -----

    /// Pad by name.
    pub fn pad(&self, name: &str) -> Option<&Pad> {
        self.pads.get(name)
    }

    /// Pad names in creation order.
    pub fn pad_names(&self) -> &[String] {
        &self.pad_order
    }

    /// Pad that new groups and entities default into.
    pub fn current_pad(&self) -> Option<&str> {
        self.current_pad.as_deref()
    }

    /// Make `name` the current pad.
    pub fn set_current_pad(&mut self, name: &str) -> ScrawlResult<()> {
        if !self.pads.contains_key(name) {
            return Err(unknown("pad", name));
        }
        self.current_pad = Some(name.to_owned());
        Ok(())
    }

    /// Cell by name.
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }

    /// Group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Design by name.
    pub fn design(&self, name: &str) -> Option<&Design> {
        self.designs.get(name)
    }

    /// Named point by name.
    pub fn point(&self, name: &str) -> Option<&NamedPoint> {
        self.points.get(name)
    }

    /// Tracker by its registered name.
    pub fn tracker(&self, name: &str) -> Option<&PaintState> {
        match self.trackers.get(name)? {
            TrackerOwner::Cell(c) => self.cells.get(c).map(|c| &c.tracker),
            TrackerOwner::Entity(e) => self.entities.get(e).map(|e| &e.tracker),
        }
    }

    /// Owner of a registered tracker.
    pub fn tracker_owner(&self, name: &str) -> Option<&TrackerOwner> {
        self.trackers.get(name)
    }

    /// Names of every live entity, unordered.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Names of every live group, unordered.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Names of every live cell, unordered.
    pub fn cell_names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    // ----- pads -----

    /// Create a pad with its display and base cells.
    ///
    /// The display takes the pad's size and is neither compiled nor shown; the base covers
    /// 100% of the pad, compiles last and is the pad's current cell.
    pub fn make_pad(&mut self, attrs: &AttrMap) -> ScrawlResult<String> {
        let width = attrs
            .get("width")
            .and_then(num)
            .unwrap_or(self.config.default_pad_width);
        let height = attrs
            .get("height")
            .and_then(num)
            .unwrap_or(self.config.default_pad_height);
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(ScrawlError::validation(format!(
                "pad dimensions must be finite and > 0 (got {width}x{height})"
            )));
        }
        let name = self
            .names
            .claim(Namespace::Pad, requested_name(attrs), "Pad");
        let mut pad = Pad::new(name.clone(), width, height);
        pad.set(&without(attrs, &["name", "width", "height"]));

        let display = self.create_cell(
            Some(&name),
            Length::Pixels(width),
            Length::Pixels(height),
            None,
        )?;
        let base = self.create_cell(
            Some(&format!("{name}_base")),
            Length::Percent(100.0),
            Length::Percent(100.0),
            Some(pad.frame()),
        )?;
        if let Some(c) = self.cells.get_mut(&display) {
            c.compiled = false;
            c.shown = false;
        }
        if let Some(c) = self.cells.get_mut(&base) {
            c.compile_order = self.config.base_compile_order;
            c.shown = false;
        }
        pad.display = display.clone();
        pad.base = base.clone();
        pad.current = base.clone();
        pad.add_cell(&display);
        pad.add_cell(&base);

        self.pads.insert(name.clone(), pad);
        self.pad_order.push(name.clone());
        self.refresh_roles(&name);
        self.current_pad = Some(name.clone());
        tracing::debug!(pad = %name, width, height, "pad created");
        Ok(name)
    }

    /// Apply `attrs` to a pad.
    pub fn set_pad(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_pad(name, attrs, false)
    }

    /// Apply `attrs` additively to a pad.
    pub fn set_pad_delta(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_pad(name, attrs, true)
    }

    fn update_pad(&mut self, name: &str, attrs: &AttrMap, delta: bool) -> ScrawlResult<()> {
        let pad = self.pads.get_mut(name).ok_or_else(|| unknown("pad", name))?;
        let ripples = if delta {
            pad.set_delta(attrs)
        } else {
            pad.set(attrs)
        };
        if ripples.contains(&Ripple::Dimensions) {
            self.resize_pad_cells(name);
        }
        Ok(())
    }

    fn resize_pad_cells(&mut self, name: &str) {
        let Some(pad) = self.pads.get(name) else {
            return;
        };
        let frame = pad.frame();
        let (w, h) = (pad.width, pad.height);
        for c in &pad.cells {
            let Some(cell) = self.cells.get_mut(c) else {
                continue;
            };
            if *c == pad.display {
                cell.declared_width = Length::Pixels(w);
                cell.declared_height = Length::Pixels(h);
                cell.copy_width = cell.declared_width;
                cell.copy_height = cell.declared_height;
                cell.paste_width = cell.declared_width;
                cell.paste_height = cell.declared_height;
            }
            cell.resolve_actual(Some(frame));
            cell.position.invalidate_start();
            cell.paste_data = None;
        }
    }

    /// Delete a pad and every cell it created.
    pub fn delete_pad(&mut self, name: &str) -> ScrawlResult<()> {
        let pad = self.pads.remove(name).ok_or_else(|| unknown("pad", name))?;
        self.pad_order.retain(|p| p != name);
        for c in &pad.cells {
            let owned = self
                .cells
                .get(c)
                .is_some_and(|cell| cell.role.pad() == Some(name));
            if owned {
                self.delete_cell(c)?;
            } else if let Some(cell) = self.cells.get_mut(c) {
                cell.role = ReferenceRole::Standalone;
            }
        }
        self.names.release(Namespace::Pad, name);
        self.clear_pivots_to(name);
        if self.current_pad.as_deref() == Some(name) {
            self.current_pad = self.pad_order.last().cloned();
        }
        Ok(())
    }

    /// Record the pointer position for `index` on a pad.
    pub fn set_pointer(&mut self, pad: &str, index: &str, at: Vec2) -> ScrawlResult<()> {
        self.pads
            .get_mut(pad)
            .ok_or_else(|| unknown("pad", pad))?
            .set_pointer(index, at);
        Ok(())
    }

    // ----- cells -----

    fn create_cell(
        &mut self,
        requested: Option<&str>,
        width: Length,
        height: Length,
        frame: Option<(f64, f64)>,
    ) -> ScrawlResult<String> {
        let px = |l: Length, reference: Option<f64>, fallback: f64| -> u32 {
            let v = match l {
                Length::Pixels(v) => v,
                rel => rel.resolve(reference.unwrap_or(fallback)),
            };
            if v.is_finite() {
                v.round().clamp(1.0, f64::from(u16::MAX)) as u32
            } else {
                1
            }
        };
        let w = px(width, frame.map(|f| f.0), self.config.default_pad_width);
        let h = px(height, frame.map(|f| f.1), self.config.default_pad_height);
        let engine = (self.engine_factory)(w, h)?;

        let name = self.names.claim(Namespace::Cell, requested, "Cell");
        let tracker = self.names.claim(Namespace::Tracker, Some(&name), "Context");
        let mut cell = Cell::new(name.clone(), tracker.clone(), width, height, engine);
        let group = self.names.claim(Namespace::Group, Some(&name), "Group");
        self.groups
            .insert(group.clone(), Group::new(group.clone(), name.clone()));
        cell.groups.push(group);
        self.trackers.insert(tracker, TrackerOwner::Cell(name.clone()));
        self.cells.insert(name.clone(), cell);
        Ok(name)
    }

    /// Create a standalone cell. Its size defaults to the configured pad size.
    pub fn make_cell(&mut self, attrs: &AttrMap) -> ScrawlResult<String> {
        let width = length_attr(attrs, &["actualWidth", "width"])
            .unwrap_or(Length::Pixels(self.config.default_pad_width));
        let height = length_attr(attrs, &["actualHeight", "height"])
            .unwrap_or(Length::Pixels(self.config.default_pad_height));
        let name = self.create_cell(requested_name(attrs), width, height, None)?;
        self.update_cell(&name, &without(attrs, &["name", "width", "height"]), false)?;
        Ok(name)
    }

    /// Create a cell inside `pad`, sized to the pad unless told otherwise.
    pub fn add_new_cell(&mut self, pad: &str, attrs: &AttrMap) -> ScrawlResult<String> {
        let p = self.pads.get(pad).ok_or_else(|| unknown("pad", pad))?;
        let frame = p.frame();
        let width = length_attr(attrs, &["width", "actualWidth"]).unwrap_or(Length::Pixels(p.width));
        let height =
            length_attr(attrs, &["height", "actualHeight"]).unwrap_or(Length::Pixels(p.height));
        let name = self.create_cell(requested_name(attrs), width, height, Some(frame))?;
        if let Some(p) = self.pads.get_mut(pad) {
            p.add_cell(&name);
        }
        self.refresh_roles(pad);
        self.update_cell(&name, &without(attrs, &["name", "width", "height"]), false)?;
        Ok(name)
    }

    /// Attach existing cells to `pad`.
    pub fn add_cells(&mut self, pad: &str, cells: &[&str]) -> ScrawlResult<()> {
        if !self.pads.contains_key(pad) {
            return Err(unknown("pad", pad));
        }
        if let Some(missing) = cells.iter().find(|c| !self.cells.contains_key(**c)) {
            return Err(unknown("cell", missing));
        }
        let frame = self.pads.get(pad).map(Pad::frame);
        for c in cells {
            if let Some(p) = self.pads.get_mut(pad) {
                p.add_cell(c);
            }
            if let Some(cell) = self.cells.get_mut(*c) {
                cell.resolve_actual(frame);
            }
        }
        self.refresh_roles(pad);
        Ok(())
    }

    /// Reassign every member's reference role from the pad's display and base.
    fn refresh_roles(&mut self, pad: &str) {
        let Some(p) = self.pads.get(pad) else {
            return;
        };
        for c in &p.cells {
            if let Some(cell) = self.cells.get_mut(c) {
                let role = p.role_of(c);
                if cell.role != role {
                    cell.role = role;
                    cell.position.invalidate_start();
                    cell.paste_data = None;
                }
            }
        }
    }

    /// Apply `attrs` to a cell.
    pub fn set_cell(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_cell(name, attrs, false)
    }

    /// Apply `attrs` additively to a cell.
    pub fn set_cell_delta(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_cell(name, attrs, true)
    }

    fn update_cell(&mut self, name: &str, attrs: &AttrMap, delta: bool) -> ScrawlResult<()> {
        let cell = self.cells.get_mut(name).ok_or_else(|| unknown("cell", name))?;
        let ripples = if delta {
            cell.set_delta(attrs)
        } else {
            cell.set(attrs)
        };
        self.react_cell(name, &ripples);
        Ok(())
    }

    fn react_cell(&mut self, name: &str, ripples: &Ripples) {
        let Scene { cells, pads, .. } = self;
        let Some(cell) = cells.get_mut(name) else {
            return;
        };
        if ripples.contains(&Ripple::Dimensions) {
            let frame = cell.role.pad().and_then(|p| pads.get(p)).map(Pad::frame);
            cell.resolve_actual(frame);
        }
        let compile = ripples.contains(&Ripple::CompileOrder);
        let show = ripples.contains(&Ripple::ShowOrder);
        if compile || show {
            for pad in pads.values_mut().filter(|p| p.contains(name)) {
                pad.resort_compile |= compile;
                pad.resort_show |= show;
            }
        }
    }

    /// Delete a cell, the groups it owns, and its tracker.
    ///
    /// Pads that used it as display, base or current fall back to another member.
    pub fn delete_cell(&mut self, name: &str) -> ScrawlResult<()> {
        let cell = self.cells.remove(name).ok_or_else(|| unknown("cell", name))?;
        let touched: Vec<String> = self
            .pads
            .values_mut()
            .filter_map(|p| p.remove_cell(name).then(|| p.name.clone()))
            .collect();
        for pad in &touched {
            self.refresh_roles(pad);
        }
        for g in &cell.groups {
            let owned = self.groups.get(g).is_some_and(|group| group.cell == name);
            if owned {
                self.delete_group(g)?;
            }
        }
        for group in self.groups.values_mut().filter(|g| g.cell == name) {
            group.cell.clear();
        }
        self.trackers.remove(&cell.tracker_name);
        self.names.release(Namespace::Tracker, &cell.tracker_name);
        self.names.release(Namespace::Cell, name);
        self.clear_pivots_to(name);
        Ok(())
    }

    /// New standalone cell with `name`'s attributes, overridden by `overrides`.
    pub fn clone_cell(&mut self, name: &str, overrides: &AttrMap) -> ScrawlResult<String> {
        let src = self.cells.get(name).ok_or_else(|| unknown("cell", name))?;
        let attrs = clone_attributes(src.snapshot(), overrides, &["name"], |m| {
            fold_pair(m, "pasteX", "pasteY", "start");
            fold_pair(m, "startX", "startY", "start");
            fold_pair(m, "handleX", "handleY", "handle");
            fold_pair(m, "copyX", "copyY", "copy");
        });
        self.make_cell(&attrs)
    }

    // ----- groups -----

    fn default_cell(&self) -> Option<String> {
        let pad = self.pads.get(self.current_pad.as_deref()?)?;
        Some(pad.current.clone())
    }

    fn default_group(&self) -> Option<String> {
        let cell = self.cells.get(&self.default_cell()?)?;
        cell.groups.first().cloned()
    }

    /// Create a group drawing into `attrs.cell`, or the current pad's current cell.
    pub fn make_group(&mut self, attrs: &AttrMap) -> ScrawlResult<String> {
        let cell = match attrs.get("cell").and_then(text) {
            Some(c) if !self.cells.contains_key(c) => return Err(unknown("cell", c)),
            Some(c) => c.to_owned(),
            None => self.default_cell().unwrap_or_default(),
        };
        let members = self.validated_members(attrs)?;
        let name = self
            .names
            .claim(Namespace::Group, requested_name(attrs), "Group");
        let mut group = Group::new(name.clone(), cell.clone());
        group.set(&without(attrs, &["name", "cell", "entities"]));
        for m in &members {
            group.add_entity(m);
        }
        self.groups.insert(name.clone(), group);
        if let Some(c) = self.cells.get_mut(&cell) {
            c.groups.push(name.clone());
            c.sort_groups = true;
        }
        Ok(name)
    }

    fn validated_members(&self, attrs: &AttrMap) -> ScrawlResult<Vec<String>> {
        let Some(arr) = attrs.get("entities").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(arr.len());
        for name in arr.iter().filter_map(text) {
            if !self.entities.contains_key(name) {
                return Err(unknown("entity", name));
            }
            out.push(name.to_owned());
        }
        Ok(out)
    }

    /// Apply `attrs` to a group. Moving it to another cell updates both cells' lists.
    pub fn set_group(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_group(name, attrs, false)
    }

    /// Apply `attrs` additively to a group.
    pub fn set_group_delta(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_group(name, attrs, true)
    }

    fn update_group(&mut self, name: &str, attrs: &AttrMap, delta: bool) -> ScrawlResult<()> {
        if let Some(c) = attrs.get("cell").and_then(text)
            && !c.is_empty()
            && !self.cells.contains_key(c)
        {
            return Err(unknown("cell", c));
        }
        self.validated_members(attrs)?;
        let group = self.groups.get_mut(name).ok_or_else(|| unknown("group", name))?;
        let old_cell = group.cell.clone();
        let ripples = if delta {
            group.set_delta(attrs)
        } else {
            group.set(attrs)
        };
        let new_cell = group.cell.clone();
        if ripples.contains(&Ripple::Cell) {
            if let Some(c) = self.cells.get_mut(&old_cell) {
                c.groups.retain(|g| g != name);
            }
            if let Some(c) = self.cells.get_mut(&new_cell) {
                if !c.groups.iter().any(|g| g == name) {
                    c.groups.push(name.to_owned());
                }
                c.sort_groups = true;
            }
            self.refit_group(name);
        }
        if ripples.contains(&Ripple::Order)
            && let Some(c) = self.cells.get_mut(&new_cell)
        {
            c.sort_groups = true;
        }
        Ok(())
    }

    /// Delete a group. Member entities survive; those that named it as their primary group
    /// are left without one.
    pub fn delete_group(&mut self, name: &str) -> ScrawlResult<()> {
        self.groups.remove(name).ok_or_else(|| unknown("group", name))?;
        for c in self.cells.values_mut() {
            c.groups.retain(|g| g != name);
        }
        for e in self.entities.values_mut().filter(|e| e.group == name) {
            e.group.clear();
        }
        self.names.release(Namespace::Group, name);
        Ok(())
    }

    /// New group with `name`'s attributes and members, overridden by `overrides`.
    pub fn clone_group(&mut self, name: &str, overrides: &AttrMap) -> ScrawlResult<String> {
        let src = self.groups.get(name).ok_or_else(|| unknown("group", name))?;
        let attrs = clone_attributes(src.snapshot(), overrides, &["name"], |_| {});
        self.make_group(&attrs)
    }

    /// Add existing entities to a group. Primary groups are not changed.
    pub fn add_entities_to_group(&mut self, group: &str, entities: &[&str]) -> ScrawlResult<()> {
        if let Some(missing) = entities.iter().find(|e| !self.entities.contains_key(**e)) {
            return Err(unknown("entity", missing));
        }
        let g = self.groups.get_mut(group).ok_or_else(|| unknown("group", group))?;
        for e in entities {
            g.add_entity(e);
        }
        Ok(())
    }

    /// Remove entities from a group; names that are not members are skipped.
    pub fn remove_entities_from_group(
        &mut self,
        group: &str,
        entities: &[&str],
    ) -> ScrawlResult<()> {
        let g = self.groups.get_mut(group).ok_or_else(|| unknown("group", group))?;
        for e in entities {
            g.remove_entity(e);
        }
        for e in entities {
            if let Some(ent) = self.entities.get_mut(*e)
                && ent.group == group
            {
                ent.group.clear();
            }
        }
        Ok(())
    }

    /// Apply `attrs` additively to every member. `x`/`y` stand for `startX`/`startY`.
    pub fn update_entities_by(&mut self, group: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        let members = self.members(group)?;
        let mut items = self.pools.maps.acquire();
        items.extend(attrs.iter().map(|(k, v)| {
            let k = match k.as_str() {
                "x" => "startX",
                "y" => "startY",
                k => k,
            };
            (k.to_owned(), v.clone())
        }));
        let result = members
            .iter()
            .try_for_each(|e| self.update_entity(e, &items, true));
        self.pools.maps.release(items);
        result
    }

    /// Apply `attrs` to every member.
    pub fn set_entities_to(&mut self, group: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        for e in self.members(group)? {
            self.update_entity(&e, attrs, false)?;
        }
        Ok(())
    }

    fn members(&self, group: &str) -> ScrawlResult<Vec<String>> {
        Ok(self
            .groups
            .get(group)
            .ok_or_else(|| unknown("group", group))?
            .entities
            .clone())
    }

    /// Members currently following pointer `index`.
    pub fn get_entities_by_mouse_index(&self, group: &str, index: &str) -> ScrawlResult<Vec<String>> {
        let g = self.groups.get(group).ok_or_else(|| unknown("group", group))?;
        Ok(g.entities
            .iter()
            .filter(|e| {
                self.entities.get(*e).is_some_and(|ent| {
                    ent.position.mouse_index == index
                        && ent.position.pivot.as_deref()
                            == Some(crate::position::pivot::PivotKind::POINTER_KEYWORD)
                })
            })
            .cloned()
            .collect())
    }

    // ----- entities -----

    /// Create a rectangle.
    pub fn make_block(&mut self, attrs: &AttrMap) -> ScrawlResult<String> {
        self.make_entity(EntityKind::Block(Block::default()), attrs)
    }

    /// Create a circle or arc.
    pub fn make_wheel(&mut self, attrs: &AttrMap) -> ScrawlResult<String> {
        self.make_entity(EntityKind::Wheel(Wheel::default()), attrs)
    }

    /// Create an SVG path entity.
    pub fn make_shape(&mut self, attrs: &AttrMap) -> ScrawlResult<String> {
        self.make_entity(EntityKind::Shape(Shape::default()), attrs)
    }

    /// Create an entity of `kind` in `attrs.group`, or the current pad's current cell group.
    ///
    /// An unknown draw method is rejected here, although `set_entity` ignores one.
    pub fn make_entity(&mut self, kind: EntityKind, attrs: &AttrMap) -> ScrawlResult<String> {
        if let Some(m) = attrs.get("method")
            && text(m).and_then(DrawMethod::parse).is_none()
        {
            return Err(ScrawlError::validation(format!("unknown draw method {m}")));
        }
        let group = match attrs.get("group").and_then(text) {
            Some(g) if !g.is_empty() && !self.groups.contains_key(g) => {
                return Err(unknown("group", g));
            }
            Some(g) => g.to_owned(),
            None => self.default_group().unwrap_or_default(),
        };
        let label = kind.label();
        let name = self
            .names
            .claim(Namespace::Entity, requested_name(attrs), label);
        let tracker = self.names.claim(Namespace::Tracker, Some(&name), "Context");
        let mut entity = Entity::new(name.clone(), tracker.clone(), kind);
        entity.group = group.clone();
        entity.set(&without(attrs, &["name", "group"]));
        self.entities.insert(name.clone(), entity);
        self.trackers.insert(tracker, TrackerOwner::Entity(name.clone()));
        if let Some(g) = self.groups.get_mut(&group) {
            g.add_entity(&name);
        }
        self.refit_entity(&name);
        Ok(name)
    }

    /// Apply `attrs` to an entity. A new `group` moves its primary membership.
    pub fn set_entity(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_entity(name, attrs, false)
    }

    /// Apply `attrs` additively to an entity.
    pub fn set_entity_delta(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.update_entity(name, attrs, true)
    }

    fn update_entity(&mut self, name: &str, attrs: &AttrMap, delta: bool) -> ScrawlResult<()> {
        if let Some(g) = attrs.get("group").and_then(text)
            && !g.is_empty()
            && !self.groups.contains_key(g)
        {
            return Err(unknown("group", g));
        }
        let entity = self.entities.get_mut(name).ok_or_else(|| unknown("entity", name))?;
        let old_group = entity.group.clone();
        let ripples = if delta {
            entity.set_delta(attrs)
        } else {
            entity.set(attrs)
        };
        let new_group = entity.group.clone();
        if ripples.contains(&Ripple::Group) {
            if let Some(g) = self.groups.get_mut(&old_group) {
                g.remove_entity(name);
            }
            if let Some(g) = self.groups.get_mut(&new_group) {
                g.add_entity(name);
            }
        }
        if ripples.contains(&Ripple::Order) {
            for g in self.groups.values_mut().filter(|g| g.contains(name)) {
                g.resort = true;
            }
        }
        if ripples
            .iter()
            .any(|r| matches!(r, Ripple::Group | Ripple::Geometry | Ripple::Handle))
        {
            self.refit_entity(name);
        }
        Ok(())
    }

    fn entity_cell_dims(&self, entity: &str) -> Option<(f64, f64)> {
        let e = self.entities.get(entity)?;
        let g = self.groups.get(&e.group)?;
        let c = self.cells.get(&g.cell)?;
        Some((c.actual_width, c.actual_height))
    }

    fn refit_entity(&mut self, name: &str) {
        let Some((w, h)) = self.entity_cell_dims(name) else {
            return;
        };
        if let Some(e) = self.entities.get_mut(name) {
            e.fit_to_cell(w, h);
        }
    }

    fn refit_group(&mut self, group: &str) {
        let Ok(members) = self.members(group) else {
            return;
        };
        for m in members {
            if let Some(e) = self.entities.get_mut(&m) {
                e.position.invalidate_start();
                e.position.invalidate_handle();
            }
            self.refit_entity(&m);
        }
    }

    /// Delete an entity: it leaves every group, its points and tracker go with it, and
    /// anything pivoting to it loses the pivot.
    pub fn delete_entity(&mut self, name: &str) -> ScrawlResult<()> {
        let entity = self.entities.remove(name).ok_or_else(|| unknown("entity", name))?;
        for g in self.groups.values_mut() {
            g.remove_entity(name);
        }
        let points: Vec<String> = self
            .points
            .values()
            .filter(|p| p.entity == name)
            .map(|p| p.name.clone())
            .collect();
        for p in points {
            self.delete_point(&p)?;
        }
        self.trackers.remove(&entity.tracker_name);
        self.names.release(Namespace::Tracker, &entity.tracker_name);
        self.names.release(Namespace::Entity, name);
        self.clear_pivots_to(name);
        Ok(())
    }

    /// New entity of the same kind with `name`'s attributes, overridden by `overrides`.
    pub fn clone_entity(&mut self, name: &str, overrides: &AttrMap) -> ScrawlResult<String> {
        let src = self.entities.get(name).ok_or_else(|| unknown("entity", name))?;
        let kind = src.kind.clone();
        let attrs = clone_attributes(src.snapshot(), overrides, &["name"], |m| {
            fold_pair(m, "startX", "startY", "start");
            fold_pair(m, "handleX", "handleY", "handle");
        });
        self.make_entity(kind, &attrs)
    }

    /// Register a named point on a shape, in the shape's path coordinates.
    pub fn add_point(&mut self, entity: &str, name: Option<&str>, local: Vec2) -> ScrawlResult<String> {
        let e = self.entities.get(entity).ok_or_else(|| unknown("entity", entity))?;
        if !matches!(e.kind, EntityKind::Shape(_)) {
            return Err(ScrawlError::validation(format!(
                "named points belong to shapes; `{entity}` is a {}",
                e.kind.label()
            )));
        }
        let name = self.names.claim(Namespace::Point, name, "Point");
        self.points.insert(
            name.clone(),
            NamedPoint {
                name: name.clone(),
                entity: entity.to_owned(),
                local,
            },
        );
        Ok(name)
    }

    /// Delete a named point.
    pub fn delete_point(&mut self, name: &str) -> ScrawlResult<()> {
        self.points.remove(name).ok_or_else(|| unknown("point", name))?;
        self.names.release(Namespace::Point, name);
        self.clear_pivots_to(name);
        Ok(())
    }

    /// Surface position of a named point: its local position carried through the owner's
    /// scale, handle, roll and flips, from the owner's current start.
    pub fn point_position(&self, name: &str) -> Option<Vec2> {
        let p = self.points.get(name)?;
        let owner = self.entities.get(&p.entity)?;
        Some(owner.local_to_surface(p.local))
    }

    fn clear_pivots_to(&mut self, target: &str) {
        for e in self.entities.values_mut() {
            if e.position.pivot.as_deref() == Some(target) {
                e.position.set_pivot(None);
                tracing::debug!(entity = %e.name, %target, "pivot target deleted");
            }
            if let Some(Some(p)) = &e.drag_pivot
                && p == target
            {
                e.drag_pivot = Some(None);
            }
        }
        for c in self.cells.values_mut() {
            if c.position.pivot.as_deref() == Some(target) {
                c.position.set_pivot(None);
                c.paste_data = None;
            }
        }
    }

    // ----- designs -----

    /// Create a gradient design.
    pub fn make_design(&mut self, kind: DesignKind, attrs: &AttrMap) -> String {
        let fallback = match kind {
            DesignKind::Linear => "Gradient",
            DesignKind::Radial => "RadialGradient",
        };
        let name = self
            .names
            .claim(Namespace::Design, requested_name(attrs), fallback);
        let mut design = Design::new(name.clone(), kind);
        design.set(&without(attrs, &["name"]));
        self.designs.insert(name.clone(), design);
        name
    }

    /// Apply `attrs` to a design.
    pub fn set_design(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.designs
            .get_mut(name)
            .ok_or_else(|| unknown("design", name))?
            .set(attrs);
        Ok(())
    }

    /// Apply `attrs` additively to a design.
    pub fn set_design_delta(&mut self, name: &str, attrs: &AttrMap) -> ScrawlResult<()> {
        self.designs
            .get_mut(name)
            .ok_or_else(|| unknown("design", name))?
            .set_delta(attrs);
        Ok(())
    }

    /// Delete a design. Styles naming it fall back to CSS parsing on their next change.
    pub fn delete_design(&mut self, name: &str) -> ScrawlResult<()> {
        self.designs.remove(name).ok_or_else(|| unknown("design", name))?;
        self.names.release(Namespace::Design, name);
        Ok(())
    }

    /// New design with `name`'s attributes, overridden by `overrides`.
    pub fn clone_design(&mut self, name: &str, overrides: &AttrMap) -> ScrawlResult<String> {
        let src = self.designs.get(name).ok_or_else(|| unknown("design", name))?;
        let kind = src.kind();
        let attrs = clone_attributes(src.snapshot(), overrides, &["name"], |_| {});
        Ok(self.make_design(kind, &attrs))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/scene.rs"]
mod tests;
