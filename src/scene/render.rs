use crate::foundation::core::Vec2;
use crate::foundation::error::{ScrawlError, ScrawlResult};
use crate::foundation::math::bucket_sort_by_order;
use crate::position::pivot::PivotKind;
use crate::position::reference::ReferenceDims;
use crate::scene::Scene;
use crate::scene::capability::Positionable;
use crate::scene::cell::ReferenceRole;

/// How a resolved pivot moves its follower.
enum PivotMove {
    /// Translate by the pointer's change since the last resolution.
    Pointer(Vec2),
    /// Take this position.
    Target(Vec2),
}

impl Scene {
    /// Run the render cycle on every pad, in creation order.
    pub fn render(&mut self, pointer: Option<Vec2>) -> ScrawlResult<()> {
        let pads = self.pad_order.clone();
        for pad in &pads {
            self.render_pad(pad, pointer)?;
        }
        Ok(())
    }

    /// Clear, compile and show one pad.
    ///
    /// `pointer` overrides the pad's stored pointer positions for pointer pivots this frame.
    #[tracing::instrument(skip(self))]
    pub fn render_pad(&mut self, name: &str, pointer: Option<Vec2>) -> ScrawlResult<()> {
        let pad = self.pads.get(name).ok_or_else(|| super::unknown("pad", name))?;
        if pad.cells.is_empty() {
            return Err(ScrawlError::registry(format!("pad `{name}` has no cells")));
        }
        self.clear_pad(name)?;
        self.compile_pad(name, pointer)?;
        self.show_pad(name)
    }

    /// Erase every rendered, clearable cell of the pad in natural order.
    #[tracing::instrument(skip(self))]
    pub fn clear_pad(&mut self, name: &str) -> ScrawlResult<()> {
        let cells = self
            .pads
            .get(name)
            .ok_or_else(|| super::unknown("pad", name))?
            .cells
            .clone();
        for c in &cells {
            if let Some(cell) = self.cells.get_mut(c)
                && cell.rendered
                && cell.is_cleared()
            {
                cell.clear()?;
            }
        }
        Ok(())
    }

    /// Compile the pad's cells in ascending compile order.
    #[tracing::instrument(skip(self))]
    pub fn compile_pad(&mut self, name: &str, pointer: Option<Vec2>) -> ScrawlResult<()> {
        self.sort_pad_cells(name, true)?;
        let order = self.pads.get(name).map(|p| p.cells_compile_order.clone()).unwrap_or_default();
        for c in &order {
            self.compile_cell(c, pointer)?;
        }
        Ok(())
    }

    /// Composite working cells onto the base in ascending show order, then the base onto
    /// the display.
    #[tracing::instrument(skip(self))]
    pub fn show_pad(&mut self, name: &str) -> ScrawlResult<()> {
        self.sort_pad_cells(name, false)?;
        let pad = self.pads.get(name).ok_or_else(|| super::unknown("pad", name))?;
        let (base, display) = (pad.base.clone(), pad.display.clone());
        let order = pad.cells_show_order.clone();
        for c in &order {
            if *c == base || *c == display {
                continue;
            }
            let show = self
                .cells
                .get(c)
                .is_some_and(|cell| cell.rendered && cell.is_shown());
            if show {
                self.copy_between(c, &base)?;
            }
        }
        if base != display {
            self.copy_between(&base, &display)?;
        }
        Ok(())
    }

    fn sort_pad_cells(&mut self, name: &str, compile: bool) -> ScrawlResult<()> {
        let Scene {
            pads, cells, pools, ..
        } = self;
        let pad = pads.get_mut(name).ok_or_else(|| super::unknown("pad", name))?;
        let (list, flag) = if compile {
            (&mut pad.cells_compile_order, &mut pad.resort_compile)
        } else {
            (&mut pad.cells_show_order, &mut pad.resort_show)
        };
        if !*flag {
            return Ok(());
        }
        let mut scratch = pools.sort_scratch.acquire();
        bucket_sort_by_order(list, &mut scratch, |c| {
            cells.get(c).map_or(0.0, |cell| {
                if compile {
                    cell.compile_order
                } else {
                    cell.show_order
                }
            })
        });
        pools.sort_scratch.release(scratch);
        *flag = false;
        tracing::debug!(pad = %name, compile, "cells resorted");
        Ok(())
    }

    /// Compile one cell: resize if needed, push dimension changes to its entities, sort its
    /// groups, then stamp every visible group.
    pub fn compile_cell(&mut self, name: &str, pointer: Option<Vec2>) -> ScrawlResult<()> {
        let Scene {
            cells,
            groups,
            entities,
            pools,
            ..
        } = self;
        let Some(cell) = cells.get_mut(name) else {
            return Err(super::unknown("cell", name));
        };
        if !(cell.rendered && cell.is_compiled()) {
            return Ok(());
        }
        cell.apply_dimensions()?;
        if cell.dirty_starts || cell.dirty_handles {
            for g in cell.groups.iter().filter_map(|g| groups.get(g)) {
                for e in &g.entities {
                    let Some(e) = entities.get_mut(e.as_str()) else {
                        continue;
                    };
                    if cell.dirty_starts {
                        e.position.invalidate_start();
                    }
                    if cell.dirty_handles {
                        e.position.invalidate_handle();
                    }
                }
            }
            cell.dirty_starts = false;
            cell.dirty_handles = false;
        }
        if cell.sort_groups {
            let mut scratch = pools.sort_scratch.acquire();
            bucket_sort_by_order(&mut cell.groups, &mut scratch, |g| {
                groups.get(g).map_or(0.0, |g| g.order)
            });
            pools.sort_scratch.release(scratch);
            cell.sort_groups = false;
        }
        let mut order = pools.names.acquire();
        order.extend(cell.groups.iter().cloned());
        let result = order
            .iter()
            .try_for_each(|g| self.stamp_group_inner(g, pointer, false));
        self.pools.names.release(order);
        result
    }

    /// Stamp a group's members into its cell, skipping the group if it is hidden.
    pub fn stamp_group(&mut self, name: &str, pointer: Option<Vec2>) -> ScrawlResult<()> {
        if !self.groups.contains_key(name) {
            return Err(super::unknown("group", name));
        }
        self.stamp_group_inner(name, pointer, false)
    }

    /// Stamp a group's members regardless of the group's visibility.
    pub fn force_stamp_group(&mut self, name: &str, pointer: Option<Vec2>) -> ScrawlResult<()> {
        if !self.groups.contains_key(name) {
            return Err(super::unknown("group", name));
        }
        self.stamp_group_inner(name, pointer, true)
    }

    fn stamp_group_inner(&mut self, name: &str, pointer: Option<Vec2>, force: bool) -> ScrawlResult<()> {
        let Scene {
            groups,
            entities,
            pools,
            ..
        } = self;
        let Some(group) = groups.get_mut(name) else {
            return Ok(());
        };
        if !(group.visibility || force) {
            return Ok(());
        }
        let mut scratch = pools.sort_scratch.acquire();
        group.sort_entities(false, &mut scratch, |e| {
            entities.get(e).map_or(0.0, |e| e.order)
        });
        pools.sort_scratch.release(scratch);
        let cell = group.cell.clone();
        let mut members = pools.names.acquire();
        members.extend(group.entities.iter().cloned());

        let mut result = Ok(());
        for e in members.iter() {
            if let Some(entity) = self.entities.get_mut(e) {
                name.clone_into(&mut entity.group);
            }
            result = self.stamp_entity(e, &cell, pointer);
            if result.is_err() {
                break;
            }
        }
        self.pools.names.release(members);
        result
    }

    /// The entity stamp protocol: resolve, position, draw.
    fn stamp_entity(&mut self, name: &str, cell: &str, pointer: Option<Vec2>) -> ScrawlResult<()> {
        let Some((cw, ch)) = self.cells.get(cell).map(|c| (c.actual_width, c.actual_height)) else {
            tracing::debug!(entity = %name, %cell, "group has no cell; stamp skipped");
            return Ok(());
        };
        let Some(entity) = self.entities.get_mut(name) else {
            return Ok(());
        };
        if !entity.visibility {
            return Ok(());
        }
        entity.fit_to_cell(cw, ch);
        entity.refresh_start(Some(ReferenceDims::new(cw, ch, false)));
        entity.refresh_handle();

        if let Some(movement) = self.resolve_entity_pivot(name, cell, pointer)
            && let Some(entity) = self.entities.get_mut(name)
        {
            match movement {
                PivotMove::Pointer(at) => entity.position.follow_pointer(at),
                PivotMove::Target(at) => entity.position.follow_target(at),
            }
        }

        let Scene {
            cells,
            entities,
            designs,
            pools,
            ..
        } = self;
        if let (Some(entity), Some(cell)) = (entities.get(name), cells.get_mut(cell)) {
            entity.draw(cell, designs, &mut pools.changes);
        }
        Ok(())
    }

    fn classify_pivot(&self, name: &str) -> PivotKind {
        PivotKind::classify(
            name,
            |n| self.points.contains_key(n),
            |n| self.entities.contains_key(n),
            |n| self.pads.contains_key(n) || self.cells.contains_key(n),
        )
    }

    /// Classify (and cache) an entity's pivot and work out where it moves.
    fn resolve_entity_pivot(&mut self, name: &str, cell: &str, pointer: Option<Vec2>) -> Option<PivotMove> {
        let entity = self.entities.get(name)?;
        let pivot = entity.position.pivot.as_deref()?;
        let kind = match &entity.position.current_pivot {
            Some(k) => k.clone(),
            None => self.classify_pivot(pivot),
        };
        let mouse_index = entity.position.mouse_index.clone();
        let movement = self.pivot_move(&kind, name, &mouse_index, cell, pointer);
        if kind.is_settled()
            && let Some(entity) = self.entities.get_mut(name)
            && entity.position.current_pivot.is_none()
        {
            entity.position.current_pivot = Some(kind);
        }
        movement
    }

    fn pivot_move(
        &self,
        kind: &PivotKind,
        follower: &str,
        mouse_index: &str,
        cell: &str,
        pointer: Option<Vec2>,
    ) -> Option<PivotMove> {
        match kind {
            PivotKind::Pointer => {
                let pad = self.cells.get(cell)?.role.pad().and_then(|p| self.pads.get(p));
                let at = pointer.or_else(|| pad?.pointer(mouse_index))?;
                Some(PivotMove::Pointer(self.correct_coordinates(at, cell)))
            }
            PivotKind::Point(p) => self.point_position(p).map(PivotMove::Target),
            PivotKind::Entity(e) if e != follower => self
                .entities
                .get(e)
                .map(|t| PivotMove::Target(t.position.current_start.raw())),
            PivotKind::Entity(_) | PivotKind::Element(_) => None,
            PivotKind::Unresolved => {
                tracing::debug!(%follower, "pivot target not found");
                None
            }
        }
    }

    /// What a cell's paste position resolves against.
    fn paste_reference(&self, cell: &str) -> Option<ReferenceDims> {
        match &self.cells.get(cell)?.role {
            ReferenceRole::Standalone => None,
            ReferenceRole::DisplayOf(p) => self.pads.get(p).map(|p| p.reference_dims()),
            ReferenceRole::BaseOf(p) | ReferenceRole::WorkingSurfaceOf(p) => {
                let display = self.cells.get(&self.pads.get(p)?.display)?;
                Some(display.reference_dims())
            }
        }
    }

    /// What a cell's relative paste size resolves against: the display for the base, the
    /// base for everything else.
    fn paste_size_frame(&self, cell: &str) -> Option<(f64, f64)> {
        let c = self.cells.get(cell)?;
        let pad = self.pads.get(c.role.pad()?)?;
        let target = if pad.base == cell { &pad.display } else { &pad.base };
        let t = self.cells.get(target)?;
        Some((t.actual_width, t.actual_height))
    }

    fn resolve_cell_pivot(&mut self, name: &str, reference: Option<ReferenceDims>) {
        let Some(cell) = self.cells.get_mut(name) else {
            return;
        };
        cell.refresh_start(reference);
        let Some(pivot) = cell.position.pivot.as_deref() else {
            return;
        };
        let pivot = pivot.to_owned();
        let mouse_index = cell.position.mouse_index.clone();
        let kind = match &cell.position.current_pivot {
            Some(k) => k.clone(),
            None => self.classify_pivot(&pivot),
        };
        let movement = self.pivot_move(&kind, name, &mouse_index, name, None);
        let Some(cell) = self.cells.get_mut(name) else {
            return;
        };
        if kind.is_settled() {
            cell.position.current_pivot = Some(kind);
        }
        match movement {
            Some(PivotMove::Pointer(at)) => cell.position.follow_pointer(at),
            Some(PivotMove::Target(at)) => cell.position.follow_target(at),
            None => return,
        }
        cell.paste_data = None;
    }

    /// Composite `src` onto `dst`.
    fn copy_between(&mut self, src: &str, dst: &str) -> ScrawlResult<()> {
        if src == dst {
            return Ok(());
        }
        let reference = self.paste_reference(src);
        let frame = match self.paste_size_frame(src) {
            Some(f) => f,
            None => {
                let c = self.cells.get(dst).ok_or_else(|| super::unknown("cell", dst))?;
                (c.actual_width, c.actual_height)
            }
        };
        self.resolve_cell_pivot(src, reference);
        let [Some(s), Some(d)] = self.cells.get_disjoint_mut([src, dst]) else {
            return Err(ScrawlError::registry(format!(
                "cannot copy `{src}` onto `{dst}`: unknown cell"
            )));
        };
        d.copy_cell_to_self(s, reference, frame);
        Ok(())
    }
}
