use crate::foundation::core::{Coord, Point, Vec2};
use crate::foundation::error::{ScrawlError, ScrawlResult};
use crate::position::reference::ReferenceDims;
use crate::scene::Scene;
use crate::scene::capability::{Drawable, Positionable};

impl Scene {
    /// Scale a pad-space pointer position into `cell`'s pixel space when the cell's actual
    /// size differs from the pad's display size.
    pub fn correct_coordinates(&self, point: Vec2, cell: &str) -> Vec2 {
        let Some(c) = self.cells.get(cell) else {
            return point;
        };
        let Some(pad) = c.role.pad().and_then(|p| self.pads.get(p)) else {
            return point;
        };
        let mut out = point;
        if pad.width > 0.0 && c.actual_width != pad.width {
            out.x *= c.actual_width / pad.width;
        }
        if pad.height > 0.0 && c.actual_height != pad.height {
            out.y *= c.actual_height / pad.height;
        }
        out
    }

    fn entity_cell(&self, entity: &str) -> Option<String> {
        let e = self.entities.get(entity)?;
        let g = self.groups.get(&e.group)?;
        self.cells.contains_key(&g.cell).then(|| g.cell.clone())
    }

    /// Bring an entity's caches up to date against `cell` outside the render cycle.
    fn prime_entity(&mut self, entity: &str, cell: &str) {
        let Some((w, h)) = self.cells.get(cell).map(|c| (c.actual_width, c.actual_height)) else {
            return;
        };
        if let Some(e) = self.entities.get_mut(entity) {
            e.fit_to_cell(w, h);
            e.refresh_start(Some(ReferenceDims::new(w, h, false)));
            e.refresh_handle();
        }
    }

    fn hits(&mut self, group: &str, point: Vec2, first_only: bool) -> ScrawlResult<Vec<String>> {
        let Scene {
            groups,
            entities,
            pools,
            ..
        } = self;
        let g = groups.get_mut(group).ok_or_else(|| super::unknown("group", group))?;
        let mut scratch = pools.sort_scratch.acquire();
        g.sort_entities(false, &mut scratch, |e| {
            entities.get(e).map_or(0.0, |e| e.order)
        });
        pools.sort_scratch.release(scratch);
        let cell = g.cell.clone();
        let radius = g.region_radius;
        let members = g.entities.clone();

        let at = self.correct_coordinates(point, &cell);
        let mut found = Vec::new();
        for name in members.iter().rev() {
            self.prime_entity(name, &cell);
            let Some(e) = self.entities.get(name) else {
                continue;
            };
            if !e.visibility {
                continue;
            }
            if radius > 0.0 && (e.position.current_start.raw() - at).hypot() > radius {
                continue;
            }
            if e.check_hit(Point::new(at.x, at.y)) {
                found.push(name.clone());
                if first_only {
                    break;
                }
            }
        }
        Ok(found)
    }

    /// Topmost visible member of `group` under `point`.
    pub fn get_entity_at(&mut self, group: &str, point: Vec2) -> ScrawlResult<Option<String>> {
        Ok(self.hits(group, point, true)?.into_iter().next())
    }

    /// Every visible member of `group` under `point`, topmost first.
    pub fn get_all_entities_at(&mut self, group: &str, point: Vec2) -> ScrawlResult<Vec<String>> {
        self.hits(group, point, false)
    }

    /// Start dragging an entity with pointer `mouse_index`, currently at `point`.
    ///
    /// The entity rises by the configured boost and follows the pointer's movement from here.
    pub fn pickup_entity(&mut self, name: &str, point: Vec2, mouse_index: &str) -> ScrawlResult<()> {
        if !self.entities.contains_key(name) {
            return Err(super::unknown("entity", name));
        }
        let cell = self.entity_cell(name);
        let at = match &cell {
            Some(c) => {
                self.prime_entity(name, c);
                self.correct_coordinates(point, c)
            }
            None => point,
        };
        let pad = cell
            .as_deref()
            .and_then(|c| self.cells.get(c))
            .and_then(|c| c.role.pad())
            .map(str::to_owned);
        if let Some(pad) = pad
            && let Some(p) = self.pads.get_mut(&pad)
        {
            p.set_pointer(mouse_index, point);
        }
        let boost = self.config.drag_order_boost;
        if let Some(e) = self.entities.get_mut(name) {
            e.pickup(at, mouse_index, boost);
        }
        for g in self.groups.values_mut().filter(|g| g.contains(name)) {
            g.resort = true;
        }
        tracing::debug!(entity = %name, x = at.x, y = at.y, "picked up");
        Ok(())
    }

    /// End a drag, baking the resolved position into `start`. Returns `false` if the entity
    /// was not being dragged.
    pub fn drop_entity(&mut self, name: &str) -> ScrawlResult<bool> {
        let boost = self.config.drag_order_boost;
        let e = self.entities.get_mut(name).ok_or_else(|| super::unknown("entity", name))?;
        let dropped = e.drop_entity(boost);
        if dropped {
            for g in self.groups.values_mut().filter(|g| g.contains(name)) {
                g.resort = true;
            }
            if let Some(cell) = self.entity_cell(name) {
                self.prime_entity(name, &cell);
            }
        }
        Ok(dropped)
    }

    /// Pivot every member of `group` to `target` (an entity or a named point) without moving
    /// anything: each member's handle absorbs its offset from the target.
    pub fn pivot_entities_to(&mut self, group: &str, target: &str) -> ScrawlResult<()> {
        let members = self.members(group)?;
        if let Some(cell) = self.entity_cell(target) {
            self.prime_entity(target, &cell);
        }
        let at = if self.points.contains_key(target) {
            self.point_position(target)
        } else {
            self.entities
                .get(target)
                .map(|t| t.position.current_start.raw())
        }
        .ok_or_else(|| {
            ScrawlError::registry(format!("pivot target `{target}` is not an entity or point"))
        })?;

        for m in members.iter().filter(|m| m.as_str() != target) {
            if let Some(cell) = self.entity_cell(m) {
                self.prime_entity(m, &cell);
            }
            let Some(e) = self.entities.get_mut(m) else {
                continue;
            };
            let offset = at - e.position.current_start.raw() - e.position.current_handle.raw();
            e.position.handle = Coord::px(offset.x, offset.y);
            e.position.invalidate_handle();
            e.position.set_pivot(Some(target.to_owned()));
            e.position.pointer_anchor = None;
        }
        Ok(())
    }
}
