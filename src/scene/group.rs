use crate::attr::{
    AttrMap, Attributes, Ripple, Ripples, Value, boolean, delta_num, num, push_ripple, text,
};
use crate::foundation::math::bucket_sort_by_order;

/// Ordered collection of entities drawn into one surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub(crate) name: String,
    pub(crate) entities: Vec<String>,
    pub(crate) cell: String,
    pub(crate) order: f64,
    pub(crate) resort: bool,
    pub(crate) visibility: bool,
    pub(crate) entity_sort: bool,
    pub(crate) region_radius: f64,
}

impl Group {
    pub(crate) fn new(name: String, cell: String) -> Self {
        Self {
            name,
            entities: Vec::new(),
            cell,
            order: 0.0,
            resort: false,
            visibility: true,
            entity_sort: true,
            region_radius: 0.0,
        }
    }

    /// Registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member names in draw order, as of the last sort.
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Target surface.
    pub fn cell(&self) -> &str {
        &self.cell
    }

    /// Compile order among the surface's groups.
    pub fn order(&self) -> f64 {
        self.order
    }

    /// Whether the group stamps.
    pub fn visibility(&self) -> bool {
        self.visibility
    }

    /// Hit-test prefilter radius; 0 disables it.
    pub fn region_radius(&self) -> f64 {
        self.region_radius
    }

    pub(crate) fn contains(&self, entity: &str) -> bool {
        self.entities.iter().any(|e| e == entity)
    }

    /// Append a member. Returns `false` if it already was one.
    pub(crate) fn add_entity(&mut self, entity: &str) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.entities.push(entity.to_owned());
        self.resort = true;
        true
    }

    /// Drop a member. Returns `false` if it was not one.
    pub(crate) fn remove_entity(&mut self, entity: &str) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e != entity);
        let removed = self.entities.len() != before;
        if removed {
            self.resort = true;
        }
        removed
    }

    /// Stable ascending sort by `floor(order)`; runs when forced or when sorting is enabled
    /// and a resort is pending.
    pub(crate) fn sort_entities(
        &mut self,
        force: bool,
        scratch: &mut Vec<(i64, String)>,
        order_of: impl Fn(&str) -> f64,
    ) {
        if !(force || (self.entity_sort && self.resort)) {
            return;
        }
        bucket_sort_by_order(&mut self.entities, scratch, order_of);
        self.resort = false;
        tracing::debug!(group = %self.name, members = self.entities.len(), "entities resorted");
    }

    fn set_one(&mut self, key: &str, v: &Value, delta: bool, ripples: &mut Ripples) {
        match key {
            "entities" => {
                if let Some(arr) = v.as_array() {
                    let mut next: Vec<String> = Vec::with_capacity(arr.len());
                    for name in arr.iter().filter_map(text) {
                        if !next.iter().any(|n| n == name) {
                            next.push(name.to_owned());
                        }
                    }
                    self.entities = next;
                    self.resort = true;
                    push_ripple(ripples, Ripple::Members);
                }
            }
            "cell" => {
                if let Some(c) = text(v)
                    && c != self.cell
                {
                    self.cell = c.to_owned();
                    push_ripple(ripples, Ripple::Cell);
                }
            }
            "order" => {
                let next = if delta {
                    delta_num(self.order, v)
                } else {
                    num(v)
                };
                if let Some(o) = next {
                    self.order = o;
                    push_ripple(ripples, Ripple::Order);
                }
            }
            "regionRadius" => {
                let next = if delta {
                    delta_num(self.region_radius, v)
                } else {
                    num(v)
                };
                if let Some(r) = next {
                    self.region_radius = r.max(0.0);
                }
            }
            "visibility" => {
                if let Some(b) = boolean(v) {
                    self.visibility = b;
                }
            }
            "entitySort" => {
                if let Some(b) = boolean(v) {
                    self.entity_sort = b;
                }
            }
            _ => {}
        }
    }
}

impl Attributes for Group {
    fn get(&self, key: &str) -> Option<Value> {
        let v = match key {
            "name" => Value::String(self.name.clone()),
            "entities" => serde_json::json!(self.entities),
            "cell" => Value::String(self.cell.clone()),
            "order" => serde_json::json!(self.order),
            "visibility" => Value::Bool(self.visibility),
            "entitySort" => Value::Bool(self.entity_sort),
            "regionRadius" => serde_json::json!(self.region_radius),
            _ => return None,
        };
        Some(v)
    }

    fn set(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.set_one(k, v, false, &mut ripples);
        }
        ripples
    }

    fn set_delta(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.set_one(k, v, true, &mut ripples);
        }
        ripples
    }

    fn snapshot(&self) -> AttrMap {
        let mut out = AttrMap::new();
        for key in [
            "entities",
            "cell",
            "order",
            "visibility",
            "entitySort",
            "regionRadius",
        ] {
            if let Some(v) = self.get(key) {
                out.insert(key.to_owned(), v);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/group.rs"]
mod tests;
