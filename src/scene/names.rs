use std::collections::{HashMap, HashSet};

use crate::foundation::math::Fnv1a64;

/// Separator between a base name and its collision tag.
pub const NAME_SEPARATOR: &str = "___";

/// Registry namespace. Names are unique within a namespace only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Controllers.
    Pad,
    /// Surfaces.
    Cell,
    /// Entity collections.
    Group,
    /// Drawables.
    Entity,
    /// Paint-state trackers.
    Tracker,
    /// Gradients.
    Design,
    /// Named path points.
    Point,
    /// Animation callbacks.
    Animation,
}

/// Deterministic name allocator.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    seed: u64,
    sequence: u64,
    taken: HashMap<Namespace, HashSet<String>>,
}

/// Keep ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
pub(crate) fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl NameRegistry {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            sequence: 0,
            taken: HashMap::new(),
        }
    }

    pub(crate) fn contains(&self, ns: Namespace, name: &str) -> bool {
        self.taken.get(&ns).is_some_and(|s| s.contains(name))
    }

    /// Reserve a unique name in `ns`.
    ///
    /// The requested name (or `fallback`) is sanitized and cut at the first separator; on
    /// collision a separator and an 8-digit tag are appended.
    pub(crate) fn claim(&mut self, ns: Namespace, requested: Option<&str>, fallback: &str) -> String {
        let raw = requested.filter(|s| !s.is_empty()).unwrap_or(fallback);
        let clean = sanitize(raw);
        let base = clean
            .split(NAME_SEPARATOR)
            .next()
            .filter(|b| !b.is_empty())
            .map_or_else(|| sanitize(fallback), str::to_owned);

        let mut name = base.clone();
        while self.contains(ns, &name) {
            name = format!("{base}{NAME_SEPARATOR}{:08}", self.next_tag(&base));
        }
        self.taken.entry(ns).or_default().insert(name.clone());
        name
    }

    /// Free `name`; returns `false` when it was not registered.
    pub(crate) fn release(&mut self, ns: Namespace, name: &str) -> bool {
        self.taken.get_mut(&ns).is_some_and(|s| s.remove(name))
    }

    fn next_tag(&mut self, base: &str) -> u64 {
        self.sequence = self.sequence.wrapping_add(1);
        let mut h = if self.seed == 0 {
            Fnv1a64::new_default()
        } else {
            Fnv1a64::new(self.seed)
        };
        h.write_bytes(base.as_bytes());
        h.write_u64(self.sequence);
        h.finish() % 100_000_000
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/names.rs"]
mod tests;
