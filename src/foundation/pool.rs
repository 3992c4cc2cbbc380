use crate::attr::AttrMap;
use crate::paint::changes::ChangeSet;

/// A value that can be recycled: `reset` must return it to its freshly-allocated state.
pub trait Poolable: Default {
    /// Clear all contents in place.
    fn reset(&mut self);
}

impl<T> Poolable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Poolable for AttrMap {
    fn reset(&mut self) {
        self.clear();
    }
}

/// Pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PoolOpts {
    /// Maximum number of idle instances retained per pool.
    pub max_retained: usize,
}

impl Default for PoolOpts {
    fn default() -> Self {
        Self { max_retained: 64 }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// Counters for one pool.
pub struct PoolStats {
    /// Idle instances currently held.
    pub retained: usize,
    /// Instances created because the free-list was empty.
    pub allocated: u64,
    /// Acquisitions served from the free-list.
    pub reused: u64,
    /// Releases dropped because the pool was full.
    pub dropped_on_release: u64,
}

/// Bounded free-list of one value type.
///
/// Acquired values are owned by the caller; handing a value back through [`Pool::release`]
/// moves it, so the releasing path cannot read it again.
#[derive(Debug)]
pub struct Pool<T> {
    opts: PoolOpts,
    stats: PoolStats,
    free: Vec<T>,
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(PoolOpts::default())
    }
}

impl<T: Poolable> Pool<T> {
    /// Empty pool.
    pub fn new(opts: PoolOpts) -> Self {
        Self {
            opts,
            stats: PoolStats::default(),
            free: Vec::new(),
        }
    }

    /// Counter snapshot.
    pub fn stats(&self) -> PoolStats {
        self.stats.clone()
    }

    /// Take a cleared instance, allocating when the free-list is empty.
    pub fn acquire(&mut self) -> T {
        if let Some(v) = self.free.pop() {
            self.stats.retained = self.stats.retained.saturating_sub(1);
            self.stats.reused = self.stats.reused.saturating_add(1);
            return v;
        }
        self.stats.allocated = self.stats.allocated.saturating_add(1);
        T::default()
    }

    /// Clear `value` and keep it for reuse unless the pool is full.
    pub fn release(&mut self, mut value: T) {
        if self.free.len() >= self.opts.max_retained {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }
        value.reset();
        self.free.push(value);
        self.stats.retained = self.stats.retained.saturating_add(1);
    }

    /// Scoped acquisition: the instance is released on every exit path of `f`.
    pub fn with_pooled<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut v = self.acquire();
        let out = f(&mut v);
        self.release(v);
        out
    }
}

/// The scene's pools for its hot per-frame transients.
#[derive(Debug, Default)]
pub struct Pools {
    /// Name lists.
    pub names: Pool<Vec<String>>,
    /// Sort scratch buffers.
    pub(crate) sort_scratch: Pool<Vec<(i64, String)>>,
    /// Attribute maps.
    pub maps: Pool<AttrMap>,
    /// Paint-state change sets.
    pub changes: Pool<ChangeSet>,
}

impl Pools {
    /// Pools sharing one configuration.
    pub fn new(opts: PoolOpts) -> Self {
        Self {
            names: Pool::new(opts),
            sort_scratch: Pool::new(opts),
            maps: Pool::new(opts),
            changes: Pool::new(opts),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/pool.rs"]
mod tests;
