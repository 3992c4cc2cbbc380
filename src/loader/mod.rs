//! Initialization-time loading of optional capabilities and their dependencies.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::foundation::config::SceneConfig;
use crate::foundation::error::{ScrawlError, ScrawlResult};

/// Longest accepted load budget.
pub const MAX_BUDGET: Duration = Duration::from_secs(24 * 60 * 60);

/// Brings one capability online. Called at most once per capability per loader.
pub trait CapabilityFetcher {
    /// Load `capability`; an error aborts the whole load.
    ///
    /// The loader cannot interrupt a fetch: implementations must return by `deadline`, with an
    /// error if the capability is not ready. A fetch returning late is still reported as a
    /// timeout and the capability is not marked loaded.
    fn fetch(&mut self, capability: &str, deadline: Instant) -> ScrawlResult<()>;
}

impl<F> CapabilityFetcher for F
where
    F: FnMut(&str, Instant) -> ScrawlResult<()>,
{
    fn fetch(&mut self, capability: &str, deadline: Instant) -> ScrawlResult<()> {
        self(capability, deadline)
    }
}

/// Dependency-aware capability loader with a time budget.
#[derive(Debug, Clone)]
pub struct Loader {
    dependencies: HashMap<String, Vec<String>>,
    completed: Vec<String>,
    done: HashSet<String>,
    budget: Duration,
}

impl Default for Loader {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl Loader {
    /// Loader with the default dependency map and `budget`, capped at [`MAX_BUDGET`].
    pub fn new(budget: Duration) -> Self {
        let dependencies = [
            ("images", "imageload"),
            ("physics", "quaternion"),
            ("stacks", "quaternion"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), vec![v.to_owned()]))
        .collect();
        Self {
            dependencies,
            completed: Vec::new(),
            done: HashSet::new(),
            budget: budget.min(MAX_BUDGET),
        }
    }

    /// Loader using the configured time budget.
    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(Duration::from_millis(config.loader_timeout_ms))
    }

    /// Declare what `capability` needs loaded first, replacing any earlier declaration.
    pub fn declare(&mut self, capability: &str, needs: &[&str]) {
        self.dependencies.insert(
            capability.to_owned(),
            needs.iter().map(|s| (*s).to_owned()).collect(),
        );
    }

    /// Declared dependencies of `capability`.
    pub fn dependencies_of(&self, capability: &str) -> &[String] {
        self.dependencies
            .get(capability)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Capabilities loaded so far, in load order.
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Whether `capability` has loaded.
    pub fn is_loaded(&self, capability: &str) -> bool {
        self.done.contains(capability)
    }

    /// Dependencies-first load order for `requested`, without already-loaded entries.
    pub fn plan(&self, requested: &[&str]) -> ScrawlResult<Vec<String>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut visiting = Vec::new();
        for r in requested {
            self.visit(r, &mut seen, &mut visiting, &mut out)?;
        }
        Ok(out)
    }

    fn visit(
        &self,
        cap: &str,
        seen: &mut HashSet<String>,
        visiting: &mut Vec<String>,
        out: &mut Vec<String>,
    ) -> ScrawlResult<()> {
        if seen.contains(cap) || self.done.contains(cap) {
            return Ok(());
        }
        if visiting.iter().any(|v| v == cap) {
            visiting.push(cap.to_owned());
            return Err(ScrawlError::load(format!(
                "dependency cycle: {}",
                visiting.join(" -> ")
            )));
        }
        visiting.push(cap.to_owned());
        for dep in self.dependencies_of(cap) {
            self.visit(dep, seen, visiting, out)?;
        }
        visiting.pop();
        seen.insert(cap.to_owned());
        out.push(cap.to_owned());
        Ok(())
    }

    /// Load `requested` and everything it depends on.
    ///
    /// Returns the capabilities loaded by this call. On the first failure, or once the time
    /// budget is spent, `on_error` sees the error before it is returned; capabilities loaded
    /// before that point stay loaded.
    #[tracing::instrument(skip(self, fetcher, on_error))]
    pub fn load(
        &mut self,
        requested: &[&str],
        fetcher: &mut dyn CapabilityFetcher,
        on_error: impl FnOnce(&ScrawlError),
    ) -> ScrawlResult<Vec<String>> {
        let started = Instant::now();
        let deadline = started + self.budget;
        let result = self.load_planned(requested, fetcher, started, deadline);
        if let Err(e) = &result {
            on_error(e);
        }
        result
    }

    fn load_planned(
        &mut self,
        requested: &[&str],
        fetcher: &mut dyn CapabilityFetcher,
        started: Instant,
        deadline: Instant,
    ) -> ScrawlResult<Vec<String>> {
        let plan = self.plan(requested)?;
        let mut loaded = Vec::with_capacity(plan.len());
        for cap in plan {
            self.check_budget(started, deadline, &cap)?;
            let fetched = fetcher.fetch(&cap, deadline);
            self.check_budget(started, deadline, &cap)?;
            fetched.map_err(|e| ScrawlError::load(format!("capability `{cap}` failed: {e}")))?;
            tracing::debug!(capability = %cap, "capability loaded");
            self.done.insert(cap.clone());
            self.completed.push(cap.clone());
            loaded.push(cap);
        }
        Ok(loaded)
    }

    fn check_budget(&self, started: Instant, deadline: Instant, cap: &str) -> ScrawlResult<()> {
        let now = Instant::now();
        if now > deadline {
            let elapsed = now - started;
            tracing::warn!(
                capability = %cap,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.budget.as_millis() as u64,
                "capability load timed out"
            );
            return Err(ScrawlError::load(format!(
                "timed out after {} ms loading `{cap}`",
                elapsed.as_millis()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/loader.rs"]
mod tests;
