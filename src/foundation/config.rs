use crate::foundation::error::{ScrawlError, ScrawlResult};
use crate::foundation::pool::PoolOpts;

/// Scene-wide tunables.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Width of a pad created without an explicit width.
    pub default_pad_width: f64,
    /// Height of a pad created without an explicit height.
    pub default_pad_height: f64,
    /// Order added to an entity while it is dragged.
    pub drag_order_boost: f64,
    /// Compile order given to a pad's base surface.
    pub base_compile_order: f64,
    /// Retention caps for the transient pools.
    pub pool: PoolOpts,
    /// Time budget for extension loading, in milliseconds.
    pub loader_timeout_ms: u64,
    /// Seed for collision suffixes on generated names.
    pub name_seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_pad_width: 300.0,
            default_pad_height: 150.0,
            drag_order_boost: 9999.0,
            base_compile_order: 9.0,
            pool: PoolOpts::default(),
            loader_timeout_ms: 30_000,
            name_seed: 0,
        }
    }
}

impl SceneConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> ScrawlResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the scene cannot work with.
    pub fn validate(&self) -> ScrawlResult<()> {
        if !(self.default_pad_width.is_finite() && self.default_pad_width > 0.0)
            || !(self.default_pad_height.is_finite() && self.default_pad_height > 0.0)
        {
            return Err(ScrawlError::validation(
                "default pad dimensions must be finite and > 0",
            ));
        }
        if !self.drag_order_boost.is_finite() || self.drag_order_boost < 0.0 {
            return Err(ScrawlError::validation(
                "drag_order_boost must be finite and >= 0",
            ));
        }
        if !self.base_compile_order.is_finite() {
            return Err(ScrawlError::validation("base_compile_order must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
