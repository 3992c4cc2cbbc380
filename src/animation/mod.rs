//! Ordered per-frame callbacks driven by a frame scheduler.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::error::{ScrawlError, ScrawlResult};
use crate::foundation::math::bucket_sort_by_order;
use crate::scene::Scene;
use crate::scene::names::{NameRegistry, Namespace};

/// Per-frame callback.
pub type AnimationFn = Box<dyn FnMut(&mut Scene) -> ScrawlResult<()>>;

/// One registered callback.
pub struct Animation {
    name: String,
    order: f64,
    callback: AnimationFn,
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl Animation {
    /// Registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run position; lower runs first.
    pub fn order(&self) -> f64 {
        self.order
    }
}

/// Source of frame ticks. `next_frame` blocks until the next frame is due and returns
/// `false` when no more frames will come.
pub trait FrameScheduler {
    /// Wait for the next frame.
    fn next_frame(&mut self) -> bool;
}

/// Steps a fixed number of frames without waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualScheduler {
    remaining: u64,
}

impl ManualScheduler {
    /// Scheduler yielding `frames` frames.
    pub fn new(frames: u64) -> Self {
        Self { remaining: frames }
    }

    /// Frames still to come.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl FrameScheduler for ManualScheduler {
    fn next_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Shared stop flag. Cloning shares the flag, so a callback can halt the loop it runs in.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    /// Stop scheduling further frames.
    pub fn halt(&self) {
        self.0.set(true);
    }

    /// Whether a halt was requested.
    pub fn is_halted(&self) -> bool {
        self.0.get()
    }

    fn reset(&self) {
        self.0.set(false);
    }
}

/// Runs registered animations in ascending order once per frame.
#[derive(Debug, Default)]
pub struct Animator {
    animations: HashMap<String, Animation>,
    order: Vec<String>,
    scratch: Vec<(i64, String)>,
    resort: bool,
    running: bool,
    names: NameRegistry,
    stop: StopHandle,
}

impl Animator {
    /// Empty animator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under a unique name derived from `name`.
    pub fn make_animation(
        &mut self,
        name: Option<&str>,
        order: f64,
        callback: impl FnMut(&mut Scene) -> ScrawlResult<()> + 'static,
    ) -> String {
        let name = self.names.claim(Namespace::Animation, name, "Animation");
        self.animations.insert(
            name.clone(),
            Animation {
                name: name.clone(),
                order,
                callback: Box::new(callback),
            },
        );
        self.order.push(name.clone());
        self.resort = true;
        name
    }

    /// Registered animation by name.
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// Change an animation's run position.
    pub fn set_order(&mut self, name: &str, order: f64) -> ScrawlResult<()> {
        let a = self
            .animations
            .get_mut(name)
            .ok_or_else(|| ScrawlError::registry(format!("unknown animation `{name}`")))?;
        a.order = order;
        self.resort = true;
        Ok(())
    }

    /// Unregister an animation.
    pub fn kill(&mut self, name: &str) -> ScrawlResult<()> {
        self.animations
            .remove(name)
            .ok_or_else(|| ScrawlError::registry(format!("unknown animation `{name}`")))?;
        self.order.retain(|a| a != name);
        self.names.release(Namespace::Animation, name);
        Ok(())
    }

    /// Names in run order as of the last sort.
    pub fn run_order(&mut self) -> &[String] {
        self.sort();
        &self.order
    }

    fn sort(&mut self) {
        if !self.resort {
            return;
        }
        let animations = &self.animations;
        bucket_sort_by_order(&mut self.order, &mut self.scratch, |n| {
            animations.get(n).map_or(0.0, |a| a.order)
        });
        self.resort = false;
        tracing::debug!(count = self.order.len(), "animations resorted");
    }

    /// Run every animation once, in order. The first error stops the frame and is returned.
    pub fn tick(&mut self, scene: &mut Scene) -> ScrawlResult<()> {
        self.sort();
        for name in &self.order {
            if let Some(a) = self.animations.get_mut(name) {
                (a.callback)(scene)?;
            }
        }
        Ok(())
    }

    /// Drive frames from `scheduler` until it runs dry, a halt is requested, or a callback
    /// fails. Returns the number of frames completed.
    pub fn run(&mut self, scene: &mut Scene, scheduler: &mut dyn FrameScheduler) -> ScrawlResult<u64> {
        self.stop.reset();
        self.running = true;
        let mut frames = 0_u64;
        let outcome = loop {
            if self.stop.is_halted() || !scheduler.next_frame() {
                break Ok(frames);
            }
            if let Err(e) = self.tick(scene) {
                tracing::warn!(error = %e, frame = frames, "animation failed; loop halted");
                self.stop.halt();
                break Err(e);
            }
            frames += 1;
        };
        self.running = false;
        outcome
    }

    /// Request that `run` stop before its next frame.
    pub fn halt(&self) {
        self.stop.halt();
    }

    /// Handle that halts this animator from inside a callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether `run` is currently driving frames.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
