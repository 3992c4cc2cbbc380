//! Paint state, its diffing, and the engines it is applied to.

pub(crate) mod blur;
pub(crate) mod changes;
pub(crate) mod color;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod engine;
pub(crate) mod scratch;
pub(crate) mod state;
