//! Domain models for the Solar Planner platform

mod plan;
mod weather;

pub use plan::*;
pub use weather::*;
