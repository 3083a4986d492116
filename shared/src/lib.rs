//! Shared types and core routines for the Solar Planner platform
//!
//! This crate contains the pure parts of the system shared between the
//! backend and the browser (via WASM): weather aggregation, solar plan
//! normalization and the domain types both operate on.

pub mod aggregation;
pub mod models;
pub mod normalize;
pub mod types;

pub use aggregation::*;
pub use models::*;
pub use normalize::*;
pub use types::*;
