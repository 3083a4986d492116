//! HTTP request handlers

mod health;
mod plan;
mod user;
mod weather;
mod webhook;

pub use health::*;
pub use plan::*;
pub use user::*;
pub use weather::*;
pub use webhook::*;
