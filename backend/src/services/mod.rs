//! Business logic services for the Solar Planner platform

pub mod plan;
pub mod prompt;
pub mod user;
pub mod weather;
pub mod webhook;

pub use plan::PlanService;
pub use user::UserService;
pub use weather::WeatherService;
pub use webhook::WebhookVerifier;
