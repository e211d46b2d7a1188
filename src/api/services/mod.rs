pub mod geo;
pub mod health;

pub use geo::routes::{api_routes, login_path};
pub use health::{AppStartTime, HealthService, health_routes};
