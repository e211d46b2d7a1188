pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, UserAuth};
pub use request_id::{RequestId, RequestIdMiddleware};
