pub mod auth;

pub use auth::{AuthenticatedAdmin, jwt_auth_middleware};
