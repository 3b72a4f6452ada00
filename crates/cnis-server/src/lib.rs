//! CNIS server — HTTP surface over the employment-history sessions.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
