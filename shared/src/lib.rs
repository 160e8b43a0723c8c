pub mod auth;
pub mod cleanup;
pub mod email;
pub mod invites;
pub mod state;

pub use state::AppState;
