mod server;

pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;
pub mod utils;

// Public API for starting/stopping the webserver
pub use server::{build_app, shutdown, start_server};
pub use state::AppState;
