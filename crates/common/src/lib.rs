//! Shared pieces for the config-store workspace: wire types used by both
//! the server and the client adapter, logging setup, startup env checks
//! and the admin (health/metrics) listener.

pub mod types;
pub mod env;
pub mod admin_http;

pub mod utils {
    pub mod logging;
}
