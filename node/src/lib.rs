//! Stakeway service node.
//!
//! The node wires the pieces together:
//! - Opens the LMDB ledger and checks it
//! - Builds the reward engine over it
//! - Serves the HTTP API, with optional Prometheus metrics
//! - Shuts down gracefully on SIGINT/SIGTERM

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::StakewayNode;
pub use shutdown::ShutdownController;
