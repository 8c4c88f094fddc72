//! Per-caller façade over the orchestrator: request-option defaults and
//! header merging, per-instance cancellation, and observable loading/error
//! state for UI binding. Cache policy itself stays in the orchestrator.

pub mod client;
pub mod request;
pub mod transport;

pub use client::ApiClient;
pub use request::{Method, RequestOptions};
pub use transport::Transport;
