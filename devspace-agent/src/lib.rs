//! Client for the external provisioning agent
//!
//! The agent is the service that actually creates and destroys workspace
//! compute resources. This crate wraps its HTTP API behind a small typed
//! surface with per-operation timeouts and normalized error envelopes.
//! It performs exactly one attempt per call; retry policy belongs to callers.

pub mod client;
pub mod error;
pub mod types;

pub use client::{AgentClient, AgentConfig, AgentHealth};
pub use error::{AgentError, Result};
pub use types::{
    AgentSecrets, ConnectionUrls, CreateEnvironmentRequest, DeleteEnvironmentRequest,
    EnvironmentPayload, StartEnvironmentRequest, StopEnvironmentRequest,
};
