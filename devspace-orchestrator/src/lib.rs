//! Workspace lifecycle orchestration
//!
//! This crate contains the core business logic for managing cloud-backed
//! development workspaces: the persisted workspace record, the access and
//! quota guard, the lifecycle state machine that mediates every action
//! through the external provisioning agent, and the action audit log.
//! It is consumed by the devspace-api HTTP service but can also be used by
//! CLI commands or background workers.

pub mod audit;
pub mod db;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod workspace;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use audit::{ActionLogEntry, ActionLogFilters, ActionStatus, AuditLog};
pub use error::{OrchestratorError, Result};
pub use lifecycle::{ActionOutcome, CreateOutcome, WorkspaceOrchestrator};
pub use workspace::{
    CreateWorkspaceRequest, StatusPatch, Workspace, WorkspaceAction, WorkspaceFilters,
    WorkspaceStatus, WorkspaceStore,
};
