//! Storage seams. Everything above this module talks to the workspace and
//! swap-request collections through these traits; PostgreSQL repositories
//! and in-memory stores implement them.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use uuid::Uuid;

use crate::database::models::{SwapRequest, SwapStatus, Workspace};
use crate::error::AppError;

/// Live workspace snapshots, newest last. Dropping the stream unsubscribes.
pub type WorkspaceStream = Pin<Box<dyn Stream<Item = Workspace> + Send>>;

/// A workspace document together with the version it was read at.
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    pub workspace: Workspace,
    pub version: i64,
}

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn insert(&self, workspace: &Workspace) -> Result<WorkspaceSnapshot, AppError>;

    async fn fetch(&self, workspace_id: &str) -> Result<Option<WorkspaceSnapshot>, AppError>;

    /// Overwrites the document only if the stored version still equals
    /// `expected_version`, returning the new version. A mismatch fails with
    /// `AppError::Conflict` and writes nothing.
    async fn save(&self, workspace: &Workspace, expected_version: i64) -> Result<i64, AppError>;

    /// Workspaces the user owns or is listed in.
    async fn list_for_member(&self, user_id: &str) -> Result<Vec<WorkspaceSnapshot>, AppError>;

    async fn subscribe(&self, workspace_id: &str) -> Result<WorkspaceStream, AppError>;
}

#[async_trait]
pub trait SwapRequestStore: Send + Sync {
    async fn insert(&self, swap: &SwapRequest) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SwapRequest>, AppError>;

    async fn list_for_workspace(
        &self,
        workspace_id: &str,
        status: Option<SwapStatus>,
    ) -> Result<Vec<SwapRequest>, AppError>;

    /// Writes `swap` only while the stored request is still pending.
    /// Returns `false` when it had already reached a terminal state.
    async fn complete(&self, swap: &SwapRequest) -> Result<bool, AppError>;

    /// Undoes a `complete` whose follow-up schedule write failed. Only a
    /// request currently in `from` is put back to pending.
    async fn revert_to_pending(&self, id: Uuid, from: SwapStatus) -> Result<(), AppError>;
}

/// Read side of push-token registration, which lives outside this service.
#[async_trait]
pub trait PushTokenStore: Send + Sync {
    async fn tokens_for_user(&self, user_id: &str) -> Result<Vec<String>, AppError>;
}
