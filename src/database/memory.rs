//! In-memory stores for development and tests.
//!
//! They honor the same contracts as the PostgreSQL repositories (versioned
//! workspace writes, pending-only swap completion) within a single process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::events::WorkspaceEvents;
use crate::database::models::{SwapRequest, SwapStatus, Workspace};
use crate::database::store::{
    SwapRequestStore, WorkspaceSnapshot, WorkspaceStore, WorkspaceStream,
};
use crate::error::AppError;

#[derive(Default)]
pub struct MemoryWorkspaceStore {
    workspaces: RwLock<HashMap<String, WorkspaceSnapshot>>,
    events: WorkspaceEvents,
}

impl MemoryWorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkspaceStore for MemoryWorkspaceStore {
    async fn insert(&self, workspace: &Workspace) -> Result<WorkspaceSnapshot, AppError> {
        let mut workspaces = self.workspaces.write().await;
        if workspaces.contains_key(&workspace.id) {
            return Err(AppError::Conflict(format!(
                "Workspace {} already exists",
                workspace.id
            )));
        }

        let snapshot = WorkspaceSnapshot {
            workspace: workspace.clone(),
            version: 1,
        };
        workspaces.insert(workspace.id.clone(), snapshot.clone());
        drop(workspaces);

        self.events.publish(workspace);
        Ok(snapshot)
    }

    async fn fetch(&self, workspace_id: &str) -> Result<Option<WorkspaceSnapshot>, AppError> {
        Ok(self.workspaces.read().await.get(workspace_id).cloned())
    }

    async fn save(&self, workspace: &Workspace, expected_version: i64) -> Result<i64, AppError> {
        let mut workspaces = self.workspaces.write().await;
        let stored = workspaces
            .get_mut(&workspace.id)
            .ok_or_else(|| AppError::NotFound(format!("Workspace {}", workspace.id)))?;

        if stored.version != expected_version {
            log::warn!(
                "Rejected stale write to workspace {} (expected v{}, stored v{})",
                workspace.id,
                expected_version,
                stored.version
            );
            return Err(AppError::stale_workspace(&workspace.id));
        }

        stored.workspace = workspace.clone();
        stored.version += 1;
        let version = stored.version;
        drop(workspaces);

        self.events.publish(workspace);
        Ok(version)
    }

    async fn list_for_member(&self, user_id: &str) -> Result<Vec<WorkspaceSnapshot>, AppError> {
        Ok(self
            .workspaces
            .read()
            .await
            .values()
            .filter(|snapshot| snapshot.workspace.is_member(user_id))
            .cloned()
            .collect())
    }

    async fn subscribe(&self, workspace_id: &str) -> Result<WorkspaceStream, AppError> {
        Ok(self.events.subscribe(workspace_id))
    }
}

#[derive(Default)]
pub struct MemorySwapRequestStore {
    requests: RwLock<HashMap<Uuid, SwapRequest>>,
}

impl MemorySwapRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SwapRequestStore for MemorySwapRequestStore {
    async fn insert(&self, swap: &SwapRequest) -> Result<(), AppError> {
        self.requests.write().await.insert(swap.id, swap.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SwapRequest>, AppError> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn list_for_workspace(
        &self,
        workspace_id: &str,
        status: Option<SwapStatus>,
    ) -> Result<Vec<SwapRequest>, AppError> {
        let mut swaps: Vec<SwapRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|swap| swap.workspace_id == workspace_id)
            .filter(|swap| status.is_none_or(|s| swap.status == s))
            .cloned()
            .collect();

        swaps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(swaps)
    }

    async fn complete(&self, swap: &SwapRequest) -> Result<bool, AppError> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&swap.id) {
            Some(stored) if stored.status == SwapStatus::Pending => {
                *stored = swap.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(AppError::NotFound(format!("Swap request {}", swap.id))),
        }
    }

    async fn revert_to_pending(&self, id: Uuid, from: SwapStatus) -> Result<(), AppError> {
        let mut requests = self.requests.write().await;
        if let Some(stored) = requests.get_mut(&id) {
            if stored.status == from {
                stored.status = SwapStatus::Pending;
                stored.accepted_at = None;
                stored.accepted_by = None;
                stored.declined_at = None;
                stored.declined_by = None;
                stored.cancelled_at = None;
            }
        }
        Ok(())
    }
}
