pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;

pub use config::Config;
pub use error::AppError;

use database::{SwapRequestStore, WorkspaceStore};
use services::{Notifier, PresetService, ScheduleService, SwapService, WorkspaceService};

pub struct AppState {
    pub workspace_service: WorkspaceService,
    pub schedule_service: ScheduleService,
    pub preset_service: PresetService,
    pub swap_service: SwapService,
}

impl AppState {
    /// Every service shares one workspace store so they all go through the
    /// same versioned read-modify-write path.
    pub fn new(
        workspaces: Arc<dyn WorkspaceStore>,
        swaps: Arc<dyn SwapRequestStore>,
        notifier: Notifier,
    ) -> Self {
        let workspace_service = WorkspaceService::new(workspaces);
        Self {
            schedule_service: ScheduleService::new(workspace_service.clone()),
            preset_service: PresetService::new(workspace_service.clone()),
            swap_service: SwapService::new(swaps, workspace_service.clone(), notifier),
            workspace_service,
        }
    }
}
