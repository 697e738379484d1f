#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use rota::AppState;
use rota::config::Config;
use rota::database::memory::{MemorySwapRequestStore, MemoryWorkspaceStore};
use rota::database::models::{
    Employee, ShiftAssignmentInput, ShiftEntry, ShiftEntryInput, WorkspaceInput,
};
use rota::database::{SwapRequestStore, WorkspaceStore};
use rota::services::notifications::NotificationError;
use rota::services::{Claims, Identity, NotificationDispatcher, Notifier, PushNotification};

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Keeps every notification instead of delivering it.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<PushNotification>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<PushNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// `(recipient, type)` pairs in send order.
    pub fn summary(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .map(|n| {
                let kind = n.kind().unwrap_or_default().to_string();
                (n.recipient_id, kind)
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: &PushNotification) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub config: Config,
    pub swaps: Arc<MemorySwapRequestStore>,
    pub notifications: Arc<RecordingDispatcher>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_workspace_store(Arc::new(MemoryWorkspaceStore::new()))
    }

    pub fn with_workspace_store(workspaces: Arc<dyn WorkspaceStore>) -> Self {
        let swaps = Arc::new(MemorySwapRequestStore::new());
        let notifications = Arc::new(RecordingDispatcher::default());
        let swap_store: Arc<dyn SwapRequestStore> = swaps.clone();
        let state = AppState::new(
            workspaces,
            swap_store,
            Notifier::new(notifications.clone()),
        );

        Self {
            config: Config::test_config(),
            swaps,
            notifications,
            state: web::Data::new(state),
        }
    }

    pub fn token(&self, identity: &Identity) -> String {
        Claims::new(
            identity.user_id.clone(),
            identity.display_name.clone(),
            Duration::hours(1),
        )
        .encode(&self.config.jwt_secret)
        .unwrap()
    }

    /// A workspace owned by `owner` with the given `(user_id, name)` members
    /// on the default role.
    pub async fn seed_workspace(&self, owner: &Identity, members: &[(&str, &str)]) -> String {
        let view = self
            .state
            .workspace_service
            .create(
                owner,
                &WorkspaceInput {
                    name: "Corner Cafe".to_string(),
                },
            )
            .await
            .unwrap();

        for (user_id, name) in members {
            self.state
                .workspace_service
                .add_employee(&view.workspace.id, owner, employee(user_id, name))
                .await
                .unwrap();
        }

        view.workspace.id
    }

    pub async fn schedule(
        &self,
        workspace_id: &str,
        actor: &Identity,
        employee_id: &str,
        day: &str,
        start: &str,
        end: &str,
    ) -> ShiftEntry {
        self.state
            .schedule_service
            .add(workspace_id, actor, &custom_shift(employee_id, day, start, end))
            .await
            .unwrap()
    }

    pub async fn entries(&self, workspace_id: &str) -> Vec<ShiftEntry> {
        self.state
            .workspace_service
            .load(workspace_id)
            .await
            .unwrap()
            .workspace
            .schedule
    }
}

pub fn identity(user_id: &str, name: &str) -> Identity {
    Identity::new(user_id, name)
}

pub fn employee(user_id: &str, name: &str) -> Employee {
    Employee {
        user_id: user_id.to_string(),
        name: name.to_string(),
        username: None,
        email: None,
        photo_url: None,
        role_id: String::new(),
        color: String::new(),
    }
}

pub fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

pub fn custom_shift(employee_id: &str, day: &str, start: &str, end: &str) -> ShiftEntryInput {
    ShiftEntryInput {
        date: date(day),
        assignment: ShiftAssignmentInput {
            employee_id: employee_id.to_string(),
            shift_id: None,
            shift_name: None,
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
        },
        replace_existing: false,
    }
}
