use std::sync::Arc;

use serde::Serialize;

use crate::database::models::{
    AssignRoleInput, DEFAULT_ROLE_ID, Employee, Permission, Role, RoleInput, Workspace,
    WorkspaceInput,
};
use crate::database::store::{WorkspaceSnapshot, WorkspaceStore, WorkspaceStream};
use crate::error::AppError;
use crate::services::actor_context::ActorContext;
use crate::services::auth::Identity;
use crate::services::ids::generate_id;
use crate::services::roles::{self, normalize_roles};

/// Workspace with its roster as clients see it: colors derived and the
/// owner present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub roster: Vec<Employee>,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    pub updated: usize,
    pub failed: usize,
}

/// Read-modify-write access to workspace documents.
///
/// Every mutation reads the document with its version, applies a closure to
/// a copy and writes it back with that version. A concurrent writer makes
/// the save fail with `Conflict`; nothing is retried here.
#[derive(Clone)]
pub struct WorkspaceService {
    store: Arc<dyn WorkspaceStore>,
}

impl WorkspaceService {
    pub fn new(store: Arc<dyn WorkspaceStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, workspace_id: &str) -> Result<WorkspaceSnapshot, AppError> {
        let mut snapshot = self
            .store
            .fetch(workspace_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workspace {}", workspace_id)))?;

        normalize_roles(&mut snapshot.workspace.roles);
        Ok(snapshot)
    }

    pub async fn save(&self, workspace: &Workspace, expected_version: i64) -> Result<i64, AppError> {
        self.store.save(workspace, expected_version).await
    }

    /// Load a workspace and resolve the caller as one of its members.
    pub async fn view_as(
        &self,
        workspace_id: &str,
        identity: &Identity,
    ) -> Result<(WorkspaceSnapshot, ActorContext), AppError> {
        let snapshot = self.load(workspace_id).await?;
        let actor =
            ActorContext::resolve(&snapshot.workspace, &identity.user_id, &identity.display_name)?;
        Ok((snapshot, actor))
    }

    pub async fn update<T, F>(
        &self,
        workspace_id: &str,
        identity: &Identity,
        mutate: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(&mut Workspace, &ActorContext) -> Result<T, AppError>,
    {
        let (snapshot, actor) = self.view_as(workspace_id, identity).await?;
        let mut workspace = snapshot.workspace;

        let value = mutate(&mut workspace, &actor)?;

        let version = self.store.save(&workspace, snapshot.version).await?;
        log::debug!(
            "Workspace {} saved at v{} by {}",
            workspace_id,
            version,
            actor.user_id
        );
        Ok(value)
    }

    pub async fn create(
        &self,
        identity: &Identity,
        input: &WorkspaceInput,
    ) -> Result<WorkspaceView, AppError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Workspace name is required".to_string(),
            ));
        }

        let workspace = Workspace::new(
            generate_id(),
            name.to_string(),
            identity.user_id.clone(),
            Some(identity.display_name.clone()),
        );
        let snapshot = self.store.insert(&workspace).await?;
        log::info!(
            "Workspace {} created by {}",
            snapshot.workspace.id,
            identity.user_id
        );

        Ok(Self::into_view(snapshot))
    }

    pub async fn get(
        &self,
        workspace_id: &str,
        identity: &Identity,
    ) -> Result<WorkspaceView, AppError> {
        let (snapshot, _) = self.view_as(workspace_id, identity).await?;
        Ok(Self::into_view(snapshot))
    }

    fn into_view(snapshot: WorkspaceSnapshot) -> WorkspaceView {
        WorkspaceView {
            roster: snapshot.workspace.roster(),
            workspace: snapshot.workspace,
            version: snapshot.version,
        }
    }

    /// Add someone to the roster with the default role. Membership
    /// invitations live outside this service; this is the write it ends in.
    pub async fn add_employee(
        &self,
        workspace_id: &str,
        identity: &Identity,
        employee: Employee,
    ) -> Result<Employee, AppError> {
        self.update(workspace_id, identity, |workspace, actor| {
            actor.requires(Permission::ManageEmployees)?;

            if employee.user_id.trim().is_empty() || employee.name.trim().is_empty() {
                return Err(AppError::BadRequest(
                    "Employee id and name are required".to_string(),
                ));
            }
            if workspace.is_member(&employee.user_id) {
                return Err(AppError::Conflict(format!(
                    "{} is already a member",
                    employee.name
                )));
            }

            let role_id = if workspace.role(&employee.role_id).is_some() {
                employee.role_id.clone()
            } else {
                DEFAULT_ROLE_ID.to_string()
            };
            actor.requires_outranks(workspace, &role_id)?;

            let employee = Employee {
                role_id,
                color: Employee::color_for(&employee.user_id),
                ..employee
            };
            workspace.employees.push(employee.clone());
            Ok(employee)
        })
        .await
    }

    pub async fn assign_role(
        &self,
        workspace_id: &str,
        identity: &Identity,
        user_id: &str,
        input: &AssignRoleInput,
    ) -> Result<Employee, AppError> {
        self.update(workspace_id, identity, |workspace, actor| {
            actor.requires(Permission::ManageEmployees)?;

            if workspace.role(&input.role_id).is_none() {
                return Err(AppError::NotFound(format!("Role {}", input.role_id)));
            }
            if workspace.is_owner(user_id) {
                return Err(AppError::BadRequest(
                    "The owner's role cannot be changed".to_string(),
                ));
            }

            let current_role = workspace
                .employees
                .iter()
                .find(|e| e.user_id == user_id)
                .map(|e| e.role_id.clone())
                .ok_or_else(|| AppError::NotFound(format!("Employee {}", user_id)))?;

            actor.requires_outranks(workspace, &current_role)?;
            actor.requires_outranks(workspace, &input.role_id)?;

            let employee = workspace
                .employees
                .iter_mut()
                .find(|e| e.user_id == user_id)
                .ok_or_else(|| AppError::NotFound(format!("Employee {}", user_id)))?;
            employee.role_id = input.role_id.clone();

            Ok(Employee {
                color: Employee::color_for(&employee.user_id),
                ..employee.clone()
            })
        })
        .await
    }

    pub async fn create_role(
        &self,
        workspace_id: &str,
        identity: &Identity,
        input: &RoleInput,
    ) -> Result<Role, AppError> {
        self.update(workspace_id, identity, |workspace, actor| {
            actor.requires(Permission::ManageRoles)?;
            roles::create_role(workspace, input)
        })
        .await
    }

    pub async fn update_role(
        &self,
        workspace_id: &str,
        identity: &Identity,
        role_id: &str,
        input: &RoleInput,
    ) -> Result<Role, AppError> {
        self.update(workspace_id, identity, |workspace, actor| {
            actor.requires(Permission::ManageRoles)?;
            actor.requires_outranks(workspace, role_id)?;
            roles::update_role(workspace, role_id, input)
        })
        .await
    }

    pub async fn delete_role(
        &self,
        workspace_id: &str,
        identity: &Identity,
        role_id: &str,
    ) -> Result<Role, AppError> {
        self.update(workspace_id, identity, |workspace, actor| {
            actor.requires(Permission::ManageRoles)?;
            actor.requires_outranks(workspace, role_id)?;
            roles::delete_role(workspace, role_id)
        })
        .await
    }

    /// Swap a role with its neighbour. The actor must outrank both.
    pub async fn move_role(
        &self,
        workspace_id: &str,
        identity: &Identity,
        role_id: &str,
        up: bool,
    ) -> Result<Vec<Role>, AppError> {
        self.update(workspace_id, identity, |workspace, actor| {
            actor.requires(Permission::ManageRoles)?;
            actor.requires_outranks(workspace, role_id)?;

            let neighbour = workspace.role_index(role_id).and_then(|index| {
                let other = if up { index.checked_sub(1)? } else { index + 1 };
                workspace.roles.get(other).map(|r| r.id.clone())
            });
            if let Some(neighbour) = neighbour {
                actor.requires_outranks(workspace, &neighbour)?;
            }

            if up {
                roles::move_role_up(&mut workspace.roles, role_id)?;
            } else {
                roles::move_role_down(&mut workspace.roles, role_id)?;
            }
            Ok(workspace.roles.clone())
        })
        .await
    }

    /// Push a user's new display name into every workspace they belong to:
    /// roster entry, schedule snapshots and preset patterns. Swap requests
    /// keep the name they were created with.
    ///
    /// Best effort: a workspace that fails to update is logged and counted.
    pub async fn propagate_employee_rename(
        &self,
        identity: &Identity,
        new_name: &str,
    ) -> Result<RenameReport, AppError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }

        let user_id = identity.user_id.as_str();
        let mut report = RenameReport::default();

        for snapshot in self.store.list_for_member(user_id).await? {
            let mut workspace = snapshot.workspace;
            rename_in_workspace(&mut workspace, user_id, new_name);

            match self.store.save(&workspace, snapshot.version).await {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    log::warn!(
                        "Failed to propagate rename of {} into workspace {}: {}",
                        user_id,
                        workspace.id,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        log::info!(
            "Rename of {} propagated to {} workspace(s), {} failed",
            user_id,
            report.updated,
            report.failed
        );
        Ok(report)
    }

    pub async fn subscribe(
        &self,
        workspace_id: &str,
        identity: &Identity,
    ) -> Result<WorkspaceStream, AppError> {
        self.view_as(workspace_id, identity).await?;
        self.store.subscribe(workspace_id).await
    }
}

fn rename_in_workspace(workspace: &mut Workspace, user_id: &str, new_name: &str) {
    if workspace.is_owner(user_id) {
        workspace.owner_name = Some(new_name.to_string());
    }

    for employee in workspace.employees.iter_mut().filter(|e| e.user_id == user_id) {
        employee.name = new_name.to_string();
    }

    for entry in workspace.schedule.iter_mut().filter(|e| e.employee_id == user_id) {
        entry.employee_name = new_name.to_string();
    }

    for preset in workspace.schedule_presets.iter_mut() {
        for pattern in preset.pattern.iter_mut().filter(|p| p.employee_id == user_id) {
            pattern.employee_name = new_name.to_string();
        }
    }
}
