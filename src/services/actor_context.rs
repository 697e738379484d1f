use serde::Serialize;

use crate::database::models::{Permission, Role, Workspace};
use crate::error::AppError;

/// The authenticated user as seen from one workspace: membership, role and
/// what that role lets them change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    pub user_id: String,
    pub name: String,
    pub is_owner: bool,
    pub role: Option<Role>,
    /// Position of `role` in the workspace's ordered role list.
    pub rank: Option<usize>,
}

impl ActorContext {
    /// Resolve the actor against a workspace. Non-members are rejected.
    pub fn resolve(workspace: &Workspace, user_id: &str, display_name: &str) -> Result<Self, AppError> {
        let member = workspace.member(user_id).ok_or_else(|| {
            AppError::Forbidden(format!("Not a member of workspace {}", workspace.id))
        })?;

        let is_owner = workspace.is_owner(user_id);
        let role = workspace.role(&member.role_id).cloned();
        let rank = workspace.role_index(&member.role_id);
        let name = if member.name.trim().is_empty() {
            display_name.to_string()
        } else {
            member.name
        };

        Ok(Self {
            user_id: user_id.to_string(),
            name,
            is_owner,
            role,
            rank,
        })
    }

    /// Owner, or a role carrying the capability.
    pub fn can_manage(&self, permission: Permission) -> bool {
        self.is_owner
            || self
                .role
                .as_ref()
                .is_some_and(|role| role.has_permission(permission))
    }

    pub fn requires(&self, permission: Permission) -> Result<(), AppError> {
        if self.can_manage(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "{} permission required",
                permission
            )))
        }
    }

    /// Whether the actor sits strictly above `role_id` in the hierarchy.
    /// The owner outranks every role.
    pub fn outranks(&self, workspace: &Workspace, role_id: &str) -> bool {
        if self.is_owner {
            return true;
        }

        match (self.rank, workspace.role_index(role_id)) {
            (Some(own), Some(target)) => own < target,
            _ => false,
        }
    }

    pub fn requires_outranks(&self, workspace: &Workspace, role_id: &str) -> Result<(), AppError> {
        if self.outranks(workspace, role_id) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(
                "Cannot manage a role at or above your own".to_string(),
            ))
        }
    }

    pub fn is_same_user(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
