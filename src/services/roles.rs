//! Ordered role list operations. Index encodes authority (0 is highest) and
//! index 0 always holds the Owner role with every permission.

use crate::database::models::{Permission, Role, RoleInput, Workspace};
use crate::error::AppError;
use crate::services::ids::generate_id;

/// Re-assert the Owner role invariant on a freshly loaded role list.
/// Returns `true` when the list had to be changed.
pub fn normalize_roles(roles: &mut Vec<Role>) -> bool {
    let mut changed = false;

    match roles.iter().position(Role::is_owner_role) {
        Some(0) => {}
        Some(index) => {
            let owner = roles.remove(index);
            roles.insert(0, owner);
            changed = true;
        }
        None => {
            roles.insert(0, Role::owner());
            changed = true;
        }
    }

    let owner = &mut roles[0];
    if Permission::ALL.iter().any(|p| !owner.has_permission(*p)) {
        owner.permissions = Permission::ALL.to_vec();
        changed = true;
    }

    if changed {
        log::debug!("Owner role re-asserted at the top of the role list");
    }
    changed
}

fn validated_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Role name is required".to_string()));
    }
    Ok(name.to_string())
}

fn dedup_permissions(permissions: &[Permission]) -> Vec<Permission> {
    let mut unique = Vec::with_capacity(permissions.len());
    for permission in permissions {
        if !unique.contains(permission) {
            unique.push(*permission);
        }
    }
    unique
}

/// New roles start at the bottom of the hierarchy.
pub fn create_role(workspace: &mut Workspace, input: &RoleInput) -> Result<Role, AppError> {
    let role = Role {
        id: generate_id(),
        name: validated_name(&input.name)?,
        permissions: dedup_permissions(&input.permissions),
    };

    workspace.roles.push(role.clone());
    Ok(role)
}

pub fn update_role(
    workspace: &mut Workspace,
    role_id: &str,
    input: &RoleInput,
) -> Result<Role, AppError> {
    let name = validated_name(&input.name)?;
    let role = workspace
        .roles
        .iter_mut()
        .find(|r| r.id == role_id)
        .ok_or_else(|| AppError::NotFound(format!("Role {}", role_id)))?;

    if role.is_owner_role() {
        return Err(AppError::BadRequest(
            "The Owner role cannot be modified".to_string(),
        ));
    }

    role.name = name;
    role.permissions = dedup_permissions(&input.permissions);
    Ok(role.clone())
}

/// Rejected while any employee still holds the role.
pub fn delete_role(workspace: &mut Workspace, role_id: &str) -> Result<Role, AppError> {
    let index = workspace
        .role_index(role_id)
        .ok_or_else(|| AppError::NotFound(format!("Role {}", role_id)))?;

    if workspace.roles[index].is_owner_role() {
        return Err(AppError::BadRequest(
            "The Owner role cannot be deleted".to_string(),
        ));
    }

    let holders = workspace
        .employees
        .iter()
        .filter(|e| e.role_id == role_id)
        .count();
    if holders > 0 {
        return Err(AppError::Conflict(format!(
            "Role is assigned to {} employee(s)",
            holders
        )));
    }

    Ok(workspace.roles.remove(index))
}

pub fn move_role_up(roles: &mut [Role], role_id: &str) -> Result<(), AppError> {
    let index = movable_index(roles, role_id)?;
    if index <= 1 {
        return Err(AppError::BadRequest(
            "Role is already directly below the Owner".to_string(),
        ));
    }

    roles.swap(index, index - 1);
    Ok(())
}

pub fn move_role_down(roles: &mut [Role], role_id: &str) -> Result<(), AppError> {
    let index = movable_index(roles, role_id)?;
    if index + 1 >= roles.len() {
        return Err(AppError::BadRequest(
            "Role is already at the bottom".to_string(),
        ));
    }

    roles.swap(index, index + 1);
    Ok(())
}

fn movable_index(roles: &[Role], role_id: &str) -> Result<usize, AppError> {
    let index = roles
        .iter()
        .position(|r| r.id == role_id)
        .ok_or_else(|| AppError::NotFound(format!("Role {}", role_id)))?;

    if roles[index].is_owner_role() {
        return Err(AppError::BadRequest(
            "The Owner role cannot be moved".to_string(),
        ));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Employee, OWNER_ROLE_ID};
    use pretty_assertions::assert_eq;

    fn role(id: &str) -> Role {
        Role {
            id: id.to_string(),
            name: id.to_string(),
            permissions: Vec::new(),
        }
    }

    fn ids(roles: &[Role]) -> Vec<&str> {
        roles.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn normalize_inserts_missing_owner() {
        let mut roles = vec![role("staff")];
        assert!(normalize_roles(&mut roles));
        assert_eq!(ids(&roles), vec![OWNER_ROLE_ID, "staff"]);
        assert_eq!(roles[0].permissions.len(), Permission::ALL.len());
    }

    #[test]
    fn normalize_moves_owner_to_top_and_restores_permissions() {
        let mut roles = vec![role("staff"), role(OWNER_ROLE_ID)];
        assert!(normalize_roles(&mut roles));
        assert_eq!(ids(&roles), vec![OWNER_ROLE_ID, "staff"]);
        assert!(roles[0].has_permission(Permission::ManageRoles));

        assert!(!normalize_roles(&mut roles));
    }

    #[test]
    fn moves_swap_adjacent_roles() {
        let mut roles = vec![Role::owner(), role("a"), role("b"), role("c")];

        move_role_up(&mut roles, "c").unwrap();
        assert_eq!(ids(&roles), vec![OWNER_ROLE_ID, "a", "c", "b"]);

        move_role_down(&mut roles, "a").unwrap();
        assert_eq!(ids(&roles), vec![OWNER_ROLE_ID, "c", "a", "b"]);
    }

    #[test]
    fn owner_is_immovable() {
        let mut roles = vec![Role::owner(), role("a"), role("b")];

        assert!(move_role_up(&mut roles, "a").is_err());
        assert!(move_role_down(&mut roles, OWNER_ROLE_ID).is_err());
        assert!(move_role_up(&mut roles, OWNER_ROLE_ID).is_err());
        assert!(move_role_down(&mut roles, "b").is_err());
        assert_eq!(ids(&roles), vec![OWNER_ROLE_ID, "a", "b"]);
    }

    #[test]
    fn delete_rejects_referenced_role() {
        let mut ws = Workspace::new("ws".into(), "W".into(), "o".into(), None);
        ws.employees.push(Employee {
            user_id: "u".to_string(),
            name: "U".to_string(),
            username: None,
            email: None,
            photo_url: None,
            role_id: "employee".to_string(),
            color: String::new(),
        });

        assert!(matches!(
            delete_role(&mut ws, "employee"),
            Err(AppError::Conflict(_))
        ));

        ws.employees.clear();
        let removed = delete_role(&mut ws, "employee").unwrap();
        assert_eq!(removed.id, "employee");
        assert!(delete_role(&mut ws, OWNER_ROLE_ID).is_err());
    }

    #[test]
    fn create_role_validates_and_dedups() {
        let mut ws = Workspace::new("ws".into(), "W".into(), "o".into(), None);

        let blank = RoleInput {
            name: "  ".to_string(),
            permissions: Vec::new(),
        };
        assert!(create_role(&mut ws, &blank).is_err());

        let input = RoleInput {
            name: "Lead".to_string(),
            permissions: vec![Permission::Analytics, Permission::Analytics],
        };
        let created = create_role(&mut ws, &input).unwrap();
        assert_eq!(created.permissions, vec![Permission::Analytics]);
        assert_eq!(ws.roles.last().map(|r| r.id.clone()), Some(created.id));
    }
}
