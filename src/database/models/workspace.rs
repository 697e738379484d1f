use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::macros::string_enum;
use crate::database::models::{SchedulePreset, ShiftEntry, ShiftType};

/// Fixed id of the role pinned at index 0 of every workspace's role list.
pub const OWNER_ROLE_ID: &str = "owner";
/// Role given to employees that join without an explicit role.
pub const DEFAULT_ROLE_ID: &str = "employee";

const OWNER_FALLBACK_NAME: &str = "Owner";

const EMPLOYEE_COLORS: [&str; 12] = [
    "#E57373", "#F06292", "#BA68C8", "#9575CD", "#7986CB", "#64B5F6", "#4FC3F7", "#4DB6AC",
    "#81C784", "#DCE775", "#FFB74D", "#A1887F",
];

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    pub enum Permission {
        ManageEmployees => "manage_employees",
        ManageRoles => "manage_roles",
        ManageShifts => "manage_shifts",
        ManageSchedule => "manage_schedule",
        Analytics => "analytics",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn owner() -> Self {
        Self {
            id: OWNER_ROLE_ID.to_string(),
            name: "Owner".to_string(),
            permissions: Permission::ALL.to_vec(),
        }
    }

    pub fn employee() -> Self {
        Self {
            id: DEFAULT_ROLE_ID.to_string(),
            name: "Employee".to_string(),
            permissions: Vec::new(),
        }
    }

    pub fn is_owner_role(&self) -> bool {
        self.id == OWNER_ROLE_ID
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Unknown or empty ids fall back to the default role when added.
    #[serde(default)]
    pub role_id: String,
    /// Display color, always re-derived from `user_id` on read.
    #[serde(default)]
    pub color: String,
}

impl Employee {
    /// Stable display color for a user id (same id, same color, every client).
    pub fn color_for(user_id: &str) -> String {
        let hash = user_id.chars().fold(0i32, |hash, c| {
            (c as u32 as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
        });
        let index = hash.unsigned_abs() as usize % EMPLOYEE_COLORS.len();
        EMPLOYEE_COLORS[index].to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    /// Display name captured when the workspace was created; used for the
    /// synthesized owner member.
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub shifts: Vec<ShiftType>,
    #[serde(default)]
    pub schedule: Vec<ShiftEntry>,
    #[serde(default)]
    pub schedule_presets: Vec<SchedulePreset>,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(id: String, name: String, owner_id: String, owner_name: Option<String>) -> Self {
        Self {
            id,
            name,
            owner_id,
            owner_name,
            employees: Vec::new(),
            roles: vec![Role::owner(), Role::employee()],
            shifts: Vec::new(),
            schedule: Vec::new(),
            schedule_presets: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn role(&self, role_id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == role_id)
    }

    pub fn role_index(&self, role_id: &str) -> Option<usize> {
        self.roles.iter().position(|r| r.id == role_id)
    }

    pub fn shift_type(&self, shift_id: &str) -> Option<&ShiftType> {
        self.shifts.iter().find(|s| s.id == shift_id)
    }

    pub fn entry(&self, entry_id: &str) -> Option<&ShiftEntry> {
        self.schedule.iter().find(|e| e.id == entry_id)
    }

    /// The owner as a member, built on read and never persisted.
    pub fn owner_member(&self) -> Employee {
        Employee {
            user_id: self.owner_id.clone(),
            name: self
                .owner_name
                .clone()
                .unwrap_or_else(|| OWNER_FALLBACK_NAME.to_string()),
            username: None,
            email: None,
            photo_url: None,
            role_id: OWNER_ROLE_ID.to_string(),
            color: Employee::color_for(&self.owner_id),
        }
    }

    /// Every member of the workspace with derived colors. The owner is
    /// prepended when the stored roster does not list them.
    pub fn roster(&self) -> Vec<Employee> {
        let mut roster: Vec<Employee> = self
            .employees
            .iter()
            .map(|e| Employee {
                color: Employee::color_for(&e.user_id),
                ..e.clone()
            })
            .collect();

        if !roster.iter().any(|e| e.user_id == self.owner_id) {
            roster.insert(0, self.owner_member());
        }

        roster
    }

    pub fn member(&self, user_id: &str) -> Option<Employee> {
        self.roster().into_iter().find(|e| e.user_id == user_id)
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.is_owner(user_id) || self.employees.iter().any(|e| e.user_id == user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleInput {
    pub role_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInput {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameInput {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn workspace() -> Workspace {
        Workspace::new(
            "ws-1".to_string(),
            "Cafe".to_string(),
            "owner-1".to_string(),
            Some("Olivia".to_string()),
        )
    }

    #[test]
    fn color_is_stable_per_user() {
        assert_eq!(Employee::color_for("user-a"), Employee::color_for("user-a"));
        assert!(EMPLOYEE_COLORS.contains(&Employee::color_for("").as_str()));
    }

    #[test]
    fn roster_synthesizes_missing_owner() {
        let ws = workspace();
        let roster = ws.roster();

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user_id, "owner-1");
        assert_eq!(roster[0].name, "Olivia");
        assert_eq!(roster[0].role_id, OWNER_ROLE_ID);
        assert!(ws.employees.is_empty());
    }

    #[test]
    fn roster_does_not_duplicate_listed_owner() {
        let mut ws = workspace();
        ws.employees.push(Employee {
            user_id: "owner-1".to_string(),
            name: "Olivia P.".to_string(),
            username: None,
            email: None,
            photo_url: None,
            role_id: OWNER_ROLE_ID.to_string(),
            color: String::new(),
        });

        let roster = ws.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "Olivia P.");
        assert_eq!(roster[0].color, Employee::color_for("owner-1"));
    }

    #[test]
    fn permission_round_trips_through_strings() {
        assert_eq!("manage_schedule".parse::<Permission>(), Ok(Permission::ManageSchedule));
        assert_eq!(Permission::Analytics.to_string(), "analytics");
        assert!("fly".parse::<Permission>().is_err());
    }
}
