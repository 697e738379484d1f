//! Schedule engine: computes the next shift list from the current one.
//!
//! Every function here is pure. `ScheduleService` wraps them in the
//! workspace read-modify-write cycle and the permission gate.

use chrono::{NaiveDate, Utc};

use crate::database::models::{
    ClearScheduleInput, ClearScheduleResult, NoteInput, Permission, ScheduleQuery, ShiftAssignmentInput,
    ShiftEntry, ShiftEntryInput, ShiftNote, ShiftType, ShiftTypeInput, Workspace,
};
use crate::error::AppError;
use crate::services::actor_context::ActorContext;
use crate::services::auth::Identity;
use crate::services::ids::generate_id;
use crate::services::shift_types;
use crate::services::stats::{EmployeeHours, monthly_hours};
use crate::services::time_utils::{calculate_hours, in_month, is_valid_time, validate_month};
use crate::services::workspace::WorkspaceService;

const CUSTOM_SHIFT_NAME: &str = "Custom";

/// What to do when the employee already has a shift that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    Abort,
    Replace,
}

impl ConflictPolicy {
    pub fn from_replace_flag(replace: bool) -> Self {
        if replace {
            ConflictPolicy::Replace
        } else {
            ConflictPolicy::Abort
        }
    }
}

/// A validated assignment with names snapshotted and hours computed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedShift {
    pub employee_id: String,
    pub employee_name: String,
    pub shift_id: Option<String>,
    pub shift_name: String,
    pub start_time: String,
    pub end_time: String,
    pub hours: f64,
}

impl ResolvedShift {
    fn into_entry(self, id: String, date: NaiveDate) -> ShiftEntry {
        ShiftEntry {
            id,
            date,
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            shift_id: self.shift_id,
            shift_name: self.shift_name,
            start_time: self.start_time,
            end_time: self.end_time,
            hours: self.hours,
            notes: Vec::new(),
        }
    }
}

/// Validate an assignment against the workspace roster and shift catalog.
pub fn resolve_shift(
    workspace: &Workspace,
    input: &ShiftAssignmentInput,
) -> Result<ResolvedShift, AppError> {
    let employee_id = input.employee_id.trim();
    if employee_id.is_empty() {
        return Err(AppError::BadRequest("Select an employee".to_string()));
    }

    let employee = workspace
        .member(employee_id)
        .ok_or_else(|| AppError::NotFound(format!("Employee {}", employee_id)))?;

    let resolved = match input.shift_id.as_deref() {
        Some(shift_id) => {
            let shift_type = workspace
                .shift_type(shift_id)
                .ok_or_else(|| AppError::NotFound(format!("Shift type {}", shift_id)))?;

            ResolvedShift {
                employee_id: employee.user_id,
                employee_name: employee.name,
                shift_id: Some(shift_type.id.clone()),
                shift_name: shift_type.name.clone(),
                start_time: shift_type.start_time.clone(),
                end_time: shift_type.end_time.clone(),
                hours: calculate_hours(&shift_type.start_time, &shift_type.end_time),
            }
        }
        None => {
            let start_time = input.start_time.as_deref().unwrap_or_default().trim();
            let end_time = input.end_time.as_deref().unwrap_or_default().trim();
            if !is_valid_time(start_time) || !is_valid_time(end_time) {
                return Err(AppError::BadRequest(
                    "Custom shifts need a start and end time (HH:MM)".to_string(),
                ));
            }

            let shift_name = input
                .shift_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(CUSTOM_SHIFT_NAME);

            ResolvedShift {
                employee_id: employee.user_id,
                employee_name: employee.name,
                shift_id: None,
                shift_name: shift_name.to_string(),
                start_time: start_time.to_string(),
                end_time: end_time.to_string(),
                hours: calculate_hours(start_time, end_time),
            }
        }
    };

    if resolved.hours <= 0.0 {
        return Err(AppError::BadRequest(
            "Shift must be longer than zero hours".to_string(),
        ));
    }

    Ok(resolved)
}

pub fn find_assignment<'a>(
    schedule: &'a [ShiftEntry],
    date: NaiveDate,
    employee_id: &str,
) -> Option<&'a ShiftEntry> {
    schedule
        .iter()
        .find(|e| e.date == date && e.employee_id == employee_id)
}

/// Insert a new entry, honoring one entry per (date, employee).
pub fn add_shift(
    schedule: &mut Vec<ShiftEntry>,
    date: NaiveDate,
    shift: ResolvedShift,
    policy: ConflictPolicy,
) -> Result<ShiftEntry, AppError> {
    if let Some(existing) = find_assignment(schedule, date, &shift.employee_id) {
        match policy {
            ConflictPolicy::Abort => return Err(AppError::duplicate_shift(existing)),
            ConflictPolicy::Replace => {
                log::debug!(
                    "Replacing shift {} for {} on {}",
                    existing.id,
                    existing.employee_id,
                    date
                );
                let (employee_id, existing_date) = (existing.employee_id.clone(), existing.date);
                schedule.retain(|e| !(e.date == existing_date && e.employee_id == employee_id));
            }
        }
    }

    let entry = shift.into_entry(generate_id(), date);
    schedule.push(entry.clone());
    Ok(entry)
}

/// Edit in place, keeping id, date and notes. The result must not collide
/// with another entry for the same employee and date.
pub fn edit_shift(
    schedule: &mut [ShiftEntry],
    entry_id: &str,
    shift: ResolvedShift,
) -> Result<ShiftEntry, AppError> {
    let index = schedule
        .iter()
        .position(|e| e.id == entry_id)
        .ok_or_else(|| AppError::NotFound(format!("Shift {}", entry_id)))?;

    let date = schedule[index].date;
    if let Some(other) = schedule
        .iter()
        .find(|e| e.id != entry_id && e.date == date && e.employee_id == shift.employee_id)
    {
        return Err(AppError::duplicate_shift(other));
    }

    let entry = &mut schedule[index];
    entry.employee_id = shift.employee_id;
    entry.employee_name = shift.employee_name;
    entry.shift_id = shift.shift_id;
    entry.shift_name = shift.shift_name;
    entry.start_time = shift.start_time;
    entry.end_time = shift.end_time;
    entry.hours = shift.hours;

    Ok(entry.clone())
}

pub fn delete_shift(schedule: &mut Vec<ShiftEntry>, entry_id: &str) -> Result<ShiftEntry, AppError> {
    let index = schedule
        .iter()
        .position(|e| e.id == entry_id)
        .ok_or_else(|| AppError::NotFound(format!("Shift {}", entry_id)))?;

    Ok(schedule.remove(index))
}

/// Filters combine. Month and year only apply together.
pub fn query_schedule(
    schedule: &[ShiftEntry],
    query: &ScheduleQuery,
) -> Result<Vec<ShiftEntry>, AppError> {
    let month = match (query.month, query.year) {
        (Some(month), Some(year)) => {
            validate_month(month)?;
            Some((month, year))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "month and year must be given together".to_string(),
            ));
        }
    };

    let mut entries: Vec<ShiftEntry> = schedule
        .iter()
        .filter(|e| query.date.is_none_or(|date| e.date == date))
        .filter(|e| {
            query
                .employee_id
                .as_deref()
                .is_none_or(|employee_id| e.employee_id == employee_id)
        })
        .filter(|e| month.is_none_or(|(month, year)| in_month(e.date, month, year)))
        .cloned()
        .collect();

    entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.start_time.cmp(&b.start_time)));
    Ok(entries)
}

pub fn clear_month(
    schedule: &mut Vec<ShiftEntry>,
    month: u32,
    year: i32,
) -> Result<usize, AppError> {
    validate_month(month)?;
    let before = schedule.len();
    schedule.retain(|e| !in_month(e.date, month, year));
    Ok(before - schedule.len())
}

pub fn clear_all(schedule: &mut Vec<ShiftEntry>) -> usize {
    let removed = schedule.len();
    schedule.clear();
    removed
}

pub fn add_note(
    schedule: &mut [ShiftEntry],
    entry_id: &str,
    author: &ActorContext,
    text: &str,
) -> Result<ShiftNote, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Note text is required".to_string()));
    }

    let entry = schedule
        .iter_mut()
        .find(|e| e.id == entry_id)
        .ok_or_else(|| AppError::NotFound(format!("Shift {}", entry_id)))?;

    let note = ShiftNote {
        id: generate_id(),
        text: text.to_string(),
        author_id: author.user_id.clone(),
        author_name: author.name.clone(),
        created_at: Utc::now(),
    };
    entry.notes.push(note.clone());
    Ok(note)
}

/// Authors may remove their own notes; schedule managers may remove any.
pub fn delete_note(
    schedule: &mut [ShiftEntry],
    entry_id: &str,
    note_id: &str,
    actor: &ActorContext,
) -> Result<ShiftNote, AppError> {
    let entry = schedule
        .iter_mut()
        .find(|e| e.id == entry_id)
        .ok_or_else(|| AppError::NotFound(format!("Shift {}", entry_id)))?;

    let index = entry
        .notes
        .iter()
        .position(|n| n.id == note_id)
        .ok_or_else(|| AppError::NotFound(format!("Note {}", note_id)))?;

    if !actor.is_same_user(&entry.notes[index].author_id)
        && !actor.can_manage(Permission::ManageSchedule)
    {
        return Err(AppError::PermissionDenied(
            "Only the author can delete this note".to_string(),
        ));
    }

    Ok(entry.notes.remove(index))
}

#[derive(Clone)]
pub struct ScheduleService {
    workspaces: WorkspaceService,
}

impl ScheduleService {
    pub fn new(workspaces: WorkspaceService) -> Self {
        Self { workspaces }
    }

    pub async fn list(
        &self,
        workspace_id: &str,
        identity: &Identity,
        query: &ScheduleQuery,
    ) -> Result<Vec<ShiftEntry>, AppError> {
        let (snapshot, _) = self.workspaces.view_as(workspace_id, identity).await?;
        query_schedule(&snapshot.workspace.schedule, query)
    }

    pub async fn add(
        &self,
        workspace_id: &str,
        identity: &Identity,
        input: &ShiftEntryInput,
    ) -> Result<ShiftEntry, AppError> {
        let entry = self
            .workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageSchedule)?;
                let shift = resolve_shift(workspace, &input.assignment)?;
                add_shift(
                    &mut workspace.schedule,
                    input.date,
                    shift,
                    ConflictPolicy::from_replace_flag(input.replace_existing),
                )
            })
            .await?;

        log::info!(
            "Shift {} scheduled for {} on {}",
            entry.id,
            entry.employee_id,
            entry.date
        );
        Ok(entry)
    }

    pub async fn edit(
        &self,
        workspace_id: &str,
        identity: &Identity,
        entry_id: &str,
        input: &ShiftAssignmentInput,
    ) -> Result<ShiftEntry, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageSchedule)?;
                let shift = resolve_shift(workspace, input)?;
                edit_shift(&mut workspace.schedule, entry_id, shift)
            })
            .await
    }

    pub async fn delete(
        &self,
        workspace_id: &str,
        identity: &Identity,
        entry_id: &str,
    ) -> Result<ShiftEntry, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageSchedule)?;
                delete_shift(&mut workspace.schedule, entry_id)
            })
            .await
    }

    pub async fn clear(
        &self,
        workspace_id: &str,
        identity: &Identity,
        input: &ClearScheduleInput,
    ) -> Result<ClearScheduleResult, AppError> {
        let removed = self
            .workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageSchedule)?;
                match (input.month, input.year) {
                    (Some(month), Some(year)) => clear_month(&mut workspace.schedule, month, year),
                    (None, None) => Ok(clear_all(&mut workspace.schedule)),
                    _ => Err(AppError::BadRequest(
                        "month and year must be given together".to_string(),
                    )),
                }
            })
            .await?;

        log::info!("Cleared {} shift(s) from workspace {}", removed, workspace_id);
        Ok(ClearScheduleResult { removed })
    }

    /// Any member may annotate a shift.
    pub async fn add_note(
        &self,
        workspace_id: &str,
        identity: &Identity,
        entry_id: &str,
        input: &NoteInput,
    ) -> Result<ShiftNote, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                add_note(&mut workspace.schedule, entry_id, actor, &input.text)
            })
            .await
    }

    pub async fn delete_note(
        &self,
        workspace_id: &str,
        identity: &Identity,
        entry_id: &str,
        note_id: &str,
    ) -> Result<ShiftNote, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                delete_note(&mut workspace.schedule, entry_id, note_id, actor)
            })
            .await
    }

    pub async fn create_shift_type(
        &self,
        workspace_id: &str,
        identity: &Identity,
        input: &ShiftTypeInput,
    ) -> Result<ShiftType, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageShifts)?;
                shift_types::create_shift_type(workspace, input)
            })
            .await
    }

    pub async fn update_shift_type(
        &self,
        workspace_id: &str,
        identity: &Identity,
        shift_type_id: &str,
        input: &ShiftTypeInput,
    ) -> Result<ShiftType, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageShifts)?;
                shift_types::update_shift_type(workspace, shift_type_id, input)
            })
            .await
    }

    pub async fn delete_shift_type(
        &self,
        workspace_id: &str,
        identity: &Identity,
        shift_type_id: &str,
    ) -> Result<ShiftType, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageShifts)?;
                shift_types::delete_shift_type(workspace, shift_type_id)
            })
            .await
    }

    pub async fn monthly_hours(
        &self,
        workspace_id: &str,
        identity: &Identity,
        month: u32,
        year: i32,
    ) -> Result<Vec<EmployeeHours>, AppError> {
        let (snapshot, actor) = self.workspaces.view_as(workspace_id, identity).await?;
        actor.requires(Permission::Analytics)?;
        monthly_hours(&snapshot.workspace, month, year)
    }
}
