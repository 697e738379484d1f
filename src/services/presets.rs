//! Weekly patterns extracted from a month of schedule and replayed onto
//! another month.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};

use crate::database::models::{
    ApplyPresetInput, ApplyPresetResult, Permission, PatternEntry, PresetInput, SchedulePreset,
    ShiftEntry, Workspace,
};
use crate::error::AppError;
use crate::services::auth::Identity;
use crate::services::ids::{generate_batch_id, generate_id};
use crate::services::time_utils::{day_of_week, days_in_month, in_month};
use crate::services::workspace::WorkspaceService;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ShiftKey {
    Catalog(String),
    Custom,
}

/// One recurrence per employee, weekday and distinct shift definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternKey {
    day_of_week: u8,
    employee_id: String,
    shift: ShiftKey,
    hours_centi: i64,
}

impl PatternKey {
    fn new(day_of_week: u8, employee_id: &str, shift_id: Option<&str>, hours: f64) -> Self {
        Self {
            day_of_week,
            employee_id: employee_id.to_string(),
            shift: match shift_id {
                Some(id) => ShiftKey::Catalog(id.to_string()),
                None => ShiftKey::Custom,
            },
            hours_centi: (hours * 100.0).round() as i64,
        }
    }
}

/// Collapse a month of entries into a weekday pattern. The first entry seen
/// for each key wins.
pub fn month_to_pattern(
    schedule: &[ShiftEntry],
    month: u32,
    year: i32,
) -> Result<Vec<PatternEntry>, AppError> {
    let mut seen = HashSet::new();
    let mut pattern = Vec::new();

    for entry in schedule.iter().filter(|e| in_month(e.date, month, year)) {
        let dow = day_of_week(entry.date);
        let key = PatternKey::new(dow, &entry.employee_id, entry.shift_id.as_deref(), entry.hours);
        if !seen.insert(key) {
            continue;
        }

        pattern.push(PatternEntry {
            day_of_week: dow,
            employee_id: entry.employee_id.clone(),
            employee_name: entry.employee_name.clone(),
            shift_id: entry.shift_id.clone(),
            shift_name: entry.shift_name.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            hours: entry.hours,
        });
    }

    if pattern.is_empty() {
        return Err(AppError::BadRequest(format!(
            "No shifts scheduled in {}/{} to build a preset from",
            month, year
        )));
    }

    log::debug!(
        "Extracted {} pattern entries from {}/{}",
        pattern.len(),
        month,
        year
    );
    Ok(pattern)
}

/// Expand a pattern over every day of the target month. An employee gets at
/// most one shift per day; the first matching pattern entry wins.
pub fn replay_pattern(
    workspace: &Workspace,
    pattern: &[PatternEntry],
    month: u32,
    year: i32,
) -> Result<Vec<ShiftEntry>, AppError> {
    let mut taken: HashSet<(NaiveDate, String)> = HashSet::new();
    let mut entries = Vec::new();

    for day in days_in_month(month, year)? {
        let dow = day_of_week(day);
        for item in pattern.iter().filter(|p| p.day_of_week == dow) {
            if !taken.insert((day, item.employee_id.clone())) {
                continue;
            }

            let catalog = item
                .shift_id
                .as_deref()
                .and_then(|id| workspace.shift_type(id));
            let start_time = match (&item.start_time, catalog) {
                (time, Some(shift)) if time.is_empty() => shift.start_time.clone(),
                (time, _) => time.clone(),
            };
            let end_time = match (&item.end_time, catalog) {
                (time, Some(shift)) if time.is_empty() => shift.end_time.clone(),
                (time, _) => time.clone(),
            };

            entries.push(ShiftEntry {
                id: generate_batch_id(entries.len()),
                date: day,
                employee_id: item.employee_id.clone(),
                employee_name: item.employee_name.clone(),
                shift_id: item.shift_id.clone(),
                shift_name: item.shift_name.clone(),
                start_time,
                end_time,
                hours: item.hours,
                notes: Vec::new(),
            });
        }
    }

    if entries.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Preset produces no shifts for {}/{}",
            month, year
        )));
    }

    Ok(entries)
}

/// Drop every entry of the month, then append the replayed ones. Returns how
/// many entries were removed.
pub fn replace_month(
    schedule: &mut Vec<ShiftEntry>,
    month: u32,
    year: i32,
    replayed: Vec<ShiftEntry>,
) -> usize {
    let before = schedule.len();
    schedule.retain(|e| !in_month(e.date, month, year));
    let replaced = before - schedule.len();
    schedule.extend(replayed);
    replaced
}

#[derive(Clone)]
pub struct PresetService {
    workspaces: WorkspaceService,
}

impl PresetService {
    pub fn new(workspaces: WorkspaceService) -> Self {
        Self { workspaces }
    }

    pub async fn list(
        &self,
        workspace_id: &str,
        identity: &Identity,
    ) -> Result<Vec<SchedulePreset>, AppError> {
        let (snapshot, _) = self.workspaces.view_as(workspace_id, identity).await?;
        Ok(snapshot.workspace.schedule_presets)
    }

    pub async fn save(
        &self,
        workspace_id: &str,
        identity: &Identity,
        input: &PresetInput,
    ) -> Result<SchedulePreset, AppError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Preset name is required".to_string()));
        }

        let preset = self
            .workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageSchedule)?;
                let pattern = month_to_pattern(&workspace.schedule, input.month, input.year)?;

                let preset = SchedulePreset {
                    id: generate_id(),
                    name: name.to_string(),
                    pattern,
                    created_at: Utc::now(),
                    created_by: actor.user_id.clone(),
                };
                workspace.schedule_presets.push(preset.clone());
                Ok(preset)
            })
            .await?;

        log::info!(
            "Preset {} saved in workspace {} with {} entries",
            preset.id,
            workspace_id,
            preset.pattern.len()
        );
        Ok(preset)
    }

    pub async fn delete(
        &self,
        workspace_id: &str,
        identity: &Identity,
        preset_id: &str,
    ) -> Result<SchedulePreset, AppError> {
        self.workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageSchedule)?;
                let index = workspace
                    .schedule_presets
                    .iter()
                    .position(|p| p.id == preset_id)
                    .ok_or_else(|| AppError::NotFound(format!("Preset {}", preset_id)))?;
                Ok(workspace.schedule_presets.remove(index))
            })
            .await
    }

    /// Overwrites the whole target month. Requires `confirm`.
    pub async fn apply(
        &self,
        workspace_id: &str,
        identity: &Identity,
        preset_id: &str,
        input: &ApplyPresetInput,
    ) -> Result<ApplyPresetResult, AppError> {
        if !input.confirm {
            return Err(AppError::BadRequest(
                "Applying a preset replaces the whole month; set confirm to proceed".to_string(),
            ));
        }

        let result = self
            .workspaces
            .update(workspace_id, identity, |workspace, actor| {
                actor.requires(Permission::ManageSchedule)?;
                let preset = workspace
                    .schedule_presets
                    .iter()
                    .find(|p| p.id == preset_id)
                    .ok_or_else(|| AppError::NotFound(format!("Preset {}", preset_id)))?;

                let replayed = replay_pattern(workspace, &preset.pattern, input.month, input.year)?;
                let created = replayed.len();
                let replaced =
                    replace_month(&mut workspace.schedule, input.month, input.year, replayed);
                Ok(ApplyPresetResult { replaced, created })
            })
            .await?;

        log::info!(
            "Preset {} applied to {}/{} in workspace {}: {} replaced, {} created",
            preset_id,
            input.month,
            input.year,
            workspace_id,
            result.replaced,
            result.created
        );
        Ok(result)
    }
}
