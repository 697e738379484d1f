use crate::database::models::{ShiftType, ShiftTypeInput, Workspace};
use crate::error::AppError;
use crate::services::ids::generate_id;
use crate::services::time_utils::{calculate_hours, is_valid_time};

struct ValidShiftType {
    name: String,
    start_time: String,
    end_time: String,
    hours: f64,
}

fn validate(input: &ShiftTypeInput) -> Result<ValidShiftType, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Shift name is required".to_string()));
    }

    let start_time = input.start_time.trim();
    let end_time = input.end_time.trim();
    if !is_valid_time(start_time) || !is_valid_time(end_time) {
        return Err(AppError::BadRequest(
            "Start and end time must be HH:MM".to_string(),
        ));
    }

    let hours = calculate_hours(start_time, end_time);
    if hours <= 0.0 {
        return Err(AppError::BadRequest(
            "Shift must be longer than zero hours".to_string(),
        ));
    }

    Ok(ValidShiftType {
        name: name.to_string(),
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        hours,
    })
}

pub fn create_shift_type(
    workspace: &mut Workspace,
    input: &ShiftTypeInput,
) -> Result<ShiftType, AppError> {
    let valid = validate(input)?;
    let shift_type = ShiftType {
        id: generate_id(),
        name: valid.name,
        start_time: valid.start_time,
        end_time: valid.end_time,
        hours: valid.hours,
    };

    workspace.shifts.push(shift_type.clone());
    Ok(shift_type)
}

/// Scheduled entries keep the values they were created with.
pub fn update_shift_type(
    workspace: &mut Workspace,
    shift_type_id: &str,
    input: &ShiftTypeInput,
) -> Result<ShiftType, AppError> {
    let valid = validate(input)?;
    let shift_type = workspace
        .shifts
        .iter_mut()
        .find(|s| s.id == shift_type_id)
        .ok_or_else(|| AppError::NotFound(format!("Shift type {}", shift_type_id)))?;

    shift_type.name = valid.name;
    shift_type.start_time = valid.start_time;
    shift_type.end_time = valid.end_time;
    shift_type.hours = valid.hours;
    Ok(shift_type.clone())
}

pub fn references(workspace: &Workspace, shift_type_id: &str) -> usize {
    workspace
        .schedule
        .iter()
        .filter(|e| e.shift_id.as_deref() == Some(shift_type_id))
        .count()
}

pub fn delete_shift_type(
    workspace: &mut Workspace,
    shift_type_id: &str,
) -> Result<ShiftType, AppError> {
    let index = workspace
        .shifts
        .iter()
        .position(|s| s.id == shift_type_id)
        .ok_or_else(|| AppError::NotFound(format!("Shift type {}", shift_type_id)))?;

    let in_use = references(workspace, shift_type_id);
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Shift type is used by {} scheduled shift(s)",
            in_use
        )));
    }

    Ok(workspace.shifts.remove(index))
}
