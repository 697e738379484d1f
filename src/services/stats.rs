use std::collections::HashMap;

use serde::Serialize;

use crate::database::models::Workspace;
use crate::error::AppError;
use crate::services::time_utils::{in_month, round_hours, validate_month};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHours {
    pub employee_id: String,
    pub employee_name: String,
    pub color: String,
    pub shift_count: usize,
    pub total_hours: f64,
}

/// Hours worked per roster member in a 1-based month, busiest first.
/// Members without shifts are listed with zero.
pub fn monthly_hours(
    workspace: &Workspace,
    month: u32,
    year: i32,
) -> Result<Vec<EmployeeHours>, AppError> {
    validate_month(month)?;

    let mut totals: HashMap<&str, (usize, f64)> = HashMap::new();
    for entry in workspace
        .schedule
        .iter()
        .filter(|e| in_month(e.date, month, year))
    {
        let total = totals.entry(entry.employee_id.as_str()).or_default();
        total.0 += 1;
        total.1 += entry.hours;
    }

    let mut hours: Vec<EmployeeHours> = workspace
        .roster()
        .into_iter()
        .map(|employee| {
            let (shift_count, total) = totals
                .get(employee.user_id.as_str())
                .copied()
                .unwrap_or_default();
            EmployeeHours {
                employee_id: employee.user_id,
                employee_name: employee.name,
                color: employee.color,
                shift_count,
                total_hours: round_hours(total),
            }
        })
        .collect();

    hours.sort_by(|a, b| {
        b.total_hours
            .total_cmp(&a.total_hours)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });
    Ok(hours)
}
