//! Shift swap negotiation.
//!
//! A request starts `pending` and moves exactly once to `accepted`,
//! `declined` or `cancelled`. Status changes go through the store's
//! pending-only `complete`, so a request that already reached a terminal
//! state is never overwritten.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{
    ShiftEntry, ShiftSnapshot, SwapQuery, SwapRequest, SwapRequestInput, SwapStatus,
};
use crate::database::store::SwapRequestStore;
use crate::error::AppError;
use crate::services::actor_context::ActorContext;
use crate::services::auth::Identity;
use crate::services::notifications::{Notifier, PushNotification, swap_payload};
use crate::services::time_utils::format_time_range;
use crate::services::workspace::WorkspaceService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAction {
    Accept,
    Decline,
    Cancel,
}

impl SwapAction {
    fn target_status(self) -> SwapStatus {
        match self {
            SwapAction::Accept => SwapStatus::Accepted,
            SwapAction::Decline => SwapStatus::Declined,
            SwapAction::Cancel => SwapStatus::Cancelled,
        }
    }
}

/// Checks who may perform `action` and returns the request in its new
/// state. Terminal requests reject every action.
pub fn transition(
    swap: &SwapRequest,
    action: SwapAction,
    actor: &ActorContext,
    now: DateTime<Utc>,
) -> Result<SwapRequest, AppError> {
    if swap.status.is_terminal() {
        return Err(AppError::InvalidTransition(swap.status));
    }

    let mut next = swap.clone();
    match action {
        SwapAction::Accept => {
            if swap.is_open_swap {
                if actor.is_same_user(&swap.requester_id) {
                    return Err(AppError::Forbidden(
                        "You cannot accept your own swap request".to_string(),
                    ));
                }
            } else if !swap.is_targeted_at(&actor.user_id) {
                return Err(AppError::Forbidden(
                    "Only the requested employee can accept this swap".to_string(),
                ));
            }
            next.accepted_at = Some(now);
            next.accepted_by = Some(actor.user_id.clone());
        }
        SwapAction::Decline => {
            if swap.is_open_swap {
                return Err(AppError::Forbidden(
                    "Open swaps cannot be declined".to_string(),
                ));
            }
            if !swap.is_targeted_at(&actor.user_id) {
                return Err(AppError::Forbidden(
                    "Only the requested employee can decline this swap".to_string(),
                ));
            }
            next.declined_at = Some(now);
            next.declined_by = Some(actor.user_id.clone());
        }
        SwapAction::Cancel => {
            if !actor.is_same_user(&swap.requester_id) {
                return Err(AppError::Forbidden(
                    "Only the requester can cancel this swap".to_string(),
                ));
            }
            next.cancelled_at = Some(now);
        }
    }

    next.status = action.target_status();
    Ok(next)
}

/// Rewrites the schedule for an accepted swap: a two-way exchange when the
/// counterpart shift is still held by the target, otherwise a one-way pickup
/// by the accepter. The offered shift must still belong to the requester.
/// Leaves the schedule untouched on error.
pub fn apply_swap(
    schedule: &mut [ShiftEntry],
    swap: &SwapRequest,
    accepter: &ActorContext,
) -> Result<(), AppError> {
    let mine = schedule
        .iter()
        .position(|e| e.id == swap.my_shift.id && e.employee_id == swap.requester_id)
        .ok_or_else(|| AppError::NotFound("Original shift not found".to_string()))?;

    let theirs = match (&swap.their_shift, &swap.target_employee_id) {
        (Some(their), Some(target_id)) => schedule
            .iter()
            .position(|e| e.id == their.id && e.employee_id == *target_id),
        _ => None,
    };

    let mut updated = schedule.to_vec();
    match theirs {
        Some(theirs) => {
            let (a_id, a_name) = (
                updated[mine].employee_id.clone(),
                updated[mine].employee_name.clone(),
            );
            updated[mine].employee_id = updated[theirs].employee_id.clone();
            updated[mine].employee_name = updated[theirs].employee_name.clone();
            updated[theirs].employee_id = a_id;
            updated[theirs].employee_name = a_name;
        }
        None => {
            updated[mine].employee_id = accepter.user_id.clone();
            updated[mine].employee_name = accepter.name.clone();
        }
    }

    let touched = [Some(mine), theirs];
    for index in touched.into_iter().flatten() {
        let entry = &updated[index];
        if let Some(other) = updated
            .iter()
            .find(|e| e.id != entry.id && e.date == entry.date && e.employee_id == entry.employee_id)
        {
            return Err(AppError::duplicate_shift(other));
        }
    }

    schedule.clone_from_slice(&updated);
    Ok(())
}

#[derive(Clone)]
pub struct SwapService {
    swaps: Arc<dyn SwapRequestStore>,
    workspaces: WorkspaceService,
    notifier: Notifier,
}

impl SwapService {
    pub fn new(
        swaps: Arc<dyn SwapRequestStore>,
        workspaces: WorkspaceService,
        notifier: Notifier,
    ) -> Self {
        Self {
            swaps,
            workspaces,
            notifier,
        }
    }

    pub async fn create(
        &self,
        workspace_id: &str,
        identity: &Identity,
        input: &SwapRequestInput,
    ) -> Result<SwapRequest, AppError> {
        let (snapshot, actor) = self.workspaces.view_as(workspace_id, identity).await?;
        let workspace = snapshot.workspace;

        let my_shift = workspace
            .entry(&input.my_shift_id)
            .ok_or_else(|| AppError::NotFound(format!("Shift {}", input.my_shift_id)))?;
        if !actor.is_same_user(&my_shift.employee_id) {
            return Err(AppError::PermissionDenied(
                "You can only offer your own shifts".to_string(),
            ));
        }

        let already_offered = self
            .swaps
            .list_for_workspace(workspace_id, Some(SwapStatus::Pending))
            .await?
            .into_iter()
            .any(|swap| swap.my_shift.id == my_shift.id);
        if already_offered {
            return Err(AppError::Conflict(format!(
                "Shift {} already has a pending swap request",
                my_shift.id
            )));
        }

        let target = match input.target_employee_id.as_deref() {
            Some(target_id) => {
                if actor.is_same_user(target_id) {
                    return Err(AppError::BadRequest(
                        "You cannot request a swap with yourself".to_string(),
                    ));
                }
                Some(
                    workspace
                        .member(target_id)
                        .ok_or_else(|| AppError::NotFound(format!("Employee {}", target_id)))?,
                )
            }
            None => None,
        };

        let their_shift = match (input.their_shift_id.as_deref(), &target) {
            (None, _) => None,
            (Some(_), None) => {
                return Err(AppError::BadRequest(
                    "A counter-offer needs a target employee".to_string(),
                ));
            }
            (Some(shift_id), Some(target)) => {
                let entry = workspace
                    .entry(shift_id)
                    .ok_or_else(|| AppError::NotFound(format!("Shift {}", shift_id)))?;
                if entry.employee_id != target.user_id {
                    return Err(AppError::BadRequest(format!(
                        "Shift {} does not belong to {}",
                        shift_id, target.name
                    )));
                }
                Some(ShiftSnapshot::from(entry))
            }
        };

        let swap = SwapRequest {
            id: Uuid::new_v4(),
            workspace_id: workspace.id.clone(),
            workspace_name: workspace.name.clone(),
            requester_id: actor.user_id.clone(),
            requester_name: actor.name.clone(),
            my_shift: ShiftSnapshot::from(my_shift),
            target_employee_id: target.as_ref().map(|t| t.user_id.clone()),
            target_employee_name: target.as_ref().map(|t| t.name.clone()),
            their_shift,
            message: input
                .message
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            status: SwapStatus::Pending,
            is_open_swap: target.is_none(),
            created_at: Utc::now(),
            accepted_at: None,
            accepted_by: None,
            declined_at: None,
            declined_by: None,
            cancelled_at: None,
        };

        self.swaps.insert(&swap).await?;
        log::info!(
            "Swap request {} created by {} in workspace {} ({})",
            swap.id,
            swap.requester_id,
            swap.workspace_id,
            if swap.is_open_swap { "open" } else { "targeted" }
        );

        if let Some(target_id) = &swap.target_employee_id {
            self.notifier
                .notify(PushNotification::new(
                    target_id.clone(),
                    "New shift swap request",
                    format!(
                        "{} wants to swap their {} shift on {} ({})",
                        swap.requester_name,
                        swap.my_shift.shift_name,
                        swap.my_shift.date,
                        format_time_range(&swap.my_shift.start_time, &swap.my_shift.end_time)
                    ),
                    swap_payload("swap_request", &swap.id.to_string(), &swap.workspace_id),
                ))
                .await;
        }

        Ok(swap)
    }

    pub async fn list(
        &self,
        workspace_id: &str,
        identity: &Identity,
        query: &SwapQuery,
    ) -> Result<Vec<SwapRequest>, AppError> {
        let (_, actor) = self.workspaces.view_as(workspace_id, identity).await?;

        if query.open {
            return self.open_swaps_for(workspace_id, &actor).await;
        }
        self.swaps.list_for_workspace(workspace_id, query.status).await
    }

    /// Pending open swaps the actor could pick up.
    pub async fn open_swaps(
        &self,
        workspace_id: &str,
        identity: &Identity,
    ) -> Result<Vec<SwapRequest>, AppError> {
        let (_, actor) = self.workspaces.view_as(workspace_id, identity).await?;
        self.open_swaps_for(workspace_id, &actor).await
    }

    async fn open_swaps_for(
        &self,
        workspace_id: &str,
        actor: &ActorContext,
    ) -> Result<Vec<SwapRequest>, AppError> {
        Ok(self
            .swaps
            .list_for_workspace(workspace_id, Some(SwapStatus::Pending))
            .await?
            .into_iter()
            .filter(|swap| swap.is_open_swap && !actor.is_same_user(&swap.requester_id))
            .collect())
    }

    pub async fn get(&self, swap_id: Uuid, identity: &Identity) -> Result<SwapRequest, AppError> {
        let swap = self.find(swap_id).await?;
        self.workspaces.view_as(&swap.workspace_id, identity).await?;
        Ok(swap)
    }

    async fn find(&self, swap_id: Uuid) -> Result<SwapRequest, AppError> {
        self.swaps
            .find_by_id(swap_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Swap request {}", swap_id)))
    }

    async fn find_pending(&self, swap_id: Uuid) -> Result<SwapRequest, AppError> {
        let swap = self.find(swap_id).await?;
        if swap.status.is_terminal() {
            return Err(AppError::InvalidTransition(swap.status));
        }
        Ok(swap)
    }

    /// Pending-only status write. Losing the race reports the state the
    /// request actually ended up in.
    async fn commit(&self, next: &SwapRequest) -> Result<(), AppError> {
        if self.swaps.complete(next).await? {
            return Ok(());
        }

        let current = self
            .swaps
            .find_by_id(next.id)
            .await?
            .map(|swap| swap.status)
            .unwrap_or(next.status);
        Err(AppError::InvalidTransition(current))
    }

    pub async fn accept(&self, swap_id: Uuid, identity: &Identity) -> Result<SwapRequest, AppError> {
        let swap = self.find_pending(swap_id).await?;
        let (snapshot, actor) = self.workspaces.view_as(&swap.workspace_id, identity).await?;
        let accepted = transition(&swap, SwapAction::Accept, &actor, Utc::now())?;

        let mut workspace = snapshot.workspace;
        apply_swap(&mut workspace.schedule, &swap, &actor)?;

        self.commit(&accepted).await?;

        if let Err(e) = self.workspaces.save(&workspace, snapshot.version).await {
            log::warn!(
                "Schedule write for swap {} failed, reverting to pending: {}",
                swap.id,
                e
            );
            if let Err(revert) = self
                .swaps
                .revert_to_pending(swap.id, SwapStatus::Accepted)
                .await
            {
                log::error!("Failed to revert swap {}: {}", swap.id, revert);
            }
            return Err(e);
        }

        log::info!("Swap request {} accepted by {}", swap.id, actor.user_id);

        let payload = swap_payload("swap_accepted", &swap.id.to_string(), &swap.workspace_id);
        self.notifier
            .notify(PushNotification::new(
                swap.requester_id.clone(),
                "Shift swap accepted",
                format!(
                    "{} accepted your swap for {} on {}",
                    actor.name, swap.my_shift.shift_name, swap.my_shift.date
                ),
                payload.clone(),
            ))
            .await;

        let owner_id = &workspace.owner_id;
        if *owner_id != swap.requester_id && !actor.is_same_user(owner_id) {
            self.notifier
                .notify(PushNotification::new(
                    owner_id.clone(),
                    "Shifts swapped",
                    format!(
                        "{} and {} swapped shifts on {}",
                        swap.requester_name, actor.name, swap.my_shift.date
                    ),
                    payload,
                ))
                .await;
        }

        Ok(accepted)
    }

    pub async fn decline(&self, swap_id: Uuid, identity: &Identity) -> Result<SwapRequest, AppError> {
        let swap = self.find_pending(swap_id).await?;
        let (_, actor) = self.workspaces.view_as(&swap.workspace_id, identity).await?;
        let declined = transition(&swap, SwapAction::Decline, &actor, Utc::now())?;

        self.commit(&declined).await?;
        log::info!("Swap request {} declined by {}", swap.id, actor.user_id);

        self.notifier
            .notify(PushNotification::new(
                swap.requester_id.clone(),
                "Shift swap declined",
                format!(
                    "{} declined your swap for {} on {}",
                    actor.name, swap.my_shift.shift_name, swap.my_shift.date
                ),
                swap_payload("swap_declined", &swap.id.to_string(), &swap.workspace_id),
            ))
            .await;

        Ok(declined)
    }

    pub async fn cancel(&self, swap_id: Uuid, identity: &Identity) -> Result<SwapRequest, AppError> {
        let swap = self.find_pending(swap_id).await?;
        let (_, actor) = self.workspaces.view_as(&swap.workspace_id, identity).await?;
        let cancelled = transition(&swap, SwapAction::Cancel, &actor, Utc::now())?;

        self.commit(&cancelled).await?;
        log::info!("Swap request {} cancelled by {}", swap.id, actor.user_id);
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Employee, Workspace};
    use pretty_assertions::assert_eq;

    fn workspace() -> Workspace {
        let mut ws = Workspace::new("ws".into(), "Cafe".into(), "boss".into(), Some("Boss".into()));
        for id in ["A", "B", "C"] {
            ws.employees.push(Employee {
                user_id: id.into(),
                name: format!("Emp {}", id),
                username: None,
                email: None,
                photo_url: None,
                role_id: "employee".into(),
                color: String::new(),
            });
        }
        ws
    }

    fn entry(id: &str, date: &str, employee_id: &str, start: &str) -> ShiftEntry {
        ShiftEntry {
            id: id.into(),
            date: date.parse().unwrap(),
            employee_id: employee_id.into(),
            employee_name: format!("Emp {}", employee_id),
            shift_id: None,
            shift_name: "Custom".into(),
            start_time: start.into(),
            end_time: "17:00".into(),
            hours: 8.0,
            notes: Vec::new(),
        }
    }

    fn swap(my: &ShiftEntry, target: Option<&str>, theirs: Option<&ShiftEntry>) -> SwapRequest {
        SwapRequest {
            id: Uuid::new_v4(),
            workspace_id: "ws".into(),
            workspace_name: "Cafe".into(),
            requester_id: my.employee_id.clone(),
            requester_name: my.employee_name.clone(),
            my_shift: ShiftSnapshot::from(my),
            target_employee_id: target.map(str::to_string),
            target_employee_name: target.map(|t| format!("Emp {}", t)),
            their_shift: theirs.map(ShiftSnapshot::from),
            message: String::new(),
            status: SwapStatus::Pending,
            is_open_swap: target.is_none(),
            created_at: Utc::now(),
            accepted_at: None,
            accepted_by: None,
            declined_at: None,
            declined_by: None,
            cancelled_at: None,
        }
    }

    fn actor(ws: &Workspace, id: &str) -> ActorContext {
        ActorContext::resolve(ws, id, id).unwrap()
    }

    #[test]
    fn exactly_one_terminal_transition() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let pending = swap(&s1, Some("B"), None);

        let declined = transition(&pending, SwapAction::Decline, &actor(&ws, "B"), Utc::now()).unwrap();
        assert_eq!(declined.status, SwapStatus::Declined);
        assert_eq!(declined.declined_by.as_deref(), Some("B"));

        for (action, who) in [
            (SwapAction::Accept, "B"),
            (SwapAction::Decline, "B"),
            (SwapAction::Cancel, "A"),
        ] {
            assert!(matches!(
                transition(&declined, action, &actor(&ws, who), Utc::now()),
                Err(AppError::InvalidTransition(SwapStatus::Declined))
            ));
        }
    }

    #[test]
    fn only_the_right_actor_may_transition() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let targeted = swap(&s1, Some("B"), None);
        let open = swap(&s1, None, None);

        assert!(transition(&targeted, SwapAction::Accept, &actor(&ws, "C"), Utc::now()).is_err());
        assert!(transition(&targeted, SwapAction::Decline, &actor(&ws, "A"), Utc::now()).is_err());
        assert!(transition(&targeted, SwapAction::Cancel, &actor(&ws, "B"), Utc::now()).is_err());

        assert!(transition(&open, SwapAction::Accept, &actor(&ws, "A"), Utc::now()).is_err());
        assert!(transition(&open, SwapAction::Decline, &actor(&ws, "C"), Utc::now()).is_err());
        let picked = transition(&open, SwapAction::Accept, &actor(&ws, "C"), Utc::now()).unwrap();
        assert_eq!(picked.accepted_by.as_deref(), Some("C"));

        let cancelled = transition(&targeted, SwapAction::Cancel, &actor(&ws, "A"), Utc::now()).unwrap();
        assert_eq!(cancelled.status, SwapStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
    }

    #[test]
    fn two_way_exchange_swaps_only_employee_fields() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let s2 = entry("s2", "2024-06-03", "B", "13:00");
        let mut schedule = vec![s1.clone(), s2.clone()];

        apply_swap(&mut schedule, &swap(&s1, Some("B"), Some(&s2)), &actor(&ws, "B")).unwrap();

        assert_eq!(schedule[0].id, "s1");
        assert_eq!(schedule[0].employee_id, "B");
        assert_eq!(schedule[0].employee_name, "Emp B");
        assert_eq!(schedule[0].start_time, s1.start_time);
        assert_eq!(schedule[1].id, "s2");
        assert_eq!(schedule[1].employee_id, "A");
        assert_eq!(schedule[1].start_time, s2.start_time);
        assert_eq!(schedule[1].hours, s2.hours);
    }

    #[test]
    fn open_pickup_touches_only_my_shift() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let other = entry("s9", "2024-06-04", "B", "09:00");
        let mut schedule = vec![s1.clone(), other.clone()];

        apply_swap(&mut schedule, &swap(&s1, None, None), &actor(&ws, "C")).unwrap();

        assert_eq!(schedule[0].employee_id, "C");
        assert_eq!(schedule[0].employee_name, "Emp C");
        assert_eq!(schedule[1], other);
    }

    #[test]
    fn missing_original_shift_fails_without_changes() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let other = entry("s9", "2024-06-04", "B", "09:00");
        let mut schedule = vec![other.clone()];

        let result = apply_swap(&mut schedule, &swap(&s1, None, None), &actor(&ws, "C"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(schedule, vec![other]);
    }

    #[test]
    fn reassigned_original_shift_is_not_handed_away() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let offer = swap(&s1, Some("B"), None);
        let mut schedule = vec![ShiftEntry {
            employee_id: "C".into(),
            employee_name: "Emp C".into(),
            ..s1.clone()
        }];
        let before = schedule.clone();

        let result = apply_swap(&mut schedule, &offer, &actor(&ws, "B"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(schedule, before);
    }

    #[test]
    fn reassigned_counter_shift_falls_back_to_pickup() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let s2 = entry("s2", "2024-06-04", "B", "13:00");
        let offer = swap(&s1, Some("B"), Some(&s2));
        let moved = ShiftEntry {
            employee_id: "C".into(),
            employee_name: "Emp C".into(),
            ..s2.clone()
        };
        let mut schedule = vec![s1.clone(), moved.clone()];

        apply_swap(&mut schedule, &offer, &actor(&ws, "B")).unwrap();

        assert_eq!(schedule[0].employee_id, "B");
        assert_eq!(schedule[1], moved);
    }

    #[test]
    fn pickup_that_doubles_a_day_is_rejected() {
        let ws = workspace();
        let s1 = entry("s1", "2024-06-03", "A", "09:00");
        let c_same_day = entry("s2", "2024-06-03", "C", "18:00");
        let mut schedule = vec![s1.clone(), c_same_day];

        let result = apply_swap(&mut schedule, &swap(&s1, None, None), &actor(&ws, "C"));
        assert!(matches!(result, Err(AppError::DuplicateShift { .. })));
        assert_eq!(schedule[0].employee_id, "A");
    }
}
