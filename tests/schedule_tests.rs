use std::time::Duration;

use fake::Fake;
use fake::faker::name::en::Name;
use pretty_assertions::assert_eq;
use tokio_stream::StreamExt;

use rota::AppError;
use rota::database::models::{
    AssignRoleInput, ClearScheduleInput, NoteInput, Permission, RoleInput, ShiftAssignmentInput,
    ShiftEntryInput, ShiftTypeInput,
};

mod common;
use common::{TestContext, custom_shift, date, identity};

#[actix_web::test]
async fn duplicate_assignment_offers_replace_or_abort() {
    common::setup_test_env();
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    let first = ctx.schedule(&ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;

    let clash = custom_shift("A", "2024-06-03", "13:00", "21:00");
    match ctx.state.schedule_service.add(&ws, &boss, &clash).await {
        Err(AppError::DuplicateShift { existing }) => assert_eq!(existing.id, first.id),
        other => panic!("expected duplicate shift, got {:?}", other),
    }
    assert_eq!(ctx.entries(&ws).await.len(), 1);

    let replace = ShiftEntryInput {
        replace_existing: true,
        ..clash
    };
    let replacement = ctx.state.schedule_service.add(&ws, &boss, &replace).await.unwrap();

    let entries = ctx.entries(&ws).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, replacement.id);
    assert_eq!(entries[0].start_time, "13:00");
}

#[actix_web::test]
async fn schedule_changes_need_permission() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let alice = identity("A", "Alice");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;

    let attempt = custom_shift("A", "2024-06-03", "09:00", "17:00");
    assert!(matches!(
        ctx.state.schedule_service.add(&ws, &alice, &attempt).await,
        Err(AppError::PermissionDenied(_))
    ));

    let planner = ctx
        .state
        .workspace_service
        .create_role(
            &ws,
            &boss,
            &RoleInput {
                name: "Planner".to_string(),
                permissions: vec![Permission::ManageSchedule],
            },
        )
        .await
        .unwrap();
    ctx.state
        .workspace_service
        .assign_role(&ws, &boss, "A", &AssignRoleInput { role_id: planner.id })
        .await
        .unwrap();

    ctx.state.schedule_service.add(&ws, &alice, &attempt).await.unwrap();
}

#[actix_web::test]
async fn edit_keeps_date_and_rejects_collisions() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice"), ("B", "Bob")]).await;
    let a = ctx.schedule(&ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;
    ctx.schedule(&ws, &boss, "B", "2024-06-03", "09:00", "17:00").await;

    let to_b = ShiftAssignmentInput {
        employee_id: "B".to_string(),
        shift_id: None,
        shift_name: Some("Late".to_string()),
        start_time: Some("14:00".to_string()),
        end_time: Some("22:00".to_string()),
    };
    assert!(matches!(
        ctx.state.schedule_service.edit(&ws, &boss, &a.id, &to_b).await,
        Err(AppError::DuplicateShift { .. })
    ));

    let later = ShiftAssignmentInput {
        employee_id: "A".to_string(),
        ..to_b
    };
    let edited = ctx.state.schedule_service.edit(&ws, &boss, &a.id, &later).await.unwrap();
    assert_eq!(edited.id, a.id);
    assert_eq!(edited.date, date("2024-06-03"));
    assert_eq!(edited.shift_name, "Late");
    assert_eq!(edited.hours, 8.0);
}

#[actix_web::test]
async fn clear_month_and_notes() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let alice = identity("A", "Alice");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    let june = ctx.schedule(&ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;
    ctx.schedule(&ws, &boss, "A", "2024-07-01", "09:00", "17:00").await;

    let note = ctx
        .state
        .schedule_service
        .add_note(&ws, &alice, &june.id, &NoteInput { text: "Swapping lunch".to_string() })
        .await
        .unwrap();
    assert_eq!(note.author_id, "A");
    ctx.state
        .schedule_service
        .delete_note(&ws, &alice, &june.id, &note.id)
        .await
        .unwrap();

    let out_of_range = ctx
        .state
        .schedule_service
        .clear(&ws, &boss, &ClearScheduleInput { month: Some(13), year: Some(2024) })
        .await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));
    assert_eq!(ctx.entries(&ws).await.len(), 2);

    let cleared = ctx
        .state
        .schedule_service
        .clear(&ws, &boss, &ClearScheduleInput { month: Some(7), year: Some(2024) })
        .await
        .unwrap();
    assert_eq!(cleared.removed, 1);

    let remaining = ctx.entries(&ws).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, june.id);
    assert!(remaining[0].notes.is_empty());

    let all = ctx
        .state
        .schedule_service
        .clear(&ws, &boss, &ClearScheduleInput::default())
        .await
        .unwrap();
    assert_eq!(all.removed, 1);
}

#[actix_web::test]
async fn stale_writes_are_rejected() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    let service = &ctx.state.workspace_service;

    let first_reader = service.load(&ws).await.unwrap();
    let second_reader = service.load(&ws).await.unwrap();

    let mut first = first_reader.workspace.clone();
    first.name = "First".to_string();
    service.save(&first, first_reader.version).await.unwrap();

    let mut second = second_reader.workspace.clone();
    second.name = "Second".to_string();
    assert!(matches!(
        service.save(&second, second_reader.version).await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(service.load(&ws).await.unwrap().workspace.name, "First");
}

#[actix_web::test]
async fn shift_types_in_use_cannot_be_deleted() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    let service = &ctx.state.schedule_service;

    let early = service
        .create_shift_type(
            &ws,
            &boss,
            &ShiftTypeInput {
                name: "Early".to_string(),
                start_time: "06:00".to_string(),
                end_time: "14:00".to_string(),
            },
        )
        .await
        .unwrap();

    let input = ShiftEntryInput {
        date: date("2024-06-03"),
        assignment: ShiftAssignmentInput {
            employee_id: "A".to_string(),
            shift_id: Some(early.id.clone()),
            shift_name: None,
            start_time: None,
            end_time: None,
        },
        replace_existing: false,
    };
    let entry = service.add(&ws, &boss, &input).await.unwrap();
    assert_eq!(entry.shift_name, "Early");
    assert_eq!(entry.hours, 8.0);

    assert!(matches!(
        service.delete_shift_type(&ws, &boss, &early.id).await,
        Err(AppError::Conflict(_))
    ));
    service.delete(&ws, &boss, &entry.id).await.unwrap();
    service.delete_shift_type(&ws, &boss, &early.id).await.unwrap();
}

#[actix_web::test]
async fn rename_propagates_to_roster_and_schedule() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let new_name: String = Name().fake();
    let first_ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    let second_ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    ctx.schedule(&first_ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;

    let report = ctx
        .state
        .workspace_service
        .propagate_employee_rename(&identity("A", "Alice"), &new_name)
        .await
        .unwrap();
    assert_eq!(report.updated, 2);
    assert_eq!(report.failed, 0);

    let view = ctx
        .state
        .workspace_service
        .get(&first_ws, &boss)
        .await
        .unwrap();
    let member = view.roster.iter().find(|e| e.user_id == "A").unwrap();
    assert_eq!(member.name, new_name.trim());
    assert_eq!(view.workspace.schedule[0].employee_name, new_name.trim());
}

#[actix_web::test]
async fn roster_includes_synthesized_owner() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;

    let view = ctx.state.workspace_service.get(&ws, &boss).await.unwrap();
    assert_eq!(view.roster[0].user_id, "boss");
    assert_eq!(view.roster.len(), 2);
    assert!(view.workspace.employees.iter().all(|e| e.user_id != "boss"));
    assert!(view.roster.iter().all(|e| e.color.starts_with('#')));
}

#[actix_web::test]
async fn monthly_hours_needs_analytics() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    ctx.schedule(&ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;
    ctx.schedule(&ws, &boss, "boss", "2024-06-03", "09:00", "13:00").await;

    let hours = ctx
        .state
        .schedule_service
        .monthly_hours(&ws, &boss, 6, 2024)
        .await
        .unwrap();
    assert_eq!(hours[0].employee_id, "A");
    assert_eq!(hours[0].total_hours, 8.0);
    assert_eq!(hours[1].total_hours, 4.0);

    assert!(matches!(
        ctx.state
            .schedule_service
            .monthly_hours(&ws, &identity("A", "Alice"), 6, 2024)
            .await,
        Err(AppError::PermissionDenied(_))
    ));
}

#[actix_web::test]
async fn subscribers_see_saved_snapshots() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;

    let mut updates = ctx.state.workspace_service.subscribe(&ws, &boss).await.unwrap();
    let entry = ctx.schedule(&ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;

    let snapshot = tokio::time::timeout(Duration::from_secs(1), updates.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.schedule.len(), 1);
    assert_eq!(snapshot.schedule[0].id, entry.id);
}
