use chrono::{Datelike, Weekday};
use pretty_assertions::assert_eq;

use rota::AppError;
use rota::database::models::{ApplyPresetInput, PresetInput, ScheduleQuery};

mod common;
use common::{TestContext, identity};

#[actix_web::test]
async fn june_preset_fills_july_mondays() {
    common::setup_test_env();
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    ctx.schedule(&ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;

    let preset = ctx
        .state
        .preset_service
        .save(
            &ws,
            &boss,
            &PresetInput {
                name: "Summer".to_string(),
                month: 6,
                year: 2024,
            },
        )
        .await
        .unwrap();
    assert_eq!(preset.pattern.len(), 1);
    assert_eq!(preset.pattern[0].day_of_week, 1);
    assert_eq!(preset.pattern[0].employee_id, "A");
    assert_eq!(preset.pattern[0].hours, 8.0);
    assert_eq!(preset.created_by, "boss");

    let result = ctx
        .state
        .preset_service
        .apply(
            &ws,
            &boss,
            &preset.id,
            &ApplyPresetInput {
                month: 7,
                year: 2024,
                confirm: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(result.created, 5);
    assert_eq!(result.replaced, 0);

    let july = ctx
        .state
        .schedule_service
        .list(
            &ws,
            &boss,
            &ScheduleQuery {
                month: Some(7),
                year: Some(2024),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let days: Vec<u32> = july.iter().map(|e| e.date.day()).collect();
    assert_eq!(days, vec![1, 8, 15, 22, 29]);
    assert!(july.iter().all(|e| e.date.weekday() == Weekday::Mon));
    assert!(july.iter().all(|e| e.employee_id == "A" && e.hours == 8.0));

    // June is untouched
    let june = ctx
        .state
        .schedule_service
        .list(
            &ws,
            &boss,
            &ScheduleQuery {
                month: Some(6),
                year: Some(2024),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(june.len(), 1);
}

#[actix_web::test]
async fn apply_requires_confirmation_and_overwrites_the_month() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice"), ("B", "Bob")]).await;
    ctx.schedule(&ws, &boss, "A", "2024-06-03", "09:00", "17:00").await;
    let manual = ctx.schedule(&ws, &boss, "B", "2024-07-10", "10:00", "14:00").await;

    let preset = ctx
        .state
        .preset_service
        .save(
            &ws,
            &boss,
            &PresetInput {
                name: "June".to_string(),
                month: 6,
                year: 2024,
            },
        )
        .await
        .unwrap();

    let unconfirmed = ApplyPresetInput {
        month: 7,
        year: 2024,
        confirm: false,
    };
    assert!(matches!(
        ctx.state
            .preset_service
            .apply(&ws, &boss, &preset.id, &unconfirmed)
            .await,
        Err(AppError::BadRequest(_))
    ));
    assert!(ctx.entries(&ws).await.iter().any(|e| e.id == manual.id));

    let confirmed = ApplyPresetInput {
        confirm: true,
        ..unconfirmed
    };
    let first = ctx
        .state
        .preset_service
        .apply(&ws, &boss, &preset.id, &confirmed)
        .await
        .unwrap();
    assert_eq!(first.replaced, 1);
    assert!(!ctx.entries(&ws).await.iter().any(|e| e.id == manual.id));

    let second = ctx
        .state
        .preset_service
        .apply(&ws, &boss, &preset.id, &confirmed)
        .await
        .unwrap();
    assert_eq!(second.replaced, first.created);
    assert_eq!(second.created, first.created);
}

#[actix_web::test]
async fn presets_need_schedule_permission_and_shifts() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let alice = identity("A", "Alice");
    let ws = ctx.seed_workspace(&boss, &[("A", "Alice")]).await;
    let input = PresetInput {
        name: "Empty".to_string(),
        month: 5,
        year: 2024,
    };

    assert!(matches!(
        ctx.state.preset_service.save(&ws, &alice, &input).await,
        Err(AppError::PermissionDenied(_))
    ));
    assert!(matches!(
        ctx.state.preset_service.save(&ws, &boss, &input).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(ctx.state.preset_service.list(&ws, &alice).await.unwrap().is_empty());
}

#[actix_web::test]
async fn presets_can_be_deleted() {
    let ctx = TestContext::new();
    let boss = identity("boss", "Boss");
    let ws = ctx.seed_workspace(&boss, &[]).await;
    ctx.schedule(&ws, &boss, "boss", "2024-06-01", "08:00", "12:00").await;

    let preset = ctx
        .state
        .preset_service
        .save(
            &ws,
            &boss,
            &PresetInput {
                name: "Weekend".to_string(),
                month: 6,
                year: 2024,
            },
        )
        .await
        .unwrap();

    ctx.state.preset_service.delete(&ws, &boss, &preset.id).await.unwrap();
    assert!(ctx.state.preset_service.list(&ws, &boss).await.unwrap().is_empty());
    assert!(matches!(
        ctx.state.preset_service.delete(&ws, &boss, &preset.id).await,
        Err(AppError::NotFound(_))
    ));
}
