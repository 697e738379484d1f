use actix_web::web;

use crate::handlers::{presets, schedule, stats, swaps, workspaces};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/workspaces")
            .route("", web::post().to(workspaces::create_workspace))
            .route("/{id}", web::get().to(workspaces::get_workspace))
            .route("/{id}/employees", web::post().to(workspaces::add_employee))
            .route(
                "/{id}/employees/{user_id}/role",
                web::put().to(workspaces::assign_role),
            )
            // Schedule
            .route("/{id}/schedule", web::get().to(schedule::get_schedule))
            .route("/{id}/schedule", web::post().to(schedule::add_shift))
            .route("/{id}/schedule/clear", web::post().to(schedule::clear_schedule))
            .route("/{id}/schedule/{entry_id}", web::put().to(schedule::update_shift))
            .route("/{id}/schedule/{entry_id}", web::delete().to(schedule::delete_shift))
            .route("/{id}/schedule/{entry_id}/notes", web::post().to(schedule::add_note))
            .route(
                "/{id}/schedule/{entry_id}/notes/{note_id}",
                web::delete().to(schedule::delete_note),
            )
            // Shift catalog
            .route("/{id}/shift-types", web::post().to(schedule::create_shift_type))
            .route("/{id}/shift-types/{type_id}", web::put().to(schedule::update_shift_type))
            .route(
                "/{id}/shift-types/{type_id}",
                web::delete().to(schedule::delete_shift_type),
            )
            // Roles
            .route("/{id}/roles", web::post().to(workspaces::create_role))
            .route("/{id}/roles/{role_id}", web::put().to(workspaces::update_role))
            .route("/{id}/roles/{role_id}", web::delete().to(workspaces::delete_role))
            .route("/{id}/roles/{role_id}/move-up", web::post().to(workspaces::move_role_up))
            .route(
                "/{id}/roles/{role_id}/move-down",
                web::post().to(workspaces::move_role_down),
            )
            // Presets
            .route("/{id}/presets", web::get().to(presets::get_presets))
            .route("/{id}/presets", web::post().to(presets::save_preset))
            .route("/{id}/presets/{preset_id}", web::delete().to(presets::delete_preset))
            .route("/{id}/presets/{preset_id}/apply", web::post().to(presets::apply_preset))
            // Swaps
            .route("/{id}/swaps", web::get().to(swaps::get_swap_requests))
            .route("/{id}/swaps", web::post().to(swaps::create_swap_request))
            // Stats
            .route("/{id}/stats/hours", web::get().to(stats::get_monthly_hours)),
    );
}
