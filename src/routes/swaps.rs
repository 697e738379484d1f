use actix_web::web;

use crate::handlers::swaps;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/swaps")
            .route("/{id}", web::get().to(swaps::get_swap_request))
            .route("/{id}/accept", web::post().to(swaps::accept_swap_request))
            .route("/{id}/decline", web::post().to(swaps::decline_swap_request))
            .route("/{id}/cancel", web::post().to(swaps::cancel_swap_request)),
    );
}
