use actix_web::web;

use crate::handlers::{me, schedule};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/me").route("/name", web::put().to(me::update_name)))
        .route("/time-options", web::get().to(schedule::time_options));
}
