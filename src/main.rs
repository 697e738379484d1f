use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;

use rota::database::init_database;
use rota::database::repositories::{
    PushTokenRepository, SwapRequestRepository, WorkspaceRepository,
};
use rota::middleware::RequestId;
use rota::services::{ExpoPushDispatcher, Notifier};
use rota::{AppState, Config, routes};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let workspaces = Arc::new(WorkspaceRepository::new(pool.clone()));
    let swaps = Arc::new(SwapRequestRepository::new(pool.clone()));

    let notifier = match &config.push_endpoint {
        Some(endpoint) => {
            let dispatcher = ExpoPushDispatcher::new(
                endpoint.clone(),
                Arc::new(PushTokenRepository::new(pool.clone())),
                Duration::from_secs(config.push_token_cache_ttl_secs),
            )?;
            log::info!("Push notifications go to {}", endpoint);
            Notifier::new(Arc::new(dispatcher))
        }
        None => {
            log::info!("PUSH_ENDPOINT not set; notifications are only logged");
            Notifier::log_only()
        }
    };

    let app_state = web::Data::new(AppState::new(workspaces, swaps, notifier));
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_base_url)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .expose_headers(vec!["X-Correlation-ID"])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
