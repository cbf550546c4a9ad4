pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;
pub mod state;

#[cfg(test)]
pub mod testing;

use actix_web::{error::JsonPayloadError, middleware::Logger, web, App, HttpRequest, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

use crate::errors::AppError;
use crate::handlers::{auth, health, orders, otp, products, relay};
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON: {err}")).into()
}

/// Registers every route. Shared by the server and the handler tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/health", web::get().to(health::health))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/orders")
                        .route("", web::post().to(orders::create_order))
                        .route("", web::get().to(orders::list_orders))
                        .route("/{order_number}", web::get().to(orders::get_order))
                        .route(
                            "/{order_number}/status",
                            web::patch().to(orders::update_order_status),
                        ),
                )
                .service(
                    web::scope("/products")
                        .route("", web::get().to(products::list_products))
                        .route("/{id}", web::get().to(products::get_product)),
                )
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/otp")
                        .route("/send", web::post().to(otp::send_otp))
                        .route("/verify", web::post().to(otp::verify_otp)),
                )
                .route("/sms/send", web::post().to(relay::send_sms))
                .route("/whatsapp/send", web::post().to(relay::send_whatsapp))
                .route(
                    "/email/order-confirmation",
                    web::post().to(relay::send_order_email),
                ),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
