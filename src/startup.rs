use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::admin_state::AdminState;
use crate::auth::RefreshTokenManager;
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::middleware::{HitCounter, RequestLogger};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login,
    metrics, polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::{ChirpStore, Storage, UserStore};

/// Malformed or mistyped JSON bodies become 400s with the usual error body
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(ValidationError::MalformedBody(err.to_string())).into()
    })
}

pub fn run(
    listener: TcpListener,
    storage: Storage,
    settings: &Settings,
) -> Result<Server, std::io::Error> {
    let users: web::Data<dyn UserStore> = web::Data::from(storage.users);
    let chirps: web::Data<dyn ChirpStore> = web::Data::from(storage.chirps);
    let refresh_tokens = web::Data::new(RefreshTokenManager::new(
        storage.refresh_tokens,
        settings.jwt.refresh_token_ttl(),
    ));
    let jwt_config = web::Data::new(settings.jwt.clone());
    let admin_state = web::Data::new(AdminState::new(settings.application.platform.clone()));
    let static_dir = settings.application.static_dir.clone();

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(HitCounter::new("/app", admin_state.clone()))
            .wrap(RequestLogger)

            // Shared state
            .app_data(json_config())
            .app_data(users.clone())
            .app_data(chirps.clone())
            .app_data(refresh_tokens.clone())
            .app_data(jwt_config.clone())
            .app_data(admin_state.clone())

            .route("/api/healthz", web::get().to(health_check))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(web::put().to(update_user)),
            )
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            .service(
                web::resource("/api/chirps")
                    .route(web::post().to(create_chirp))
                    .route(web::get().to(list_chirps)),
            )
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .route(web::get().to(get_chirp))
                    .route(web::delete().to(delete_chirp)),
            )
            .route("/api/polka/webhooks", web::post().to(polka_webhook))

            // Static file serving (must be last to not override API routes)
            .service(fs::Files::new("/app", static_dir.as_str()).index_file("index.html"))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
