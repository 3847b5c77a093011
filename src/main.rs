use chirpy::configuration::{get_configuration, StorageBackend};
use chirpy::startup::run;
use chirpy::store::{PgStore, Storage};
use chirpy::telemetry::init_telemetry;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read configuration");
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let storage = match configuration.application.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on shutdown");
            Storage::in_memory()
        }
        StorageBackend::Postgres => {
            tracing::info!("Attempting to connect to database");

            let pool = PgPoolOptions::new()
                .max_connections(configuration.database.max_connections)
                .connect(configuration.database.connection_string().expose_secret())
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to create connection pool");
                    std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "Database connection error",
                    )
                })?;

            PgStore::migrate(&pool).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run database migrations");
                std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
            })?;

            tracing::info!("Database connection pool created successfully");
            Storage::postgres(pool)
        }
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!(address = %address, "Server listening");

    let server = run(listener, storage, &configuration)?;
    server.await
}
