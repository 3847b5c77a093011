use config::ConfigError;
use secrecy::{ExposeSecret, Secret};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// `dev` unlocks the admin reset endpoint
    pub platform: String,
    pub static_dir: String,
    pub storage: StorageBackend,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> Secret<String> {
        Secret::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database_name
        ))
    }
}

/// Token signing and lifetime settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    pub access_token_expiry: i64,   // seconds (3600 = 1 hour)
    pub refresh_token_expiry: i64,  // seconds (5184000 = 60 days)
}

impl JwtSettings {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_expiry)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_token_expiry)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "jwt token expiries must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load settings from defaults, an optional `configuration` file and
/// `CHIRPY_`-prefixed environment variables (`CHIRPY_JWT__SECRET=...`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080)?
        .set_default("application.platform", "prod")?
        .set_default("application.static_dir", "./public")?
        .set_default("application.storage", "postgres")?
        .set_default("database.max_connections", 5)?
        .set_default("jwt.access_token_expiry", 3600)?
        .set_default("jwt.refresh_token_expiry", 60 * 24 * 60 * 60)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("CHIRPY")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.jwt.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_settings(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: Secret::new(secret.to_string()),
            access_token_expiry: 3600,
            refresh_token_expiry: 5_184_000,
        }
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(jwt_settings("   ").validate().is_err());
        assert!(jwt_settings("a-real-secret").validate().is_ok());
    }

    #[test]
    fn test_non_positive_expiry_is_rejected() {
        let mut settings = jwt_settings("a-real-secret");
        settings.access_token_expiry = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_ttl_conversion() {
        let settings = jwt_settings("a-real-secret");
        assert_eq!(settings.access_token_ttl(), chrono::Duration::hours(1));
        assert_eq!(settings.refresh_token_ttl(), chrono::Duration::days(60));
    }

    #[test]
    fn test_storage_backend_deserializes_lowercase() {
        let backend: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StorageBackend::Memory);
    }
}
