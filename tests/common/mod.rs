#![allow(dead_code)]

use std::net::TcpListener;

use chirpy::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, Settings, StorageBackend,
};
use chirpy::startup::run;
use chirpy::store::Storage;
use secrecy::Secret;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: Secret::new("password".to_string()),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "chirpy".to_string(),
            max_connections: 5,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_dir: "./public".to_string(),
            storage: StorageBackend::Memory,
        },
        jwt: JwtSettings {
            secret: Secret::new(JWT_SECRET.to_string()),
            access_token_expiry: 3600,
            refresh_token_expiry: 5_184_000,
        },
    }
}

/// Start a server on a random port with fresh in-memory storage
pub fn spawn_app_on(platform: &str) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let settings = test_settings(platform);
    let server =
        run(listener, Storage::in_memory(), &settings).expect("Failed to create server");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_on("dev")
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/api/users", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/api/login", &json!({ "email": email, "password": password }))
            .await
    }

    /// Register and log in, returning the login response body
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        assert_eq!(201, self.register(email, password).await.status().as_u16());

        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }
}

pub fn str_field<'a>(body: &'a Value, field: &str) -> &'a str {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field `{}` in {}", field, body))
}
