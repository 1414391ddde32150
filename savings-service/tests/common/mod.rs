#![allow(dead_code)]

use reqwest::{Client, Response};
use savings_service::config::{CorsConfig, MongoConfig, SavingsConfig, StoreBackend};
use savings_service::services::{InMemorySavingsStore, SavingsStore};
use savings_service::startup::Application;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn SavingsStore>,
    pub client: Client,
}

/// Configuration for a throwaway app on a random port.
pub fn test_config(store: StoreBackend) -> SavingsConfig {
    SavingsConfig {
        common: CoreConfig { port: 0 },
        store,
        mongodb: MongoConfig {
            uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: format!("savings_test_{}", Uuid::new_v4()),
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
    }
}

impl TestApp {
    /// Spawn the app backed by an in-memory store.
    pub async fn spawn() -> Self {
        let store: Arc<dyn SavingsStore> = Arc::new(InMemorySavingsStore::new());
        Self::spawn_with_store(store).await
    }

    pub async fn spawn_with_store(store: Arc<dyn SavingsStore>) -> Self {
        let app = Application::build_with_store(test_config(StoreBackend::Memory), store)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let store = app.store();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a saving through the v2 route and return its JSON.
    pub async fn create(&self, body: Value) -> Value {
        let response = self.post_json("/api/savings/save", &body).await;
        assert_eq!(response.status().as_u16(), 201, "create failed for {}", body);
        response.json().await.expect("Failed to parse JSON")
    }

    pub async fn list(&self, path: &str) -> Vec<Value> {
        let response = self.get(path).await;
        assert_eq!(response.status().as_u16(), 200, "list failed for {}", path);
        response.json().await.expect("Failed to parse JSON")
    }
}

pub fn titles(savings: &[Value]) -> Vec<String> {
    savings
        .iter()
        .map(|s| s["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
