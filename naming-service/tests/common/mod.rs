use naming_service::config::{AnthropicConfig, AssetConfig, LimitConfig, NamingConfig};
use naming_service::startup::Application;
use secrecy::Secret;
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-api-key";

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the service on a random port, pointed at the given provider URL
    /// (usually a wiremock server).
    pub async fn spawn(provider_url: &str) -> Self {
        let config = NamingConfig {
            common: service_core::config::Config { port: 0 },
            anthropic: AnthropicConfig {
                api_key: Secret::new(TEST_API_KEY.to_string()),
                api_base_url: provider_url.trim_end_matches('/').to_string(),
                model: "claude-3-5-sonnet-20241022".to_string(),
                max_tokens: 1024,
            },
            limits: LimitConfig {
                max_body_bytes: 1_048_576,
            },
            assets: AssetConfig {
                static_dir: "static".to_string(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint.
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
        }
    }
}
