use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use service_core::middleware::body_limit::DEFAULT_MAX_BODY_BYTES;
use std::env;

/// Default Anthropic Messages API endpoint.
const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Default vision-capable model.
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Default output-token budget for a naming request.
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone)]
pub struct NamingConfig {
    pub common: core_config::Config,
    pub anthropic: AnthropicConfig,
    pub limits: LimitConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Secret<String>,
    /// Overridable so tests can point at a local mock server.
    pub api_base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct LimitConfig {
    /// Declared request-body cap enforced by the request guard.
    pub max_body_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Directory the frontend bundle is served from.
    pub static_dir: String,
}

impl NamingConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(NamingConfig {
            common,
            anthropic: AnthropicConfig {
                // Required in every environment: without it the provider can
                // only fail, so startup fails loudly instead.
                api_key: Secret::new(get_env("ANTHROPIC_API_KEY", None, is_prod)?),
                api_base_url: get_env("ANTHROPIC_API_URL", Some(DEFAULT_API_BASE_URL), is_prod)?,
                model: get_env("NAMING_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                max_tokens: get_env(
                    "NAMING_MAX_TOKENS",
                    Some(&DEFAULT_MAX_TOKENS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_TOKENS),
            },
            limits: LimitConfig {
                max_body_bytes: get_env(
                    "NAMING_MAX_BODY_BYTES",
                    Some(&DEFAULT_MAX_BODY_BYTES.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            },
            assets: AssetConfig {
                static_dir: get_env("NAMING_STATIC_DIR", Some("static"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
