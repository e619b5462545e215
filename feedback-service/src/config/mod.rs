use axum::http::HeaderValue;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 60;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub cors: CorsConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model used for feedback analysis (e.g., gemini-1.5-flash)
    pub text_model: String,
    /// Per-call upper bound on the provider round trip
    pub analysis_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,
}

impl FeedbackConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the service settings from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let api_key = get("GOOGLE_API_KEY", None)?;
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_API_KEY is set but empty"
            )));
        }

        let timeout_secs = get(
            "ANALYSIS_TIMEOUT_SECS",
            Some(&DEFAULT_ANALYSIS_TIMEOUT_SECS.to_string()),
        )?;
        let timeout_secs: u64 = timeout_secs.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "ANALYSIS_TIMEOUT_SECS must be a positive integer, got '{}': {}",
                timeout_secs,
                e
            ))
        })?;
        if timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ANALYSIS_TIMEOUT_SECS must be greater than zero"
            )));
        }

        let allowed_origins = parse_origins(&get(
            "CORS_ALLOWED_ORIGINS",
            Some(DEFAULT_ALLOWED_ORIGINS),
        )?)?;

        Ok(FeedbackConfig {
            common,
            models: ModelConfig {
                text_model: get("GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL))?,
                analysis_timeout: Duration::from_secs(timeout_secs),
            },
            google: GoogleConfig {
                api_key: Secret::new(api_key),
                api_base: get("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE))?
                    .trim_end_matches('/')
                    .to_string(),
            },
            cors: CorsConfig { allowed_origins },
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }
}

/// Split the comma-separated origin list.
///
/// Credentials are always allowed, so a wildcard can never be honoured and
/// every entry must be a literal origin usable as a header value.
fn parse_origins(raw: &str) -> Result<Vec<String>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|origin| {
            if origin == "*" {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "CORS_ALLOWED_ORIGINS cannot contain '*' because credentials are allowed; list each origin explicitly"
                )));
            }
            HeaderValue::from_str(origin).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "CORS_ALLOWED_ORIGINS entry '{}' is not a valid origin: {}",
                    origin,
                    e
                ))
            })?;
            Ok(origin.to_string())
        })
        .collect()
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
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
