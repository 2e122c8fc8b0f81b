use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
const OPENAI_KEY_ENV: &str = "OPENAI_KEY";
const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_KEY";

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_VISION_MODEL: &str = "o1-preview";
const DEFAULT_TRANSLATION_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_VISION_MAX_TOKENS: u32 = 10_000;
const DEFAULT_TRANSLATION_MAX_TOKENS: u32 = 4_000;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings for one upstream provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_token: String,
    pub vision: ProviderConfig,
    pub translation: ProviderConfig,
    /// Pending images older than this are swept. `None` keeps them until used or cancelled.
    pub pending_image_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut secret = |name: &'static str| {
            let found = value(name);
            if found.is_none() {
                missing.push(name);
            }
            found.unwrap_or_default()
        };

        let telegram_token = secret(TELEGRAM_TOKEN_ENV);
        let openai_key = secret(OPENAI_KEY_ENV);
        let anthropic_key = secret(ANTHROPIC_KEY_ENV);

        if !missing.is_empty() {
            return Err(ConfigError::MissingSecrets(missing));
        }

        let timeout = Duration::from_secs(parse_or(
            &value,
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?);

        let vision = ProviderConfig {
            api_key: openai_key,
            base_url: value("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: value("VISION_MODEL").unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            max_tokens: parse_or(&value, "VISION_MAX_TOKENS", DEFAULT_VISION_MAX_TOKENS)?,
            timeout,
        };

        let translation = ProviderConfig {
            api_key: anthropic_key,
            base_url: value("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            model: value("TRANSLATION_MODEL")
                .unwrap_or_else(|| DEFAULT_TRANSLATION_MODEL.to_string()),
            max_tokens: parse_or(
                &value,
                "TRANSLATION_MAX_TOKENS",
                DEFAULT_TRANSLATION_MAX_TOKENS,
            )?,
            timeout,
        };

        let pending_image_ttl = match value("PENDING_IMAGE_TTL_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value(
                "PENDING_IMAGE_TTL_SECS",
                raw,
            )?)),
            None => None,
        };

        Ok(Config {
            telegram_token,
            vision,
            translation,
            pending_image_ttl,
        })
    }
}

fn parse_or<T, F>(value: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match value(name) {
        Some(raw) => parse_value(name, raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value: raw })
}
