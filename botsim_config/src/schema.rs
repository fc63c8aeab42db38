use botsim_core::CompletionParams;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide settings, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub providers: ProviderConfig,
    pub synthesis: SynthesisDefaults,
    pub bot: BotConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct SynthesisDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 100,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub default_bot_id: i64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: 10,
            default_bot_id: 16,
        }
    }
}

impl BotConfig {
    fn default_base_url() -> String {
        "http://103.253.20.13:9404/robot-ai-lesson/api/v1/bot".to_string()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let synthesis_defaults = SynthesisDefaults::default();
        let bot_defaults = BotConfig::default();

        Ok(Self {
            providers: ProviderConfig {
                api_key,
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            },
            synthesis: SynthesisDefaults {
                model: get("BOTSIM_MODEL").unwrap_or(synthesis_defaults.model),
                max_tokens: parse_or(
                    "BOTSIM_MAX_TOKENS",
                    get("BOTSIM_MAX_TOKENS"),
                    synthesis_defaults.max_tokens,
                )?,
                temperature: parse_or(
                    "BOTSIM_TEMPERATURE",
                    get("BOTSIM_TEMPERATURE"),
                    synthesis_defaults.temperature,
                )?,
            },
            bot: BotConfig {
                base_url: get("BOTSIM_BOT_BASE_URL").unwrap_or(bot_defaults.base_url),
                timeout_secs: parse_or(
                    "BOTSIM_BOT_TIMEOUT_SECS",
                    get("BOTSIM_BOT_TIMEOUT_SECS"),
                    bot_defaults.timeout_secs,
                )?,
                default_bot_id: parse_or(
                    "BOTSIM_DEFAULT_BOT_ID",
                    get("BOTSIM_DEFAULT_BOT_ID"),
                    bot_defaults.default_bot_id,
                )?,
            },
            server: ServerConfig {
                listen_addr: get("BOTSIM_LISTEN_ADDR")
                    .unwrap_or_else(|| ServerConfig::default().listen_addr),
            },
        })
    }

    #[must_use]
    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams {
            model: self.synthesis.model.clone(),
            max_tokens: self.synthesis.max_tokens,
            temperature: self.synthesis.temperature,
        }
    }

    /// API key with everything but the first and last four characters hidden.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let key = &self.providers.api_key;
        let chars: Vec<char> = key.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "***".to_string()
        }
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    raw.map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.providers.api_key, "sk-test");
        assert_eq!(config.providers.base_url, "https://api.openai.com/v1");
        assert_eq!(config.synthesis.model, "gpt-4o-mini");
        assert_eq!(config.synthesis.max_tokens, 100);
        assert_eq!(config.bot.timeout(), Duration::from_secs(10));
        assert_eq!(config.bot.default_bot_id, 16);
        assert_eq!(config.server.listen_addr, "0.0.0.0:8000");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BOTSIM_MODEL", "gpt-4o"),
            ("BOTSIM_MAX_TOKENS", "64"),
            ("BOTSIM_BOT_BASE_URL", "http://localhost:9404/bot"),
            ("BOTSIM_BOT_TIMEOUT_SECS", "3"),
            ("BOTSIM_DEFAULT_BOT_ID", "42"),
        ]))
        .unwrap();

        let params = config.completion_params();
        assert_eq!(params.model, "gpt-4o");
        assert_eq!(params.max_tokens, 64);
        assert_eq!(config.bot.base_url, "http://localhost:9404/bot");
        assert_eq!(config.bot.timeout_secs, 3);
        assert_eq!(config.bot.default_bot_id, 42);
    }

    #[test]
    fn invalid_number_is_reported() {
        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BOTSIM_BOT_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();

        match err {
            ConfigError::Invalid { key, value } => {
                assert_eq!(key, "BOTSIM_BOT_TIMEOUT_SECS");
                assert_eq!(value, "soon");
            }
            ConfigError::MissingApiKey => panic!("expected invalid value error"),
        }
    }

    #[test]
    fn api_key_is_masked() {
        let config =
            Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-abcdefghijkl")])).unwrap();
        assert_eq!(config.masked_api_key(), "sk-a...ijkl");
    }
}
