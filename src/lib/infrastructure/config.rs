//! Postmark configuration

use std::collections::HashMap;

use anyhow::Result;
use clap::{ArgAction, Parser};

use crate::infrastructure::postmark::POSTMARK_API_URL;

/// Settings key holding the Postmark server token
pub const API_KEY_SETTING: &str = "postmark.api_key";

/// Settings key holding whether sends join the unit of work by default
pub const SHOULD_JOIN_TX_SETTING: &str = "postmark.should_join_tx";

/// Settings key overriding the Postmark API URL
pub const API_URL_SETTING: &str = "postmark.api_url";

/// Postmark configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct PostmarkConfig {
    /// The Postmark server token
    #[arg(long = "postmark-api-key", env = "POSTMARK_API_KEY")]
    pub api_key: Option<String>,

    /// Send after the unit of work commits unless told otherwise
    #[arg(
        long = "postmark-should-join-tx",
        env = "POSTMARK_SHOULD_JOIN_TX",
        default_value = "true",
        value_parser = parse_truthy,
        action = ArgAction::Set
    )]
    pub should_join_tx: bool,

    /// The Postmark API URL
    #[arg(long = "postmark-api-url", env = "POSTMARK_API_URL", default_value = POSTMARK_API_URL)]
    pub api_url: String,
}

impl Default for PostmarkConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            should_join_tx: true,
            api_url: POSTMARK_API_URL.to_string(),
        }
    }
}

impl PostmarkConfig {
    /// Reads the configuration from a settings map.
    ///
    /// Missing keys fall back to the defaults: no API key, join the unit of work, and
    /// the public Postmark API.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        Self {
            api_key: settings.get(API_KEY_SETTING).cloned(),
            should_join_tx: settings
                .get(SHOULD_JOIN_TX_SETTING)
                .map(String::as_str)
                .map(as_bool)
                .unwrap_or(defaults.should_join_tx),
            api_url: settings
                .get(API_URL_SETTING)
                .cloned()
                .unwrap_or(defaults.api_url),
        }
    }

    /// Reads the configuration from the environment, loading `.env` first if present.
    #[mutants::skip]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self::try_parse_from(["postmark"])?)
    }
}

/// Parses a textual flag. `t`, `true`, `y`, `yes`, `on` and `1` are true in any case;
/// everything else is false.
pub fn as_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "t" | "true" | "y" | "yes" | "on" | "1"
    )
}

fn parse_truthy(value: &str) -> Result<bool, String> {
    Ok(as_bool(value))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let config = PostmarkConfig::from_settings(&HashMap::new());

        assert_eq!(config, PostmarkConfig::default());
        assert!(config.should_join_tx);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_settings_are_read() {
        let config = PostmarkConfig::from_settings(&settings(&[
            ("postmark.api_key", "K"),
            ("postmark.should_join_tx", "false"),
            ("postmark.api_url", "http://localhost:8080"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("K"));
        assert!(!config.should_join_tx);
        assert_eq!(config.api_url, "http://localhost:8080");
    }

    #[test]
    fn test_as_bool_truthy_values() {
        for value in ["t", "true", "TRUE", " Yes ", "y", "on", "1"] {
            assert!(as_bool(value), "{value:?} should be true");
        }
    }

    #[test]
    fn test_as_bool_everything_else_is_false() {
        for value in ["f", "false", "no", "off", "0", "", "maybe"] {
            assert!(!as_bool(value), "{value:?} should be false");
        }
    }

    #[test]
    fn test_parse_arguments() -> TestResult {
        let config = PostmarkConfig::try_parse_from([
            "postmark",
            "--postmark-api-key",
            "K",
            "--postmark-should-join-tx",
            "off",
            "--postmark-api-url",
            "http://localhost:8080",
        ])?;

        assert_eq!(config.api_key.as_deref(), Some("K"));
        assert!(!config.should_join_tx);
        assert_eq!(config.api_url, "http://localhost:8080");

        Ok(())
    }
}
