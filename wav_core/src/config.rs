//! Decoder configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Read size used while streaming the data chunk
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// How the decoder treats a data chunk whose delivered length differs
/// from the length the header declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Pad short streams with silence, drop samples past the declared length
    #[default]
    Lenient,
    /// Fail with `LengthMismatch`
    Strict,
}

impl FromStr for LengthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(LengthPolicy::Lenient),
            "strict" => Ok(LengthPolicy::Strict),
            other => Err(format!("unknown length policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub chunk_size: usize,
    pub length_policy: LengthPolicy,
    pub max_data_bytes: Option<u32>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            length_policy: LengthPolicy::Lenient,
            max_data_bytes: None,
        }
    }
}

impl DecoderConfig {
    pub fn strict() -> Self {
        Self {
            length_policy: LengthPolicy::Strict,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let chunk_size = std::env::var("WAV_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n >= 2)
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        let length_policy = std::env::var("WAV_LENGTH_POLICY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let max_data_bytes = std::env::var("WAV_MAX_DATA_BYTES")
            .ok()
            .and_then(|v| v.parse().ok());

        Self {
            chunk_size,
            length_policy,
            max_data_bytes,
        }
    }

    // An odd chunk size would split frames on every full read
    pub(crate) fn effective_chunk_size(&self) -> usize {
        (self.chunk_size.max(2)) & !1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.chunk_size, 32768);
        assert_eq!(config.length_policy, LengthPolicy::Lenient);
        assert!(config.max_data_bytes.is_none());
    }

    #[test]
    fn test_length_policy_parse() {
        assert_eq!("strict".parse::<LengthPolicy>().unwrap(), LengthPolicy::Strict);
        assert_eq!(" Lenient ".parse::<LengthPolicy>().unwrap(), LengthPolicy::Lenient);
        assert!("loose".parse::<LengthPolicy>().is_err());
    }

    #[test]
    fn test_effective_chunk_size_is_even() {
        let mut config = DecoderConfig::default();
        config.chunk_size = 1;
        assert_eq!(config.effective_chunk_size(), 2);
        config.chunk_size = 1001;
        assert_eq!(config.effective_chunk_size(), 1000);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: DecoderConfig =
            serde_json::from_str(r#"{"length_policy":"strict"}"#).unwrap();
        assert_eq!(config.length_policy, LengthPolicy::Strict);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_from_env_parses_and_falls_back() {
        const VARS: [&str; 3] = ["WAV_CHUNK_SIZE", "WAV_LENGTH_POLICY", "WAV_MAX_DATA_BYTES"];

        for var in VARS {
            std::env::remove_var(var);
        }
        assert_eq!(DecoderConfig::from_env(), DecoderConfig::default());

        std::env::set_var("WAV_CHUNK_SIZE", "4096");
        std::env::set_var("WAV_LENGTH_POLICY", "STRICT");
        std::env::set_var("WAV_MAX_DATA_BYTES", "1000000");
        let config = DecoderConfig::from_env();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.length_policy, LengthPolicy::Strict);
        assert_eq!(config.max_data_bytes, Some(1_000_000));

        std::env::set_var("WAV_CHUNK_SIZE", "1");
        std::env::set_var("WAV_LENGTH_POLICY", "loose");
        std::env::set_var("WAV_MAX_DATA_BYTES", "-5");
        assert_eq!(DecoderConfig::from_env(), DecoderConfig::default());

        std::env::set_var("WAV_CHUNK_SIZE", "lots");
        assert_eq!(DecoderConfig::from_env().chunk_size, DEFAULT_CHUNK_SIZE);

        for var in VARS {
            std::env::remove_var(var);
        }
    }
}
