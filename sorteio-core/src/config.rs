use crate::error::{Result, SorteioError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_HISTORY_WINDOW: &str = "SORTEIO_HISTORY_WINDOW";
pub const ENV_SPINNER_MS: &str = "SORTEIO_SPINNER_MS";
pub const ENV_SPINNER_FRAMES: &str = "SORTEIO_SPINNER_FRAMES";
pub const ENV_DRAW_TOKEN: &str = "SORTEIO_DRAW_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaffleConfig {
    /// Number of most recent draws scanned for repeat winners
    pub history_window: usize,
    pub spinner_period: Duration,
    /// Random frames shown before the outcome
    pub spinner_frames: u32,
    /// Static token stamped on every draw record
    pub draw_token: String,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            history_window: 30,
            spinner_period: Duration::from_millis(80),
            spinner_frames: 21,
            draw_token: "ADMIN_SECRET".to_string(),
        }
    }
}

impl RaffleConfig {
    /// Defaults overridden by any `SORTEIO_*` variables that are set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(window) = env_parse::<usize>(ENV_HISTORY_WINDOW)? {
            config.history_window = window;
        }
        if let Some(millis) = env_parse::<u64>(ENV_SPINNER_MS)? {
            config.spinner_period = Duration::from_millis(millis);
        }
        if let Some(frames) = env_parse::<u32>(ENV_SPINNER_FRAMES)? {
            config.spinner_frames = frames;
        }
        if let Ok(token) = std::env::var(ENV_DRAW_TOKEN) {
            config.draw_token = token;
        }

        config.validate()?;
        Ok(config)
    }

    /// Config for tests and simulations: same semantics, no visible delay
    pub fn fast() -> Self {
        Self {
            spinner_period: Duration::from_millis(1),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_window == 0 {
            return Err(SorteioError::config("History window must be greater than 0"));
        }

        if self.spinner_period.is_zero() {
            return Err(SorteioError::config("Spinner period must be greater than 0"));
        }

        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| SorteioError::config(format!("Invalid {} value '{}': {}", key, raw, e))),
        Err(_) => {
            tracing::debug!("{} not set, using default", key);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RaffleConfig::default();
        assert_eq!(config.history_window, 30);
        assert_eq!(config.spinner_period, Duration::from_millis(80));
        assert_eq!(config.spinner_frames, 21);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = RaffleConfig {
            history_window: 0,
            ..RaffleConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RaffleConfig {
            spinner_period: Duration::ZERO,
            ..RaffleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        // the only test touching these variables
        std::env::set_var(ENV_SPINNER_FRAMES, "5");
        std::env::set_var(ENV_DRAW_TOKEN, "other");
        let config = RaffleConfig::from_env().unwrap();
        assert_eq!(config.spinner_frames, 5);
        assert_eq!(config.draw_token, "other");

        std::env::set_var(ENV_SPINNER_FRAMES, "many");
        assert!(RaffleConfig::from_env().is_err());

        std::env::remove_var(ENV_SPINNER_FRAMES);
        std::env::remove_var(ENV_DRAW_TOKEN);
    }
}
