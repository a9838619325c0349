use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::layout::{FontFamily, Gaps, TypeScale};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub font_family: FontFamily,
    /// Pixel size of 1em when measuring term boxes.
    pub base_font_px: f32,
    pub gap_h_px: f32,
    pub gap_v_px: f32,
    /// Delay before the second, settled layout pass after a stats update.
    pub settle_delay_ms: u64,
    /// Answers are truncated to this many characters before tallying.
    pub max_term_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            font_family: FontFamily::Inter,
            base_font_px: 16.0,
            gap_h_px: 24.0,
            gap_v_px: 12.0,
            settle_delay_ms: 400,
            max_term_chars: 64,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let font_family = match std::env::var("FONT_FAMILY") {
            Ok(raw) => raw
                .parse::<FontFamily>()
                .map_err(|e| anyhow!(e))
                .context("FONT_FAMILY must be one of inter, lato, monospace")?,
            Err(_) => defaults.font_family,
        };

        let config = Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            font_family,
            base_font_px: env_or("BASE_FONT_PX", defaults.base_font_px)?,
            gap_h_px: env_or("GAP_H_PX", defaults.gap_h_px)?,
            gap_v_px: env_or("GAP_V_PX", defaults.gap_v_px)?,
            settle_delay_ms: env_or("SETTLE_DELAY_MS", defaults.settle_delay_ms)?,
            max_term_chars: env_or("MAX_TERM_CHARS", defaults.max_term_chars)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the packer cannot work with. NaN fails every
    /// comparison, so finiteness is checked explicitly.
    fn validate(&self) -> Result<()> {
        if !self.base_font_px.is_finite() || self.base_font_px <= 0.0 {
            return Err(anyhow!("BASE_FONT_PX must be a positive number"));
        }
        let gaps_ok = [self.gap_h_px, self.gap_v_px]
            .iter()
            .all(|g| g.is_finite() && *g >= 0.0);
        if !gaps_ok {
            return Err(anyhow!("GAP_H_PX and GAP_V_PX must be finite and not negative"));
        }
        if self.max_term_chars == 0 {
            return Err(anyhow!("MAX_TERM_CHARS must be at least 1"));
        }
        Ok(())
    }

    pub fn type_scale(&self) -> TypeScale {
        TypeScale {
            font: self.font_family,
            base_font_px: self.base_font_px,
            ..TypeScale::default()
        }
    }

    pub fn gaps(&self) -> Gaps {
        Gaps {
            horizontal: self.gap_h_px,
            vertical: self.gap_v_px,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: u64 = env_or("WORDCLOUD_TEST_SURELY_UNSET_VAR", 17).unwrap();
        assert_eq!(value, 17);
    }

    #[test]
    fn test_derived_settings() {
        let config = Config::default();
        assert_eq!(config.settle_delay(), Duration::from_millis(400));
        assert_eq!(config.gaps().horizontal, 24.0);
        assert_eq!(config.type_scale().base_font_px, 16.0);
        assert_eq!(config.type_scale().font, FontFamily::Inter);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite_sizes() {
        let nan_font = Config {
            base_font_px: f32::NAN,
            ..Config::default()
        };
        assert!(nan_font.validate().is_err());

        let nan_gap = Config {
            gap_h_px: f32::NAN,
            ..Config::default()
        };
        assert!(nan_gap.validate().is_err());

        let infinite_gap = Config {
            gap_v_px: f32::INFINITY,
            ..Config::default()
        };
        assert!(infinite_gap.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let zero_font = Config {
            base_font_px: 0.0,
            ..Config::default()
        };
        assert!(zero_font.validate().is_err());

        let negative_gap = Config {
            gap_v_px: -1.0,
            ..Config::default()
        };
        assert!(negative_gap.validate().is_err());

        let no_chars = Config {
            max_term_chars: 0,
            ..Config::default()
        };
        assert!(no_chars.validate().is_err());
    }
}
