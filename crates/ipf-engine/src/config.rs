//! Engine Configuration

use ipf_css::{parse_selector_list, SelectorError};
use serde::{Deserialize, Serialize};

use crate::markers::{DEFAULT_FRAME_SELECTOR, DEFAULT_HIDE_SELECTOR};
use crate::session::SessionKeys;

/// Pseudo-fullscreen configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selector resolving the frame to expand (first match wins)
    pub frame_selector: String,

    /// Selector list of page chrome to hide; empty hides nothing
    pub hide_selector: String,

    /// Edge length of the safe-zone overlay in CSS pixels
    pub safe_zone_size_px: u32,

    /// Version tag embedded in session storage keys
    pub session_key_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_selector: DEFAULT_FRAME_SELECTOR.to_string(),
            hide_selector: DEFAULT_HIDE_SELECTOR.to_string(),
            safe_zone_size_px: 96,
            session_key_version: "v4".to_string(),
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both selectors parse and the overlay has a size
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_selector_list(&self.frame_selector).map_err(|source| ConfigError::Selector {
            field: "frame",
            selector: self.frame_selector.clone(),
            source,
        })?;

        if !self.hide_selector.is_empty() {
            parse_selector_list(&self.hide_selector).map_err(|source| ConfigError::Selector {
                field: "hide",
                selector: self.hide_selector.clone(),
                source,
            })?;
        }

        if self.safe_zone_size_px == 0 {
            return Err(ConfigError::SafeZoneSize);
        }
        if self.session_key_version.is_empty() {
            return Err(ConfigError::KeyVersion);
        }
        Ok(())
    }

    /// The configured selectors
    pub fn selectors(&self) -> SelectorPair {
        SelectorPair::new(&self.frame_selector, &self.hide_selector)
    }

    /// Session keys for this configuration's version tag
    pub fn session_keys(&self) -> SessionKeys {
        SessionKeys::versioned(&self.session_key_version)
    }
}

/// Frame and hide selectors, as used together by one enable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorPair {
    pub frame: String,
    pub hide: String,
}

impl SelectorPair {
    pub fn new(frame: &str, hide: &str) -> Self {
        Self {
            frame: frame.to_string(),
            hide: hide.to_string(),
        }
    }

    /// Replace empty members with the corresponding default
    pub fn or_defaults(&self, defaults: &SelectorPair) -> SelectorPair {
        let pick = |value: &String, fallback: &String| {
            if value.is_empty() {
                fallback.clone()
            } else {
                value.clone()
            }
        };
        SelectorPair {
            frame: pick(&self.frame, &defaults.frame),
            hide: pick(&self.hide, &defaults.hide),
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {field} selector '{selector}': {source}")]
    Selector {
        field: &'static str,
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("Safe zone size must be at least one pixel")]
    SafeZoneSize,

    #[error("Session key version must not be empty")]
    KeyVersion,
}
