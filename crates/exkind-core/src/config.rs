//! Process-wide configuration
//!
//! The configuration is initialised with defaults on first use and changes
//! only through [`configure`]. Messages are rendered once, at construction,
//! so a change is observed by exceptions built afterwards and never by
//! existing ones.

use std::sync::{OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::errors::{ExkindError, Result};
use crate::template::default_template;

/// How construction arguments are joined into the raw message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Per-item encoding: composite values become compact JSON
    #[default]
    Structured,
    /// Plain text join: composite values become a type tag
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Ordered literal/placeholder blocks used to render messages
    pub template: Vec<String>,
    /// Maximum number of kinds a local scope enumerates
    pub max_scoped_defs: usize,
    pub encoding: Encoding,
    /// Separator between encoded arguments
    pub delimiter: String,
    /// Append a captured backtrace to each exception's stack text
    pub capture_backtrace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: default_template(),
            max_scoped_defs: 64,
            encoding: Encoding::Structured,
            delimiter: " ".to_string(),
            capture_backtrace: false,
        }
    }
}

/// Partial configuration merged by [`configure`]
///
/// Fields left `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverride {
    pub template: Option<Vec<String>>,
    pub max_scoped_defs: Option<usize>,
    pub encoding: Option<Encoding>,
    pub delimiter: Option<String>,
    pub capture_backtrace: Option<bool>,
}

impl ConfigOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template = Some(blocks.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_scoped_defs(mut self, max: usize) -> Self {
        self.max_scoped_defs = Some(max);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn capture_backtrace(mut self, enabled: bool) -> Self {
        self.capture_backtrace = Some(enabled);
        self
    }

    /// Parse an override from TOML text
    ///
    /// ```
    /// use exkind_core::config::{ConfigOverride, Encoding};
    ///
    /// let o = ConfigOverride::from_toml_str("encoding = \"plain\"\ndelimiter = \", \"").unwrap();
    /// assert_eq!(o.encoding, Some(Encoding::Plain));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn validate(&self) -> Result<()> {
        if let Some(template) = &self.template {
            if template.is_empty() {
                return Err(ExkindError::InvalidConfig {
                    reason: "template must contain at least one block".to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply_to(self, config: &mut Config) {
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(max) = self.max_scoped_defs {
            config.max_scoped_defs = max;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(enabled) = self.capture_backtrace {
            config.capture_backtrace = enabled;
        }
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn cell() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

/// Snapshot of the current configuration
pub fn current() -> Config {
    cell()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Merge `overrides` into the process-wide configuration
///
/// Returns the configuration now in effect.
///
/// # Errors
///
/// Returns `InvalidConfig` if the override is rejected; the configuration
/// is left unchanged in that case.
pub fn configure(overrides: ConfigOverride) -> Result<Config> {
    overrides.validate()?;
    let mut config = cell().write().unwrap_or_else(PoisonError::into_inner);
    overrides.apply_to(&mut config);
    Ok(config.clone())
}
