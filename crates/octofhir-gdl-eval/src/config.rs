//! Engine configuration

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Order in which rules are tried, by declared priority. Rules with equal
/// priority keep their declaration order either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrder {
    #[default]
    Ascending,
    Descending,
}

/// Configuration for a [`GdlEngine`](crate::GdlEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Value of `$currentDateTime`; the real clock when unset
    pub current_date_time: Option<DateTime<FixedOffset>>,
    /// Language used to resolve local term texts
    pub language: String,
    /// strftime pattern for the `string` attribute of dates
    pub date_time_format: Option<String>,
    pub rule_order: RuleOrder,
    /// Keep evaluating the remaining guidelines of a batch after a failure
    pub continue_on_error: bool,
    /// Maximum expression nesting depth
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            current_date_time: None,
            language: "en".to_string(),
            date_time_format: None,
            rule_order: RuleOrder::Ascending,
            continue_on_error: false,
            max_depth: 256,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Check the configuration for values the engine cannot work with
    pub fn validate(&self) -> EvalResult<()> {
        if self.language.trim().is_empty() {
            return Err(EvalError::configuration("language must not be empty"));
        }
        if self.max_depth == 0 {
            return Err(EvalError::configuration("max_depth must be greater than zero"));
        }
        if let Some(pattern) = &self.date_time_format {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(EvalError::configuration(format!(
                    "invalid date_time_format '{pattern}'"
                )));
            }
        }
        Ok(())
    }

    /// The configured "now", or the real clock
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.current_date_time
            .unwrap_or_else(|| Utc::now().fixed_offset())
    }
}

/// Builder for [`EngineConfig`]
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn current_date_time(mut self, now: DateTime<FixedOffset>) -> Self {
        self.config.current_date_time = Some(now);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn date_time_format(mut self, pattern: impl Into<String>) -> Self {
        self.config.date_time_format = Some(pattern.into());
        self
    }

    pub fn rule_order(mut self, order: RuleOrder) -> Self {
        self.config.rule_order = order;
        self
    }

    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.config.continue_on_error = enabled;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> EvalResult<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
