use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ExportError;

/// Default lookback window: 6 hours.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(6 * 60 * 60);

/// Default name of the identifier column in the sheet.
pub const DEFAULT_ID_COLUMN: &str = sheetsync_api::ID_FIELD;

/// How a run decides which selected records are new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Trust the window: every selected record is new.
    Window,
    /// Read the sheet's identifier column and skip records already present.
    #[default]
    #[serde(alias = "id_set")]
    Ids,
}

impl FromStr for DedupStrategy {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" => Ok(DedupStrategy::Window),
            "ids" | "id_set" => Ok(DedupStrategy::Ids),
            other => Err(ExportError::Config(format!(
                "unknown dedup strategy '{other}' (expected 'ids' or 'window')"
            ))),
        }
    }
}

/// Validated settings for one export run. Built once at startup and passed
/// by reference; nothing inside the engine reads the environment.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub lookback: Duration,
    pub dedup: DedupStrategy,
    /// Header name of the column holding record identifiers.
    pub id_column: String,
    /// Compute everything, write nothing.
    pub dry_run: bool,
    /// Prefix identifier cells with `'` so a sink that parses input keeps
    /// them as text. Needed when the sheet receives `USER_ENTERED` values.
    pub text_ids: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            dedup: DedupStrategy::default(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            dry_run: false,
            text_ids: false,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.lookback.is_zero() {
            return Err(ExportError::Config("lookback must be greater than zero".into()));
        }
        if self.id_column.trim().is_empty() {
            return Err(ExportError::Config("id_column cannot be empty".into()));
        }
        Ok(())
    }
}
