use std::path::Path;
use std::time::Duration;

use clap::Args;
use serde::Deserialize;

use sheetsync_engine::{DedupStrategy, ExportConfig};
use sheetsync_storage_sheets::{CredentialSource, ValueInput};

use super::error::SheetsyncError;

const DEFAULT_CONFIG_PATH: &str = "sheetsync.toml";
const DEFAULT_WORKSHEET: &str = "Sheet1";
const DEFAULT_LOOKBACK_SECS: u64 = 6 * 60 * 60;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub mongo_uri: Option<String>,
    pub mongo_database: Option<String>,
    pub mongo_collection: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub worksheet: Option<String>,
    pub credentials: Option<String>,
    pub lookback_secs: Option<u64>,
    pub dedup: Option<DedupStrategy>,
    pub id_column: Option<String>,
    pub value_input: Option<ValueInput>,
    pub dry_run: Option<bool>,
}

pub fn load_config(path: &str) -> Result<Config, SheetsyncError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SheetsyncError::Config(format!("cannot read config {path}: {e}")))?;
    parse_config(&content).map_err(|e| SheetsyncError::Config(format!("bad config {path}: {e}")))
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug, Default)]
pub struct ExportArgs {
    /// Path to the TOML config file; must exist when given [default: sheetsync.toml, optional]
    #[arg(long, env = "SHEETSYNC_CONFIG")]
    pub config: Option<String>,

    /// MongoDB connection string
    #[arg(long, env = "SHEETSYNC_MONGO_URI", hide_env_values = true)]
    pub mongo_uri: Option<String>,

    /// Database holding the source collection
    #[arg(long, env = "SHEETSYNC_MONGO_DATABASE")]
    pub mongo_database: Option<String>,

    /// Source collection
    #[arg(long, env = "SHEETSYNC_MONGO_COLLECTION")]
    pub mongo_collection: Option<String>,

    /// Target spreadsheet id (from its URL)
    #[arg(long, env = "SHEETSYNC_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Worksheet (tab) title [default: Sheet1]
    #[arg(long, env = "SHEETSYNC_WORKSHEET")]
    pub worksheet: Option<String>,

    /// Service credentials: adc, file:<path> or env:<VAR> [default: adc]
    #[arg(long, env = "SHEETSYNC_CREDENTIALS")]
    pub credentials: Option<String>,

    /// Lookback window in seconds [default: 21600]
    #[arg(long, env = "SHEETSYNC_LOOKBACK_SECS")]
    pub lookback_secs: Option<u64>,

    /// Deduplication strategy: ids or window [default: ids]
    #[arg(long, env = "SHEETSYNC_DEDUP")]
    pub dedup: Option<DedupStrategy>,

    /// Header of the identifier column [default: _id]
    #[arg(long, env = "SHEETSYNC_ID_COLUMN")]
    pub id_column: Option<String>,

    /// How cells are written: raw or user_entered [default: raw]
    #[arg(long, env = "SHEETSYNC_VALUE_INPUT")]
    pub value_input: Option<ValueInput>,

    /// Compute what would be written without touching the sheet
    #[arg(long, env = "SHEETSYNC_DRY_RUN")]
    pub dry_run: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Effective: merged config
// ═══════════════════════════════════════════════════════════════

/// Final settings after merging: defaults < config file < env/CLI.
#[derive(Debug)]
pub struct Effective {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub mongo_collection: String,
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub credentials: CredentialSource,
    pub value_input: ValueInput,
    pub export: ExportConfig,
}

impl Effective {
    pub fn new(args: &ExportArgs) -> Result<Self, SheetsyncError> {
        let cfg = match &args.config {
            Some(path) => load_config(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH)?,
            None => Config::default(),
        };
        Self::merge(args, cfg)
    }

    pub fn merge(args: &ExportArgs, cfg: Config) -> Result<Self, SheetsyncError> {
        let credentials = match args.credentials.clone().or(cfg.credentials) {
            Some(s) => s
                .parse::<CredentialSource>()
                .map_err(|e| SheetsyncError::Config(e.to_string()))?,
            None => CredentialSource::default(),
        };
        let value_input = args.value_input.or(cfg.value_input).unwrap_or_default();
        let dedup = args.dedup.or(cfg.dedup).unwrap_or_default();

        let lookback_secs = args.lookback_secs.or(cfg.lookback_secs).unwrap_or(DEFAULT_LOOKBACK_SECS);
        let export = ExportConfig {
            lookback: Duration::from_secs(lookback_secs),
            dedup,
            id_column: args
                .id_column
                .clone()
                .or(cfg.id_column)
                .unwrap_or_else(|| sheetsync_engine::config::DEFAULT_ID_COLUMN.to_string()),
            dry_run: args.dry_run || cfg.dry_run.unwrap_or(false),
            text_ids: value_input == ValueInput::UserEntered,
        };
        export.validate().map_err(|e| SheetsyncError::Config(e.to_string()))?;

        let eff = Self {
            mongo_uri: required("mongo_uri", args.mongo_uri.clone().or(cfg.mongo_uri))?,
            mongo_database: required("mongo_database", args.mongo_database.clone().or(cfg.mongo_database))?,
            mongo_collection: required(
                "mongo_collection",
                args.mongo_collection.clone().or(cfg.mongo_collection),
            )?,
            spreadsheet_id: required("spreadsheet_id", args.spreadsheet_id.clone().or(cfg.spreadsheet_id))?,
            worksheet: args
                .worksheet
                .clone()
                .or(cfg.worksheet)
                .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
            credentials,
            value_input,
            export,
        };
        if eff.worksheet.is_empty() {
            return Err(SheetsyncError::Config("worksheet cannot be empty".into()));
        }
        Ok(eff)
    }
}

fn required(name: &str, value: Option<String>) -> Result<String, SheetsyncError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SheetsyncError::Config(format!(
            "{name} is required (--{} or config file)",
            name.replace('_', "-")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn full_file() -> Config {
        parse_config(
            r#"
            mongo_uri = "mongodb://localhost:27017"
            mongo_database = "app"
            mongo_collection = "events"
            spreadsheet_id = "sheet-from-file"
            worksheet = "Exports"
            lookback_secs = 3600
            "#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_the_gaps() {
        let eff = Effective::merge(&ExportArgs::default(), full_file()).unwrap();

        assert_eq!(eff.worksheet, "Exports");
        assert_eq!(eff.credentials, CredentialSource::ApplicationDefault);
        assert_eq!(eff.value_input, ValueInput::Raw);
        assert_eq!(eff.export.lookback, Duration::from_secs(3600));
        assert_eq!(eff.export.dedup, DedupStrategy::Ids);
        assert_eq!(eff.export.id_column, "_id");
        assert!(!eff.export.dry_run);
        assert!(!eff.export.text_ids);
    }

    #[test]
    fn args_override_file() {
        let args = ExportArgs {
            spreadsheet_id: Some("sheet-from-cli".into()),
            credentials: Some("file:/keys/sa.json".into()),
            dedup: Some(DedupStrategy::Window),
            value_input: Some(ValueInput::UserEntered),
            dry_run: true,
            ..Default::default()
        };
        let eff = Effective::merge(&args, full_file()).unwrap();

        assert_eq!(eff.spreadsheet_id, "sheet-from-cli");
        assert_eq!(eff.mongo_collection, "events");
        assert_eq!(eff.credentials, CredentialSource::File(PathBuf::from("/keys/sa.json")));
        assert_eq!(eff.export.dedup, DedupStrategy::Window);
        assert_eq!(eff.value_input, ValueInput::UserEntered);
        assert!(eff.export.text_ids);
        assert!(eff.export.dry_run);
    }

    #[test]
    fn missing_required_setting_is_reported() {
        let mut cfg = full_file();
        cfg.spreadsheet_id = None;
        let err = Effective::merge(&ExportArgs::default(), cfg).unwrap_err();
        assert!(err.to_string().contains("spreadsheet_id is required"));
    }

    #[test]
    fn zero_lookback_is_rejected() {
        let args = ExportArgs { lookback_secs: Some(0), ..Default::default() };
        let err = Effective::merge(&args, full_file()).unwrap_err();
        assert!(matches!(err, SheetsyncError::Config(_)));
    }

    #[test]
    fn file_enums_are_typed() {
        let cfg = parse_config("dedup = \"id_set\"\nvalue_input = \"user_entered\"").unwrap();
        assert_eq!(cfg.dedup, Some(DedupStrategy::Ids));
        assert_eq!(cfg.value_input, Some(ValueInput::UserEntered));

        let cfg = parse_config("dedup = \"window\"").unwrap();
        assert_eq!(cfg.dedup, Some(DedupStrategy::Window));
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(parse_config("dedup = \"hash\"").is_err());
        assert!(parse_config("value_input = \"formula\"").is_err());

        let args = ExportArgs { credentials: Some("vault:x".into()), ..Default::default() };
        assert!(Effective::merge(&args, full_file()).is_err());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(parse_config("mongo_url = \"typo\"").is_err());
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let args = ExportArgs {
            config: Some("/nonexistent/sheetsync.toml".into()),
            spreadsheet_id: Some("abc".into()),
            ..Default::default()
        };
        let err = Effective::new(&args).unwrap_err();
        assert!(matches!(err, SheetsyncError::Config(_)));
        assert!(err.to_string().contains("cannot read config /nonexistent/sheetsync.toml"));
    }

    #[test]
    fn missing_default_file_is_not_an_error() {
        assert!(!Path::new(DEFAULT_CONFIG_PATH).exists());
        let args = ExportArgs {
            mongo_uri: Some("mongodb://db".into()),
            mongo_database: Some("app".into()),
            mongo_collection: Some("events".into()),
            spreadsheet_id: Some("abc".into()),
            ..Default::default()
        };
        let eff = Effective::new(&args).unwrap();
        assert_eq!(eff.worksheet, "Sheet1");
    }
}
