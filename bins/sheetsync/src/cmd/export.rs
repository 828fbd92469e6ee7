use chrono::Utc;

use sheetsync_engine::{ExportReport, run_export};
use sheetsync_storage_mongodb::MongoStore;
use sheetsync_storage_sheets::{SheetsClient, token_provider};

use super::config::Effective;
use super::error::SheetsyncError;

/// Resolve credentials, connect both ends, run one export.
pub async fn run(eff: &Effective) -> Result<ExportReport, SheetsyncError> {
    tracing::info!(
        database = %eff.mongo_database,
        collection = %eff.mongo_collection,
        spreadsheet = %eff.spreadsheet_id,
        worksheet = %eff.worksheet,
        credentials = %eff.credentials,
        lookback_s = eff.export.lookback.as_secs(),
        dedup = ?eff.export.dedup,
        dry_run = eff.export.dry_run,
        "starting export"
    );

    let tokens = token_provider(&eff.credentials)
        .await
        .map_err(SheetsyncError::Credential)?;
    let sink = SheetsClient::new(&eff.spreadsheet_id, &eff.worksheet, eff.value_input, tokens)
        .map_err(|e| SheetsyncError::Config(e.to_string()))?;

    let store = MongoStore::connect(&eff.mongo_uri, &eff.mongo_database, &eff.mongo_collection)
        .await
        .map_err(SheetsyncError::Store)?;

    let report = run_export(&store, &sink, &eff.export, Utc::now()).await?;
    tracing::info!(
        candidates = report.candidates,
        new_records = report.new_records,
        columns_added = report.columns_added,
        header_rewritten = report.header_rewritten,
        rows_appended = report.rows_appended,
        dry_run = report.dry_run,
        "run finished"
    );
    Ok(report)
}
