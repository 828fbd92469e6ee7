//! Google Sheets v4 values API as a `SheetSink`.

mod credentials;

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use gcp_auth::TokenProvider;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};

use sheetsync_api::{CellRange, PluginError, RangeRead, SheetSink};

pub use credentials::{CredentialSource, SHEETS_SCOPE, token_provider, validate_key_json};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// How the API interprets written cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueInput {
    /// Stored exactly as given.
    #[default]
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas).
    UserEntered,
}

impl ValueInput {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

impl FromStr for ValueInput {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "user_entered" | "user-entered" => Ok(Self::UserEntered),
            other => Err(PluginError::config(format!(
                "value input: expected 'raw' or 'user_entered', got '{other}'"
            ))),
        }
    }
}

/// Quote a worksheet title for use in A1 notation: `Sheet 1` → `'Sheet 1'`.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// `{base}/{spreadsheet}/values/{range}{suffix}` with each segment escaped.
pub fn values_url(
    base: &str,
    spreadsheet_id: &str,
    range: &str,
    suffix: &str,
) -> Result<Url, PluginError> {
    let mut url = Url::parse(base)
        .map_err(|e| PluginError::config(format!("invalid sheets base url '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| PluginError::config(format!("sheets base url '{base}' cannot have a path")))?
        .pop_if_empty()
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{range}{suffix}"));
    Ok(url)
}

// ── wire types ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Default, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: Option<UpdateSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSummary {
    #[serde(default)]
    updated_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn cell_text(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decode a values response body. A missing or empty `values` is `Empty`.
fn parse_value_range(body: &str) -> Result<RangeRead, PluginError> {
    let range: ValueRange = serde_json::from_str(body)
        .map_err(|e| PluginError::format_err(format!("sheets: bad values response: {e}")))?;
    let rows: Vec<Vec<String>> = range
        .values
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();
    Ok(if rows.is_empty() { RangeRead::Empty } else { RangeRead::Rows(rows) })
}

fn api_error(op: &str, status: StatusCode, body: &str) -> PluginError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(resp) => format!("sheets {op}: {} ({})", resp.error.message, resp.error.status),
        Err(_) => format!("sheets {op}: {status} - {body}"),
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PluginError::credential(message),
        _ => PluginError::io(message),
    }
}

// ── client ──────────────────────────────────────────────────────

/// One worksheet of one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    value_input: ValueInput,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base_url", &self.base_url)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("worksheet", &self.worksheet)
            .field("value_input", &self.value_input)
            .field("tokens", &"<TokenProvider>")
            .finish()
    }
}

impl SheetsClient {
    pub fn new(
        spreadsheet_id: &str,
        worksheet: &str,
        value_input: ValueInput,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, PluginError> {
        if spreadsheet_id.trim().is_empty() {
            return Err(PluginError::config("sheets: spreadsheet id is empty"));
        }
        if worksheet.is_empty() {
            return Err(PluginError::config("sheets: worksheet name is empty"));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PluginError::io(format!("sheets: http client: {e}")))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            worksheet: worksheet.to_string(),
            value_input,
            tokens,
        })
    }

    /// Point at another endpoint, e.g. a local emulator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn qualified(&self, range: CellRange) -> String {
        format!("{}!{}", quote_sheet_name(&self.worksheet), range.to_a1())
    }

    fn url(&self, range: &str, suffix: &str) -> Result<Url, PluginError> {
        values_url(&self.base_url, &self.spreadsheet_id, range, suffix)
    }

    async fn access_token(&self) -> Result<String, PluginError> {
        let token = self
            .tokens
            .token(&[SHEETS_SCOPE])
            .await
            .map_err(|e| PluginError::credential(format!("sheets: access token: {e}")))?;
        Ok(token.as_str().to_string())
    }

    /// Authenticate, send, and return the body of a 2xx response.
    async fn send(&self, op: &str, req: RequestBuilder) -> Result<String, PluginError> {
        let token = self.access_token().await?;
        let resp = req
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| PluginError::io(format!("sheets {op}: request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PluginError::io(format!("sheets {op}: reading response: {e}")))?;
        if !status.is_success() {
            return Err(api_error(op, status, &body));
        }
        Ok(body)
    }
}

impl SheetSink for SheetsClient {
    fn read_range(
        &self,
        range: CellRange,
    ) -> Pin<Box<dyn Future<Output = Result<RangeRead, PluginError>> + Send + '_>> {
        Box::pin(async move {
            let a1 = self.qualified(range);
            let mut url = self.url(&a1, "")?;
            url.query_pairs_mut()
                .append_pair("majorDimension", "ROWS")
                .append_pair("valueRenderOption", "FORMATTED_VALUE");

            let body = self.send("read", self.http.get(url)).await?;
            let read = parse_value_range(&body)?;
            tracing::debug!(range = %a1, rows = read.row_count(), "sheet range read");
            Ok(read)
        })
    }

    fn write_range(
        &self,
        range: CellRange,
        rows: Vec<Vec<String>>,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>> {
        Box::pin(async move {
            let a1 = self.qualified(range);
            let mut url = self.url(&a1, "")?;
            url.query_pairs_mut().append_pair("valueInputOption", self.value_input.as_str());

            let payload = ValueRangeBody { range: &a1, major_dimension: "ROWS", values: &rows };
            self.send("write", self.http.put(url).json(&payload)).await?;
            tracing::debug!(range = %a1, rows = rows.len(), "sheet range written");
            Ok(())
        })
    }

    fn append_rows(
        &self,
        rows: Vec<Vec<String>>,
    ) -> Pin<Box<dyn Future<Output = Result<usize, PluginError>> + Send + '_>> {
        Box::pin(async move {
            let a1 = self.qualified(CellRange::cell(0, 0));
            let mut url = self.url(&a1, ":append")?;
            url.query_pairs_mut()
                .append_pair("valueInputOption", self.value_input.as_str())
                .append_pair("insertDataOption", "INSERT_ROWS");

            let payload = ValueRangeBody { range: &a1, major_dimension: "ROWS", values: &rows };
            let body = self.send("append", self.http.post(url).json(&payload)).await?;

            let resp: AppendResponse = serde_json::from_str(&body)
                .map_err(|e| PluginError::format_err(format!("sheets: bad append response: {e}")))?;
            let appended = resp.updates.and_then(|u| u.updated_rows).unwrap_or(rows.len());
            tracing::debug!(rows = appended, "sheet rows appended");
            Ok(appended)
        })
    }
}
