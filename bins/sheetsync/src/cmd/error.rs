use sheetsync_api::PluginError;
use sheetsync_engine::ExportError;

#[derive(Debug, thiserror::Error)]
pub enum SheetsyncError {
    #[error("{0}")]
    Config(String),

    #[error("credentials: {0}")]
    Credential(#[source] PluginError),

    #[error("record store: {0}")]
    Store(#[source] PluginError),

    #[error("{0}")]
    Export(#[from] ExportError),
}
