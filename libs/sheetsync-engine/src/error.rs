use sheetsync_api::PluginError;

/// Which sink write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Header,
    Append,
}

impl std::fmt::Display for WriteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteStage::Header => f.write_str("header"),
            WriteStage::Append => f.write_str("append"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store query failed: {0}")]
    Store(#[source] PluginError),

    #[error("sink read ({what}) failed: {source}")]
    SinkRead { what: &'static str, source: PluginError },

    #[error("sink write ({stage}) failed: {source}")]
    SinkWrite { stage: WriteStage, source: PluginError },
}
