use reelvault_av::CaptureSinks;
use reelvault_core::config::{ToolsConfig, DEFAULT_STORAGE_CLASS};
use std::path::PathBuf;

/// Fully resolved settings of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Existing directory scanned for files to transcode.
    pub ingest: PathBuf,

    /// Opaque bucket destination for the sync tool.
    pub bucket: String,

    /// Archive root, created on demand.
    pub archive: PathBuf,

    /// Persistent encode workspace; `None` selects a temporary one.
    pub encode: Option<PathBuf>,

    /// Capture files for the encoder's output streams.
    pub debug: CaptureSinks,

    pub tools: ToolsConfig,

    /// Storage class requested for uploaded objects.
    pub storage_class: String,
}

impl RunConfig {
    pub fn new(ingest: impl Into<PathBuf>, bucket: impl Into<String>, archive: impl Into<PathBuf>) -> Self {
        Self {
            ingest: ingest.into(),
            bucket: bucket.into(),
            archive: archive.into(),
            encode: None,
            debug: CaptureSinks::default(),
            tools: ToolsConfig::default(),
            storage_class: DEFAULT_STORAGE_CLASS.to_string(),
        }
    }

    pub fn with_encode(mut self, encode: impl Into<PathBuf>) -> Self {
        self.encode = Some(encode.into());
        self
    }

    pub fn with_debug(mut self, debug: CaptureSinks) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_tools(mut self, tools: ToolsConfig) -> Self {
        self.tools = tools;
        self
    }
}
