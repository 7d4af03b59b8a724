use std::io;

/// Errors raised while writing markers or loading marker configuration.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("Failed to write marker {marker}: {source}")]
    SinkWrite {
        marker: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {source}")]
    ConfigParse {
        #[from]
        source: serde_yml::Error,
    },
}

impl MarkerError {
    pub fn sink_write(marker: &'static str, source: io::Error) -> Self {
        Self::SinkWrite { marker, source }
    }

    pub fn config_read(path: impl Into<String>, source: io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }
}

pub type MarkerResult<T = ()> = Result<T, MarkerError>;
