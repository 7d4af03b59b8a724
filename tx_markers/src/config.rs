use serde::Deserialize;
use std::{fs, sync::Arc};

use crate::error::{MarkerError, MarkerResult};
use crate::sink::{StderrSink, StdoutSink};
use crate::transactions::DynSink;

/// Where markers built from config are written.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkTarget {
    #[default]
    Stdout,
    Stderr,
}

impl SinkTarget {
    pub fn open(self) -> DynSink {
        match self {
            SinkTarget::Stdout => Arc::new(StdoutSink),
            SinkTarget::Stderr => Arc::new(StderrSink),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MarkerConfig {
    #[serde(default)]
    pub sink: SinkTarget,
}

impl MarkerConfig {
    pub fn load(config_path: &str) -> MarkerResult<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| MarkerError::config_read(config_path, e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> MarkerResult<Self> {
        Ok(serde_yml::from_str(contents)?)
    }
}
