//! Evaluation settings: IoU threshold, worker count and aggregation strategy.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::Path;

/// Default IoU threshold for a match.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// How worker outcomes are gathered into the final id collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Each chunk writes to a private buffer; buffers are concatenated after the join.
    #[default]
    PerWorkerBuffers,
    /// One shared collection behind a mutex, locked for every append.
    Mutex,
    /// One shared collection behind a readers-writer lock, write-locked for every append.
    RwLock,
}

/// Settings for one `Evaluator::evaluate` call.
///
/// Every field has a default, so a partial JSON document such as
/// `{"iou_threshold": 0.75}` is a complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Minimum IoU for a match, in (0, 1]
    pub iou_threshold: f64,
    /// Worker threads; `None` uses the available hardware parallelism
    pub workers: Option<usize>,
    pub aggregation: Aggregation,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            workers: None,
            aggregation: Aggregation::default(),
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Example
    ///
    /// ```
    /// use bbox_match::config::{Aggregation, EvalConfig};
    ///
    /// let config = EvalConfig::from_json_str(r#"{"aggregation": "mutex"}"#).unwrap();
    /// assert_eq!(config.iou_threshold, 0.5);
    /// assert_eq!(config.aggregation, Aggregation::Mutex);
    /// ```
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let config = config_from(serde_json::from_str(json_str))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EvalError::InputNotFound(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let config = config_from(serde_json::from_reader(reader))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the threshold and worker count.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::InvalidThreshold` if the threshold is not a finite
    /// value in (0, 1], and `EvalError::InvalidWorkerCount` for zero workers.
    pub fn validate(&self) -> Result<()> {
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(EvalError::InvalidThreshold(format!(
                "IoU threshold must be in (0.0, 1.0], got {}",
                self.iou_threshold
            )));
        }

        if let Some(0) = self.workers {
            return Err(EvalError::InvalidWorkerCount(0));
        }

        Ok(())
    }

    /// The worker count this configuration resolves to.
    pub fn resolved_workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }
}

/// Schema errors in a config document are config errors, not record errors.
fn config_from(parsed: serde_json::Result<EvalConfig>) -> Result<EvalConfig> {
    parsed.map_err(|err| match err.classify() {
        serde_json::error::Category::Data => EvalError::InvalidConfig(err.to_string()),
        _ => EvalError::from(err),
    })
}

/// Available hardware parallelism, falling back to a single worker.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
