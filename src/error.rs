use crate::Label;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("cannot admit router '{label}': all {capacity} router slots are in use")]
    CapacityExhausted { label: Label, capacity: usize },
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read discovery file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: invalid label {value:?}")]
    InvalidLabel { line: usize, value: String },
    #[error("line {line}: invalid port {value:?}")]
    InvalidPort { line: usize, value: String },
    #[error("line {line}: invalid cost {value:?}")]
    InvalidCost { line: usize, value: String },
    #[error("line {line}: could not resolve an IPv4 address for {host}")]
    Unresolved { line: usize, host: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
