use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerritoryError {
    #[error("Reference data error: {0}")]
    Reference(String),

    #[error("Annotation error: {0}")]
    Annotation(String),

    #[error("Coverage error: {0}")]
    Coverage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, TerritoryError>;
