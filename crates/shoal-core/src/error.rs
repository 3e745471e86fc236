use thiserror::Error;

/// Errors raised while building a liquid type catalog or configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse liquid types RON: {0}")]
    LiquidTypeParseError(String),

    #[error("Failed to parse liquid config RON: {0}")]
    ConfigParseError(String),

    #[error("Duplicate liquid type ID {0}")]
    DuplicateLiquidId(u32),

    #[error("Liquid type ID 0 is reserved for 'no liquid' ('{0}')")]
    ReservedLiquidId(String),
}
