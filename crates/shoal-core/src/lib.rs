pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod math;
pub mod types;

pub use catalog::{LiquidTypeCatalog, LiquidTypeDef};
pub use config::LiquidConfig;
pub use error::CatalogError;
pub use types::{LiquidAttributes, LiquidCategory, LiquidTypeId, Vertex, VertexFormat};
