pub mod codec;
pub mod cursor;
pub mod error;
pub mod format;
pub mod legacy;
pub mod modern;

pub use codec::LiquidCodec;
pub use cursor::{ByteReader, ByteWriter};
pub use error::PersistError;
pub use format::{LayerDescriptor, LiquidHeader};
