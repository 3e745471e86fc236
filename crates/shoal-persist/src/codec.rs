use shoal_core::catalog::LiquidTypeCatalog;
use shoal_core::config::LiquidConfig;
use shoal_world::stack::LiquidLayerStack;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::PersistError;
use crate::{legacy, modern};

/// Reading and writing a chunk's liquid in both on-disk layouts.
pub trait LiquidCodec {
    /// Load modern multi-layer liquid. The reader ends just past the header.
    fn decode(
        &mut self,
        reader: &mut ByteReader<'_>,
        base_offset: usize,
        catalog: &LiquidTypeCatalog,
    ) -> Result<(), PersistError>;

    /// Save as modern multi-layer liquid with the header at `header_pos`.
    /// Returns the number of layers written.
    fn encode(
        &mut self,
        writer: &mut ByteWriter,
        base_offset: usize,
        header_pos: usize,
    ) -> Result<usize, PersistError>;

    /// Load `records` legacy records. Returns the number of records read.
    fn decode_legacy(
        &mut self,
        reader: &mut ByteReader<'_>,
        records: usize,
        catalog: &LiquidTypeCatalog,
        config: &LiquidConfig,
    ) -> usize;

    /// Save one legacy record per layer. Returns the record count.
    fn encode_legacy(&mut self, writer: &mut ByteWriter, chunk_flags: &mut u32) -> usize;
}

impl LiquidCodec for LiquidLayerStack {
    fn decode(
        &mut self,
        reader: &mut ByteReader<'_>,
        base_offset: usize,
        catalog: &LiquidTypeCatalog,
    ) -> Result<(), PersistError> {
        modern::decode_stack(self, reader, base_offset, catalog)
    }

    fn encode(
        &mut self,
        writer: &mut ByteWriter,
        base_offset: usize,
        header_pos: usize,
    ) -> Result<usize, PersistError> {
        modern::encode_stack(self, writer, base_offset, header_pos)
    }

    fn decode_legacy(
        &mut self,
        reader: &mut ByteReader<'_>,
        records: usize,
        catalog: &LiquidTypeCatalog,
        config: &LiquidConfig,
    ) -> usize {
        legacy::decode_legacy(self, reader, records, catalog, config)
    }

    fn encode_legacy(&mut self, writer: &mut ByteWriter, chunk_flags: &mut u32) -> usize {
        legacy::encode_legacy(self, writer, chunk_flags)
    }
}
