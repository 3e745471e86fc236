/// Errors that can occur while reading or writing liquid data.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("truncated liquid data: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("offset {offset} lies outside the {len}-byte buffer")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("value {0} does not fit a 32-bit liquid offset")]
    OffsetOverflow(usize),
}
