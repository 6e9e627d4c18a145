use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Precondition violations caught before any geometry is produced.
///
/// A piece that simply does not fit is not an error: it ends up in
/// [`Solution::unplaced`](crate::types::Solution::unplaced).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid stock: {0}")]
    InvalidStock(String),

    #[error("invalid piece #{index}: {reason}")]
    InvalidPiece { index: usize, reason: String },
}
