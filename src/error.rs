//! Error types for rebar cut optimization.

use thiserror::Error;

/// Error while optimizing or reading input.
#[derive(Debug, Error)]
pub enum Error {
    /// Stock length must be a finite number greater than zero.
    #[error("invalid stock length {0}: must be finite and greater than zero")]
    InvalidStockLength(f64),

    /// Cut width must be a finite number that is zero or greater.
    #[error("invalid cut width {0}: must be finite and not negative")]
    InvalidCutWidth(f64),

    /// The optimizer needs at least one trial.
    #[error("trial count must be at least 1")]
    InvalidTrialCount,

    /// A cut piece had a length that is zero, negative, or not finite.
    #[error("invalid cut piece length {length} (external id {external_id:?})")]
    InvalidPieceLength {
        /// ID the caller gave the offending cut piece.
        external_id: Option<usize>,
        /// The rejected length.
        length: f64,
    },

    /// A cut piece is longer than the stock bar, so no bar can ever hold it.
    #[error("cut piece length {length} exceeds stock length {stock_length} (external id {external_id:?})")]
    OversizedPiece {
        /// ID the caller gave the offending cut piece.
        external_id: Option<usize>,
        /// Length of the cut piece.
        length: f64,
        /// Stock length it was checked against.
        stock_length: f64,
    },

    /// A line of a cut list or schedule could not be read.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Optimizing one diameter of a schedule failed.
    #[error("diameter {diameter} mm: {source}")]
    Diameter {
        /// Bar diameter in millimeters.
        diameter: u32,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },
}

/// Result type alias for optimizer operations.
pub type Result<T> = std::result::Result<T, Error>;
