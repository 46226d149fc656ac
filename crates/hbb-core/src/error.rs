//! Error types for the boosted H→bb analysis

use thiserror::Error;

/// Analysis error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A fill targeted a collection name that was never booked
    #[error("collection '{0}' was filled before being booked")]
    UnbookedCollection(String),

    /// A booking or fill disagrees with the shape a collection was booked with
    #[error("booking mismatch for '{name}': booked as {booked}, used as {requested}")]
    BookingMismatch {
        /// Collection name.
        name: String,
        /// Shape the collection was booked with.
        booked: &'static str,
        /// Shape the caller asked for.
        requested: &'static str,
    },

    /// Two histogram banks (or histograms) cannot be summed
    #[error("incompatible merge: {0}")]
    IncompatibleMerge(String),

    /// Cross-section normalisation cannot proceed
    #[error("normalization error: {0}")]
    Normalization(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_mismatch_message_names_both_shapes() {
        let err = Error::BookingMismatch {
            name: "Higgs".into(),
            booked: "single",
            requested: "pair",
        };
        let msg = err.to_string();
        assert!(msg.contains("Higgs"));
        assert!(msg.contains("single"));
        assert!(msg.contains("pair"));
    }

    #[test]
    fn io_error_converts() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(Error::Io(_))));
    }
}
