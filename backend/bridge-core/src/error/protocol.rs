use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProtocolError {
    #[error("Bad Uri Error: {message} {location}")]
    BadUri {
        message: String,
        location: ErrorLocation,
    },
}
