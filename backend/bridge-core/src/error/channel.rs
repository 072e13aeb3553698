use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ChannelError {
    #[error("Missing Channel Error: {message} {location}")]
    Missing {
        message: String,
        location: ErrorLocation,
    },
}
