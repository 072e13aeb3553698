use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AclError {
    #[error("Pattern Error: {message} {location}")]
    Pattern {
        message: String,
        location: ErrorLocation,
    },
}

impl From<regex::Error> for AclError {
    #[track_caller]
    fn from(error: regex::Error) -> Self {
        AclError::Pattern {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
