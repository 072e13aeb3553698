use crate::error::command::CommandError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PluginError {
    #[error("Plugin Setup Error: {message} {location}")]
    Setup {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CommandError> for PluginError {
    #[track_caller]
    fn from(error: CommandError) -> Self {
        PluginError::Setup {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
