pub mod acl;
pub mod channel;
pub mod command;
pub mod plugin;
pub mod protocol;

use common::ErrorLocation;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Acl(#[from] acl::AclError),

    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    #[error(transparent)]
    Command(#[from] command::CommandError),

    #[error(transparent)]
    Plugin(#[from] plugin::PluginError),

    #[error(transparent)]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },
}
