pub mod config;
pub mod gate;
pub mod rpc;
pub mod transcode;
pub mod wire;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Wire(#[from] wire::WireError),

    #[error(transparent)]
    Rpc(#[from] rpc::RpcError),

    #[error(transparent)]
    Transcode(#[from] transcode::TranscodeError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Gate(#[from] gate::GateError),
}
