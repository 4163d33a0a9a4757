use marketbrief_core::ConfigError;
use marketbrief_report::{DeliveryError, PipelineError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            // An empty or duplicated request list is a configuration problem.
            Self::Config(_) | Self::Pipeline(PipelineError::Aggregate(_)) => 2,
            Self::Delivery(_) | Self::Io(_) => 10,
        }
    }
}
