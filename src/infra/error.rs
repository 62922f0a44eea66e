use thiserror::Error;

/// Failures raised while bringing the process up: socket binding, pool
/// construction, migrations, subscriber installation and settings that
/// cannot be acted on.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("database failure: {0}")]
    Database(String),
    #[error("telemetry setup failed: {0}")]
    Telemetry(String),
    #[error("invalid runtime configuration: {0}")]
    Configuration(String),
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
