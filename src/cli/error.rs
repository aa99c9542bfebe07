//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => infra_exit_code(e),
        }
    }
}

fn infra_exit_code(e: &InfraError) -> i32 {
    match e {
        InfraError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            exitcode::NOINPUT
        }
        InfraError::Io { .. } => exitcode::IOERR,
        InfraError::Archive { .. } | InfraError::Markup { .. } | InfraError::MissingPart(_) => {
            exitcode::DATAERR
        }
        InfraError::Application(app) => match app {
            ApplicationError::Domain(_) => exitcode::DATAERR,
            ApplicationError::Config { .. } => exitcode::CONFIG,
            ApplicationError::SectionOutOfRange { .. } => exitcode::USAGE,
            ApplicationError::OperationFailed { source, .. } => source
                .downcast_ref::<InfraError>()
                .map_or(exitcode::SOFTWARE, infra_exit_code),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_file_when_mapping_then_noinput() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CliError = ApplicationError::OperationFailed {
            context: "load package".into(),
            source: Box::new(InfraError::io("open", io)),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
    }

    #[test]
    fn given_structural_error_when_mapping_then_dataerr() {
        let err: CliError = DomainError::structural("detached").into();
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_section_out_of_range_when_mapping_then_usage() {
        let err: CliError = ApplicationError::SectionOutOfRange { index: 4, count: 2 }.into();
        assert_eq!(err.exit_code(), exitcode::USAGE);
    }
}
