use std::error::Error;
use std::fmt;
use tokio_cron_scheduler::JobSchedulerError;

/// Custom Error and Result types to unify errors from all sources.
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Malformed input: negative score, unparsable identifier, bad page request.
    Validation(String),
    /// The score store is unreachable or rejected a read/write.
    Persistence(String),
    NotFound(String),
    Scheduler(String),
    Config(String),
    Template(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoardError::Validation(s) => write!(f, "Validation Error: {}", s),
            BoardError::Persistence(s) => write!(f, "Persistence Error: {}", s),
            BoardError::NotFound(s) => write!(f, "Not Found: {}", s),
            BoardError::Scheduler(s) => write!(f, "Scheduler Error: {}", s),
            BoardError::Config(s) => write!(f, "Config Error: {}", s),
            BoardError::Template(s) => write!(f, "Template Error: {}", s),
        }
    }
}

impl Error for BoardError {}

impl BoardError {
    /// Wrap any store-side failure, keeping a short context of what was attempted.
    pub fn persistence(context: &str, cause: impl fmt::Display) -> Self {
        BoardError::Persistence(format!("{context}: {cause}"))
    }
}

impl From<JobSchedulerError> for BoardError {
    fn from(error: JobSchedulerError) -> Self {
        BoardError::Scheduler(error.to_string())
    }
}

impl From<figment::Error> for BoardError {
    fn from(error: figment::Error) -> Self {
        BoardError::Config(error.to_string())
    }
}

impl From<minijinja::Error> for BoardError {
    fn from(error: minijinja::Error) -> Self {
        BoardError::Template(error.to_string())
    }
}

impl From<uuid::Error> for BoardError {
    fn from(error: uuid::Error) -> Self {
        BoardError::Validation(format!("malformed identifier. {error}"))
    }
}
