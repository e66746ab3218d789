use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Raised by [`crate::engine::CancelToken::check`] when a batch must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancelled {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cancelled::Cancelled => f.write_str("scoring run cancelled"),
            Cancelled::DeadlineExceeded => f.write_str("scoring run deadline exceeded"),
        }
    }
}

impl std::error::Error for Cancelled {}

/// A batch that did not reach `completed`.
///
/// `run_id` is `None` only when the run row itself could not be written.
#[derive(Debug)]
pub struct RunFailure {
    pub run_id: Option<i64>,
    pub error: anyhow::Error,
}

impl RunFailure {
    pub fn new(run_id: Option<i64>, error: anyhow::Error) -> Self {
        Self { run_id, error }
    }

    pub fn is_cancelled(&self) -> bool {
        self.error.downcast_ref::<Cancelled>().is_some()
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.run_id {
            Some(id) => write!(f, "scoring run {} failed: {:#}", id, self.error),
            None => write!(f, "scoring run failed before start: {:#}", self.error),
        }
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}
