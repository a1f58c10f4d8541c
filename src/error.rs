use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalyticsErrorCode {
    InvalidArgument,
    Internal,
    Network,
    Parse,
}

impl AnalyticsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsErrorCode::InvalidArgument => "analytics/invalid-argument",
            AnalyticsErrorCode::Internal => "analytics/internal",
            AnalyticsErrorCode::Network => "analytics/network",
            AnalyticsErrorCode::Parse => "analytics/parse",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnalyticsError {
    pub code: AnalyticsErrorCode,
    message: String,
}

impl AnalyticsError {
    pub fn new(code: AnalyticsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for AnalyticsError {}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

pub fn invalid_argument(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::InvalidArgument, message)
}

pub fn internal_error(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::Internal, message)
}

pub fn network_error(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::Network, message)
}

pub fn parse_error(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::Parse, message)
}

/// Decides what happens to errors raised while dispatching a hit.
///
/// The handler sits at the `send`/`send_async` boundary: transport failures
/// and merge failures are routed through it instead of unwinding into the
/// host application.
pub trait ErrorHandler: Send + Sync {
    /// Returning `Ok(())` swallows the error; returning `Err` makes the
    /// triggering `send` call (or the pending `ResponseFuture`) observe it.
    fn on_error(&self, error: AnalyticsError) -> AnalyticsResult<()>;
}

/// Default policy: log a warning and continue. A broken network never
/// crashes the host application.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn on_error(&self, error: AnalyticsError) -> AnalyticsResult<()> {
        log::warn!("analytics dispatch failed: {error}");
        Ok(())
    }
}

/// Alternate policy: re-surface every dispatch error to the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropagatingErrorHandler;

impl ErrorHandler for PropagatingErrorHandler {
    fn on_error(&self, error: AnalyticsError) -> AnalyticsResult<()> {
        Err(error)
    }
}
