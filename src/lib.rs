#![doc = include_str!("RUSTDOC.md")]

mod api;
mod batch;
mod config;
mod serialize;
mod stats;

pub mod debug;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod hit;
pub mod parameter;
pub mod response;
pub mod transport;

pub use api::{GoogleAnalytics, GoogleAnalyticsBuilder};
pub use config::AnalyticsConfig;
pub use debug::HitValidationResponse;
pub use discovery::{ParameterDiscoverer, SystemParameterDiscoverer};
pub use error::{
    AnalyticsError, AnalyticsErrorCode, AnalyticsResult, ErrorHandler, LoggingErrorHandler,
    PropagatingErrorHandler,
};
pub use executor::ResponseFuture;
pub use hit::types::{
    AnyHit, AppViewHit, EventHit, ExceptionHit, ItemHit, PageViewHit, ScreenViewHit, SocialHit,
    TimingHit, TransactionHit,
};
pub use hit::Hit;
pub use parameter::Parameter;
pub use response::Response;
pub use stats::StatsSnapshot;
pub use transport::{HttpBatchRequest, HttpRequest, HttpResponse, HttpTransport, ReqwestHttpTransport};
