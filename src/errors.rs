use std::error::Error;
use std::fmt::Debug;

use simple_error::bail;
use thiserror::Error;

/// Top-level error type used by the CLI entry point and anything that talks
/// to the database. Mirrors the teacher's `FnResult` alias: most glue code
/// just wants "any error, boxed", while individual pipeline stages use the
/// more specific [`PipelineError`] below.
pub type FnResult<R> = std::result::Result<R, Box<dyn Error + Send + Sync>>;

pub trait OrError<T> {
    fn or_error(self, message: &str) -> FnResult<T>;
}

impl<T> OrError<T> for Option<T> {
    fn or_error(self, message: &str) -> FnResult<T> {
        match self {
            Some(t) => Ok(t),
            None => bail!(message.to_string()),
        }
    }
}

impl<T, E> OrError<T> for std::result::Result<T, E>
where
    E: Debug,
{
    fn or_error(self, message: &str) -> FnResult<T> {
        match self {
            Ok(t) => Ok(t),
            Err(e) => bail!(format!("{}\nInner error message: {:?}", message, e)),
        }
    }
}

/// The error taxonomy from the design's error handling section.
///
/// `Infrastructure` is fatal and should abort the whole run; every other
/// variant is caught by the per-route worker, logged, and causes that one
/// route to be skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("infrastructure failure: {0}")]
    Infrastructure(String),

    #[error("no active route definition for route {route_id} on {date}")]
    MissingRouteData { route_id: String, date: String },

    #[error("no active schedule for route {route_id} on {date}")]
    MissingSchedule { route_id: String, date: String },

    #[error("no schedule entries for service class {service_class} (route {route_id}, {date})")]
    NoServiceForDate {
        route_id: String,
        date: String,
        service_class: String,
    },

    #[error("malformed data for route {route_id}: {reason}")]
    MalformedData { route_id: String, reason: String },

    #[error("degenerate schedule for route {route_id}: {reason}")]
    DegenerateSchedule { route_id: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Db(#[from] mysql::Error),
}

impl PipelineError {
    /// Whether this error should abort the whole run, as opposed to just
    /// skipping the route that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Infrastructure(_))
    }
}
