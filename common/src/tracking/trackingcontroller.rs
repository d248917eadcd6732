use std::sync::{Arc, Mutex};

use orime_model::BusLocation;

/// Why a telemetry fetch failed.
///
/// Callers are expected to match on this exhaustively: an `AuthRejected`
/// invalidates the whole session, anything else only the current call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The backend no longer accepts the session token.
    #[error("not authorized")]
    AuthRejected,

    /// Transport, status or decoding trouble. The next poll may succeed.
    #[error("{0}")]
    Transient(String),
}

pub type TrackingControllerPointer = Box<dyn TrackingController + Send>;

pub type TrackingControllerSharedPointer = Arc<Mutex<TrackingControllerPointer>>;

/// The tracking controller trait that provides bus telemetry.
pub trait TrackingController {
    /// Fetches the latest telemetry sample for `bus_id`.
    fn bus_location(&self, bus_id: &str, token: &str) -> Result<BusLocation, FetchError>;
}
