use std::time::Duration;

use orime_model::BusLocation;

use crate::session::SessionStore;
use crate::tracking::trackingcontroller::{FetchError, TrackingController};

/// Poll cadence while the engine is on.
const RUNNING_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll cadence while the engine is off, or before the first sample.
const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Delay until the next poll, chosen from the last known sample.
pub fn poll_interval(last: Option<&BusLocation>) -> Duration {
    match last {
        Some(sample) if sample.ignition => RUNNING_POLL_INTERVAL,
        _ => IDLE_POLL_INTERVAL,
    }
}

/// What a single poll did.
#[derive(Debug)]
pub enum PollOutcome {
    /// No usable session in the store. Nothing was fetched.
    NoSession,
    /// A fresh telemetry sample.
    Updated(BusLocation),
    /// The backend rejected the token. The session has been cleared.
    SignedOut,
    /// Transient trouble. Previous state stands, polling may continue.
    Failed(String),
}

/// One poll of the bus assigned to the first student in the session.
///
/// Reads the session at call time, so a logout between polls turns the next
/// tick into a no-op rather than a request with stale credentials.
pub fn poll_once(session: &SessionStore, controller: &dyn TrackingController) -> PollOutcome {
    let Some(stored) = session.load() else {
        return PollOutcome::NoSession;
    };
    let Some(student) = stored.students.first() else {
        return PollOutcome::NoSession;
    };

    match controller.bus_location(&student.bus_id, &stored.access_token) {
        Ok(sample) => PollOutcome::Updated(sample),
        Err(FetchError::AuthRejected) => {
            log::warn!("location request rejected, dropping the session");
            session.clear();
            PollOutcome::SignedOut
        }
        Err(FetchError::Transient(message)) => {
            log::warn!("location request failed: {message}");
            PollOutcome::Failed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use orime_model::{Session, Student};

    use crate::session::SecureStore;

    use super::*;

    enum StubResponse {
        Sample(BusLocation),
        AuthRejected,
        Transient,
    }

    struct StubController {
        response: StubResponse,
        calls: Cell<usize>,
        last_bus: RefCell<String>,
    }

    impl StubController {
        fn new(response: StubResponse) -> Self {
            Self {
                response,
                calls: Cell::new(0),
                last_bus: RefCell::new(String::new()),
            }
        }
    }

    impl TrackingController for StubController {
        fn bus_location(&self, bus_id: &str, _token: &str) -> Result<BusLocation, FetchError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_bus.borrow_mut() = bus_id.to_string();

            match &self.response {
                StubResponse::Sample(sample) => Ok(sample.clone()),
                StubResponse::AuthRejected => Err(FetchError::AuthRejected),
                StubResponse::Transient => Err(FetchError::Transient("connection reset".to_string())),
            }
        }
    }

    fn session_store(name: &str) -> SessionStore {
        let root = std::env::temp_dir().join("orime-poller-tests").join(name);
        let _ = std::fs::remove_dir_all(&root);

        SessionStore::with_store(SecureStore::with_root(root))
    }

    fn seeded_store(name: &str) -> SessionStore {
        let store = session_store(name);
        store
            .store(&Session {
                access_token: "tok-abc".to_string(),
                students: vec![
                    Student {
                        name: "Ananya Sharma".to_string(),
                        usn: "1OR23CS042".to_string(),
                        year: 2,
                        bus_id: "BUS-07".to_string(),
                        institution_name: "Orime Public School".to_string(),
                        home_address: "Malleshwaram".to_string(),
                    },
                    Student {
                        name: "Rohan Sharma".to_string(),
                        usn: "1OR21EC015".to_string(),
                        year: 4,
                        bus_id: "BUS-03".to_string(),
                        institution_name: "Orime Public School".to_string(),
                        home_address: "Malleshwaram".to_string(),
                    },
                ],
            })
            .unwrap();

        store
    }

    fn sample(ignition: bool) -> BusLocation {
        BusLocation {
            vehicle_number: "KA-01-F-1234".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            location: "Sampige Road".to_string(),
            speed: 20.0,
            ignition,
            angle: 30.0,
            timestamp: 1727848800000,
        }
    }

    #[test]
    fn cadence_follows_the_ignition_state() {
        assert_eq!(poll_interval(None), Duration::from_secs(60));
        assert_eq!(poll_interval(Some(&sample(true))), Duration::from_secs(5));
        assert_eq!(poll_interval(Some(&sample(false))), Duration::from_secs(60));
    }

    #[test]
    fn missing_session_skips_the_fetch() {
        let store = session_store("missing-session");
        let controller = StubController::new(StubResponse::Sample(sample(true)));

        assert!(matches!(
            poll_once(&store, &controller),
            PollOutcome::NoSession
        ));
        assert_eq!(controller.calls.get(), 0);
    }

    #[test]
    fn polls_the_first_students_bus() {
        let store = seeded_store("first-student");
        let controller = StubController::new(StubResponse::Sample(sample(true)));

        let outcome = poll_once(&store, &controller);

        assert!(matches!(outcome, PollOutcome::Updated(_)));
        assert_eq!(*controller.last_bus.borrow(), "BUS-07");
    }

    #[test]
    fn auth_rejection_clears_the_session() {
        let store = seeded_store("auth-rejection");
        let controller = StubController::new(StubResponse::AuthRejected);

        assert!(matches!(
            poll_once(&store, &controller),
            PollOutcome::SignedOut
        ));
        assert!(store.load().is_none());

        // The next tick finds no session and never calls out.
        assert!(matches!(
            poll_once(&store, &controller),
            PollOutcome::NoSession
        ));
        assert_eq!(controller.calls.get(), 1);
    }

    #[test]
    fn transient_failure_keeps_the_session() {
        let store = seeded_store("transient");
        let controller = StubController::new(StubResponse::Transient);

        let outcome = poll_once(&store, &controller);

        match outcome {
            PollOutcome::Failed(message) => assert_eq!(message, "connection reset"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(store.load().is_some());
    }
}
