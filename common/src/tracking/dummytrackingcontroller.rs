use std::cell::Cell;

use orime_model::BusLocation;

use crate::tracking::trackingcontroller::{FetchError, TrackingController};

/// Replays a scripted route, one sample per call.
///
/// Lets the frontends run the map screen with no backend at all. The route
/// wraps around at the end.
pub struct DummyTrackingController {
    route: Vec<BusLocation>,
    next: Cell<usize>,
}

impl DummyTrackingController {
    pub fn new() -> Result<Self, serde_json::Error> {
        let json_data = std::include_str!("./dummyroute.json");

        Ok(Self {
            route: serde_json::from_str(json_data)?,
            next: Cell::new(0),
        })
    }
}

impl TrackingController for DummyTrackingController {
    fn bus_location(&self, _bus_id: &str, _token: &str) -> Result<BusLocation, FetchError> {
        if self.route.is_empty() {
            return Err(FetchError::Transient("the scripted route is empty".to_string()));
        }

        let index = self.next.get();
        self.next.set((index + 1) % self.route.len());

        Ok(self.route[index].clone())
    }
}

#[test]
fn test_dummy_tracking_controller() {
    let controller = DummyTrackingController::new().unwrap();

    let first = controller.bus_location("BUS-07", "dummy-token").unwrap();
    assert_eq!(first.vehicle_number, "KA-01-F-1234");
    assert!(first.ignition);

    // Successive calls walk the route and wrap around.
    let mut last = first.clone();
    for _ in 0..6 {
        last = controller.bus_location("BUS-07", "dummy-token").unwrap();
    }
    assert_eq!(last, first);
}
