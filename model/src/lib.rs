use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A geographic coordinate.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A student enrolled on a bus route, as returned at verification time.
///
/// The snapshot is immutable; it is not refreshed independently of the
/// session it arrived with.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Student {
    pub name: String,
    pub usn: String,
    pub year: u32,
    pub bus_id: String,
    pub institution_name: String,
    pub home_address: String,
}

/// An authenticated session: the bearer token and the students it covers.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub students: Vec<Student>,
}

/// One reported snapshot of a bus's position and status.
///
/// Field names follow the backend wire format.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusLocation {
    pub vehicle_number: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable label for the current position.
    pub location: String,
    /// Speed in km/h.
    pub speed: f64,
    /// Whether the engine is running.
    pub ignition: bool,
    /// Heading in degrees, clockwise from north.
    pub angle: f32,
    /// Sample time, epoch milliseconds.
    pub timestamp: i64,
}

impl BusLocation {
    /// The sample's coordinate.
    pub fn position(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

static MOBILE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").unwrap());

/// Whether `number` is a dialable 10-digit mobile number.
pub fn is_valid_mobile_number(number: &str) -> bool {
    MOBILE_NUMBER_PATTERN.is_match(number)
}

/// Whether `otp` is a 6-digit one-time password.
pub fn is_valid_otp(otp: &str) -> bool {
    otp.len() == 6 && otp.bytes().all(|b| b.is_ascii_digit())
}

#[test]
fn test_mobile_number_validation() {
    assert!(is_valid_mobile_number("9876543210"));
    assert!(is_valid_mobile_number("6000000000"));

    // Leading digit must be 6 to 9.
    assert!(!is_valid_mobile_number("1234567890"));
    assert!(!is_valid_mobile_number("987654321"));
    assert!(!is_valid_mobile_number("98765432101"));
    assert!(!is_valid_mobile_number("98765abc10"));
    assert!(!is_valid_mobile_number(""));
}

#[test]
fn test_otp_validation() {
    assert!(is_valid_otp("123456"));
    assert!(is_valid_otp("000000"));

    assert!(!is_valid_otp("12345"));
    assert!(!is_valid_otp("1234567"));
    assert!(!is_valid_otp("12345a"));
    assert!(!is_valid_otp(""));
}

#[test]
fn test_bus_location_wire_format() {
    let json = r#"{
        "vehicleNumber": "KA-01-F-1234",
        "latitude": 12.9716,
        "longitude": 77.5946,
        "location": "Majestic, Bengaluru",
        "speed": 32.5,
        "ignition": true,
        "angle": 45.0,
        "timestamp": 1727848800000
    }"#;

    let sample: BusLocation = serde_json::from_str(json).unwrap();
    assert_eq!(sample.vehicle_number, "KA-01-F-1234");
    assert_eq!(sample.position().latitude, 12.9716);
    assert!(sample.ignition);
}
