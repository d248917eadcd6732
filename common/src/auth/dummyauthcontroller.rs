use orime_model::{is_valid_mobile_number, is_valid_otp, Session, Student};

use crate::auth::authcontroller::{AuthController, AuthError};

/// Accepts any well-formed credentials and hands out a canned session.
///
/// Lets the frontends run the whole flow with no backend at all.
pub struct DummyAuthController {
    students: Vec<Student>,
}

impl DummyAuthController {
    pub fn new() -> Result<Self, serde_json::Error> {
        let json_data = std::include_str!("./dummystudents.json");

        Ok(Self {
            students: serde_json::from_str(json_data)?,
        })
    }
}

impl AuthController for DummyAuthController {
    fn send_otp(&self, mobile_number: &str) -> Result<String, AuthError> {
        if !is_valid_mobile_number(mobile_number) {
            return Err(AuthError::InvalidMobileNumber);
        }

        Ok(format!("OTP sent to {mobile_number}"))
    }

    fn verify_otp(&self, mobile_number: &str, otp: &str) -> Result<Session, AuthError> {
        if !is_valid_mobile_number(mobile_number) {
            return Err(AuthError::InvalidMobileNumber);
        }
        if !is_valid_otp(otp) {
            return Err(AuthError::InvalidOtp);
        }

        Ok(Session {
            access_token: "dummy-token".to_string(),
            students: self.students.clone(),
        })
    }
}

#[test]
fn test_dummy_auth_controller() {
    let controller = DummyAuthController::new().unwrap();

    let session = controller.verify_otp("9876543210", "123456").unwrap();
    assert_eq!(session.access_token, "dummy-token");
    assert_eq!(session.students.len(), 2);
    assert_eq!(session.students[0].name, "Ananya Sharma");
    assert_eq!(session.students[0].bus_id, "BUS-07");
}

#[test]
fn test_verified_session_round_trips_through_the_store() {
    use crate::session::{SecureStore, SessionStore};

    let root = std::env::temp_dir().join("orime-auth-tests").join("verify-store");
    let _ = std::fs::remove_dir_all(&root);
    let store = SessionStore::with_store(SecureStore::with_root(root));

    let controller = DummyAuthController::new().unwrap();
    let session = controller.verify_otp("9876543210", "123456").unwrap();
    store.store(&session).unwrap();

    // The store afterwards holds the returned token and exactly the
    // returned student list, in order.
    let loaded = store.load().unwrap();
    assert_eq!(loaded.access_token, session.access_token);
    assert_eq!(loaded.students, session.students);
}

#[test]
fn test_malformed_input_is_rejected_locally() {
    let controller = DummyAuthController::new().unwrap();

    assert!(matches!(
        controller.send_otp("1234567890"),
        Err(AuthError::InvalidMobileNumber)
    ));
    assert!(matches!(
        controller.send_otp("98765"),
        Err(AuthError::InvalidMobileNumber)
    ));
    assert!(matches!(
        controller.verify_otp("9876543210", "12345"),
        Err(AuthError::InvalidOtp)
    ));
}
