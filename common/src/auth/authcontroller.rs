use orime_model::Session;

/// Why an authentication call failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The mobile number is malformed. Nothing was sent to the backend.
    #[error("enter a valid 10-digit mobile number")]
    InvalidMobileNumber,

    /// The OTP is malformed. Nothing was sent to the backend.
    #[error("enter the 6-digit OTP")]
    InvalidOtp,

    /// The backend refused the request, with its own message.
    #[error("{0}")]
    Rejected(String),

    /// Transport or decoding trouble. Trying again may help.
    #[error("{0}")]
    Transient(String),
}

pub type AuthControllerPointer = Box<dyn AuthController + Send>;

/// The authentication controller trait that drives the OTP flow.
pub trait AuthController {
    /// Asks the backend to send a one-time password to `mobile_number`.
    ///
    /// Malformed numbers are rejected locally, without a network call.
    /// Returns the backend's status message.
    fn send_otp(&self, mobile_number: &str) -> Result<String, AuthError>;

    /// Exchanges the OTP for a session token and the student list.
    ///
    /// Malformed input is rejected locally, without a network call.
    fn verify_otp(&self, mobile_number: &str, otp: &str) -> Result<Session, AuthError>;
}
