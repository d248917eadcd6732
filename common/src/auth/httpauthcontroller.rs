use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use orime_model::{is_valid_mobile_number, is_valid_otp, Session};

use crate::auth::authcontroller::{AuthController, AuthError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpRequest<'a> {
    mobile_number: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpRequest<'a> {
    mobile_number: &'a str,
    otp: &'a str,
}

/// Success and failure responses both carry a `message` field.
#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// Drives the OTP flow against the real backend.
pub struct HttpAuthController {
    base_url: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpAuthController {
    pub fn new(base_url: &str) -> std::io::Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?,
        })
    }

    /// POST `body` as JSON and return the response status and text.
    fn post(&self, path: &str, body: &impl Serialize) -> Result<(StatusCode, String), AuthError> {
        let url = format!("{}{}", self.base_url, path);

        self.runtime.block_on(async {
            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| AuthError::Transient(e.to_string()))?;

            let status = response.status();
            log::debug!("POST {url} -> {status}");

            let text = response
                .text()
                .await
                .map_err(|e| AuthError::Transient(e.to_string()))?;

            Ok((status, text))
        })
    }

    /// The backend reports refusals as a JSON body with a `message` field.
    fn rejection(status: StatusCode, body: &str) -> AuthError {
        match serde_json::from_str::<MessageBody>(body) {
            Ok(body) => AuthError::Rejected(body.message),
            Err(_) => AuthError::Rejected(format!("request failed with status {status}")),
        }
    }
}

impl AuthController for HttpAuthController {
    fn send_otp(&self, mobile_number: &str) -> Result<String, AuthError> {
        if !is_valid_mobile_number(mobile_number) {
            return Err(AuthError::InvalidMobileNumber);
        }

        let (status, body) =
            self.post("/api/auth/parent/send-otp", &SendOtpRequest { mobile_number })?;

        if !status.is_success() {
            return Err(Self::rejection(status, &body));
        }

        Ok(serde_json::from_str::<MessageBody>(&body)
            .map(|body| body.message)
            .unwrap_or_else(|_| "OTP sent".to_string()))
    }

    fn verify_otp(&self, mobile_number: &str, otp: &str) -> Result<Session, AuthError> {
        if !is_valid_mobile_number(mobile_number) {
            return Err(AuthError::InvalidMobileNumber);
        }
        if !is_valid_otp(otp) {
            return Err(AuthError::InvalidOtp);
        }

        let (status, body) = self.post(
            "/api/auth/parent/verify-otp",
            &VerifyOtpRequest { mobile_number, otp },
        )?;

        if !status.is_success() {
            return Err(Self::rejection(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| AuthError::Transient(e.to_string()))
    }
}

#[test]
fn test_malformed_input_never_reaches_the_wire() {
    // An unroutable base url: a request that actually went out would come
    // back as Transient, not as a validation error.
    let controller = HttpAuthController::new("http://127.0.0.1:1").unwrap();

    assert!(matches!(
        controller.send_otp("1234567890"),
        Err(AuthError::InvalidMobileNumber)
    ));
    assert!(matches!(
        controller.verify_otp("9876543210", "12"),
        Err(AuthError::InvalidOtp)
    ));
}
