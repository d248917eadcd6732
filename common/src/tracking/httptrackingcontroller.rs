use reqwest::StatusCode;

use orime_model::BusLocation;

use crate::tracking::trackingcontroller::{FetchError, TrackingController};

/// Fetches telemetry from the real backend.
pub struct HttpTrackingController {
    base_url: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpTrackingController {
    pub fn new(base_url: &str) -> std::io::Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?,
        })
    }
}

impl TrackingController for HttpTrackingController {
    fn bus_location(&self, bus_id: &str, token: &str) -> Result<BusLocation, FetchError> {
        let url = format!("{}/api/location/{}", self.base_url, bus_id);

        self.runtime.block_on(async {
            let response = self
                .client
                .get(&url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| FetchError::Transient(e.to_string()))?;

            let status = response.status();
            log::debug!("GET {url} -> {status}");

            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::AuthRejected),
                status if !status.is_success() => {
                    Err(FetchError::Transient(format!("unexpected status {status}")))
                }
                _ => response
                    .json::<BusLocation>()
                    .await
                    .map_err(|e| FetchError::Transient(e.to_string())),
            }
        })
    }
}
