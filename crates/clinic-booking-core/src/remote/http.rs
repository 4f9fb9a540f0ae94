//! HTTP client for the clinic record store.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{RecordStore, RemoteError, RemoteResult};
use crate::models::{Appointment, Doctor, NewAppointment};

/// Record store reached over its JSON REST API.
pub struct HttpRecordStore {
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

/// Error body returned by every failing route.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpRecordStore {
    /// Create a client for the store at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str, timeout_secs: u64) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/appointments/{id}` with `id` escaped as a single path segment.
    fn record_url(&self, id: &str) -> RemoteResult<Url> {
        let mut url = Url::parse(&self.url("/appointments"))
            .map_err(|e| RemoteError::Client(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Client(format!("{} cannot hold a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                RemoteError::Unreachable(format!(
                    "request to {} timed out after {}s",
                    self.base_url, self.timeout_secs
                ))
            } else {
                RemoteError::Unreachable(format!("{}: {}", self.base_url, e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));

        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::BAD_REQUEST => RemoteError::Rejected(message),
            _ => RemoteError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        response
            .json::<T>()
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

impl RecordStore for HttpRecordStore {
    fn list_doctors(&self, disease: Option<&str>) -> RemoteResult<Vec<Doctor>> {
        let mut request = self.client.get(self.url("/doctors"));
        if let Some(disease) = disease {
            request = request.query(&[("disease", disease)]);
        }
        Self::decode(self.send(request)?)
    }

    fn list_appointments(&self) -> RemoteResult<Vec<Appointment>> {
        let request = self.client.get(self.url("/appointments"));
        Self::decode(self.send(request)?)
    }

    fn create_appointment(&self, payload: &NewAppointment) -> RemoteResult<Appointment> {
        let request = self.client.post(self.url("/appointments")).json(payload);
        Self::decode(self.send(request)?)
    }

    fn update_appointment(&self, id: &str, payload: &NewAppointment) -> RemoteResult<Appointment> {
        let request = self
            .client
            .put(self.record_url(id)?)
            .json(payload);
        Self::decode(self.send(request)?)
    }

    fn delete_appointment(&self, id: &str) -> RemoteResult<()> {
        let request = self.client.delete(self.record_url(id)?);
        self.send(request).map(|_| ())
    }
}
