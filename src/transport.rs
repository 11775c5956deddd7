use std::future::Future;

use serde_json::Value;

/// Raw HTTP response of the camera: the status code and the undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure of the transport itself. No response was received from the camera.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Timeout occured while waiting for the camera")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Unable to connect to the camera: {0}")]
    Connect(String),

    #[error("Internal I/O error occured")]
    Io(#[from] std::io::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// HTTP transport to the camera's Web API, supplied by the caller.
///
/// Implementations own the connection, the (digest) authentication and all timeouts.
/// Every call is a single request; the crate never retries a command on its own,
/// except for reading the device state.
pub trait CommandTransport: Send + Sync + 'static {
    /// Sends `POST /osc/commands/execute` with `{"name": name, "parameters": parameters}`.
    fn execute(
        &self,
        name: &str,
        parameters: Value,
    ) -> impl Future<Output = TransportResult<RawResponse>> + Send;

    /// Sends `POST /osc/commands/status` with `{"id": id}`.
    fn command_status(&self, id: &str) -> impl Future<Output = TransportResult<RawResponse>> + Send;

    /// Sends `POST /osc/state`.
    fn state(&self) -> impl Future<Output = TransportResult<RawResponse>> + Send;
}
