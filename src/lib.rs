//! A Rust async client library driving the capture workflows of RICOH THETA 360° cameras.
//!
//! The camera is controlled through its Web API (`/osc/commands/execute`, `/osc/commands/status`
//! and `/osc/state`). This crate does not ship an HTTP client: the caller plugs one in by
//! implementing [`transport::CommandTransport`]. On top of that the crate provides
//! typed option sets, one builder per capture kind and the capturing-session state machine
//! which polls the camera until a capture reaches a terminal state.
//!
//! ## Example
//!
//! ```no_run
//! use theta_capture_lib_rs::{cam::ThetaCam, notify::CaptureEvent, settings::CameraModel};
//! # use theta_capture_lib_rs::transport::CommandTransport;
//!
//! # async fn run<T: CommandTransport>(transport: T) -> Result<(), Box<dyn std::error::Error>> {
//! let cam = ThetaCam::new(transport, Some(CameraModel::ThetaX));
//!
//! let capture = cam.burst_capture_builder(Default::default()).build().await?;
//! let mut capturing = capture.start_capture();
//!
//! while let Some(event) = capturing.next_event().await {
//!     match event {
//!         CaptureEvent::Notification(n) => println!("{n:?}"),
//!         CaptureEvent::Completed(result) => println!("Done: {result:?}"),
//!         CaptureEvent::Failed(e) => println!("Failed: {e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Contains the command names, the default intervals and the device error codes.
pub mod consts;

/// Contains enums and structs for the capture options.
pub mod settings;

/// Contains the interface to the HTTP transport supplied by the caller.
pub mod transport;

/// Contains the JSON models of the camera responses.
pub mod protocol;

/// Contains the notification types emitted by a capturing session.
pub mod notify;

/// Contains the capture builders, descriptors and the capturing-session state machine.
pub mod capture;

/// Contains the main camera struct.
pub mod cam;

/// Contains various convenience methods for interacting with the camera.
pub mod util;

/// Error reported by the camera's Web API.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WebApiError {
    #[error("{message} (code: {code})")]
    Device { code: String, message: String },

    #[error("HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Unable to parse response: {message}")]
    Parse { message: String },
}

impl WebApiError {
    /// Message text as reported by the device (or the parser).
    pub fn message(&self) -> &str {
        match self {
            Self::Device { message, .. } | Self::Http { message, .. } | Self::Parse { message } => {
                message
            }
        }
    }

    /// Device error code, if the device sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Device { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Crate-specific error enum.
/// Every function interacting with the camera returns a Result enum with this error type.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CamError {
    #[error("Web API error: {0}")]
    WebApi(#[from] WebApiError),

    #[error("Not connected to the camera: {message}")]
    NotConnected { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Capture status cannot be retrieved")]
    CaptureStatusUnavailable,

    #[error("Capturing session ended without a result")]
    SessionClosed,
}

impl CamError {
    /// Whether the device reported that the shooting was canceled.
    /// A canceled shooting is a normal outcome of a stop request, not a failure.
    pub fn is_canceled_shooting(&self) -> bool {
        matches!(
            self,
            Self::WebApi(WebApiError::Device { code, .. }) if code == consts::error_code::CANCELED_SHOOTING
        )
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<transport::TransportError> for CamError {
    fn from(e: transport::TransportError) -> Self {
        Self::NotConnected {
            message: e.to_string(),
        }
    }
}

pub type CamResult<T> = Result<T, CamError>;
