use serde::{Deserialize, de::DeserializeOwned};

use crate::{CamError, CamResult, WebApiError, transport::RawResponse};

/// Execution state of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandState {
    Done,
    InProgress,
    Error,
}

/// Error object of a command response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl From<CommandError> for CamError {
    fn from(e: CommandError) -> Self {
        CamError::WebApi(WebApiError::Device {
            code: e.code,
            message: e.message,
        })
    }
}

/// Progress object of a command in progress.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CommandProgress {
    pub completion: f32,
}

/// Results of a capture command. Depending on the command and the model,
/// the camera reports either a single URL or a list of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResults {
    pub file_url: Option<String>,
    pub file_urls: Option<Vec<String>>,
    /// Option values reported by `camera.getOptions`.
    pub options: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Response of `/osc/commands/execute` and `/osc/commands/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub name: String,
    pub state: Option<CommandState>,
    pub id: Option<String>,
    pub results: Option<CommandResults>,
    pub error: Option<CommandError>,
    pub progress: Option<CommandProgress>,
    /// URLs of the files being recorded, reported by `camera.startCapture` in video mode.
    #[serde(rename = "_fileUrls")]
    pub started_file_urls: Option<Vec<String>>,
}

impl CommandResponse {
    /// Device error carried by the response, if any.
    pub fn device_error(&self) -> Option<CamError> {
        self.error.clone().map(CamError::from)
    }

    /// Fails with the device error, if the response carries one.
    pub fn check(self) -> CamResult<Self> {
        match self.device_error() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }

    /// First file URL of the results, whichever form the camera used.
    pub fn file_url(&self) -> Option<String> {
        let results = self.results.as_ref()?;

        results
            .file_urls
            .as_ref()
            .and_then(|urls| urls.first().cloned())
            .or_else(|| results.file_url.clone())
    }

    /// List of file URLs of the results. Empty if the camera reported none.
    pub fn file_urls(&self) -> Vec<String> {
        self.results
            .as_ref()
            .and_then(|r| r.file_urls.clone())
            .unwrap_or_default()
    }
}

/// Capture status reported in `/osc/state` (`_captureStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DeviceCaptureStatus {
    #[serde(rename = "shooting")]
    Shooting,
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "self-timer countdown")]
    SelfTimerCountdown,
    #[serde(rename = "bracket shooting")]
    BracketShooting,
    #[serde(rename = "converting")]
    Converting,
    #[serde(rename = "timeShift shooting")]
    TimeShiftShooting,
    #[serde(rename = "timeShift shooting idle")]
    TimeShiftShootingIdle,
    #[serde(rename = "continuous shooting")]
    ContinuousShooting,
    #[serde(rename = "retrospective image recording")]
    RetrospectiveImageRecording,
    #[serde(other)]
    Unknown,
}

/// The `state` object of `/osc/state`. Only the fields used by the capture workflows are decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraState {
    #[serde(rename = "_captureStatus")]
    pub capture_status: DeviceCaptureStatus,
    #[serde(rename = "batteryLevel")]
    pub battery_level: Option<f32>,
}

/// Response of `/osc/state`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateResponse {
    #[serde(default)]
    pub fingerprint: String,
    pub state: CameraState,
}

/// Body of an error response, as far as it can be understood.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<CommandError>,
}

/// Decodes a raw response.
///
/// A non-2xx status is an error: the device's error object if the body carries one,
/// otherwise the status code with the raw body. A 2xx body which cannot be decoded
/// is reported as a parse error.
pub fn decode<R: DeserializeOwned>(raw: &RawResponse) -> CamResult<R> {
    if !raw.is_success() {
        return Err(match serde_json::from_str::<ErrorBody>(&raw.body) {
            Ok(ErrorBody { error: Some(e) }) => e.into(),
            _ => WebApiError::Http {
                status: raw.status,
                message: raw.body.trim().to_owned(),
            }
            .into(),
        });
    }

    serde_json::from_str(&raw.body).map_err(|e| {
        WebApiError::Parse {
            message: format!("{e}: {}", raw.body.trim()),
        }
        .into()
    })
}

/// Decodes the response of a command. A body with neither a command name nor a state
/// is not a command response and is reported as a parse error.
pub fn decode_command(raw: &RawResponse) -> CamResult<CommandResponse> {
    let response: CommandResponse = decode(raw)?;

    if response.name.is_empty() && response.state.is_none() {
        return Err(WebApiError::Parse {
            message: format!("Unknown response: {}", raw.body.trim()),
        }
        .into());
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_in_progress_status() {
        let raw = RawResponse::ok(
            r#"{"name":"camera.takePicture","id":"12","progress":{"completion":0.25},"state":"inProgress"}"#,
        );
        let response: CommandResponse = decode(&raw).expect("valid response");

        assert_eq!(response.state, Some(CommandState::InProgress));
        assert_eq!(response.id.as_deref(), Some("12"));
        assert_eq!(response.progress.map(|p| p.completion), Some(0.25));
    }

    #[test]
    fn prefers_file_urls_over_file_url() {
        let raw = RawResponse::ok(
            r#"{"name":"camera.startCapture","state":"done","results":{"fileUrls":["a","b"],"fileUrl":"c"}}"#,
        );
        let response: CommandResponse = decode(&raw).expect("valid response");

        assert_eq!(response.file_url().as_deref(), Some("a"));
        assert_eq!(response.file_urls(), vec!["a", "b"]);
    }

    #[test]
    fn error_status_with_device_body_keeps_device_message() {
        let raw = RawResponse::new(
            400,
            r#"{"name":"camera.setOptions","state":"error","error":{"code":"invalidParameterValue","message":"Any input parameter is invalid."}}"#,
        );
        let err = decode::<CommandResponse>(&raw).expect_err("must fail");

        assert_eq!(
            err,
            CamError::WebApi(WebApiError::Device {
                code: "invalidParameterValue".into(),
                message: "Any input parameter is invalid.".into(),
            })
        );
    }

    #[test]
    fn error_status_with_text_body_keeps_status() {
        let err = decode::<CommandResponse>(&RawResponse::new(503, "Service Unavailable"))
            .expect_err("must fail");

        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn non_json_success_body_is_parse_error() {
        let err = decode::<CommandResponse>(&RawResponse::ok("<html>oops</html>"))
            .expect_err("must fail");

        match err {
            CamError::WebApi(WebApiError::Parse { message }) => assert!(message.contains("oops")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn body_without_name_and_state_is_not_a_command_response() {
        let err = decode_command(&RawResponse::ok(r#"{"unexpected":true}"#)).expect_err("must fail");
        assert!(matches!(err, CamError::WebApi(WebApiError::Parse { .. })));

        let response = decode_command(&RawResponse::ok(r#"{"name":"camera.startCapture"}"#))
            .expect("a named response is accepted");
        assert_eq!(response.state, None);
    }

    #[test]
    fn unknown_capture_status_is_tolerated() {
        let raw = RawResponse::ok(r#"{"fingerprint":"FIG_0001","state":{"_captureStatus":"something new"}}"#);
        let response: StateResponse = decode(&raw).expect("valid response");

        assert_eq!(response.state.capture_status, DeviceCaptureStatus::Unknown);
    }

    #[test]
    fn canceled_shooting_is_recognized() {
        let raw = RawResponse::new(
            400,
            r#"{"error":{"code":"canceledShooting","message":"Shooting request is canceled."}}"#,
        );
        let err = decode::<CommandResponse>(&raw).expect_err("must fail");

        assert!(err.is_canceled_shooting());
    }
}
