use std::sync::Arc;

use log::*;
use serde_json::{Map, Value, json};

use crate::{
    CamResult,
    capture::*,
    consts::command,
    protocol::{self, CommandResponse, StateResponse},
    settings::*,
    transport::CommandTransport,
};

/// Struct for interacting with the camera.
///
/// Cheap to clone: clones share the transport.
pub struct ThetaCam<T> {
    transport: Arc<T>,
    model: Option<CameraModel>,
}

impl<T> Clone for ThetaCam<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            model: self.model,
        }
    }
}

impl<T: CommandTransport> ThetaCam<T> {
    /// Creates the camera from a transport to its Web API.
    ///
    /// * `model` - Model of the camera, if known. Some capture kinds depend on it.
    pub fn new(transport: T, model: Option<CameraModel>) -> Self {
        Self::from_shared(Arc::new(transport), model)
    }

    pub fn from_shared(transport: Arc<T>, model: Option<CameraModel>) -> Self {
        Self { transport, model }
    }

    pub fn model(&self) -> Option<CameraModel> {
        self.model
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes a command and decodes its response.
    ///
    /// A device error carried by a successful (2xx) response is left in the response.
    pub async fn execute_command(&self, name: &str, parameters: Value) -> CamResult<CommandResponse> {
        trace!("Executing {name} with {parameters}");

        let raw = self.transport.execute(name, parameters).await?;
        protocol::decode_command(&raw)
    }

    /// Applies options with `camera.setOptions`.
    pub async fn set_options(&self, options: &OptionSet) -> CamResult<()> {
        debug!("Setting {} options", options.len());

        self.execute_command(command::SET_OPTIONS, json!({ "options": options.to_json() }))
            .await?
            .check()
            .inspect_err(|e| error!("Unable to set options: {e}"))?;

        Ok(())
    }

    /// Reads option values with `camera.getOptions`.
    ///
    /// Options the camera does not report are missing from the returned map.
    pub async fn get_options(&self, names: &[OptionName]) -> CamResult<Map<String, Value>> {
        let names: Vec<&str> = names.iter().map(OptionName::wire_name).collect();

        let response = self
            .execute_command(command::GET_OPTIONS, json!({ "optionNames": names }))
            .await?
            .check()?;

        Ok(response
            .results
            .and_then(|results| results.options)
            .unwrap_or_default())
    }

    /// Sends `camera.takePicture`.
    pub async fn take_picture_command(&self) -> CamResult<CommandResponse> {
        self.execute_command(command::TAKE_PICTURE, json!({}))
            .await?
            .check()
    }

    /// Sends `camera.startCapture`.
    ///
    /// * `mode` - Value of the `_mode` parameter, omitted if `None`.
    pub async fn start_capture_command(&self, mode: Option<&str>) -> CamResult<CommandResponse> {
        let parameters = match mode {
            Some(mode) => json!({ "_mode": mode }),
            None => json!({}),
        };

        self.execute_command(command::START_CAPTURE, parameters)
            .await?
            .check()
    }

    /// Sends `camera.stopCapture`.
    pub async fn stop_capture_command(&self) -> CamResult<CommandResponse> {
        self.execute_command(command::STOP_CAPTURE, json!({}))
            .await?
            .check()
    }

    /// Reads the status of a command started earlier.
    pub async fn command_status(&self, id: &str) -> CamResult<CommandResponse> {
        let raw = self.transport.command_status(id).await?;
        protocol::decode_command(&raw)
    }

    /// Reads the camera state.
    pub async fn state(&self) -> CamResult<StateResponse> {
        let raw = self.transport.state().await?;
        protocol::decode(&raw)
    }

    pub fn photo_capture_builder(&self) -> PhotoCaptureBuilder<T> {
        CaptureBuilder::new(self.clone(), OptionSet::new())
    }

    pub fn video_capture_builder(&self) -> VideoCaptureBuilder<T> {
        CaptureBuilder::new(self.clone(), OptionSet::new())
    }

    pub fn time_shift_capture_builder(&self) -> TimeShiftCaptureBuilder<T> {
        CaptureBuilder::new(self.clone(), OptionSet::new())
    }

    pub fn time_shift_manual_capture_builder(&self) -> TimeShiftManualCaptureBuilder<T> {
        CaptureBuilder::new(self.clone(), OptionSet::new())
    }

    /// * `option` - Number of shots, bracket step, compensation and order of the burst.
    pub fn burst_capture_builder(&self, option: BurstOption) -> BurstCaptureBuilder<T> {
        CaptureBuilder::new(
            self.clone(),
            OptionSet::new().with(CaptureOption::BurstOption(option)),
        )
    }

    pub fn multi_bracket_capture_builder(&self) -> MultiBracketCaptureBuilder<T> {
        CaptureBuilder::new(self.clone(), OptionSet::new())
    }

    pub fn continuous_capture_builder(&self) -> ContinuousCaptureBuilder<T> {
        CaptureBuilder::new(self.clone(), OptionSet::new())
    }

    /// * `shot_count` - Number of shots taken before the capture ends.
    pub fn shot_count_specified_interval_capture_builder(
        &self,
        shot_count: u32,
    ) -> ShotCountSpecifiedIntervalCaptureBuilder<T> {
        CaptureBuilder::new(
            self.clone(),
            OptionSet::new().with(CaptureOption::CaptureNumber(shot_count)),
        )
    }

    /// * `shooting_time_secs` - Total shooting time of the composite in seconds.
    pub fn composite_interval_capture_builder(
        &self,
        shooting_time_secs: u32,
    ) -> CompositeIntervalCaptureBuilder<T> {
        CaptureBuilder::new(
            self.clone(),
            OptionSet::new().with(CaptureOption::CompositeShootingTime(shooting_time_secs)),
        )
    }

    pub fn limitless_interval_capture_builder(&self) -> LimitlessIntervalCaptureBuilder<T> {
        CaptureBuilder::new(self.clone(), OptionSet::new())
    }
}
