use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use log::*;
use tokio::sync::mpsc;

use super::{
    CaptureKind, KindProfile, OutputShape, StartCommand, StatusSource,
    handle::{CaptureTask, Capturing, SessionControl},
};
use crate::{
    CamError, CamResult, WebApiError,
    cam::ThetaCam,
    consts::{self, shooting_mode},
    notify::{CaptureEvent, CaptureOutcome, CaptureOutput, CapturingStatus, Notification},
    protocol::{CommandResponse, CommandState, DeviceCaptureStatus},
    transport::CommandTransport,
};

/// Starts a capturing session on a task of its own and returns its handle.
pub(crate) fn spawn<T: CommandTransport>(
    cam: ThetaCam<T>,
    kind: CaptureKind,
    interval: Duration,
) -> Capturing {
    let (events, rx) = mpsc::unbounded_channel();
    let control = Arc::new(SessionControl::default());
    let capturing = Capturing::new(CaptureTask::new(kind, rx), Arc::downgrade(&control));

    let session = Session {
        profile: kind.profile(cam.model()),
        cam,
        kind,
        interval,
        control,
        events,
        command_id: None,
        last_status: None,
        progress: 0.0,
        idle_count: 0,
        captured: false,
        stop_acknowledged: false,
        abandoned: false,
    };

    tokio::spawn(session.run());

    capturing
}

/// State of one in-flight capture, owned by the polling task.
struct Session<T> {
    cam: ThetaCam<T>,
    kind: CaptureKind,
    profile: KindProfile,
    interval: Duration,
    control: Arc<SessionControl>,
    events: mpsc::UnboundedSender<CaptureEvent>,

    /// Id of the command whose status is polled.
    command_id: Option<String>,
    /// Last capturing status notified.
    last_status: Option<CapturingStatus>,
    /// Highest completion reported so far.
    progress: f32,
    /// Consecutive idle states read from a state-polled capture.
    idle_count: u32,
    /// Whether the device has been seen shooting.
    captured: bool,
    stop_acknowledged: bool,
    /// Whether a stop was issued because every handle of a waiting time-shift was dropped.
    abandoned: bool,
}

impl<T: CommandTransport> Session<T> {
    async fn run(mut self) {
        info!("Starting {:?} capture", self.kind);

        let result = self.drive().await;
        self.resolve(result);
    }

    /// Delivers the terminal event. Nothing is sent afterwards.
    fn resolve(&self, result: CamResult<CaptureOutcome>) {
        if self.control.resolved.swap(true, Ordering::SeqCst) {
            return;
        }

        let event = match result {
            Ok(outcome) => {
                info!("{:?} capture finished: {outcome:?}", self.kind);
                CaptureEvent::Completed(outcome)
            }
            Err(e) => {
                error!("{:?} capture failed: {e}", self.kind);
                CaptureEvent::Failed(e)
            }
        };

        // The caller may have dropped the handle.
        let _ = self.events.send(event);
    }

    fn notify(&self, notification: Notification) {
        let _ = self.events.send(CaptureEvent::Notification(notification));
    }

    /// Notifies a capturing status, unless it is the one notified last.
    fn notify_status(&mut self, status: CapturingStatus) {
        if self.last_status == Some(status) {
            return;
        }

        debug!("{:?} capturing status: {status:?}", self.kind);
        self.last_status = Some(status);
        self.notify(Notification::CapturingStatus(status));
    }

    fn report_progress(&mut self, completion: f32) {
        let completion = if completion.is_nan() {
            0.0
        } else {
            completion.clamp(0.0, 1.0)
        };

        self.progress = self.progress.max(completion);
        self.notify(Notification::Progress(self.progress));
    }

    async fn drive(&mut self) -> CamResult<CaptureOutcome> {
        let response = match self.start().await {
            Ok(response) => response,
            Err(e) => return canceled_or(e),
        };

        self.notify_status(CapturingStatus::Starting);

        if self.kind == CaptureKind::Video {
            let file_url = response
                .started_file_urls
                .as_ref()
                .and_then(|urls| urls.first().cloned());
            self.notify(Notification::Started(file_url));
        }

        if self.profile.status_source == StatusSource::CommandStatus {
            if let Some(result) = self.conclude(&response) {
                return result;
            }

            self.command_id = Some(response.id.ok_or_else(|| {
                CamError::from(WebApiError::Parse {
                    message: format!("{} response carries no command id", response.name),
                })
            })?);
        }

        self.poll().await
    }

    async fn start(&self) -> CamResult<CommandResponse> {
        match self.profile.start {
            StartCommand::TakePicture => self.cam.take_picture_command().await,
            StartCommand::StartCapture(mode) => self.cam.start_capture_command(mode).await,
        }
    }

    /// Polls until the capture reaches a terminal state.
    async fn poll(&mut self) -> CamResult<CaptureOutcome> {
        loop {
            if let Some(result) = self.handle_requests().await {
                return result;
            }

            if self.is_orphaned() {
                return self.abandon().await;
            }

            if self.sleep().await {
                continue;
            }

            let result = match self.profile.status_source {
                StatusSource::CommandStatus => self.poll_command_status().await,
                StatusSource::DeviceState => self.poll_device_state().await,
            };

            if let Some(result) = result {
                return result;
            }
        }
    }

    /// Waits for the poll interval. Returns `true` if woken early by a request.
    async fn sleep(&self) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.interval) => false,
            _ = self.control.wake.notified() => true,
        }
    }

    /// Serves the stop and second-capture requests of the handles.
    async fn handle_requests(&mut self) -> Option<CamResult<CaptureOutcome>> {
        if self.control.take_stop_request() {
            match self.cam.stop_capture_command().await {
                Ok(response) => {
                    debug!("{:?} capture stop acknowledged", self.kind);
                    self.stop_acknowledged = true;

                    // The device state says nothing about files, the stop response does.
                    if self.profile.status_source == StatusSource::DeviceState {
                        return Some(Ok(CaptureOutcome::Completed(self.output(&response))));
                    }
                }
                Err(e) => {
                    warn!("Unable to stop {:?} capture: {e}", self.kind);
                    self.notify(Notification::StopFailed(e));
                }
            }
        }

        if self.control.take_second_request() {
            info!("Starting the second time-shift capture");

            match self
                .cam
                .start_capture_command(Some(shooting_mode::TIME_SHIFT_MANUAL))
                .await
            {
                Ok(response) => {
                    if let Some(result) = self.conclude(&response) {
                        return Some(result);
                    }
                    if let Some(id) = response.id {
                        self.command_id = Some(id);
                    }
                }
                Err(e) => return Some(canceled_or(e)),
            }
        }

        if self.kind == CaptureKind::TimeShiftManual
            && !self.abandoned
            && !self.stop_acknowledged
            && self.last_status == Some(CapturingStatus::TimeShiftShootingIdle)
            && Arc::weak_count(&self.control) == 0
        {
            info!("Time-shift capture abandoned while waiting for the second capture, stopping");
            self.abandoned = true;
            self.control.request_stop();
        }

        None
    }

    /// Whether nobody can receive the result or stop the capture anymore.
    fn is_orphaned(&self) -> bool {
        self.events.is_closed() && Arc::weak_count(&self.control) == 0
    }

    /// Gives up a capture every handle of which was dropped, stopping the camera if possible.
    async fn abandon(&mut self) -> CamResult<CaptureOutcome> {
        info!("{:?} capture abandoned by every handle", self.kind);

        if self.kind.can_stop() && !self.stop_acknowledged {
            match self.cam.stop_capture_command().await {
                Ok(_) => self.stop_acknowledged = true,
                Err(e) => warn!("Unable to stop abandoned {:?} capture: {e}", self.kind),
            }
        }

        Ok(CaptureOutcome::Canceled)
    }

    async fn poll_command_status(&mut self) -> Option<CamResult<CaptureOutcome>> {
        let id = self.command_id.clone()?;

        let response = match self.cam.command_status(&id).await {
            Ok(response) => response,
            Err(e) => return Some(canceled_or(e)),
        };

        if let Some(result) = self.conclude(&response) {
            return Some(result);
        }

        // Sub-status only; the command status decides when the capture ends.
        match self.cam.state().await {
            Ok(state) => self.observe(state.state.capture_status),
            Err(e) => debug!("Unable to read the capture status: {e}"),
        }

        if self.profile.reports_progress {
            self.report_progress(response.progress.map_or(0.0, |p| p.completion));
        }

        None
    }

    async fn poll_device_state(&mut self) -> Option<CamResult<CaptureOutcome>> {
        let status = match self.read_capture_status().await {
            Ok(status) => status,
            Err(e) => return Some(Err(e)),
        };

        if status != DeviceCaptureStatus::Idle {
            self.idle_count = 0;
            self.observe(status);
            return None;
        }

        self.idle_count += 1;
        if self.idle_count < consts::CHECK_SHOOTING_IDLE_COUNT {
            return None;
        }

        let outcome = if self.captured || self.stop_acknowledged {
            CaptureOutcome::Completed(self.empty_output())
        } else {
            CaptureOutcome::Canceled
        };

        Some(Ok(outcome))
    }

    /// Reads the device capture status, retrying a few times one interval apart.
    async fn read_capture_status(&self) -> CamResult<DeviceCaptureStatus> {
        for attempt in 1..=consts::CHECK_STATE_RETRY {
            match self.cam.state().await {
                Ok(state) => return Ok(state.state.capture_status),
                Err(e) => {
                    warn!(
                        "Unable to read the capture status, attempt {attempt}/{}: {e}",
                        consts::CHECK_STATE_RETRY
                    );

                    if attempt < consts::CHECK_STATE_RETRY {
                        tokio::time::sleep(self.interval).await;
                    }
                }
            }
        }

        Err(CamError::CaptureStatusUnavailable)
    }

    fn observe(&mut self, status: DeviceCaptureStatus) {
        if self.kind == CaptureKind::TimeShiftManual {
            self.control.second_available.store(
                status == DeviceCaptureStatus::TimeShiftShootingIdle,
                Ordering::SeqCst,
            );
        }

        if let Some(status) = self.kind.map_status(status) {
            if status != CapturingStatus::SelfTimerCountdown {
                self.captured = true;
            }
            self.notify_status(status);
        }
    }

    /// Terminal result carried by a command response, if any.
    fn conclude(&self, response: &CommandResponse) -> Option<CamResult<CaptureOutcome>> {
        match response.state {
            Some(CommandState::InProgress) => None,
            Some(CommandState::Done) => Some(Ok(CaptureOutcome::Completed(self.output(response)))),
            Some(CommandState::Error) | None => Some(match response.device_error() {
                Some(e) => canceled_or(e),
                None => Ok(CaptureOutcome::Canceled),
            }),
        }
    }

    fn output(&self, response: &CommandResponse) -> CaptureOutput {
        match self.profile.output {
            OutputShape::Single => CaptureOutput::Single(response.file_url()),
            OutputShape::Multiple => CaptureOutput::Multiple(response.file_urls()),
        }
    }

    fn empty_output(&self) -> CaptureOutput {
        match self.profile.output {
            OutputShape::Single => CaptureOutput::Single(None),
            OutputShape::Multiple => CaptureOutput::Multiple(Vec::new()),
        }
    }
}

/// A canceled shooting is how the device reports a stopped capture.
fn canceled_or(e: CamError) -> CamResult<CaptureOutcome> {
    if e.is_canceled_shooting() {
        Ok(CaptureOutcome::Canceled)
    } else {
        Err(e)
    }
}
