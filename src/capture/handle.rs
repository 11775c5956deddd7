use std::{
    pin::Pin,
    sync::{
        Weak,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

use log::*;
use tokio::sync::{Notify, mpsc};

use super::CaptureKind;
use crate::{
    CamError, CamResult,
    notify::{CaptureEvent, CaptureOutcome, Notification, NotifyBridge},
};

/// Requests shared between the handles of a capture and its session.
/// Only the session holds a strong reference.
#[derive(Debug, Default)]
pub(crate) struct SessionControl {
    stop_requested: AtomicBool,
    second_requested: AtomicBool,
    /// Set by the session while the device waits for the second time-shift capture.
    pub(crate) second_available: AtomicBool,
    second_called: AtomicBool,
    pub(crate) resolved: AtomicBool,
    pub(crate) wake: Notify,
}

impl SessionControl {
    pub(crate) fn request_stop(&self) {
        if self.resolved.load(Ordering::SeqCst) {
            warn!("Capture already finished, ignoring the stop request");
            return;
        }

        self.stop_requested.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub(crate) fn take_stop_request(&self) -> bool {
        self.stop_requested.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn take_second_request(&self) -> bool {
        self.second_requested.swap(false, Ordering::SeqCst)
    }
}

/// Event stream of a started capture: zero or more notifications, then one terminal event.
///
/// Also a [`futures::Stream`] of [`CaptureEvent`]s.
#[derive(Debug)]
pub struct CaptureTask {
    kind: CaptureKind,
    events: mpsc::UnboundedReceiver<CaptureEvent>,
}

impl CaptureTask {
    pub(crate) fn new(kind: CaptureKind, events: mpsc::UnboundedReceiver<CaptureEvent>) -> Self {
        Self { kind, events }
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    /// Receives the next event. Returns `None` once the terminal event has been received.
    pub async fn next_event(&mut self) -> Option<CaptureEvent> {
        self.events.recv().await
    }

    /// Waits for the capture to finish, calling `on_notification` for each notification.
    pub async fn run_with(
        mut self,
        mut on_notification: impl FnMut(Notification),
    ) -> CamResult<CaptureOutcome> {
        while let Some(event) = self.events.recv().await {
            match event {
                CaptureEvent::Notification(notification) => on_notification(notification),
                CaptureEvent::Completed(outcome) => return Ok(outcome),
                CaptureEvent::Failed(e) => return Err(e),
            }
        }

        Err(CamError::SessionClosed)
    }

    /// Waits for the capture to finish, ignoring notifications.
    pub async fn wait(self) -> CamResult<CaptureOutcome> {
        self.run_with(|_| {}).await
    }

    /// Waits for the capture to finish, emitting each notification into `bridge`.
    pub async fn forward_to(self, bridge: &impl NotifyBridge) -> CamResult<CaptureOutcome> {
        let kind = self.kind;
        self.run_with(|notification| {
            bridge.emit(&notification.event_name(kind), &notification)
        })
        .await
    }
}

impl futures::Stream for CaptureTask {
    type Item = CaptureEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

impl From<Capturing> for CaptureTask {
    fn from(capturing: Capturing) -> Self {
        capturing.task
    }
}

/// Requests a stop of a running capture. Can be cloned and sent to other tasks.
///
/// Holds only a weak reference to the session: once the capture has finished,
/// requests are no-ops.
#[derive(Debug, Clone)]
pub struct CaptureController {
    control: Weak<SessionControl>,
}

impl CaptureController {
    /// Requests the capture to stop. The session resolves on its own afterwards.
    /// A failure of the stop command is reported as [`Notification::StopFailed`].
    pub fn stop_capture(&self) {
        match self.control.upgrade() {
            Some(control) => control.request_stop(),
            None => debug!("Capture already finished, ignoring the stop request"),
        }
    }

    /// Same as [`CaptureController::stop_capture`].
    pub fn cancel_capture(&self) {
        self.stop_capture()
    }

    /// Whether the capture is still running.
    pub fn is_running(&self) -> bool {
        self.control
            .upgrade()
            .is_some_and(|control| !control.resolved.load(Ordering::SeqCst))
    }
}

/// Handle of a started capture which can be stopped.
#[derive(Debug)]
pub struct Capturing {
    task: CaptureTask,
    controller: CaptureController,
}

impl Capturing {
    pub(crate) fn new(task: CaptureTask, control: Weak<SessionControl>) -> Self {
        Self {
            task,
            controller: CaptureController { control },
        }
    }

    pub fn kind(&self) -> CaptureKind {
        self.task.kind()
    }

    /// Returns a stop handle usable while the events are consumed elsewhere.
    pub fn controller(&self) -> CaptureController {
        self.controller.clone()
    }

    pub fn stop_capture(&self) {
        self.controller.stop_capture()
    }

    pub fn cancel_capture(&self) {
        self.controller.cancel_capture()
    }

    pub async fn next_event(&mut self) -> Option<CaptureEvent> {
        self.task.next_event().await
    }

    pub async fn run_with(
        self,
        on_notification: impl FnMut(Notification),
    ) -> CamResult<CaptureOutcome> {
        self.task.run_with(on_notification).await
    }

    pub async fn wait(self) -> CamResult<CaptureOutcome> {
        self.task.wait().await
    }

    pub async fn forward_to(self, bridge: &impl NotifyBridge) -> CamResult<CaptureOutcome> {
        self.task.forward_to(bridge).await
    }

    /// Splits the handle into its event stream and its stop handle.
    pub fn into_parts(self) -> (CaptureTask, CaptureController) {
        (self.task, self.controller)
    }
}

/// Handle of a started manual time-shift capture.
///
/// The camera shoots with the first lens, then waits until
/// [`TimeShiftManualCapturing::start_second_capture`] or a stop is requested.
#[derive(Debug)]
pub struct TimeShiftManualCapturing {
    inner: Capturing,
}

impl From<Capturing> for TimeShiftManualCapturing {
    fn from(inner: Capturing) -> Self {
        Self { inner }
    }
}

impl TimeShiftManualCapturing {
    /// Whether the camera waits for the second capture.
    pub fn is_available_second_capture(&self) -> bool {
        self.inner
            .controller
            .control
            .upgrade()
            .is_some_and(|control| control.second_available.load(Ordering::SeqCst))
    }

    /// Triggers the second lens.
    ///
    /// Fails if the camera is not waiting for it yet, or if it has already been triggered.
    pub fn start_second_capture(&self) -> CamResult<()> {
        let Some(control) = self.inner.controller.control.upgrade() else {
            return Err(CamError::invalid_argument("Capture already finished"));
        };

        if !control.second_available.load(Ordering::SeqCst) {
            warn!("First capture is not yet finished");
            return Err(CamError::invalid_argument("First capture is not yet finished"));
        }
        if control.second_called.swap(true, Ordering::SeqCst) {
            warn!("Second capture has already been started");
            return Err(CamError::invalid_argument(
                "Second capture has already been started",
            ));
        }

        control.second_requested.store(true, Ordering::SeqCst);
        control.wake.notify_one();

        Ok(())
    }

    pub fn controller(&self) -> CaptureController {
        self.inner.controller()
    }

    pub fn stop_capture(&self) {
        self.inner.stop_capture()
    }

    pub fn cancel_capture(&self) {
        self.inner.cancel_capture()
    }

    pub async fn next_event(&mut self) -> Option<CaptureEvent> {
        self.inner.next_event().await
    }

    pub async fn run_with(
        self,
        on_notification: impl FnMut(Notification),
    ) -> CamResult<CaptureOutcome> {
        self.inner.run_with(on_notification).await
    }

    pub async fn wait(self) -> CamResult<CaptureOutcome> {
        self.inner.wait().await
    }

    pub async fn forward_to(self, bridge: &impl NotifyBridge) -> CamResult<CaptureOutcome> {
        self.inner.forward_to(bridge).await
    }
}
