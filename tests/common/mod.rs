#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use serde_json::{Value, json};
use theta_capture_lib_rs::{
    CamResult,
    cam::ThetaCam,
    notify::{CaptureEvent, CaptureOutcome, CapturingStatus, Notification},
    settings::CameraModel,
    transport::{CommandTransport, RawResponse, TransportError, TransportResult},
};

type Reply = Result<RawResponse, String>;

#[derive(Default)]
struct Script {
    execute: HashMap<String, VecDeque<Reply>>,
    status: VecDeque<Reply>,
    state: VecDeque<Reply>,
    executed: Vec<(String, Value)>,
    polled_ids: Vec<String>,
    state_reads: usize,
}

/// In-memory camera replaying scripted responses.
///
/// Unscripted commands succeed with an empty "done" response,
/// unscripted status polls report "done" and the unscripted state is idle.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<Script>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_execute(&self, name: &str, reply: RawResponse) -> &Self {
        self.lock()
            .execute
            .entry(name.to_owned())
            .or_default()
            .push_back(Ok(reply));
        self
    }

    pub fn fail_execute(&self, name: &str, message: &str) -> &Self {
        self.lock()
            .execute
            .entry(name.to_owned())
            .or_default()
            .push_back(Err(message.to_owned()));
        self
    }

    pub fn on_status(&self, reply: RawResponse) -> &Self {
        self.lock().status.push_back(Ok(reply));
        self
    }

    pub fn on_state(&self, capture_status: &str) -> &Self {
        self.lock().state.push_back(Ok(state(capture_status)));
        self
    }

    pub fn on_state_reply(&self, reply: RawResponse) -> &Self {
        self.lock().state.push_back(Ok(reply));
        self
    }

    /// Commands executed so far, with their parameters.
    pub fn executed(&self) -> Vec<(String, Value)> {
        self.lock().executed.clone()
    }

    pub fn executed_names(&self) -> Vec<String> {
        self.lock()
            .executed
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn polled_ids(&self) -> Vec<String> {
        self.lock().polled_ids.clone()
    }

    pub fn state_reads(&self) -> usize {
        self.lock().state_reads
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("script lock poisoned")
    }
}

fn into_result(reply: Reply) -> TransportResult<RawResponse> {
    reply.map_err(TransportError::Connect)
}

impl CommandTransport for MockTransport {
    async fn execute(&self, name: &str, parameters: Value) -> TransportResult<RawResponse> {
        let mut script = self.lock();
        script.executed.push((name.to_owned(), parameters));

        let reply = script
            .execute
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(done(name)));

        into_result(reply)
    }

    async fn command_status(&self, id: &str) -> TransportResult<RawResponse> {
        let mut script = self.lock();
        script.polled_ids.push(id.to_owned());

        let reply = script
            .status
            .pop_front()
            .unwrap_or_else(|| Ok(done("camera.status")));

        into_result(reply)
    }

    async fn state(&self) -> TransportResult<RawResponse> {
        let mut script = self.lock();
        script.state_reads += 1;

        let reply = script.state.pop_front().unwrap_or_else(|| Ok(state("idle")));

        into_result(reply)
    }
}

pub fn camera(transport: &Arc<MockTransport>, model: Option<CameraModel>) -> ThetaCam<MockTransport> {
    ThetaCam::from_shared(Arc::clone(transport), model)
}

fn body(value: Value) -> RawResponse {
    RawResponse::ok(value.to_string())
}

pub fn done(name: &str) -> RawResponse {
    body(json!({ "name": name, "state": "done" }))
}

pub fn in_progress(name: &str, id: &str) -> RawResponse {
    body(json!({ "name": name, "state": "inProgress", "id": id }))
}

pub fn progress(name: &str, id: &str, completion: f32) -> RawResponse {
    body(json!({
        "name": name,
        "state": "inProgress",
        "id": id,
        "progress": { "completion": completion },
    }))
}

pub fn done_with_url(name: &str, file_url: &str) -> RawResponse {
    body(json!({ "name": name, "state": "done", "results": { "fileUrl": file_url } }))
}

pub fn done_with_urls(name: &str, file_urls: &[&str]) -> RawResponse {
    body(json!({ "name": name, "state": "done", "results": { "fileUrls": file_urls } }))
}

pub fn device_error(name: &str, code: &str, message: &str) -> RawResponse {
    RawResponse::new(
        400,
        json!({
            "name": name,
            "state": "error",
            "error": { "code": code, "message": message },
        })
        .to_string(),
    )
}

pub fn state(capture_status: &str) -> RawResponse {
    body(json!({
        "fingerprint": "FIG_0001",
        "state": { "_captureStatus": capture_status, "batteryLevel": 0.8 },
    }))
}

/// Drains a capture: its notifications, then its terminal result.
pub async fn collect(
    mut events: impl futures::Stream<Item = CaptureEvent> + Unpin,
) -> (Vec<Notification>, CamResult<CaptureOutcome>) {
    use futures::StreamExt as _;

    let mut notifications = Vec::new();

    while let Some(event) = events.next().await {
        match event {
            CaptureEvent::Notification(notification) => notifications.push(notification),
            CaptureEvent::Completed(outcome) => return (notifications, Ok(outcome)),
            CaptureEvent::Failed(e) => return (notifications, Err(e)),
        }
    }

    panic!("capture ended without a terminal event");
}

pub fn statuses(notifications: &[Notification]) -> Vec<CapturingStatus> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::CapturingStatus(status) => Some(*status),
            _ => None,
        })
        .collect()
}

pub fn progresses(notifications: &[Notification]) -> Vec<f32> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::Progress(completion) => Some(*completion),
            _ => None,
        })
        .collect()
}
