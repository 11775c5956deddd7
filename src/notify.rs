use crate::{CamError, capture::CaptureKind};

/// Capturing status reported while a capture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturingStatus {
    /// The start command was accepted by the camera.
    Starting,
    SelfTimerCountdown,
    Capturing,
    /// Time-shift manual: the first lens is shooting.
    TimeShiftShooting,
    /// Time-shift manual: waiting for the second capture to be triggered.
    TimeShiftShootingIdle,
    /// Time-shift manual: the second lens is shooting.
    TimeShiftShootingSecond,
    /// Composite interval: the composite shot is being taken.
    CompositeShooting,
}

/// Output of a completed capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutput {
    /// Kinds producing one file. `None` if the camera did not report a URL.
    Single(Option<String>),
    /// Kinds producing a series of files. May be empty.
    Multiple(Vec<String>),
}

impl CaptureOutput {
    /// First file URL, whichever shape the output has.
    pub fn file_url(&self) -> Option<&str> {
        match self {
            Self::Single(url) => url.as_deref(),
            Self::Multiple(urls) => urls.first().map(String::as_str),
        }
    }

    pub fn file_urls(&self) -> Vec<&str> {
        match self {
            Self::Single(url) => url.iter().map(String::as_str).collect(),
            Self::Multiple(urls) => urls.iter().map(String::as_str).collect(),
        }
    }
}

/// Successful terminal state of a capturing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Completed(CaptureOutput),
    /// The capture was stopped before it produced anything.
    Canceled,
}

impl CaptureOutcome {
    pub fn output(&self) -> Option<&CaptureOutput> {
        match self {
            Self::Completed(output) => Some(output),
            Self::Canceled => None,
        }
    }
}

/// Out-of-band message of a capturing session. Zero or more are delivered before the terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Completion rate in `[0.0, 1.0]`, never decreasing within one session.
    Progress(f32),
    CapturingStatus(CapturingStatus),
    /// A stop request failed. The capture itself goes on and still resolves.
    StopFailed(CamError),
    /// Video recording has begun. The URL is absent when a self-timer is used.
    Started(Option<String>),
}

impl Notification {
    /// Name of the event carrying this notification across a native bridge,
    /// e.g. `BURST-PROGRESS` or `VIDEO-CAPTURE-STARTED`.
    pub fn event_name(&self, kind: CaptureKind) -> String {
        let suffix = match self {
            Self::Progress(_) => "PROGRESS",
            Self::CapturingStatus(_) => "CAPTURING",
            Self::StopFailed(_) => "STOP-ERROR",
            Self::Started(_) => "STARTED",
        };

        format!("{}-{suffix}", kind.event_prefix())
    }
}

/// Event delivered by a capturing session: notifications, then exactly one terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    Notification(Notification),
    Completed(CaptureOutcome),
    Failed(CamError),
}

impl CaptureEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Notification(_))
    }
}

/// Receiver of notifications on the far side of a process or thread boundary
/// (e.g. a native module event emitter). Delivery may be asynchronous.
pub trait NotifyBridge {
    fn emit(&self, event_name: &str, notification: &Notification);
}

impl<F: Fn(&str, &Notification)> NotifyBridge for F {
    fn emit(&self, event_name: &str, notification: &Notification) {
        self(event_name, notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_follow_kind_prefix() {
        assert_eq!(
            Notification::Progress(0.5).event_name(CaptureKind::Burst),
            "BURST-PROGRESS"
        );
        assert_eq!(
            Notification::Started(None).event_name(CaptureKind::Video),
            "VIDEO-CAPTURE-STARTED"
        );
        assert_eq!(
            Notification::StopFailed(CamError::SessionClosed).event_name(CaptureKind::TimeShiftManual),
            "TIME-SHIFT-MANUAL-STOP-ERROR"
        );
    }

    #[test]
    fn output_accessors() {
        let single = CaptureOutput::Single(Some("http://cam/R0001.JPG".into()));
        assert_eq!(single.file_url(), Some("http://cam/R0001.JPG"));
        assert_eq!(CaptureOutput::Multiple(vec![]).file_urls(), Vec::<&str>::new());
        assert_eq!(CaptureOutcome::Canceled.output(), None);
    }
}
