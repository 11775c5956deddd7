use std::time::Duration;

/// Default interval between two `camera.commands/status` polls.
pub const CHECK_COMMAND_STATUS_INTERVAL: Duration = Duration::from_millis(1000);

/// Default interval between two `/osc/state` polls on a THETA SC2 multi bracket capture.
/// The SC2 never reports a "done" command state for that kind, so the device state is polled instead.
pub const SC2_STATE_CHECK_INTERVAL: Duration = Duration::from_millis(3000);

/// Number of attempts at reading `/osc/state` before the capture status is considered unavailable.
pub const CHECK_STATE_RETRY: u32 = 3;

/// Number of consecutive "idle" states needed before a state-polled capture is considered finished.
pub const CHECK_SHOOTING_IDLE_COUNT: u32 = 2;

/// Web API command names.
pub mod command {
    pub const SET_OPTIONS: &str = "camera.setOptions";
    pub const TAKE_PICTURE: &str = "camera.takePicture";
    pub const START_CAPTURE: &str = "camera.startCapture";
    pub const STOP_CAPTURE: &str = "camera.stopCapture";
    pub const GET_OPTIONS: &str = "camera.getOptions";
}

/// Values of the `_mode` parameter of `camera.startCapture`.
pub mod shooting_mode {
    pub const INTERVAL: &str = "interval";
    pub const COMPOSITE: &str = "composite";
    pub const BRACKET: &str = "bracket";
    pub const TIME_SHIFT: &str = "timeShift";
    pub const TIME_SHIFT_MANUAL: &str = "timeShift_manual";
    pub const BURST: &str = "burst";
}

/// Error codes reported by the device.
pub mod error_code {
    /// Reported when a capture was stopped before it produced anything.
    pub const CANCELED_SHOOTING: &str = "canceledShooting";
}

/// Number of shots in multi bracket shooting.
pub mod bracket {
    pub const MIN_SHOTS: usize = 2;
    pub const MAX_SHOTS: usize = 13;
    pub const MAX_SHOTS_V: usize = 19;
    pub const MAX_SHOTS_Z1: usize = 19;

    /// Color temperature used on models which require one for each bracket shot.
    pub const DEFAULT_COLOR_TEMPERATURE: u32 = 5000;
}
