use std::time::Duration;

use crate::{
    consts::{self, shooting_mode},
    notify::CapturingStatus,
    protocol::DeviceCaptureStatus,
    settings::{
        CameraModel, CaptureMode, CaptureOption, ExposureDelay, FirstShooting, OptionSet, Preset,
        ShootingFunction, ShootingMethod, TimeShiftInterval, TimeShiftSetting,
    },
};

mod builder;
mod handle;
mod session;

pub use builder::{Capture, CaptureBuilder};
pub use handle::{CaptureController, CaptureTask, Capturing, TimeShiftManualCapturing};

/// Closed set of capture kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    Photo,
    Video,
    TimeShift,
    TimeShiftManual,
    Burst,
    MultiBracket,
    Continuous,
    ShotCountInterval,
    CompositeInterval,
    LimitlessInterval,
}

/// Command starting a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartCommand {
    /// `camera.takePicture`
    TakePicture,
    /// `camera.startCapture`, with the `_mode` parameter if any.
    StartCapture(Option<&'static str>),
}

/// Where the session reads the progress of a capture from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusSource {
    /// `/osc/commands/status` with the id of the start command.
    CommandStatus,
    /// `_captureStatus` of `/osc/state`.
    DeviceState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputShape {
    Single,
    Multiple,
}

/// Per-kind behaviour of a capturing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KindProfile {
    pub start: StartCommand,
    pub status_source: StatusSource,
    pub output: OutputShape,
    pub reports_progress: bool,
    pub default_interval: Duration,
}

impl CaptureKind {
    pub(crate) fn profile(&self, model: Option<CameraModel>) -> KindProfile {
        let is_x = model == Some(CameraModel::ThetaX);
        let is_sc2 = model.is_some_and(|m| m.is_sc2());

        // The THETA X selects interval and bracket shooting through `_shootingMethod` instead.
        let mode_unless_x = |mode| if is_x { None } else { Some(mode) };

        let start = match self {
            Self::Photo => StartCommand::TakePicture,
            Self::Video | Self::Continuous => StartCommand::StartCapture(None),
            Self::TimeShift => StartCommand::StartCapture(Some(shooting_mode::TIME_SHIFT)),
            Self::TimeShiftManual => {
                StartCommand::StartCapture(Some(shooting_mode::TIME_SHIFT_MANUAL))
            }
            Self::Burst => StartCommand::StartCapture(Some(shooting_mode::BURST)),
            Self::MultiBracket => StartCommand::StartCapture(mode_unless_x(shooting_mode::BRACKET)),
            Self::ShotCountInterval | Self::LimitlessInterval => {
                StartCommand::StartCapture(mode_unless_x(shooting_mode::INTERVAL))
            }
            Self::CompositeInterval => StartCommand::StartCapture(Some(shooting_mode::COMPOSITE)),
        };

        // The SC2 never reports a "done" command state for multi bracket shooting.
        let status_source = match self {
            Self::Video | Self::LimitlessInterval => StatusSource::DeviceState,
            Self::MultiBracket if is_sc2 => StatusSource::DeviceState,
            _ => StatusSource::CommandStatus,
        };

        let output = match self {
            Self::Photo | Self::Video | Self::TimeShift | Self::TimeShiftManual => {
                OutputShape::Single
            }
            _ => OutputShape::Multiple,
        };

        let reports_progress = !matches!(self, Self::Photo | Self::Video | Self::LimitlessInterval);

        let default_interval = match self {
            Self::MultiBracket if is_sc2 => consts::SC2_STATE_CHECK_INTERVAL,
            _ => consts::CHECK_COMMAND_STATUS_INTERVAL,
        };

        KindProfile {
            start,
            status_source,
            output,
            reports_progress,
            default_interval,
        }
    }

    /// Options switching the camera into the mode this kind shoots in.
    /// Sent in a `camera.setOptions` of its own, before the capture options.
    pub(crate) fn mode_options(&self, model: Option<CameraModel>, options: &OptionSet) -> OptionSet {
        use CaptureOption::{CaptureMode as Mode, Function, ShootingMethod as Method};

        let is_x = model == Some(CameraModel::ThetaX);
        let image = OptionSet::new().with(Mode(CaptureMode::Image));

        match self {
            Self::Photo if is_x => image.with(Method(ShootingMethod::Normal)),
            Self::Photo if options.preset().is_some() && model.is_some_and(|m| m.is_sc2()) => {
                OptionSet::new().with(Mode(CaptureMode::Preset))
            }
            Self::Video => OptionSet::new().with(Mode(CaptureMode::Video)),
            Self::TimeShift if is_x => image.with(Method(ShootingMethod::TimeShift)),
            Self::TimeShift if model == Some(CameraModel::ThetaSc2B) => OptionSet::new()
                .with(Mode(CaptureMode::Preset))
                .with(CaptureOption::Preset(Preset::Room))
                .with(CaptureOption::TimeShift(TimeShiftSetting {
                    first_shooting: Some(FirstShooting::Front),
                    first_interval: Some(TimeShiftInterval::Interval2),
                    second_interval: Some(TimeShiftInterval::Interval5),
                }))
                .with(CaptureOption::ExposureDelay(ExposureDelay::Delay2)),
            Self::Continuous => image
                .with(Function(ShootingFunction::Normal))
                .with(Method(ShootingMethod::Continuous)),
            _ => image,
        }
    }

    /// Adds the options this kind always shoots with to the capture options.
    pub(crate) fn prepare_options(&self, model: Option<CameraModel>, options: &mut OptionSet) {
        let is_x = model == Some(CameraModel::ThetaX);

        match self {
            Self::ShotCountInterval if is_x => {
                options.set(CaptureOption::ShootingMethod(ShootingMethod::Interval));
            }
            Self::LimitlessInterval => {
                if is_x {
                    options.set(CaptureOption::ShootingMethod(ShootingMethod::Interval));
                }
                options.set(CaptureOption::CaptureNumber(0));
            }
            Self::MultiBracket if is_x => {
                options.set(CaptureOption::ShootingMethod(ShootingMethod::Bracket));
            }
            _ => {}
        }
    }

    /// Maps a device capture status to the capturing status reported for this kind.
    /// Returns `None` for the idle state.
    pub(crate) fn map_status(&self, status: DeviceCaptureStatus) -> Option<CapturingStatus> {
        use DeviceCaptureStatus as Device;

        let mapped = match (self, status) {
            (_, Device::Idle) => return None,
            (_, Device::SelfTimerCountdown) => CapturingStatus::SelfTimerCountdown,
            (Self::TimeShiftManual, Device::TimeShiftShooting) => CapturingStatus::TimeShiftShooting,
            (Self::TimeShiftManual, Device::TimeShiftShootingIdle) => {
                CapturingStatus::TimeShiftShootingIdle
            }
            (Self::TimeShiftManual, Device::Shooting) => CapturingStatus::TimeShiftShootingSecond,
            (Self::CompositeInterval, Device::Shooting) => CapturingStatus::CompositeShooting,
            _ => CapturingStatus::Capturing,
        };

        Some(mapped)
    }

    /// Whether a started capture of this kind can be stopped with `camera.stopCapture`.
    pub fn can_stop(&self) -> bool {
        !matches!(self, Self::Photo | Self::Continuous)
    }

    /// Prefix of the native bridge event names of this kind.
    pub fn event_prefix(&self) -> &'static str {
        match self {
            Self::Photo => "PHOTO-CAPTURE",
            Self::Video => "VIDEO-CAPTURE",
            Self::TimeShift => "TIME-SHIFT",
            Self::TimeShiftManual => "TIME-SHIFT-MANUAL",
            Self::Burst => "BURST",
            Self::MultiBracket => "MULTI-BRACKET",
            Self::Continuous => "CONTINUOUS",
            Self::ShotCountInterval => "SHOT-COUNT-SPECIFIED-INTERVAL",
            Self::CompositeInterval => "COMPOSITE-INTERVAL",
            Self::LimitlessInterval => "LIMITLESS-INTERVAL-CAPTURE",
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Type-level capture kind, selecting the builder setters and the handle returned by `start_capture`.
pub trait Kind: sealed::Sealed + Send + Sync + 'static {
    const KIND: CaptureKind;

    /// Handle of a started capture of this kind.
    type Handle;

    #[doc(hidden)]
    fn wrap(capturing: Capturing) -> Self::Handle;
}

/// Kinds taking a file format.
pub trait FileFormatKind: Kind {}

/// Kinds taking a time-shift setting.
pub trait TimeShiftKind: Kind {}

/// Kinds taking a capture interval.
pub trait IntervalKind: Kind {}

macro_rules! capture_kinds {
    ($($(#[$doc:meta])* $name:ident: $handle:ty => $builder:ident, $capture:ident;)*) => {
        /// Marker types of the capture kinds.
        pub mod kind {
            $(
                $(#[$doc])*
                #[derive(Debug, Clone, Copy)]
                pub struct $name;
            )*
        }

        $(
            impl sealed::Sealed for kind::$name {}

            impl Kind for kind::$name {
                const KIND: CaptureKind = CaptureKind::$name;
                type Handle = $handle;

                fn wrap(capturing: Capturing) -> $handle {
                    capturing.into()
                }
            }

            pub type $builder<T> = CaptureBuilder<T, kind::$name>;
            pub type $capture<T> = Capture<T, kind::$name>;
        )*
    };
}

capture_kinds! {
    /// Still image. Can't be canceled once taken.
    Photo: CaptureTask => PhotoCaptureBuilder, PhotoCapture;
    Video: Capturing => VideoCaptureBuilder, VideoCapture;
    TimeShift: Capturing => TimeShiftCaptureBuilder, TimeShiftCapture;
    /// Time-shift where the second lens is triggered by the caller.
    TimeShiftManual: TimeShiftManualCapturing => TimeShiftManualCaptureBuilder, TimeShiftManualCapture;
    Burst: Capturing => BurstCaptureBuilder, BurstCapture;
    MultiBracket: Capturing => MultiBracketCaptureBuilder, MultiBracketCapture;
    /// Continuous shooting. Runs until the camera stops on its own.
    Continuous: CaptureTask => ContinuousCaptureBuilder, ContinuousCapture;
    ShotCountInterval: Capturing => ShotCountSpecifiedIntervalCaptureBuilder, ShotCountSpecifiedIntervalCapture;
    CompositeInterval: Capturing => CompositeIntervalCaptureBuilder, CompositeIntervalCapture;
    LimitlessInterval: Capturing => LimitlessIntervalCaptureBuilder, LimitlessIntervalCapture;
}

impl FileFormatKind for kind::Video {}
impl FileFormatKind for kind::Continuous {}

impl TimeShiftKind for kind::TimeShift {}
impl TimeShiftKind for kind::TimeShiftManual {}

impl IntervalKind for kind::ShotCountInterval {}
impl IntervalKind for kind::LimitlessInterval {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_x_omits_mode_for_interval_and_bracket() {
        let x = Some(CameraModel::ThetaX);

        assert_eq!(
            CaptureKind::ShotCountInterval.profile(x).start,
            StartCommand::StartCapture(None)
        );
        assert_eq!(
            CaptureKind::MultiBracket.profile(x).start,
            StartCommand::StartCapture(None)
        );
        assert_eq!(
            CaptureKind::ShotCountInterval.profile(None).start,
            StartCommand::StartCapture(Some("interval"))
        );
        assert_eq!(
            CaptureKind::TimeShift.profile(x).start,
            StartCommand::StartCapture(Some("timeShift"))
        );
    }

    #[test]
    fn status_source_is_fixed_per_kind() {
        let sc2 = CaptureKind::MultiBracket.profile(Some(CameraModel::ThetaSc2));
        assert_eq!(sc2.status_source, StatusSource::DeviceState);
        assert_eq!(sc2.default_interval, Duration::from_millis(3000));

        let z1 = CaptureKind::MultiBracket.profile(Some(CameraModel::ThetaZ1));
        assert_eq!(z1.status_source, StatusSource::CommandStatus);
        assert_eq!(z1.default_interval, Duration::from_millis(1000));

        assert_eq!(
            CaptureKind::Video.profile(None).status_source,
            StatusSource::DeviceState
        );
        assert_eq!(
            CaptureKind::Burst.profile(None).status_source,
            StatusSource::CommandStatus
        );
    }

    #[test]
    fn mode_switch_depends_on_model() {
        let json = CaptureKind::Photo
            .mode_options(Some(CameraModel::ThetaX), &OptionSet::new())
            .to_json();
        assert_eq!(json["captureMode"], "image");
        assert_eq!(json["_shootingMethod"], "normal");

        let preset = OptionSet::new().with(CaptureOption::Preset(Preset::NightView));
        let json = CaptureKind::Photo
            .mode_options(Some(CameraModel::ThetaSc2), &preset)
            .to_json();
        assert_eq!(json["captureMode"], "_preset");

        let json = CaptureKind::TimeShift
            .mode_options(Some(CameraModel::ThetaSc2B), &OptionSet::new())
            .to_json();
        assert_eq!(json["_preset"], "room");
        assert_eq!(json["exposureDelay"], 2);
    }

    #[test]
    fn limitless_interval_never_stops_on_its_own() {
        let mut options = OptionSet::new();
        CaptureKind::LimitlessInterval.prepare_options(Some(CameraModel::ThetaX), &mut options);

        assert_eq!(options.capture_number(), Some(0));
        assert_eq!(
            options.get(crate::settings::OptionName::ShootingMethod),
            Some(&CaptureOption::ShootingMethod(ShootingMethod::Interval))
        );
    }

    #[test]
    fn status_mapping_is_kind_specific() {
        use DeviceCaptureStatus as Device;

        assert_eq!(CaptureKind::Burst.map_status(Device::Idle), None);
        assert_eq!(
            CaptureKind::TimeShiftManual.map_status(Device::Shooting),
            Some(CapturingStatus::TimeShiftShootingSecond)
        );
        assert_eq!(
            CaptureKind::CompositeInterval.map_status(Device::Shooting),
            Some(CapturingStatus::CompositeShooting)
        );
        assert_eq!(
            CaptureKind::Photo.map_status(Device::SelfTimerCountdown),
            Some(CapturingStatus::SelfTimerCountdown)
        );
        assert_eq!(
            CaptureKind::Burst.map_status(Device::BracketShooting),
            Some(CapturingStatus::Capturing)
        );
    }
}
