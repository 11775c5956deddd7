use std::{marker::PhantomData, time::Duration};

use log::*;

use super::{
    CaptureKind, FileFormatKind, IntervalKind, Kind, TimeShiftKind, kind, session,
};
use crate::{
    CamError, CamResult,
    cam::ThetaCam,
    settings::*,
    transport::CommandTransport,
};

/// Accumulates the options of a capture of kind `K`.
///
/// The builder performs no camera validation: whether an option is legal for the
/// connected model is only known when [`CaptureBuilder::build`] applies it.
pub struct CaptureBuilder<T, K> {
    cam: ThetaCam<T>,
    options: OptionSet,
    interval: Option<Duration>,
    _kind: PhantomData<K>,
}

impl<T: CommandTransport, K: Kind> CaptureBuilder<T, K> {
    pub(crate) fn new(cam: ThetaCam<T>, options: OptionSet) -> Self {
        Self {
            cam,
            options,
            interval: None,
            _kind: PhantomData,
        }
    }

    /// Options accumulated so far.
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Sets any option, replacing a previous value of the same name.
    pub fn set_option(mut self, option: CaptureOption) -> Self {
        self.options.set(option);
        self
    }

    pub fn set_aperture(self, aperture: Aperture) -> Self {
        self.set_option(CaptureOption::Aperture(aperture))
    }

    /// * `kelvin` - Color temperature, 2500 to 10000 in 100-Kelvin units.
    pub fn set_color_temperature(self, kelvin: u32) -> Self {
        self.set_option(CaptureOption::ColorTemperature(kelvin))
    }

    pub fn set_exposure_compensation(self, ev: ExposureCompensation) -> Self {
        self.set_option(CaptureOption::ExposureCompensation(ev))
    }

    pub fn set_exposure_delay(self, delay: ExposureDelay) -> Self {
        self.set_option(CaptureOption::ExposureDelay(delay))
    }

    pub fn set_exposure_program(self, program: ExposureProgram) -> Self {
        self.set_option(CaptureOption::ExposureProgram(program))
    }

    pub fn set_gps_info(self, info: GpsInfo) -> Self {
        self.set_option(CaptureOption::GpsInfo(info))
    }

    pub fn set_gps_tag_recording(self, on: bool) -> Self {
        self.set_option(CaptureOption::GpsTagRecording(on))
    }

    pub fn set_iso(self, iso: Iso) -> Self {
        self.set_option(CaptureOption::Iso(iso))
    }

    pub fn set_iso_auto_high_limit(self, iso: Iso) -> Self {
        self.set_option(CaptureOption::IsoAutoHighLimit(iso))
    }

    pub fn set_white_balance(self, wb: WhiteBalance) -> Self {
        self.set_option(CaptureOption::WhiteBalance(wb))
    }

    /// Sets the interval between two status polls. Without it the kind's default is used.
    pub fn set_check_status_command_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the interval between two status polls in milliseconds.
    ///
    /// `-1` selects the kind's default. Any other negative value is rejected.
    pub fn set_check_status_command_interval_millis(mut self, millis: i64) -> CamResult<Self> {
        self.interval = match millis {
            -1 => None,
            millis if millis < 0 => {
                return Err(CamError::invalid_argument(format!(
                    "Check status command interval must not be negative: {millis}"
                )));
            }
            millis => Some(Duration::from_millis(millis.unsigned_abs())),
        };

        Ok(self)
    }

    /// Switches the camera into the kind's shooting mode, then applies the accumulated options.
    ///
    /// The mode switch and the options are sent as two `camera.setOptions` commands;
    /// the second one is skipped when no option was set. Consumes the builder.
    pub async fn build(self) -> CamResult<Capture<T, K>> {
        let kind = K::KIND;
        let model = self.cam.model();

        if kind == CaptureKind::MultiBracket {
            let shots = self.options.auto_bracket().map_or(0, |settings| settings.len());
            let (min, max) = bracket_shot_range(model);

            if shots < min {
                error!("Not enough shots for multi bracket shooting: {shots}");
                return Err(bracket_shot_count_error(min, max));
            }
        }

        let mut options = self.options;
        kind.prepare_options(model, &mut options);

        let mode = kind.mode_options(model, &options);
        debug!("Switching the camera to {kind:?} capture");
        self.cam.set_options(&mode).await?;

        if !options.is_empty() {
            self.cam.set_options(&options).await?;
        }

        let interval = self
            .interval
            .unwrap_or(kind.profile(model).default_interval);

        info!("{kind:?} capture ready ({} options, polling every {interval:?})", options.len());

        Ok(Capture {
            cam: self.cam,
            options,
            interval,
            _kind: PhantomData,
        })
    }
}

impl<T: CommandTransport> CaptureBuilder<T, kind::Photo> {
    pub fn set_filter(self, filter: Filter) -> Self {
        self.set_option(CaptureOption::Filter(filter))
    }

    /// Preset mode of the THETA SC2 family. Setting one switches the camera into preset mode.
    pub fn set_preset(self, preset: Preset) -> Self {
        self.set_option(CaptureOption::Preset(preset))
    }
}

impl<T: CommandTransport> CaptureBuilder<T, kind::Video> {
    /// * `secs` - Maximum recordable time in seconds.
    pub fn set_max_recordable_time(self, secs: u32) -> Self {
        self.set_option(CaptureOption::MaxRecordableTime(secs))
    }
}

impl<T: CommandTransport, K: FileFormatKind> CaptureBuilder<T, K> {
    pub fn set_file_format(self, format: FileFormat) -> Self {
        self.set_option(CaptureOption::FileFormat(format))
    }
}

impl<T: CommandTransport, K: TimeShiftKind> CaptureBuilder<T, K> {
    /// Selects the lens shooting first.
    pub fn set_is_front_first(mut self, front_first: bool) -> Self {
        let first = if front_first {
            FirstShooting::Front
        } else {
            FirstShooting::Rear
        };
        self.options
            .update_time_shift(|setting| setting.first_shooting = Some(first));
        self
    }

    /// Time before the first lens shoots.
    pub fn set_first_interval(mut self, interval: TimeShiftInterval) -> Self {
        self.options
            .update_time_shift(|setting| setting.first_interval = Some(interval));
        self
    }

    /// Time from the first lens shooting until the second lens starts shooting.
    pub fn set_second_interval(mut self, interval: TimeShiftInterval) -> Self {
        self.options
            .update_time_shift(|setting| setting.second_interval = Some(interval));
        self
    }
}

impl<T: CommandTransport> CaptureBuilder<T, kind::Burst> {
    pub fn set_burst_mode(self, on: bool) -> Self {
        self.set_option(CaptureOption::BurstMode(on))
    }
}

impl<T: CommandTransport> CaptureBuilder<T, kind::MultiBracket> {
    /// Adds the parameters of one more bracket shot.
    ///
    /// Parameters the camera model does not accept are dropped and missing
    /// required ones are filled in. Fails if the model can't take another shot.
    pub fn add_bracket_parameters(mut self, setting: BracketSetting) -> CamResult<Self> {
        let model = self.cam.model();
        let (min, max) = bracket_shot_range(model);

        let mut settings = self.options.auto_bracket().unwrap_or_default();
        if settings.len() >= max {
            return Err(bracket_shot_count_error(min, max));
        }

        settings.push(match model {
            Some(model) => setting.for_model(model),
            None => setting,
        });
        self.options.set(CaptureOption::AutoBracket(settings));

        Ok(self)
    }

    pub fn add_bracket_setting_list(
        self,
        settings: impl IntoIterator<Item = BracketSetting>,
    ) -> CamResult<Self> {
        settings
            .into_iter()
            .try_fold(self, |builder, setting| builder.add_bracket_parameters(setting))
    }

    /// Minimum number of shots the camera model takes.
    pub fn min_shots(&self) -> usize {
        bracket_shot_range(self.cam.model()).0
    }

    /// Maximum number of shots the camera model takes. 0 if the model is unknown.
    pub fn max_shots(&self) -> usize {
        bracket_shot_range(self.cam.model()).1
    }
}

impl<T: CommandTransport, K: IntervalKind> CaptureBuilder<T, K> {
    /// * `secs` - Shooting interval in seconds.
    pub fn set_capture_interval(self, secs: u32) -> Self {
        self.set_option(CaptureOption::CaptureInterval(secs))
    }
}

impl<T: CommandTransport> CaptureBuilder<T, kind::CompositeInterval> {
    /// * `secs` - Interval in seconds between two in-progress composite images.
    pub fn set_composite_shooting_output_interval(self, secs: u32) -> Self {
        self.set_option(CaptureOption::CompositeShootingOutputInterval(secs))
    }
}

fn bracket_shot_range(model: Option<CameraModel>) -> (usize, usize) {
    model.map_or((crate::consts::bracket::MIN_SHOTS, 0), |model| {
        model.bracket_shot_range()
    })
}

fn bracket_shot_count_error(min: usize, max: usize) -> CamError {
    if max == 0 {
        CamError::invalid_argument("Unsupported multi bracket capture")
    } else {
        CamError::invalid_argument(format!(
            "Number of shots in multi bracket shooting is {min} to {max}"
        ))
    }
}

/// Configured capture, ready to be started. Consumed by starting it.
pub struct Capture<T, K> {
    cam: ThetaCam<T>,
    options: OptionSet,
    interval: Duration,
    _kind: PhantomData<K>,
}

impl<T: CommandTransport, K: Kind> Capture<T, K> {
    pub fn kind(&self) -> CaptureKind {
        K::KIND
    }

    /// Options applied to the camera, including the ones the kind always shoots with.
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn check_status_command_interval(&self) -> Duration {
        self.interval
    }

    /// Starts the capture and returns its handle.
    ///
    /// The session runs as a task of its own; this must be called within a Tokio runtime.
    pub fn start_capture(self) -> K::Handle {
        K::wrap(session::spawn(self.cam, K::KIND, self.interval))
    }
}

impl<T: CommandTransport> Capture<T, kind::Photo> {
    /// Takes a picture. Resolves with the URL of the picture.
    pub fn take_picture(self) -> super::CaptureTask {
        self.start_capture()
    }
}

impl<T: CommandTransport> Capture<T, kind::Continuous> {
    /// Reads how many shots the camera will take with the applied options.
    pub async fn continuous_number(&self) -> CamResult<ContinuousNumber> {
        let options = self.cam.get_options(&[OptionName::ContinuousNumber]).await?;
        let number =
            ContinuousNumber::from_value(options.get(OptionName::ContinuousNumber.wire_name()));

        debug!("Continuous number: {number:?}");
        Ok(number)
    }
}
