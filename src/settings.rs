use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::consts;

/// Camera model. Some capture kinds behave differently depending on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraModel {
    ThetaS,
    ThetaSc,
    ThetaV,
    ThetaSc2,
    /// THETA SC2 for business
    ThetaSc2B,
    ThetaZ1,
    ThetaX,
}

impl CameraModel {
    /// Whether the model belongs to the SC2 family.
    pub fn is_sc2(&self) -> bool {
        matches!(self, Self::ThetaSc2 | Self::ThetaSc2B)
    }

    /// Older models which take a fixed set of bracket parameters
    /// (no exposure program or compensation, a color temperature instead of a white balance).
    fn has_legacy_bracket(&self) -> bool {
        matches!(self, Self::ThetaSc2 | Self::ThetaSc2B | Self::ThetaS | Self::ThetaSc)
    }

    /// Returns the allowed (min, max) number of shots in multi bracket shooting.
    pub fn bracket_shot_range(&self) -> (usize, usize) {
        use consts::bracket::*;

        match self {
            Self::ThetaV => (MIN_SHOTS, MAX_SHOTS_V),
            Self::ThetaZ1 => (MIN_SHOTS, MAX_SHOTS_Z1),
            _ => (MIN_SHOTS, MAX_SHOTS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Specifies the aperture value.
pub enum Aperture {
    #[default]
    Auto,
    F2_0,
    F2_1,
    F2_4,
    F3_5,
    F5_6,
}

impl Aperture {
    pub fn value(&self) -> f64 {
        match self {
            Self::Auto => 0.0,
            Self::F2_0 => 2.0,
            Self::F2_1 => 2.1,
            Self::F2_4 => 2.4,
            Self::F3_5 => 3.5,
            Self::F5_6 => 5.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Specifies the exposure value compensation.
pub enum ExposureCompensation {
    Neg2_0,
    Neg1_7,
    Neg1_3,
    Neg1_0,
    Neg0_7,
    Neg0_3,
    #[default]
    Zero,
    Pos0_3,
    Pos0_7,
    Pos1_0,
    Pos1_3,
    Pos1_7,
    Pos2_0,
}

impl ExposureCompensation {
    pub fn value(&self) -> f64 {
        match self {
            Self::Neg2_0 => -2.0,
            Self::Neg1_7 => -1.7,
            Self::Neg1_3 => -1.3,
            Self::Neg1_0 => -1.0,
            Self::Neg0_7 => -0.7,
            Self::Neg0_3 => -0.3,
            Self::Zero => 0.0,
            Self::Pos0_3 => 0.3,
            Self::Pos0_7 => 0.7,
            Self::Pos1_0 => 1.0,
            Self::Pos1_3 => 1.3,
            Self::Pos1_7 => 1.7,
            Self::Pos2_0 => 2.0,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Specifies the operating time (sec.) of the self-timer.
pub enum ExposureDelay {
    #[default]
    Off = 0,
    Delay1 = 1,
    Delay2 = 2,
    Delay3 = 3,
    Delay4 = 4,
    Delay5 = 5,
    Delay6 = 6,
    Delay7 = 7,
    Delay8 = 8,
    Delay9 = 9,
    Delay10 = 10,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Specifies the exposure program, i.e. which exposure settings take priority.
pub enum ExposureProgram {
    Manual = 1,
    #[default]
    NormalProgram = 2,
    AperturePriority = 3,
    ShutterPriority = 4,
    IsoPriority = 9,
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Specifies the ISO sensitivity. `Auto` lets the camera decide.
pub enum Iso {
    #[default]
    Auto = 0,
    Iso50 = 50,
    Iso64 = 64,
    Iso80 = 80,
    Iso100 = 100,
    Iso125 = 125,
    Iso160 = 160,
    Iso200 = 200,
    Iso250 = 250,
    Iso320 = 320,
    Iso400 = 400,
    Iso500 = 500,
    Iso640 = 640,
    Iso800 = 800,
    Iso1000 = 1000,
    Iso1250 = 1250,
    Iso1600 = 1600,
    Iso2000 = 2000,
    Iso2500 = 2500,
    Iso3200 = 3200,
    Iso4000 = 4000,
    Iso5000 = 5000,
    Iso6400 = 6400,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Specifies the white balance as a preset.
pub enum WhiteBalance {
    #[default]
    Auto,
    Daylight,
    Shade,
    CloudyDaylight,
    Incandescent,
    WarmWhiteFluorescent,
    DaylightFluorescent,
    DayWhiteFluorescent,
    Fluorescent,
    BulbFluorescent,
    /// Use the value set by the color temperature option.
    ColorTemperature,
    Underwater,
}

impl WhiteBalance {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Daylight => "daylight",
            Self::Shade => "shade",
            Self::CloudyDaylight => "cloudy-daylight",
            Self::Incandescent => "incandescent",
            Self::WarmWhiteFluorescent => "_warmWhiteFluorescent",
            Self::DaylightFluorescent => "_dayLightFluorescent",
            Self::DayWhiteFluorescent => "_dayWhiteFluorescent",
            Self::Fluorescent => "fluorescent",
            Self::BulbFluorescent => "_bulbFluorescent",
            Self::ColorTemperature => "_colorTemperature",
            Self::Underwater => "_underwater",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Specifies the image processing filter.
pub enum Filter {
    #[default]
    Off,
    /// Noise reduction
    NoiseReduction,
    /// Dynamic range compensation
    DrComp,
    Hdr,
    /// Handheld HDR
    HhHdr,
}

impl Filter {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::NoiseReduction => "Noise Reduction",
            Self::DrComp => "DR Comp",
            Self::Hdr => "hdr",
            Self::HhHdr => "Hh hdr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Preset mode of the THETA SC2 family.
pub enum Preset {
    Face,
    NightView,
    LensByLensExposure,
    Room,
}

impl Preset {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::NightView => "nightView",
            Self::LensByLensExposure => "lensbylensExposure",
            Self::Room => "room",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Shooting mode of the camera.
pub enum CaptureMode {
    Image,
    Video,
    /// Preset mode of the THETA SC2 family.
    Preset,
}

impl CaptureMode {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Preset => "_preset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Shooting method of the THETA X, selected together with the capture mode.
pub enum ShootingMethod {
    Normal,
    Interval,
    Bracket,
    TimeShift,
    Continuous,
}

impl ShootingMethod {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Interval => "interval",
            Self::Bracket => "bracket",
            Self::TimeShift => "timeShift",
            Self::Continuous => "continuous",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Shooting function. Continuous shooting can't start while the camera uses "my setting".
pub enum ShootingFunction {
    Normal,
    SelfTimer,
    MySetting,
}

impl ShootingFunction {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::SelfTimer => "selfTimer",
            Self::MySetting => "mySetting",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// GPS information embedded in the captured files.
pub struct GpsInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub date_time_zone: chrono::DateTime<chrono::FixedOffset>,
}

impl GpsInfo {
    /// Latitude and longitude value the camera interprets as "no position".
    pub const DISABLED_COORDINATE: f64 = 65535.0;

    /// GPS information telling the camera not to record any position.
    pub fn disabled() -> Self {
        Self {
            latitude: Self::DISABLED_COORDINATE,
            longitude: Self::DISABLED_COORDINATE,
            altitude: 0.0,
            date_time_zone: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH.fixed_offset(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.latitude == Self::DISABLED_COORDINATE && self.longitude == Self::DISABLED_COORDINATE
    }

    fn to_json(&self) -> Value {
        if self.is_disabled() {
            return json!({ "lat": self.latitude, "lng": self.longitude });
        }

        json!({
            "lat": self.latitude,
            "lng": self.longitude,
            "_altitude": self.altitude,
            "_dateTimeZone": self.date_time_zone.format("%Y:%m:%d %H:%M:%S%:z").to_string(),
            "_datum": "WGS84",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Which lens shoots first in time-shift shooting.
pub enum FirstShooting {
    #[default]
    Front,
    Rear,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Time (sec.) before a lens starts shooting in time-shift shooting.
pub enum TimeShiftInterval {
    Interval0 = 0,
    Interval1 = 1,
    #[default]
    Interval2 = 2,
    Interval3 = 3,
    Interval4 = 4,
    Interval5 = 5,
    Interval6 = 6,
    Interval7 = 7,
    Interval8 = 8,
    Interval9 = 9,
    Interval10 = 10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Time-shift shooting setting. Fields left at `None` are not sent to the camera.
pub struct TimeShiftSetting {
    pub first_shooting: Option<FirstShooting>,
    /// Time before the first lens shoots.
    pub first_interval: Option<TimeShiftInterval>,
    /// Time from the first lens shooting until the second lens starts shooting.
    pub second_interval: Option<TimeShiftInterval>,
}

impl TimeShiftSetting {
    fn to_json(&self) -> Value {
        let mut map = Map::new();

        if let Some(first) = self.first_shooting {
            let value = match first {
                FirstShooting::Front => "front",
                FirstShooting::Rear => "rear",
            };
            map.insert("firstShooting".into(), value.into());
        }
        if let Some(interval) = self.first_interval {
            map.insert("firstInterval".into(), (interval as u8).into());
        }
        if let Some(interval) = self.second_interval {
            map.insert("secondInterval".into(), (interval as u8).into());
        }

        Value::Object(map)
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Number of shots for burst shooting.
pub enum BurstCaptureNum {
    #[default]
    Num1 = 1,
    Num3 = 3,
    Num5 = 5,
    Num7 = 7,
    Num9 = 9,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, int_enum::IntEnum)]
/// Shooting order for burst shooting.
pub enum BurstOrder {
    /// 0 → minus → plus
    #[default]
    ZeroMinusPlus = 0,
    /// minus → 0 → plus
    MinusZeroPlus = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Bracket value range (EV) between each shot of burst shooting.
pub enum BurstBracketStep {
    Step0_0,
    Step0_3,
    Step0_7,
    #[default]
    Step1_0,
    Step1_3,
    Step1_7,
    Step2_0,
    Step2_3,
    Step2_7,
    Step3_0,
}

impl BurstBracketStep {
    pub fn value(&self) -> f64 {
        match self {
            Self::Step0_0 => 0.0,
            Self::Step0_3 => 0.3,
            Self::Step0_7 => 0.7,
            Self::Step1_0 => 1.0,
            Self::Step1_3 => 1.3,
            Self::Step1_7 => 1.7,
            Self::Step2_0 => 2.0,
            Self::Step2_3 => 2.3,
            Self::Step2_7 => 2.7,
            Self::Step3_0 => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Exposure compensation (EV) for the base image and entire burst shooting.
pub enum BurstCompensation {
    Neg5_0,
    Neg4_7,
    Neg4_3,
    Neg4_0,
    Neg3_7,
    Neg3_3,
    Neg3_0,
    Neg2_7,
    Neg2_3,
    Neg2_0,
    Neg1_7,
    Neg1_3,
    Neg1_0,
    Neg0_7,
    Neg0_3,
    #[default]
    Zero,
    Pos0_3,
    Pos0_7,
    Pos1_0,
    Pos1_3,
    Pos1_7,
    Pos2_0,
    Pos2_3,
    Pos2_7,
    Pos3_0,
    Pos3_3,
    Pos3_7,
    Pos4_0,
    Pos4_3,
    Pos4_7,
    Pos5_0,
}

impl BurstCompensation {
    pub fn value(&self) -> f64 {
        match self {
            Self::Neg5_0 => -5.0,
            Self::Neg4_7 => -4.7,
            Self::Neg4_3 => -4.3,
            Self::Neg4_0 => -4.0,
            Self::Neg3_7 => -3.7,
            Self::Neg3_3 => -3.3,
            Self::Neg3_0 => -3.0,
            Self::Neg2_7 => -2.7,
            Self::Neg2_3 => -2.3,
            Self::Neg2_0 => -2.0,
            Self::Neg1_7 => -1.7,
            Self::Neg1_3 => -1.3,
            Self::Neg1_0 => -1.0,
            Self::Neg0_7 => -0.7,
            Self::Neg0_3 => -0.3,
            Self::Zero => 0.0,
            Self::Pos0_3 => 0.3,
            Self::Pos0_7 => 0.7,
            Self::Pos1_0 => 1.0,
            Self::Pos1_3 => 1.3,
            Self::Pos1_7 => 1.7,
            Self::Pos2_0 => 2.0,
            Self::Pos2_3 => 2.3,
            Self::Pos2_7 => 2.7,
            Self::Pos3_0 => 3.0,
            Self::Pos3_3 => 3.3,
            Self::Pos3_7 => 3.7,
            Self::Pos4_0 => 4.0,
            Self::Pos4_3 => 4.3,
            Self::Pos4_7 => 4.7,
            Self::Pos5_0 => 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Maximum exposure time (sec.) of burst shooting.
pub enum BurstMaxExposureTime {
    Time0_5,
    Time0_625,
    /// 1/1.3 sec.
    Time0_76923076,
    Time1,
    Time1_3,
    Time1_6,
    Time2,
    Time2_5,
    Time3_2,
    Time4,
    Time5,
    Time6,
    Time8,
    Time10,
    Time13,
    #[default]
    Time15,
    Time20,
    Time25,
    Time30,
    Time40,
    Time50,
    Time60,
}

impl BurstMaxExposureTime {
    pub fn value(&self) -> f64 {
        match self {
            Self::Time0_5 => 0.5,
            Self::Time0_625 => 0.625,
            Self::Time0_76923076 => 0.76923076,
            Self::Time1 => 1.0,
            Self::Time1_3 => 1.3,
            Self::Time1_6 => 1.6,
            Self::Time2 => 2.0,
            Self::Time2_5 => 2.5,
            Self::Time3_2 => 3.2,
            Self::Time4 => 4.0,
            Self::Time5 => 5.0,
            Self::Time6 => 6.0,
            Self::Time8 => 8.0,
            Self::Time10 => 10.0,
            Self::Time13 => 13.0,
            Self::Time15 => 15.0,
            Self::Time20 => 20.0,
            Self::Time25 => 25.0,
            Self::Time30 => 30.0,
            Self::Time40 => 40.0,
            Self::Time50 => 50.0,
            Self::Time60 => 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Burst shooting setting.
pub struct BurstOption {
    pub capture_num: BurstCaptureNum,
    pub bracket_step: BurstBracketStep,
    pub compensation: BurstCompensation,
    pub max_exposure_time: BurstMaxExposureTime,
    /// Adjustment with ISO sensitivity.
    pub enable_iso_control: bool,
    pub order: BurstOrder,
}

impl BurstOption {
    fn to_json(&self) -> Value {
        let capture_num = self.capture_num as u8;
        let order = self.order as u8;

        json!({
            "_burstCaptureNum": capture_num,
            "_burstBracketStep": self.bracket_step.value(),
            "_burstCompensation": self.compensation.value(),
            "_burstMaxExposureTime": self.max_exposure_time.value(),
            "_burstEnableIsoControl": u8::from(self.enable_iso_control),
            "_burstOrder": order,
        })
    }
}

/// Maximum number of shots the camera takes in continuous shooting.
/// Depends on the file format and the camera's free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuousNumber {
    Off,
    /// At most this many shots, 1 to 20.
    Max(u8),
    /// The camera does not report the number.
    Unsupported,
}

impl ContinuousNumber {
    /// Interprets the value the camera reports.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_u64) {
            Some(0) => Self::Off,
            Some(n @ 1..=20) => Self::Max(n as u8),
            _ => Self::Unsupported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Parameters of one shot in multi bracket shooting.
pub struct BracketSetting {
    pub aperture: Option<Aperture>,
    pub color_temperature: Option<u32>,
    pub exposure_compensation: Option<ExposureCompensation>,
    pub exposure_program: Option<ExposureProgram>,
    pub iso: Option<Iso>,
    /// Shutter speed (sec.)
    pub shutter_speed: Option<f64>,
    pub white_balance: Option<WhiteBalance>,
}

impl BracketSetting {
    /// Fills in the defaults the given camera model requires
    /// and drops the parameters it does not accept.
    pub fn for_model(self, model: CameraModel) -> Self {
        if model.has_legacy_bracket() {
            return Self {
                aperture: None,
                color_temperature: Some(
                    self.color_temperature
                        .unwrap_or(consts::bracket::DEFAULT_COLOR_TEMPERATURE),
                ),
                exposure_compensation: None,
                exposure_program: None,
                iso: Some(self.iso.unwrap_or(Iso::Iso400)),
                shutter_speed: Some(self.shutter_speed.unwrap_or(1.0 / 250.0)),
                white_balance: None,
            };
        }

        let white_balance = match self.color_temperature {
            Some(_) => WhiteBalance::ColorTemperature,
            None => self.white_balance.unwrap_or_default(),
        };

        Self {
            aperture: self.aperture.filter(|_| model == CameraModel::ThetaZ1),
            color_temperature: self.color_temperature,
            exposure_compensation: self
                .exposure_compensation
                .filter(|_| model != CameraModel::ThetaX),
            exposure_program: match model {
                CameraModel::ThetaX => Some(ExposureProgram::Manual),
                _ => Some(self.exposure_program.unwrap_or(ExposureProgram::Manual)),
            },
            iso: self.iso,
            shutter_speed: self.shutter_speed,
            white_balance: Some(white_balance),
        }
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();

        if let Some(aperture) = self.aperture {
            map.insert("aperture".into(), aperture.value().into());
        }
        if let Some(kelvin) = self.color_temperature {
            map.insert("_colorTemperature".into(), kelvin.into());
        }
        if let Some(ev) = self.exposure_compensation {
            map.insert("exposureCompensation".into(), ev.value().into());
        }
        if let Some(program) = self.exposure_program {
            map.insert("exposureProgram".into(), (program as u8).into());
        }
        if let Some(iso) = self.iso {
            map.insert("iso".into(), (iso as u16).into());
        }
        if let Some(speed) = self.shutter_speed {
            map.insert("shutterSpeed".into(), speed.into());
        }
        if let Some(wb) = self.white_balance {
            map.insert("whiteBalance".into(), wb.wire_name().into());
        }

        Value::Object(map)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Container type of a captured file.
pub enum FileType {
    Jpeg,
    Raw,
    Mp4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Still image or video file format.
pub struct FileFormat {
    pub file_type: FileType,
    pub width: u32,
    pub height: u32,
    /// Video frame rate, only sent for video formats.
    pub frame_rate: Option<u32>,
}

impl FileFormat {
    /// 5.5K still image (THETA X)
    pub const IMAGE_5_5K: Self = Self::image(5504, 2752);
    /// 11K still image (THETA X)
    pub const IMAGE_11K: Self = Self::image(11008, 5504);
    /// 4K 30fps video
    pub const VIDEO_4K_30F: Self = Self::video(3840, 1920, 30);
    /// 2K 30fps video
    pub const VIDEO_2K_30F: Self = Self::video(1920, 960, 30);

    pub const fn image(width: u32, height: u32) -> Self {
        Self {
            file_type: FileType::Jpeg,
            width,
            height,
            frame_rate: None,
        }
    }

    pub const fn video(width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            file_type: FileType::Mp4,
            width,
            height,
            frame_rate: Some(frame_rate),
        }
    }

    fn to_json(&self) -> Value {
        let file_type = match self.file_type {
            FileType::Jpeg => "jpeg",
            FileType::Raw => "raw+",
            FileType::Mp4 => "mp4",
        };

        let mut map = Map::new();
        map.insert("type".into(), file_type.into());
        map.insert("width".into(), self.width.into());
        map.insert("height".into(), self.height.into());
        if let Some(fps) = self.frame_rate {
            map.insert("_frameRate".into(), fps.into());
        }

        Value::Object(map)
    }
}

/// Name of a capture option. Each name appears at most once in an [`OptionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionName {
    CaptureMode,
    ShootingMethod,
    Function,
    Aperture,
    ColorTemperature,
    ExposureCompensation,
    ExposureDelay,
    ExposureProgram,
    GpsInfo,
    GpsTagRecording,
    Iso,
    IsoAutoHighLimit,
    WhiteBalance,
    Filter,
    Preset,
    MaxRecordableTime,
    FileFormat,
    CaptureInterval,
    CaptureNumber,
    CompositeShootingTime,
    CompositeShootingOutputInterval,
    TimeShift,
    BurstMode,
    BurstOption,
    AutoBracket,
    /// Read only. Maximum number of shots of continuous shooting.
    ContinuousNumber,
}

impl OptionName {
    /// Key of the option in a `camera.setOptions` request.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::CaptureMode => "captureMode",
            Self::ShootingMethod => "_shootingMethod",
            Self::Function => "_function",
            Self::Aperture => "aperture",
            Self::ColorTemperature => "_colorTemperature",
            Self::ExposureCompensation => "exposureCompensation",
            Self::ExposureDelay => "exposureDelay",
            Self::ExposureProgram => "exposureProgram",
            Self::GpsInfo => "gpsInfo",
            Self::GpsTagRecording => "_gpsTagRecording",
            Self::Iso => "iso",
            Self::IsoAutoHighLimit => "isoAutoHighLimit",
            Self::WhiteBalance => "whiteBalance",
            Self::Filter => "_filter",
            Self::Preset => "_preset",
            Self::MaxRecordableTime => "_maxRecordableTime",
            Self::FileFormat => "fileFormat",
            Self::CaptureInterval => "captureInterval",
            Self::CaptureNumber => "captureNumber",
            Self::CompositeShootingTime => "_compositeShootingTime",
            Self::CompositeShootingOutputInterval => "_compositeShootingOutputInterval",
            Self::TimeShift => "_timeShift",
            Self::BurstMode => "_burstMode",
            Self::BurstOption => "_burstOption",
            Self::AutoBracket => "_autoBracket",
            Self::ContinuousNumber => "_continuousNumber",
        }
    }
}

/// A typed capture option value.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOption {
    CaptureMode(CaptureMode),
    ShootingMethod(ShootingMethod),
    Function(ShootingFunction),
    Aperture(Aperture),
    /// Kelvin, 2500 to 10000 in 100-Kelvin units.
    ColorTemperature(u32),
    ExposureCompensation(ExposureCompensation),
    ExposureDelay(ExposureDelay),
    ExposureProgram(ExposureProgram),
    GpsInfo(GpsInfo),
    GpsTagRecording(bool),
    Iso(Iso),
    IsoAutoHighLimit(Iso),
    WhiteBalance(WhiteBalance),
    Filter(Filter),
    Preset(Preset),
    /// Seconds
    MaxRecordableTime(u32),
    FileFormat(FileFormat),
    /// Seconds
    CaptureInterval(u32),
    /// 0 means limitless.
    CaptureNumber(u32),
    /// Seconds
    CompositeShootingTime(u32),
    /// Seconds
    CompositeShootingOutputInterval(u32),
    TimeShift(TimeShiftSetting),
    BurstMode(bool),
    BurstOption(BurstOption),
    AutoBracket(Vec<BracketSetting>),
}

impl CaptureOption {
    pub fn name(&self) -> OptionName {
        match self {
            Self::CaptureMode(_) => OptionName::CaptureMode,
            Self::ShootingMethod(_) => OptionName::ShootingMethod,
            Self::Function(_) => OptionName::Function,
            Self::Aperture(_) => OptionName::Aperture,
            Self::ColorTemperature(_) => OptionName::ColorTemperature,
            Self::ExposureCompensation(_) => OptionName::ExposureCompensation,
            Self::ExposureDelay(_) => OptionName::ExposureDelay,
            Self::ExposureProgram(_) => OptionName::ExposureProgram,
            Self::GpsInfo(_) => OptionName::GpsInfo,
            Self::GpsTagRecording(_) => OptionName::GpsTagRecording,
            Self::Iso(_) => OptionName::Iso,
            Self::IsoAutoHighLimit(_) => OptionName::IsoAutoHighLimit,
            Self::WhiteBalance(_) => OptionName::WhiteBalance,
            Self::Filter(_) => OptionName::Filter,
            Self::Preset(_) => OptionName::Preset,
            Self::MaxRecordableTime(_) => OptionName::MaxRecordableTime,
            Self::FileFormat(_) => OptionName::FileFormat,
            Self::CaptureInterval(_) => OptionName::CaptureInterval,
            Self::CaptureNumber(_) => OptionName::CaptureNumber,
            Self::CompositeShootingTime(_) => OptionName::CompositeShootingTime,
            Self::CompositeShootingOutputInterval(_) => {
                OptionName::CompositeShootingOutputInterval
            }
            Self::TimeShift(_) => OptionName::TimeShift,
            Self::BurstMode(_) => OptionName::BurstMode,
            Self::BurstOption(_) => OptionName::BurstOption,
            Self::AutoBracket(_) => OptionName::AutoBracket,
        }
    }

    /// Value of the option in a `camera.setOptions` request.
    pub fn to_json(&self) -> Value {
        let on_off = |on: bool| if on { "on" } else { "off" };

        match self {
            Self::CaptureMode(mode) => mode.wire_name().into(),
            Self::ShootingMethod(method) => method.wire_name().into(),
            Self::Function(function) => function.wire_name().into(),
            Self::Aperture(aperture) => aperture.value().into(),
            Self::ColorTemperature(kelvin) => (*kelvin).into(),
            Self::ExposureCompensation(ev) => ev.value().into(),
            Self::ExposureDelay(delay) => (*delay as u8).into(),
            Self::ExposureProgram(program) => (*program as u8).into(),
            Self::GpsInfo(info) => info.to_json(),
            Self::GpsTagRecording(on) => on_off(*on).into(),
            Self::Iso(iso) | Self::IsoAutoHighLimit(iso) => (*iso as u16).into(),
            Self::WhiteBalance(wb) => wb.wire_name().into(),
            Self::Filter(filter) => filter.wire_name().into(),
            Self::Preset(preset) => preset.wire_name().into(),
            Self::MaxRecordableTime(secs)
            | Self::CaptureInterval(secs)
            | Self::CaptureNumber(secs)
            | Self::CompositeShootingTime(secs)
            | Self::CompositeShootingOutputInterval(secs) => (*secs).into(),
            Self::FileFormat(format) => format.to_json(),
            Self::TimeShift(setting) => setting.to_json(),
            Self::BurstMode(on) => (if *on { "ON" } else { "OFF" }).into(),
            Self::BurstOption(option) => option.to_json(),
            Self::AutoBracket(settings) => {
                let parameters: Vec<Value> = settings.iter().map(BracketSetting::to_json).collect();
                json!({
                    "_bracketNumber": settings.len(),
                    "_bracketParameters": parameters,
                })
            }
        }
    }
}

/// Set of capture options, keyed by [`OptionName`].
///
/// The set performs no legality checks: whether an option is accepted by the
/// connected camera model is only known once the camera applies it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    options: BTreeMap<OptionName, CaptureOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, replacing a previous value of the same name.
    pub fn set(&mut self, option: CaptureOption) -> &mut Self {
        self.options.insert(option.name(), option);
        self
    }

    pub fn with(mut self, option: CaptureOption) -> Self {
        self.set(option);
        self
    }

    pub fn get(&self, name: OptionName) -> Option<&CaptureOption> {
        self.options.get(&name)
    }

    pub fn remove(&mut self, name: OptionName) -> Option<CaptureOption> {
        self.options.remove(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaptureOption> {
        self.options.values()
    }

    /// Builds the `options` object of a `camera.setOptions` request.
    pub fn to_json(&self) -> Map<String, Value> {
        self.options
            .iter()
            .map(|(name, option)| (name.wire_name().to_owned(), option.to_json()))
            .collect()
    }

    /// Updates the time-shift setting in place, starting from an empty one if none is set yet.
    pub(crate) fn update_time_shift(&mut self, update: impl FnOnce(&mut TimeShiftSetting)) {
        let mut setting = self.time_shift().unwrap_or_default();
        update(&mut setting);
        self.set(CaptureOption::TimeShift(setting));
    }
}

impl FromIterator<CaptureOption> for OptionSet {
    fn from_iter<I: IntoIterator<Item = CaptureOption>>(iter: I) -> Self {
        let mut set = Self::new();
        for option in iter {
            set.set(option);
        }
        set
    }
}

macro_rules! option_getters {
    ($($(#[$doc:meta])* $fn_name:ident => $variant:ident: $ty:ty;)*) => {
        impl OptionSet {
            $(
                $(#[$doc])*
                pub fn $fn_name(&self) -> Option<$ty> {
                    match self.get(OptionName::$variant) {
                        Some(CaptureOption::$variant(value)) => Some(value.clone()),
                        _ => None,
                    }
                }
            )*
        }
    };
}

option_getters! {
    aperture => Aperture: Aperture;
    /// Color temperature (Kelvin)
    color_temperature => ColorTemperature: u32;
    exposure_compensation => ExposureCompensation: ExposureCompensation;
    /// Operating time of the self-timer
    exposure_delay => ExposureDelay: ExposureDelay;
    exposure_program => ExposureProgram: ExposureProgram;
    gps_info => GpsInfo: GpsInfo;
    gps_tag_recording => GpsTagRecording: bool;
    iso => Iso: Iso;
    iso_auto_high_limit => IsoAutoHighLimit: Iso;
    white_balance => WhiteBalance: WhiteBalance;
    filter => Filter: Filter;
    preset => Preset: Preset;
    /// Maximum recordable time (sec.)
    max_recordable_time => MaxRecordableTime: u32;
    file_format => FileFormat: FileFormat;
    /// Shooting interval (sec.) for interval shooting
    capture_interval => CaptureInterval: u32;
    capture_number => CaptureNumber: u32;
    composite_shooting_time => CompositeShootingTime: u32;
    composite_shooting_output_interval => CompositeShootingOutputInterval: u32;
    time_shift => TimeShift: TimeShiftSetting;
    burst_mode => BurstMode: bool;
    burst_option => BurstOption: BurstOption;
    auto_bracket => AutoBracket: Vec<BracketSetting>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_value_replaces_earlier_one() {
        let mut set = OptionSet::new();
        set.set(CaptureOption::Iso(Iso::Iso100))
            .set(CaptureOption::Iso(Iso::Iso800));

        assert_eq!(set.len(), 1);
        assert_eq!(set.iso(), Some(Iso::Iso800));
    }

    #[test]
    fn serializes_wire_names_and_values() {
        let set: OptionSet = [
            CaptureOption::CaptureMode(CaptureMode::Image),
            CaptureOption::ExposureProgram(ExposureProgram::ShutterPriority),
            CaptureOption::WhiteBalance(WhiteBalance::CloudyDaylight),
            CaptureOption::GpsTagRecording(true),
            CaptureOption::BurstMode(false),
        ]
        .into_iter()
        .collect();

        let json = set.to_json();

        assert_eq!(json["captureMode"], "image");
        assert_eq!(json["exposureProgram"], 4);
        assert_eq!(json["whiteBalance"], "cloudy-daylight");
        assert_eq!(json["_gpsTagRecording"], "on");
        assert_eq!(json["_burstMode"], "OFF");
    }

    #[test]
    fn time_shift_fields_merge() {
        let mut set = OptionSet::new();
        set.update_time_shift(|ts| ts.first_shooting = Some(FirstShooting::Rear));
        set.update_time_shift(|ts| ts.second_interval = Some(TimeShiftInterval::Interval5));

        let json = set.to_json();
        assert_eq!(
            json["_timeShift"],
            json!({ "firstShooting": "rear", "secondInterval": 5 })
        );
    }

    #[test]
    fn gps_date_is_formatted_with_offset() {
        let date_time_zone = chrono::DateTime::parse_from_rfc3339("2014-05-18T01:04:29+08:00")
            .expect("valid date");
        let info = GpsInfo {
            latitude: 35.6,
            longitude: 139.7,
            altitude: 10.0,
            date_time_zone,
        };

        assert_eq!(info.to_json()["_dateTimeZone"], "2014:05:18 01:04:29+08:00");
        assert_eq!(GpsInfo::disabled().to_json(), json!({ "lat": 65535.0, "lng": 65535.0 }));
    }

    #[test]
    fn bracket_defaults_depend_on_model() {
        let legacy = BracketSetting::default().for_model(CameraModel::ThetaSc2);
        assert_eq!(legacy.color_temperature, Some(5000));
        assert_eq!(legacy.iso, Some(Iso::Iso400));
        assert_eq!(legacy.white_balance, None);

        let x = BracketSetting {
            color_temperature: Some(6500),
            exposure_compensation: Some(ExposureCompensation::Pos1_0),
            exposure_program: Some(ExposureProgram::NormalProgram),
            ..Default::default()
        }
        .for_model(CameraModel::ThetaX);
        assert_eq!(x.exposure_program, Some(ExposureProgram::Manual));
        assert_eq!(x.exposure_compensation, None);
        assert_eq!(x.white_balance, Some(WhiteBalance::ColorTemperature));
    }

    #[test]
    fn continuous_number_from_device_value() {
        assert_eq!(ContinuousNumber::from_value(Some(&json!(0))), ContinuousNumber::Off);
        assert_eq!(ContinuousNumber::from_value(Some(&json!(20))), ContinuousNumber::Max(20));
        assert_eq!(ContinuousNumber::from_value(Some(&json!(21))), ContinuousNumber::Unsupported);
        assert_eq!(ContinuousNumber::from_value(None), ContinuousNumber::Unsupported);
    }

    #[test]
    fn int_coded_values_round_trip_from_device_numbers() {
        assert_eq!(ExposureDelay::try_from(5u8).ok(), Some(ExposureDelay::Delay5));
        assert!(Iso::try_from(123u16).is_err());
        assert_eq!(u16::from(Iso::Iso3200), 3200);
    }
}
