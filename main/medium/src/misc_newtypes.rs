//! This module defines various newtypes in order to achieve more type safety.
use crate::TryFromGreaterError;
use derive_more::*;
use std::convert::TryFrom;

/// This represents a volume measured in REAPER's native volume unit.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
pub struct ReaperVolumeValue(pub(crate) f64);

impl ReaperVolumeValue {
    /// The minimum possible value (0.0).
    ///
    /// There's no maximum value because REAPER allows to exceed the soft maximum of 12 dB!
    pub const MIN: ReaperVolumeValue = ReaperVolumeValue(0.0);

    /// The "unaltered" volume (1.0 = 0.0 dB).
    pub const ZERO_DB: ReaperVolumeValue = ReaperVolumeValue(1.0);

    /// The "soft maximum" volume (3.981071705535 = 12.0 dB).
    pub const TWELVE_DB: ReaperVolumeValue = ReaperVolumeValue(3.981_071_705_535);

    fn is_valid(value: f64) -> bool {
        ReaperVolumeValue::MIN.get() <= value || value.is_nan()
    }

    /// Creates a REAPER volume value.
    ///
    /// # Panics
    ///
    /// This function panics if the given value is not within the range supported by REAPER
    /// `(0.0..)`.
    pub fn new(value: f64) -> ReaperVolumeValue {
        assert!(
            Self::is_valid(value),
            "{} is not a valid ReaperVolumeValue",
            value
        );
        ReaperVolumeValue(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ReaperVolumeValue {
    type Error = TryFromGreaterError<f64>;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !Self::is_valid(value) {
            return Err(TryFromGreaterError::new("value must be positive", value));
        }
        Ok(ReaperVolumeValue(value))
    }
}

/// This represents a pan measured in REAPER's native pan unit.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
#[repr(transparent)]
pub struct ReaperPanValue(pub(crate) f64);

impl ReaperPanValue {
    /// The "extreme" left value (-1.0).
    pub const LEFT: ReaperPanValue = ReaperPanValue(-1.0);

    /// The center value (0.0).
    pub const CENTER: ReaperPanValue = ReaperPanValue(0.0);

    /// The "extreme" right value (1.0).
    pub const RIGHT: ReaperPanValue = ReaperPanValue(1.0);

    fn is_valid(value: f64) -> bool {
        ReaperPanValue::LEFT.get() <= value && value <= ReaperPanValue::RIGHT.get()
    }

    /// Creates a pan value.
    ///
    /// # Panics
    ///
    /// This function panics if the given value is not within the range supported by REAPER
    /// `(-1.0..=1.0)`.
    pub fn new(value: f64) -> ReaperPanValue {
        assert!(Self::is_valid(value), "{} is not a valid ReaperPanValue", value);
        ReaperPanValue(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ReaperPanValue {
    type Error = TryFromGreaterError<f64>;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !Self::is_valid(value) {
            return Err(TryFromGreaterError::new(
                "value must be between -1.0 and 1.0",
                value,
            ));
        }
        Ok(ReaperPanValue(value))
    }
}

/// This represents a parameter value in the REAPER-normalized range.
///
/// Usually between 0.0 and 1.0 but some plug-ins report values outside, so no checks here.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
pub struct ReaperNormalizedFxParamValue(pub(crate) f64);

impl ReaperNormalizedFxParamValue {
    /// Creates a REAPER-normalized FX parameter value.
    pub fn new(value: f64) -> ReaperNormalizedFxParamValue {
        ReaperNormalizedFxParamValue(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

/// This represents a tempo measured in beats per minute.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
pub struct Bpm(pub(crate) f64);

impl Bpm {
    /// The minimum possible value (1.0 bpm).
    pub const MIN: Bpm = Bpm(1.0);

    /// The maximum possible value (960.0 bpm).
    pub const MAX: Bpm = Bpm(960.0);

    fn is_valid(value: f64) -> bool {
        Bpm::MIN.get() <= value && value <= Bpm::MAX.get()
    }

    /// Creates a BPM value.
    ///
    /// # Panics
    ///
    /// This function panics if the given value is not within the BPM range supported by REAPER
    /// `(1.0..=960.0)`.
    pub fn new(value: f64) -> Bpm {
        assert!(Self::is_valid(value), "{} is not a valid Bpm value", value);
        Bpm(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Bpm {
    type Error = TryFromGreaterError<f64>;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !Self::is_valid(value) {
            return Err(TryFromGreaterError::new(
                "value must be between 1.0 and 960.0",
                value,
            ));
        }
        Ok(Bpm(value))
    }
}

/// This represents a play rate measured as factor of the normal playback speed.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
pub struct PlaybackSpeedFactor(pub(crate) f64);

impl PlaybackSpeedFactor {
    /// The minimum possible value (a quarter of the normal playback speed).
    pub const MIN: PlaybackSpeedFactor = PlaybackSpeedFactor(0.25);

    /// The normal playback speed.
    pub const NORMAL: PlaybackSpeedFactor = PlaybackSpeedFactor(1.00);

    /// The maximum possible value (four times the normal playback speed).
    pub const MAX: PlaybackSpeedFactor = PlaybackSpeedFactor(4.0);

    fn is_valid(value: f64) -> bool {
        PlaybackSpeedFactor::MIN.get() <= value && value <= PlaybackSpeedFactor::MAX.get()
    }

    /// Creates a playback speed factor.
    ///
    /// # Panics
    ///
    /// This function panics if the given value is not within the playback speed range supported by
    /// REAPER `(0.25..=4.00)`.
    pub fn new(value: f64) -> PlaybackSpeedFactor {
        assert!(
            Self::is_valid(value),
            "{} is not a valid PlaybackSpeedFactor",
            value
        );
        PlaybackSpeedFactor(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for PlaybackSpeedFactor {
    type Error = TryFromGreaterError<f64>;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !Self::is_valid(value) {
            return Err(TryFromGreaterError::new(
                "value must be between 0.25 and 4.00",
                value,
            ));
        }
        Ok(PlaybackSpeedFactor(value))
    }
}

/// This represents a frequency measured in hertz (how often something happens per second).
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
pub struct Hz(pub(crate) f64);

impl Hz {
    fn is_valid(value: f64) -> bool {
        0.0 < value
    }

    /// Creates a hertz value.
    ///
    /// # Panics
    ///
    /// This function panics if the given value zero or negative.
    pub fn new(value: f64) -> Hz {
        assert!(Self::is_valid(value), "{} is not a valid Hz value", value);
        Hz(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Hz {
    type Error = TryFromGreaterError<f64>;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !Self::is_valid(value) {
            return Err(TryFromGreaterError::new("Hz value must be positive", value));
        }
        Ok(Hz(value))
    }
}

/// This represents a duration expressed as positive amount of seconds.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
pub struct DurationInSeconds(pub(crate) f64);

impl DurationInSeconds {
    /// The minimum duration (zero, empty).
    pub const ZERO: DurationInSeconds = DurationInSeconds(0.0);

    fn is_valid(value: f64) -> bool {
        value >= 0.0 && !value.is_infinite() && !value.is_nan()
    }

    /// Creates a value.
    ///
    /// # Panics
    ///
    /// This function panics if the given value is negative or a special number.
    pub fn new(value: f64) -> DurationInSeconds {
        assert!(
            Self::is_valid(value),
            "{} is not a valid DurationInSeconds value",
            value
        );
        DurationInSeconds(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for DurationInSeconds {
    type Error = TryFromGreaterError<f64>;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !Self::is_valid(value) {
            return Err(TryFromGreaterError::new(
                "DurationInSeconds value must be positive",
                value,
            ));
        }
        Ok(DurationInSeconds(value))
    }
}

/// This represents a duration expressed as positive amount of beats.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
pub struct DurationInBeats(pub(crate) f64);

impl DurationInBeats {
    fn is_valid(value: f64) -> bool {
        value >= 0.0 && !value.is_infinite() && !value.is_nan()
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for DurationInBeats {
    type Error = TryFromGreaterError<f64>;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !Self::is_valid(value) {
            return Err(TryFromGreaterError::new(
                "DurationInBeats value must be positive",
                value,
            ));
        }
        Ok(DurationInBeats(value))
    }
}

/// This represents a position expressed as an amount of frames within the current audio block.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display)]
pub struct MidiFrameOffset(pub(crate) u32);

impl MidiFrameOffset {
    /// The first frame of the block.
    pub const MIN: MidiFrameOffset = MidiFrameOffset(0);

    /// Creates the MIDI frame offset.
    pub const fn new(value: u32) -> MidiFrameOffset {
        MidiFrameOffset(value)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn to_raw(self) -> i32 {
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }
}

/// A simple wrapper around a value which is not supposed to be inspected by consumers.
///
/// It's mainly used inside `Unknown` variants in order to enable forward compatibility without
/// information loss.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Hidden<T>(pub(crate) T);

impl<T: Copy> Hidden<T> {
    /// Returns the wrapped value.
    pub fn get(&self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_check_ranges() {
        assert_eq!(ReaperPanValue::try_from(0.5), Ok(ReaperPanValue(0.5)));
        assert!(ReaperPanValue::try_from(1.5).is_err());
        assert!(ReaperVolumeValue::try_from(-0.1).is_err());
        assert!(ReaperVolumeValue::try_from(f64::NAN).is_ok());
        assert!(Bpm::try_from(0.5).is_err());
        assert!(PlaybackSpeedFactor::try_from(2.0).is_ok());
        assert!(DurationInSeconds::try_from(-1.0).is_err());
        assert!(Hz::try_from(0.0).is_err());
    }

    #[test]
    #[should_panic]
    fn new_panics_on_invalid_value() {
        Bpm::new(1000.0);
    }
}
