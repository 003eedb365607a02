use crate::{Hidden, TryFromRawError};
use std::convert::TryInto;

/// Describes the current location of a track FX (assuming the track is already known).
///
/// This is not a stable identifier because track FX locations can change!
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TrackFxLocation {
    /// FX index in the normal FX chain.
    NormalFxChain(u32),
    /// FX index in the input FX chain.
    ///
    /// On the master track (if applicable) this represents an index in the monitoring FX chain.
    InputFxChain(u32),
}

impl TrackFxLocation {
    /// Converts an integer as returned by the low-level API to a track FX location.
    pub fn try_from_raw(v: i32) -> Result<TrackFxLocation, TryFromRawError<i32>> {
        use TrackFxLocation::*;
        let v: u32 = v
            .try_into()
            .map_err(|_| TryFromRawError::new("FX index shouldn't be negative", v))?;
        let result = if v >= 0x0100_0000 {
            InputFxChain(v - 0x0100_0000)
        } else {
            NormalFxChain(v)
        };
        Ok(result)
    }

    /// Converts this value to an integer as expected by the low-level API.
    pub fn to_raw(self) -> i32 {
        use TrackFxLocation::*;
        let positive = match self {
            InputFxChain(idx) => 0x0100_0000 + idx,
            NormalFxChain(idx) => idx,
        };
        positive as i32
    }
}

/// Type of an FX chain.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TrackFxChainType {
    /// FX chain of a track.
    NormalFxChain,
    /// Input FX chain of a track.
    InputFxChain,
}

/// Describes whether and how the recording input is monitored.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InputMonitoringMode {
    /// No input monitoring.
    Off,
    /// Monitoring happens always.
    Normal,
    /// Monitoring only happens when playing (tape style).
    NotWhenPlaying,
}

impl InputMonitoringMode {
    /// Converts an integer as returned by the low-level API to an input monitoring mode.
    pub fn try_from_raw(v: i32) -> Result<InputMonitoringMode, TryFromRawError<i32>> {
        use InputMonitoringMode::*;
        match v {
            0 => Ok(Off),
            1 => Ok(Normal),
            2 => Ok(NotWhenPlaying),
            _ => Err(TryFromRawError::new(
                "couldn't convert to input monitoring mode",
                v,
            )),
        }
    }

    /// Converts this value to an integer as expected by the low-level API.
    pub fn to_raw(self) -> i32 {
        use InputMonitoringMode::*;
        match self {
            Off => 0,
            Normal => 1,
            NotWhenPlaying => 2,
        }
    }
}

/// Possible track automation modes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AutomationMode {
    TrimRead,
    Read,
    Touch,
    Write,
    Latch,
    LatchPreview,
    /// Represents a variant unknown to *reaper-rs*. Please contribute if you encounter a variant
    /// that is supported by REAPER but not yet by *reaper-rs*. Thanks!
    Unknown(Hidden<i32>),
}

impl AutomationMode {
    /// Converts an integer as returned by the low-level API to an automation mode.
    pub fn from_raw(v: i32) -> AutomationMode {
        use AutomationMode::*;
        match v {
            0 => TrimRead,
            1 => Read,
            2 => Touch,
            3 => Write,
            4 => Latch,
            5 => LatchPreview,
            x => Unknown(Hidden(x)),
        }
    }

    /// Converts this value to an integer as expected by the low-level API.
    pub fn to_raw(self) -> i32 {
        use AutomationMode::*;
        match self {
            TrimRead => 0,
            Read => 1,
            Touch => 2,
            Write => 3,
            Latch => 4,
            LatchPreview => 5,
            Unknown(Hidden(x)) => x,
        }
    }
}
