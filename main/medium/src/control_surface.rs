#![allow(non_snake_case)]
use crate::util::create_passing_c_str;
use crate::{
    AutomationMode, Bpm, Hidden, InputMonitoringMode, InstallError, MediaTrack,
    PlaybackSpeedFactor, ReaperNormalizedFxParamValue, ReaperPanValue, ReaperStr,
    ReaperVolumeValue, TrackFxChainType, TrackFxLocation,
};
use downcast_rs::{impl_downcast, Downcast};
use reaper_abi_low::{
    create_cpp_to_rust_control_surface, create_rust_control_surface_registry,
    delete_cpp_control_surface, raw, ControlSurfaceInterface, IReaperControlSurface,
    LifecycleRegistry, RegistryMode,
};
use std::convert::TryFrom;
use std::fmt;
use std::fmt::Debug;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{null, NonNull};

/// Consumers need to implement this trait in order to get notified about various REAPER events.
///
/// All callbacks are invoked in the main thread.
///
/// See [`ControlSurfaceSlot::install()`].
pub trait ControlSurface: Debug + Downcast {
    /// Should return the control surface type.
    ///
    /// Must be a simple unique string with only A-Z, 0-9, no spaces or other characters.
    ///
    /// Return `None` if this is a control surface behind the scenes.
    //
    // We can't let this return something owned because it would be gone as soon as the adapter
    // turns this into a pointer and returns.
    fn get_type_string(&self) -> Option<&ReaperStr> {
        None
    }

    /// Should return the control surface description.
    ///
    /// Should be a human readable description, can include instance-specific information.
    fn get_desc_string(&self) -> Option<&ReaperStr> {
        None
    }

    /// Should return a configuration string which REAPER writes to `reaper.ini`.
    fn get_config_string(&self) -> Option<&ReaperStr> {
        None
    }

    /// Should close the control surface without sending *reset* messages.
    fn close_no_reset(&self) {}

    /// Called on each main loop cycle, typically about 30 times per second.
    ///
    /// Good place to process things which have been queued for the main thread.
    fn run(&mut self) {}

    /// Called when the track list has changed.
    fn set_track_list_change(&self) {}

    /// Called when the volume of a track has changed.
    fn set_surface_volume(&self, args: SetSurfaceVolumeArgs) {
        let _ = args;
    }

    /// Called when the pan of a track has changed.
    fn set_surface_pan(&self, args: SetSurfacePanArgs) {
        let _ = args;
    }

    /// Called when a track has been muted or unmuted.
    fn set_surface_mute(&self, args: SetSurfaceMuteArgs) {
        let _ = args;
    }

    /// Called when a track has been selected or unselected.
    fn set_surface_selected(&self, args: SetSurfaceSelectedArgs) {
        let _ = args;
    }

    /// Called when a track has been soloed or unsoloed.
    ///
    /// If it's the master track, it means "any solo".
    fn set_surface_solo(&self, args: SetSurfaceSoloArgs) {
        let _ = args;
    }

    /// Called when a track has been armed or unarmed for recording.
    fn set_surface_rec_arm(&self, args: SetSurfaceRecArmArgs) {
        let _ = args;
    }

    /// Called when the transport state has changed.
    fn set_play_state(&self, args: SetPlayStateArgs) {
        let _ = args;
    }

    /// Called when repeat has been enabled or disabled.
    fn set_repeat_state(&self, args: SetRepeatStateArgs) {
        let _ = args;
    }

    /// Called when a track name has changed.
    fn set_track_title(&self, args: SetTrackTitleArgs) {
        let _ = args;
    }

    /// Should return whether the given track parameter is currently touched on the surface.
    fn get_touch_state(&self, args: GetTouchStateArgs) -> bool {
        let _ = args;
        false
    }

    /// Called when the automation mode of the current track has changed.
    fn set_auto_mode(&self, args: SetAutoModeArgs) {
        let _ = args;
    }

    /// Should flush the control states.
    fn reset_cached_vol_pan_states(&self) {}

    /// Called when a track has been selected.
    fn on_track_selection(&self, args: OnTrackSelectionArgs) {
        let _ = args;
    }

    /// Should return whether the given modifier key is currently pressed on the surface.
    fn is_key_down(&self, args: IsKeyDownArgs) -> bool {
        let _ = args;
        false
    }

    /// Generic method which is called for many kinds of events. Prefer implementing the type-safe
    /// `ext_` methods instead!
    ///
    /// Called only if the event has not been processed already in one of the `ext_` methods. The
    /// meaning of the return value depends on the particular event type ([`ExtendedArgs::call`]).
    /// In any case, returning 0 means that the event has not been handled.
    ///
    /// # Safety
    ///
    /// Implementing this is unsafe because you need to deal with raw pointers.
    unsafe fn extended(&self, args: ExtendedArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when the input monitoring mode of a track has has changed.
    fn ext_set_input_monitor(&self, args: ExtSetInputMonitorArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when a parameter of an FX in the normal FX chain has changed its value.
    fn ext_set_fx_param(&self, args: ExtSetFxParamArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when a parameter of an FX in the input FX chain has changed its value.
    fn ext_set_fx_param_rec_fx(&self, args: ExtSetFxParamArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when a an FX has been enabled or disabled.
    fn ext_set_fx_enabled(&self, args: ExtSetFxEnabledArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when the volume of a track send has changed.
    fn ext_set_send_volume(&self, args: ExtSetSendVolumeArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when the pan of a track send has changed.
    fn ext_set_send_pan(&self, args: ExtSetSendPanArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when a certain FX has gained focus.
    fn ext_set_focused_fx(&self, args: ExtSetFocusedFxArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when a certain FX has been touched.
    fn ext_set_last_touched_fx(&self, args: ExtSetLastTouchedFxArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when the user interface of a certain FX has been opened or closed.
    fn ext_set_fx_open(&self, args: ExtSetFxOpenArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when an FX has been added, removed or when it changed its position in the chain.
    fn ext_set_fx_change(&self, args: ExtSetFxChangeArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when the master tempo or play rate has changed.
    fn ext_set_bpm_and_play_rate(&self, args: ExtSetBpmAndPlayRateArgs) -> i32 {
        let _ = args;
        0
    }

    /// Called when the metronome has been enabled or disabled.
    fn ext_set_metronome(&self, args: ExtSetMetronomeArgs) -> i32 {
        let _ = args;
        0
    }

    /// Clear all surface state and reset (harder reset than [`set_track_list_change`]).
    ///
    /// [`set_track_list_change`]: #method.set_track_list_change
    fn ext_reset(&self, _: ExtResetArgs) -> i32 {
        0
    }
}

impl_downcast!(ControlSurface);

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SetSurfaceVolumeArgs {
    pub track: MediaTrack,
    pub volume: ReaperVolumeValue,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SetSurfacePanArgs {
    pub track: MediaTrack,
    pub pan: ReaperPanValue,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetSurfaceMuteArgs {
    pub track: MediaTrack,
    pub is_mute: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetSurfaceSelectedArgs {
    pub track: MediaTrack,
    pub is_selected: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetSurfaceSoloArgs {
    pub track: MediaTrack,
    pub is_solo: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetSurfaceRecArmArgs {
    pub track: MediaTrack,
    pub is_armed: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetPlayStateArgs {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_recording: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetRepeatStateArgs {
    pub is_enabled: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetTrackTitleArgs<'a> {
    pub track: MediaTrack,
    pub name: &'a ReaperStr,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GetTouchStateArgs {
    pub track: MediaTrack,
    pub parameter_type: TouchedParameterType,
}

/// Type of a touched parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TouchedParameterType {
    Volume,
    Pan,
    Width,
    /// Represents a variant unknown to *reaper-rs*. Please contribute if you encounter a variant
    /// that is supported by REAPER but not yet by *reaper-rs*. Thanks!
    Unknown(Hidden<i32>),
}

impl TouchedParameterType {
    /// Converts an integer as returned by the low-level API to a type.
    fn from_raw(value: i32) -> TouchedParameterType {
        use TouchedParameterType::*;
        match value {
            0 => Volume,
            1 => Pan,
            2 => Width,
            x => Unknown(Hidden(x)),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetAutoModeArgs {
    pub mode: AutomationMode,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct OnTrackSelectionArgs {
    pub track: MediaTrack,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct IsKeyDownArgs {
    pub key: ModKey,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtendedArgs {
    /// Represents the type of event.
    pub call: i32,
    pub parm_1: *mut c_void,
    pub parm_2: *mut c_void,
    pub parm_3: *mut c_void,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtSetInputMonitorArgs {
    pub track: MediaTrack,
    pub mode: InputMonitoringMode,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExtSetFxParamArgs {
    pub track: MediaTrack,
    pub fx_index: u32,
    pub param_index: u32,
    pub param_value: ReaperNormalizedFxParamValue,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtSetFxEnabledArgs {
    pub track: MediaTrack,
    pub fx_location: TrackFxLocation,
    pub is_enabled: bool,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExtSetSendVolumeArgs {
    pub track: MediaTrack,
    /// This starts with the hardware output sends and continues with the track sends.
    pub send_index: u32,
    pub volume: ReaperVolumeValue,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExtSetSendPanArgs {
    pub track: MediaTrack,
    /// This starts with the hardware output sends and continues with the track sends.
    pub send_index: u32,
    pub pan: ReaperPanValue,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtSetFocusedFxArgs {
    pub fx_location: Option<QualifiedFxLocation>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtSetLastTouchedFxArgs {
    pub fx_location: Option<QualifiedFxLocation>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtSetFxOpenArgs {
    pub track: MediaTrack,
    pub fx_location: TrackFxLocation,
    pub is_open: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtSetFxChangeArgs {
    pub track: MediaTrack,
    pub fx_chain_type: TrackFxChainType,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExtSetBpmAndPlayRateArgs {
    pub tempo: Option<Bpm>,
    pub play_rate: Option<PlaybackSpeedFactor>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtSetMetronomeArgs {
    pub is_enabled: bool,
}

/// Just a placeholder for upward compatibility reasons.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtResetArgs;

/// Modifier key according to
/// [this list](https://docs.microsoft.com/en-us/windows/win32/inputdev/virtual-key-codes).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ModKey(pub(crate) i32);

impl ModKey {
    /// Creates a modifier key.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Contains predefined modifier keys.
pub mod mod_keys {
    use super::ModKey;

    pub const SHIFT: ModKey = ModKey(0x10);
    pub const CONTROL: ModKey = ModKey(0x11);
    pub const MENU: ModKey = ModKey(0x12);
}

/// Location of a track or take FX including the parent track.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualifiedFxLocation {
    /// Parent track.
    pub track: MediaTrack,
    /// Location of FX on the parent track.
    pub fx_location: FxLocation,
}

/// Location of a track or take FX.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FxLocation {
    /// It's a take FX.
    ///
    /// The take index is currently not exposed by REAPER.
    TakeFx {
        /// Index of the item on that track.
        item_index: u32,
        /// Index of the FX within the take FX chain.
        fx_index: u32,
    },
    /// It's a track FX.
    TrackFx(TrackFxLocation),
}

#[derive(Debug)]
pub(crate) struct ControlSurfaceAdapter {
    // Because control surface calls happen in the main thread, the dynamic dispatch is absolutely
    // no issue.
    delegate: Box<dyn ControlSurface>,
}

impl ControlSurfaceAdapter {
    pub fn new(delegate: Box<dyn ControlSurface>) -> ControlSurfaceAdapter {
        ControlSurfaceAdapter { delegate }
    }

    pub fn into_delegate(self) -> Box<dyn ControlSurface> {
        self.delegate
    }

    unsafe fn process_extended(
        &self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> Option<i32> {
        let result = match call {
            raw::CSURF_EXT_SETINPUTMONITOR => {
                let recmon: i32 = deref_as(parm2)?;
                self.delegate.ext_set_input_monitor(ExtSetInputMonitorArgs {
                    track: track(parm1)?,
                    mode: InputMonitoringMode::try_from_raw(recmon).ok()?,
                })
            }
            raw::CSURF_EXT_SETFXPARAM | raw::CSURF_EXT_SETFXPARAM_RECFX => {
                let fxidx_and_paramidx: i32 = deref_as(parm2)?;
                let value: f64 = deref_as(parm3)?;
                let args = ExtSetFxParamArgs {
                    track: track(parm1)?,
                    fx_index: ((fxidx_and_paramidx >> 16) & 0xffff) as u32,
                    param_index: (fxidx_and_paramidx & 0xffff) as u32,
                    param_value: ReaperNormalizedFxParamValue::new(value),
                };
                if call == raw::CSURF_EXT_SETFXPARAM {
                    self.delegate.ext_set_fx_param(args)
                } else {
                    self.delegate.ext_set_fx_param_rec_fx(args)
                }
            }
            raw::CSURF_EXT_SETFOCUSEDFX => self.delegate.ext_set_focused_fx(ExtSetFocusedFxArgs {
                fx_location: qualified_fx_location(parm1, parm2, parm3),
            }),
            raw::CSURF_EXT_SETLASTTOUCHEDFX => {
                self.delegate
                    .ext_set_last_touched_fx(ExtSetLastTouchedFxArgs {
                        fx_location: qualified_fx_location(parm1, parm2, parm3),
                    })
            }
            raw::CSURF_EXT_SETFXOPEN => self.delegate.ext_set_fx_open(ExtSetFxOpenArgs {
                track: track(parm1)?,
                fx_location: track_fx_location(parm2)?,
                is_open: !parm3.is_null(),
            }),
            raw::CSURF_EXT_SETFXENABLED => self.delegate.ext_set_fx_enabled(ExtSetFxEnabledArgs {
                track: track(parm1)?,
                fx_location: track_fx_location(parm2)?,
                is_enabled: !parm3.is_null(),
            }),
            raw::CSURF_EXT_SETSENDVOLUME => {
                self.delegate.ext_set_send_volume(ExtSetSendVolumeArgs {
                    track: track(parm1)?,
                    send_index: deref_as::<i32>(parm2)? as u32,
                    volume: ReaperVolumeValue(deref_as(parm3)?),
                })
            }
            raw::CSURF_EXT_SETSENDPAN => self.delegate.ext_set_send_pan(ExtSetSendPanArgs {
                track: track(parm1)?,
                send_index: deref_as::<i32>(parm2)? as u32,
                pan: ReaperPanValue(deref_as(parm3)?),
            }),
            raw::CSURF_EXT_SETFXCHANGE => self.delegate.ext_set_fx_change(ExtSetFxChangeArgs {
                track: track(parm1)?,
                fx_chain_type: if (parm2 as usize & 1) == 1 {
                    TrackFxChainType::InputFxChain
                } else {
                    TrackFxChainType::NormalFxChain
                },
            }),
            raw::CSURF_EXT_SETBPMANDPLAYRATE => {
                self.delegate
                    .ext_set_bpm_and_play_rate(ExtSetBpmAndPlayRateArgs {
                        tempo: deref_as::<f64>(parm1).and_then(|v| Bpm::try_from(v).ok()),
                        play_rate: deref_as::<f64>(parm2)
                            .and_then(|v| PlaybackSpeedFactor::try_from(v).ok()),
                    })
            }
            raw::CSURF_EXT_SETMETRONOME => self.delegate.ext_set_metronome(ExtSetMetronomeArgs {
                is_enabled: !parm1.is_null(),
            }),
            raw::CSURF_EXT_RESET => self.delegate.ext_reset(ExtResetArgs),
            _ => 0,
        };
        Some(result)
    }
}

impl IReaperControlSurface for ControlSurfaceAdapter {
    fn GetTypeString(&self) -> *const c_char {
        self.delegate
            .get_type_string()
            .map(|s| s.as_ptr())
            .unwrap_or(null())
    }

    fn GetDescString(&self) -> *const c_char {
        self.delegate
            .get_desc_string()
            .map(|s| s.as_ptr())
            .unwrap_or(null())
    }

    fn GetConfigString(&self) -> *const c_char {
        self.delegate
            .get_config_string()
            .map(|s| s.as_ptr())
            .unwrap_or(null())
    }

    fn CloseNoReset(&self) {
        self.delegate.close_no_reset()
    }

    fn Run(&mut self) {
        self.delegate.run();
    }

    fn SetTrackListChange(&self) {
        self.delegate.set_track_list_change()
    }

    fn SetSurfaceVolume(&self, trackid: *mut raw::MediaTrack, volume: f64) {
        if let Some(track) = NonNull::new(trackid) {
            self.delegate.set_surface_volume(SetSurfaceVolumeArgs {
                track,
                volume: ReaperVolumeValue(volume),
            })
        }
    }

    fn SetSurfacePan(&self, trackid: *mut raw::MediaTrack, pan: f64) {
        if let Some(track) = NonNull::new(trackid) {
            self.delegate.set_surface_pan(SetSurfacePanArgs {
                track,
                pan: ReaperPanValue(pan),
            })
        }
    }

    fn SetSurfaceMute(&self, trackid: *mut raw::MediaTrack, mute: bool) {
        if let Some(track) = NonNull::new(trackid) {
            self.delegate.set_surface_mute(SetSurfaceMuteArgs {
                track,
                is_mute: mute,
            })
        }
    }

    fn SetSurfaceSelected(&self, trackid: *mut raw::MediaTrack, selected: bool) {
        if let Some(track) = NonNull::new(trackid) {
            self.delegate.set_surface_selected(SetSurfaceSelectedArgs {
                track,
                is_selected: selected,
            })
        }
    }

    fn SetSurfaceSolo(&self, trackid: *mut raw::MediaTrack, solo: bool) {
        if let Some(track) = NonNull::new(trackid) {
            self.delegate.set_surface_solo(SetSurfaceSoloArgs {
                track,
                is_solo: solo,
            })
        }
    }

    fn SetSurfaceRecArm(&self, trackid: *mut raw::MediaTrack, recarm: bool) {
        if let Some(track) = NonNull::new(trackid) {
            self.delegate.set_surface_rec_arm(SetSurfaceRecArmArgs {
                track,
                is_armed: recarm,
            })
        }
    }

    fn SetPlayState(&self, play: bool, pause: bool, rec: bool) {
        self.delegate.set_play_state(SetPlayStateArgs {
            is_playing: play,
            is_paused: pause,
            is_recording: rec,
        })
    }

    fn SetRepeatState(&self, rep: bool) {
        self.delegate
            .set_repeat_state(SetRepeatStateArgs { is_enabled: rep })
    }

    fn SetTrackTitle(&self, trackid: *mut raw::MediaTrack, title: *const c_char) {
        let (track, name) = match (NonNull::new(trackid), unsafe {
            create_passing_c_str(title)
        }) {
            (Some(t), Some(n)) => (t, n),
            _ => return,
        };
        self.delegate
            .set_track_title(SetTrackTitleArgs { track, name })
    }

    fn GetTouchState(&self, trackid: *mut raw::MediaTrack, isPan: c_int) -> bool {
        match NonNull::new(trackid) {
            None => false,
            Some(track) => self.delegate.get_touch_state(GetTouchStateArgs {
                track,
                parameter_type: TouchedParameterType::from_raw(isPan),
            }),
        }
    }

    fn SetAutoMode(&self, mode: c_int) {
        self.delegate.set_auto_mode(SetAutoModeArgs {
            mode: AutomationMode::from_raw(mode),
        })
    }

    fn ResetCachedVolPanStates(&self) {
        self.delegate.reset_cached_vol_pan_states()
    }

    fn OnTrackSelection(&self, trackid: *mut raw::MediaTrack) {
        if let Some(track) = NonNull::new(trackid) {
            self.delegate
                .on_track_selection(OnTrackSelectionArgs { track })
        }
    }

    fn IsKeyDown(&self, key: c_int) -> bool {
        self.delegate
            .is_key_down(IsKeyDownArgs { key: ModKey(key) })
    }

    fn Extended(
        &self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        let result = unsafe { self.process_extended(call, parm1, parm2, parm3) }.unwrap_or(0);
        if result != 0 {
            // Call was processed in one of the type-safe methods. No need to call `extended`.
            return result;
        }
        unsafe {
            self.delegate.extended(ExtendedArgs {
                call,
                parm_1: parm1,
                parm_2: parm2,
                parm_3: parm3,
            })
        }
    }
}

unsafe fn deref_as<T: Copy>(ptr: *const c_void) -> Option<T> {
    (ptr as *const T).as_ref().copied()
}

fn track(ptr: *mut c_void) -> Option<MediaTrack> {
    NonNull::new(ptr as *mut raw::MediaTrack)
}

unsafe fn track_fx_location(ptr: *mut c_void) -> Option<TrackFxLocation> {
    TrackFxLocation::try_from_raw(deref_as(ptr)?).ok()
}

unsafe fn qualified_fx_location(
    media_track_ptr: *mut c_void,
    media_item_ptr: *mut c_void,
    fx_index_ptr: *mut c_void,
) -> Option<QualifiedFxLocation> {
    let track = track(media_track_ptr)?;
    let fx_location = if media_item_ptr.is_null() {
        FxLocation::TrackFx(track_fx_location(fx_index_ptr)?)
    } else {
        FxLocation::TakeFx {
            item_index: deref_as::<i32>(media_item_ptr)? as u32,
            fx_index: deref_as::<i32>(fx_index_ptr)? as u32,
        }
    };
    Some(QualifiedFxLocation { track, fx_location })
}

/// A place for exactly one control surface.
///
/// REAPER lets a plug-in register control surface instances directly via
/// `plugin_register("csurf_inst", ...)`. Many plug-ins need just one of them, so this slot is
/// backed by a single-slot registry: installing a second surface fails until the first one has been
/// uninstalled or destroyed by REAPER.
///
/// # Example
///
/// ```no_run
/// use reaper_abi_medium::{ControlSurface, ControlSurfaceSlot};
///
/// #[derive(Debug)]
/// struct MyControlSurface;
/// impl ControlSurface for MyControlSurface {
///     fn set_track_list_change(&self) {
///         println!("Tracks changed");
///     }
/// }
///
/// let mut slot = ControlSurfaceSlot::new();
/// let cpp_surface = slot.install(Box::new(MyControlSurface)).unwrap();
/// // plugin_register("csurf_inst", cpp_surface) ... plugin_register("-csurf_inst", cpp_surface)
/// let _ = cpp_surface;
/// let my_surface = unsafe { slot.uninstall() }.unwrap();
/// assert!(my_surface.downcast_ref::<MyControlSurface>().is_some());
/// ```
pub struct ControlSurfaceSlot {
    registry: LifecycleRegistry<ControlSurfaceInterface>,
    installed: Option<InstalledSurface>,
}

struct InstalledSurface {
    cpp_surface: NonNull<raw::IReaperControlSurface>,
    // The callback target of `cpp_surface`. Must stay in place while installed.
    #[allow(clippy::redundant_allocation)]
    rust_surface: Box<Box<dyn IReaperControlSurface>>,
}

impl ControlSurfaceSlot {
    pub fn new() -> ControlSurfaceSlot {
        ControlSurfaceSlot {
            registry: create_rust_control_surface_registry(RegistryMode::SingleSlot),
            installed: None,
        }
    }

    /// Creates the C++ counterpart of the given control surface and returns it.
    ///
    /// The result is what needs to be passed to REAPER's `plugin_register()`.
    ///
    /// # Errors
    ///
    /// Fails if a control surface is installed already. A surface which REAPER has destroyed in
    /// the meantime doesn't count as installed. It's discarded.
    pub fn install(
        &mut self,
        control_surface: Box<dyn ControlSurface>,
    ) -> Result<NonNull<raw::IReaperControlSurface>, InstallError> {
        if self.installed.is_some() {
            if self.is_installed() {
                return Err(InstallError::AlreadyInstalled);
            }
            tracing::debug!(msg = "Discarding control surface which has been destroyed by REAPER");
            self.installed = None;
        }
        let adapter = ControlSurfaceAdapter::new(control_surface);
        // We need to box the Rust side twice in order to obtain a thin pointer for passing it to
        // C++ as callback target.
        let rust_surface: Box<Box<dyn IReaperControlSurface>> = Box::new(Box::new(adapter));
        let cpp_surface = unsafe {
            create_cpp_to_rust_control_surface(&self.registry, rust_surface.as_ref().into())?
        };
        self.installed = Some(InstalledSurface {
            cpp_surface,
            rust_surface,
        });
        Ok(cpp_surface)
    }

    /// Destroys the C++ counterpart and hands ownership of the control surface back to you.
    ///
    /// Returns `None` if no control surface is installed.
    ///
    /// # Safety
    ///
    /// REAPER must not use the C++ counterpart anymore, so unregister it from REAPER first. Also,
    /// don't call this from within a control surface method. That would be like pulling the rug
    /// out from under your feet!
    pub unsafe fn uninstall(&mut self) -> Option<Box<dyn ControlSurface>> {
        let installed = self.installed.take()?;
        if !delete_cpp_control_surface(&self.registry, installed.cpp_surface) {
            tracing::debug!(msg = "Control surface has already been destroyed by REAPER");
        }
        let rust_surface: Box<dyn IReaperControlSurface> = *installed.rust_surface;
        let adapter = rust_surface
            .into_any()
            .downcast::<ControlSurfaceAdapter>()
            .ok()?;
        Some(adapter.into_delegate())
    }

    /// Returns the C++ counterpart of the installed control surface.
    ///
    /// `None` if nothing is installed or if REAPER destroyed it in the meantime.
    pub fn raw_surface(&self) -> Option<NonNull<raw::IReaperControlSurface>> {
        let installed = self.installed.as_ref()?;
        let handle = reaper_abi_low::ForeignHandle::from_thin_ptr(NonNull::from(
            installed.rust_surface.as_ref(),
        ));
        self.registry.lookup(handle)
    }

    pub fn is_installed(&self) -> bool {
        self.raw_surface().is_some()
    }
}

impl Default for ControlSurfaceSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ControlSurfaceSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ControlSurfaceSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl Drop for ControlSurfaceSlot {
    fn drop(&mut self) {
        if self.installed.is_none() {
            return;
        }
        tracing::warn!(msg = "Control surface slot dropped while surface still installed");
        unsafe {
            let _ = self.uninstall();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c_str_macro::c_str;
    use std::cell::{Cell, RefCell};
    use std::ptr::null_mut;

    #[derive(Debug, Default)]
    struct RecordingSurface {
        volumes: RefCell<Vec<f64>>,
        fx_params: RefCell<Vec<(u32, u32, f64)>>,
        run_count: u32,
        reset_count: Cell<u32>,
    }

    impl ControlSurface for RecordingSurface {
        fn get_type_string(&self) -> Option<&ReaperStr> {
            Some(unsafe { ReaperStr::from_ptr(c_str!("RECORDING").as_ptr()) })
        }

        fn run(&mut self) {
            self.run_count += 1;
        }

        fn set_surface_volume(&self, args: SetSurfaceVolumeArgs) {
            self.volumes.borrow_mut().push(args.volume.get());
        }

        fn ext_set_fx_param(&self, args: ExtSetFxParamArgs) -> i32 {
            self.fx_params.borrow_mut().push((
                args.fx_index,
                args.param_index,
                args.param_value.get(),
            ));
            1
        }

        fn ext_reset(&self, _: ExtResetArgs) -> i32 {
            self.reset_count.set(self.reset_count.get() + 1);
            1
        }
    }

    fn fake_track() -> *mut raw::MediaTrack {
        NonNull::dangling().as_ptr()
    }

    #[test]
    fn install_forwards_to_typed_methods() {
        // Given
        let mut slot = ControlSurfaceSlot::new();
        let cpp_surface = slot
            .install(Box::new(RecordingSurface::default()))
            .unwrap();
        let cpp = unsafe { cpp_surface.as_ref() };
        // When
        cpp.SetSurfaceVolume(fake_track(), 0.5);
        // Null tracks don't reach the surface.
        cpp.SetSurfaceVolume(null_mut(), 0.7);
        cpp.Run();
        let mut fx_and_param: c_int = (2 << 16) | 5;
        let mut value = 0.75;
        let fx_param_result = unsafe {
            cpp.Extended(
                raw::CSURF_EXT_SETFXPARAM,
                fake_track() as _,
                &mut fx_and_param as *mut c_int as _,
                &mut value as *mut f64 as _,
            )
        };
        let reset_result =
            unsafe { cpp.Extended(raw::CSURF_EXT_RESET, null_mut(), null_mut(), null_mut()) };
        let unknown_result =
            unsafe { cpp.Extended(0x7FFF_0000, null_mut(), null_mut(), null_mut()) };
        // Missing arguments are treated as not handled.
        let incomplete_result = unsafe {
            cpp.Extended(
                raw::CSURF_EXT_SETFXPARAM,
                fake_track() as _,
                null_mut(),
                null_mut(),
            )
        };
        // Then
        let type_string = unsafe { std::ffi::CStr::from_ptr(cpp.GetTypeString()) };
        assert_eq!(type_string.to_str().unwrap(), "RECORDING");
        assert!(cpp.GetDescString().is_null());
        assert_eq!(fx_param_result, 1);
        assert_eq!(reset_result, 1);
        assert_eq!(unknown_result, 0);
        assert_eq!(incomplete_result, 0);
        assert!(slot.is_installed());
        let surface = unsafe { slot.uninstall() }.unwrap();
        let recording = surface.downcast_ref::<RecordingSurface>().unwrap();
        assert_eq!(*recording.volumes.borrow(), vec![0.5]);
        assert_eq!(*recording.fx_params.borrow(), vec![(2, 5, 0.75)]);
        assert_eq!(recording.run_count, 1);
        assert_eq!(recording.reset_count.get(), 1);
        assert!(!slot.is_installed());
    }

    #[test]
    fn tempo_and_play_rate_arrive_typed() {
        // Given
        #[derive(Debug, Default)]
        struct TempoSurface {
            changes: RefCell<Vec<(Option<f64>, Option<f64>)>>,
        }
        impl ControlSurface for TempoSurface {
            fn ext_set_bpm_and_play_rate(&self, args: ExtSetBpmAndPlayRateArgs) -> i32 {
                self.changes.borrow_mut().push((
                    args.tempo.map(|t| t.get()),
                    args.play_rate.map(|r| r.get()),
                ));
                1
            }
        }
        let mut slot = ControlSurfaceSlot::new();
        let cpp_surface = slot.install(Box::new(TempoSurface::default())).unwrap();
        let cpp = unsafe { cpp_surface.as_ref() };
        let mut tempo = 120.0;
        let mut play_rate = 1.5;
        let mut out_of_range_tempo = 0.5;
        // When
        let result = unsafe {
            cpp.Extended(
                raw::CSURF_EXT_SETBPMANDPLAYRATE,
                &mut tempo as *mut f64 as _,
                &mut play_rate as *mut f64 as _,
                null_mut(),
            )
        };
        unsafe {
            cpp.Extended(
                raw::CSURF_EXT_SETBPMANDPLAYRATE,
                &mut out_of_range_tempo as *mut f64 as _,
                null_mut(),
                null_mut(),
            )
        };
        // Then
        assert_eq!(result, 1);
        let surface = unsafe { slot.uninstall() }.unwrap();
        let tempo_surface = surface.downcast_ref::<TempoSurface>().unwrap();
        assert_eq!(
            *tempo_surface.changes.borrow(),
            vec![(Some(120.0), Some(1.5)), (None, None)]
        );
    }

    #[test]
    fn only_one_surface_at_a_time() {
        #[derive(Debug)]
        struct Silent;
        impl ControlSurface for Silent {}
        let mut slot = ControlSurfaceSlot::new();
        slot.install(Box::new(Silent)).unwrap();
        assert_eq!(
            slot.install(Box::new(Silent)).unwrap_err(),
            InstallError::AlreadyInstalled
        );
        assert!(unsafe { slot.uninstall() }.is_some());
        assert!(unsafe { slot.uninstall() }.is_none());
        slot.install(Box::new(Silent)).unwrap();
        assert!(slot.is_installed());
    }

    #[test]
    fn surface_destroyed_by_reaper_is_not_installed_anymore() {
        #[derive(Debug)]
        struct Silent;
        impl ControlSurface for Silent {}
        let mut slot = ControlSurfaceSlot::new();
        let cpp_surface = slot.install(Box::new(Silent)).unwrap();
        unsafe { reaper_abi_low::delete_cpp_control_surface_via_vtable(cpp_surface) };
        assert!(!slot.is_installed());
        // Ownership can still be taken back.
        assert!(unsafe { slot.uninstall() }.is_some());
    }

    #[test]
    fn slot_is_free_again_after_reaper_destroyed_surface() {
        #[derive(Debug)]
        struct Silent;
        impl ControlSurface for Silent {}
        let mut slot = ControlSurfaceSlot::new();
        let first = slot.install(Box::new(Silent)).unwrap();
        unsafe { reaper_abi_low::delete_cpp_control_surface_via_vtable(first) };
        let second = slot.install(Box::new(Silent)).unwrap();
        assert!(slot.is_installed());
        assert_eq!(slot.raw_surface(), Some(second));
        assert_eq!(
            slot.install(Box::new(Silent)).unwrap_err(),
            InstallError::AlreadyInstalled
        );
        assert!(unsafe { slot.uninstall() }.is_some());
        assert!(!slot.is_installed());
    }
}
