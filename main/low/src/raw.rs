//! Exposes the raw types of those parts of the REAPER C++ API which use virtual base classes.
//!
//! Each class is represented by a struct whose first field is the pointer to its vtable, followed
//! by the data members which are visible to REAPER (if any). The vtable structs list the virtual
//! functions in declaration order, exactly as REAPER's C++ compiler lays them out. Any deviation
//! here is undefined behavior at call time, so don't reorder anything.
//!
//! Virtual functions are called with the platform C calling convention and `this` as first
//! argument. That's true for the Itanium C++ ABI (Linux, macOS, MinGW) and for MSVC on 64-bit
//! targets. 32-bit Windows uses `thiscall`, which is not supported.
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::VirtualDestructor;
use std::os::raw::{c_char, c_int, c_longlong, c_uchar, c_uint, c_void};

/// Sample type used by REAPER (64-bit float).
pub type ReaSample = f64;

/// 64-bit integer as used in `reaper_plugin.h`.
pub type INT64 = c_longlong;

/// Opaque REAPER track.
#[repr(C)]
#[derive(Debug)]
pub struct MediaTrack {
    _private: [u8; 0],
}

/// Opaque window.
#[repr(C)]
#[derive(Debug)]
pub struct HWND__ {
    _private: [u8; 0],
}

/// Window handle.
pub type HWND = *mut HWND__;

/// Block of samples requested from a PCM source. Passed through unchanged, never inspected here.
#[repr(C)]
#[derive(Debug)]
pub struct PCM_source_transfer_t {
    _private: [u8; 0],
}

/// Block of peaks requested from a PCM source or sink. Passed through unchanged, never inspected
/// here.
#[repr(C)]
#[derive(Debug)]
pub struct PCM_source_peaktransfer_t {
    _private: [u8; 0],
}

/// A MIDI event.
///
/// `midi_message` can be longer than 4 bytes (sysex), in which case `size` tells the truth.
#[repr(C)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct MIDI_event_t {
    pub frame_offset: c_int,
    pub size: c_int,
    pub midi_message: [c_uchar; 4],
}

// IReaperControlSurface
// =====================

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct IReaperControlSurface {
    pub vtable: *const IReaperControlSurface_vtable,
}

#[repr(C)]
pub struct IReaperControlSurface_vtable {
    pub destructor: VirtualDestructor<IReaperControlSurface>,
    pub GetTypeString: unsafe extern "C" fn(this: *mut IReaperControlSurface) -> *const c_char,
    pub GetDescString: unsafe extern "C" fn(this: *mut IReaperControlSurface) -> *const c_char,
    pub GetConfigString: unsafe extern "C" fn(this: *mut IReaperControlSurface) -> *const c_char,
    pub CloseNoReset: unsafe extern "C" fn(this: *mut IReaperControlSurface),
    pub Run: unsafe extern "C" fn(this: *mut IReaperControlSurface),
    pub SetTrackListChange: unsafe extern "C" fn(this: *mut IReaperControlSurface),
    pub SetSurfaceVolume: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        trackid: *mut MediaTrack,
        volume: f64,
    ),
    pub SetSurfacePan:
        unsafe extern "C" fn(this: *mut IReaperControlSurface, trackid: *mut MediaTrack, pan: f64),
    pub SetSurfaceMute: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        trackid: *mut MediaTrack,
        mute: bool,
    ),
    pub SetSurfaceSelected: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        trackid: *mut MediaTrack,
        selected: bool,
    ),
    pub SetSurfaceSolo: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        trackid: *mut MediaTrack,
        solo: bool,
    ),
    pub SetSurfaceRecArm: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        trackid: *mut MediaTrack,
        recarm: bool,
    ),
    pub SetPlayState:
        unsafe extern "C" fn(this: *mut IReaperControlSurface, play: bool, pause: bool, rec: bool),
    pub SetRepeatState: unsafe extern "C" fn(this: *mut IReaperControlSurface, rep: bool),
    pub SetTrackTitle: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        trackid: *mut MediaTrack,
        title: *const c_char,
    ),
    pub GetTouchState: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        trackid: *mut MediaTrack,
        isPan: c_int,
    ) -> bool,
    pub SetAutoMode: unsafe extern "C" fn(this: *mut IReaperControlSurface, mode: c_int),
    pub ResetCachedVolPanStates: unsafe extern "C" fn(this: *mut IReaperControlSurface),
    pub OnTrackSelection:
        unsafe extern "C" fn(this: *mut IReaperControlSurface, trackid: *mut MediaTrack),
    pub IsKeyDown: unsafe extern "C" fn(this: *mut IReaperControlSurface, key: c_int) -> bool,
    pub Extended: unsafe extern "C" fn(
        this: *mut IReaperControlSurface,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

// PCM_source
// ==========

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct PCM_source {
    pub vtable: *const PCM_source_vtable,
}

#[repr(C)]
pub struct PCM_source_vtable {
    pub destructor: VirtualDestructor<PCM_source>,
    pub Duplicate: unsafe extern "C" fn(this: *mut PCM_source) -> *mut PCM_source,
    pub IsAvailable: unsafe extern "C" fn(this: *mut PCM_source) -> bool,
    pub SetAvailable: unsafe extern "C" fn(this: *mut PCM_source, avail: bool),
    pub GetType: unsafe extern "C" fn(this: *mut PCM_source) -> *const c_char,
    pub GetFileName: unsafe extern "C" fn(this: *mut PCM_source) -> *const c_char,
    pub SetFileName: unsafe extern "C" fn(this: *mut PCM_source, newfn: *const c_char) -> bool,
    pub GetSource: unsafe extern "C" fn(this: *mut PCM_source) -> *mut PCM_source,
    pub SetSource: unsafe extern "C" fn(this: *mut PCM_source, src: *mut PCM_source),
    pub GetNumChannels: unsafe extern "C" fn(this: *mut PCM_source) -> c_int,
    pub GetSampleRate: unsafe extern "C" fn(this: *mut PCM_source) -> f64,
    pub GetLength: unsafe extern "C" fn(this: *mut PCM_source) -> f64,
    pub GetLengthBeats: unsafe extern "C" fn(this: *mut PCM_source) -> f64,
    pub GetBitsPerSample: unsafe extern "C" fn(this: *mut PCM_source) -> c_int,
    pub GetPreferredPosition: unsafe extern "C" fn(this: *mut PCM_source) -> f64,
    pub PropertiesWindow: unsafe extern "C" fn(this: *mut PCM_source, hwndParent: HWND) -> c_int,
    pub GetSamples: unsafe extern "C" fn(this: *mut PCM_source, block: *mut PCM_source_transfer_t),
    pub GetPeakInfo:
        unsafe extern "C" fn(this: *mut PCM_source, block: *mut PCM_source_peaktransfer_t),
    pub SaveState: unsafe extern "C" fn(this: *mut PCM_source, ctx: *mut ProjectStateContext),
    pub LoadState: unsafe extern "C" fn(
        this: *mut PCM_source,
        firstline: *const c_char,
        ctx: *mut ProjectStateContext,
    ) -> c_int,
    pub Peaks_Clear: unsafe extern "C" fn(this: *mut PCM_source, deleteFile: bool),
    pub PeaksBuild_Begin: unsafe extern "C" fn(this: *mut PCM_source) -> c_int,
    pub PeaksBuild_Run: unsafe extern "C" fn(this: *mut PCM_source) -> c_int,
    pub PeaksBuild_Finish: unsafe extern "C" fn(this: *mut PCM_source),
    pub Extended: unsafe extern "C" fn(
        this: *mut PCM_source,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

// PCM_sink
// ========

#[repr(C)]
#[derive(PartialEq, Debug)]
pub struct PCM_sink {
    pub vtable: *const PCM_sink_vtable,
    /// Start time, read and written by the default implementations of `GetStartTime()` and
    /// `SetStartTime()`.
    pub m_st: f64,
}

#[repr(C)]
pub struct PCM_sink_vtable {
    pub destructor: VirtualDestructor<PCM_sink>,
    pub GetOutputInfoString:
        unsafe extern "C" fn(this: *mut PCM_sink, buf: *mut c_char, buflen: c_int),
    pub GetStartTime: unsafe extern "C" fn(this: *mut PCM_sink) -> f64,
    pub SetStartTime: unsafe extern "C" fn(this: *mut PCM_sink, st: f64),
    pub GetFileName: unsafe extern "C" fn(this: *mut PCM_sink) -> *const c_char,
    pub GetNumChannels: unsafe extern "C" fn(this: *mut PCM_sink) -> c_int,
    pub GetLength: unsafe extern "C" fn(this: *mut PCM_sink) -> f64,
    pub GetFileSize: unsafe extern "C" fn(this: *mut PCM_sink) -> INT64,
    pub WriteMIDI: unsafe extern "C" fn(
        this: *mut PCM_sink,
        events: *mut MIDI_eventlist,
        len: c_int,
        samplerate: f64,
    ),
    pub WriteDoubles: unsafe extern "C" fn(
        this: *mut PCM_sink,
        samples: *mut *mut ReaSample,
        len: c_int,
        nch: c_int,
        offset: c_int,
        spacing: c_int,
    ),
    pub WantMIDI: unsafe extern "C" fn(this: *mut PCM_sink) -> bool,
    pub GetLastSecondPeaks:
        unsafe extern "C" fn(this: *mut PCM_sink, sz: c_int, buf: *mut ReaSample) -> c_int,
    pub GetPeakInfo:
        unsafe extern "C" fn(this: *mut PCM_sink, block: *mut PCM_source_peaktransfer_t),
    pub Extended: unsafe extern "C" fn(
        this: *mut PCM_sink,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

// ProjectStateContext
// ===================

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct ProjectStateContext {
    pub vtable: *const ProjectStateContext_vtable,
}

#[repr(C)]
pub struct ProjectStateContext_vtable {
    pub destructor: VirtualDestructor<ProjectStateContext>,
    /// printf-style. Never pass untrusted text as `fmt`, use `"%s"` instead.
    pub AddLine: unsafe extern "C" fn(this: *mut ProjectStateContext, fmt: *const c_char, ...),
    pub GetLine: unsafe extern "C" fn(
        this: *mut ProjectStateContext,
        buf: *mut c_char,
        buflen: c_int,
    ) -> c_int,
    pub GetOutputSize: unsafe extern "C" fn(this: *mut ProjectStateContext) -> INT64,
    pub GetTempFlag: unsafe extern "C" fn(this: *mut ProjectStateContext) -> c_int,
    pub SetTempFlag: unsafe extern "C" fn(this: *mut ProjectStateContext, flag: c_int),
}

// IReaperPitchShift
// =================

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct IReaperPitchShift {
    pub vtable: *const IReaperPitchShift_vtable,
}

#[repr(C)]
pub struct IReaperPitchShift_vtable {
    pub destructor: VirtualDestructor<IReaperPitchShift>,
    pub set_srate: unsafe extern "C" fn(this: *mut IReaperPitchShift, srate: f64),
    pub set_nch: unsafe extern "C" fn(this: *mut IReaperPitchShift, nch: c_int),
    pub set_shift: unsafe extern "C" fn(this: *mut IReaperPitchShift, shift: f64),
    pub set_formant_shift: unsafe extern "C" fn(this: *mut IReaperPitchShift, shift: f64),
    pub set_tempo: unsafe extern "C" fn(this: *mut IReaperPitchShift, tempo: f64),
    pub Reset: unsafe extern "C" fn(this: *mut IReaperPitchShift),
    pub GetBuffer:
        unsafe extern "C" fn(this: *mut IReaperPitchShift, size: c_int) -> *mut ReaSample,
    pub BufferDone: unsafe extern "C" fn(this: *mut IReaperPitchShift, input_filled: c_int),
    pub FlushSamples: unsafe extern "C" fn(this: *mut IReaperPitchShift),
    pub IsReset: unsafe extern "C" fn(this: *mut IReaperPitchShift) -> bool,
    pub GetSamples: unsafe extern "C" fn(
        this: *mut IReaperPitchShift,
        requested_output: c_int,
        buffer: *mut ReaSample,
    ) -> c_int,
    pub SetQualityParameter: unsafe extern "C" fn(this: *mut IReaperPitchShift, parm: c_int),
    pub Extended: unsafe extern "C" fn(
        this: *mut IReaperPitchShift,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

// REAPER_Resample_Interface
// =========================

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct REAPER_Resample_Interface {
    pub vtable: *const REAPER_Resample_Interface_vtable,
}

#[repr(C)]
pub struct REAPER_Resample_Interface_vtable {
    pub destructor: VirtualDestructor<REAPER_Resample_Interface>,
    pub SetRates:
        unsafe extern "C" fn(this: *mut REAPER_Resample_Interface, rate_in: f64, rate_out: f64),
    pub Reset: unsafe extern "C" fn(this: *mut REAPER_Resample_Interface),
    pub GetCurrentLatency: unsafe extern "C" fn(this: *mut REAPER_Resample_Interface) -> f64,
    pub ResamplePrepare: unsafe extern "C" fn(
        this: *mut REAPER_Resample_Interface,
        out_samples: c_int,
        nch: c_int,
        inbuffer: *mut *mut ReaSample,
    ) -> c_int,
    pub ResampleOut: unsafe extern "C" fn(
        this: *mut REAPER_Resample_Interface,
        out: *mut ReaSample,
        nsamples_in: c_int,
        nsamples_out: c_int,
        nch: c_int,
    ) -> c_int,
    pub Extended: unsafe extern "C" fn(
        this: *mut REAPER_Resample_Interface,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

// MIDI_eventlist
// ==============

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct MIDI_eventlist {
    pub vtable: *const MIDI_eventlist_vtable,
}

/// The destructor of `MIDI_eventlist` is declared last (and protected), so it comes last.
#[repr(C)]
pub struct MIDI_eventlist_vtable {
    pub AddItem: unsafe extern "C" fn(this: *mut MIDI_eventlist, evt: *mut MIDI_event_t),
    pub EnumItems:
        unsafe extern "C" fn(this: *mut MIDI_eventlist, bpos: *mut c_int) -> *mut MIDI_event_t,
    pub DeleteItem: unsafe extern "C" fn(this: *mut MIDI_eventlist, bpos: c_int),
    pub GetSize: unsafe extern "C" fn(this: *mut MIDI_eventlist) -> c_int,
    pub Empty: unsafe extern "C" fn(this: *mut MIDI_eventlist),
    pub destructor: VirtualDestructor<MIDI_eventlist>,
}

// midi_Input
// ==========

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct midi_Input {
    pub vtable: *const midi_Input_vtable,
}

#[repr(C)]
pub struct midi_Input_vtable {
    pub destructor: VirtualDestructor<midi_Input>,
    pub start: unsafe extern "C" fn(this: *mut midi_Input),
    pub stop: unsafe extern "C" fn(this: *mut midi_Input),
    pub SwapBufs: unsafe extern "C" fn(this: *mut midi_Input, timestamp: c_uint),
    pub RunPreNoteTracking: unsafe extern "C" fn(this: *mut midi_Input, isAccum: c_int),
    pub GetReadBuf: unsafe extern "C" fn(this: *mut midi_Input) -> *mut MIDI_eventlist,
    pub Destroy: unsafe extern "C" fn(this: *mut midi_Input),
}

// midi_Output
// ===========

#[repr(C)]
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct midi_Output {
    pub vtable: *const midi_Output_vtable,
}

#[repr(C)]
pub struct midi_Output_vtable {
    pub destructor: VirtualDestructor<midi_Output>,
    pub BeginBlock: unsafe extern "C" fn(this: *mut midi_Output),
    pub EndBlock:
        unsafe extern "C" fn(this: *mut midi_Output, length: c_int, srate: f64, curtempo: f64),
    pub SendMsg:
        unsafe extern "C" fn(this: *mut midi_Output, msg: *mut MIDI_event_t, frame_offset: c_int),
    pub Send: unsafe extern "C" fn(
        this: *mut midi_Output,
        status: c_uchar,
        d1: c_uchar,
        d2: c_uchar,
        frame_offset: c_int,
    ),
    pub Destroy: unsafe extern "C" fn(this: *mut midi_Output),
}

/// `IReaperControlSurface::Extended()` call codes.
pub const CSURF_EXT_RESET: c_int = 0x0001_FFFF;
pub const CSURF_EXT_SETINPUTMONITOR: c_int = 0x0001_0001;
pub const CSURF_EXT_SETMETRONOME: c_int = 0x0001_0002;
pub const CSURF_EXT_SETAUTORECARM: c_int = 0x0001_0003;
pub const CSURF_EXT_SETRECMODE: c_int = 0x0001_0004;
pub const CSURF_EXT_SETSENDVOLUME: c_int = 0x0001_0005;
pub const CSURF_EXT_SETSENDPAN: c_int = 0x0001_0006;
pub const CSURF_EXT_SETFXENABLED: c_int = 0x0001_0007;
pub const CSURF_EXT_SETFXPARAM: c_int = 0x0001_0008;
pub const CSURF_EXT_SETFXPARAM_RECFX: c_int = 0x0001_0018;
pub const CSURF_EXT_SETBPMANDPLAYRATE: c_int = 0x0001_0009;
pub const CSURF_EXT_SETLASTTOUCHEDFX: c_int = 0x0001_000A;
pub const CSURF_EXT_SETFOCUSEDFX: c_int = 0x0001_000B;
pub const CSURF_EXT_SETLASTTOUCHEDTRACK: c_int = 0x0001_000C;
pub const CSURF_EXT_SETMIXERSCROLL: c_int = 0x0001_000D;
pub const CSURF_EXT_SETFXOPEN: c_int = 0x0001_0012;
pub const CSURF_EXT_SETFXCHANGE: c_int = 0x0001_0013;
