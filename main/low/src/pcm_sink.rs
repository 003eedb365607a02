#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::descriptor::{
    DestructorPlacement, Directions, InterfaceDescriptor, MethodDescriptor, ValueKind,
};
use crate::{
    firewall, raw, CallPath, CppVtable, ForeignHandle, HostInterface, HostObject,
    LifecycleRegistry, RegistryError, RegistryMode, VirtualDestructor,
};
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{null, NonNull};

impl raw::PCM_sink {
    pub fn GetOutputInfoString(&self, buf: *mut c_char, buflen: c_int) {
        unsafe {
            rust_to_cpp_PCM_sink_GetOutputInfoString(self as *const _ as _, buf, buflen);
        }
    }
    pub fn GetStartTime(&self) -> f64 {
        unsafe { rust_to_cpp_PCM_sink_GetStartTime(self as *const _ as _) }
    }
    pub fn SetStartTime(&self, st: f64) {
        unsafe {
            rust_to_cpp_PCM_sink_SetStartTime(self as *const _ as _, st);
        }
    }
    pub fn GetFileName(&self) -> *const c_char {
        unsafe { rust_to_cpp_PCM_sink_GetFileName(self as *const _ as _) }
    }
    pub fn GetNumChannels(&self) -> c_int {
        unsafe { rust_to_cpp_PCM_sink_GetNumChannels(self as *const _ as _) }
    }
    pub fn GetLength(&self) -> f64 {
        unsafe { rust_to_cpp_PCM_sink_GetLength(self as *const _ as _) }
    }
    pub fn GetFileSize(&self) -> raw::INT64 {
        unsafe { rust_to_cpp_PCM_sink_GetFileSize(self as *const _ as _) }
    }
    pub fn WriteMIDI(&self, events: *mut raw::MIDI_eventlist, len: c_int, samplerate: f64) {
        unsafe {
            rust_to_cpp_PCM_sink_WriteMIDI(self as *const _ as _, events, len, samplerate);
        }
    }
    pub fn WriteDoubles(
        &self,
        samples: *mut *mut raw::ReaSample,
        len: c_int,
        nch: c_int,
        offset: c_int,
        spacing: c_int,
    ) {
        unsafe {
            rust_to_cpp_PCM_sink_WriteDoubles(
                self as *const _ as _,
                samples,
                len,
                nch,
                offset,
                spacing,
            );
        }
    }
    pub fn WantMIDI(&self) -> bool {
        unsafe { rust_to_cpp_PCM_sink_WantMIDI(self as *const _ as _) }
    }
    pub fn GetLastSecondPeaks(&self, sz: c_int, buf: *mut raw::ReaSample) -> c_int {
        unsafe { rust_to_cpp_PCM_sink_GetLastSecondPeaks(self as *const _ as _, sz, buf) }
    }
    pub fn GetPeakInfo(&self, block: *mut raw::PCM_source_peaktransfer_t) {
        unsafe {
            rust_to_cpp_PCM_sink_GetPeakInfo(self as *const _ as _, block);
        }
    }
    pub fn Extended(
        &self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        unsafe { rust_to_cpp_PCM_sink_Extended(self as *const _ as _, call, parm1, parm2, parm3) }
    }
}

// Rust → C++
// ==========

unsafe fn vtable<'a>(self_: *mut raw::PCM_sink) -> Option<&'a raw::PCM_sink_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetOutputInfoString(
    self_: *mut raw::PCM_sink,
    buf: *mut c_char,
    buflen: c_int,
) {
    if let Some(vt) = vtable(self_) {
        (vt.GetOutputInfoString)(self_, buf, buflen);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetStartTime(self_: *mut raw::PCM_sink) -> f64 {
    vtable(self_).map(|vt| (vt.GetStartTime)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_SetStartTime(self_: *mut raw::PCM_sink, st: f64) {
    if let Some(vt) = vtable(self_) {
        (vt.SetStartTime)(self_, st);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetFileName(
    self_: *mut raw::PCM_sink,
) -> *const c_char {
    vtable(self_).map(|vt| (vt.GetFileName)(self_)).unwrap_or(null())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetNumChannels(self_: *mut raw::PCM_sink) -> c_int {
    vtable(self_).map(|vt| (vt.GetNumChannels)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetLength(self_: *mut raw::PCM_sink) -> f64 {
    vtable(self_).map(|vt| (vt.GetLength)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetFileSize(self_: *mut raw::PCM_sink) -> raw::INT64 {
    vtable(self_).map(|vt| (vt.GetFileSize)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_WriteMIDI(
    self_: *mut raw::PCM_sink,
    events: *mut raw::MIDI_eventlist,
    len: c_int,
    samplerate: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.WriteMIDI)(self_, events, len, samplerate);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_WriteDoubles(
    self_: *mut raw::PCM_sink,
    samples: *mut *mut raw::ReaSample,
    len: c_int,
    nch: c_int,
    offset: c_int,
    spacing: c_int,
) {
    if let Some(vt) = vtable(self_) {
        (vt.WriteDoubles)(self_, samples, len, nch, offset, spacing);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_WantMIDI(self_: *mut raw::PCM_sink) -> bool {
    vtable(self_).map(|vt| (vt.WantMIDI)(self_)).unwrap_or(false)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetLastSecondPeaks(
    self_: *mut raw::PCM_sink,
    sz: c_int,
    buf: *mut raw::ReaSample,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.GetLastSecondPeaks)(self_, sz, buf))
        .unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_GetPeakInfo(
    self_: *mut raw::PCM_sink,
    block: *mut raw::PCM_source_peaktransfer_t,
) {
    if let Some(vt) = vtable(self_) {
        (vt.GetPeakInfo)(self_, block);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_sink_Extended(
    self_: *mut raw::PCM_sink,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.Extended)(self_, call, parm1, parm2, parm3))
        .unwrap_or_default()
}

/// Destroys a `PCM_sink` object via its virtual destructor, just like C++ `delete sink` would.
///
/// # Safety
///
/// `sink` must be valid and owned by the caller.
pub unsafe fn delete_cpp_pcm_sink_via_vtable(sink: NonNull<raw::PCM_sink>) {
    if let Some(vt) = vtable(sink.as_ptr()) {
        vt.destructor.delete(sink.as_ptr());
    }
}

// C++ → Rust
// ==========

/// This is the Rust analog to the C++ virtual base class `PCM_sink`.
///
/// An implementation of this trait can be passed to [`create_cpp_to_rust_pcm_sink()`].
///
/// [`create_cpp_to_rust_pcm_sink()`]: fn.create_cpp_to_rust_pcm_sink.html
pub trait PCM_sink {
    fn GetOutputInfoString(&mut self, buf: *mut c_char, buflen: c_int);
    fn GetStartTime(&mut self) -> f64;
    fn SetStartTime(&mut self, st: f64);
    fn GetFileName(&mut self) -> *const c_char;
    fn GetNumChannels(&mut self) -> c_int;
    fn GetLength(&mut self) -> f64;
    fn GetFileSize(&mut self) -> raw::INT64;
    fn WriteMIDI(&mut self, events: *mut raw::MIDI_eventlist, len: c_int, samplerate: f64);
    fn WriteDoubles(
        &mut self,
        samples: *mut *mut raw::ReaSample,
        len: c_int,
        nch: c_int,
        offset: c_int,
        spacing: c_int,
    );
    fn WantMIDI(&mut self) -> bool {
        false
    }
    fn GetLastSecondPeaks(&mut self, sz: c_int, buf: *mut raw::ReaSample) -> c_int {
        let _ = sz;
        let _ = buf;
        0
    }
    fn GetPeakInfo(&mut self, block: *mut raw::PCM_source_peaktransfer_t) {
        let _ = block;
    }

    fn Extended(
        &mut self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        let _ = call;
        let _ = parm1;
        let _ = parm2;
        let _ = parm3;
        0
    }
}

/// Table of entry points a `PCM_sink` host object forwards to.
///
/// Each entry receives the foreign handle as first argument.
#[repr(C)]
pub struct PCM_sink_callbacks {
    pub GetOutputInfoString:
        unsafe extern "C" fn(callback_target: ForeignHandle, buf: *mut c_char, buflen: c_int),
    pub GetStartTime: unsafe extern "C" fn(callback_target: ForeignHandle) -> f64,
    pub SetStartTime: unsafe extern "C" fn(callback_target: ForeignHandle, st: f64),
    pub GetFileName: unsafe extern "C" fn(callback_target: ForeignHandle) -> *const c_char,
    pub GetNumChannels: unsafe extern "C" fn(callback_target: ForeignHandle) -> c_int,
    pub GetLength: unsafe extern "C" fn(callback_target: ForeignHandle) -> f64,
    pub GetFileSize: unsafe extern "C" fn(callback_target: ForeignHandle) -> raw::INT64,
    pub WriteMIDI: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        events: *mut raw::MIDI_eventlist,
        len: c_int,
        samplerate: f64,
    ),
    pub WriteDoubles: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        samples: *mut *mut raw::ReaSample,
        len: c_int,
        nch: c_int,
        offset: c_int,
        spacing: c_int,
    ),
    pub WantMIDI: unsafe extern "C" fn(callback_target: ForeignHandle) -> bool,
    pub GetLastSecondPeaks: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        sz: c_int,
        buf: *mut raw::ReaSample,
    ) -> c_int,
    pub GetPeakInfo: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        block: *mut raw::PCM_source_peaktransfer_t,
    ),
    pub Extended: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

/// Entry points which dispatch to a `Box<dyn PCM_sink>`.
pub static RUST_PCM_SINK_CALLBACKS: PCM_sink_callbacks = PCM_sink_callbacks {
    GetOutputInfoString: cpp_to_rust_PCM_sink_GetOutputInfoString,
    GetStartTime: cpp_to_rust_PCM_sink_GetStartTime,
    SetStartTime: cpp_to_rust_PCM_sink_SetStartTime,
    GetFileName: cpp_to_rust_PCM_sink_GetFileName,
    GetNumChannels: cpp_to_rust_PCM_sink_GetNumChannels,
    GetLength: cpp_to_rust_PCM_sink_GetLength,
    GetFileSize: cpp_to_rust_PCM_sink_GetFileSize,
    WriteMIDI: cpp_to_rust_PCM_sink_WriteMIDI,
    WriteDoubles: cpp_to_rust_PCM_sink_WriteDoubles,
    WantMIDI: cpp_to_rust_PCM_sink_WantMIDI,
    GetLastSecondPeaks: cpp_to_rust_PCM_sink_GetLastSecondPeaks,
    GetPeakInfo: cpp_to_rust_PCM_sink_GetPeakInfo,
    Extended: cpp_to_rust_PCM_sink_Extended,
};

/// Marker binding `PCM_sink` to its host object representation.
#[derive(Debug)]
pub enum PcmSinkInterface {}

impl HostInterface for PcmSinkInterface {
    type Raw = raw::PCM_sink;
    type Vtable = raw::PCM_sink_vtable;
    type Callbacks = PCM_sink_callbacks;
    /// `m_st`
    type BaseFields = f64;

    fn descriptor() -> &'static InterfaceDescriptor {
        &PCM_SINK_DESCRIPTOR
    }

    fn vtable() -> *const raw::PCM_sink_vtable {
        host_vtable::VTABLE.vptr()
    }
}

/// Creates a registry for `PCM_sink` objects implemented in Rust.
pub fn create_rust_pcm_sink_registry(mode: RegistryMode) -> LifecycleRegistry<PcmSinkInterface> {
    LifecycleRegistry::new(mode, &RUST_PCM_SINK_CALLBACKS)
}

/// Creates a `PCM_sink` object which REAPER can use like a C++ one and returns a pointer to it.
///
/// This function is provided because Rust structs can't implement C++ virtual base classes.
///
/// # Cleaning up
///
/// In order to avoid memory leaks, you must take care of removing the C++ counterpart
/// PCM sink by calling [`delete_cpp_pcm_sink()`].
///
/// # Safety
///
/// The registry must have been created with [`create_rust_pcm_sink_registry()`]. The callback
/// target must stay alive and in place until the object is unregistered.
///
/// [`delete_cpp_pcm_sink()`]: fn.delete_cpp_pcm_sink.html
/// [`create_rust_pcm_sink_registry()`]: fn.create_rust_pcm_sink_registry.html
pub unsafe fn create_cpp_to_rust_pcm_sink(
    registry: &LifecycleRegistry<PcmSinkInterface>,
    callback_target: NonNull<Box<dyn PCM_sink>>,
) -> Result<NonNull<raw::PCM_sink>, RegistryError> {
    registry.register(ForeignHandle::from_thin_ptr(callback_target))
}

/// Destroys a `PCM_sink` object created with [`create_cpp_to_rust_pcm_sink()`].
///
/// Returns `false` if it was not registered (anymore).
///
/// # Safety
///
/// REAPER can crash if it still uses the sink.
///
/// [`create_cpp_to_rust_pcm_sink()`]: fn.create_cpp_to_rust_pcm_sink.html
pub unsafe fn delete_cpp_pcm_sink(
    registry: &LifecycleRegistry<PcmSinkInterface>,
    sink: NonNull<raw::PCM_sink>,
) -> bool {
    registry.unregister(sink)
}

unsafe fn rust_target<'a>(callback_target: ForeignHandle) -> &'a mut Box<dyn PCM_sink> {
    callback_target.callback_target()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetOutputInfoString(
    callback_target: ForeignHandle,
    buf: *mut c_char,
    buflen: c_int,
) {
    firewall(|| unsafe { rust_target(callback_target) }.GetOutputInfoString(buf, buflen));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetStartTime(callback_target: ForeignHandle) -> f64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetStartTime()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_SetStartTime(callback_target: ForeignHandle, st: f64) {
    firewall(|| unsafe { rust_target(callback_target) }.SetStartTime(st));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetFileName(callback_target: ForeignHandle) -> *const c_char {
    firewall(|| unsafe { rust_target(callback_target) }.GetFileName()).unwrap_or(null())
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetNumChannels(callback_target: ForeignHandle) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.GetNumChannels()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetLength(callback_target: ForeignHandle) -> f64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetLength()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetFileSize(callback_target: ForeignHandle) -> raw::INT64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetFileSize()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_WriteMIDI(
    callback_target: ForeignHandle,
    events: *mut raw::MIDI_eventlist,
    len: c_int,
    samplerate: f64,
) {
    firewall(|| unsafe { rust_target(callback_target) }.WriteMIDI(events, len, samplerate));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_WriteDoubles(
    callback_target: ForeignHandle,
    samples: *mut *mut raw::ReaSample,
    len: c_int,
    nch: c_int,
    offset: c_int,
    spacing: c_int,
) {
    firewall(|| {
        unsafe { rust_target(callback_target) }.WriteDoubles(samples, len, nch, offset, spacing)
    });
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_WantMIDI(callback_target: ForeignHandle) -> bool {
    firewall(|| unsafe { rust_target(callback_target) }.WantMIDI()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetLastSecondPeaks(
    callback_target: ForeignHandle,
    sz: c_int,
    buf: *mut raw::ReaSample,
) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.GetLastSecondPeaks(sz, buf))
        .unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_GetPeakInfo(
    callback_target: ForeignHandle,
    block: *mut raw::PCM_source_peaktransfer_t,
) {
    firewall(|| unsafe { rust_target(callback_target) }.GetPeakInfo(block));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_sink_Extended(
    callback_target: ForeignHandle,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.Extended(call, parm1, parm2, parm3))
        .unwrap_or_default()
}

/// The vtable of host objects, forwarding each virtual function to the callbacks table.
mod host_vtable {
    use super::*;

    type Sink = HostObject<PcmSinkInterface>;

    pub(super) static VTABLE: CppVtable<raw::PCM_sink_vtable> =
        CppVtable::new(raw::PCM_sink_vtable {
            destructor: VirtualDestructor::for_host_object::<PcmSinkInterface>(),
            GetOutputInfoString,
            GetStartTime,
            SetStartTime,
            GetFileName,
            GetNumChannels,
            GetLength,
            GetFileSize,
            WriteMIDI,
            WriteDoubles,
            WantMIDI,
            GetLastSecondPeaks,
            GetPeakInfo,
            Extended,
        });

    unsafe extern "C" fn GetOutputInfoString(
        this: *mut raw::PCM_sink,
        buf: *mut c_char,
        buflen: c_int,
    ) {
        Sink::forward(this, CallPath::Control, (), |cb, h| {
            (cb.GetOutputInfoString)(h, buf, buflen)
        })
    }

    unsafe extern "C" fn GetStartTime(this: *mut raw::PCM_sink) -> f64 {
        Sink::forward(this, CallPath::Control, 0.0, |cb, h| (cb.GetStartTime)(h))
    }

    unsafe extern "C" fn SetStartTime(this: *mut raw::PCM_sink, st: f64) {
        Sink::forward(this, CallPath::Control, (), |cb, h| (cb.SetStartTime)(h, st))
    }

    unsafe extern "C" fn GetFileName(this: *mut raw::PCM_sink) -> *const c_char {
        Sink::forward(this, CallPath::Control, null(), |cb, h| (cb.GetFileName)(h))
    }

    unsafe extern "C" fn GetNumChannels(this: *mut raw::PCM_sink) -> c_int {
        Sink::forward(this, CallPath::Control, 0, |cb, h| (cb.GetNumChannels)(h))
    }

    unsafe extern "C" fn GetLength(this: *mut raw::PCM_sink) -> f64 {
        Sink::forward(this, CallPath::Control, 0.0, |cb, h| (cb.GetLength)(h))
    }

    unsafe extern "C" fn GetFileSize(this: *mut raw::PCM_sink) -> raw::INT64 {
        Sink::forward(this, CallPath::Control, 0, |cb, h| (cb.GetFileSize)(h))
    }

    unsafe extern "C" fn WriteMIDI(
        this: *mut raw::PCM_sink,
        events: *mut raw::MIDI_eventlist,
        len: c_int,
        samplerate: f64,
    ) {
        Sink::forward(this, CallPath::RealTime, (), |cb, h| {
            (cb.WriteMIDI)(h, events, len, samplerate)
        })
    }

    unsafe extern "C" fn WriteDoubles(
        this: *mut raw::PCM_sink,
        samples: *mut *mut raw::ReaSample,
        len: c_int,
        nch: c_int,
        offset: c_int,
        spacing: c_int,
    ) {
        Sink::forward(this, CallPath::RealTime, (), |cb, h| {
            (cb.WriteDoubles)(h, samples, len, nch, offset, spacing)
        })
    }

    unsafe extern "C" fn WantMIDI(this: *mut raw::PCM_sink) -> bool {
        Sink::forward(this, CallPath::Control, false, |cb, h| (cb.WantMIDI)(h))
    }

    unsafe extern "C" fn GetLastSecondPeaks(
        this: *mut raw::PCM_sink,
        sz: c_int,
        buf: *mut raw::ReaSample,
    ) -> c_int {
        Sink::forward(this, CallPath::RealTime, 0, |cb, h| {
            (cb.GetLastSecondPeaks)(h, sz, buf)
        })
    }

    unsafe extern "C" fn GetPeakInfo(
        this: *mut raw::PCM_sink,
        block: *mut raw::PCM_source_peaktransfer_t,
    ) {
        Sink::forward(this, CallPath::RealTime, (), |cb, h| (cb.GetPeakInfo)(h, block))
    }

    unsafe extern "C" fn Extended(
        this: *mut raw::PCM_sink,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        Sink::forward(this, CallPath::Control, 0, |cb, h| {
            (cb.Extended)(h, call, parm1, parm2, parm3)
        })
    }
}

use ValueKind::*;

pub static PCM_SINK_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "PCM_sink",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new(
            "GetOutputInfoString",
            Directions::BOTH,
            &[StrBuffer, Capacity],
            Void,
        ),
        MethodDescriptor::new("GetStartTime", Directions::BOTH, &[], Double),
        MethodDescriptor::new("SetStartTime", Directions::BOTH, &[Double], Void),
        MethodDescriptor::new("GetFileName", Directions::BOTH, &[], Str).nullable(),
        MethodDescriptor::new("GetNumChannels", Directions::BOTH, &[], Int),
        MethodDescriptor::new("GetLength", Directions::BOTH, &[], Double),
        MethodDescriptor::new("GetFileSize", Directions::BOTH, &[], Int64),
        MethodDescriptor::new(
            "WriteMIDI",
            Directions::BOTH,
            &[Pointer("MIDI_eventlist"), Int, Double],
            Void,
        )
        .real_time(),
        MethodDescriptor::new(
            "WriteDoubles",
            Directions::BOTH,
            &[Pointer("ReaSample**"), Int, Int, Int, Int],
            Void,
        )
        .real_time(),
        MethodDescriptor::new("WantMIDI", Directions::BOTH, &[], Bool),
        MethodDescriptor::new(
            "GetLastSecondPeaks",
            Directions::BOTH,
            &[Int, Pointer("ReaSample")],
            Int,
        )
        .real_time(),
        MethodDescriptor::new(
            "GetPeakInfo",
            Directions::BOTH,
            &[Pointer("PCM_source_peaktransfer_t")],
            Void,
        )
        .real_time(),
        MethodDescriptor::new(
            "Extended",
            Directions::BOTH,
            &[Int, Pointer("void"), Pointer("void"), Pointer("void")],
            Int,
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::ptr::null_mut;
    use std::rc::Rc;

    struct TestSink {
        start_time: f64,
        written_frames: Rc<Cell<i32>>,
    }

    impl PCM_sink for TestSink {
        fn GetOutputInfoString(&mut self, buf: *mut c_char, buflen: c_int) {
            unsafe { crate::copy_to_raw_c_buffer(b"test sink", buf, buflen) };
        }
        fn GetStartTime(&mut self) -> f64 {
            self.start_time
        }
        fn SetStartTime(&mut self, st: f64) {
            self.start_time = st;
        }
        fn GetFileName(&mut self) -> *const c_char {
            null()
        }
        fn GetNumChannels(&mut self) -> c_int {
            2
        }
        fn GetLength(&mut self) -> f64 {
            12.5
        }
        fn GetFileSize(&mut self) -> raw::INT64 {
            1 << 40
        }
        fn WriteMIDI(&mut self, _: *mut raw::MIDI_eventlist, _: c_int, _: f64) {}
        fn WriteDoubles(
            &mut self,
            _: *mut *mut raw::ReaSample,
            len: c_int,
            _: c_int,
            _: c_int,
            _: c_int,
        ) {
            self.written_frames.set(self.written_frames.get() + len);
        }
    }

    #[test]
    fn round_trip() {
        // Given
        let written_frames = Rc::new(Cell::new(0));
        let sink: Box<dyn PCM_sink> = Box::new(TestSink {
            start_time: 0.0,
            written_frames: written_frames.clone(),
        });
        let registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
        let cpp_sink = unsafe { create_cpp_to_rust_pcm_sink(&registry, (&sink).into()) }.unwrap();
        let cpp_sink = unsafe { cpp_sink.as_ref() };
        // When
        cpp_sink.SetStartTime(3.0);
        cpp_sink.WriteDoubles(std::ptr::null_mut(), 512, 2, 0, 1);
        let mut buf = [0 as c_char; 5];
        cpp_sink.GetOutputInfoString(buf.as_mut_ptr(), 5);
        // Then
        assert_eq!(cpp_sink.GetStartTime(), 3.0);
        assert_eq!(cpp_sink.GetNumChannels(), 2);
        assert_eq!(cpp_sink.GetLength(), 12.5);
        assert_eq!(cpp_sink.GetFileSize(), 1 << 40);
        assert!(!cpp_sink.WantMIDI());
        assert_eq!(cpp_sink.Extended(0x1234, null_mut(), null_mut(), null_mut()), 0);
        assert_eq!(written_frames.get(), 512);
        assert_eq!(&buf, &[116, 101, 115, 116, 0]);
        assert_eq!(cpp_sink.m_st, 0.0);
        assert!(unsafe { delete_cpp_pcm_sink(&registry, cpp_sink.into()) });
    }

    #[test]
    fn stale_object_returns_inert_values() {
        let sink: Box<dyn PCM_sink> = Box::new(TestSink {
            start_time: 7.0,
            written_frames: Default::default(),
        });
        let registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
        let cpp_sink = unsafe { create_cpp_to_rust_pcm_sink(&registry, (&sink).into()) }.unwrap();
        let handle = ForeignHandle::from_thin_ptr(NonNull::from(&sink));
        let object = cpp_sink.as_ptr() as *mut HostObject<PcmSinkInterface>;
        // Keep the object alive but detached by dropping the registry first.
        drop(registry);
        assert!(!unsafe { &*object }.is_attached());
        assert_eq!(unsafe { &*object }.handle(), handle);
        let cpp_sink = unsafe { cpp_sink.as_ref() };
        assert_eq!(cpp_sink.GetStartTime(), 0.0);
        assert_eq!(cpp_sink.GetNumChannels(), 0);
        assert_eq!(cpp_sink.GetLastSecondPeaks(10, std::ptr::null_mut()), 0);
        // Simulate REAPER deleting it. Frees the leaked object.
        unsafe { delete_cpp_pcm_sink_via_vtable(cpp_sink.into()) };
    }
}
