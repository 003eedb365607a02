#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::descriptor::{
    DestructorPlacement, Directions, InterfaceDescriptor, MethodDescriptor, ValueKind,
};
use crate::{
    firewall, raw, CallPath, CppVtable, ForeignHandle, HostInterface, HostObject,
    LifecycleRegistry, RegistryError, RegistryMode, ReleaseFn, VirtualDestructor,
};
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{null, null_mut, NonNull};

impl raw::PCM_source {
    pub fn Duplicate(&self) -> *mut raw::PCM_source {
        unsafe { rust_to_cpp_PCM_source_Duplicate(self as *const _ as _) }
    }
    pub fn IsAvailable(&self) -> bool {
        unsafe { rust_to_cpp_PCM_source_IsAvailable(self as *const _ as _) }
    }
    pub fn SetAvailable(&self, avail: bool) {
        unsafe {
            rust_to_cpp_PCM_source_SetAvailable(self as *const _ as _, avail);
        }
    }
    pub fn GetType(&self) -> *const c_char {
        unsafe { rust_to_cpp_PCM_source_GetType(self as *const _ as _) }
    }
    pub fn GetFileName(&self) -> *const c_char {
        unsafe { rust_to_cpp_PCM_source_GetFileName(self as *const _ as _) }
    }
    pub fn SetFileName(&self, newfn: *const c_char) -> bool {
        unsafe { rust_to_cpp_PCM_source_SetFileName(self as *const _ as _, newfn) }
    }
    pub fn GetSource(&self) -> *mut raw::PCM_source {
        unsafe { rust_to_cpp_PCM_source_GetSource(self as *const _ as _) }
    }
    pub fn SetSource(&self, src: *mut raw::PCM_source) {
        unsafe {
            rust_to_cpp_PCM_source_SetSource(self as *const _ as _, src);
        }
    }
    pub fn GetNumChannels(&self) -> c_int {
        unsafe { rust_to_cpp_PCM_source_GetNumChannels(self as *const _ as _) }
    }
    pub fn GetSampleRate(&self) -> f64 {
        unsafe { rust_to_cpp_PCM_source_GetSampleRate(self as *const _ as _) }
    }
    pub fn GetLength(&self) -> f64 {
        unsafe { rust_to_cpp_PCM_source_GetLength(self as *const _ as _) }
    }
    pub fn GetLengthBeats(&self) -> f64 {
        unsafe { rust_to_cpp_PCM_source_GetLengthBeats(self as *const _ as _) }
    }
    pub fn GetBitsPerSample(&self) -> c_int {
        unsafe { rust_to_cpp_PCM_source_GetBitsPerSample(self as *const _ as _) }
    }
    pub fn GetPreferredPosition(&self) -> f64 {
        unsafe { rust_to_cpp_PCM_source_GetPreferredPosition(self as *const _ as _) }
    }
    pub fn PropertiesWindow(&self, hwndParent: raw::HWND) -> c_int {
        unsafe { rust_to_cpp_PCM_source_PropertiesWindow(self as *const _ as _, hwndParent) }
    }
    pub fn GetSamples(&self, block: *mut raw::PCM_source_transfer_t) {
        unsafe {
            rust_to_cpp_PCM_source_GetSamples(self as *const _ as _, block);
        }
    }
    pub fn GetPeakInfo(&self, block: *mut raw::PCM_source_peaktransfer_t) {
        unsafe {
            rust_to_cpp_PCM_source_GetPeakInfo(self as *const _ as _, block);
        }
    }
    pub fn SaveState(&self, ctx: *mut raw::ProjectStateContext) {
        unsafe {
            rust_to_cpp_PCM_source_SaveState(self as *const _ as _, ctx);
        }
    }
    pub fn LoadState(&self, firstline: *const c_char, ctx: *mut raw::ProjectStateContext) -> c_int {
        unsafe { rust_to_cpp_PCM_source_LoadState(self as *const _ as _, firstline, ctx) }
    }
    pub fn Peaks_Clear(&self, deleteFile: bool) {
        unsafe {
            rust_to_cpp_PCM_source_Peaks_Clear(self as *const _ as _, deleteFile);
        }
    }
    pub fn PeaksBuild_Begin(&self) -> c_int {
        unsafe { rust_to_cpp_PCM_source_PeaksBuild_Begin(self as *const _ as _) }
    }
    pub fn PeaksBuild_Run(&self) -> c_int {
        unsafe { rust_to_cpp_PCM_source_PeaksBuild_Run(self as *const _ as _) }
    }
    pub fn PeaksBuild_Finish(&self) {
        unsafe {
            rust_to_cpp_PCM_source_PeaksBuild_Finish(self as *const _ as _);
        }
    }
    pub fn Extended(
        &self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        unsafe { rust_to_cpp_PCM_source_Extended(self as *const _ as _, call, parm1, parm2, parm3) }
    }
}

// Rust → C++
// ==========

unsafe fn vtable<'a>(self_: *mut raw::PCM_source) -> Option<&'a raw::PCM_source_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_Duplicate(
    self_: *mut raw::PCM_source,
) -> *mut raw::PCM_source {
    vtable(self_).map(|vt| (vt.Duplicate)(self_)).unwrap_or(null_mut())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_IsAvailable(self_: *mut raw::PCM_source) -> bool {
    vtable(self_).map(|vt| (vt.IsAvailable)(self_)).unwrap_or(false)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_SetAvailable(
    self_: *mut raw::PCM_source,
    avail: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetAvailable)(self_, avail);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetType(
    self_: *mut raw::PCM_source,
) -> *const c_char {
    vtable(self_).map(|vt| (vt.GetType)(self_)).unwrap_or(null())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetFileName(
    self_: *mut raw::PCM_source,
) -> *const c_char {
    vtable(self_).map(|vt| (vt.GetFileName)(self_)).unwrap_or(null())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_SetFileName(
    self_: *mut raw::PCM_source,
    newfn: *const c_char,
) -> bool {
    vtable(self_)
        .map(|vt| (vt.SetFileName)(self_, newfn))
        .unwrap_or(false)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetSource(
    self_: *mut raw::PCM_source,
) -> *mut raw::PCM_source {
    vtable(self_).map(|vt| (vt.GetSource)(self_)).unwrap_or(null_mut())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_SetSource(
    self_: *mut raw::PCM_source,
    src: *mut raw::PCM_source,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetSource)(self_, src);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetNumChannels(
    self_: *mut raw::PCM_source,
) -> c_int {
    vtable(self_).map(|vt| (vt.GetNumChannels)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetSampleRate(self_: *mut raw::PCM_source) -> f64 {
    vtable(self_).map(|vt| (vt.GetSampleRate)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetLength(self_: *mut raw::PCM_source) -> f64 {
    vtable(self_).map(|vt| (vt.GetLength)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetLengthBeats(self_: *mut raw::PCM_source) -> f64 {
    vtable(self_).map(|vt| (vt.GetLengthBeats)(self_)).unwrap_or(-1.0)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetBitsPerSample(
    self_: *mut raw::PCM_source,
) -> c_int {
    vtable(self_).map(|vt| (vt.GetBitsPerSample)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetPreferredPosition(
    self_: *mut raw::PCM_source,
) -> f64 {
    vtable(self_)
        .map(|vt| (vt.GetPreferredPosition)(self_))
        .unwrap_or(-1.0)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_PropertiesWindow(
    self_: *mut raw::PCM_source,
    hwndParent: raw::HWND,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.PropertiesWindow)(self_, hwndParent))
        .unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetSamples(
    self_: *mut raw::PCM_source,
    block: *mut raw::PCM_source_transfer_t,
) {
    if let Some(vt) = vtable(self_) {
        (vt.GetSamples)(self_, block);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_GetPeakInfo(
    self_: *mut raw::PCM_source,
    block: *mut raw::PCM_source_peaktransfer_t,
) {
    if let Some(vt) = vtable(self_) {
        (vt.GetPeakInfo)(self_, block);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_SaveState(
    self_: *mut raw::PCM_source,
    ctx: *mut raw::ProjectStateContext,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SaveState)(self_, ctx);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_LoadState(
    self_: *mut raw::PCM_source,
    firstline: *const c_char,
    ctx: *mut raw::ProjectStateContext,
) -> c_int {
    // -1 means error
    vtable(self_)
        .map(|vt| (vt.LoadState)(self_, firstline, ctx))
        .unwrap_or(-1)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_Peaks_Clear(
    self_: *mut raw::PCM_source,
    deleteFile: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.Peaks_Clear)(self_, deleteFile);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_PeaksBuild_Begin(
    self_: *mut raw::PCM_source,
) -> c_int {
    vtable(self_).map(|vt| (vt.PeaksBuild_Begin)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_PeaksBuild_Run(
    self_: *mut raw::PCM_source,
) -> c_int {
    vtable(self_).map(|vt| (vt.PeaksBuild_Run)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_PeaksBuild_Finish(self_: *mut raw::PCM_source) {
    if let Some(vt) = vtable(self_) {
        (vt.PeaksBuild_Finish)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_PCM_source_Extended(
    self_: *mut raw::PCM_source,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.Extended)(self_, call, parm1, parm2, parm3))
        .unwrap_or_default()
}

/// Destroys a `PCM_source` object via its virtual destructor, just like C++ `delete source` would.
///
/// That's how sources returned by `Duplicate()` are supposed to be disposed of.
///
/// # Safety
///
/// `source` must be valid and owned by the caller.
pub unsafe fn delete_cpp_pcm_source_via_vtable(source: NonNull<raw::PCM_source>) {
    if let Some(vt) = vtable(source.as_ptr()) {
        vt.destructor.delete(source.as_ptr());
    }
}

// C++ → Rust
// ==========

/// This is the Rust analog to the C++ virtual base class `PCM_source`.
///
/// An implementation of this trait can be passed to [`create_cpp_to_rust_pcm_source()`].
///
/// [`create_cpp_to_rust_pcm_source()`]: fn.create_cpp_to_rust_pcm_source.html
pub trait PCM_source {
    /// Must return an object which REAPER owns, e.g. one created with
    /// [`LifecycleRegistry::register_with_release()`], or null.
    fn Duplicate(&mut self) -> *mut raw::PCM_source;

    fn IsAvailable(&mut self) -> bool;
    fn SetAvailable(&mut self, avail: bool) {
        let _ = avail;
    }
    fn GetType(&mut self) -> *const c_char;
    fn GetFileName(&mut self) -> *const c_char {
        null()
    }
    fn SetFileName(&mut self, newfn: *const c_char) -> bool;

    fn GetSource(&mut self) -> *mut raw::PCM_source {
        null_mut()
    }
    fn SetSource(&mut self, src: *mut raw::PCM_source) {
        let _ = src;
    }
    fn GetNumChannels(&mut self) -> c_int;
    fn GetSampleRate(&mut self) -> f64;
    fn GetLength(&mut self) -> f64;
    fn GetLengthBeats(&mut self) -> f64 {
        -1.0
    }
    fn GetBitsPerSample(&mut self) -> c_int {
        0
    }
    fn GetPreferredPosition(&mut self) -> f64 {
        -1.0
    }

    fn PropertiesWindow(&mut self, hwndParent: raw::HWND) -> c_int;

    fn GetSamples(&mut self, block: *mut raw::PCM_source_transfer_t);
    fn GetPeakInfo(&mut self, block: *mut raw::PCM_source_peaktransfer_t);

    fn SaveState(&mut self, ctx: *mut raw::ProjectStateContext);
    fn LoadState(&mut self, firstline: *const c_char, ctx: *mut raw::ProjectStateContext) -> c_int;

    fn Peaks_Clear(&mut self, deleteFile: bool);
    fn PeaksBuild_Begin(&mut self) -> c_int;
    fn PeaksBuild_Run(&mut self) -> c_int;
    fn PeaksBuild_Finish(&mut self);

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

/// Table of entry points a `PCM_source` host object forwards to.
#[repr(C)]
pub struct PCM_source_callbacks {
    pub Duplicate: unsafe extern "C" fn(callback_target: ForeignHandle) -> *mut raw::PCM_source,
    pub IsAvailable: unsafe extern "C" fn(callback_target: ForeignHandle) -> bool,
    pub SetAvailable: unsafe extern "C" fn(callback_target: ForeignHandle, avail: bool),
    pub GetType: unsafe extern "C" fn(callback_target: ForeignHandle) -> *const c_char,
    pub GetFileName: unsafe extern "C" fn(callback_target: ForeignHandle) -> *const c_char,
    pub SetFileName:
        unsafe extern "C" fn(callback_target: ForeignHandle, newfn: *const c_char) -> bool,
    pub GetSource: unsafe extern "C" fn(callback_target: ForeignHandle) -> *mut raw::PCM_source,
    pub SetSource: unsafe extern "C" fn(callback_target: ForeignHandle, src: *mut raw::PCM_source),
    pub GetNumChannels: unsafe extern "C" fn(callback_target: ForeignHandle) -> c_int,
    pub GetSampleRate: unsafe extern "C" fn(callback_target: ForeignHandle) -> f64,
    pub GetLength: unsafe extern "C" fn(callback_target: ForeignHandle) -> f64,
    pub GetLengthBeats: unsafe extern "C" fn(callback_target: ForeignHandle) -> f64,
    pub GetBitsPerSample: unsafe extern "C" fn(callback_target: ForeignHandle) -> c_int,
    pub GetPreferredPosition: unsafe extern "C" fn(callback_target: ForeignHandle) -> f64,
    pub PropertiesWindow:
        unsafe extern "C" fn(callback_target: ForeignHandle, hwndParent: raw::HWND) -> c_int,
    pub GetSamples: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        block: *mut raw::PCM_source_transfer_t,
    ),
    pub GetPeakInfo: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        block: *mut raw::PCM_source_peaktransfer_t,
    ),
    pub SaveState:
        unsafe extern "C" fn(callback_target: ForeignHandle, ctx: *mut raw::ProjectStateContext),
    pub LoadState: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        firstline: *const c_char,
        ctx: *mut raw::ProjectStateContext,
    ) -> c_int,
    pub Peaks_Clear: unsafe extern "C" fn(callback_target: ForeignHandle, deleteFile: bool),
    pub PeaksBuild_Begin: unsafe extern "C" fn(callback_target: ForeignHandle) -> c_int,
    pub PeaksBuild_Run: unsafe extern "C" fn(callback_target: ForeignHandle) -> c_int,
    pub PeaksBuild_Finish: unsafe extern "C" fn(callback_target: ForeignHandle),
    pub Extended: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

/// Entry points which dispatch to a `Box<dyn PCM_source>`.
pub static RUST_PCM_SOURCE_CALLBACKS: PCM_source_callbacks = PCM_source_callbacks {
    Duplicate: cpp_to_rust_PCM_source_Duplicate,
    IsAvailable: cpp_to_rust_PCM_source_IsAvailable,
    SetAvailable: cpp_to_rust_PCM_source_SetAvailable,
    GetType: cpp_to_rust_PCM_source_GetType,
    GetFileName: cpp_to_rust_PCM_source_GetFileName,
    SetFileName: cpp_to_rust_PCM_source_SetFileName,
    GetSource: cpp_to_rust_PCM_source_GetSource,
    SetSource: cpp_to_rust_PCM_source_SetSource,
    GetNumChannels: cpp_to_rust_PCM_source_GetNumChannels,
    GetSampleRate: cpp_to_rust_PCM_source_GetSampleRate,
    GetLength: cpp_to_rust_PCM_source_GetLength,
    GetLengthBeats: cpp_to_rust_PCM_source_GetLengthBeats,
    GetBitsPerSample: cpp_to_rust_PCM_source_GetBitsPerSample,
    GetPreferredPosition: cpp_to_rust_PCM_source_GetPreferredPosition,
    PropertiesWindow: cpp_to_rust_PCM_source_PropertiesWindow,
    GetSamples: cpp_to_rust_PCM_source_GetSamples,
    GetPeakInfo: cpp_to_rust_PCM_source_GetPeakInfo,
    SaveState: cpp_to_rust_PCM_source_SaveState,
    LoadState: cpp_to_rust_PCM_source_LoadState,
    Peaks_Clear: cpp_to_rust_PCM_source_Peaks_Clear,
    PeaksBuild_Begin: cpp_to_rust_PCM_source_PeaksBuild_Begin,
    PeaksBuild_Run: cpp_to_rust_PCM_source_PeaksBuild_Run,
    PeaksBuild_Finish: cpp_to_rust_PCM_source_PeaksBuild_Finish,
    Extended: cpp_to_rust_PCM_source_Extended,
};

/// Marker binding `PCM_source` to its host object representation.
#[derive(Debug)]
pub enum PcmSourceInterface {}

impl HostInterface for PcmSourceInterface {
    type Raw = raw::PCM_source;
    type Vtable = raw::PCM_source_vtable;
    type Callbacks = PCM_source_callbacks;
    type BaseFields = ();

    fn descriptor() -> &'static InterfaceDescriptor {
        &PCM_SOURCE_DESCRIPTOR
    }

    fn vtable() -> *const raw::PCM_source_vtable {
        host_vtable::VTABLE.vptr()
    }
}

/// Creates a registry for `PCM_source` objects implemented in Rust.
pub fn create_rust_pcm_source_registry(
    mode: RegistryMode,
) -> LifecycleRegistry<PcmSourceInterface> {
    LifecycleRegistry::new(mode, &RUST_PCM_SOURCE_CALLBACKS)
}

/// Creates a `PCM_source` object which REAPER can use like a C++ one and returns a pointer to it.
///
/// This function is provided because Rust structs can't implement C++ virtual base classes.
///
/// # Cleaning up
///
/// In order to avoid memory leaks, you must take care of removing the C++ counterpart
/// PCM source by calling [`delete_cpp_pcm_source()`].
///
/// # Safety
///
/// The registry must have been created with [`create_rust_pcm_source_registry()`]. The callback
/// target must stay alive and in place until the object is unregistered.
///
/// [`delete_cpp_pcm_source()`]: fn.delete_cpp_pcm_source.html
/// [`create_rust_pcm_source_registry()`]: fn.create_rust_pcm_source_registry.html
pub unsafe fn create_cpp_to_rust_pcm_source(
    registry: &LifecycleRegistry<PcmSourceInterface>,
    callback_target: NonNull<Box<dyn PCM_source>>,
) -> Result<NonNull<raw::PCM_source>, RegistryError> {
    registry.register(ForeignHandle::from_thin_ptr(callback_target))
}

/// Creates a `PCM_source` object which is going to be owned by REAPER.
///
/// This is what `Duplicate()` implementations should return. When REAPER deletes the object,
/// `release` is invoked with a thin pointer to the callback target, which is then supposed to be
/// freed.
///
/// # Safety
///
/// See [`create_cpp_to_rust_pcm_source()`].
///
/// [`create_cpp_to_rust_pcm_source()`]: fn.create_cpp_to_rust_pcm_source.html
pub unsafe fn create_reaper_owned_cpp_to_rust_pcm_source(
    registry: &LifecycleRegistry<PcmSourceInterface>,
    callback_target: NonNull<Box<dyn PCM_source>>,
    release: ReleaseFn,
) -> Result<NonNull<raw::PCM_source>, RegistryError> {
    registry.register_with_release(ForeignHandle::from_thin_ptr(callback_target), release)
}

/// Destroys a `PCM_source` object created with [`create_cpp_to_rust_pcm_source()`].
///
/// Returns `false` if it was not registered (anymore).
///
/// # Safety
///
/// REAPER can crash if it still uses the source.
///
/// [`create_cpp_to_rust_pcm_source()`]: fn.create_cpp_to_rust_pcm_source.html
pub unsafe fn delete_cpp_pcm_source(
    registry: &LifecycleRegistry<PcmSourceInterface>,
    source: NonNull<raw::PCM_source>,
) -> bool {
    registry.unregister(source)
}

unsafe fn rust_target<'a>(callback_target: ForeignHandle) -> &'a mut Box<dyn PCM_source> {
    callback_target.callback_target()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_Duplicate(
    callback_target: ForeignHandle,
) -> *mut raw::PCM_source {
    firewall(|| unsafe { rust_target(callback_target) }.Duplicate()).unwrap_or(null_mut())
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_IsAvailable(callback_target: ForeignHandle) -> bool {
    firewall(|| unsafe { rust_target(callback_target) }.IsAvailable()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_SetAvailable(callback_target: ForeignHandle, avail: bool) {
    firewall(|| unsafe { rust_target(callback_target) }.SetAvailable(avail));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetType(callback_target: ForeignHandle) -> *const c_char {
    firewall(|| unsafe { rust_target(callback_target) }.GetType()).unwrap_or(null())
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetFileName(callback_target: ForeignHandle) -> *const c_char {
    firewall(|| unsafe { rust_target(callback_target) }.GetFileName()).unwrap_or(null())
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_SetFileName(
    callback_target: ForeignHandle,
    newfn: *const c_char,
) -> bool {
    firewall(|| unsafe { rust_target(callback_target) }.SetFileName(newfn)).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetSource(
    callback_target: ForeignHandle,
) -> *mut raw::PCM_source {
    firewall(|| unsafe { rust_target(callback_target) }.GetSource()).unwrap_or(null_mut())
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_SetSource(
    callback_target: ForeignHandle,
    src: *mut raw::PCM_source,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetSource(src));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetNumChannels(callback_target: ForeignHandle) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.GetNumChannels()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetSampleRate(callback_target: ForeignHandle) -> f64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetSampleRate()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetLength(callback_target: ForeignHandle) -> f64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetLength()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetLengthBeats(callback_target: ForeignHandle) -> f64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetLengthBeats()).unwrap_or(-1.0)
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetBitsPerSample(callback_target: ForeignHandle) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.GetBitsPerSample()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetPreferredPosition(callback_target: ForeignHandle) -> f64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetPreferredPosition()).unwrap_or(-1.0)
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_PropertiesWindow(
    callback_target: ForeignHandle,
    hwndParent: raw::HWND,
) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.PropertiesWindow(hwndParent))
        .unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetSamples(
    callback_target: ForeignHandle,
    block: *mut raw::PCM_source_transfer_t,
) {
    firewall(|| unsafe { rust_target(callback_target) }.GetSamples(block));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_GetPeakInfo(
    callback_target: ForeignHandle,
    block: *mut raw::PCM_source_peaktransfer_t,
) {
    firewall(|| unsafe { rust_target(callback_target) }.GetPeakInfo(block));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_SaveState(
    callback_target: ForeignHandle,
    ctx: *mut raw::ProjectStateContext,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SaveState(ctx));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_LoadState(
    callback_target: ForeignHandle,
    firstline: *const c_char,
    ctx: *mut raw::ProjectStateContext,
) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.LoadState(firstline, ctx)).unwrap_or(-1)
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_Peaks_Clear(callback_target: ForeignHandle, deleteFile: bool) {
    firewall(|| unsafe { rust_target(callback_target) }.Peaks_Clear(deleteFile));
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_PeaksBuild_Begin(callback_target: ForeignHandle) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.PeaksBuild_Begin()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_PeaksBuild_Run(callback_target: ForeignHandle) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.PeaksBuild_Run()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_PeaksBuild_Finish(callback_target: ForeignHandle) {
    firewall(|| unsafe { rust_target(callback_target) }.PeaksBuild_Finish());
}

#[no_mangle]
extern "C" fn cpp_to_rust_PCM_source_Extended(
    callback_target: ForeignHandle,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.Extended(call, parm1, parm2, parm3))
        .unwrap_or_default()
}

mod host_vtable {
    use super::*;

    type Source = HostObject<PcmSourceInterface>;

    pub(super) static VTABLE: CppVtable<raw::PCM_source_vtable> =
        CppVtable::new(raw::PCM_source_vtable {
            destructor: VirtualDestructor::for_host_object::<PcmSourceInterface>(),
            Duplicate,
            IsAvailable,
            SetAvailable,
            GetType,
            GetFileName,
            SetFileName,
            GetSource,
            SetSource,
            GetNumChannels,
            GetSampleRate,
            GetLength,
            GetLengthBeats,
            GetBitsPerSample,
            GetPreferredPosition,
            PropertiesWindow,
            GetSamples,
            GetPeakInfo,
            SaveState,
            LoadState,
            Peaks_Clear,
            PeaksBuild_Begin,
            PeaksBuild_Run,
            PeaksBuild_Finish,
            Extended,
        });

    unsafe extern "C" fn Duplicate(this: *mut raw::PCM_source) -> *mut raw::PCM_source {
        Source::forward(this, CallPath::Control, null_mut(), |cb, h| (cb.Duplicate)(h))
    }

    unsafe extern "C" fn IsAvailable(this: *mut raw::PCM_source) -> bool {
        Source::forward(this, CallPath::Control, false, |cb, h| (cb.IsAvailable)(h))
    }

    unsafe extern "C" fn SetAvailable(this: *mut raw::PCM_source, avail: bool) {
        Source::forward(this, CallPath::Control, (), |cb, h| (cb.SetAvailable)(h, avail))
    }

    unsafe extern "C" fn GetType(this: *mut raw::PCM_source) -> *const c_char {
        Source::forward(this, CallPath::Control, null(), |cb, h| (cb.GetType)(h))
    }

    unsafe extern "C" fn GetFileName(this: *mut raw::PCM_source) -> *const c_char {
        Source::forward(this, CallPath::Control, null(), |cb, h| (cb.GetFileName)(h))
    }

    unsafe extern "C" fn SetFileName(this: *mut raw::PCM_source, newfn: *const c_char) -> bool {
        Source::forward(this, CallPath::Control, false, |cb, h| (cb.SetFileName)(h, newfn))
    }

    unsafe extern "C" fn GetSource(this: *mut raw::PCM_source) -> *mut raw::PCM_source {
        Source::forward(this, CallPath::Control, null_mut(), |cb, h| (cb.GetSource)(h))
    }

    unsafe extern "C" fn SetSource(this: *mut raw::PCM_source, src: *mut raw::PCM_source) {
        Source::forward(this, CallPath::Control, (), |cb, h| (cb.SetSource)(h, src))
    }

    unsafe extern "C" fn GetNumChannels(this: *mut raw::PCM_source) -> c_int {
        Source::forward(this, CallPath::Control, 0, |cb, h| (cb.GetNumChannels)(h))
    }

    unsafe extern "C" fn GetSampleRate(this: *mut raw::PCM_source) -> f64 {
        Source::forward(this, CallPath::Control, 0.0, |cb, h| (cb.GetSampleRate)(h))
    }

    unsafe extern "C" fn GetLength(this: *mut raw::PCM_source) -> f64 {
        Source::forward(this, CallPath::Control, 0.0, |cb, h| (cb.GetLength)(h))
    }

    unsafe extern "C" fn GetLengthBeats(this: *mut raw::PCM_source) -> f64 {
        Source::forward(this, CallPath::Control, -1.0, |cb, h| (cb.GetLengthBeats)(h))
    }

    unsafe extern "C" fn GetBitsPerSample(this: *mut raw::PCM_source) -> c_int {
        Source::forward(this, CallPath::Control, 0, |cb, h| (cb.GetBitsPerSample)(h))
    }

    unsafe extern "C" fn GetPreferredPosition(this: *mut raw::PCM_source) -> f64 {
        Source::forward(this, CallPath::Control, -1.0, |cb, h| {
            (cb.GetPreferredPosition)(h)
        })
    }

    unsafe extern "C" fn PropertiesWindow(
        this: *mut raw::PCM_source,
        hwndParent: raw::HWND,
    ) -> c_int {
        Source::forward(this, CallPath::Control, 0, |cb, h| {
            (cb.PropertiesWindow)(h, hwndParent)
        })
    }

    unsafe extern "C" fn GetSamples(
        this: *mut raw::PCM_source,
        block: *mut raw::PCM_source_transfer_t,
    ) {
        Source::forward(this, CallPath::RealTime, (), |cb, h| (cb.GetSamples)(h, block))
    }

    unsafe extern "C" fn GetPeakInfo(
        this: *mut raw::PCM_source,
        block: *mut raw::PCM_source_peaktransfer_t,
    ) {
        Source::forward(this, CallPath::RealTime, (), |cb, h| (cb.GetPeakInfo)(h, block))
    }

    unsafe extern "C" fn SaveState(this: *mut raw::PCM_source, ctx: *mut raw::ProjectStateContext) {
        Source::forward(this, CallPath::Control, (), |cb, h| (cb.SaveState)(h, ctx))
    }

    unsafe extern "C" fn LoadState(
        this: *mut raw::PCM_source,
        firstline: *const c_char,
        ctx: *mut raw::ProjectStateContext,
    ) -> c_int {
        Source::forward(this, CallPath::Control, -1, |cb, h| {
            (cb.LoadState)(h, firstline, ctx)
        })
    }

    unsafe extern "C" fn Peaks_Clear(this: *mut raw::PCM_source, deleteFile: bool) {
        Source::forward(this, CallPath::Control, (), |cb, h| (cb.Peaks_Clear)(h, deleteFile))
    }

    unsafe extern "C" fn PeaksBuild_Begin(this: *mut raw::PCM_source) -> c_int {
        Source::forward(this, CallPath::Control, 0, |cb, h| (cb.PeaksBuild_Begin)(h))
    }

    unsafe extern "C" fn PeaksBuild_Run(this: *mut raw::PCM_source) -> c_int {
        Source::forward(this, CallPath::Control, 0, |cb, h| (cb.PeaksBuild_Run)(h))
    }

    unsafe extern "C" fn PeaksBuild_Finish(this: *mut raw::PCM_source) {
        Source::forward(this, CallPath::Control, (), |cb, h| (cb.PeaksBuild_Finish)(h))
    }

    unsafe extern "C" fn Extended(
        this: *mut raw::PCM_source,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        Source::forward(this, CallPath::Control, 0, |cb, h| {
            (cb.Extended)(h, call, parm1, parm2, parm3)
        })
    }
}

use ValueKind::*;

const PTR_VOID: ValueKind = Pointer("void");

pub static PCM_SOURCE_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "PCM_source",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new("Duplicate", Directions::BOTH, &[], Pointer("PCM_source"))
            .nullable(),
        MethodDescriptor::new("IsAvailable", Directions::BOTH, &[], Bool),
        MethodDescriptor::new("SetAvailable", Directions::BOTH, &[Bool], Void),
        MethodDescriptor::new("GetType", Directions::BOTH, &[], Str),
        MethodDescriptor::new("GetFileName", Directions::BOTH, &[], Str).nullable(),
        MethodDescriptor::new("SetFileName", Directions::BOTH, &[Str], Bool),
        MethodDescriptor::new("GetSource", Directions::BOTH, &[], Pointer("PCM_source"))
            .nullable(),
        MethodDescriptor::new("SetSource", Directions::BOTH, &[Pointer("PCM_source")], Void),
        MethodDescriptor::new("GetNumChannels", Directions::BOTH, &[], Int),
        MethodDescriptor::new("GetSampleRate", Directions::BOTH, &[], Double),
        MethodDescriptor::new("GetLength", Directions::BOTH, &[], Double),
        MethodDescriptor::new("GetLengthBeats", Directions::BOTH, &[], Double),
        MethodDescriptor::new("GetBitsPerSample", Directions::BOTH, &[], Int),
        MethodDescriptor::new("GetPreferredPosition", Directions::BOTH, &[], Double),
        MethodDescriptor::new("PropertiesWindow", Directions::BOTH, &[Pointer("HWND")], Int),
        MethodDescriptor::new(
            "GetSamples",
            Directions::BOTH,
            &[Pointer("PCM_source_transfer_t")],
            Void,
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
            "SaveState",
            Directions::BOTH,
            &[Pointer("ProjectStateContext")],
            Void,
        ),
        MethodDescriptor::new(
            "LoadState",
            Directions::BOTH,
            &[Str, Pointer("ProjectStateContext")],
            Int,
        ),
        MethodDescriptor::new("Peaks_Clear", Directions::BOTH, &[Bool], Void),
        MethodDescriptor::new("PeaksBuild_Begin", Directions::BOTH, &[], Int),
        MethodDescriptor::new("PeaksBuild_Run", Directions::BOTH, &[], Int),
        MethodDescriptor::new("PeaksBuild_Finish", Directions::BOTH, &[], Void),
        MethodDescriptor::new(
            "Extended",
            Directions::BOTH,
            &[Int, PTR_VOID, PTR_VOID, PTR_VOID],
            Int,
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static RELEASED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn release_duplicate(handle: ForeignHandle) {
        drop(Box::from_raw(handle.as_ptr() as *mut Box<dyn PCM_source>));
        RELEASED.fetch_add(1, Ordering::SeqCst);
    }

    struct TestSource {
        registry: &'static LifecycleRegistry<PcmSourceInterface>,
        length: f64,
    }

    impl PCM_source for TestSource {
        fn Duplicate(&mut self) -> *mut raw::PCM_source {
            let copy: Box<Box<dyn PCM_source>> = Box::new(Box::new(TestSource {
                registry: self.registry,
                length: self.length,
            }));
            let thin_ptr = NonNull::from(Box::leak(copy));
            unsafe {
                create_reaper_owned_cpp_to_rust_pcm_source(
                    self.registry,
                    thin_ptr,
                    release_duplicate,
                )
            }
            .map(|s| s.as_ptr())
            .unwrap_or(null_mut())
        }
        fn IsAvailable(&mut self) -> bool {
            true
        }
        fn GetType(&mut self) -> *const c_char {
            c_str_macro::c_str!("TEST").as_ptr()
        }
        fn SetFileName(&mut self, _: *const c_char) -> bool {
            false
        }
        fn GetNumChannels(&mut self) -> c_int {
            1
        }
        fn GetSampleRate(&mut self) -> f64 {
            44100.0
        }
        fn GetLength(&mut self) -> f64 {
            self.length
        }
        fn PropertiesWindow(&mut self, _: raw::HWND) -> c_int {
            0
        }
        fn GetSamples(&mut self, _: *mut raw::PCM_source_transfer_t) {}
        fn GetPeakInfo(&mut self, _: *mut raw::PCM_source_peaktransfer_t) {}
        fn SaveState(&mut self, _: *mut raw::ProjectStateContext) {}
        fn LoadState(&mut self, _: *const c_char, _: *mut raw::ProjectStateContext) -> c_int {
            0
        }
        fn Peaks_Clear(&mut self, _: bool) {}
        fn PeaksBuild_Begin(&mut self) -> c_int {
            0
        }
        fn PeaksBuild_Run(&mut self) -> c_int {
            0
        }
        fn PeaksBuild_Finish(&mut self) {}
    }

    #[test]
    fn duplicate_is_owned_by_host() {
        // Given
        let registry: &'static _ = Box::leak(Box::new(create_rust_pcm_source_registry(
            RegistryMode::MultiInstance,
        )));
        let source: Box<dyn PCM_source> = Box::new(TestSource {
            registry,
            length: 4.0,
        });
        let cpp_source =
            unsafe { create_cpp_to_rust_pcm_source(registry, (&source).into()) }.unwrap();
        let cpp_source = unsafe { cpp_source.as_ref() };
        // When
        let duplicate = NonNull::new(cpp_source.Duplicate()).unwrap();
        // Then
        assert_eq!(registry.len(), 2);
        assert_eq!(unsafe { duplicate.as_ref() }.GetLength(), 4.0);
        assert_eq!(unsafe { duplicate.as_ref() }.GetLengthBeats(), -1.0);
        assert_eq!(unsafe { duplicate.as_ref() }.GetPreferredPosition(), -1.0);
        // When REAPER deletes the duplicate
        unsafe { delete_cpp_pcm_source_via_vtable(duplicate) };
        // Then
        assert_eq!(registry.len(), 1);
        assert_eq!(RELEASED.load(Ordering::SeqCst), 1);
        // Owner-initiated removal of the original doesn't invoke any release hook
        assert!(unsafe { delete_cpp_pcm_source(registry, cpp_source.into()) });
        assert!(registry.is_empty());
        assert_eq!(RELEASED.load(Ordering::SeqCst), 1);
    }
}
