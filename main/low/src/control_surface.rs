#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::descriptor::{
    DestructorPlacement, Directions, InterfaceDescriptor, MethodDescriptor, ValueKind,
};
use crate::raw::{self, MediaTrack};
use crate::{
    firewall, CallPath, CppVtable, ForeignHandle, HostInterface, HostObject, LifecycleRegistry,
    RegistryError, RegistryMode, VirtualDestructor,
};
use downcast_rs::Downcast;
use std::fmt::Debug;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{null, NonNull};

impl raw::IReaperControlSurface {
    pub fn GetTypeString(&self) -> *const c_char {
        unsafe { rust_to_cpp_IReaperControlSurface_GetTypeString(self as *const _ as _) }
    }

    pub fn GetDescString(&self) -> *const c_char {
        unsafe { rust_to_cpp_IReaperControlSurface_GetDescString(self as *const _ as _) }
    }

    pub fn GetConfigString(&self) -> *const c_char {
        unsafe { rust_to_cpp_IReaperControlSurface_GetConfigString(self as *const _ as _) }
    }

    pub fn CloseNoReset(&self) {
        unsafe { rust_to_cpp_IReaperControlSurface_CloseNoReset(self as *const _ as _) }
    }

    pub fn Run(&self) {
        unsafe { rust_to_cpp_IReaperControlSurface_Run(self as *const _ as _) }
    }

    pub fn SetTrackListChange(&self) {
        unsafe { rust_to_cpp_IReaperControlSurface_SetTrackListChange(self as *const _ as _) }
    }

    pub fn SetSurfaceVolume(&self, trackid: *mut MediaTrack, volume: f64) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetSurfaceVolume(
                self as *const _ as _,
                trackid,
                volume,
            )
        }
    }

    pub fn SetSurfacePan(&self, trackid: *mut MediaTrack, pan: f64) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetSurfacePan(self as *const _ as _, trackid, pan)
        }
    }

    pub fn SetSurfaceMute(&self, trackid: *mut MediaTrack, mute: bool) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetSurfaceMute(self as *const _ as _, trackid, mute)
        }
    }

    pub fn SetSurfaceSelected(&self, trackid: *mut MediaTrack, selected: bool) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetSurfaceSelected(
                self as *const _ as _,
                trackid,
                selected,
            )
        }
    }

    pub fn SetSurfaceSolo(&self, trackid: *mut MediaTrack, solo: bool) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetSurfaceSolo(self as *const _ as _, trackid, solo)
        }
    }

    pub fn SetSurfaceRecArm(&self, trackid: *mut MediaTrack, recarm: bool) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetSurfaceRecArm(
                self as *const _ as _,
                trackid,
                recarm,
            )
        }
    }

    pub fn SetPlayState(&self, play: bool, pause: bool, rec: bool) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetPlayState(self as *const _ as _, play, pause, rec)
        }
    }

    pub fn SetRepeatState(&self, rep: bool) {
        unsafe { rust_to_cpp_IReaperControlSurface_SetRepeatState(self as *const _ as _, rep) }
    }

    pub fn SetTrackTitle(&self, trackid: *mut MediaTrack, title: *const c_char) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_SetTrackTitle(self as *const _ as _, trackid, title)
        }
    }

    pub fn GetTouchState(&self, trackid: *mut MediaTrack, isPan: c_int) -> bool {
        unsafe {
            rust_to_cpp_IReaperControlSurface_GetTouchState(self as *const _ as _, trackid, isPan)
        }
    }

    pub fn SetAutoMode(&self, mode: c_int) {
        unsafe { rust_to_cpp_IReaperControlSurface_SetAutoMode(self as *const _ as _, mode) }
    }

    pub fn ResetCachedVolPanStates(&self) {
        unsafe { rust_to_cpp_IReaperControlSurface_ResetCachedVolPanStates(self as *const _ as _) }
    }

    pub fn OnTrackSelection(&self, trackid: *mut MediaTrack) {
        unsafe {
            rust_to_cpp_IReaperControlSurface_OnTrackSelection(self as *const _ as _, trackid)
        }
    }

    pub fn IsKeyDown(&self, key: c_int) -> bool {
        unsafe { rust_to_cpp_IReaperControlSurface_IsKeyDown(self as *const _ as _, key) }
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass invalid pointers.
    pub unsafe fn Extended(
        &self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        rust_to_cpp_IReaperControlSurface_Extended(self as *const _ as _, call, parm1, parm2, parm3)
    }
}

// Rust → C++
// ==========

unsafe fn vtable<'a>(
    self_: *mut raw::IReaperControlSurface,
) -> Option<&'a raw::IReaperControlSurface_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_GetTypeString(
    self_: *mut raw::IReaperControlSurface,
) -> *const c_char {
    vtable(self_)
        .map(|vt| (vt.GetTypeString)(self_))
        .unwrap_or(null())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_GetDescString(
    self_: *mut raw::IReaperControlSurface,
) -> *const c_char {
    vtable(self_)
        .map(|vt| (vt.GetDescString)(self_))
        .unwrap_or(null())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_GetConfigString(
    self_: *mut raw::IReaperControlSurface,
) -> *const c_char {
    vtable(self_)
        .map(|vt| (vt.GetConfigString)(self_))
        .unwrap_or(null())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_CloseNoReset(
    self_: *mut raw::IReaperControlSurface,
) {
    if let Some(vt) = vtable(self_) {
        (vt.CloseNoReset)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_Run(
    self_: *mut raw::IReaperControlSurface,
) {
    if let Some(vt) = vtable(self_) {
        (vt.Run)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetTrackListChange(
    self_: *mut raw::IReaperControlSurface,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetTrackListChange)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetSurfaceVolume(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    volume: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetSurfaceVolume)(self_, trackid, volume);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetSurfacePan(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    pan: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetSurfacePan)(self_, trackid, pan);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetSurfaceMute(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    mute: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetSurfaceMute)(self_, trackid, mute);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetSurfaceSelected(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    selected: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetSurfaceSelected)(self_, trackid, selected);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetSurfaceSolo(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    solo: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetSurfaceSolo)(self_, trackid, solo);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetSurfaceRecArm(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    recarm: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetSurfaceRecArm)(self_, trackid, recarm);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetPlayState(
    self_: *mut raw::IReaperControlSurface,
    play: bool,
    pause: bool,
    rec: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetPlayState)(self_, play, pause, rec);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetRepeatState(
    self_: *mut raw::IReaperControlSurface,
    rep: bool,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetRepeatState)(self_, rep);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetTrackTitle(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    title: *const c_char,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetTrackTitle)(self_, trackid, title);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_GetTouchState(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
    isPan: c_int,
) -> bool {
    vtable(self_)
        .map(|vt| (vt.GetTouchState)(self_, trackid, isPan))
        .unwrap_or(false)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_SetAutoMode(
    self_: *mut raw::IReaperControlSurface,
    mode: c_int,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetAutoMode)(self_, mode);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_ResetCachedVolPanStates(
    self_: *mut raw::IReaperControlSurface,
) {
    if let Some(vt) = vtable(self_) {
        (vt.ResetCachedVolPanStates)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_OnTrackSelection(
    self_: *mut raw::IReaperControlSurface,
    trackid: *mut MediaTrack,
) {
    if let Some(vt) = vtable(self_) {
        (vt.OnTrackSelection)(self_, trackid);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_IsKeyDown(
    self_: *mut raw::IReaperControlSurface,
    key: c_int,
) -> bool {
    vtable(self_)
        .map(|vt| (vt.IsKeyDown)(self_, key))
        .unwrap_or(false)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperControlSurface_Extended(
    self_: *mut raw::IReaperControlSurface,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.Extended)(self_, call, parm1, parm2, parm3))
        .unwrap_or_default()
}

/// Destroys a control surface via its virtual destructor, just like C++ `delete surface` would.
///
/// # Safety
///
/// `surface` must be valid and owned by the caller.
pub unsafe fn delete_cpp_control_surface_via_vtable(surface: NonNull<raw::IReaperControlSurface>) {
    if let Some(vt) = vtable(surface.as_ptr()) {
        vt.destructor.delete(surface.as_ptr());
    }
}

// C++ → Rust
// ==========

/// This is the Rust analog to the C++ virtual base class `IReaperControlSurface`.
///
/// An implementation of this trait can be passed to [`create_cpp_to_rust_control_surface()`]. After
/// registering the returned C++ counterpart, REAPER will start invoking the callback methods.
///
/// All methods are called in the main thread. Every method has a default implementation, so you
/// only need to implement the ones you are interested in. In particular, `Extended()` returns 0
/// for all call codes unless overridden, which tells REAPER that the call is not supported.
///
/// # Design
///
/// ## Why do most methods here don't take `&mut self` as parameter?
///
/// Because of reentrancy. A control surface method can cause a change in REAPER which
/// synchronously notifies the same control surface again while the first method is still running.
/// That would be 2 mutable borrows of `self`, which Rust's compiler can't prevent because the call
/// comes from "outside". Without `&mut self`, you are forced to think about this scenario. Use a
/// `RefCell` to mutate state and fail fast (with a panic, which is caught before it reaches
/// REAPER) whenever reentrancy happens, use `try_borrow_mut()` or defer the event handling to the
/// next main loop cycle.
///
/// `Run()` is the exception. REAPER calls it periodically and never reentrantly.
///
/// [`create_cpp_to_rust_control_surface()`]: fn.create_cpp_to_rust_control_surface.html
pub trait IReaperControlSurface: Debug + Downcast {
    fn GetTypeString(&self) -> *const c_char {
        null()
    }

    fn GetDescString(&self) -> *const c_char {
        null()
    }

    fn GetConfigString(&self) -> *const c_char {
        null()
    }

    fn CloseNoReset(&self) {}

    fn Run(&mut self) {}

    fn SetTrackListChange(&self) {}

    fn SetSurfaceVolume(&self, _trackid: *mut MediaTrack, _volume: f64) {}

    fn SetSurfacePan(&self, _trackid: *mut MediaTrack, _pan: f64) {}

    fn SetSurfaceMute(&self, _trackid: *mut MediaTrack, _mute: bool) {}

    fn SetSurfaceSelected(&self, _trackid: *mut MediaTrack, _selected: bool) {}

    fn SetSurfaceSolo(&self, _trackid: *mut MediaTrack, _solo: bool) {}

    fn SetSurfaceRecArm(&self, _trackid: *mut MediaTrack, _recarm: bool) {}

    fn SetPlayState(&self, _play: bool, _pause: bool, _rec: bool) {}

    fn SetRepeatState(&self, _rep: bool) {}

    fn SetTrackTitle(&self, _trackid: *mut MediaTrack, _title: *const c_char) {}

    fn GetTouchState(&self, _trackid: *mut MediaTrack, _isPan: c_int) -> bool {
        false
    }

    fn SetAutoMode(&self, _mode: c_int) {}

    fn ResetCachedVolPanStates(&self) {}

    fn OnTrackSelection(&self, _trackid: *mut MediaTrack) {}

    fn IsKeyDown(&self, _key: c_int) -> bool {
        false
    }

    fn Extended(
        &self,
        _call: c_int,
        _parm1: *mut c_void,
        _parm2: *mut c_void,
        _parm3: *mut c_void,
    ) -> c_int {
        0
    }
}

downcast_rs::impl_downcast!(IReaperControlSurface);

/// Table of entry points an `IReaperControlSurface` host object forwards to.
#[repr(C)]
pub struct IReaperControlSurface_callbacks {
    pub GetTypeString: unsafe extern "C" fn(callback_target: ForeignHandle) -> *const c_char,
    pub GetDescString: unsafe extern "C" fn(callback_target: ForeignHandle) -> *const c_char,
    pub GetConfigString: unsafe extern "C" fn(callback_target: ForeignHandle) -> *const c_char,
    pub CloseNoReset: unsafe extern "C" fn(callback_target: ForeignHandle),
    pub Run: unsafe extern "C" fn(callback_target: ForeignHandle),
    pub SetTrackListChange: unsafe extern "C" fn(callback_target: ForeignHandle),
    pub SetSurfaceVolume:
        unsafe extern "C" fn(callback_target: ForeignHandle, trackid: *mut MediaTrack, volume: f64),
    pub SetSurfacePan:
        unsafe extern "C" fn(callback_target: ForeignHandle, trackid: *mut MediaTrack, pan: f64),
    pub SetSurfaceMute:
        unsafe extern "C" fn(callback_target: ForeignHandle, trackid: *mut MediaTrack, mute: bool),
    pub SetSurfaceSelected: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        trackid: *mut MediaTrack,
        selected: bool,
    ),
    pub SetSurfaceSolo:
        unsafe extern "C" fn(callback_target: ForeignHandle, trackid: *mut MediaTrack, solo: bool),
    pub SetSurfaceRecArm: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        trackid: *mut MediaTrack,
        recarm: bool,
    ),
    pub SetPlayState:
        unsafe extern "C" fn(callback_target: ForeignHandle, play: bool, pause: bool, rec: bool),
    pub SetRepeatState: unsafe extern "C" fn(callback_target: ForeignHandle, rep: bool),
    pub SetTrackTitle: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        trackid: *mut MediaTrack,
        title: *const c_char,
    ),
    pub GetTouchState: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        trackid: *mut MediaTrack,
        isPan: c_int,
    ) -> bool,
    pub SetAutoMode: unsafe extern "C" fn(callback_target: ForeignHandle, mode: c_int),
    pub ResetCachedVolPanStates: unsafe extern "C" fn(callback_target: ForeignHandle),
    pub OnTrackSelection:
        unsafe extern "C" fn(callback_target: ForeignHandle, trackid: *mut MediaTrack),
    pub IsKeyDown: unsafe extern "C" fn(callback_target: ForeignHandle, key: c_int) -> bool,
    pub Extended: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int,
}

/// Entry points which dispatch to a `Box<dyn IReaperControlSurface>`.
pub static RUST_CONTROL_SURFACE_CALLBACKS: IReaperControlSurface_callbacks =
    IReaperControlSurface_callbacks {
        GetTypeString: cpp_to_rust_IReaperControlSurface_GetTypeString,
        GetDescString: cpp_to_rust_IReaperControlSurface_GetDescString,
        GetConfigString: cpp_to_rust_IReaperControlSurface_GetConfigString,
        CloseNoReset: cpp_to_rust_IReaperControlSurface_CloseNoReset,
        Run: cpp_to_rust_IReaperControlSurface_Run,
        SetTrackListChange: cpp_to_rust_IReaperControlSurface_SetTrackListChange,
        SetSurfaceVolume: cpp_to_rust_IReaperControlSurface_SetSurfaceVolume,
        SetSurfacePan: cpp_to_rust_IReaperControlSurface_SetSurfacePan,
        SetSurfaceMute: cpp_to_rust_IReaperControlSurface_SetSurfaceMute,
        SetSurfaceSelected: cpp_to_rust_IReaperControlSurface_SetSurfaceSelected,
        SetSurfaceSolo: cpp_to_rust_IReaperControlSurface_SetSurfaceSolo,
        SetSurfaceRecArm: cpp_to_rust_IReaperControlSurface_SetSurfaceRecArm,
        SetPlayState: cpp_to_rust_IReaperControlSurface_SetPlayState,
        SetRepeatState: cpp_to_rust_IReaperControlSurface_SetRepeatState,
        SetTrackTitle: cpp_to_rust_IReaperControlSurface_SetTrackTitle,
        GetTouchState: cpp_to_rust_IReaperControlSurface_GetTouchState,
        SetAutoMode: cpp_to_rust_IReaperControlSurface_SetAutoMode,
        ResetCachedVolPanStates: cpp_to_rust_IReaperControlSurface_ResetCachedVolPanStates,
        OnTrackSelection: cpp_to_rust_IReaperControlSurface_OnTrackSelection,
        IsKeyDown: cpp_to_rust_IReaperControlSurface_IsKeyDown,
        Extended: cpp_to_rust_IReaperControlSurface_Extended,
    };

/// Marker binding `IReaperControlSurface` to its host object representation.
#[derive(Debug)]
pub enum ControlSurfaceInterface {}

impl HostInterface for ControlSurfaceInterface {
    type Raw = raw::IReaperControlSurface;
    type Vtable = raw::IReaperControlSurface_vtable;
    type Callbacks = IReaperControlSurface_callbacks;
    type BaseFields = ();

    fn descriptor() -> &'static InterfaceDescriptor {
        &CONTROL_SURFACE_DESCRIPTOR
    }

    fn vtable() -> *const raw::IReaperControlSurface_vtable {
        host_vtable::VTABLE.vptr()
    }
}

/// Creates a registry for control surfaces implemented in Rust.
///
/// Use [`RegistryMode::SingleSlot`] if the plug-in registers at most one control surface.
pub fn create_rust_control_surface_registry(
    mode: RegistryMode,
) -> LifecycleRegistry<ControlSurfaceInterface> {
    LifecycleRegistry::new(mode, &RUST_CONTROL_SURFACE_CALLBACKS)
}

/// Creates an `IReaperControlSurface` object which REAPER can use like a C++ one and returns a
/// pointer to it.
///
/// This function is provided because `plugin_register()` isn't going to work if you just pass it
/// a Rust struct as in `plugin_register("csurf_inst", my_rust_struct)`. Rust structs can't
/// implement C++ virtual base classes.
///
/// **This function doesn't yet register the control surface!** The usual REAPER C++ way to register
/// a control surface still applies. You need to pass the resulting pointer to `plugin_register()`.
///
/// # Example
///
/// ```no_run
/// use reaper_abi_low::{
///     create_cpp_to_rust_control_surface, create_rust_control_surface_registry,
///     delete_cpp_control_surface, IReaperControlSurface, RegistryMode,
/// };
/// use std::ptr::NonNull;
///
/// #[derive(Debug)]
/// struct MyControlSurface;
/// impl IReaperControlSurface for MyControlSurface {
///     fn SetTrackListChange(&self) {
///         println!("Tracks changed");
///     }
/// }
///
/// let registry = create_rust_control_surface_registry(RegistryMode::SingleSlot);
/// let rust_cs: Box<dyn IReaperControlSurface> = Box::new(MyControlSurface);
/// let thin_ptr_to_rust_cs: NonNull<_> = (&rust_cs).into();
/// unsafe {
///     let cpp_cs = create_cpp_to_rust_control_surface(&registry, thin_ptr_to_rust_cs).unwrap();
///     // plugin_register("csurf_inst", cpp_cs) ... plugin_register("-csurf_inst", cpp_cs)
///     delete_cpp_control_surface(&registry, cpp_cs);
/// }
/// ```
///
/// # Cleaning up
///
/// If you register a control surface, you also must take care of unregistering it at
/// the end. This is especially important for VST plug-ins because they live shorter than a REAPER
/// session! **If you don't unregister the control surface before the VST plug-in is destroyed,
/// REAPER will crash** because it will attempt to invoke functions which are not loaded anymore.
///
/// In order to avoid memory leaks, you also must take care of removing the C++ counterpart
/// surface by calling [`delete_cpp_control_surface()`].
///
/// # Errors
///
/// Fails if the callback target is registered already or if the registry is a single-slot
/// registry which is occupied.
///
/// # Safety
///
/// The callback target must stay alive and in place until the object is unregistered.
///
/// [`delete_cpp_control_surface()`]: fn.delete_cpp_control_surface.html
pub unsafe fn create_cpp_to_rust_control_surface(
    registry: &LifecycleRegistry<ControlSurfaceInterface>,
    callback_target: NonNull<Box<dyn IReaperControlSurface>>,
) -> Result<NonNull<raw::IReaperControlSurface>, RegistryError> {
    registry.register(ForeignHandle::from_thin_ptr(callback_target))
}

/// Destroys a C++ `IReaperControlSurface` object created with
/// [`create_cpp_to_rust_control_surface()`].
///
/// Returns `false` if it was not registered (anymore).
///
/// # Safety
///
/// REAPER can crash if the surface is still registered with REAPER.
///
/// [`create_cpp_to_rust_control_surface()`]: fn.create_cpp_to_rust_control_surface.html
pub unsafe fn delete_cpp_control_surface(
    registry: &LifecycleRegistry<ControlSurfaceInterface>,
    surface: NonNull<raw::IReaperControlSurface>,
) -> bool {
    registry.unregister(surface)
}

unsafe fn rust_target<'a>(
    callback_target: ForeignHandle,
) -> &'a mut Box<dyn IReaperControlSurface> {
    callback_target.callback_target()
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_GetTypeString(
    callback_target: ForeignHandle,
) -> *const c_char {
    firewall(|| unsafe { rust_target(callback_target) }.GetTypeString()).unwrap_or(null())
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_GetDescString(
    callback_target: ForeignHandle,
) -> *const c_char {
    firewall(|| unsafe { rust_target(callback_target) }.GetDescString()).unwrap_or(null())
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_GetConfigString(
    callback_target: ForeignHandle,
) -> *const c_char {
    firewall(|| unsafe { rust_target(callback_target) }.GetConfigString()).unwrap_or(null())
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_CloseNoReset(callback_target: ForeignHandle) {
    firewall(|| unsafe { rust_target(callback_target) }.CloseNoReset());
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_Run(callback_target: ForeignHandle) {
    firewall(|| unsafe { rust_target(callback_target) }.Run());
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetTrackListChange(
    callback_target: ForeignHandle,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetTrackListChange());
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetSurfaceVolume(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    volume: f64,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetSurfaceVolume(trackid, volume));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetSurfacePan(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    pan: f64,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetSurfacePan(trackid, pan));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetSurfaceMute(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    mute: bool,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetSurfaceMute(trackid, mute));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetSurfaceSelected(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    selected: bool,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetSurfaceSelected(trackid, selected));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetSurfaceSolo(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    solo: bool,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetSurfaceSolo(trackid, solo));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetSurfaceRecArm(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    recarm: bool,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetSurfaceRecArm(trackid, recarm));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetPlayState(
    callback_target: ForeignHandle,
    play: bool,
    pause: bool,
    rec: bool,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetPlayState(play, pause, rec));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetRepeatState(
    callback_target: ForeignHandle,
    rep: bool,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetRepeatState(rep));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetTrackTitle(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    title: *const c_char,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetTrackTitle(trackid, title));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_GetTouchState(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
    isPan: c_int,
) -> bool {
    firewall(|| unsafe { rust_target(callback_target) }.GetTouchState(trackid, isPan))
        .unwrap_or(false)
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_SetAutoMode(
    callback_target: ForeignHandle,
    mode: c_int,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetAutoMode(mode));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_ResetCachedVolPanStates(
    callback_target: ForeignHandle,
) {
    firewall(|| unsafe { rust_target(callback_target) }.ResetCachedVolPanStates());
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_OnTrackSelection(
    callback_target: ForeignHandle,
    trackid: *mut MediaTrack,
) {
    firewall(|| unsafe { rust_target(callback_target) }.OnTrackSelection(trackid));
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_IsKeyDown(
    callback_target: ForeignHandle,
    key: c_int,
) -> bool {
    firewall(|| unsafe { rust_target(callback_target) }.IsKeyDown(key)).unwrap_or(false)
}

#[no_mangle]
extern "C" fn cpp_to_rust_IReaperControlSurface_Extended(
    callback_target: ForeignHandle,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.Extended(call, parm1, parm2, parm3))
        .unwrap_or(0)
}

mod host_vtable {
    use super::*;

    type Surface = HostObject<ControlSurfaceInterface>;
    type Raw = raw::IReaperControlSurface;

    pub(super) static VTABLE: CppVtable<raw::IReaperControlSurface_vtable> =
        CppVtable::new(raw::IReaperControlSurface_vtable {
            destructor: VirtualDestructor::for_host_object::<ControlSurfaceInterface>(),
            GetTypeString,
            GetDescString,
            GetConfigString,
            CloseNoReset,
            Run,
            SetTrackListChange,
            SetSurfaceVolume,
            SetSurfacePan,
            SetSurfaceMute,
            SetSurfaceSelected,
            SetSurfaceSolo,
            SetSurfaceRecArm,
            SetPlayState,
            SetRepeatState,
            SetTrackTitle,
            GetTouchState,
            SetAutoMode,
            ResetCachedVolPanStates,
            OnTrackSelection,
            IsKeyDown,
            Extended,
        });

    unsafe extern "C" fn GetTypeString(this: *mut Raw) -> *const c_char {
        Surface::forward(this, CallPath::Control, null(), |cb, h| (cb.GetTypeString)(h))
    }

    unsafe extern "C" fn GetDescString(this: *mut Raw) -> *const c_char {
        Surface::forward(this, CallPath::Control, null(), |cb, h| (cb.GetDescString)(h))
    }

    unsafe extern "C" fn GetConfigString(this: *mut Raw) -> *const c_char {
        Surface::forward(this, CallPath::Control, null(), |cb, h| (cb.GetConfigString)(h))
    }

    unsafe extern "C" fn CloseNoReset(this: *mut Raw) {
        Surface::forward(this, CallPath::Control, (), |cb, h| (cb.CloseNoReset)(h))
    }

    unsafe extern "C" fn Run(this: *mut Raw) {
        Surface::forward(this, CallPath::Control, (), |cb, h| (cb.Run)(h))
    }

    unsafe extern "C" fn SetTrackListChange(this: *mut Raw) {
        Surface::forward(this, CallPath::Control, (), |cb, h| (cb.SetTrackListChange)(h))
    }

    unsafe extern "C" fn SetSurfaceVolume(this: *mut Raw, trackid: *mut MediaTrack, volume: f64) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetSurfaceVolume)(h, trackid, volume)
        })
    }

    unsafe extern "C" fn SetSurfacePan(this: *mut Raw, trackid: *mut MediaTrack, pan: f64) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetSurfacePan)(h, trackid, pan)
        })
    }

    unsafe extern "C" fn SetSurfaceMute(this: *mut Raw, trackid: *mut MediaTrack, mute: bool) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetSurfaceMute)(h, trackid, mute)
        })
    }

    unsafe extern "C" fn SetSurfaceSelected(
        this: *mut Raw,
        trackid: *mut MediaTrack,
        selected: bool,
    ) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetSurfaceSelected)(h, trackid, selected)
        })
    }

    unsafe extern "C" fn SetSurfaceSolo(this: *mut Raw, trackid: *mut MediaTrack, solo: bool) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetSurfaceSolo)(h, trackid, solo)
        })
    }

    unsafe extern "C" fn SetSurfaceRecArm(this: *mut Raw, trackid: *mut MediaTrack, recarm: bool) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetSurfaceRecArm)(h, trackid, recarm)
        })
    }

    unsafe extern "C" fn SetPlayState(this: *mut Raw, play: bool, pause: bool, rec: bool) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetPlayState)(h, play, pause, rec)
        })
    }

    unsafe extern "C" fn SetRepeatState(this: *mut Raw, rep: bool) {
        Surface::forward(this, CallPath::Control, (), |cb, h| (cb.SetRepeatState)(h, rep))
    }

    unsafe extern "C" fn SetTrackTitle(
        this: *mut Raw,
        trackid: *mut MediaTrack,
        title: *const c_char,
    ) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.SetTrackTitle)(h, trackid, title)
        })
    }

    unsafe extern "C" fn GetTouchState(
        this: *mut Raw,
        trackid: *mut MediaTrack,
        isPan: c_int,
    ) -> bool {
        Surface::forward(this, CallPath::Control, false, |cb, h| {
            (cb.GetTouchState)(h, trackid, isPan)
        })
    }

    unsafe extern "C" fn SetAutoMode(this: *mut Raw, mode: c_int) {
        Surface::forward(this, CallPath::Control, (), |cb, h| (cb.SetAutoMode)(h, mode))
    }

    unsafe extern "C" fn ResetCachedVolPanStates(this: *mut Raw) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.ResetCachedVolPanStates)(h)
        })
    }

    unsafe extern "C" fn OnTrackSelection(this: *mut Raw, trackid: *mut MediaTrack) {
        Surface::forward(this, CallPath::Control, (), |cb, h| {
            (cb.OnTrackSelection)(h, trackid)
        })
    }

    unsafe extern "C" fn IsKeyDown(this: *mut Raw, key: c_int) -> bool {
        Surface::forward(this, CallPath::Control, false, |cb, h| (cb.IsKeyDown)(h, key))
    }

    unsafe extern "C" fn Extended(
        this: *mut Raw,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        Surface::forward(this, CallPath::Control, 0, |cb, h| {
            (cb.Extended)(h, call, parm1, parm2, parm3)
        })
    }
}

use ValueKind::*;

pub static CONTROL_SURFACE_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "IReaperControlSurface",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new("GetTypeString", Directions::BOTH, &[], Str).nullable(),
        MethodDescriptor::new("GetDescString", Directions::BOTH, &[], Str).nullable(),
        MethodDescriptor::new("GetConfigString", Directions::BOTH, &[], Str).nullable(),
        MethodDescriptor::new("CloseNoReset", Directions::BOTH, &[], Void),
        MethodDescriptor::new("Run", Directions::BOTH, &[], Void),
        MethodDescriptor::new("SetTrackListChange", Directions::BOTH, &[], Void),
        MethodDescriptor::new(
            "SetSurfaceVolume",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Double],
            Void,
        ),
        MethodDescriptor::new(
            "SetSurfacePan",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Double],
            Void,
        ),
        MethodDescriptor::new(
            "SetSurfaceMute",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Bool],
            Void,
        ),
        MethodDescriptor::new(
            "SetSurfaceSelected",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Bool],
            Void,
        ),
        MethodDescriptor::new(
            "SetSurfaceSolo",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Bool],
            Void,
        ),
        MethodDescriptor::new(
            "SetSurfaceRecArm",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Bool],
            Void,
        ),
        MethodDescriptor::new("SetPlayState", Directions::BOTH, &[Bool, Bool, Bool], Void),
        MethodDescriptor::new("SetRepeatState", Directions::BOTH, &[Bool], Void),
        MethodDescriptor::new(
            "SetTrackTitle",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Str],
            Void,
        ),
        MethodDescriptor::new(
            "GetTouchState",
            Directions::BOTH,
            &[Pointer("MediaTrack"), Int],
            Bool,
        ),
        MethodDescriptor::new("SetAutoMode", Directions::BOTH, &[Int], Void),
        MethodDescriptor::new("ResetCachedVolPanStates", Directions::BOTH, &[], Void),
        MethodDescriptor::new(
            "OnTrackSelection",
            Directions::BOTH,
            &[Pointer("MediaTrack")],
            Void,
        ),
        MethodDescriptor::new("IsKeyDown", Directions::BOTH, &[Int], Bool),
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
    use c_str_macro::c_str;
    use std::cell::{Cell, RefCell};
    use std::ptr::null_mut;

    #[derive(Debug, Default)]
    struct RecordingSurface {
        volumes: RefCell<Vec<f64>>,
        run_count: u32,
        metronome: Cell<bool>,
    }

    impl IReaperControlSurface for RecordingSurface {
        fn GetTypeString(&self) -> *const c_char {
            c_str!("RECORDING").as_ptr()
        }

        fn Run(&mut self) {
            self.run_count += 1;
        }

        fn SetSurfaceVolume(&self, _trackid: *mut MediaTrack, volume: f64) {
            self.volumes.borrow_mut().push(volume);
        }

        fn Extended(
            &self,
            call: c_int,
            parm1: *mut c_void,
            _parm2: *mut c_void,
            _parm3: *mut c_void,
        ) -> c_int {
            match call {
                raw::CSURF_EXT_SETMETRONOME => {
                    self.metronome.set(!parm1.is_null());
                    1
                }
                _ => 0,
            }
        }
    }

    #[test]
    fn forwards_calls_to_rust_implementation() {
        // Given
        let surface: Box<dyn IReaperControlSurface> = Box::new(RecordingSurface::default());
        let registry = create_rust_control_surface_registry(RegistryMode::SingleSlot);
        let cpp_surface =
            unsafe { create_cpp_to_rust_control_surface(&registry, (&surface).into()) }.unwrap();
        let cpp = unsafe { cpp_surface.as_ref() };
        // When
        cpp.SetSurfaceVolume(null_mut(), 0.5);
        cpp.SetSurfaceVolume(null_mut(), 0.25);
        cpp.Run();
        cpp.Run();
        let mut enabled = 1;
        let metronome_result = unsafe {
            cpp.Extended(
                raw::CSURF_EXT_SETMETRONOME,
                &mut enabled as *mut c_int as _,
                null_mut(),
                null_mut(),
            )
        };
        let unknown_result =
            unsafe { cpp.Extended(0x7FFF_0000, null_mut(), null_mut(), null_mut()) };
        // Then
        let type_string = unsafe { std::ffi::CStr::from_ptr(cpp.GetTypeString()) };
        assert_eq!(type_string.to_str().unwrap(), "RECORDING");
        assert!(cpp.GetDescString().is_null());
        assert!(!cpp.IsKeyDown(0x10));
        assert_eq!(metronome_result, 1);
        assert_eq!(unknown_result, 0);
        let recording = surface.downcast_ref::<RecordingSurface>().unwrap();
        assert_eq!(*recording.volumes.borrow(), vec![0.5, 0.25]);
        assert_eq!(recording.run_count, 2);
        assert!(recording.metronome.get());
        assert!(unsafe { delete_cpp_control_surface(&registry, cpp_surface) });
    }

    #[test]
    fn default_extended_returns_zero_for_all_codes() {
        #[derive(Debug)]
        struct Silent;
        impl IReaperControlSurface for Silent {}
        let surface: Box<dyn IReaperControlSurface> = Box::new(Silent);
        let registry = create_rust_control_surface_registry(RegistryMode::MultiInstance);
        let cpp_surface =
            unsafe { create_cpp_to_rust_control_surface(&registry, (&surface).into()) }.unwrap();
        let cpp = unsafe { cpp_surface.as_ref() };
        for code in [
            raw::CSURF_EXT_RESET,
            raw::CSURF_EXT_SETFXPARAM,
            raw::CSURF_EXT_SETBPMANDPLAYRATE,
            0,
            -1,
        ] {
            assert_eq!(unsafe { cpp.Extended(code, null_mut(), null_mut(), null_mut()) }, 0);
        }
        assert!(unsafe { delete_cpp_control_surface(&registry, cpp_surface) });
    }

    #[test]
    fn destructor_called_by_reaper_removes_registration() {
        #[derive(Debug)]
        struct Silent;
        impl IReaperControlSurface for Silent {}
        let surface: Box<dyn IReaperControlSurface> = Box::new(Silent);
        let registry = create_rust_control_surface_registry(RegistryMode::SingleSlot);
        let cpp_surface =
            unsafe { create_cpp_to_rust_control_surface(&registry, (&surface).into()) }.unwrap();
        assert_eq!(registry.len(), 1);
        unsafe { delete_cpp_control_surface_via_vtable(cpp_surface) };
        assert!(registry.is_empty());
        // The slot is free again.
        let cpp_surface =
            unsafe { create_cpp_to_rust_control_surface(&registry, (&surface).into()) }.unwrap();
        assert!(unsafe { delete_cpp_control_surface(&registry, cpp_surface) });
    }
}
