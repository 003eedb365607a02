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
use c_str_macro::c_str;
use std::os::raw::{c_char, c_int};
use std::ptr::NonNull;

impl raw::ProjectStateContext {
    /// Adds a line which is taken verbatim, no format directives are interpreted.
    ///
    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn AddLine(&mut self, line: *const c_char) {
        rust_to_cpp_ProjectStateContext_AddLine(self as *const _ as _, line);
    }

    /// Returns 0 on success and -1 if there are no more lines.
    ///
    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn GetLine(&mut self, buf: *mut c_char, buflen: c_int) -> c_int {
        rust_to_cpp_ProjectStateContext_GetLine(self as *const _ as _, buf, buflen)
    }

    pub fn GetOutputSize(&mut self) -> raw::INT64 {
        unsafe { rust_to_cpp_ProjectStateContext_GetOutputSize(self as *const _ as _) }
    }

    pub fn GetTempFlag(&mut self) -> c_int {
        unsafe { rust_to_cpp_ProjectStateContext_GetTempFlag(self as *const _ as _) }
    }

    pub fn SetTempFlag(&mut self, flag: c_int) {
        unsafe { rust_to_cpp_ProjectStateContext_SetTempFlag(self as *const _ as _, flag) }
    }
}

// Rust → C++
// ==========

unsafe fn vtable<'a>(
    self_: *mut raw::ProjectStateContext,
) -> Option<&'a raw::ProjectStateContext_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

/// Passes the line through `"%s"`, so that `%` characters in it are not interpreted.
#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_ProjectStateContext_AddLine(
    self_: *mut raw::ProjectStateContext,
    line: *const c_char,
) {
    if line.is_null() {
        return;
    }
    if let Some(vt) = vtable(self_) {
        (vt.AddLine)(self_, c_str!("%s").as_ptr(), line);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_ProjectStateContext_GetLine(
    self_: *mut raw::ProjectStateContext,
    buf: *mut c_char,
    buflen: c_int,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.GetLine)(self_, buf, buflen))
        .unwrap_or(-1)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_ProjectStateContext_GetOutputSize(
    self_: *mut raw::ProjectStateContext,
) -> raw::INT64 {
    vtable(self_).map(|vt| (vt.GetOutputSize)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_ProjectStateContext_GetTempFlag(
    self_: *mut raw::ProjectStateContext,
) -> c_int {
    vtable(self_).map(|vt| (vt.GetTempFlag)(self_)).unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_ProjectStateContext_SetTempFlag(
    self_: *mut raw::ProjectStateContext,
    flag: c_int,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetTempFlag)(self_, flag);
    }
}

/// Destroys a `ProjectStateContext` via its virtual destructor, just like C++ `delete ctx` would.
///
/// # Safety
///
/// `context` must be valid and owned by the caller.
pub unsafe fn delete_cpp_project_state_context_via_vtable(
    context: NonNull<raw::ProjectStateContext>,
) {
    if let Some(vt) = vtable(context.as_ptr()) {
        vt.destructor.delete(context.as_ptr());
    }
}

// C++ → Rust
// ==========

/// This is the Rust analog to the C++ virtual base class `ProjectStateContext`.
///
/// An implementation of this trait can be passed to [`create_cpp_to_rust_project_state_context()`].
///
/// `AddLine()` receives the completely rendered line. REAPER's printf-style format string and
/// arguments have already been resolved at that point.
///
/// [`create_cpp_to_rust_project_state_context()`]: fn.create_cpp_to_rust_project_state_context.html
pub trait ProjectStateContext {
    fn AddLine(&mut self, line: *const c_char);
    fn GetLine(&mut self, buf: *mut c_char, buflen: c_int) -> c_int;
    fn GetOutputSize(&mut self) -> raw::INT64;
    fn GetTempFlag(&mut self) -> c_int;
    fn SetTempFlag(&mut self, flag: c_int);
}

/// Table of entry points a `ProjectStateContext` host object forwards to.
#[repr(C)]
pub struct ProjectStateContext_callbacks {
    /// Receives the rendered line.
    pub AddLine: unsafe extern "C" fn(callback_target: ForeignHandle, line: *const c_char),
    pub GetLine: unsafe extern "C" fn(
        callback_target: ForeignHandle,
        buf: *mut c_char,
        buflen: c_int,
    ) -> c_int,
    pub GetOutputSize: unsafe extern "C" fn(callback_target: ForeignHandle) -> raw::INT64,
    pub GetTempFlag: unsafe extern "C" fn(callback_target: ForeignHandle) -> c_int,
    pub SetTempFlag: unsafe extern "C" fn(callback_target: ForeignHandle, flag: c_int),
}

/// Entry points which dispatch to a `Box<dyn ProjectStateContext>`.
pub static RUST_PROJECT_STATE_CONTEXT_CALLBACKS: ProjectStateContext_callbacks =
    ProjectStateContext_callbacks {
        AddLine: cpp_to_rust_ProjectStateContext_AddLine,
        GetLine: cpp_to_rust_ProjectStateContext_GetLine,
        GetOutputSize: cpp_to_rust_ProjectStateContext_GetOutputSize,
        GetTempFlag: cpp_to_rust_ProjectStateContext_GetTempFlag,
        SetTempFlag: cpp_to_rust_ProjectStateContext_SetTempFlag,
    };

/// Marker binding `ProjectStateContext` to its host object representation.
#[derive(Debug)]
pub enum ProjectStateContextInterface {}

impl HostInterface for ProjectStateContextInterface {
    type Raw = raw::ProjectStateContext;
    type Vtable = raw::ProjectStateContext_vtable;
    type Callbacks = ProjectStateContext_callbacks;
    type BaseFields = ();

    fn descriptor() -> &'static InterfaceDescriptor {
        &PROJECT_STATE_CONTEXT_DESCRIPTOR
    }

    fn vtable() -> *const raw::ProjectStateContext_vtable {
        host_vtable::VTABLE.vptr()
    }
}

/// Creates a registry for `ProjectStateContext` objects implemented in Rust.
pub fn create_rust_project_state_context_registry(
    mode: RegistryMode,
) -> LifecycleRegistry<ProjectStateContextInterface> {
    LifecycleRegistry::new(mode, &RUST_PROJECT_STATE_CONTEXT_CALLBACKS)
}

/// Creates a `ProjectStateContext` object which REAPER can use like a C++ one and returns a
/// pointer to it.
///
/// This function is provided because Rust structs can't implement C++ virtual base classes.
///
/// # Cleaning up
///
/// In order to avoid memory leaks, you must take care of removing the C++ counterpart
/// context by calling [`delete_cpp_project_state_context()`].
///
/// # Safety
///
/// The registry must have been created with [`create_rust_project_state_context_registry()`].
/// The callback target must stay alive and in place until the object is unregistered.
pub unsafe fn create_cpp_to_rust_project_state_context(
    registry: &LifecycleRegistry<ProjectStateContextInterface>,
    callback_target: NonNull<Box<dyn ProjectStateContext>>,
) -> Result<NonNull<raw::ProjectStateContext>, RegistryError> {
    registry.register(ForeignHandle::from_thin_ptr(callback_target))
}

/// Destroys a `ProjectStateContext` object created with
/// [`create_cpp_to_rust_project_state_context()`].
///
/// # Safety
///
/// REAPER can crash if it still uses the context.
///
/// [`create_cpp_to_rust_project_state_context()`]: fn.create_cpp_to_rust_project_state_context.html
pub unsafe fn delete_cpp_project_state_context(
    registry: &LifecycleRegistry<ProjectStateContextInterface>,
    context: NonNull<raw::ProjectStateContext>,
) -> bool {
    registry.unregister(context)
}

unsafe fn rust_target<'a>(callback_target: ForeignHandle) -> &'a mut Box<dyn ProjectStateContext> {
    callback_target.callback_target()
}

#[no_mangle]
extern "C" fn cpp_to_rust_ProjectStateContext_AddLine(
    callback_target: ForeignHandle,
    line: *const c_char,
) {
    firewall(|| unsafe { rust_target(callback_target) }.AddLine(line));
}

#[no_mangle]
extern "C" fn cpp_to_rust_ProjectStateContext_GetLine(
    callback_target: ForeignHandle,
    buf: *mut c_char,
    buflen: c_int,
) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.GetLine(buf, buflen)).unwrap_or(-1)
}

#[no_mangle]
extern "C" fn cpp_to_rust_ProjectStateContext_GetOutputSize(
    callback_target: ForeignHandle,
) -> raw::INT64 {
    firewall(|| unsafe { rust_target(callback_target) }.GetOutputSize()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_ProjectStateContext_GetTempFlag(callback_target: ForeignHandle) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.GetTempFlag()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_ProjectStateContext_SetTempFlag(
    callback_target: ForeignHandle,
    flag: c_int,
) {
    firewall(|| unsafe { rust_target(callback_target) }.SetTempFlag(flag));
}

/// Called by the C implementation of the variadic `AddLine()` slot with the rendered line.
#[no_mangle]
unsafe extern "C" fn reaper_abi_ProjectStateContext_AddLine_rendered(
    this: *mut raw::ProjectStateContext,
    line: *const c_char,
) {
    HostObject::<ProjectStateContextInterface>::forward(this, CallPath::Control, (), |cb, h| {
        (cb.AddLine)(h, line)
    })
}

extern "C" {
    /// Implemented in `project_state_context.c`.
    fn reaper_abi_ProjectStateContext_AddLine(
        this: *mut raw::ProjectStateContext,
        fmt: *const c_char,
        ...
    );
}

mod host_vtable {
    use super::*;

    type Context = HostObject<ProjectStateContextInterface>;

    pub(super) static VTABLE: CppVtable<raw::ProjectStateContext_vtable> =
        CppVtable::new(raw::ProjectStateContext_vtable {
            destructor: VirtualDestructor::for_host_object::<ProjectStateContextInterface>(),
            AddLine: reaper_abi_ProjectStateContext_AddLine,
            GetLine,
            GetOutputSize,
            GetTempFlag,
            SetTempFlag,
        });

    unsafe extern "C" fn GetLine(
        this: *mut raw::ProjectStateContext,
        buf: *mut c_char,
        buflen: c_int,
    ) -> c_int {
        Context::forward(this, CallPath::Control, -1, |cb, h| (cb.GetLine)(h, buf, buflen))
    }

    unsafe extern "C" fn GetOutputSize(this: *mut raw::ProjectStateContext) -> raw::INT64 {
        Context::forward(this, CallPath::Control, 0, |cb, h| (cb.GetOutputSize)(h))
    }

    unsafe extern "C" fn GetTempFlag(this: *mut raw::ProjectStateContext) -> c_int {
        Context::forward(this, CallPath::Control, 0, |cb, h| (cb.GetTempFlag)(h))
    }

    unsafe extern "C" fn SetTempFlag(this: *mut raw::ProjectStateContext, flag: c_int) {
        Context::forward(this, CallPath::Control, (), |cb, h| (cb.SetTempFlag)(h, flag))
    }
}

use ValueKind::*;

pub static PROJECT_STATE_CONTEXT_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "ProjectStateContext",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new("AddLine", Directions::BOTH, &[Str, Variadic], Void),
        MethodDescriptor::new("GetLine", Directions::BOTH, &[StrBuffer, Capacity], Int),
        MethodDescriptor::new("GetOutputSize", Directions::BOTH, &[], Int64),
        MethodDescriptor::new("GetTempFlag", Directions::BOTH, &[], Int),
        MethodDescriptor::new("SetTempFlag", Directions::BOTH, &[Int], Void),
    ],
};
