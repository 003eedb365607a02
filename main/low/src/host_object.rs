//! The C++-shaped objects which REAPER sees when it's handed a Rust implementation.
use crate::descriptor::InterfaceDescriptor;
use crate::registry::RegistryState;
use crate::VirtualDestructor;
use std::os::raw::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

/// Opaque pointer-sized token identifying the foreign implementation behind a host object.
///
/// It's passed back unchanged to each entry point of the callbacks table. For Rust
/// implementations, it's a thin pointer to a `Box<dyn Trait>`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ForeignHandle(NonNull<c_void>);

// The handle is just a token. Whoever dereferences it is responsible for thread safety.
unsafe impl Send for ForeignHandle {}
unsafe impl Sync for ForeignHandle {}

impl ForeignHandle {
    pub fn new(ptr: NonNull<c_void>) -> Self {
        Self(ptr)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn from_thin_ptr<T>(ptr: NonNull<T>) -> Self {
        Self(ptr.cast())
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// Reinterprets the handle as a mutable reference to the implementation.
    ///
    /// # Safety
    ///
    /// The handle must have been created from a pointer to a living `T` and there must be no
    /// other active reference to it.
    pub unsafe fn callback_target<'a, T>(self) -> &'a mut T {
        &mut *(self.0.as_ptr() as *mut T)
    }
}

/// Binds a C++ virtual interface to the Rust types which represent it.
///
/// Implemented by zero-sized marker types, one per interface that can be implemented in Rust.
pub trait HostInterface: Sized + 'static {
    /// The raw C++ class as exposed in [`raw`](crate::raw).
    type Raw;
    /// The raw vtable struct.
    type Vtable: Sync + 'static;
    /// Table of C-linkage functions implementing the virtual functions, one per method.
    type Callbacks: Sync + 'static;
    /// Data members which follow the vptr in the C++ class.
    type BaseFields: Default;

    fn descriptor() -> &'static InterfaceDescriptor;

    /// Returns the vptr to be stored in each host object.
    fn vtable() -> *const Self::Vtable;
}

/// Decides how much checking a forwarded call does.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallPath {
    /// Audio thread. Only reads the attached flag: no locks, no allocation.
    RealTime,
    /// Main thread. Additionally consults the registry.
    Control,
}

/// Release hook of host-owned objects, invoked exactly once when REAPER deletes the object.
pub type ReleaseFn = unsafe extern "C" fn(handle: ForeignHandle);

/// A C++ object implementing interface `I` by forwarding to a foreign implementation.
///
/// The memory layout starts exactly like the C++ class (vptr followed by the base fields), so a
/// pointer to a host object can be handed to REAPER as pointer to `I::Raw`.
#[repr(C)]
pub struct HostObject<I: HostInterface> {
    vtable: *const I::Vtable,
    base: I::BaseFields,
    handle: ForeignHandle,
    callbacks: &'static I::Callbacks,
    attached: AtomicBool,
    registry: Weak<RegistryState<I>>,
    release: Option<ReleaseFn>,
}

impl<I: HostInterface> HostObject<I> {
    pub(crate) fn allocate(
        handle: ForeignHandle,
        callbacks: &'static I::Callbacks,
        registry: Weak<RegistryState<I>>,
        release: Option<ReleaseFn>,
    ) -> NonNull<Self> {
        let object = Box::new(Self {
            vtable: I::vtable(),
            base: Default::default(),
            handle,
            callbacks,
            attached: AtomicBool::new(true),
            registry,
            release,
        });
        NonNull::from(Box::leak(object))
    }

    pub fn handle(&self) -> ForeignHandle {
        self.handle
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    pub(crate) fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }

    /// Gives access to the data members following the vptr.
    ///
    /// # Safety
    ///
    /// `this` must have been returned from a registry of interface `I`.
    pub unsafe fn base_fields<'a>(this: *mut I::Raw) -> Option<&'a mut I::BaseFields> {
        (this as *mut Self).as_mut().map(|o| &mut o.base)
    }

    /// Forwards a virtual function call to the foreign implementation.
    ///
    /// If the object has been unregistered (or was never registered with a living registry), the
    /// implementation is not called and `inert` is returned instead.
    ///
    /// # Safety
    ///
    /// `this` must be null or point to memory allocated as host object of interface `I`.
    #[inline]
    pub unsafe fn forward<R>(
        this: *mut I::Raw,
        path: CallPath,
        inert: R,
        call: impl FnOnce(&'static I::Callbacks, ForeignHandle) -> R,
    ) -> R {
        let object = match (this as *const Self).as_ref() {
            None => return inert,
            Some(o) => o,
        };
        if object.resolve(path) {
            call(object.callbacks, object.handle)
        } else {
            inert
        }
    }

    fn resolve(&self, path: CallPath) -> bool {
        match path {
            CallPath::RealTime => self.is_attached(),
            CallPath::Control => match self.registry.upgrade() {
                None => false,
                Some(registry) => {
                    registry.resolve(self.handle, self as *const Self) && self.is_attached()
                }
            },
        }
    }

    unsafe fn tear_down(this: *mut Self, free: bool) {
        let object = match this.as_mut() {
            None => return,
            Some(o) => o,
        };
        object.detach();
        if let Some(registry) = object.registry.upgrade() {
            registry.forget(object.handle, this);
        }
        let handle = object.handle;
        let release = object.release.take();
        tracing::debug!(
            msg = "REAPER destroyed host object",
            interface = I::descriptor().name,
            ?handle
        );
        if free {
            drop(Box::from_raw(this));
        }
        if let Some(release) = release {
            release(handle);
        }
    }

    #[cfg(not(target_env = "msvc"))]
    unsafe extern "C" fn complete_destructor(this: *mut I::Raw) {
        Self::tear_down(this as *mut Self, false);
    }

    #[cfg(not(target_env = "msvc"))]
    unsafe extern "C" fn deleting_destructor(this: *mut I::Raw) {
        Self::tear_down(this as *mut Self, true);
    }

    #[cfg(target_env = "msvc")]
    unsafe extern "C" fn scalar_deleting_destructor(
        this: *mut I::Raw,
        flags: std::os::raw::c_uint,
    ) -> *mut c_void {
        Self::tear_down(this as *mut Self, flags & 1 != 0);
        this as *mut c_void
    }
}

impl<T> VirtualDestructor<T> {
    /// Destructor entries for vtables of host objects.
    pub(crate) const fn for_host_object<I: HostInterface<Raw = T>>() -> Self {
        #[cfg(not(target_env = "msvc"))]
        {
            Self {
                complete: HostObject::<I>::complete_destructor,
                deleting: HostObject::<I>::deleting_destructor,
            }
        }
        #[cfg(target_env = "msvc")]
        {
            Self {
                scalar_deleting: HostObject::<I>::scalar_deleting_destructor,
            }
        }
    }
}
