//! Pure-Rust construction of C++ vtables.
//!
//! A C++ object with virtual functions starts with a pointer (the *vptr*) into a table of function
//! pointers. In front of the function pointers, both supported ABIs place a small prefix:
//!
//! - Itanium C++ ABI: `offset_to_top` followed by a pointer to the RTTI `type_info`
//! - MSVC: a pointer to the RTTI complete object locator
//!
//! The vptr points *past* that prefix, at the first virtual function. REAPER never uses
//! `dynamic_cast` or `typeid` on plug-in provided objects, so the RTTI pointer is left null.
use std::os::raw::c_void;
use std::ptr::null;

#[cfg(all(windows, target_arch = "x86"))]
compile_error!(
    "32-bit Windows passes `this` via the thiscall convention, which can't be expressed with \
     extern \"C\" function pointers. Only 64-bit Windows is supported."
);

/// Number of vtable slots occupied by a virtual destructor.
///
/// Itanium emits a complete object destructor and a deleting destructor, MSVC a single scalar
/// deleting destructor.
#[cfg(not(target_env = "msvc"))]
pub const DESTRUCTOR_SLOT_COUNT: usize = 2;
#[cfg(target_env = "msvc")]
pub const DESTRUCTOR_SLOT_COUNT: usize = 1;

/// The vtable entries of a virtual destructor of class `T`.
#[repr(C)]
pub struct VirtualDestructor<T> {
    /// Destroys the object but doesn't free its memory.
    #[cfg(not(target_env = "msvc"))]
    pub complete: unsafe extern "C" fn(this: *mut T),
    /// Destroys the object and frees its memory. That's what `delete obj` calls.
    #[cfg(not(target_env = "msvc"))]
    pub deleting: unsafe extern "C" fn(this: *mut T),
    /// Destroys the object and frees its memory if bit 0 of `flags` is set.
    #[cfg(target_env = "msvc")]
    pub scalar_deleting:
        unsafe extern "C" fn(this: *mut T, flags: std::os::raw::c_uint) -> *mut c_void,
}

impl<T> VirtualDestructor<T> {
    /// Does what C++ `delete obj` does.
    ///
    /// # Safety
    ///
    /// `this` must point to a valid object whose vtable contains this destructor. The object must
    /// not be used anymore afterwards.
    pub unsafe fn delete(&self, this: *mut T) {
        #[cfg(not(target_env = "msvc"))]
        (self.deleting)(this);
        #[cfg(target_env = "msvc")]
        (self.scalar_deleting)(this, 1);
    }

    /// Does what an explicit destructor call `obj->~T()` does: destroys the object without freeing
    /// its memory.
    ///
    /// # Safety
    ///
    /// Same as [`delete()`](#method.delete). The memory must be freed by its owner afterwards.
    pub unsafe fn destruct(&self, this: *mut T) {
        #[cfg(not(target_env = "msvc"))]
        (self.complete)(this);
        #[cfg(target_env = "msvc")]
        (self.scalar_deleting)(this, 0);
    }
}

/// A complete vtable including the ABI-specific prefix.
///
/// Instances are meant to live in statics. Take the vptr via [`vptr()`](#method.vptr).
#[repr(C)]
pub struct CppVtable<V> {
    #[cfg(not(target_env = "msvc"))]
    offset_to_top: isize,
    rtti: *const c_void,
    methods: V,
}

// The RTTI pointer is always null and the methods are plain function pointers.
unsafe impl<V: Sync> Sync for CppVtable<V> {}

impl<V> CppVtable<V> {
    pub const fn new(methods: V) -> Self {
        Self {
            #[cfg(not(target_env = "msvc"))]
            offset_to_top: 0,
            rtti: null(),
            methods,
        }
    }

    /// Returns what C++ stores in the first word of each object.
    pub fn vptr(&'static self) -> *const V {
        &self.methods
    }
}
