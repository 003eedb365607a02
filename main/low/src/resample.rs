#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::descriptor::{
    DestructorPlacement, Directions, InterfaceDescriptor, MethodDescriptor, ValueKind,
};
use crate::raw::{self, ReaSample, REAPER_Resample_Interface};
use std::os::raw::{c_int, c_void};
use std::ptr::NonNull;

impl REAPER_Resample_Interface {
    pub fn SetRates(&self, rate_in: f64, rate_out: f64) {
        unsafe {
            rust_to_cpp_REAPER_Resample_Interface_SetRates(
                self as *const _ as _,
                rate_in,
                rate_out,
            );
        }
    }

    pub fn Reset(&self) {
        unsafe {
            rust_to_cpp_REAPER_Resample_Interface_Reset(self as *const _ as _);
        }
    }

    pub fn GetCurrentLatency(&self) -> f64 {
        unsafe { rust_to_cpp_REAPER_Resample_Interface_GetCurrentLatency(self as *const _ as _) }
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn ResamplePrepare(
        &self,
        out_samples: c_int,
        nch: c_int,
        inbuffer: *mut *mut ReaSample,
    ) -> c_int {
        rust_to_cpp_REAPER_Resample_Interface_ResamplePrepare(
            self as *const _ as _,
            out_samples,
            nch,
            inbuffer,
        )
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn ResampleOut(
        &self,
        out: *mut ReaSample,
        nsamples_in: c_int,
        nsamples_out: c_int,
        nch: c_int,
    ) -> c_int {
        rust_to_cpp_REAPER_Resample_Interface_ResampleOut(
            self as *const _ as _,
            out,
            nsamples_in,
            nsamples_out,
            nch,
        )
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn Extended(
        &self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        rust_to_cpp_REAPER_Resample_Interface_Extended(
            self as *const _ as _,
            call,
            parm1,
            parm2,
            parm3,
        )
    }
}

unsafe fn vtable<'a>(
    self_: *mut REAPER_Resample_Interface,
) -> Option<&'a raw::REAPER_Resample_Interface_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_REAPER_Resample_Interface_SetRates(
    self_: *mut REAPER_Resample_Interface,
    rate_in: f64,
    rate_out: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetRates)(self_, rate_in, rate_out);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_REAPER_Resample_Interface_Reset(
    self_: *mut REAPER_Resample_Interface,
) {
    if let Some(vt) = vtable(self_) {
        (vt.Reset)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_REAPER_Resample_Interface_GetCurrentLatency(
    self_: *mut REAPER_Resample_Interface,
) -> f64 {
    vtable(self_)
        .map(|vt| (vt.GetCurrentLatency)(self_))
        .unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_REAPER_Resample_Interface_ResamplePrepare(
    self_: *mut REAPER_Resample_Interface,
    out_samples: c_int,
    nch: c_int,
    inbuffer: *mut *mut ReaSample,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.ResamplePrepare)(self_, out_samples, nch, inbuffer))
        .unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_REAPER_Resample_Interface_ResampleOut(
    self_: *mut REAPER_Resample_Interface,
    out: *mut ReaSample,
    nsamples_in: c_int,
    nsamples_out: c_int,
    nch: c_int,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.ResampleOut)(self_, out, nsamples_in, nsamples_out, nch))
        .unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_REAPER_Resample_Interface_Extended(
    self_: *mut REAPER_Resample_Interface,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.Extended)(self_, call, parm1, parm2, parm3))
        .unwrap_or_default()
}

/// Destroys a resampler obtained from `Resampler_Create()` via its virtual destructor.
///
/// # Safety
///
/// `resampler` must be valid and owned by the caller.
pub unsafe fn delete_cpp_resample_interface(resampler: NonNull<REAPER_Resample_Interface>) {
    if let Some(vt) = vtable(resampler.as_ptr()) {
        vt.destructor.delete(resampler.as_ptr());
    }
}

use ValueKind::*;

pub static RESAMPLE_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "REAPER_Resample_Interface",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new("SetRates", Directions::RUST_TO_CPP, &[Double, Double], Void),
        MethodDescriptor::new("Reset", Directions::RUST_TO_CPP, &[], Void),
        MethodDescriptor::new("GetCurrentLatency", Directions::RUST_TO_CPP, &[], Double),
        MethodDescriptor::new(
            "ResamplePrepare",
            Directions::RUST_TO_CPP,
            &[Int, Int, Pointer("ReaSample*")],
            Int,
        )
        .real_time(),
        MethodDescriptor::new(
            "ResampleOut",
            Directions::RUST_TO_CPP,
            &[Pointer("ReaSample"), Int, Int, Int],
            Int,
        )
        .real_time(),
        MethodDescriptor::new(
            "Extended",
            Directions::RUST_TO_CPP,
            &[Int, Pointer("void"), Pointer("void"), Pointer("void")],
            Int,
        ),
    ],
};
