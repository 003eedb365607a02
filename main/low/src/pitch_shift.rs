#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::descriptor::{
    DestructorPlacement, Directions, InterfaceDescriptor, MethodDescriptor, ValueKind,
};
use crate::raw::{self, IReaperPitchShift, ReaSample};
use std::os::raw::{c_int, c_void};
use std::ptr::{null_mut, NonNull};

impl IReaperPitchShift {
    pub fn set_srate(&self, srate: f64) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_set_srate(self as *const _ as _, srate);
        }
    }

    pub fn set_nch(&self, nch: c_int) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_set_nch(self as *const _ as _, nch);
        }
    }

    pub fn set_shift(&self, shift: f64) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_set_shift(self as *const _ as _, shift);
        }
    }

    pub fn set_formant_shift(&self, shift: f64) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_set_formant_shift(self as *const _ as _, shift);
        }
    }

    pub fn set_tempo(&self, tempo: f64) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_set_tempo(self as *const _ as _, tempo);
        }
    }

    pub fn Reset(&self) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_Reset(self as *const _ as _);
        }
    }

    pub fn GetBuffer(&self, size: c_int) -> *mut ReaSample {
        unsafe { rust_to_cpp_IReaperPitchShift_GetBuffer(self as *const _ as _, size) }
    }

    pub fn BufferDone(&self, input_filled: c_int) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_BufferDone(self as *const _ as _, input_filled);
        }
    }

    pub fn FlushSamples(&self) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_FlushSamples(self as *const _ as _);
        }
    }

    pub fn IsReset(&self) -> bool {
        unsafe { rust_to_cpp_IReaperPitchShift_IsReset(self as *const _ as _) }
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn GetSamples(&self, requested_output: c_int, buffer: *mut ReaSample) -> c_int {
        rust_to_cpp_IReaperPitchShift_GetSamples(self as *const _ as _, requested_output, buffer)
    }

    pub fn SetQualityParameter(&self, parm: c_int) {
        unsafe {
            rust_to_cpp_IReaperPitchShift_SetQualityParameter(self as *const _ as _, parm);
        }
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
        rust_to_cpp_IReaperPitchShift_Extended(self as *const _ as _, call, parm1, parm2, parm3)
    }
}

unsafe fn vtable<'a>(self_: *mut IReaperPitchShift) -> Option<&'a raw::IReaperPitchShift_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_set_srate(
    self_: *mut IReaperPitchShift,
    srate: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.set_srate)(self_, srate);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_set_nch(
    self_: *mut IReaperPitchShift,
    nch: c_int,
) {
    if let Some(vt) = vtable(self_) {
        (vt.set_nch)(self_, nch);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_set_shift(
    self_: *mut IReaperPitchShift,
    shift: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.set_shift)(self_, shift);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_set_formant_shift(
    self_: *mut IReaperPitchShift,
    shift: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.set_formant_shift)(self_, shift);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_set_tempo(
    self_: *mut IReaperPitchShift,
    tempo: f64,
) {
    if let Some(vt) = vtable(self_) {
        (vt.set_tempo)(self_, tempo);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_Reset(self_: *mut IReaperPitchShift) {
    if let Some(vt) = vtable(self_) {
        (vt.Reset)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_GetBuffer(
    self_: *mut IReaperPitchShift,
    size: c_int,
) -> *mut ReaSample {
    vtable(self_)
        .map(|vt| (vt.GetBuffer)(self_, size))
        .unwrap_or(null_mut())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_BufferDone(
    self_: *mut IReaperPitchShift,
    input_filled: c_int,
) {
    if let Some(vt) = vtable(self_) {
        (vt.BufferDone)(self_, input_filled);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_FlushSamples(self_: *mut IReaperPitchShift) {
    if let Some(vt) = vtable(self_) {
        (vt.FlushSamples)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_IsReset(
    self_: *mut IReaperPitchShift,
) -> bool {
    vtable(self_).map(|vt| (vt.IsReset)(self_)).unwrap_or(false)
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_GetSamples(
    self_: *mut IReaperPitchShift,
    requested_output: c_int,
    buffer: *mut ReaSample,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.GetSamples)(self_, requested_output, buffer))
        .unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_SetQualityParameter(
    self_: *mut IReaperPitchShift,
    parm: c_int,
) {
    if let Some(vt) = vtable(self_) {
        (vt.SetQualityParameter)(self_, parm);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_IReaperPitchShift_Extended(
    self_: *mut IReaperPitchShift,
    call: c_int,
    parm1: *mut c_void,
    parm2: *mut c_void,
    parm3: *mut c_void,
) -> c_int {
    vtable(self_)
        .map(|vt| (vt.Extended)(self_, call, parm1, parm2, parm3))
        .unwrap_or_default()
}

/// Destroys a pitch shifter obtained from `ReaperGetPitchShiftAPI()` via its virtual destructor.
///
/// # Safety
///
/// `pitch_shift` must be valid and owned by the caller.
pub unsafe fn delete_cpp_pitch_shift(pitch_shift: NonNull<IReaperPitchShift>) {
    if let Some(vt) = vtable(pitch_shift.as_ptr()) {
        vt.destructor.delete(pitch_shift.as_ptr());
    }
}

use ValueKind::*;

pub static PITCH_SHIFT_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "IReaperPitchShift",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new("set_srate", Directions::RUST_TO_CPP, &[Double], Void),
        MethodDescriptor::new("set_nch", Directions::RUST_TO_CPP, &[Int], Void),
        MethodDescriptor::new("set_shift", Directions::RUST_TO_CPP, &[Double], Void),
        MethodDescriptor::new("set_formant_shift", Directions::RUST_TO_CPP, &[Double], Void),
        MethodDescriptor::new("set_tempo", Directions::RUST_TO_CPP, &[Double], Void),
        MethodDescriptor::new("Reset", Directions::RUST_TO_CPP, &[], Void),
        MethodDescriptor::new(
            "GetBuffer",
            Directions::RUST_TO_CPP,
            &[Int],
            Pointer("ReaSample"),
        )
        .real_time(),
        MethodDescriptor::new("BufferDone", Directions::RUST_TO_CPP, &[Int], Void).real_time(),
        MethodDescriptor::new("FlushSamples", Directions::RUST_TO_CPP, &[], Void).real_time(),
        MethodDescriptor::new("IsReset", Directions::RUST_TO_CPP, &[], Bool),
        MethodDescriptor::new(
            "GetSamples",
            Directions::RUST_TO_CPP,
            &[Int, Pointer("ReaSample")],
            Int,
        )
        .real_time(),
        MethodDescriptor::new("SetQualityParameter", Directions::RUST_TO_CPP, &[Int], Void),
        MethodDescriptor::new(
            "Extended",
            Directions::RUST_TO_CPP,
            &[Int, Pointer("void"), Pointer("void"), Pointer("void")],
            Int,
        ),
    ],
};
