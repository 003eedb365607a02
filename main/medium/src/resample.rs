use crate::{DurationInSeconds, ExtendedArgs, Hz, ReaperResample};
use reaper_abi_low::raw;
use ref_cast::RefCast;
use std::convert::TryFrom;
use std::ops::{Deref, DerefMut};
use std::os::raw::c_int;
use std::ptr::{null_mut, NonNull};

// Case 3: Internals exposed: no | vtable: yes
// ===========================================

/// Owned REAPER resample instance.
///
/// This one automatically destroys the associated C++ `REAPER_Resample_Interface` when dropped.
#[derive(Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct OwnedReaperResample(ReaperResample);

unsafe impl Send for OwnedReaperResample {}

/// Borrowed (reference-only) REAPER resample instance.
#[derive(Eq, PartialEq, Hash, Debug, RefCast)]
#[repr(transparent)]
pub struct BorrowedReaperResample(raw::REAPER_Resample_Interface);

impl OwnedReaperResample {
    /// Takes ownership of the given resample instance.
    ///
    /// # Safety
    ///
    /// You must guarantee that the given instance is currently owner-less, otherwise double-free or
    /// use-after-free can occur.
    pub unsafe fn from_raw(raw: ReaperResample) -> Self {
        Self(raw)
    }
}

impl Drop for OwnedReaperResample {
    fn drop(&mut self) {
        unsafe {
            reaper_abi_low::delete_cpp_resample_interface(self.0);
        }
    }
}

impl AsRef<BorrowedReaperResample> for OwnedReaperResample {
    fn as_ref(&self) -> &BorrowedReaperResample {
        BorrowedReaperResample::from_raw(unsafe { self.0.as_ref() })
    }
}

impl AsMut<BorrowedReaperResample> for OwnedReaperResample {
    fn as_mut(&mut self) -> &mut BorrowedReaperResample {
        BorrowedReaperResample::from_raw_mut(unsafe { self.0.as_mut() })
    }
}

impl Deref for OwnedReaperResample {
    type Target = BorrowedReaperResample;

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl DerefMut for OwnedReaperResample {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut()
    }
}

impl BorrowedReaperResample {
    /// Creates a medium-level representation from the given low-level reference.
    pub fn from_raw(raw: &raw::REAPER_Resample_Interface) -> &Self {
        Self::ref_cast(raw)
    }

    /// Creates a mutable medium-level representation from the given low-level reference.
    pub fn from_raw_mut(raw: &mut raw::REAPER_Resample_Interface) -> &mut Self {
        Self::ref_cast_mut(raw)
    }

    pub fn as_ptr(&self) -> ReaperResample {
        NonNull::from(&self.0)
    }

    pub fn set_rates(&mut self, rate_in: Hz, rate_out: Hz) {
        self.0.SetRates(rate_in.get(), rate_out.get());
    }

    pub fn reset(&mut self) {
        self.0.Reset();
    }

    pub fn get_current_latency(&self) -> DurationInSeconds {
        DurationInSeconds::try_from(self.0.GetCurrentLatency()).unwrap_or(DurationInSeconds::ZERO)
    }

    /// Prepares resampling of `output_frame_count` frames and returns the interleaved input buffer
    /// which must be filled before calling [`resample_out()`](#method.resample_out).
    ///
    /// The length of the returned buffer tells how many input frames are needed (divided by
    /// `channel_count`).
    pub fn resample_prepare(&mut self, output_frame_count: u32, channel_count: u32) -> &mut [f64] {
        let (raw_output_frame_count, raw_channel_count) = match (
            c_int::try_from(output_frame_count),
            c_int::try_from(channel_count),
        ) {
            (Ok(o), Ok(c)) => (o, c),
            _ => return &mut [],
        };
        let mut in_buffer = null_mut();
        let in_frame_count = unsafe {
            self.0
                .ResamplePrepare(raw_output_frame_count, raw_channel_count, &mut in_buffer)
        };
        if in_buffer.is_null() || in_frame_count <= 0 {
            return &mut [];
        }
        let len = match (in_frame_count as usize).checked_mul(channel_count as usize) {
            None => return &mut [],
            Some(l) => l,
        };
        unsafe { std::slice::from_raw_parts_mut(in_buffer, len) }
    }

    /// Resamples the prepared input into the given interleaved output buffer.
    ///
    /// Returns the number of frames written.
    pub fn resample_out(
        &mut self,
        output: &mut [f64],
        input_frame_count: u32,
        channel_count: u32,
    ) -> u32 {
        let raw_channel_count = match c_int::try_from(channel_count) {
            Ok(c) if c > 0 => c,
            _ => return 0,
        };
        let output_frame_count = output.len() / channel_count as usize;
        let written = unsafe {
            self.0.ResampleOut(
                output.as_mut_ptr(),
                c_int::try_from(input_frame_count).unwrap_or(c_int::MAX),
                c_int::try_from(output_frame_count).unwrap_or(c_int::MAX),
                raw_channel_count,
            )
        };
        written.max(0) as u32
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass parameters that don't fit the call code.
    pub unsafe fn extended(&mut self, args: ExtendedArgs) -> i32 {
        self.0
            .Extended(args.call, args.parm_1, args.parm_2, args.parm_3)
    }
}

impl AsRef<raw::REAPER_Resample_Interface> for BorrowedReaperResample {
    fn as_ref(&self) -> &raw::REAPER_Resample_Interface {
        &self.0
    }
}

impl AsMut<raw::REAPER_Resample_Interface> for BorrowedReaperResample {
    fn as_mut(&mut self) -> &mut raw::REAPER_Resample_Interface {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaper_abi_low::raw::{
        ReaSample, REAPER_Resample_Interface, REAPER_Resample_Interface_vtable,
    };
    use reaper_abi_low::VirtualDestructor;
    use std::os::raw::c_void;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Stands in for an instance returned by `Resampler_Create()`. Only supports 2:1 downsampling.
    #[repr(C)]
    struct Decimator {
        base: REAPER_Resample_Interface,
        input: [ReaSample; 32],
        deleted: &'static AtomicBool,
    }

    unsafe fn this<'a>(ptr: *mut REAPER_Resample_Interface) -> &'a mut Decimator {
        &mut *(ptr as *mut Decimator)
    }

    unsafe extern "C" fn complete(_: *mut REAPER_Resample_Interface) {}
    unsafe extern "C" fn deleting(ptr: *mut REAPER_Resample_Interface) {
        let instance = Box::from_raw(ptr as *mut Decimator);
        instance.deleted.store(true, Ordering::SeqCst);
    }
    #[allow(dead_code)]
    unsafe extern "C" fn scalar_deleting(
        ptr: *mut REAPER_Resample_Interface,
        flags: std::os::raw::c_uint,
    ) -> *mut c_void {
        if flags & 1 != 0 {
            deleting(ptr);
        }
        ptr as _
    }
    unsafe extern "C" fn set_rates(_: *mut REAPER_Resample_Interface, _: f64, _: f64) {}
    unsafe extern "C" fn reset(_: *mut REAPER_Resample_Interface) {}
    unsafe extern "C" fn get_current_latency(_: *mut REAPER_Resample_Interface) -> f64 {
        0.001
    }
    unsafe extern "C" fn resample_prepare(
        ptr: *mut REAPER_Resample_Interface,
        out_samples: c_int,
        _: c_int,
        inbuffer: *mut *mut ReaSample,
    ) -> c_int {
        *inbuffer = this(ptr).input.as_mut_ptr();
        out_samples * 2
    }
    unsafe extern "C" fn resample_out(
        ptr: *mut REAPER_Resample_Interface,
        out: *mut ReaSample,
        nsamples_in: c_int,
        nsamples_out: c_int,
        nch: c_int,
    ) -> c_int {
        let this = this(ptr);
        let frames = (nsamples_in / 2).min(nsamples_out);
        for frame in 0..frames as usize {
            for ch in 0..nch as usize {
                *out.add(frame * nch as usize + ch) = this.input[frame * 2 * nch as usize + ch];
            }
        }
        frames
    }
    unsafe extern "C" fn extended(
        _: *mut REAPER_Resample_Interface,
        _: c_int,
        _: *mut c_void,
        _: *mut c_void,
        _: *mut c_void,
    ) -> c_int {
        0
    }

    static VTABLE: REAPER_Resample_Interface_vtable = REAPER_Resample_Interface_vtable {
        destructor: VirtualDestructor {
            #[cfg(not(target_env = "msvc"))]
            complete,
            #[cfg(not(target_env = "msvc"))]
            deleting,
            #[cfg(target_env = "msvc")]
            scalar_deleting,
        },
        SetRates: set_rates,
        Reset: reset,
        GetCurrentLatency: get_current_latency,
        ResamplePrepare: resample_prepare,
        ResampleOut: resample_out,
        Extended: extended,
    };

    fn create_decimator(deleted: &'static AtomicBool) -> OwnedReaperResample {
        let instance = Box::new(Decimator {
            base: REAPER_Resample_Interface { vtable: &VTABLE },
            input: [0.0; 32],
            deleted,
        });
        let ptr = NonNull::from(Box::leak(instance)).cast::<REAPER_Resample_Interface>();
        unsafe { OwnedReaperResample::from_raw(ptr) }
    }

    #[test]
    fn resample_block() {
        // Given
        static DELETED: AtomicBool = AtomicBool::new(false);
        let mut resample = create_decimator(&DELETED);
        resample.set_rates(Hz::new(96000.0), Hz::new(48000.0));
        // When
        let input = resample.resample_prepare(2, 2);
        assert_eq!(input.len(), 8);
        input.copy_from_slice(&[1.0, -1.0, 1.5, -1.5, 2.0, -2.0, 2.5, -2.5]);
        let mut output = [0.0; 4];
        let written = resample.resample_out(&mut output, 4, 2);
        // Then
        assert_eq!(written, 2);
        assert_eq!(output, [1.0, -1.0, 2.0, -2.0]);
        assert_eq!(resample.get_current_latency(), DurationInSeconds::new(0.001));
    }

    #[test]
    fn counts_out_of_range_are_rejected() {
        static DELETED: AtomicBool = AtomicBool::new(false);
        let mut resample = create_decimator(&DELETED);
        assert!(resample.resample_prepare(u32::MAX, 2).is_empty());
        let mut output = [0.0; 4];
        assert_eq!(resample.resample_out(&mut output, 4, u32::MAX), 0);
    }

    #[test]
    fn dropping_deletes_instance() {
        static DELETED: AtomicBool = AtomicBool::new(false);
        let resample = create_decimator(&DELETED);
        assert!(!DELETED.load(Ordering::SeqCst));
        drop(resample);
        assert!(DELETED.load(Ordering::SeqCst));
    }
}
