use crate::{ExtendedArgs, Hz, ReaperPitchShift};
use reaper_abi_low::raw;
use ref_cast::RefCast;
use std::convert::TryFrom;
use std::ops::{Deref, DerefMut};
use std::os::raw::c_int;
use std::ptr::NonNull;

// Case 3: Internals exposed: no | vtable: yes
// ===========================================

/// Owned REAPER pitch shift instance.
///
/// This one automatically destroys the associated C++ `IReaperPitchShift` when dropped.
#[derive(Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct OwnedReaperPitchShift(ReaperPitchShift);

unsafe impl Send for OwnedReaperPitchShift {}

/// Borrowed (reference-only) REAPER pitch shift instance.
#[derive(Eq, PartialEq, Hash, Debug, RefCast)]
#[repr(transparent)]
pub struct BorrowedReaperPitchShift(raw::IReaperPitchShift);

impl OwnedReaperPitchShift {
    /// Takes ownership of the given pitch shift instance.
    ///
    /// # Safety
    ///
    /// You must guarantee that the given instance is currently owner-less, otherwise double-free or
    /// use-after-free can occur.
    pub unsafe fn from_raw(raw: ReaperPitchShift) -> Self {
        Self(raw)
    }
}

impl Drop for OwnedReaperPitchShift {
    fn drop(&mut self) {
        unsafe {
            reaper_abi_low::delete_cpp_pitch_shift(self.0);
        }
    }
}

impl AsRef<BorrowedReaperPitchShift> for OwnedReaperPitchShift {
    fn as_ref(&self) -> &BorrowedReaperPitchShift {
        BorrowedReaperPitchShift::from_raw(unsafe { self.0.as_ref() })
    }
}

impl AsMut<BorrowedReaperPitchShift> for OwnedReaperPitchShift {
    fn as_mut(&mut self) -> &mut BorrowedReaperPitchShift {
        BorrowedReaperPitchShift::from_raw_mut(unsafe { self.0.as_mut() })
    }
}

impl Deref for OwnedReaperPitchShift {
    type Target = BorrowedReaperPitchShift;

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl DerefMut for OwnedReaperPitchShift {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut()
    }
}

impl BorrowedReaperPitchShift {
    /// Creates a medium-level representation from the given low-level reference.
    pub fn from_raw(raw: &raw::IReaperPitchShift) -> &Self {
        Self::ref_cast(raw)
    }

    /// Creates a mutable medium-level representation from the given low-level reference.
    pub fn from_raw_mut(raw: &mut raw::IReaperPitchShift) -> &mut Self {
        Self::ref_cast_mut(raw)
    }

    /// Returns the pointer to this pitch shift instance.
    pub fn as_ptr(&self) -> ReaperPitchShift {
        NonNull::from(&self.0)
    }

    pub fn set_sample_rate(&mut self, sample_rate: Hz) {
        self.0.set_srate(sample_rate.get());
    }

    /// Sets the number of interleaved channels of the input and output buffers.
    pub fn set_channel_count(&mut self, channel_count: u32) {
        self.0.set_nch(channel_count as c_int);
    }

    /// Sets the pitch shift factor (1.0 means no shift).
    pub fn set_shift(&mut self, shift: f64) {
        self.0.set_shift(shift);
    }

    pub fn set_formant_shift(&mut self, shift: f64) {
        self.0.set_formant_shift(shift);
    }

    /// Sets the time stretch factor (1.0 means original tempo).
    pub fn set_tempo(&mut self, tempo: f64) {
        self.0.set_tempo(tempo);
    }

    pub fn reset(&mut self) {
        self.0.Reset();
    }

    /// Returns the input buffer for the given number of frames.
    ///
    /// The buffer is interleaved. Call [`buffer_done()`](#method.buffer_done) after filling it.
    /// Returns `None` if the instance doesn't provide any buffer or if `frame_count` is too large.
    ///
    /// # Safety
    ///
    /// `channel_count` must be the value most recently passed to
    /// [`set_channel_count()`](#method.set_channel_count). REAPER sizes the buffer according to
    /// that value, so a larger one results in a slice reaching beyond the buffer.
    pub unsafe fn get_buffer(
        &mut self,
        frame_count: u32,
        channel_count: u32,
    ) -> Option<&mut [f64]> {
        let raw_frame_count = c_int::try_from(frame_count).ok()?;
        let len = (frame_count as usize).checked_mul(channel_count as usize)?;
        let ptr = NonNull::new(self.0.GetBuffer(raw_frame_count))?;
        Some(std::slice::from_raw_parts_mut(ptr.as_ptr(), len))
    }

    /// Tells the instance how many frames have been written into the input buffer.
    pub fn buffer_done(&mut self, input_frame_count: u32) {
        let input_frame_count = c_int::try_from(input_frame_count).unwrap_or(c_int::MAX);
        self.0.BufferDone(input_frame_count);
    }

    /// Makes all remaining input available as output.
    pub fn flush_samples(&mut self) {
        self.0.FlushSamples();
    }

    pub fn is_reset(&self) -> bool {
        self.0.IsReset()
    }

    /// Writes processed frames into the given interleaved buffer.
    ///
    /// Returns the number of frames written.
    ///
    /// # Safety
    ///
    /// `channel_count` must be the value most recently passed to
    /// [`set_channel_count()`](#method.set_channel_count). REAPER writes frames of that width, so a
    /// smaller one lets it write beyond the end of `output`.
    pub unsafe fn get_samples(&mut self, output: &mut [f64], channel_count: u32) -> u32 {
        if channel_count == 0 {
            return 0;
        }
        let requested = output.len() / channel_count as usize;
        let requested = c_int::try_from(requested).unwrap_or(c_int::MAX);
        let written = self.0.GetSamples(requested, output.as_mut_ptr());
        written.max(0) as u32
    }

    pub fn set_quality_parameter(&mut self, parameter: i32) {
        self.0.SetQualityParameter(parameter);
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass parameters that don't fit the call code.
    pub unsafe fn extended(&mut self, args: ExtendedArgs) -> i32 {
        self.0
            .Extended(args.call, args.parm_1, args.parm_2, args.parm_3)
    }
}

impl AsRef<raw::IReaperPitchShift> for BorrowedReaperPitchShift {
    fn as_ref(&self) -> &raw::IReaperPitchShift {
        &self.0
    }
}

impl AsMut<raw::IReaperPitchShift> for BorrowedReaperPitchShift {
    fn as_mut(&mut self) -> &mut raw::IReaperPitchShift {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaper_abi_low::raw::{IReaperPitchShift, IReaperPitchShift_vtable, ReaSample};
    use reaper_abi_low::VirtualDestructor;
    use std::os::raw::c_void;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Stands in for an instance returned by `ReaperGetPitchShiftAPI()`. Passes input through.
    #[repr(C)]
    struct PassThrough {
        base: IReaperPitchShift,
        nch: c_int,
        shift: f64,
        input: [ReaSample; 16],
        filled: usize,
        deleted: &'static AtomicBool,
    }

    unsafe fn this<'a>(ptr: *mut IReaperPitchShift) -> &'a mut PassThrough {
        &mut *(ptr as *mut PassThrough)
    }

    unsafe extern "C" fn complete(_: *mut IReaperPitchShift) {}
    unsafe extern "C" fn deleting(ptr: *mut IReaperPitchShift) {
        let instance = Box::from_raw(ptr as *mut PassThrough);
        instance.deleted.store(true, Ordering::SeqCst);
    }
    #[allow(dead_code)]
    unsafe extern "C" fn scalar_deleting(
        ptr: *mut IReaperPitchShift,
        flags: std::os::raw::c_uint,
    ) -> *mut c_void {
        if flags & 1 != 0 {
            deleting(ptr);
        }
        ptr as _
    }
    unsafe extern "C" fn set_srate(_: *mut IReaperPitchShift, _: f64) {}
    unsafe extern "C" fn set_nch(ptr: *mut IReaperPitchShift, nch: c_int) {
        this(ptr).nch = nch;
    }
    unsafe extern "C" fn set_shift(ptr: *mut IReaperPitchShift, shift: f64) {
        this(ptr).shift = shift;
    }
    unsafe extern "C" fn set_f64(_: *mut IReaperPitchShift, _: f64) {}
    unsafe extern "C" fn reset(ptr: *mut IReaperPitchShift) {
        this(ptr).filled = 0;
    }
    unsafe extern "C" fn get_buffer(ptr: *mut IReaperPitchShift, _: c_int) -> *mut ReaSample {
        this(ptr).input.as_mut_ptr()
    }
    unsafe extern "C" fn buffer_done(ptr: *mut IReaperPitchShift, input_filled: c_int) {
        let this = this(ptr);
        this.filled = input_filled as usize * this.nch as usize;
    }
    unsafe extern "C" fn flush_samples(_: *mut IReaperPitchShift) {}
    unsafe extern "C" fn is_reset(ptr: *mut IReaperPitchShift) -> bool {
        this(ptr).filled == 0
    }
    unsafe extern "C" fn get_samples(
        ptr: *mut IReaperPitchShift,
        requested_output: c_int,
        buffer: *mut ReaSample,
    ) -> c_int {
        let this = this(ptr);
        let frames = (this.filled / this.nch as usize).min(requested_output as usize);
        let samples = frames * this.nch as usize;
        std::ptr::copy_nonoverlapping(this.input.as_ptr(), buffer, samples);
        this.filled = 0;
        frames as c_int
    }
    unsafe extern "C" fn set_quality_parameter(_: *mut IReaperPitchShift, _: c_int) {}
    unsafe extern "C" fn extended(
        _: *mut IReaperPitchShift,
        _: c_int,
        _: *mut c_void,
        _: *mut c_void,
        _: *mut c_void,
    ) -> c_int {
        0
    }

    static VTABLE: IReaperPitchShift_vtable = IReaperPitchShift_vtable {
        destructor: VirtualDestructor {
            #[cfg(not(target_env = "msvc"))]
            complete,
            #[cfg(not(target_env = "msvc"))]
            deleting,
            #[cfg(target_env = "msvc")]
            scalar_deleting,
        },
        set_srate,
        set_nch,
        set_shift,
        set_formant_shift: set_f64,
        set_tempo: set_f64,
        Reset: reset,
        GetBuffer: get_buffer,
        BufferDone: buffer_done,
        FlushSamples: flush_samples,
        IsReset: is_reset,
        GetSamples: get_samples,
        SetQualityParameter: set_quality_parameter,
        Extended: extended,
    };

    fn create_pass_through(deleted: &'static AtomicBool) -> OwnedReaperPitchShift {
        let instance = Box::new(PassThrough {
            base: IReaperPitchShift { vtable: &VTABLE },
            nch: 1,
            shift: 1.0,
            input: [0.0; 16],
            filled: 0,
            deleted,
        });
        let ptr = NonNull::from(Box::leak(instance)).cast::<IReaperPitchShift>();
        unsafe { OwnedReaperPitchShift::from_raw(ptr) }
    }

    #[test]
    fn process_block() {
        // Given
        static DELETED: AtomicBool = AtomicBool::new(false);
        let mut pitch_shift = create_pass_through(&DELETED);
        pitch_shift.set_sample_rate(Hz::new(44100.0));
        pitch_shift.set_channel_count(2);
        pitch_shift.set_shift(1.5);
        // When
        let buffer = unsafe { pitch_shift.get_buffer(3, 2) }.unwrap();
        buffer.copy_from_slice(&[0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);
        pitch_shift.buffer_done(3);
        let mut output = [0.0; 4];
        let written = unsafe { pitch_shift.get_samples(&mut output, 2) };
        // Then
        assert_eq!(written, 2);
        assert_eq!(output, [0.1, -0.1, 0.2, -0.2]);
        assert!(pitch_shift.is_reset());
        assert_eq!(unsafe { pitch_shift.get_samples(&mut output, 0) }, 0);
    }

    #[test]
    fn oversized_frame_count_yields_no_buffer() {
        static DELETED: AtomicBool = AtomicBool::new(false);
        let mut pitch_shift = create_pass_through(&DELETED);
        pitch_shift.set_channel_count(1);
        assert!(unsafe { pitch_shift.get_buffer(u32::MAX, 1) }.is_none());
        assert!(unsafe { pitch_shift.get_buffer(4, 1) }.is_some());
    }

    #[test]
    fn dropping_deletes_instance() {
        static DELETED: AtomicBool = AtomicBool::new(false);
        let pitch_shift = create_pass_through(&DELETED);
        assert!(!DELETED.load(Ordering::SeqCst));
        drop(pitch_shift);
        assert!(DELETED.load(Ordering::SeqCst));
    }
}
