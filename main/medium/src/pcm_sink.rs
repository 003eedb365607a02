#![allow(non_snake_case)]
use crate::util::{create_passing_c_str, with_string_buffer};
use crate::{
    BorrowedMidiEventList, DurationInSeconds, ExtendedArgs, Hz, PcmSink, ReaperStr, ReaperString,
};
use once_cell::sync::Lazy;
use reaper_abi_low::{
    copy_to_raw_c_buffer, create_cpp_to_rust_pcm_sink, create_rust_pcm_sink_registry,
    delete_cpp_pcm_sink, raw, LifecycleRegistry, PcmSinkInterface, RegistryError, RegistryMode,
};
use ref_cast::RefCast;
use std::convert::TryFrom;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{null, null_mut, NonNull};

const MAX_INFO_STRING_LENGTH: u32 = 512;

static CUSTOM_SINKS: Lazy<LifecycleRegistry<PcmSinkInterface>> =
    Lazy::new(|| create_rust_pcm_sink_registry(RegistryMode::MultiInstance));

/// Owned PCM sink.
///
/// This PCM sink automatically destroys the associated C++ `PCM_sink` when dropped.
#[derive(Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct OwnedPcmSink(PcmSink);

impl OwnedPcmSink {
    /// Takes ownership of the given sink.
    ///
    /// # Safety
    ///
    /// You must guarantee that the given sink is currently owner-less, otherwise double-free or
    /// use-after-free can occur.
    pub unsafe fn from_raw(raw: PcmSink) -> Self {
        Self(raw)
    }
}

unsafe impl Send for OwnedPcmSink {}

impl Drop for OwnedPcmSink {
    fn drop(&mut self) {
        unsafe {
            reaper_abi_low::delete_cpp_pcm_sink_via_vtable(self.0);
        }
    }
}

impl AsRef<BorrowedPcmSink> for OwnedPcmSink {
    fn as_ref(&self) -> &BorrowedPcmSink {
        BorrowedPcmSink::from_raw(unsafe { self.0.as_ref() })
    }
}

impl AsMut<BorrowedPcmSink> for OwnedPcmSink {
    fn as_mut(&mut self) -> &mut BorrowedPcmSink {
        BorrowedPcmSink::from_raw_mut(unsafe { self.0.as_mut() })
    }
}

impl Deref for OwnedPcmSink {
    type Target = BorrowedPcmSink;

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl DerefMut for OwnedPcmSink {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut()
    }
}

/// Borrowed (reference-only) PCM sink.
//
// Case 3: Internals exposed: no | vtable: yes
// ===========================================
#[derive(Debug, RefCast)]
#[repr(transparent)]
pub struct BorrowedPcmSink(raw::PCM_sink);

impl BorrowedPcmSink {
    /// Creates a medium-level representation from the given low-level reference.
    pub fn from_raw(raw: &raw::PCM_sink) -> &Self {
        Self::ref_cast(raw)
    }

    /// Creates a mutable medium-level representation from the given low-level reference.
    pub fn from_raw_mut(raw: &mut raw::PCM_sink) -> &mut Self {
        Self::ref_cast_mut(raw)
    }

    /// Returns the pointer to this sink.
    pub fn as_ptr(&self) -> PcmSink {
        NonNull::from(&self.0)
    }

    /// Returns a human-readable description of the output format.
    pub fn output_info_string(&self) -> ReaperString {
        let (info, _) = with_string_buffer(MAX_INFO_STRING_LENGTH, |buffer, max_size| {
            self.0.GetOutputInfoString(buffer, max_size)
        });
        info
    }

    /// Returns the project position at which writing started.
    pub fn start_time(&self) -> f64 {
        self.0.GetStartTime()
    }

    pub fn set_start_time(&self, start_time: f64) {
        self.0.SetStartTime(start_time);
    }

    /// Grants temporary access to the file name of this sink.
    pub fn file_name<R>(&self, use_file_name: impl FnOnce(Option<&ReaperStr>) -> R) -> R {
        let ptr = self.0.GetFileName();
        use_file_name(unsafe { create_passing_c_str(ptr) })
    }

    pub fn num_channels(&self) -> u32 {
        self.0.GetNumChannels().max(0) as u32
    }

    /// Returns the length of the material written so far.
    pub fn length(&self) -> DurationInSeconds {
        DurationInSeconds::try_from(self.0.GetLength()).unwrap_or(DurationInSeconds::ZERO)
    }

    /// Returns the size of the written file in bytes.
    pub fn file_size(&self) -> u64 {
        self.0.GetFileSize().max(0) as u64
    }

    /// Passes MIDI events of a block with `length` frames.
    pub fn write_midi(&self, events: &mut BorrowedMidiEventList, length: u32, sample_rate: Hz) {
        self.0
            .WriteMIDI(events.as_mut(), length as c_int, sample_rate.get());
    }

    /// Writes one block of audio.
    ///
    /// Each array element is one channel. All channels must have the same length, otherwise the
    /// shortest one determines how many frames are written. Doesn't allocate.
    pub fn write_doubles<const N: usize>(&self, channels: &mut [&mut [f64]; N]) {
        let frame_count = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut channel_ptrs = [null_mut(); N];
        for (ptr, channel) in channel_ptrs.iter_mut().zip(channels.iter_mut()) {
            *ptr = channel.as_mut_ptr();
        }
        self.0.WriteDoubles(
            channel_ptrs.as_mut_ptr(),
            frame_count as c_int,
            N as c_int,
            0,
            1,
        );
    }

    pub fn want_midi(&self) -> bool {
        self.0.WantMIDI()
    }

    /// Fills the given buffer with the peaks of the last second and returns how many have been
    /// written.
    pub fn last_second_peaks(&self, peaks: &mut [f64]) -> u32 {
        let count = self
            .0
            .GetLastSecondPeaks(peaks.len() as c_int, peaks.as_mut_ptr());
        count.max(0) as u32
    }

    /// Invokes a sink-specific extension.
    ///
    /// # Safety
    ///
    /// REAPER can crash if you pass parameters that don't fit the call code.
    pub unsafe fn extended(&self, args: ExtendedArgs) -> i32 {
        self.0
            .Extended(args.call, args.parm_1, args.parm_2, args.parm_3)
    }
}

impl AsRef<raw::PCM_sink> for BorrowedPcmSink {
    fn as_ref(&self) -> &raw::PCM_sink {
        &self.0
    }
}

impl AsMut<raw::PCM_sink> for BorrowedPcmSink {
    fn as_mut(&mut self) -> &mut raw::PCM_sink {
        &mut self.0
    }
}

/// One block of audio passed to [`CustomPcmSink::write_doubles()`].
///
/// Gives safe access to the channel buffers without copying them.
#[derive(Debug)]
pub struct WriteDoublesArgs<'a> {
    channels: &'a [*mut f64],
    frame_count: u32,
    offset: usize,
    spacing: usize,
}

impl<'a> WriteDoublesArgs<'a> {
    pub fn channel_count(&self) -> u32 {
        self.channels.len() as u32
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Returns the sample of the given channel at the given frame.
    ///
    /// `None` if out of range or if REAPER didn't provide a buffer for that channel.
    pub fn sample(&self, channel: u32, frame: u32) -> Option<f64> {
        if frame >= self.frame_count {
            return None;
        }
        let ptr = *self.channels.get(channel as usize)?;
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { *ptr.add(self.offset + frame as usize * self.spacing) })
    }

    /// Returns an iterator over the samples of the given channel.
    pub fn channel(&self, channel: u32) -> impl Iterator<Item = f64> + '_ {
        (0..self.frame_count).map_while(move |frame| self.sample(channel, frame))
    }
}

/// Consumers can implement this trait in order to provide own PCM sink types.
///
/// [`write_doubles()`](#tymethod.write_doubles) and [`write_midi()`](#method.write_midi) are called
/// in real-time threads. Implementations must neither allocate nor block there.
pub trait CustomPcmSink {
    /// Returns a human-readable description of the output format.
    fn output_info_string(&mut self) -> &ReaperStr;

    fn start_time(&mut self) -> f64;

    fn set_start_time(&mut self, start_time: f64);

    fn file_name(&mut self) -> Option<&ReaperStr>;

    fn num_channels(&mut self) -> u32;

    fn length(&mut self) -> DurationInSeconds;

    fn file_size(&mut self) -> u64;

    fn write_midi(&mut self, events: &mut BorrowedMidiEventList, length: u32, sample_rate: Hz) {
        let _ = (events, length, sample_rate);
    }

    fn write_doubles(&mut self, args: WriteDoublesArgs);

    fn want_midi(&mut self) -> bool {
        false
    }

    fn last_second_peaks(&mut self, peaks: &mut [f64]) -> u32 {
        let _ = peaks;
        0
    }

    /// Returning 0 means the call is not supported.
    ///
    /// # Safety
    ///
    /// Implementing this is unsafe because you need to deal with raw pointers.
    unsafe fn extended(&mut self, args: ExtendedArgs) -> i32 {
        let _ = args;
        0
    }
}

/// Represents an owned PCM sink that is backed by a Rust [`CustomPcmSink`] trait implementation.
///
/// Dropping it destroys the C++ counterpart.
pub struct CustomOwnedPcmSink {
    // Those 2 belong together. `cpp_sink` without `rust_sink` = crash. Never let them apart!
    cpp_sink: NonNull<raw::PCM_sink>,
    /// Never read but important to keep in memory.
    #[allow(clippy::redundant_allocation)]
    _rust_sink: Box<Box<dyn reaper_abi_low::PCM_sink>>,
}

impl fmt::Debug for CustomOwnedPcmSink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CustomOwnedPcmSink")
            .field("cpp_sink", &self.cpp_sink)
            .finish()
    }
}

impl CustomOwnedPcmSink {
    /// Returns the C++ counterpart which can be passed to REAPER.
    pub fn as_ptr(&self) -> PcmSink {
        self.cpp_sink
    }
}

impl Drop for CustomOwnedPcmSink {
    fn drop(&mut self) {
        unsafe {
            delete_cpp_pcm_sink(&CUSTOM_SINKS, self.cpp_sink);
        }
    }
}

impl AsRef<BorrowedPcmSink> for CustomOwnedPcmSink {
    fn as_ref(&self) -> &BorrowedPcmSink {
        BorrowedPcmSink::from_raw(unsafe { self.cpp_sink.as_ref() })
    }
}

impl AsMut<BorrowedPcmSink> for CustomOwnedPcmSink {
    fn as_mut(&mut self) -> &mut BorrowedPcmSink {
        BorrowedPcmSink::from_raw_mut(unsafe { self.cpp_sink.as_mut() })
    }
}

#[derive(Debug)]
struct PcmSinkAdapter<S: CustomPcmSink> {
    delegate: S,
}

impl<S: CustomPcmSink> PcmSinkAdapter<S> {
    pub fn new(delegate: S) -> Self {
        Self { delegate }
    }
}

impl<S: CustomPcmSink> reaper_abi_low::PCM_sink for PcmSinkAdapter<S> {
    fn GetOutputInfoString(&mut self, buf: *mut c_char, buflen: c_int) {
        let info = self.delegate.output_info_string();
        unsafe { copy_to_raw_c_buffer(info.as_c_str().to_bytes(), buf, buflen) };
    }

    fn GetStartTime(&mut self) -> f64 {
        self.delegate.start_time()
    }

    fn SetStartTime(&mut self, st: f64) {
        self.delegate.set_start_time(st);
    }

    fn GetFileName(&mut self) -> *const c_char {
        self.delegate
            .file_name()
            .map(|name| name.as_ptr())
            .unwrap_or(null())
    }

    fn GetNumChannels(&mut self) -> c_int {
        self.delegate.num_channels() as _
    }

    fn GetLength(&mut self) -> f64 {
        self.delegate.length().get()
    }

    fn GetFileSize(&mut self) -> raw::INT64 {
        self.delegate.file_size() as _
    }

    fn WriteMIDI(&mut self, events: *mut raw::MIDI_eventlist, len: c_int, samplerate: f64) {
        let events = match unsafe { events.as_mut() } {
            None => return,
            Some(e) => BorrowedMidiEventList::from_raw_mut(e),
        };
        if let Ok(sample_rate) = Hz::try_from(samplerate) {
            self.delegate
                .write_midi(events, len.max(0) as u32, sample_rate);
        }
    }

    fn WriteDoubles(
        &mut self,
        samples: *mut *mut raw::ReaSample,
        len: c_int,
        nch: c_int,
        offset: c_int,
        spacing: c_int,
    ) {
        if samples.is_null() || nch <= 0 || len < 0 || offset < 0 || spacing <= 0 {
            return;
        }
        let channels = unsafe { std::slice::from_raw_parts(samples as *const *mut f64, nch as _) };
        self.delegate.write_doubles(WriteDoublesArgs {
            channels,
            frame_count: len as u32,
            offset: offset as usize,
            spacing: spacing as usize,
        });
    }

    fn WantMIDI(&mut self) -> bool {
        self.delegate.want_midi()
    }

    fn GetLastSecondPeaks(&mut self, sz: c_int, buf: *mut raw::ReaSample) -> c_int {
        if buf.is_null() || sz <= 0 {
            return 0;
        }
        let peaks = unsafe { std::slice::from_raw_parts_mut(buf, sz as usize) };
        self.delegate.last_second_peaks(peaks).min(sz as u32) as c_int
    }

    fn Extended(
        &mut self,
        call: c_int,
        parm1: *mut c_void,
        parm2: *mut c_void,
        parm3: *mut c_void,
    ) -> c_int {
        unsafe {
            self.delegate.extended(ExtendedArgs {
                call,
                parm_1: parm1,
                parm_2: parm2,
                parm_3: parm3,
            })
        }
    }
}

/// Creates a REAPER PCM sink for the given custom Rust implementation and returns it.
///
/// # Errors
///
/// Fails if the C++ counterpart can't be registered.
pub fn create_custom_owned_pcm_sink<S: CustomPcmSink + 'static>(
    custom_sink: S,
) -> Result<CustomOwnedPcmSink, RegistryError> {
    let adapter = PcmSinkAdapter::new(custom_sink);
    // Create the C++ counterpart sink (we need to box the Rust side twice in order to obtain
    // a thin pointer for passing it to C++ as callback target).
    let rust_sink: Box<Box<dyn reaper_abi_low::PCM_sink>> = Box::new(Box::new(adapter));
    let cpp_sink =
        unsafe { create_cpp_to_rust_pcm_sink(&CUSTOM_SINKS, rust_sink.as_ref().into())? };
    Ok(CustomOwnedPcmSink {
        cpp_sink,
        _rust_sink: rust_sink,
    })
}
