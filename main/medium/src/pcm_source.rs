#![allow(non_snake_case)]
use crate::util::{create_passing_c_str, option_as_ptr};
use crate::{
    BorrowedProjectStateContext, DurationInBeats, DurationInSeconds, ExtendedArgs, Hwnd, Hz,
    PcmSource, ReaperFunctionError, ReaperFunctionResult, ReaperStr, ReaperStringArg,
};
use once_cell::sync::Lazy;
use reaper_abi_low::{
    create_cpp_to_rust_pcm_source, create_reaper_owned_cpp_to_rust_pcm_source,
    create_rust_pcm_source_registry, delete_cpp_pcm_source, raw, ForeignHandle, LifecycleRegistry,
    PcmSourceInterface, RegistryError, RegistryMode,
};
use ref_cast::RefCast;
use std::convert::TryFrom;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{null, null_mut, NonNull};

static CUSTOM_SOURCES: Lazy<LifecycleRegistry<PcmSourceInterface>> =
    Lazy::new(|| create_rust_pcm_source_registry(RegistryMode::MultiInstance));

/// Owned PCM source.
///
/// This PCM source automatically destroys the associated C++ `PCM_source` when dropped.
#[derive(Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct OwnedPcmSource(PcmSource);

impl OwnedPcmSource {
    /// Takes ownership of the given source.
    ///
    /// # Safety
    ///
    /// You must guarantee that the given source is currently owner-less, otherwise double-free or
    /// use-after-free can occur.
    pub unsafe fn from_raw(raw: PcmSource) -> Self {
        Self(raw)
    }

    /// Gives up ownership, e.g. in order to hand the source over to REAPER.
    pub fn into_raw(self) -> PcmSource {
        let raw = self.0;
        std::mem::forget(self);
        raw
    }
}

unsafe impl Send for OwnedPcmSource {}

impl Drop for OwnedPcmSource {
    fn drop(&mut self) {
        unsafe {
            reaper_abi_low::delete_cpp_pcm_source_via_vtable(self.0);
        }
    }
}

impl AsRef<BorrowedPcmSource> for OwnedPcmSource {
    fn as_ref(&self) -> &BorrowedPcmSource {
        BorrowedPcmSource::from_raw(unsafe { self.0.as_ref() })
    }
}

impl AsMut<BorrowedPcmSource> for OwnedPcmSource {
    fn as_mut(&mut self) -> &mut BorrowedPcmSource {
        BorrowedPcmSource::from_raw_mut(unsafe { self.0.as_mut() })
    }
}

impl Deref for OwnedPcmSource {
    type Target = BorrowedPcmSource;

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl DerefMut for OwnedPcmSource {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut()
    }
}

/// Borrowed (reference-only) PCM source.
//
// Case 3: Internals exposed: no | vtable: yes
// ===========================================
#[derive(Debug, RefCast)]
#[repr(transparent)]
pub struct BorrowedPcmSource(raw::PCM_source);

impl BorrowedPcmSource {
    /// Creates a medium-level representation from the given low-level reference.
    pub fn from_raw(raw: &raw::PCM_source) -> &Self {
        Self::ref_cast(raw)
    }

    /// Creates a mutable medium-level representation from the given low-level reference.
    pub fn from_raw_mut(raw: &mut raw::PCM_source) -> &mut Self {
        Self::ref_cast_mut(raw)
    }

    /// Returns the pointer to this source.
    pub fn as_ptr(&self) -> PcmSource {
        NonNull::from(&self.0)
    }

    /// Duplicates this source.
    ///
    /// The caller owns the duplicate.
    pub fn duplicate(&self) -> Option<OwnedPcmSource> {
        let raw_duplicate = self.0.Duplicate();
        NonNull::new(raw_duplicate).map(OwnedPcmSource)
    }

    /// Returns if this source is available.
    pub fn is_available(&self) -> bool {
        self.0.IsAvailable()
    }

    pub fn set_available(&self, available: bool) {
        self.0.SetAvailable(available);
    }

    /// Grants temporary access to the type of this source.
    ///
    /// # Errors
    ///
    /// Passes an error if this source doesn't return any type.
    pub fn get_type<R>(&self, use_type: impl FnOnce(ReaperFunctionResult<&ReaperStr>) -> R) -> R {
        let ptr = self.0.GetType();
        let result =
            unsafe { create_passing_c_str(ptr) }.ok_or(ReaperFunctionError::new("no type"));
        use_type(result)
    }

    /// Grants temporary access to the file name of this source.
    ///
    /// `None` is a valid result. In that case it's not purely a file.
    pub fn get_file_name<R>(&self, use_file_name: impl FnOnce(Option<&ReaperStr>) -> R) -> R {
        let ptr = self.0.GetFileName();
        use_file_name(unsafe { create_passing_c_str(ptr) })
    }

    /// Sets the file name of this source.
    ///
    /// # Errors
    ///
    /// Returns an error if this source doesn't support changing the file name.
    pub fn set_file_name<'a>(
        &self,
        file_name: Option<impl Into<ReaperStringArg<'a>>>,
    ) -> ReaperFunctionResult<()> {
        let file_name = file_name.map(|f| f.into());
        let ptr = file_name.as_ref().map(|f| f.as_ptr()).unwrap_or(null());
        if !self.0.SetFileName(ptr) {
            return Err(ReaperFunctionError::new("couldn't set file name"));
        }
        Ok(())
    }

    /// Returns the parent source, if any.
    pub fn get_source(&self) -> Option<PcmSource> {
        NonNull::new(self.0.GetSource())
    }

    /// Sets the parent source.
    ///
    /// # Safety
    ///
    /// REAPER can crash if the given source doesn't outlive this one.
    pub unsafe fn set_source(&self, source: Option<PcmSource>) {
        self.0
            .SetSource(source.map(|s| s.as_ptr()).unwrap_or(null_mut()));
    }

    pub fn get_num_channels(&self) -> u32 {
        self.0.GetNumChannels().max(0) as u32
    }

    /// Returns `None` if the sample rate is unknown.
    pub fn get_sample_rate(&self) -> Option<Hz> {
        Hz::try_from(self.0.GetSampleRate()).ok()
    }

    /// Returns the length of this source.
    ///
    /// `None` if it doesn't have a length.
    pub fn get_length(&self) -> Option<DurationInSeconds> {
        DurationInSeconds::try_from(self.0.GetLength()).ok()
    }

    /// Returns the length of this source in beats.
    ///
    /// `None` if this source is not beat-based.
    pub fn get_length_beats(&self) -> Option<DurationInBeats> {
        DurationInBeats::try_from(self.0.GetLengthBeats()).ok()
    }

    /// Returns the bit depth, if known.
    pub fn get_bits_per_sample(&self) -> Option<u32> {
        let bits = self.0.GetBitsPerSample();
        if bits <= 0 {
            return None;
        }
        Some(bits as u32)
    }

    /// Returns the preferred position within the project.
    ///
    /// `None` if this source doesn't have any.
    pub fn get_preferred_position(&self) -> Option<DurationInSeconds> {
        DurationInSeconds::try_from(self.0.GetPreferredPosition()).ok()
    }

    /// Opens the properties window of this source.
    pub fn properties_window(&self, parent_window: Option<Hwnd>) -> i32 {
        self.0
            .PropertiesWindow(parent_window.map(|w| w.as_ptr()).unwrap_or(null_mut()))
    }

    /// Lets this source write samples into the given transfer block.
    ///
    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn get_samples(&self, block: *mut raw::PCM_source_transfer_t) {
        self.0.GetSamples(block);
    }

    /// Lets this source write peaks into the given transfer block.
    ///
    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn get_peak_info(&self, block: *mut raw::PCM_source_peaktransfer_t) {
        self.0.GetPeakInfo(block);
    }

    /// Writes the state of this source as chunk lines into the given context.
    pub fn save_state(&self, context: &mut BorrowedProjectStateContext) {
        self.0.SaveState(context.as_mut());
    }

    /// Restores the state of this source from the given context.
    ///
    /// `first_line` is the line that opened the source chunk (e.g. `<SOURCE WAVE`).
    ///
    /// # Errors
    ///
    /// Returns an error if the state couldn't be loaded.
    pub fn load_state<'a>(
        &self,
        first_line: impl Into<ReaperStringArg<'a>>,
        context: &mut BorrowedProjectStateContext,
    ) -> ReaperFunctionResult<()> {
        let first_line = first_line.into();
        let result = self.0.LoadState(first_line.as_ptr(), context.as_mut());
        if result == -1 {
            return Err(ReaperFunctionError::new("couldn't load state"));
        }
        Ok(())
    }

    pub fn peaks_clear(&self, delete_file: bool) {
        self.0.Peaks_Clear(delete_file);
    }

    /// Returns `true` if peaks need to be built.
    ///
    /// In that case, call [`peaks_build_run()`](#method.peaks_build_run) repeatedly and finally
    /// [`peaks_build_finish()`](#method.peaks_build_finish).
    pub fn peaks_build_begin(&self) -> bool {
        self.0.PeaksBuild_Begin() != 0
    }

    /// Returns `true` as long as building is not finished.
    pub fn peaks_build_run(&self) -> bool {
        self.0.PeaksBuild_Run() != 0
    }

    pub fn peaks_build_finish(&self) {
        self.0.PeaksBuild_Finish();
    }

    /// Invokes a source-specific extension.
    ///
    /// # Safety
    ///
    /// REAPER can crash if you pass parameters that don't fit the call code.
    pub unsafe fn extended(&self, args: ExtendedArgs) -> i32 {
        self.0
            .Extended(args.call, args.parm_1, args.parm_2, args.parm_3)
    }
}

impl AsRef<raw::PCM_source> for BorrowedPcmSource {
    fn as_ref(&self) -> &raw::PCM_source {
        &self.0
    }
}

impl AsMut<raw::PCM_source> for BorrowedPcmSource {
    fn as_mut(&mut self) -> &mut raw::PCM_source {
        &mut self.0
    }
}

/// Consumers can implement this trait in order to provide own PCM source types.
pub trait CustomPcmSource {
    /// Returns a copy of this source.
    ///
    /// REAPER owns the copy. It's freed as soon as REAPER deletes it. Returning `None` means that
    /// this source can't be duplicated.
    fn duplicate(&mut self) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    fn is_available(&mut self) -> bool;

    fn set_available(&mut self, available: bool) {
        let _ = available;
    }

    /// Returns the source type, e.g. `WAVE` or `MIDI`.
    fn get_type(&mut self) -> &ReaperStr;

    fn get_file_name(&mut self) -> Option<&ReaperStr> {
        None
    }

    /// Returns whether the file name could be changed.
    fn set_file_name(&mut self, file_name: Option<&ReaperStr>) -> bool {
        let _ = file_name;
        false
    }

    fn get_num_channels(&mut self) -> u32;

    fn get_sample_rate(&mut self) -> Hz;

    fn get_length(&mut self) -> DurationInSeconds;

    fn get_length_beats(&mut self) -> Option<DurationInBeats> {
        None
    }

    fn get_bits_per_sample(&mut self) -> u32 {
        0
    }

    fn get_preferred_position(&mut self) -> Option<DurationInSeconds> {
        None
    }

    fn properties_window(&mut self, parent_window: Option<Hwnd>) -> i32 {
        let _ = parent_window;
        0
    }

    /// Called in real-time threads. Must neither allocate nor block.
    ///
    /// # Safety
    ///
    /// Implementing this is unsafe because you need to deal with raw pointers.
    unsafe fn get_samples(&mut self, block: *mut raw::PCM_source_transfer_t);

    /// # Safety
    ///
    /// Implementing this is unsafe because you need to deal with raw pointers.
    unsafe fn get_peak_info(&mut self, block: *mut raw::PCM_source_peaktransfer_t) {
        let _ = block;
    }

    /// Writes the state of this source as chunk lines.
    fn save_state(&mut self, context: &mut BorrowedProjectStateContext) {
        let _ = context;
    }

    /// Restores the state of this source.
    ///
    /// Returns whether the state could be loaded.
    fn load_state(
        &mut self,
        first_line: &ReaperStr,
        context: &mut BorrowedProjectStateContext,
    ) -> bool {
        let _ = (first_line, context);
        false
    }

    fn peaks_clear(&mut self, delete_file: bool) {
        let _ = delete_file;
    }

    /// Returns whether peaks need to be built.
    fn peaks_build_begin(&mut self) -> bool {
        false
    }

    /// Returns whether building needs to go on.
    fn peaks_build_run(&mut self) -> bool {
        false
    }

    fn peaks_build_finish(&mut self) {}

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

/// Represents an owned PCM source that is backed by a Rust [`CustomPcmSource`] trait
/// implementation.
///
/// Dropping it destroys the C++ counterpart. Duplicates created by REAPER are independent of this
/// value.
pub struct CustomOwnedPcmSource {
    // Those 2 belong together. `cpp_source` without `rust_source` = crash. Never let them apart!
    cpp_source: NonNull<raw::PCM_source>,
    /// Never read but important to keep in memory.
    #[allow(clippy::redundant_allocation)]
    _rust_source: Box<Box<dyn reaper_abi_low::PCM_source>>,
}

impl fmt::Debug for CustomOwnedPcmSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CustomOwnedPcmSource")
            .field("cpp_source", &self.cpp_source)
            .finish()
    }
}

impl CustomOwnedPcmSource {
    /// Returns the C++ counterpart which can be passed to REAPER.
    pub fn as_ptr(&self) -> PcmSource {
        self.cpp_source
    }
}

impl Drop for CustomOwnedPcmSource {
    fn drop(&mut self) {
        unsafe {
            delete_cpp_pcm_source(&CUSTOM_SOURCES, self.cpp_source);
        }
    }
}

impl AsRef<BorrowedPcmSource> for CustomOwnedPcmSource {
    fn as_ref(&self) -> &BorrowedPcmSource {
        BorrowedPcmSource::from_raw(unsafe { self.cpp_source.as_ref() })
    }
}

impl AsMut<BorrowedPcmSource> for CustomOwnedPcmSource {
    fn as_mut(&mut self) -> &mut BorrowedPcmSource {
        BorrowedPcmSource::from_raw_mut(unsafe { self.cpp_source.as_mut() })
    }
}

// Frees the Rust side of a duplicate after REAPER deleted its C++ side.
unsafe extern "C" fn release_reaper_owned_source(handle: ForeignHandle) {
    let rust_source = handle.as_ptr() as *mut Box<dyn reaper_abi_low::PCM_source>;
    drop(Box::from_raw(rust_source));
}

#[derive(Debug)]
struct PcmSourceAdapter<S: CustomPcmSource> {
    delegate: S,
}

impl<S: CustomPcmSource + 'static> PcmSourceAdapter<S> {
    pub fn new(delegate: S) -> Self {
        Self { delegate }
    }

    fn register_reaper_owned(delegate: S) -> Option<NonNull<raw::PCM_source>> {
        let rust_source: Box<Box<dyn reaper_abi_low::PCM_source>> =
            Box::new(Box::new(PcmSourceAdapter::new(delegate)));
        let thin_ptr = NonNull::from(Box::leak(rust_source));
        let result = unsafe {
            create_reaper_owned_cpp_to_rust_pcm_source(
                &CUSTOM_SOURCES,
                thin_ptr,
                release_reaper_owned_source,
            )
        };
        match result {
            Ok(cpp_source) => Some(cpp_source),
            Err(error) => {
                tracing::warn!(msg = "Couldn't register duplicated PCM source", %error);
                drop(unsafe { Box::from_raw(thin_ptr.as_ptr()) });
                None
            }
        }
    }
}

impl<S: CustomPcmSource + 'static> reaper_abi_low::PCM_source for PcmSourceAdapter<S> {
    fn Duplicate(&mut self) -> *mut raw::PCM_source {
        self.delegate
            .duplicate()
            .and_then(Self::register_reaper_owned)
            .map(|s| s.as_ptr())
            .unwrap_or(null_mut())
    }

    fn IsAvailable(&mut self) -> bool {
        self.delegate.is_available()
    }

    fn SetAvailable(&mut self, avail: bool) {
        self.delegate.set_available(avail);
    }

    fn GetType(&mut self) -> *const c_char {
        self.delegate.get_type().as_ptr()
    }

    fn GetFileName(&mut self) -> *const c_char {
        option_as_ptr(self.delegate.get_file_name())
    }

    fn SetFileName(&mut self, newfn: *const c_char) -> bool {
        let file_name = unsafe { create_passing_c_str(newfn) };
        self.delegate.set_file_name(file_name)
    }

    fn GetNumChannels(&mut self) -> c_int {
        self.delegate.get_num_channels() as _
    }

    fn GetSampleRate(&mut self) -> f64 {
        self.delegate.get_sample_rate().get()
    }

    fn GetLength(&mut self) -> f64 {
        self.delegate.get_length().get()
    }

    fn GetLengthBeats(&mut self) -> f64 {
        self.delegate
            .get_length_beats()
            .map(|l| l.get())
            .unwrap_or(-1.0)
    }

    fn GetBitsPerSample(&mut self) -> c_int {
        self.delegate.get_bits_per_sample() as _
    }

    fn GetPreferredPosition(&mut self) -> f64 {
        self.delegate
            .get_preferred_position()
            .map(|p| p.get())
            .unwrap_or(-1.0)
    }

    fn PropertiesWindow(&mut self, hwndParent: raw::HWND) -> c_int {
        self.delegate.properties_window(NonNull::new(hwndParent))
    }

    fn GetSamples(&mut self, block: *mut raw::PCM_source_transfer_t) {
        if block.is_null() {
            return;
        }
        unsafe { self.delegate.get_samples(block) }
    }

    fn GetPeakInfo(&mut self, block: *mut raw::PCM_source_peaktransfer_t) {
        if block.is_null() {
            return;
        }
        unsafe { self.delegate.get_peak_info(block) }
    }

    fn SaveState(&mut self, ctx: *mut raw::ProjectStateContext) {
        if let Some(ctx) = unsafe { ctx.as_mut() } {
            self.delegate
                .save_state(BorrowedProjectStateContext::from_raw_mut(ctx));
        }
    }

    fn LoadState(&mut self, firstline: *const c_char, ctx: *mut raw::ProjectStateContext) -> c_int {
        let (first_line, ctx) = match (unsafe { create_passing_c_str(firstline) }, unsafe {
            ctx.as_mut()
        }) {
            (Some(l), Some(c)) => (l, BorrowedProjectStateContext::from_raw_mut(c)),
            _ => return -1,
        };
        if self.delegate.load_state(first_line, ctx) {
            0
        } else {
            -1
        }
    }

    fn Peaks_Clear(&mut self, deleteFile: bool) {
        self.delegate.peaks_clear(deleteFile);
    }

    fn PeaksBuild_Begin(&mut self) -> c_int {
        self.delegate.peaks_build_begin() as c_int
    }

    fn PeaksBuild_Run(&mut self) -> c_int {
        self.delegate.peaks_build_run() as c_int
    }

    fn PeaksBuild_Finish(&mut self) {
        self.delegate.peaks_build_finish();
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

/// Creates a REAPER PCM source for the given custom Rust implementation and returns it.
///
/// # Errors
///
/// Fails if the C++ counterpart can't be registered.
pub fn create_custom_owned_pcm_source<S: CustomPcmSource + 'static>(
    custom_source: S,
) -> Result<CustomOwnedPcmSource, RegistryError> {
    let adapter = PcmSourceAdapter::new(custom_source);
    // Create the C++ counterpart source (we need to box the Rust side twice in order to obtain
    // a thin pointer for passing it to C++ as callback target).
    let rust_source: Box<Box<dyn reaper_abi_low::PCM_source>> = Box::new(Box::new(adapter));
    let cpp_source =
        unsafe { create_cpp_to_rust_pcm_source(&CUSTOM_SOURCES, rust_source.as_ref().into())? };
    Ok(CustomOwnedPcmSource {
        cpp_source,
        _rust_source: rust_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_custom_owned_project_state_context, CustomProjectStateContext, ReaperString};
    use c_str_macro::c_str;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct TestSource {
        live_instances: Arc<AtomicUsize>,
        loaded: Arc<Mutex<Vec<String>>>,
    }

    impl TestSource {
        fn new(live_instances: Arc<AtomicUsize>) -> Self {
            live_instances.fetch_add(1, Ordering::SeqCst);
            Self {
                live_instances,
                loaded: Default::default(),
            }
        }
    }

    impl Drop for TestSource {
        fn drop(&mut self) {
            self.live_instances.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl CustomPcmSource for TestSource {
        fn duplicate(&mut self) -> Option<Self> {
            Some(TestSource::new(self.live_instances.clone()))
        }

        fn is_available(&mut self) -> bool {
            true
        }

        fn get_type(&mut self) -> &ReaperStr {
            unsafe { ReaperStr::from_ptr(c_str!("TEST").as_ptr()) }
        }

        fn get_num_channels(&mut self) -> u32 {
            2
        }

        fn get_sample_rate(&mut self) -> Hz {
            Hz::new(48000.0)
        }

        fn get_length(&mut self) -> DurationInSeconds {
            DurationInSeconds::new(4.0)
        }

        unsafe fn get_samples(&mut self, _: *mut raw::PCM_source_transfer_t) {}

        fn save_state(&mut self, context: &mut BorrowedProjectStateContext) {
            context.add_line("FILE \"drums.wav\"");
        }

        fn load_state(
            &mut self,
            first_line: &ReaperStr,
            context: &mut BorrowedProjectStateContext,
        ) -> bool {
            let mut loaded = self.loaded.lock().unwrap();
            loaded.push(first_line.to_str().to_owned());
            while let Some(line) = context.get_line() {
                loaded.push(line.into_string());
            }
            true
        }
    }

    #[derive(Default)]
    struct Chunk {
        written: Arc<Mutex<Vec<String>>>,
        to_read: VecDeque<ReaperString>,
        current: Option<ReaperString>,
    }

    impl CustomProjectStateContext for Chunk {
        fn add_line(&mut self, line: &ReaperStr) {
            self.written.lock().unwrap().push(line.to_str().to_owned());
        }

        fn get_line(&mut self) -> Option<&ReaperStr> {
            self.current = self.to_read.pop_front();
            self.current.as_deref()
        }
    }

    #[test]
    fn accessors_reach_custom_source() {
        let source =
            create_custom_owned_pcm_source(TestSource::new(Default::default())).unwrap();
        let borrowed = source.as_ref();
        assert!(borrowed.is_available());
        assert_eq!(
            borrowed.get_type(|t| t.map(|t| t.to_str().to_owned())),
            Ok("TEST".to_owned())
        );
        assert_eq!(borrowed.get_file_name(|n| n.is_none()), true);
        assert!(borrowed.set_file_name(Some("other.wav")).is_err());
        assert_eq!(borrowed.get_num_channels(), 2);
        assert_eq!(borrowed.get_sample_rate(), Some(Hz::new(48000.0)));
        assert_eq!(borrowed.get_length(), Some(DurationInSeconds::new(4.0)));
        assert_eq!(borrowed.get_length_beats(), None);
        assert_eq!(borrowed.get_bits_per_sample(), None);
        assert_eq!(borrowed.get_preferred_position(), None);
        assert!(!borrowed.peaks_build_begin());
    }

    #[test]
    fn duplicate_is_freed_when_dropped() {
        // Given
        let live_instances = Arc::new(AtomicUsize::new(0));
        let source = create_custom_owned_pcm_source(TestSource::new(live_instances.clone()))
            .unwrap();
        // When
        let duplicate = source.as_ref().duplicate().unwrap();
        // Then
        assert_eq!(live_instances.load(Ordering::SeqCst), 2);
        assert_eq!(duplicate.get_length(), Some(DurationInSeconds::new(4.0)));
        // When
        drop(duplicate);
        // Then
        assert_eq!(live_instances.load(Ordering::SeqCst), 1);
        drop(source);
        assert_eq!(live_instances.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn state_goes_through_project_state_context() {
        // Given
        let test_source = TestSource::new(Default::default());
        let loaded = test_source.loaded.clone();
        let source = create_custom_owned_pcm_source(test_source).unwrap();
        let written = Arc::new(Mutex::new(vec![]));
        let mut save_context = create_custom_owned_project_state_context(Chunk {
            written: written.clone(),
            ..Default::default()
        })
        .unwrap();
        let mut load_context = create_custom_owned_project_state_context(Chunk {
            to_read: vec![ReaperString::from_str_truncating("FILE \"bass.wav\"")].into(),
            ..Default::default()
        })
        .unwrap();
        // When
        source.as_ref().save_state(save_context.as_mut());
        let result = source
            .as_ref()
            .load_state("<SOURCE TEST", load_context.as_mut());
        // Then
        assert_eq!(*written.lock().unwrap(), vec!["FILE \"drums.wav\""]);
        assert!(result.is_ok());
        assert_eq!(
            *loaded.lock().unwrap(),
            vec!["<SOURCE TEST", "FILE \"bass.wav\""]
        );
    }
}
