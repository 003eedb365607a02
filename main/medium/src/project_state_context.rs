#![allow(non_snake_case)]
use crate::util::with_string_buffer;
use crate::{ProjectStateContext, ReaperStr, ReaperString, ReaperStringArg};
use once_cell::sync::Lazy;
use reaper_abi_low::{
    copy_to_raw_c_buffer, create_cpp_to_rust_project_state_context,
    create_rust_project_state_context_registry, delete_cpp_project_state_context, raw,
    LifecycleRegistry, ProjectStateContextInterface, RegistryError, RegistryMode,
};
use ref_cast::RefCast;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::os::raw::{c_char, c_int};
use std::ptr::NonNull;

/// Lines in project files are limited to this length by REAPER.
const MAX_LINE_LENGTH: u32 = 4096;

static CUSTOM_CONTEXTS: Lazy<LifecycleRegistry<ProjectStateContextInterface>> =
    Lazy::new(|| create_rust_project_state_context_registry(RegistryMode::MultiInstance));

/// Owned project state context.
///
/// This project state context automatically destroys the associated C++ `ProjectStateContext` when
/// dropped.
#[derive(Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct OwnedProjectStateContext(ProjectStateContext);

impl OwnedProjectStateContext {
    /// Takes ownership of the given context.
    ///
    /// # Safety
    ///
    /// You must guarantee that the given context is currently owner-less, otherwise double-free or
    /// use-after-free can occur.
    pub unsafe fn from_raw(raw: ProjectStateContext) -> Self {
        Self(raw)
    }
}

unsafe impl Send for OwnedProjectStateContext {}

impl Drop for OwnedProjectStateContext {
    fn drop(&mut self) {
        unsafe {
            reaper_abi_low::delete_cpp_project_state_context_via_vtable(self.0);
        }
    }
}

impl AsRef<BorrowedProjectStateContext> for OwnedProjectStateContext {
    fn as_ref(&self) -> &BorrowedProjectStateContext {
        BorrowedProjectStateContext::from_raw(unsafe { self.0.as_ref() })
    }
}

impl AsMut<BorrowedProjectStateContext> for OwnedProjectStateContext {
    fn as_mut(&mut self) -> &mut BorrowedProjectStateContext {
        BorrowedProjectStateContext::from_raw_mut(unsafe { self.0.as_mut() })
    }
}

impl Deref for OwnedProjectStateContext {
    type Target = BorrowedProjectStateContext;

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl DerefMut for OwnedProjectStateContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut()
    }
}

/// Borrowed (reference-only) project state context.
//
// Case 3: Internals exposed: no | vtable: yes
// ===========================================
#[derive(Debug, RefCast)]
#[repr(transparent)]
pub struct BorrowedProjectStateContext(raw::ProjectStateContext);

impl BorrowedProjectStateContext {
    /// Creates a medium-level representation from the given low-level reference.
    pub fn from_raw(raw: &raw::ProjectStateContext) -> &Self {
        Self::ref_cast(raw)
    }

    /// Creates a mutable medium-level representation from the given low-level reference.
    pub fn from_raw_mut(raw: &mut raw::ProjectStateContext) -> &mut Self {
        Self::ref_cast_mut(raw)
    }

    /// Returns the pointer to this context.
    pub fn as_ptr(&self) -> ProjectStateContext {
        NonNull::from(&self.0)
    }

    /// Writes the given line to this project state.
    ///
    /// The line is taken verbatim, `%` characters are not interpreted as format directives.
    pub fn add_line<'a>(&mut self, line: impl Into<ReaperStringArg<'a>>) {
        let line = line.into();
        unsafe { self.0.AddLine(line.as_ptr()) }
    }

    /// Reads the next line from this project state.
    ///
    /// Returns `None` if there are no lines left.
    pub fn get_line(&mut self) -> Option<ReaperString> {
        let (line, result) = with_string_buffer(MAX_LINE_LENGTH, |buffer, max_size| unsafe {
            self.0.GetLine(buffer, max_size)
        });
        if result != 0 {
            return None;
        }
        Some(line)
    }

    /// Returns the number of bytes written so far.
    pub fn output_size(&mut self) -> u64 {
        self.0.GetOutputSize().max(0) as u64
    }

    /// Returns the temporary flag.
    ///
    /// REAPER sets it e.g. while saving undo states.
    pub fn temp_flag(&mut self) -> i32 {
        self.0.GetTempFlag()
    }

    pub fn set_temp_flag(&mut self, flag: i32) {
        self.0.SetTempFlag(flag);
    }
}

impl AsRef<raw::ProjectStateContext> for BorrowedProjectStateContext {
    fn as_ref(&self) -> &raw::ProjectStateContext {
        &self.0
    }
}

impl AsMut<raw::ProjectStateContext> for BorrowedProjectStateContext {
    fn as_mut(&mut self) -> &mut raw::ProjectStateContext {
        &mut self.0
    }
}

/// Consumers can implement this trait in order to provide own project state context types.
pub trait CustomProjectStateContext {
    /// Receives a line written to this project state.
    ///
    /// Format strings passed by REAPER have already been rendered at this point.
    fn add_line(&mut self, line: &ReaperStr);

    /// Returns the next line or `None` if no lines left.
    ///
    /// Lines longer than the buffer REAPER provides are truncated.
    fn get_line(&mut self) -> Option<&ReaperStr>;

    /// Returns output size written so far.
    fn output_size(&mut self) -> u64 {
        0
    }

    fn temp_flag(&mut self) -> i32 {
        0
    }

    fn set_temp_flag(&mut self, flag: i32) {
        let _ = flag;
    }
}

/// Represents an owned project state context that is backed by a Rust
/// [`CustomProjectStateContext`] trait implementation.
///
/// Dropping it destroys the C++ counterpart.
pub struct CustomOwnedProjectStateContext {
    // Those 2 belong together. `cpp_context` without `rust_context` = crash. Never let them apart!
    cpp_context: NonNull<raw::ProjectStateContext>,
    /// Never read but important to keep in memory.
    #[allow(clippy::redundant_allocation)]
    _rust_context: Box<Box<dyn reaper_abi_low::ProjectStateContext>>,
}

impl fmt::Debug for CustomOwnedProjectStateContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CustomOwnedProjectStateContext")
            .field("cpp_context", &self.cpp_context)
            .finish()
    }
}

impl CustomOwnedProjectStateContext {
    /// Returns the C++ counterpart which can be passed to REAPER.
    pub fn as_ptr(&self) -> ProjectStateContext {
        self.cpp_context
    }
}

impl Drop for CustomOwnedProjectStateContext {
    fn drop(&mut self) {
        unsafe {
            delete_cpp_project_state_context(&CUSTOM_CONTEXTS, self.cpp_context);
        }
    }
}

impl AsRef<BorrowedProjectStateContext> for CustomOwnedProjectStateContext {
    fn as_ref(&self) -> &BorrowedProjectStateContext {
        BorrowedProjectStateContext::from_raw(unsafe { self.cpp_context.as_ref() })
    }
}

impl AsMut<BorrowedProjectStateContext> for CustomOwnedProjectStateContext {
    fn as_mut(&mut self) -> &mut BorrowedProjectStateContext {
        BorrowedProjectStateContext::from_raw_mut(unsafe { self.cpp_context.as_mut() })
    }
}

#[derive(Debug)]
struct ProjectStateContextAdapter<S: CustomProjectStateContext> {
    delegate: S,
}

impl<S: CustomProjectStateContext> ProjectStateContextAdapter<S> {
    pub fn new(delegate: S) -> Self {
        Self { delegate }
    }
}

impl<S: CustomProjectStateContext> reaper_abi_low::ProjectStateContext
    for ProjectStateContextAdapter<S>
{
    fn AddLine(&mut self, line: *const c_char) {
        if line.is_null() {
            return;
        }
        let line = unsafe { ReaperStr::from_ptr(line) };
        self.delegate.add_line(line);
    }

    fn GetLine(&mut self, buf: *mut c_char, buflen: c_int) -> c_int {
        match self.delegate.get_line() {
            None => -1,
            Some(line) => {
                unsafe { copy_to_raw_c_buffer(line.as_c_str().to_bytes(), buf, buflen) };
                0
            }
        }
    }

    fn GetOutputSize(&mut self) -> raw::INT64 {
        self.delegate.output_size() as _
    }

    fn GetTempFlag(&mut self) -> c_int {
        self.delegate.temp_flag()
    }

    fn SetTempFlag(&mut self, flag: c_int) {
        self.delegate.set_temp_flag(flag);
    }
}

/// Creates a REAPER project state context for the given custom Rust implementation and returns it.
///
/// # Errors
///
/// Fails if the C++ counterpart can't be registered.
pub fn create_custom_owned_project_state_context<C: CustomProjectStateContext + 'static>(
    custom_context: C,
) -> Result<CustomOwnedProjectStateContext, RegistryError> {
    let adapter = ProjectStateContextAdapter::new(custom_context);
    // Create the C++ counterpart context (we need to box the Rust side twice in order to obtain
    // a thin pointer for passing it to C++ as callback target).
    let rust_context: Box<Box<dyn reaper_abi_low::ProjectStateContext>> =
        Box::new(Box::new(adapter));
    let cpp_context = unsafe {
        create_cpp_to_rust_project_state_context(&CUSTOM_CONTEXTS, rust_context.as_ref().into())?
    };
    Ok(CustomOwnedProjectStateContext {
        cpp_context,
        _rust_context: rust_context,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MemoryContext {
        written: Arc<Mutex<Vec<String>>>,
        to_read: VecDeque<ReaperString>,
        current: Option<ReaperString>,
        temp_flag: i32,
    }

    impl CustomProjectStateContext for MemoryContext {
        fn add_line(&mut self, line: &ReaperStr) {
            self.written.lock().unwrap().push(line.to_str().to_owned());
        }

        fn get_line(&mut self) -> Option<&ReaperStr> {
            self.current = self.to_read.pop_front();
            self.current.as_deref()
        }

        fn output_size(&mut self) -> u64 {
            self.written
                .lock()
                .unwrap()
                .iter()
                .map(|l| l.len() as u64 + 1)
                .sum()
        }

        fn temp_flag(&mut self) -> i32 {
            self.temp_flag
        }

        fn set_temp_flag(&mut self, flag: i32) {
            self.temp_flag = flag;
        }
    }

    #[test]
    fn lines_written_through_reaper_arrive_verbatim() {
        // Given
        let written = Arc::new(Mutex::new(vec![]));
        let mut context = create_custom_owned_project_state_context(MemoryContext {
            written: written.clone(),
            ..Default::default()
        })
        .unwrap();
        let borrowed = context.as_mut();
        // When
        borrowed.add_line("<SOURCE WAVE");
        borrowed.add_line(String::from("VOLPAN 100% %d %s"));
        borrowed.add_line(">");
        // Then
        assert_eq!(
            *written.lock().unwrap(),
            vec!["<SOURCE WAVE", "VOLPAN 100% %d %s", ">"]
        );
        assert_eq!(borrowed.output_size(), 13 + 18 + 2);
    }

    #[test]
    fn lines_read_until_exhausted() {
        // Given
        let mut context = create_custom_owned_project_state_context(MemoryContext {
            to_read: vec![
                ReaperString::from_str_truncating("<SOURCE MIDI"),
                ReaperString::from_str_truncating(">"),
            ]
            .into(),
            ..Default::default()
        })
        .unwrap();
        let borrowed = context.as_mut();
        // When
        let first = borrowed.get_line();
        let second = borrowed.get_line();
        let third = borrowed.get_line();
        // Then
        assert_eq!(first.unwrap().into_string(), "<SOURCE MIDI");
        assert_eq!(second.unwrap().into_string(), ">");
        assert!(third.is_none());
    }

    #[test]
    fn temp_flag_round_trip() {
        let mut context = create_custom_owned_project_state_context(MemoryContext::default())
            .unwrap();
        let borrowed = context.as_mut();
        assert_eq!(borrowed.temp_flag(), 0);
        borrowed.set_temp_flag(1);
        assert_eq!(borrowed.temp_flag(), 1);
    }
}
