use crate::{ReaperStr, ReaperString};
use std::os::raw::c_char;

/// Interprets a C string returned by REAPER. `None` if it's null.
pub(crate) unsafe fn create_passing_c_str<'a>(ptr: *const c_char) -> Option<&'a ReaperStr> {
    if ptr.is_null() {
        return None;
    }
    Some(ReaperStr::from_ptr(ptr))
}

/// Lets REAPER fill a fresh buffer of the given size and returns its content together with the
/// result of the filling function.
pub(crate) fn with_string_buffer<T>(
    max_size: u32,
    fill_buffer: impl FnOnce(*mut c_char, i32) -> T,
) -> (ReaperString, T) {
    let mut buffer = vec![0 as c_char; max_size as usize];
    let result = fill_buffer(buffer.as_mut_ptr(), max_size as i32);
    (ReaperString::from_c_buffer(&buffer), result)
}

/// Returns a pointer which is null if the string is `None`.
pub(crate) fn option_as_ptr(s: Option<&ReaperStr>) -> *const c_char {
    s.map(|s| s.as_ptr()).unwrap_or(std::ptr::null())
}
