use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard};

/// This function catches panics before they reach REAPER.
///
/// This function is supposed to be wrapped around all Rust code that is called directly by REAPER,
/// e.g. control surface callbacks or sink callbacks. Its purpose it to establish a fault barrier in
/// order to prevent REAPER from crashing if a non-recoverable error occurs in the plug-in (a
/// panic). Unwinding across the C ABI boundary would be undefined behavior.
///
/// Right now this doesn't do anything else than calling `catch_unwind()` but it might do more in
/// future. Please note that logging is *not* supposed to be done here. It should be done in the
/// panic hook instead.
pub fn firewall<F: FnOnce() -> R, R>(f: F) -> Option<R> {
    catch_unwind(AssertUnwindSafe(f)).ok()
}

/// Result of [`copy_to_c_buffer()`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct BufferCopy {
    /// Number of bytes written into the buffer, including the terminating NUL.
    pub written: usize,
    /// Number of bytes the buffer would need to hold the complete string, including the
    /// terminating NUL.
    pub required: usize,
}

impl BufferCopy {
    /// Returns whether the string didn't fit completely.
    pub fn is_truncated(&self) -> bool {
        self.written < self.required
    }
}

/// Copies the given bytes into a caller-provided C string buffer.
///
/// The result is always NUL-terminated (unless the buffer is empty) and never overflows the
/// buffer. If the string doesn't fit, it's truncated and `required` tells the caller how large the
/// buffer should have been. Doesn't allocate.
pub fn copy_to_c_buffer(src: &[u8], dst: &mut [c_char]) -> BufferCopy {
    let required = src.len() + 1;
    if dst.is_empty() {
        return BufferCopy {
            written: 0,
            required,
        };
    }
    let content_len = src.len().min(dst.len() - 1);
    for (d, s) in dst.iter_mut().zip(&src[..content_len]) {
        *d = *s as c_char;
    }
    dst[content_len] = 0;
    BufferCopy {
        written: content_len + 1,
        required,
    }
}

/// Like [`copy_to_c_buffer()`] but takes a raw buffer pointer and length as passed by REAPER.
///
/// # Safety
///
/// `buf` must either be null or point to at least `buflen` writable bytes.
pub unsafe fn copy_to_raw_c_buffer(src: &[u8], buf: *mut c_char, buflen: i32) -> BufferCopy {
    if buf.is_null() || buflen <= 0 {
        return BufferCopy {
            written: 0,
            required: src.len() + 1,
        };
    }
    let dst = std::slice::from_raw_parts_mut(buf, buflen as usize);
    copy_to_c_buffer(src, dst)
}

/// Locks the given mutex even if another thread panicked while holding it.
///
/// Registry state stays consistent across panics because it's only mutated in short sections
/// which don't call user code.
pub fn lock_ignoring_poisoning<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
