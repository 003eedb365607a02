use std::borrow::{Borrow, Cow};
use std::ffi::{CStr, CString};
use std::fmt;
use std::ops::Deref;
use std::os::raw::c_char;

/// A string parameter.
///
/// Medium-level functions with string parameters accept all kinds of strings which can be
/// converted into this type, most notably `&ReaperStr` and `&str`.
///
/// # Design
///
/// This is a wrapper around a `Cow<ReaperStr>`, where `ReaperStr` is essentially a `CStr` with
/// UTF-8 guarantee. The C++ interfaces expect C strings (`*const c_char`), fortunately UTF-8
/// encoded ones, so no character set conversion is necessary.
///
/// A conversion from a regular Rust string is not entirely without cost because we need to append
/// a zero byte (which demands a copy if a borrowed string is passed). If you have cheap access to a
/// C string, e.g. a `c_str!("...")` literal, pass that one directly.
//
// This type doesn't need to derive common traits because the consumer never interacts with it
// directly.
pub struct ReaperStringArg<'a>(Cow<'a, ReaperStr>);

impl<'a> ReaperStringArg<'a> {
    /// Returns a raw pointer to the string. Used by code in this crate only.
    pub(crate) fn as_ptr(&self) -> *const c_char {
        self.0.as_c_str().as_ptr()
    }

    /// Consumes this value and spits out the contained cow.
    pub fn into_inner(self) -> Cow<'a, ReaperStr> {
        self.0
    }
}

// Especially suited for passing strings returned by REAPER directly back into REAPER.
impl<'a> From<&'a ReaperStr> for ReaperStringArg<'a> {
    fn from(s: &'a ReaperStr) -> Self {
        ReaperStringArg(s.into())
    }
}

impl From<ReaperString> for ReaperStringArg<'static> {
    fn from(s: ReaperString) -> Self {
        ReaperStringArg(s.into())
    }
}

impl<'a> From<&'a str> for ReaperStringArg<'a> {
    fn from(s: &'a str) -> Self {
        ReaperStringArg(ReaperString::from_str_truncating(s).into())
    }
}

// Takes ownership so no copy needs to be made in order to convert this into a C string.
impl<'a> From<String> for ReaperStringArg<'a> {
    fn from(s: String) -> Self {
        ReaperStringArg(ReaperString::from_string_truncating(s).into())
    }
}

/// An owned string created by REAPER or passed to REAPER.
///
/// This is is essentially a `CString` with UTF-8 guarantee.
//
// It's important that this string is guaranteed to be UTF-8. We achieve that by trusting REAPER
// that it returns UTF-8 strings and by letting consumers create such strings via Rust strings only.
// So there must not be a safe public conversion from `CString` into `ReaperString`!
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct ReaperString(CString);

impl ReaperString {
    /// Creates a REAPER string wrapping the given `CString`.
    ///
    /// # Safety
    ///
    /// You must ensure that the given `CString` is encoded in UTF-8.
    pub unsafe fn new_unchecked(inner: CString) -> ReaperString {
        ReaperString(inner)
    }

    // Rust strings can contain nul bytes. C consumers stop reading at the first one anyway, so we
    // cut the string there instead of failing.
    pub(crate) fn from_str_truncating(s: &str) -> ReaperString {
        Self::from_string_truncating(s.to_owned())
    }

    pub(crate) fn from_string_truncating(s: String) -> ReaperString {
        let mut bytes = s.into_bytes();
        if let Some(pos) = bytes.iter().position(|b| *b == 0) {
            bytes.truncate(pos);
        }
        // A nul byte is always a char boundary, so the rest is still valid UTF-8.
        ReaperString(CString::new(bytes).unwrap_or_default())
    }

    /// Copies a C string that was written into a buffer by REAPER.
    ///
    /// Bytes that are not valid UTF-8 are replaced.
    pub(crate) fn from_c_buffer(buffer: &[c_char]) -> ReaperString {
        let bytes: Vec<u8> = buffer
            .iter()
            .take_while(|c| **c != 0)
            .map(|c| *c as u8)
            .collect();
        Self::from_string_truncating(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Returns a raw pointer to the string. Used by code in this crate only.
    pub(crate) fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr()
    }

    /// Consumes this value and spits out the contained C string.
    pub fn into_inner(self) -> CString {
        self.0
    }

    /// Converts to a slice.
    pub fn as_reaper_str(&self) -> &ReaperStr {
        self
    }

    /// Consumes this value and converts it to an owned Rust string.
    pub fn into_string(self) -> String {
        self.as_reaper_str().to_str().to_owned()
    }
}

// Necessary for `ToOwned` in other direction.
impl Borrow<ReaperStr> for ReaperString {
    fn borrow(&self) -> &ReaperStr {
        unsafe { ReaperStr::new(&self.0) }
    }
}

// Analogously to CString -> CStr.
impl Deref for ReaperString {
    type Target = ReaperStr;

    fn deref(&self) -> &Self::Target {
        unsafe { ReaperStr::new(&self.0) }
    }
}

impl<'a> From<ReaperString> for Cow<'a, ReaperStr> {
    fn from(value: ReaperString) -> Self {
        Cow::Owned(value)
    }
}

/// A borrowed string owned by REAPER.
///
/// See [`ReaperString`] for further details.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ReaperStr(CStr);

impl ReaperStr {
    // Don't make this public, it's unsafe because a CStr can be non-UTF-8!
    // This uses the same technique like `Path`.
    pub(crate) unsafe fn new(inner: &CStr) -> &ReaperStr {
        &*(inner as *const CStr as *const ReaperStr)
    }

    /// Wraps a raw C string with a safe REAPER string wrapper.
    ///
    /// # Safety
    ///
    /// You must ensure that the given pointer refers to a valid UTF-8 encoded C string which lives
    /// at least for `'a`.
    pub unsafe fn from_ptr<'a>(ptr: *const c_char) -> &'a ReaperStr {
        ReaperStr::new(CStr::from_ptr(ptr))
    }

    /// Returns a raw pointer to the string.
    pub fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr()
    }

    /// Converts a `ReaperStr` to an owned [`ReaperString`].
    pub fn to_reaper_string(&self) -> ReaperString {
        ReaperString(self.0.to_owned())
    }

    /// Yields the underlying `&CStr`.
    pub fn as_c_str(&self) -> &CStr {
        &self.0
    }

    /// Converts this value to a Rust string slice.
    ///
    /// If REAPER broke the UTF-8 promise, this returns the valid prefix only.
    pub fn to_str(&self) -> &str {
        let bytes = self.0.to_bytes();
        match std::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        }
    }
}

// With this we can just write `to_string()` on a borrowed REAPER string as we are used to in Rust.
impl fmt::Display for ReaperStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl Default for &ReaperStr {
    fn default() -> Self {
        unsafe { ReaperStr::new(Default::default()) }
    }
}

impl ToOwned for ReaperStr {
    type Owned = ReaperString;

    fn to_owned(&self) -> ReaperString {
        self.to_reaper_string()
    }
}

impl<'a> From<&'a ReaperStr> for Cow<'a, ReaperStr> {
    fn from(value: &'a ReaperStr) -> Self {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c_str_macro::c_str;

    #[test]
    fn interior_nul_cuts_string() {
        let arg: ReaperStringArg = "abc\0def".into();
        assert_eq!(arg.into_inner().to_str(), "abc");
    }

    #[test]
    fn invalid_utf8_yields_valid_prefix() {
        let s = unsafe { ReaperStr::new(c_str!("ok\u{e9}")) };
        assert_eq!(s.to_str(), "ok\u{e9}");
        let raw: &[u8] = b"ok\xff\xfe\0";
        let cstr = CStr::from_bytes_with_nul(raw).unwrap();
        let s = unsafe { ReaperStr::new(cstr) };
        assert_eq!(s.to_str(), "ok");
    }

    #[test]
    fn from_c_buffer_stops_at_nul() {
        let buffer: Vec<c_char> = b"<SOURCE\0garbage".iter().map(|b| *b as c_char).collect();
        assert_eq!(ReaperString::from_c_buffer(&buffer).into_string(), "<SOURCE");
    }
}
