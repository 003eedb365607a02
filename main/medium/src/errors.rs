use derive_more::*;
use std::fmt::{Debug, Display};

/// An error which can occur when calling a virtual function of a REAPER object.
///
/// This is not an error caused by *reaper-rs*, but one reported by the object itself. The message
/// is not very specific most of the time because the C++ interfaces usually don't give information
/// about the cause of the error.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(fmt = "REAPER function failed: {}", message)]
pub struct ReaperFunctionError {
    message: &'static str,
}

impl ReaperFunctionError {
    pub(crate) const fn new(message: &'static str) -> ReaperFunctionError {
        ReaperFunctionError { message }
    }
}

pub(crate) type ReaperFunctionResult<T> = Result<T, ReaperFunctionError>;

/// An error which can occur when converting from a type with a greater value range to one with a
/// smaller one.
///
/// This error is caused by *reaper-rs*, not by REAPER itself.
#[derive(Debug, Clone, Eq, PartialEq, Display)]
#[display(fmt = "conversion from value [{}] failed: {}", value, message)]
pub struct TryFromGreaterError<V> {
    message: &'static str,
    value: V,
}

impl<V: Copy> TryFromGreaterError<V> {
    pub(crate) fn new(message: &'static str, value: V) -> TryFromGreaterError<V> {
        TryFromGreaterError { message, value }
    }
}

impl<R: Copy + Display + Debug> std::error::Error for TryFromGreaterError<R> {}

/// An error which can occur when converting a raw value passed by REAPER to a medium-level type.
///
/// Usually means that REAPER passed a value which *reaper-rs* doesn't know yet.
#[derive(Debug, Clone, Eq, PartialEq, Display)]
#[display(fmt = "conversion from raw value [{}] failed: {}", value, message)]
pub struct TryFromRawError<V> {
    message: &'static str,
    value: V,
}

impl<V: Copy> TryFromRawError<V> {
    pub(crate) fn new(message: &'static str, value: V) -> TryFromRawError<V> {
        TryFromRawError { message, value }
    }
}

impl<R: Copy + Display + Debug> std::error::Error for TryFromRawError<R> {}

/// An error which can occur when installing a control surface.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
pub enum InstallError {
    #[display(fmt = "a control surface is already installed")]
    AlreadyInstalled,
    #[display(fmt = "control surface registration failed: {}", _0)]
    Registry(reaper_abi_low::RegistryError),
}

impl From<reaper_abi_low::RegistryError> for InstallError {
    fn from(e: reaper_abi_low::RegistryError) -> Self {
        InstallError::Registry(e)
    }
}
