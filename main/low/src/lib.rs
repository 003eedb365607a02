#![deny(rustdoc::broken_intra_doc_links)]

//! This crate contains the low-level part of a foreign virtual-interface adapter for the REAPER
//! C++ plug-in API.
//!
//! Some parts of the REAPER API are not plain C functions but C++ virtual base classes:
//! control surfaces, PCM sources and sinks, project state contexts, pitch shifters, resamplers and
//! MIDI devices. Rust can neither call virtual functions nor implement them. This crate closes the
//! gap in both directions, without any C++ compiler involved.
//!
//! It is not recommended to use this API directly because it just exposes the raw C++ types and
//! virtual functions one to one in Rust. If you want idiomatic Rust, type safety and convenience,
//! please use the [medium-level] API instead.
//!
//! # Example
//!
//! ```no_run
//! use reaper_abi_low::{
//!     create_cpp_to_rust_pcm_sink, create_rust_pcm_sink_registry, delete_cpp_pcm_sink, raw,
//!     PCM_sink, RegistryMode,
//! };
//! use std::os::raw::{c_char, c_int};
//! use std::ptr::{null, NonNull};
//!
//! struct MySink;
//! impl PCM_sink for MySink {
//!     fn GetOutputInfoString(&mut self, _buf: *mut c_char, _buflen: c_int) {}
//!     fn GetStartTime(&mut self) -> f64 { 0.0 }
//!     fn SetStartTime(&mut self, _st: f64) {}
//!     fn GetFileName(&mut self) -> *const c_char { null() }
//!     fn GetNumChannels(&mut self) -> c_int { 2 }
//!     fn GetLength(&mut self) -> f64 { 0.0 }
//!     fn GetFileSize(&mut self) -> raw::INT64 { 0 }
//!     fn WriteMIDI(&mut self, _events: *mut raw::MIDI_eventlist, _len: c_int, _samplerate: f64) {}
//!     fn WriteDoubles(
//!         &mut self,
//!         _samples: *mut *mut f64,
//!         _len: c_int,
//!         _nch: c_int,
//!         _offset: c_int,
//!         _spacing: c_int,
//!     ) {
//!     }
//! }
//!
//! let registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
//! let rust_sink: Box<dyn PCM_sink> = Box::new(MySink);
//! unsafe {
//!     let cpp_sink = create_cpp_to_rust_pcm_sink(&registry, NonNull::from(&rust_sink)).unwrap();
//!     // Pass `cpp_sink` to REAPER here.
//!     delete_cpp_pcm_sink(&registry, cpp_sink);
//! }
//! ```
//!
//! # Design
//!
//! ## Goal
//!
//! Everything that's possible with these C++ classes in C++ should also be possible in Rust.
//! Improvements regarding safety, convenience or style are not in the scope of this crate. It
//! should serve as a base for more idiomatic APIs built on top of it.
//!
//! ## Vtables in Rust
//!
//! Each C++ class is described by a raw struct (vptr plus data members) and a raw vtable struct
//! (function pointers in declaration order), see [`raw`]. The vtable is built at compile time in
//! Rust, including the ABI-specific prefix and the ABI-specific destructor slots, see
//! [`CppVtable`] and [`VirtualDestructor`].
//!
//! - Rust calling a C++ virtual function provided by REAPER:
//!     - A `rust_to_cpp_*` function reads the vptr of the object and calls the slot. The raw struct
//!       gets an inherent method which calls that function (Rust function → C++ virtual function).
//!     - Example: `raw::PCM_sink::GetLength()` → `rust_to_cpp_PCM_sink_GetLength()`
//!
//! - REAPER calling a C++ virtual function provided by Rust:
//!     - REAPER gets a [`HostObject`] whose vtable forwards each call to a table of
//!       `cpp_to_rust_*` functions, which in turn call a method of a trait object (REAPER → vtable
//!       thunk → Rust function → trait method).
//!     - Host objects are created and destroyed by a [`LifecycleRegistry`]. Once unregistered,
//!       an object doesn't reach the Rust implementation anymore.
//!
//! The only exception is `ProjectStateContext::AddLine()`, which is a C-variadic function. Its
//! vtable slot is filled by a tiny C function compiled by the build script.
//!
//! [medium-level]: https://docs.rs/reaper-abi-medium
pub mod raw;

mod vtable;
pub use vtable::*;

pub mod descriptor;

mod host_object;
pub use host_object::*;

mod registry;
pub use registry::*;

mod util;
pub use util::*;

mod control_surface;
pub use control_surface::*;

mod pcm_source;
pub use pcm_source::*;

mod pcm_sink;
pub use pcm_sink::*;

mod project_state_context;
pub use project_state_context::*;

mod pitch_shift;
pub use pitch_shift::*;

mod resample;
pub use resample::*;

mod midi;
pub use midi::*;
