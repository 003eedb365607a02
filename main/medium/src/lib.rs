#![deny(rustdoc::broken_intra_doc_links)]

//! This crate contains the medium-level part of a foreign virtual-interface adapter for the REAPER
//! C++ plug-in API.
//!
//! It builds on the [low-level] API, which exposes the C++ virtual base classes one to one. This
//! API lifts them to idiomatic and type-safe Rust.
//!
//! # Example
//!
//! ```no_run
//! use reaper_abi_medium::{
//!     create_custom_owned_project_state_context, CustomProjectStateContext, ReaperStr,
//! };
//!
//! struct Logger;
//!
//! impl CustomProjectStateContext for Logger {
//!     fn add_line(&mut self, line: &ReaperStr) {
//!         println!("{}", line);
//!     }
//!
//!     fn get_line(&mut self) -> Option<&ReaperStr> {
//!         None
//!     }
//! }
//!
//! let context = create_custom_owned_project_state_context(Logger)?;
//! // Pass `context.as_ptr()` to REAPER, e.g. to `PCM_source::SaveState()`.
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! # Design goals
//!
//! The medium-level API stays close to the C++ classes. Each virtual function is available with
//! its original meaning, named according to Rust conventions. Going all object-oriented or
//! inventing new concepts is *out of scope*. This has the benefit that C++ code seen in forum
//! threads, blogs and existing extensions can be helpful even for writing plug-ins in Rust.
//!
//! # Design principles
//!
//! - Use unsigned integers where a number can never be negative.
//! - Use enums where the C++ interface uses magic numbers, e.g.
//!   [`InputMonitoringMode`](enum.InputMonitoringMode.html).
//! - Use newtypes for numbers with a restricted value range or a unit, e.g.
//!   [`ReaperVolumeValue`](struct.ReaperVolumeValue.html) or [`Hz`](struct.Hz.html).
//! - Return `Option` if the C++ function returns a value which represents that something is not
//!   present, e.g. a negative length.
//! - Strings are passed as [`ReaperStringArg`](struct.ReaperStringArg.html) and returned as
//!   [`ReaperString`](struct.ReaperString.html) if owned. Strings owned by REAPER are only
//!   available temporarily via a closure taking a `&`[`ReaperStr`](struct.ReaperStr.html).
//!
//! ## Pointer wrappers
//!
//! REAPER passes pointers which can't be given a sane lifetime annotation. How they are wrapped
//! depends on the characteristics of the pointed-to struct.
//!
//! ### Case 1: Internals not exposed | no vtable
//!
//! Such structs are relevant for consumers *as pointers only*. We use `NonNull` pointers directly
//! and introduce an alias, e.g. [`MediaTrack`](type.MediaTrack.html).
//!
//! ### Case 3: Internals not exposed | vtable
//!
//! - If the consumer shall get access to the virtual functions: A borrowed struct which is
//!   reference-casted from the raw struct exposes them as safe methods. An owned struct destroys
//!   the C++ object via its virtual destructor when dropped and derefs to the borrowed struct.
//! - If the consumer needs to be able to provide such a type (for communication from REAPER to
//!   Rust): A trait which can be implemented by the consumer. A `create_custom_owned_*` function
//!   registers it and returns a value that unregisters it when dropped.
//!
//! Examples:
//!
//! - [`raw::IReaperControlSurface`](reaper_abi_low::raw::IReaperControlSurface) →
//!   [`ControlSurface`](trait.ControlSurface.html) & [`ControlSurfaceSlot`]
//! - [`raw::PCM_source`](reaper_abi_low::raw::PCM_source) →
//!   [`OwnedPcmSource`], [`BorrowedPcmSource`] & [`CustomPcmSource`]
//! - [`raw::MIDI_eventlist`](reaper_abi_low::raw::MIDI_eventlist) → [`BorrowedMidiEventList`]
//!
//! ## Panic/error/safety strategy
//!
//! - We panic when passed parameters don't satisfy documented preconditions which can be easily
//!   satisfied by consumers, e.g. when creating a newtype with an out-of-range value.
//! - We never panic when REAPER passes unexpected values into Rust implementations. Instead, the
//!   call is answered with an inert value. Panics must not cross the C++ boundary.
//! - When a function takes raw pointers, we mark it as `unsafe`.
//! - If a virtual function can report failure, we return a `Result`.
//!
//! ## Try to follow "zero-cost" principle
//!
//! Functions which are called in real-time threads (sample and MIDI processing) don't allocate and
//! don't lock.
//!
//! [low-level]: https://docs.rs/reaper-abi-low

mod misc_enums;
pub use misc_enums::*;

mod misc_newtypes;
pub use misc_newtypes::*;

mod control_surface;
pub use control_surface::*;

mod midi;
pub use midi::*;

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

mod util;

mod string_types;
pub use string_types::*;

mod ptr_wrappers;
pub use ptr_wrappers::*;

mod errors;
pub use errors::*;
