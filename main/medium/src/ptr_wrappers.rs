//! This module makes low-level structs available in the medium-level API if necessary. This is done
//! using different strategies, depending on the characteristics of the struct. Sometimes it's just
//! a type alias, sometimes a wrapper.
use reaper_abi_low::raw;
use std::ptr::NonNull;

// Case 1: Internals exposed: no | vtable: no
// ==========================================

/// Pointer to a track in a project.
pub type MediaTrack = NonNull<raw::MediaTrack>;
/// Pointer to a window (window handle).
pub type Hwnd = NonNull<raw::HWND__>;

// Case 3: Internals exposed: no | vtable: yes
// ===========================================
//
// The raw pointers are exposed as aliases. Safe access goes through the borrowed wrappers
// (`BorrowedPcmSink` and friends) which are reference-casted from the raw structs.

/// Pointer to a PCM sink.
pub type PcmSink = NonNull<raw::PCM_sink>;
/// Pointer to a PCM source.
pub type PcmSource = NonNull<raw::PCM_source>;
/// Pointer to a project state context.
pub type ProjectStateContext = NonNull<raw::ProjectStateContext>;
/// Pointer to a pitch shifter.
pub type ReaperPitchShift = NonNull<raw::IReaperPitchShift>;
/// Pointer to a resampler.
pub type ReaperResample = NonNull<raw::REAPER_Resample_Interface>;
/// Pointer to a MIDI event list.
pub type MidiEventList = NonNull<raw::MIDI_eventlist>;
