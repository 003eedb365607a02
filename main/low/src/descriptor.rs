//! Static, machine-readable description of the REAPER virtual interfaces handled by this crate.
//!
//! Descriptors are pure data. They are used to derive vtable slot indexes and entry point symbol
//! names, to find out which methods run on the audio thread and to check (in tests) that the raw
//! vtable structs have the expected shape.
use crate::vtable::DESTRUCTOR_SLOT_COUNT;
use std::fmt;

/// Kind of a parameter or return value, as seen at the ABI boundary.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueKind {
    Void,
    Bool,
    /// C `int`
    Int,
    /// `INT64`
    Int64,
    Double,
    /// `unsigned char`
    Byte,
    /// Borrowed NUL-terminated string (`const char*`).
    Str,
    /// Caller-provided output buffer (`char*`), always followed by a [`Capacity`].
    ///
    /// [`Capacity`]: #variant.Capacity
    StrBuffer,
    /// Size of the preceding buffer in bytes.
    Capacity,
    /// Pointer to an object or struct with the given C++ type name.
    Pointer(&'static str),
    /// C variadic arguments (`...`).
    Variadic,
}

/// Which way a method can be crossed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Directions {
    /// REAPER can call a Rust implementation (outbound adapter).
    pub cpp_to_rust: bool,
    /// Rust can call a REAPER implementation (inbound accessor).
    pub rust_to_cpp: bool,
}

impl Directions {
    pub const CPP_TO_RUST: Directions = Directions {
        cpp_to_rust: true,
        rust_to_cpp: false,
    };
    pub const RUST_TO_CPP: Directions = Directions {
        cpp_to_rust: false,
        rust_to_cpp: true,
    };
    pub const BOTH: Directions = Directions {
        cpp_to_rust: true,
        rust_to_cpp: true,
    };

    pub fn supports(&self, direction: Direction) -> bool {
        match direction {
            Direction::CppToRust => self.cpp_to_rust,
            Direction::RustToCpp => self.rust_to_cpp,
        }
    }
}

/// One way of crossing the boundary.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Direction {
    CppToRust,
    RustToCpp,
}

impl Direction {
    /// Prefix of the C-linkage symbols implementing this direction.
    pub fn symbol_prefix(&self) -> &'static str {
        match self {
            Direction::CppToRust => "cpp_to_rust",
            Direction::RustToCpp => "rust_to_cpp",
        }
    }
}

/// Thread on which REAPER calls a method.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ThreadAffinity {
    /// Main thread or any other non-real-time thread.
    Control,
    /// Audio thread. Implementations and adapters must neither allocate nor block.
    RealTime,
}

/// Where the virtual destructor sits within the vtable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DestructorPlacement {
    First,
    Last,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDescriptor {
    pub name: &'static str,
    pub params: &'static [ValueKind],
    pub returns: ValueKind,
    pub directions: Directions,
    pub thread: ThreadAffinity,
    /// Whether a null pointer is a legal return value.
    pub nullable_result: bool,
}

impl MethodDescriptor {
    pub const fn new(
        name: &'static str,
        directions: Directions,
        params: &'static [ValueKind],
        returns: ValueKind,
    ) -> Self {
        Self {
            name,
            params,
            returns,
            directions,
            thread: ThreadAffinity::Control,
            nullable_result: false,
        }
    }

    pub const fn real_time(self) -> Self {
        Self {
            thread: ThreadAffinity::RealTime,
            ..self
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable_result: true,
            ..self
        }
    }

    pub fn is_real_time(&self) -> bool {
        self.thread == ThreadAffinity::RealTime
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last() == Some(&ValueKind::Variadic)
    }
}

/// Describes one C++ virtual interface.
///
/// `methods` lists the virtual functions in declaration order, without the destructor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct InterfaceDescriptor {
    pub name: &'static str,
    pub destructor: DestructorPlacement,
    pub methods: &'static [MethodDescriptor],
}

impl InterfaceDescriptor {
    pub fn method(&self, name: &str) -> Option<&'static MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Returns the zero-based vtable slot of the given method on the current target.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        let index = self.methods.iter().position(|m| m.name == name)?;
        let slot = match self.destructor {
            DestructorPlacement::First => DESTRUCTOR_SLOT_COUNT + index,
            DestructorPlacement::Last => index,
        };
        Some(slot)
    }

    /// Returns the slot range occupied by the destructor on the current target.
    pub fn destructor_slots(&self) -> std::ops::Range<usize> {
        let start = match self.destructor {
            DestructorPlacement::First => 0,
            DestructorPlacement::Last => self.methods.len(),
        };
        start..start + DESTRUCTOR_SLOT_COUNT
    }

    /// Number of function pointers in the vtable on the current target.
    pub fn vtable_slot_count(&self) -> usize {
        self.methods.len() + DESTRUCTOR_SLOT_COUNT
    }

    /// Returns the name of the C-linkage symbol which implements the given method in the given
    /// direction, e.g. `rust_to_cpp_PCM_sink_GetLength`.
    ///
    /// Returns `None` if the method doesn't exist or can't be crossed in that direction.
    pub fn entry_point_symbol(&self, method: &str, direction: Direction) -> Option<String> {
        let m = self.method(method)?;
        if !m.directions.supports(direction) {
            return None;
        }
        Some(format!(
            "{}_{}_{}",
            direction.symbol_prefix(),
            self.name,
            m.name
        ))
    }

    pub fn real_time_methods(&self) -> impl Iterator<Item = &'static MethodDescriptor> {
        self.methods.iter().filter(|m| m.is_real_time())
    }

    pub fn supports(&self, direction: Direction) -> bool {
        self.methods.iter().any(|m| m.directions.supports(direction))
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Returns the descriptors of all interfaces handled by this crate.
pub fn interface_descriptors() -> &'static [&'static InterfaceDescriptor] {
    &ALL_DESCRIPTORS
}

/// Looks up an interface descriptor by its C++ class name.
pub fn interface_descriptor(name: &str) -> Option<&'static InterfaceDescriptor> {
    ALL_DESCRIPTORS.iter().copied().find(|d| d.name == name)
}

static ALL_DESCRIPTORS: [&InterfaceDescriptor; 9] = [
    &crate::CONTROL_SURFACE_DESCRIPTOR,
    &crate::PCM_SOURCE_DESCRIPTOR,
    &crate::PCM_SINK_DESCRIPTOR,
    &crate::PROJECT_STATE_CONTEXT_DESCRIPTOR,
    &crate::PITCH_SHIFT_DESCRIPTOR,
    &crate::RESAMPLE_DESCRIPTOR,
    &crate::MIDI_EVENT_LIST_DESCRIPTOR,
    &crate::MIDI_INPUT_DESCRIPTOR,
    &crate::MIDI_OUTPUT_DESCRIPTOR,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw;
    use std::mem::size_of;

    fn slot_count_of<V>() -> usize {
        size_of::<V>() / size_of::<usize>()
    }

    #[test]
    fn slot_counts_match_raw_vtables() {
        let expected = [
            ("IReaperControlSurface", slot_count_of::<raw::IReaperControlSurface_vtable>()),
            ("PCM_source", slot_count_of::<raw::PCM_source_vtable>()),
            ("PCM_sink", slot_count_of::<raw::PCM_sink_vtable>()),
            ("ProjectStateContext", slot_count_of::<raw::ProjectStateContext_vtable>()),
            ("IReaperPitchShift", slot_count_of::<raw::IReaperPitchShift_vtable>()),
            (
                "REAPER_Resample_Interface",
                slot_count_of::<raw::REAPER_Resample_Interface_vtable>(),
            ),
            ("MIDI_eventlist", slot_count_of::<raw::MIDI_eventlist_vtable>()),
            ("midi_Input", slot_count_of::<raw::midi_Input_vtable>()),
            ("midi_Output", slot_count_of::<raw::midi_Output_vtable>()),
        ];
        assert_eq!(interface_descriptors().len(), expected.len());
        for (name, slot_count) in expected {
            let descriptor = interface_descriptor(name).unwrap();
            assert_eq!(descriptor.vtable_slot_count(), slot_count, "{}", name);
        }
    }

    #[test]
    fn destructor_shifts_slots() {
        let sink = interface_descriptor("PCM_sink").unwrap();
        assert_eq!(sink.slot_of("GetOutputInfoString"), Some(DESTRUCTOR_SLOT_COUNT));
        assert_eq!(sink.destructor_slots(), 0..DESTRUCTOR_SLOT_COUNT);
        let list = interface_descriptor("MIDI_eventlist").unwrap();
        assert_eq!(list.slot_of("AddItem"), Some(0));
        assert_eq!(list.slot_of("Empty"), Some(4));
        assert_eq!(list.destructor_slots(), 5..5 + DESTRUCTOR_SLOT_COUNT);
        assert_eq!(list.slot_of("Foo"), None);
    }

    #[test]
    fn entry_point_symbols() {
        let sink = interface_descriptor("PCM_sink").unwrap();
        assert_eq!(
            sink.entry_point_symbol("GetLength", Direction::RustToCpp).as_deref(),
            Some("rust_to_cpp_PCM_sink_GetLength")
        );
        assert_eq!(
            sink.entry_point_symbol("GetLength", Direction::CppToRust).as_deref(),
            Some("cpp_to_rust_PCM_sink_GetLength")
        );
        let pitch_shift = interface_descriptor("IReaperPitchShift").unwrap();
        assert_eq!(pitch_shift.entry_point_symbol("Reset", Direction::CppToRust), None);
        assert!(!pitch_shift.supports(Direction::CppToRust));
    }

    #[test]
    fn real_time_methods() {
        let sink = interface_descriptor("PCM_sink").unwrap();
        let names: Vec<_> = sink.real_time_methods().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec!["WriteMIDI", "WriteDoubles", "GetLastSecondPeaks", "GetPeakInfo"]
        );
        let control_surface = interface_descriptor("IReaperControlSurface").unwrap();
        assert_eq!(control_surface.real_time_methods().count(), 0);
    }

    #[test]
    fn add_line_is_variadic() {
        let ctx = interface_descriptor("ProjectStateContext").unwrap();
        assert!(ctx.method("AddLine").unwrap().is_variadic());
        assert!(!ctx.method("GetLine").unwrap().is_variadic());
    }
}
