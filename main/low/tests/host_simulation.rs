//! These tests play the role of REAPER. They call the vtable slots of host objects directly, just
//! like C++ code compiled against `reaper_plugin.h` would.
#![allow(non_snake_case)]

use reaper_abi_low::descriptor::interface_descriptor;
use reaper_abi_low::{
    create_cpp_to_rust_control_surface, create_cpp_to_rust_pcm_sink,
    create_rust_control_surface_registry, create_rust_pcm_sink_registry,
    delete_cpp_control_surface, delete_cpp_pcm_sink, delete_cpp_pcm_sink_via_vtable, raw,
    ForeignHandle, IReaperControlSurface, PCM_sink, RegistryError, RegistryMode,
};
use std::cell::Cell;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{null, null_mut, NonNull};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct FileSink {
    start_time: f64,
}

impl PCM_sink for FileSink {
    fn GetOutputInfoString(&mut self, buf: *mut c_char, buflen: c_int) {
        unsafe { reaper_abi_low::copy_to_raw_c_buffer(b"WAV 24-bit", buf, buflen) };
    }
    fn GetStartTime(&mut self) -> f64 {
        self.start_time
    }
    fn SetStartTime(&mut self, st: f64) {
        self.start_time = st;
    }
    fn GetFileName(&mut self) -> *const c_char {
        null()
    }
    fn GetNumChannels(&mut self) -> c_int {
        2
    }
    fn GetLength(&mut self) -> f64 {
        90.0
    }
    fn GetFileSize(&mut self) -> raw::INT64 {
        4096
    }
    fn WriteMIDI(&mut self, _: *mut raw::MIDI_eventlist, _: c_int, _: f64) {}
    fn WriteDoubles(&mut self, _: *mut *mut f64, _: c_int, _: c_int, _: c_int, _: c_int) {}
}

#[derive(Debug, Default)]
struct CountingSurface {
    extended_calls: Cell<u32>,
}

impl IReaperControlSurface for CountingSurface {
    fn Extended(&self, _: c_int, _: *mut c_void, _: *mut c_void, _: *mut c_void) -> c_int {
        self.extended_calls.set(self.extended_calls.get() + 1);
        0
    }
}

fn boxed_sink() -> Box<dyn PCM_sink> {
    Box::new(FileSink::default())
}

fn boxed_surface() -> Box<dyn IReaperControlSurface> {
    Box::new(CountingSurface::default())
}

#[test]
fn lookup_follows_registration() {
    let sink = boxed_sink();
    let handle = ForeignHandle::from_thin_ptr(NonNull::from(&sink));
    let registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
    assert_eq!(registry.lookup(handle), None);
    let cpp_sink = unsafe { create_cpp_to_rust_pcm_sink(&registry, (&sink).into()) }.unwrap();
    assert_eq!(registry.lookup(handle), Some(cpp_sink));
    assert!(registry.contains(handle));
    assert_eq!(registry.len(), 1);
    assert!(unsafe { delete_cpp_pcm_sink(&registry, cpp_sink) });
    assert_eq!(registry.lookup(handle), None);
    assert!(registry.is_empty());
    // Unregistering twice is a no-op
    assert!(!unsafe { delete_cpp_pcm_sink(&registry, cpp_sink) });
}

#[test]
fn multi_instance_registry_rejects_same_handle_twice() {
    let sink = boxed_sink();
    let other_sink = boxed_sink();
    let handle = ForeignHandle::from_thin_ptr(NonNull::from(&sink));
    let registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
    let first = unsafe { create_cpp_to_rust_pcm_sink(&registry, (&sink).into()) }.unwrap();
    let second = unsafe { create_cpp_to_rust_pcm_sink(&registry, (&other_sink).into()) }.unwrap();
    assert_ne!(first, second);
    assert_eq!(
        unsafe { create_cpp_to_rust_pcm_sink(&registry, (&sink).into()) },
        Err(RegistryError::AlreadyRegistered { handle })
    );
    assert_eq!(registry.len(), 2);
    assert!(unsafe { delete_cpp_pcm_sink(&registry, first) });
    assert!(unsafe { delete_cpp_pcm_sink(&registry, second) });
}

#[test]
fn single_slot_registry_accepts_one_surface_at_a_time() {
    let surface = boxed_surface();
    let other_surface = boxed_surface();
    let registry = create_rust_control_surface_registry(RegistryMode::SingleSlot);
    let cpp_surface =
        unsafe { create_cpp_to_rust_control_surface(&registry, (&surface).into()) }.unwrap();
    assert_eq!(
        unsafe { create_cpp_to_rust_control_surface(&registry, (&other_surface).into()) },
        Err(RegistryError::SlotOccupied)
    );
    assert!(unsafe { delete_cpp_control_surface(&registry, cpp_surface) });
    let cpp_other_surface =
        unsafe { create_cpp_to_rust_control_surface(&registry, (&other_surface).into()) }.unwrap();
    assert!(unsafe { delete_cpp_control_surface(&registry, cpp_other_surface) });
}

#[test]
fn vtable_slots_match_descriptor() {
    let sink = boxed_sink();
    let registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
    let cpp_sink = unsafe { create_cpp_to_rust_pcm_sink(&registry, (&sink).into()) }.unwrap();
    let descriptor = interface_descriptor("PCM_sink").unwrap();
    unsafe {
        let this = cpp_sink.as_ptr();
        let vt = &*(*this).vtable;
        let slots = (*this).vtable as *const usize;
        for (name, f) in [
            ("GetStartTime", vt.GetStartTime as usize),
            ("GetLength", vt.GetLength as usize),
            ("WriteDoubles", vt.WriteDoubles as usize),
            ("Extended", vt.Extended as usize),
        ] {
            let slot = descriptor.slot_of(name).unwrap();
            assert_eq!(*slots.add(slot), f, "slot of {}", name);
        }
        // Call like C++ would: this->SetStartTime(1.5); this->GetStartTime();
        (vt.SetStartTime)(this, 1.5);
        assert_eq!((vt.GetStartTime)(this), 1.5);
        assert_eq!((vt.GetLength)(this), 90.0);
        assert_eq!((vt.GetFileSize)(this), 4096);
        let mut buf = [0 as c_char; 4];
        (vt.GetOutputInfoString)(this, buf.as_mut_ptr(), 4);
        assert_eq!(buf, [b'W' as c_char, b'A' as c_char, b'V' as c_char, 0]);
    }
    assert!(unsafe { delete_cpp_pcm_sink(&registry, cpp_sink) });
}

#[test]
fn extended_answers_zero_for_unknown_call_codes() {
    let surface = boxed_surface();
    let registry = create_rust_control_surface_registry(RegistryMode::MultiInstance);
    let cpp_surface =
        unsafe { create_cpp_to_rust_control_surface(&registry, (&surface).into()) }.unwrap();
    unsafe {
        let this = cpp_surface.as_ptr();
        let vt = &*(*this).vtable;
        assert_eq!((vt.Extended)(this, 0x0BAD_C0DE, null_mut(), null_mut(), null_mut()), 0);
        assert_eq!(
            (vt.Extended)(this, raw::CSURF_EXT_SETFXCHANGE, null_mut(), null_mut(), null_mut()),
            0
        );
    }
    let counting = surface.downcast_ref::<CountingSurface>().unwrap();
    assert_eq!(counting.extended_calls.get(), 2);
    assert!(unsafe { delete_cpp_control_surface(&registry, cpp_surface) });
}

#[test]
fn destroyed_object_answers_with_inert_values() {
    // Given
    let surface = boxed_surface();
    let registry = create_rust_control_surface_registry(RegistryMode::MultiInstance);
    let cpp_surface =
        unsafe { create_cpp_to_rust_control_surface(&registry, (&surface).into()) }.unwrap();
    let this = cpp_surface.as_ptr();
    let vt = unsafe { &*(*this).vtable };
    // When
    // Explicit destructor call. The memory stays allocated, so calls are still possible.
    unsafe { vt.destructor.destruct(this) };
    let stats_before = registry.stats();
    let extended_result =
        unsafe { (vt.Extended)(this, raw::CSURF_EXT_RESET, null_mut(), null_mut(), null_mut()) };
    let touch_state = unsafe { (vt.GetTouchState)(this, null_mut(), 0) };
    let type_string = unsafe { (vt.GetTypeString)(this) };
    // Then
    assert!(registry.is_empty());
    assert_eq!(extended_result, 0);
    assert!(!touch_state);
    assert!(type_string.is_null());
    let counting = surface.downcast_ref::<CountingSurface>().unwrap();
    assert_eq!(counting.extended_calls.get(), 0);
    assert_eq!(registry.stats().stale_calls - stats_before.stale_calls, 3);
    assert!(!unsafe { delete_cpp_control_surface(&registry, cpp_surface) });
}

static RELEASED_SINKS: AtomicUsize = AtomicUsize::new(0);

unsafe extern "C" fn release_sink(handle: ForeignHandle) {
    drop(Box::from_raw(handle.as_ptr() as *mut Box<dyn PCM_sink>));
    RELEASED_SINKS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn host_delete_runs_release_hook_exactly_once() {
    // Given
    let registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
    let sink: Box<Box<dyn PCM_sink>> = Box::new(boxed_sink());
    let handle = ForeignHandle::from_thin_ptr(NonNull::from(Box::leak(sink)));
    let cpp_sink = registry.register_with_release(handle, release_sink).unwrap();
    assert!(registry.contains(handle));
    // When
    unsafe { delete_cpp_pcm_sink_via_vtable(cpp_sink) };
    // Then
    assert_eq!(RELEASED_SINKS.load(Ordering::SeqCst), 1);
    assert!(!registry.contains(handle));
    assert!(!unsafe { delete_cpp_pcm_sink(&registry, cpp_sink) });
    assert_eq!(RELEASED_SINKS.load(Ordering::SeqCst), 1);
}

#[test]
fn inbound_calls_on_null_objects_are_inert() {
    unsafe {
        assert_eq!(
            reaper_abi_low::rust_to_cpp_PCM_source_GetLengthBeats(null_mut()),
            -1.0
        );
        assert_eq!(reaper_abi_low::rust_to_cpp_PCM_sink_GetLength(null_mut()), 0.0);
        assert_eq!(
            reaper_abi_low::rust_to_cpp_ProjectStateContext_GetLine(null_mut(), null_mut(), 0),
            -1
        );
        assert!(
            reaper_abi_low::rust_to_cpp_MIDI_eventlist_EnumItems(null_mut(), null_mut()).is_null()
        );
        assert!(reaper_abi_low::rust_to_cpp_midi_Input_GetReadBuf(null_mut()).is_null());
    }
}
