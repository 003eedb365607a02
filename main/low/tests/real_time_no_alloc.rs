//! Checks that calls on real-time paths neither allocate nor take the registry lock.
//!
//! Lives in its own test binary because it installs a global allocator.
#![allow(non_snake_case)]

use reaper_abi_low::{
    create_cpp_to_rust_midi_event_list, create_cpp_to_rust_pcm_sink,
    create_rust_midi_event_list_registry, create_rust_pcm_sink_registry, delete_cpp_midi_event_list,
    delete_cpp_pcm_sink, raw, PCM_sink, RegistryMode, MIDI_eventlist,
};
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::os::raw::{c_char, c_int};
use std::ptr::{null, null_mut};
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingAllocator;

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static COUNTING: Cell<bool> = const { Cell::new(false) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNTING.try_with(|c| c.get()).unwrap_or(false) {
            ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNTING.try_with(|c| c.get()).unwrap_or(false) {
            ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
        }
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Counts the allocations done by `f` on the current thread.
fn count_allocations(f: impl FnOnce()) -> usize {
    let before = ALLOCATIONS.load(Ordering::SeqCst);
    COUNTING.with(|c| c.set(true));
    f();
    COUNTING.with(|c| c.set(false));
    ALLOCATIONS.load(Ordering::SeqCst) - before
}

struct NullSink {
    frames: i64,
}

impl PCM_sink for NullSink {
    fn GetOutputInfoString(&mut self, _: *mut c_char, _: c_int) {}
    fn GetStartTime(&mut self) -> f64 {
        0.0
    }
    fn SetStartTime(&mut self, _: f64) {}
    fn GetFileName(&mut self) -> *const c_char {
        null()
    }
    fn GetNumChannels(&mut self) -> c_int {
        2
    }
    fn GetLength(&mut self) -> f64 {
        0.0
    }
    fn GetFileSize(&mut self) -> raw::INT64 {
        0
    }
    fn WriteMIDI(&mut self, _: *mut raw::MIDI_eventlist, _: c_int, _: f64) {}
    fn WriteDoubles(&mut self, _: *mut *mut f64, len: c_int, _: c_int, _: c_int, _: c_int) {
        self.frames += len as i64;
    }
    fn GetLastSecondPeaks(&mut self, _: c_int, _: *mut f64) -> c_int {
        0
    }
}

struct RingEventList {
    events: [raw::MIDI_event_t; 16],
    len: usize,
}

impl MIDI_eventlist for RingEventList {
    fn AddItem(&mut self, evt: *mut raw::MIDI_event_t) {
        if self.len == self.events.len() {
            self.len = 0;
        }
        self.events[self.len] = unsafe { *evt };
        self.len += 1;
    }
    fn EnumItems(&mut self, bpos: *mut c_int) -> *mut raw::MIDI_event_t {
        let pos = unsafe { *bpos } as usize;
        if pos >= self.len {
            return null_mut();
        }
        unsafe { *bpos += 1 };
        &mut self.events[pos]
    }
    fn DeleteItem(&mut self, _: c_int) {}
    fn GetSize(&mut self) -> c_int {
        self.len as c_int
    }
    fn Empty(&mut self) {
        self.len = 0;
    }
}

#[test]
fn real_time_calls_neither_allocate_nor_lock() {
    // Given
    let sink: Box<dyn PCM_sink> = Box::new(NullSink { frames: 0 });
    let sink_registry = create_rust_pcm_sink_registry(RegistryMode::MultiInstance);
    let cpp_sink = unsafe { create_cpp_to_rust_pcm_sink(&sink_registry, (&sink).into()) }.unwrap();
    let list: Box<dyn MIDI_eventlist> = Box::new(RingEventList {
        events: Default::default(),
        len: 0,
    });
    let list_registry = create_rust_midi_event_list_registry(RegistryMode::MultiInstance);
    let cpp_list =
        unsafe { create_cpp_to_rust_midi_event_list(&list_registry, (&list).into()) }.unwrap();
    let sink_stats_before = sink_registry.stats();
    let list_stats_before = list_registry.stats();
    let mut left = [0.0f64; 64];
    let mut right = [0.0f64; 64];
    let mut channels = [left.as_mut_ptr(), right.as_mut_ptr()];
    let mut peaks = [0.0f64; 2];
    let mut enumerated = 0;
    // When
    let allocations = count_allocations(|| unsafe {
        let sink_this = cpp_sink.as_ptr();
        let sink_vt = &*(*sink_this).vtable;
        let list_this = cpp_list.as_ptr();
        let list_vt = &*(*list_this).vtable;
        for i in 0..10_000 {
            match i % 4 {
                0 => (sink_vt.WriteDoubles)(sink_this, channels.as_mut_ptr(), 64, 2, 0, 1),
                1 => {
                    (sink_vt.GetLastSecondPeaks)(sink_this, 2, peaks.as_mut_ptr());
                }
                2 => {
                    let mut evt = raw::MIDI_event_t {
                        frame_offset: i,
                        size: 3,
                        midi_message: [0x90, 60, 100, 0],
                    };
                    (list_vt.AddItem)(list_this, &mut evt);
                }
                _ => {
                    let mut bpos = 0;
                    while !(list_vt.EnumItems)(list_this, &mut bpos).is_null() {
                        enumerated += 1;
                    }
                    (list_vt.GetSize)(list_this);
                }
            }
        }
    });
    // Then
    assert_eq!(allocations, 0);
    assert_eq!(sink_registry.stats(), sink_stats_before);
    assert_eq!(list_registry.stats(), list_stats_before);
    assert!(enumerated > 0);
    assert!(unsafe { delete_cpp_pcm_sink(&sink_registry, cpp_sink) });
    assert!(unsafe { delete_cpp_midi_event_list(&list_registry, cpp_list) });
}
