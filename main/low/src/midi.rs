#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use crate::descriptor::{
    DestructorPlacement, Directions, InterfaceDescriptor, MethodDescriptor, ValueKind,
};
use crate::raw::{self, midi_Input, midi_Output, MIDI_event_t};
use crate::{
    firewall, CallPath, CppVtable, ForeignHandle, HostInterface, HostObject, LifecycleRegistry,
    RegistryError, RegistryMode, VirtualDestructor,
};
use std::os::raw::{c_int, c_uchar, c_uint};
use std::ptr::{null_mut, NonNull};

impl midi_Input {
    pub fn start(&self) {
        unsafe { rust_to_cpp_midi_Input_start(self as *const _ as _) }
    }

    pub fn stop(&self) {
        unsafe { rust_to_cpp_midi_Input_stop(self as *const _ as _) }
    }

    pub fn SwapBufs(&self, timestamp: c_uint) {
        unsafe { rust_to_cpp_midi_Input_SwapBufs(self as *const _ as _, timestamp) }
    }

    pub fn RunPreNoteTracking(&self, isAccum: c_int) {
        unsafe { rust_to_cpp_midi_Input_RunPreNoteTracking(self as *const _ as _, isAccum) }
    }

    pub fn GetReadBuf(&mut self) -> *mut raw::MIDI_eventlist {
        unsafe { rust_to_cpp_midi_Input_GetReadBuf(self as _) }
    }

    pub fn Destroy(&self) {
        unsafe { rust_to_cpp_midi_Input_Destroy(self as *const _ as _) }
    }
}

impl raw::MIDI_eventlist {
    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn EnumItems(&mut self, bpos: *mut c_int) -> *mut MIDI_event_t {
        rust_to_cpp_MIDI_eventlist_EnumItems(self as _, bpos)
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn AddItem(&mut self, evt: *mut MIDI_event_t) {
        rust_to_cpp_MIDI_eventlist_AddItem(self as _, evt);
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn DeleteItem(&mut self, bpos: c_int) {
        rust_to_cpp_MIDI_eventlist_DeleteItem(self as _, bpos);
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn GetSize(&mut self) -> c_int {
        rust_to_cpp_MIDI_eventlist_GetSize(self as _)
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn Empty(&mut self) {
        rust_to_cpp_MIDI_eventlist_Empty(self as _);
    }
}

impl midi_Output {
    pub fn BeginBlock(&self) {
        unsafe { rust_to_cpp_midi_Output_BeginBlock(self as *const _ as _) }
    }

    pub fn EndBlock(&self, length: c_int, srate: f64, curtempo: f64) {
        unsafe { rust_to_cpp_midi_Output_EndBlock(self as *const _ as _, length, srate, curtempo) }
    }

    /// # Safety
    ///
    /// REAPER can crash if you pass an invalid pointer.
    pub unsafe fn SendMsg(&self, msg: *mut MIDI_event_t, frame_offset: c_int) {
        rust_to_cpp_midi_Output_SendMsg(self as *const _ as _, msg, frame_offset);
    }

    pub fn Send(&self, status: u8, d1: u8, d2: u8, frame_offset: c_int) {
        unsafe {
            rust_to_cpp_midi_Output_Send(self as *const _ as *mut _, status, d1, d2, frame_offset)
        };
    }

    pub fn Destroy(&self) {
        unsafe { rust_to_cpp_midi_Output_Destroy(self as *const _ as _) }
    }
}

// Rust → C++
// ==========

unsafe fn input_vtable<'a>(self_: *mut midi_Input) -> Option<&'a raw::midi_Input_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

unsafe fn output_vtable<'a>(self_: *mut midi_Output) -> Option<&'a raw::midi_Output_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

unsafe fn event_list_vtable<'a>(
    self_: *mut raw::MIDI_eventlist,
) -> Option<&'a raw::MIDI_eventlist_vtable> {
    self_.as_ref().and_then(|s| s.vtable.as_ref())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Input_start(self_: *mut midi_Input) {
    if let Some(vt) = input_vtable(self_) {
        (vt.start)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Input_stop(self_: *mut midi_Input) {
    if let Some(vt) = input_vtable(self_) {
        (vt.stop)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Input_SwapBufs(
    self_: *mut midi_Input,
    timestamp: c_uint,
) {
    if let Some(vt) = input_vtable(self_) {
        (vt.SwapBufs)(self_, timestamp);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Input_RunPreNoteTracking(
    self_: *mut midi_Input,
    isAccum: c_int,
) {
    if let Some(vt) = input_vtable(self_) {
        (vt.RunPreNoteTracking)(self_, isAccum);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Input_GetReadBuf(
    self_: *mut midi_Input,
) -> *mut raw::MIDI_eventlist {
    input_vtable(self_)
        .map(|vt| (vt.GetReadBuf)(self_))
        .unwrap_or(null_mut())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Input_Destroy(self_: *mut midi_Input) {
    if let Some(vt) = input_vtable(self_) {
        (vt.Destroy)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Output_BeginBlock(self_: *mut midi_Output) {
    if let Some(vt) = output_vtable(self_) {
        (vt.BeginBlock)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Output_EndBlock(
    self_: *mut midi_Output,
    length: c_int,
    srate: f64,
    curtempo: f64,
) {
    if let Some(vt) = output_vtable(self_) {
        (vt.EndBlock)(self_, length, srate, curtempo);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Output_SendMsg(
    self_: *mut midi_Output,
    msg: *mut MIDI_event_t,
    frame_offset: c_int,
) {
    if let Some(vt) = output_vtable(self_) {
        (vt.SendMsg)(self_, msg, frame_offset);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Output_Send(
    self_: *mut midi_Output,
    status: c_uchar,
    d1: c_uchar,
    d2: c_uchar,
    frame_offset: c_int,
) {
    if let Some(vt) = output_vtable(self_) {
        (vt.Send)(self_, status, d1, d2, frame_offset);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_midi_Output_Destroy(self_: *mut midi_Output) {
    if let Some(vt) = output_vtable(self_) {
        (vt.Destroy)(self_);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_MIDI_eventlist_AddItem(
    self_: *mut raw::MIDI_eventlist,
    evt: *mut MIDI_event_t,
) {
    if let Some(vt) = event_list_vtable(self_) {
        (vt.AddItem)(self_, evt);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_MIDI_eventlist_EnumItems(
    self_: *mut raw::MIDI_eventlist,
    bpos: *mut c_int,
) -> *mut MIDI_event_t {
    event_list_vtable(self_)
        .map(|vt| (vt.EnumItems)(self_, bpos))
        .unwrap_or(null_mut())
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_MIDI_eventlist_DeleteItem(
    self_: *mut raw::MIDI_eventlist,
    bpos: c_int,
) {
    if let Some(vt) = event_list_vtable(self_) {
        (vt.DeleteItem)(self_, bpos);
    }
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_MIDI_eventlist_GetSize(
    self_: *mut raw::MIDI_eventlist,
) -> c_int {
    event_list_vtable(self_)
        .map(|vt| (vt.GetSize)(self_))
        .unwrap_or_default()
}

#[no_mangle]
pub unsafe extern "C" fn rust_to_cpp_MIDI_eventlist_Empty(self_: *mut raw::MIDI_eventlist) {
    if let Some(vt) = event_list_vtable(self_) {
        (vt.Empty)(self_);
    }
}

/// Destroys a `MIDI_eventlist` via its virtual destructor, just like C++ `delete list` would.
///
/// # Safety
///
/// `list` must be valid and owned by the caller.
pub unsafe fn delete_cpp_midi_event_list_via_vtable(list: NonNull<raw::MIDI_eventlist>) {
    if let Some(vt) = event_list_vtable(list.as_ptr()) {
        vt.destructor.delete(list.as_ptr());
    }
}

// C++ → Rust
// ==========

/// This is the Rust analog to the C++ virtual base class `MIDI_eventlist`.
///
/// All methods are called in real-time threads. Implementations must neither allocate nor block.
///
/// An implementation of this trait can be passed to [`create_cpp_to_rust_midi_event_list()`].
///
/// [`create_cpp_to_rust_midi_event_list()`]: fn.create_cpp_to_rust_midi_event_list.html
pub trait MIDI_eventlist {
    /// Copies the event. Must keep the list sorted by frame offset.
    fn AddItem(&mut self, evt: *mut MIDI_event_t);
    /// Returns the event at `*bpos` and advances `*bpos`, or null at the end.
    fn EnumItems(&mut self, bpos: *mut c_int) -> *mut MIDI_event_t;
    fn DeleteItem(&mut self, bpos: c_int);
    /// Size of the list in bytes.
    fn GetSize(&mut self) -> c_int;
    fn Empty(&mut self);
}

/// Table of entry points a `MIDI_eventlist` host object forwards to.
#[repr(C)]
pub struct MIDI_eventlist_callbacks {
    pub AddItem: unsafe extern "C" fn(callback_target: ForeignHandle, evt: *mut MIDI_event_t),
    pub EnumItems:
        unsafe extern "C" fn(callback_target: ForeignHandle, bpos: *mut c_int) -> *mut MIDI_event_t,
    pub DeleteItem: unsafe extern "C" fn(callback_target: ForeignHandle, bpos: c_int),
    pub GetSize: unsafe extern "C" fn(callback_target: ForeignHandle) -> c_int,
    pub Empty: unsafe extern "C" fn(callback_target: ForeignHandle),
}

/// Entry points which dispatch to a `Box<dyn MIDI_eventlist>`.
pub static RUST_MIDI_EVENT_LIST_CALLBACKS: MIDI_eventlist_callbacks = MIDI_eventlist_callbacks {
    AddItem: cpp_to_rust_MIDI_eventlist_AddItem,
    EnumItems: cpp_to_rust_MIDI_eventlist_EnumItems,
    DeleteItem: cpp_to_rust_MIDI_eventlist_DeleteItem,
    GetSize: cpp_to_rust_MIDI_eventlist_GetSize,
    Empty: cpp_to_rust_MIDI_eventlist_Empty,
};

/// Marker binding `MIDI_eventlist` to its host object representation.
#[derive(Debug)]
pub enum MidiEventListInterface {}

impl HostInterface for MidiEventListInterface {
    type Raw = raw::MIDI_eventlist;
    type Vtable = raw::MIDI_eventlist_vtable;
    type Callbacks = MIDI_eventlist_callbacks;
    type BaseFields = ();

    fn descriptor() -> &'static InterfaceDescriptor {
        &MIDI_EVENT_LIST_DESCRIPTOR
    }

    fn vtable() -> *const raw::MIDI_eventlist_vtable {
        host_vtable::VTABLE.vptr()
    }
}

/// Creates a registry for `MIDI_eventlist` objects implemented in Rust.
pub fn create_rust_midi_event_list_registry(
    mode: RegistryMode,
) -> LifecycleRegistry<MidiEventListInterface> {
    LifecycleRegistry::new(mode, &RUST_MIDI_EVENT_LIST_CALLBACKS)
}

/// Creates a `MIDI_eventlist` object which REAPER can use like a C++ one and returns a pointer to
/// it.
///
/// # Safety
///
/// The registry must have been created with [`create_rust_midi_event_list_registry()`]. The
/// callback target must stay alive and in place until the object is unregistered.
///
/// [`create_rust_midi_event_list_registry()`]: fn.create_rust_midi_event_list_registry.html
pub unsafe fn create_cpp_to_rust_midi_event_list(
    registry: &LifecycleRegistry<MidiEventListInterface>,
    callback_target: NonNull<Box<dyn MIDI_eventlist>>,
) -> Result<NonNull<raw::MIDI_eventlist>, RegistryError> {
    registry.register(ForeignHandle::from_thin_ptr(callback_target))
}

/// Destroys a `MIDI_eventlist` object created with [`create_cpp_to_rust_midi_event_list()`].
///
/// # Safety
///
/// REAPER can crash if it still uses the list.
///
/// [`create_cpp_to_rust_midi_event_list()`]: fn.create_cpp_to_rust_midi_event_list.html
pub unsafe fn delete_cpp_midi_event_list(
    registry: &LifecycleRegistry<MidiEventListInterface>,
    list: NonNull<raw::MIDI_eventlist>,
) -> bool {
    registry.unregister(list)
}

unsafe fn rust_target<'a>(callback_target: ForeignHandle) -> &'a mut Box<dyn MIDI_eventlist> {
    callback_target.callback_target()
}

#[no_mangle]
extern "C" fn cpp_to_rust_MIDI_eventlist_AddItem(
    callback_target: ForeignHandle,
    evt: *mut MIDI_event_t,
) {
    firewall(|| unsafe { rust_target(callback_target) }.AddItem(evt));
}

#[no_mangle]
extern "C" fn cpp_to_rust_MIDI_eventlist_EnumItems(
    callback_target: ForeignHandle,
    bpos: *mut c_int,
) -> *mut MIDI_event_t {
    firewall(|| unsafe { rust_target(callback_target) }.EnumItems(bpos)).unwrap_or(null_mut())
}

#[no_mangle]
extern "C" fn cpp_to_rust_MIDI_eventlist_DeleteItem(callback_target: ForeignHandle, bpos: c_int) {
    firewall(|| unsafe { rust_target(callback_target) }.DeleteItem(bpos));
}

#[no_mangle]
extern "C" fn cpp_to_rust_MIDI_eventlist_GetSize(callback_target: ForeignHandle) -> c_int {
    firewall(|| unsafe { rust_target(callback_target) }.GetSize()).unwrap_or_default()
}

#[no_mangle]
extern "C" fn cpp_to_rust_MIDI_eventlist_Empty(callback_target: ForeignHandle) {
    firewall(|| unsafe { rust_target(callback_target) }.Empty());
}

mod host_vtable {
    use super::*;

    type List = HostObject<MidiEventListInterface>;

    pub(super) static VTABLE: CppVtable<raw::MIDI_eventlist_vtable> =
        CppVtable::new(raw::MIDI_eventlist_vtable {
            AddItem,
            EnumItems,
            DeleteItem,
            GetSize,
            Empty,
            destructor: VirtualDestructor::for_host_object::<MidiEventListInterface>(),
        });

    unsafe extern "C" fn AddItem(this: *mut raw::MIDI_eventlist, evt: *mut MIDI_event_t) {
        List::forward(this, CallPath::RealTime, (), |cb, h| (cb.AddItem)(h, evt))
    }

    unsafe extern "C" fn EnumItems(
        this: *mut raw::MIDI_eventlist,
        bpos: *mut c_int,
    ) -> *mut MIDI_event_t {
        List::forward(this, CallPath::RealTime, null_mut(), |cb, h| {
            (cb.EnumItems)(h, bpos)
        })
    }

    unsafe extern "C" fn DeleteItem(this: *mut raw::MIDI_eventlist, bpos: c_int) {
        List::forward(this, CallPath::RealTime, (), |cb, h| (cb.DeleteItem)(h, bpos))
    }

    unsafe extern "C" fn GetSize(this: *mut raw::MIDI_eventlist) -> c_int {
        List::forward(this, CallPath::RealTime, 0, |cb, h| (cb.GetSize)(h))
    }

    unsafe extern "C" fn Empty(this: *mut raw::MIDI_eventlist) {
        List::forward(this, CallPath::RealTime, (), |cb, h| (cb.Empty)(h))
    }
}

use ValueKind::*;

pub static MIDI_EVENT_LIST_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "MIDI_eventlist",
    destructor: DestructorPlacement::Last,
    methods: &[
        MethodDescriptor::new("AddItem", Directions::BOTH, &[Pointer("MIDI_event_t")], Void)
            .real_time(),
        MethodDescriptor::new(
            "EnumItems",
            Directions::BOTH,
            &[Pointer("int")],
            Pointer("MIDI_event_t"),
        )
        .real_time()
        .nullable(),
        MethodDescriptor::new("DeleteItem", Directions::BOTH, &[Int], Void).real_time(),
        MethodDescriptor::new("GetSize", Directions::BOTH, &[], Int).real_time(),
        MethodDescriptor::new("Empty", Directions::BOTH, &[], Void).real_time(),
    ],
};

pub static MIDI_INPUT_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "midi_Input",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new("start", Directions::RUST_TO_CPP, &[], Void),
        MethodDescriptor::new("stop", Directions::RUST_TO_CPP, &[], Void),
        MethodDescriptor::new("SwapBufs", Directions::RUST_TO_CPP, &[Int], Void),
        MethodDescriptor::new("RunPreNoteTracking", Directions::RUST_TO_CPP, &[Int], Void),
        MethodDescriptor::new(
            "GetReadBuf",
            Directions::RUST_TO_CPP,
            &[],
            Pointer("MIDI_eventlist"),
        )
        .real_time()
        .nullable(),
        MethodDescriptor::new("Destroy", Directions::RUST_TO_CPP, &[], Void),
    ],
};

pub static MIDI_OUTPUT_DESCRIPTOR: InterfaceDescriptor = InterfaceDescriptor {
    name: "midi_Output",
    destructor: DestructorPlacement::First,
    methods: &[
        MethodDescriptor::new("BeginBlock", Directions::RUST_TO_CPP, &[], Void),
        MethodDescriptor::new(
            "EndBlock",
            Directions::RUST_TO_CPP,
            &[Int, Double, Double],
            Void,
        ),
        MethodDescriptor::new(
            "SendMsg",
            Directions::RUST_TO_CPP,
            &[Pointer("MIDI_event_t"), Int],
            Void,
        )
        .real_time(),
        MethodDescriptor::new("Send", Directions::RUST_TO_CPP, &[Byte, Byte, Byte, Int], Void)
            .real_time(),
        MethodDescriptor::new("Destroy", Directions::RUST_TO_CPP, &[], Void),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::mem::size_of;
    #[cfg(target_env = "msvc")]
    use std::os::raw::c_void;

    /// Fixed-capacity list, good enough for tests.
    struct ArrayEventList {
        events: [MIDI_event_t; 8],
        len: usize,
    }

    impl MIDI_eventlist for ArrayEventList {
        fn AddItem(&mut self, evt: *mut MIDI_event_t) {
            if self.len < self.events.len() {
                self.events[self.len] = unsafe { *evt };
                self.len += 1;
            }
        }
        fn EnumItems(&mut self, bpos: *mut c_int) -> *mut MIDI_event_t {
            let pos = unsafe { *bpos } as usize;
            if pos >= self.len {
                return null_mut();
            }
            unsafe { *bpos += 1 };
            &mut self.events[pos]
        }
        fn DeleteItem(&mut self, bpos: c_int) {
            let pos = bpos as usize;
            if pos < self.len {
                self.events.copy_within(pos + 1..self.len, pos);
                self.len -= 1;
            }
        }
        fn GetSize(&mut self) -> c_int {
            (self.len * size_of::<MIDI_event_t>()) as c_int
        }
        fn Empty(&mut self) {
            self.len = 0;
        }
    }

    #[test]
    fn event_list_round_trip() {
        // Given
        let list: Box<dyn MIDI_eventlist> = Box::new(ArrayEventList {
            events: Default::default(),
            len: 0,
        });
        let registry = create_rust_midi_event_list_registry(RegistryMode::MultiInstance);
        let mut cpp_list =
            unsafe { create_cpp_to_rust_midi_event_list(&registry, (&list).into()) }.unwrap();
        let cpp = unsafe { cpp_list.as_mut() };
        // When
        for (i, key) in [60u8, 64, 67].iter().enumerate() {
            let mut evt = MIDI_event_t {
                frame_offset: i as c_int * 10,
                size: 3,
                midi_message: [0x90, *key, 100, 0],
            };
            unsafe { cpp.AddItem(&mut evt) };
        }
        unsafe { cpp.DeleteItem(1) };
        // Then
        assert_eq!(unsafe { cpp.GetSize() }, 2 * size_of::<MIDI_event_t>() as c_int);
        let mut bpos = 0;
        let mut keys = vec![];
        loop {
            let evt = unsafe { cpp.EnumItems(&mut bpos) };
            if evt.is_null() {
                break;
            }
            keys.push(unsafe { (*evt).midi_message[1] });
        }
        assert_eq!(keys, vec![60, 67]);
        unsafe { cpp.Empty() };
        assert_eq!(unsafe { cpp.GetSize() }, 0);
        // When REAPER deletes it (destructor slot is last)
        unsafe { delete_cpp_midi_event_list_via_vtable(cpp_list) };
        // Then
        assert!(registry.is_empty());
    }

    /// Stands in for a MIDI input device handed out by REAPER.
    #[repr(C)]
    struct FakeInput {
        base: midi_Input,
        running: Cell<bool>,
        swapped_at: Cell<Option<c_uint>>,
        pre_note_tracking: Cell<Option<c_int>>,
        read_buf: *mut raw::MIDI_eventlist,
        destroyed: Cell<bool>,
    }

    unsafe fn fake_input<'a>(this: *mut midi_Input) -> &'a FakeInput {
        &*(this as *const FakeInput)
    }

    #[cfg(not(target_env = "msvc"))]
    unsafe extern "C" fn input_destructor(_: *mut midi_Input) {}
    #[cfg(target_env = "msvc")]
    unsafe extern "C" fn input_destructor(this: *mut midi_Input, _: c_uint) -> *mut c_void {
        this as _
    }
    unsafe extern "C" fn input_start(this: *mut midi_Input) {
        fake_input(this).running.set(true);
    }
    unsafe extern "C" fn input_stop(this: *mut midi_Input) {
        fake_input(this).running.set(false);
    }
    unsafe extern "C" fn input_swap_bufs(this: *mut midi_Input, timestamp: c_uint) {
        fake_input(this).swapped_at.set(Some(timestamp));
    }
    unsafe extern "C" fn input_run_pre_note_tracking(this: *mut midi_Input, is_accum: c_int) {
        fake_input(this).pre_note_tracking.set(Some(is_accum));
    }
    unsafe extern "C" fn input_get_read_buf(this: *mut midi_Input) -> *mut raw::MIDI_eventlist {
        fake_input(this).read_buf
    }
    unsafe extern "C" fn input_destroy(this: *mut midi_Input) {
        fake_input(this).destroyed.set(true);
    }

    static INPUT_VTABLE: raw::midi_Input_vtable = raw::midi_Input_vtable {
        destructor: VirtualDestructor {
            #[cfg(not(target_env = "msvc"))]
            complete: input_destructor,
            #[cfg(not(target_env = "msvc"))]
            deleting: input_destructor,
            #[cfg(target_env = "msvc")]
            scalar_deleting: input_destructor,
        },
        start: input_start,
        stop: input_stop,
        SwapBufs: input_swap_bufs,
        RunPreNoteTracking: input_run_pre_note_tracking,
        GetReadBuf: input_get_read_buf,
        Destroy: input_destroy,
    };

    /// Stands in for a MIDI output device handed out by REAPER.
    #[repr(C)]
    struct FakeOutput {
        base: midi_Output,
        blocks_begun: Cell<u32>,
        block_end: Cell<Option<(c_int, f64, f64)>>,
        sent_msgs: RefCell<Vec<(MIDI_event_t, c_int)>>,
        sent: RefCell<Vec<(u8, u8, u8, c_int)>>,
        destroyed: Cell<bool>,
    }

    unsafe fn fake_output<'a>(this: *mut midi_Output) -> &'a FakeOutput {
        &*(this as *const FakeOutput)
    }

    #[cfg(not(target_env = "msvc"))]
    unsafe extern "C" fn output_destructor(_: *mut midi_Output) {}
    #[cfg(target_env = "msvc")]
    unsafe extern "C" fn output_destructor(this: *mut midi_Output, _: c_uint) -> *mut c_void {
        this as _
    }
    unsafe extern "C" fn output_begin_block(this: *mut midi_Output) {
        let this = fake_output(this);
        this.blocks_begun.set(this.blocks_begun.get() + 1);
    }
    unsafe extern "C" fn output_end_block(
        this: *mut midi_Output,
        length: c_int,
        srate: f64,
        curtempo: f64,
    ) {
        fake_output(this).block_end.set(Some((length, srate, curtempo)));
    }
    unsafe extern "C" fn output_send_msg(
        this: *mut midi_Output,
        msg: *mut MIDI_event_t,
        frame_offset: c_int,
    ) {
        fake_output(this)
            .sent_msgs
            .borrow_mut()
            .push((*msg, frame_offset));
    }
    unsafe extern "C" fn output_send(
        this: *mut midi_Output,
        status: c_uchar,
        d1: c_uchar,
        d2: c_uchar,
        frame_offset: c_int,
    ) {
        fake_output(this)
            .sent
            .borrow_mut()
            .push((status, d1, d2, frame_offset));
    }
    unsafe extern "C" fn output_destroy(this: *mut midi_Output) {
        fake_output(this).destroyed.set(true);
    }

    static OUTPUT_VTABLE: raw::midi_Output_vtable = raw::midi_Output_vtable {
        destructor: VirtualDestructor {
            #[cfg(not(target_env = "msvc"))]
            complete: output_destructor,
            #[cfg(not(target_env = "msvc"))]
            deleting: output_destructor,
            #[cfg(target_env = "msvc")]
            scalar_deleting: output_destructor,
        },
        BeginBlock: output_begin_block,
        EndBlock: output_end_block,
        SendMsg: output_send_msg,
        Send: output_send,
        Destroy: output_destroy,
    };

    #[test]
    fn input_device_calls_reach_their_slots() {
        // Given
        let read_buf = NonNull::<raw::MIDI_eventlist>::dangling().as_ptr();
        let mut device = FakeInput {
            base: midi_Input {
                vtable: &INPUT_VTABLE,
            },
            running: Cell::new(false),
            swapped_at: Cell::new(None),
            pre_note_tracking: Cell::new(None),
            read_buf,
            destroyed: Cell::new(false),
        };
        let cpp = unsafe { &mut *(std::ptr::addr_of_mut!(device) as *mut midi_Input) };
        // When
        cpp.start();
        cpp.SwapBufs(48_000);
        cpp.RunPreNoteTracking(1);
        let returned_read_buf = cpp.GetReadBuf();
        // Then
        assert!(device.running.get());
        assert_eq!(device.swapped_at.get(), Some(48_000));
        assert_eq!(device.pre_note_tracking.get(), Some(1));
        assert_eq!(returned_read_buf, read_buf);
        assert!(!device.destroyed.get());
        cpp.stop();
        cpp.Destroy();
        assert!(!device.running.get());
        assert!(device.destroyed.get());
    }

    #[test]
    fn output_device_calls_reach_their_slots() {
        // Given
        let device = FakeOutput {
            base: midi_Output {
                vtable: &OUTPUT_VTABLE,
            },
            blocks_begun: Cell::new(0),
            block_end: Cell::new(None),
            sent_msgs: RefCell::new(vec![]),
            sent: RefCell::new(vec![]),
            destroyed: Cell::new(false),
        };
        let cpp = unsafe { &*(&device as *const FakeOutput as *const midi_Output) };
        let mut sysex_start = MIDI_event_t {
            frame_offset: 0,
            size: 1,
            midi_message: [0xf0, 0, 0, 0],
        };
        // When
        cpp.BeginBlock();
        cpp.Send(0x90, 60, 100, 12);
        unsafe { cpp.SendMsg(&mut sysex_start, 24) };
        cpp.EndBlock(512, 44_100.0, 120.0);
        cpp.Destroy();
        // Then
        assert_eq!(device.blocks_begun.get(), 1);
        assert_eq!(*device.sent.borrow(), vec![(0x90, 60, 100, 12)]);
        assert_eq!(*device.sent_msgs.borrow(), vec![(sysex_start, 24)]);
        assert_eq!(device.block_end.get(), Some((512, 44_100.0, 120.0)));
        assert!(device.destroyed.get());
    }
}
