use crate::{Hz, MidiEventList, MidiFrameOffset};
use helgoboss_midi::{ShortMessage, U7};
use reaper_abi_low::raw;
use reaper_abi_low::raw::MIDI_event_t;
use ref_cast::RefCast;
use std::convert::TryFrom;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::ptr::NonNull;

/// Pointer to a MIDI input device.
///
/// All methods are supposed to be called in the audio thread only.
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct MidiInput(NonNull<raw::midi_Input>);

impl MidiInput {
    /// Wraps the given MIDI input device.
    ///
    /// # Safety
    ///
    /// The device must stay valid for as long as this value is used.
    pub unsafe fn new(raw: NonNull<raw::midi_Input>) -> Self {
        Self(raw)
    }

    /// Returns the pointer to this device.
    pub fn as_ptr(&self) -> NonNull<raw::midi_Input> {
        self.0
    }

    /// Grants temporary access to the already read MIDI events.
    ///
    /// The event list is only valid during the current audio block, that's why it's only passed to
    /// the given function. Returns `None` if the device doesn't have any read buffer.
    //
    // Returning an owned list would mean copying events in the audio thread.
    pub fn get_read_buf<R>(
        &mut self,
        use_buf: impl FnOnce(&mut BorrowedMidiEventList) -> R,
    ) -> Option<R> {
        let raw_list = unsafe { self.0.as_mut() }.GetReadBuf();
        let mut raw_list = NonNull::new(raw_list)?;
        let list = BorrowedMidiEventList::from_raw_mut(unsafe { raw_list.as_mut() });
        Some(use_buf(list))
    }
}

/// Pointer to a MIDI output device.
#[derive(Eq, PartialEq, Hash, Debug)]
pub struct MidiOutput(NonNull<raw::midi_Output>);

impl MidiOutput {
    /// Wraps the given MIDI output device.
    ///
    /// # Safety
    ///
    /// The device must stay valid for as long as this value is used.
    pub unsafe fn new(raw: NonNull<raw::midi_Output>) -> Self {
        Self(raw)
    }

    pub fn as_ptr(&self) -> NonNull<raw::midi_Output> {
        self.0
    }

    pub fn begin_block(&self) {
        unsafe { self.0.as_ref() }.BeginBlock();
    }

    /// Ends the current block of `length` frames.
    pub fn end_block(&self, length: u32, sample_rate: Hz, current_tempo: f64) {
        let length = c_int::try_from(length).unwrap_or(c_int::MAX);
        unsafe { self.0.as_ref() }.EndBlock(length, sample_rate.get(), current_tempo);
    }

    /// Sends the given short message at the given position within the current block.
    pub fn send(&self, message: impl ShortMessage, frame_offset: MidiFrameOffset) {
        unsafe { self.0.as_ref() }.Send(
            message.status_byte(),
            message.data_byte_1().get(),
            message.data_byte_2().get(),
            frame_offset.to_raw(),
        );
    }

    /// Sends the given event as it is.
    pub fn send_msg(&self, event: &mut MIDI_event_t, frame_offset: MidiFrameOffset) {
        unsafe { self.0.as_ref().SendMsg(event, frame_offset.to_raw()) };
    }
}

/// Borrowed (reference-only) list of MIDI events.
//
// Case 3: Internals exposed: no | vtable: yes
// ===========================================
#[derive(Debug, RefCast)]
#[repr(transparent)]
pub struct BorrowedMidiEventList(raw::MIDI_eventlist);

impl BorrowedMidiEventList {
    /// Creates a medium-level representation from the given low-level reference.
    pub fn from_raw(raw: &raw::MIDI_eventlist) -> &Self {
        Self::ref_cast(raw)
    }

    /// Creates a mutable medium-level representation from the given low-level reference.
    pub fn from_raw_mut(raw: &mut raw::MIDI_eventlist) -> &mut Self {
        Self::ref_cast_mut(raw)
    }

    pub fn as_ptr(&self) -> MidiEventList {
        NonNull::from(&self.0)
    }

    /// Returns an iterator over the events, starting at the given byte position.
    ///
    /// Pass 0 in order to iterate over all events.
    pub fn enum_items(&mut self, bpos: u32) -> MidiEventListIterator {
        MidiEventListIterator {
            raw_list: NonNull::from(&mut self.0),
            bpos: bpos as c_int,
            p: PhantomData,
        }
    }

    /// Adds a copy of the given event.
    pub fn add_item(&mut self, event: &MIDI_event_t) {
        let mut copy = *event;
        unsafe { self.0.AddItem(&mut copy) };
    }

    /// Deletes the event at the given byte position.
    pub fn delete_item(&mut self, bpos: u32) {
        unsafe { self.0.DeleteItem(bpos as c_int) };
    }

    /// Returns the size of the list in bytes.
    pub fn get_size(&mut self) -> u32 {
        unsafe { self.0.GetSize() }.max(0) as u32
    }

    pub fn empty(&mut self) {
        unsafe { self.0.Empty() };
    }
}

impl AsRef<raw::MIDI_eventlist> for BorrowedMidiEventList {
    fn as_ref(&self) -> &raw::MIDI_eventlist {
        &self.0
    }
}

impl AsMut<raw::MIDI_eventlist> for BorrowedMidiEventList {
    fn as_mut(&mut self) -> &mut raw::MIDI_eventlist {
        &mut self.0
    }
}

/// Iterates over the events of a [`BorrowedMidiEventList`].
///
/// Doesn't allocate, so it's fine to use it in real-time threads.
pub struct MidiEventListIterator<'a> {
    raw_list: NonNull<raw::MIDI_eventlist>,
    bpos: c_int,
    p: PhantomData<&'a mut raw::MIDI_eventlist>,
}

impl<'a> Iterator for MidiEventListIterator<'a> {
    type Item = MidiEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw_event = unsafe { self.raw_list.as_mut().EnumItems(&mut self.bpos) };
        if raw_event.is_null() {
            // No MIDI events left
            return None;
        }
        Some(MidiEvent(unsafe { &*raw_event }))
    }
}

/// A borrowed reference to a MIDI event owned by REAPER.
///
/// Cheap to copy because it's just a reference to a `MIDI_event_t`.
#[derive(Copy, Clone, Debug)]
pub struct MidiEvent<'a>(&'a MIDI_event_t);

impl<'a> MidiEvent<'a> {
    pub fn from_raw(raw: &'a MIDI_event_t) -> Self {
        MidiEvent(raw)
    }

    /// Position of this event within the current audio block.
    pub fn frame_offset(&self) -> MidiFrameOffset {
        MidiFrameOffset::new(self.0.frame_offset.max(0) as u32)
    }

    /// Number of bytes of the message.
    pub fn size(&self) -> u32 {
        self.0.size.max(0) as u32
    }

    pub fn message(&self) -> MidiMessage<'a> {
        MidiMessage(self.0)
    }

    pub fn as_raw(&self) -> &'a MIDI_event_t {
        self.0
    }
}

/// The short message contained in a [`MidiEvent`].
#[derive(Copy, Clone, Debug)]
pub struct MidiMessage<'a>(&'a MIDI_event_t);

impl<'a> ShortMessage for MidiMessage<'a> {
    fn status_byte(&self) -> u8 {
        self.0.midi_message[0]
    }

    // REAPER only passes valid data bytes but we don't want to rely on that.
    fn data_byte_1(&self) -> U7 {
        unsafe { U7::new_unchecked(self.0.midi_message[1] & 0x7f) }
    }

    fn data_byte_2(&self) -> U7 {
        unsafe { U7::new_unchecked(self.0.midi_message[2] & 0x7f) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaper_abi_low::{
        create_cpp_to_rust_midi_event_list, create_rust_midi_event_list_registry,
        delete_cpp_midi_event_list, RegistryMode, VirtualDestructor,
    };
    use std::cell::RefCell;
    use std::mem::size_of;
    #[cfg(target_env = "msvc")]
    use std::os::raw::c_void;
    use std::os::raw::c_uint;
    use std::ptr::null_mut;

    struct ArrayEventList {
        events: [MIDI_event_t; 8],
        len: usize,
    }

    impl reaper_abi_low::MIDI_eventlist for ArrayEventList {
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

    fn note_on(frame_offset: c_int, key: u8) -> MIDI_event_t {
        MIDI_event_t {
            frame_offset,
            size: 3,
            midi_message: [0x90, key, 100, 0],
        }
    }

    #[test]
    fn iterate_events() {
        // Given
        let list: Box<dyn reaper_abi_low::MIDI_eventlist> = Box::new(ArrayEventList {
            events: Default::default(),
            len: 0,
        });
        let registry = create_rust_midi_event_list_registry(RegistryMode::MultiInstance);
        let mut cpp_list =
            unsafe { create_cpp_to_rust_midi_event_list(&registry, (&list).into()) }.unwrap();
        let borrowed = BorrowedMidiEventList::from_raw_mut(unsafe { cpp_list.as_mut() });
        // When
        borrowed.add_item(&note_on(0, 60));
        borrowed.add_item(&note_on(32, 64));
        borrowed.add_item(&note_on(64, 67));
        borrowed.delete_item(1);
        // Then
        assert_eq!(borrowed.get_size(), 2 * size_of::<MIDI_event_t>() as u32);
        let events: Vec<_> = borrowed
            .enum_items(0)
            .map(|e| (e.frame_offset().get(), e.message().data_byte_1().get()))
            .collect();
        assert_eq!(events, vec![(0, 60), (64, 67)]);
        let first = borrowed.enum_items(0).next().unwrap();
        assert_eq!(first.message().status_byte(), 0x90);
        assert_eq!(first.message().data_byte_2().get(), 100);
        assert_eq!(first.size(), 3);
        borrowed.empty();
        assert_eq!(borrowed.enum_items(0).count(), 0);
        assert!(unsafe { delete_cpp_midi_event_list(&registry, cpp_list) });
    }

    #[test]
    fn data_bytes_are_masked() {
        let raw = MIDI_event_t {
            frame_offset: -5,
            size: 3,
            midi_message: [0xb0, 0xff, 0x80, 0],
        };
        let event = MidiEvent::from_raw(&raw);
        assert_eq!(event.frame_offset(), MidiFrameOffset::MIN);
        assert_eq!(event.message().data_byte_1().get(), 0x7f);
        assert_eq!(event.message().data_byte_2().get(), 0);
    }

    #[cfg(not(target_env = "msvc"))]
    unsafe extern "C" fn no_destructor<T>(_: *mut T) {}
    #[cfg(target_env = "msvc")]
    unsafe extern "C" fn no_destructor<T>(this: *mut T, _: c_uint) -> *mut c_void {
        this as _
    }

    fn no_virtual_destructor<T>() -> VirtualDestructor<T> {
        VirtualDestructor {
            #[cfg(not(target_env = "msvc"))]
            complete: no_destructor::<T>,
            #[cfg(not(target_env = "msvc"))]
            deleting: no_destructor::<T>,
            #[cfg(target_env = "msvc")]
            scalar_deleting: no_destructor::<T>,
        }
    }

    /// Stands in for a MIDI input device whose read buffer is set by the test.
    #[repr(C)]
    struct FakeInput {
        base: raw::midi_Input,
        read_buf: *mut raw::MIDI_eventlist,
    }

    unsafe extern "C" fn input_noop(_: *mut raw::midi_Input) {}
    unsafe extern "C" fn input_swap_bufs(_: *mut raw::midi_Input, _: c_uint) {}
    unsafe extern "C" fn input_run_pre_note_tracking(_: *mut raw::midi_Input, _: c_int) {}
    unsafe extern "C" fn input_get_read_buf(
        this: *mut raw::midi_Input,
    ) -> *mut raw::MIDI_eventlist {
        (*(this as *const FakeInput)).read_buf
    }

    fn input_vtable() -> raw::midi_Input_vtable {
        raw::midi_Input_vtable {
            destructor: no_virtual_destructor(),
            start: input_noop,
            stop: input_noop,
            SwapBufs: input_swap_bufs,
            RunPreNoteTracking: input_run_pre_note_tracking,
            GetReadBuf: input_get_read_buf,
            Destroy: input_noop,
        }
    }

    /// Stands in for a MIDI output device which records what arrives.
    #[repr(C)]
    struct FakeOutput {
        base: raw::midi_Output,
        log: RefCell<Vec<String>>,
    }

    unsafe fn output_log<'a>(this: *mut raw::midi_Output) -> &'a RefCell<Vec<String>> {
        &(*(this as *const FakeOutput)).log
    }

    unsafe extern "C" fn output_begin_block(this: *mut raw::midi_Output) {
        output_log(this).borrow_mut().push("begin".to_string());
    }
    unsafe extern "C" fn output_end_block(
        this: *mut raw::midi_Output,
        length: c_int,
        srate: f64,
        curtempo: f64,
    ) {
        output_log(this)
            .borrow_mut()
            .push(format!("end {} {} {}", length, srate, curtempo));
    }
    unsafe extern "C" fn output_send_msg(
        this: *mut raw::midi_Output,
        msg: *mut MIDI_event_t,
        frame_offset: c_int,
    ) {
        let msg = &*msg;
        output_log(this).borrow_mut().push(format!(
            "msg {:?} {} @{}",
            &msg.midi_message[..msg.size as usize],
            msg.frame_offset,
            frame_offset
        ));
    }
    unsafe extern "C" fn output_send(
        this: *mut raw::midi_Output,
        status: u8,
        d1: u8,
        d2: u8,
        frame_offset: c_int,
    ) {
        output_log(this)
            .borrow_mut()
            .push(format!("send {:x} {} {} @{}", status, d1, d2, frame_offset));
    }
    unsafe extern "C" fn output_destroy(_: *mut raw::midi_Output) {}

    fn output_vtable() -> raw::midi_Output_vtable {
        raw::midi_Output_vtable {
            destructor: no_virtual_destructor(),
            BeginBlock: output_begin_block,
            EndBlock: output_end_block,
            SendMsg: output_send_msg,
            Send: output_send,
            Destroy: output_destroy,
        }
    }

    #[test]
    fn read_buffer_of_input_device() {
        // Given
        let mut events: [MIDI_event_t; 8] = Default::default();
        events[0] = note_on(0, 60);
        events[1] = note_on(10, 62);
        let list: Box<dyn reaper_abi_low::MIDI_eventlist> =
            Box::new(ArrayEventList { events, len: 2 });
        let registry = create_rust_midi_event_list_registry(RegistryMode::MultiInstance);
        let cpp_list =
            unsafe { create_cpp_to_rust_midi_event_list(&registry, (&list).into()) }.unwrap();
        let vtable = input_vtable();
        let mut device = FakeInput {
            base: raw::midi_Input { vtable: &vtable },
            read_buf: cpp_list.as_ptr(),
        };
        let mut input = unsafe { MidiInput::new(NonNull::from(&mut device).cast()) };
        // When
        let keys = input.get_read_buf(|buf| {
            buf.enum_items(0)
                .map(|e| e.message().data_byte_1().get())
                .collect::<Vec<_>>()
        });
        // Then
        assert_eq!(keys, Some(vec![60, 62]));
        device.read_buf = null_mut();
        let mut input = unsafe { MidiInput::new(NonNull::from(&mut device).cast()) };
        assert_eq!(input.get_read_buf(|buf| buf.get_size()), None);
        assert!(unsafe { delete_cpp_midi_event_list(&registry, cpp_list) });
    }

    #[test]
    fn output_device_receives_block() {
        // Given
        let vtable = output_vtable();
        let mut device = FakeOutput {
            base: raw::midi_Output { vtable: &vtable },
            log: RefCell::new(vec![]),
        };
        let output = unsafe { MidiOutput::new(NonNull::from(&mut device).cast()) };
        let note = note_on(0, 64);
        let mut program_change = MIDI_event_t {
            frame_offset: 3,
            size: 2,
            midi_message: [0xc0, 5, 0, 0],
        };
        // When
        output.begin_block();
        output.send(MidiEvent::from_raw(&note).message(), MidiFrameOffset::new(7));
        output.send_msg(&mut program_change, MidiFrameOffset::new(9));
        output.end_block(256, Hz::new(48000.0), 90.0);
        // Then
        assert_eq!(
            *device.log.borrow(),
            vec![
                "begin".to_string(),
                "send 90 64 100 @7".to_string(),
                "msg [192, 5] 3 @9".to_string(),
                "end 256 48000 90".to_string(),
            ]
        );
    }
}
