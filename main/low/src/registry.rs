use crate::host_object::{ForeignHandle, HostInterface, HostObject, ReleaseFn};
use crate::lock_ignoring_poisoning;
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Decides how many host objects a registry may hold at the same time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RegistryMode {
    /// Any number of objects, one per distinct foreign handle.
    MultiInstance,
    /// At most one object. Used for things REAPER only accepts once per plug-in, e.g. a control
    /// surface which is installed directly.
    SingleSlot,
}

impl Default for RegistryMode {
    fn default() -> Self {
        RegistryMode::MultiInstance
    }
}

/// An error which can occur when registering a foreign implementation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Error)]
pub enum RegistryError {
    #[display(fmt = "foreign handle {:?} is already registered", handle)]
    AlreadyRegistered { handle: ForeignHandle },
    #[display(fmt = "single-slot registry is already occupied")]
    SlotOccupied,
}

/// Counters for checking that registries are used the way they should.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct RegistryStats {
    /// How often the registry lock has been taken.
    pub lock_acquisitions: usize,
    /// How many control-path calls arrived at objects which were not registered anymore.
    pub stale_calls: usize,
}

/// Maps foreign handles to the host objects which REAPER holds.
///
/// Registering a handle allocates a host object which REAPER can call like any C++ object
/// implementing interface `I`. Unregistering detaches it: from that moment on, calls which still
/// arrive are answered with inert values instead of reaching the foreign implementation.
///
/// Dropping the registry detaches all remaining objects but doesn't free them, because REAPER
/// might still hold pointers to them.
pub struct LifecycleRegistry<I: HostInterface> {
    state: Arc<RegistryState<I>>,
}

impl<I: HostInterface> LifecycleRegistry<I> {
    /// Creates a registry whose host objects forward calls to the given callbacks table.
    pub fn new(mode: RegistryMode, callbacks: &'static I::Callbacks) -> Self {
        Self {
            state: Arc::new(RegistryState {
                mode,
                callbacks,
                entries: Default::default(),
                lock_acquisitions: AtomicUsize::new(0),
                stale_calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn multi_instance(callbacks: &'static I::Callbacks) -> Self {
        Self::new(RegistryMode::MultiInstance, callbacks)
    }

    pub fn single_slot(callbacks: &'static I::Callbacks) -> Self {
        Self::new(RegistryMode::SingleSlot, callbacks)
    }

    pub fn mode(&self) -> RegistryMode {
        self.state.mode
    }

    pub fn callbacks(&self) -> &'static I::Callbacks {
        self.state.callbacks
    }

    /// Creates a host object for the given foreign implementation and returns the pointer that
    /// should be passed to REAPER.
    ///
    /// The object is owned by this registry. Free it with [`unregister()`](#method.unregister).
    pub fn register(&self, handle: ForeignHandle) -> Result<NonNull<I::Raw>, RegistryError> {
        self.register_internal(handle, None)
    }

    /// Like [`register()`](#method.register) but for objects which are going to be owned by
    /// REAPER (e.g. the result of `PCM_source::Duplicate()`).
    ///
    /// When REAPER deletes the object, it's removed from the registry and `release` is called
    /// exactly once with the handle. `release` is not called on [`unregister()`].
    ///
    /// [`unregister()`]: #method.unregister
    pub fn register_with_release(
        &self,
        handle: ForeignHandle,
        release: ReleaseFn,
    ) -> Result<NonNull<I::Raw>, RegistryError> {
        self.register_internal(handle, Some(release))
    }

    fn register_internal(
        &self,
        handle: ForeignHandle,
        release: Option<ReleaseFn>,
    ) -> Result<NonNull<I::Raw>, RegistryError> {
        let mut entries = self.state.lock();
        if entries.contains_key(&handle) {
            return Err(RegistryError::AlreadyRegistered { handle });
        }
        if self.state.mode == RegistryMode::SingleSlot && !entries.is_empty() {
            return Err(RegistryError::SlotOccupied);
        }
        let object = HostObject::<I>::allocate(
            handle,
            self.state.callbacks,
            Arc::downgrade(&self.state),
            release,
        );
        entries.insert(handle, ObjectPtr(object));
        drop(entries);
        tracing::debug!(
            msg = "Registered host object",
            interface = I::descriptor().name,
            ?handle,
            host_owned = release.is_some()
        );
        Ok(object.cast())
    }

    /// Detaches and frees the given host object.
    ///
    /// Returns `false` (and does nothing) if the object is not registered here, e.g. because it
    /// has already been unregistered or REAPER has deleted it already.
    ///
    /// Make sure REAPER doesn't use the object anymore before calling this, e.g. by unregistering
    /// it from REAPER first.
    pub fn unregister(&self, object: NonNull<I::Raw>) -> bool {
        let ptr = object.as_ptr() as *mut HostObject<I>;
        let mut entries = self.state.lock();
        let handle = match entries
            .iter()
            .find(|(_, o)| o.0.as_ptr() == ptr)
            .map(|(h, _)| *h)
        {
            None => return false,
            Some(h) => h,
        };
        entries.remove(&handle);
        drop(entries);
        let object = unsafe { Box::from_raw(ptr) };
        object.detach();
        drop(object);
        tracing::debug!(
            msg = "Unregistered host object",
            interface = I::descriptor().name,
            ?handle
        );
        true
    }

    /// Returns the host object registered for the given handle.
    pub fn lookup(&self, handle: ForeignHandle) -> Option<NonNull<I::Raw>> {
        self.state.lock().get(&handle).map(|o| o.0.cast())
    }

    pub fn contains(&self, handle: ForeignHandle) -> bool {
        self.state.lock().contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            lock_acquisitions: self.state.lock_acquisitions.load(Ordering::Relaxed),
            stale_calls: self.state.stale_calls.load(Ordering::Relaxed),
        }
    }
}

impl<I: HostInterface> Drop for LifecycleRegistry<I> {
    fn drop(&mut self) {
        let mut entries = self.state.lock();
        if entries.is_empty() {
            return;
        }
        tracing::warn!(
            msg = "Registry dropped with host objects still registered. Leaking them.",
            interface = I::descriptor().name,
            count = entries.len()
        );
        for (_, object) in entries.drain() {
            unsafe { object.0.as_ref() }.detach();
        }
    }
}

impl<I: HostInterface> fmt::Debug for LifecycleRegistry<I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("interface", &I::descriptor().name)
            .field("mode", &self.state.mode)
            .field("len", &self.len())
            .finish()
    }
}

pub(crate) struct RegistryState<I: HostInterface> {
    mode: RegistryMode,
    callbacks: &'static I::Callbacks,
    entries: Mutex<HashMap<ForeignHandle, ObjectPtr<I>>>,
    lock_acquisitions: AtomicUsize,
    stale_calls: AtomicUsize,
}

impl<I: HostInterface> RegistryState<I> {
    fn lock(&self) -> MutexGuard<HashMap<ForeignHandle, ObjectPtr<I>>> {
        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
        lock_ignoring_poisoning(&self.entries)
    }

    /// Checks whether the given object is still the one registered for the handle.
    pub(crate) fn resolve(&self, handle: ForeignHandle, object: *const HostObject<I>) -> bool {
        let registered = self
            .lock()
            .get(&handle)
            .map(|o| o.0.as_ptr() as *const _ == object)
            .unwrap_or(false);
        if !registered {
            self.stale_calls.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                msg = "Call to unregistered host object ignored",
                interface = I::descriptor().name,
                ?handle
            );
        }
        registered
    }

    /// Removes the entry for an object which REAPER is destroying.
    pub(crate) fn forget(&self, handle: ForeignHandle, object: *const HostObject<I>) {
        let mut entries = self.lock();
        if entries.get(&handle).map(|o| o.0.as_ptr() as *const _) == Some(object) {
            entries.remove(&handle);
        }
    }
}

struct ObjectPtr<I: HostInterface>(NonNull<HostObject<I>>);

// Host objects are only accessed through raw pointers by REAPER and by the registry under lock.
unsafe impl<I: HostInterface> Send for ObjectPtr<I> {}
