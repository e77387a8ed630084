//! Session-scoped handle storage.
//!
//! A session is the identity a sequence of calls executes under. By default that
//! is the calling OS thread, so a streaming write that is opened on one thread is
//! invisible from every other thread.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::FsCallError;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_SESSION_ID: SessionId =
        SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// The session bound to the calling thread. Stable for the lifetime of the thread.
    ///
    /// Ids are never reused. Handles a thread leaves open outlive it, see
    /// [`HandleRegistry::sweep`].
    pub fn current_thread() -> Self {
        THREAD_SESSION_ID.with(|id| *id)
    }

    /// A session with an explicit identity, for dispatchers that manage sessions themselves.
    ///
    /// Raw ids share the space of thread sessions, pick ids from a separate range
    /// (e.g. the high bit set) when both kinds are mixed.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Something kept in a [`HandleRegistry`], described in errors by its path.
pub trait SessionHandle {
    fn describe(&self) -> String;
}

#[derive(Debug)]
struct Slot<T> {
    label: String,
    handle: Mutex<Option<T>>,
}

/// At most one live handle per session.
///
/// The map is only locked long enough to find a slot. Work on a handle happens
/// under that slot's own lock, so I/O in one session never holds up another.
///
/// Thread sessions are never reused: a handle left open by a thread that has
/// exited stays here until [`HandleRegistry::sweep`] or `remove` takes it out.
#[derive(Debug)]
pub struct HandleRegistry<T> {
    slots: DashMap<SessionId, Arc<Slot<T>>>,
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }
}

impl<T: SessionHandle> HandleRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handle` in the session's slot.
    ///
    /// An occupied slot is left untouched and `handle` is dropped.
    pub fn put(&self, session: SessionId, handle: T) -> Result<(), FsCallError> {
        match self.slots.entry(session) {
            Entry::Occupied(existing) => Err(FsCallError::HandleAlreadyOpen {
                path: existing.get().label.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Slot {
                    label: handle.describe(),
                    handle: Mutex::new(Some(handle)),
                }));
                Ok(())
            }
        }
    }

    /// Runs `f` against the session's handle without removing it.
    pub fn peek<R>(
        &self,
        session: SessionId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, FsCallError> {
        let slot = self.slot(session)?;
        let mut guard = slot.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = guard.as_mut().ok_or(FsCallError::NoActiveHandle)?;
        Ok(f(handle))
    }

    pub fn remove(&self, session: SessionId) -> Result<T, FsCallError> {
        let (_, slot) = self
            .slots
            .remove(&session)
            .ok_or(FsCallError::NoActiveHandle)?;
        let handle = slot
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        handle.ok_or(FsCallError::NoActiveHandle)
    }

    /// Takes out every handle whose session `keep` rejects, for the caller to release.
    pub fn sweep(&self, mut keep: impl FnMut(SessionId) -> bool) -> Vec<T> {
        let sessions: Vec<SessionId> = self.slots.iter().map(|slot| *slot.key()).collect();
        sessions
            .into_iter()
            .filter(|session| !keep(*session))
            .filter_map(|session| self.remove(session).ok())
            .collect()
    }

    pub fn is_open(&self, session: SessionId) -> bool {
        self.slots.contains_key(&session)
    }

    /// Number of sessions currently holding a handle.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // The map guard is dropped before the slot is used.
    fn slot(&self, session: SessionId) -> Result<Arc<Slot<T>>, FsCallError> {
        self.slots
            .get(&session)
            .map(|slot| Arc::clone(slot.value()))
            .ok_or(FsCallError::NoActiveHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    struct Named(&'static str);

    impl SessionHandle for Named {
        fn describe(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn lifecycle() {
        let registry = HandleRegistry::new();
        let session = SessionId::from_raw(7);

        assert!(matches!(
            registry.peek(session, |_| ()),
            Err(FsCallError::NoActiveHandle)
        ));
        registry.put(session, Named("/tmp/a")).unwrap();
        assert!(registry.is_open(session));
        assert_eq!(registry.peek(session, |h| h.0).unwrap(), "/tmp/a");
        assert_eq!(registry.remove(session).unwrap(), Named("/tmp/a"));
        assert!(matches!(
            registry.remove(session),
            Err(FsCallError::NoActiveHandle)
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn second_put_fails_and_keeps_the_first_handle() {
        let registry = HandleRegistry::new();
        let session = SessionId::from_raw(1);
        registry.put(session, Named("/first")).unwrap();

        let err = registry.put(session, Named("/second")).unwrap_err();
        assert!(matches!(err, FsCallError::HandleAlreadyOpen { path } if path == "/first"));
        assert_eq!(registry.peek(session, |h| h.0).unwrap(), "/first");
    }

    #[test]
    fn sessions_are_isolated() {
        let registry = HandleRegistry::new();
        registry.put(SessionId::from_raw(1), Named("/one")).unwrap();
        registry.put(SessionId::from_raw(2), Named("/two")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.remove(SessionId::from_raw(2)).unwrap(), Named("/two"));
        assert!(registry.is_open(SessionId::from_raw(1)));
    }

    #[test]
    fn peek_does_not_block_other_sessions() {
        use std::sync::Barrier;

        let registry = HandleRegistry::new();
        let (a, b) = (SessionId::from_raw(1), SessionId::from_raw(2));
        registry.put(a, Named("/a")).unwrap();
        registry.put(b, Named("/b")).unwrap();

        // Session `a` stays inside `peek` until the other calls have been served.
        let entered = Barrier::new(2);
        let served = Barrier::new(2);
        std::thread::scope(|s| {
            s.spawn(|| {
                registry
                    .peek(a, |_| {
                        entered.wait();
                        served.wait();
                    })
                    .unwrap();
            });
            entered.wait();
            assert!(registry.is_open(a));
            assert!(matches!(
                registry.put(a, Named("/again")),
                Err(FsCallError::HandleAlreadyOpen { path }) if path == "/a"
            ));
            assert_eq!(registry.peek(b, |h| h.0).unwrap(), "/b");
            registry.put(SessionId::from_raw(3), Named("/c")).unwrap();
            assert_eq!(registry.remove(b).unwrap(), Named("/b"));
            assert_eq!(registry.len(), 2);
            served.wait();
        });
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn sweep_takes_out_rejected_sessions() {
        let registry = HandleRegistry::new();
        for (raw, name) in [(1, "/one"), (2, "/two"), (3, "/three")] {
            registry.put(SessionId::from_raw(raw), Named(name)).unwrap();
        }

        let mut swept = registry.sweep(|session| session.raw() == 2);
        swept.sort_by_key(|h| h.0);
        assert_eq!(swept, vec![Named("/one"), Named("/three")]);
        assert!(registry.is_open(SessionId::from_raw(2)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn thread_sessions_differ_across_threads() {
        let here = SessionId::current_thread();
        assert_eq!(here, SessionId::current_thread());

        let there = std::thread::spawn(SessionId::current_thread).join().unwrap();
        assert_ne!(here, there);
    }
}
