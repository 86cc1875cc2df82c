use std::{
    cell::Cell,
    convert::Infallible,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use log::trace;
use parking_lot::{Mutex, ReentrantMutex, RwLock};

pub type ListenerId = u64;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A state cell that tells its subscribers about every committed change.
///
/// Writers are serialized by the inner lock. Listeners run on the writer's
/// thread after the lock is released and before the write returns, so they
/// may read or write the cell themselves.
///
/// Snapshots reach listeners in commit order. When writers on different
/// threads race, a snapshot that was overtaken by a newer commit before it
/// could be delivered is skipped, so the last delivered value is always the
/// latest one.
pub struct Observable<T> {
    value: RwLock<Versioned<T>>,
    listeners: Mutex<Vec<(ListenerId, Listener<T>)>>,
    next_listener: AtomicU64,
    /// Version of the newest snapshot handed to listeners.
    delivered: ReentrantMutex<Cell<u64>>,
}

struct Versioned<T> {
    value: T,
    version: u64,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Observable<T> {
        Observable {
            value: RwLock::new(Versioned { value, version: 0 }),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            delivered: ReentrantMutex::new(Cell::new(0)),
        }
    }

    pub fn get(&self) -> T {
        self.value.read().value.clone()
    }

    /// Read through a closure without cloning the whole value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read().value)
    }

    pub fn set(&self, value: T) {
        self.update(|_| Some((value, ())));
    }

    /// [`try_update`](Observable::try_update) for changes that cannot fail.
    pub fn update<R>(&self, f: impl FnOnce(&T) -> Option<(T, R)>) -> Option<R> {
        match self.try_update(|current| Ok::<_, Infallible>(f(current))) {
            Ok(ret) => ret,
            Err(never) => match never {},
        }
    }

    /// Compute and commit a new value under the write lock.
    ///
    /// `f` returns `Ok(None)` to leave the value alone (nobody is notified)
    /// and `Err` to abort; in both cases the value is unchanged.
    pub fn try_update<R, E>(
        &self,
        f: impl FnOnce(&T) -> Result<Option<(T, R)>, E>,
    ) -> Result<Option<R>, E> {
        let mut guard = self.value.write();
        let Some((value, ret)) = f(&guard.value)? else {
            return Ok(None);
        };
        let snapshot = value.clone();
        guard.value = value;
        guard.version += 1;
        let version = guard.version;
        drop(guard);

        self.notify(&snapshot, version);
        Ok(Some(ret))
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(listener)));
        trace!("Added listener {}", id);
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        before != listeners.len()
    }

    fn notify(&self, value: &T, version: u64) {
        // Reentrant so a listener may write the cell; the nested write
        // delivers inline and supersedes the rest of this round
        let delivered = self.delivered.lock();
        if delivered.get() > version {
            trace!("Skipping superseded snapshot {}", version);
            return;
        }
        delivered.set(version);

        let listeners: Vec<Listener<T>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            if delivered.get() > version {
                return;
            }
            listener(value);
        }
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Observable::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_see_committed_value() {
        let cell = Arc::new(Observable::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = cell.clone();
        let log = seen.clone();
        cell.subscribe(move |value| {
            // Reading inside the listener must not deadlock
            assert_eq!(reader.get(), *value);
            log.lock().push(*value);
        });

        cell.set(1);
        cell.set(2);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn failed_update_changes_nothing() {
        let cell = Observable::new(String::from("before"));
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        cell.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result: Result<Option<()>, &str> = cell.try_update(|_| Err("nope"));
        assert!(result.is_err());

        let result: Result<Option<()>, &str> = cell.try_update(|_| Ok(None));
        assert_eq!(result, Ok(None));

        assert_eq!(cell.get(), "before");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let cell = Observable::new(0);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let id = cell.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cell.set(1);
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.set(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn infallible_update_commits_or_skips() {
        let cell = Observable::new(vec![1]);

        let len = cell.update(|v| {
            let mut next = v.clone();
            next.push(2);
            Some((next, v.len() + 1))
        });
        assert_eq!(len, Some(2));

        let skipped: Option<()> = cell.update(|_| None);
        assert_eq!(skipped, None);
        assert_eq!(cell.get(), vec![1, 2]);
    }

    #[test]
    fn listener_may_write_the_cell() {
        let cell = Arc::new(Observable::new(0u64));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let writer = cell.clone();
        cell.subscribe(move |value| {
            if *value == 1 {
                writer.set(10);
            }
        });
        let log = seen.clone();
        cell.subscribe(move |value| log.lock().push(*value));

        cell.set(1);

        assert_eq!(cell.get(), 10);
        // The nested write supersedes 1 before the second listener sees it
        assert_eq!(*seen.lock(), vec![10]);
    }

    #[test]
    fn racing_writers_deliver_in_commit_order() {
        const WRITERS: u64 = 4;
        const WRITES: u64 = 500;

        let cell = Arc::new(Observable::new(0u64));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        cell.subscribe(move |value| log.lock().push(*value));

        let handles: Vec<_> = (0..WRITERS)
            .map(|_| {
                let cell = cell.clone();
                std::thread::spawn(move || {
                    for _ in 0..WRITES {
                        cell.update(|v| Some((v + 1, ())));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer finishes");
        }

        let seen = seen.lock();
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(seen.last().copied(), Some(WRITERS * WRITES));
        assert_eq!(cell.get(), WRITERS * WRITES);
    }
}
