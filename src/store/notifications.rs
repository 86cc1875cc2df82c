use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use log::{debug, error, trace, warn};
use parking_lot::Mutex;
use tokio::{runtime::Handle, task::JoinHandle};

use crate::model::{
    notification::Id,
    snowflake::{Snowcloud, EPOCH, PRIMARY_ID},
    Notification, Severity,
};

use super::observable::{ListenerId, Observable};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("failed to generate notification id: {0}")]
    Id(snowcloud::Error),
    #[error("notification ids exhausted for this millisecond")]
    IdsExhausted,
    #[error("notifications need a tokio runtime for their timers")]
    NoRuntime,
}

/// Queue of transient messages, each removed again after its timeout.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<Inner>,
}

struct Inner {
    queue: Observable<Vec<Notification>>,
    timers: Mutex<HashMap<Id, JoinHandle<()>>>,
    snowcloud: Snowcloud,
    timeout: Duration,
}

impl NotificationStore {
    pub fn new(timeout: Duration) -> Result<NotificationStore, NotificationError> {
        let snowcloud = Snowcloud::new(PRIMARY_ID, EPOCH).map_err(NotificationError::Id)?;

        Ok(NotificationStore {
            inner: Arc::new(Inner {
                queue: Observable::default(),
                timers: Mutex::new(HashMap::new()),
                snowcloud,
                timeout,
            }),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Queue a notification that disappears after the store's timeout.
    pub fn push(
        &self,
        severity: Severity,
        text: impl Into<String>,
    ) -> Result<Id, NotificationError> {
        self.push_for(severity, text, self.inner.timeout)
    }

    pub fn push_for(
        &self,
        severity: Severity,
        text: impl Into<String>,
        timeout: Duration,
    ) -> Result<Id, NotificationError> {
        let runtime = Handle::try_current().map_err(|_| NotificationError::NoRuntime)?;
        let id = self.next_id()?;
        let notification = Notification {
            id: id.clone(),
            severity,
            text: text.into(),
        };

        debug!("Pushing {:?} notification {}", severity, id);
        self.inner.queue.update(|queue| {
            let mut queue = queue.clone();
            queue.push(notification);
            Some((queue, ()))
        });

        let mut timers = self.inner.timers.lock();
        if !self.inner.contains(&id) {
            // Already removed by a listener or another caller
            return Ok(id);
        }

        let store = Arc::downgrade(&self.inner);
        let timer_id = id.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            expire(store, timer_id);
        });
        timers.insert(id.clone(), handle);

        Ok(id)
    }

    pub fn success(&self, text: impl Into<String>) -> Result<Id, NotificationError> {
        self.push(Severity::Success, text)
    }

    pub fn error(&self, text: impl Into<String>) -> Result<Id, NotificationError> {
        self.push(Severity::Error, text)
    }

    pub fn info(&self, text: impl Into<String>) -> Result<Id, NotificationError> {
        self.push(Severity::Info, text)
    }

    pub fn warning(&self, text: impl Into<String>) -> Result<Id, NotificationError> {
        self.push(Severity::Warning, text)
    }

    /// Remove a notification and cancel its timer. Unknown ids are ignored.
    pub fn remove(&self, id: &Id) {
        let removed = self.inner.remove_from_queue(id);

        if let Some(timer) = self.inner.timers.lock().remove(id) {
            timer.abort();
        }

        if removed {
            debug!("Removed notification {}", id);
        } else {
            trace!("Notification {} was not queued", id);
        }
    }

    /// Oldest first.
    pub fn list(&self) -> Vec<Notification> {
        self.inner.queue.get()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Vec<Notification>) + Send + Sync + 'static,
    ) -> ListenerId {
        self.inner.queue.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.queue.unsubscribe(id)
    }

    fn next_id(&self) -> Result<Id, NotificationError> {
        self.inner
            .snowcloud
            .next_id()
            .map(Id::from)
            .map_err(id_error)
    }
}

impl Inner {
    fn contains(&self, id: &Id) -> bool {
        self.queue
            .with(|queue| queue.iter().any(|notification| &notification.id == id))
    }

    fn remove_from_queue(&self, id: &Id) -> bool {
        self.queue
            .update(|queue| {
                if !queue.iter().any(|notification| &notification.id == id) {
                    return None;
                }
                let queue = queue
                    .iter()
                    .filter(|notification| &notification.id != id)
                    .cloned()
                    .collect();
                Some((queue, ()))
            })
            .is_some()
    }
}

fn id_error(err: snowcloud::Error) -> NotificationError {
    match err {
        snowcloud::Error::SequenceMaxReached(_next_millisecond) => {
            warn!("Snowflake sequence max reached");
            NotificationError::IdsExhausted
        }
        err => {
            error!("Failed to generate snowflake: {}", err);
            NotificationError::Id(err)
        }
    }
}

fn expire(store: Weak<Inner>, id: Id) {
    let Some(store) = store.upgrade() else {
        return;
    };

    // The timer is finishing on its own, so the handle is dropped rather than aborted
    store.timers.lock().remove(&id);
    if store.remove_from_queue(&id) {
        debug!("Notification {} expired", id);
    }
}
