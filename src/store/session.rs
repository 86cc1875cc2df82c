use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    auth::token::Credential,
    model::{
        session::{Snapshot, Session},
        Storage, StorageError, User, UserPatch,
    },
};

use super::observable::{ListenerId, Observable};

/// Storage key the session snapshot lives under.
pub const STORAGE_KEY: &str = "auth";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Authentication state, persisted on every change.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<Observable<Session>>,
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    /// Restore the last committed session from `storage`.
    ///
    /// Anything missing or unreadable restores as logged out.
    pub fn load(storage: Arc<dyn Storage>) -> SessionStore {
        let session = restore(storage.as_ref());
        info!(
            "Restored session (authenticated: {})",
            session.is_authenticated()
        );

        SessionStore {
            state: Arc::new(Observable::new(session)),
            storage,
        }
    }

    pub fn state(&self) -> Session {
        self.state.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(Session::is_authenticated)
    }

    pub fn user(&self) -> Option<User> {
        self.state.with(|session| session.user().cloned())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.state.with(|session| session.credential().cloned())
    }

    /// Replace whatever session is held with a new one.
    pub fn login(&self, user: User, credential: Credential) -> Result<(), StoreError> {
        debug!("Logging in user {}", user.id);
        let session = Session::authenticated(user, credential);
        self.commit(|_| Ok(Some(session)))?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        debug!("Logging out");
        self.commit(|_| Ok(Some(Session::default())))?;
        Ok(())
    }

    /// Merge `patch` into the logged in user.
    ///
    /// Returns `false` without touching anything when logged out: a partial
    /// update must never produce a user on its own.
    pub fn update_user(&self, patch: UserPatch) -> Result<bool, StoreError> {
        let updated = self.commit(|session| match session.with_user_patch(patch) {
            Some(session) => Ok(Some(session)),
            None => {
                warn!("Ignoring user update while logged out");
                Ok(None)
            }
        })?;
        Ok(updated)
    }

    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) -> ListenerId {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Persist the session `next` produces, then make it visible.
    fn commit(
        &self,
        next: impl FnOnce(&Session) -> Result<Option<Session>, StoreError>,
    ) -> Result<bool, StoreError> {
        let committed = self.state.try_update(|current| {
            let Some(session) = next(current)? else {
                return Ok(None);
            };
            let encoded = serde_json::to_string(&Snapshot::from(&session))?;
            self.storage.write(STORAGE_KEY, &encoded)?;
            Ok::<_, StoreError>(Some((session, ())))
        })?;
        Ok(committed.is_some())
    }
}

fn restore(storage: &dyn Storage) -> Session {
    let raw = match storage.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored session");
            return Session::default();
        }
        Err(err) => {
            warn!("Failed to read stored session: {}", err);
            return Session::default();
        }
    };

    let snapshot = match serde_json::from_str::<Snapshot>(&raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("Stored session is corrupt: {}", err);
            return Session::default();
        }
    };

    Session::try_from(snapshot).unwrap_or_else(|err| {
        warn!("Discarding stored session: {}", err);
        Session::default()
    })
}
