use crate::auth::token::Credential;

use super::user::{User, UserPatch};

/// Authentication state of the client.
///
/// `user` and `credential` are always set or cleared together; the only
/// ways to build a `Session` are [`Session::default`] and
/// [`Session::authenticated`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Session {
    user: Option<User>,
    #[serde(skip)] // Never hand the token to consumers of the snapshot
    credential: Option<Credential>,
}

impl Session {
    pub fn authenticated(user: User, credential: Credential) -> Session {
        Session {
            user: Some(user),
            credential: Some(credential),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.credential.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Returns the merged session, or `None` when there is no user to merge into.
    pub(crate) fn with_user_patch(&self, patch: UserPatch) -> Option<Session> {
        let credential = self.credential.clone()?;
        let mut user = self.user.clone()?;
        user.merge(patch);
        Some(Session::authenticated(user, credential))
    }
}

/// On-disk shape of a [`Session`].
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snapshot {
    is_authenticated: bool,
    user: Option<User>,
    #[serde(rename = "token")]
    credential: Option<Credential>,
}

impl From<&Session> for Snapshot {
    fn from(session: &Session) -> Self {
        Snapshot {
            is_authenticated: session.is_authenticated(),
            user: session.user.clone(),
            credential: session.credential.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("stored session is inconsistent")]
pub(crate) struct InconsistentSnapshot;

impl TryFrom<Snapshot> for Session {
    type Error = InconsistentSnapshot;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        match (snapshot.is_authenticated, snapshot.user, snapshot.credential) {
            (true, Some(user), Some(credential)) => Ok(Session::authenticated(user, credential)),
            (false, None, None) => Ok(Session::default()),
            _ => Err(InconsistentSnapshot),
        }
    }
}
