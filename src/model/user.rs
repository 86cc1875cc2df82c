pub type Id = String;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub name: String,
}

/// A partial [`User`], applied field by field on top of an existing one.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
    }
}

impl From<User> for UserPatch {
    fn from(user: User) -> Self {
        UserPatch {
            id: Some(user.id),
            email: Some(user.email),
            name: Some(user.name),
        }
    }
}
