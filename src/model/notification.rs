use super::Snowflake;

pub type Id = Snowflake;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub id: Id,
    #[serde(rename = "type")]
    pub severity: Severity,
    #[serde(rename = "message")]
    pub text: String,
}
