use std::{
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::de::Error;

type InnerSnowflake = snowcloud::Snowflake<43, 8, 12>;

/// Generator shared by everything that hands out ids.
pub type Snowcloud = snowcloud::MultiThread<43, 8, 12>;

/// Milliseconds since the unix epoch that ids count from.
pub const EPOCH: u64 = 1650667342000;
pub const PRIMARY_ID: i64 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snowflake(InnerSnowflake);

impl Snowflake {
    pub fn id(&self) -> i64 {
        self.0.id()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseSnowflakeError {
    #[error("snowflake is not a number: {0}")]
    NotANumber(#[from] std::num::ParseIntError),
    #[error("invalid snowflake: {0}")]
    Invalid(snowcloud::Error),
}

impl TryFrom<i64> for Snowflake {
    type Error = snowcloud::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(Snowflake(InnerSnowflake::try_from(value)?))
    }
}

impl From<InnerSnowflake> for Snowflake {
    fn from(value: InnerSnowflake) -> Self {
        Snowflake(value)
    }
}

impl FromStr for Snowflake {
    type Err = ParseSnowflakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s.parse::<i64>()?;
        Snowflake::try_from(num).map_err(ParseSnowflakeError::Invalid)
    }
}

// Ids are compared, hashed and ordered by their numeric value, which is
// also creation order.
impl Hash for Snowflake {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl PartialOrd for Snowflake {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Snowflake {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id().cmp(&other.id())
    }
}

impl Display for Snowflake {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl serde::Serialize for Snowflake {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id().to_string().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Snowflake {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let num = String::deserialize(deserializer)?;
        Snowflake::from_str(&num).map_err(D::Error::custom)
    }
}
