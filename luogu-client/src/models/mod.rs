//! Entity schemas for users, problems and pastes.
//!
//! Each entity is built from the `currentData` object of one content-only
//! response. Field renaming is handled by serde records; the entity keeps
//! the payload itself for equality.

mod paste;
mod problem;
mod user;

pub use paste::{Paste, PasteRecord};
pub use problem::{Attachment, Problem, ProblemList, ProblemQuery, ProblemStatement};
pub use user::{Prize, User, UserProfile};

use crate::error::{LuoguError, LuoguResult};
use chrono::{DateTime, Utc};
use luogu_types::{Pid, RawPayload, Uid};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Query for endpoints that take no parameters.
const NO_QUERY: &[(&str, &str)] = &[];

/// Decodes `data[key]` into `T`.
fn decode<T: DeserializeOwned>(data: &RawPayload, key: &str) -> LuoguResult<T> {
    let value = data
        .get(key)
        .ok_or_else(|| LuoguError::MalformedPayload(format!("missing `{key}`")))?;
    Ok(T::deserialize(value)?)
}

/// Collects the `pid` of every object in the array at `data[key]`.
///
/// A missing or `null` key yields an empty list.
fn pids_at(data: &RawPayload, key: &str) -> LuoguResult<Vec<Pid>> {
    #[derive(Deserialize)]
    struct PidStub {
        pid: Pid,
    }

    match data.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => {
            let stubs = Vec::<PidStub>::deserialize(value)?;
            Ok(stubs.into_iter().map(|s| s.pid).collect())
        }
    }
}

/// Reads a mutation response's `id`.
fn response_id(body: &RawPayload) -> LuoguResult<String> {
    match body.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(LuoguError::MalformedPayload(
            "mutation response has no `id`".to_string(),
        )),
    }
}

/// A `{uid, ...}` user summary embedded in another payload.
#[derive(Debug, Clone, Deserialize)]
struct UserStub {
    uid: Uid,
}

/// Deserializes unix seconds into a UTC timestamp.
fn unix_seconds<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = i64::deserialize(deserializer)?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {secs}")))
}
