//! Users and their prizes.

use super::{NO_QUERY, UserStub, decode, pids_at, unix_seconds};
use crate::entity::{Entity, Resolve, entity_eq, impl_entity_display};
use crate::error::{LuoguError, LuoguResult};
use crate::http::{LuoguClient, current_data};
use crate::lazy::LazyList;
use crate::models::Problem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use luogu_types::{Identifier, RawPayload, Uid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Profile fields of `currentData.user`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: Uid,
    pub name: String,
    #[serde(default)]
    pub slogan: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_banned: bool,
    /// Only present on some accounts.
    #[serde(default)]
    pub is_root: Option<bool>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub ccf_level: u32,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub ranking: Option<u64>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub blog_address: Option<String>,
    #[serde(deserialize_with = "unix_seconds")]
    pub register_time: DateTime<Utc>,
    #[serde(default)]
    pub prize: Vec<Prize>,
    /// Hidden by the server for users who keep their record private.
    #[serde(default)]
    pub passed_problem_count: Option<u64>,
    #[serde(default)]
    pub submitted_problem_count: Option<u64>,
}

/// A contest award listed on a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub year: i32,
    pub contest_name: String,
    pub prize: String,
}

impl Prize {
    pub fn new(year: i32, contest_name: impl Into<String>, prize: impl Into<String>) -> Self {
        Self {
            year,
            contest_name: contest_name.into(),
            prize: prize.into(),
        }
    }
}

impl Entity for Prize {
    const KIND: &'static str = "Prize";

    fn identity(&self) -> Identifier {
        Identifier::Str(self.contest_name.clone())
    }

    fn raw_payload(&self) -> Option<&RawPayload> {
        None
    }
}

impl PartialEq for Prize {
    fn eq(&self, other: &Self) -> bool {
        entity_eq(self, other, || {
            self.year == other.year
                && self.contest_name == other.contest_name
                && self.prize == other.prize
        })
    }
}

/// A user profile together with lazily resolved problem lists.
#[derive(Debug)]
pub struct User {
    raw: RawPayload,
    profile: UserProfile,
    passed_problems: LazyList<Problem>,
    submitted_problems: LazyList<Problem>,
}

impl User {
    /// Fetches user `uid` through `client`.
    pub async fn fetch(client: &LuoguClient, uid: Uid) -> LuoguResult<Self> {
        let body = client.fetch(&format!("/user/{uid}"), NO_QUERY).await?;
        Self::from_current_data(client, current_data(body)?)
    }

    /// Fetches user `uid` through the shared anonymous client.
    pub async fn get(uid: Uid) -> LuoguResult<Self> {
        Self::fetch(LuoguClient::shared(), uid).await
    }

    fn from_current_data(client: &LuoguClient, data: RawPayload) -> LuoguResult<Self> {
        let profile: UserProfile = decode(&data, "user")?;
        let passed_problems = LazyList::new(client.clone(), pids_at(&data, "passedProblems")?);
        let submitted_problems =
            LazyList::new(client.clone(), pids_at(&data, "submittedProblems")?);

        Ok(Self {
            raw: data,
            profile,
            passed_problems,
            submitted_problems,
        })
    }

    /// Searches users by uid or name.
    ///
    /// The search endpoint returns summaries only; each match resolves to a
    /// full profile when accessed.
    pub async fn search(client: &LuoguClient, keyword: &str) -> LuoguResult<LazyList<User>> {
        #[derive(Deserialize)]
        struct SearchResponse {
            users: Vec<Option<UserStub>>,
        }

        let body = client
            .fetch_unchecked("/api/user/search", &[("keyword", keyword)])
            .await?;
        let response: SearchResponse = serde_json::from_value(body.into())
            .map_err(|e| LuoguError::MalformedPayload(format!("user search: {e}")))?;

        let uids: Vec<Uid> = response.users.into_iter().flatten().map(|u| u.uid).collect();
        debug!("User search {:?} matched {} users", keyword, uids.len());
        Ok(LazyList::new(client.clone(), uids))
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn uid(&self) -> Uid {
        self.profile.uid
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Problems the user has solved. Empty when the record is private.
    pub fn passed_problems(&self) -> &LazyList<Problem> {
        &self.passed_problems
    }

    /// Problems the user has attempted. Empty when the record is private.
    pub fn submitted_problems(&self) -> &LazyList<Problem> {
        &self.submitted_problems
    }

    pub fn raw(&self) -> &RawPayload {
        &self.raw
    }
}

impl Entity for User {
    const KIND: &'static str = "User";

    fn identity(&self) -> Identifier {
        self.profile.uid.into()
    }

    fn raw_payload(&self) -> Option<&RawPayload> {
        Some(&self.raw)
    }
}

#[async_trait]
impl Resolve for User {
    type Stub = Uid;

    async fn resolve(client: &LuoguClient, stub: &Uid) -> LuoguResult<Self> {
        Self::fetch(client, *stub).await
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        entity_eq(self, other, || self.profile == other.profile)
    }
}

impl_entity_display!(User, Prize);
