//! Problems, their attachments, and paged problem listings.

use super::{NO_QUERY, UserStub, decode, unix_seconds};
use crate::entity::{Entity, Resolve, entity_eq, impl_entity_display};
use crate::error::{LuoguError, LuoguResult};
use crate::http::{LuoguClient, current_data};
use crate::lazy::{LazyList, LazyRef};
use crate::models::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use luogu_types::{Identifier, Pid, RawPayload, Uid};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Statement fields of `currentData.problem`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemStatement {
    pub pid: Pid,
    pub title: String,
    /// Problem set, e.g. `P` or `CF`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub difficulty: u32,
    #[serde(default)]
    pub full_score: u32,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_format: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    /// `(input, output)` pairs.
    #[serde(default)]
    pub samples: Vec<(String, String)>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub can_edit: bool,
    /// `time` and `memory` limits per test case.
    #[serde(default)]
    pub limits: BTreeMap<String, Vec<u64>>,
    #[serde(default)]
    pub std_code: Option<String>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub wants_translation: bool,
    #[serde(default)]
    pub total_submit: u64,
    #[serde(default)]
    pub total_accepted: u64,
    #[serde(default)]
    pub flag: i64,
}

/// A downloadable file attached to a problem.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub download_link: String,
    #[serde(deserialize_with = "unix_seconds")]
    pub upload_time: DateTime<Utc>,
}

impl Entity for Attachment {
    const KIND: &'static str = "Attachment";

    fn identity(&self) -> Identifier {
        Identifier::Str(self.id.clone())
    }

    fn raw_payload(&self) -> Option<&RawPayload> {
        None
    }
}

impl PartialEq for Attachment {
    fn eq(&self, other: &Self) -> bool {
        entity_eq(self, other, || {
            self.id == other.id
                && self.filename == other.filename
                && self.size == other.size
                && self.download_link == other.download_link
                && self.upload_time == other.upload_time
        })
    }
}

/// A problem statement with its lazily resolved provider.
#[derive(Debug)]
pub struct Problem {
    raw: RawPayload,
    statement: ProblemStatement,
    provider: Option<LazyRef<User>>,
}

impl Problem {
    /// Fetches problem `pid` through `client`.
    pub async fn fetch(client: &LuoguClient, pid: &Pid) -> LuoguResult<Self> {
        let path = format!("/problem/{}", urlencoding::encode(pid.as_str()));
        let body = client.fetch(&path, NO_QUERY).await?;
        Self::from_current_data(client, current_data(body)?)
    }

    /// Fetches problem `pid` through the shared anonymous client.
    pub async fn get(pid: &Pid) -> LuoguResult<Self> {
        Self::fetch(LuoguClient::shared(), pid).await
    }

    fn from_current_data(client: &LuoguClient, data: RawPayload) -> LuoguResult<Self> {
        let statement: ProblemStatement = decode(&data, "problem")?;
        let provider = match data.get("problem").and_then(|p| p.get("provider")) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let stub = UserStub::deserialize(value)?;
                Some(LazyRef::new(client.clone(), stub.uid))
            }
        };

        Ok(Self {
            raw: data,
            statement,
            provider,
        })
    }

    pub fn statement(&self) -> &ProblemStatement {
        &self.statement
    }

    pub fn pid(&self) -> &Pid {
        &self.statement.pid
    }

    pub fn title(&self) -> &str {
        &self.statement.title
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.statement.attachments
    }

    /// The provider's uid, available without a fetch.
    pub fn provider_uid(&self) -> Option<Uid> {
        self.provider.as_ref().map(|p| *p.stub())
    }

    /// The user who provided the problem, fetched on first call.
    pub async fn provider(&self) -> LuoguResult<Arc<User>> {
        match &self.provider {
            Some(provider) => provider.get().await,
            None => Err(LuoguError::MalformedPayload(format!(
                "problem {} has no provider",
                self.statement.pid
            ))),
        }
    }

    pub fn raw(&self) -> &RawPayload {
        &self.raw
    }
}

impl Entity for Problem {
    const KIND: &'static str = "Problem";

    fn identity(&self) -> Identifier {
        self.statement.pid.clone().into()
    }

    fn raw_payload(&self) -> Option<&RawPayload> {
        Some(&self.raw)
    }
}

#[async_trait]
impl Resolve for Problem {
    type Stub = Pid;

    async fn resolve(client: &LuoguClient, stub: &Pid) -> LuoguResult<Self> {
        Self::fetch(client, stub).await
    }
}

impl PartialEq for Problem {
    fn eq(&self, other: &Self) -> bool {
        entity_eq(self, other, || self.statement == other.statement)
    }
}

/// Filters for a problem listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemQuery {
    pub page: u32,
    /// Problem set, e.g. `P`.
    #[serde(rename = "type")]
    pub kind: String,
    pub keyword: String,
    pub difficulty: Option<u32>,
    pub tag: String,
    /// Search statement text as well as titles.
    pub content: bool,
}

impl Default for ProblemQuery {
    fn default() -> Self {
        Self {
            page: 1,
            kind: "P".to_string(),
            keyword: String::new(),
            difficulty: None,
            tag: String::new(),
            content: false,
        }
    }
}

impl ProblemQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    /// Query pairs in the order the listing endpoint expects. Unset filters
    /// are sent empty.
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("type", self.kind.clone()),
            ("keyword", self.keyword.clone()),
            (
                "difficulty",
                self.difficulty.map(|d| d.to_string()).unwrap_or_default(),
            ),
            ("tag", self.tag.clone()),
            ("content", self.content.to_string()),
            ("_contentOnly", "1".to_string()),
        ]
    }
}

/// One page of a problem listing.
#[derive(Debug)]
pub struct ProblemList {
    raw: RawPayload,
    page: u32,
    kind: String,
    problem_count: u64,
    summaries: Vec<RawPayload>,
    problems: LazyList<Problem>,
}

impl ProblemList {
    /// Fetches one listing page through `client`.
    pub async fn fetch(client: &LuoguClient, query: &ProblemQuery) -> LuoguResult<Self> {
        #[derive(Deserialize)]
        struct Page {
            count: u64,
            result: Vec<RawPayload>,
        }

        let body = client.fetch("/problem/list", &query.to_pairs()).await?;
        let data = current_data(body)?;

        let page: u32 = decode(&data, "page")?;
        let listing: Page = decode(&data, "problems")?;
        let pids = listing
            .result
            .iter()
            .map(|summary| match summary.get("pid") {
                Some(Value::String(pid)) => Ok(Pid::new(pid.as_str())),
                _ => Err(LuoguError::MalformedPayload(
                    "problem summary has no `pid`".to_string(),
                )),
            })
            .collect::<LuoguResult<Vec<_>>>()?;

        Ok(Self {
            raw: data,
            page,
            kind: query.kind.clone(),
            problem_count: listing.count,
            summaries: listing.result,
            problems: LazyList::new(client.clone(), pids),
        })
    }

    /// Fetches one listing page through the shared anonymous client.
    pub async fn get(query: &ProblemQuery) -> LuoguResult<Self> {
        Self::fetch(LuoguClient::shared(), query).await
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Total matches across all pages.
    pub fn problem_count(&self) -> u64 {
        self.problem_count
    }

    /// The per-problem summaries on this page, as sent by the server.
    pub fn summaries(&self) -> &[RawPayload] {
        &self.summaries
    }

    /// The problems on this page, resolved to full statements on access.
    pub fn problems(&self) -> &LazyList<Problem> {
        &self.problems
    }

    pub fn raw(&self) -> &RawPayload {
        &self.raw
    }
}

impl Entity for ProblemList {
    const KIND: &'static str = "ProblemList";

    fn identity(&self) -> Identifier {
        Identifier::Int(u64::from(self.page))
    }

    fn raw_payload(&self) -> Option<&RawPayload> {
        Some(&self.raw)
    }
}

impl PartialEq for ProblemList {
    fn eq(&self, other: &Self) -> bool {
        entity_eq(self, other, || {
            self.page == other.page
                && self.kind == other.kind
                && self.problem_count == other.problem_count
                && self.summaries == other.summaries
        })
    }
}

impl_entity_display!(Problem, Attachment, ProblemList);
