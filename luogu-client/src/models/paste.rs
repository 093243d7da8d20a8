//! Pastes: the one entity with create, edit and delete.

use super::{NO_QUERY, UserStub, decode, response_id, unix_seconds};
use crate::entity::{Entity, Resolve, entity_eq, impl_entity_display};
use crate::error::LuoguResult;
use crate::http::{LuoguClient, current_data};
use crate::lazy::LazyRef;
use crate::models::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use luogu_types::{Identifier, PasteId, RawPayload, Uid};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Fields of `currentData.paste`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PasteRecord {
    pub id: PasteId,
    pub data: String,
    #[serde(default)]
    pub public: bool,
    #[serde(deserialize_with = "unix_seconds")]
    pub time: DateTime<Utc>,
}

/// A paste, bound to the client that fetched it.
///
/// Edits and deletes go through the same client, so a paste fetched from a
/// session mutates as that session's user.
#[derive(Debug)]
pub struct Paste {
    raw: RawPayload,
    client: LuoguClient,
    record: PasteRecord,
    user: LazyRef<User>,
}

impl Paste {
    /// Fetches paste `id` through `client`.
    pub async fn fetch(client: &LuoguClient, id: &PasteId) -> LuoguResult<Self> {
        let path = format!("/paste/{}", urlencoding::encode(id.as_str()));
        let body = client.fetch(&path, NO_QUERY).await?;
        Self::from_current_data(client, current_data(body)?)
    }

    /// Fetches paste `id` through the shared anonymous client.
    pub async fn get(id: &PasteId) -> LuoguResult<Self> {
        Self::fetch(LuoguClient::shared(), id).await
    }

    fn from_current_data(client: &LuoguClient, data: RawPayload) -> LuoguResult<Self> {
        #[derive(Deserialize)]
        struct Owner {
            user: UserStub,
        }

        let record: PasteRecord = decode(&data, "paste")?;
        let owner: Owner = decode(&data, "paste")?;

        Ok(Self {
            raw: data,
            client: client.clone(),
            record,
            user: LazyRef::new(client.clone(), owner.user.uid),
        })
    }

    /// Creates a paste and fetches it back.
    ///
    /// `public: None` leaves visibility to the server default (private).
    pub async fn create(client: &LuoguClient, data: &str, public: Option<bool>) -> LuoguResult<Self> {
        let body = json!({ "data": data, "public": public });
        let response = client.mutate("/paste/new", Some(&body)).await?;
        let id = PasteId::new(response_id(&response)?);
        info!("Created paste {}", id);
        Self::fetch(client, &id).await
    }

    /// Edits the paste in place and returns its id.
    ///
    /// Omitted values are sent as `null`. Local fields change only after the
    /// server accepts the edit; the stored payload is not refreshed.
    pub async fn edit(&mut self, data: Option<&str>, public: Option<bool>) -> LuoguResult<PasteId> {
        let path = format!("/paste/edit/{}", urlencoding::encode(self.record.id.as_str()));
        let body = json!({ "data": data, "public": public });
        let response = self.client.mutate(&path, Some(&body)).await?;
        let id = PasteId::new(response_id(&response)?);

        if let Some(data) = data {
            self.record.data = data.to_string();
        }
        if let Some(public) = public {
            self.record.public = public;
        }
        info!("Edited paste {}", id);
        Ok(id)
    }

    /// Deletes the paste and returns the id the server reports.
    pub async fn delete(&self) -> LuoguResult<PasteId> {
        let path = format!("/paste/delete/{}", urlencoding::encode(self.record.id.as_str()));
        let response = self.client.mutate(&path, None).await?;
        let id = PasteId::new(response_id(&response)?);
        info!("Deleted paste {}", id);
        Ok(id)
    }

    pub fn id(&self) -> &PasteId {
        &self.record.id
    }

    pub fn data(&self) -> &str {
        &self.record.data
    }

    pub fn is_public(&self) -> bool {
        self.record.public
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.record.time
    }

    pub fn record(&self) -> &PasteRecord {
        &self.record
    }

    /// The author's uid, available without a fetch.
    pub fn user_uid(&self) -> Uid {
        *self.user.stub()
    }

    /// The author, fetched on first call.
    pub async fn user(&self) -> LuoguResult<Arc<User>> {
        self.user.get().await
    }

    pub fn raw(&self) -> &RawPayload {
        &self.raw
    }
}

impl Entity for Paste {
    const KIND: &'static str = "Paste";

    fn identity(&self) -> Identifier {
        self.record.id.clone().into()
    }

    fn raw_payload(&self) -> Option<&RawPayload> {
        Some(&self.raw)
    }
}

#[async_trait]
impl Resolve for Paste {
    type Stub = PasteId;

    async fn resolve(client: &LuoguClient, stub: &PasteId) -> LuoguResult<Self> {
        Self::fetch(client, stub).await
    }
}

impl PartialEq for Paste {
    fn eq(&self, other: &Self) -> bool {
        entity_eq(self, other, || self.record == other.record)
    }
}

impl_entity_display!(Paste);
