//! Identity, equality and display shared by every entity.

use crate::error::LuoguResult;
use crate::http::LuoguClient;
use async_trait::async_trait;
use luogu_types::{Identifier, RawPayload};
use std::fmt;

/// A resolved domain object.
///
/// Network-backed entities keep the `currentData` object they were built
/// from; value objects nested inside a payload (prizes, attachments) have
/// none.
pub trait Entity {
    /// Type name used by `Display`.
    const KIND: &'static str;

    /// A stable key for display and lookups. Never used for equality.
    fn identity(&self) -> Identifier;

    /// The payload this entity was decoded from, if it came off the network.
    fn raw_payload(&self) -> Option<&RawPayload>;
}

/// An entity that can be fetched from a stub identifier.
#[async_trait]
pub trait Resolve: Entity + Sized + Send + Sync + 'static {
    /// The minimal identifier found inside other payloads.
    type Stub: Clone + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Performs exactly one fetch and decodes the result.
    async fn resolve(client: &LuoguClient, stub: &Self::Stub) -> LuoguResult<Self>;
}

/// Compares two entities of one type.
///
/// When both sides carry a payload, the payloads decide. Otherwise
/// `fields_eq` compares the public derived fields.
pub fn entity_eq<E: Entity>(a: &E, b: &E, fields_eq: impl FnOnce() -> bool) -> bool {
    match (a.raw_payload(), b.raw_payload()) {
        (Some(x), Some(y)) => x == y,
        _ => fields_eq(),
    }
}

/// Implements `Display` as `Kind(identity)` for entity types.
macro_rules! impl_entity_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(
                        f,
                        "{}({})",
                        <$ty as $crate::entity::Entity>::KIND,
                        $crate::entity::Entity::identity(self)
                    )
                }
            }
        )+
    };
}

pub(crate) use impl_entity_display;
