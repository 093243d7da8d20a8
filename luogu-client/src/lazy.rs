//! Lazily resolved cross-references.
//!
//! Payloads often point at other entities by stub (a user's solved problems,
//! a paste's author). Resolving them eagerly would turn one request into
//! hundreds, so each stub is fetched only when first asked for and the
//! result is kept for the lifetime of the reference.
//!
//! Resolution is per-slot: concurrent callers of the same slot share one
//! fetch and receive the same `Arc`, while different slots never wait on
//! each other. A fetch that fails or is cancelled leaves the slot empty.

use crate::entity::Resolve;
use crate::error::{LuoguError, LuoguResult};
use crate::http::LuoguClient;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// A single stub that resolves to `E` on first access.
pub struct LazyRef<E: Resolve> {
    client: LuoguClient,
    stub: E::Stub,
    cell: OnceCell<Arc<E>>,
}

impl<E: Resolve> LazyRef<E> {
    pub fn new(client: LuoguClient, stub: E::Stub) -> Self {
        Self {
            client,
            stub,
            cell: OnceCell::new(),
        }
    }

    pub fn stub(&self) -> &E::Stub {
        &self.stub
    }

    /// Returns true if the entity has already been fetched.
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns the resolved entity without fetching.
    pub fn peek(&self) -> Option<&Arc<E>> {
        self.cell.get()
    }

    /// Resolves the stub, fetching at most once.
    pub async fn get(&self) -> LuoguResult<Arc<E>> {
        Self::resolve_in(&self.cell, &self.client, &self.stub).await
    }

    async fn resolve_in(
        cell: &OnceCell<Arc<E>>,
        client: &LuoguClient,
        stub: &E::Stub,
    ) -> LuoguResult<Arc<E>> {
        cell.get_or_try_init(|| async move {
            debug!("Resolving {}({})", E::KIND, stub);
            E::resolve(client, stub).await.map(Arc::new)
        })
        .await
        .cloned()
    }
}

impl<E: Resolve> fmt::Debug for LazyRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", E::KIND, self.stub)
    }
}

/// An ordered list of stubs, each resolved to `E` on demand.
pub struct LazyList<E: Resolve> {
    client: LuoguClient,
    stubs: Vec<E::Stub>,
    slots: Vec<OnceCell<Arc<E>>>,
}

impl<E: Resolve> LazyList<E> {
    pub fn new(client: LuoguClient, stubs: Vec<E::Stub>) -> Self {
        let slots = stubs.iter().map(|_| OnceCell::new()).collect();
        Self {
            client,
            stubs,
            slots,
        }
    }

    /// An empty list bound to `client`.
    pub fn empty(client: LuoguClient) -> Self {
        Self::new(client, Vec::new())
    }

    /// Number of stubs. Never triggers a fetch.
    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    pub fn stubs(&self) -> &[E::Stub] {
        &self.stubs
    }

    /// Returns true if the entity at `index` has already been fetched.
    pub fn is_resolved(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(OnceCell::initialized)
    }

    /// Number of entries fetched so far.
    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.initialized()).count()
    }

    /// Resolves and returns the entity at `index`.
    ///
    /// Fails with [`LuoguError::IndexOutOfRange`] past the end.
    pub async fn at(&self, index: usize) -> LuoguResult<Arc<E>> {
        let (slot, stub) = self
            .slots
            .get(index)
            .zip(self.stubs.get(index))
            .ok_or(LuoguError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        LazyRef::<E>::resolve_in(slot, &self.client, stub).await
    }

    /// Yields entities in order, resolving each as it is reached.
    ///
    /// Every call starts again from the first index; entries resolved by an
    /// earlier pass are not fetched again.
    pub fn iter(&self) -> impl Stream<Item = LuoguResult<Arc<E>>> + Send + '_ {
        stream::iter(0..self.len()).then(move |index| self.at(index))
    }

    /// Resolves every entry in order, stopping at the first failure.
    pub async fn resolve_all(&self) -> LuoguResult<Vec<Arc<E>>> {
        self.iter().try_collect().await
    }
}

impl<E: Resolve> fmt::Debug for LazyList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, stub) in self.stubs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}({})", E::KIND, stub)?;
        }
        f.write_str("]")
    }
}
