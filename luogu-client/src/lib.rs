//! Read/write client for the Luogu content API.
//!
//! Pages on the site can be fetched as "content-only" JSON; this crate turns
//! those payloads into typed entities ([`User`], [`Problem`], [`ProblemList`],
//! [`Paste`]) and performs CSRF-guarded mutations on pastes.
//!
//! # Clients and sessions
//!
//! Every entity constructor takes an explicit [`LuoguClient`]. The `get`
//! shortcuts use [`LuoguClient::shared`], a process-wide anonymous client.
//! A [`Session`] owns its own cookie-bearing client, so entities fetched
//! through one session never observe another session's cookies.
//!
//! # Cross-references
//!
//! Stubs inside a payload (a user's solved problems, a paste's author)
//! resolve lazily through [`LazyList`] and [`LazyRef`]. Each stub is fetched
//! at most once per list, even under concurrent access.
//!
//! ```no_run
//! use luogu_client::{Uid, User};
//!
//! # async fn run() -> luogu_client::LuoguResult<()> {
//! let user = User::get(Uid::new(1)).await?;
//! let first = user.passed_problems().at(0).await?;
//! println!("{} solved {}", user, first.title());
//! # Ok(())
//! # }
//! ```

mod config;
mod csrf;
mod entity;
mod error;
mod http;
mod lazy;
mod models;
mod session;

pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use csrf::{extract_csrf_token, resolve_csrf_token};
pub use entity::{Entity, Resolve, entity_eq};
pub use error::{LuoguError, LuoguResult};
pub use http::{CONTENT_ONLY_HEADER, CSRF_HEADER, LuoguClient};
pub use lazy::{LazyList, LazyRef};
pub use models::{
    Attachment, Paste, PasteRecord, Prize, Problem, ProblemList, ProblemQuery, ProblemStatement,
    User, UserProfile,
};
pub use session::{CookieSource, Session, parse_cookie_header};

pub use luogu_types::{Identifier, PasteId, Pid, RawPayload, Uid};
