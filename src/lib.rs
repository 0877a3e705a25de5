//! Per-author moderation overlay for forum comment threads.
//!
//! Readers can ban an author locally. Comments by banned authors are hidden
//! behind a placeholder that can be clicked to reveal them, and every byline
//! gets a ban toggle plus a short summary of the author's public profile.

pub use comment::{ClickAction, CommentNode, CommentRef, MemoryComment};
pub use config::Config;
pub use index::{AuthorEntry, AuthorId, StatsSlot};
pub use session::{Confirm, Session};
pub use stats::{HttpProfileSource, ProfileSource, Stats};
pub use store::{BanStore, FileStorage, MemoryStorage, Storage};

/// The capability interface over a comment element.
pub mod comment;

/// Runtime settings and selectors.
pub mod config;

pub mod error;

/// Markup the overlay inserts into the page.
pub mod html;

/// The author index built from the page.
pub mod index;

/// Reading thread pages into comments.
pub mod page;

/// Drawing the ban toggle and stats block.
pub mod render;

/// The per-page-view state tying everything together.
pub mod session;

/// Fetching and parsing author profile stats.
pub mod stats;

/// The persisted ban list.
pub mod store;

pub mod visibility;
