use std::rc::Rc;

use indexmap::IndexMap;
use regex::Regex;

use crate::{comment::CommentRef, stats::Stats};

/// Identifies an author. Taken from the author's profile link.
pub type AuthorId = String;

/// Extracts the author id from a profile link.
pub fn author_id(href: &str, pattern: &Regex) -> Option<AuthorId> {
    let id = pattern.captures(href)?.get(1)?.as_str();
    (!id.is_empty()).then(|| id.to_owned())
}

/// Where an author's profile stats are. Only ever moves forward:
/// `Unfetched -> Pending -> Resolved | Unavailable`.
#[derive(Debug, Default)]
pub enum StatsSlot {
    #[default]
    Unfetched,

    /// A fetch is queued or running.
    Pending,

    Resolved(Stats),

    /// The fetch failed. Nothing is retried for the rest of the page view.
    Unavailable,
}

impl StatsSlot {
    pub fn resolved(&self) -> Option<&Stats> {
        match self {
            StatsSlot::Resolved(stats) => Some(stats),
            _ => None,
        }
    }
}

/// Everything known about one author on the current page.
#[derive(Default)]
pub struct AuthorEntry {
    /// Comments by this author in document order.
    pub comments: Vec<CommentRef>,

    pub stats: StatsSlot,
}

/// Authors seen on the page, in order of first sighting.
#[derive(Default)]
pub struct AuthorIndex {
    authors: IndexMap<AuthorId, AuthorEntry>,
}

impl AuthorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a comment under its author. Returns `true` when this is the first
    /// comment seen for the author. Adding the same comment twice is a no-op.
    pub fn insert(&mut self, author: &str, comment: CommentRef) -> bool {
        let first_sighting = !self.authors.contains_key(author);
        let entry = self.authors.entry(author.to_owned()).or_default();
        if !entry.comments.iter().any(|c| Rc::ptr_eq(c, &comment)) {
            entry.comments.push(comment);
        }
        first_sighting
    }

    pub fn get(&self, author: &str) -> Option<&AuthorEntry> {
        self.authors.get(author)
    }

    pub fn get_mut(&mut self, author: &str) -> Option<&mut AuthorEntry> {
        self.authors.get_mut(author)
    }

    /// Snapshot of an author's comments, so callers can mutate them without
    /// holding a borrow of the index.
    pub fn comments(&self, author: &str) -> Vec<CommentRef> {
        self.get(author)
            .map(|entry| entry.comments.clone())
            .unwrap_or_default()
    }

    pub fn authors(&self) -> impl Iterator<Item = (&AuthorId, &AuthorEntry)> {
        self.authors.iter()
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{comment::MemoryComment, config::Config};

    fn comment() -> CommentRef {
        let selectors = Config::default().page_selectors().unwrap();
        Rc::new(MemoryComment::new("<p>hi</p>", selectors))
    }

    #[test]
    fn author_id_comes_from_profile_link() {
        let pattern = Config::default().author_regex().unwrap();
        assert_eq!(
            author_id("https://dou.ua/users/alice/", &pattern).as_deref(),
            Some("alice")
        );
        assert_eq!(author_id("/users/bob-smith/", &pattern).as_deref(), Some("bob-smith"));
        assert_eq!(author_id("https://dou.ua/forums/", &pattern), None);
    }

    #[test]
    fn insert_keeps_document_order_and_ignores_duplicates() {
        let mut index = AuthorIndex::new();
        let (first, second) = (comment(), comment());

        assert!(index.insert("alice", first.clone()));
        assert!(!index.insert("alice", second.clone()));
        assert!(!index.insert("alice", first.clone()));

        let comments = index.comments("alice");
        assert_eq!(comments.len(), 2);
        assert!(Rc::ptr_eq(&comments[0], &first));
        assert!(Rc::ptr_eq(&comments[1], &second));
    }

    #[test]
    fn entries_exist_only_for_seen_authors() {
        let mut index = AuthorIndex::new();
        index.insert("bob", comment());
        index.insert("alice", comment());

        assert!(index.get("carol").is_none());
        assert!(index.comments("carol").is_empty());
        let order: Vec<_> = index.authors().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, ["bob", "alice"]);
        assert!(matches!(index.get("bob").unwrap().stats, StatsSlot::Unfetched));
    }
}
