use std::{
    cell::{Cell, Ref, RefCell},
    time::Instant,
};

use chrono::{Datelike, Utc};
use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    StreamExt,
};
use maud::Markup;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    comment::{ClickAction, CommentNode, CommentRef},
    config::{Config, ProfileSelectors},
    error::{ConfigError, FetchError},
    html,
    index::{author_id, AuthorEntry, AuthorId, AuthorIndex, StatsSlot},
    render,
    stats::{parse_profile, ProfileSource},
    store::{BanStore, Storage},
    visibility,
};

/// Asks the reader a yes/no question before a ban changes.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// State of the overlay for one page view: the ban list, the author index
/// and the queue of profile fetches.
///
/// Everything runs on one thread. Event handlers call into the session
/// directly, and [`Session::run`] drives the profile fetches alongside them.
pub struct Session<P> {
    config: Config,
    pattern: Regex,
    profile_selectors: ProfileSelectors,
    placeholder: Markup,
    year: i32,
    source: P,
    confirm: Box<dyn Confirm>,
    bans: RefCell<BanStore>,
    index: RefCell<AuthorIndex>,
    queue: RefCell<Option<UnboundedSender<AuthorId>>>,
    requests: RefCell<Option<UnboundedReceiver<AuthorId>>>,
    in_flight: Cell<usize>,
    peak_in_flight: Cell<usize>,
}

impl<P: ProfileSource> Session<P> {
    pub fn new(
        config: Config,
        storage: Box<dyn Storage>,
        source: P,
        confirm: Box<dyn Confirm>,
    ) -> Result<Self, ConfigError> {
        let pattern = config.author_regex()?;
        let profile_selectors = config.profile_selectors()?;
        let placeholder = html::hidden_comment(&config.avatar);
        let bans = BanStore::load(storage, config.storage_key.clone());
        let (queue, requests) = mpsc::unbounded();

        Ok(Session {
            config,
            pattern,
            profile_selectors,
            placeholder,
            year: Utc::now().year(),
            source,
            confirm,
            bans: RefCell::new(bans),
            index: RefCell::new(AuthorIndex::new()),
            queue: RefCell::new(Some(queue)),
            requests: RefCell::new(Some(requests)),
            in_flight: Cell::new(0),
            peak_in_flight: Cell::new(0),
        })
    }

    /// Registration ages are computed against this year instead of today's.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Indexes, annotates and hides every comment in document order.
    /// Profile fetches are only queued here; [`Session::run`] performs them.
    pub fn activate(&self, comments: impl IntoIterator<Item = CommentRef>) {
        let start = Instant::now();
        let mut total = 0;
        for comment in comments {
            total += 1;
            let Some(author) = self.index_comment(comment.clone()) else {
                continue;
            };
            self.render(&*comment);
            let banned = self.is_banned(&author);
            if visibility::apply(&*comment, banned, &self.placeholder) {
                self.render(&*comment);
            }
        }
        info!(
            comments = total,
            authors = self.index.borrow().len(),
            elapsed = ?start.elapsed(),
            "page indexed"
        );
    }

    /// Adds a comment to the author index. Comments without an author link or
    /// without text are skipped. The first comment of an author queues a
    /// fetch of their stats.
    pub fn index_comment(&self, comment: CommentRef) -> Option<AuthorId> {
        let Some(author) = self.author_of(&*comment) else {
            debug!("skipping comment without author");
            return None;
        };
        if comment.text().is_none() {
            debug!(author = %author, "skipping comment without text");
            return None;
        }

        let first_sighting = self.index.borrow_mut().insert(&author, comment);
        if first_sighting {
            self.fetch_stats(&author);
        }
        Some(author)
    }

    /// Queues a stats fetch for an indexed author. Does nothing once a fetch
    /// was queued, so every author is fetched at most once.
    pub fn fetch_stats(&self, author: &str) {
        let mut index = self.index.borrow_mut();
        let Some(entry) = index.get_mut(author) else {
            return;
        };
        if !matches!(entry.stats, StatsSlot::Unfetched) {
            return;
        }

        let queue = self.queue.borrow();
        match queue.as_ref() {
            Some(queue) if queue.unbounded_send(author.to_owned()).is_ok() => {
                entry.stats = StatsSlot::Pending;
            }
            _ => debug!(author = %author, "stats queue closed"),
        }
    }

    /// Performs queued fetches in order, at most `max_concurrent_fetches` at
    /// a time. Finishes once [`Session::close_queue`] was called and the queue
    /// is drained. Only the first call does any work.
    pub async fn run(&self) {
        let requests = self.requests.borrow_mut().take();
        let Some(requests) = requests else {
            return;
        };
        let limit = self.config.max_concurrent_fetches.max(1);
        requests
            .for_each_concurrent(limit, |author| self.load_stats(author))
            .await;
    }

    /// Stops accepting fetches. Authors seen afterwards keep no stats.
    pub fn close_queue(&self) {
        self.queue.borrow_mut().take();
    }

    /// A fetch holds its admission slot from the request until the stats are
    /// parsed and drawn.
    async fn load_stats(&self, author: AuthorId) {
        let in_flight = self.in_flight.get() + 1;
        self.in_flight.set(in_flight);
        self.peak_in_flight
            .set(self.peak_in_flight.get().max(in_flight));

        let stats = match self.source.fetch_profile(&author).await {
            Ok(body) => parse_profile(&body, &self.profile_selectors, self.year)
                .map_err(FetchError::from),
            Err(e) => Err(e),
        };

        match stats {
            Ok(stats) => {
                debug!(author = %author, "stats resolved");
                if let Some(entry) = self.index.borrow_mut().get_mut(&author) {
                    entry.stats = StatsSlot::Resolved(stats);
                }
                let comments = self.index.borrow().comments(&author);
                for comment in &comments {
                    self.render(&**comment);
                }
            }
            Err(e) => {
                warn!(author = %author, error = %e, "stats unavailable");
                if let Some(entry) = self.index.borrow_mut().get_mut(&author) {
                    entry.stats = StatsSlot::Unavailable;
                }
            }
        }

        self.in_flight.set(self.in_flight.get() - 1);
    }

    /// Handles the ban toggle of a comment. After confirmation the flag is
    /// flipped and persisted, and every comment by the author is redrawn and
    /// hidden or revealed. Returns whether anything changed.
    pub fn toggle_ban(&self, comment: &dyn CommentNode) -> bool {
        let Some(author) = self.author_of(comment) else {
            return false;
        };
        let banned = self.is_banned(&author);
        let verb = if banned { "unban" } else { "ban" };
        if !self.confirm.confirm(&format!("{verb} {author}?")) {
            return false;
        }

        if let Err(e) = self.bans.borrow_mut().set_banned(&author, !banned) {
            warn!(author = %author, error = %e, "could not persist ban list");
            return false;
        }

        let comments = self.index.borrow().comments(&author);
        for comment in &comments {
            self.render(&**comment);
            if visibility::apply(&**comment, !banned, &self.placeholder) {
                self.render(&**comment);
            }
        }
        info!(author = %author, "Updated {} comments", comments.len());
        true
    }

    /// Handles a click on the body of a comment.
    pub fn click_comment(&self, comment: &dyn CommentNode) {
        if comment.click_action() != ClickAction::ToggleHidden {
            return;
        }
        if visibility::toggle(comment, &self.placeholder) {
            self.render(comment);
        }
    }

    /// Handles a click on the stats summary: switches the author's stats to
    /// the long version for the rest of the page view.
    pub fn expand_stats(&self, comment: &dyn CommentNode) {
        let Some(author) = self.author_of(comment) else {
            return;
        };
        {
            let mut index = self.index.borrow_mut();
            let Some(StatsSlot::Resolved(stats)) = index.get_mut(&author).map(|e| &mut e.stats)
            else {
                return;
            };
            stats.expanded = true;
        }
        self.render(comment);
    }

    pub fn render(&self, comment: &dyn CommentNode) {
        render::render(
            comment,
            &self.pattern,
            &self.bans.borrow(),
            &self.index.borrow(),
        );
    }

    pub fn entry(&self, author: &str) -> Option<Ref<'_, AuthorEntry>> {
        Ref::filter_map(self.index.borrow(), |index| index.get(author)).ok()
    }

    pub fn is_banned(&self, author: &str) -> bool {
        self.bans.borrow().is_banned(author)
    }

    pub fn author_of(&self, comment: &dyn CommentNode) -> Option<AuthorId> {
        author_id(&comment.author_href()?, &self.pattern)
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Most fetches ever running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.get()
    }
}
