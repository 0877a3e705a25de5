use regex::Regex;

use crate::{
    comment::CommentNode,
    html::{self, BAN_BUTTON, INFOBLOCK},
    index::{author_id, AuthorIndex},
    store::BanStore,
};

/// Redraws the ban toggle and stats block next to a comment's byline.
/// Earlier annotations are removed first, so this can run any number of
/// times. Comments without a resolvable author get nothing.
pub fn render(comment: &dyn CommentNode, pattern: &Regex, bans: &BanStore, index: &AuthorIndex) {
    comment.remove_annotation(BAN_BUTTON);
    comment.remove_annotation(INFOBLOCK);

    let Some(author) = comment
        .author_href()
        .and_then(|href| author_id(&href, pattern))
    else {
        return;
    };

    comment.append_annotation(BAN_BUTTON, html::ban_button(bans.is_banned(&author)));

    if let Some(stats) = index.get(&author).and_then(|entry| entry.stats.resolved()) {
        comment.append_annotation(INFOBLOCK, html::infoblock(stats));
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        comment::MemoryComment,
        config::Config,
        index::StatsSlot,
        stats::Stats,
        store::MemoryStorage,
    };

    const ALICE: &str = r#"<div class="b-post-author"><a href="/users/alice/">Alice</a></div><div class="comment_text">hi</div>"#;

    fn setup() -> (Rc<MemoryComment>, Regex, BanStore, AuthorIndex) {
        let config = Config::default();
        let comment = Rc::new(MemoryComment::new(ALICE, config.page_selectors().unwrap()));
        let mut index = AuthorIndex::new();
        index.insert("alice", comment.clone());
        let bans = BanStore::load(Box::new(MemoryStorage::new()), "bans");
        (comment, config.author_regex().unwrap(), bans, index)
    }

    #[test]
    fn renders_only_button_until_stats_resolve() {
        let (comment, pattern, bans, index) = setup();
        render(&*comment, &pattern, &bans, &index);

        assert_eq!(comment.annotations().len(), 1);
        assert!(comment.annotation(BAN_BUTTON).unwrap().contains(r#"title="ban""#));
    }

    #[test]
    fn rerendering_replaces_annotations() {
        let (comment, pattern, mut bans, mut index) = setup();
        render(&*comment, &pattern, &bans, &index);

        bans.set_banned("alice", true).unwrap();
        index.get_mut("alice").unwrap().stats = StatsSlot::Resolved(Stats {
            registration: "Sep 2015".to_owned(),
            registration_years: 9,
            activities: Vec::new(),
            activity_counts: vec!["3".to_owned(), "1".to_owned()],
            expanded: false,
        });
        render(&*comment, &pattern, &bans, &index);

        let annotations = comment.annotations();
        assert_eq!(annotations.len(), 2);
        assert!(annotations[0].contains(r#"title="unban""#));
        assert!(annotations[1].contains("3 c. | 1 t. | 9 yo."));
    }

    #[test]
    fn unavailable_stats_render_no_block() {
        let (comment, pattern, bans, mut index) = setup();
        index.get_mut("alice").unwrap().stats = StatsSlot::Unavailable;
        render(&*comment, &pattern, &bans, &index);
        assert_eq!(comment.annotation(INFOBLOCK), None);
    }

    #[test]
    fn comments_without_author_are_skipped() {
        let (_, pattern, bans, index) = setup();
        let orphan = MemoryComment::new(
            r#"<div class="comment_text">hi</div>"#,
            Config::default().page_selectors().unwrap(),
        );
        render(&orphan, &pattern, &bans, &index);
        assert!(orphan.annotations().is_empty());
    }
}
