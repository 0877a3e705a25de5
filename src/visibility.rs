//! Hiding and revealing comments of banned authors.
//!
//! A comment is hidden exactly while it holds saved content: the original
//! markup moves into the saved slot and the placeholder takes its place.

use maud::Markup;

use crate::comment::{ClickAction, CommentNode};

/// Brings a comment in line with its author's ban flag. Returns `true` when
/// the comment was revealed, so the caller can annotate it again.
pub fn apply(comment: &dyn CommentNode, banned: bool, placeholder: &Markup) -> bool {
    let hidden = comment.saved_content().is_some();
    match (banned, hidden) {
        (true, false) => {
            hide(comment, placeholder);
            comment.set_click_action(ClickAction::ToggleHidden);
            false
        }
        (true, true) => false,
        (false, hidden) => {
            if hidden {
                reveal(comment);
            }
            comment.set_click_action(ClickAction::Noop);
            hidden
        }
    }
}

/// Handles a click on a comment bound to [`ClickAction::ToggleHidden`].
/// Returns `true` when the comment was revealed.
pub fn toggle(comment: &dyn CommentNode, placeholder: &Markup) -> bool {
    if comment.saved_content().is_some() {
        reveal(comment);
        true
    } else {
        hide(comment, placeholder);
        false
    }
}

fn hide(comment: &dyn CommentNode, placeholder: &Markup) {
    comment.set_saved_content(comment.content());
    comment.set_content(&placeholder.0);
}

fn reveal(comment: &dyn CommentNode) {
    if let Some(content) = comment.saved_content() {
        comment.clear_saved_content();
        comment.set_content(&content);
    }
}
