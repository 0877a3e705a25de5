use maud::{html, Markup, PreEscaped};

use crate::stats::Stats;

/// Class marker of the ban toggle.
pub const BAN_BUTTON: &str = "_ban_button";

/// Class marker of the stats block.
pub const INFOBLOCK: &str = "_ban_infoblock";

/// Stands in for the content of a hidden comment.
pub fn hidden_comment(avatar: &str) -> Markup {
    html! {
        div class="_banned" {
            div.b-post-author {
                a.avatar {
                    img.g-avatar alt="avatar" src=(avatar) width="25" height="25";
                    "Banned user"
                }
            }
            div.comment_text.b-typo { "Hidden content, click to show" }
        }
    }
}

pub fn ban_button(banned: bool) -> Markup {
    let (icon, title) = if banned { ("😇", "unban") } else { ("🤡", "ban") };
    html! {
        button class=(BAN_BUTTON) title=(title) { (icon) }
    }
}

/// The compact summary, or the registration text and activity entries once
/// the reader expanded it.
pub fn infoblock(stats: &Stats) -> Markup {
    html! {
        span class={ (INFOBLOCK) " cpointer" } title="click" {
            @if stats.expanded {
                (stats.registration)
                @for activity in &stats.activities {
                    (PreEscaped(activity))
                }
            } @else {
                (stats.summary())
            }
        }
    }
}
