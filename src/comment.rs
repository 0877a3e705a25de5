use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use maud::Markup;
use scraper::Html;

use crate::config::PageSelectors;

/// A shared handle to a comment on the page.
pub type CommentRef = Rc<dyn CommentNode>;

/// What a click on the comment body does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClickAction {
    #[default]
    Noop,

    /// Reveal the saved content, or hide it again behind the placeholder.
    ToggleHidden,
}

/// The operations the overlay needs from a comment element. The page owns
/// the element; the overlay only reads and rewrites its content.
///
/// Annotations are appended next to the author link, which lives inside the
/// content. Replacing the content therefore drops them.
pub trait CommentNode {
    /// `href` of the author link in the current content.
    fn author_href(&self) -> Option<String>;

    /// Text of the comment body, `None` when absent or blank.
    fn text(&self) -> Option<String>;

    fn content(&self) -> String;

    fn set_content(&self, html: &str);

    /// Original markup kept while the comment is hidden.
    fn saved_content(&self) -> Option<String>;

    fn set_saved_content(&self, html: String);

    fn clear_saved_content(&self);

    fn click_action(&self) -> ClickAction;

    fn set_click_action(&self, action: ClickAction);

    /// Removes the annotation carrying the given class marker, if any.
    fn remove_annotation(&self, class: &str);

    fn append_annotation(&self, class: &'static str, markup: Markup);
}

/// A comment held as an HTML string.
pub struct MemoryComment {
    content: RefCell<String>,
    saved: RefCell<Option<String>>,
    annotations: RefCell<Vec<(&'static str, String)>>,
    click: Cell<ClickAction>,
    selectors: PageSelectors,
}

impl MemoryComment {
    pub fn new(html: impl Into<String>, selectors: PageSelectors) -> Self {
        MemoryComment {
            content: RefCell::new(html.into()),
            saved: RefCell::new(None),
            annotations: RefCell::new(Vec::new()),
            click: Cell::new(ClickAction::Noop),
            selectors,
        }
    }

    /// Rendered annotation markup in the order it was appended.
    pub fn annotations(&self) -> Vec<String> {
        self.annotations
            .borrow()
            .iter()
            .map(|(_, markup)| markup.clone())
            .collect()
    }

    pub fn annotation(&self, class: &str) -> Option<String> {
        self.annotations
            .borrow()
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, markup)| markup.clone())
    }

    pub fn is_hidden(&self) -> bool {
        self.saved.borrow().is_some()
    }
}

impl CommentNode for MemoryComment {
    fn author_href(&self) -> Option<String> {
        let fragment = Html::parse_fragment(&self.content.borrow());
        let author = fragment.select(&self.selectors.author).next()?;
        author.value().attr("href").map(str::to_owned)
    }

    fn text(&self) -> Option<String> {
        let fragment = Html::parse_fragment(&self.content.borrow());
        let text: String = fragment.select(&self.selectors.text).next()?.text().collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    }

    fn content(&self) -> String {
        self.content.borrow().clone()
    }

    fn set_content(&self, html: &str) {
        *self.content.borrow_mut() = html.to_owned();
        self.annotations.borrow_mut().clear();
    }

    fn saved_content(&self) -> Option<String> {
        self.saved.borrow().clone()
    }

    fn set_saved_content(&self, html: String) {
        *self.saved.borrow_mut() = Some(html);
    }

    fn clear_saved_content(&self) {
        *self.saved.borrow_mut() = None;
    }

    fn click_action(&self) -> ClickAction {
        self.click.get()
    }

    fn set_click_action(&self, action: ClickAction) {
        self.click.set(action);
    }

    fn remove_annotation(&self, class: &str) {
        self.annotations.borrow_mut().retain(|(c, _)| *c != class);
    }

    fn append_annotation(&self, class: &'static str, markup: Markup) {
        self.annotations
            .borrow_mut()
            .push((class, markup.into_string()));
    }
}
