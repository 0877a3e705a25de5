use std::{fs, path::Path};

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;

use crate::error::ConfigError;

/// Runtime settings for one activation. Every field has a default matching
/// the forum the overlay was written for, so an empty JSON object is valid.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key the ban mapping is persisted under.
    pub storage_key: String,

    /// Profile pages live at `<profile_base>/<author>/activities/`.
    pub profile_base: String,

    /// Upper bound on profile fetches running at once.
    pub max_concurrent_fetches: usize,

    /// Pattern extracting the author id from an author link. The first
    /// capture group is the id.
    pub author_pattern: String,

    /// Avatar shown in the placeholder of a hidden comment.
    pub avatar: String,

    pub page: PageConfig,
    pub profile: ProfileConfig,
}

/// Selectors for the thread page.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub comment: String,
    pub author: String,
    pub text: String,
}

/// Selectors for a fetched profile page.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub status: String,
    pub menu: String,
    pub label: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_key: "__dou_black_list__".to_owned(),
            profile_base: "https://dou.ua/users".to_owned(),
            max_concurrent_fetches: 3,
            author_pattern: r"users/(.+)/".to_owned(),
            avatar: "https://s.dou.ua/img/avatars/80x80_966.png".to_owned(),
            page: PageConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            comment: ".comment".to_owned(),
            author: ".b-post-author > a".to_owned(),
            text: ".comment_text".to_owned(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            status: ".status-info".to_owned(),
            menu: ".b-content-menu".to_owned(),
            label: "sub".to_owned(),
        }
    }
}

/// Compiled thread page selectors.
#[derive(Clone, Debug)]
pub struct PageSelectors {
    pub comment: Selector,
    pub author: Selector,
    pub text: Selector,
}

/// Compiled profile page selectors.
#[derive(Clone, Debug)]
pub struct ProfileSelectors {
    pub status: Selector,
    pub menu: Selector,
    pub label: Selector,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&file)?)
    }

    pub fn page_selectors(&self) -> Result<PageSelectors, ConfigError> {
        Ok(PageSelectors {
            comment: selector(&self.page.comment)?,
            author: selector(&self.page.author)?,
            text: selector(&self.page.text)?,
        })
    }

    pub fn profile_selectors(&self) -> Result<ProfileSelectors, ConfigError> {
        Ok(ProfileSelectors {
            status: selector(&self.profile.status)?,
            menu: selector(&self.profile.menu)?,
            label: selector(&self.profile.label)?,
        })
    }

    pub fn author_regex(&self) -> Result<Regex, ConfigError> {
        Ok(Regex::new(&self.author_pattern)?)
    }
}

fn selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_owned(),
        message: e.to_string(),
    })
}
