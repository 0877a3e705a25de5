use crate::{
    config::ProfileSelectors,
    error::{FetchError, ParseError},
};

pub use parse::parse_profile;

/// Parsing of fetched profile pages.
pub mod parse;

/// Public profile stats of an author.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    /// Registration line as shown on the profile.
    pub registration: String,

    /// Years since registration.
    pub registration_years: i32,

    /// Markup of the activity menu entries, shown when expanded.
    pub activities: Vec<String>,

    /// Short labels of the activity entries: comments, then topics.
    pub activity_counts: Vec<String>,

    /// Whether the long version is shown. Stays set for the page view.
    pub expanded: bool,
}

impl Stats {
    /// One-line summary, e.g. `120 c. | 4 t. | 9 yo.`
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(comments) = self.activity_counts.first() {
            parts.push(format!("{comments} c."));
        }
        if let Some(topics) = self.activity_counts.get(1) {
            parts.push(format!("{topics} t."));
        }
        parts.push(format!("{} yo.", self.registration_years));
        parts.join(" | ")
    }
}

/// Where profile pages come from.
#[allow(async_fn_in_trait)]
pub trait ProfileSource {
    /// Returns the body of the author's activities page. A non-success
    /// response is an error.
    async fn fetch_profile(&self, author: &str) -> Result<String, FetchError>;
}

/// Fetches profile pages over HTTP.
#[derive(Clone, Debug)]
pub struct HttpProfileSource {
    client: reqwest::Client,
    base: String,
}

impl HttpProfileSource {
    pub fn new(client: reqwest::Client, base: impl Into<String>) -> Self {
        HttpProfileSource {
            client,
            base: base.into(),
        }
    }

    pub fn url(&self, author: &str) -> String {
        format!("{}/{author}/activities/", self.base.trim_end_matches('/'))
    }
}

impl ProfileSource for HttpProfileSource {
    async fn fetch_profile(&self, author: &str) -> Result<String, FetchError> {
        let response = self.client.get(self.url(author)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text().await?)
    }
}


#[cfg(test)]
mod tests {
    use axum::{extract::Path, http::StatusCode, response::Html, routing::get, Router};
    use tokio::net::TcpListener;

    use super::*;

    async fn profile(Path(author): Path<String>) -> Result<Html<String>, StatusCode> {
        match author.as_str() {
            "alice" => Ok(Html(fixtures::profile_page("Sep 2015", "120", "4"))),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }

    async fn serve() -> String {
        let app = Router::new().route("/users/:author/activities/", get(profile));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/users")
    }

    #[test]
    fn summary_lists_counts_then_age() {
        let mut stats = Stats {
            registration: "Sep 2015".to_owned(),
            registration_years: 9,
            activities: Vec::new(),
            activity_counts: vec!["120".to_owned(), "4".to_owned()],
            expanded: false,
        };
        assert_eq!(stats.summary(), "120 c. | 4 t. | 9 yo.");

        stats.activity_counts.truncate(0);
        assert_eq!(stats.summary(), "9 yo.");
    }

    #[test]
    fn url_points_at_activities_page() {
        let source = HttpProfileSource::new(reqwest::Client::new(), "https://dou.ua/users/");
        assert_eq!(source.url("alice"), "https://dou.ua/users/alice/activities/");
    }

    #[tokio::test]
    async fn fetches_profile_body() {
        let source = HttpProfileSource::new(reqwest::Client::new(), serve().await);
        let body = source.fetch_profile("alice").await.unwrap();
        assert!(body.contains("status-info"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let source = HttpProfileSource::new(reqwest::Client::new(), serve().await);
        let err = source.fetch_profile("nobody").await.unwrap_err();
        assert!(matches!(err, FetchError::Status(status) if status == StatusCode::NOT_FOUND));
    }
}
