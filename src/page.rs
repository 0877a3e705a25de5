use std::rc::Rc;

use scraper::Html;

use crate::{comment::MemoryComment, config::PageSelectors, error::FetchError};

/// Splits a thread page into its comments, in document order.
pub fn comments_from_html(html: &str, selectors: &PageSelectors) -> Vec<Rc<MemoryComment>> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.comment)
        .map(|comment| Rc::new(MemoryComment::new(comment.inner_html(), selectors.clone())))
        .collect()
}

/// Downloads a thread page and splits it into comments.
pub async fn load_thread(
    client: &reqwest::Client,
    url: &str,
    selectors: &PageSelectors,
) -> Result<Vec<Rc<MemoryComment>>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(comments_from_html(&response.text().await?, selectors))
}
