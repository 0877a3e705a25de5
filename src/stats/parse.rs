use scraper::{ElementRef, Html};

use super::*;

/// Reads an author's stats out of their activities page.
///
/// The registration date is the last line of the status region. The first
/// non-empty entry of the content menu is skipped and the next two are kept,
/// with their short label (the comment and topic counts on the forum).
pub fn parse_profile(
    body: &str,
    selectors: &ProfileSelectors,
    year: i32,
) -> Result<Stats, ParseError> {
    let document = Html::parse_document(body);

    let status = document
        .select(&selectors.status)
        .next()
        .ok_or(ParseError::MissingRegion("status info"))?;
    let registration = last_line(&status.text().collect::<String>());
    let registration_years = year - registration_year(&registration)?;

    let menu = document
        .select(&selectors.menu)
        .next()
        .ok_or(ParseError::MissingRegion("content menu"))?;
    let items: Vec<ElementRef> = menu
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|item| !text_of(item).is_empty())
        .skip(1)
        .take(2)
        .filter_map(|item| item.children().filter_map(ElementRef::wrap).next())
        .collect();

    let activities = items.iter().map(|item| item.html()).collect();
    let activity_counts = items
        .iter()
        .filter_map(|item| item.select(&selectors.label).next())
        .map(|label| text_of(&label))
        .filter(|label| !label.is_empty())
        .collect();

    Ok(Stats {
        registration,
        registration_years,
        activities,
        activity_counts,
        expanded: false,
    })
}

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}

fn last_line(text: &str) -> String {
    let text = text.replace('\t', "");
    text.trim().rsplit('\n').next().unwrap_or_default().to_owned()
}

/// The year is the last four digits of the text once everything else is
/// stripped, so both "Sep 2015" and "12.09.2015" give 2015.
fn registration_year(registration: &str) -> Result<i32, ParseError> {
    let digits: String = registration.chars().filter(char::is_ascii_digit).collect();
    digits[digits.len().saturating_sub(4)..]
        .parse()
        .map_err(|_| ParseError::NoRegistrationYear(registration.to_owned()))
}
