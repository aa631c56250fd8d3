// ABOUTME: Helper that scrapes a problem page for its description and constraints
// ABOUTME: Standalone from the sync job; exposed through the `scrape` command

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::fmt;

const DESCRIPTION_SELECTOR: &str = "div.problem-description";
const CONSTRAINTS_SELECTOR: &str = "div.constraints";

/// The two text blocks extracted from a problem page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemDescription {
    pub description: String,
    pub constraints: String,
}

impl fmt::Display for ProblemDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Description: {}\nConstraints: {}",
            self.description, self.constraints
        )
    }
}

/// Fetch `url` and extract its description and constraints.
pub async fn scrape_problem_html(client: &Client, url: &str) -> Result<ProblemDescription> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        bail!("Fetching {} failed with status {}", url, response.status());
    }

    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?;

    extract_problem_description(&body).with_context(|| format!("Unexpected page layout at {}", url))
}

/// Extract the description and constraints blocks from a page.
pub fn extract_problem_description(html: &str) -> Result<ProblemDescription> {
    let document = Html::parse_document(html);
    Ok(ProblemDescription {
        description: block_text(&document, DESCRIPTION_SELECTOR)?,
        constraints: block_text(&document, CONSTRAINTS_SELECTOR)?,
    })
}

/// Text of the first element matching `selector`, with each text node
/// trimmed and empty ones dropped.
fn block_text(document: &Html, selector: &str) -> Result<String> {
    let parsed =
        Selector::parse(selector).map_err(|e| anyhow!("invalid selector {}: {:?}", selector, e))?;
    let element = document
        .select(&parsed)
        .next()
        .ok_or_else(|| anyhow!("no element matches {}", selector))?;

    Ok(element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect())
}
