//! HTML parser for extracting job listings
//!
//! Every element matching the configured job selector becomes one [`Job`].
//! The title is the text of the element's anchors and the link is the first
//! anchor's `href`, made absolute against the site's base origin.

use crate::config::TargetConfig;
use crate::job::Job;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;

/// Extracts jobs from the target site's listing page
#[derive(Debug, Clone)]
pub struct JobParser {
    job_selector: Selector,
    anchor_selector: Selector,
    base_origin: String,
}

impl JobParser {
    /// Creates a parser for the given target site
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSelector` if the configured job selector
    /// is not valid CSS.
    pub fn new(target: &TargetConfig) -> Result<Self, ConfigError> {
        let job_selector = compile_selector(&target.job_selector)?;
        let anchor_selector = compile_selector("a")?;

        Ok(Self {
            job_selector,
            anchor_selector,
            base_origin: target.base_origin.trim_end_matches('/').to_string(),
        })
    }

    /// Parses a raw response body
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// failing the page. A document without any job elements yields no jobs.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use remote_jobs::config::TargetConfig;
    /// use remote_jobs::scrape::JobParser;
    ///
    /// let parser = JobParser::new(&TargetConfig::default()).unwrap();
    /// let html = br#"<div class="job"><a href="/job/1">Analyst</a></div>"#;
    /// let jobs = parser.parse(html);
    /// assert_eq!(jobs[0].link, "https://unjobs.org/job/1");
    /// ```
    pub fn parse(&self, body: &[u8]) -> Vec<Job> {
        let html = String::from_utf8_lossy(body);
        if let Cow::Owned(_) = html {
            tracing::debug!("Response body contained invalid UTF-8, decoded lossily");
        }
        self.parse_str(&html)
    }

    /// Parses an already-decoded HTML document
    pub fn parse_str(&self, html: &str) -> Vec<Job> {
        let document = Html::parse_document(html);

        let jobs: Vec<Job> = document
            .select(&self.job_selector)
            .map(|element| self.extract_job(element))
            .collect();

        tracing::info!("Scraped {} jobs", jobs.len());
        jobs
    }

    /// Builds a job from one matched element, tolerating missing pieces
    ///
    /// The title joins the text of every anchor in the element; the link
    /// comes from the first anchor only.
    fn extract_job(&self, element: ElementRef<'_>) -> Job {
        let mut anchors = element.select(&self.anchor_selector);
        let Some(first) = anchors.next() else {
            return Job::new("", "");
        };

        let title = first
            .text()
            .chain(anchors.flat_map(|anchor| anchor.text()))
            .collect::<String>()
            .trim()
            .to_string();
        let link = first
            .value()
            .attr("href")
            .map(|href| self.absolutize(href))
            .unwrap_or_default();

        Job::new(title, link)
    }

    /// Prefixes relative hrefs with the base origin
    fn absolutize(&self, href: &str) -> String {
        let href = href.trim();
        if is_absolute(href) {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_origin, href)
        } else {
            format!("{}/{}", self.base_origin, href)
        }
    }
}

fn is_absolute(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}
