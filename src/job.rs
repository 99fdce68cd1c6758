//! Job listing data model
//!
//! A `Job` is the only record the scraper produces. It carries no identity;
//! uniqueness is left to whatever stores it.

use std::fmt;

/// One scraped job listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Listing title (empty if the markup has no anchor text)
    pub title: String,

    /// Absolute URL of the listing (empty if the markup has no href)
    pub link: String,
}

impl Job {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }

    /// Returns true if the record has neither a title nor a link
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.link.is_empty()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(untitled) <{}>", self.link)
        } else {
            write!(f, "{} <{}>", self.title, self.link)
        }
    }
}
