//! Authority-record crawler ("Authorities mode").
//!
//! Paginates a public activity-stream feed, selects entries by their nested
//! type tags, fetches the linked MADS XML documents and upserts the extracted
//! headings keyed by source URL.

mod authorities;
mod feed;
mod mads_xml;

pub use authorities::{AuthoritiesCrawler, CrawlOutcome};
pub use feed::{Activity, ActivityObject, ActivityPage};
pub use mads_xml::{parse_mads_xml, MadsRecord};
