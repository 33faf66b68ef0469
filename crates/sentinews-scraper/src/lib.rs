//! News search API collection for sentinews.
//!
//! A [`Collector`] walks one source's search API page by page for every
//! candidate topic, normalizes each hit into an [`ArticleRecord`], drops
//! off-topic titles and URLs it has already seen, and hands the rest to the
//! caller. [`run_collection`] drives a collector into an
//! [`ArticleStore`](sentinews_core::ArticleStore).
//!
//! [`ArticleRecord`]: sentinews_core::ArticleRecord

pub mod collector;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod query;
pub mod run;
pub mod sources;

mod retry;

pub use collector::{CancelHandle, CollectionPlan, Collector, CollectorSettings, CollectorState};
pub use error::ScraperError;
pub use extract::extract_body;
pub use fetch::{FetchResponse, HttpFetch, ReqwestFetcher};
pub use normalize::{parse_timestamp, NormalizedPage};
pub use query::{build_query, QueryDescriptor, SourceSettings};
pub use run::{run_collection, CollectionReport};
pub use sources::normalize_page;
