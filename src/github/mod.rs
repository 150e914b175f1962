//! GitHub integration — recipe listing, fetching, and the publish flow.

pub mod api;
pub mod cache;
pub mod publish;

pub use api::{CommitInfo, GitHubClient, RecipeListing};
pub use cache::{CacheInfo, CachedListing};
pub use publish::PublishAction;
