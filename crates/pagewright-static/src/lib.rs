//! Site generation for pagewright.
//!
//! Turns parsed content into an ordered catalog, paginates it per category
//! and renders listing and detail pages through minijinja templates.

pub mod assets;
pub mod builder;
pub mod catalog;
pub mod paginate;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildReport, BuildStage, SiteBuilder};
pub use catalog::{CategoryLink, ContentCatalog, ContentRecord};
pub use paginate::{paginate, Page};
pub use templates::{DetailContext, ListingContext, TemplateEngine};
