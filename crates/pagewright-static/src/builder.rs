//! Static site builder.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use pagewright_content::{parse_dir, ScanError};

use crate::assets::{copy_tree, AssetError};
use crate::catalog::{listing_url, ContentCatalog, ContentRecord, INDEX_SCOPE};
use crate::paginate::paginate;
use crate::templates::{DetailContext, ListingContext, TemplateEngine};

/// Output subdirectory that receives the static assets.
pub const STATIC_OUTPUT_DIR: &str = "static";

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site display name
    pub site_title: String,

    /// Records per listing page. `None` or `Some(0)` disables pagination.
    pub page_size: Option<usize>,

    /// Content directory, read non-recursively
    pub content_dir: PathBuf,

    /// Template directory. `None` uses the built-in templates.
    pub templates_dir: Option<PathBuf>,

    /// Static assets source directory
    pub static_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Render detail pages on the rayon thread pool
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            site_title: "My site".to_string(),
            page_size: None,
            content_dir: PathBuf::from("content"),
            templates_dir: None,
            static_dir: PathBuf::from("static"),
            output_dir: PathBuf::from("output"),
            parallel: false,
        }
    }
}

impl BuildConfig {
    /// Effective page size, with zero normalized to `None`.
    pub fn page_size(&self) -> Option<usize> {
        self.page_size.filter(|size| *size > 0)
    }
}

/// Stages of a build, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStage {
    Init,
    ParseAndIndex,
    RenderListings,
    RenderDetails,
    CopyAssets,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::ParseAndIndex => "parse-and-index",
            Self::RenderListings => "render-listings",
            Self::RenderDetails => "render-details",
            Self::CopyAssets => "copy-assets",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    /// Listing pages written, index and categories together
    pub listing_pages: usize,

    /// Detail pages written
    pub detail_pages: usize,

    /// Distinct categories
    pub categories: usize,

    /// Content files skipped as malformed or clashing with a listing page
    pub skipped: usize,

    /// Static files copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read content directory: {0}")]
    ContentDir(#[from] ScanError),

    #[error("Failed to load templates: {0}")]
    Template(String),

    #[error("Failed to render {page}: {message}")]
    Render { page: String, message: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy static assets: {0}")]
    Assets(#[from] AssetError),
}

/// Builds a site in one linear pass.
pub struct SiteBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl SiteBuilder {
    /// Create a builder, loading templates up front.
    ///
    /// A configured template directory that lacks a required template fails
    /// here, before any output is written.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let _stage = enter(BuildStage::Init);

        let templates = match &config.templates_dir {
            Some(dir) => {
                let engine = TemplateEngine::from_dir(dir)
                    .map_err(|e| BuildError::Template(format!("{}: {}", dir.display(), e)))?;
                tracing::info!("Loaded templates from {}", dir.display());
                engine
            }
            None => {
                tracing::debug!("Using built-in templates");
                TemplateEngine::new()
            }
        };

        Ok(Self { config, templates })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the site.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        let catalog = {
            let _stage = enter(BuildStage::ParseAndIndex);
            let catalog = self.load_catalog()?;
            tracing::info!(
                "Indexed {} records in {} categories ({} skipped)",
                catalog.records().len(),
                catalog.categories().len(),
                catalog.skipped()
            );
            catalog
        };

        let listing_pages = {
            let _stage = enter(BuildStage::RenderListings);
            fs::create_dir_all(&self.config.output_dir).map_err(|e| BuildError::Write {
                path: self.config.output_dir.clone(),
                source: e,
            })?;
            self.render_listings(&catalog)?
        };

        let detail_pages = {
            let _stage = enter(BuildStage::RenderDetails);
            self.render_details(&catalog)?
        };

        let assets = {
            let _stage = enter(BuildStage::CopyAssets);
            copy_tree(
                &self.config.static_dir,
                &self.config.output_dir.join(STATIC_OUTPUT_DIR),
            )?
        };

        let _stage = enter(BuildStage::Done);

        Ok(BuildReport {
            listing_pages,
            detail_pages,
            categories: catalog.categories().len(),
            skipped: catalog.skipped(),
            assets,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Parse the content directory into a catalog.
    ///
    /// A missing directory yields an empty catalog; other listing failures
    /// are fatal.
    pub fn load_catalog(&self) -> Result<ContentCatalog, BuildError> {
        match parse_dir(&self.config.content_dir) {
            Ok(files) => Ok(ContentCatalog::from_files(files)),
            Err(ScanError::NotFound(path)) => {
                tracing::warn!(
                    "Content directory not found: {}; building an empty site",
                    path.display()
                );
                Ok(ContentCatalog::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Render the site index and every category, one file per page.
    fn render_listings(&self, catalog: &ContentCatalog) -> Result<usize, BuildError> {
        let all: Vec<&ContentRecord> = catalog.records().iter().collect();
        let mut written = self.render_scope(catalog, None, &all)?;

        for category in catalog.categories() {
            let records = catalog.in_category(&category.name);
            written += self.render_scope(catalog, Some(category.name.as_str()), &records)?;
        }

        Ok(written)
    }

    fn render_scope(
        &self,
        catalog: &ContentCatalog,
        category: Option<&str>,
        records: &[&ContentRecord],
    ) -> Result<usize, BuildError> {
        let page_size = self.config.page_size();
        let pages = paginate(records, page_size);
        let scope = category.unwrap_or(INDEX_SCOPE);
        let page_urls: Vec<String> = pages.iter().map(|p| listing_url(scope, p.number)).collect();

        for (page, url) in pages.iter().zip(&page_urls) {
            let context = ListingContext {
                site_title: &self.config.site_title,
                categories: catalog.categories(),
                content: page.items,
                is_list: true,
                current_category: category,
                current_page: page.number,
                total_pages: pages.len(),
                page_size,
                page_urls: &page_urls,
            };

            let html = self
                .templates
                .render_listing(&context)
                .map_err(|e| BuildError::Render {
                    page: url.clone(),
                    message: e.to_string(),
                })?;

            self.write_page(url, &html)?;
        }

        Ok(pages.len())
    }

    /// Render one detail page per record.
    ///
    /// With `parallel` set, pages are rendered concurrently but written in
    /// catalog order, so the output matches a sequential build.
    fn render_details(&self, catalog: &ContentCatalog) -> Result<usize, BuildError> {
        let records = catalog.records();

        let rendered: Vec<(&str, String)> = if self.config.parallel {
            records
                .par_iter()
                .map(|record| self.render_detail(catalog, record))
                .collect::<Result<_, _>>()?
        } else {
            records
                .iter()
                .map(|record| self.render_detail(catalog, record))
                .collect::<Result<_, _>>()?
        };

        for (url, html) in &rendered {
            self.write_page(url, html)?;
        }

        Ok(rendered.len())
    }

    fn render_detail<'a>(
        &self,
        catalog: &ContentCatalog,
        record: &'a ContentRecord,
    ) -> Result<(&'a str, String), BuildError> {
        let context = DetailContext::new(&self.config.site_title, catalog.categories(), record);

        let html = self
            .templates
            .render_detail(&context)
            .map_err(|e| BuildError::Render {
                page: record.detail_url.clone(),
                message: e.to_string(),
            })?;

        Ok((record.detail_url.as_str(), html))
    }

    fn write_page(&self, name: &str, html: &str) -> Result<(), BuildError> {
        let path = self.config.output_dir.join(name);
        fs::write(&path, html).map_err(|e| BuildError::Write { path, source: e })?;
        tracing::debug!("Wrote {}", name);
        Ok(())
    }
}

fn enter(stage: BuildStage) -> tracing::span::EnteredSpan {
    let span = tracing::info_span!("stage", name = %stage).entered();
    tracing::debug!("Entering {}", stage);
    span
}
