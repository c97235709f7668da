//! The build's ordered record list and category mapping.

use std::collections::HashSet;

use pagewright_content::{slugify, AttributeKey, ContentFile, RawRecord};
use serde::Serialize;

/// Extension appended to every generated page name.
pub const PAGE_EXTENSION: &str = ".html";

/// Listing scope name used for the full catalog.
pub const INDEX_SCOPE: &str = "index";

/// A content file that carried every required attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    pub title: String,
    pub date: String,
    pub category: String,
    /// Raw body text
    pub content: String,
    /// Output file name of the detail page
    pub detail_url: String,
}

impl ContentRecord {
    /// Promote a raw record, attaching its detail URL.
    ///
    /// Fails with the list of missing keys when any of title, date or
    /// category is absent or blank.
    pub fn from_raw(raw: RawRecord) -> Result<Self, Vec<AttributeKey>> {
        let missing: Vec<AttributeKey> = AttributeKey::ALL
            .into_iter()
            .filter(|key| raw.get(*key).map_or(true, str::is_empty))
            .collect();

        match raw {
            RawRecord {
                title: Some(title),
                date: Some(date),
                category: Some(category),
                content,
            } if missing.is_empty() => Ok(Self {
                detail_url: detail_url(&title),
                title,
                date,
                category,
                content,
            }),
            _ => Err(missing),
        }
    }
}

/// A category and the file name of its first listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
}

/// File name of a listing page: `{scope}{page}.html`.
pub fn listing_url(scope: &str, page: usize) -> String {
    format!("{scope}{page}{PAGE_EXTENSION}")
}

/// File name of a detail page: the slugified title plus `.html`.
///
/// Titles that slugify to nothing fall back to `untitled`.
pub fn detail_url(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("untitled{PAGE_EXTENSION}")
    } else {
        format!("{slug}{PAGE_EXTENSION}")
    }
}

/// Distinct categories in order of first appearance.
fn categories_of(records: &[ContentRecord]) -> Vec<CategoryLink> {
    let mut categories: Vec<CategoryLink> = Vec::new();
    for record in records {
        if categories.iter().any(|c| c.name == record.category) {
            continue;
        }
        categories.push(CategoryLink {
            name: record.category.clone(),
            url: listing_url(&record.category, 1),
        });
    }
    categories
}

/// The listing scope whose page names include `file_name`, if any.
///
/// Listing pages are `{scope}{number}.html` for any page number, so a
/// detail page clashes when its stem is a scope followed only by digits.
/// Comparison ignores ASCII case, since slugs are lowercase and output may
/// land on a case-insensitive filesystem.
fn listing_clash<'a>(file_name: &str, scopes: &'a [String]) -> Option<&'a str> {
    let stem = file_name.strip_suffix(PAGE_EXTENSION)?.to_lowercase();

    scopes.iter().map(String::as_str).find(|scope| {
        stem.strip_prefix(scope.to_lowercase().as_str())
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Ordered records plus the derived category mapping for one build.
#[derive(Debug, Default)]
pub struct ContentCatalog {
    records: Vec<ContentRecord>,
    categories: Vec<CategoryLink>,
    skipped: usize,
}

impl ContentCatalog {
    /// Build a catalog from parsed content files.
    ///
    /// Files missing a required attribute, or whose category cannot be used
    /// as a file name, are skipped with a warning.
    pub fn from_files(files: Vec<ContentFile>) -> Self {
        let mut records = Vec::with_capacity(files.len());
        let mut skipped = 0;

        for file in files {
            match ContentRecord::from_raw(file.record) {
                Ok(record) if record.category.contains(['/', '\\']) => {
                    tracing::warn!(
                        "Skipping {}: category '{}' contains a path separator",
                        file.path.display(),
                        record.category
                    );
                    skipped += 1;
                }
                Ok(record) => records.push(record),
                Err(missing) => {
                    let keys: Vec<_> = missing.iter().map(ToString::to_string).collect();
                    tracing::warn!(
                        "Skipping {}: missing {}",
                        file.path.display(),
                        keys.join(", ")
                    );
                    skipped += 1;
                }
            }
        }

        let mut catalog = Self::from_records(records);
        catalog.skipped += skipped;
        catalog
    }

    /// Order records by date, newest first, and derive categories.
    ///
    /// The sort is stable: records with equal dates keep their input order.
    /// Records whose pages would overwrite a listing page are skipped: a
    /// category named `index`, or a detail page named `{scope}{number}.html`
    /// for the index or any category.
    pub fn from_records(records: Vec<ContentRecord>) -> Self {
        let mut skipped = 0;

        let mut records: Vec<ContentRecord> = records
            .into_iter()
            .filter(|record| {
                if record.category.eq_ignore_ascii_case(INDEX_SCOPE) {
                    tracing::warn!(
                        "Skipping '{}': category '{}' is reserved for the site index",
                        record.title,
                        record.category
                    );
                    skipped += 1;
                    return false;
                }
                true
            })
            .collect();

        records.sort_by(|a, b| b.date.cmp(&a.date));

        let scopes: Vec<String> = std::iter::once(INDEX_SCOPE.to_string())
            .chain(categories_of(&records).into_iter().map(|c| c.name))
            .collect();
        records.retain(|record| match listing_clash(&record.detail_url, &scopes) {
            Some(scope) => {
                tracing::warn!(
                    "Skipping '{}': detail page {} would overwrite a '{}' listing page",
                    record.title,
                    record.detail_url,
                    scope
                );
                skipped += 1;
                false
            }
            None => true,
        });

        let mut seen_urls = HashSet::new();
        for record in &records {
            if !seen_urls.insert(record.detail_url.as_str()) {
                tracing::warn!(
                    "Duplicate detail page {} (title '{}'); later pages overwrite earlier ones",
                    record.detail_url,
                    record.title
                );
            }
        }

        let categories = categories_of(&records);

        Self {
            records,
            categories,
            skipped,
        }
    }

    /// All records, newest first.
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// Categories in order of first appearance.
    pub fn categories(&self) -> &[CategoryLink] {
        &self.categories
    }

    /// Records in one category, preserving catalog order.
    pub fn in_category(&self, name: &str) -> Vec<&ContentRecord> {
        self.records.iter().filter(|r| r.category == name).collect()
    }

    /// Number of content files dropped as malformed or clashing with a listing page.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
