//! Plain-text content parser.
//!
//! Content files are line oriented. Lines of the form `title: ...`,
//! `date: ...` and `category: ...` become attributes, everything else is body
//! text carried through to the renderer.

pub mod parser;
pub mod scan;
pub mod slug;

pub use parser::{
    classify_line, parse_content, parse_dir, parse_file, AttributeKey, ContentFile, LineKind,
    RawRecord,
};
pub use scan::{scan_dir, ScanError};
pub use slug::slugify;
