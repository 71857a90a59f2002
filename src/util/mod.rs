//! Utility functions shared by the feed extractors and the site renderer.
//!
//! - **Text processing**: HTML-to-text cleaning, description capping and
//!   image discovery in encoded content
//! - **Dates**: display formatting for RSS and YouTube timestamps
//! - **Slugs**: URL-safe path segments for video pages
//! - **URL validation**: scheme checks for fetch targets
//!
//! # Examples
//!
//! ```
//! use clubfeed::util::{clean_html, format_rss_date, slugify};
//!
//! assert_eq!(clean_html("<b>Hola</b> &amp; chau"), "Hola & chau");
//! assert_eq!(format_rss_date("Wed, 04 Feb 2026 17:29:45 +0000"), "04/02/2026");
//! assert_eq!(slugify("Resumen: Instituto 2 - 1"), "resumen-instituto-2-1");
//! ```

mod date;
mod slug;
mod text;
mod url_validator;

pub use date::{format_rss_date, format_youtube_date, sortable_timestamp};
pub use slug::{slugify, MAX_SLUG_LEN};
pub use text::{clean_html, extract_first_image, truncate_description, ELLIPSIS};
pub use url_validator::{validate_url, UrlValidationError};
