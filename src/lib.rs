//! Static site generator for a football club's fan page.
//!
//! Downloads the club's RSS feeds and a set of YouTube channel feeds, keeps a
//! bounded number of items from each, and renders them as static HTML.

pub mod config;
pub mod feed;
pub mod site;
pub mod util;
