//! Static site generation.
//!
//! - [`build`] - pipeline orchestration, slug assignment, output files
//! - [`render`] - home page and video page HTML
//! - [`sitemap`] - `sitemap.xml`

pub mod build;
pub mod render;
pub mod sitemap;

pub use build::{
    assign_slugs, build_site, collect, write_site, BuildError, BuildReport, SiteContent, VideoPage,
};
