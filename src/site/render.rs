//! HTML rendering for the home page and the per-video pages.
//!
//! Pages are built with plain string formatting. Every value that comes from
//! a feed or the config file goes through [`text`] or [`attr`] before it is
//! interpolated, and links through [`href`].

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::build::{SiteContent, VideoPage};
use crate::config::{Config, SectionConfig, SiteConfig};
use crate::feed::FeedItem;
use crate::util::validate_url;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css";

/// Club colours and card layout shared by every page.
const STYLE: &str = r#"
    :root { --club-red: #E30613; --club-white: #FFFFFF; }
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; background: linear-gradient(135deg, #f5f5f5 0%, #e8e8e8 100%); min-height: 100vh; }
    .stripes { background: repeating-linear-gradient(90deg, var(--club-red) 0px, var(--club-red) 120px, var(--club-white) 120px, var(--club-white) 240px); }
    .site-header { padding: 3rem 0; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }
    .header-content, .footer-content { background: rgba(255,255,255,0.95); padding: 2rem; border-radius: 15px; text-align: center; }
    h1 { color: var(--club-red); font-weight: 800; margin: 0; text-transform: uppercase; letter-spacing: 2px; }
    h1 a { color: inherit; text-decoration: none; }
    .subtitle { color: #666; font-size: 1.1rem; margin-top: 0.5rem; }
    .section-title { color: var(--club-red); font-weight: 700; margin: 3rem 0 1.5rem 0; padding-bottom: 0.5rem; border-bottom: 3px solid var(--club-red); text-transform: uppercase; }
    .card { border: none; border-radius: 15px; overflow: hidden; box-shadow: 0 5px 15px rgba(0,0,0,0.08); height: 100%; }
    .card-img-top { height: 250px; object-fit: cover; background: #eee; }
    .card-title { color: var(--club-red); font-weight: 700; }
    .card-text { color: #555; }
    .card-date { color: #666; font-weight: 600; display: block; margin-top: 0.8rem; text-transform: uppercase; }
    .card-compact { min-height: 200px; border-left: 4px solid var(--club-red); }
    .btn-club { background: var(--club-red); color: white; padding: 0.6rem 1.5rem; border-radius: 25px; font-weight: 600; text-decoration: none; display: inline-block; margin-top: 1rem; }
    .btn-club:hover { background: #b30510; color: white; }
    .video-embed { position: relative; padding-bottom: 56.25%; height: 0; overflow: hidden; border-radius: 15px; }
    .video-embed iframe { position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: 0; }
    .site-footer { padding: 2rem 0; margin-top: 4rem; }
    .footer-content a { color: var(--club-red); font-weight: 600; }
"#;

/// Escapes text content.
fn text(s: &str) -> std::borrow::Cow<'_, str> {
    encode_text(s)
}

/// Escapes a double-quoted attribute value.
fn attr(s: &str) -> std::borrow::Cow<'_, str> {
    encode_double_quoted_attribute(s)
}

/// Escaped attribute value for an external link. Anything that is not an
/// absolute http(s) URL becomes `#`.
fn href(url: &str) -> String {
    match validate_url(url.trim()) {
        Ok(_) => attr(url.trim()).into_owned(),
        Err(_) => "#".to_string(),
    }
}

/// Renders the home page (`index.html`).
///
/// Sections appear in a fixed order (news, photos, agenda, videos) and only
/// when visible and non-empty.
pub fn home_page(config: &Config, content: &SiteContent) -> String {
    let site = &config.site;
    let mut html = String::with_capacity(16 * 1024);

    push_head(&mut html, site, &site.title, "");
    push_header(&mut html, site, "");
    html.push_str("    <main class=\"container py-4\">\n");

    if config.news.visible && !content.news.is_empty() {
        push_section_open(&mut html, &config.news.title);
        for item in &content.news {
            push_news_card(&mut html, item, &config.news);
        }
        push_section_close(&mut html);
    }

    if config.photos.visible && !content.photos.is_empty() {
        push_section_open(&mut html, &config.photos.title);
        for item in &content.photos {
            push_photo_card(&mut html, item, &config.photos);
        }
        push_section_close(&mut html);
    }

    if config.agenda.visible && !content.agenda.is_empty() {
        push_section_open(&mut html, &config.agenda.title);
        for item in &content.agenda {
            push_agenda_card(&mut html, item, &config.agenda);
        }
        push_section_close(&mut html);
    }

    if config.videos.visible && !content.videos.is_empty() {
        push_section_open(&mut html, &config.videos.title);
        for page in &content.videos {
            push_video_card(&mut html, page);
        }
        push_section_close(&mut html);
    }

    html.push_str("    </main>\n");
    push_footer(&mut html, site);
    html
}

/// Renders one video page (`videos/<slug>/index.html`).
///
/// Relative links assume the page sits two directories below the site root.
pub fn video_page(config: &Config, page: &VideoPage) -> String {
    let site = &config.site;
    let video = &page.video;
    let mut html = String::with_capacity(8 * 1024);

    let title = format!("{} - {}", video.title, site.title);
    push_head(&mut html, site, &title, &video.description);
    push_header(&mut html, site, "../../");

    html.push_str("    <main class=\"container py-4\">\n        <article>\n");
    let _ = writeln!(
        html,
        "            <h2 class=\"section-title\">{}</h2>",
        text(&video.title)
    );
    let _ = writeln!(
        html,
        "            <p class=\"card-date\">{} · {}</p>",
        text(&video.author),
        text(&video.pub_date)
    );

    match video.embed_url() {
        Some(embed) => {
            let _ = writeln!(
                html,
                "            <div class=\"video-embed mb-4\"><iframe src=\"{}\" title=\"{}\" allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" allowfullscreen></iframe></div>",
                attr(&embed),
                attr(&video.title)
            );
        }
        None => {
            if let Some(image) = &video.image {
                let _ = writeln!(
                    html,
                    "            <img src=\"{}\" class=\"img-fluid rounded mb-4\" alt=\"{}\">",
                    href(image),
                    attr(&video.title)
                );
            }
        }
    }

    if !video.description.is_empty() {
        let _ = writeln!(
            html,
            "            <p class=\"card-text\">{}</p>",
            text(&video.description)
        );
    }
    if !video.link.is_empty() {
        let _ = writeln!(
            html,
            "            <a href=\"{}\" class=\"btn-club\" target=\"_blank\" rel=\"noopener\">Ver en YouTube →</a>",
            href(&video.link)
        );
    }
    html.push_str("            <p><a href=\"../../\">← Volver al inicio</a></p>\n");
    html.push_str("        </article>\n    </main>\n");

    push_footer(&mut html, site);
    html
}

fn push_head(html: &mut String, site: &SiteConfig, title: &str, description: &str) {
    let description = if description.is_empty() {
        site.meta_description.as_str()
    } else {
        description
    };
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="description" content="{description}">
    <title>{title}</title>
    <link href="{BOOTSTRAP_CSS}" rel="stylesheet">
    <style>{STYLE}    </style>
</head>
<body>
"#,
        lang = attr(&site.lang),
        description = attr(description),
        title = text(title),
    );
}

fn push_header(html: &mut String, site: &SiteConfig, root: &str) {
    let _ = write!(
        html,
        r#"    <header class="site-header stripes">
        <div class="container">
            <div class="header-content">
                <h1><a href="{root}">{title}</a></h1>
                <p class="subtitle">{subtitle}</p>
            </div>
        </div>
    </header>
"#,
        root = if root.is_empty() { "./" } else { root },
        title = text(&site.title),
        subtitle = text(&site.subtitle),
    );
}

fn push_footer(html: &mut String, site: &SiteConfig) {
    let official = href(&site.official_url);
    let official_name = site
        .official_url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    let _ = write!(
        html,
        r#"    <footer class="site-footer stripes">
        <div class="container">
            <div class="footer-content">
                <p><strong>{footer}</strong></p>
                <p>Visitá el sitio oficial: <a href="{official}" target="_blank" rel="noopener">{official_name}</a></p>
            </div>
        </div>
    </footer>
</body>
</html>
"#,
        footer = text(&site.footer),
        official_name = text(official_name),
    );
}

fn push_section_open(html: &mut String, title: &str) {
    let _ = writeln!(
        html,
        "        <h2 class=\"section-title\">{}</h2>\n        <div class=\"row g-4 mb-5\">",
        text(title)
    );
}

fn push_section_close(html: &mut String) {
    html.push_str("        </div>\n");
}

fn push_button(html: &mut String, link: &str, label: &str) {
    let _ = writeln!(
        html,
        "                    <a href=\"{}\" class=\"btn-club\" target=\"_blank\" rel=\"noopener\">{}</a>",
        href(link),
        text(label)
    );
}

fn push_news_card(html: &mut String, item: &FeedItem, section: &SectionConfig) {
    html.push_str("            <div class=\"col-md-6\">\n");
    match &item.image {
        Some(image) => {
            html.push_str("                <div class=\"card\">\n");
            let _ = writeln!(
                html,
                "                <img src=\"{}\" class=\"card-img-top\" alt=\"{}\">",
                href(image),
                attr(&item.title)
            );
            html.push_str("                <div class=\"card-body\">\n");
            push_card_text(html, item);
            push_date(html, &item.pub_date);
        }
        None => {
            // Compact layout: date first, no picture
            html.push_str("                <div class=\"card card-compact\">\n");
            html.push_str("                <div class=\"card-body\">\n");
            push_date(html, &item.pub_date);
            push_card_text(html, item);
        }
    }
    push_button(html, &item.link, &section.button);
    html.push_str("                </div>\n                </div>\n            </div>\n");
}

fn push_photo_card(html: &mut String, item: &FeedItem, section: &SectionConfig) {
    html.push_str("            <div class=\"col-md-4\">\n                <div class=\"card\">\n");
    match &item.image {
        Some(image) => {
            let _ = writeln!(
                html,
                "                <img src=\"{}\" class=\"card-img-top\" alt=\"{}\">",
                href(image),
                attr(&item.title)
            );
        }
        None => html.push_str(
            "                <div class=\"card-img-top d-flex align-items-center justify-content-center\"><span style=\"font-size: 3rem;\">📷</span></div>\n",
        ),
    }
    html.push_str("                <div class=\"card-body\">\n");
    let _ = writeln!(
        html,
        "                    <h5 class=\"card-title\">{}</h5>",
        text(&item.title)
    );
    push_date(html, &item.pub_date);
    push_button(html, &item.link, &section.button);
    html.push_str("                </div>\n                </div>\n            </div>\n");
}

fn push_agenda_card(html: &mut String, item: &FeedItem, section: &SectionConfig) {
    html.push_str(
        "            <div class=\"col-md-4\">\n                <div class=\"card card-compact\">\n                <div class=\"card-body\">\n",
    );
    push_card_text(html, item);
    push_date(html, &item.pub_date);
    push_button(html, &item.link, &section.button);
    html.push_str("                </div>\n                </div>\n            </div>\n");
}

fn push_video_card(html: &mut String, page: &VideoPage) {
    let video = &page.video;
    let local = attr(&page.href()).into_owned();
    html.push_str("            <div class=\"col-md-4\">\n                <div class=\"card\">\n");
    if let Some(image) = &video.image {
        let _ = writeln!(
            html,
            "                <a href=\"{local}\"><img src=\"{}\" class=\"card-img-top\" alt=\"{}\"></a>",
            href(image),
            attr(&video.title)
        );
    }
    html.push_str("                <div class=\"card-body\">\n");
    let _ = writeln!(
        html,
        "                    <h5 class=\"card-title\"><a href=\"{local}\">{}</a></h5>",
        text(&video.title)
    );
    let _ = writeln!(
        html,
        "                    <small class=\"card-date\">{} · {}</small>",
        text(&video.author),
        text(&video.pub_date)
    );
    let _ = writeln!(
        html,
        "                    <a href=\"{local}\" class=\"btn-club\">Ver video →</a>"
    );
    html.push_str("                </div>\n                </div>\n            </div>\n");
}

fn push_card_text(html: &mut String, item: &FeedItem) {
    let _ = writeln!(
        html,
        "                    <h5 class=\"card-title\">{}</h5>",
        text(&item.title)
    );
    if !item.description.is_empty() {
        let _ = writeln!(
            html,
            "                    <p class=\"card-text\">{}</p>",
            text(&item.description)
        );
    }
}

fn push_date(html: &mut String, date: &str) {
    if !date.is_empty() {
        let _ = writeln!(
            html,
            "                    <small class=\"card-date\">{}</small>",
            text(date)
        );
    }
}
