use maud::{DOCTYPE, Markup, html};

mod gallery;
mod listing;

pub use gallery::gallery_page;
pub use listing::listing_page;

/// Single-page client served on a bare visit to the share root.
pub const LANDING_PAGE: &str = include_str!("../../static/index.html");

const CSS: &str = "\
body{font-family:system-ui,sans-serif;margin:0 auto;max-width:60rem;padding:1rem}\
a{text-decoration:none}\
table{border-collapse:collapse;width:100%}\
td{padding:.25rem .5rem;border-bottom:1px solid #eee}\
td.size{text-align:right;white-space:nowrap;color:#666}\
nav.gallery{display:flex;justify-content:space-between;margin:.5rem 0}\
figure{margin:0;text-align:center}\
figure img{max-width:100%;max-height:85vh}";

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                (content)
            }
        }
    }
}

/// Page title for a display path; the share root shows as `/`.
fn title_for(display: &str) -> String {
    format!("/{}", display)
}
