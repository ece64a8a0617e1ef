use maud::{Markup, html};

use super::{base_document, title_for};
use crate::operations::gallery::GalleryView;
use crate::operations::resolve::PathResolver;

fn sibling(directory: &str, name: &str) -> String {
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", directory, name)
    }
}

pub fn gallery_page(resolver: &PathResolver<'_>, directory: &str, view: &GalleryView) -> Markup {
    let link = |name: &str| format!("{}?view=1", resolver.href(&sibling(directory, name)));
    let content = html! {
        nav.gallery {
            @if let Some(previous) = &view.previous_name {
                a rel="prev" href=(link(previous)) { "← " (previous) }
            } @else {
                span {}
            }
            a href=(resolver.href(directory)) { (title_for(directory)) }
            @if let Some(next) = &view.next_name {
                a rel="next" href=(link(next)) { (next) " →" }
            } @else {
                span {}
            }
        }
        figure {
            a href=(resolver.href(&view.display_path)) {
                img src=(resolver.href(&view.display_path)) alt=(view.current_name);
            }
            figcaption { (view.current_name) }
        }
    };
    base_document(&view.current_name, content)
}
