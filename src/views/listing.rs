use maud::{Markup, html};

use super::{base_document, title_for};
use crate::common::UPLOAD_FIELD;
use crate::operations::listing::DirEntry;
use crate::operations::resolve::PathResolver;

fn child(display: &str, name: &str) -> String {
    if display.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", display, name)
    }
}

/// HTML rendition of a directory listing, with an upload form posting back
/// to the same directory.
pub fn listing_page(resolver: &PathResolver<'_>, display: &str, entries: &[DirEntry]) -> Markup {
    let parent = display.rsplit_once('/').map(|(parent, _)| parent).unwrap_or_default();
    let content = html! {
        h1 { (title_for(display)) }
        form method="post" enctype="multipart/form-data" action=(resolver.href(display)) {
            input type="file" name=(UPLOAD_FIELD) multiple;
            button type="submit" { "Upload" }
        }
        table {
            @if !display.is_empty() {
                tr {
                    td { a href=(resolver.href(parent)) { ".." } }
                    td.size {}
                }
            }
            @for entry in entries {
                @let path = child(display, &entry.name);
                tr {
                    td {
                        @if entry.is_directory {
                            a href=(resolver.href(&path)) { (entry.name) "/" }
                        } @else if entry.is_image {
                            a href={ (resolver.href(&path)) "?view=1" } { (entry.name) }
                        } @else {
                            a href=(resolver.href(&path)) download { (entry.name) }
                        }
                    }
                    td.size { (entry.size_display) }
                }
            }
        }
    };
    base_document(&title_for(display), content)
}
