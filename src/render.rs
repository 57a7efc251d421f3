use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::assets;
use crate::handlers::{Entry, Listing};

/// Raw SVG markup for a bundled icon; unknown names render as nothing.
fn svg_icon(name: &str) -> Markup {
    PreEscaped(assets::svg_icon(name).unwrap_or_default())
}

/// Percent-encode each segment of a URL path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// URL of the parent directory of a cleaned URL path.
fn parent_url(current: &str) -> String {
    match current.trim_end_matches('/').rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => current[..idx].to_string(),
    }
}

fn entry_row(entry: &Entry) -> Markup {
    let href = encode_path(&entry.relative_path);
    html! {
        tr class={ "entry " (entry.file_type.as_str()) } {
            td class="icon" { (svg_icon(entry.file_type.as_str())) }
            td class="name" { a href=(href) { (entry.name) } }
            td class="size" { (entry.formatted_size) }
            td class="mtime" { (entry.mtime_text) }
            td class="actions" {
                @if entry.is_directory {
                    a class="zip-link" href={ "/zip" (href) } { "zip" }
                }
            }
        }
    }
}

/// Render the directory listing page from its view-model.
pub fn listing_page(listing: &Listing, domain: &str) -> Markup {
    let encoded_current = encode_path(&listing.current_path);
    // "/zip" alone means the whole root; "/zip/" matches no route.
    let zip_href = if encoded_current == "/" {
        "/zip".to_string()
    } else {
        format!("/zip{encoded_current}")
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Shared files - " (listing.current_path) }
                link rel="stylesheet" href="/static/styles.css";
            }
            body {
                header {
                    h1 { "Shared files" }
                    p class="current-path" { (listing.current_path) }
                    p class="share-origin" {
                        a href={ "http://" (domain) (encoded_current) } {
                            "http://" (domain) (listing.current_path)
                        }
                    }
                    a class="zip-link download-all" href=(zip_href) {
                        (svg_icon("zip")) " Download all as zip"
                    }
                }
                main {
                    table class="file-list" {
                        thead {
                            tr { th {} th { "Name" } th { "Size" } th { "Modified" } th {} }
                        }
                        tbody {
                            @if listing.current_path != "/" {
                                tr class="entry folder" {
                                    td class="icon" { (svg_icon("folder")) }
                                    td class="name" {
                                        a href=(encode_path(&parent_url(&listing.current_path))) { ".." }
                                    }
                                    td class="size" {}
                                    td class="mtime" {}
                                    td class="actions" {}
                                }
                            }
                            @for entry in &listing.entries {
                                (entry_row(entry))
                            }
                        }
                    }
                }
                footer {
                    p class="summary" { (listing.absolute_path) " - " (listing.total_size) }
                }
            }
        }
    }
}
