use std::io;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

use axum::{
    body::Body,
    extract::{ConnectInfo, Path as UrlPath, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::error::FileShareError;
use crate::fsutil::{self, FileKind};
use crate::zip;
use crate::{render, AppState};

/// One row of a directory listing.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    /// Slash-separated URL path from the root, with a leading slash.
    pub relative_path: String,
    pub is_directory: bool,
    /// File size, or the recursive byte total for directories.
    pub size_bytes: u64,
    pub formatted_size: String,
    pub mtime_text: String,
    pub file_type: FileKind,
}

/// View-model consumed by the listing template.
#[derive(Debug, Clone)]
pub struct Listing {
    pub entries: Vec<Entry>,
    pub current_path: String,
    pub absolute_path: String,
    pub total_size: String,
}

/// Classification of a resolved request path.
#[derive(Debug)]
pub enum Resolved {
    NotFound,
    File(PathBuf),
    Directory(PathBuf),
}

// ============================================================================
// Path resolution
// ============================================================================

/// Lexically clean a URL path: collapse `.` and `..`, drop empty segments.
/// The result always starts with `/`; `..` cannot climb above the root.
pub fn clean_url_path(raw: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    format!("/{}", parts.join("/"))
}

/// Map a URL path to a filesystem path confined under `root` and stat it.
/// Returns the classification together with the cleaned URL path.
pub fn resolve(root: &Path, url_path: &str) -> Result<(Resolved, String), FileShareError> {
    let cleaned = clean_url_path(url_path);
    let full = root.join(cleaned.trim_start_matches('/'));

    // Cleaning already removed every `..`; this guards against anything
    // that still resolves outside the root, without leaking its existence.
    if !full.starts_with(root) {
        return Ok((Resolved::NotFound, cleaned));
    }

    match std::fs::metadata(&full) {
        Ok(meta) if meta.is_dir() => Ok((Resolved::Directory(full), cleaned)),
        Ok(_) => Ok((Resolved::File(full), cleaned)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok((Resolved::NotFound, cleaned)),
        Err(err) => Err(FileShareError::Io(err)),
    }
}

/// Whether the final segment of a cleaned URL path names a dotfile.
fn is_hidden_basename(cleaned: &str) -> bool {
    cleaned
        .rsplit('/')
        .next()
        .is_some_and(|name| name.starts_with('.'))
}

// ============================================================================
// Metadata collection
// ============================================================================

/// Build the listing view-model for `dir`, in readdir order. Children whose
/// metadata cannot be read are skipped; a directory whose recursive size
/// cannot be computed falls back to its raw entry size.
pub fn collect_listing(dir: &Path, url_path: &str, show_dotfiles: bool) -> io::Result<Listing> {
    let mut entries = Vec::new();
    let mut total = 0u64;

    for child in std::fs::read_dir(dir)? {
        let child = match child {
            Ok(child) => child,
            Err(_) => continue,
        };
        let name = child.file_name().to_string_lossy().into_owned();
        if !show_dotfiles && name.starts_with('.') {
            continue;
        }
        let meta = match child.metadata() {
            Ok(meta) => meta,
            Err(_) => continue,
        };

        let is_directory = meta.is_dir();
        let mut size_bytes = meta.len();
        if is_directory {
            if let Ok(walked) = fsutil::dir_size(&child.path()) {
                size_bytes = walked;
            }
        }

        let file_type = if is_directory {
            FileKind::Folder
        } else {
            FileKind::of_file_name(&name)
        };
        let relative_path = if url_path == "/" {
            format!("/{name}")
        } else {
            format!("{url_path}/{name}")
        };

        total += size_bytes;
        entries.push(Entry {
            relative_path,
            is_directory,
            size_bytes,
            formatted_size: fsutil::format_size(size_bytes),
            mtime_text: meta.modified().map(fsutil::format_mtime).unwrap_or_default(),
            file_type,
            name,
        });
    }

    Ok(Listing {
        entries,
        current_path: url_path.to_string(),
        absolute_path: dir.display().to_string(),
        total_size: fsutil::format_size(total),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Fallback handler: directory listing, raw file stream, or 404.
pub async fn serve_path(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, FileShareError> {
    let decoded = urlencoding::decode(uri.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| uri.path().to_string());
    let (resolved, cleaned) = resolve(&state.root_dir, &decoded)?;

    if !state.config.show_dotfiles && is_hidden_basename(&cleaned) {
        return Err(FileShareError::NotFound);
    }

    match resolved {
        Resolved::NotFound => Err(FileShareError::NotFound),
        Resolved::Directory(path) => {
            debug!("listing directory: {}", path.display());
            let show_dotfiles = state.config.show_dotfiles;
            let current_path = cleaned.clone();
            let listing = tokio::task::spawn_blocking(move || {
                collect_listing(&path, &current_path, show_dotfiles)
            })
            .await
            .map_err(|err| FileShareError::Internal(err.to_string()))??;

            Ok(render::listing_page(&listing, &state.config.domain).into_response())
        }
        Resolved::File(path) => {
            debug!("streaming file: {}", path.display());
            stream_file(&path).await
        }
    }
}

/// Stream a regular file, with inferred content type and length.
async fn stream_file(path: &Path) -> Result<Response, FileShareError> {
    let metadata = fs::metadata(path).await?;
    let file = fs::File::open(path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        body,
    )
        .into_response())
}

/// GET /zip — archive of the whole root.
pub async fn zip_root(State(state): State<AppState>) -> Result<Response, FileShareError> {
    zip_subtree_response(state, "/").await
}

/// GET /zip/<subpath> — archive of one subtree.
pub async fn zip_subtree(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
) -> Result<Response, FileShareError> {
    zip_subtree_response(state, &path).await
}

async fn zip_subtree_response(
    state: AppState,
    suffix: &str,
) -> Result<Response, FileShareError> {
    let (resolved, cleaned) = resolve(&state.root_dir, suffix)?;

    if !state.config.show_dotfiles && is_hidden_basename(&cleaned) {
        return Err(FileShareError::NotFound);
    }

    let subtree = match resolved {
        Resolved::NotFound => return Err(FileShareError::NotFound),
        Resolved::File(path) | Resolved::Directory(path) => path,
    };

    let archive_base = if cleaned == "/" {
        state
            .root_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string())
    } else {
        cleaned
            .rsplit('/')
            .next()
            .unwrap_or("archive")
            .to_string()
    };

    debug!("streaming zip of {}", subtree.display());
    Ok(zip::zip_response(subtree, archive_base))
}

/// GET /static/<asset> — embedded assets with explicit MIME for css/svg.
pub async fn serve_static(
    UrlPath(path): UrlPath<String>,
) -> Result<Response, FileShareError> {
    let bytes = crate::assets::get(&path).ok_or(FileShareError::AssetMissing)?;

    let mut headers = HeaderMap::new();
    if path.ends_with(".css") {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));
    } else if path.ends_with(".svg") {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("image/svg+xml"),
        );
    }

    Ok((StatusCode::OK, headers, bytes).into_response())
}

/// Middleware logging every request with its remote address.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    info!("{} {} {}", addr, request.method(), request.uri());
    next.run(request).await
}
