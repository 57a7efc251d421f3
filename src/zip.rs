use std::path::{Path, PathBuf};

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipDateTime, ZipEntryBuilder};
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use tokio::io::DuplexStream;
use tokio_util::compat::FuturesAsyncWriteCompatExt;
use tokio_util::io::ReaderStream;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::FileShareError;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Streamed zip download of the subtree at `subtree`, named
/// `<archive_base>.zip`. Headers are committed immediately; the archive is
/// produced by a background task and flows through a bounded pipe, so the
/// TCP connection provides backpressure. A walk or I/O failure after the
/// first flush can only truncate the stream, which is logged server-side.
pub fn zip_response(subtree: PathBuf, archive_base: String) -> Response {
    let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);

    tokio::spawn(async move {
        if let Err(err) = write_archive(&subtree, writer).await {
            warn!("zip stream of {} aborted: {err}", subtree.display());
        }
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename={archive_base}.zip"))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=archive.zip")),
    );

    (
        StatusCode::OK,
        headers,
        Body::from_stream(ReaderStream::new(reader)),
    )
        .into_response()
}

/// Walk `subtree` depth-first and write one zip entry per node, in walk
/// order. The subtree root itself is skipped; directories become
/// header-only entries with a trailing slash; file contents are streamed.
/// Stops at the first error, including write errors after a disconnect.
async fn write_archive(subtree: &Path, writer: DuplexStream) -> Result<(), FileShareError> {
    let mut zip = ZipFileWriter::with_tokio(writer);

    for entry in WalkDir::new(subtree) {
        let entry = entry.map_err(walk_error)?;
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(subtree)
            .map_err(|err| FileShareError::Internal(err.to_string()))?;
        let mut name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        let is_dir = entry.file_type().is_dir();
        if is_dir {
            name.push('/');
        }

        let mut builder = ZipEntryBuilder::new(name.into(), Compression::Deflate);
        if let Ok(modified) = entry.metadata().map_err(walk_error)?.modified() {
            let mtime: DateTime<Utc> = modified.into();
            builder = builder.last_modification_date(ZipDateTime::from_chrono(&mtime));
        }

        if is_dir {
            zip.write_entry_whole(builder, &[]).await.map_err(zip_error)?;
        } else {
            let mut file = tokio::fs::File::open(entry.path()).await?;
            let mut entry_writer = zip
                .write_entry_stream(builder)
                .await
                .map_err(zip_error)?
                .compat_write();
            tokio::io::copy(&mut file, &mut entry_writer).await?;
            entry_writer.into_inner().close().await.map_err(zip_error)?;
        }
    }

    zip.close().await.map_err(zip_error)?;
    Ok(())
}

fn zip_error(err: async_zip::error::ZipError) -> FileShareError {
    FileShareError::Internal(err.to_string())
}

fn walk_error(err: walkdir::Error) -> FileShareError {
    let msg = err.to_string();
    FileShareError::Io(
        err.into_io_error()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg)),
    )
}
