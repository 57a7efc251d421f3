use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use walkdir::WalkDir;

/// Category of a listing entry, used by the template to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Folder,
    Audio,
    Video,
    Zip,
    Image,
    Subtitles,
    OtherMedia,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Folder => "folder",
            FileKind::Audio => "audio",
            FileKind::Video => "video",
            FileKind::Zip => "zip",
            FileKind::Image => "image",
            FileKind::Subtitles => "subtitles",
            FileKind::OtherMedia => "other-media",
        }
    }

    /// Classify a file name by its lowercased extension.
    pub fn of_file_name(name: &str) -> FileKind {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "mp3" | "wav" | "ogg" | "m4a" | "flac" => FileKind::Audio,
            "mp4" | "avi" | "mov" | "wmv" | "mkv" => FileKind::Video,
            "zip" | "rar" | "7z" | "tar" | "gz" => FileKind::Zip,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" => FileKind::Image,
            "srt" | "ass" | "vtt" | "sub" | "ssa" | "txt" => FileKind::Subtitles,
            _ => FileKind::OtherMedia,
        }
    }
}

/// Render a byte count in a human-readable form: `"N B"` below 1024,
/// otherwise one decimal with the unit character from `KMGTPE`.
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let unit = "KMGTPE".as_bytes()[exp] as char;
    format!("{:.1} {}B", bytes as f64 / div as f64, unit)
}

/// Format a modification time as `YYYY-MM-DD HH:MM:SS` in local time.
pub fn format_mtime(mtime: SystemTime) -> String {
    let datetime: DateTime<Local> = mtime.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Total size in bytes of all regular files under `path`. Directories
/// contribute zero. Propagates the first error encountered by the walk.
pub fn dir_size(path: &Path) -> io::Result<u64> {
    let mut size = 0u64;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(walk_io_error)?;
        if entry.file_type().is_file() {
            size += entry.metadata().map_err(walk_io_error)?.len();
        }
    }
    Ok(size)
}

fn walk_io_error(err: walkdir::Error) -> io::Error {
    let msg = err.to_string();
    err.into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, msg))
}

/// Bindable local IPv4 addresses, skipping loopback and link-local.
pub fn local_ipv4_addrs() -> Result<Vec<Ipv4Addr>, local_ip_address::Error> {
    let mut ips = Vec::new();
    for (_name, ip) in local_ip_address::list_afinet_netifas()? {
        if let IpAddr::V4(v4) = ip {
            if v4.is_loopback() || v4.is_link_local() || v4.is_unspecified() {
                continue;
            }
            ips.push(v4);
        }
    }
    Ok(ips)
}
