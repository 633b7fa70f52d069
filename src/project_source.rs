/*!
 * Locating the project document for an input path.
 *
 * Final Cut Pro exports either a bare `.fcpxml` document or a bundle
 * (`.fcpxmld`, `.fcpbundle`). On macOS a bundle is a directory package; once
 * it has been copied off the machine or uploaded it usually arrives as a ZIP
 * archive. Both forms are accepted. Inside a bundle `Info.fcpxml` wins,
 * otherwise the first `.fcpxml` found is used.
 */

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::errors::SourceError;

/// Name of the project document inside an exported bundle
pub const BUNDLE_INFO_FILE: &str = "Info.fcpxml";

const DOCUMENT_EXTENSION: &str = "fcpxml";
const BUNDLE_EXTENSIONS: [&str; 2] = ["fcpbundle", "fcpxmld"];

/// Kind of project input, determined from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// A bare `.fcpxml` document
    Document,
    /// A `.fcpbundle` or `.fcpxmld` package, as a directory or ZIP archive
    Bundle,
    /// Anything else
    Unsupported,
}

impl ProjectKind {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ext == DOCUMENT_EXTENSION {
            ProjectKind::Document
        } else if BUNDLE_EXTENSIONS.contains(&ext.as_str()) {
            ProjectKind::Bundle
        } else {
            ProjectKind::Unsupported
        }
    }
}

/// Project XML together with where it was read from
#[derive(Debug, Clone)]
pub struct ProjectSource {
    /// File (or bundle member) the XML came from
    pub origin: PathBuf,

    /// Raw project XML
    pub xml: String,
}

/// Load the project XML for `path`, enforcing `max_bytes` on what is read.
pub fn load_project_xml<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<ProjectSource, SourceError> {
    let path = path.as_ref();

    match ProjectKind::from_path(path) {
        ProjectKind::Document => {
            let xml = read_limited(path, max_bytes)?;
            Ok(ProjectSource {
                origin: path.to_path_buf(),
                xml,
            })
        }
        ProjectKind::Bundle if path.is_dir() => load_from_bundle_dir(path, max_bytes),
        ProjectKind::Bundle => {
            check_size(fs::metadata(path)?.len(), max_bytes)?;
            let bytes = fs::read(path)?;
            let (member, xml) = read_archive(&bytes, max_bytes)?;
            info!("Using {} from bundle archive {:?}", member, path);
            Ok(ProjectSource {
                origin: path.join(member),
                xml,
            })
        }
        ProjectKind::Unsupported => Err(SourceError::UnsupportedFileType(path.display().to_string())),
    }
}

/// Find the project XML inside an in-memory ZIP bundle.
///
/// An `Info.fcpxml` at the archive root is preferred; otherwise the first
/// entry in archive order whose name ends in `.fcpxml` is used.
pub fn find_project_xml_in_archive(bytes: &[u8], max_bytes: u64) -> Result<String, SourceError> {
    read_archive(bytes, max_bytes).map(|(_, xml)| xml)
}

fn read_archive(bytes: &[u8], max_bytes: u64) -> Result<(String, String), SourceError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SourceError::InvalidArchive(e.to_string()))?;

    let mut fallback = None;
    let mut info_index = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name();
        if name == BUNDLE_INFO_FILE {
            info_index = Some(i);
            break;
        }
        if fallback.is_none() && name.to_lowercase().ends_with(".fcpxml") {
            fallback = Some(i);
        }
    }

    let index = info_index
        .or(fallback)
        .ok_or_else(|| SourceError::NoProjectFile("archive contains no .fcpxml entry".to_string()))?;

    let mut entry = archive.by_index(index)?;
    check_size(entry.size(), max_bytes)?;

    let name = entry.name().to_string();
    // The declared size may lie; never inflate past the ceiling
    let mut buf = Vec::with_capacity(entry.size().min(max_bytes) as usize);
    (&mut entry).take(max_bytes.saturating_add(1)).read_to_end(&mut buf)?;
    check_size(buf.len() as u64, max_bytes)?;

    debug!("Read {} bytes from archive entry {}", buf.len(), name);

    let xml = String::from_utf8(buf).map_err(|e| SourceError::InvalidEncoding(e.to_string()))?;
    Ok((name, xml))
}

fn load_from_bundle_dir(dir: &Path, max_bytes: u64) -> Result<ProjectSource, SourceError> {
    let info = dir.join(BUNDLE_INFO_FILE);
    let origin = if info.is_file() {
        info
    } else {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .find(|p| p.is_file() && ProjectKind::from_path(p) == ProjectKind::Document)
            .ok_or_else(|| SourceError::NoProjectFile(dir.display().to_string()))?
    };

    info!("Using {:?} from bundle directory", origin);
    let xml = read_limited(&origin, max_bytes)?;
    Ok(ProjectSource { origin, xml })
}

fn read_limited(path: &Path, max_bytes: u64) -> Result<String, SourceError> {
    check_size(fs::metadata(path)?.len(), max_bytes)?;
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| SourceError::InvalidEncoding(format!("{}: {}", path.display(), e)))
}

fn check_size(size: u64, limit: u64) -> Result<(), SourceError> {
    if size > limit {
        return Err(SourceError::TooLarge { size, limit });
    }
    Ok(())
}
