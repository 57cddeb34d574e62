//! Zip packaging of a session folder

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{Error, Result};

/// Media type offered with the archive download
pub const ARCHIVE_MEDIA_TYPE: &str = "application/zip";

/// A compressed bundle of one session's images
#[derive(Debug, Clone)]
pub struct Archive {
    /// `<session folder name>.zip`
    pub file_name: String,
    /// Positioned at the start
    pub buffer: Cursor<Vec<u8>>,
    /// Entry names in the order they were added
    pub entries: Vec<String>,
}

impl Archive {
    pub fn media_type(&self) -> &'static str {
        ARCHIVE_MEDIA_TYPE
    }

    pub fn bytes(&self) -> &[u8] {
        self.buffer.get_ref()
    }

    /// Write the archive into `dir` under its file name
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, self.bytes()).map_err(|e| Error::io(&path, e))?;
        info!("Wrote archive {} ({} bytes)", path.display(), self.bytes().len());
        Ok(path)
    }
}

/// Zip every regular file under `folder`, keyed by its path relative to `folder`
///
/// No filtering is applied: whatever is in the folder ends up in the archive.
pub fn build_archive(folder: &Path, file_name: impl Into<String>) -> Result<Archive> {
    let mut files = Vec::new();
    collect_files(folder, &mut files)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let name = entry_name(folder, &path);
        let data = fs::read(&path).map_err(|e| Error::io(&path, e))?;

        writer.start_file(name.as_str(), options)?;
        writer.write_all(&data).map_err(|e| Error::io(&path, e))?;

        debug!("Archived {} ({} bytes)", name, data.len());
        entries.push(name);
    }

    let mut buffer = writer.finish()?;
    buffer.set_position(0);

    Ok(Archive {
        file_name: file_name.into(),
        buffer,
        entries,
    })
}

/// Depth-first walk in name order so archives are reproducible
///
/// Symlinked directories are not descended into; a link back to an ancestor
/// would otherwise loop forever. Symlinks to regular files are archived.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut children: Vec<(PathBuf, fs::FileType)> = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
        .collect::<std::io::Result<_>>()
        .map_err(|e| Error::io(dir, e))?;
    children.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, file_type) in children {
        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_file() {
            files.push(path);
        } else if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(target) if target.is_file() => files.push(path),
                _ => debug!("Skipping link {}", path.display()),
            }
        }
    }
    Ok(())
}

/// Relative path with `/` separators, as zip expects
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
