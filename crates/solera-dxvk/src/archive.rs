use crate::download::Downloader;
use crate::DxvkError;
use flate2::read::GzDecoder;
use solera_prefix::Prefix;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Download the archive at `url` into `cache_dir`, keyed by the final URL
/// path segment.
///
/// If a file with that name already exists in the cache it is treated as
/// already downloaded and returned without touching the network (no checksum
/// verification). The existence check and the write are not atomic against
/// concurrent callers.
pub fn fetch(cache_dir: &Path, url: &str, downloader: &dyn Downloader) -> Result<PathBuf, DxvkError> {
    let file = url.rsplit('/').next().unwrap_or("");
    if file.is_empty() {
        return Err(DxvkError::EmptyFilename {
            url: url.to_owned(),
        });
    }

    let path = cache_dir.join(file);
    if path.exists() {
        info!("DXVK is already downloaded ({})", path.display());
        return Ok(path);
    }

    info!("downloading DXVK from {url}");
    let body = downloader.get(url)?;
    fs::create_dir_all(cache_dir)?;
    fs::write(&path, body)?;

    Ok(path)
}

/// Map an archive entry to its prefix target directory by the base name of
/// the entry's parent directory. Unrecognized classes map to `None`.
fn arch_target(root: &Path, entry_path: &Path) -> Option<PathBuf> {
    let arch = entry_path.parent()?.file_name()?;
    let dir = match arch.to_str()? {
        "x64" => "system32",
        "x32" => "syswow64",
        _ => return None,
    };
    Some(root.join("drive_c").join("windows").join(dir))
}

/// Extract the DXVK archive into the prefix's system directories.
///
/// The archive is streamed entry-by-entry: gzip decode wrapping a tar reader,
/// never materialized in memory. Only regular-file entries are considered;
/// entries whose parent directory is not a recognized architecture class are
/// logged and skipped. Extraction is not transactional — a mid-stream failure
/// leaves already-written files in place.
pub fn extract(archive: &Path, prefix: &Prefix) -> Result<(), DxvkError> {
    info!("extracting DXVK from {}", archive.display());

    let file = File::open(archive)?;
    let stream = GzDecoder::new(BufReader::new(file));
    let mut ar = tar::Archive::new(stream);

    for entry in ar.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type() != tar::EntryType::Regular {
            continue;
        }

        let entry_path = entry.path()?.into_owned();
        let Some(dest_dir) = arch_target(prefix.root(), &entry_path) else {
            debug!("skipping unhandled DXVK file: {}", entry_path.display());
            continue;
        };
        let Some(name) = entry_path.file_name() else {
            continue;
        };

        fs::create_dir_all(&dest_dir)?;
        debug!("extracting DLL {}", entry_path.display());
        let mut out = File::create(dest_dir.join(name))?;
        std::io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}
