use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::model::HoodDocument;
use crate::Result;

/// Writes `path` through a temporary file in the same directory that is renamed into place
/// once `write` succeeded. Readers never observe a half written file.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(tmp);
    write(&mut writer)?;
    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Pretty printed JSON with non-ASCII characters written as is.
pub fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomically(path, |w| {
        serde_json::to_writer_pretty(&mut *w, value)?;
        Ok(())
    })
}

/// Directory of scraped hood documents, one `<hood>.json` per hood.
/// A hood counts as scraped as soon as its file exists.
#[derive(Debug, Clone)]
pub struct HoodStore {
    dir: PathBuf,
}

impl HoodStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, hood: &str) -> PathBuf {
        self.dir.join(format!("{hood}.json"))
    }

    /// Replaces whatever was stored for the hood before.
    pub fn save(&self, doc: &HoodDocument) -> Result<PathBuf> {
        let path = self.path_for(&doc.name);
        write_pretty_json(&path, doc)?;
        Ok(path)
    }

    pub fn load(&self, hood: &str) -> Result<HoodDocument> {
        let raw = fs::read_to_string(self.path_for(hood))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Names of every hood with a persisted document.
    pub fn scraped_hoods(&self) -> Result<BTreeSet<String>> {
        let mut hoods = BTreeSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if let Some(hood) = json_stem(&path) {
                hoods.insert(hood);
            }
        }
        Ok(hoods)
    }
}

/// File stem of a `*.json` file, `None` for anything else.
pub(crate) fn json_stem(path: &Path) -> Option<String> {
    if !path.is_file() || path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_owned)
}
