use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::Local;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{timestamp, FlatItem, FlattenMetadata, HoodDocument, Source};
use crate::store::{json_stem, write_atomically};
use crate::{info_time, Error, Result};

const METADATA_SUFFIX: &str = "_metadata.json.gz";
const CHUNK_INFIX: &str = "_chunk_";
const CHUNK_SUFFIX: &str = ".json.gz";

/// Output base for a requested output path: a trailing `.json` is dropped.
pub fn output_base(output: &Path) -> PathBuf {
    match output.extension() {
        Some(ext) if ext == "json" => output.with_extension(""),
        _ => output.to_path_buf(),
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

pub fn metadata_path(base: &Path) -> PathBuf {
    with_suffix(base, METADATA_SUFFIX)
}

pub fn chunk_path(base: &Path, idx: usize) -> PathBuf {
    with_suffix(base, &format!("{CHUNK_INFIX}{idx}{CHUNK_SUFFIX}"))
}

/// Projects a hood document onto flat items: hood cards first, then every burb's cards.
pub fn flatten_hood(hood: &str, doc: &HoodDocument) -> Vec<FlatItem> {
    let hood_items = doc.cards.iter().map(|card| {
        let source = Source::Hood {
            hood: hood.to_string(),
        };
        FlatItem::new(card, source)
    });
    let burb_items = doc.burbs.iter().flat_map(|burb| {
        burb.cards.iter().map(|card| {
            let source = Source::Burb {
                hood: hood.to_string(),
                burb: burb.name.clone(),
            };
            FlatItem::new(card, source)
        })
    });
    hood_items.chain(burb_items).collect()
}

/// Reads every `*.json` hood document in `input_dir` and writes
/// `<base>_metadata.json.gz` plus `<base>_chunk_<i>.json.gz` files of at most `chunk_size` items.
///
/// Documents that can't be read are logged and left out entirely. Files are visited in
/// file name order and the hood name is the file stem.
pub fn flatten(input_dir: &Path, output: &Path, chunk_size: usize) -> Result<FlattenMetadata> {
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize(chunk_size));
    }
    let start_time = Local::now();

    let mut paths = fs::read_dir(input_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    let mut items = Vec::new();
    let mut hoods = BTreeSet::new();
    for path in paths {
        let Some(hood) = json_stem(&path) else {
            continue;
        };
        tracing::info!(path = %path.display(), "processing");
        match read_hood(&path) {
            Ok(doc) => {
                items.extend(flatten_hood(&hood, &doc));
                hoods.insert(hood);
            }
            Err(e) => tracing::error!(path = %path.display(), error = %e, "error processing hood file"),
        }
    }

    let chunks = items.chunks(chunk_size).collect::<Vec<_>>();
    let metadata = FlattenMetadata {
        total_pages: items.len(),
        total_hoods: hoods.len(),
        hoods: hoods.into_iter().collect(),
        generated_at: timestamp(),
        chunks: chunks.len(),
    };

    let base = output_base(output);
    for (idx, chunk) in chunks.iter().enumerate() {
        let path = chunk_path(&base, idx);
        write_gzip_json(&path, chunk)?;
        tracing::info!(path = %path.display(), "saved chunk {}/{}", idx + 1, chunks.len());
    }

    // Metadata goes last: its presence marks a complete set of chunks.
    let meta_path = metadata_path(&base);
    write_gzip_json(&meta_path, &metadata)?;
    tracing::info!(path = %meta_path.display(), "saved metadata");
    remove_stale_chunks(&base, chunks.len())?;

    info_time!(
        start_time,
        "Flattened {} pages from {} hoods into {} chunks",
        metadata.total_pages,
        metadata.total_hoods,
        metadata.chunks
    );
    Ok(metadata)
}

fn read_hood(path: &Path) -> Result<HoodDocument> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Compact JSON, gzip compressed on the way to disk.
fn write_gzip_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomically(path, |w| {
        let mut encoder = GzEncoder::new(w, Compression::default());
        serde_json::to_writer(&mut encoder, value)?;
        encoder.finish()?;
        Ok(())
    })
}

/// Reads a gzip compressed JSON file as written by [`flatten`].
pub fn read_gzip_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(GzDecoder::new(BufReader::new(file)))?)
}

/// Deletes chunk files of an earlier, larger run that share this base.
fn remove_stale_chunks(base: &Path, chunks: usize) -> Result<()> {
    let dir = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(prefix) = base.file_name().and_then(|n| n.to_str()) else {
        return Ok(());
    };
    let prefix = format!("{prefix}{CHUNK_INFIX}");

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let idx = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(&prefix))
            .and_then(|n| n.strip_suffix(CHUNK_SUFFIX))
            .and_then(|n| n.parse::<usize>().ok());
        if matches!(idx, Some(idx) if idx >= chunks) {
            tracing::info!(path = %path.display(), "removing stale chunk");
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
