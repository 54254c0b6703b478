use derive_more::{Display, Error, From};
use rand::Rng;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::configuration::MediaConfiguration;

/// Directory under the media root that receives uploaded format files.
pub const UPLOAD_DIR: &str = "formats";
const SAMPLE_FILE: &str = "sample.pdf";

#[derive(Debug, Display, Error, From)]
pub enum Error {
    #[from(ignore)]
    #[display(fmt = "Sample PDF not found at {}", "_0.display()")]
    SampleMissing(#[error(not(source))] PathBuf),
    #[display(fmt = "IO: {}", _0)]
    Io(io::Error),
}

/// Files on local disk, published under a URL prefix.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(config: &MediaConfiguration) -> Self {
        MediaStore {
            root: config.root.clone(),
            url_prefix: config.url.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn sample_path(&self) -> PathBuf {
        self.root.join(SAMPLE_FILE)
    }

    pub fn ensure_sample(&self) -> Result<(), Error> {
        let path = self.sample_path();
        if path.is_file() {
            Ok(())
        } else {
            Err(Error::SampleMissing(path))
        }
    }

    /// Reads the whole sample file; the handle is closed before returning.
    pub fn read_sample(&self) -> Result<Vec<u8>, Error> {
        let path = self.sample_path();
        fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::SampleMissing(path),
            _ => Error::Io(err),
        })
    }

    /// Stores `bytes` as `formats/<file_name>` and returns the stored name.
    ///
    /// A taken name gets a random suffix before its extension, so existing
    /// uploads are never overwritten.
    pub fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, Error> {
        let upload_dir = self.root.join(UPLOAD_DIR);
        fs::create_dir_all(&upload_dir)?;
        let mut candidate = file_name.to_owned();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(upload_dir.join(&candidate))
            {
                Ok(file) => {
                    write_or_remove(file, &upload_dir.join(&candidate), bytes)?;
                    let stored_name = format!("{}/{}", UPLOAD_DIR, candidate);
                    info!(%stored_name, len_bytes = bytes.len(), "Stored media file.");
                    return Ok(stored_name);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = alternative_name(file_name);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Public URL path of a stored name, e.g. `/media/formats/sample_0.pdf`.
    pub fn url(&self, stored_name: &str) -> String {
        format!("{}{}", self.url_prefix, stored_name.trim_start_matches('/'))
    }
}

// A partly written upload is deleted so its name stays free.
fn write_or_remove<W: Write>(mut file: W, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let written = file.write_all(bytes).and_then(|()| file.flush());
    drop(file);
    if let Err(err) = written {
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(path = %path.display(), %remove_err, "Failed to remove partial upload.");
        }
        return Err(err);
    }
    Ok(())
}

fn alternative_name(file_name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            format!("{}_{}.{}", stem, suffix, extension)
        }
        _ => format!("{}_{}", file_name, suffix),
    }
}
