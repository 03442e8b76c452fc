//! Packet artifact persistence
//!
//! Each run's packet is written under its date key so the static front-end
//! (and anyone debugging a run) can find it again. The write is atomic the
//! same way the rotation state write is: temp file, then rename. The module
//! also builds the study link the notification carries: the packet JSON is
//! base64- and URL-encoded into the front-end's `data` query parameter.

use base64::Engine;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{PacketArtifact, StudyPacket};

/// File-backed store for packet artifacts, one JSON file per run date
pub struct PacketStore {
    dir: PathBuf,
}

impl PacketStore {
    /// Create a store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the artifact for a run identifier
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Check whether an artifact exists for the identifier
    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).exists()
    }

    /// Persist an artifact atomically, overwriting any previous one
    pub fn save(&self, artifact: &PacketArtifact) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let filepath = self.path_for(&artifact.id);
        let temp_path = filepath.with_extension("json.tmp");

        let file = File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), artifact)?;
        fs::rename(&temp_path, &filepath)?;

        tracing::debug!(path = %filepath.display(), "Packet artifact saved");
        Ok(filepath)
    }

    /// Load the artifact for an identifier, if present
    pub fn load(&self, id: &str) -> Result<Option<PacketArtifact>> {
        let filepath = self.path_for(id);
        if !filepath.exists() {
            return Ok(None);
        }

        let file = File::open(&filepath)?;
        let artifact = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(artifact))
    }

    /// The store's root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Build the front-end link carrying the packet as a `data` query parameter
pub fn study_link(page_url: &str, packet: &StudyPacket) -> Result<String> {
    let json = serde_json::to_string(packet)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(json.as_bytes());
    let param = urlencoding::encode(&encoded);

    Ok(format!(
        "{}/index.html?data={param}",
        page_url.trim_end_matches('/')
    ))
}
