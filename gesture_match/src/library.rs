//! Exemplar files on disk, and the [`Library`] that keeps them in step with
//! an [`ExemplarStore`].
//!
//! One file per exemplar, named `{gesture}_landmarks{n}.npy`.  Files hold the
//! raw 63-value frame as captured; normalization happens on load, so files
//! written by other tools (raw or already normalized) load the same way.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use hand_pose::{normalize, LandmarkFrame, PoseError};

use crate::exemplar::{Exemplar, ExemplarId, ExemplarStore};
use crate::npy::{self, CodecError};

const STEM_MARK: &str = "_landmarks";
const EXTENSION: &str = "npy";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, #[source] source: io::Error },

    #[error("{}: {source}", path.display())]
    Codec { path: PathBuf, #[source] source: CodecError },

    #[error("{}: {source}", path.display())]
    Pose { path: PathBuf, #[source] source: PoseError },

    #[error("no exemplar ids left for {gesture:?}")]
    IdExhausted { gesture: String },

    #[error("{}: exemplar number does not fit an id", path.display())]
    BadId { path: PathBuf },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io { path: path.to_path_buf(), source }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// File naming
// ════════════════════════════════════════════════════════════════════════════

/// How a directory entry relates to one gesture's exemplars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMatch {
    /// Not an exemplar file of this gesture.
    Other,
    Exemplar(ExemplarId),
    /// Named like an exemplar, but the number overflows an id.
    BadId,
}

/// Classify `file_name` against `gesture`'s naming scheme.
pub fn match_file_name(file_name: &str, gesture: &str) -> FileMatch {
    let Some(rest) = file_name.strip_prefix(gesture).and_then(|r| r.strip_prefix(STEM_MARK)) else {
        return FileMatch::Other;
    };
    let (digits, ext) = match rest.split_once('.') {
        Some((d, e)) => (d, Some(e)),
        None         => (rest, None),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return FileMatch::Other;
    }
    match ext {
        None | Some(EXTENSION) => digits.parse().map_or(FileMatch::BadId, FileMatch::Exemplar),
        Some(_) => FileMatch::Other,
    }
}

/// `rock_landmarks12.npy` → 12 for gesture `rock`.  A missing extension is
/// accepted (raw records); any other extension is not.
pub fn parse_file_name(file_name: &str, gesture: &str) -> Option<ExemplarId> {
    match match_file_name(file_name, gesture) {
        FileMatch::Exemplar(id) => Some(id),
        FileMatch::Other | FileMatch::BadId => None,
    }
}

pub fn file_name(gesture: &str, id: ExemplarId) -> String {
    format!("{}{}{}.{}", gesture, STEM_MARK, id, EXTENSION)
}

// ════════════════════════════════════════════════════════════════════════════
// ExemplarDir
// ════════════════════════════════════════════════════════════════════════════

/// Result of [`ExemplarDir::scan`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scan {
    pub files:   Vec<(ExemplarId, PathBuf)>,
    pub bad_ids: Vec<PathBuf>,
}

/// A directory of exemplar files.  Nothing is cached; every call hits the
/// filesystem.
#[derive(Clone, Debug)]
pub struct ExemplarDir {
    root: PathBuf,
}

impl ExemplarDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ExemplarDir { root: root.into() }
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn path_for(&self, gesture: &str, id: ExemplarId) -> PathBuf {
        self.root.join(file_name(gesture, id))
    }

    /// Every file named as an exemplar of `gesture`: usable ones by ascending
    /// id, and those whose number overflows an id.  A missing directory scans
    /// as empty.
    pub fn scan(&self, gesture: &str) -> Result<Scan, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Scan::default()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };
        let mut scan = Scan::default();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            match match_file_name(name, gesture) {
                FileMatch::Exemplar(id) => scan.files.push((id, entry.path())),
                FileMatch::BadId        => scan.bad_ids.push(entry.path()),
                FileMatch::Other        => {}
            }
        }
        scan.files.sort_by_key(|(id, _)| *id);
        scan.bad_ids.sort();
        Ok(scan)
    }

    /// `(id, path)` of every exemplar file for `gesture`, by ascending id.
    /// Files with an unusable number are logged and left out.
    pub fn list(&self, gesture: &str) -> Result<Vec<(ExemplarId, PathBuf)>, StoreError> {
        let scan = self.scan(gesture)?;
        for path in &scan.bad_ids {
            warn!(path = %path.display(), "exemplar number out of range, ignoring");
        }
        Ok(scan.files)
    }

    /// One more than the largest id on disk for `gesture`, or 1.
    pub fn next_id(&self, gesture: &str) -> Result<ExemplarId, StoreError> {
        match self.list(gesture)?.last() {
            Some((id, _)) => id.checked_add(1)
                .ok_or_else(|| StoreError::IdExhausted { gesture: gesture.to_string() }),
            None => Ok(1),
        }
    }

    pub fn read(&self, path: &Path) -> Result<LandmarkFrame, StoreError> {
        let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
        let values = npy::decode(&bytes)
            .map_err(|source| StoreError::Codec { path: path.to_path_buf(), source })?;
        LandmarkFrame::from_flat(&values)
            .map_err(|source| StoreError::Pose { path: path.to_path_buf(), source })
    }

    /// Write `frame` as the next exemplar of `gesture`.  Never overwrites an
    /// existing file.
    pub fn save(&self, gesture: &str, frame: &LandmarkFrame) -> Result<(ExemplarId, PathBuf), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let id = self.next_id(gesture)?;
        let path = self.path_for(gesture, id);
        let mut f = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        f.write_all(&npy::encode(&frame.to_flat()))
            .map_err(|e| StoreError::io(&path, e))?;
        Ok((id, path))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Library
// ════════════════════════════════════════════════════════════════════════════

/// An [`ExemplarStore`] loaded from, and appended through, an [`ExemplarDir`].
#[derive(Clone, Debug)]
pub struct Library {
    dir:     ExemplarDir,
    store:   ExemplarStore,
    skipped: usize,
}

impl Library {
    /// Load every exemplar of every name in `gestures`.  Unreadable or corrupt
    /// files are logged and skipped; only a failure to list the directory is
    /// an error.
    pub fn open<I, S>(root: impl Into<PathBuf>, gestures: I) -> Result<Library, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dir = ExemplarDir::new(root);
        let mut store = ExemplarStore::new(gestures);
        let mut skipped = 0;

        let names: Vec<String> = store.gesture_names().map(str::to_string).collect();
        for gesture in &names {
            let scan = dir.scan(gesture)?;
            for path in scan.bad_ids {
                let e = StoreError::BadId { path };
                warn!(error = %e, "skipping exemplar");
                skipped += 1;
            }
            for (id, path) in scan.files {
                match dir.read(&path) {
                    Ok(frame) => {
                        store.insert(Exemplar::new(gesture.as_str(), id, normalize(&frame)));
                    }
                    Err(e) => {
                        warn!(error = %e, "skipping exemplar");
                        skipped += 1;
                    }
                }
            }
        }

        info!(
            root = %dir.root().display(),
            gestures = names.len(),
            exemplars = store.len(),
            skipped,
            "exemplar library loaded"
        );
        Ok(Library { dir, store, skipped })
    }

    pub fn store(&self)   -> &ExemplarStore { &self.store }
    pub fn dir(&self)     -> &ExemplarDir   { &self.dir }
    /// Files skipped by the last load.
    pub fn skipped(&self) -> usize          { self.skipped }

    /// Persist `frame` under `gesture` and add it to the store with the same
    /// id, so it takes part in the next classification.
    pub fn capture(&mut self, gesture: &str, frame: &LandmarkFrame) -> Result<&Exemplar, StoreError> {
        let (id, path) = self.dir.save(gesture, frame)?;
        info!(gesture, id, path = %path.display(), "exemplar captured");
        Ok(self.store.insert(Exemplar::new(gesture, id, normalize(frame))))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
