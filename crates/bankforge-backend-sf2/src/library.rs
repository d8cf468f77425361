//! Sample directory lookup and caching.
//!
//! Waveform references are resolved to files by a zero-padded two-digit
//! prefix (`00_kick.wav`, `07-snare.wav`, `112.wav`). Each reference is loaded
//! at most once; the loaded sample is shared by every region that uses it.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::sample::{load_wave_sample, WaveSample};

/// File extension of sample files.
pub const SAMPLE_EXTENSION: &str = "wav";

/// Why a waveform reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No file in the directory carries the reference's number.
    #[error("no sample file for waveform {0}")]
    NotFound(u16),

    /// A file matched but could not be loaded.
    #[error("{0}")]
    Unreadable(String),
}

/// Samples of one directory, loaded on demand.
#[derive(Debug)]
pub struct SampleLibrary {
    dir: PathBuf,
    /// Candidate files, sorted by file name.
    files: Vec<PathBuf>,
    resolved: HashMap<u16, Result<usize, ResolveError>>,
    /// Loaded samples in first-load order.
    samples: Vec<Rc<WaveSample>>,
}

impl SampleLibrary {
    /// Index the WAV files of a directory.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_wav = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SAMPLE_EXTENSION));
            if is_wav && path.is_file() {
                files.push(path);
            }
        }
        // Directory order is platform dependent; the first match by name wins.
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
            resolved: HashMap::new(),
            samples: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that a waveform reference maps to.
    pub fn find_file(&self, id: u16) -> Option<&Path> {
        self.files
            .iter()
            .find(|path| matches_prefix(path, id))
            .map(PathBuf::as_path)
    }

    /// Resolve a waveform reference to its emission index and sample.
    ///
    /// Results, including failures, are cached per reference.
    pub fn resolve(&mut self, id: u16) -> Result<(u16, Rc<WaveSample>), ResolveError> {
        if let Some(cached) = self.resolved.get(&id) {
            return cached
                .clone()
                .map(|index| (index as u16, Rc::clone(&self.samples[index])));
        }

        let outcome = match self.find_file(id) {
            None => Err(ResolveError::NotFound(id)),
            Some(path) => load_wave_sample(path, id)
                .map_err(|e| ResolveError::Unreadable(e.to_string())),
        };
        let outcome = outcome.map(|sample| {
            self.samples.push(Rc::new(sample));
            self.samples.len() - 1
        });
        self.resolved.insert(id, outcome.clone());

        outcome.map(|index| (index as u16, Rc::clone(&self.samples[index])))
    }

    /// Loaded samples in emission order.
    pub fn samples(&self) -> &[Rc<WaveSample>] {
        &self.samples
    }
}

/// Whether a file name starts with `{id:02}` followed by a non-digit.
fn matches_prefix(path: &Path, id: u16) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let prefix = format!("{:02}", id);
    match name.strip_prefix(prefix.as_str()) {
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_prefix() {
        assert!(matches_prefix(Path::new("00_kick.wav"), 0));
        assert!(matches_prefix(Path::new("07-snare.wav"), 7));
        assert!(matches_prefix(Path::new("112.wav"), 112));
        assert!(!matches_prefix(Path::new("7_hat.wav"), 7));
        assert!(!matches_prefix(Path::new("071.wav"), 7));
        assert!(!matches_prefix(Path::new("kick.wav"), 0));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SampleLibrary::open(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_unresolved_reference_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let mut library = SampleLibrary::open(dir.path()).unwrap();

        assert_eq!(library.resolve(4).unwrap_err(), ResolveError::NotFound(4));
        assert_eq!(library.resolve(4).unwrap_err(), ResolveError::NotFound(4));
        assert!(library.samples().is_empty());
    }

    #[test]
    fn test_unreadable_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("02_bad.wav"), b"not a wav").unwrap();
        let mut library = SampleLibrary::open(dir.path()).unwrap();

        assert!(matches!(library.resolve(2), Err(ResolveError::Unreadable(_))));
        assert!(library.find_file(2).is_some());
    }
}
