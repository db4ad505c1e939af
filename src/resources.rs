use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::debug;

pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "m4a", "mp3", "flac", "aac"];

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// List audio files in the resources directory, sorted by name.
pub fn discover_audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!(
            "Resources directory not found: {}",
            dir.display()
        ));
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow!("Failed to read resources directory {}: {}", dir.display(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_audio_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    debug!("Discovered {} audio files in {}", files.len(), dir.display());
    Ok(files)
}

/// Pick one discovered file by its bare file name.
pub fn select_named(files: &[PathBuf], name: &str) -> Option<PathBuf> {
    files
        .iter()
        .find(|path| path.file_name().and_then(|n| n.to_str()) == Some(name))
        .cloned()
}

/// Sample files carrying an `es_` or `ja_` language marker get a translation
/// pass in addition to transcription.
pub fn wants_translation(filename: &str) -> bool {
    filename.contains("es_") || filename.contains("ja_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn discovers_audio_files_sorted_by_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "zulu.wav");
        touch(dir.path(), "alpha.m4a");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "UPPER.WAV");

        let files = discover_audio_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["UPPER.WAV", "alpha.m4a", "zulu.wav"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_audio_files(&missing).unwrap_err();
        assert!(err.to_string().contains("Resources directory not found"));
    }

    #[test]
    fn select_named_finds_exact_file_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "jfk.wav");
        touch(dir.path(), "es_test_clip.wav");
        let files = discover_audio_files(dir.path()).unwrap();

        assert!(select_named(&files, "jfk.wav").is_some());
        assert!(select_named(&files, "missing.wav").is_none());
    }

    #[test]
    fn translation_marker_detection() {
        assert!(wants_translation("es_test_clip.wav"));
        assert!(wants_translation("ja_audio.m4a"));
        assert!(!wants_translation("jfk.wav"));
    }
}
