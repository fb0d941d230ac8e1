use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// List files in `dir` with the given extension, sorted by path.
///
/// Sorting is plain lexicographic, which orders the zero-padded frame names
/// (`clip_frame_000030.jpg`) correctly. An empty result is not an error here;
/// callers decide whether "nothing to do" is a problem.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().map_or(false, |ext| ext == extension)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// File name portion of a path as an owned String, lossy for non-UTF-8.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir_all, File};

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let tmp_dir = std::env::temp_dir().join(format!(
            "framesift-file-utils-{}",
            std::process::id()
        ));
        create_dir_all(&tmp_dir).unwrap();

        for name in ["b_frame_000010.jpg", "a_frame_000000.jpg", "notes.txt"] {
            File::create(tmp_dir.join(name)).unwrap();
        }

        let files = list_files(&tmp_dir, "jpg").unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name_string(p)).collect();
        assert_eq!(names, vec!["a_frame_000000.jpg", "b_frame_000010.jpg"]);

        let _ = fs::remove_dir_all(&tmp_dir);
    }

    #[test]
    fn test_list_files_missing_dir_is_an_error() {
        let missing = std::env::temp_dir().join(format!(
            "framesift-file-utils-{}-missing",
            std::process::id()
        ));
        assert!(list_files(&missing, "jpg").is_err());
    }
}
