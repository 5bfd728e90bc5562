//! File helpers mapping I/O and JSON failures onto [`ToolError`].

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolError};

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ToolError::io(path, e))
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| ToolError::parse(path.display().to_string(), e))
}

/// Write `contents`, creating missing parent directories
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ToolError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| ToolError::io(path, e))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Write several files so that either all of them land or none do.
///
/// Each file is first written to a hidden sibling and only renamed into place
/// once every write succeeded; leftovers are removed on failure.
pub fn write_all(outputs: &[(&Path, &str)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(outputs.len());
    for (path, contents) in outputs {
        match stage(path, contents) {
            Ok(tmp) => staged.push((tmp, *path)),
            Err(e) => {
                discard(staged.iter().map(|(tmp, _)| tmp.as_path()));
                return Err(e);
            }
        }
    }

    for (index, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            discard(staged[index..].iter().map(|(tmp, _)| tmp.as_path()));
            return Err(ToolError::io(*path, e));
        }
        debug!("Wrote {}", path.display());
    }
    Ok(())
}

fn stage(path: &Path, contents: &str) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ToolError::validation("file name", path.display().to_string()))?;
    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    write_text(&tmp, contents)?;
    Ok(tmp)
}

fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

/// Serialize as two-space indented JSON and write it out
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut json = to_pretty_json(value)?;
    json.push('\n');
    write_text(path, &json)
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::parse("JSON output", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.json");

        write_json(&path, &json!({"b": 1, "a": "وظیفه"})).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"b\": 1,\n  \"a\": \"وظیفه\"\n}\n");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_to_string(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
    }

    #[test]
    fn test_write_all_places_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("out/map.json");
        let js_path = dir.path().join("map.js");

        write_all(&[(json_path.as_path(), "{}\n"), (js_path.as_path(), "const x = {};\n")]).unwrap();

        assert_eq!(fs::read_to_string(&json_path).unwrap(), "{}\n");
        assert_eq!(fs::read_to_string(&js_path).unwrap(), "const x = {};\n");
        assert!(!dir.path().join("out/.map.json.tmp").exists());
        assert!(!dir.path().join(".map.js.tmp").exists());
    }

    #[test]
    fn test_write_all_leaves_nothing_when_one_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "regular file").unwrap();
        let json_path = dir.path().join("map.json");
        let js_path = blocker.join("map.js");

        let err = write_all(&[(json_path.as_path(), "{}"), (js_path.as_path(), "x")]).unwrap_err();

        assert!(matches!(err, ToolError::Io { .. }));
        assert!(!json_path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, ToolError::Parse { .. }));
    }
}
