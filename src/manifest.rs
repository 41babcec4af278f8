//! Package descriptor generation.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::install::BinaryMap;
use crate::layout::{BIN_DIR, LIB_DIR};

/// Overlay the executable map and the package file list onto `base`.
///
/// Keys keep the base metadata's order. `bin` and `files` replace base
/// values in place, or are appended when the base lacks them.
pub fn generate_manifest(base: &Map<String, Value>, binaries: &BinaryMap) -> Map<String, Value> {
    let mut manifest = base.clone();
    manifest.insert("bin".to_string(), binaries.to_json());
    manifest.insert(
        "files".to_string(),
        Value::Array(vec![BIN_DIR.into(), LIB_DIR.into()]),
    );
    manifest
}

/// Write `manifest` as pretty-printed JSON with a trailing newline.
pub fn write_manifest(path: &Path, manifest: &Map<String, Value>) -> Result<()> {
    let mut json = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    json.push('\n');
    fs::write(path, json)
        .with_context(|| format!("Failed to write manifest: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::ExecutableEntry;
    use serde_json::json;
    use tempfile::TempDir;

    fn base() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "name": "arkts-cli",
            "version": "1.0.0",
            "bin": "stale",
            "license": "Apache-2.0"
        }) else {
            unreachable!()
        };
        map
    }

    fn binaries() -> BinaryMap {
        let mut map = BinaryMap::default();
        for name in ["es2abc", "ark_js_vm"] {
            map.insert(ExecutableEntry {
                name: name.to_string(),
                entry_point: format!("./bin/{name}"),
            });
        }
        map
    }

    #[test]
    fn test_overlay_keeps_base_order() {
        let manifest = generate_manifest(&base(), &binaries());

        let keys: Vec<_> = manifest.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "version", "bin", "license", "files"]);
        assert_eq!(
            manifest["bin"],
            json!({ "es2abc": "./bin/es2abc", "ark_js_vm": "./bin/ark_js_vm" })
        );
        assert_eq!(manifest["files"], json!(["bin", "lib"]));
    }

    #[test]
    fn test_empty_binary_map() {
        let manifest = generate_manifest(&Map::new(), &BinaryMap::default());
        assert_eq!(Value::Object(manifest), json!({ "bin": {}, "files": ["bin", "lib"] }));
    }

    #[test]
    fn test_write_manifest_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        let mut base = Map::new();
        base.insert("name".to_string(), json!("demo"));

        write_manifest(&path, &generate_manifest(&base, &binaries())).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"name\": \"demo\",\n  \"bin\": {\n    \"es2abc\": \"./bin/es2abc\",\n    \"ark_js_vm\": \"./bin/ark_js_vm\"\n  },\n  \"files\": [\n    \"bin\",\n    \"lib\"\n  ]\n}\n"
        );
    }

    #[test]
    fn test_write_manifest_failure_is_error() {
        let temp = TempDir::new().unwrap();
        let result = write_manifest(&temp.path().join("missing/package.json"), &Map::new());
        assert!(result.is_err());
    }
}
