//! Build configuration loading and validation.
//!
//! The configuration file mirrors the layout of the upstream build: a root,
//! an output directory under it, and the frontend/runtime/third-party
//! subpaths under that output directory. JSON and TOML are both accepted,
//! chosen by file extension.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Configuration file looked up in the current directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_PATCH_TOOL: &str = "patchelf";

/// How installed executables find their shared libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InstallStrategy {
    /// Copy into `bin/` and rewrite the ELF search path to `$ORIGIN/../lib`.
    #[default]
    Rpath,
    /// Hide the binary in `lib/` and launch it through a shell wrapper in `bin/`.
    Wrapper,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    ohos_root: String,
    out_dir_relative: String,
    frontend: String,
    runtime: String,
    #[serde(default)]
    thirdparty: Map<String, Value>,
    #[serde(default)]
    binaries: Vec<String>,
    npm_package: Map<String, Value>,
    dist_dir: Option<String>,
    patch_tool: Option<String>,
    #[serde(default)]
    strategy: InstallStrategy,
    wrapper_template: Option<String>,
}

/// Validated, immutable description of one packaging run.
///
/// Every stage of the pipeline reads from a shared reference to this value.
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    root: PathBuf,
    out_dir_relative: PathBuf,
    frontend: PathBuf,
    runtime: PathBuf,
    thirdparty: Vec<(String, PathBuf)>,
    binaries: Vec<String>,
    package: Map<String, Value>,
    dist_dir: PathBuf,
    patch_tool: PathBuf,
    strategy: InstallStrategy,
    wrapper_template: Option<PathBuf>,
}

impl BuildConfiguration {
    /// Load configuration from a `.json` or `.toml` file.
    ///
    /// Relative `ohosRoot`, `distDir` and `wrapperTemplate` values, and a
    /// `patchTool` with a directory part, resolve against the directory
    /// holding the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let parsed = if is_toml {
            Self::from_toml_str(&contents, base_dir)
        } else {
            Self::from_json_str(&contents, base_dir)
        };
        parsed.with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json).context("Failed to parse JSON config")?;
        Self::from_raw(raw, base_dir)
    }

    /// Parse a TOML configuration document.
    pub fn from_toml_str(toml_str: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(toml_str).context("Failed to parse TOML config")?;
        Self::from_raw(raw, base_dir)
    }

    fn from_raw(raw: RawConfig, base_dir: &Path) -> Result<Self> {
        let mut thirdparty = Vec::with_capacity(raw.thirdparty.len());
        for (name, value) in raw.thirdparty {
            let Some(rel) = value.as_str() else {
                bail!("thirdparty.{name} must be a string path, got {value}");
            };
            let path = parse_relative_path(rel, &format!("thirdparty.{name}"))?;
            thirdparty.push((name, path));
        }

        let mut seen = HashSet::new();
        let mut binaries = Vec::with_capacity(raw.binaries.len());
        for name in raw.binaries {
            validate_binary_name(&name)?;
            if seen.insert(name.clone()) {
                binaries.push(name);
            } else {
                debug!("Ignoring duplicate binary entry: {}", name);
            }
        }

        Ok(Self {
            root: resolve_path(base_dir, &raw.ohos_root),
            out_dir_relative: parse_relative_path(&raw.out_dir_relative, "outDirRelative")?,
            frontend: parse_relative_path(&raw.frontend, "frontend")?,
            runtime: parse_relative_path(&raw.runtime, "runtime")?,
            thirdparty,
            binaries,
            package: raw.npm_package,
            dist_dir: resolve_path(base_dir, raw.dist_dir.as_deref().unwrap_or(DEFAULT_DIST_DIR)),
            patch_tool: resolve_tool(
                base_dir,
                raw.patch_tool.as_deref().unwrap_or(DEFAULT_PATCH_TOOL),
            ),
            strategy: raw.strategy,
            wrapper_template: raw
                .wrapper_template
                .as_deref()
                .map(|p| resolve_path(base_dir, p)),
        })
    }

    /// Override the destination root.
    #[must_use]
    pub fn with_dist_dir(mut self, dist_dir: PathBuf) -> Self {
        self.dist_dir = dist_dir;
        self
    }

    /// Override the install strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: InstallStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Override the search-path rewriting tool.
    #[must_use]
    pub fn with_patch_tool(mut self, tool: PathBuf) -> Self {
        self.patch_tool = tool;
        self
    }

    /// Upstream output directory: `<root>/<outDirRelative>`.
    pub fn build_out_dir(&self) -> PathBuf {
        self.root.join(&self.out_dir_relative)
    }

    pub fn frontend_dir(&self) -> PathBuf {
        self.build_out_dir().join(&self.frontend)
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.build_out_dir().join(&self.runtime)
    }

    /// Third-party library directories in declaration order.
    pub fn thirdparty_dirs(&self) -> Vec<(&str, PathBuf)> {
        let out = self.build_out_dir();
        self.thirdparty
            .iter()
            .map(|(name, rel)| (name.as_str(), out.join(rel)))
            .collect()
    }

    /// Declared executable names, duplicates removed, first occurrence kept.
    pub fn binaries(&self) -> &[String] {
        &self.binaries
    }

    /// Base manifest metadata in declaration order.
    pub fn package_metadata(&self) -> &Map<String, Value> {
        &self.package
    }

    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    pub fn patch_tool(&self) -> &Path {
        &self.patch_tool
    }

    pub fn strategy(&self) -> InstallStrategy {
        self.strategy
    }

    pub fn wrapper_template(&self) -> Option<&Path> {
        self.wrapper_template.as_deref()
    }
}

fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    }
}

/// Bare tool names stay as they are for a `PATH` lookup; anything with a
/// directory part resolves like the other configured paths.
fn resolve_tool(base_dir: &Path, tool: &str) -> PathBuf {
    if Path::new(tool).components().count() > 1 {
        resolve_path(base_dir, tool)
    } else {
        PathBuf::from(tool)
    }
}

/// Relative subpaths are joined onto the build root, so they may not escape it.
fn parse_relative_path(raw: &str, field: &str) -> Result<PathBuf> {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        bail!("{field} must be relative, got absolute path '{raw}'");
    }
    for component in candidate.components() {
        if matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            bail!("{field} contains invalid traversal/root component in '{raw}'");
        }
    }
    Ok(candidate.to_path_buf())
}

fn validate_binary_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        bail!("binaries entry '{name}' must be a plain file name");
    }
    Ok(())
}
