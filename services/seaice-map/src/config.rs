//! Configuration for the map service.
//!
//! Loaded from a YAML file or, without one, from `SEAICE_*` environment
//! variables over built-in defaults. YAML values may reference environment
//! variables with `${VAR}` or `${VAR:-default}`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid_processor::PipelineConfig;
use ingestion::ReferencePaths;
use renderer::RenderOptions;
use serde::{Deserialize, Serialize};

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reference: ReferencePaths,
    pub archive: ArchiveConfig,
    pub cache: CacheConfig,
    pub reader: ReaderConfig,
    pub pipeline: PipelineConfig,
    pub render: RenderOptions,
}

/// Where daily products come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Local mirror laid out like the remote archive.
    pub root: PathBuf,
    /// HTTP(S) mirror; when set it is used instead of `root`.
    pub http_url: Option<String>,
    /// Download target for `http_url`.
    pub download_dir: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/cs2smos"),
            http_url: None,
            download_dir: PathBuf::from("data/downloads"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub root: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: PathBuf::from("data/maps"),
        }
    }
}

/// How product files are decoded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Use this `ncdump` binary; unset picks the built-in default reader.
    pub ncdump: Option<PathBuf>,
    /// Variable holding the thickness field.
    pub variable: Option<String>,
}

impl AppConfig {
    /// Load a YAML file. Relative paths are resolved against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// Parse YAML content after environment variable expansion.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: Self = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `SEAICE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            pipeline: PipelineConfig::from_env(),
            ..Self::default()
        };

        if let Ok(dir) = std::env::var("SEAICE_REFERENCE_DIR") {
            config.reference = config.reference.relative_to(Path::new(&dir));
        }
        if let Ok(dir) = std::env::var("SEAICE_ARCHIVE_DIR") {
            config.archive.root = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("SEAICE_ARCHIVE_URL") {
            if !url.is_empty() {
                config.archive.http_url = Some(url);
            }
        }
        if let Ok(dir) = std::env::var("SEAICE_DOWNLOAD_DIR") {
            config.archive.download_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("SEAICE_CACHE_DIR") {
            config.cache.root = PathBuf::from(dir);
        }
        if let Ok(program) = std::env::var("SEAICE_NCDUMP") {
            config.reader.ncdump = Some(PathBuf::from(program));
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolve every relative path against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.reference = self.reference.relative_to(base);
        for path in [
            &mut self.archive.root,
            &mut self.archive.download_dir,
            &mut self.cache.root,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline
            .validate()
            .context("Invalid pipeline configuration")?;
        self.render
            .validate()
            .map_err(|e| anyhow::anyhow!("render: {}", e))?;
        if let Some(url) = &self.archive.http_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("archive.http_url must be an http(s) URL, got {}", url);
            }
        }
        Ok(())
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
