//! Compile options for the LESS environment.
//!
//! The options are exposed to the guest compiler as globals and also carry the
//! process-wide source-map destination consulted by `lessenv.writeSourceMap`.
//! They can be built programmatically, read from environment variables, or
//! deserialised from JSON.

use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default charset used when none is configured.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Default optimization level passed to the LESS parser.
pub const DEFAULT_OPTIMIZATION: i32 = 1;

/// Options handed to the guest LESS compiler.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LessOptions {
    /// Charset used for `@charset` handling.
    pub charset: String,
    /// Whether `.css` imports are treated as LESS.
    pub css: bool,
    /// Debug line number mode (`comments`, `mediaquery` or `all`).
    pub line_numbers: Option<String>,
    /// Parser optimization level.
    pub optimization: i32,
    /// Whether source maps are generated.
    pub source_map: bool,
    /// Root path prepended to source-map sources.
    pub source_map_rootpath: Option<String>,
    /// Base path stripped from source-map sources.
    pub source_map_basepath: Option<String>,
    /// Destination `writeSourceMap` writes to; `None` disables writing.
    #[serde(rename = "sourceMapURL")]
    pub source_map_url: Option<String>,
    /// Extra include paths for `@import` resolution.
    pub paths: Option<Vec<String>>,
}

impl Default for LessOptions {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_owned(),
            css: false,
            line_numbers: None,
            optimization: DEFAULT_OPTIMIZATION,
            source_map: false,
            source_map_rootpath: None,
            source_map_basepath: None,
            source_map_url: None,
            paths: None,
        }
    }
}

impl LessOptions {
    /// Load options from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `LESSENV_CHARSET`: charset (default: `UTF-8`)
    /// - `LESSENV_CSS`: set to "1" to treat `.css` imports as LESS
    /// - `LESSENV_LINE_NUMBERS`: debug line number mode
    /// - `LESSENV_OPTIMIZATION`: optimization level (default: 1)
    /// - `LESSENV_SOURCE_MAP`: set to "1" to generate source maps
    /// - `LESSENV_SOURCE_MAP_ROOTPATH`, `LESSENV_SOURCE_MAP_BASEPATH`
    /// - `LESSENV_SOURCE_MAP_URL`: where `writeSourceMap` writes
    /// - `LESSENV_PATHS`: include paths, separated like `PATH`
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|val| !val.is_empty());
        let charset = non_empty("LESSENV_CHARSET").unwrap_or_else(|| DEFAULT_CHARSET.to_owned());
        let optimization = env::var("LESSENV_OPTIMIZATION")
            .ok()
            .and_then(|val| val.parse::<i32>().ok())
            .unwrap_or(DEFAULT_OPTIMIZATION);
        let paths = env::var_os("LESSENV_PATHS").map(|raw| {
            env::split_paths(&raw)
                .map(|path| path.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        });
        Self {
            charset,
            css: env::var("LESSENV_CSS").ok().as_deref() == Some("1"),
            line_numbers: non_empty("LESSENV_LINE_NUMBERS"),
            optimization,
            source_map: env::var("LESSENV_SOURCE_MAP").ok().as_deref() == Some("1"),
            source_map_rootpath: non_empty("LESSENV_SOURCE_MAP_ROOTPATH"),
            source_map_basepath: non_empty("LESSENV_SOURCE_MAP_BASEPATH"),
            source_map_url: non_empty("LESSENV_SOURCE_MAP_URL"),
            paths,
        }
    }

    /// Parse options from a JSON document with camelCase keys.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON or has mistyped fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the source-map destination.
    #[must_use]
    pub fn with_source_map_url(mut self, url: impl Into<String>) -> Self {
        self.source_map_url = Some(url.into());
        self
    }

    /// The source-map destination as a filesystem path, when configured.
    #[inline]
    pub fn source_map_path(&self) -> Option<PathBuf> {
        self.source_map_url.as_deref().map(PathBuf::from)
    }
}
