//! The compiler surface a host application calls.

use anyhow::{Context as _, Result};
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::Path;

/// Failure while loading or running the guest compiler.
#[derive(Debug)]
pub struct LessError {
    message: String,
    source: Option<anyhow::Error>,
}

impl LessError {
    /// An error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// An error wrapping its cause.
    pub fn with_source(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }

    /// The top-level message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for LessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.source {
            Some(source) => write!(f, "{}: {:#}", self.message, source),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for LessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| AsRef::<dyn Error + 'static>::as_ref(source))
    }
}

/// Compiles LESS source to CSS.
pub trait LessCompiler {
    /// Compile `input`, using `location` to resolve relative imports.
    /// `compress` asks for minified output.
    ///
    /// # Errors
    /// Returns an error if the guest compiler throws or returns a non-string.
    fn compile(&mut self, input: &str, location: &str, compress: bool) -> Result<String, LessError>;
}

/// A named guest script.
#[derive(Clone, Debug)]
pub struct ScriptSource {
    /// Name reported in stack traces.
    pub url: String,
    /// Script text.
    pub source: String,
}

impl ScriptSource {
    /// A script from an in-memory string.
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Read a script from disk; its path becomes its name.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Ok(Self::new(path.display().to_string(), source))
    }
}

/// The guest scripts that make up the compiler, in load order around the
/// environment install.
#[derive(Clone, Debug)]
pub struct CompilerScripts {
    /// Source-map library; evaluated before the environment is installed.
    pub source_map: ScriptSource,
    /// The LESS compiler itself.
    pub less: ScriptSource,
    /// CSS minifier.
    pub cssmin: ScriptSource,
    /// Glue defining the global `compile(input, location, compress)`.
    pub engine: ScriptSource,
}

impl CompilerScripts {
    /// Load the four scripts from a directory holding `source-map.js`,
    /// `less.js`, `cssmin.js` and `engine.js`.
    ///
    /// # Errors
    /// Returns an error if any of them cannot be read.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Ok(Self {
            source_map: ScriptSource::from_path(&dir.join("source-map.js"))?,
            less: ScriptSource::from_path(&dir.join("less.js"))?,
            cssmin: ScriptSource::from_path(&dir.join("cssmin.js"))?,
            engine: ScriptSource::from_path(&dir.join("engine.js"))?,
        })
    }
}
