//! Engine-agnostic environment for running the LESS compiler inside an
//! embedded JavaScript engine.
//!
//! The compiler expects a handful of shell, Node and browser globals that a
//! bare engine does not provide. This crate describes them as host bindings
//! that any engine adapter can install.

use anyhow::Result;

pub mod console;
pub use console::{Console, ConsoleLogger};

/// Engine-agnostic host bindings facade: values, logger, and namespace builders.
pub mod bindings;
pub use bindings::{
    HostBindings, HostContext, HostFnKind, HostFnSync, HostLogger, HostNamespace, JSError,
    JSValue, LogLevel, encode_base64, stringify_arguments, write_source_map,
};

pub mod config;
pub use config::LessOptions;

pub mod environment;
pub use environment::{
    LessEnvironment, SOURCE_MAP_GENERATOR_EXPR, build_less_environment,
    build_less_environment_with_generator,
};

pub mod compiler;
pub use compiler::{CompilerScripts, LessCompiler, LessError, ScriptSource};

// ============================
// Engine-agnostic JS context trait
// ============================

/// A minimal interface for evaluating JavaScript in an embedded engine.
/// Keep this trait small so engines can be swapped.
pub trait JsEngine {
    /// Evaluate a classic script for its side effects.
    fn eval_script(&mut self, source: &str, url: &str) -> Result<()>;
    /// Evaluate a script and return its completion value.
    fn evaluate(&mut self, source: &str, url: &str) -> Result<JSValue>;
    /// Define (or overwrite) a property on the global object.
    fn define_global(&mut self, name: &str, value: JSValue) -> Result<()>;
    /// Call a function stored on the global object.
    fn call_global(&mut self, name: &str, args: Vec<JSValue>) -> Result<JSValue>;
}
