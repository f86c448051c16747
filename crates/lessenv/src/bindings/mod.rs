//! Engine-agnostic host bindings facade for registering functions and
//! properties on the JavaScript global object.
//!
//! This module defines a small set of value types and traits that allow the
//! LESS environment to be installed into any JavaScript engine adapter without
//! depending on engine-specific APIs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

mod values;
pub use values::{JSError, JSValue, LogLevel};
mod logger;
pub use logger::HostLogger;

mod browser;
mod encode;
mod native;
mod net;
mod source_map;
pub use browser::{build_document_namespace, build_location_namespace, build_window_namespace};
pub use encode::{build_encode_namespace, encode_base64};
pub use native::{build_native_globals, native_print, native_quit, native_read_file, native_read_url};
pub use source_map::{write_source_map, write_source_map_fn};

/// Execution context passed to host callbacks.
#[derive(Clone)]
pub struct HostContext {
    /// Logger used by host functions such as the native `print`.
    pub logger: Arc<dyn HostLogger>,
    /// Destination for `writeSourceMap`; `None` turns it into a no-op.
    pub source_map_url: Option<PathBuf>,
    /// Exit code recorded by the native `quit`, if it was ever called.
    pub quit_code: Arc<Mutex<Option<i32>>>,
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("source_map_url", &self.source_map_url)
            .field("quit_code", &self.quit_code)
            .finish_non_exhaustive()
    }
}

impl HostContext {
    /// Create a context with the given logger and no source-map destination.
    pub fn new(logger: Arc<dyn HostLogger>) -> Self {
        Self {
            logger,
            source_map_url: None,
            quit_code: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the source-map destination.
    #[must_use]
    pub fn with_source_map_url(mut self, url: Option<PathBuf>) -> Self {
        self.source_map_url = url;
        self
    }

    /// The exit code requested through the native `quit`, if any.
    pub fn quit_requested(&self) -> Option<i32> {
        *self.quit_code.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A synchronous host function signature.
pub type HostFnSync =
    dyn Fn(&HostContext, Vec<JSValue>) -> Result<JSValue, JSError> + Send + Sync + 'static;

/// A single function descriptor the engine adapter can install.
#[derive(Clone)]
pub enum HostFnKind {
    /// Synchronous function.
    Sync(Arc<HostFnSync>),
}

impl HostFnKind {
    /// Invoke the function directly, bypassing any engine.
    ///
    /// # Errors
    /// Propagates the error returned by the host function.
    pub fn call(&self, context: &HostContext, args: Vec<JSValue>) -> Result<JSValue, JSError> {
        let HostFnKind::Sync(function) = self;
        function(context, args)
    }
}

/// A namespaced set of functions, properties and nested objects
/// (for example, the `lessenv` record or `window.less`).
pub struct HostNamespace {
    /// Functions to install under this namespace.
    pub functions: BTreeMap<String, HostFnKind>,
    /// Constant properties to install under this namespace.
    pub properties: BTreeMap<String, JSValue>,
    /// Nested objects. The same `Arc` under two keys installs as one shared object.
    pub objects: BTreeMap<String, Arc<HostNamespace>>,
    /// Properties whose value is the result of evaluating a guest expression,
    /// assigned after the namespace is installed.
    pub expressions: BTreeMap<String, String>,
}

impl HostNamespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
            properties: BTreeMap::new(),
            objects: BTreeMap::new(),
            expressions: BTreeMap::new(),
        }
    }

    /// Register a synchronous function, replacing any earlier one of that name.
    pub fn with_sync_fn(mut self, name: &str, function: Arc<HostFnSync>) -> Self {
        self.functions
            .insert(name.to_string(), HostFnKind::Sync(function));
        self
    }

    /// Register a constant property.
    pub fn with_property(mut self, name: &str, value: JSValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Register a nested object.
    pub fn with_object(mut self, name: &str, object: Arc<HostNamespace>) -> Self {
        self.objects.insert(name.to_string(), object);
        self
    }

    /// Register a property resolved by evaluating `expression` in the guest.
    pub fn with_expression(mut self, name: &str, expression: &str) -> Self {
        self.expressions
            .insert(name.to_string(), expression.to_string());
        self
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&HostFnKind> {
        self.functions.get(name)
    }

    /// Look up a nested object by name.
    pub fn object(&self, name: &str) -> Option<&Arc<HostNamespace>> {
        self.objects.get(name)
    }

    /// Whether nothing at all is registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.properties.is_empty()
            && self.objects.is_empty()
            && self.expressions.is_empty()
    }
}

impl Default for HostNamespace {
    fn default() -> Self {
        Self::new()
    }
}

/// A collection of bindings to be installed on the global object.
pub struct HostBindings {
    /// Functions and properties installed directly on the global object.
    pub globals: HostNamespace,
    /// Mapping from global name to the object installed under it.
    pub namespaces: BTreeMap<String, Arc<HostNamespace>>,
}

impl HostBindings {
    /// Create empty bindings.
    pub fn new() -> Self {
        Self {
            globals: HostNamespace::new(),
            namespaces: BTreeMap::new(),
        }
    }

    /// Add or replace a namespace.
    pub fn with_namespace(mut self, name: &str, namespace: Arc<HostNamespace>) -> Self {
        self.namespaces.insert(name.to_string(), namespace);
        self
    }

    /// Replace the set of global functions and properties.
    pub fn with_globals(mut self, globals: HostNamespace) -> Self {
        self.globals = globals;
        self
    }

    /// Look up a namespace by name.
    pub fn namespace(&self, name: &str) -> Option<&Arc<HostNamespace>> {
        self.namespaces.get(name)
    }
}

impl Default for HostBindings {
    fn default() -> Self {
        Self::new()
    }
}

/// A host function that ignores its arguments and returns `undefined`.
pub fn noop_fn() -> Arc<HostFnSync> {
    Arc::new(|_context: &HostContext, _args: Vec<JSValue>| -> Result<JSValue, JSError> {
        Ok(JSValue::Undefined)
    })
}

/// A host function that ignores its arguments and returns a fixed value.
pub fn constant_fn(value: JSValue) -> Arc<HostFnSync> {
    Arc::new(
        move |_context: &HostContext, _args: Vec<JSValue>| -> Result<JSValue, JSError> {
            Ok(value.clone())
        },
    )
}

/// Join arguments the way `print` and `console.log` render them.
pub fn stringify_arguments(arguments: Vec<JSValue>) -> String {
    arguments
        .into_iter()
        .map(stringify_value)
        .collect::<Vec<_>>()
        .join(" ")
}

fn stringify_value(value: JSValue) -> String {
    match value {
        JSValue::Undefined => String::from("undefined"),
        JSValue::Null => String::from("null"),
        JSValue::Boolean(value) => value.to_string(),
        JSValue::Number(value) => number_to_js_string(value),
        JSValue::String(value) => value,
        JSValue::Array(values) => values
            .into_iter()
            .map(stringify_value)
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// Render a number the way JavaScript's `String(number)` does.
pub(crate) fn number_to_js_string(value: f64) -> String {
    if value.is_nan() {
        return String::from("NaN");
    }
    if value.is_infinite() {
        return String::from(if value.is_sign_positive() { "Infinity" } else { "-Infinity" });
    }
    if value == 0.0 {
        return String::from("0");
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }
    // Exponent form: shortest mantissa, explicit exponent sign.
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if exponent.starts_with('-') => format!("{mantissa}e{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}e+{exponent}"),
        None => formatted,
    }
}

/// Read the first argument as a string, failing with a `TypeError` naming the caller.
pub(crate) fn string_arg(args: &[JSValue], function_name: &str) -> Result<String, JSError> {
    match args.first() {
        Some(JSValue::String(value)) => Ok(value.clone()),
        _ => Err(JSError::TypeError(format!(
            "{function_name} requires a string argument"
        ))),
    }
}
