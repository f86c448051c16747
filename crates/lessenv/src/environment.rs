//! Bootstrap of the global environment the LESS compiler expects.
//!
//! [`build_less_environment`] returns the whole guest-visible surface as a
//! [`LessEnvironment`] record; an engine adapter then installs it into the
//! global object of its context. Nothing here touches ambient globals.

use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bindings::{
    build_document_namespace, build_encode_namespace, build_location_namespace,
    build_native_globals, build_window_namespace, constant_fn, noop_fn, write_source_map_fn,
    HostBindings, HostContext, HostLogger, HostNamespace, JSValue,
};
use crate::config::LessOptions;

/// Guest expression yielding the source-map generator constructor. The
/// source-map library must already be loaded when it is evaluated.
pub const SOURCE_MAP_GENERATOR_EXPR: &str =
    r#"require("source-map/source-map-generator").SourceMapGenerator"#;

/// Global names installed by the environment.
pub const GLOBAL_NAMES: [&str; 11] = [
    "lessenv",
    "arguments",
    "exports",
    "encode",
    "location",
    "document",
    "window",
    "print",
    "quit",
    "readFile",
    "readUrl",
];

/// The fully built environment, ready to be installed into an engine.
pub struct LessEnvironment {
    bindings: HostBindings,
    encode: Arc<HostNamespace>,
    source_map_url: Option<PathBuf>,
}

impl LessEnvironment {
    /// Everything to install on the global object.
    pub fn bindings(&self) -> &HostBindings {
        &self.bindings
    }

    /// The single `encode` object shared by `encode` and `window.less`.
    pub fn encode(&self) -> &Arc<HostNamespace> {
        &self.encode
    }

    /// Where `lessenv.writeSourceMap` writes, if anywhere.
    pub fn source_map_url(&self) -> Option<&Path> {
        self.source_map_url.as_deref()
    }

    /// A host context whose `writeSourceMap` destination matches this environment.
    pub fn host_context(&self, logger: Arc<dyn HostLogger>) -> HostContext {
        HostContext::new(logger).with_source_map_url(self.source_map_url.clone())
    }
}

/// Build the environment with the default source-map generator lookup.
pub fn build_less_environment(options: &LessOptions) -> LessEnvironment {
    build_less_environment_with_generator(options, SOURCE_MAP_GENERATOR_EXPR)
}

/// Build the environment, resolving `lessenv.sourceMapGenerator` from
/// `generator_expr` instead of the default `require` lookup.
pub fn build_less_environment_with_generator(
    options: &LessOptions,
    generator_expr: &str,
) -> LessEnvironment {
    // First pass: globals delegate to the host natives, and `lessenv`
    // captures those same natives.
    let natives = build_native_globals();
    let mut captured = HostNamespace::new();
    captured.functions.clone_from(&natives.functions);
    let lessenv = captured
        .with_expression("sourceMapGenerator", generator_expr)
        .with_sync_fn("writeSourceMap", write_source_map_fn())
        .with_property(
            "sourceMapURL",
            JSValue::string_or_null(options.source_map_url.as_deref()),
        );

    // Second pass: the final stubs win for the global names.
    let globals = natives
        .with_property("arguments", JSValue::Array(vec![JSValue::String(String::new())]))
        .with_sync_fn("print", noop_fn())
        .with_sync_fn("quit", noop_fn())
        .with_sync_fn("readFile", constant_fn(JSValue::String(String::new())));

    let encode = Arc::new(build_encode_namespace());
    let bindings = HostBindings::new()
        .with_globals(globals)
        .with_namespace("lessenv", Arc::new(lessenv))
        .with_namespace("exports", Arc::new(HostNamespace::new()))
        .with_namespace("encode", Arc::clone(&encode))
        .with_namespace("location", Arc::new(build_location_namespace()))
        .with_namespace("document", Arc::new(build_document_namespace()))
        .with_namespace("window", Arc::new(build_window_namespace(&encode)));
    debug!(
        "built LESS environment with {} namespaces",
        bindings.namespaces.len()
    );

    LessEnvironment {
        bindings,
        encode,
        source_map_url: options.source_map_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_keep_native_read_url() {
        let env = build_less_environment(&LessOptions::default());
        let globals = &env.bindings().globals;
        let lessenv = env.bindings().namespace("lessenv").unwrap();
        let (Some(global_fn), Some(native_fn)) =
            (globals.function("readUrl"), lessenv.function("readUrl"))
        else {
            panic!("readUrl missing");
        };
        let (crate::HostFnKind::Sync(global_fn), crate::HostFnKind::Sync(native_fn)) =
            (global_fn, native_fn);
        assert!(Arc::ptr_eq(global_fn, native_fn));
    }

    #[test]
    fn stubs_replace_natives_only_at_global_level() {
        let env = build_less_environment(&LessOptions::default());
        let globals = &env.bindings().globals;
        let lessenv = env.bindings().namespace("lessenv").unwrap();
        for name in ["print", "quit", "readFile"] {
            let (Some(crate::HostFnKind::Sync(stub)), Some(crate::HostFnKind::Sync(native))) =
                (globals.function(name), lessenv.function(name))
            else {
                panic!("{name} missing");
            };
            assert!(!Arc::ptr_eq(stub, native), "{name} was not overridden");
        }
    }

    #[test]
    fn source_map_url_is_mirrored_on_lessenv() {
        let env = build_less_environment(&LessOptions::default().with_source_map_url("a.map"));
        let lessenv = env.bindings().namespace("lessenv").unwrap();
        assert_eq!(
            lessenv.properties.get("sourceMapURL"),
            Some(&JSValue::String("a.map".to_owned()))
        );
        assert_eq!(env.source_map_url(), Some(Path::new("a.map")));

        let unset = build_less_environment(&LessOptions::default());
        let lessenv = unset.bindings().namespace("lessenv").unwrap();
        assert_eq!(lessenv.properties.get("sourceMapURL"), Some(&JSValue::Null));
    }

    #[test]
    fn generator_expression_is_configurable() {
        let env =
            build_less_environment_with_generator(&LessOptions::default(), "function(){}");
        let lessenv = env.bindings().namespace("lessenv").unwrap();
        assert_eq!(
            lessenv.expressions.get("sourceMapGenerator").map(String::as_str),
            Some("function(){}")
        );
    }
}
