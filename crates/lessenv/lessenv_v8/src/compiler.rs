//! LESS compiler driver running the guest scripts on V8.

use crate::engine::V8Engine;
use anyhow::Result;
use lessenv::{
    CompilerScripts, ConsoleLogger, HostContext, HostLogger, JSValue, JsEngine, LessCompiler,
    LessError, LessOptions, build_less_environment,
};
use log::{debug, info};
use std::sync::Arc;

/// Name of the guest function every compile goes through.
const COMPILE_FN: &str = "compile";

/// Compiles LESS by calling the guest `compile(input, location, compress)`.
pub struct V8LessCompiler {
    engine: V8Engine,
    host_context: HostContext,
}

impl V8LessCompiler {
    /// Load the compiler, logging guest output through [`ConsoleLogger`].
    ///
    /// # Errors
    /// Returns an error if any script throws while loading, or if no global
    /// `compile` function exists afterwards.
    pub fn new(options: &LessOptions, scripts: &CompilerScripts) -> Result<Self, LessError> {
        Self::with_logger(options, scripts, Arc::new(ConsoleLogger))
    }

    /// Load the compiler with a custom logger for guest output.
    ///
    /// # Errors
    /// Same as [`V8LessCompiler::new`].
    pub fn with_logger(
        options: &LessOptions,
        scripts: &CompilerScripts,
        logger: Arc<dyn HostLogger>,
    ) -> Result<Self, LessError> {
        Self::load(options, scripts, logger)
            .map_err(|error| LessError::with_source("failed to load the LESS compiler", error))
    }

    fn load(
        options: &LessOptions,
        scripts: &CompilerScripts,
        logger: Arc<dyn HostLogger>,
    ) -> Result<Self> {
        let mut engine = V8Engine::new()?;
        engine.eval_script(&scripts.source_map.source, &scripts.source_map.url)?;

        let environment = build_less_environment(options);
        let host_context = engine.install_environment(&environment, logger)?;
        define_option_globals(&mut engine, options)?;

        for script in [&scripts.less, &scripts.cssmin, &scripts.engine] {
            debug!("loading {}", script.url);
            engine.eval_script(&script.source, &script.url)?;
        }
        let kind = engine.evaluate(&format!("typeof {COMPILE_FN}"), "lessenv://probe")?;
        if kind.as_str() != Some("function") {
            anyhow::bail!("scripts did not define a global {COMPILE_FN} function");
        }
        info!("LESS compiler loaded");
        Ok(Self {
            engine,
            host_context,
        })
    }

    /// The host context shared with the guest's host functions.
    pub fn host_context(&self) -> &HostContext {
        &self.host_context
    }
}

/// Expose the options as the globals the engine glue reads.
fn define_option_globals(engine: &mut V8Engine, options: &LessOptions) -> Result<()> {
    let optional = |value: Option<&String>| JSValue::string_or_null(value.map(String::as_str));
    let globals = [
        ("charset", JSValue::String(options.charset.clone())),
        ("css", JSValue::Boolean(options.css)),
        ("lineNumbers", optional(options.line_numbers.as_ref())),
        ("optimization", JSValue::Number(f64::from(options.optimization))),
        ("sourceMap", JSValue::Boolean(options.source_map)),
        ("sourceMapRootpath", optional(options.source_map_rootpath.as_ref())),
        ("sourceMapBasepath", optional(options.source_map_basepath.as_ref())),
        ("sourceMapURL", optional(options.source_map_url.as_ref())),
    ];
    for (name, value) in globals {
        engine.define_global(name, value)?;
    }
    if let Some(paths) = &options.paths {
        let paths = paths.iter().map(|path| JSValue::String(path.clone())).collect();
        engine.define_global("paths", JSValue::Array(paths))?;
    }
    Ok(())
}

impl LessCompiler for V8LessCompiler {
    fn compile(&mut self, input: &str, location: &str, compress: bool) -> Result<String, LessError> {
        let args = vec![
            JSValue::from(input),
            JSValue::from(location),
            JSValue::Boolean(compress),
        ];
        let result = self
            .engine
            .call_global(COMPILE_FN, args)
            .map_err(|error| LessError::with_source(format!("failed to compile {location}"), error))?;
        match result {
            JSValue::String(css) => Ok(css),
            other => Err(LessError::new(format!(
                "compile returned {other:?} instead of a string for {location}"
            ))),
        }
    }
}
