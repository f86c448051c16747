//! V8 JavaScript engine implementation.

use crate::bindings::install_bindings_impl;
use crate::conversions::{js_literal, local_to_jsvalue, quote_js_key};
use anyhow::{Result, anyhow, bail};
use core::pin::Pin;
use lessenv::{
    Console, HostBindings, HostContext, HostLogger, JSValue, JsEngine, LessEnvironment,
};
use log::debug;
use std::sync::{Arc, Once};
use v8::{
    Context, ContextScope, CreateParams, Global, Isolate, Local, OwnedIsolate, Script,
    ScriptOrigin, String as V8String, V8, new_default_platform,
};

/// Script name used for code the engine generates itself.
const INTERNAL_URL: &str = "lessenv://internal";

/// V8-backed engine hosting one LESS environment.
pub struct V8Engine {
    /// The owned isolate (Pin<Box> ensures it doesn't move in memory).
    /// Must be first so it's initialized before context.
    isolate: Pin<Box<OwnedIsolate>>,
    /// The current global V8 context.
    context: Global<Context>,
    /// Context handed to the installed environment's host functions.
    host_context: Option<HostContext>,
}

impl V8Engine {
    /// Create a new engine instance: initializes the V8 platform, isolate, and context.
    ///
    /// # Errors
    /// Returns an error if context initialization fails (unexpected).
    #[inline]
    pub fn new() -> Result<Self> {
        // Initialize V8 platform (singleton per-process).
        static START: Once = Once::new();
        START.call_once(|| {
            let platform = new_default_platform(0, false).make_shared();
            V8::initialize_platform(platform);
            V8::initialize();
        });

        // Pin<Box> ensures it doesn't move in memory (Global<Context> stores raw pointer to isolate)
        let mut isolate = Box::pin(Isolate::new(CreateParams::default()));
        let context = {
            // SAFETY: We're pinning the isolate, so it's safe to create a mutable reference
            let isolate_mut = unsafe { isolate.as_mut().get_unchecked_mut() };
            v8::scope!(let scope, isolate_mut);
            let ctx: Local<Context> = Context::new(scope, Default::default());
            Global::new(scope, ctx)
        };
        debug!("V8Engine initialized");
        Ok(Self {
            isolate,
            context,
            host_context: None,
        })
    }

    /// Run `operation` with this engine's isolate entered.
    fn with_isolate<R>(&mut self, operation: impl FnOnce(&mut Isolate, &Global<Context>) -> R) -> R {
        // SAFETY: Isolate is pinned. We need to re-enter it because another isolate
        // might have been entered since this engine was created (multiple V8Engine instances)
        let isolate_mut = unsafe { self.isolate.as_mut().get_unchecked_mut() };
        // SAFETY: paired with the exit below on the same thread
        unsafe { isolate_mut.enter() };

        let result = operation(isolate_mut, &self.context);

        // SAFETY: Exit the isolate after we're done using it
        unsafe { isolate_mut.exit() };

        result
    }

    /// Compile and run a script string within the current context, returning
    /// its completion value.
    ///
    /// # Arguments
    ///
    /// * `source`: The script source code.
    /// * `url`: The script URL.
    ///
    /// # Errors
    /// Returns an error carrying the guest exception message if compilation or
    /// execution throws.
    fn run_script_internal(&mut self, source: &str, url: &str) -> Result<JSValue> {
        self.with_isolate(|isolate_mut, context| {
            Self::run_script_internal_impl(isolate_mut, context, source, url)
        })
    }

    fn run_script_internal_impl(
        isolate_mut: &mut Isolate,
        context: &Global<Context>,
        source: &str,
        url: &str,
    ) -> Result<JSValue> {
        v8::scope!(let scope, isolate_mut);

        let local_context: Local<Context> = Local::new(scope, context);
        let scope = &mut ContextScope::new(scope, local_context);

        v8::tc_scope!(let tc, scope);

        let code = V8String::new(tc, source).ok_or_else(|| anyhow!("alloc v8 string"))?;
        let name = V8String::new(tc, url).ok_or_else(|| anyhow!("alloc v8 name"))?;
        let origin = ScriptOrigin::new(
            tc,
            name.into(),
            0,
            0,
            false,
            0,
            None,
            false,
            false,
            false,
            None,
        );
        if let Some(value) =
            Script::compile(tc, code, Some(&origin)).and_then(|compiled| compiled.run(tc))
        {
            return Ok(local_to_jsvalue(tc, value));
        }
        if !tc.has_caught() {
            return Err(anyhow!("v8 failed running {url}"));
        }
        let exc = tc.exception();
        let exc_str = exc.and_then(|val| val.to_string(tc)).map_or_else(
            || "Uncaught exception".to_owned(),
            |val| val.to_rust_string_lossy(tc),
        );
        let stack = tc
            .stack_trace()
            .and_then(|val| val.to_string(tc))
            .map(|val| val.to_rust_string_lossy(tc));
        let message = tc.message().map_or_else(
            || exc_str.clone(),
            |msg_obj| msg_obj.get(tc).to_rust_string_lossy(tc),
        );
        Console::exception(message.clone(), stack.as_deref());
        Err(anyhow!("{message} ({url})"))
    }

    /// Install host bindings onto the global object, then evaluate their
    /// guest expressions in order.
    ///
    /// # Arguments
    ///
    /// * `host_context`: The host context.
    /// * `bindings`: The host bindings.
    ///
    /// # Errors
    /// Returns an error if V8 string allocation fails for any identifier, or if
    /// a guest expression throws.
    #[inline]
    pub fn install_bindings(
        &mut self,
        host_context: &HostContext,
        bindings: &HostBindings,
    ) -> Result<()> {
        let deferred = self.install_host_objects(host_context, bindings)?;
        self.run_deferred(deferred)
    }

    fn install_host_objects(
        &mut self,
        host_context: &HostContext,
        bindings: &HostBindings,
    ) -> Result<Vec<String>> {
        self.with_isolate(|isolate_mut, context| {
            install_bindings_impl(isolate_mut, context, host_context, bindings)
        })
    }

    fn run_deferred(&mut self, deferred: Vec<String>) -> Result<()> {
        for assignment in deferred {
            self.run_script_internal(&assignment, INTERNAL_URL)?;
        }
        Ok(())
    }

    /// Install the LESS environment. Any source-map library it relies on must
    /// have been evaluated already.
    ///
    /// The environment counts as installed once its host objects are on the
    /// global object, so a failing `sourceMapGenerator` lookup leaves the
    /// engine unusable for another install.
    ///
    /// # Errors
    /// Returns an error if an environment is already installed or installing fails.
    pub fn install_environment(
        &mut self,
        environment: &LessEnvironment,
        logger: Arc<dyn HostLogger>,
    ) -> Result<HostContext> {
        if self.host_context.is_some() {
            bail!("LESS environment already installed");
        }
        let host_context = environment.host_context(logger);
        let deferred = self.install_host_objects(&host_context, environment.bindings())?;
        self.host_context = Some(host_context.clone());
        self.run_deferred(deferred)?;
        debug!("LESS environment installed");
        Ok(host_context)
    }

    /// The host context of the installed environment, if any.
    pub fn host_context(&self) -> Option<&HostContext> {
        self.host_context.as_ref()
    }
}

impl JsEngine for V8Engine {
    #[inline]
    fn eval_script(&mut self, source: &str, url: &str) -> Result<()> {
        self.run_script_internal(source, url).map(|_| ())
    }

    #[inline]
    fn evaluate(&mut self, source: &str, url: &str) -> Result<JSValue> {
        self.run_script_internal(source, url)
    }

    fn define_global(&mut self, name: &str, value: JSValue) -> Result<()> {
        let assignment = format!("globalThis[{}] = {};", quote_js_key(name), js_literal(&value));
        self.run_script_internal(&assignment, INTERNAL_URL).map(|_| ())
    }

    fn call_global(&mut self, name: &str, args: Vec<JSValue>) -> Result<JSValue> {
        let function = format!("globalThis[{}]", quote_js_key(name));
        let rendered: Vec<String> = args.iter().map(js_literal).collect();
        let call = format!(
            "if (typeof {function} !== 'function') {{ throw new TypeError({} + ' is not a function'); }} {function}({});",
            quote_js_key(name),
            rendered.join(", ")
        );
        self.run_script_internal(&call, INTERNAL_URL)
    }
}
