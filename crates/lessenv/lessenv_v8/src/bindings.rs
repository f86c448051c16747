//! Host function bindings and installation.

use crate::conversions::{collect_js_args, jsvalue_to_local, quote_js_key};
use anyhow::{Result, anyhow};
use core::ffi::c_void;
use lessenv::{HostBindings, HostContext, HostFnKind, HostNamespace, JSValue};
use log::trace;
use std::collections::HashMap;
use std::sync::Arc;
use v8::{
    Context, ContextScope, External, Function, FunctionCallbackArguments, Global, Isolate, Local,
    Object, ReturnValue, String as V8String, Value,
};

/// Objects already materialised during one install, keyed by namespace address,
/// so a namespace reachable from several paths becomes one JS object.
type ObjectMemo<'s> = HashMap<*const HostNamespace, Local<'s, Object>>;

/// Dispatcher for host-bound functions installed through `HostBindings`.
pub(crate) fn host_fn_dispatch<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    args: FunctionCallbackArguments,
    mut ret_val: ReturnValue,
) {
    // Read the external payload pointer first
    let data_value = args.data();
    let Ok(external_value) = Local::<External>::try_from(data_value) else {
        let undef = v8::undefined(scope);
        ret_val.set(undef.into());
        return;
    };
    let collected = collect_js_args(scope, &args);
    let ptr = external_value.value();
    if ptr.is_null() {
        let undef = v8::undefined(scope);
        ret_val.set(undef.into());
        return;
    }
    // SAFETY: pointer refers to a Box<(HostContext, HostFnKind)> leaked in make_v8_callback
    let payload: &(HostContext, HostFnKind) = unsafe { &*ptr.cast::<(HostContext, HostFnKind)>() };
    let host_context: &HostContext = &payload.0;
    let host_fn_kind: &HostFnKind = &payload.1;

    match host_fn_kind.call(host_context, collected) {
        Ok(result) => ret_val.set(jsvalue_to_local(scope, result)),
        Err(error) => {
            let message = format!("{error}");
            if let Some(js_message) = V8String::new(scope, &message) {
                let exc = v8::Exception::error(scope, js_message);
                scope.throw_exception(exc);
            } else {
                let undef = v8::undefined(scope);
                ret_val.set(undef.into());
            }
        }
    }
}

/// Wrap a `HostFnKind` as a V8 `Function`.
///
/// # Arguments
///
/// * `scope`: The V8 pin scope.
/// * `host_context`: The host context.
/// * `host_fn`: The host function kind.
///
/// # Returns
/// The wrapped `Function` or `None` if allocation fails.
pub(crate) fn make_v8_callback<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    host_context: &HostContext,
    host_fn: HostFnKind,
) -> Option<Local<'s, Function>> {
    // The payload is leaked: V8 offers no finalizer here. One box per installed
    // host function, so the leak is bounded by the engines created.
    let payload = Box::new((host_context.clone(), host_fn));
    let ptr = Box::into_raw(payload).cast::<c_void>();
    let external = External::new(scope, ptr);
    Function::builder(host_fn_dispatch)
        .data(external.into())
        .build(scope)
}

/// Install host bindings onto the global object.
///
/// Returns the assignment scripts for guest-evaluated properties, each of the
/// form `globalThis["a"]["b"] = (expression);`. They must run after this
/// install so earlier bindings are visible to them.
///
/// # Arguments
///
/// * `isolate_mut`: Mutable isolate reference.
/// * `context`: Global context.
/// * `host_context`: The host context.
/// * `bindings`: The host bindings.
///
/// # Errors
/// Returns an error if V8 string allocation fails for any namespace, property
/// or function identifier.
pub(crate) fn install_bindings_impl(
    isolate_mut: &mut Isolate,
    context: &Global<Context>,
    host_context: &HostContext,
    bindings: &HostBindings,
) -> Result<Vec<String>> {
    v8::scope!(let scope, isolate_mut);

    let local_context: Local<Context> = Local::new(scope, context);
    let scope = &mut ContextScope::new(scope, local_context);
    let global = local_context.global(scope);

    let mut deferred = Vec::new();
    install_members(
        scope,
        host_context,
        &bindings.globals,
        global,
        "globalThis",
        &mut deferred,
    )?;

    let mut memo: ObjectMemo = HashMap::new();
    for (namespace_name, namespace) in &bindings.namespaces {
        let ns_key = V8String::new(scope, namespace_name)
            .ok_or_else(|| anyhow!("failed to allocate V8 string for namespace"))?;
        // Replaces whatever an earlier script left under this name.
        let path = format!("globalThis[{}]", quote_js_key(namespace_name));
        let target_obj = materialize(
            scope,
            host_context,
            namespace,
            &path,
            &mut memo,
            &mut deferred,
        )?;
        let _set_ns: Option<bool> = global.set(scope, ns_key.into(), target_obj.into());
        trace!("installed global namespace {namespace_name}");
    }
    Ok(deferred)
}

/// Produce the JS object for `namespace`, reusing it if the same namespace was
/// already materialised during this install.
fn materialize<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    host_context: &HostContext,
    namespace: &Arc<HostNamespace>,
    path: &str,
    memo: &mut ObjectMemo<'s>,
    deferred: &mut Vec<String>,
) -> Result<Local<'s, Object>> {
    let identity = Arc::as_ptr(namespace);
    if let Some(object) = memo.get(&identity) {
        return Ok(*object);
    }
    let target_obj = Object::new(scope);
    memo.insert(identity, target_obj);
    install_members(scope, host_context, namespace, target_obj, path, deferred)?;

    for (object_name, object) in &namespace.objects {
        let key = V8String::new(scope, object_name)
            .ok_or_else(|| anyhow!("failed to allocate V8 string for object key"))?;
        let child_path = format!("{path}[{}]", quote_js_key(object_name));
        let child = materialize(
            scope,
            host_context,
            object,
            &child_path,
            memo,
            deferred,
        )?;
        let _set_obj: Option<bool> = target_obj.set(scope, key.into(), child.into());
    }
    Ok(target_obj)
}

/// Install properties and functions of one namespace onto `target_obj`, and
/// queue its guest expressions.
fn install_members<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    host_context: &HostContext,
    namespace: &HostNamespace,
    target_obj: Local<'s, Object>,
    path: &str,
    deferred: &mut Vec<String>,
) -> Result<()> {
    install_namespace_properties(scope, namespace, target_obj)?;
    install_namespace_functions(scope, host_context, namespace, target_obj)?;
    for (property_name, expression) in &namespace.expressions {
        deferred.push(format!(
            "{path}[{}] = ({expression});",
            quote_js_key(property_name)
        ));
    }
    Ok(())
}

/// Install constant properties for a single host namespace onto the target object.
#[inline]
fn install_namespace_properties<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    namespace: &HostNamespace,
    target_obj: Local<Object>,
) -> Result<()> {
    for (property_name, property_value) in &namespace.properties {
        let key = V8String::new(scope, property_name)
            .ok_or_else(|| anyhow!("failed to allocate V8 string for property {property_name}"))?;
        let value = from_js_value(scope, property_value);
        let _set_prop: Option<bool> = target_obj.set(scope, key.into(), value);
    }
    Ok(())
}

/// Install functions for a single host namespace onto the target object.
#[inline]
fn install_namespace_functions<'s, 'i>(
    scope: &mut v8::PinScope<'s, 'i>,
    host_context: &HostContext,
    namespace: &HostNamespace,
    target_obj: Local<Object>,
) -> Result<()> {
    for (function_name, function_kind) in &namespace.functions {
        let function = make_v8_callback(scope, host_context, function_kind.clone())
            .ok_or_else(|| anyhow!("failed to create V8 function {function_name}"))?;
        let key = V8String::new(scope, function_name)
            .ok_or_else(|| anyhow!("failed to allocate V8 string for function {function_name}"))?;
        let _set_fn: Option<bool> = target_obj.set(scope, key.into(), function.into());
    }
    Ok(())
}

/// Convert a generic `JSValue` to a V8 `Local<Value>`.
fn from_js_value<'s, 'i>(scope: &mut v8::PinScope<'s, 'i>, value: &JSValue) -> Local<'s, Value> {
    jsvalue_to_local(scope, value.clone())
}
