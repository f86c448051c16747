//! Host-native primitives the shell would normally provide: `print`, `quit`,
//! `readFile` and `readUrl`.

use log::warn;
use std::fs;
use std::sync::{Arc, PoisonError};

use super::net::fetch_url;
use super::{
    string_arg, stringify_arguments, HostContext, HostFnSync, HostNamespace, JSError, JSValue,
    LogLevel,
};

/// Decode fetched bytes. Only UTF-8 is understood; other charsets are decoded
/// lossily as UTF-8.
fn decode(bytes: &[u8], charset: Option<&JSValue>) -> String {
    if let Some(JSValue::String(name)) = charset
        && !name.eq_ignore_ascii_case("utf-8")
        && !name.eq_ignore_ascii_case("utf8")
    {
        warn!("charset {name} is not supported, decoding as UTF-8");
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// `print(...args)`: log the space-joined arguments.
pub fn native_print() -> Arc<HostFnSync> {
    Arc::new(
        |context: &HostContext, args: Vec<JSValue>| -> Result<JSValue, JSError> {
            context.logger.log(LogLevel::Info, &stringify_arguments(args));
            Ok(JSValue::Undefined)
        },
    )
}

/// `quit([code])`: record the requested exit code on the context.
/// The process itself is never terminated from inside the engine.
pub fn native_quit() -> Arc<HostFnSync> {
    Arc::new(
        |context: &HostContext, args: Vec<JSValue>| -> Result<JSValue, JSError> {
            let code = match args.first() {
                Some(JSValue::Number(code)) => *code as i32,
                _ => 0,
            };
            *context
                .quit_code
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(code);
            context
                .logger
                .log(LogLevel::Debug, &format!("quit({code}) requested"));
            Ok(JSValue::Undefined)
        },
    )
}

/// `readFile(path[, charset])`: the file contents as a string.
pub fn native_read_file() -> Arc<HostFnSync> {
    Arc::new(
        |_context: &HostContext, args: Vec<JSValue>| -> Result<JSValue, JSError> {
            let path = string_arg(&args, "readFile")?;
            let bytes = fs::read(&path)?;
            Ok(JSValue::String(decode(&bytes, args.get(1))))
        },
    )
}

/// `readUrl(url[, charset])`: the resource contents as a string.
pub fn native_read_url() -> Arc<HostFnSync> {
    Arc::new(
        |_context: &HostContext, args: Vec<JSValue>| -> Result<JSValue, JSError> {
            let url = string_arg(&args, "readUrl")?;
            let bytes = fetch_url(&url)?;
            Ok(JSValue::String(decode(&bytes, args.get(1))))
        },
    )
}

/// The natives as a set of global functions.
pub fn build_native_globals() -> HostNamespace {
    HostNamespace::new()
        .with_sync_fn("print", native_print())
        .with_sync_fn("quit", native_quit())
        .with_sync_fn("readFile", native_read_file())
        .with_sync_fn("readUrl", native_read_url())
}
