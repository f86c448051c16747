use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::sync::Arc;

use super::{HostContext, HostFnSync, HostNamespace, JSError, JSValue};

/// Standard, padded base64 of the UTF-8 bytes of `input`.
#[inline]
pub fn encode_base64(input: &str) -> String {
    BASE64_STANDARD.encode(input.as_bytes())
}

fn encode_base64_fn() -> Arc<HostFnSync> {
    Arc::new(
        |_context: &HostContext, args: Vec<JSValue>| -> Result<JSValue, JSError> {
            // Non-strings are encoded by their JS string form.
            let text = match args.into_iter().next() {
                Some(JSValue::String(text)) => text,
                Some(other) => super::stringify_arguments(vec![other]),
                None => String::from("undefined"),
            };
            Ok(JSValue::String(encode_base64(&text)))
        },
    )
}

/// Build the `encode` namespace exposing `encodeBase64(str)`.
pub fn build_encode_namespace() -> HostNamespace {
    HostNamespace::new().with_sync_fn("encodeBase64", encode_base64_fn())
}
