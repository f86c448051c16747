//! Browser-shaped stubs: `location`, `document` and `window`.

use std::sync::Arc;

use super::{constant_fn, HostNamespace, JSValue};

/// Build the `location` namespace; `port` is always `0`.
pub fn build_location_namespace() -> HostNamespace {
    HostNamespace::new().with_property("port", JSValue::Number(0.0))
}

/// Build the `document` namespace. There is no DOM, so
/// `getElementsByTagName(name)` returns an empty array for every `name`.
pub fn build_document_namespace() -> HostNamespace {
    HostNamespace::new().with_sync_fn(
        "getElementsByTagName",
        constant_fn(JSValue::Array(Vec::new())),
    )
}

/// Build the `window` namespace. `window.less.encode` and
/// `window.less["encoder.js"]` both refer to the given `encode` object.
pub fn build_window_namespace(encode: &Arc<HostNamespace>) -> HostNamespace {
    let less = HostNamespace::new()
        .with_object("encode", Arc::clone(encode))
        .with_object("encoder.js", Arc::clone(encode));
    HostNamespace::new().with_object("less", Arc::new(less))
}
