use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;
use std::sync::Arc;

use super::{HostContext, HostFnSync, JSError, JSValue};

/// Write `payload` verbatim to `destination`, or do nothing without one.
///
/// The writer lives only for this call and is closed on every path; a failed
/// write drops it before the error reaches the caller.
///
/// # Errors
/// Returns the I/O error from creating, writing or flushing the file.
pub fn write_source_map(destination: Option<&Path>, payload: &str) -> Result<(), JSError> {
    let Some(path) = destination else {
        return Ok(());
    };
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(payload.as_bytes())?;
    writer.flush()?;
    debug!("wrote {} byte source map to {}", payload.len(), path.display());
    Ok(())
}

/// Host function backing `lessenv.writeSourceMap(sourceMap)`.
pub fn write_source_map_fn() -> Arc<HostFnSync> {
    Arc::new(
        |context: &HostContext, args: Vec<JSValue>| -> Result<JSValue, JSError> {
            let Some(path) = context.source_map_url.as_deref() else {
                return Ok(JSValue::Undefined);
            };
            let payload = super::stringify_arguments(args.into_iter().take(1).collect());
            write_source_map(Some(path), &payload)?;
            Ok(JSValue::Undefined)
        },
    )
}
