//! Tests for the engine-agnostic LESS environment.
//!
//! Host functions are called directly through `HostFnKind::call`, so these
//! checks hold for any engine adapter that installs the bindings faithfully.

use std::fs;
use std::sync::{Arc, Mutex};

use lessenv::{
    build_less_environment, HostContext, HostLogger, HostNamespace, JSError, JSValue,
    LessEnvironment, LessOptions, LogLevel,
};

/// Logger that keeps every line so tests can assert on guest output.
#[derive(Default)]
struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl HostLogger for RecordingLogger {
    fn log(&self, _level: LogLevel, message: &str) {
        self.lines.lock().unwrap().push(message.to_owned());
    }
}

fn setup(options: &LessOptions) -> (LessEnvironment, HostContext, Arc<RecordingLogger>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let logger = Arc::new(RecordingLogger::default());
    let env = build_less_environment(options);
    let context = env.host_context(Arc::clone(&logger) as Arc<dyn HostLogger>);
    (env, context, logger)
}

fn call(ns: &HostNamespace, context: &HostContext, name: &str, args: Vec<JSValue>) -> Result<JSValue, JSError> {
    ns.function(name).expect("function exists").call(context, args)
}

#[test]
fn global_read_file_always_returns_empty_string() {
    let (env, context, _) = setup(&LessOptions::default());
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real.less");
    fs::write(&real, "@a: 1;").unwrap();
    let globals = &env.bindings().globals;
    for args in [
        vec![JSValue::String(real.display().to_string())],
        vec![JSValue::String("/definitely/not/here".into())],
        vec![],
        vec![JSValue::Null, JSValue::Number(3.0)],
    ] {
        let result = call(globals, &context, "readFile", args).unwrap();
        assert_eq!(result, JSValue::String(String::new()));
    }
}

#[test]
fn global_print_and_quit_are_inert() {
    let (env, context, logger) = setup(&LessOptions::default());
    let globals = &env.bindings().globals;
    let printed = call(globals, &context, "print", vec!["hello".into()]).unwrap();
    let quit = call(globals, &context, "quit", vec![JSValue::Number(2.0)]).unwrap();
    assert_eq!(printed, JSValue::Undefined);
    assert_eq!(quit, JSValue::Undefined);
    assert!(logger.lines.lock().unwrap().is_empty());
    assert_eq!(context.quit_requested(), None);
}

#[test]
fn natives_captured_by_lessenv_still_work() {
    let (env, context, logger) = setup(&LessOptions::default());
    let lessenv = env.bindings().namespace("lessenv").unwrap();

    call(lessenv, &context, "print", vec!["a".into(), JSValue::Number(1.0)]).unwrap();
    assert_eq!(logger.lines.lock().unwrap().as_slice(), ["a 1"]);

    call(lessenv, &context, "quit", vec![JSValue::Number(3.0)]).unwrap();
    assert_eq!(context.quit_requested(), Some(3));

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("in.less");
    fs::write(&file, "body { color: red; }").unwrap();
    let read = call(lessenv, &context, "readFile", vec![file.display().to_string().into()]).unwrap();
    assert_eq!(read, JSValue::String("body { color: red; }".into()));

    let missing = call(lessenv, &context, "readFile", vec!["/no/such/file.less".into()]);
    assert!(matches!(missing, Err(JSError::Io(_))));
}

#[test]
fn read_url_reads_file_urls_and_rejects_unknown_schemes() {
    let (env, context, _) = setup(&LessOptions::default());
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("remote.less");
    fs::write(&file, "@x: 2;").unwrap();
    let url = url::Url::from_file_path(&file).unwrap();

    let globals = &env.bindings().globals;
    let read = call(globals, &context, "readUrl", vec![url.to_string().into()]).unwrap();
    assert_eq!(read, JSValue::String("@x: 2;".into()));

    let unsupported = call(globals, &context, "readUrl", vec!["ftp://example.com/a.less".into()]);
    assert!(matches!(unsupported, Err(JSError::TypeError(_))));
    let not_a_url = call(globals, &context, "readUrl", vec!["not a url".into()]);
    assert!(matches!(not_a_url, Err(JSError::TypeError(_))));
}

#[test]
fn get_elements_by_tag_name_is_always_empty() {
    let (env, context, _) = setup(&LessOptions::default());
    let document = env.bindings().namespace("document").unwrap();
    for args in [
        vec!["link".into()],
        vec!["style".into()],
        vec![],
        vec![JSValue::String(String::new())],
        vec![JSValue::Null],
        vec![JSValue::Number(f64::NAN)],
    ] {
        let result = call(document, &context, "getElementsByTagName", args).unwrap();
        assert_eq!(result, JSValue::Array(Vec::new()));
    }
}

#[test]
fn window_less_aliases_share_the_encode_object() {
    let (env, _, _) = setup(&LessOptions::default());
    let encode = env.bindings().namespace("encode").unwrap();
    let window = env.bindings().namespace("window").unwrap();
    let less = window.object("less").unwrap();
    assert!(Arc::ptr_eq(less.object("encode").unwrap(), encode));
    assert!(Arc::ptr_eq(less.object("encoder.js").unwrap(), encode));
    assert!(Arc::ptr_eq(env.encode(), encode));
}

#[test]
fn encode_base64_known_vectors() {
    let (env, context, _) = setup(&LessOptions::default());
    let encode = env.bindings().namespace("encode").unwrap();
    let empty = call(encode, &context, "encodeBase64", vec!["".into()]).unwrap();
    let man = call(encode, &context, "encodeBase64", vec!["Man".into()]).unwrap();
    assert_eq!(empty, JSValue::String(String::new()));
    assert_eq!(man, JSValue::String("TWFu".into()));
}

#[test]
fn write_source_map_writes_payload_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.css.map");
    let options = LessOptions::default().with_source_map_url(target.display().to_string());
    let (env, context, _) = setup(&options);
    let lessenv = env.bindings().namespace("lessenv").unwrap();

    let payload = r#"{"version":3,"sources":["a.less"],"mappings":"AAAA"}"#;
    let result = call(lessenv, &context, "writeSourceMap", vec![payload.into()]).unwrap();
    assert_eq!(result, JSValue::Undefined);
    assert_eq!(fs::read_to_string(&target).unwrap(), payload);
}

#[test]
fn write_source_map_without_destination_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let (env, context, _) = setup(&LessOptions::default());
    let lessenv = env.bindings().namespace("lessenv").unwrap();
    let result = call(lessenv, &context, "writeSourceMap", vec!["{}".into()]).unwrap();
    assert_eq!(result, JSValue::Undefined);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn write_source_map_surfaces_io_failures() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing-dir").join("out.map");
    let options = LessOptions::default().with_source_map_url(target.display().to_string());
    let (env, context, _) = setup(&options);
    let lessenv = env.bindings().namespace("lessenv").unwrap();
    let result = call(lessenv, &context, "writeSourceMap", vec!["{}".into()]);
    assert!(matches!(result, Err(JSError::Io(_))));
    assert!(!target.exists());
}

#[test]
fn arguments_and_exports_start_minimal() {
    let (env, _, _) = setup(&LessOptions::default());
    assert_eq!(
        env.bindings().globals.properties.get("arguments"),
        Some(&JSValue::Array(vec![JSValue::String(String::new())]))
    );
    assert!(env.bindings().namespace("exports").unwrap().is_empty());
}

#[test]
fn location_port_is_zero() {
    let (env, _, _) = setup(&LessOptions::default());
    let location = env.bindings().namespace("location").unwrap();
    assert_eq!(location.properties.get("port"), Some(&JSValue::Number(0.0)));
}
