//! Drives `V8LessCompiler` with small stand-in guest scripts that exercise the
//! same globals the real compiler bundle uses.

use lessenv::{CompilerScripts, LessCompiler, LessOptions, ScriptSource};
use lessenv_v8::V8LessCompiler;
use std::fs;

fn scripts(engine: &str) -> CompilerScripts {
    CompilerScripts {
        source_map: ScriptSource::new(
            "test://source-map.js",
            "var require = function () { return { SourceMapGenerator: function () {} }; };",
        ),
        less: ScriptSource::new(
            "test://less.js",
            // Registers itself the way the bundle does, through `exports` and `window.less`.
            "exports.version = [1, 7, 5]; window.less.version = exports.version;",
        ),
        cssmin: ScriptSource::new(
            "test://cssmin.js",
            "var cssmin = function (css) { return css.replace(/\\s+/g, ''); };",
        ),
        engine: ScriptSource::new("test://engine.js", engine),
    }
}

const ECHO_ENGINE: &str = r#"
function compile(input, location, compress) {
    var css = input + "/*" + location + "|" + charset + "|" + optimization + "*/";
    if (sourceMap) {
        lessenv.writeSourceMap(JSON.stringify({ version: 3, file: location }));
    }
    return compress ? cssmin(css) : css;
}
"#;

#[test]
fn compile_calls_guest_function_with_options_in_scope() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut compiler = V8LessCompiler::new(&LessOptions::default(), &scripts(ECHO_ENGINE)).unwrap();
    let css = compiler.compile("a { b: c }", "main.less", false).unwrap();
    assert_eq!(css, "a { b: c }/*main.less|UTF-8|1*/");
    let compressed = compiler.compile("a { b: c }", "main.less", true).unwrap();
    assert_eq!(compressed, "a{b:c}/*main.less|UTF-8|1*/");
}

#[test]
fn source_maps_are_written_to_the_configured_destination() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("main.css.map");
    let mut options = LessOptions::default().with_source_map_url(target.display().to_string());
    options.source_map = true;
    let mut compiler = V8LessCompiler::new(&options, &scripts(ECHO_ENGINE)).unwrap();
    compiler.compile("a {}", "main.less", false).unwrap();
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        r#"{"version":3,"file":"main.less"}"#
    );
}

#[test]
fn optional_globals_are_null_and_paths_only_when_set() {
    let _ = env_logger::builder().is_test(true).try_init();
    let probe = r#"
function compile() {
    return [lineNumbers === null, sourceMapURL === null, typeof paths].join(",");
}
"#;
    let mut compiler = V8LessCompiler::new(&LessOptions::default(), &scripts(probe)).unwrap();
    assert_eq!(compiler.compile("", "x.less", false).unwrap(), "true,true,undefined");

    let with_paths = LessOptions {
        paths: Some(vec!["styles".to_owned(), "vendor".to_owned()]),
        ..LessOptions::default()
    };
    let join_paths = "function compile() { return paths.join(';'); }";
    let mut compiler = V8LessCompiler::new(&with_paths, &scripts(join_paths)).unwrap();
    assert_eq!(compiler.compile("", "x.less", false).unwrap(), "styles;vendor");
}

#[test]
fn guest_errors_become_less_errors() {
    let _ = env_logger::builder().is_test(true).try_init();
    let failing = "function compile(input, location) { throw new Error('Syntax error in ' + location); }";
    let mut compiler = V8LessCompiler::new(&LessOptions::default(), &scripts(failing)).unwrap();
    let error = compiler.compile("a {", "broken.less", false).unwrap_err();
    assert!(error.to_string().contains("Syntax error in broken.less"), "{error}");
    assert!(error.message().contains("broken.less"));
}

#[test]
fn non_string_results_are_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    let numeric = "function compile() { return 42; }";
    let mut compiler = V8LessCompiler::new(&LessOptions::default(), &scripts(numeric)).unwrap();
    assert!(compiler.compile("", "x.less", false).is_err());
}

#[test]
fn loading_fails_without_a_compile_function() {
    let _ = env_logger::builder().is_test(true).try_init();
    let result = V8LessCompiler::new(&LessOptions::default(), &scripts("var notCompile = 1;"));
    assert!(result.is_err());
}

#[test]
fn guest_reads_through_stubbed_read_file_get_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let imported = dir.path().join("import.less");
    fs::write(&imported, "@c: red;").unwrap();
    let engine = r#"
function compile(input, location) {
    return JSON.stringify([readFile(location), lessenv.readFile(location)]);
}
"#;
    let mut compiler = V8LessCompiler::new(&LessOptions::default(), &scripts(engine)).unwrap();
    let location = imported.display().to_string();
    let out = compiler.compile("", &location, false).unwrap();
    assert_eq!(out, r#"["","@c: red;"]"#);
}
