use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use webfix::autofix::{run_autofix, AutofixOptions};
use webfix::fix::Registry;

const PAGE: &str = "<html>
<head>
<title>Dashboard</title>
</head>
<body>
<div id=\"main\">
<img src=logo.png>
</body>
</html>";

const SCRIPT: &str = "function load() {
if (ready)
go();
}
function load() {}";

const STYLE: &str = "body {
color: red;
margin 0
}";

fn seed_tree(base: &Path) -> AutofixOptions {
    let ui = base.join("ui");
    fs::create_dir_all(ui.join("js")).unwrap();
    fs::write(ui.join("index.html"), PAGE).unwrap();
    fs::write(ui.join("js/app.js"), SCRIPT).unwrap();
    fs::write(ui.join("style.css"), STYLE).unwrap();
    fs::write(ui.join("clean.css"), "a { color: red; }").unwrap();
    fs::write(ui.join("README.md"), "if (x)\ny();\n").unwrap();
    AutofixOptions {
        root: ui,
        log_dir: base.join("logs"),
        report_json: base.join("ui_syntax_report.json"),
        report_html: base.join("ui_syntax_fixed.html"),
        extensions: vec![".html".into(), ".js".into(), ".css".into()],
        exclude: vec![],
        write: true,
    }
}

fn read_json(p: &PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(p).unwrap()).unwrap()
}

#[test]
fn fix_run_rewrites_files_and_writes_reports() {
    let dir = tempdir().unwrap();
    let opts = seed_tree(dir.path());
    let out = run_autofix(&opts, &Registry::builtin()).unwrap();

    let r = &out.report;
    assert_eq!(r.total_files, 4);
    assert_eq!(r.fixed_files, 3);
    assert_eq!(r.total_errors, 6);
    assert_eq!(r.fixed_errors, 5);
    assert_eq!(r.errors_by_type.values().sum::<usize>(), r.total_errors);
    assert!(r.fixed_errors <= r.total_errors);
    assert!(r.fixed_files <= r.total_files);
    // records exist only for files with findings
    assert_eq!(r.files_processed.len(), 3);
    assert!(r
        .files_processed
        .iter()
        .all(|f| !f.path.ends_with("clean.css") && !f.path.ends_with("README.md")));

    let html = fs::read_to_string(opts.root.join("index.html")).unwrap();
    assert!(html.contains("<meta charset=\"UTF-8\">"));
    assert!(html.contains("src=\"logo.png\""));
    assert!(html.contains("</div>"));
    assert_eq!(
        fs::read_to_string(opts.root.join("js/app.js")).unwrap(),
        "function load() {\nif (ready) {\ngo();\n}\n}\nfunction load() {}"
    );
    assert_eq!(
        fs::read_to_string(opts.root.join("style.css")).unwrap(),
        "body {\n  color: red;\n  margin 0;\n}"
    );
    assert_eq!(
        fs::read_to_string(opts.root.join("README.md")).unwrap(),
        "if (x)\ny();\n"
    );

    let json = read_json(&opts.report_json);
    assert_eq!(json["totalFiles"], 4);
    assert_eq!(json["errorsByType"]["duplicate-function"], 1);
    let js = json["filesProcessed"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["path"].as_str().unwrap().ends_with("app.js"))
        .unwrap();
    assert_eq!(js["errors"][0]["type"], "missing-if-braces");
    assert_eq!(js["errors"][0]["fixed"], true);
    assert_eq!(js["errors"][1]["type"], "duplicate-function");
    assert_eq!(js["errors"][1]["fixed"], false);

    let page = fs::read_to_string(&opts.report_html).unwrap();
    assert!(page.contains("[unfixed] duplicate-function"));
    assert!(page.contains("[fixed] missing-semicolon"));

    let log = fs::read_to_string(out.log_file.unwrap()).unwrap();
    assert!(log.contains("reading file:"));
    assert!(log.contains("  - warning: duplicate function definition: load"));
    assert!(log.contains("JSON report saved to:"));
}

#[test]
fn check_mode_reports_without_touching_sources() {
    let dir = tempdir().unwrap();
    let mut opts = seed_tree(dir.path());
    opts.write = false;
    let out = run_autofix(&opts, &Registry::builtin()).unwrap();

    assert!(out.any_changed());
    assert_eq!(out.changed_files.len(), 3);
    assert_eq!(out.report.fixed_files, 3);
    assert_eq!(fs::read_to_string(opts.root.join("index.html")).unwrap(), PAGE);
    assert_eq!(fs::read_to_string(opts.root.join("js/app.js")).unwrap(), SCRIPT);
    assert_eq!(fs::read_to_string(opts.root.join("style.css")).unwrap(), STYLE);
    // reports and the log are still produced
    assert_eq!(out.reports_written, 2);
    assert!(opts.report_json.exists());
    assert!(out.log_file.is_some());
}

#[test]
fn second_run_finds_nothing_left_to_fix() {
    let dir = tempdir().unwrap();
    let opts = seed_tree(dir.path());
    run_autofix(&opts, &Registry::builtin()).unwrap();
    let first_html = fs::read_to_string(opts.root.join("index.html")).unwrap();

    let again = run_autofix(&opts, &Registry::builtin()).unwrap();
    assert!(!again.any_changed());
    assert_eq!(again.report.fixed_files, 0);
    assert_eq!(again.report.fixed_errors, 0);
    // the duplicate definition is detect-only and stays reported
    assert_eq!(again.report.total_errors, 1);
    assert_eq!(
        fs::read_to_string(opts.root.join("index.html")).unwrap(),
        first_html
    );
}

#[test]
fn excluded_directories_are_not_walked() {
    let dir = tempdir().unwrap();
    let mut opts = seed_tree(dir.path());
    opts.exclude = vec!["js".into()];
    let out = run_autofix(&opts, &Registry::builtin()).unwrap();
    assert_eq!(out.report.total_files, 3);
    assert_eq!(fs::read_to_string(opts.root.join("js/app.js")).unwrap(), SCRIPT);
}
