use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use reforge_cli::{run_files, rule_listing, Options, OutputSink};
use reforge_core::RunReport;
use tempfile::TempDir;

#[derive(Default)]
struct Captured {
    texts: Mutex<Vec<(PathBuf, String)>>,
    reports: Mutex<Vec<(PathBuf, usize)>>,
    errors: Mutex<Vec<(PathBuf, String)>>,
}

impl OutputSink for Captured {
    fn on_text(&self, path: &Path, text: &str) {
        self.texts.lock().unwrap().push((path.to_path_buf(), text.to_string()));
    }

    fn on_report(&self, path: &Path, report: &RunReport) {
        self.reports
            .lock()
            .unwrap()
            .push((path.to_path_buf(), report.iterations));
    }

    fn on_error(&self, path: &Path, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((path.to_path_buf(), message.to_string()));
    }
}

fn options(args: &[&str], files: &[&Path]) -> Options {
    let mut argv: Vec<String> = vec!["reforge".into()];
    argv.extend(args.iter().map(|a| a.to_string()));
    argv.extend(files.iter().map(|f| f.display().to_string()));
    Options::parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_write_rewrites_files_in_place() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("First.java");
    let second = dir.path().join("Second.java");
    fs::write(&first, "if (true) { go(); }\n").unwrap();
    fs::write(&second, "stay();\n").unwrap();

    let sink = Captured::default();
    let summary = run_files(&options(&["--write"], &[first.as_path(), second.as_path()]), &sink)
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(&first).unwrap(), "go();\n");
    assert_eq!(fs::read_to_string(&second).unwrap(), "stay();\n");
    assert_eq!((summary.processed, summary.changed, summary.failed), (2, 1, 0));
    assert!(sink.texts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_results_are_printed_in_argument_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..4)
        .map(|i| {
            let path = dir.path().join(format!("F{i}.java"));
            fs::write(&path, format!("x = (v{i});\n")).unwrap();
            path
        })
        .collect();
    let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();

    let sink = Captured::default();
    let summary = run_files(&options(&[], &refs), &sink).await.unwrap();

    assert!(summary.is_success());
    let texts = sink.texts.lock().unwrap();
    let expected: Vec<(PathBuf, String)> = paths
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), format!("x = v{i};\n")))
        .collect();
    assert_eq!(*texts, expected);
    // Printing only: the files themselves are untouched.
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "x = (v0);\n");
}

#[tokio::test]
async fn test_parse_failure_is_reported_and_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("Broken.java");
    let fine = dir.path().join("Fine.java");
    fs::write(&broken, "if (").unwrap();
    fs::write(&fine, "while (false) { }\n").unwrap();

    let sink = Captured::default();
    let summary = run_files(&options(&["--write"], &[broken.as_path(), fine.as_path()]), &sink)
        .await
        .unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.failed, 1);
    assert_eq!(fs::read_to_string(&fine).unwrap(), "");
    let errors = sink.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, broken);
}

#[tokio::test]
async fn test_config_file_and_flag_override() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("reforge.json");
    fs::write(
        &config,
        r#"{ "rules": ["dead-code"], "max_iterations": 0 }"#,
    )
    .unwrap();
    let file = dir.path().join("A.java");
    fs::write(&file, "x = (a);\nif (false) { b(); }\n").unwrap();
    let config_arg = config.display().to_string();

    // A zero cap cannot converge.
    let sink = Captured::default();
    let summary = run_files(&options(&["--config", config_arg.as_str()], &[file.as_path()]), &sink)
        .await
        .unwrap();
    assert_eq!(summary.failed, 1);
    assert!(sink.errors.lock().unwrap()[0].1.contains("no fixpoint"));

    // The flag wins; only dead code is removed, the parentheses stay.
    let sink = Captured::default();
    let args = ["--config", config_arg.as_str(), "--max-iterations", "5", "--report"];
    let summary = run_files(&options(&args, &[file.as_path()]), &sink).await.unwrap();
    assert!(summary.is_success());
    assert_eq!(*sink.reports.lock().unwrap(), vec![(file.clone(), 1)]);
    assert!(sink.texts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_tolerated_non_convergence() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("reforge.json");
    fs::write(
        &config,
        r#"{ "max_iterations": 0, "fail_on_non_convergence": false }"#,
    )
    .unwrap();
    let file = dir.path().join("A.java");
    fs::write(&file, "if (true) { a(); }\n").unwrap();

    let sink = Captured::default();
    let config_arg = config.display().to_string();
    let summary = run_files(&options(&["--config", config_arg.as_str()], &[file.as_path()]), &sink)
        .await
        .unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.changed, 0);
}

#[tokio::test]
async fn test_unknown_rule_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("A.java");
    fs::write(&file, "a();\n").unwrap();
    let sink = Captured::default();
    let result = run_files(&options(&["--rule", "no-such-rule"], &[file.as_path()]), &sink).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unknown_language_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("reforge.json");
    fs::write(&config, r#"{ "language": "cobol" }"#).unwrap();
    let file = dir.path().join("A.cbl");
    fs::write(&file, "a();\n").unwrap();

    let sink = Captured::default();
    let config_arg = config.display().to_string();
    let result =
        run_files(&options(&["--config", config_arg.as_str()], &[file.as_path()]), &sink).await;
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&file).unwrap(), "a();\n");
}

#[test]
fn test_rule_listing() {
    let listing = rule_listing();
    let names: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(names, ["dead-code", "simplify-expression", "testng-assert"]);
}
