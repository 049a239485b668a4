//! Integration tests for the analyzers and the aggregator.
//!
//! Only paths that do not need the external linters are exercised here: the
//! "no files" short-circuit, the heuristic and pattern-based Java metrics,
//! and languages without an analyzer. The Python security check accepts
//! either bandit output or the pattern fallback.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use lintreport::analysis::{
    Aggregator, AnalyzerSettings, JavaAnalyzer, LanguageAnalyzer, Metric, PythonAnalyzer,
};
use lintreport::language::Language;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Settings whose jar paths never exist.
fn settings() -> AnalyzerSettings {
    AnalyzerSettings {
        checkstyle_jar: PathBuf::from("/nonexistent/checkstyle.jar"),
        spotbugs_jar: PathBuf::from("/nonexistent/spotbugs.jar"),
        ..AnalyzerSettings::default()
    }
}

fn copy_fixture(from: &Path, to: &Path) {
    for entry in fs::read_dir(from).expect("should read fixture dir") {
        let entry = entry.expect("should read entry");
        fs::copy(entry.path(), to.join(entry.file_name())).expect("should copy fixture");
    }
}

#[test]
fn test_empty_directory_scores_ten_everywhere() {
    let temp = TempDir::new().unwrap();
    let analyzers: Vec<Box<dyn LanguageAnalyzer>> = vec![
        Box::new(PythonAnalyzer::new(settings())),
        Box::new(JavaAnalyzer::new(settings())),
        lintreport::analysis::analyzer_for(Language::JavaScript, &settings()).unwrap(),
    ];

    for analyzer in analyzers {
        for metric in Metric::ALL {
            let result = analyzer.analyze(metric, temp.path());
            assert_eq!(result.score, 10.0, "{} {}", analyzer.name(), metric);
            assert_eq!(
                result.issues,
                vec![format!("No {} files found", analyzer.name())]
            );
        }
    }
}

#[test]
fn test_java_security_falls_back_to_patterns() {
    let temp = TempDir::new().unwrap();
    copy_fixture(&testdata_path().join("java"), temp.path());

    let analyzer = JavaAnalyzer::new(settings());
    let result = analyzer.analyze_security(temp.path());

    assert!(result.issues[0].starts_with("SpotBugs JAR not found at /nonexistent/spotbugs.jar"));
    assert!(result.score < 10.0);
    assert!(result
        .issues
        .iter()
        .any(|i| i.contains("Sample.java: Potential command injection")));
    assert!(result
        .issues
        .iter()
        .any(|i| i.contains("Information leakage through stack traces")));
}

#[test]
fn test_java_complexity_heuristic() {
    let temp = TempDir::new().unwrap();
    copy_fixture(&testdata_path().join("java"), temp.path());

    let analyzer = JavaAnalyzer::new(settings());
    let result = analyzer.analyze_complexity(temp.path());

    assert_eq!(result.issues.len(), 1);
    assert!(result.issues[0].ends_with("Sample.java: Estimated complexity: 5 statements"));
    assert!((0.0..=10.0).contains(&result.score));
}

#[test]
fn test_java_style_without_checkstyle_is_neutral() {
    let temp = TempDir::new().unwrap();
    copy_fixture(&testdata_path().join("java"), temp.path());

    let result = JavaAnalyzer::new(settings()).analyze_style(temp.path());
    assert_eq!(result.score, 5.0);
    assert_eq!(
        result.issues,
        vec!["Checkstyle JAR not found at /nonexistent/checkstyle.jar, skipping style analysis".to_string()]
    );
}

#[test]
fn test_javascript_audit_needs_package_json() {
    let temp = TempDir::new().unwrap();
    copy_fixture(&testdata_path().join("javascript"), temp.path());

    let analyzer = lintreport::analysis::analyzer_for(Language::JavaScript, &settings()).unwrap();
    let result = analyzer.analyze_security(temp.path());
    assert_eq!(result.score, 5.0);
    assert_eq!(
        result.issues,
        vec!["No package.json found, skipping security audit".to_string()]
    );
}

#[test]
fn test_python_command_injection_is_flagged() {
    let temp = TempDir::new().unwrap();
    copy_fixture(&testdata_path().join("python"), temp.path());

    let result = PythonAnalyzer::new(settings()).analyze_security(temp.path());

    assert!(result.score < 10.0, "score was {}", result.score);
    assert!(
        result
            .issues
            .iter()
            .any(|i| i.contains("Potential command injection") || i.contains("Issue:")),
        "issues: {:?}",
        result.issues
    );
}

#[test]
fn test_aggregator_lists_languages_without_analyzers() {
    let aggregator = Aggregator::new(settings());
    let root = testdata_path().join("mixed");

    let run = aggregator.run(&root, "mixed").unwrap();

    assert_eq!(run.len(), 2);
    assert_eq!(run.total_files(), 2);
    let languages: Vec<Language> = run.reports().map(|r| r.language).collect();
    assert_eq!(languages, vec![Language::Go, Language::Ruby]);
    for report in run.reports() {
        for metric in Metric::ALL {
            assert_eq!(report.metric(metric).score, 0.0);
            assert!(report.metric(metric).issues.is_empty());
        }
        assert_eq!(report.overall(), 0.0);
    }
}

#[test]
fn test_aggregator_empty_directory() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("README.md"), "# nothing\n").unwrap();

    let run = Aggregator::new(settings()).run(temp.path(), "empty").unwrap();
    assert!(run.is_empty());
    assert_eq!(run.total_files(), 0);
}
