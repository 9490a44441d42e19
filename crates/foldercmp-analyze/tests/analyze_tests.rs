use foldercmp_analyze::{
    Classification, CompareConfig, ComparisonEngine, ComparisonJob, ComparisonResult,
    ContentHasher, HashAlgorithm, Outcome, Side,
};
use foldercmp_core::ExclusionRules;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn key(relative: &str) -> String {
    relative.split('/').collect::<std::path::PathBuf>().to_string_lossy().into_owned()
}

/// Root A: f1.txt="hello", f2.txt="x". Root B: f1.txt="hello", f3.txt="y".
fn scenario_trees() -> (TempDir, TempDir) {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write(a.path(), "f1.txt", "hello");
    write(a.path(), "f2.txt", "x");
    write(b.path(), "f1.txt", "hello");
    write(b.path(), "f3.txt", "y");
    (a, b)
}

fn run(job: &ComparisonJob) -> Vec<ComparisonResult> {
    ComparisonEngine::new().compare(job).unwrap().collect()
}

fn tags(results: &[ComparisonResult]) -> Vec<(String, Classification)> {
    results
        .iter()
        .map(|r| (r.path.to_string(), r.classification()))
        .collect()
}

#[test]
fn test_scenario_without_rules() {
    let (a, b) = scenario_trees();
    let results = run(&ComparisonJob::new("scenario", a.path(), b.path()));

    assert_eq!(
        tags(&results),
        vec![
            ("f1.txt".to_string(), Classification::Identical),
            ("f2.txt".to_string(), Classification::OnlyInA),
            ("f3.txt".to_string(), Classification::OnlyInB),
        ]
    );
}

#[test]
fn test_scenario_with_rule_excludes_entirely() {
    let (a, b) = scenario_trees();
    let rules = ExclusionRules::compile("f2").unwrap();
    let results = run(&ComparisonJob::new("scenario", a.path(), b.path()).with_rules(rules));

    assert_eq!(
        tags(&results),
        vec![
            ("f1.txt".to_string(), Classification::Identical),
            ("f3.txt".to_string(), Classification::OnlyInB),
        ]
    );
}

#[test]
fn test_classification_completeness() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    for (rel, content) in [("x/1", "a"), ("x/2", "b"), ("y/3", "c"), ("top", "d")] {
        write(a.path(), rel, content);
    }
    for (rel, content) in [("x/1", "a"), ("x/2", "B"), ("z/4", "e"), ("top", "d")] {
        write(b.path(), rel, content);
    }

    let results = run(&ComparisonJob::new("complete", a.path(), b.path()));

    let emitted: Vec<String> = results.iter().map(|r| r.path.to_string()).collect();
    let unique: BTreeSet<String> = emitted.iter().cloned().collect();
    let expected: BTreeSet<String> = ["x/1", "x/2", "y/3", "z/4", "top"]
        .into_iter()
        .map(key)
        .collect();

    assert_eq!(emitted.len(), unique.len(), "no path may appear twice");
    assert_eq!(unique, expected);
}

#[test]
fn test_results_sorted_regardless_of_creation_order() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    for name in ["zz.txt", "B.txt", "a.txt", "m/inner.txt", "_x.txt", "a0.txt"] {
        write(a.path(), name, name);
    }
    for name in ["c.txt", "A.txt", "m.txt"] {
        write(b.path(), name, name);
    }

    let results = run(&ComparisonJob::new("order", a.path(), b.path()));
    let paths: Vec<String> = results.iter().map(|r| r.path.to_string()).collect();

    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
    assert_eq!(paths.first().map(String::as_str), Some("A.txt"));
}

#[test]
fn test_pruned_subtree_never_reported() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write(a.path(), "keep/file.txt", "1");
    write(a.path(), "node_modules/pkg/index.js", "left");
    write(a.path(), "node_modules/pkg/deep/more.js", "left");
    write(b.path(), "keep/file.txt", "1");
    write(b.path(), "node_modules/pkg/index.js", "right");

    let rules = ExclusionRules::compile("node_modules").unwrap();
    let engine = ComparisonEngine::new();
    let job = ComparisonJob::new("prune", a.path(), b.path()).with_rules(rules);
    let mut comparison = engine.compare(&job).unwrap();
    let results: Vec<_> = comparison.by_ref().collect();

    assert_eq!(tags(&results), vec![(key("keep/file.txt"), Classification::Identical)]);
    assert_eq!(comparison.stats_a().pruned_dirs, 1);
    assert_eq!(comparison.stats_b().pruned_dirs, 1);
    // root and keep on each side
    assert_eq!(comparison.stats_a().dirs_read, 2);
    assert_eq!(comparison.stats_b().dirs_read, 2);
}

#[test]
fn test_rules_are_regex_substrings_not_globs() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write(a.path(), "report.txt", "1");
    write(a.path(), "reportXtxt", "1");
    write(a.path(), "notes.md", "1");
    write(b.path(), "notes.md", "1");

    // `.` matches any character, and the rule is found inside the name
    let rules = ExclusionRules::compile("rt.txt").unwrap();
    let results = run(&ComparisonJob::new("regex", a.path(), b.path()).with_rules(rules));

    assert_eq!(tags(&results), vec![("notes.md".to_string(), Classification::Identical)]);

    // A glob-style rule is not valid here
    assert!(ExclusionRules::compile("*.txt").is_err());
}

#[test]
fn test_hash_ignores_mtime() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first.bin");
    let second = temp.path().join("second.bin");
    fs::write(&first, "same bytes").unwrap();
    fs::write(&second, "same bytes").unwrap();

    let old = SystemTime::now() - Duration::from_secs(86_400 * 30);
    fs::File::options()
        .write(true)
        .open(&second)
        .unwrap()
        .set_modified(old)
        .unwrap();

    let hasher = ContentHasher::new();
    assert_eq!(hasher.digest(&first).unwrap(), hasher.digest(&second).unwrap());

    fs::write(&second, "other bytes").unwrap();
    assert_ne!(hasher.digest(&first).unwrap(), hasher.digest(&second).unwrap());
}

#[test]
fn test_metadata_only_for_differing() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write(a.path(), "same.txt", "same");
    write(b.path(), "same.txt", "same");
    write(a.path(), "changed.txt", "short");
    write(b.path(), "changed.txt", "a bit longer");

    let results = run(&ComparisonJob::new("meta", a.path(), b.path()));
    assert_eq!(results.len(), 2);

    match &results[0].outcome {
        Outcome::Differing { a: left, b: right } => {
            assert_eq!(left.metadata.size, Some(5));
            assert_eq!(right.metadata.size, Some(12));
            assert!(left.metadata.modified.is_some());
            assert!(right.metadata.modified.is_some());
            assert_ne!(left.digest, right.digest);
            assert!(left.resolved.ends_with("changed.txt"));
            assert!(right.resolved.starts_with(b.path().canonicalize().unwrap()));
        }
        other => panic!("expected Differing, got {other:?}"),
    }

    // Identical carries no payload at all
    assert_eq!(results[1].outcome, Outcome::Identical);
}

#[test]
fn test_blake3_engine() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write(a.path(), "f", "one");
    write(b.path(), "f", "two");

    let config = CompareConfig::builder()
        .algorithm(HashAlgorithm::Blake3)
        .build()
        .unwrap();
    let engine = ComparisonEngine::with_config(config);
    let results: Vec<_> = engine
        .compare(&ComparisonJob::new("b3", a.path(), b.path()))
        .unwrap()
        .collect();

    match &results[0].outcome {
        Outcome::Differing { a, .. } => assert_eq!(a.digest.to_hex().len(), 64),
        other => panic!("expected Differing, got {other:?}"),
    }
}

#[test]
fn test_missing_root_is_an_error() {
    let a = TempDir::new().unwrap();
    let job = ComparisonJob::new("missing", a.path(), a.path().join("nope"));

    let err = ComparisonEngine::new().compare(&job).err().unwrap();
    assert!(matches!(err, foldercmp_core::CompareError::DirectoryNotFound { .. }));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_degrades_to_hash_error() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write(a.path(), "before.txt", "1");
    write(b.path(), "before.txt", "1");
    write(a.path(), "dangling", "real file on this side");
    std::os::unix::fs::symlink(b.path().join("missing-target"), b.path().join("dangling")).unwrap();
    write(a.path(), "zafter.txt", "1");
    write(b.path(), "zafter.txt", "2");

    let results = run(&ComparisonJob::new("errors", a.path(), b.path()));

    assert_eq!(
        tags(&results),
        vec![
            ("before.txt".to_string(), Classification::Identical),
            ("dangling".to_string(), Classification::HashError),
            ("zafter.txt".to_string(), Classification::Differing),
        ]
    );
    match &results[1].outcome {
        Outcome::HashError { side, resolved, cause } => {
            assert_eq!(*side, Side::B);
            assert!(resolved.ends_with("dangling"));
            assert!(!cause.is_empty());
        }
        other => panic!("expected HashError, got {other:?}"),
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_undecodable_names_are_not_merged() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    fs::write(a.path().join(OsStr::from_bytes(b"x\xff")), "one").unwrap();
    fs::write(a.path().join(OsStr::from_bytes(b"x\xfe")), "two").unwrap();
    fs::write(b.path().join(OsStr::from_bytes(b"x\xfd")), "one").unwrap();

    let results = run(&ComparisonJob::new("bytes", a.path(), b.path()));
    let classes: Vec<_> = results.iter().map(ComparisonResult::classification).collect();

    // Raw byte order: \xfd < \xfe < \xff, and no name pairs with another
    assert_eq!(
        classes,
        vec![Classification::OnlyInB, Classification::OnlyInA, Classification::OnlyInA]
    );
    match &results[2].outcome {
        Outcome::OnlyInA { resolved } => {
            assert_eq!(resolved.file_name().unwrap().as_bytes(), b"x\xff");
        }
        other => panic!("expected OnlyInA, got {other:?}"),
    }
    assert!(results.iter().all(|r| r.path == "x\u{FFFD}"));
}
