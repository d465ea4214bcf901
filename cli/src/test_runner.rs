use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use validator::{FaultKind, Report, Settings, Status};
use wrapper_tags::block::BlockId;
use wrapper_tags::source::Loader;

use crate::config;

const TEST_SUFFIX: &str = ".test.toml";

/// The parts of a test file the runner reads. Blocks, scope and settings are
/// left to the fixture loader.
#[derive(Debug, Default, Deserialize)]
struct TestFile {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    expect: Expectation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Expectation {
    /// `"ok"` or a fault kind is compared against the computed status,
    /// `"hidden"` requires that no status is displayed.
    #[serde(default)]
    status: Option<String>,

    /// Raw levels in sequence order.
    #[serde(default)]
    indents: Option<Vec<usize>>,

    /// Ids that must carry the middle flag; every other id must not.
    #[serde(default)]
    middle: Option<Vec<u64>>,

    #[serde(default)]
    load_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExpectedStatus {
    Ok,
    Hidden,
    Fault(FaultKind),
}

impl Expectation {
    fn status(&self) -> Result<Option<ExpectedStatus>, String> {
        let Some(status) = self.status.as_deref() else {
            return Ok(None);
        };
        let expected = match status {
            "ok" => ExpectedStatus::Ok,
            "hidden" => ExpectedStatus::Hidden,
            other => ExpectedStatus::Fault(other.parse()?),
        };
        Ok(Some(expected))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Pass,
    Fail(String),
}

struct TestResult {
    path: PathBuf,
    label: String,
    outcome: Outcome,
}

fn label_for(path: &Path, description: Option<&str>) -> String {
    match description {
        Some(d) => d.to_string(),
        None => path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(TEST_SUFFIX).to_string())
            .unwrap_or_else(|| "?".to_string()),
    }
}

fn run_file(path: &Path, settings: &Settings) -> TestResult {
    let (label, outcome) = match std::fs::read_to_string(path) {
        Ok(content) => run_source(&content, settings)
            .map(|(description, outcome)| (label_for(path, description.as_deref()), outcome))
            .unwrap_or_else(|reason| (label_for(path, None), Outcome::Fail(reason))),
        Err(e) => (label_for(path, None), Outcome::Fail(format!("cannot read file: {}", e))),
    };
    TestResult {
        path: path.to_path_buf(),
        label,
        outcome,
    }
}

/// Run one test file's content. `Err` means the file itself is unusable.
fn run_source(content: &str, settings: &Settings) -> Result<(Option<String>, Outcome), String> {
    let test: TestFile = toml::from_str(content).map_err(|e| format!("invalid test file: {}", e))?;
    let expect = &test.expect;
    let expected_status = expect.status()?;

    let settings = config::for_fixture(settings, content).map_err(|e| e.to_string())?;
    let fixture = match Loader::new(content, 0).with_registry(settings.registry()).load() {
        Ok(fixture) => fixture,
        Err(errors) => {
            let outcome = if expect.load_error {
                Outcome::Pass
            } else {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                Outcome::Fail(format!("fixture rejected: {}", messages.join("; ")))
            };
            return Ok((test.description, outcome));
        }
    };
    if expect.load_error {
        return Ok((
            test.description,
            Outcome::Fail("expected the fixture to be rejected, but it loaded".to_string()),
        ));
    }

    let report = validator::run(fixture.blocks(), &settings, None);

    let problems = compare(expect, expected_status.as_ref(), &report);
    let outcome = if problems.is_empty() {
        Outcome::Pass
    } else {
        Outcome::Fail(problems.join("\n"))
    };
    Ok((test.description, outcome))
}

fn compare(expect: &Expectation, status: Option<&ExpectedStatus>, report: &Report) -> Vec<String> {
    let mut problems = Vec::new();

    match status {
        None => {}
        Some(ExpectedStatus::Hidden) => {
            if let Some(shown) = &report.displayed {
                problems.push(format!("status: expected hidden, but displayed \"{}\"", shown));
            }
        }
        Some(ExpectedStatus::Ok) => {
            if let Status::Fault(fault) = &report.validation.status {
                problems.push(format!("status: expected ok, got {} ({})", fault.kind(), fault));
            }
        }
        Some(ExpectedStatus::Fault(kind)) => match &report.validation.status {
            Status::Ok => problems.push(format!("status: expected {}, got ok", kind)),
            Status::Fault(fault) if fault.kind() != *kind => {
                problems.push(format!("status: expected {}, got {} ({})", kind, fault.kind(), fault))
            }
            Status::Fault(_) => {}
        },
    }

    if let Some(expected) = &expect.indents {
        let actual = report.validation.indents.levels();
        if &actual != expected {
            problems.push(format!("indents: expected {:?}, got {:?}", expected, actual));
        }
    }

    if let Some(expected) = &expect.middle {
        let mut expected: Vec<BlockId> = expected.iter().copied().map(BlockId).collect();
        expected.sort();
        let mut actual: Vec<BlockId> = report
            .validation
            .indents
            .records()
            .iter()
            .filter(|r| r.middle)
            .map(|r| r.id)
            .collect();
        actual.sort();
        if actual != expected {
            problems.push(format!("middle: expected {:?}, got {:?}", expected, actual));
        }
    }

    problems
}

/// Test files grouped by their directory relative to `root` ("" for the root itself).
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut found: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            log::warn!("cannot read directory {}", dir.display());
            continue;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let is_test = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(TEST_SUFFIX));
            if is_test {
                let category = dir
                    .strip_prefix(root)
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                found.entry(category).or_default().push(path);
            }
        }
    }
    for files in found.values_mut() {
        files.sort();
    }
    found
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let found = discover(path);
    if found.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &found {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

/// Keep the categories named in `wanted` (and their subcategories). Unknown names are warned about.
fn select<'a>(
    found: &'a BTreeMap<String, Vec<PathBuf>>,
    wanted: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    if wanted.is_empty() {
        return found.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }
    let mut selected = BTreeMap::new();
    for name in wanted {
        let name = name.trim_matches('/');
        let prefix = format!("{}/", name);
        let before = selected.len();
        for (category, files) in found {
            if category == name || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            log::warn!("category '{}' not found", name);
        }
    }
    selected
}

struct Palette {
    plain: bool,
}

impl Palette {
    fn paint(&self, text: &str, code: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }
    fn pass(&self) -> String {
        self.paint("PASS", "32")
    }
    fn fail(&self) -> String {
        self.paint("FAIL", "31")
    }
    fn heading(&self, text: &str) -> String {
        self.paint(text, "1")
    }
}

/// Run the test file at `path`, or every test file below it. Returns the exit code.
pub fn run_tests(path: &Path, settings: &Settings, no_color: bool, categories: &[String]) -> i32 {
    let palette = Palette { plain: no_color };

    let groups: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        let found = discover(path);
        if found.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        let selected = select(&found, categories);
        if selected.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }
        selected
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    };

    let mut passed = 0usize;
    let mut failures = Vec::new();
    for (category, files) in &groups {
        if !path.is_file() {
            eprintln!();
            eprintln!("{}", palette.heading(category_label(category)));
        }
        for file in files {
            let result = run_file(file, settings);
            match result.outcome {
                Outcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", palette.pass(), result.label);
                }
                Outcome::Fail(_) => {
                    eprintln!("  {}  {}", palette.fail(), result.label);
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let Outcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", palette.paint("ok", "32"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            palette.paint("FAILED", "31"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
