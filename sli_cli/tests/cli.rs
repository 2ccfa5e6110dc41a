use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const FIXTURE: &str = r#"[
  {"namespace": "prod/sli", "metric_name": "Success", "dimensions": [{"Name": "Hostname", "Value": "idp"}], "datapoints": [{"Sum": 60.0}, {"Sum": 35.0}]},
  {"namespace": "prod/sli", "metric_name": "Total", "dimensions": [{"Name": "Hostname", "Value": "idp"}], "datapoints": [{"Sum": 100.0}]},
  {"namespace": "prod/sli", "metric_name": "Fast", "dimensions": [], "datapoints": [{"Sum": 0.0}]},
  {"namespace": "prod/sli", "metric_name": "Slow", "dimensions": [], "datapoints": [{"Sum": 0.0}]}
]"#;

const SLIS: &str = r#"{
  "availability": {
    "window_days": 1,
    "numerator": [{"namespace": "prod/sli", "metric_name": "Success", "dimensions": [{"Name": "Hostname", "Value": "idp"}], "statistic": "Sum", "multiplier": 1.0}],
    "denominator": [{"namespace": "prod/sli", "metric_name": "Total", "dimensions": [{"Name": "Hostname", "Value": "idp"}], "statistic": "Sum"}]
  },
  "idle": {
    "numerator": [{"namespace": "prod/sli", "metric_name": "Fast", "dimensions": []}],
    "denominator": [{"namespace": "prod/sli", "metric_name": "Slow", "dimensions": []}]
  },
  "broken": {
    "denominator": [{"namespace": "prod/sli", "metric_name": "Total", "dimensions": []}]
  }
}"#;

fn sli_publisher() -> Command {
    let mut cmd = Command::cargo_bin("sli-publisher").unwrap();
    for var in [
        "SLI_NAMESPACE",
        "SLI_PREFIX",
        "SLIS",
        "WINDOW_DAYS",
        "SLI_BACKEND_URL",
        "SLI_BACKEND_TOKEN",
        "SLI_BACKEND_TIMEOUT",
        "SLI_LOG_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn read_report(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn outcome<'a>(report: &'a Value, sli: &str) -> &'a Value {
    report["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["sli"] == sli)
        .unwrap()
}

#[test]
fn test_run_publishes_and_isolates_failures() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);
    let report = dir.path().join("report.json");

    sli_publisher()
        .env("SLI_NAMESPACE", "prod/sli-derived")
        .env("SLI_PREFIX", "prod")
        .env("SLIS", SLIS)
        .env("WINDOW_DAYS", "30")
        .arg("run")
        .arg("--fixture")
        .arg(&fixture)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("SLIs: 2 valid, 1 skipped"))
        .stdout(predicate::str::contains("prod-availability"))
        .stderr(predicate::str::contains("Skipping malformed SLI"));

    let report = read_report(&report);
    assert_eq!(report["namespace"], "prod/sli-derived");
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 2);

    let availability = outcome(&report, "availability");
    assert_eq!(availability["status"], "published");
    assert_eq!(availability["metric_name"], "prod-availability");
    assert_eq!(availability["value"].as_f64(), Some(0.95));

    let idle = outcome(&report, "idle");
    assert_eq!(idle["status"], "skipped");
    assert_eq!(idle["reason"]["kind"], "no_data");
}

#[test]
fn test_flags_override_environment() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);
    let slis = write(&dir, "slis.json", SLIS);
    let report = dir.path().join("report.json");

    sli_publisher()
        .env("SLI_NAMESPACE", "ignored")
        .env("SLI_PREFIX", "ignored")
        .args(["run", "--namespace", "stage/sli", "--prefix", "stage", "--window-days", "7"])
        .arg("--slis-file")
        .arg(&slis)
        .arg("--fixture")
        .arg(&fixture)
        .arg("--dry-run")
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let report = read_report(&report);
    assert_eq!(report["prefix"], "stage");
    let availability = outcome(&report, "availability");
    assert_eq!(availability["status"], "dry_run");
    assert_eq!(availability["metric_name"], "stage-availability");
}

#[test]
fn test_strict_datapoints_rejects_split_windows() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);
    let report = dir.path().join("report.json");

    sli_publisher()
        .env("SLI_NAMESPACE", "ns")
        .env("SLI_PREFIX", "prod")
        .env("SLIS", SLIS)
        .env("WINDOW_DAYS", "30")
        .args(["run", "--strict-datapoints"])
        .arg("--fixture")
        .arg(&fixture)
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let report = read_report(&report);
    let availability = outcome(&report, "availability");
    assert_eq!(availability["reason"]["kind"], "query_failed");
}

#[test]
fn test_markdown_report() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);
    let report = dir.path().join("report.md");

    sli_publisher()
        .env("SLI_NAMESPACE", "ns")
        .env("SLI_PREFIX", "prod")
        .env("SLIS", SLIS)
        .env("WINDOW_DAYS", "30")
        .arg("run")
        .arg("--fixture")
        .arg(&fixture)
        .arg("--report")
        .arg(&report)
        .args(["--report-format", "markdown"])
        .assert()
        .success();

    let markdown = std::fs::read_to_string(&report).unwrap();
    assert!(markdown.contains("| availability | prod-availability | 0.950000 | published |"));
}

#[test]
fn test_missing_namespace_is_fatal() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);

    sli_publisher()
        .env("SLI_PREFIX", "prod")
        .env("SLIS", SLIS)
        .env("WINDOW_DAYS", "30")
        .arg("run")
        .arg("--fixture")
        .arg(&fixture)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--namespace"));
}

#[test]
fn test_non_integer_window_is_fatal() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);

    sli_publisher()
        .env("SLI_NAMESPACE", "ns")
        .env("SLI_PREFIX", "prod")
        .env("SLIS", SLIS)
        .env("WINDOW_DAYS", "thirty")
        .arg("run")
        .arg("--fixture")
        .arg(&fixture)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--window-days"));
}

#[test]
fn test_unparseable_slis_are_fatal() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);

    sli_publisher()
        .env("SLI_NAMESPACE", "ns")
        .env("SLI_PREFIX", "prod")
        .env("SLIS", "{not json")
        .env("WINDOW_DAYS", "30")
        .arg("run")
        .arg("--fixture")
        .arg(&fixture)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load SLI definitions"));
}

#[test]
fn test_validate_applies_default_window() {
    let slis = r#"{
      "latency": {
        "numerator": [{"namespace": "ns", "metric_name": "Fast", "dimensions": []}],
        "denominator": [{"namespace": "ns", "metric_name": "All", "dimensions": []}]
      }
    }"#;

    sli_publisher()
        .env("SLIS", slis)
        .env("WINDOW_DAYS", "14")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("latency window 14 days"))
        .stdout(predicate::str::contains("All SLI definitions are valid"));
}

#[test]
fn test_validate_reports_malformed_entries() {
    sli_publisher()
        .env("SLIS", SLIS)
        .env("WINDOW_DAYS", "30")
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("broken: missing required field 'numerator'"));
}

#[test]
fn test_list_statistics() {
    sli_publisher()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("SampleCount"))
        .stdout(predicate::str::contains("Maximum"));
}

#[test]
fn test_oversized_default_window_is_fatal() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);

    sli_publisher()
        .env("SLI_NAMESPACE", "ns")
        .env("SLI_PREFIX", "prod")
        .env("SLIS", SLIS)
        .env("WINDOW_DAYS", "4294967295")
        .arg("run")
        .arg("--fixture")
        .arg(&fixture)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--window-days"));
}

#[test]
fn test_oversized_entry_window_skips_only_that_sli() {
    let dir = TempDir::new().unwrap();
    let fixture = write(&dir, "fixture.json", FIXTURE);
    let report = dir.path().join("report.json");
    let slis = r#"{
      "huge": {
        "window_days": 4000000000,
        "numerator": [{"namespace": "prod/sli", "metric_name": "Fast", "dimensions": []}],
        "denominator": [{"namespace": "prod/sli", "metric_name": "Slow", "dimensions": []}]
      },
      "availability": {
        "numerator": [{"namespace": "prod/sli", "metric_name": "Success", "dimensions": [{"Name": "Hostname", "Value": "idp"}]}],
        "denominator": [{"namespace": "prod/sli", "metric_name": "Total", "dimensions": [{"Name": "Hostname", "Value": "idp"}]}]
      }
    }"#;

    sli_publisher()
        .env("SLI_NAMESPACE", "ns")
        .env("SLI_PREFIX", "prod")
        .env("SLIS", slis)
        .env("WINDOW_DAYS", "30")
        .arg("run")
        .arg("--fixture")
        .arg(&fixture)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("SLIs: 1 valid, 1 skipped"))
        .stdout(predicate::str::contains("huge: field 'window_days' is invalid"));

    let report = read_report(&report);
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 1);
    assert_eq!(outcome(&report, "availability")["status"], "published");
}
