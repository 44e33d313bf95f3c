use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn lf_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("lf");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[store]
path = "{}/data/lostfound.json"

[matching]
min_location = 20
min_description = 20
min_name = 20
invalid_dates = "reject"
"#,
        root.display()
    );

    let config_path = config_dir.join("lf.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_lf(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = lf_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run lf binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_json(config_path: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let (stdout, stderr, success) = run_lf(config_path, &full);
    assert!(success, "lf {:?} failed: {}", args, stderr);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("bad JSON ({}): {}", e, stdout))
}

const LOST_WALLET: &[&str] = &[
    "post",
    "--owner",
    "alice",
    "--status",
    "lost",
    "--type",
    "wallet",
    "--name",
    "black leather wallet",
    "--location",
    "Main Street Park",
    "--description",
    "lost my leather wallet",
    "--date",
    "2024-05-08",
];

fn found_wallet(command: &'static str, date: &'static str) -> Vec<&'static str> {
    vec![
        command,
        "--owner",
        "bob",
        "--status",
        "found",
        "--type",
        "Wallet",
        "--name",
        "black wallet",
        "--location",
        "Main St Park",
        "--description",
        "leather wallet",
        "--date",
        date,
    ]
}

#[test]
fn test_similarity_needs_no_config() {
    let (stdout, _, success) = run_lf(
        Path::new("/nonexistent/lf.toml"),
        &["--json", "similarity", "red ball", "red ball lost"],
    );
    assert!(success);
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["percent"], 67.0);
}

#[test]
fn test_missing_config_fails() {
    let (_, stderr, success) = run_lf(Path::new("/nonexistent/lf.toml"), &["items", "--owner", "a"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_post_match_and_notifications() {
    let (_tmp, config) = setup_test_env();

    let first = run_json(&config, LOST_WALLET);
    assert_eq!(first["matches"].as_array().unwrap().len(), 0);
    let lost_id = first["id"].as_str().unwrap().to_string();

    let preview = run_json(&config, &found_wallet("preview", "2024-05-10"));
    assert_eq!(preview.as_array().unwrap().len(), 1);

    let second = run_json(&config, &found_wallet("post", "2024-05-10"));
    let matches = second["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], lost_id.as_str());
    assert_eq!(matches[0]["locationMatch"], 67);
    assert_eq!(matches[0]["descriptionMatch"], 50);
    assert_eq!(matches[0]["nameMatch"], 67);

    let alice = run_json(&config, &["notifications", "--owner", "alice"]);
    assert_eq!(alice["unread"], 1);
    let note = &alice["notifications"][0];
    assert_eq!(note["reportId"], lost_id.as_str());
    assert_eq!(note["matchedItemId"], second["id"]);

    let note_id = note["id"].as_str().unwrap().to_string();
    let marked = run_json(&config, &["read", note_id.as_str()]);
    assert_eq!(marked["read"], true);

    let alice = run_json(&config, &["notifications", "--owner", "alice"]);
    assert_eq!(alice["unread"], 0);

    let bob = run_json(&config, &["notifications", "--owner", "bob"]);
    assert_eq!(bob["unread"], 1);
}

#[test]
fn test_found_before_lost_date_is_not_matched() {
    let (_tmp, config) = setup_test_env();
    run_json(&config, LOST_WALLET);

    let outcome = run_json(&config, &found_wallet("post", "2024-05-01"));
    assert!(outcome["matches"].as_array().unwrap().is_empty());

    let (stdout, _, success) = run_lf(&config, &["notifications", "--owner", "alice"]);
    assert!(success);
    assert!(stdout.contains("No notifications yet."));
}

#[test]
fn test_items_lists_own_reports() {
    let (_tmp, config) = setup_test_env();
    run_json(&config, LOST_WALLET);
    run_json(&config, &found_wallet("post", "2024-05-10"));

    let items = run_json(&config, &["items", "--owner", "alice"]);
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "lost");
    assert_eq!(items[0]["itemType"], "wallet");

    let (stdout, _, success) = run_lf(&config, &["items", "--owner", "nobody"]);
    assert!(success);
    assert!(stdout.contains("No reports."));
}

#[test]
fn test_invalid_status_is_rejected() {
    let (_tmp, config) = setup_test_env();
    let (_, _, success) = run_lf(
        &config,
        &["post", "--owner", "a", "--status", "stolen", "--type", "x", "--date", "2024-01-01"],
    );
    assert!(!success);
}

#[test]
fn test_read_unknown_notification_fails() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_lf(&config, &["read", "does-not-exist"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}
