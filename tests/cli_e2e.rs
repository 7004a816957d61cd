//! End-to-end CLI tests for the mpw-catalog binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use catalog_core::{ProjectRecord, RecordStore};
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary with config lookups pointed at an empty directory.
fn catalog_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mpw-catalog").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .env_remove("MPW_CATALOG_GIT_USERNAME")
        .env_remove("MPW_CATALOG_GIT_TOKEN");
    cmd
}

fn record(id: &str, owner: &str, summary: &str) -> ProjectRecord {
    let mut record = ProjectRecord::new(id);
    record.owner = owner.to_string();
    record.summary = summary.to_string();
    record
}

fn seeded_store(dir: &Path) -> PathBuf {
    let path = dir.join("projects.json");
    RecordStore::new(&path)
        .save(&[
            record("3", "carol", "SRAM macro test chip"),
            record("1", "alice", "RISC-V core"),
            record("2", "bob", "UART and SPI peripherals"),
        ])
        .unwrap();
    path
}

#[test]
fn test_binary_help_displays_usage() {
    let temp = TempDir::new().unwrap();
    catalog_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Harvest and query"))
        .stdout(predicate::str::contains("update-cache"));
}

#[test]
fn test_binary_version_displays_version() {
    let temp = TempDir::new().unwrap();
    catalog_cmd(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mpw-catalog"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let temp = TempDir::new().unwrap();
    catalog_cmd(temp.path()).assert().failure();
}

#[test]
fn test_list_without_store_points_to_update_cache() {
    let temp = TempDir::new().unwrap();
    catalog_cmd(temp.path())
        .args(["--store"])
        .arg(temp.path().join("missing.json"))
        .arg("list")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mpw-catalog update-cache"));
}

#[test]
fn test_list_narrows_to_piped_ids() {
    let temp = TempDir::new().unwrap();
    let store = seeded_store(temp.path());

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .args(["list", "--fields", "id,owner"])
        .write_stdin("2 foo\nx\n")
        .assert()
        .success()
        .stdout("2\tbob\n");
}

#[test]
fn test_list_outputs_records_sorted_by_id() {
    let temp = TempDir::new().unwrap();
    let store = seeded_store(temp.path());

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .args(["list", "--fields", "id"])
        .write_stdin("3\n1\n2\n")
        .assert()
        .success()
        .stdout("1\n2\n3\n");
}

#[test]
fn test_list_rejects_unknown_field() {
    let temp = TempDir::new().unwrap();
    let store = seeded_store(temp.path());

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .args(["list", "--fields", "id,colour"])
        .write_stdin("1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_show_prints_every_field_of_one_record() {
    let temp = TempDir::new().unwrap();
    let store = seeded_store(temp.path());

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .args(["show", "--id", "3"])
        .write_stdin("1\n2\n3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("owner     carol"))
        .stdout(predicate::str::contains("precheck  n/a"))
        .stdout(predicate::str::contains("alice").not());
}

#[test]
fn test_ip_search_matches_summary_case_insensitively() {
    let temp = TempDir::new().unwrap();
    let store = seeded_store(temp.path());

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .args(["ip-search", "uart"])
        .write_stdin("1\n2\n3\n")
        .assert()
        .success()
        .stdout("2\tbob\tUART and SPI peripherals\n");
}

#[test]
fn test_invalid_config_file_reports_line() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("mpw-catalog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "concurrency = 8\nspeed = 3\n").unwrap();

    catalog_cmd(temp.path())
        .arg("list")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("speed"))
        .stderr(predicate::str::contains("line 2"));
}

const WRAPPER_DEF: &str = "DESIGN user_project_wrapper ;\nCOMPONENTS 1 ;\n\
    - mprj macro_a + FIXED ( 0 0 ) N ;\nEND COMPONENTS\nEND DESIGN\n";

/// Writes a config file pointing the contents API at `api_base`.
fn write_api_config(config_home: &Path, api_base: &str) {
    let config_dir = config_home.join("mpw-catalog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("api_base = \"{api_base}\"\n"),
    )
    .unwrap();
}

fn store_with(dir: &Path, records: &[ProjectRecord]) -> PathBuf {
    let path = dir.join("projects.json");
    RecordStore::new(&path).save(records).unwrap();
    path
}

fn with_repo(id: &str, giturl: &str) -> ProjectRecord {
    let mut record = ProjectRecord::new(id);
    record.giturl = giturl.to_string();
    record
}

fn mount_file(server: &MockServer, route: &str, status: u16, remaining: &str, body: &str) {
    tokio_test::block_on(
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("X-RateLimit-Remaining", remaining)
                    .set_body_string(body),
            )
            .mount(server),
    );
}

#[test]
fn test_pins_prints_partial_max_then_fails_when_quota_runs_out() {
    let temp = TempDir::new().unwrap();
    let server = tokio_test::block_on(MockServer::start());
    mount_file(
        &server,
        "/repos/octo/one/contents/def/user_project_wrapper.def",
        200,
        "10",
        WRAPPER_DEF,
    );
    mount_file(
        &server,
        "/repos/octo/one/contents/lef/macro_a.lef",
        200,
        "9",
        "PIN a\nPIN b\nPIN c\n",
    );
    mount_file(
        &server,
        "/repos/octo/two/contents/def/user_project_wrapper.def",
        200,
        "0",
        WRAPPER_DEF,
    );
    write_api_config(temp.path(), &server.uri());
    let store = store_with(
        temp.path(),
        &[
            with_repo("1", "https://github.com/octo/one"),
            with_repo("2", "https://github.com/octo/two"),
        ],
    );

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .arg("pins")
        .write_stdin("1\n2\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("max pins 3 in project 1"))
        .stderr(predicate::str::contains("quota exhausted"));
}

#[test]
fn test_fetch_file_prints_decoded_content() {
    let temp = TempDir::new().unwrap();
    let server = tokio_test::block_on(MockServer::start());
    // base64("hello")
    mount_file(
        &server,
        "/repos/octo/chip/contents/docs/readme.txt",
        200,
        "4999",
        r#"{"content":"aGVsbG8=\n","encoding":"base64"}"#,
    );
    write_api_config(temp.path(), &server.uri());
    let store = store_with(temp.path(), &[with_repo("3", "https://github.com/octo/chip.git")]);

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .args(["fetch-file", "3", "docs/readme.txt"])
        .assert()
        .success()
        .stdout("hello");
}

#[test]
fn test_fetch_file_missing_path_fails() {
    let temp = TempDir::new().unwrap();
    let server = tokio_test::block_on(MockServer::start());
    mount_file(
        &server,
        "/repos/octo/chip/contents/docs/missing.txt",
        404,
        "4998",
        r#"{"message":"Not Found"}"#,
    );
    write_api_config(temp.path(), &server.uri());
    let store = store_with(temp.path(), &[with_repo("3", "https://github.com/octo/chip")]);

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .args(["fetch-file", "3", "docs/missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("docs/missing.txt not found in octo/chip"));
}

#[test]
fn test_list_with_empty_pipe_explains_empty_result() {
    let temp = TempDir::new().unwrap();
    let store = seeded_store(temp.path());

    catalog_cmd(temp.path())
        .arg("--store")
        .arg(&store)
        .arg("list")
        .write_stdin("")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("held no project ids"));
}
