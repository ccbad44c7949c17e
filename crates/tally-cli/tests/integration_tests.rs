//! End-to-end tests for the `tally` binary against a throwaway catalog.

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `tally` invocation isolated from the user's config, data dir and env.
fn tally(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("TALLY_STORE")
        .env_remove("RUST_LOG")
        .arg("--store")
        .arg(home.join("catalog.json"))
        .args(["--output-format", "plain"]);
    cmd
}

fn write_manifest(root: &Path, dir: &str, manifest: &str, file: &str, bytes: &[u8]) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("template.toml"), manifest).unwrap();
    fs::write(dir.join(file), bytes).unwrap();
}

const XLSX: &[u8] = b"PK\x03\x04\x14\x00\x06\x00workbook";

// ── basics ────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_command_groups() {
    let temp = TempDir::new().unwrap();
    tally(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("subtotal"))
        .stdout(predicate::str::contains("variable"))
        .stdout(predicate::str::contains("template"));
}

#[test]
fn version_is_printed() {
    let temp = TempDir::new().unwrap();
    tally(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_color_accepts_conventional_values() {
    let temp = TempDir::new().unwrap();
    for value in ["1", "", "0", "yes"] {
        tally(temp.path())
            .env("NO_COLOR", value)
            .args(["subtotal", "list"])
            .assert()
            .success();
    }
}

#[test]
fn check_position_accepts_grammar() {
    let temp = TempDir::new().unwrap();
    for pos in ["A1", "Z99", "AB100"] {
        tally(temp.path())
            .args(["template", "check-position", pos])
            .assert()
            .success();
    }
}

#[test]
fn check_position_rejects_with_exit_2() {
    let temp = TempDir::new().unwrap();
    for pos in ["A0", "1A", "a1"] {
        tally(temp.path())
            .args(["template", "check-position", pos])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid cell position"));
    }
}

// ── subtotals ─────────────────────────────────────────────────────────────────

#[test]
fn add_show_remove_vat() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    tally(home)
        .args(["subtotal", "add", "7", "VAT", "21"])
        .assert()
        .success();

    tally(home)
        .args(["subtotal", "remove", "7", "--expect-version", "0", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REMOVED"));

    tally(home)
        .args(["--output-format", "json", "subtotal", "show", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_deleted\": true"));

    // Gone from the active listing, present with --all.
    tally(home)
        .args(["subtotal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VAT").not());
    tally(home)
        .args(["subtotal", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(removed)"));
}

#[test]
fn remove_unknown_code_exits_3() {
    let temp = TempDir::new().unwrap();
    tally(temp.path())
        .args(["subtotal", "remove", "42", "--expect-version", "0", "-y"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("NOT_FOUND"));
}

#[test]
fn associated_subtotal_is_kept() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    tally(home)
        .args(["subtotal", "add", "9", "Early payment", "5", "--discount"])
        .assert()
        .success();
    tally(home)
        .args(["variable", "add", "TOTAL_DISCOUNT", "subtotal", "--subtotal", "9"])
        .assert()
        .success();

    // Binding the variable bumped the subtotal's version.
    tally(home)
        .args(["subtotal", "remove", "9", "--expect-version", "0", "-y"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("NOT_UPDATED"));

    tally(home)
        .args(["subtotal", "remove", "9", "--expect-version", "1", "-y"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ASSOCIATED_WITH_VARIABLE"));

    tally(home)
        .args(["subtotal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Early payment"));
}

#[test]
fn update_requires_current_version() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    tally(home)
        .args(["subtotal", "add", "7", "VAT", "21"])
        .assert()
        .success();
    tally(home)
        .args(["subtotal", "update", "7", "--expect-version", "0", "--percentage", "19"])
        .assert()
        .success();
    tally(home)
        .args(["subtotal", "update", "7", "--expect-version", "0", "--name", "IVA"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("changed since version 0"));
}

#[test]
fn apply_prints_adjusted_amount() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    tally(home)
        .args(["subtotal", "add", "7", "VAT", "21"])
        .assert()
        .success();
    tally(home)
        .args(["subtotal", "apply", "7", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("121"));
}

// ── templates ─────────────────────────────────────────────────────────────────

#[test]
fn import_then_validate_template() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let templates = home.join("templates");

    write_manifest(
        &templates,
        "invoice",
        r#"
[template]
name = "Invoice-A4"
file = "invoice.xlsx"

[[bindings]]
position = "B4"
variable = "CLIENT_NAME"
"#,
        "invoice.xlsx",
        XLSX,
    );

    tally(home)
        .args(["variable", "add", "CLIENT_NAME", "client-name"])
        .assert()
        .success();
    tally(home)
        .args(["template", "import"])
        .arg(&templates)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 'Invoice-A4'"));

    tally(home)
        .args(["template", "validate", "Invoice-A4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"));

    tally(home)
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice.xlsx"));
}

#[test]
fn import_reports_invalid_file() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let templates = home.join("templates");

    write_manifest(
        &templates,
        "notes",
        "[template]\nname = \"Notes\"\nfile = \"notes.xlsx\"\n",
        "notes.xlsx",
        b"just some text",
    );

    tally(home)
        .args(["template", "import"])
        .arg(&templates)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("INVALID_FILE"));

    tally(home)
        .args(["template", "validate", "Notes"])
        .assert()
        .code(3);
}

// ── init / config ─────────────────────────────────────────────────────────────

#[test]
fn init_creates_config_and_catalog() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let config = home.join("tally.toml");

    tally(home)
        .arg("--config")
        .arg(&config)
        .arg("init")
        .assert()
        .success();
    assert!(config.exists());
    assert!(home.join("catalog.json").exists());

    // The written file loads back.
    tally(home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "output.format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auto"));
}

#[test]
fn config_get_reports_store_override() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let expected = home.join("catalog.json");

    tally(home)
        .args(["config", "get", "storage.path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn environment_overrides_config() {
    let temp = TempDir::new().unwrap();
    tally(temp.path())
        .env("TALLY__VALIDATION__MAX_NAME_LENGTH", "12")
        .args(["config", "get", "validation.max_name_length"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12"));
}
