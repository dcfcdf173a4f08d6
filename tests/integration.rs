use std::path::Path;
use std::process::Command;

fn menuorg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_menuorg"));
    cmd.current_dir(dir);
    cmd
}

const SNAPSHOT: &str = r#"[
  {"slug": "index.php", "title": "Dashboard"},
  {"slug": "separator1", "title": ""},
  {"slug": "edit.php", "title": "Posts"},
  {"slug": "upload.php", "title": "Media"},
  {"slug": "wp_file_manager", "title": "File Manager", "plugin_page": true},
  {"slug": "tools.php", "title": "Tools"}
]"#;

fn write_fixture(dir: &Path, order: &[&str]) {
    let config = serde_json::json!({ "menu_order": order });
    std::fs::write(dir.join("settings.json"), config.to_string()).unwrap();
    std::fs::write(dir.join("menu.json"), SNAPSHOT).unwrap();
}

#[test]
fn check_passes_a_clean_config() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &["separator: Content", "edit.php", "upload.php"]);

    let out = menuorg_cmd(dir.path()).arg("check").output().unwrap();
    assert!(
        out.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("menu order OK"), "unexpected output: {stdout}");
}

#[test]
fn check_exits_one_on_unresolved_references() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &["edit.php", "does-not-exist.php"]);

    let out = menuorg_cmd(dir.path()).arg("check").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("does-not-exist.php"), "missing warning: {stderr}");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 unresolved references"), "unexpected output: {stdout}");
}

#[test]
fn check_exits_two_when_the_snapshot_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = serde_json::json!({ "menu_order": ["edit.php"] });
    std::fs::write(dir.path().join("settings.json"), config.to_string()).unwrap();

    let out = menuorg_cmd(dir.path()).arg("check").output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Menu Snapshot Not Found"), "unexpected stderr: {stderr}");
}

#[test]
fn preview_orders_specified_groups_then_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        dir.path(),
        &["separator: Content", "edit.php", "upload.php", "separator", "tools.php"],
    );

    let out = menuorg_cmd(dir.path()).arg("preview").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);

    let content = stdout.find("Content (separator-group-1)").expect("labeled separator");
    let edit = stdout.find("edit.php").expect("edit.php");
    let upload = stdout.find("upload.php").expect("upload.php");
    let custom = stdout.find("(separator-custom-1)").expect("plain separator");
    let tools = stdout.find("tools.php").expect("tools.php");
    let index = stdout.find("index.php").expect("leftover index.php");

    assert!(content < edit && edit < upload, "group out of order: {stdout}");
    assert!(upload < custom && custom < tools, "plain separator misplaced: {stdout}");
    assert!(tools < index, "leftovers must follow specified entries: {stdout}");
    assert!(
        stdout.contains("index.php  Dashboard  *"),
        "unspecified marker missing: {stdout}"
    );
}

#[test]
fn preview_marks_the_current_group_locked() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &["separator: Plugins", "wp_file_manager"]);

    let out = menuorg_cmd(dir.path())
        .args(["preview", "--current", "admin.php?page=wp_file_manager"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Plugins (separator-group-1) [current]"),
        "lock marker missing: {stdout}"
    );
}

#[test]
fn export_emits_the_bootstrap_payload() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(
        dir.path(),
        &["separator: Content", "edit.php", "wp_file_manager", "separator", "tools.php"],
    );

    let out = menuorg_cmd(dir.path()).arg("export").output().unwrap();
    assert!(out.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

    let hash = payload["config_hash"].as_str().unwrap();
    assert_eq!(hash.len(), 64, "expected a sha-256 hex digest");

    // Only the labeled separator's group is accordion-eligible.
    let groups = payload["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["separator_id"], "separator-group-1");
    let members = groups[0]["members"].as_array().unwrap();
    assert_eq!(members[0], "edit.php");
    assert_eq!(members[1], "admin.php?page=wp_file_manager");
}

#[test]
fn export_hash_matches_the_hash_command() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), &["edit.php"]);

    let export = menuorg_cmd(dir.path()).arg("export").output().unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&export.stdout).unwrap();
    let embedded = payload["config_hash"].as_str().unwrap().to_string();

    let hash = menuorg_cmd(dir.path()).arg("hash").output().unwrap();
    let stdout = String::from_utf8_lossy(&hash.stdout);
    assert!(stdout.starts_with(&embedded), "hash mismatch: {stdout} vs {embedded}");
    assert!(stdout.contains("(file)"), "source tag missing: {stdout}");
}

#[test]
fn scaffold_prints_addressable_references_without_host_separators() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("menu.json"), SNAPSHOT).unwrap();

    let out = menuorg_cmd(dir.path()).arg("scaffold").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(
        lines,
        vec![
            "index.php",
            "edit.php",
            "upload.php",
            "admin.php?page=wp_file_manager",
            "tools.php",
        ]
    );
}

#[test]
fn simulate_persists_panel_state_until_the_config_changes() {
    let dir = tempfile::tempdir().unwrap();
    let config = serde_json::json!({
        "menu_order": ["separator: Content", "edit.php"],
        "accordion_enabled": true,
    });
    std::fs::write(dir.path().join("settings.json"), config.to_string()).unwrap();
    std::fs::write(dir.path().join("menu.json"), SNAPSHOT).unwrap();

    let toggled = menuorg_cmd(dir.path())
        .args(["simulate", "--toggle", "separator-group-1"])
        .output()
        .unwrap();
    assert!(toggled.status.success());
    let stdout = String::from_utf8_lossy(&toggled.stdout);
    assert!(
        stdout.contains("separator-group-1  collapsed  aria-expanded=false"),
        "toggle not applied: {stdout}"
    );

    // The collapse survives a fresh invocation.
    let rerun = menuorg_cmd(dir.path()).arg("simulate").output().unwrap();
    let stdout = String::from_utf8_lossy(&rerun.stdout);
    assert!(stdout.contains("separator-group-1  collapsed"), "state lost: {stdout}");

    // Editing the config changes the fingerprint and resets every panel.
    let edited = serde_json::json!({
        "menu_order": ["separator: Content", "edit.php", "upload.php"],
        "accordion_enabled": true,
    });
    std::fs::write(dir.path().join("settings.json"), edited.to_string()).unwrap();
    let reset = menuorg_cmd(dir.path()).arg("simulate").output().unwrap();
    let stdout = String::from_utf8_lossy(&reset.stdout);
    assert!(stdout.contains("separator-group-1  expanded"), "state not reset: {stdout}");
}

#[test]
fn simulate_refuses_to_collapse_the_current_group() {
    let dir = tempfile::tempdir().unwrap();
    let config = serde_json::json!({
        "menu_order": ["separator: Plugins", "wp_file_manager"],
        "accordion_enabled": true,
    });
    std::fs::write(dir.path().join("settings.json"), config.to_string()).unwrap();
    std::fs::write(dir.path().join("menu.json"), SNAPSHOT).unwrap();

    let out = menuorg_cmd(dir.path())
        .args([
            "simulate",
            "--toggle",
            "separator-group-1",
            "--current",
            "admin.php?page=wp_file_manager",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("separator-group-1  locked"), "panel not locked: {stdout}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("locked open"), "toggle outcome missing: {stderr}");
}

#[test]
fn set_flips_a_local_toggle_and_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();

    let on = menuorg_cmd(dir.path()).args(["set", "accordion", "on"]).output().unwrap();
    assert!(on.status.success(), "set failed: {}", String::from_utf8_lossy(&on.stderr));
    let record = std::fs::read_to_string(dir.path().join(".menuorg.toml")).unwrap();
    assert!(record.contains("accordion_enabled = true"), "record: {record}");

    let off = menuorg_cmd(dir.path()).args(["set", "accordion", "off"]).output().unwrap();
    assert!(off.status.success(), "set off failed: {}", String::from_utf8_lossy(&off.stderr));
    let record = std::fs::read_to_string(dir.path().join(".menuorg.toml")).unwrap();
    assert!(record.contains("accordion_enabled = false"), "record: {record}");

    let bad = menuorg_cmd(dir.path()).args(["set", "palette", "on"]).output().unwrap();
    assert_eq!(bad.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&bad.stderr);
    assert!(stderr.contains("Unknown Setting"), "unexpected stderr: {stderr}");
}

#[test]
fn malformed_config_file_falls_back_to_the_local_record() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{broken").unwrap();
    std::fs::write(dir.path().join(".menuorg.toml"), "menu_order = \"edit.php\"\n").unwrap();
    std::fs::write(dir.path().join("menu.json"), SNAPSHOT).unwrap();

    let out = menuorg_cmd(dir.path()).arg("check").output().unwrap();
    assert!(
        out.status.success(),
        "fallback check failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("config file unusable"), "fallback warning missing: {stderr}");
}
