use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn wizard() -> Command {
    Command::cargo_bin("setup-wizard").expect("binary builds")
}

#[test]
fn templates_add_list_show_remove_round_trip() {
    let data_dir = assert_fs::TempDir::new().unwrap();
    let dir = data_dir.path();

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .args(["add", "Mine", "--content", "# custom readme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 'Mine'."));

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mine"));

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .args(["show", "Mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# custom readme"));

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .args(["remove", "Mine"])
        .assert()
        .success();

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .args(["remove", "Mine"])
        .assert()
        .failure();
}

#[test]
fn templates_duplicate_picks_a_copy_name() {
    let data_dir = assert_fs::TempDir::new().unwrap();
    let dir = data_dir.path();

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .args(["add", "Mine", "--content", "# custom"])
        .assert()
        .success();

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .args(["duplicate", "Mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 'Copy of Mine'."));

    wizard()
        .args(["templates", "--data-dir"])
        .arg(dir)
        .args(["duplicate", "Mine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 'Copy of Mine (2)'."));
}

#[test]
fn validate_accepts_a_good_schema() {
    let workspace = assert_fs::TempDir::new().unwrap();
    let schema = workspace.child("schema.json");
    schema
        .write_str(
            r#"[
                {"type": "text", "key": "name", "label": "Name"},
                {
                    "type": "select",
                    "key": "kind",
                    "label": "Kind",
                    "options": [{"label": "App", "value": "app"}]
                }
            ]"#,
        )
        .unwrap();

    wizard()
        .arg("validate")
        .arg(schema.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Schema OK (2 fields)"));
}

#[test]
fn validate_fails_on_duplicate_keys() {
    let workspace = assert_fs::TempDir::new().unwrap();
    let schema = workspace.child("schema.json");
    schema
        .write_str(
            r#"[
                {"type": "text", "key": "name", "label": "Name"},
                {"type": "text", "key": "name", "label": "Name again"}
            ]"#,
        )
        .unwrap();

    wizard()
        .arg("validate")
        .arg(schema.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("error:"));
}

#[test]
fn piped_run_completes_and_renders_the_template() {
    let workspace = assert_fs::TempDir::new().unwrap();
    let data_dir = workspace.child("data");
    let readme = workspace.child("README.md");

    // name, description, framework, features (none), ci=no, readme=Minimal,
    // then enter to accept the summary.
    let stdin = "demo\n\n1\n\n2\n1\n\n";

    wizard()
        .args(["run", "--answers-json", "--data-dir"])
        .arg(data_dir.path())
        .arg("--render-out")
        .arg(readme.path())
        .write_stdin(stdin)
        .assert()
        .success()
        .stdout(predicate::str::contains("Done"))
        .stdout(predicate::str::contains(r#""name": "demo""#))
        .stdout(predicate::str::contains(r#""ci": "no""#));

    readme.assert("# demo\n\n");
}

#[test]
fn piped_run_back_command_revisits_and_switches_branch() {
    let workspace = assert_fs::TempDir::new().unwrap();
    let data_dir = workspace.child("data");

    // Reach "Set up CI?", step back to features, return forward, answer yes,
    // pick a provider, pick a readme, accept.
    let stdin = "demo\n\n1\n\n:back\n\n1\n1\n1\n\n";

    wizard()
        .args(["run", "--answers-json", "--data-dir"])
        .arg(data_dir.path())
        .write_stdin(stdin)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""ci": "yes""#))
        .stdout(predicate::str::contains(r#""ciProvider": "github-actions""#));
}

#[test]
fn piped_run_creates_and_uses_a_custom_template() {
    let workspace = assert_fs::TempDir::new().unwrap();
    let data_dir = workspace.child("data");
    let readme = workspace.child("README.md");

    // At the readme field: pick "Add new" (entry 3), type content, name it,
    // then select the new custom entry (now entry 3) and accept.
    let stdin = "demo\nA demo project\n1\n\n2\n3\n# {{name}} custom\n.\nBadges\n3\n\n";

    wizard()
        .args(["run", "--data-dir"])
        .arg(data_dir.path())
        .arg("--render-out")
        .arg(readme.path())
        .write_stdin(stdin)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 'Badges'."));

    readme.assert("# demo custom");

    // The template survives for the next invocation.
    wizard()
        .args(["templates", "--data-dir"])
        .arg(data_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Badges"));
}
