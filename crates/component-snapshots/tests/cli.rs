use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_component-snapshots"))
}

#[test]
fn test_runs_with_no_arguments_from_project_root() {
    let project = TempDir::new().unwrap();
    write(
        project.path(),
        "components/alert/alert.jinja",
        "<div class=\"alert alert-{{ type }}\">{{ message }}</div>\n",
    );

    let output = command().current_dir(project.path()).output().unwrap();

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(project.path().join("components/alert/alert.template.html")).unwrap(),
        "<div class=\"alert alert-\"></div>"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 written, 0 failed"), "{stdout}");
}

#[test]
fn test_failures_only_fail_in_strict_mode() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ok/ok.jinja", "{{ title }}");
    write(dir.path(), "broken/broken.jinja", "{% if %}");

    let lenient = command().arg(dir.path()).output().unwrap();
    assert!(lenient.status.success());
    assert!(String::from_utf8_lossy(&lenient.stdout).contains("1 written, 1 failed"));
    assert!(dir.path().join("ok/ok.template.html").exists());

    let strict = command().arg(dir.path()).arg("--strict").output().unwrap();
    assert!(!strict.status.success());
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = command().arg(dir.path().join("nope")).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open component directory"));
}

#[test]
fn test_custom_extension() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "card/card.j2", "<p>{{ content }}</p>");
    write(dir.path(), "card/card.jinja", "ignored {{ content }}");

    let output = command()
        .arg(dir.path())
        .args(["--extension", ".j2"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("card/card.template.html")).unwrap(),
        "<p></p>"
    );
}
