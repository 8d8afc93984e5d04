use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn valid_config_passes() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.yml");
    fs::write(
        &config,
        "backend:\n  name: git-gateway\nmedia_folder: static/img\ncollections:\n  - name: posts\n    label: Posts\n    folder: content/posts\n    fields:\n      - name: title\n        widget: string\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("cms-md");
    cmd.current_dir(dir.path()).arg("check-config").arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("configuration is valid"));
}

#[test]
fn invalid_config_lists_every_problem() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{ "collections": [{ "name": "posts", "folder": "content", "fields": [{ "name": "title" }] }] }"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("cms-md");
    cmd.current_dir(dir.path()).arg("check-config").arg(&config);

    cmd.assert().failure().stderr(
        predicate::str::contains("backend is required")
            .and(predicate::str::contains(
                "config must have 'media_folder' or 'media_library' defined",
            ))
            .and(predicate::str::contains("collections[0].label is required")),
    );
}

#[test]
fn missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("cms-md");
    cmd.current_dir(dir.path())
        .arg("check-config")
        .arg(dir.path().join("absent.yml"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load CMS config"));
}
