use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SONG: &str = "{title: Gloire}
{key: D}

{c: Strophe 1}
{start_of_verse}
[D]Gloire à Dieu !
{end_of_verse}

{c: Refrain}
{start_of_chorus}
[G]Alléluia
{end_of_chorus}

{c: Refrain}
{start_of_chorus}
[G]Alléluia
{end_of_chorus}
";

fn chordshow() -> Command {
    Command::from(std::process::Command::new(env!("CARGO_BIN_EXE_chordshow")))
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_converts_directory() {
    let tmp = TempDir::new().unwrap();
    let songs = tmp.path().join("songs");
    fs::create_dir(&songs).unwrap();
    write(&songs, "jem001.chordpro", SONG);
    write(&songs, "notes.txt", "ignored");

    let shows = tmp.path().join("shows");
    let enhanced = tmp.path().join("enhanced");

    chordshow()
        .arg(&songs)
        .arg("--output")
        .arg(&shows)
        .arg("--enhanced-output")
        .arg(&enhanced)
        .assert()
        .success();

    let show: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(shows.join("jem001.show")).unwrap()).unwrap();
    let body = &show[1];
    assert_eq!(body["name"], "Gloire");
    assert_eq!(body["category"], "JEM");
    assert_eq!(body["slides"].as_object().unwrap().len(), 2);

    let layout_id = body["settings"]["activeLayout"].as_str().unwrap();
    assert_eq!(
        body["layouts"][layout_id]["slides"].as_array().unwrap().len(),
        3
    );

    let markup = fs::read_to_string(enhanced.join("jem001-enhanced.chordpro")).unwrap();
    assert!(markup.starts_with("{title: Gloire}\n{key: D}\n"));
    assert!(markup.contains("Gloire à Dieu\u{00A0}!"));
    assert!(!shows.join("notes.show").exists());
}

#[test]
fn test_metadata_table_is_applied() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "jem002.cho", SONG);
    write(
        tmp.path(),
        "meta.csv",
        "Fichier;Titre;Auteur;Copyright\nJEM002;Gloire éternelle;Jean Dupont;© 1988 Éditions\n",
    );

    chordshow()
        .arg(tmp.path().join("jem002.cho"))
        .arg("--metadata")
        .arg(tmp.path().join("meta.csv"))
        .arg("--print")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Gloire éternelle\""))
        .stdout(predicate::str::contains("\"year\": \"1988\""));
}

#[test]
fn test_print_does_not_write_files() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "song.pro", SONG);
    let shows = tmp.path().join("out");

    chordshow()
        .arg(tmp.path().join("song.pro"))
        .arg("--output")
        .arg(&shows)
        .arg("--print")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"category\": \"song\""));

    assert!(!shows.exists());
}

#[test]
fn test_no_enhanced_skips_markup_output() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "song.chordpro", SONG);
    let shows = tmp.path().join("shows");
    let enhanced = tmp.path().join("enhanced");

    chordshow()
        .arg(tmp.path().join("song.chordpro"))
        .arg("-o")
        .arg(&shows)
        .arg("-e")
        .arg(&enhanced)
        .arg("--no-enhanced")
        .assert()
        .success();

    assert!(shows.join("song.show").exists());
    assert!(!enhanced.exists());
}

#[test]
fn test_partial_failure_still_succeeds() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "good.chordpro", SONG);
    let shows = tmp.path().join("shows");

    chordshow()
        .arg(tmp.path().join("good.chordpro"))
        .arg(tmp.path().join("missing.chordpro"))
        .arg("-o")
        .arg(&shows)
        .arg("--no-enhanced")
        .arg("--parallel")
        .arg("50")
        .assert()
        .success()
        .stderr(predicate::str::contains("missing.chordpro"));

    assert!(shows.join("good.show").exists());
}

#[test]
fn test_all_failures_exit_non_zero() {
    let tmp = TempDir::new().unwrap();

    chordshow()
        .arg(tmp.path().join("missing.chordpro"))
        .arg("-o")
        .arg(tmp.path().join("shows"))
        .arg("--no-enhanced")
        .assert()
        .failure()
        .stderr(predicate::str::contains("All 1 files failed"));
}

#[test]
fn test_bad_config_extension_fails() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "song.chordpro", SONG);
    write(tmp.path(), "settings.toml", "font_size = 10");

    chordshow()
        .arg(tmp.path().join("song.chordpro"))
        .arg("--config")
        .arg(tmp.path().join("settings.toml"))
        .arg("--print")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_yaml_config_disables_punctuation_fix() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "song.chordpro", SONG);
    write(tmp.path(), "settings.yaml", "fix_french_punctuation: false\n");
    let enhanced = tmp.path().join("enhanced");

    chordshow()
        .arg(tmp.path().join("song.chordpro"))
        .arg("-c")
        .arg(tmp.path().join("settings.yaml"))
        .arg("-o")
        .arg(tmp.path().join("shows"))
        .arg("-e")
        .arg(&enhanced)
        .assert()
        .success();

    let markup = fs::read_to_string(enhanced.join("song-enhanced.chordpro")).unwrap();
    assert!(markup.contains("Gloire à Dieu !"));
}
