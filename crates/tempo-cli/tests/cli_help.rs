use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("tempo")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("songs"))
        .stdout(predicate::str::contains("playlists"))
        .stdout(predicate::str::contains("posts"))
        .stdout(predicate::str::contains("--base-url"));
}

#[test]
fn test_songs_help_shows_subcommands() {
    cargo_bin_cmd!("tempo")
        .args(["songs", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_song_create_help_shows_audio_flag() {
    cargo_bin_cmd!("tempo")
        .args(["songs", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--audio"))
        .stdout(predicate::str::contains("--title"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("tempo")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
