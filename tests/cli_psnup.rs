//! End-to-end tests for the `psnup` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn pages(n: u32) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "%!PS-Adobe-3.0").unwrap();
    writeln!(file, "%%Pages: {n}").unwrap();
    writeln!(file, "%%BoundingBox: 0 0 612 792").unwrap();
    writeln!(file, "%%EndComments").unwrap();
    writeln!(file, "%%EndSetup").unwrap();
    for p in 1..=n {
        writeln!(file, "%%Page: {p} {p}").unwrap();
        writeln!(file, "PStoPSxform concat").unwrap();
        writeln!(file, "({p}) show").unwrap();
        writeln!(file, "showpage").unwrap();
    }
    writeln!(file, "%%Trailer").unwrap();
    writeln!(file, "%%EOF").unwrap();
    file
}

#[test]
fn four_up_on_ten_pages_produces_three_sheets() {
    let input = pages(10);

    let output = Command::cargo_bin("psnup")
        .unwrap()
        .args(["-n", "4", "-p", "a4"])
        .arg(input.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("%%Page:").count(), 3);
    assert_eq!(stdout.matches("%%BeginProcSet: PStoPS 1 15").count(), 1);
}

#[test]
fn bare_digit_flag_is_equivalent_to_dash_n() {
    let input = pages(4);

    let output = Command::cargo_bin("psnup")
        .unwrap()
        .args(["-4", "-p", "a4"])
        .arg(input.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("%%Page:").count(), 1);
}

#[test]
fn missing_output_size_fails() {
    let input = pages(1);

    Command::cargo_bin("psnup")
        .unwrap()
        .args(["-n", "2"])
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("output width"));
}

#[test]
fn missing_nup_count_fails() {
    let input = pages(1);

    Command::cargo_bin("psnup")
        .unwrap()
        .args(["-p", "a4"])
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("n-up count required"));
}
