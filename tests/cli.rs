//! 命令行端到端测试（非终端 stdin 下按行读取口令）

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fenc() -> Command {
    Command::cargo_bin("fenc").expect("binary built")
}

#[test]
fn missing_path_prints_usage() {
    fenc()
        .arg("enc")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("usage:"))
        .stderr(predicate::str::contains("<enc|dec> <file or directory path>"));
}

#[test]
fn unknown_mode_prints_usage() {
    fenc()
        .args(["zip", "somewhere"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("usage:"));
}

#[test]
fn too_many_arguments_prints_usage() {
    fenc()
        .args(["enc", "a", "b"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("usage:"));
}

#[test]
fn mismatched_keys_abort_without_output() {
    let temp = tempdir().expect("create temp dir");
    fs::write(temp.path().join("hello.txt"), b"hello\n").expect("write input");

    fenc()
        .current_dir(temp.path())
        .args(["enc", "hello.txt"])
        .write_stdin("pw\nnot-pw\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("keys don't match"));

    assert!(!temp.path().join("hello.fenc").exists());
    assert!(!temp.path().join("hello.gz").exists());
}

#[test]
fn empty_key_is_rejected() {
    let temp = tempdir().expect("create temp dir");
    fs::write(temp.path().join("hello.txt"), b"hello\n").expect("write input");

    fenc()
        .current_dir(temp.path())
        .args(["enc", "hello.txt"])
        .write_stdin("  \n  \n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("keys don't match"));
}

#[test]
fn encrypt_then_decrypt_file() {
    let temp = tempdir().expect("create temp dir");
    fs::write(temp.path().join("hello.txt"), b"hello\n").expect("write input");

    fenc()
        .current_dir(temp.path())
        .args(["enc", "hello.txt"])
        .write_stdin("pw\npw\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("encrypted to: hello.fenc"))
        .stdout(predicate::str::contains("Successful"))
        .stderr(predicate::str::contains("compressed hello.txt size 6"));

    assert!(temp.path().join("hello.fenc").exists());
    assert!(!temp.path().join("hello.gz").exists());

    // 口令首尾空白会被去除
    fenc()
        .current_dir(temp.path())
        .args(["dec", "hello.fenc"])
        .write_stdin("  pw \n")
        .assert()
        .success()
        .stdout(predicate::str::contains("decrypted to: fenc_dec"))
        .stderr(predicate::str::contains("extracted fenc_dec/hello.txt size 6"));

    assert_eq!(
        fs::read(temp.path().join("fenc_dec/hello.txt")).expect("read decrypted"),
        b"hello\n"
    );
    assert!(!temp.path().join("hellofenc.gz").exists());
}

#[test]
fn encrypt_directory_with_trailing_slash() {
    let temp = tempdir().expect("create temp dir");
    fs::create_dir_all(temp.path().join("docs/a")).expect("create dirs");
    fs::write(temp.path().join("docs/a/x"), b"A").expect("write x");

    fenc()
        .current_dir(temp.path())
        .args(["--strong-kdf", "enc", "docs/"])
        .write_stdin("pw\npw\n")
        .assert()
        .success();

    let artifact = fs::read(temp.path().join("docs.fenc")).expect("read artifact");
    assert_eq!(&artifact[..4], b"fenk");

    fenc()
        .current_dir(temp.path())
        .args(["dec", "docs.fenc"])
        .write_stdin("pw\n")
        .assert()
        .success();

    assert_eq!(
        fs::read(temp.path().join("fenc_dec/docs/a/x")).expect("read decrypted"),
        b"A"
    );
}

#[test]
fn corrupted_magic_reports_bad_head() {
    let temp = tempdir().expect("create temp dir");
    fs::write(temp.path().join("hello.txt"), b"hello\n").expect("write input");

    fenc()
        .current_dir(temp.path())
        .args(["enc", "hello.txt"])
        .write_stdin("pw\npw\n")
        .assert()
        .success();

    let artifact_path = temp.path().join("hello.fenc");
    let mut artifact = fs::read(&artifact_path).expect("read artifact");
    assert_eq!(artifact[0], b'f');
    artifact[0] = b'g';
    fs::write(&artifact_path, &artifact).expect("write corrupted");

    fenc()
        .current_dir(temp.path())
        .args(["dec", "hello.fenc"])
        .write_stdin("pw\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad head"));

    assert!(!temp.path().join("fenc_dec").exists());
}

#[cfg(unix)]
#[test]
fn backslash_is_part_of_unix_file_name() {
    let temp = tempdir().expect("create temp dir");
    fs::write(temp.path().join("a\\b.txt"), b"slash\n").expect("write input");

    fenc()
        .current_dir(temp.path())
        .args(["enc", "a\\b.txt"])
        .write_stdin("pw\npw\n")
        .assert()
        .success();

    assert!(temp.path().join("a\\b.fenc").exists());
    assert!(!temp.path().join("a/b.fenc").exists());
}
