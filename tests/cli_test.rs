use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Assert on command output
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// compress then expand through the binary and compare against the input
fn round_trip_test(dat: &[u8]) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("test.dat");
    let cmp_path = temp_dir.path().join("test.dat.hc");
    let out_path = temp_dir.path().join("test.dat.hd");
    std::fs::write(&in_path,dat)?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-c")
        .arg(&in_path)
        .arg(&cmp_path)
        .assert()
        .success();
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-d")
        .arg(&cmp_path)
        .arg(&out_path)
        .assert()
        .success();
    match (std::fs::read(&in_path),std::fs::read(&out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with input")
    }
    Ok(())
}

#[test]
fn text_round_trip() -> STDRESULT {
    round_trip_test("I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes())
}

#[test]
fn single_symbol_round_trip() -> STDRESULT {
    round_trip_test("AAAA".as_bytes())
}

#[test]
fn empty_round_trip() -> STDRESULT {
    round_trip_test(&[])
}

#[test]
fn binary_round_trip() -> STDRESULT {
    let mut dat: Vec<u8> = Vec::new();
    for _i in 0..4 {
        for byte in 0..=255u8 {
            dat.push(byte);
        }
    }
    round_trip_test(&dat)
}

#[test]
fn default_output_naming() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("notes.txt");
    std::fs::write(&in_path,"compress me, by name alone\n")?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-c").arg(&in_path).assert().success();
    let cmp_path = temp_dir.path().join("notes.txt.hc");
    assert!(cmp_path.exists());
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-d").arg(&cmp_path).assert().success();
    let out_path = temp_dir.path().join("notes.txt.hc.hd");
    assert_eq!(std::fs::read(&in_path)?,std::fs::read(&out_path)?);
    Ok(())
}

#[test]
fn debug_flag_traces_on_stderr() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("notes.txt");
    std::fs::write(&in_path,"a little data to trace")?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-c")
        .arg(&in_path)
        .arg("--debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("distinct symbols"));
    Ok(())
}

#[test]
fn help_is_available() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("--compress"));
    Ok(())
}

#[test]
fn missing_mode_is_rejected() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("some_file")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn conflicting_modes_are_rejected() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-c").arg("a").arg("-d").arg("b")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn surplus_arguments_are_rejected() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-c").arg("a").arg("b").arg("c")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn missing_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-c")
        .arg(temp_dir.path().join("no_such_file"))
        .assert()
        .failure();
    Ok(())
}

#[test]
fn truncated_archive_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("test.dat");
    let cmp_path = temp_dir.path().join("test.dat.hc");
    std::fs::write(&in_path,"abracadabra")?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-c").arg(&in_path).arg(&cmp_path).assert().success();
    let archive = std::fs::read(&cmp_path)?;
    std::fs::write(&cmp_path,&archive[0..archive.len()-1])?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("-d").arg(&cmp_path).assert().failure();
    Ok(())
}
