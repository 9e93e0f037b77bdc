//! Behavioral guarantees of the project file layer, exercised through the
//! public API only.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

use scadbox::{ErrorKind, ProjectFiles, WriteAction};
use tempfile::TempDir;

fn project() -> (TempDir, ProjectFiles) {
    let dir = TempDir::new().expect("create temp dir");
    let files = ProjectFiles::new(dir.path()).expect("open project");
    (dir, files)
}

/// Snapshot of every file below `root` with its content.
fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("entry").path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                let rel = path.strip_prefix(root).expect("prefix");
                out.push((rel.display().to_string(), fs::read(&path).expect("read")));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

#[test]
fn escapes_fail_without_mutation() {
    let outer = TempDir::new().expect("create temp dir");
    let root = outer.path().join("project");
    fs::create_dir_all(root.join("parts")).expect("mkdir");
    fs::write(root.join("box.scad"), "cube(1);").expect("seed");
    let files = ProjectFiles::new(&root).expect("open project");

    let before_inside = snapshot(&root);
    let before_outside = snapshot(outer.path());

    for name in [
        "../escape.txt",
        "../project/../escape.txt",
        "parts/../../escape.txt",
        "./../../escape.txt",
        "parts/../../project/../escape.txt",
    ] {
        assert_eq!(
            files.read_file(name).expect_err(name).kind(),
            ErrorKind::PathEscape,
            "read {name}"
        );
        assert_eq!(
            files.write_file(name, "pwned", false).expect_err(name).kind(),
            ErrorKind::PathEscape,
            "write {name}"
        );
        assert_eq!(
            files.write_file(name, "pwned", true).expect_err(name).kind(),
            ErrorKind::PathEscape,
            "overwrite {name}"
        );
        assert_eq!(
            files.append_to_file(name, "pwned").expect_err(name).kind(),
            ErrorKind::PathEscape,
            "append {name}"
        );
    }

    assert_eq!(snapshot(&root), before_inside);
    assert_eq!(snapshot(outer.path()), before_outside);
    assert!(!outer.path().join("escape.txt").exists());
}

#[test]
fn refused_overwrite_keeps_bytes() {
    let (dir, files) = project();
    let seeded = b"module lid() { cube([40, 40, 2]); }\n";
    fs::write(dir.path().join("lid.scad"), seeded).expect("seed");

    let err = files
        .write_file("lid.scad", "replacement", false)
        .expect_err("overwrite must be refused");
    assert_eq!(err.kind(), ErrorKind::OverwriteRefused);
    assert_eq!(fs::read(dir.path().join("lid.scad")).expect("read"), seeded);
}

#[test]
fn overwrite_then_read_returns_new_content() {
    let (_dir, files) = project();
    files.write_file("lid.scad", "old", false).expect("create");

    let outcome = files
        .write_file("lid.scad", "new content", true)
        .expect("overwrite");
    assert_eq!(outcome.action, WriteAction::Overwritten);
    assert_eq!(files.read_file("lid.scad").expect("read"), "new content");
}

#[test]
fn append_a_then_b() {
    let (_dir, files) = project();
    files.write_file("ab.txt", "A", false).expect("create");
    files.append_to_file("ab.txt", "B").expect("append");
    assert_eq!(files.read_file("ab.txt").expect("read"), "AB");
}

#[test]
fn append_missing_creates_nothing() {
    let (dir, files) = project();
    let before = snapshot(dir.path());

    let err = files
        .append_to_file("missing.scad", "B")
        .expect_err("append must not create");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn filtered_listing_is_exact_subset() {
    let (dir, files) = project();
    fs::write(dir.path().join("a.scad"), "").expect("seed");
    fs::write(dir.path().join("b.txt"), "").expect("seed");

    let names: Vec<_> = files
        .list_files(Some("scad"))
        .expect("list")
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["a.scad"]);

    fs::write(dir.path().join("Z.scad"), "").expect("seed");
    fs::write(dir.path().join("c.scad"), "").expect("seed");
    let names: Vec<_> = files
        .list_files(Some("scad"))
        .expect("list")
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["Z.scad", "a.scad", "c.scad"]);
}

#[test]
fn round_trip_text() {
    let (_dir, files) = project();
    let cases = [
        ("empty.scad", String::new()),
        ("one.scad", "cube(10);".to_string()),
        (
            "multi.scad",
            "// header\r\nmodule m() {\n\tsphere(1);\n}\n\nm();\n".to_string(),
        ),
        ("unicode.txt", "Maße: 10×20 mm — ✓\n".to_string()),
        ("long.txt", "x".repeat(256 * 1024)),
    ];

    for (name, content) in &cases {
        files.write_file(name, content, true).expect("write");
        assert_eq!(&files.read_file(name).expect("read"), content, "{name}");
    }
}

#[test]
fn concurrent_creates_have_one_winner() {
    let (dir, files) = project();
    let files = Arc::new(files);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let files = Arc::clone(&files);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                files.write_file("race.scad", format!("writer {i}"), false)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1, "results: {results:?}");
    for result in results.iter().filter(|r| r.is_err()) {
        let kind = result.as_ref().map(|_| ()).expect_err("loser").kind();
        assert_eq!(kind, ErrorKind::OverwriteRefused);
    }

    let content = fs::read_to_string(dir.path().join("race.scad")).expect("read");
    assert!(content.starts_with("writer "), "content: {content}");
}

#[test]
fn concurrent_appends_keep_every_chunk() {
    let (_dir, files) = project();
    files.write_file("log.txt", "", false).expect("create");
    let files = Arc::new(files);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let files = Arc::clone(&files);
            thread::spawn(move || files.append_to_file("log.txt", "0123456789"))
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked").expect("append");
    }

    let content = files.read_file("log.txt").expect("read");
    assert_eq!(content, "0123456789".repeat(16));
}

#[test]
fn layer_stays_usable_after_errors() {
    let (_dir, files) = project();
    assert!(files.read_file("../x").is_err());
    assert!(files.read_file("").is_err());
    assert!(files.append_to_file("missing", "x").is_err());

    files.write_file("ok.scad", "cube(1);", false).expect("write");
    assert_eq!(files.read_file("ok.scad").expect("read"), "cube(1);");
}

#[cfg(unix)]
#[test]
fn failed_overwrite_keeps_old_file() {
    use std::os::unix::fs::PermissionsExt;

    let (dir, files) = project();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).expect("mkdir");
    fs::write(sub.join("f.scad"), "cube(1);").expect("seed");
    fs::set_permissions(&sub, fs::Permissions::from_mode(0o555)).expect("chmod");

    // Privileged users ignore directory modes, so there is nothing to fail.
    let writable = fs::File::create(sub.join(".writable")).is_ok();
    if writable {
        fs::remove_file(sub.join(".writable")).expect("cleanup");
    } else {
        let before = snapshot(&sub);
        let err = files
            .write_file("sub/f.scad", "new", true)
            .expect_err("staging in a read-only directory must fail");
        assert_eq!(err.kind(), ErrorKind::Write);
        assert_eq!(snapshot(&sub), before);
        assert_eq!(
            fs::read_to_string(sub.join("f.scad")).expect("read"),
            "cube(1);"
        );
        let leftovers: Vec<_> = fs::read_dir(&sub)
            .expect("read dir")
            .filter_map(|e| e.ok()?.file_name().into_string().ok())
            .filter(|name| name.starts_with(".scadbox-"))
            .collect();
        assert!(leftovers.is_empty(), "leftovers: {leftovers:?}");
    }

    fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).expect("chmod");
}
