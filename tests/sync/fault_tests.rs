// Tests that one failing entry never stops the rest of a pass

use crate::common::{put, snapshot, Trees};
use std::fs;

#[test]
fn test_failed_copy_does_not_stop_siblings() {
    let trees = Trees::new();
    put(&trees.source, "a.txt", b"a");
    put(&trees.source, "b.txt", b"b");
    // A directory where a.txt must go makes the copy fail, even as root
    fs::create_dir_all(trees.replica.join("a.txt")).unwrap();

    let engine = trees.engine();
    let stats = engine.synchronize().unwrap();

    assert!(stats.errors >= 1);
    assert_eq!(fs::read(trees.replica.join("b.txt")).unwrap(), b"b");

    // The blocker was pruned, so the next pass completes the mirror
    let next = engine.synchronize().unwrap();
    assert_eq!(next.errors, 0);
    assert_eq!(snapshot(&trees.replica), snapshot(&trees.source));
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let trees = Trees::new();
    put(&trees.source, "secret.txt", b"s");
    put(&trees.source, "public.txt", b"p");
    let secret = trees.source.join("secret.txt");
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not stop root; nothing to observe then
    if fs::File::open(&secret).is_ok() {
        return;
    }

    let stats = trees.engine().synchronize().unwrap();

    assert_eq!(stats.errors, 1);
    assert_eq!(fs::read(trees.replica.join("public.txt")).unwrap(), b"p");

    fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
}

#[test]
fn test_blocked_replica_root_fails_the_pass_only() {
    let trees = Trees::new();
    put(&trees.source, "a.txt", b"a");
    fs::write(&trees.replica, b"a file where the replica should be").unwrap();

    let engine = trees.engine();
    assert!(engine.synchronize().is_err());

    fs::remove_file(&trees.replica).unwrap();
    let stats = engine.synchronize().unwrap();
    assert_eq!(stats.files_copied, 1);
}

#[cfg(unix)]
#[test]
fn test_replica_directory_link_never_receives_writes() {
    let trees = Trees::new();
    let outside = tempfile::tempdir().unwrap();
    put(&trees.source, "d/f.txt", b"data");
    put(&trees.source, "d/sub/g.txt", b"more");
    fs::create_dir_all(&trees.replica).unwrap();
    std::os::unix::fs::symlink(outside.path(), trees.replica.join("d")).unwrap();

    let engine = trees.engine();
    let stats = engine.synchronize().unwrap();

    assert!(stats.errors >= 1);
    assert!(fs::read_dir(outside.path()).unwrap().next().is_none());
    assert!(fs::symlink_metadata(trees.replica.join("d")).is_err());

    // With the link pruned, the next pass builds a real directory
    let next = engine.synchronize().unwrap();
    assert_eq!(next.errors, 0);
    assert!(!fs::symlink_metadata(trees.replica.join("d")).unwrap().file_type().is_symlink());
    assert_eq!(snapshot(&trees.replica), snapshot(&trees.source));
}
