use std::fs;
use std::path::Path;

use tempfile::TempDir;

use panefm::{
    copy_path, list_directory, make_directory_recursive, read_directory_node, remove_path_recursive, rename_path,
    touch_file, CopyOptions, FsError, HostFs, PathNode,
};

fn names(nodes: &[PathNode]) -> Vec<String> {
    nodes.iter().map(|n| n.name().to_string()).collect()
}

#[test]
fn test_listing_order_on_disk() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(root.join("banana"), b"").unwrap();
    fs::write(root.join("Apple"), b"").unwrap();
    fs::create_dir(root.join("zdir")).unwrap();
    fs::create_dir(root.join("Adir")).unwrap();

    let first = list_directory(&HostFs, root).unwrap();
    let second = list_directory(&HostFs, root).unwrap();
    assert_eq!(names(&first), vec!["Adir", "zdir", "Apple", "banana"]);
    assert_eq!(first, second);
}

#[test]
fn test_listing_missing_and_file_paths() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("plain"), b"").unwrap();
    assert!(matches!(list_directory(&HostFs, &tmp.path().join("missing")), Err(FsError::NotFound(_))));
    assert!(matches!(list_directory(&HostFs, &tmp.path().join("plain")), Err(FsError::NotFound(_))));
}

#[test]
fn test_touch_then_touch_again() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("a.txt");
    assert!(touch_file(&HostFs, &file).is_ok());
    assert!(matches!(touch_file(&HostFs, &file), Err(FsError::AlreadyExists(_))));
    assert!(matches!(touch_file(&HostFs, &tmp.path().join("no/such/a.txt")), Err(FsError::NotFound(_))));
}

#[test]
fn test_make_directory_twice() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("a/b/c");
    make_directory_recursive(&HostFs, &dir).unwrap();
    make_directory_recursive(&HostFs, &dir).unwrap();
    assert!(dir.is_dir());
    assert_eq!(names(&list_directory(&HostFs, &tmp.path().join("a/b")).unwrap()), vec!["c"]);
}

#[test]
fn test_make_directory_through_file_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("f"), b"").unwrap();
    let err = make_directory_recursive(&HostFs, &tmp.path().join("f/sub")).unwrap_err();
    assert!(matches!(err, FsError::AlreadyExists(_)));
}

#[test]
fn test_remove_nested_directory() {
    let tmp = TempDir::new().unwrap();
    let sub = tmp.path().join("sub");
    fs::create_dir_all(sub.join("deep/deeper")).unwrap();
    fs::write(sub.join("a"), b"1").unwrap();
    fs::write(sub.join("deep/deeper/b"), b"2").unwrap();
    fs::write(tmp.path().join("keep"), b"").unwrap();

    let removed = remove_path_recursive(&HostFs, &sub).unwrap();
    assert_eq!(removed, 5);
    assert_eq!(names(&list_directory(&HostFs, tmp.path()).unwrap()), vec!["keep"]);
}

#[test]
fn test_rename_collision_keeps_source() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::write(&a, b"alpha").unwrap();
    fs::write(&b, b"beta").unwrap();

    assert!(matches!(rename_path(&HostFs, &a, &b), Err(FsError::AlreadyExists(_))));
    assert_eq!(fs::read(&a).unwrap(), b"alpha");
    assert_eq!(fs::read(&b).unwrap(), b"beta");

    let c = tmp.path().join("c");
    rename_path(&HostFs, &a, &c).unwrap();
    assert!(!a.exists());
    assert_eq!(fs::read(&c).unwrap(), b"alpha");
}

#[test]
fn test_copy_tree_and_refuse_existing() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();
    fs::write(src.join("nested/b.txt"), b"hi").unwrap();
    let dest = tmp.path().join("dest");

    let stats = copy_path(&HostFs, &src, &dest, CopyOptions::default()).unwrap();
    assert_eq!(stats.files, 2);
    assert_eq!(stats.directories, 2);
    assert_eq!(stats.bytes, 7);
    assert_eq!(fs::read(dest.join("nested/b.txt")).unwrap(), b"hi");

    assert!(matches!(copy_path(&HostFs, &src, &dest, CopyOptions::default()), Err(FsError::AlreadyExists(_))));

    fs::write(src.join("c.txt"), b"new").unwrap();
    let err = copy_path(&HostFs, &src, &dest, CopyOptions::merge()).unwrap_err();
    // nested/ is visited first and nested/b.txt collides before anything is written
    assert!(matches!(err, FsError::AlreadyExists(_)));
    assert!(!dest.join("c.txt").exists());
}

#[test]
fn test_copy_merge_adds_missing_entries() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let dest = tmp.path().join("dest");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dest).unwrap();
    fs::write(src.join("new.txt"), b"n").unwrap();
    fs::write(dest.join("old.txt"), b"o").unwrap();

    copy_path(&HostFs, &src, &dest, CopyOptions::merge()).unwrap();
    let node = read_directory_node(&HostFs, &dest).unwrap();
    assert_eq!(names(&node.children), vec!["new.txt", "old.txt"]);
}

#[test]
fn test_copy_into_itself_is_refused() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir(&src).unwrap();
    let err = copy_path(&HostFs, &src, &src.join("inner"), CopyOptions::default()).unwrap_err();
    assert!(matches!(err, FsError::InvalidTarget { .. }));
    assert!(!Path::new(&src.join("inner")).exists());
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_access_denied() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let locked = tmp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let result = list_directory(&HostFs, &locked);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    assert!(matches!(result, Err(FsError::AccessDenied(_))));
}

#[cfg(unix)]
#[test]
fn test_remove_does_not_follow_symlinks() {
    let tmp = TempDir::new().unwrap();
    let outside = tmp.path().join("outside");
    fs::create_dir(&outside).unwrap();
    fs::write(outside.join("precious"), b"keep").unwrap();
    let tree = tmp.path().join("tree");
    fs::create_dir(&tree).unwrap();
    std::os::unix::fs::symlink(&outside, tree.join("link")).unwrap();

    remove_path_recursive(&HostFs, &tree).unwrap();
    assert!(!tree.exists());
    assert_eq!(fs::read(outside.join("precious")).unwrap(), b"keep");
}

#[cfg(unix)]
#[test]
fn test_copy_into_itself_through_symlink_is_refused() {
    let tmp = TempDir::new().unwrap();
    let real = tmp.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("a"), b"x").unwrap();
    std::os::unix::fs::symlink(tmp.path(), tmp.path().join("link")).unwrap();

    // link/real/real is real/real on disk
    let dest = tmp.path().join("link/real/real");
    let err = copy_path(&HostFs, &real, &dest, CopyOptions::default()).unwrap_err();
    assert!(matches!(err, FsError::InvalidTarget { .. }));
    assert_eq!(names(&list_directory(&HostFs, &real).unwrap()), vec!["a"]);
}

#[cfg(unix)]
#[test]
fn test_unsearchable_directory_still_lists_names() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("readonly");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("b"), b"22").unwrap();
    fs::write(dir.join("a"), b"1").unwrap();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o444)).unwrap();

    // root ignores permission bits
    if fs::metadata(dir.join("a")).is_ok() {
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let result = list_directory(&HostFs, &dir);
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

    let nodes = result.unwrap();
    assert_eq!(names(&nodes), vec!["a", "b"]);
    assert!(nodes.iter().all(|n| !n.is_directory() && n.modified().is_none()));
}
