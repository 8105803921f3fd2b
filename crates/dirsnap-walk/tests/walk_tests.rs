use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use dirsnap_walk::{DirSnapshot, WalkConfig, WalkError, WalkedEntry, Walker};

/// root/{a.txt(10), sub/{b.txt(20)}}
fn spec_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "0123456789").unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub/b.txt"), "01234567890123456789").unwrap();
    temp
}

#[test]
fn test_level_contains_exact_members() {
    let temp = spec_tree();
    let levels: Vec<DirSnapshot> = Walker::new(WalkConfig::new(temp.path())).unwrap().collect();

    let top = &levels[0];
    let mut names: Vec<&str> = top.entries.iter().map(|e| e.name()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a.txt", "sub"]);
    assert!(!top.truncated);
}

#[test]
fn test_structural_nesting() {
    let temp = spec_tree();
    let tree = Walker::new(WalkConfig::new(temp.path())).unwrap().collect_tree();

    let index = tree.index();
    assert_eq!(index[&PathBuf::from("a.txt")].size, 10);
    assert_eq!(index[&PathBuf::from("sub/b.txt")].size, 20);
    assert!(index.contains_key(&PathBuf::from("sub")));

    let sub_level = tree
        .dirs
        .iter()
        .find(|d| d.path.ends_with("sub"))
        .expect("sub level present");
    assert_eq!(sub_level.entries.len(), 1);
    assert_eq!(sub_level.entries[0].name(), "b.txt");
}

#[test]
fn test_cap_truncation_flagged() {
    let temp = TempDir::new().unwrap();
    for i in 0..25 {
        fs::write(temp.path().join(format!("file{i:02}")), "x").unwrap();
    }

    let config = WalkConfig::builder()
        .root(temp.path())
        .max_entries(10usize)
        .build()
        .unwrap();
    let levels: Vec<DirSnapshot> = Walker::new(config).unwrap().collect();

    assert_eq!(levels[0].len(), 10);
    assert!(levels[0].truncated);
}

#[test]
fn test_deep_nesting_walked_in_order() {
    let temp = TempDir::new().unwrap();
    let mut dir = temp.path().to_path_buf();
    for name in ["one", "two", "three"] {
        dir = dir.join(name);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("marker.txt"), name).unwrap();
    }

    let levels: Vec<DirSnapshot> = Walker::new(WalkConfig::new(temp.path())).unwrap().collect();
    let paths: Vec<&std::path::Path> = levels.iter().map(|l| l.path.as_path()).collect();

    // Depth-first preorder: each level precedes its descendants.
    assert_eq!(paths.len(), 4);
    assert!(paths[1].ends_with("one"));
    assert!(paths[2].ends_with("one/two"));
    assert!(paths[3].ends_with("one/two/three"));
}

#[test]
fn test_missing_root_fails_walker() {
    let temp = TempDir::new().unwrap();
    let result = Walker::new(WalkConfig::new(temp.path().join("absent")));
    assert!(matches!(result, Err(WalkError::NotFound { .. })));
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_single_marker() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a/b")).unwrap();
    std::os::unix::fs::symlink(root.join("a"), root.join("a/b/back")).unwrap();

    let config = WalkConfig::builder()
        .root(root)
        .follow_symlinks(true)
        .build()
        .unwrap();
    let levels: Vec<DirSnapshot> = Walker::new(config).unwrap().collect();

    let cycle_markers = levels
        .iter()
        .flat_map(|l| l.entries.iter())
        .filter(|e| matches!(e, WalkedEntry::Cycle { .. }))
        .count();
    assert_eq!(cycle_markers, 1);
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed_by_default() {
    let temp = spec_tree();
    std::os::unix::fs::symlink(temp.path().join("sub"), temp.path().join("alias")).unwrap();

    let tree = Walker::new(WalkConfig::new(temp.path())).unwrap().collect_tree();

    // sub is walked once; alias is a leaf symlink entry.
    assert_eq!(tree.dirs.len(), 2);
    let alias = tree.dirs[0]
        .entries
        .iter()
        .find(|e| e.name() == "alias")
        .and_then(|e| e.record())
        .unwrap();
    assert!(alias.kind.is_symlink());
}
