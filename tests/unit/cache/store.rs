use super::*;
use crate::ops::parse::parse_stack;

fn address(raw: &str) -> ArtifactAddress {
    let key = CacheKey::compute("proj", "abc", &parse_stack(raw).unwrap(), "png");
    ArtifactAddress::new("proj", "abc", key, "png")
}

#[test]
fn miss_then_hit() {
    let root = tempfile::tempdir().unwrap();
    let store = CacheStore::new(root.path());
    let addr = address("resize@width:10");

    assert_eq!(store.get(&addr).unwrap(), None);
    let path = store.put(&addr, b"artifact").unwrap();
    assert_eq!(store.get(&addr).unwrap().as_deref(), Some(&b"artifact"[..]));

    assert_eq!(
        path,
        root.path()
            .join("proj")
            .join("abc")
            .join(format!("{}.png", addr.key.to_hex()))
    );
}

#[test]
fn put_leaves_no_temporary_files() {
    let root = tempfile::tempdir().unwrap();
    let store = CacheStore::new(root.path());
    store.put(&address("rotate@angle:90"), b"one").unwrap();
    store.put(&address("rotate@angle:180"), b"two").unwrap();

    let names: Vec<String> = std::fs::read_dir(store.source_dir("proj", "abc"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.ends_with(".png") && !n.starts_with('.')));
}

#[test]
fn rewriting_same_key_is_harmless() {
    let root = tempfile::tempdir().unwrap();
    let store = CacheStore::new(root.path());
    let addr = address("");
    store.put(&addr, b"same").unwrap();
    store.put(&addr, b"same").unwrap();
    assert_eq!(store.get(&addr).unwrap().as_deref(), Some(&b"same"[..]));
}

#[test]
fn put_fails_when_root_is_not_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("cache");
    std::fs::write(&blocker, b"not a dir").unwrap();

    let store = CacheStore::new(&blocker);
    let err = store.put(&address(""), b"x").unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Other);
    assert!(err.to_string().contains("create cache dir"));
}
