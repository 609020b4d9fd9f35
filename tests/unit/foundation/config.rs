use super::*;

#[test]
fn json_defaults_fill_leaf_and_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rendition.json");
    std::fs::write(
        &path,
        r#"{ "upload_root": "/srv/uploads", "cache_root": "/srv/cache" }"#,
    )
    .unwrap();

    let cfg = ServiceConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg, ServiceConfig::new("/srv/uploads", "/srv/cache"));
    assert_eq!(cfg.source_leaf, "file");
    assert_eq!(cfg.threads, None);
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rendition.json");
    std::fs::write(
        &path,
        r#"{ "upload_root": "u", "cache_root": "c", "ttl": 5 }"#,
    )
    .unwrap();

    let err = ServiceConfig::from_json_file(&path).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Config);
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = ServiceConfig::from_json_file(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("here.json"));
}

#[test]
fn validate_rejects_zero_threads_and_bad_leaf() {
    assert!(ServiceConfig::new("u", "c").with_threads(0).validate().is_err());
    assert!(ServiceConfig::new("u", "c").with_threads(2).validate().is_ok());

    let mut cfg = ServiceConfig::new("u", "c");
    cfg.source_leaf = "../file".to_string();
    assert!(cfg.validate().is_err());
    cfg.source_leaf = String::new();
    assert!(cfg.validate().is_err());
}
