use bns_kernel::config::{ConfigError, load_config};
use bns_kernel::domain::config::AppConfig;
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_toml_file_over_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bns.toml");
    fs::write(
        &path,
        r#"
[storage]
data_dir = "/srv/bns"

[notifications]
capacity = 20

[expiry.cooldowns]
critical_hours = 1
"#,
    )
    .unwrap();

    let cfg: AppConfig = load_config(Some(&path)).unwrap();

    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/srv/bns"));
    assert_eq!(cfg.notifications.capacity, 20);
    assert_eq!(cfg.notifications.key, "bns_notifications");
    assert_eq!(cfg.expiry.cooldowns.critical_hours, 1);
    assert_eq!(cfg.expiry.cooldowns.warning_hours, 24);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let result: Result<AppConfig, ConfigError> = load_config(Some(dir.path().join("absent.toml")));

    assert!(matches!(result, Err(ConfigError::Config { context: Some(_), .. })));
}

#[test]
fn malformed_values_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[notifications]\ncapacity = \"lots\"\n").unwrap();

    let result: Result<AppConfig, ConfigError> = load_config(Some(&path));
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Failed to deserialize config"), "{err}");
}
