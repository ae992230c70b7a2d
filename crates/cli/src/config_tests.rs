// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dt_core::DirectoryProvider;

#[test]
fn flag_beats_env_beats_platform() {
    let flag = Some(PathBuf::from("/flag"));
    let env = Some("/env".to_string());
    let platform = Some(PathBuf::from("/home/u/.local/share"));

    assert_eq!(
        resolve_data_dir(flag, env.clone(), platform.clone()).unwrap(),
        PathBuf::from("/flag")
    );
    assert_eq!(
        resolve_data_dir(None, env, platform.clone()).unwrap(),
        PathBuf::from("/env")
    );
    assert_eq!(
        resolve_data_dir(None, Some("  ".to_string()), platform).unwrap(),
        PathBuf::from("/home/u/.local/share/deploytrack")
    );
    assert!(resolve_data_dir(None, None, None).is_err());
}

#[test]
fn missing_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_data_dir(dir.path()).unwrap();

    assert_eq!(config.log_level, None);
    assert!(config.directory.is_empty());
    assert_eq!(config.log_path, dir.path().join("dt.log"));
}

#[test]
fn config_file_provides_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE),
        r#"
log_level = "debug"

[directory."lead@example.com"]
first_name = "Ada"
last_name = "Lovelace"
role = "Team lead"
is_manager = true
"#,
    )
    .unwrap();

    let config = Config::for_data_dir(dir.path()).unwrap();
    assert_eq!(config.log_level.as_deref(), Some("debug"));

    let entry = config.directory().lookup("Lead@Example.com").unwrap();
    assert!(entry.is_manager);
    assert_eq!(entry.first_name.as_deref(), Some("Ada"));
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), "colour = \"blue\"\n").unwrap();

    let err = Config::for_data_dir(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid config file"));
}
