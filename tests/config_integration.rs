use std::path::PathBuf;

use mailwright::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mailwrightrc");
    let content = r#"
# comment
--api-url https://mail.example.com/api

--autosave-ms 1500

--debug-log=debug.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags.api_url.as_deref(), Some("https://mail.example.com/api"));
    assert_eq!(flags.autosave_ms, Some(1500));
    assert_eq!(flags.debug_log, Some(PathBuf::from("debug.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mailwrightrc");
    let content = "--api-url http://file\n--autosave-ms 2000\n--debug-log file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "mailwright".to_string(),
        "--api-url".to_string(),
        "http://cli".to_string(),
        "--timeout-secs".to_string(),
        "4".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert_eq!(effective.api_url.as_deref(), Some("http://cli"), "cli should override url");
    assert_eq!(effective.timeout_secs, Some(4), "cli flags should be applied");
    assert_eq!(effective.autosave_ms, Some(2000), "file flags should remain");
    assert_eq!(
        effective.debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_missing_config_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
