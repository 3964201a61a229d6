use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Settings that can come from the command line or an rc file.
///
/// rc files hold the same `--flag value` tokens as the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub api_url: Option<String>,
    pub autosave_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; values in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            api_url: other.api_url.clone().or_else(|| self.api_url.clone()),
            autosave_ms: other.autosave_ms.or(self.autosave_ms),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mailwright").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("mailwright")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("mailwright").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("mailwright")
                .join("config");
        }
    }

    PathBuf::from(".mailwrightrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".mailwrightrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# mailwright defaults (saved with --save)".to_string());
    if let Some(url) = &flags.api_url {
        lines.push(format!("--api-url {url}"));
    }
    if let Some(ms) = flags.autosave_ms {
        lines.push(format!("--autosave-ms {ms}"));
    }
    if let Some(secs) = flags.timeout_secs {
        lines.push(format!("--timeout-secs {secs}"));
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pull known flags out of a token list. Unknown tokens and unparsable
/// numbers are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (token, None),
        };
        let takes_value = matches!(
            name,
            "--api-url" | "--autosave-ms" | "--timeout-secs" | "--debug-log"
        );
        if !takes_value {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).cloned()
            }
        };
        if let Some(value) = value {
            match name {
                "--api-url" => flags.api_url = Some(value),
                "--autosave-ms" => flags.autosave_ms = value.parse().ok(),
                "--timeout-secs" => flags.timeout_secs = value.parse().ok(),
                "--debug-log" => flags.debug_log = Some(PathBuf::from(value)),
                _ => {}
            }
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "mailwright".to_string(),
            "--api-url".to_string(),
            "http://example.test/api".to_string(),
            "--autosave-ms=1500".to_string(),
            "--timeout-secs".to_string(),
            "5".to_string(),
            "--debug-log=debug.log".to_string(),
            "--save".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.api_url.as_deref(), Some("http://example.test/api"));
        assert_eq!(flags.autosave_ms, Some(1500));
        assert_eq!(flags.timeout_secs, Some(5));
        assert_eq!(flags.debug_log, Some(PathBuf::from("debug.log")));
    }

    #[test]
    fn test_parse_flag_tokens_skips_bad_numbers() {
        let args = vec!["--autosave-ms".to_string(), "soon".to_string()];
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.autosave_ms, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            api_url: Some("http://file".to_string()),
            autosave_ms: Some(2000),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            api_url: Some("http://cli".to_string()),
            timeout_secs: Some(3),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert_eq!(merged.api_url.as_deref(), Some("http://cli"));
        assert_eq!(merged.autosave_ms, Some(2000));
        assert_eq!(merged.timeout_secs, Some(3));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".mailwrightrc");
        let flags = ConfigFlags {
            api_url: Some("http://localhost:9712/api".to_string()),
            autosave_ms: Some(750),
            timeout_secs: Some(10),
            debug_log: Some(PathBuf::from("debug.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }
}
