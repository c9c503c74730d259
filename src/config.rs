use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "smartmenud.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Workspace opened at startup; `workspace.select` may replace it.
    pub workspace: Option<PathBuf>,
    /// Site root that page URLs are built from.
    pub wwwroot: String,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace: None,
            wwwroot: "http://localhost".into(),
            log: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    workspace: Option<PathBuf>,
    wwwroot: Option<String>,
    log: Option<String>,
}

/// Defaults, then `smartmenud.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let path = Path::new(CONFIG_FILE);
    if path.is_file() {
        merge_file(&mut settings, path)?;
    }
    merge_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn merge_file(settings: &mut Settings, path: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_cfg: FileSettings =
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))?;

    if let Some(v) = file_cfg.workspace {
        settings.workspace = Some(v);
    }
    if let Some(v) = file_cfg.wwwroot {
        settings.wwwroot = v;
    }
    if let Some(v) = file_cfg.log {
        settings.log = v;
    }
    Ok(())
}

fn merge_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    let non_blank = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_blank("SMARTMENUD_WORKSPACE") {
        settings.workspace = Some(PathBuf::from(v));
    }
    if let Some(v) = non_blank("SMARTMENUD_WWWROOT") {
        settings.wwwroot = v;
    }
    if let Some(v) = non_blank("SMARTMENUD_LOG") {
        settings.log = v;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SMARTMENUD_WWWROOT", "https://lms.example.org"),
            ("SMARTMENUD_LOG", " "),
        ]);
        let mut settings = Settings::default();
        merge_env(&mut settings, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(settings.wwwroot, "https://lms.example.org");
        assert_eq!(settings.log, "info");
        assert_eq!(settings.workspace, None);
    }

    #[test]
    fn file_values_replace_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("smartmenud_config_test_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, "workspace = \"/srv/menus\"\nlog = \"debug\"\n").expect("write config");

        let mut settings = Settings::default();
        merge_file(&mut settings, &path).expect("merge");
        assert_eq!(settings.workspace, Some(PathBuf::from("/srv/menus")));
        assert_eq!(settings.log, "debug");
        assert_eq!(settings.wwwroot, "http://localhost");

        fs::write(&path, "workspace = [").expect("write config");
        assert!(merge_file(&mut settings, &path).is_err());

        fs::remove_dir_all(dir).expect("cleanup");
    }
}
