use std::fs;
use std::path::{Path, PathBuf};

use kotoba_config::Config;
use serde::{Deserialize, Serialize};

/// `$XDG_CONFIG_HOME/kotoba` or `~/.config/kotoba`
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("kotoba")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config").join("kotoba")
    } else {
        PathBuf::from(".config").join("kotoba")
    }
}

fn profiles_dir(root: &Path) -> PathBuf {
    root.join("profiles")
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Initialize user config folders and main profile if missing
pub fn init_user_config(root: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(profiles_dir(root))?;

    let main_profile = profiles_dir(root).join("main.json");

    if !main_profile.exists() {
        let profile = Profile {
            name: "main".into(),
            value: Config::default(),
        };
        fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created main profile in {}", root.display());
    }

    Ok(())
}

/// Load a user profile by name, defaulting to main if name not found
pub fn load_user_profile(root: &Path, name: &str) -> anyhow::Result<Config> {
    let profile_file = profiles_dir(root).join(format!("{name}.json"));

    if profile_file.exists() {
        read_profile(&profile_file)
    } else {
        tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
        let main_file = profiles_dir(root).join("main.json");
        if main_file.exists() {
            read_profile(&main_file)
        } else {
            Ok(Config::default())
        }
    }
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)
        .map_err(|e| anyhow::anyhow!("Invalid profile {}: {e}", path.display()))?;
    Ok(profile.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_creates_main_profile() {
        let root = tempfile::tempdir().unwrap();

        init_user_config(root.path()).unwrap();

        let main = root.path().join("profiles").join("main.json");
        let profile: Profile =
            serde_json::from_str(&fs::read_to_string(&main).unwrap()).unwrap();
        assert_eq!(profile.name, "main");
        assert_eq!(profile.value.resolver.concurrency, 8);
    }

    #[test]
    fn existing_main_profile_is_kept() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("profiles")).unwrap();
        fs::write(
            root.path().join("profiles").join("main.json"),
            r#"{ "name": "main", "value": { "resolver": { "concurrency": 3 } } }"#,
        )
        .unwrap();

        init_user_config(root.path()).unwrap();

        let config = load_user_profile(root.path(), "main").unwrap();
        assert_eq!(config.resolver.concurrency, 3);
    }

    #[test]
    fn unknown_profile_falls_back_to_main() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("profiles")).unwrap();
        fs::write(
            root.path().join("profiles").join("main.json"),
            r#"{ "name": "main", "value": { "output": { "dir": "lists" } } }"#,
        )
        .unwrap();

        let config = load_user_profile(root.path(), "work").unwrap();
        assert_eq!(config.output.dir, "lists");
    }

    #[test]
    fn named_profile_wins() {
        let root = tempfile::tempdir().unwrap();
        init_user_config(root.path()).unwrap();
        fs::write(
            root.path().join("profiles").join("remote.json"),
            r#"{ "name": "remote", "value": { "remote": { "url": "https://db.example.com" } } }"#,
        )
        .unwrap();

        let config = load_user_profile(root.path(), "remote").unwrap();
        assert_eq!(config.remote.rest_url(), "https://db.example.com/rest/v1");
    }

    #[test]
    fn broken_profile_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("profiles")).unwrap();
        fs::write(root.path().join("profiles").join("main.json"), "{").unwrap();

        assert!(load_user_profile(root.path(), "main").is_err());
    }

    #[test]
    fn nothing_on_disk_gives_defaults() {
        let root = tempfile::tempdir().unwrap();
        let config = load_user_profile(root.path(), "main").unwrap();
        assert_eq!(config.output.level_batch_size, 100);
    }
}
