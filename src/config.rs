use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::PopupGeometry;

/// Project defaults, also used to seed the user's config file.
const BLUEPRINT: &str = include_str!("../wit.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    pub api_base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub log_dir: String,
    pub popup: PopupGeometry,
}

impl Settings {
    /// Loads blueprint, user config, local `wit.toml`, an explicit `--config` file and
    /// `WIT_*` environment variables, in that order of precedence.
    pub fn new(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let user_config_path = get_user_config_path()?;

        // Seed the user config from the blueprint on first run.
        if !user_config_path.exists() {
            if let Some(parent) = user_config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&user_config_path, BLUEPRINT)?;
        }

        let mut builder = blueprint()
            .add_source(File::from(user_config_path).required(false))
            .add_source(File::with_name("wit.toml").required(false));
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(Self::resolve(builder, environment(), std::env::var("GEMINI_API_KEY").ok())?)
    }

    /// Finishes `builder` with the `WIT_*` layer on top. `fallback_key` is used when no
    /// layer provides a non-blank key.
    fn resolve(
        builder: ConfigBuilder<DefaultState>,
        env: Environment,
        fallback_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        if settings.api_key().is_none() {
            settings.gemini_api_key = fallback_key;
        }
        Ok(settings)
    }

    /// Blueprint plus the given files, without touching the home directory or environment.
    pub fn from_sources(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut builder = blueprint();
        for file in files {
            builder = builder.add_source(File::from(file.as_path()).required(true));
        }
        builder.build()?.try_deserialize()
    }

    /// The configured key, if it is non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_dir).into_owned())
    }
}

fn blueprint() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(BLUEPRINT, FileFormat::Toml))
}

/// `WIT_GEMINI_MODEL`, `WIT_POPUP__WIDTH`, ...
fn environment() -> Environment {
    Environment::with_prefix("WIT")
        .prefix_separator("_")
        .separator("__")
}

pub fn get_user_config_path() -> anyhow::Result<PathBuf> {
    let mut path = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
    path.push(".config");
    path.push("whatisthis");
    path.push("wit.toml");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_blueprint_defaults() {
        let settings = Settings::from_sources(&[]).unwrap();
        assert_eq!(settings.gemini_model, "gemini-1.5-flash");
        assert_eq!(settings.max_output_tokens, 200);
        assert!((settings.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(settings.api_base_url, "https://generativelanguage.googleapis.com/v1beta");
        assert!(settings.api_key().is_none());
        assert_eq!(settings.popup.width, 50);
        assert_eq!(settings.popup.edge_margin, 1);
    }

    #[test]
    fn test_file_overrides_blueprint() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "gemini_model = \"gemini-2.0-flash\"\ngemini_api_key = \"abc\"\n\n[popup]\nwidth = 60"
        )
        .unwrap();

        let settings = Settings::from_sources(&[file.path().to_path_buf()]).unwrap();
        assert_eq!(settings.gemini_model, "gemini-2.0-flash");
        assert_eq!(settings.api_key(), Some("abc"));
        assert_eq!(settings.popup.width, 60);
        // untouched nested keys keep their defaults
        assert_eq!(settings.popup.height, 12);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "gemini_api_key = \"   \"").unwrap();

        let settings = Settings::from_sources(&[file.path().to_path_buf()]).unwrap();
        assert!(settings.api_key().is_none());
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: ::config::Map<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_overrides_files() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "gemini_model = \"from-file\"\n\n[popup]\nheight = 20").unwrap();
        let builder = blueprint().add_source(File::from(file.path()).required(true));

        let settings = Settings::resolve(
            builder,
            env(&[("WIT_GEMINI_MODEL", "from-env"), ("WIT_POPUP__WIDTH", "64"), ("OTHER_VAR", "x")]),
            None,
        )
        .unwrap();
        assert_eq!(settings.gemini_model, "from-env");
        assert_eq!(settings.popup.width, 64);
        assert_eq!(settings.popup.height, 20);
        assert_eq!(settings.popup.offset, 2);
    }

    #[test]
    fn test_gemini_api_key_is_a_fallback() {
        let settings = Settings::resolve(blueprint(), env(&[]), Some("fallback".into())).unwrap();
        assert_eq!(settings.api_key(), Some("fallback"));

        let settings = Settings::resolve(
            blueprint(),
            env(&[("WIT_GEMINI_API_KEY", "primary")]),
            Some("fallback".into()),
        )
        .unwrap();
        assert_eq!(settings.api_key(), Some("primary"));

        // a blank configured key does not shadow the fallback
        let settings = Settings::resolve(
            blueprint(),
            env(&[("WIT_GEMINI_API_KEY", "  ")]),
            Some("fallback".into()),
        )
        .unwrap();
        assert_eq!(settings.api_key(), Some("fallback"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::from_sources(&[PathBuf::from("/nonexistent/wit.toml")]);
        assert!(result.is_err());
    }
}
