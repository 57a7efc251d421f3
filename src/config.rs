use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Server configuration, immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory to serve
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// TCP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Controls visibility of hidden files
    #[serde(default = "default_dotfiles", rename = "dotfiles")]
    pub show_dotfiles: bool,

    /// Domain used when rendering external links
    #[serde(default = "default_domain")]
    pub domain: String,
}

fn default_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("SharedFiles")
}

fn default_port() -> u16 {
    8080
}

fn default_dotfiles() -> bool {
    true
}

fn default_domain() -> String {
    "localhost".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            port: default_port(),
            show_dotfiles: default_dotfiles(),
            domain: default_domain(),
        }
    }
}

impl Config {
    /// Load config from a YAML file. A missing file yields the defaults;
    /// a file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: Config = serde_yaml::from_str(&content)?;
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Apply CLI overrides, then resolve the directory to an absolute path.
    pub fn apply_overrides(mut self, dir: Option<PathBuf>, port: Option<u16>) -> Self {
        if let Some(dir) = dir {
            self.directory = dir;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if self.directory.is_relative() {
            if let Ok(abs) = std::fs::canonicalize(&self.directory) {
                self.directory = abs;
            } else if let Ok(cwd) = std::env::current_dir() {
                self.directory = cwd.join(&self.directory);
            }
        }
        self
    }
}
