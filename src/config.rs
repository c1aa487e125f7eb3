use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub app: AppManifest,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaylistConfig {
    /// seed a fresh playlist with the bundled tracks
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImportConfig {
    #[serde(default)]
    pub follow_symlinks: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
    /// directory with bundled static files (index page, default music, icons)
    pub assets_dir: Option<PathBuf>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            assets_dir: None,
        }
    }
}

/// Installable app description, rendered as the web app manifest
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub theme_color: String,
    pub icons: Vec<AppIcon>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl Default for AppManifest {
    fn default() -> Self {
        Self {
            name: "我的唱片机".to_string(),
            short_name: "唱片机".to_string(),
            description: "基于Vue3的本地音乐播放器".to_string(),
            theme_color: "#0a0a0a".to_string(),
            icons: vec![
                AppIcon {
                    src: "pwa-192x192.png".to_string(),
                    sizes: "192x192".to_string(),
                    mime_type: "image/png".to_string(),
                },
                AppIcon {
                    src: "pwa-512x512.png".to_string(),
                    sizes: "512x512".to_string(),
                    mime_type: "image/png".to_string(),
                },
            ],
        }
    }
}

fn default_true() -> bool {
    true
}
