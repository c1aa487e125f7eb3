use serde::Serialize;

use crate::config::AppManifest;

/// Web app manifest, what makes the player installable as a standalone app
#[derive(Debug, Serialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub scope: String,
    pub display: String,
    pub theme_color: String,
    pub background_color: String,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl WebManifest {
    pub fn from_config(conf: &AppManifest) -> Self {
        Self {
            name: conf.name.clone(),
            short_name: conf.short_name.clone(),
            description: conf.description.clone(),
            start_url: "/".to_string(),
            scope: "/".to_string(),
            display: "standalone".to_string(),
            theme_color: conf.theme_color.clone(),
            background_color: conf.theme_color.clone(),
            icons: conf
                .icons
                .iter()
                .map(|icon| ManifestIcon {
                    src: icon.src.clone(),
                    sizes: icon.sizes.clone(),
                    mime_type: icon.mime_type.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
