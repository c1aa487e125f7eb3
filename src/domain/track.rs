use serde::{Deserialize, Serialize};

use super::hash::TrackId;

/// Prefix of the blob store key under which an imported track's audio lives
pub const PAYLOAD_KEY_PREFIX: &str = "file_";

const PLACEHOLDER_TITLE: &str = "等待开启";
const PLACEHOLDER_ARTIST: &str = "时光抽屉";

/// Represent a playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub cover: String,
    pub url: String,
    /// bundled with the application; its audio is a static asset, not a blob
    #[serde(default)]
    pub is_default: bool,
}

impl Track {
    /// Track shown when there is nothing to play
    pub fn placeholder() -> Self {
        Self {
            id: String::new(),
            title: PLACEHOLDER_TITLE.to_string(),
            artist: PLACEHOLDER_ARTIST.to_string(),
            cover: String::new(),
            url: String::new(),
            is_default: true,
        }
    }

    /// Builds an entry for audio imported by the user.
    pub fn imported(id: &TrackId, title: String, artist: String, cover: String) -> Self {
        Self {
            id: id.to_hex(),
            title,
            artist,
            cover,
            url: format!("/tracks/{}/audio", id.to_hex()),
            is_default: false,
        }
    }

    /// key of the audio payload in the blob store
    pub fn payload_key(&self) -> String {
        payload_key(&self.id)
    }
}

pub fn payload_key(id: &str) -> String {
    format!("{PAYLOAD_KEY_PREFIX}{id}")
}

/// Tracks shipped with the application, used to seed a fresh playlist
pub fn bundled_tracks() -> Vec<Track> {
    vec![
        Track {
            id: "default_1".to_string(),
            title: "Music1".to_string(),
            artist: "artist1".to_string(),
            cover: "https://images.unsplash.com/photo-1614613535308-eb5fbd3d2c17?w=500"
                .to_string(),
            url: "/music/music1.mp3".to_string(),
            is_default: true,
        },
        Track {
            id: "default_2".to_string(),
            title: "Music2".to_string(),
            artist: "artist2".to_string(),
            cover: "https://images.unsplash.com/photo-1470225620780-dba8ba36b745?w=500"
                .to_string(),
            url: "/music/music2.mp3".to_string(),
            is_default: true,
        },
    ]
}
