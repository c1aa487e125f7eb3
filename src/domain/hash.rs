use std::fmt::Display;

use blake3::Hash;

/// Content-derived identifier of an imported track.
///
/// Two imports of the same audio bytes produce the same id,
/// which lets the importer skip files already in the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(pub Hash);

impl TrackId {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    pub fn from_hex(hex: &str) -> anyhow::Result<Self> {
        Ok(Self(Hash::from_hex(hex)?))
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
