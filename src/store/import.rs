//! Importing audio files into the playlist.
//!
//! The payload always reaches the blob store before the track is added, so a
//! playlist entry never points at audio that was not written.

use std::path::Path;

use crate::{
    domain::{hash::TrackId, track::Track},
    storage::{Blob, BlobStore, StatePersistence, error::StorageError, fs},
    store::playlist::PlaylistStore,
};

const UNKNOWN_ARTIST: &str = "unknown artist";

/// Metadata given by the user, applied to every imported file
#[derive(Debug, Default, Clone)]
pub struct ImportOverrides {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<Track>,
    /// files whose audio is already in the playlist
    pub skipped: Vec<(TrackId, String)>,
}

pub fn import_path<B: BlobStore + StatePersistence>(
    store: &mut PlaylistStore<B>,
    path: &Path,
    follow_symlinks: bool,
    overrides: &ImportOverrides,
) -> Result<ImportReport, StorageError> {
    let files = fs::collect_music_files(path, follow_symlinks)?;
    log::info!(
        "importing {} file(s) from {}",
        files.len(),
        path.to_string_lossy()
    );

    let mut report = ImportReport::default();

    for file in files {
        let data = std::fs::read(&file)?;
        let id = TrackId::from_bytes(&data);
        let file_name = file.to_string_lossy().to_string();

        if store.contains(&id.to_hex()) {
            log::warn!("{file_name} is already in the playlist as {id}, skipping");
            report.skipped.push((id, file_name));
            continue;
        }

        let title = overrides.title.clone().unwrap_or_else(|| {
            file.file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| id.to_hex())
        });
        let artist = overrides
            .artist
            .clone()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let cover = overrides.cover.clone().unwrap_or_default();

        let track = Track::imported(&id, title, artist, cover);
        let blob = Blob {
            content_type: fs::mime_for_path(&file),
            data,
        };

        let key = track.payload_key();
        store.backend_mut().put(&key, &blob)?;
        // the payload stays stored when the save fails; `status` lists it
        store.add_track(track.clone()).inspect_err(|_| {
            log::warn!("playlist not saved, payload {key} is left without a saved track");
        })?;

        report.imported.push(track);
    }

    Ok(report)
}
