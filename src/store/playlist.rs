//! Playlist and "current track" cursor.
//!
//! [`PlaylistState`] holds the list and the cursor and keeps the cursor valid:
//! whenever the playlist is non-empty, `current_index < playlist.len()`,
//! otherwise it is 0 and the current track is [`Track::placeholder`].
//!
//! [`PlaylistStore`] owns a state and a backend. Every mutation is followed by
//! a save of the whole state, and removing an imported track deletes its audio
//! payload from the blob store before the entry leaves the list.

use serde::{Deserialize, Serialize};

use crate::{
    domain::track::{Track, bundled_tracks},
    storage::{BlobStore, StatePersistence, error::StorageError},
};

/// Key the playlist state is persisted under
pub const STORE_KEY: &str = "music";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistState {
    pub playlist: Vec<Track>,
    pub current_index: usize,
}

impl PlaylistState {
    /// Initial state when nothing has been persisted yet
    pub fn seeded(with_defaults: bool) -> Self {
        let playlist = if with_defaults {
            bundled_tracks()
        } else {
            vec![]
        };
        Self {
            playlist,
            current_index: 0,
        }
    }

    pub fn current_track(&self) -> Track {
        self.playlist
            .get(self.current_index)
            .cloned()
            .unwrap_or_else(Track::placeholder)
    }

    fn append(&mut self, track: Track) {
        self.playlist.push(track);
    }

    /// Removes the entry at `index`, keeping the cursor on the same track.
    ///
    /// If the current track itself is removed, the cursor stays on the same
    /// position (now the following track), or the last one if it overflows.
    fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.playlist.len() {
            return None;
        }

        let removed = self.playlist.remove(index);

        if index < self.current_index {
            self.current_index -= 1;
        }
        self.clamp_cursor();

        Some(removed)
    }

    fn advance(&mut self) -> bool {
        let len = self.playlist.len();
        if len <= 1 {
            return false;
        }
        self.current_index = (self.current_index + 1) % len;
        true
    }

    fn retreat(&mut self) -> bool {
        let len = self.playlist.len();
        if len <= 1 {
            return false;
        }
        self.current_index = (self.current_index + len - 1) % len;
        true
    }

    fn select(&mut self, index: usize) -> bool {
        if index >= self.playlist.len() || index == self.current_index {
            return false;
        }
        self.current_index = index;
        true
    }

    fn clamp_cursor(&mut self) {
        if self.current_index >= self.playlist.len() {
            self.current_index = self.playlist.len().saturating_sub(1);
        }
    }
}

/// Playlist with its persistence and payload cleanup.
pub struct PlaylistStore<B> {
    state: PlaylistState,
    backend: B,
}

impl<B: BlobStore + StatePersistence> PlaylistStore<B> {
    /// Rehydrates the persisted playlist, or seeds a new one.
    pub fn open(backend: B, seed_defaults: bool) -> Result<Self, StorageError> {
        let state = match backend.load::<PlaylistState>(STORE_KEY)? {
            Some(mut state) => {
                state.clamp_cursor();
                log::debug!(
                    "rehydrated playlist with {} tracks, cursor at {}",
                    state.playlist.len(),
                    state.current_index
                );
                state
            }
            None => {
                log::info!("no saved playlist, starting a new one");
                PlaylistState::seeded(seed_defaults)
            }
        };

        Ok(Self { state, backend })
    }

    pub fn current_track(&self) -> Track {
        self.state.current_track()
    }

    pub fn playlist(&self) -> &[Track] {
        &self.state.playlist
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn state(&self) -> &PlaylistState {
        &self.state
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.playlist.iter().any(|t| t.id == id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Appends a track. Its payload, if any, must already be in the blob store.
    pub fn add_track(&mut self, track: Track) -> Result<(), StorageError> {
        log::info!("adding track {} ({})", track.title, track.id);
        self.state.append(track);
        self.persist()
    }

    /// Removes the track at `index`; an index past the end is ignored.
    ///
    /// When the payload deletion fails the playlist is left untouched
    /// and the error is returned.
    pub fn remove_track(&mut self, index: usize) -> Result<Option<Track>, StorageError> {
        let Some(track) = self.state.playlist.get(index) else {
            log::debug!("no track at index {index}, nothing to remove");
            return Ok(None);
        };

        if !track.is_default {
            let key = track.payload_key();
            if let Err(e) = self.backend.delete(&key) {
                log::error!("failed to delete payload {key}, keeping track in playlist: {e}");
                return Err(e);
            }
        }

        let removed = self.state.remove_at(index);
        if let Some(track) = &removed {
            log::info!("removed track {} ({})", track.title, track.id);
        }
        self.persist()?;
        Ok(removed)
    }

    pub fn next_track(&mut self) -> Result<(), StorageError> {
        if self.state.advance() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn prev_track(&mut self) -> Result<(), StorageError> {
        if self.state.retreat() {
            self.persist()?;
        }
        Ok(())
    }

    /// Moves the cursor to `index`. Returns false when there is no such entry.
    pub fn select(&mut self, index: usize) -> Result<bool, StorageError> {
        if index >= self.state.playlist.len() {
            return Ok(false);
        }
        if self.state.select(index) {
            self.persist()?;
        }
        Ok(true)
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        self.backend.save(STORE_KEY, &self.state).inspect_err(|e| {
            log::error!("failed to save playlist: {e}");
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::store::testing::{Event, MemoryBackend};

    fn track(id: &str, is_default: bool) -> Track {
        Track {
            id: id.to_string(),
            title: format!("title {id}"),
            artist: format!("artist {id}"),
            cover: String::new(),
            url: format!("/music/{id}.mp3"),
            is_default,
        }
    }

    fn store_with(tracks: Vec<Track>, current_index: usize) -> PlaylistStore<MemoryBackend> {
        let mut backend = MemoryBackend::default();
        backend.seed_state(
            STORE_KEY,
            &PlaylistState {
                playlist: tracks,
                current_index,
            },
        );
        PlaylistStore::open(backend, true).unwrap()
    }

    fn ids(store: &PlaylistStore<MemoryBackend>) -> Vec<&str> {
        store.playlist().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_fresh_store_seeds_bundled_tracks() -> anyhow::Result<()> {
        let store = PlaylistStore::open(MemoryBackend::default(), true)?;

        assert_eq!(ids(&store), vec!["default_1", "default_2"]);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_track().title, "Music1");

        Ok(())
    }

    #[test]
    fn test_fresh_store_without_defaults_is_empty() -> anyhow::Result<()> {
        let store = PlaylistStore::open(MemoryBackend::default(), false)?;

        assert!(store.playlist().is_empty());
        assert_eq!(store.current_track(), Track::placeholder());

        Ok(())
    }

    #[test]
    fn test_rehydrates_persisted_state() -> anyhow::Result<()> {
        let mut store = PlaylistStore::open(MemoryBackend::default(), false)?;
        store.add_track(track("a", true))?;
        store.add_track(track("b", false))?;
        store.next_track()?;

        let reopened = PlaylistStore::open(store.backend().clone(), true)?;

        assert_eq!(reopened.state(), store.state());
        assert_eq!(reopened.current_track().id, "b");

        Ok(())
    }

    #[test]
    fn test_emptied_playlist_is_not_reseeded() -> anyhow::Result<()> {
        let mut store = PlaylistStore::open(MemoryBackend::default(), true)?;
        store.remove_track(0)?;
        store.remove_track(0)?;
        assert!(store.playlist().is_empty());

        let reopened = PlaylistStore::open(store.backend().clone(), true)?;

        assert!(reopened.playlist().is_empty());
        assert_eq!(reopened.current_index(), 0);
        assert_eq!(reopened.current_track(), Track::placeholder());

        Ok(())
    }

    #[test]
    fn test_rehydration_clamps_out_of_range_cursor() {
        let store = store_with(vec![track("a", true), track("b", true)], 7);

        assert_eq!(store.current_index(), 1);
        assert_eq!(store.current_track().id, "b");
    }

    #[test]
    fn test_empty_playlist_gives_placeholder() {
        let store = store_with(vec![], 0);

        let current = store.current_track();
        assert_eq!(current.title, "等待开启");
        assert_eq!(current.artist, "时光抽屉");
        assert_eq!(current.cover, "");
    }

    #[test]
    fn test_add_track_appends_and_keeps_cursor() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true), track("b", true)], 1);

        store.add_track(track("c", false))?;

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.current_index(), 1);
        assert_eq!(store.backend().events, vec![Event::Save(STORE_KEY.into())]);

        Ok(())
    }

    #[test]
    fn test_add_track_does_not_touch_blobs() -> anyhow::Result<()> {
        let mut store = store_with(vec![], 0);

        store.add_track(track("u1", false))?;

        assert!(
            store
                .backend()
                .events
                .iter()
                .all(|e| !matches!(e, Event::Put(_) | Event::Delete(_)))
        );
        Ok(())
    }

    #[test]
    fn test_next_prev_wrap_around() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true), track("b", true), track("c", true)], 2);

        store.next_track()?;
        assert_eq!(store.current_index(), 0);

        store.prev_track()?;
        assert_eq!(store.current_index(), 2);

        store.prev_track()?;
        assert_eq!(store.current_index(), 1);

        Ok(())
    }

    #[test]
    fn test_next_then_prev_returns_to_start() -> anyhow::Result<()> {
        for len in 2..5 {
            for start in 0..len {
                let tracks = (0..len).map(|i| track(&i.to_string(), true)).collect();
                let mut store = store_with(tracks, start);

                store.next_track()?;
                store.prev_track()?;
                assert_eq!(store.current_index(), start);

                store.prev_track()?;
                store.next_track()?;
                assert_eq!(store.current_index(), start);
            }
        }
        Ok(())
    }

    #[test]
    fn test_navigation_is_noop_for_short_playlists() -> anyhow::Result<()> {
        let mut empty = store_with(vec![], 0);
        empty.next_track()?;
        empty.prev_track()?;
        assert_eq!(empty.current_index(), 0);
        assert!(empty.backend().events.is_empty());

        let mut single = store_with(vec![track("a", true)], 0);
        single.next_track()?;
        single.prev_track()?;
        assert_eq!(single.current_index(), 0);
        assert!(single.backend().events.is_empty());

        Ok(())
    }

    #[test]
    fn test_remove_last_current_clamps_cursor() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true), track("b", true)], 0);

        store.next_track()?;
        assert_eq!(store.current_index(), 1);

        let removed = store.remove_track(1)?;

        assert_eq!(removed.map(|t| t.id), Some("b".to_string()));
        assert_eq!(ids(&store), vec!["a"]);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_track().id, "a");
        assert!(
            store
                .backend()
                .events
                .iter()
                .all(|e| !matches!(e, Event::Delete(_)))
        );

        Ok(())
    }

    #[test]
    fn test_remove_only_track_leaves_placeholder() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true)], 0);

        store.remove_track(0)?;

        assert!(store.playlist().is_empty());
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_track(), Track::placeholder());

        Ok(())
    }

    #[test]
    fn test_remove_imported_track_deletes_payload_first() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("u1", false)], 0);

        store.remove_track(0)?;

        assert_eq!(
            store.backend().events,
            vec![
                Event::Delete("file_u1".into()),
                Event::Save(STORE_KEY.into())
            ]
        );
        let saved = store.backend().load::<PlaylistState>(STORE_KEY)?.unwrap();
        assert!(saved.playlist.is_empty());

        Ok(())
    }

    #[test]
    fn test_remove_default_track_never_deletes_payload() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("default_1", true), track("u1", false)], 0);

        store.remove_track(0)?;

        assert_eq!(store.backend().events, vec![Event::Save(STORE_KEY.into())]);
        assert_eq!(ids(&store), vec!["u1"]);

        Ok(())
    }

    #[test]
    fn test_failed_payload_delete_keeps_track() {
        let mut store = store_with(vec![track("a", true), track("u1", false)], 1);
        store.backend_mut().fail_deletes = true;

        let result = store.remove_track(1);

        assert!(result.is_err());
        assert_eq!(ids(&store), vec!["a", "u1"]);
        assert_eq!(store.current_index(), 1);
        assert!(
            store
                .backend()
                .events
                .iter()
                .all(|e| !matches!(e, Event::Save(_)))
        );
    }

    #[test]
    fn test_remove_out_of_range_is_noop() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("u1", false)], 0);

        assert_eq!(store.remove_track(1)?, None);
        assert_eq!(store.remove_track(usize::MAX)?, None);

        assert_eq!(ids(&store), vec!["u1"]);
        assert!(store.backend().events.is_empty());

        Ok(())
    }

    #[test]
    fn test_remove_before_cursor_keeps_same_track() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true), track("b", true), track("c", true)], 2);

        store.remove_track(0)?;

        assert_eq!(store.current_index(), 1);
        assert_eq!(store.current_track().id, "c");

        Ok(())
    }

    #[test]
    fn test_remove_current_moves_to_following_track() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true), track("b", true), track("c", true)], 1);

        store.remove_track(1)?;

        assert_eq!(store.current_index(), 1);
        assert_eq!(store.current_track().id, "c");

        Ok(())
    }

    #[test]
    fn test_remove_after_cursor_keeps_cursor() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true), track("b", true), track("c", true)], 0);

        store.remove_track(2)?;

        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_track().id, "a");

        Ok(())
    }

    #[test]
    fn test_select_moves_cursor() -> anyhow::Result<()> {
        let mut store = store_with(vec![track("a", true), track("b", true)], 0);

        assert!(store.select(1)?);
        assert_eq!(store.current_track().id, "b");

        assert!(!store.select(2)?);
        assert_eq!(store.current_index(), 1);

        Ok(())
    }

    #[test]
    fn test_failed_save_is_reported() {
        let mut backend = MemoryBackend::default();
        backend.fail_saves = true;
        let mut store = PlaylistStore::open(backend, true).unwrap();

        assert!(store.next_track().is_err());
        // the in-memory mutation stands
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn test_cursor_stays_in_range_over_mixed_operations() -> anyhow::Result<()> {
        let mut store = PlaylistStore::open(MemoryBackend::default(), true)?;

        let mut rng = StdRng::seed_from_u64(42);

        for step in 0..2000 {
            match rng.random_range(0..5) {
                0 => store.add_track(track(&format!("u{step}"), step % 3 == 0))?,
                1 => {
                    let len = store.playlist().len();
                    store.remove_track(rng.random_range(0..len + 2))?;
                }
                2 => store.next_track()?,
                3 => store.prev_track()?,
                _ => {
                    let len = store.playlist().len();
                    store.select(rng.random_range(0..=len))?;
                }
            }

            let len = store.playlist().len();
            if len == 0 {
                assert_eq!(store.current_index(), 0);
                assert_eq!(store.current_track(), Track::placeholder());
            } else {
                assert!(store.current_index() < len);
            }
        }

        Ok(())
    }
}
