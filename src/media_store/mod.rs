//! Per-session media data store: an indexed table of media URIs and their
//! fetched, parsed playlists, with dedup by URI (component B).

use crate::playlist::{self, MediaPlaylistInfo, PlaylistType};

/// One entry in a [`MediaStore`] (spec.md SS3 MediaItem).
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub uri: String,
    pub playlist: Option<String>,
    /// Own index, unless this item is a duplicate alias of a prior item, in
    /// which case it points at the canonical index.
    pub num: usize,
    pub count: u32,
    pub duration: f32,
    pub endlist: bool,
    pub playlist_type: PlaylistType,
    pub hls_version: i64,
    pub media_sequence: i64,
}

impl MediaItem {
    fn new(index: usize, uri: String) -> Self {
        Self {
            uri,
            playlist: None,
            num: index,
            count: 0,
            duration: 0.0,
            endlist: false,
            playlist_type: PlaylistType::None,
            hls_version: 0,
            media_sequence: 0,
        }
    }
}

/// Outcome of a [`MediaStore::store`] call, matching spec.md SS4.B.
#[derive(Debug, PartialEq, Eq)]
pub enum StoreResult {
    Stored,
    Duplicate,
    OutOfRange,
    AlreadyStored,
}

/// Ordered table of [`MediaItem`]s, size fixed at creation from the master
/// playlist's URI table (spec.md SS3 MediaStore).
#[derive(Debug, Default, Clone)]
pub struct MediaStore {
    items: Vec<MediaItem>,
}

impl MediaStore {
    pub fn create(uris: Vec<String>) -> Self {
        let items = uris
            .into_iter()
            .enumerate()
            .map(|(i, uri)| MediaItem::new(i, uri))
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    /// Store a fetched media playlist at `index`. On a duplicate URI whose
    /// prior playlist text differs byte-for-byte, returns `Err` rather than
    /// silently accepting a mismatched body (spec.md SS9 Open Question).
    pub fn store(
        &mut self,
        index: usize,
        playlist_text: String,
    ) -> Result<StoreResult, String> {
        if index >= self.items.len() {
            return Ok(StoreResult::OutOfRange);
        }
        if self.items[index].playlist.is_some() {
            return Ok(StoreResult::AlreadyStored);
        }

        for j in 0..index {
            if self.items[j].uri == self.items[index].uri {
                if let Some(existing) = &self.items[j].playlist {
                    if *existing != playlist_text {
                        return Err(format!(
                            "duplicate uri {:?} returned differing playlists",
                            self.items[index].uri
                        ));
                    }
                }
                self.items[index].num = self.items[j].num;
                return Ok(StoreResult::Duplicate);
            }
        }

        let (count, duration, endlist) = playlist::analyze_media_playlist(&playlist_text);
        let header = playlist::parse_media_playlist_header(&playlist_text);
        let MediaPlaylistInfo {
            playlist_type,
            hls_version,
            media_sequence,
        } = header;

        let item = &mut self.items[index];
        item.playlist = Some(playlist_text);
        item.count = count;
        item.duration = duration;
        item.endlist = endlist;
        item.playlist_type = playlist_type;
        item.hls_version = hls_version;
        item.media_sequence = media_sequence;

        Ok(StoreResult::Stored)
    }

    /// Find the first item whose `uri` contains `local_path` as a substring
    /// and follow its `num` indirection to the canonical entry.
    pub fn lookup(&self, local_path: &str) -> Option<&MediaItem> {
        let found = self.items.iter().find(|item| item.uri.contains(local_path))?;
        self.items.get(found.num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(uris: &[&str]) -> MediaStore {
        MediaStore::create(uris.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn store_out_of_range() {
        let mut store = store_with(&["a.m3u8"]);
        assert_eq!(
            store.store(5, "x".to_string()).unwrap(),
            StoreResult::OutOfRange
        );
    }

    #[test]
    fn store_already_stored() {
        let mut store = store_with(&["a.m3u8"]);
        store.store(0, "#EXTM3U\n".to_string()).unwrap();
        assert_eq!(
            store.store(0, "#EXTM3U\n".to_string()).unwrap(),
            StoreResult::AlreadyStored
        );
    }

    #[test]
    fn duplicate_uri_with_equal_playlist_is_idempotent() {
        let mut store = store_with(&["a.m3u8", "a.m3u8"]);
        store
            .store(0, "#EXTM3U\n#EXTINF:1,\nseg.ts\n".to_string())
            .unwrap();
        let result = store
            .store(1, "#EXTM3U\n#EXTINF:1,\nseg.ts\n".to_string())
            .unwrap();
        assert_eq!(result, StoreResult::Duplicate);
        assert_eq!(store.get(1).unwrap().num, 0);
    }

    #[test]
    fn duplicate_uri_with_differing_playlist_is_rejected() {
        let mut store = store_with(&["a.m3u8", "a.m3u8"]);
        store.store(0, "#EXTM3U\n#EXTINF:1,\nseg.ts\n".to_string()).unwrap();
        let err = store.store(1, "#EXTM3U\n#EXTINF:2,\nother.ts\n".to_string());
        assert!(err.is_err());
    }

    #[test]
    fn lookup_follows_num_indirection() {
        let mut store = store_with(&["http://x/a.m3u8", "http://x/a.m3u8"]);
        store.store(0, "#EXTM3U\n#EXTINF:5,\nseg.ts\n".to_string()).unwrap();
        store.store(1, "#EXTM3U\n#EXTINF:5,\nseg.ts\n".to_string()).unwrap();
        let found = store.lookup("a.m3u8").unwrap();
        assert_eq!(found.duration, 5.0);
    }
}
