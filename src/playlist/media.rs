use serde::{Deserialize, Serialize};

/// `#EXT-X-PLAYLIST-TYPE` value (spec.md SS3 MediaItem.playlist_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaylistType {
    #[default]
    None,
    Vod,
    Event,
}

/// Header fields parsed out of a media playlist (spec.md SS4.A
/// "Media-playlist header parsing").
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaPlaylistInfo {
    pub playlist_type: PlaylistType,
    pub hls_version: i64,
    pub media_sequence: i64,
}

/// Walk `#EXTINF:` tags, summing durations and counting chunks. `endlist` is
/// true if `#EXT-X-ENDLIST` appears anywhere after the last `#EXTINF:`.
pub fn analyze_media_playlist(playlist: &str) -> (u32, f32, bool) {
    const TAG: &str = "#EXTINF:";
    let mut count = 0u32;
    let mut duration = 0.0f32;
    let mut cursor = 0usize;
    let mut last_value_end = 0usize;

    while let Some(rel) = playlist[cursor..].find(TAG) {
        let value_start = cursor + rel + TAG.len();
        let value_tail = &playlist[value_start..];
        let value_end_rel = value_tail
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
            .unwrap_or(value_tail.len());
        let value_str = &value_tail[..value_end_rel];
        if let Ok(value) = value_str.parse::<f32>() {
            duration += value;
        }
        count += 1;
        last_value_end = value_start + value_end_rel;
        cursor = last_value_end;
    }

    let endlist = playlist[last_value_end..].contains("#EXT-X-ENDLIST");
    (count, duration, endlist)
}

/// Parse `#EXT-X-PLAYLIST-TYPE:`, `#EXT-X-VERSION:`, and
/// `#EXT-X-MEDIA-SEQUENCE:` out of a media playlist's header tags.
pub fn parse_media_playlist_header(playlist: &str) -> MediaPlaylistInfo {
    let mut info = MediaPlaylistInfo::default();

    if let Some(rest) = after(playlist, "#EXT-X-PLAYLIST-TYPE:") {
        if rest.starts_with("VOD") {
            info.playlist_type = PlaylistType::Vod;
        } else if rest.starts_with("EVENT") {
            info.playlist_type = PlaylistType::Event;
        }
    }
    if let Some(rest) = after(playlist, "#EXT-X-VERSION:") {
        info.hls_version = leading_integer(rest);
    }
    if let Some(rest) = after(playlist, "#EXT-X-MEDIA-SEQUENCE:") {
        info.media_sequence = leading_integer(rest);
    }

    info
}

fn after<'a>(haystack: &'a str, needle: &str) -> Option<&'a str> {
    haystack.find(needle).map(|idx| &haystack[idx + needle.len()..])
}

fn leading_integer(s: &str) -> i64 {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '-'))
        .unwrap_or(s.len());
    s[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_durations_and_counts_chunks() {
        let playlist = "#EXTM3U\n#EXTINF:10.5,\nseg1.ts\n#EXTINF:9.5,\nseg2.ts\n#EXT-X-ENDLIST\n";
        let (count, duration, endlist) = analyze_media_playlist(playlist);
        assert_eq!(count, 2);
        assert!((duration - 20.0).abs() < 0.001);
        assert!(endlist);
    }

    #[test]
    fn no_endlist_when_tag_absent() {
        let playlist = "#EXTM3U\n#EXTINF:4.0,\nseg1.ts\n";
        let (count, _duration, endlist) = analyze_media_playlist(playlist);
        assert_eq!(count, 1);
        assert!(!endlist);
    }

    #[test]
    fn header_fields_parsed() {
        let playlist =
            "#EXTM3U\n#EXT-X-VERSION:4\n#EXT-X-PLAYLIST-TYPE:VOD\n#EXT-X-MEDIA-SEQUENCE:7\n";
        let info = parse_media_playlist_header(playlist);
        assert_eq!(info.hls_version, 4);
        assert_eq!(info.media_sequence, 7);
        assert_eq!(info.playlist_type, PlaylistType::Vod);
    }
}
