use crate::errors::PlaylistError;

/// Locate every occurrence of `uri_prefix` in `master_playlist` and read up
/// to and including the next `m3u8` token; each such substring is one media
/// URI. Mirrors `create_media_uri_table` in the original implementation, one
/// forward pass instead of the original's two (count, then allocate).
pub fn extract_media_uri_table(
    master_playlist: &str,
    uri_prefix: &str,
) -> Result<Vec<String>, PlaylistError> {
    if master_playlist.find(uri_prefix).is_none() {
        return Err(PlaylistError::UriPrefixNotFound {
            uri_prefix: uri_prefix.to_string(),
        });
    }

    let mut table = Vec::new();
    let mut cursor = 0usize;
    while let Some(rel) = master_playlist[cursor..].find(uri_prefix) {
        let start = cursor + rel;
        let after_prefix = start;
        let tail = &master_playlist[after_prefix..];
        let m3u8_rel = tail
            .find("m3u8")
            .ok_or(PlaylistError::UnterminatedMediaUri)?;
        let end = after_prefix + m3u8_rel + "m3u8".len();
        table.push(master_playlist[start..end].to_string());
        cursor = end;
    }
    Ok(table)
}

/// Replace every occurrence of `uri_prefix` with `local_uri_prefix` in
/// `master_playlist`. Asserts the output length matches the exact formula
/// from spec.md SS8 invariant 2.
pub fn adjust_master_playlist(
    master_playlist: &str,
    uri_prefix: &str,
    local_uri_prefix: &str,
) -> Result<String, PlaylistError> {
    let count = master_playlist.matches(uri_prefix).count();
    let expected_len = (master_playlist.len() as isize
        + count as isize * (local_uri_prefix.len() as isize - uri_prefix.len() as isize))
        as usize;

    let rewritten = master_playlist.replace(uri_prefix, local_uri_prefix);

    if rewritten.len() != expected_len {
        return Err(PlaylistError::LengthMismatch {
            expected: expected_len,
            actual: rewritten.len(),
        });
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U\n\
        #EXT-X-STREAM-INF:BANDWIDTH=1\n\
        http://client:7000/x/variant1.m3u8\n\
        #EXT-X-STREAM-INF:BANDWIDTH=2\n\
        http://client:7000/x/variant2.m3u8\n";

    #[test]
    fn extracts_both_uris_in_order() {
        let table = extract_media_uri_table(MASTER, "http://client:7000/x/").unwrap();
        assert_eq!(
            table,
            vec![
                "http://client:7000/x/variant1.m3u8".to_string(),
                "http://client:7000/x/variant2.m3u8".to_string(),
            ]
        );
    }

    #[test]
    fn missing_prefix_is_an_error() {
        let err = extract_media_uri_table(MASTER, "http://nope/").unwrap_err();
        assert!(matches!(err, PlaylistError::UriPrefixNotFound { .. }));
    }

    #[test]
    fn rewrite_is_length_exact() {
        let rewritten =
            adjust_master_playlist(MASTER, "http://client:7000/x/", "http://localhost:7100")
                .unwrap();
        let count = MASTER.matches("http://client:7000/x/").count();
        let expected = MASTER.len() as isize
            + count as isize
                * ("http://localhost:7100".len() as isize - "http://client:7000/x/".len() as isize);
        assert_eq!(rewritten.len(), expected as usize);
        assert!(!rewritten.contains("http://client:7000/x/"));
    }
}
