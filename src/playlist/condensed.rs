use crate::errors::PlaylistError;

/// Expand a condensed-URI media playlist (spec.md SS4.A "Condensed-URI
/// expansion"). If the playlist's first tag after `#EXTM3U\n` is not
/// `#YT-EXT-CONDENSED-URL`, returns an owned copy of the input unchanged.
///
/// The condensed form replaces each chunk's URL with `PREFIX` plus a
/// parameter-free path; expansion substitutes `BASE-URI` for `PREFIX` and
/// splices the comma-separated `PARAMS` tokens into the path as `/token/`
/// separators. This mirrors `adjust_yt_condensed_playlist`, whose last-param
/// boundary is found by scanning for the next `#EXT` tag rather than a `/` —
/// fragile if a path segment ever legitimately contains `#EXT`, but that is
/// the same assumption the original playlist producer relies on.
pub fn expand_condensed_uri(media_playlist: &str) -> Result<String, PlaylistError> {
    const HEADER: &str = "#EXTM3U\n";
    let Some(after_header) = media_playlist.find(HEADER).map(|i| i + HEADER.len()) else {
        return Ok(media_playlist.to_string());
    };
    if !media_playlist[after_header..].starts_with("#YT-EXT-CONDENSED-URL") {
        return Ok(media_playlist.to_string());
    }

    let (base_uri, pos) = extract_quoted_from(media_playlist, after_header, "BASE-URI=")?;
    let (params, pos) = extract_quoted_from(media_playlist, pos, "PARAMS=")?;
    let (prefix, _pos) = extract_quoted_from(media_playlist, pos, "PREFIX=")?;

    let params_list: Vec<&str> = if params.is_empty() {
        Vec::new()
    } else {
        params.split(',').collect()
    };
    let nparams = params_list.len();

    let chunk_count = media_playlist.matches("#EXTINF").count();
    let expected_len = media_playlist.len() + chunk_count * (base_uri.len() + params.len());

    let first_extinf = media_playlist
        .find("#EXTINF:")
        .ok_or(PlaylistError::MalformedCondensedHeader { field: "#EXTINF:" })?;

    let mut out = String::with_capacity(expected_len);
    out.push_str(&media_playlist[..first_extinf]);

    let mut old_pos = first_extinf;
    while let Some(prefix_rel) = media_playlist[old_pos..].find(prefix.as_str()) {
        let prefix_at = old_pos + prefix_rel;
        out.push_str(&media_playlist[old_pos..prefix_at]);
        out.push_str(&base_uri);
        old_pos = prefix_at + prefix.len();

        for (i, param) in params_list.iter().enumerate() {
            let is_last = i + 1 == nparams;
            let sep_rel = if is_last {
                media_playlist[old_pos..].find("#EXT")
            } else {
                media_playlist[old_pos..].find('/')
            };
            let sep_at = sep_rel.ok_or(PlaylistError::MalformedCondensedHeader {
                field: "path separator",
            })? + old_pos;

            out.push('/');
            out.push_str(param);
            out.push('/');
            out.push_str(&media_playlist[old_pos..sep_at]);
            old_pos = if is_last { sep_at } else { sep_at + 1 };
        }
    }
    out.push_str(&media_playlist[old_pos..]);

    if out.len() != expected_len {
        return Err(PlaylistError::LengthMismatch {
            expected: expected_len,
            actual: out.len(),
        });
    }
    Ok(out)
}

fn extract_quoted_from(
    data: &str,
    from: usize,
    key: &'static str,
) -> Result<(String, usize), PlaylistError> {
    let tail = &data[from..];
    let key_rel = tail
        .find(key)
        .ok_or(PlaylistError::MalformedCondensedHeader { field: key })?;
    let after_key = from + key_rel + key.len();
    let rest = &data[after_key..];
    let quote_rel = rest
        .find('"')
        .ok_or(PlaylistError::MalformedCondensedHeader { field: key })?;
    let value_start = after_key + quote_rel + 1;
    let value_tail = &data[value_start..];
    let end_rel = value_tail
        .find('"')
        .ok_or(PlaylistError::MalformedCondensedHeader { field: key })?;
    let value_end = value_start + end_rel;
    Ok((data[value_start..value_end].to_string(), value_end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_condensed_playlist_returned_unchanged() {
        let playlist = "#EXTM3U\n#EXTINF:10,\nseg1.ts\n#EXT-X-ENDLIST\n";
        let expanded = expand_condensed_uri(playlist).unwrap();
        assert_eq!(expanded, playlist);
    }

    #[test]
    fn condensed_playlist_is_length_exact() {
        let playlist = "#EXTM3U\n#YT-EXT-CONDENSED-URL BASE-URI=\"https://cdn/base\" PARAMS=\"p1,p2\" PREFIX=\"PFX\"\n\
            #EXTINF:10,\nPFX/seg/one.ts#EXTINF:9,\nPFX/seg/two.ts#EXT-X-ENDLIST\n";
        let expanded = expand_condensed_uri(playlist).unwrap();
        let expected_len = playlist.len() + 2 * ("https://cdn/base".len() + "p1,p2".len());
        assert_eq!(expanded.len(), expected_len);
        assert!(expanded.contains("https://cdn/base"));
        assert!(expanded.contains("/p1/"));
        assert!(expanded.contains("/p2/"));
        assert!(!expanded.contains("PFX"));
    }
}
