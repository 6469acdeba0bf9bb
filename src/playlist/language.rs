use crate::errors::PlaylistError;

/// One `#EXT-X-MEDIA` audio-language entry plus the prelude/tail bracketing
/// the whole run of them. Prelude and tail carry an empty `code` and are
/// always kept regardless of which language is selected.
struct LanguageSlice {
    start: usize,
    end: usize,
    code: String,
    name: String,
    is_default: bool,
}

impl LanguageSlice {
    fn is_bracket(&self) -> bool {
        self.code.is_empty()
    }
}

/// Outcome of selecting a language from a master playlist.
pub struct LanguageSelection {
    pub master_playlist: String,
    pub language_code: String,
    pub language_name: String,
    /// True if the selection differs from what the session had stored
    /// (`language_name` argument), meaning the caller should persist it.
    pub changed: bool,
}

/// Scan `data` for `#EXT-X-MEDIA` audio-language entries and slice it into
/// prelude / language-entry / tail pieces. Returns `None` if there are no
/// qualifying entries (playlist has zero or one language and nothing to
/// slice, matching the C implementation's `master_playlist_process_language`
/// returning NULL on `count == 0`).
fn collect_language_slices(data: &str) -> Result<Option<Vec<LanguageSlice>>, PlaylistError> {
    const MARKER: &str = "#EXT-X-MEDIA";

    let first = match data.find(MARKER) {
        Some(pos) => pos,
        None => return Ok(None),
    };

    let mut entries = Vec::new();
    let mut cursor = first;
    while let Some(rel) = data[cursor..].find(MARKER) {
        let entry_start = cursor + rel;
        let line_end = match data[entry_start..].find('\n') {
            Some(nl) => entry_start + nl + 1,
            None => data.len(),
        };
        let line = &data[entry_start..line_end];

        if line.contains("URI=")
            && line.contains("LANGUAGE=")
            && line.contains("YT-EXT-AUDIO-CONTENT-ID=")
        {
            let is_default = extract_after(line, "DEFAULT=")
                .map(|rest| rest.starts_with("YES"))
                .unwrap_or(false);
            let name = extract_quoted(line, "NAME=").ok_or_else(|| {
                PlaylistError::MalformedLanguageSlices {
                    message: "language entry missing NAME=\"...\"".to_string(),
                }
            })?;
            let code = extract_quoted(line, "LANGUAGE=").ok_or_else(|| {
                PlaylistError::MalformedLanguageSlices {
                    message: "language entry missing LANGUAGE=\"...\"".to_string(),
                }
            })?;
            entries.push(LanguageSlice {
                start: entry_start,
                end: line_end,
                code,
                name,
                is_default,
            });
        }

        cursor = line_end;
        if cursor >= data.len() {
            break;
        }
    }

    if entries.is_empty() {
        return Ok(None);
    }

    let mut slices = Vec::with_capacity(entries.len() + 2);
    slices.push(LanguageSlice {
        start: 0,
        end: first,
        code: String::new(),
        name: String::new(),
        is_default: false,
    });
    let tail_start = entries.last().unwrap().end;
    slices.extend(entries);
    slices.push(LanguageSlice {
        start: tail_start,
        end: data.len(),
        code: String::new(),
        name: String::new(),
        is_default: false,
    });

    Ok(Some(slices))
}

/// Select a language from `master_playlist` per spec.md SS4.A priority order
/// and emit the rewritten playlist containing only the prelude, the
/// selected language's slices, and the tail.
pub fn select_master_playlist_language(
    master_playlist: &str,
    stored_language_name: Option<&str>,
    operator_lang: &str,
) -> Result<LanguageSelection, PlaylistError> {
    let slices = match collect_language_slices(master_playlist)? {
        Some(s) => s,
        None => {
            return Ok(LanguageSelection {
                master_playlist: master_playlist.to_string(),
                language_code: stored_language_name.map(|_| String::new()).unwrap_or_default(),
                language_name: stored_language_name.unwrap_or_default().to_string(),
                changed: false,
            })
        }
    };

    let language_entries: Vec<&LanguageSlice> =
        slices.iter().filter(|s| !s.is_bracket()).collect();
    let total = language_entries.len();

    let first_code = &language_entries[0].code;
    let copies = language_entries
        .iter()
        .filter(|s| s.code == *first_code)
        .count();
    if copies == 0 || total % copies != 0 {
        return Err(PlaylistError::MalformedLanguageSlices {
            message: format!("{total} language entries do not divide evenly into copies"),
        });
    }
    let language_count = total / copies;

    if language_count > 1 {
        for slice in &language_entries {
            tracing::debug!(
                code = %slice.code,
                name = %slice.name,
                default = slice.is_default,
                "master playlist language slice"
            );
        }
    }

    // priority a: stored language_name matches a NAME=
    let mut chosen: Option<&LanguageSlice> = None;
    if let Some(name) = stored_language_name {
        chosen = language_entries.iter().find(|s| s.name == name).copied();
    }
    // priority b: operator preference list, colon-separated, 2-char prefix match
    if chosen.is_none() {
        for token in operator_lang.split(':') {
            if token.len() < 2 {
                continue;
            }
            if let Some(found) = language_entries
                .iter()
                .find(|s| s.code.len() >= 2 && s.code[..2] == token[..2])
            {
                chosen = Some(found);
                break;
            }
        }
    }
    // priority c: DEFAULT flag
    if chosen.is_none() {
        chosen = language_entries.iter().find(|s| s.is_default).copied();
    }

    let chosen = chosen.ok_or(PlaylistError::NoLanguageSelectable)?;
    let language_code = chosen.code.clone();
    let language_name = chosen.name.clone();
    let changed = stored_language_name != Some(language_name.as_str());

    let mut out = String::with_capacity(master_playlist.len());
    for slice in &slices {
        if slice.is_bracket() || slice.code == language_code {
            out.push_str(&master_playlist[slice.start..slice.end]);
        }
    }

    let _ = language_count;
    Ok(LanguageSelection {
        master_playlist: out,
        language_code,
        language_name,
        changed,
    })
}

fn extract_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let idx = line.find(key)?;
    Some(&line[idx + key.len()..])
}

fn extract_quoted(line: &str, key: &str) -> Option<String> {
    let rest = extract_after(line, key)?;
    let rest = rest.strip_prefix('"').unwrap_or(rest);
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}
