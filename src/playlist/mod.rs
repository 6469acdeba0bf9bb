//! M3U8 master/media playlist parsing and rewriting (component A).
//!
//! Everything here is a pure function over owned `String`s: no session or
//! registry state leaks in. Handlers call into this module with borrowed
//! text and a session's current language/prefix choices, and get back new
//! owned playlists plus whatever metadata they extracted.
//!
//! The original C implementation scans with repeated `strstr`, re-walking
//! the same bytes once per tag of interest. Every function below instead
//! makes a single forward pass over the input, which is both the more
//! idiomatic shape in Rust (no raw pointer arithmetic) and strictly less
//! work for large playlists.

mod condensed;
mod language;
mod media;
mod uri_table;

pub use condensed::expand_condensed_uri;
pub use language::{select_master_playlist_language, LanguageSelection};
pub use media::{analyze_media_playlist, parse_media_playlist_header, MediaPlaylistInfo, PlaylistType};
pub use uri_table::{adjust_master_playlist, extract_media_uri_table};
