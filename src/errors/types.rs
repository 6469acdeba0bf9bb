//! Error type definitions.
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Playlist parsing/rewriting failures (component A).
    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    /// Media data store failures (component B).
    #[error("Media store error: {0}")]
    MediaStore(#[from] MediaStoreError),

    /// Session state-machine failures (component C).
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Session registry failures (component D).
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// FCUP request issuer / reverse-HTTP channel failures (component E).
    #[error("FCUP error: {0}")]
    Fcup(#[from] FcupError),

    /// Property-list decode/encode failures from the plist codec.
    #[error("Plist error: {0}")]
    Plist(#[from] plist::Error),

    /// Malformed or unexpected request bodies.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Lookup by UUID or index came up empty.
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Only FairPlay v3 is implemented; v2 setup is rejected.
    #[error("FairPlay version unsupported: {message}")]
    FairPlayVersionUnsupported { message: String },

    /// `/play`'s `Content-Location` did not end with `/master.m3u8`
    /// (spec.md SS4.F step 5, SS7 `unsupported_content_location`).
    #[error("Content-Location {content_location:?} does not end with /master.m3u8")]
    UnsupportedContentLocation { content_location: String },

    /// A second PTTH upgrade was attempted on a connection that already has one.
    #[error("reverse connection already upgraded")]
    ReverseAlreadyUpgraded,

    /// Configuration load/parse errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Catch-all for conditions that should never surface to a client.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Playlist parser/rewriter specific errors (spec.md SS4.A).
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// A master playlist's language slices did not evenly divide into
    /// `languages x copies`, or the per-language structure did not repeat
    /// as expected.
    #[error("master playlist language slices are malformed: {message}")]
    MalformedLanguageSlices { message: String },

    /// No language slice could be selected (no DEFAULT, no match, no stored
    /// name) — the original asserts `i_default >= 0`; the rewrite surfaces
    /// this instead of aborting.
    #[error("could not select a language from master playlist")]
    NoLanguageSelectable,

    /// `uri_prefix` does not occur anywhere in the master playlist.
    #[error("uri_prefix {uri_prefix:?} not found in master playlist")]
    UriPrefixNotFound { uri_prefix: String },

    /// A URI table entry was opened (prefix found) but never closed with
    /// an `m3u8` token.
    #[error("unterminated media uri in master playlist")]
    UnterminatedMediaUri,

    /// The client returned two different bodies for what the master
    /// playlist lists as the same media URI (spec.md SS9 Open Question).
    #[error("duplicate media uri {uri:?} returned differing playlists")]
    MalformedResponse { uri: String },

    /// A condensed-URI (`#YT-EXT-CONDENSED-URL`) playlist is missing one of
    /// `BASE-URI`, `PARAMS`, or `PREFIX`.
    #[error("condensed playlist header missing {field}")]
    MalformedCondensedHeader { field: &'static str },

    /// The length-exactness assertion on a rewrite failed: this indicates a
    /// bug in the tokenizer, not bad input.
    #[error("rewrite length assertion failed: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Media data store specific errors (spec.md SS4.B).
#[derive(Error, Debug)]
pub enum MediaStoreError {
    #[error("media index {index} out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    #[error("media index {index} already stored")]
    AlreadyStored { index: usize },
}

/// Session specific errors (spec.md SS4.C).
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("identifier {field} must be exactly 36 bytes, got {len}")]
    InvalidUuidLength { field: &'static str, len: usize },

    #[error("no media store allocated for this session yet")]
    NoMediaStore,
}

/// Session registry specific errors (spec.md SS4.D).
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no playback uuid {uuid} in registry")]
    NoSuchSession { uuid: String },

    #[error("registry is at capacity ({capacity}) with no evictable slot")]
    CapacityExceeded { capacity: usize },
}

/// FCUP request issuer / reverse channel specific errors (spec.md SS4.E).
#[derive(Error, Debug)]
pub enum FcupError {
    #[error("no reverse (PTTH) channel has been established yet")]
    NoReverseChannel,

    #[error("failed writing FCUP request to reverse channel: {message}")]
    WriteFailed { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Playlist(_)
            | AppError::MediaStore(_)
            | AppError::Session(_)
            | AppError::Registry(RegistryError::NoSuchSession { .. })
            | AppError::Plist(_)
            | AppError::UnsupportedContentLocation { .. }
            | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::FairPlayVersionUnsupported { .. } => StatusCode::MISDIRECTED_REQUEST,
            AppError::ReverseAlreadyUpgraded => StatusCode::CONFLICT,
            AppError::Registry(RegistryError::CapacityExceeded { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Fcup(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        tracing::error!(error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}
