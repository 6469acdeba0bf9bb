//! Error types for the AirPlay HLS video session subsystem.
//!
//! Mirrors the hierarchical `thiserror` shape the rest of the pack uses:
//! a top-level [`AppError`] wraps per-component error enums so each module
//! can describe its own failure modes precisely while handlers only have to
//! match on the outer type.

mod types;

pub use types::{
    AppError, FcupError, MediaStoreError, PlaylistError, RegistryError, SessionError,
};

pub type AppResult<T> = Result<T, AppError>;
