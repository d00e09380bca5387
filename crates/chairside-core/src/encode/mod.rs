//! Encoding rendered edits into compressed payloads.
//!
//! Callers pick the quality: [`SAVE_QUALITY`] for the derived file itself,
//! [`THUMBNAIL_QUALITY`] for its grid preview.

mod jpeg;

pub use jpeg::{
    encode, encode_jpeg, encode_thumbnail, EncodeError, EncodedResult, SAVE_QUALITY,
    THUMBNAIL_QUALITY,
};
