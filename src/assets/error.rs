// Copyright (C) 2026 The padboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
/// Error decoding audio bytes into PCM.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Unrecognized audio format: {0}")]
    UnrecognizedFormat(symphonia::core::errors::Error),

    #[error("Audio decode failed: {0}")]
    Decode(symphonia::core::errors::Error),

    #[error("Stream has no {0}")]
    MissingStreamInfo(&'static str),

    #[error("Stream decoded to no audio frames")]
    Empty,
}

/// Errors from asset loading and the operations that feed the cache.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("No bundled file for sound {0}")]
    NotFound(String),

    #[error("Unknown builtin sound: {0}")]
    UnknownSound(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}
