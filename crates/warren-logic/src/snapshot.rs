//! Save/load of finished layouts.
//!
//! Uses bincode with a format version header so stale files are rejected
//! instead of misread.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::Layout;

/// Version number for snapshot files (increment when `Layout` changes shape).
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    layout: Layout,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    layout: &'a Layout,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

pub fn save_layout<W: Write>(writer: W, layout: &Layout) -> Result<(), SnapshotError> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        layout,
    };
    bincode::serialize_into(writer, &snapshot)?;
    Ok(())
}

pub fn load_layout<R: Read>(reader: R) -> Result<Layout, SnapshotError> {
    let snapshot: Snapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: snapshot.version,
        });
    }
    Ok(snapshot.layout)
}
