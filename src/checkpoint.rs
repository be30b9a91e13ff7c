//! Checkpoint serialization for game sessions.
//!
//! A [`Checkpoint`] is the opaque blob that crosses the persistence boundary:
//! board contents, merge total, best score, the finished flag, and the
//! configuration needed to reconstruct behavior after reload. On disk it is a
//! small framed format: magic, version, postcard payload, CRC32C trailer.
//! Anything that fails the frame or the codec surfaces as a distinguished
//! [`CheckpointError`], never as a panic.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::GameConfig;

const MAGIC: &[u8; 4] = b"G48S"; // ASCII magic
const VERSION: u8 = 1;
const HEADER_LEN: usize = 5; // magic + version

/// Serialized snapshot of one engine session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub config: GameConfig,
    pub board: Board,
    pub score: u64,
    pub best: u64,
    pub finished: bool,
}

impl Checkpoint {
    /// Structural consistency of a decoded checkpoint: the configuration
    /// must describe the stored board and the board must pass its own
    /// integrity check. Tile values are not audited.
    pub fn validate(&self) -> Result<(), String> {
        if self.config.width != self.board.width() || self.config.height != self.board.height() {
            return Err(format!(
                "configured {}x{} board does not match stored {}x{} grid",
                self.config.width,
                self.config.height,
                self.board.width(),
                self.board.height()
            ));
        }
        self.board.check_integrity()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CheckpointError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("postcard codec error: {0}")]
    Postcard(#[from] postcard::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("checksum mismatch")]
    Checksum,
    #[error("file too short or malformed")]
    Malformed,
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < 4 {
        return None;
    }
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Encode a checkpoint into the framed byte format.
pub fn to_bytes(checkpoint: &Checkpoint) -> Result<Vec<u8>, CheckpointError> {
    let payload = postcard::to_allocvec(checkpoint)?;
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + 4);
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.extend_from_slice(&payload);
    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

/// Decode a checkpoint from framed bytes.
///
/// The checksum is validated before any field is read.
pub fn from_bytes(bytes: &[u8]) -> Result<Checkpoint, CheckpointError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(CheckpointError::Malformed);
    }
    let (content, trailer) = bytes.split_at(bytes.len() - 4);
    let file_crc = read_u32_le(trailer).ok_or(CheckpointError::Malformed)?;
    if crc32c::crc32c(content) != file_crc {
        return Err(CheckpointError::Checksum);
    }
    if &content[..4] != MAGIC || content[4] != VERSION {
        return Err(CheckpointError::MagicOrVersion);
    }
    Ok(postcard::from_bytes(&content[HEADER_LEN..])?)
}

pub fn write_to_path<P: AsRef<Path>>(
    path: P,
    checkpoint: &Checkpoint,
) -> Result<(), CheckpointError> {
    let data = to_bytes(checkpoint)?;
    let mut file = fs::File::create(path)?;
    file.write_all(&data)?;
    Ok(())
}

pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Checkpoint, CheckpointError> {
    let bytes = fs::read(path)?;
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, Tile};

    fn sample() -> Checkpoint {
        let config = GameConfig::default();
        let mut board = Board::new(config.width, config.height);
        board.insert(Tile::new(0, Position::new(0, 0), 2));
        board.insert(Tile::new(1, Position::new(3, 1), 4));
        Checkpoint {
            config,
            board,
            score: 12,
            best: 256,
            finished: false,
        }
    }

    #[test]
    fn it_round_trips_through_bytes() {
        let checkpoint = sample();
        let bytes = to_bytes(&checkpoint).unwrap();
        let decoded = from_bytes(&bytes).unwrap();
        assert_eq!(decoded, checkpoint);
        assert!(decoded.validate().is_ok());
    }

    #[test]
    fn it_detects_payload_corruption() {
        let mut bytes = to_bytes(&sample()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;
        assert!(matches!(
            from_bytes(&bytes),
            Err(CheckpointError::Checksum)
        ));
    }

    #[test]
    fn it_rejects_truncated_input() {
        let bytes = to_bytes(&sample()).unwrap();
        assert!(matches!(
            from_bytes(&bytes[..4]),
            Err(CheckpointError::Malformed)
        ));
        assert!(from_bytes(&[]).is_err());
    }

    #[test]
    fn it_rejects_wrong_magic_even_with_a_valid_checksum() {
        let bytes = to_bytes(&sample()).unwrap();
        let mut content = bytes[..bytes.len() - 4].to_vec();
        content[0] = b'X';
        let checksum = crc32c::crc32c(&content);
        content.extend_from_slice(&checksum.to_le_bytes());
        assert!(matches!(
            from_bytes(&content),
            Err(CheckpointError::MagicOrVersion)
        ));
    }

    #[test]
    fn it_flags_dimension_mismatch_as_invalid() {
        let mut checkpoint = sample();
        checkpoint.config.width = 5;
        assert!(checkpoint.validate().is_err());
    }

    #[test]
    fn it_round_trips_through_a_file() {
        let dir = std::env::temp_dir().join(format!("grid2048-ckpt-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.save");

        let checkpoint = sample();
        write_to_path(&path, &checkpoint).unwrap();
        assert_eq!(read_from_path(&path).unwrap(), checkpoint);

        let _ = fs::remove_dir_all(&dir);
    }
}
