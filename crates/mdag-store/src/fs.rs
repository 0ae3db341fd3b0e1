//! Loose-file block store.
//!
//! Blocks are written one file per block under a two-character fan-out
//! directory, the same layout git uses for loose objects:
//!
//! ```text
//! <root>/ab/cdef0123...   (62 remaining hex characters)
//! ```
//!
//! Writes go to a temporary file in the fan-out directory and are renamed
//! into place, so a reader never observes a partially written block.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mdag_types::NodeId;
use tracing::{debug, warn};

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_block, BlockStore};

/// Block store backed by a directory of loose files.
#[derive(Debug)]
pub struct FsBlockStore {
    root: PathBuf,
    verify_reads: bool,
    read_only: bool,
}

impl FsBlockStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            verify_reads: false,
            read_only: false,
        })
    }

    /// Recompute each block's hash when it is read back.
    pub fn with_verify_reads(mut self, verify: bool) -> Self {
        self.verify_reads = verify;
        self
    }

    /// Reject every write and delete.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, id: &NodeId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }
}

impl BlockStore for FsBlockStore {
    fn get(&self, id: &NodeId) -> StoreResult<Option<Block>> {
        let data = match fs::read(self.block_path(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let block = Block::from_parts(*id, data);
        if self.verify_reads {
            let computed = block.compute_id();
            if computed != *id {
                warn!(block = %id.short_hex(), "block content does not match its id");
                return Err(StoreError::HashMismatch { id: *id, computed });
            }
        }
        Ok(Some(block))
    }

    fn put(&self, block: &Block) -> StoreResult<NodeId> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        validate_block(block)?;

        let path = self.block_path(&block.id);
        if path.exists() {
            return Ok(block.id);
        }
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&block.data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(block = %block.id.short_hex(), size = block.data.len(), "wrote loose block");
        Ok(block.id)
    }

    fn delete(&self, id: &NodeId) -> StoreResult<bool> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        match fs::remove_file(self.block_path(id)) {
            Ok(()) => {
                debug!(block = %id.short_hex(), "removed loose block");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, id: &NodeId) -> StoreResult<bool> {
        Ok(self.block_path(id).is_file())
    }

    fn stat(&self, id: &NodeId) -> StoreResult<Option<u64>> {
        match fs::metadata(self.block_path(id)) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
