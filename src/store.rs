use crate::block::Block;
use crate::error::{LedgerError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const LEDGER_FILE: &str = "chain.jsonl";

/// Append-only JSON-lines file holding one block per line.
///
/// Loading never re-seals anything: a hand-edited line comes back exactly as
/// written and is left for [`Chain::verify`](crate::chain::Chain::verify) to catch.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Open or create a store in the given directory.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(LEDGER_FILE),
        })
    }

    /// Open a store whose ledger file must already exist; nothing is created.
    pub fn open_existing(dir: &Path) -> Result<Self> {
        let path = dir.join(LEDGER_FILE);
        if !path.is_file() {
            return Err(LedgerError::LedgerMissing(dir.display().to_string()));
        }
        Ok(Self { path })
    }

    /// Whether a ledger file has been written.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one block as a new line.
    pub fn append(&self, block: &Block) -> Result<()> {
        let mut line = serde_json::to_string(block)?;
        line.push('\n');
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(line.as_bytes())?;
        f.sync_all()?;
        Ok(())
    }

    /// Replace the file with the given snapshot.
    pub fn save_all(&self, blocks: &[Block]) -> Result<()> {
        let mut out = String::new();
        for block in blocks {
            out.push_str(&serde_json::to_string(block)?);
            out.push('\n');
        }
        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, out)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read every block in file order.
    pub fn load(&self) -> Result<Vec<Block>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut blocks = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let block: Block = serde_json::from_str(line).map_err(|e| {
                LedgerError::Corruption(format!("ledger line {}: {}", n + 1, e))
            })?;
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Size of the ledger file in bytes.
    pub fn disk_usage(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}
