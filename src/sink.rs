// src/sink.rs
use crate::error::{DeployError, DeployResult};
use alloy::primitives::Address;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

/// Append-only record of successful deployments, one
/// `<signer> => <address>` line each. The file is never truncated; reruns
/// keep extending it.
#[derive(Debug)]
pub struct DeploymentLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl DeploymentLog {
    pub fn open(path: &Path) -> DeployResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| DeployError::Sink(format!("{}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Append one successful deployment and flush it to disk.
    pub fn append(&self, signer: Address, deployed: Address) -> DeployResult<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| DeployError::Sink("result log lock poisoned".to_string()))?;
        writeln!(file, "{signer} => {deployed}")?;
        file.flush()?;
        Ok(())
    }

    /// Read every recorded pair back, in append order.
    pub fn read_back(&self) -> DeployResult<Vec<(Address, Address)>> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| DeployError::Sink(format!("{}: {e}", self.path.display())))?;
        let mut pairs = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (signer, deployed) = line.split_once(" => ").ok_or_else(|| {
                DeployError::Sink(format!("malformed result line: `{line}`"))
            })?;
            let signer = Address::from_str(signer.trim())
                .map_err(|e| DeployError::Sink(format!("bad signer address: {e}")))?;
            let deployed = Address::from_str(deployed.trim())
                .map_err(|e| DeployError::Sink(format!("bad contract address: {e}")))?;
            pairs.push((signer, deployed));
        }
        Ok(pairs)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_pairs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = DeploymentLog::open(&dir.path().join("deployed.txt")).unwrap();

        let pairs = [
            (Address::repeat_byte(0xAA), Address::repeat_byte(1)),
            (Address::repeat_byte(0xAA), Address::repeat_byte(2)),
            (Address::repeat_byte(0xBB), Address::repeat_byte(3)),
        ];
        for (signer, deployed) in pairs {
            log.append(signer, deployed).unwrap();
        }

        assert_eq!(log.read_back().unwrap(), pairs.to_vec());
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployed.txt");

        let log = DeploymentLog::open(&path).unwrap();
        log.append(Address::repeat_byte(0xAA), Address::repeat_byte(1))
            .unwrap();
        drop(log);

        let log = DeploymentLog::open(&path).unwrap();
        log.append(Address::repeat_byte(0xBB), Address::repeat_byte(2))
            .unwrap();

        let pairs = log.read_back().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, Address::repeat_byte(0xAA));
        assert_eq!(pairs[1].0, Address::repeat_byte(0xBB));
    }

    #[test]
    fn empty_log_reads_back_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = DeploymentLog::open(&dir.path().join("deployed.txt")).unwrap();
        assert!(log.read_back().unwrap().is_empty());
    }
}
