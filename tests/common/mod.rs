#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// A January 2024 HM Treasury style extract with drifting header spellings.
pub const HMT_SAMPLE: &str = "\
Department Family,Entity,Payment Date,Expense Type,Expense Area,Supplier,Transaction Number,Amount,Description
HM Treasury,HMT,31/01/2024,Consultancy,Policy,Acme Ltd,TX-1,\"£12,500.00\",Advice
HM Treasury,HMT,15/01/2024,IT,Digital,Beta plc,TX-2,(250.00),Credit note
HM Treasury,HMT,,,,,,,
HM Treasury,HMT,,,,,,,Accrual reversal
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}
