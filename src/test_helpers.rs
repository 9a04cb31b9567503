//! Shared test utilities.
//!
//! Fixture setup and small extractors for discovery results.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_tree(tmp.path(), &["index.pug", "_partial.pug"]);
//! let found = discover(tmp.path(), &default_patterns()).unwrap();
//! assert_eq!(rel_paths(&found.templates), vec!["index.pug"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::config::Settings;
use crate::discover::Patterns;
use crate::types::SourceFile;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// The copy is a full project: `entrymap.toml` plus a `src/` tree.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Create each `/`-separated relative path under `root` as a small file.
pub fn write_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, format!("// {file}\n")).unwrap();
    }
}

// =========================================================================
// Extractors
// =========================================================================

/// Stock discovery patterns.
pub fn default_patterns() -> Patterns {
    Settings::default().patterns().unwrap()
}

/// Root-relative paths of a file list, in list order.
pub fn rel_paths(files: &[SourceFile]) -> Vec<String> {
    files.iter().map(|f| f.rel.to_string()).collect()
}
