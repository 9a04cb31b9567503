//! Shared types passed between discovery, entry mapping and output.

use crate::paths::RelPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The kind of source a discovered file is.
///
/// The category decides which glob patterns find the file and how its entry
/// key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Template,
    Style,
    Script,
    Image,
}

impl Category {
    /// All categories in discovery and insertion order.
    pub const ALL: [Category; 4] = [
        Category::Template,
        Category::Style,
        Category::Script,
        Category::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Template => "template",
            Category::Style => "style",
            Category::Script => "script",
            Category::Image => "image",
        }
    }

    /// Section heading used in CLI output.
    pub fn heading(self) -> &'static str {
        match self {
            Category::Template => "Templates",
            Category::Style => "Styles",
            Category::Script => "Scripts",
            Category::Image => "Images",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub category: Category,
    /// Absolute path on disk, as handed to the bundler.
    pub path: PathBuf,
    /// Path relative to the source root.
    pub rel: RelPath,
}
