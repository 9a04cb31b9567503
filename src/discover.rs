//! Source discovery.
//!
//! Walks the source root once and sorts every regular file into the four
//! categories by glob pattern. Each category has an include list and an
//! exclude list; a file belongs to the category when some include pattern
//! matches its root-relative path and no exclude pattern does.
//!
//! ## Default Layout
//!
//! ```text
//! src/                         # Source root
//! ├── index.pug                # template  → index.html
//! ├── _layout.pug              # partial, excluded
//! ├── about/
//! │   └── index.pug            # template  → about/index.html
//! ├── styles/
//! │   ├── home.scss            # style     → styles/home.css
//! │   └── _vars.scss           # partial, excluded
//! ├── js/
//! │   ├── index.js             # script    → js/index.js
//! │   └── _util.js             # partial, excluded
//! └── images/
//!     └── logo.svg             # image     → assets/images/images/logo.svg
//! ```
//!
//! ## Pattern Semantics
//!
//! Patterns are matched against the `/`-separated path relative to the root.
//! `*` stays within one path segment, `**/` spans any number of directories
//! (including none), and `{a,b}` alternation is expanded before compiling.
//! Hidden entries and `node_modules` are never descended into.

use crate::paths::RelPath;
use crate::types::{Category, SourceFile};
use glob::{MatchOptions, Pattern};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Source root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Source root is not a directory: {0}")]
    RootNotDirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid glob pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled include/exclude patterns for one category.
#[derive(Debug, Clone)]
pub struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PatternSet {
    pub fn compile(include: &[String], exclude: &[String]) -> Result<Self, DiscoverError> {
        Ok(Self {
            include: compile_all(include)?,
            exclude: compile_all(exclude)?,
        })
    }

    /// Whether a root-relative path belongs to this set.
    pub fn matches(&self, rel: &str) -> bool {
        self.include
            .iter()
            .any(|p| p.matches_with(rel, MATCH_OPTIONS))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(rel, MATCH_OPTIONS))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Pattern>, DiscoverError> {
    patterns
        .iter()
        .flat_map(|p| expand_braces(p))
        .map(|p| {
            Pattern::new(&p).map_err(|source| DiscoverError::Pattern { pattern: p, source })
        })
        .collect()
}

/// Expand `{a,b}` alternation into separate patterns.
///
/// Groups may nest; an unbalanced `{` is left in place.
/// `*.{jpg,png}` → `["*.jpg", "*.png"]`
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let i = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(i),
            _ => {}
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let head = &pattern[..open];
    let tail = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let alt = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{head}{alt}{tail}"))
        })
        .collect()
}

/// Patterns for all four categories.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub templates: PatternSet,
    pub styles: PatternSet,
    pub scripts: PatternSet,
    pub images: PatternSet,
}

impl Patterns {
    pub fn get(&self, category: Category) -> &PatternSet {
        match category {
            Category::Template => &self.templates,
            Category::Style => &self.styles,
            Category::Script => &self.scripts,
            Category::Image => &self.images,
        }
    }
}

/// Result of a discovery pass: one ordered list per category.
#[derive(Debug, Clone)]
pub struct Discovered {
    pub root: PathBuf,
    pub templates: Vec<SourceFile>,
    pub styles: Vec<SourceFile>,
    pub scripts: Vec<SourceFile>,
    pub images: Vec<SourceFile>,
}

impl Discovered {
    pub fn files(&self, category: Category) -> &[SourceFile] {
        match category {
            Category::Template => &self.templates,
            Category::Style => &self.styles,
            Category::Script => &self.scripts,
            Category::Image => &self.images,
        }
    }

    /// All files, category by category in [`Category::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        Category::ALL
            .into_iter()
            .flat_map(move |c| self.files(c).iter())
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|&c| self.files(c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Discover every source file under `root`.
///
/// Fails if the root is missing, not a directory, or cannot be walked.
pub fn discover(root: &Path, patterns: &Patterns) -> Result<Discovered, DiscoverError> {
    check_root(root)?;

    let mut found = Discovered {
        root: root.to_path_buf(),
        templates: Vec::new(),
        styles: Vec::new(),
        scripts: Vec::new(),
        images: Vec::new(),
    };

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = RelPath::relative_to(root, entry.path());
        let rel_str = rel.to_string();

        for category in Category::ALL {
            if !patterns.get(category).matches(&rel_str) {
                continue;
            }
            log::debug!("{category} file found: {rel_str}");
            let file = SourceFile {
                category,
                path: entry.path().to_path_buf(),
                rel: rel.clone(),
            };
            match category {
                Category::Template => found.templates.push(file),
                Category::Style => found.styles.push(file),
                Category::Script => found.scripts.push(file),
                Category::Image => found.images.push(file),
            }
        }
    }

    for list in [
        &mut found.templates,
        &mut found.styles,
        &mut found.scripts,
        &mut found.images,
    ] {
        list.sort_by_cached_key(|f| f.rel.to_string());
    }

    Ok(found)
}

fn check_root(root: &Path) -> Result<(), DiscoverError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoverError::RootNotDirectory(root.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(DiscoverError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(DiscoverError::Io(e)),
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && name == "node_modules")
}
