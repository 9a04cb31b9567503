//! Root-relative path algebra.
//!
//! Every key in the entry map and every name handed back to the bundler is a
//! path relative to the source root. [`RelPath`] stores such a path as a list
//! of segments and only ever renders it with `/`, so output keys look the same
//! on every platform. Module ids from the bundler may arrive with `\`
//! separators on Windows; [`RelPath::parse`] accepts both.
//!
//! ```text
//! root:  /site/src
//! path:  /site/src/pages/about.pug
//!   →    pages/about.pug
//!   →    pages/about.html          (replace_extension("pug", "html"))
//!   →    assets/images/pages/...   (prefixed)
//! ```

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` pops the previous normal component; at the root it is dropped, and
/// at the start of a relative path it is kept.
/// `/site/config/../src` → `/site/src`
pub fn normalize(path: &Path) -> PathBuf {
    lexical_components(path).iter().collect()
}

fn lexical_components(path: &Path) -> Vec<Component<'_>> {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => parts.push(component),
            },
            _ => parts.push(component),
        }
    }
    parts
}

/// A `/`-separated path relative to the source root.
///
/// Empty segments and `.` are dropped on construction; `..` is kept so that a
/// path outside the root stays distinguishable from one inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelPath {
    segments: Vec<String>,
}

impl RelPath {
    /// The empty path (the root itself).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a path string, accepting both `/` and `\` as separators.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s
                .split(['/', '\\'])
                .filter(|seg| !seg.is_empty() && *seg != ".")
                .map(str::to_string)
                .collect(),
        }
    }

    /// Express `path` relative to `root`.
    ///
    /// Purely lexical: nothing is read from disk. Both sides are
    /// [normalized](normalize) first, so `/p/config/../src` and `/p/src` name
    /// the same root. A relative `path` under an absolute `root` is taken to
    /// be root-relative already. A path outside the root gets one `..` per
    /// root component it does not share.
    pub fn relative_to(root: &Path, path: &Path) -> Self {
        if path.is_relative() && root.is_absolute() {
            return Self::from_components(lexical_components(path).into_iter());
        }

        let root_parts = lexical_components(root);
        let path_parts = lexical_components(path);

        let shared = root_parts
            .iter()
            .zip(&path_parts)
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<String> = root_parts[shared..]
            .iter()
            .map(|_| "..".to_string())
            .collect();
        segments.extend(Self::from_components(path_parts[shared..].iter().copied()).segments);
        Self { segments }
    }

    fn from_components<'a>(components: impl Iterator<Item = Component<'a>>) -> Self {
        let segments = components
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                Component::ParentDir => Some("..".to_string()),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
            })
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Final segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// File name without its extension.
    ///
    /// A leading dot does not start an extension: `.env` has stem `.env`.
    pub fn stem(&self) -> Option<&str> {
        self.file_name().map(|name| match split_extension(name) {
            Some((stem, _)) => stem,
            None => name,
        })
    }

    /// Extension of the final segment, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .and_then(split_extension)
            .map(|(_, ext)| ext)
    }

    /// Everything but the final segment. The parent of a single segment is
    /// the empty path.
    pub fn parent(&self) -> Self {
        let keep = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments[..keep].to_vec(),
        }
    }

    pub fn join(&self, other: &RelPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Append one segment verbatim. An empty segment is ignored.
    pub fn push(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        if !segment.is_empty() {
            segments.push(segment.to_string());
        }
        Self { segments }
    }

    /// Replace a trailing `.from` extension with `.to`.
    ///
    /// Returns the path unchanged when the extension is not exactly `from`.
    pub fn replace_extension(&self, from: &str, to: &str) -> Self {
        match (self.stem(), self.extension()) {
            (Some(stem), Some(ext)) if ext == from => {
                let renamed = format!("{stem}.{to}");
                self.parent().push(&renamed)
            }
            _ => self.clone(),
        }
    }

    /// Drop `prefix` if it matches the leading segments.
    pub fn strip_prefix(&self, prefix: &RelPath) -> Option<Self> {
        self.segments
            .starts_with(&prefix.segments)
            .then(|| Self {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
    }

    /// Like [`strip_prefix`](Self::strip_prefix), but keeps the path as-is
    /// when the prefix does not match.
    pub fn strip_prefix_or_self(&self, prefix: &RelPath) -> Self {
        self.strip_prefix(prefix).unwrap_or_else(|| self.clone())
    }
}

fn split_extension(name: &str) -> Option<(&str, &str)> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(pos) => Some((&name[..pos], &name[pos + 1..])),
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl Serialize for RelPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
