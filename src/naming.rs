//! Output file naming rules.
//!
//! A bundler asks for a file name once per emitted artifact. Three rules cover
//! every artifact kind:
//!
//! | Rule | Artifact | Output |
//! |------|----------|--------|
//! | [`EntryFileNames`] | entry chunk | `assets/js/<dir>/<stem>.js` or `assets/js/[name].js` |
//! | [`ChunkFileNames`] | shared chunk | `assets/js/<dir>/<stem>.js` |
//! | [`AssetFileNames`] | stylesheet | `assets/css/<dir>/index.css` |
//! | | image | `assets/images/<dir>/<basename>` |
//! | | anything else | `assets/[name][extname]` |
//!
//! `[name]` and `[extname]` are placeholders the bundler fills in itself.
//!
//! ## Path Derivation
//!
//! The facade module id (the module whose evaluation produces the chunk) is
//! made root-relative, split into directory and stem, and re-rooted under
//! `assets/js/`. A directory that already starts with `assets/js` is not
//! prefixed twice, so naming is idempotent:
//!
//! ```text
//! /site/src/pages/home/index.js   → assets/js/pages/home/index.js
//! assets/js/foo/bar.js            → assets/js/foo/bar.js
//! ```
//!
//! An empty directory adds no segment, so a root-level `index.js` becomes
//! `assets/js/index.js`. Every stylesheet emitted into one directory shares the
//! name `index.css`; the bundler keeps whichever it writes last, and
//! [`BuildConfig`](crate::build_config::BuildConfig) reports them as a name clash.
//!
//! All rules are pure and hold no mutable state; call them from any thread in
//! any order.

use crate::paths::RelPath;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const JS_DIR: &str = "assets/js";
pub const CSS_DIR: &str = "assets/css";
pub const IMAGES_DIR: &str = "assets/images";

/// Entry name when the chunk has no facade module.
pub const DEFAULT_ENTRY_FILE_NAME: &str = "assets/js/[name].js";
/// Name for assets that are neither stylesheets nor images.
pub const DEFAULT_ASSET_FILE_NAME: &str = "assets/[name][extname]";
pub const STYLESHEET_FILE_NAME: &str = "index.css";

/// Extensions (lowercase, no dot) routed to `assets/images/`.
pub const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpeg", "jpg", "png", "svg", "webp"];

/// A pure mapping from an artifact descriptor to an output-relative path.
pub trait NamingRule: Send + Sync {
    type Descriptor;

    fn file_name(&self, descriptor: &Self::Descriptor) -> String;
}

/// What the bundler knows about a chunk when naming it.
///
/// Field names follow the bundler's own chunk object (`facadeModuleId`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkInfo {
    /// Internal chunk name (what `[name]` expands to).
    #[serde(default)]
    pub name: String,
    /// Absolute or root-relative id of the facade module, if any.
    #[serde(default)]
    pub facade_module_id: Option<String>,
}

impl ChunkInfo {
    pub fn facade(id: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            facade_module_id: Some(id.into()),
        }
    }
}

/// What the bundler knows about a non-script asset when naming it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    /// Emitted name, possibly path-qualified (`styles/home.css`).
    pub name: String,
    /// Path of the source the asset came from, if known.
    #[serde(default)]
    pub original_file_name: Option<String>,
}

impl AssetInfo {
    pub fn new(name: impl Into<String>, original_file_name: Option<&str>) -> Self {
        Self {
            name: name.into(),
            original_file_name: original_file_name.map(str::to_string),
        }
    }
}

/// Resolve a bundler-supplied id against the source root.
fn module_rel(root: &Path, id: &str) -> RelPath {
    let path = Path::new(id);
    if path.is_absolute() {
        RelPath::relative_to(root, path)
    } else {
        RelPath::parse(id)
    }
}

/// `assets/js/<dir>/<stem>.js` for a module id.
///
/// A module at the root has an empty `<dir>` and gets `assets/js/<stem>.js`,
/// never `assets/js/./<stem>.js`.
fn script_file_name(root: &Path, id: &str) -> String {
    let rel = module_rel(root, id);
    let js_dir = RelPath::parse(JS_DIR);
    let dir = rel.parent().strip_prefix_or_self(&js_dir);
    let file = format!("{}.js", rel.stem().unwrap_or(""));
    js_dir.join(&dir).push(&file).to_string()
}

/// Names entry chunks.
#[derive(Debug, Clone)]
pub struct EntryFileNames {
    root: PathBuf,
}

impl EntryFileNames {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl NamingRule for EntryFileNames {
    type Descriptor = ChunkInfo;

    fn file_name(&self, chunk: &ChunkInfo) -> String {
        match chunk.facade_module_id.as_deref() {
            None => DEFAULT_ENTRY_FILE_NAME.to_string(),
            Some(id) => script_file_name(&self.root, id),
        }
    }
}

/// Names code-split chunks.
///
/// A chunk without a facade module falls back to the empty id, which yields
/// the degenerate `assets/js/.js`. Bundlers give such chunks a facade in
/// practice; the output is kept rather than failing.
#[derive(Debug, Clone)]
pub struct ChunkFileNames {
    root: PathBuf,
}

impl ChunkFileNames {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl NamingRule for ChunkFileNames {
    type Descriptor = ChunkInfo;

    fn file_name(&self, chunk: &ChunkInfo) -> String {
        script_file_name(&self.root, chunk.facade_module_id.as_deref().unwrap_or(""))
    }
}

/// Names stylesheets, images and any other emitted asset.
#[derive(Debug, Clone)]
pub struct AssetFileNames {
    root: PathBuf,
}

impl AssetFileNames {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn image_file_name(&self, emitted: &RelPath, asset: &AssetInfo) -> String {
        let source = match asset.original_file_name.as_deref() {
            Some(original) => module_rel(&self.root, original),
            None => emitted.clone(),
        };
        let images_dir = RelPath::parse(IMAGES_DIR);
        let dir = source.parent().strip_prefix_or_self(&images_dir);
        images_dir
            .join(&dir)
            .push(emitted.file_name().unwrap_or(""))
            .to_string()
    }

    fn stylesheet_file_name(&self, emitted: &RelPath) -> String {
        let css_dir = RelPath::parse(CSS_DIR);
        let dir = emitted.parent().strip_prefix_or_self(&css_dir);
        css_dir.join(&dir).push(STYLESHEET_FILE_NAME).to_string()
    }
}

impl NamingRule for AssetFileNames {
    type Descriptor = AssetInfo;

    fn file_name(&self, asset: &AssetInfo) -> String {
        let emitted = RelPath::parse(&asset.name);
        let ext = emitted
            .extension()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            self.image_file_name(&emitted, asset)
        } else if ext == "css" {
            self.stylesheet_file_name(&emitted)
        } else {
            DEFAULT_ASSET_FILE_NAME.to_string()
        }
    }
}

/// The three rules for one source root.
#[derive(Debug, Clone)]
pub struct FileNames {
    pub entry: EntryFileNames,
    pub chunk: ChunkFileNames,
    pub asset: AssetFileNames,
}

impl FileNames {
    pub fn new(root: &Path) -> Self {
        Self {
            entry: EntryFileNames::new(root),
            chunk: ChunkFileNames::new(root),
            asset: AssetFileNames::new(root),
        }
    }
}
