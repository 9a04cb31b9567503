//! The configuration handed to the bundler.
//!
//! [`BuildConfig`] is assembled once per invocation: settings are loaded,
//! the source root is scanned, sources are folded into an [`EntryMap`], and
//! the three naming rules are bound to the resolved root. Nothing is mutated
//! afterwards; the bundler only reads from it.
//!
//! Besides entry key collisions, the naming rules can send two distinct
//! entries to one output path (every stylesheet of a directory becomes
//! `index.css`). Those are found up front by naming every entry once and
//! recorded as [`NameClash`]es.
//!
//! [`BuildConfig::plan`] renders the serializable part as a [`Plan`], the
//! JSON document a bundler config file can load instead of repeating the
//! discovery itself. Naming rules cannot cross that boundary as functions,
//! so the plan carries their fixed templates plus precomputed names for every
//! script and image entry.

use crate::config::{self, BundleOptions, ConfigError, ServerOptions, Settings};
use crate::discover::{self, DiscoverError, Discovered};
use crate::entries::{Collision, EntryMap};
use crate::naming::{
    AssetInfo, ChunkInfo, DEFAULT_ASSET_FILE_NAME, DEFAULT_ENTRY_FILE_NAME, FileNames,
    NamingRule,
};
use crate::paths;
use crate::types::{Category, SourceFile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Discovery error: {0}")]
    Discover(#[from] DiscoverError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the bundler needs for one build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    root: PathBuf,
    out_dir: PathBuf,
    base: String,
    discovered: Discovered,
    entries: EntryMap,
    file_names: FileNames,
    bundle: BundleOptions,
    server: ServerOptions,
    name_clashes: Vec<NameClash>,
}

/// Entries whose emitted files land on the same output path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameClash {
    pub file_name: String,
    /// Source of every entry named `file_name`, in entry key order.
    pub sources: Vec<PathBuf>,
}

impl BuildConfig {
    /// Load `entrymap.toml` from `project_dir` and build from it.
    pub fn load(project_dir: &Path) -> Result<Self, BuildError> {
        let settings = config::load_config(project_dir)?;
        Self::from_settings(project_dir, &settings)
    }

    /// Build from already-loaded settings.
    ///
    /// `root` and `out_dir` are resolved against `project_dir`, made
    /// absolute and lexically normalized, so module ids reported by the
    /// bundler compare against the same root the entries were keyed from.
    /// A config living beside the sources (`root = "../src"`) works the same
    /// as one above them.
    pub fn from_settings(project_dir: &Path, settings: &Settings) -> Result<Self, BuildError> {
        let root = paths::normalize(&std::path::absolute(project_dir.join(&settings.root))?);
        let out_dir =
            paths::normalize(&std::path::absolute(project_dir.join(&settings.out_dir))?);

        let discovered = discover::discover(&root, &settings.patterns()?)?;
        let entries = EntryMap::build(&discovered, &settings.key_rules());

        let mut build = Self {
            file_names: FileNames::new(&root),
            root,
            out_dir,
            base: settings.base.clone(),
            discovered,
            entries,
            bundle: settings.build.clone(),
            server: settings.server.clone(),
            name_clashes: Vec::new(),
        };
        build.name_clashes = build.find_name_clashes();
        Ok(build)
    }

    /// Output path the bundler will write for one entry.
    ///
    /// Templates are emitted at their key; the other categories go through
    /// their naming rule with the descriptor the bundler would pass.
    pub fn emitted_file_name(&self, key: &str, file: &SourceFile) -> String {
        match file.category {
            Category::Template => key.to_string(),
            Category::Style => {
                let original = file.rel.to_string();
                self.asset_file_name(&AssetInfo::new(key, Some(&original)))
            }
            Category::Script => {
                self.entry_file_name(&ChunkInfo::facade(file.path.to_string_lossy()))
            }
            Category::Image => {
                let original = file.rel.to_string();
                let name = file.rel.file_name().unwrap_or("");
                self.asset_file_name(&AssetInfo::new(name, Some(&original)))
            }
        }
    }

    fn find_name_clashes(&self) -> Vec<NameClash> {
        let mut by_name: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for (key, file) in self.entries.iter() {
            by_name
                .entry(self.emitted_file_name(key, file))
                .or_default()
                .push(file.path.clone());
        }

        by_name
            .into_iter()
            .filter(|(_, sources)| sources.len() > 1)
            .map(|(file_name, sources)| {
                log::warn!(
                    "{} entries are emitted as {file_name}; only one file survives",
                    sources.len()
                );
                NameClash { file_name, sources }
            })
            .collect()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn discovered(&self) -> &Discovered {
        &self.discovered
    }

    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }

    pub fn collisions(&self) -> &[Collision] {
        self.entries.collisions()
    }

    pub fn name_clashes(&self) -> &[NameClash] {
        &self.name_clashes
    }

    /// Whether any two sources end up at one entry key or one output path.
    pub fn is_ambiguous(&self) -> bool {
        !self.collisions().is_empty() || !self.name_clashes.is_empty()
    }

    pub fn file_names(&self) -> &FileNames {
        &self.file_names
    }

    pub fn entry_file_name(&self, chunk: &ChunkInfo) -> String {
        self.file_names.entry.file_name(chunk)
    }

    pub fn chunk_file_name(&self, chunk: &ChunkInfo) -> String {
        self.file_names.chunk.file_name(chunk)
    }

    pub fn asset_file_name(&self, asset: &AssetInfo) -> String {
        self.file_names.asset.file_name(asset)
    }

    /// Serializable view of this config.
    pub fn plan(&self) -> Plan<'_> {
        let emitted_names = |category: Category| -> BTreeMap<String, String> {
            self.entries
                .iter()
                .filter(|(_, f)| f.category == category)
                .map(|(key, f)| (f.rel.to_string(), self.emitted_file_name(key, f)))
                .collect()
        };

        Plan {
            root: &self.root,
            out_dir: &self.out_dir,
            base: &self.base,
            input: self.entries.input_map(),
            output: OutputPlan {
                entry_file_names: DEFAULT_ENTRY_FILE_NAME,
                asset_file_names: DEFAULT_ASSET_FILE_NAME,
                scripts: emitted_names(Category::Script),
                images: emitted_names(Category::Image),
            },
            build: &self.bundle,
            server: &self.server,
            collisions: self.entries.collisions(),
            name_clashes: &self.name_clashes,
        }
    }
}

/// JSON form of a [`BuildConfig`].
#[derive(Debug, Serialize)]
pub struct Plan<'a> {
    pub root: &'a Path,
    pub out_dir: &'a Path,
    pub base: &'a str,
    /// Entry key → absolute source path.
    pub input: BTreeMap<&'a str, &'a Path>,
    pub output: OutputPlan,
    pub build: &'a BundleOptions,
    pub server: &'a ServerOptions,
    #[serde(skip_serializing_if = "no_collisions")]
    pub collisions: &'a [Collision],
    #[serde(skip_serializing_if = "no_name_clashes")]
    pub name_clashes: &'a [NameClash],
}

fn no_collisions(collisions: &&[Collision]) -> bool {
    collisions.is_empty()
}

fn no_name_clashes(clashes: &&[NameClash]) -> bool {
    clashes.is_empty()
}

/// Naming rule output the bundler can use without calling back.
#[derive(Debug, Serialize)]
pub struct OutputPlan {
    /// Fallback for entries without a facade module.
    pub entry_file_names: &'static str,
    /// Fallback for assets that are neither stylesheets nor images.
    pub asset_file_names: &'static str,
    /// Root-relative script source → emitted file name.
    pub scripts: BTreeMap<String, String>,
    /// Root-relative image source → emitted file name.
    pub images: BTreeMap<String, String>,
}
