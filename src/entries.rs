//! Entry-point mapping.
//!
//! Turns discovered sources into the bundler's input map: logical output key
//! → source file. Templates, styles and scripts keep their root-relative path
//! with the source extension swapped for the output one; images are placed
//! under `assets/images/` untouched.
//!
//! ```text
//! pages/about.pug     → pages/about.html
//! styles/home.scss    → styles/home.css
//! js/index.js         → js/index.js
//! logo.svg            → assets/images/logo.svg
//! ```
//!
//! The map is built in one fold over the discovered files. When two sources
//! produce the same key the later one wins, and the replacement is recorded
//! as a [`Collision`] so callers can report it.

use crate::discover::Discovered;
use crate::paths::RelPath;
use crate::types::{Category, SourceFile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Namespace every image entry key lives under.
pub const IMAGE_KEY_PREFIX: &str = "assets/images";

/// Source extension → output extension for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRule {
    pub source: String,
    pub output: String,
}

impl ExtensionRule {
    pub fn new(source: &str, output: &str) -> Self {
        Self {
            source: source.to_string(),
            output: output.to_string(),
        }
    }
}

/// Extension rewriting for the three keyed categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRules {
    pub template: ExtensionRule,
    pub style: ExtensionRule,
    pub script: ExtensionRule,
}

impl Default for KeyRules {
    fn default() -> Self {
        Self {
            template: ExtensionRule::new("pug", "html"),
            style: ExtensionRule::new("scss", "css"),
            script: ExtensionRule::new("js", "js"),
        }
    }
}

impl KeyRules {
    /// Derive the entry key for a root-relative source path.
    pub fn key_for(&self, category: Category, rel: &RelPath) -> RelPath {
        match category {
            Category::Template => entry_key(rel, &self.template),
            Category::Style => entry_key(rel, &self.style),
            Category::Script => entry_key(rel, &self.script),
            Category::Image => image_entry_key(rel),
        }
    }
}

/// Key for a template, style or script: extension swapped, path kept.
pub fn entry_key(rel: &RelPath, rule: &ExtensionRule) -> RelPath {
    rel.replace_extension(&rule.source, &rule.output)
}

/// Key for an image: root-relative path under `assets/images/`.
pub fn image_entry_key(rel: &RelPath) -> RelPath {
    RelPath::parse(IMAGE_KEY_PREFIX).join(rel)
}

/// Two sources mapped to the same key; `discarded` was overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub key: String,
    pub kept: PathBuf,
    pub discarded: PathBuf,
}

/// The bundler input map.
#[derive(Debug, Clone, Default)]
pub struct EntryMap {
    entries: BTreeMap<String, SourceFile>,
    collisions: Vec<Collision>,
}

impl EntryMap {
    /// Map every discovered file to its key.
    ///
    /// Categories are inserted in [`Category::ALL`] order, so on a collision
    /// across categories the later category wins.
    pub fn build(discovered: &Discovered, rules: &KeyRules) -> Self {
        Self::from_pairs(
            discovered
                .iter()
                .map(|file| (rules.key_for(file.category, &file.rel), file.clone())),
        )
    }

    /// Fold `(key, source)` pairs into a map, last writer wins.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (RelPath, SourceFile)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |mut map, (key, file)| {
                let key = key.to_string();
                if let Some(previous) = map.entries.insert(key.clone(), file) {
                    let kept = map.entries[&key].path.clone();
                    log::warn!(
                        "entry key {key} maps to both {} and {}; keeping {}",
                        previous.path.display(),
                        kept.display(),
                        kept.display()
                    );
                    map.collisions.push(Collision {
                        key,
                        kept,
                        discarded: previous.path,
                    });
                }
                map
            })
    }

    pub fn get(&self, key: &str) -> Option<&SourceFile> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceFile)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every key that was written more than once, in insertion order.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// The plain `key → path` map a bundler takes as its `input` option.
    pub fn input_map(&self) -> BTreeMap<&str, &Path> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.path.as_path()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::discover;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn source(category: Category, rel: &str) -> SourceFile {
        SourceFile {
            category,
            path: PathBuf::from("/site/src").join(rel),
            rel: RelPath::parse(rel),
        }
    }

    // =========================================================================
    // Key derivation
    // =========================================================================

    #[test]
    fn template_key_swaps_to_html() {
        let rules = KeyRules::default();
        let key = rules.key_for(Category::Template, &RelPath::parse("pages/about.pug"));
        assert_eq!(key.to_string(), "pages/about.html");
    }

    #[test]
    fn template_key_from_absolute_path() {
        let rel = RelPath::relative_to(Path::new("/p/src"), Path::new("/p/src/pages/about.pug"));
        let key = KeyRules::default().key_for(Category::Template, &rel);
        assert_eq!(key.to_string(), "pages/about.html");
    }

    #[test]
    fn style_key_swaps_to_css() {
        let key = KeyRules::default().key_for(Category::Style, &RelPath::parse("styles/home.scss"));
        assert_eq!(key.to_string(), "styles/home.css");
    }

    #[test]
    fn script_key_unchanged() {
        let key = KeyRules::default().key_for(Category::Script, &RelPath::parse("js/index.js"));
        assert_eq!(key.to_string(), "js/index.js");
    }

    #[test]
    fn only_trailing_extension_replaced() {
        let key = KeyRules::default().key_for(Category::Template, &RelPath::parse("pug/x.pug.pug"));
        assert_eq!(key.to_string(), "pug/x.pug.html");
    }

    #[test]
    fn image_key_prefixed_and_unchanged() {
        let key = KeyRules::default().key_for(Category::Image, &RelPath::parse("logo.svg"));
        assert_eq!(key.to_string(), "assets/images/logo.svg");

        let key = image_entry_key(&RelPath::parse("photos/2024/Beach.JPG"));
        assert_eq!(key.to_string(), "assets/images/photos/2024/Beach.JPG");
    }

    #[test]
    fn custom_extension_rules() {
        let rules = KeyRules {
            template: ExtensionRule::new("njk", "htm"),
            ..KeyRules::default()
        };
        let key = rules.key_for(Category::Template, &RelPath::parse("index.njk"));
        assert_eq!(key.to_string(), "index.htm");
    }

    #[test]
    fn keys_never_contain_backslashes() {
        let rel = RelPath::parse(r"pages\nested\about.pug");
        let key = KeyRules::default().key_for(Category::Template, &rel);
        assert_eq!(key.to_string(), "pages/nested/about.html");
    }

    // =========================================================================
    // Map building
    // =========================================================================

    #[test]
    fn map_contains_every_source() {
        let tmp = setup_fixtures();
        let root = tmp.path().join("src");
        let found = discover(&root, &default_patterns()).unwrap();
        let map = EntryMap::build(&found, &KeyRules::default());

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(
            keys,
            vec![
                "about/index.html",
                "assets/images/images/icons/arrow.png",
                "assets/images/logo.svg",
                "index.html",
                "js/index.js",
                "styles/home.css",
            ]
        );
        assert!(map.collisions().is_empty());
        assert_eq!(map.get("index.html").unwrap().path, root.join("index.pug"));
    }

    #[test]
    fn collision_last_write_wins_and_is_recorded() {
        let map = EntryMap::from_pairs([
            (RelPath::parse("a.html"), source(Category::Template, "a.pug")),
            (RelPath::parse("a.html"), source(Category::Template, "b.pug")),
        ]);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a.html").unwrap().rel.to_string(), "b.pug");
        assert_eq!(
            map.collisions(),
            [Collision {
                key: "a.html".to_string(),
                kept: PathBuf::from("/site/src/b.pug"),
                discarded: PathBuf::from("/site/src/a.pug"),
            }]
        );
    }

    #[test]
    fn collision_across_categories() {
        // A style rewritten to .html collides with the template of the same name.
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &["page.pug", "page.scss"]);
        let found = discover(tmp.path(), &default_patterns()).unwrap();
        let rules = KeyRules {
            style: ExtensionRule::new("scss", "html"),
            ..KeyRules::default()
        };
        let map = EntryMap::build(&found, &rules);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("page.html").unwrap().category, Category::Style);
        assert_eq!(map.collisions().len(), 1);
    }

    #[test]
    fn input_map_points_at_source_paths() {
        let map = EntryMap::from_pairs([(
            RelPath::parse("index.html"),
            source(Category::Template, "index.pug"),
        )]);
        let input = map.input_map();
        assert_eq!(input["index.html"], Path::new("/site/src/index.pug"));
    }

    #[test]
    fn empty_discovery_gives_empty_map() {
        let tmp = TempDir::new().unwrap();
        let found = discover(tmp.path(), &default_patterns()).unwrap();
        let map = EntryMap::build(&found, &KeyRules::default());
        assert!(map.is_empty());
    }
}
