//! Project configuration.
//!
//! Handles loading, validating, and merging `entrymap.toml`. The file is
//! optional: stock defaults describe the usual Pug + SCSS + vanilla JS layout,
//! and a user file overrides just the keys it names.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── entrymap.toml      # Optional, overrides stock defaults
//! ├── src/               # Source root (`root`)
//! └── dist/              # Bundler output (`out_dir`)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! root = "src"                 # Source root, relative to the project dir
//! out_dir = "dist"             # Bundler output directory
//! base = "./"                  # Public base path for emitted URLs
//!
//! [templates]
//! include = ["**/*.pug"]
//! exclude = ["**/_*.pug"]
//! source_ext = "pug"
//! output_ext = "html"
//!
//! [styles]
//! include = ["**/*.scss"]
//! exclude = ["**/_*.scss"]
//! source_ext = "scss"
//! output_ext = "css"
//!
//! [scripts]
//! include = ["**/index.js"]
//! exclude = ["**/_*.js"]
//! source_ext = "js"
//! output_ext = "js"
//!
//! [images]
//! include = ["**/*.{gif,jpeg,jpg,png,svg,webp}"]
//! exclude = ["**/_*.*"]
//!
//! [build]
//! empty_out_dir = true
//! minify = "terser"            # terser | esbuild | none
//! keep_comments = true
//! drop_console = true
//! module_preload_polyfill = false
//!
//! [server]
//! open = true
//! host = true
//! port = 3000
//! ```
//!
//! Patterns are relative to `root`. Unknown keys are rejected to catch typos
//! early.

use crate::discover::{DiscoverError, PatternSet, Patterns};
use crate::entries::{ExtensionRule, KeyRules};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the project directory.
pub const CONFIG_FILE: &str = "entrymap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project settings loaded from `entrymap.toml`.
///
/// Missing sections fall back to the stock defaults. Sections that are
/// present must be complete when parsed directly; [`load_config`] merges
/// user files over the defaults first, so user files may be sparse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Source root, relative to the project directory.
    pub root: String,
    /// Output directory, relative to the project directory.
    pub out_dir: String,
    /// Public base path the bundler prefixes to emitted URLs.
    pub base: String,
    pub templates: CategoryConfig,
    pub styles: CategoryConfig,
    pub scripts: CategoryConfig,
    pub images: PatternConfig,
    /// Options passed through to the bundler's build step.
    pub build: BundleOptions,
    /// Options passed through to the bundler's dev server.
    pub server: ServerOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: "src".to_string(),
            out_dir: "dist".to_string(),
            base: "./".to_string(),
            templates: CategoryConfig::new("**/*.pug", "**/_*.pug", "pug", "html"),
            styles: CategoryConfig::new("**/*.scss", "**/_*.scss", "scss", "css"),
            scripts: CategoryConfig::new("**/index.js", "**/_*.js", "js", "js"),
            images: PatternConfig {
                include: vec!["**/*.{gif,jpeg,jpg,png,svg,webp}".to_string()],
                exclude: vec!["**/_*.*".to_string()],
            },
            build: BundleOptions::default(),
            server: ServerOptions::default(),
        }
    }
}

impl Settings {
    /// Validate values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.trim().is_empty() {
            return Err(ConfigError::Validation("root must not be empty".into()));
        }
        if self.out_dir.trim().is_empty() {
            return Err(ConfigError::Validation("out_dir must not be empty".into()));
        }
        for (section, patterns) in [
            ("templates", &self.templates.include),
            ("styles", &self.styles.include),
            ("scripts", &self.scripts.include),
            ("images", &self.images.include),
        ] {
            if patterns.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{section}.include must not be empty"
                )));
            }
        }
        for (section, category) in [
            ("templates", &self.templates),
            ("styles", &self.styles),
            ("scripts", &self.scripts),
        ] {
            validate_extension(section, "source_ext", &category.source_ext)?;
            validate_extension(section, "output_ext", &category.output_ext)?;
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".into()));
        }
        Ok(())
    }

    /// Compile the discovery patterns of all four categories.
    pub fn patterns(&self) -> Result<Patterns, DiscoverError> {
        Ok(Patterns {
            templates: self.templates.pattern_set()?,
            styles: self.styles.pattern_set()?,
            scripts: self.scripts.pattern_set()?,
            images: PatternSet::compile(&self.images.include, &self.images.exclude)?,
        })
    }

    /// Extension rewriting rules for entry keys.
    pub fn key_rules(&self) -> KeyRules {
        KeyRules {
            template: self.templates.extension_rule(),
            style: self.styles.extension_rule(),
            script: self.scripts.extension_rule(),
        }
    }
}

fn validate_extension(section: &str, key: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{section}.{key} must not be empty"
        )));
    }
    if ext.starts_with('.') || ext.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{section}.{key} must be a bare extension like \"html\", got {ext:?}"
        )));
    }
    Ok(())
}

/// Discovery patterns plus extension rewriting for a keyed category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Extension of source files, without the dot.
    pub source_ext: String,
    /// Extension of the entry key, without the dot.
    pub output_ext: String,
}

impl CategoryConfig {
    fn new(include: &str, exclude: &str, source_ext: &str, output_ext: &str) -> Self {
        Self {
            include: vec![include.to_string()],
            exclude: vec![exclude.to_string()],
            source_ext: source_ext.to_string(),
            output_ext: output_ext.to_string(),
        }
    }

    fn pattern_set(&self) -> Result<PatternSet, DiscoverError> {
        PatternSet::compile(&self.include, &self.exclude)
    }

    fn extension_rule(&self) -> ExtensionRule {
        ExtensionRule::new(&self.source_ext, &self.output_ext)
    }
}

/// Discovery patterns only (images keep their names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Minifier the bundler should run on scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Minifier {
    Terser,
    Esbuild,
    None,
}

/// Build options forwarded verbatim to the bundler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleOptions {
    /// Clear `out_dir` before writing.
    pub empty_out_dir: bool,
    pub minify: Minifier,
    /// Preserve comments in minified output.
    pub keep_comments: bool,
    /// Strip `console.*` calls when minifying.
    pub drop_console: bool,
    /// Inject the module-preload polyfill.
    pub module_preload_polyfill: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            empty_out_dir: true,
            minify: Minifier::Terser,
            keep_comments: true,
            drop_console: true,
            module_preload_polyfill: false,
        }
    }
}

/// Dev server options forwarded verbatim to the bundler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerOptions {
    /// Open a browser on start.
    pub open: bool,
    /// Listen on all interfaces rather than localhost only.
    pub host: bool,
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            open: true,
            host: true,
            port: 3000,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value (arrays included)
/// replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `entrymap.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings for the project in `dir`.
///
/// Merges `entrymap.toml` (if present) over stock defaults, rejects unknown
/// keys, and validates the result.
pub fn load_config(dir: &Path) -> Result<Settings, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `entrymap.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# entrymap configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Source root, relative to this file's directory.
root = "src"

# Directory the bundler writes to.
out_dir = "dist"

# Public base path for emitted URLs.
base = "./"

# ---------------------------------------------------------------------------
# Discovery
# ---------------------------------------------------------------------------
# Patterns are relative to `root`. `*` stays within a directory, `**/`
# spans any number of directories, `{a,b}` is alternation. Files whose
# name starts with `_` are partials and excluded by default.

# Templates become `<path>.html` entries.
[templates]
include = ["**/*.pug"]
exclude = ["**/_*.pug"]
source_ext = "pug"
output_ext = "html"

# Stylesheets become `<path>.css` entries.
[styles]
include = ["**/*.scss"]
exclude = ["**/_*.scss"]
source_ext = "scss"
output_ext = "css"

# Scripts keep their path; only `index.js` files are entries.
[scripts]
include = ["**/index.js"]
exclude = ["**/_*.js"]
source_ext = "js"
output_ext = "js"

# Images become `assets/images/<path>` entries, names unchanged.
[images]
include = ["**/*.{gif,jpeg,jpg,png,svg,webp}"]
exclude = ["**/_*.*"]

# ---------------------------------------------------------------------------
# Bundler build options
# ---------------------------------------------------------------------------
[build]
# Clear out_dir before writing.
empty_out_dir = true

# Script minifier: "terser", "esbuild", or "none".
minify = "terser"

# Keep comments in minified output.
keep_comments = true

# Strip console.* calls when minifying.
drop_console = true

# Inject the module-preload polyfill.
module_preload_polyfill = false

# ---------------------------------------------------------------------------
# Dev server
# ---------------------------------------------------------------------------
[server]
# Open a browser when the server starts.
open = true

# Listen on all interfaces.
host = true

port = 3000
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_settings_describe_pug_scss_layout() {
        let s = Settings::default();
        assert_eq!(s.root, "src");
        assert_eq!(s.out_dir, "dist");
        assert_eq!(s.templates.include, vec!["**/*.pug"]);
        assert_eq!(s.styles.output_ext, "css");
        assert_eq!(s.scripts.include, vec!["**/index.js"]);
        assert_eq!(s.server.port, 3000);
        assert_eq!(s.build.minify, Minifier::Terser);
    }

    #[test]
    fn default_key_rules_match_entries_default() {
        assert_eq!(Settings::default().key_rules(), KeyRules::default());
    }

    #[test]
    fn default_patterns_compile() {
        let patterns = Settings::default().patterns().unwrap();
        assert!(patterns.images.matches("a/b.png"));
        assert!(!patterns.images.matches("a/_b.png"));
    }

    #[test]
    fn invalid_pattern_reported_when_compiling() {
        let mut s = Settings::default();
        s.styles.include = vec!["[".to_string()];
        assert!(matches!(s.patterns(), Err(DiscoverError::Pattern { .. })));
    }

    #[test]
    fn parse_top_level_only() {
        let s: Settings = toml::from_str(r#"root = "site""#).unwrap();
        assert_eq!(s.root, "site");
        assert_eq!(s.templates, Settings::default().templates);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let s = load_config(tmp.path()).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn load_config_merges_sparse_sections() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[styles]
include = ["**/*.sass"]
source_ext = "sass"

[server]
port = 8080
"#,
        )
        .unwrap();

        let s = load_config(tmp.path()).unwrap();
        assert_eq!(s.styles.include, vec!["**/*.sass"]);
        assert_eq!(s.styles.source_ext, "sass");
        // Untouched keys in the same section come from defaults
        assert_eq!(s.styles.exclude, vec!["**/_*.scss"]);
        assert_eq!(s.styles.output_ext, "css");
        assert_eq!(s.server.port, 8080);
        assert!(s.server.open);
    }

    #[test]
    fn arrays_replace_rather_than_append() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[templates]
exclude = []
"#,
        )
        .unwrap();
        let s = load_config(tmp.path()).unwrap();
        assert!(s.templates.exclude.is_empty());
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[templates]
includes = ["**/*.pug"]
"#,
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<Settings, _> = toml::from_str("[fonts]\ninclude = []\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_minifier_rejected() {
        let result: Result<Settings, _> = toml::from_str("[build]\nminify = \"uglify\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_passes() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_empty_root() {
        let mut s = Settings::default();
        s.root = " ".to_string();
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn validate_empty_include() {
        let mut s = Settings::default();
        s.images.include.clear();
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("images.include"));
    }

    #[test]
    fn validate_extension_with_dot() {
        let mut s = Settings::default();
        s.templates.output_ext = ".html".to_string();
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("templates.output_ext"));
    }

    #[test]
    fn validate_zero_port() {
        let mut s = Settings::default();
        s.server.port = 0;
        assert!(matches!(s.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "out_dir = \"\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str("[a.b]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a.b]\nx = 10\n").unwrap();
        let merged = merge_toml(base, overlay);
        let b = merged.get("a").unwrap().get("b").unwrap();
        assert_eq!(b.get("x").unwrap().as_integer(), Some(10));
        assert_eq!(b.get("y").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_scalar_replaces_table() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\n").unwrap();
        let overlay: toml::Value = toml::from_str("a = 5\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(5));
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let s = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(s, Settings::default());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let s: Settings = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in [
            "[templates]",
            "[styles]",
            "[scripts]",
            "[images]",
            "[build]",
            "[server]",
        ] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["templates", "styles", "scripts", "images", "build", "server"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
