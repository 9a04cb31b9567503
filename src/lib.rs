//! # entrymap
//!
//! Entry-point discovery and output naming for static sites built by a
//! JavaScript bundler. The bundler does the compiling and writing; this crate
//! decides *what* goes in and *where* it comes out.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load      entrymap.toml  →  Settings      (stock defaults + overrides)
//! 2. Discover  src/           →  Discovered    (glob patterns per category)
//! 3. Map       Discovered     →  EntryMap      (output key → source file)
//! 4. Name      per artifact   →  output path   (entry / chunk / asset rules)
//! ```
//!
//! Steps 1–3 run once and produce an immutable [`build_config::BuildConfig`].
//! Step 4 is a set of pure functions the bundler calls once per emitted file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`paths`] | `RelPath`: root-relative, `/`-separated path algebra |
//! | [`types`] | `Category` and `SourceFile`, shared by every stage |
//! | [`discover`] | Walks the source root and sorts files into categories by glob |
//! | [`entries`] | Folds discovered files into the bundler input map, reporting collisions |
//! | [`naming`] | Entry, chunk and asset file naming rules |
//! | [`config`] | `entrymap.toml` loading, merging, validation |
//! | [`build_config`] | The assembled, serializable configuration handed to the bundler |
//! | [`output`] | CLI output formatting |
//!
//! # Output Layout
//!
//! ```text
//! dist/
//! ├── index.html                         ← src/index.pug
//! ├── about/index.html                   ← src/about/index.pug
//! └── assets/
//!     ├── js/js/index.js                 ← src/js/index.js
//!     ├── css/styles/index.css           ← src/styles/home.scss
//!     ├── images/logo.svg                ← src/logo.svg
//!     └── inter.woff2                    ← anything else
//! ```
//!
//! # Partials
//!
//! Files whose name starts with `_` are partials: included by other sources,
//! never built on their own. The stock exclude patterns drop them from every
//! category.

pub mod build_config;
pub mod config;
pub mod discover;
pub mod entries;
pub mod naming;
pub mod output;
pub mod paths;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
