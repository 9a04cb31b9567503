//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Templates
//! 001 about/index.pug
//! 002 index.pug
//!
//! Styles
//! 001 styles/home.scss
//!
//! Found 2 templates, 1 style, 1 script, 2 images
//! ```
//!
//! ## Entries
//!
//! ```text
//! about/index.html ← about/index.pug
//! assets/images/logo.svg ← logo.svg
//! ```
//!
//! ## Collisions
//!
//! ```text
//! Collision: page.html
//!     Kept: /site/src/page.scss
//!     Discarded: /site/src/page.pug
//! ```
//!
//! ## Name Clashes
//!
//! ```text
//! Name clash: assets/css/styles/index.css
//!     Source: /site/src/styles/home.scss
//!     Source: /site/src/styles/other.scss
//! ```

use crate::build_config::NameClash;
use crate::discover::Discovered;
use crate::entries::{Collision, EntryMap};
use crate::types::Category;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 template`, `2 templates`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Format the discovered sources, one section per non-empty category.
pub fn format_scan_output(discovered: &Discovered) -> Vec<String> {
    let mut lines = Vec::new();

    for category in Category::ALL {
        let files = discovered.files(category);
        if files.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(category.heading().to_string());
        for (i, file) in files.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), file.rel));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let summary: Vec<String> = Category::ALL
        .iter()
        .map(|&c| count(discovered.files(c).len(), c.as_str()))
        .collect();
    lines.push(format!("Found {}", summary.join(", ")));
    lines
}

pub fn print_scan_output(discovered: &Discovered) {
    for line in format_scan_output(discovered) {
        println!("{}", line);
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Format each entry as `key ← source`, in key order.
pub fn format_entries_output(entries: &EntryMap) -> Vec<String> {
    entries
        .iter()
        .map(|(key, file)| format!("{key} ← {}", file.rel))
        .collect()
}

pub fn print_entries_output(entries: &EntryMap) {
    for line in format_entries_output(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// Collisions
// ============================================================================

pub fn format_collisions(collisions: &[Collision]) -> Vec<String> {
    let mut lines = Vec::new();
    for c in collisions {
        lines.push(format!("Collision: {}", c.key));
        lines.push(format!("{}Kept: {}", indent(1), c.kept.display()));
        lines.push(format!("{}Discarded: {}", indent(1), c.discarded.display()));
    }
    lines
}

pub fn print_collisions(collisions: &[Collision]) {
    for line in format_collisions(collisions) {
        println!("{}", line);
    }
}

// ============================================================================
// Name clashes
// ============================================================================

pub fn format_name_clashes(clashes: &[NameClash]) -> Vec<String> {
    let mut lines = Vec::new();
    for clash in clashes {
        lines.push(format!("Name clash: {}", clash.file_name));
        for source in &clash.sources {
            lines.push(format!("{}Source: {}", indent(1), source.display()));
        }
    }
    lines
}

pub fn print_name_clashes(clashes: &[NameClash]) {
    for line in format_name_clashes(clashes) {
        println!("{}", line);
    }
}
