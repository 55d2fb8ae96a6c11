//! Module declaration wiring.
//!
//! A Rust file only compiles once some module file declares it. Every file
//! the pipeline writes is declared in its parent module (`mod.rs`, or the
//! sibling `<dir>.rs`), walking up until the crate source root, whose entry
//! point the synthesizer owns. The pruner uses [`remove_declaration`] to
//! undo this for files it deletes.

use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::{Path, PathBuf};
use strata_core::{Error, Result};
use tracing::{debug, warn};

use crate::layout::module_stem;
use crate::syntax::{EditSet, SourceMap, parse_source};
use crate::types::FileStatus;
use crate::writer::write_if_changed;

/// Outcome of removing a module declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The declaration was removed
    Removed,
    /// The declaration was removed and the file holds no items anymore
    Emptied,
    /// Nothing declared the module
    Absent,
}

/// Module file declaring the children of `dir`, if one exists.
///
/// `mod.rs` wins over a sibling `<dir>.rs`.
#[must_use]
pub fn module_file_of(dir: &Path) -> Option<PathBuf> {
    let mod_rs = dir.join("mod.rs");
    if mod_rs.is_file() {
        return Some(mod_rs);
    }
    let sibling = dir.with_extension("rs");
    sibling.is_file().then_some(sibling)
}

/// Declares `file` and each directory above it up to `src_root`.
///
/// Missing module files are created as `mod.rs`. Returns the module files
/// that were (or, in a dry run, would be) written, with their status.
///
/// # Errors
///
/// Returns [`Error::Io`] if a module file cannot be read or written.
pub fn ensure_declared(
    file: &Path,
    src_root: &Path,
    dry_run: bool,
) -> Result<Vec<(PathBuf, FileStatus)>> {
    let mut touched = Vec::new();
    let mut child = file.to_path_buf();
    while let Some(dir) = child.parent() {
        if dir == src_root || !dir.starts_with(src_root) {
            break;
        }
        let name = if child.is_dir() || child.extension().is_none() {
            child.file_name().map(|n| n.to_string_lossy().into_owned())
        } else {
            module_stem(&child)
        };
        let Some(name) = name else {
            child = dir.to_path_buf();
            continue;
        };

        let module_file = module_file_of(dir).unwrap_or_else(|| dir.join("mod.rs"));
        let current = match fs::read_to_string(&module_file) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::io(&module_file, e)),
        };
        if let Some(updated) = declare(&module_file, &current, &name) {
            let status = write_if_changed(&module_file, &updated, dry_run)?;
            if status.is_write() {
                touched.push((module_file, status));
            }
        }
        child = dir.to_path_buf();
    }
    Ok(touched)
}

/// Text of `module_file` with `pub mod name;` added, or `None` if it is
/// already declared.
///
/// The declaration goes in sorted position among the existing
/// declarations, or at the end when there are none.
fn declare(module_file: &Path, src: &str, name: &str) -> Option<String> {
    let line = format!("pub mod {name};");
    let file = match parse_source(module_file, src) {
        Ok(file) => file,
        Err(e) => {
            warn!("{e}; appending module declaration");
            let pattern = format!(
                r"(?m)^\s*(pub(\([^)]*\))?\s+)?mod\s+{}\s*[;{{]",
                regex::escape(name)
            );
            let declared = Regex::new(&pattern).is_ok_and(|re| re.is_match(src));
            return (!declared).then(|| append(src, &line));
        }
    };

    let decls: Vec<&syn::ItemMod> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Mod(m) => Some(m),
            _ => None,
        })
        .collect();
    if decls.iter().any(|m| m.ident == name) {
        return None;
    }

    let map = SourceMap::new(src);
    let external: Vec<&&syn::ItemMod> = decls.iter().filter(|m| m.content.is_none()).collect();
    let mut edits = EditSet::new();
    if let Some(next) = external.iter().find(|m| m.ident.to_string().as_str() > name) {
        let start = map.range_of(**next)?.start;
        edits.insert(start, format!("{line}\n"));
    } else if let Some(last) = external.last() {
        let end = map.range_of(**last)?.end;
        edits.insert(end, format!("\n{line}"));
    } else {
        return Some(append(src, &line));
    }
    debug!("declaring module {name} in {}", module_file.display());
    Some(edits.apply(src))
}

fn append(src: &str, line: &str) -> String {
    let mut out = src.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(line);
    out.push('\n');
    out
}

/// Removes the `mod name;` declaration from `module_file`.
///
/// Inline modules (`mod name { .. }`) are not touched. A file that no
/// longer parses is left alone and reported [`Removal::Absent`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read or written.
pub fn remove_declaration(module_file: &Path, name: &str, dry_run: bool) -> Result<Removal> {
    let src = match fs::read_to_string(module_file) {
        Ok(src) => src,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Removal::Absent),
        Err(e) => return Err(Error::io(module_file, e)),
    };
    let file = match parse_source(module_file, &src) {
        Ok(file) => file,
        Err(e) => {
            warn!("{e}; leaving module declarations alone");
            return Ok(Removal::Absent);
        }
    };

    let map = SourceMap::new(&src);
    let found = file.items.iter().find_map(|item| match item {
        syn::Item::Mod(m) if m.ident == name && m.content.is_none() => map.range_of(m),
        _ => None,
    });
    let Some(range) = found else {
        return Ok(Removal::Absent);
    };

    let mut edits = EditSet::new();
    edits.replace(whole_lines(&src, range), "");
    let updated = edits.apply(&src);
    write_if_changed(module_file, &updated, dry_run)?;
    debug!("removed module {name} from {}", module_file.display());

    let emptied = file.items.len() == 1 && file.attrs.is_empty();
    Ok(if emptied {
        Removal::Emptied
    } else {
        Removal::Removed
    })
}

/// Widens `range` to full lines when nothing else shares them.
fn whole_lines(src: &str, range: Range<usize>) -> Range<usize> {
    let line_start = src[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = src[range.end..]
        .find('\n')
        .map_or(src.len(), |i| range.end + i + 1);
    let before_blank = src[line_start..range.start].trim().is_empty();
    let after_blank = src[range.end..line_end].trim().is_empty();
    if before_blank && after_blank {
        line_start..line_end
    } else {
        range
    }
}
