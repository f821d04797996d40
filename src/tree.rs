//! In-memory working copy of a cloned template tree.
//!
//! The composer never edits files on disk directly. It loads the cloned
//! template into a `ProjectTree`, mutates that, and flushes the result back
//! only after every composition step has succeeded. A failed step therefore
//! leaves no partially merged file at a final path.
//!
//! Excluded paths (version-control internals, wrapper jars, images) are not
//! loaded and stay untouched on disk. Loaded files are classified text or
//! binary by content sniffing; substitution only ever touches text.

use crate::error::{Result, SprigError};
use crate::fs::atomic_write;
use crate::template::{self, Substitution, TokenMap};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// How many leading bytes to sniff when classifying text vs binary.
const SNIFF_LEN: usize = 8192;

/// Content of a single file in the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn is_text(&self) -> bool {
        matches!(self, FileContent::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(s) => Some(s),
            FileContent::Binary(_) => None,
        }
    }
}

/// Build a matcher from exclude glob patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            SprigError::User(format!("invalid exclude glob '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SprigError::User(format!("failed to build exclude set: {}", e)))
}

/// The mutable working copy of a template, owned exclusively by one
/// composition run.
#[derive(Debug)]
pub struct ProjectTree {
    root: PathBuf,
    files: BTreeMap<PathBuf, FileContent>,
    dirs: BTreeSet<PathBuf>,
    /// Original paths vacated by renames, deleted from disk at write time.
    removed_files: BTreeSet<PathBuf>,
    removed_dirs: BTreeSet<PathBuf>,
}

impl ProjectTree {
    /// Load the tree rooted at `root`, skipping excluded paths. `.git` is
    /// always skipped regardless of patterns.
    pub fn load(root: &Path, excludes: &GlobSet) -> Result<Self> {
        let mut tree = Self {
            root: root.to_path_buf(),
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
            removed_files: BTreeSet::new(),
            removed_dirs: BTreeSet::new(),
        };
        tree.walk(root, Path::new(""), excludes)?;
        Ok(tree)
    }

    fn walk(&mut self, dir: &Path, rel: &Path, excludes: &GlobSet) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SprigError::User(format!("failed to read directory '{}': {}", dir.display(), e))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                SprigError::User(format!("failed to read directory entry: {}", e))
            })?;
            let name = entry.file_name();
            let rel_path = rel.join(&name);
            let abs_path = entry.path();

            let file_type = entry.file_type().map_err(|e| {
                SprigError::User(format!("failed to stat '{}': {}", abs_path.display(), e))
            })?;

            if file_type.is_dir() {
                if name == ".git" {
                    continue;
                }
                self.dirs.insert(rel_path.clone());
                self.walk(&abs_path, &rel_path, excludes)?;
            } else if file_type.is_file() {
                if excludes.is_match(&rel_path) {
                    continue;
                }
                let bytes = fs::read(&abs_path).map_err(|e| {
                    SprigError::User(format!("failed to read '{}': {}", abs_path.display(), e))
                })?;
                self.files.insert(rel_path, classify(bytes));
            }
            // Symlinks in a template are not supported; skip silently.
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.files.contains_key(Path::new(rel))
    }

    pub fn get(&self, rel: &str) -> Option<&FileContent> {
        self.files.get(Path::new(rel))
    }

    /// Text content of a file the composition needs to edit. Absence or
    /// binary content aborts the composition.
    pub fn text(&self, rel: &str) -> Result<&str> {
        match self.files.get(Path::new(rel)) {
            Some(FileContent::Text(s)) => Ok(s),
            Some(FileContent::Binary(_)) => Err(SprigError::Composition(format!(
                "'{}' is binary, expected a text file",
                rel
            ))),
            None => Err(SprigError::Composition(format!(
                "source file '{}' is missing from the template",
                rel
            ))),
        }
    }

    pub fn set_text(&mut self, rel: &str, content: String) {
        self.files
            .insert(PathBuf::from(rel), FileContent::Text(content));
    }

    /// Insert a new text file, failing on an existing path. Used for copied
    /// migration scripts and the synthesized smoke test, where a collision
    /// means two add-ons fight over one filename.
    pub fn insert_new_text(&mut self, rel: &str, content: String) -> Result<()> {
        let path = PathBuf::from(rel);
        if self.files.contains_key(&path) {
            return Err(SprigError::Composition(format!(
                "file '{}' already exists in the tree",
                rel
            )));
        }
        self.files.insert(path, FileContent::Text(content));
        Ok(())
    }

    /// Files whose final path component ends with `suffix`.
    pub fn find_by_suffix(&self, suffix: &str) -> Vec<PathBuf> {
        self.files
            .keys()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix))
            })
            .cloned()
            .collect()
    }

    /// Substitute tokens across every text file. Returns the total number of
    /// replacements.
    pub fn substitute(&mut self, tokens: &TokenMap) -> usize {
        let mut total = 0;
        for content in self.files.values_mut() {
            if let FileContent::Text(text) = content {
                let Substitution { output, replaced } = template::substitute(text, tokens);
                if replaced > 0 {
                    *text = output;
                    total += replaced;
                }
            }
        }
        total
    }

    /// Rename every path component matching a token, files and directories
    /// alike. Returns the number of paths that moved.
    pub fn rename_paths(&mut self, tokens: &TokenMap) -> Result<usize> {
        let mut moves: Vec<(PathBuf, PathBuf)> = Vec::new();
        for path in self.files.keys() {
            let renamed = rename_path(path, tokens);
            if renamed != *path {
                moves.push((path.clone(), renamed));
            }
        }

        let mut renamed_count = 0;
        for (old, new) in moves {
            if self.files.contains_key(&new) {
                return Err(SprigError::Composition(format!(
                    "path rename collision: '{}' and '{}' both map to '{}'",
                    old.display(),
                    new.display(),
                    new.display()
                )));
            }
            let content = self.files.remove(&old).expect("move source exists");
            self.files.insert(new, content);
            self.removed_files.insert(old);
            renamed_count += 1;
        }

        let mut dir_moves: Vec<(PathBuf, PathBuf)> = Vec::new();
        for dir in &self.dirs {
            let renamed = rename_path(dir, tokens);
            if renamed != *dir {
                dir_moves.push((dir.clone(), renamed));
            }
        }
        for (old, new) in dir_moves {
            self.dirs.remove(&old);
            self.dirs.insert(new);
            self.removed_dirs.insert(old);
            renamed_count += 1;
        }

        Ok(renamed_count)
    }

    /// Assert substitution totality: no declared token may remain in any
    /// text file content or any path.
    pub fn verify_no_tokens(&self, tokens: &TokenMap) -> Result<()> {
        for (path, content) in &self.files {
            if let Some(path_str) = path.to_str()
                && let Some(token) = template::find_token(path_str, tokens)
            {
                return Err(SprigError::Composition(format!(
                    "path '{}' still contains placeholder {}",
                    path.display(),
                    token
                )));
            }
            if let FileContent::Text(text) = content
                && let Some(token) = template::find_token(text, tokens)
            {
                return Err(SprigError::Composition(format!(
                    "file '{}' still contains placeholder {}",
                    path.display(),
                    token
                )));
            }
        }
        Ok(())
    }

    /// Flush the tree back to disk. Every file is written atomically; paths
    /// vacated by renames are removed afterwards, deepest directories first.
    pub fn write(&self) -> Result<()> {
        for dir in &self.dirs {
            let abs = self.root.join(dir);
            fs::create_dir_all(&abs).map_err(|e| {
                SprigError::User(format!(
                    "failed to create directory '{}': {}",
                    abs.display(),
                    e
                ))
            })?;
        }

        for (rel, content) in &self.files {
            let abs = self.root.join(rel);
            match content {
                FileContent::Text(text) => atomic_write(&abs, text.as_bytes())?,
                FileContent::Binary(bytes) => atomic_write(&abs, bytes)?,
            }
        }

        for rel in &self.removed_files {
            let abs = self.root.join(rel);
            if abs.exists() {
                fs::remove_file(&abs).map_err(|e| {
                    SprigError::User(format!("failed to remove '{}': {}", abs.display(), e))
                })?;
            }
        }

        // Vacated directories are pruned only when empty; anything excluded
        // from the tree that still lives there is preserved.
        let mut vacated: Vec<&PathBuf> = self.removed_dirs.iter().collect();
        vacated.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
        for rel in vacated {
            let _ = fs::remove_dir(self.root.join(rel));
        }

        Ok(())
    }
}

/// Apply token substitution to each component of a relative path.
fn rename_path(path: &Path, tokens: &TokenMap) -> PathBuf {
    let mut renamed = PathBuf::new();
    for component in path.components() {
        let part = component.as_os_str().to_string_lossy();
        renamed.push(template::substitute(&part, tokens).output);
    }
    renamed
}

/// Classify file bytes as text or binary. A NUL byte in the sniff window or
/// invalid UTF-8 means binary.
fn classify(bytes: Vec<u8>) -> FileContent {
    let window = &bytes[..bytes.len().min(SNIFF_LEN)];
    if window.contains(&0) {
        return FileContent::Binary(bytes);
    }
    match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(e) => FileContent::Binary(e.into_bytes()),
    }
}
