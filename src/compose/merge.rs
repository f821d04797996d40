//! Add-on fragment merging.
//!
//! Fragments land in shared template files at well-defined places:
//!
//! - dependency-catalog fragments append to `gradle/libs.versions.toml`,
//!   except for `web`, which swaps the commons-core library for commons-web
//!   in the catalog and build descriptor instead of appending anything
//! - build-descriptor fragments insert at the `// sprig:dependencies` anchor
//!   in `build.gradle`; dependency-management fragments insert at
//!   `// sprig:dependency-management`, which sits above the dependencies
//!   anchor
//! - runtime-config fragments are token-substituted, then appended to
//!   `src/main/resources/application.yaml`
//! - migration scripts are token-substituted and copied into the migrations
//!   directory under their original version-prefixed filename
//! - `unexclude.txt` drops auto-configuration exclusions from the
//!   application entry point
//!
//! A missing target file, missing anchor, or filename collision aborts the
//! whole composition. The tree is in memory at that point, so no partially
//! merged file ever reaches disk.

use crate::addon::AddonId;
use crate::compose::fragments::AddonFragments;
use crate::error::{Result, SprigError};
use crate::template::{self, TokenMap};
use crate::tree::ProjectTree;
use regex::Regex;
use std::path::PathBuf;

/// Shared dependency catalog within the template.
pub const CATALOG_PATH: &str = "gradle/libs.versions.toml";
/// Build descriptor within the template.
pub const BUILD_DESCRIPTOR_PATH: &str = "build.gradle";
/// Shared runtime configuration file within the template.
pub const RUNTIME_CONFIG_PATH: &str = "src/main/resources/application.yaml";
/// Directory migration scripts are copied into.
pub const MIGRATIONS_DIR: &str = "src/main/resources/db/migration";

/// Anchor line for build-descriptor dependency fragments.
pub const DEPENDENCIES_ANCHOR: &str = "// sprig:dependencies";
/// Anchor line for dependency-management fragments; sits above the
/// dependencies anchor in the template.
pub const DEPENDENCY_MANAGEMENT_ANCHOR: &str = "// sprig:dependency-management";

/// Library reference the `web` add-on replaces, in catalog spelling and in
/// the generated type-safe accessor spelling.
const CORE_TO_WEB: &[(&str, &str)] = &[
    ("commons-core", "commons-web"),
    ("commons.core", "commons.web"),
];

/// Apply all fragments of one add-on to the tree.
pub fn apply_addon(
    tree: &mut ProjectTree,
    tokens: &TokenMap,
    addon: AddonId,
    fragments: &AddonFragments,
) -> Result<()> {
    if addon == AddonId::Web {
        rename_core_to_web(tree)?;
    } else if let Some(catalog) = &fragments.catalog {
        append_to_file(tree, CATALOG_PATH, catalog)?;
    }

    if let Some(dm) = &fragments.dependency_management {
        insert_at_anchor(tree, BUILD_DESCRIPTOR_PATH, DEPENDENCY_MANAGEMENT_ANCHOR, dm)?;
    }
    if let Some(deps) = &fragments.build_descriptor {
        insert_at_anchor(tree, BUILD_DESCRIPTOR_PATH, DEPENDENCIES_ANCHOR, deps)?;
    }

    if let Some(runtime) = &fragments.runtime_config {
        let substituted = template::substitute(runtime, tokens).output;
        append_to_file(tree, RUNTIME_CONFIG_PATH, &substituted)?;
    }

    for (filename, content) in &fragments.migrations {
        copy_migration(tree, tokens, addon, filename, content)?;
    }

    if !fragments.unexclude.is_empty() {
        patch_entry_point(tree, &fragments.unexclude)?;
    }

    Ok(())
}

/// Append a fragment to an existing shared file, separated by a blank line.
fn append_to_file(tree: &mut ProjectTree, path: &str, fragment: &str) -> Result<()> {
    let existing = tree.text(path)?;
    let mut merged = existing.to_string();
    if !merged.is_empty() && !merged.ends_with('\n') {
        merged.push('\n');
    }
    if !merged.is_empty() {
        merged.push('\n');
    }
    merged.push_str(fragment);
    if !merged.ends_with('\n') {
        merged.push('\n');
    }
    tree.set_text(path, merged);
    Ok(())
}

/// Insert a fragment directly below a named anchor line, matching the
/// anchor's indentation. The anchor stays in place for later add-ons.
fn insert_at_anchor(
    tree: &mut ProjectTree,
    path: &str,
    anchor: &str,
    fragment: &str,
) -> Result<()> {
    let text = tree.text(path)?;

    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let position = lines.iter().position(|line| line.trim() == anchor);
    let Some(position) = position else {
        return Err(SprigError::Composition(format!(
            "insertion point '{}' not found in '{}'",
            anchor, path
        )));
    };

    let indent: String = lines[position]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();

    let mut inserted = Vec::new();
    for line in fragment.lines() {
        if line.is_empty() {
            inserted.push(String::new());
        } else {
            inserted.push(format!("{}{}", indent, line));
        }
    }
    lines.splice(position + 1..position + 1, inserted);

    let mut merged = lines.join("\n");
    if text.ends_with('\n') {
        merged.push('\n');
    }
    tree.set_text(path, merged);
    Ok(())
}

/// The `web` add-on is mutually exclusive with the generic commons-core
/// dependency: it renames the core library reference to the web one across
/// the catalog and build descriptor instead of appending a second entry.
fn rename_core_to_web(tree: &mut ProjectTree) -> Result<()> {
    let catalog = tree.text(CATALOG_PATH)?;
    if !catalog.contains(CORE_TO_WEB[0].0) {
        return Err(SprigError::Composition(format!(
            "'{}' does not reference '{}'; cannot apply the web add-on",
            CATALOG_PATH, CORE_TO_WEB[0].0
        )));
    }
    if catalog.contains(CORE_TO_WEB[0].1) {
        return Err(SprigError::Composition(format!(
            "'{}' already references '{}'; the web add-on would create a duplicate entry",
            CATALOG_PATH, CORE_TO_WEB[0].1
        )));
    }

    let renamed = rename_pairs(catalog);
    tree.set_text(CATALOG_PATH, renamed);

    let build = tree.text(BUILD_DESCRIPTOR_PATH)?;
    let renamed = rename_pairs(build);
    tree.set_text(BUILD_DESCRIPTOR_PATH, renamed);

    Ok(())
}

fn rename_pairs(text: &str) -> String {
    let mut out = text.to_string();
    for (from, to) in CORE_TO_WEB {
        out = out.replace(from, to);
    }
    out
}

/// Copy one migration script into the migrations directory, preserving its
/// filename. Two add-ons shipping the same filename is a hard error.
fn copy_migration(
    tree: &mut ProjectTree,
    tokens: &TokenMap,
    addon: AddonId,
    filename: &str,
    content: &str,
) -> Result<()> {
    let target = format!("{}/{}", MIGRATIONS_DIR, filename);
    if tree.contains(&target) {
        return Err(SprigError::Composition(format!(
            "migration filename collision: '{}' already exists while merging add-on '{}'",
            target, addon
        )));
    }
    let substituted = template::substitute(content, tokens).output;
    tree.insert_new_text(&target, substituted)
}

/// Find the application entry point: exactly one `*Application.java` under
/// `src/main/java`.
pub fn find_entry_point(tree: &ProjectTree) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = tree
        .find_by_suffix("Application.java")
        .into_iter()
        .filter(|p| p.starts_with("src/main/java"))
        .collect();

    match candidates.len() {
        1 => Ok(candidates.pop().expect("one candidate")),
        0 => Err(SprigError::Composition(
            "no application entry point (*Application.java) under src/main/java".to_string(),
        )),
        n => Err(SprigError::Composition(format!(
            "{} application entry points found under src/main/java, expected exactly one",
            n
        ))),
    }
}

/// Remove auto-configuration exclusions (and their imports) from the entry
/// point. Used when an add-on supplies the configuration the template
/// excluded by default.
fn patch_entry_point(tree: &mut ProjectTree, classes: &[String]) -> Result<()> {
    let entry_path = find_entry_point(tree)?;
    let entry_rel = entry_path.to_string_lossy().into_owned();
    let mut text = tree.text(&entry_rel)?.to_string();

    for class in classes {
        let simple = class.rsplit('.').next().unwrap_or(class);
        let clause = format!("{}.class", simple);
        if !text.contains(&clause) {
            return Err(SprigError::Composition(format!(
                "entry point '{}' does not exclude '{}'",
                entry_rel, simple
            )));
        }

        let import_line = format!("import {};", class);
        text = text
            .lines()
            .filter(|line| line.trim() != import_line)
            .collect::<Vec<_>>()
            .join("\n");
        if !text.ends_with('\n') {
            text.push('\n');
        }

        let escaped = regex::escape(&clause);
        for pattern in [
            format!(r",\s*{}", escaped),
            format!(r"{}\s*,\s*", escaped),
            escaped,
        ] {
            let re = Regex::new(&pattern).expect("valid exclusion pattern");
            text = re.replace_all(&text, "").into_owned();
        }
    }

    // An emptied exclusion list drops the whole clause.
    let empty_clause = Regex::new(r"\(\s*exclude\s*=\s*\{\s*\}\s*\)").expect("valid pattern");
    text = empty_clause.replace_all(&text, "").into_owned();

    tree.set_text(&entry_rel, text);
    Ok(())
}
