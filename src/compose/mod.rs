//! The template composer.
//!
//! Runs the composition steps against an in-memory [`ProjectTree`], in a
//! fixed order:
//!
//! 1. substitute placeholder tokens across all text files
//! 2. rename placeholder-named paths
//! 3. merge fragments of each enabled add-on, in declared add-on order
//! 4. synthesize the smoke test for the enabled infrastructure add-ons
//! 5. verify that no declared placeholder survived anywhere
//!
//! Each step records a [`StepResult`]; the first failure aborts the
//! remaining steps. The tree is never flushed to disk here: the caller
//! writes it only when the report comes back clean, which is what keeps
//! half-merged files off the filesystem.

pub mod fragments;
pub mod merge;

use crate::addon::{AddonId, AddonSelection};
use crate::error::{Result, SprigError};
use crate::report::{CompositionReport, StepResult};
use crate::service::ServiceConfig;
use crate::tree::ProjectTree;
use std::path::Path;

use fragments::load_fragments;

/// Drives one composition run. Holds only borrowed inputs; the tree is
/// passed to [`Composer::run`] so ownership stays with the caller.
pub struct Composer<'a> {
    config: &'a ServiceConfig,
    selection: &'a AddonSelection,
    fragments_dir: &'a Path,
}

impl<'a> Composer<'a> {
    pub fn new(
        config: &'a ServiceConfig,
        selection: &'a AddonSelection,
        fragments_dir: &'a Path,
    ) -> Self {
        Self {
            config,
            selection,
            fragments_dir,
        }
    }

    /// Run all composition steps. The report's `ok()` decides whether the
    /// caller may flush the tree.
    pub fn run(&self, tree: &mut ProjectTree) -> CompositionReport {
        let mut report = CompositionReport::new();
        let tokens = self.config.token_map();

        let replaced = tree.substitute(&tokens);
        report.record(StepResult::pass(
            "substitute placeholders",
            format!("{} replacements", replaced),
        ));

        match tree.rename_paths(&tokens) {
            Ok(renamed) => report.record(StepResult::pass(
                "rename placeholder paths",
                format!("{} paths renamed", renamed),
            )),
            Err(e) => {
                report.record(StepResult::fail("rename placeholder paths", e.to_string()));
                report.finish();
                return report;
            }
        }

        for addon in self.selection.iter() {
            let step = format!("merge add-on {}", addon);
            let fragments = match load_fragments(self.fragments_dir, addon) {
                Ok(f) => f,
                Err(e) => {
                    report.record(StepResult::fail(step, e.to_string()));
                    report.finish();
                    return report;
                }
            };
            // web always runs: its catalog behavior (the core->web rename)
            // is built in, not shipped as a fragment file.
            if fragments.is_empty() && addon != AddonId::Web {
                report.record(StepResult::skip(step, "no fragments"));
                continue;
            }
            match merge::apply_addon(tree, &tokens, addon, &fragments) {
                Ok(()) => report.record(StepResult::pass(
                    step,
                    format!("{} fragments applied", fragments.count()),
                )),
                Err(e) => {
                    report.record(StepResult::fail(step, e.to_string()));
                    report.finish();
                    return report;
                }
            }
        }

        match self.synthesize_smoke_test(tree) {
            Ok(path) => report.record(StepResult::pass("synthesize smoke test", path)),
            Err(e) => {
                report.record(StepResult::fail("synthesize smoke test", e.to_string()));
                report.finish();
                return report;
            }
        }

        match tree.verify_no_tokens(&tokens) {
            Ok(()) => report.record(StepResult::pass(
                "verify placeholders resolved",
                "no placeholder occurrences remain",
            )),
            Err(e) => {
                report.record(StepResult::fail("verify placeholders resolved", e.to_string()));
            }
        }

        report.finish();
        report
    }

    fn synthesize_smoke_test(&self, tree: &mut ProjectTree) -> Result<String> {
        let entry_point = merge::find_entry_point(tree)?;
        let test_path = smoke_test::test_file_path(&entry_point)?;
        let package = smoke_test::package_of(&entry_point);

        let infra = self.selection.infrastructure();
        let source = smoke_test::synthesize(self.config, &infra, package.as_deref());

        let rel = test_path.to_string_lossy().into_owned();
        if tree.contains(&rel) {
            return Err(SprigError::Composition(format!(
                "smoke test target '{}' already exists in the template",
                rel
            )));
        }
        tree.insert_new_text(&rel, source)?;
        Ok(rel)
    }
}
