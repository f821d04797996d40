//! Implementation of the `sprig new` command.
//!
//! # What `sprig new` does
//!
//! 1. Loads the tool config and validates the add-on selection and service
//!    configuration (fail-fast: nothing touches the filesystem before this)
//! 2. Checks that git is installed (and gh, when `--github` is requested)
//! 3. Clones the template repository into `<dir>/<name>` and drops its history
//! 4. Composes the tree in memory: placeholder substitution, path renames,
//!    add-on fragment merging, smoke-test synthesis
//! 5. Writes the composed tree, registers the port
//! 6. Initializes git and creates the initial commit (unless `--no-git`)
//! 7. Optionally creates the remote repository via gh and pushes
//! 8. Runs configured post-compose hooks inside the new tree
//!
//! A failure before git history exists removes the partial tree; after that
//! point everything on disk is preserved for inspection.

mod git_ops;

#[cfg(test)]
mod tests;

use crate::addon::{AddonId, AddonSelection};
use crate::cli::NewArgs;
use crate::compose::Composer;
use crate::config::Config;
use crate::error::{Result, SprigError};
use crate::ports::PortRegistry;
use crate::report::CompositionReport;
use crate::service::{ServiceConfig, ServiceInput};
use crate::tools;
use crate::tree::{self, ProjectTree};
use globset::GlobSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the `sprig new` command.
pub fn cmd_new(args: NewArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let selection = AddonSelection::parse(&args.addons)?;

    let registry_path = resolve_from_config(&args.config, &config.port_registry);
    let mut registry = PortRegistry::load(&registry_path)?;

    let input = ServiceInput {
        name: args.name.clone(),
        domain: args.domain.clone(),
        port: args.port,
        database: args.database.clone(),
        java_version: args
            .java_version
            .clone()
            .unwrap_or_else(|| config.java_version.clone()),
        commons_version: args
            .commons_version
            .clone()
            .unwrap_or_else(|| config.commons_version.clone()),
    };
    let service = ServiceConfig::validate(&input, &registry)?;

    if selection.contains(AddonId::Postgresql) && service.database.is_none() {
        return Err(SprigError::Validation(
            "the postgresql add-on needs a database name; pass --database".to_string(),
        ));
    }

    let template = match args.template.as_deref() {
        Some(template) => template.to_string(),
        None if !config.template_repo.is_empty() => config.template_repo.clone(),
        None => {
            return Err(SprigError::User(format!(
                "no template repository configured.\n\
                 Set template_repo in '{}' or pass --template.",
                args.config.display()
            )));
        }
    };

    tools::require("git", &["--version"], "Install git: https://git-scm.com/downloads")?;
    if args.github {
        tools::require(
            "gh",
            &["--version"],
            "Install the GitHub CLI: https://cli.github.com, or drop --github.",
        )?;
    }

    let parent = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| SprigError::User(format!("cannot resolve current directory: {}", e)))?,
    };
    let target = parent.join(&service.name);
    if target.exists() {
        return Err(SprigError::User(format!(
            "target directory '{}' already exists.\n\
             Remove it or pick a different service name.",
            target.display()
        )));
    }

    println!("Cloning template into {} ...", target.display());
    git_ops::clone_template(&template, &target)?;
    git_ops::remove_embedded_git(&target)?;

    let excludes = tree::build_globset(&config.substitution_excludes)?;
    let fragments_dir = resolve_from_config(&args.config, &config.fragments_dir);

    println!("Composing {} ...", service.name);
    let report = match compose_and_write(&service, &selection, &fragments_dir, &target, &excludes)
    {
        Ok(report) => report,
        Err(e) => {
            cleanup_unversioned(&target);
            return Err(e);
        }
    };
    report.print();

    if !report.ok() {
        cleanup_unversioned(&target);
        let message = report
            .failure()
            .unwrap_or("composition failed")
            .to_string();
        return Err(SprigError::Composition(message));
    }

    registry.register(&service.name, service.port);
    registry.save(&registry_path)?;

    if !args.no_git && config.git_auto_commit {
        git_ops::init_repository(&target, &config.default_branch)?;
        git_ops::initial_commit(&target, &format!("Scaffold {}", service.name))?;
    }

    if args.github {
        git_ops::publish(&target, &service.name)?;
    }

    run_post_compose(&config, &target)?;

    println!();
    println!("Composed {}.", service.name);
    println!();
    println!("  Location:  {}", target.display());
    println!("  Port:      {}", service.port);
    if let Some(db) = &service.database {
        println!("  Database:  {}", db);
    }
    if !selection.is_empty() {
        let addons: Vec<String> = selection.iter().map(|a| a.to_string()).collect();
        println!("  Add-ons:   {}", addons.join(", "));
    }
    println!();
    println!("Next steps:");
    println!("  cd {}", service.name);
    println!("  ./gradlew test");

    Ok(())
}

/// Load the cloned tree, run the composer, and flush only a clean result.
fn compose_and_write(
    service: &ServiceConfig,
    selection: &AddonSelection,
    fragments_dir: &Path,
    target: &Path,
    excludes: &GlobSet,
) -> Result<CompositionReport> {
    let mut project = ProjectTree::load(target, excludes)?;
    let composer = Composer::new(service, selection, fragments_dir);
    let report = composer.run(&mut project);
    if report.ok() {
        project.write()?;
    }
    Ok(report)
}

/// Remove a partially built tree, but never one with git history on it.
fn cleanup_unversioned(target: &Path) {
    if !git_ops::has_git_history(target) {
        let _ = fs::remove_dir_all(target);
    }
}

/// Run each configured post-compose command inside the composed tree.
fn run_post_compose(config: &Config, target: &Path) -> Result<()> {
    for hook in &config.post_compose {
        let words = shell_words::split(hook).map_err(|e| {
            SprigError::User(format!("invalid post_compose command '{}': {}", hook, e))
        })?;
        let Some((program, rest)) = words.split_first() else {
            continue;
        };
        println!("Running post-compose hook: {}", hook);
        let hook_args: Vec<&str> = rest.iter().map(String::as_str).collect();
        tools::run_tool(target, program, &hook_args)?;
    }
    Ok(())
}

/// Resolve a config-file-relative path.
fn resolve_from_config(config_path: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        return path;
    }
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(path),
        _ => path,
    }
}
