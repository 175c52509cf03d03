// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Lint, build and test orchestration for the workspace, plus `seed-data`,
//! which writes a demo data directory through the record store so a fresh
//! checkout has something to log in to.
//!
//! - `cargo xtask ci` runs lint, deny, machete, build and test
//! - `cargo xtask seed-data --data-dir ./data` writes the demo tables

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, path::PathBuf, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use duct::cmd;
use finscore_api::PasswordPolicy;
use finscore_domain::{Organization, Role, User};
use finscore_persistence::{CsvStore, NewOrganization, NewUser};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

/// Login of the seeded administrator.
const DEMO_ADMIN_EMAIL: &str = "admin@demo.com";

/// Display name of the seeded administrator.
const DEMO_ADMIN_NAME: &str = "Admin User";

/// Password of the seeded administrator. Demo data only.
const DEMO_ADMIN_PASSWORD: &str = "Password1";

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Check if README.md is up-to-date
    #[command(visible_alias = "cr")]
    CheckReadme,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Lint markdown files
    #[command(visible_alias = "md")]
    LintMarkdown,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in the project
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Write a demo organization and administrator to a data directory
    #[command(visible_alias = "seed")]
    SeedData {
        /// Directory holding the CSV table files
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::SeedData { data_dir } => seed_data(data_dir),
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::CheckReadme => check_readme(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::LintMarkdown => lint_markdown(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::FixTypos => fix_typos(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
        }
    }
}

/// Run CI checks (lint, build, test)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Run cargo-rdme to check if README.md is up-to-date with the library documentation
fn check_readme() -> Result<()> {
    run_cargo(vec!["rdme", "--workspace-project", "finscore-persistence", "--check"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs (and a soft fail on markdown)
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    if let Err(err) = lint_markdown() {
        tracing::warn!("known issue: markdownlint is currently noisy and can be ignored: {err}");
    }
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Lint markdown files using [markdownlint-cli2](https://github.com/DavidAnson/markdownlint-cli2)
fn lint_markdown() -> Result<()> {
    cmd!("markdownlint-cli2", "**/*.md", "!target", "!**/target").run_with_trace()?;

    Ok(())
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Fix typos in the project
fn fix_typos() -> Result<()> {
    cmd!("typos", "-w").run_with_trace()?;
    Ok(())
}

/// Run tests for libs and docs
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Write the demo organization and administrator through the record store.
///
/// Does nothing if the users table already has rows, so it is safe to run
/// against a live data directory.
fn seed_data(data_dir: PathBuf) -> Result<()> {
    PasswordPolicy::default()
        .validate(DEMO_ADMIN_PASSWORD, DEMO_ADMIN_EMAIL, DEMO_ADMIN_NAME)
        .wrap_err("demo administrator password does not satisfy the password policy")?;

    let runtime = tokio::runtime::Runtime::new().wrap_err("failed to start tokio runtime")?;
    runtime.block_on(async move {
        let store = CsvStore::open(&data_dir)
            .await
            .wrap_err_with(|| format!("failed to open {}", data_dir.display()))?;

        if !store.list_users().await?.is_empty() {
            tracing::warn!("users already present in {}; not seeding", data_dir.display());
            return Ok(());
        }

        let org: Organization = store
            .create_organization(NewOrganization {
                name: String::from("Demo Bank"),
                code: String::from("DEMO"),
                org_type: String::from("Bank"),
                contact_email: String::from(DEMO_ADMIN_EMAIL),
                ..NewOrganization::default()
            })
            .await?;

        let password_hash: String = bcrypt::hash(DEMO_ADMIN_PASSWORD, bcrypt::DEFAULT_COST)?;
        let admin: User = store
            .create_user(
                NewUser::new(DEMO_ADMIN_NAME, DEMO_ADMIN_EMAIL, password_hash)
                    .with_role(Role::Admin)
                    .with_organization(org.id),
            )
            .await?;

        tracing::info!(
            organization_id = org.id,
            user_id = admin.id,
            "seeded {} with {DEMO_ADMIN_EMAIL}",
            data_dir.display()
        );
        Ok::<(), color_eyre::Report>(())
    })
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_admin_password_satisfies_policy() {
        assert!(PasswordPolicy::default()
            .validate(DEMO_ADMIN_PASSWORD, DEMO_ADMIN_EMAIL, DEMO_ADMIN_NAME)
            .is_ok());
    }

    #[test]
    fn seeded_admin_logs_in_with_demo_password() -> Result<()> {
        let dir = tempfile::tempdir()?;
        seed_data(dir.path().to_path_buf())?;

        let runtime = tokio::runtime::Runtime::new()?;
        let admin: Option<User> = runtime.block_on(async {
            let store = CsvStore::open(dir.path()).await?;
            store.get_user_by_email(DEMO_ADMIN_EMAIL).await
        })?;
        let admin: User = admin.ok_or_else(|| color_eyre::eyre::eyre!("admin not seeded"))?;
        assert_eq!(admin.role, Role::Admin);
        assert!(bcrypt::verify(DEMO_ADMIN_PASSWORD, &admin.password_hash)?);
        Ok(())
    }
}
