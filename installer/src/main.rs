//! Flutter installer CLI entrypoint.
//!
//! This binary resolves and installs a Flutter SDK, then publishes
//! `FLUTTER_ROOT` and the SDK's bin directories to GitHub Actions or prints
//! the equivalent shell configuration.

use clap::Parser;
use flutter_installer::archive::extraction::SdkExtractor;
use flutter_installer::cache::{FsToolCache, tool_cache_root};
use flutter_installer::cli::Cli;
use flutter_installer::dirs::SystemBaseDirs;
use flutter_installer::error::{InstallerError, Result};
use flutter_installer::install::{
    Collaborators, InstallOutcome, InstallRequest, install, resolve_release,
};
use flutter_installer::output::{DryRunInfo, success_message, write_stderr_line};
use flutter_installer::publish::{GithubActionsPublisher, ShellPublisher};
use flutter_installer::release::download::HttpReleaseSource;
use flutter_installer::reporter::ConsoleReporter;
use flutter_installer::scratch::scratch_base;
use std::io::Write;
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let dirs = SystemBaseDirs;
    let request = cli.install_request()?;
    let cache_root = tool_cache_root(&dirs, cli.cache_dir.as_deref().map(|dir| dir.as_std_path()))?;
    let scratch_base = scratch_base(&dirs);

    // Dry-run mode: resolve only, without side effects
    if cli.dry_run {
        return run_dry(&request, &cache_root, &scratch_base, stderr);
    }

    let reporter = ConsoleReporter::new(cli.quiet);
    let cache = FsToolCache::new(&cache_root);
    let collaborators = Collaborators {
        source: &HttpReleaseSource,
        extractor: &SdkExtractor,
        cache: &cache,
        reporter: &reporter,
        scratch_base: &scratch_base,
    };

    let github = if cli.print_env {
        None
    } else {
        GithubActionsPublisher::from_dirs(&dirs)
    };
    match github {
        Some(mut publisher) => {
            let outcome = install(&request, &collaborators, &mut publisher)?;
            report_success(cli, &outcome, stderr);
        }
        None => {
            let mut publisher = ShellPublisher::new();
            let outcome = install(&request, &collaborators, &mut publisher)?;
            report_success(cli, &outcome, stderr);
            print_snippet(&publisher, &mut std::io::stdout())?;
        }
    }
    Ok(())
}

/// Resolves the release and prints the plan without downloading.
fn run_dry(
    request: &InstallRequest,
    cache_root: &Path,
    scratch_base: &Path,
    stderr: &mut dyn Write,
) -> Result<()> {
    let reporter = ConsoleReporter::new(true);
    let release = resolve_release(request, &HttpReleaseSource, &reporter)?;
    let manifest_url = request.manifest_url();
    let info = DryRunInfo {
        manifest_url: &manifest_url,
        channel: request.channel.as_str(),
        request: &request.version,
        release: Some(&release),
        cache_root,
        scratch_base,
    };
    write_stderr_line(stderr, info.display_text());
    Ok(())
}

fn report_success(cli: &Cli, outcome: &InstallOutcome, stderr: &mut dyn Write) {
    if cli.quiet {
        return;
    }
    write_stderr_line(stderr, "");
    write_stderr_line(
        stderr,
        success_message(outcome.release().version(), outcome.path(), outcome.was_cached()),
    );
}

/// Prints the collected exports as shell configuration on stdout.
fn print_snippet(publisher: &ShellPublisher, stdout: &mut dyn Write) -> Result<()> {
    writeln!(stdout, "{}", publisher.snippet().display_text())
        .map_err(|source| InstallerError::WriteFailed { source })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
