//! Output formatting for the installer CLI.
//!
//! Generates shell configuration snippets reproducing the published
//! environment, the dry-run plan, and the final success line.

use crate::release::resolver::{ResolvedRelease, VersionRequest};
use camino::Utf8PathBuf;
use std::fmt::Display;
use std::io::Write;
use std::path::Path;

/// Shell configuration snippets for different shells.
#[derive(Debug, Clone)]
pub struct ShellSnippet {
    /// Export lines for bash/zsh.
    pub bash: String,
    /// Set lines for fish shell.
    pub fish: String,
    /// Assignment lines for PowerShell.
    pub powershell: String,
}

impl ShellSnippet {
    /// Create snippets for the given variable exports and search path
    /// additions.
    ///
    /// Each path is prepended in turn, so the last one given ends up first
    /// on `PATH`.
    ///
    /// # Example
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use flutter_installer::output::ShellSnippet;
    ///
    /// let vars = vec![("FLUTTER_ROOT".to_owned(), "/sdk/flutter".to_owned())];
    /// let paths = vec![Utf8PathBuf::from("/sdk/flutter/bin")];
    /// let snippet = ShellSnippet::new(&vars, &paths);
    ///
    /// assert!(snippet.bash.contains("export FLUTTER_ROOT=\"/sdk/flutter\""));
    /// assert!(snippet.bash.contains("export PATH=\"/sdk/flutter/bin:$PATH\""));
    /// ```
    #[must_use]
    pub fn new(variables: &[(String, String)], paths: &[Utf8PathBuf]) -> Self {
        let mut bash = Vec::new();
        let mut fish = Vec::new();
        let mut powershell = Vec::new();

        for (name, value) in variables {
            bash.push(format!("export {name}=\"{}\"", escape_posix(value)));
            fish.push(format!("set -gx {name} \"{}\"", escape_fish(value)));
            powershell.push(format!("$env:{name} = \"{}\"", escape_powershell(value)));
        }
        for path in paths {
            bash.push(format!("export PATH=\"{}:$PATH\"", escape_posix(path.as_str())));
            fish.push(format!(
                "fish_add_path --prepend --path \"{}\"",
                escape_fish(path.as_str())
            ));
            powershell.push(format!(
                "$env:PATH = \"{}\" + [IO.Path]::PathSeparator + $env:PATH",
                escape_powershell(path.as_str())
            ));
        }

        Self {
            bash: bash.join("\n"),
            fish: fish.join("\n"),
            powershell: powershell.join("\n"),
        }
    }

    /// Format the snippet for display to the user.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!(
            concat!(
                "Add the following to your shell configuration:\n\n",
                "  # bash/zsh (~/.bashrc, ~/.zshrc)\n",
                "{}\n\n",
                "  # fish (~/.config/fish/config.fish)\n",
                "{}\n\n",
                "  # PowerShell ($PROFILE)\n",
                "{}"
            ),
            indent(&self.bash),
            indent(&self.fish),
            indent(&self.powershell)
        )
    }
}

/// Escape `value` for a double-quoted POSIX shell string.
fn escape_posix(value: &str) -> String {
    escape_with(value, &['\\', '"', '$', '`'], '\\')
}

/// Escape `value` for a double-quoted fish string.
fn escape_fish(value: &str) -> String {
    escape_with(value, &['\\', '"', '$'], '\\')
}

/// Escape `value` for a double-quoted PowerShell string.
fn escape_powershell(value: &str) -> String {
    escape_with(value, &['`', '"', '$'], '`')
}

fn escape_with(value: &str, special: &[char], escape: char) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(&ch) {
            escaped.push(escape);
        }
        escaped.push(ch);
    }
    escaped
}

fn indent(lines: &str) -> String {
    lines
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a success message after installation.
#[must_use]
pub fn success_message(version: &str, root: &Path, was_cached: bool) -> String {
    let how = if was_cached {
        "from cache"
    } else {
        "successfully"
    };
    format!("Installed Flutter {version} {how} at {}", root.display())
}

/// Configuration information for dry-run output.
///
/// # Example
///
/// ```
/// use flutter_installer::output::DryRunInfo;
/// use std::path::Path;
/// use flutter_installer::release::resolver::VersionRequest;
///
/// let request = VersionRequest::Latest;
/// let info = DryRunInfo {
///     manifest_url: "https://example.test/releases_macos.json",
///     channel: "stable",
///     request: &request,
///     release: None,
///     cache_root: Path::new("/opt/hostedtoolcache"),
///     scratch_base: Path::new("/runner/temp"),
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("latest"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Manifest URL that was consulted.
    pub manifest_url: &'a str,
    /// Requested channel.
    pub channel: &'a str,
    /// Requested version.
    pub request: &'a VersionRequest,
    /// The resolved release, when resolution ran.
    pub release: Option<&'a ResolvedRelease>,
    /// Tool cache root.
    pub cache_root: &'a Path,
    /// Base directory for scratch extraction directories.
    pub scratch_base: &'a Path,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Manifest: {}", self.manifest_url),
            format!("Channel: {}", self.channel),
            format!("Requested version: {}", self.request),
            format!("Tool cache: {}", self.cache_root.display()),
            format!("Scratch base: {}", self.scratch_base.display()),
        ];

        if let Some(release) = self.release {
            lines.push(String::new());
            lines.push(format!("Resolved version: {}", release.version()));
            lines.push(format!("Download URL: {}", release.download_url()));
        }

        lines.join("\n")
    }
}

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}
