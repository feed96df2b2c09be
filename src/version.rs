//! Build identification for `cropwised --version` and `GET /health`.
//!
//! `build.rs` records the git branch, commit and dirty flag; builds made
//! outside a git checkout (e.g. from a source tarball) report the package
//! version alone.

/// Crate version.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Branch the daemon was built from.
pub const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

/// Commit the daemon was built from.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

fn built_from_git() -> bool {
    // vergen emits `VERGEN_IDEMPOTENT_OUTPUT` placeholders when git is absent
    GIT_SHA != "unknown" && !GIT_SHA.starts_with("VERGEN_")
}

/// Uncommitted changes were present at build time.
pub fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

/// Version reported to operators, e.g. `0.1.0+main.abc1234` or
/// `0.1.0+main.abc1234.dirty`; plain `0.1.0` outside git.
pub fn version_string() -> String {
    if !built_from_git() {
        return PKG_VERSION.to_string();
    }
    let sha = &GIT_SHA[..7.min(GIT_SHA.len())];
    let dirty = if git_dirty() { ".dirty" } else { "" };
    format!("{PKG_VERSION}+{GIT_BRANCH}.{sha}{dirty}")
}
