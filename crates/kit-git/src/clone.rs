//! Rewriting of `git clone` install steps

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static GIT_CLONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgit\s+clone\b").expect("Invalid git clone regex"));

static BRANCH_PIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:--branch(?:=|\s+)|-b\s+)\S+").expect("Invalid branch pin regex")
});

static SINGLE_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+--single-branch\b").expect("Invalid single-branch regex"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&&|\|\||[;|\n]").expect("Invalid command separator regex"));

/// Remove branch/tag pins from a `git clone` command line.
///
/// Strips `--branch <ref>`, `--branch=<ref>`, `-b <ref>` and
/// `--single-branch` so the clone follows the remote's default HEAD. Only the
/// `git clone` commands of a chained line are touched; everything else is
/// returned unchanged.
pub fn strip_clone_pins(step: &str) -> String {
    if !GIT_CLONE.is_match(step) {
        return step.to_string();
    }

    let mut unpinned = String::with_capacity(step.len());
    let mut start = 0;
    for separator in SEPARATOR.find_iter(step) {
        unpinned.push_str(&unpin_command(&step[start..separator.start()]));
        unpinned.push_str(separator.as_str());
        start = separator.end();
    }
    unpinned.push_str(&unpin_command(&step[start..]));

    if unpinned != step {
        tracing::debug!(from = %step, to = %unpinned, "Stripped clone pins");
    }
    unpinned
}

fn unpin_command(command: &str) -> Cow<'_, str> {
    if !GIT_CLONE.is_match(command) {
        return Cow::Borrowed(command);
    }
    let unpinned = BRANCH_PIN.replace_all(command, "");
    Cow::Owned(SINGLE_BRANCH.replace_all(&unpinned, "").into_owned())
}
