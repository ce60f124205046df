//! Shell detection and rc-file snippets

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Shells whose rc files use `export VAR=...` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosixShell {
    Bash,
    Zsh,
}

/// The shell kit writes PATH/MANPATH configuration for.
///
/// Resolved once from `$SHELL`; everything else matches on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellKind {
    Posix(PosixShell),
    Fish,
    Unsupported(String),
}

impl ShellKind {
    /// Classify a shell by the basename of its executable path.
    pub fn from_shell_path(shell: &str) -> Self {
        let name = Path::new(shell)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(shell);

        match name {
            "bash" => ShellKind::Posix(PosixShell::Bash),
            "zsh" => ShellKind::Posix(PosixShell::Zsh),
            "fish" => ShellKind::Fish,
            other => ShellKind::Unsupported(other.to_string()),
        }
    }

    /// Classify the shell named by `$SHELL`.
    pub fn detect() -> Self {
        let shell = std::env::var("SHELL").unwrap_or_default();
        Self::from_shell_path(&shell)
    }

    /// Short display name.
    pub fn name(&self) -> &str {
        match self {
            ShellKind::Posix(PosixShell::Bash) => "bash",
            ShellKind::Posix(PosixShell::Zsh) => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::Unsupported(name) => name,
        }
    }

    /// Startup file for this shell relative to `home`.
    pub fn rc_path(&self, home: &Path) -> Result<PathBuf> {
        match self {
            ShellKind::Posix(PosixShell::Bash) => Ok(home.join(".bashrc")),
            ShellKind::Posix(PosixShell::Zsh) => Ok(home.join(".zshrc")),
            ShellKind::Fish => Ok(home.join(".config").join("fish").join("config.fish")),
            ShellKind::Unsupported(name) => Err(self.unsupported(name)),
        }
    }

    /// Lines prepending `bin` to `PATH` and `man` to `MANPATH`.
    pub fn path_snippet(&self, bin: &Path, man: &Path) -> Result<String> {
        let (bin, man) = (bin.display(), man.display());
        match self {
            ShellKind::Posix(_) => Ok(format!(
                "\nexport PATH=\"{bin}:$PATH\"\nexport MANPATH=\"{man}:$MANPATH\"\n"
            )),
            ShellKind::Fish => Ok(format!(
                "\nset -x PATH {bin} $PATH\nset -x MANPATH {man} $MANPATH\n"
            )),
            ShellKind::Unsupported(name) => Err(self.unsupported(name)),
        }
    }

    fn unsupported(&self, name: &str) -> Error {
        Error::UnsupportedShell {
            shell: if name.is_empty() {
                "<unset>".to_string()
            } else {
                name.to_string()
            },
        }
    }
}
