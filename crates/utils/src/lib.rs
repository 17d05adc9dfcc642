/// Directories skipped by default: their own line and everything below them.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["__pycache__", "build", "dist", "node_modules"];

/// Files skipped by default, matched by exact name.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    "package-lock.json",
    "pnpm-lock.yaml",
    "tsconfig.json",
    "yarn.lock",
];

/// Returns `true` for dot-prefixed names (dotfiles and dot-directories).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
