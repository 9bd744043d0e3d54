//! Path resolution for the shared `.claude` tree

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable that overrides root discovery
pub const ROOT_ENV: &str = "CONTEXT_DOCS_ROOT";

const CLAUDE_DIR: &str = ".claude";

/// Resolves every file attune reads or writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Root of the document tree; also holds config, state and the pool
    pub root: PathBuf,
}

impl Paths {
    /// Discover the root for the current process
    pub fn discover() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::resolve(
            std::env::var_os(ROOT_ENV),
            &cwd,
            dirs::home_dir(),
        ))
    }

    /// Resolution order: explicit override, nearest ancestor holding `.claude`,
    /// `~/.claude`, and finally `<cwd>/.claude` even if it does not exist.
    pub fn resolve(env_root: Option<OsString>, cwd: &Path, home: Option<PathBuf>) -> Self {
        if let Some(root) = env_root.filter(|r| !r.is_empty()) {
            return Self::from_root(root);
        }

        if let Some(found) = cwd
            .ancestors()
            .map(|dir| dir.join(CLAUDE_DIR))
            .find(|candidate| candidate.is_dir())
        {
            return Self::from_root(found);
        }

        if let Some(home_claude) = home.map(|h| h.join(CLAUDE_DIR)) {
            if home_claude.is_dir() {
                return Self::from_root(home_claude);
            }
        }

        Self::from_root(cwd.join(CLAUDE_DIR))
    }

    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Rule config (keywords, co-activation, pins, thresholds)
    pub fn config_file(&self) -> PathBuf {
        self.root.join("keywords.json")
    }

    pub fn attn_state_file(&self) -> PathBuf {
        self.root.join("attn_state.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join("attention_history.jsonl")
    }

    pub fn pool_dir(&self) -> PathBuf {
        self.root.join("pool")
    }

    pub fn pool_file(&self) -> PathBuf {
        self.pool_dir().join("instance_state.jsonl")
    }

    /// Body of a document, identified by its path relative to the root
    pub fn document(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".claude")).unwrap();

        let paths = Paths::resolve(Some(OsString::from("/srv/docs")), temp.path(), None);
        assert_eq!(paths.root, PathBuf::from("/srv/docs"));
    }

    #[test]
    fn test_empty_override_ignored() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::resolve(Some(OsString::new()), temp.path(), None);
        assert_eq!(paths.root, temp.path().join(".claude"));
    }

    #[test]
    fn test_walks_up_to_project_claude() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".claude")).unwrap();
        let nested = temp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let paths = Paths::resolve(None, &nested, None);
        assert_eq!(paths.root, temp.path().join(".claude"));
        assert!(paths.exists());
    }

    #[test]
    fn test_falls_back_to_home() {
        let project = tempfile::TempDir::new().unwrap();
        let home = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".claude")).unwrap();

        let paths = Paths::resolve(None, project.path(), Some(home.path().to_path_buf()));
        assert_eq!(paths.root, home.path().join(".claude"));
    }

    #[test]
    fn test_nothing_found_uses_cwd() {
        let project = tempfile::TempDir::new().unwrap();
        let paths = Paths::resolve(None, project.path(), None);
        assert_eq!(paths.root, project.path().join(".claude"));
        assert!(!paths.exists());
    }

    #[test]
    fn test_file_layout() {
        let paths = Paths::from_root("/p/.claude");
        assert!(paths.config_file().ends_with(".claude/keywords.json"));
        assert!(paths.attn_state_file().ends_with("attn_state.json"));
        assert!(paths.history_file().ends_with("attention_history.jsonl"));
        assert!(paths.pool_file().ends_with("pool/instance_state.jsonl"));
        assert_eq!(
            paths.document("agents/auth.md"),
            PathBuf::from("/p/.claude/agents/auth.md")
        );
    }
}
