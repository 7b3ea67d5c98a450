//! Git command error type.

#[derive(Debug)]
pub enum GitError {
    /// A spawned git command exited non-zero.
    CommandFailed { command: String, detail: String },
    /// Git produced output we could not make sense of.
    Parse(String),
}

impl GitError {
    pub fn parse(msg: impl Into<String>) -> Self {
        GitError::Parse(msg.into())
    }
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::CommandFailed { command, detail } => {
                if detail.is_empty() {
                    write!(f, "`{command}` failed")
                } else {
                    write!(f, "`{command}` failed: {detail}")
                }
            }
            GitError::Parse(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for GitError {}
