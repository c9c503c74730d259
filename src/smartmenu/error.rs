use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("access denied: {0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    BadParams(String),
    #[error("select a workspace first")]
    NoWorkspace,
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

impl MenuError {
    /// Wire code used in `{"ok": false, "error": {"code": ...}}` replies.
    pub fn code(&self) -> &'static str {
        match self {
            MenuError::NotFound(_) => "not_found",
            MenuError::Forbidden(_) => "forbidden",
            MenuError::BadParams(_) => "bad_params",
            MenuError::NoWorkspace => "no_workspace",
            MenuError::Db(_) => "db_failed",
        }
    }
}

pub type MenuResult<T> = Result<T, MenuError>;
