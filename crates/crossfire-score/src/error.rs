use crossfire_registry::{Notice, NoticeKind};

/// Errors from reading run reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("{path}: I/O error: {message}")]
    Io { path: String, message: String },

    #[error("report of {login} unreadable: {path}: {message}")]
    Unreadable {
        login: String,
        path: String,
        message: String,
    },
}

impl ReportError {
    pub fn to_notice(&self) -> Notice {
        let subject = match self {
            Self::Io { path, .. } => path.clone(),
            Self::Unreadable { login, .. } => login.clone(),
        };
        Notice {
            kind: NoticeKind::ReportUnreadable,
            subject,
            raw: None,
            message: self.to_string(),
        }
    }
}

/// Errors from the scoring pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error(
        "shot {from} -> {to} is ambiguous: {matches} runs of {input:?} {expected:?} in the report of {to}"
    )]
    AmbiguousShotMatch {
        from: String,
        to: String,
        input: String,
        expected: String,
        matches: usize,
    },
}

impl ScoringError {
    pub fn to_notice(&self) -> Notice {
        let Self::AmbiguousShotMatch {
            from,
            input,
            expected,
            ..
        } = self;
        Notice {
            kind: NoticeKind::AmbiguousShotMatch,
            subject: from.clone(),
            raw: Some(format!("{input} {expected}")),
            message: self.to_string(),
        }
    }
}
