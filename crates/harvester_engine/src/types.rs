use std::fmt;

use harvester_core::{CompletionReason, ProgressView, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// Selector or element not present.
    NotFound,
    /// Element went away between lookup and use.
    Detached,
    /// The page-side script threw or returned an unexpected shape.
    Script,
    Timeout,
    /// The driver can no longer reach the page.
    Disconnected,
    /// The automation protocol itself failed.
    Protocol,
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverErrorKind::NotFound => write!(f, "not found"),
            DriverErrorKind::Detached => write!(f, "element detached"),
            DriverErrorKind::Script => write!(f, "script failure"),
            DriverErrorKind::Timeout => write!(f, "timeout"),
            DriverErrorKind::Disconnected => write!(f, "driver disconnected"),
            DriverErrorKind::Protocol => write!(f, "protocol error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Transient failures skip the current step; anything else ends the run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            DriverErrorKind::NotFound
                | DriverErrorKind::Detached
                | DriverErrorKind::Script
                | DriverErrorKind::Timeout
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// The driver failed fatally; carries everything accepted before the failure.
    #[error("page driver failed at round {round}: {source}")]
    Driver {
        #[source]
        source: DriverError,
        partial: Vec<Record>,
        round: u64,
    },
}

impl HarvestError {
    pub fn partial(&self) -> &[Record] {
        match self {
            HarvestError::Driver { partial, .. } => partial,
        }
    }

    pub fn into_partial(self) -> Vec<Record> {
        match self {
            HarvestError::Driver { partial, .. } => partial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub records: Vec<Record>,
    pub reason: CompletionReason,
    pub rounds: u64,
    pub target_count_hint: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HarvestEvent {
    Started {
        table_selector: String,
        target_count_hint: Option<u64>,
    },
    Progress(ProgressView),
    RoundSkipped {
        round: u64,
        error: DriverError,
    },
    Finished {
        reason: CompletionReason,
        accepted: usize,
        rounds: u64,
    },
}
