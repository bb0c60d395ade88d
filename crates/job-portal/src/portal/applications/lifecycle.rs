//! Application status graph and the append-only timeline of status changes.
//!
//! The pipeline only moves forward: `pending < reviewing < shortlisted < interviewing < accepted`.
//! Employers may skip intermediate stages, may reject from any open state, and can never
//! reopen a terminal application. `withdrawn` is reserved for the applicant's withdrawal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::portal::actor::ActorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Shortlisted,
    Interviewing,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    const fn pipeline_rank(self) -> Option<u8> {
        match self {
            ApplicationStatus::Pending => Some(0),
            ApplicationStatus::Reviewing => Some(1),
            ApplicationStatus::Shortlisted => Some(2),
            ApplicationStatus::Interviewing => Some(3),
            ApplicationStatus::Accepted => Some(4),
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => None,
        }
    }

    /// Whether an employer may move an application from `self` to `next`.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        if self.is_terminal() {
            return false;
        }

        match next {
            ApplicationStatus::Withdrawn => false,
            ApplicationStatus::Rejected => true,
            _ => match (self.pipeline_rank(), next.pipeline_rank()) {
                (Some(current), Some(target)) => target > current,
                _ => false,
            },
        }
    }

    /// Whether the applicant may still pull the application.
    pub const fn can_withdraw(self) -> bool {
        !self.is_terminal()
    }

    pub fn next_statuses(self) -> Vec<ApplicationStatus> {
        Self::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: ApplicationStatus,
    pub actor: ActorId,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Ordered history of status changes; entries can be appended but never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline(Vec<TimelineEntry>);

impl Timeline {
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn latest(&self) -> Option<&TimelineEntry> {
        self.0.last()
    }

    pub(crate) fn append(&mut self, entry: TimelineEntry) {
        self.0.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn pipeline_moves_forward_and_may_skip_stages() {
        assert!(Pending.can_transition_to(Reviewing));
        assert!(Pending.can_transition_to(Shortlisted));
        assert!(Shortlisted.can_transition_to(Interviewing));
        assert!(Interviewing.can_transition_to(Accepted));
        assert!(Reviewing.can_transition_to(Accepted));
    }

    #[test]
    fn backward_and_self_moves_are_refused() {
        assert!(!Shortlisted.can_transition_to(Reviewing));
        assert!(!Interviewing.can_transition_to(Pending));
        for status in ApplicationStatus::ALL {
            assert!(!status.can_transition_to(status), "{status} -> {status}");
        }
    }

    #[test]
    fn rejection_is_open_from_every_non_terminal_state() {
        for status in [Pending, Reviewing, Shortlisted, Interviewing] {
            assert!(status.can_transition_to(Rejected), "{status} -> rejected");
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [Accepted, Rejected, Withdrawn] {
            assert!(status.is_terminal());
            assert!(status.next_statuses().is_empty(), "{status} has exits");
            assert!(!status.can_withdraw());
        }
    }

    #[test]
    fn withdrawal_is_not_an_employer_transition() {
        for status in ApplicationStatus::ALL {
            assert!(!status.can_transition_to(Withdrawn));
        }
        assert!(Interviewing.can_withdraw());
    }

    #[test]
    fn next_statuses_lists_reachable_states_in_order() {
        assert_eq!(
            Reviewing.next_statuses(),
            vec![Shortlisted, Interviewing, Accepted, Rejected]
        );
    }

    #[test]
    fn timeline_serializes_as_plain_list() {
        let mut timeline = Timeline::default();
        timeline.append(TimelineEntry {
            status: Reviewing,
            actor: ActorId::new("emp-1"),
            at: DateTime::<Utc>::UNIX_EPOCH,
            notes: None,
        });

        let value = serde_json::to_value(&timeline).expect("serializes");
        assert_eq!(value[0]["status"], "reviewing");
        assert_eq!(timeline.latest().map(|entry| entry.status), Some(Reviewing));
    }
}
