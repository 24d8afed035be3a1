use std::time::{Duration, Instant};

use crate::models::{ClearOutcome, DatabaseInfo, Machine};

const NOTICE_TTL: Duration = Duration::from_secs(6);

/// What a confirmed delete will wipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    All,
    Machine(String),
}

impl DeleteTarget {
    /// Phrase the operator must type, verbatim, to arm the delete button.
    /// Distinct per operation; matching is case- and whitespace-sensitive.
    pub fn phrase(&self) -> &'static str {
        match self {
            DeleteTarget::All => "DELETE ALL",
            DeleteTarget::Machine(_) => "DELETE MACHINE",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DeleteTarget::All => {
                "This wipes EVERY location of EVERY machine. It cannot be undone.".to_string()
            }
            DeleteTarget::Machine(name) => {
                format!("This wipes every location reported by '{name}'. It cannot be undone.")
            }
        }
    }
}

/// Typed-confirmation gate in front of a destructive operation. This is the
/// UI half of the two-stage gate; the API call itself carries the fixed
/// token the server validates independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub target: DeleteTarget,
    pub typed: String,
    pub in_flight: bool,
}

impl ConfirmDialog {
    pub fn new(target: DeleteTarget) -> Self {
        Self {
            target,
            typed: String::new(),
            in_flight: false,
        }
    }

    /// Exact equality only; no trimming, no case folding
    pub fn is_armed(&self) -> bool {
        self.typed == self.target.phrase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient notification, auto-dismissed after a fixed interval
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    raised_at: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::raise(message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::raise(message, Severity::Error)
    }

    fn raise(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            raised_at: Instant::now(),
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.raised_at) >= NOTICE_TTL
    }
}

/// State for the admin view. Independent of the main `Store`: the panel
/// fetches its own machine list and database snapshot.
pub struct AdminState {
    pub machines: Vec<Machine>,
    pub database_info: Option<DatabaseInfo>,
    pub loading: bool,
    pub dialog: Option<ConfirmDialog>,
    pub notice: Option<Notice>,

    machines_seq: u64,
    info_seq: u64,
}

impl AdminState {
    pub fn new() -> Self {
        Self {
            machines: Vec::new(),
            database_info: None,
            loading: false,
            dialog: None,
            notice: None,
            machines_seq: 0,
            info_seq: 0,
        }
    }

    pub fn open_clear_all(&mut self) {
        self.dialog = Some(ConfirmDialog::new(DeleteTarget::All));
    }

    pub fn open_clear_machine(&mut self, name: impl Into<String>) {
        self.dialog = Some(ConfirmDialog::new(DeleteTarget::Machine(name.into())));
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog = None;
    }

    /// Mark the armed dialog as submitted; returns the target to wipe, or
    /// None when the gate is not satisfied.
    pub fn submit_dialog(&mut self) -> Option<DeleteTarget> {
        let dialog = self.dialog.as_mut()?;
        if !dialog.is_armed() || dialog.in_flight {
            return None;
        }
        dialog.in_flight = true;
        Some(dialog.target.clone())
    }

    /// Apply the outcome of a delete. Success closes the dialog, resets the
    /// typed text, and asks the caller to re-fetch (returns true). Failure
    /// leaves the dialog open for another attempt.
    pub fn finish_delete(&mut self, result: Result<ClearOutcome, String>) -> bool {
        match result {
            Ok(outcome) => {
                self.dialog = None;
                self.notice = Some(Notice::success(format!(
                    "{} ({} records removed)",
                    outcome.message, outcome.deleted_records
                )));
                true
            }
            Err(message) => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.in_flight = false;
                }
                self.notice = Some(Notice::error(message));
                false
            }
        }
    }

    pub fn begin_machines_load(&mut self) -> u64 {
        self.machines_seq += 1;
        self.loading = true;
        self.machines_seq
    }

    pub fn finish_machines_load(&mut self, seq: u64, result: Result<Vec<Machine>, String>) {
        if seq != self.machines_seq {
            return;
        }
        self.loading = false;
        match result {
            Ok(machines) => self.machines = machines,
            Err(message) => self.notice = Some(Notice::error(message)),
        }
    }

    pub fn begin_info_load(&mut self) -> u64 {
        self.info_seq += 1;
        self.info_seq
    }

    pub fn finish_info_load(&mut self, seq: u64, result: Result<DatabaseInfo, String>) {
        if seq != self.info_seq {
            return;
        }
        match result {
            Ok(info) => self.database_info = Some(info),
            Err(message) => self.notice = Some(Notice::error(message)),
        }
    }

    /// Drop the notice once its display interval has elapsed
    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expired(now)) {
            self.notice = None;
        }
    }
}

impl Default for AdminState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_phrase_keeps_the_gate_closed() {
        let mut dialog = ConfirmDialog::new(DeleteTarget::All);
        assert!(!dialog.is_armed());

        dialog.typed = "delete all".to_string();
        assert!(!dialog.is_armed());
        dialog.typed = "DELETE ALL ".to_string();
        assert!(!dialog.is_armed());
        dialog.typed = "DELETE ALL".to_string();
        assert!(dialog.is_armed());
    }

    #[test]
    fn each_operation_has_its_own_phrase() {
        assert_ne!(
            DeleteTarget::All.phrase(),
            DeleteTarget::Machine("LAPTOP-1".to_string()).phrase()
        );
    }

    #[test]
    fn submit_requires_an_armed_dialog() {
        let mut admin = AdminState::new();
        admin.open_clear_machine("LAPTOP-1");
        assert_eq!(admin.submit_dialog(), None);

        admin.dialog.as_mut().unwrap().typed = "DELETE MACHINE".to_string();
        assert_eq!(
            admin.submit_dialog(),
            Some(DeleteTarget::Machine("LAPTOP-1".to_string()))
        );
        // Already in flight, a second submit is refused
        assert_eq!(admin.submit_dialog(), None);
    }

    #[test]
    fn successful_delete_closes_and_resets_the_dialog() {
        let mut admin = AdminState::new();
        admin.open_clear_all();
        admin.dialog.as_mut().unwrap().typed = "DELETE ALL".to_string();
        admin.submit_dialog().unwrap();

        let refetch = admin.finish_delete(Ok(ClearOutcome {
            message: "database cleared".to_string(),
            deleted_records: 321,
        }));

        assert!(refetch);
        assert!(admin.dialog.is_none());
        let notice = admin.notice.unwrap();
        assert_eq!(notice.severity, Severity::Success);
        assert!(notice.message.contains("321"));
    }

    #[test]
    fn failed_delete_leaves_the_dialog_open() {
        let mut admin = AdminState::new();
        admin.open_clear_all();
        admin.dialog.as_mut().unwrap().typed = "DELETE ALL".to_string();
        admin.submit_dialog().unwrap();

        let refetch = admin.finish_delete(Err("Server error (status 500): locked".to_string()));

        assert!(!refetch);
        let dialog = admin.dialog.as_ref().unwrap();
        assert!(!dialog.in_flight);
        assert_eq!(dialog.typed, "DELETE ALL");
        assert_eq!(admin.notice.as_ref().unwrap().severity, Severity::Error);
    }

    #[test]
    fn stale_admin_fetches_are_dropped() {
        let mut admin = AdminState::new();
        let old = admin.begin_machines_load();
        let new = admin.begin_machines_load();

        admin.finish_machines_load(
            new,
            Ok(vec![Machine {
                machine_name: "LAPTOP-2".to_string(),
                count: 5,
                last_seen: None,
            }]),
        );
        admin.finish_machines_load(old, Ok(vec![]));

        assert_eq!(admin.machines.len(), 1);
        assert_eq!(admin.machines[0].machine_name, "LAPTOP-2");
    }

    #[test]
    fn notices_expire_after_the_display_interval() {
        let mut admin = AdminState::new();
        admin.notice = Some(Notice::success("done"));
        let raised = admin.notice.as_ref().unwrap().raised_at;

        admin.expire_notice(raised + Duration::from_secs(3));
        assert!(admin.notice.is_some());

        admin.expire_notice(raised + NOTICE_TTL);
        assert!(admin.notice.is_none());
    }
}
