//! Tab state machine plus the session-wide admin unlock flag and submit lock.

use std::fmt;

use crate::inventory::SubmitLock;
use crate::models::ActionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Take,
    Return,
    Admin,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Take, Tab::Return, Tab::Admin];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Take => "Take",
            Tab::Return => "Return",
            Tab::Admin => "Admin",
        }
    }

    /// Workflow direction for the form tabs.
    pub fn action(self) -> Option<ActionType> {
        match self {
            Tab::Take => Some(ActionType::Take),
            Tab::Return => Some(ActionType::Return),
            Tab::Admin => None,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What the caller must do after asking for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Refresh the directory and render this tab.
    Enter(Tab),
    /// Admin is still locked; prompt for the passphrase. The tab is unchanged.
    PassphraseRequired,
}

/// Shared secret gating the admin tab. This is a placeholder for a real
/// credential check, not a security boundary.
#[derive(Clone)]
pub struct AdminGate {
    passphrase: String,
}

impl AdminGate {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn accepts(&self, attempt: &str) -> bool {
        !self.passphrase.is_empty() && attempt == self.passphrase
    }
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate").finish_non_exhaustive()
    }
}

/// Explicit session state: the active tab, whether admin has been unlocked,
/// and the single in-flight lock. All mutation goes through these methods.
#[derive(Debug)]
pub struct Session {
    tab: Tab,
    admin_unlocked: bool,
    gate: AdminGate,
    lock: SubmitLock,
}

impl Session {
    pub fn new(gate: AdminGate) -> Self {
        Self {
            tab: Tab::Take,
            admin_unlocked: false,
            gate,
            lock: SubmitLock::new(),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn admin_unlocked(&self) -> bool {
        self.admin_unlocked
    }

    pub fn lock(&self) -> &SubmitLock {
        &self.lock
    }

    /// Move to `target` unless it is the admin tab and the session is still
    /// locked.
    pub fn request(&mut self, target: Tab) -> Transition {
        if target == Tab::Admin && !self.admin_unlocked {
            tracing::debug!("admin tab requested while locked");
            return Transition::PassphraseRequired;
        }
        tracing::debug!(from = %self.tab, to = %target, "tab transition");
        self.tab = target;
        Transition::Enter(target)
    }

    /// Check a passphrase attempt. A match unlocks admin for the rest of the
    /// session and moves there.
    pub fn unlock(&mut self, attempt: &str) -> Option<Transition> {
        if !self.gate.accepts(attempt) {
            tracing::warn!("rejected admin passphrase");
            return None;
        }
        tracing::info!("admin unlocked for this session");
        self.admin_unlocked = true;
        Some(self.request(Tab::Admin))
    }
}
