use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::declaration::{DeclId, Span};

/// Index of a usage site in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageId(pub(crate) u32);

impl UsageId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for UsageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// A reference occurrence that resolves to exactly one declaration.
///
/// The site is owned by the tree position where it textually occurs; which
/// declaration it resolves to is carried by the [`UsageIndex`], never by the
/// site itself.
#[derive(Debug, Clone)]
pub struct UsageSite {
    pub id: UsageId,
    pub span: Span,
}

/// Forward and reverse resolution indexes.
///
/// Two explicit maps instead of bidirectional pointers: the forward map from
/// a declaration to its live usage sites, and the reverse map from a usage
/// site to the single declaration it targets. Detachment removes the entry
/// from both sides in one operation, so the two views cannot drift apart.
#[derive(Debug, Default)]
pub struct UsageIndex {
    by_decl: HashMap<DeclId, Vec<UsageId>>,
    target: HashMap<UsageId, DeclId>,
}

impl UsageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `usage` resolves to `decl`.
    pub fn attach(&mut self, usage: UsageId, decl: DeclId) {
        self.by_decl.entry(decl).or_default().push(usage);
        self.target.insert(usage, decl);
    }

    /// Sever `usage` from the declaration it targets, returning that
    /// declaration. Idempotent: a site detached earlier yields `None`.
    pub fn detach(&mut self, usage: UsageId) -> Option<DeclId> {
        let decl = self.target.remove(&usage)?;
        if let Some(usages) = self.by_decl.get_mut(&decl) {
            usages.retain(|&u| u != usage);
        }
        Some(decl)
    }

    /// Live usage sites of a declaration.
    pub fn usages_of(&self, decl: DeclId) -> &[UsageId] {
        self.by_decl.get(&decl).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn usage_count(&self, decl: DeclId) -> usize {
        self.by_decl.get(&decl).map_or(0, Vec::len)
    }

    pub fn target_of(&self, usage: UsageId) -> Option<DeclId> {
        self.target.get(&usage).copied()
    }

    /// Drop every edge touching `decl`: its remaining incoming usage sites
    /// and the forward entry itself. Called when the declaration is
    /// destroyed.
    pub fn forget_decl(&mut self, decl: DeclId) {
        if let Some(usages) = self.by_decl.remove(&decl) {
            for usage in usages {
                self.target.remove(&usage);
            }
        }
    }
}
