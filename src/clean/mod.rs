//! The cleaning pass: traversal, per-kind decisions, cascade propagation.

mod cascade;
mod dispatcher;
mod engine;
pub mod exclusions;

pub use exclusions::{ExclusionRegistry, FieldExclusion, MethodExclusion};

use crate::config::{CleanConfig, ConfigError};
use crate::tree::{Program, ScopeRef};

/// The dead-declaration elimination pass.
///
/// Holds the configuration by reference and the exclusion registry parsed
/// from it; all tree state lives in the [`Program`] handed to
/// [`Cleaner::clean`]. The pass is single-threaded and synchronous: one
/// traversal mutates the shared tree depth-first until no scope changes.
#[derive(Debug)]
pub struct Cleaner<'a> {
    pub(crate) config: &'a CleanConfig,
    pub(crate) exclusions: ExclusionRegistry,
}

impl<'a> Cleaner<'a> {
    /// Build a cleaner, parsing the configured exclusion lists eagerly so
    /// malformed entries fail here rather than mid-traversal.
    pub fn new(config: &'a CleanConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            exclusions: ExclusionRegistry::from_config(config)?,
        })
    }

    /// Run the pass to its fixpoint, mutating the tree in place. After it
    /// returns, every scope-restricted declaration still present either has
    /// a live usage, matched an exclusion, or is protected by a safety
    /// rule.
    pub fn clean(&self, program: &mut Program) {
        self.clean_unit(program);
    }

    /// Re-enter the dispatcher over a single scope; the cascade's way back
    /// into the traversal. Scopes whose owner is already gone are dead code
    /// themselves and are skipped.
    pub(crate) fn clean_scope(&self, program: &mut Program, scope: ScopeRef) {
        match scope {
            ScopeRef::UnitImports => self.clean_imports(program),
            ScopeRef::UnitTypes => self.clean_types(program),
            ScopeRef::Members(ty) => {
                if !program.decl(ty).is_removed() {
                    self.clean_members(program, ty);
                }
            }
            ScopeRef::Block(block) => self.clean_block(program, block),
            ScopeRef::Group(group) => self.clean_group(program, group),
        }
    }
}
