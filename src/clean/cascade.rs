//! Fallout of a removal: detaching the references the removed code held and
//! re-evaluating the scopes of their targets.

use tracing::{debug, trace};

use crate::tree::{DeclId, GroupId, Program};

use super::Cleaner;

impl Cleaner<'_> {
    /// Drain the removed declaration's body references. A reference whose
    /// site the removed extent contains originates from code that no longer
    /// exists: detach it from its target and re-run the dispatcher over the
    /// target's enclosing scope. Each detachment may immediately make the
    /// target a zero-usage candidate that the re-entered dispatcher
    /// removes, which cascades further.
    pub(crate) fn propagate(&self, program: &mut Program, removed: DeclId) {
        let extent = program.decl(removed).span;
        let mut i = 0;
        while i < program.decl(removed).body_refs.len() {
            let usage = program.decl(removed).body_refs[i];
            if !extent.contains(program.usage_span(usage)) {
                i += 1;
                continue;
            }
            program.decl_mut(removed).body_refs.remove(i);
            if let Some(target) = program.detach_usage(usage) {
                trace!(
                    "detached {} from {}, re-checking its scope",
                    usage,
                    program.decl(target).display()
                );
                if !program.decl(target).is_removed() {
                    let scope = program.decl(target).scope;
                    self.clean_scope(program, scope);
                }
            }
            // the re-entered dispatcher may have reshaped this list
            i = 0;
        }
    }

    /// Type-reference updater: when a declaration was deleted because its
    /// declarator list emptied, the usage its declared type expression held
    /// is detached too, and the type's enclosing scope re-evaluated. This
    /// is what lets an import or a local class die once the last
    /// field or variable of that type disappears.
    pub(crate) fn detach_type_usage(&self, program: &mut Program, group: GroupId) {
        let Some(usage) = program.group(group).type_usage else {
            return;
        };
        if let Some(target) = program.detach_usage(usage) {
            debug!(
                "detached declared-type usage of {}",
                program.decl(target).display()
            );
            if !program.decl(target).is_removed() {
                let scope = program.decl(target).scope;
                self.clean_scope(program, scope);
            }
        }
    }
}
