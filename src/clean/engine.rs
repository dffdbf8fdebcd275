//! Per-kind removal decisions.
//!
//! `try_remove` is the one entry point: it decides eligibility for the
//! declaration it is handed and, on removal, deletes it from its container
//! and hands the fallout to the cascade. A declaration kept because it is
//! still used is recursed into instead; one kept by an exclusion or a
//! safety rule is left whole.

use tracing::{debug, trace};

use crate::tree::{
    DeclDetail, DeclId, DeclKind, GroupOwner, Initializer, Program, ScopeRef,
    SerializationSupport,
};

use super::exclusions::keeps_unused;
use super::Cleaner;

const OBJECT_INPUT_STREAM: &str = "java.io.ObjectInputStream";
const OBJECT_OUTPUT_STREAM: &str = "java.io.ObjectOutputStream";

/// Reserved version-identifier field of the serialization contract.
const SERIAL_VERSION_FIELD: &str = "serialVersionUID";

impl Cleaner<'_> {
    /// Evaluate one declaration for removal. Returns true when it was
    /// structurally deleted.
    pub(crate) fn try_remove(&self, program: &mut Program, id: DeclId) -> bool {
        if program.decl(id).is_removed() {
            return false;
        }
        let kind = program.decl(id).kind;
        match kind {
            DeclKind::Import => self.try_remove_import(program, id),
            DeclKind::Class
            | DeclKind::Interface
            | DeclKind::Enum
            | DeclKind::AnnotationType
            | DeclKind::LocalType => self.try_remove_type(program, id),
            DeclKind::Method => self.try_remove_method(program, id),
            DeclKind::Field | DeclKind::LocalVariable => {
                self.try_remove_declarator(program, id)
            }
        }
    }

    fn try_remove_import(&self, program: &mut Program, id: DeclId) -> bool {
        if program.usage_count(id) > 0 {
            return false;
        }
        if keeps_unused(&program.decl(id).markers) {
            return false;
        }
        debug!("removing unused import `{}`", program.decl(id).name);
        program.remove_decl(id);
        self.propagate(program, id);
        true
    }

    fn try_remove_type(&self, program: &mut Program, id: DeclId) -> bool {
        if !program.decl(id).scoped {
            self.recurse_into(program, id);
            return false;
        }
        if program.usage_count(id) > 0 {
            // a used type may still hold dead members
            self.recurse_into(program, id);
            return false;
        }
        if keeps_unused(&program.decl(id).markers) {
            trace!("keeping marker-excluded {}", program.decl(id).display());
            return false;
        }
        debug!("removing unused {}", program.decl(id).display());
        program.remove_decl(id);
        self.propagate(program, id);
        true
    }

    fn try_remove_method(&self, program: &mut Program, id: DeclId) -> bool {
        if !program.decl(id).scoped {
            self.recurse_into(program, id);
            return false;
        }
        if program.usage_count(id) > 0 {
            self.recurse_into(program, id);
            return false;
        }
        if keeps_unused(&program.decl(id).markers) {
            trace!("keeping marker-excluded {}", program.decl(id).display());
            return false;
        }
        if self.method_is_registry_excluded(program, id) {
            trace!("keeping registry-excluded {}", program.decl(id).display());
            return false;
        }
        if !self.config.ignore_serialization_contract_methods
            && is_serialization_hook(program, id)
        {
            trace!("keeping serialization hook `{}`", program.decl(id).name);
            return false;
        }
        debug!("removing unused method `{}`", program.decl(id).name);
        program.remove_decl(id);
        self.propagate(program, id);
        true
    }

    fn try_remove_declarator(&self, program: &mut Program, id: DeclId) -> bool {
        if !program.decl(id).scoped {
            return false;
        }
        if program.usage_count(id) > 0 {
            return false;
        }
        let decl = program.decl(id);
        let DeclDetail::Declarator(detail) = &decl.detail else {
            return false;
        };
        let group = detail.group;
        if keeps_unused(&decl.markers) || keeps_unused(&program.group(group).markers) {
            trace!("keeping marker-excluded {}", program.decl(id).display());
            return false;
        }
        if decl.kind == DeclKind::Field {
            if let GroupOwner::Members(owner) = program.group(group).owner {
                if self
                    .exclusions
                    .field_excluded(program.owner_name(owner), &decl.name)
                {
                    trace!("keeping registry-excluded field `{}`", decl.name);
                    return false;
                }
                // the version identifier is read reflectively, never in source
                if decl.name == SERIAL_VERSION_FIELD
                    && program.serialization_of(owner) != SerializationSupport::None
                {
                    trace!("keeping serialization version field");
                    return false;
                }
            }
        }
        if detail
            .initializer
            .as_ref()
            .is_some_and(Initializer::has_side_effects)
        {
            trace!("keeping {} with side-effecting initializer", decl.display());
            return false;
        }
        debug!("removing unused {}", program.decl(id).display());
        program.remove_decl(id);
        self.propagate(program, id);
        true
    }

    fn method_is_registry_excluded(&self, program: &Program, id: DeclId) -> bool {
        let decl = program.decl(id);
        let ScopeRef::Members(owner) = decl.scope else {
            return false;
        };
        let DeclDetail::Method(detail) = &decl.detail else {
            return false;
        };
        self.exclusions
            .method_excluded(program.owner_name(owner), &decl.name, &detail.params)
    }
}

/// Whether a method matches one of the special hook signatures of the
/// serialization contract its enclosing type implements.
fn is_serialization_hook(program: &Program, id: DeclId) -> bool {
    let decl = program.decl(id);
    let ScopeRef::Members(owner) = decl.scope else {
        return false;
    };
    let DeclDetail::Method(detail) = &decl.detail else {
        return false;
    };
    let params = &detail.params;
    match program.serialization_of(owner) {
        SerializationSupport::None => false,
        SerializationSupport::Serializable => match (decl.name.as_str(), params.len()) {
            ("readResolve" | "readObjectNoData" | "writeReplace", 0) => true,
            ("readObject", 1) => params[0] == OBJECT_INPUT_STREAM,
            ("writeObject", 1) => params[0] == OBJECT_OUTPUT_STREAM,
            _ => false,
        },
        SerializationSupport::Externalizable => {
            matches!((decl.name.as_str(), params.len()), ("readResolve" | "writeReplace", 0))
        }
    }
}
