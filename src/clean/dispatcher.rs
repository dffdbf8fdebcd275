//! Top-level traversal over containers.
//!
//! Every scan is index-based over an ordered sequence whose length is
//! re-read after each step; any size change restarts the scan from the
//! start, because a removal may have been reported back up from an
//! arbitrarily nested cascade. The dispatcher also owns the cleanups that
//! are container-shape concerns rather than liveness decisions: emptied
//! declarator lists, dead local-type statements, and (behind a flag)
//! structurally empty statements.

use tracing::debug;

use crate::tree::{BlockId, DeclId, DeclKind, GroupId, GroupOwner, Member, Program, Stmt};

use super::exclusions::keeps_unused;
use super::Cleaner;

impl Cleaner<'_> {
    pub(crate) fn clean_unit(&self, program: &mut Program) {
        self.clean_imports(program);
        self.clean_types(program);
    }

    pub(crate) fn clean_imports(&self, program: &mut Program) {
        if !self.config.remove_unused_imports {
            return;
        }
        let mut i = 0;
        while i < program.imports.len() {
            let id = program.imports[i];
            let before = program.imports.len();
            self.try_remove(program, id);
            if program.imports.len() != before {
                i = 0;
            } else {
                i += 1;
            }
        }
    }

    pub(crate) fn clean_types(&self, program: &mut Program) {
        let mut i = 0;
        while i < program.types.len() {
            let id = program.types[i];
            let before = program.types.len();
            if self.kind_enabled(program.decl(id).kind) && program.decl(id).scoped {
                self.try_remove(program, id);
            } else {
                self.recurse_into(program, id);
            }
            if program.types.len() != before {
                i = 0;
            } else {
                i += 1;
            }
        }
    }

    /// Walk a type's member list. Candidates go to the decision engine;
    /// everything else is recursed into, since a kept member may still hold
    /// dead declarations of its own.
    pub(crate) fn clean_members(&self, program: &mut Program, ty: DeclId) {
        let mut i = 0;
        loop {
            let Some(member) = program.members(ty).get(i).copied() else {
                break;
            };
            let before = program.members(ty).len();
            match member {
                Member::Decl(id) => {
                    if program.decl(id).is_removed() {
                        i += 1;
                        continue;
                    }
                    if self.kind_enabled(program.decl(id).kind) && program.decl(id).scoped {
                        self.try_remove(program, id);
                    } else {
                        self.recurse_into(program, id);
                    }
                }
                Member::Field(group) => self.clean_group(program, group),
            }
            if program.members(ty).len() != before {
                i = 0;
            } else {
                i += 1;
            }
        }
    }

    /// Walk a declarator list, collapsing the whole group once it empties.
    /// Also the cascade re-entry point for declarator targets.
    pub(crate) fn clean_group(&self, program: &mut Program, group: GroupId) {
        if program.group(group).is_removed() {
            return;
        }
        let enabled = match program.group(group).owner {
            GroupOwner::Members(_) => {
                self.config.remove_unused_fields && program.group(group).scoped
            }
            GroupOwner::Block(_) => self.config.remove_unused_variables,
        };
        if !enabled {
            return;
        }
        let mut i = 0;
        loop {
            let Some(id) = program.declarators(group).get(i).copied() else {
                break;
            };
            let before = program.declarators(group).len();
            self.try_remove(program, id);
            if program.declarators(group).len() != before {
                i = 0;
            } else {
                i += 1;
            }
        }
        if program.declarators(group).is_empty() {
            self.collapse_group(program, group);
        }
    }

    /// Delete a group whose last declarator is gone, detach the usage its
    /// declared type held, and re-scan the owning member list.
    fn collapse_group(&self, program: &mut Program, group: GroupId) {
        let owner = program.group(group).owner;
        program.remove_group(group);
        debug!("collapsing emptied declaration group");
        self.detach_type_usage(program, group);
        if let GroupOwner::Members(ty) = owner {
            if !program.decl(ty).is_removed() {
                self.clean_members(program, ty);
            }
        }
    }

    /// Walk a statement list: declarator statements and local types are
    /// candidates, control flow is recursed into.
    pub(crate) fn clean_block(&self, program: &mut Program, block: BlockId) {
        let mut i = 0;
        loop {
            let Some(stmt) = program.stmts(block).get(i).copied() else {
                break;
            };
            let before = program.stmts(block).len();
            match stmt {
                Stmt::LocalVars(group) => self.clean_group(program, group),
                Stmt::LocalType(id) => self.clean_local_type(program, id),
                Stmt::If {
                    then_block,
                    else_block,
                } => {
                    self.clean_block(program, then_block);
                    if let Some(else_block) = else_block {
                        self.clean_block(program, else_block);
                    }
                }
                Stmt::Loop(body) | Stmt::Nested(body) => self.clean_block(program, body),
                Stmt::Expr | Stmt::Empty => {}
            }
            if self.config.prune_empty_statements
                && stmt_is_empty(program, stmt)
                && program.stmts(block).get(i).copied() == Some(stmt)
            {
                program.remove_stmt_at(block, i);
            }
            if program.stmts(block).len() != before {
                i = 0;
            } else {
                i += 1;
            }
        }
    }

    /// A local type is recursed into first (its members are candidates
    /// either way), then its declaring statement is deleted once the type
    /// has no usages left.
    fn clean_local_type(&self, program: &mut Program, id: DeclId) {
        if program.decl(id).is_removed() {
            return;
        }
        self.clean_members(program, id);
        if program.decl(id).is_removed() {
            return;
        }
        if program.usage_count(id) == 0 && !keeps_unused(&program.decl(id).markers) {
            debug!("removing unused local type `{}`", program.decl(id).name);
            program.remove_decl(id);
            self.propagate(program, id);
        }
    }

    /// Recurse into a kept declaration: a type's members and a method's
    /// body are still candidate scopes.
    pub(crate) fn recurse_into(&self, program: &mut Program, id: DeclId) {
        let kind = program.decl(id).kind;
        match kind {
            kind if kind.is_type() => self.clean_members(program, id),
            DeclKind::Method => {
                if let Some(body) = program.method_body(id) {
                    self.clean_block(program, body);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn kind_enabled(&self, kind: DeclKind) -> bool {
        match kind {
            DeclKind::Import => self.config.remove_unused_imports,
            DeclKind::Class => self.config.remove_unused_classes,
            DeclKind::Interface => self.config.remove_unused_interfaces,
            DeclKind::Enum => self.config.remove_unused_enumerations,
            DeclKind::AnnotationType => self.config.remove_unused_annotation_types,
            DeclKind::Method => self.config.remove_unused_methods,
            DeclKind::Field => self.config.remove_unused_fields,
            DeclKind::LocalVariable => self.config.remove_unused_variables,
            // local-type statements are cleaned unconditionally
            DeclKind::LocalType => true,
        }
    }
}

fn stmt_is_empty(program: &Program, stmt: Stmt) -> bool {
    match stmt {
        Stmt::Empty => true,
        Stmt::If {
            then_block,
            else_block,
        } => {
            program.stmts(then_block).is_empty()
                && else_block.map_or(true, |b| program.stmts(b).is_empty())
        }
        Stmt::Loop(body) | Stmt::Nested(body) => program.stmts(body).is_empty(),
        Stmt::LocalVars(_) | Stmt::LocalType(_) | Stmt::Expr => false,
    }
}
