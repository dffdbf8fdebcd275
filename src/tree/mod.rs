//! The resolved program tree the cleaner mutates in place.
//!
//! Declarations, declarator groups, blocks and usage sites live in flat
//! arenas addressed by copyable ids; containers (the unit lists, member
//! lists, statement lists, declarator lists) hold ids in source order.
//! Removal is always a structural deletion from exactly one container plus a
//! tombstone on the arena entry, so in-flight traversals stay valid.

mod builder;
mod declaration;
mod usage;

pub use builder::TreeBuilder;
pub use declaration::{
    DeclGroup, DeclId, DeclKind, Declaration, EffectKind, Initializer, Marker, MarkerValue,
    ScopeRef, SerializationSupport, Span,
};
pub use usage::{UsageId, UsageIndex, UsageSite};

pub(crate) use declaration::{DeclDetail, GroupOwner};
use serde::{Deserialize, Serialize};

/// Index of a declarator group in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub(crate) u32);

impl GroupId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a statement block in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Entry in a type's member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    /// A method or nested type.
    Decl(DeclId),
    /// A field declaration (declarator group).
    Field(GroupId),
}

/// An ordered statement list.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub(crate) stmts: Vec<Stmt>,
}

/// Statement in a block, reduced to the shapes the cleaner acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stmt {
    /// A local-variable declaration statement.
    LocalVars(GroupId),
    /// A type declared in statement position.
    LocalType(DeclId),
    If {
        then_block: BlockId,
        else_block: Option<BlockId>,
    },
    Loop(BlockId),
    /// A nested bare block.
    Nested(BlockId),
    /// Any other statement; the usage sites it owns are tracked separately.
    Expr,
    Empty,
}

/// A parsed, symbol-resolved program. Built once by [`TreeBuilder`], then
/// only ever shrunk by the cleaning pass.
#[derive(Debug)]
pub struct Program {
    pub(crate) decls: Vec<Declaration>,
    pub(crate) groups: Vec<DeclGroup>,
    pub(crate) blocks: Vec<Block>,
    pub(crate) usages: Vec<UsageSite>,
    pub(crate) imports: Vec<DeclId>,
    pub(crate) types: Vec<DeclId>,
    pub(crate) index: UsageIndex,
}

impl Program {
    /// Get a declaration by id. Panics on a stale id, which indicates a
    /// broken precondition in the resolver that built the tree.
    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    pub(crate) fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    pub fn group(&self, id: GroupId) -> &DeclGroup {
        &self.groups[id.index()]
    }

    /// Top-of-unit import declarations still present.
    pub fn imports(&self) -> &[DeclId] {
        &self.imports
    }

    /// Top-level type declarations still present.
    pub fn types(&self) -> &[DeclId] {
        &self.types
    }

    /// Member list of a type declaration.
    pub fn members(&self, ty: DeclId) -> &[Member] {
        match &self.decl(ty).detail {
            DeclDetail::Type(detail) => &detail.members,
            _ => &[],
        }
    }

    /// Declarators still present in a group.
    pub fn declarators(&self, group: GroupId) -> &[DeclId] {
        &self.groups[group.index()].declarators
    }

    /// Statements still present in a block.
    pub fn stmts(&self, block: BlockId) -> &[Stmt] {
        &self.blocks[block.index()].stmts
    }

    /// Body block of a method declaration.
    pub fn method_body(&self, method: DeclId) -> Option<BlockId> {
        match &self.decl(method).detail {
            DeclDetail::Method(detail) => detail.body,
            _ => None,
        }
    }

    /// Number of live usage sites recorded against a declaration.
    pub fn usage_count(&self, decl: DeclId) -> usize {
        self.index.usage_count(decl)
    }

    pub fn usages_of(&self, decl: DeclId) -> &[UsageId] {
        self.index.usages_of(decl)
    }

    pub(crate) fn usage_span(&self, usage: UsageId) -> Span {
        self.usages[usage.index()].span
    }

    pub(crate) fn detach_usage(&mut self, usage: UsageId) -> Option<DeclId> {
        self.index.detach(usage)
    }

    /// Name used for exclusion matching of a member's owner type: the
    /// qualified name when the resolver supplied one, the simple name
    /// otherwise.
    pub(crate) fn owner_name(&self, ty: DeclId) -> &str {
        let decl = self.decl(ty);
        match &decl.detail {
            DeclDetail::Type(detail) => detail.qualified_name.as_deref().unwrap_or(&decl.name),
            _ => &decl.name,
        }
    }

    pub(crate) fn serialization_of(&self, ty: DeclId) -> SerializationSupport {
        match &self.decl(ty).detail {
            DeclDetail::Type(detail) => detail.serialization,
            _ => SerializationSupport::None,
        }
    }

    /// Structurally delete a declaration from the one container that holds
    /// it, tombstone the arena entry, and sever every remaining index edge.
    pub(crate) fn remove_decl(&mut self, id: DeclId) {
        let scope = self.decls[id.index()].scope;
        match scope {
            ScopeRef::UnitImports => self.imports.retain(|&d| d != id),
            ScopeRef::UnitTypes => self.types.retain(|&d| d != id),
            ScopeRef::Members(ty) => {
                if let DeclDetail::Type(detail) = &mut self.decls[ty.index()].detail {
                    detail.members.retain(|m| !matches!(m, Member::Decl(d) if *d == id));
                }
            }
            ScopeRef::Block(block) => {
                self.blocks[block.index()]
                    .stmts
                    .retain(|s| !matches!(s, Stmt::LocalType(d) if *d == id));
            }
            ScopeRef::Group(group) => {
                self.groups[group.index()].declarators.retain(|&d| d != id);
            }
        }
        self.decls[id.index()].removed = true;
        self.index.forget_decl(id);
    }

    /// Structurally delete an emptied declarator group from its owner.
    pub(crate) fn remove_group(&mut self, id: GroupId) {
        let owner = self.groups[id.index()].owner;
        match owner {
            GroupOwner::Members(ty) => {
                if let DeclDetail::Type(detail) = &mut self.decls[ty.index()].detail {
                    detail.members.retain(|m| !matches!(m, Member::Field(g) if *g == id));
                }
            }
            GroupOwner::Block(block) => {
                self.blocks[block.index()]
                    .stmts
                    .retain(|s| !matches!(s, Stmt::LocalVars(g) if *g == id));
            }
        }
        self.groups[id.index()].removed = true;
    }

    pub(crate) fn remove_stmt_at(&mut self, block: BlockId, at: usize) {
        self.blocks[block.index()].stmts.remove(at);
    }
}
