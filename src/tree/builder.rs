use tracing::trace;

use super::declaration::{
    DeclDetail, DeclGroup, DeclId, DeclKind, Declaration, DeclaratorDetail, EffectKind,
    GroupOwner, Initializer, Marker, MethodDetail, ScopeRef, SerializationSupport, Span,
    TypeDetail,
};
use super::usage::{UsageId, UsageIndex, UsageSite};
use super::{Block, BlockId, GroupId, Member, Program, Stmt};

/// Builder for assembling a resolved program tree.
///
/// This is the surface the external resolver targets, and what the test
/// suites use to stage inputs. It keeps the bookkeeping the cleaner relies
/// on consistent by construction: spans nest with the `begin_*`/`end_*`
/// bracketing, every usage site lands in the forward/reverse index, and a
/// reference is recorded as a body reference of every declaration whose
/// extent encloses it.
///
/// Bracketing mistakes (an `end_type` without an open type, a declarator
/// outside a group) are programming errors in the resolver and panic.
pub struct TreeBuilder {
    decls: Vec<Declaration>,
    groups: Vec<DeclGroup>,
    blocks: Vec<Block>,
    usages: Vec<UsageSite>,
    imports: Vec<DeclId>,
    types: Vec<DeclId>,
    index: UsageIndex,

    cursor: u32,
    ctx: Vec<Ctx>,
    open_decls: Vec<DeclId>,
    markable: Vec<Markable>,
    /// Innermost declaration enclosing each block, for late references.
    block_owner: Vec<Option<DeclId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Type(DeclId),
    Block(BlockId),
    Group(GroupId),
}

#[derive(Debug, Clone, Copy)]
enum Markable {
    Decl(DeclId),
    Group(GroupId),
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            decls: Vec::new(),
            groups: Vec::new(),
            blocks: Vec::new(),
            usages: Vec::new(),
            imports: Vec::new(),
            types: Vec::new(),
            index: UsageIndex::new(),
            cursor: 0,
            ctx: Vec::new(),
            open_decls: Vec::new(),
            markable: Vec::new(),
            block_owner: Vec::new(),
        }
    }

    fn bump(&mut self) -> u32 {
        let at = self.cursor;
        self.cursor += 1;
        at
    }

    fn alloc_decl(&mut self, decl: Declaration) -> DeclId {
        let id = decl.id;
        self.decls.push(decl);
        id
    }

    fn next_decl_id(&self) -> DeclId {
        DeclId(self.decls.len() as u32)
    }

    fn alloc_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::default());
        self.block_owner.push(self.open_decls.last().copied());
        id
    }

    /// Add an import declaration at the unit level.
    pub fn import(&mut self, name: &str) -> DeclId {
        assert!(self.ctx.is_empty(), "imports live at the unit level");
        let at = self.bump();
        let id = self.next_decl_id();
        self.alloc_decl(Declaration {
            id,
            name: name.to_string(),
            kind: DeclKind::Import,
            span: Span::new(at, at),
            scoped: false,
            markers: Vec::new(),
            scope: ScopeRef::UnitImports,
            body_refs: Vec::new(),
            removed: false,
            detail: DeclDetail::Import,
        });
        self.imports.push(id);
        id
    }

    /// Open a type declaration. At the unit level or inside a type body the
    /// given kind is kept; in statement position the declaration becomes a
    /// local type.
    pub fn begin_type(&mut self, kind: DeclKind, name: &str, scoped: bool) -> DeclId {
        assert!(kind.is_type(), "begin_type takes a type kind");
        let start = self.bump();
        let id = self.next_decl_id();
        let (scope, kind) = match self.ctx.last().copied() {
            None => (ScopeRef::UnitTypes, kind),
            Some(Ctx::Type(ty)) => (ScopeRef::Members(ty), kind),
            Some(Ctx::Block(block)) => (ScopeRef::Block(block), DeclKind::LocalType),
            Some(Ctx::Group(_)) => panic!("a declarator group cannot contain a type"),
        };
        self.alloc_decl(Declaration {
            id,
            name: name.to_string(),
            kind,
            span: Span::new(start, start),
            scoped,
            markers: Vec::new(),
            scope,
            body_refs: Vec::new(),
            removed: false,
            detail: DeclDetail::Type(TypeDetail {
                members: Vec::new(),
                qualified_name: None,
                serialization: SerializationSupport::None,
            }),
        });
        match scope {
            ScopeRef::UnitTypes => self.types.push(id),
            ScopeRef::Members(ty) => self.push_member(ty, Member::Decl(id)),
            ScopeRef::Block(block) => self.blocks[block.index()].stmts.push(Stmt::LocalType(id)),
            _ => unreachable!(),
        }
        self.ctx.push(Ctx::Type(id));
        self.open_decls.push(id);
        self.markable.push(Markable::Decl(id));
        id
    }

    pub fn end_type(&mut self) {
        let Some(Ctx::Type(id)) = self.ctx.pop() else {
            panic!("end_type without an open type");
        };
        self.close_decl(id);
    }

    /// Open a method declaration inside the current type body. The body
    /// block is created immediately and becomes the current statement
    /// context.
    pub fn begin_method(&mut self, name: &str, scoped: bool, params: &[&str]) -> DeclId {
        let Some(Ctx::Type(ty)) = self.ctx.last().copied() else {
            panic!("methods live in a type body");
        };
        let start = self.bump();
        let body = self.alloc_block();
        let id = self.next_decl_id();
        self.alloc_decl(Declaration {
            id,
            name: name.to_string(),
            kind: DeclKind::Method,
            span: Span::new(start, start),
            scoped,
            markers: Vec::new(),
            scope: ScopeRef::Members(ty),
            body_refs: Vec::new(),
            removed: false,
            detail: DeclDetail::Method(MethodDetail {
                params: params.iter().map(|p| p.to_string()).collect(),
                body: Some(body),
            }),
        });
        self.push_member(ty, Member::Decl(id));
        self.block_owner[body.index()] = Some(id);
        self.ctx.push(Ctx::Block(body));
        self.open_decls.push(id);
        self.markable.push(Markable::Decl(id));
        id
    }

    pub fn end_method(&mut self) {
        let Some(Ctx::Block(_)) = self.ctx.pop() else {
            panic!("end_method without an open method body");
        };
        let id = self
            .open_decls
            .last()
            .copied()
            .expect("end_method without an open method");
        assert_eq!(self.decls[id.index()].kind, DeclKind::Method);
        self.close_decl(id);
    }

    /// Open a declarator group: a field declaration in a type body, a
    /// local-variable statement in a block. `type_target` is the
    /// declaration the declared type expression resolves to, if any; the
    /// usage it holds is recorded against that declaration immediately.
    pub fn begin_group(&mut self, scoped: bool, type_target: Option<DeclId>) -> GroupId {
        let owner = match self.ctx.last().copied() {
            Some(Ctx::Type(ty)) => GroupOwner::Members(ty),
            Some(Ctx::Block(block)) => GroupOwner::Block(block),
            _ => panic!("declarator groups live in a type body or a block"),
        };
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(DeclGroup {
            id,
            scoped,
            markers: Vec::new(),
            declarators: Vec::new(),
            type_usage: None,
            owner,
            removed: false,
        });
        match owner {
            GroupOwner::Members(ty) => self.push_member(ty, Member::Field(id)),
            GroupOwner::Block(block) => {
                self.blocks[block.index()].stmts.push(Stmt::LocalVars(id))
            }
        }
        if let Some(target) = type_target {
            let usage = self.usage(target);
            self.groups[id.index()].type_usage = Some(usage);
        }
        self.ctx.push(Ctx::Group(id));
        self.markable.push(Markable::Group(id));
        id
    }

    pub fn end_group(&mut self) {
        let Some(Ctx::Group(_)) = self.ctx.pop() else {
            panic!("end_group without an open group");
        };
        self.markable.pop();
    }

    /// Open a declarator in the current group.
    pub fn begin_declarator(&mut self, name: &str) -> DeclId {
        let Some(Ctx::Group(group)) = self.ctx.last().copied() else {
            panic!("declarators live in a declarator group");
        };
        let start = self.bump();
        let id = self.next_decl_id();
        let kind = match self.groups[group.index()].owner {
            GroupOwner::Members(_) => DeclKind::Field,
            GroupOwner::Block(_) => DeclKind::LocalVariable,
        };
        self.alloc_decl(Declaration {
            id,
            name: name.to_string(),
            kind,
            span: Span::new(start, start),
            scoped: self.groups[group.index()].scoped,
            markers: Vec::new(),
            scope: ScopeRef::Group(group),
            body_refs: Vec::new(),
            removed: false,
            detail: DeclDetail::Declarator(DeclaratorDetail {
                group,
                initializer: None,
            }),
        });
        self.groups[group.index()].declarators.push(id);
        self.open_decls.push(id);
        self.markable.push(Markable::Decl(id));
        id
    }

    pub fn end_declarator(&mut self) {
        let id = self
            .open_decls
            .last()
            .copied()
            .expect("end_declarator without an open declarator");
        assert!(self.decls[id.index()].kind.is_declarator());
        self.close_decl(id);
    }

    /// Shorthand for a declarator with no initializer references.
    pub fn declarator(&mut self, name: &str) -> DeclId {
        let id = self.begin_declarator(name);
        self.end_declarator();
        id
    }

    /// Record a side-effecting expression form in the open declarator's
    /// initializer.
    pub fn init_effect(&mut self, effect: EffectKind) {
        let id = self
            .open_decls
            .last()
            .copied()
            .expect("init_effect outside a declarator");
        let decl = &mut self.decls[id.index()];
        assert!(decl.kind.is_declarator(), "init_effect outside a declarator");
        let DeclDetail::Declarator(detail) = &mut decl.detail else {
            unreachable!();
        };
        detail
            .initializer
            .get_or_insert_with(Initializer::default)
            .effects
            .push(effect);
    }

    /// Record a reference occurrence at the current position, resolved to
    /// `target`. The site is indexed both ways and becomes a body reference
    /// of every declaration currently enclosing it.
    pub fn usage(&mut self, target: DeclId) -> UsageId {
        let at = self.bump();
        let id = UsageId(self.usages.len() as u32);
        self.usages.push(UsageSite {
            id,
            span: Span::new(at, at),
        });
        self.index.attach(id, target);
        for &open in &self.open_decls {
            self.decls[open.index()].body_refs.push(id);
        }
        trace!("usage {} -> {}", id, target);
        id
    }

    /// Record a reference occurring inside an already-closed declaration,
    /// resolved to `target`. This is how a resolver registers forward
    /// references (mutual recursion, a call to a method declared later).
    pub fn late_usage(&mut self, owner: DeclId, target: DeclId) -> UsageId {
        let at = self.decls[owner.index()].span.start;
        let id = UsageId(self.usages.len() as u32);
        self.usages.push(UsageSite {
            id,
            span: Span::new(at, at),
        });
        self.index.attach(id, target);
        let mut current = Some(owner);
        while let Some(decl) = current {
            self.decls[decl.index()].body_refs.push(id);
            current = self.enclosing_decl(decl);
        }
        trace!("late usage {} in {} -> {}", id, owner, target);
        id
    }

    fn enclosing_decl(&self, id: DeclId) -> Option<DeclId> {
        match self.decls[id.index()].scope {
            ScopeRef::UnitImports | ScopeRef::UnitTypes => None,
            ScopeRef::Members(ty) => Some(ty),
            ScopeRef::Block(block) => self.block_owner[block.index()],
            ScopeRef::Group(group) => match self.groups[group.index()].owner {
                GroupOwner::Members(ty) => Some(ty),
                GroupOwner::Block(block) => self.block_owner[block.index()],
            },
        }
    }

    /// Attach a marker to the innermost open declaration or group.
    pub fn marker(&mut self, marker: Marker) {
        match self.markable.last() {
            Some(Markable::Decl(id)) => self.decls[id.index()].markers.push(marker),
            Some(Markable::Group(id)) => self.groups[id.index()].markers.push(marker),
            None => panic!("marker without an open declaration"),
        }
    }

    /// Set the serialization contract of the innermost open type.
    pub fn serialization(&mut self, support: SerializationSupport) {
        let ty = self.innermost_open_type();
        let DeclDetail::Type(detail) = &mut self.decls[ty.index()].detail else {
            unreachable!();
        };
        detail.serialization = support;
    }

    /// Set the qualified name of the innermost open type.
    pub fn qualified_name(&mut self, name: &str) {
        let ty = self.innermost_open_type();
        let DeclDetail::Type(detail) = &mut self.decls[ty.index()].detail else {
            unreachable!();
        };
        detail.qualified_name = Some(name.to_string());
    }

    /// Open an `if` statement; the then-branch becomes the current block.
    pub fn begin_if(&mut self) -> BlockId {
        let block = self.current_block("if statements live in a block");
        let then_block = self.alloc_block();
        self.blocks[block.index()].stmts.push(Stmt::If {
            then_block,
            else_block: None,
        });
        self.ctx.push(Ctx::Block(then_block));
        then_block
    }

    pub fn end_if(&mut self) {
        let Some(Ctx::Block(_)) = self.ctx.pop() else {
            panic!("end_if without an open branch");
        };
    }

    /// Attach an else-branch to the most recent `if` in the current block.
    pub fn begin_else(&mut self) -> BlockId {
        let block = self.current_block("else branches live in a block");
        let else_block = self.alloc_block();
        let stmt = self.blocks[block.index()]
            .stmts
            .iter_mut()
            .rev()
            .find(|s| matches!(s, Stmt::If { .. }))
            .expect("begin_else without a preceding if");
        let Stmt::If {
            else_block: slot, ..
        } = stmt
        else {
            unreachable!();
        };
        assert!(slot.is_none(), "if already has an else branch");
        *slot = Some(else_block);
        self.ctx.push(Ctx::Block(else_block));
        else_block
    }

    pub fn end_else(&mut self) {
        self.end_if();
    }

    pub fn begin_loop(&mut self) -> BlockId {
        let block = self.current_block("loops live in a block");
        let body = self.alloc_block();
        self.blocks[block.index()].stmts.push(Stmt::Loop(body));
        self.ctx.push(Ctx::Block(body));
        body
    }

    pub fn end_loop(&mut self) {
        let Some(Ctx::Block(_)) = self.ctx.pop() else {
            panic!("end_loop without an open loop body");
        };
    }

    pub fn begin_block(&mut self) -> BlockId {
        let block = self.current_block("nested blocks live in a block");
        let nested = self.alloc_block();
        self.blocks[block.index()].stmts.push(Stmt::Nested(nested));
        self.ctx.push(Ctx::Block(nested));
        nested
    }

    pub fn end_block(&mut self) {
        let Some(Ctx::Block(_)) = self.ctx.pop() else {
            panic!("end_block without an open block");
        };
    }

    /// Add an opaque expression statement to the current block.
    pub fn expr_stmt(&mut self) {
        let block = self.current_block("expression statements live in a block");
        self.blocks[block.index()].stmts.push(Stmt::Expr);
    }

    /// Add an empty statement to the current block.
    pub fn empty_stmt(&mut self) {
        let block = self.current_block("empty statements live in a block");
        self.blocks[block.index()].stmts.push(Stmt::Empty);
    }

    /// Finish construction. Panics if any `begin_*` is still open.
    pub fn finish(self) -> Program {
        assert!(self.ctx.is_empty(), "unclosed builder context");
        assert!(self.open_decls.is_empty(), "unclosed declaration");
        Program {
            decls: self.decls,
            groups: self.groups,
            blocks: self.blocks,
            usages: self.usages,
            imports: self.imports,
            types: self.types,
            index: self.index,
        }
    }

    fn close_decl(&mut self, id: DeclId) {
        let popped = self.open_decls.pop();
        assert_eq!(popped, Some(id), "mismatched declaration nesting");
        self.markable.pop();
        let end = self.bump();
        self.decls[id.index()].span.end = end;
    }

    fn push_member(&mut self, ty: DeclId, member: Member) {
        let DeclDetail::Type(detail) = &mut self.decls[ty.index()].detail else {
            panic!("member pushed onto a non-type declaration");
        };
        detail.members.push(member);
    }

    fn current_block(&self, context: &str) -> BlockId {
        match self.ctx.last() {
            Some(Ctx::Block(block)) => *block,
            _ => panic!("{context}"),
        }
    }

    fn innermost_open_type(&self) -> DeclId {
        self.open_decls
            .iter()
            .rev()
            .copied()
            .find(|id| self.decls[id.index()].kind.is_type())
            .expect("no open type declaration")
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
