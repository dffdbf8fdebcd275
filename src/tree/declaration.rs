use serde::{Deserialize, Serialize};

use super::usage::UsageId;
use super::{BlockId, GroupId, Member};

/// Index of a declaration in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclId(pub(crate) u32);

impl DeclId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for DeclId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Lexical extent of a node, in abstract source offsets.
///
/// Offsets are assigned monotonically during tree construction; the cleaner
/// only ever asks whether one extent contains another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Kind of declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    Import,
    Class,
    Interface,
    Enum,
    AnnotationType,
    Method,
    /// A single field declarator inside a type body.
    Field,
    /// A single declarator of a local-variable statement.
    LocalVariable,
    /// A type declared in statement position.
    LocalType,
}

impl DeclKind {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclKind::Class
                | DeclKind::Interface
                | DeclKind::Enum
                | DeclKind::AnnotationType
                | DeclKind::LocalType
        )
    }

    pub fn is_declarator(&self) -> bool {
        matches!(self, DeclKind::Field | DeclKind::LocalVariable)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeclKind::Import => "import",
            DeclKind::Class => "class",
            DeclKind::Interface => "interface",
            DeclKind::Enum => "enum",
            DeclKind::AnnotationType => "annotation type",
            DeclKind::Method => "method",
            DeclKind::Field => "field",
            DeclKind::LocalVariable => "local variable",
            DeclKind::LocalType => "local type",
        }
    }
}

/// Serialization contract a type participates in, as computed by the
/// external symbol resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SerializationSupport {
    #[default]
    None,
    Serializable,
    Externalizable,
}

/// Annotation-like metadata attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Resolved simple name of the annotation type.
    pub name: String,
    pub values: Vec<MarkerValue>,
}

impl Marker {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: MarkerValue) -> Self {
        self.values.push(value);
        self
    }
}

/// Argument value of a marker, flattened to what exclusion matching needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerValue {
    Str(String),
    Array(Vec<MarkerValue>),
    Other,
}

/// Side-effecting expression forms a declarator initializer may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Call,
    Construct,
    ClassLiteral,
}

/// Facts about a declarator initializer relevant to removal safety.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initializer {
    pub effects: Vec<EffectKind>,
}

impl Initializer {
    pub fn has_side_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// The single container a declaration is listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRef {
    UnitImports,
    UnitTypes,
    /// Member list of a type declaration.
    Members(DeclId),
    /// Statement list of a block (local types).
    Block(BlockId),
    /// Declarator list of a field or local-variable group.
    Group(GroupId),
}

/// A declaration in the resolved tree
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Unique identifier
    pub id: DeclId,

    /// Simple name (e.g., "serialVersionUID")
    pub name: String,

    /// Kind of declaration
    pub kind: DeclKind,

    /// Lexical extent of the whole definition
    pub span: Span,

    /// Whether visibility is restricted to the innermost enclosing scope
    pub scoped: bool,

    /// Markers attached to this declaration
    pub markers: Vec<Marker>,

    /// Container this declaration is listed in
    pub scope: ScopeRef,

    /// Reference sites inside this declaration's extent that point at
    /// other declarations
    pub body_refs: Vec<UsageId>,

    pub(crate) removed: bool,

    pub(crate) detail: DeclDetail,
}

impl Declaration {
    /// Whether this declaration has been structurally deleted.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn display(&self) -> String {
        format!("{} `{}`", self.kind.display_name(), self.name)
    }
}

/// Kind-specific payload of a declaration.
#[derive(Debug, Clone)]
pub(crate) enum DeclDetail {
    Import,
    Type(TypeDetail),
    Method(MethodDetail),
    Declarator(DeclaratorDetail),
}

#[derive(Debug, Clone)]
pub(crate) struct TypeDetail {
    pub members: Vec<Member>,
    pub qualified_name: Option<String>,
    pub serialization: SerializationSupport,
}

#[derive(Debug, Clone)]
pub(crate) struct MethodDetail {
    /// Resolved parameter type names, in declaration order.
    pub params: Vec<String>,
    pub body: Option<BlockId>,
}

#[derive(Debug, Clone)]
pub(crate) struct DeclaratorDetail {
    pub group: GroupId,
    pub initializer: Option<Initializer>,
}

/// A declarator list: a field declaration in a type body, or a
/// multi-declarator local-variable statement in a block. Not itself a
/// declaration; it is deleted as a unit once its last declarator goes.
#[derive(Debug, Clone)]
pub struct DeclGroup {
    pub id: GroupId,

    /// Shared visibility of the declarators.
    pub scoped: bool,

    /// Markers on the group itself (a declarator inherits these).
    pub markers: Vec<Marker>,

    pub(crate) declarators: Vec<DeclId>,

    /// The usage the declared type expression holds on a resolved type
    /// declaration. `None` for built-in or unresolved types.
    pub(crate) type_usage: Option<UsageId>,

    pub(crate) owner: GroupOwner,

    pub(crate) removed: bool,
}

impl DeclGroup {
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupOwner {
    Members(DeclId),
    Block(BlockId),
}
