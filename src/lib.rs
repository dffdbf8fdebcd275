//! deadsweep - cascading removal of unused declarations from resolved Java source trees
//!
//! This library takes a program tree whose symbol bindings are already
//! resolved (every declaration carries the list of sites that reference it)
//! and deletes declarations that are provably unreachable, cascading until
//! no scope changes.
//!
//! # Architecture
//!
//! The pass consists of:
//! 1. **Tree model** - declarations, usage sites and containers in flat arenas
//! 2. **Exclusion registry** - keep-unused markers and user-supplied signatures
//! 3. **Decision engine** - per-kind eligibility and safety rules
//! 4. **Cascade propagation** - detaching references held by removed code
//! 5. **Traversal dispatch** - re-entrant container walks and shape cleanups
//!
//! Parsing, symbol resolution and writing trees back to source are external
//! collaborators; the tree is mutated in place and handed back.

pub mod clean;
pub mod config;
pub mod tree;

pub use clean::{Cleaner, ExclusionRegistry};
pub use config::{CleanConfig, ConfigError};
pub use tree::{
    BlockId, DeclGroup, DeclId, DeclKind, Declaration, EffectKind, GroupId, Initializer, Marker,
    MarkerValue, Member, Program, ScopeRef, SerializationSupport, Span, Stmt, TreeBuilder,
    UsageId,
};
