//! smart-indexer: workspace-scale symbol indexing for TypeScript/JavaScript.
//!
//! Two-tier index (dynamic in-memory buffers + background sharded-on-disk
//! index) composed behind a merged query facade, fed by a tree-sitter based
//! worker that lowers source text into typed symbol/reference records.

use serde::{Deserialize, Serialize};

pub mod background_index;
pub mod config;
pub mod dynamic_index;
pub mod git;
pub mod languages;
pub mod merged_index;
pub mod orchestrator;
pub mod parse;
pub mod search;
pub mod shard;
pub mod stats;
pub mod watch;

pub use background_index::BackgroundIndex;
pub use config::Config;
pub use dynamic_index::DynamicIndex;
pub use merged_index::{MergedIndex, QueryableIndex};
pub use parse::{extract_symbols, Diagnostic, DiagnosticSeverity, IndexedFileResult};
pub use shard::{FileShard, ShardStore};

/// The current shard format version. Bumping this invalidates every shard on
/// disk on the next startup (they are discarded and re-indexed, never
/// migrated in place).
pub const SHARD_VERSION: u32 = 1;

/// The kind of symbol a declaration-context identifier introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Class,
    Interface,
    TypeAlias,
    Enum,
    Function,
    Method,
    Property,
    Variable,
    Parameter,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::TypeAlias => "typeAlias",
            SymbolKind::Enum => "enum",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Variable => "variable",
            SymbolKind::Parameter => "parameter",
        };
        write!(f, "{s}")
    }
}

/// Framework-specific role recognized on specific call-expression shapes
/// (e.g. NgRx `createAction`/`createEffect`). Absence of recognition must
/// never alter the neutral symbol/reference output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainMetadataKind {
    Action,
    Effect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMetadata {
    pub kind: DomainMetadataKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_string: Option<String>,
}

/// A symbol extracted from a declaration context (see `parse` module docs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub uri: String,
    /// 0-based line.
    pub line: u32,
    /// 0-based UTF-16 code-unit offset.
    pub character: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_metadata: Option<DomainMetadata>,
}

impl Symbol {
    /// The fully-qualified name `container_name.name`, or just `name` at
    /// module scope. Used as the identity key for definition lookups.
    pub fn qualified_name(&self) -> String {
        match &self.container_name {
            Some(container) => format!("{container}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A usage of an identifier that is not itself a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub uri: String,
    pub line: u32,
    pub character: u32,
    /// Slash-joined chain of enclosing function/method/class names, e.g.
    /// `"UserService/save"`. `None` at module top-level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    /// True iff the referenced name is shadowed by a declaration in some
    /// frame strictly inside the current module (as opposed to a module- or
    /// class-top-level declaration, or an unresolved/external name).
    pub is_local: bool,
}

/// A single named import: `import { a, b as c } from "module"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    pub from_module: String,
    pub imported: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub uri: String,
    pub line: u32,
}

/// A re-export: `export { a, b as c } from "module"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReExportInfo {
    pub from_module: String,
    pub imported: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub uri: String,
    pub line: u32,
}

/// Compute the stable symbol ID: robust to line shifts because it is keyed
/// on the file's content hash prefix plus the symbol's container-qualified
/// name, not its position.
///
/// `"<fileHash[0..8]>:<containerPath>.<name>[#<signatureHash>]"`
pub fn stable_symbol_id(
    file_hash: &str,
    container_path: Option<&str>,
    name: &str,
    signature_hash: Option<&str>,
) -> String {
    let prefix = &file_hash[..file_hash.len().min(8)];
    let qualified = match container_path {
        Some(container) if !container.is_empty() => format!("{container}.{name}"),
        _ => name.to_string(),
    };
    match signature_hash {
        Some(sig) => format!("{prefix}:{qualified}#{sig}"),
        None => format!("{prefix}:{qualified}"),
    }
}

/// Errors surfaced by any component of the index. Per the error-handling
/// design, only `ConfigInvalid` is allowed to abort the LSP session; every
/// other variant degrades to an empty/partial result plus a log line.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("failed to parse {uri}: {message}")]
    ParseError { uri: String, message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("corrupt shard for {uri}: {reason}")]
    ShardCorrupt { uri: String, reason: String },

    #[error("skipped {uri}: {reason}")]
    OutOfBudget { uri: String, reason: String },

    #[error("query cancelled")]
    QueryCancelled,

    #[error("internal assertion failed: {0}")]
    InternalAssertFailed(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_qualified_name_with_container() {
        let symbol = Symbol {
            name: "save".to_string(),
            kind: SymbolKind::Method,
            uri: "file:///a.ts".to_string(),
            line: 1,
            character: 2,
            container_name: Some("UserService".to_string()),
            signature_hash: None,
            domain_metadata: None,
        };
        assert_eq!(symbol.qualified_name(), "UserService.save");
    }

    #[test]
    fn symbol_qualified_name_without_container() {
        let symbol = Symbol {
            name: "helper".to_string(),
            kind: SymbolKind::Function,
            uri: "file:///a.ts".to_string(),
            line: 0,
            character: 0,
            container_name: None,
            signature_hash: None,
            domain_metadata: None,
        };
        assert_eq!(symbol.qualified_name(), "helper");
    }

    #[test]
    fn stable_symbol_id_is_insensitive_to_line_position() {
        let id = stable_symbol_id("abcdef0123456789", Some("UserService"), "save", None);
        assert_eq!(id, "abcdef01:UserService.save");
    }

    #[test]
    fn stable_symbol_id_includes_signature_hash_for_overloads() {
        let id = stable_symbol_id("abcdef0123456789", None, "save", Some("a1b2"));
        assert_eq!(id, "abcdef01:save#a1b2");
    }

    #[test]
    fn symbol_kind_display() {
        assert_eq!(SymbolKind::TypeAlias.to_string(), "typeAlias");
        assert_eq!(SymbolKind::Method.to_string(), "method");
    }
}
