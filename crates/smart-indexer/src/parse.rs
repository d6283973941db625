//! Shared parsing infrastructure: the `LanguageParser` trait, tree-sitter
//! helpers, and scope tracking used by every per-language parser under
//! `languages/`.
//!
//! ## Declaration vs usage
//!
//! Every identifier tree-sitter hands us is emitted as a `Symbol` if and
//! only if it sits in a declaration context, else as a `Reference`.
//! Declaration contexts (exhaustive): the name slot of a
//! function/class/interface/type-alias/enum declaration; the bound
//! identifier of a variable declarator; the key of a class method/property
//! definition (non-computed); the key of an object literal property
//! (non-computed); an import specifier's local binding; a function
//! parameter binding. Member-access identifiers (`a.b.c` -> `b`, `c`) are
//! always references, and type-only references in annotations count as
//! references too.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ImportInfo, ReExportInfo, Reference, Symbol};

/// Non-fatal issue surfaced alongside an otherwise-usable parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: u32,
    pub character: u32,
    pub severity: DiagnosticSeverity,
}

/// Raw output of the Worker for one file. The Background Index wraps this
/// plus a freshly computed content hash/mtime into a `FileShard` before
/// persisting; the parser itself is ignorant of persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexedFileResult {
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
    pub imports: Vec<ImportInfo>,
    pub re_exports: Vec<ReExportInfo>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One language's tree-sitter grammar plus symbol/reference extraction.
pub trait LanguageParser {
    /// Parse `source` (the contents of `uri`) and lower it to symbols,
    /// references, imports and re-exports. Never panics or returns `Err` on
    /// syntactically broken input — a partial result with `diagnostics` set
    /// is always returned instead.
    fn extract(&self, uri: &str, source: &str, max_depth: usize) -> IndexedFileResult;
}

/// A frame of the scope stack. Function/method/arrow-function frames carry
/// the set of names bound directly inside them (parameters and
/// `let`/`const`/`var` declarators); class/interface/module frames exist
/// only to contribute a name segment to `scope_id` and never make a
/// reference `is_local` — a name bound at module or class top level isn't
/// shadowing, it's the same declaration.
#[derive(Debug, Clone)]
struct ScopeFrame {
    name: String,
    is_function: bool,
    declared: std::collections::HashSet<String>,
}

/// Tracks the chain of enclosing function/method/class names while walking
/// a file, used to compute `Reference::scope_id` and `Reference::is_local`.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_function(&mut self, name: impl Into<String>) {
        self.frames.push(ScopeFrame {
            name: name.into(),
            is_function: true,
            declared: Default::default(),
        });
    }

    pub fn push_container(&mut self, name: impl Into<String>) {
        self.frames.push(ScopeFrame {
            name: name.into(),
            is_function: false,
            declared: Default::default(),
        });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Record that `name` is bound directly inside the innermost frame.
    pub fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.declared.insert(name.to_string());
        }
    }

    /// Slash-joined chain of enclosing frame names, or `None` at module
    /// top-level.
    pub fn scope_id(&self) -> Option<String> {
        if self.frames.is_empty() {
            None
        } else {
            Some(
                self.frames
                    .iter()
                    .map(|f| f.name.as_str())
                    .collect::<Vec<_>>()
                    .join("/"),
            )
        }
    }

    /// True iff `name` is bound by a declaration in some enclosing
    /// *function* frame (container frames for classes/interfaces/modules do
    /// not count).
    pub fn is_local(&self, name: &str) -> bool {
        self.frames
            .iter()
            .any(|f| f.is_function && f.declared.contains(name))
    }
}

/// Depth-first search for the first direct or indirect child of `kind`.
pub fn find_child_by_kind<'a>(
    node: &tree_sitter::Node<'a>,
    kind: &str,
) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == kind {
            return Some(child);
        }
    }
    None
}

/// Convert a tree-sitter node's byte-range start into a 0-based
/// line/UTF-16-character position, matching the LSP numeric contract.
pub fn node_to_position(source: &str, node: &tree_sitter::Node) -> (u32, u32) {
    let start = node.start_position();
    // tree-sitter defines `column` as the byte offset from the start of the
    // row, so `start_byte - column` is the row's start byte regardless of
    // the source's line-ending style (re-deriving it from `source.lines()`
    // strips `\r` and throws CRLF files off by one byte per preceding line).
    let line_start_byte = node.start_byte() - start.column;
    let line = source.get(line_start_byte..).unwrap_or("");
    let byte_col = start.column.min(line.len());
    let utf16_col = line[..byte_col].encode_utf16().count() as u32;
    (start.row as u32, utf16_col)
}

/// A short, stable hash over a function's parameter names/arity, used to
/// disambiguate overloads that otherwise share a stable symbol ID.
pub fn signature_hash(param_names: &[&str]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(param_names.len().to_le_bytes());
    for name in param_names {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    hex_prefix(&digest, 8)
}

pub(crate) fn hex_prefix(bytes: &[u8], chars: usize) -> String {
    let mut s = String::with_capacity(chars);
    for byte in bytes {
        if s.len() >= chars {
            break;
        }
        s.push_str(&format!("{byte:02x}"));
    }
    s.truncate(chars);
    s
}

/// Dispatch to the right `LanguageParser` by file extension and extract.
/// Unsupported extensions produce an empty result rather than an error,
/// matching the "never throws" contract.
pub fn extract_symbols(uri: &str, source: &str, max_depth: usize) -> IndexedFileResult {
    match crate::languages::parser_for_uri(uri) {
        Some(parser) => parser.extract(uri, source, max_depth),
        None => IndexedFileResult::default(),
    }
}

/// True if `path`'s extension marks it as TypeScript/JavaScript source the
/// indexer understands.
pub fn is_supported_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext, "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_stack_builds_slash_joined_id() {
        let mut scope = ScopeStack::new();
        scope.push_container("UserService");
        scope.push_function("save");
        assert_eq!(scope.scope_id().as_deref(), Some("UserService/save"));
    }

    #[test]
    fn scope_stack_is_local_only_inside_function_frames() {
        let mut scope = ScopeStack::new();
        scope.push_container("UserService");
        scope.declare("ignoredAtContainerScope");
        scope.push_function("save");
        scope.declare("x");
        assert!(scope.is_local("x"));
        assert!(!scope.is_local("ignoredAtContainerScope"));
    }

    #[test]
    fn scope_stack_pop_restores_parent_scope_id() {
        let mut scope = ScopeStack::new();
        scope.push_function("outer");
        scope.push_function("inner");
        scope.pop();
        assert_eq!(scope.scope_id().as_deref(), Some("outer"));
    }

    #[test]
    fn signature_hash_is_stable_for_same_params() {
        assert_eq!(signature_hash(&["a", "b"]), signature_hash(&["a", "b"]));
        assert_ne!(signature_hash(&["a", "b"]), signature_hash(&["a"]));
    }

    #[test]
    fn unsupported_extension_yields_empty_result() {
        let result = extract_symbols("file:///a.rs", "fn main() {}", 500);
        assert!(result.symbols.is_empty());
        assert!(result.references.is_empty());
    }
}
