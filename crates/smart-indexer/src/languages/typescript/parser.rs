//! Symbol and reference extraction from TypeScript/TSX source using
//! tree-sitter.

use std::cell::RefCell;

use crate::parse::{
    find_child_by_kind, is_supported_source_file, node_to_position, signature_hash, Diagnostic,
    DiagnosticSeverity, IndexedFileResult, LanguageParser, ScopeStack,
};
use crate::{DomainMetadata, DomainMetadataKind, ImportInfo, ReExportInfo, Reference, Symbol, SymbolKind};

// Thread-local parser reuse - avoids creating a new parser per file.
thread_local! {
    static TS_PARSER: RefCell<Option<tree_sitter::Parser>> = const { RefCell::new(None) };
    static TSX_PARSER: RefCell<Option<tree_sitter::Parser>> = const { RefCell::new(None) };
}

pub struct TypeScriptParser;

impl LanguageParser for TypeScriptParser {
    fn extract(&self, uri: &str, source: &str, max_depth: usize) -> IndexedFileResult {
        let is_tsx = uri.ends_with(".tsx");
        let parser_cell = if is_tsx { &TSX_PARSER } else { &TS_PARSER };

        parser_cell.with(|parser_opt| {
            let mut parser_ref = parser_opt.borrow_mut();

            if parser_ref.is_none() {
                let mut parser = tree_sitter::Parser::new();
                let language = if is_tsx {
                    tree_sitter_typescript::LANGUAGE_TSX.into()
                } else {
                    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
                };
                match parser.set_language(&language) {
                    Ok(_) => *parser_ref = Some(parser),
                    Err(e) => {
                        tracing::error!(
                            "failed to load {} grammar: {e}",
                            if is_tsx { "TSX" } else { "TypeScript" }
                        );
                        return IndexedFileResult::default();
                    }
                }
            }

            let parser = match parser_ref.as_mut() {
                Some(p) => p,
                None => return IndexedFileResult::default(),
            };

            let tree = match parser.parse(source, None) {
                Some(tree) => tree,
                None => {
                    tracing::warn!("failed to parse {uri}");
                    return IndexedFileResult::default();
                }
            };

            let mut result = IndexedFileResult::default();
            collect_syntax_errors(&tree.root_node(), source, &mut result);

            let mut scope = ScopeStack::new();
            walk(
                &tree.root_node(),
                source.as_bytes(),
                source,
                uri,
                &mut result,
                None,
                &mut scope,
                max_depth,
            );
            result
        })
    }
}

/// Strictly-internal re-exposure used by `javascript::parser`, which shares
/// the walking conventions but not the grammar.
pub(crate) fn node_to_location(source: &str, node: &tree_sitter::Node) -> (u32, u32) {
    node_to_position(source, node)
}

fn collect_syntax_errors(node: &tree_sitter::Node, source: &str, result: &mut IndexedFileResult) {
    if node.is_error() || node.is_missing() {
        let (line, character) = node_to_position(source, node);
        result.diagnostics.push(Diagnostic {
            message: format!("syntax error near {:?}", node.kind()),
            line,
            character,
            severity: DiagnosticSeverity::Error,
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_syntax_errors(&child, source, result);
    }
}

fn qualified(name: &str, container: Option<&str>) -> String {
    match container {
        Some(c) => format!("{c}.{name}"),
        None => name.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn walk(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    container: Option<&str>,
    scope: &mut ScopeStack,
    max_depth: usize,
) {
    if max_depth == 0 {
        result.diagnostics.push(Diagnostic {
            message: "max recursion depth reached; remaining nodes skipped".to_string(),
            line: 0,
            character: 0,
            severity: DiagnosticSeverity::Warning,
        });
        return;
    }

    match node.kind() {
        "class_declaration" | "abstract_class_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let (line, character) = node_to_position(text, &name_node);
                    let qualified_name = qualified(name, container);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Class,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: container.map(str::to_string),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                    scope.push_container(name.to_string());
                    if let Some(body) = node.child_by_field_name("body") {
                        walk_class_body(&body, source, text, uri, result, &qualified_name, scope, max_depth - 1);
                    }
                    scope.pop();
                    return;
                }
            }
        }

        "interface_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let (line, character) = node_to_position(text, &name_node);
                    let qualified_name = qualified(name, container);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Interface,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: container.map(str::to_string),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                    scope.push_container(name.to_string());
                    if let Some(body) = node.child_by_field_name("body") {
                        walk_interface_body(&body, source, text, uri, result, &qualified_name);
                    }
                    scope.pop();
                    return;
                }
            }
        }

        "type_alias_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let (line, character) = node_to_position(text, &name_node);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::TypeAlias,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: container.map(str::to_string),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                }
            }
            return;
        }

        "enum_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let (line, character) = node_to_position(text, &name_node);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Enum,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: container.map(str::to_string),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                }
            }
            return;
        }

        "function_declaration" | "generator_function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let (line, character) = node_to_position(text, &name_node);
                    let params = collect_param_names(node, source);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Function,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: container.map(str::to_string),
                        signature_hash: Some(signature_hash(&params)),
                        domain_metadata: None,
                    });
                    scope.push_function(name.to_string());
                    declare_params(node, source, scope);
                    if let Some(body) = node.child_by_field_name("body") {
                        walk(&body, source, text, uri, result, container, scope, max_depth - 1);
                    }
                    scope.pop();
                    return;
                }
            }
        }

        "lexical_declaration" | "variable_declaration" => {
            extract_variable_declarators(node, source, text, uri, result, container, scope, max_depth);
            return;
        }

        "import_statement" => {
            extract_import(node, source, text, uri, result, scope);
            return;
        }

        "export_statement" => {
            if extract_reexport(node, source, text, uri, result) {
                return;
            }
            // export const/function/class ... — recurse into the wrapped declaration.
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(&child, source, text, uri, result, container, scope, max_depth - 1);
            }
            return;
        }

        "call_expression" => {
            extract_domain_metadata(node, source, text, uri, result, scope);
        }

        "identifier" | "property_identifier" | "type_identifier" | "shorthand_property_identifier" => {
            if is_reference_context(node) {
                if let Ok(name) = node.utf8_text(source) {
                    let (line, character) = node_to_position(text, node);
                    let scope_id = scope.scope_id();
                    let is_local = scope.is_local(name);
                    result.references.push(Reference {
                        name: name.to_string(),
                        uri: uri.to_string(),
                        line,
                        character,
                        scope_id,
                        is_local,
                    });
                }
            }
        }

        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(&child, source, text, uri, result, container, scope, max_depth - 1);
    }
}

fn walk_class_body(
    body: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    class_path: &str,
    scope: &mut ScopeStack,
    max_depth: usize,
) {
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        match child.kind() {
            "method_definition" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    if let Ok(name) = name_node.utf8_text(source) {
                        let (line, character) = node_to_position(text, &name_node);
                        let params = collect_param_names(&child, source);
                        result.symbols.push(Symbol {
                            name: name.to_string(),
                            kind: SymbolKind::Method,
                            uri: uri.to_string(),
                            line,
                            character,
                            container_name: Some(class_path.to_string()),
                            signature_hash: Some(signature_hash(&params)),
                            domain_metadata: None,
                        });
                        scope.push_function(name.to_string());
                        declare_params(&child, source, scope);
                        // Constructor parameter properties are both a
                        // parameter binding and a class member declaration.
                        if name == "constructor" {
                            declare_constructor_properties(
                                &child, source, text, uri, result, class_path,
                            );
                        }
                        if let Some(fn_body) = child.child_by_field_name("body") {
                            walk(
                                &fn_body,
                                source,
                                text,
                                uri,
                                result,
                                Some(class_path),
                                scope,
                                max_depth,
                            );
                        }
                        scope.pop();
                    }
                }
            }

            "public_field_definition" | "property_signature" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    if let Ok(name) = name_node.utf8_text(source) {
                        let (line, character) = node_to_position(text, &name_node);
                        result.symbols.push(Symbol {
                            name: name.to_string(),
                            kind: SymbolKind::Property,
                            uri: uri.to_string(),
                            line,
                            character,
                            container_name: Some(class_path.to_string()),
                            signature_hash: None,
                            domain_metadata: None,
                        });
                        if let Some(value) = child.child_by_field_name("value") {
                            walk(
                                &value,
                                source,
                                text,
                                uri,
                                result,
                                Some(class_path),
                                scope,
                                max_depth,
                            );
                        }
                    }
                }
            }

            _ => {}
        }
    }
}

fn walk_interface_body(
    body: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    interface_path: &str,
) {
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        if matches!(child.kind(), "property_signature" | "method_signature") {
            if let Some(name_node) = child.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let (line, character) = node_to_position(text, &name_node);
                    let kind = if child.kind() == "method_signature" {
                        SymbolKind::Method
                    } else {
                        SymbolKind::Property
                    };
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: Some(interface_path.to_string()),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                }
            }
        }
    }
}

fn declare_constructor_properties(
    constructor: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    class_path: &str,
) {
    let Some(params) = constructor.child_by_field_name("parameters") else {
        return;
    };
    let mut cursor = params.walk();
    for param in params.children(&mut cursor) {
        // Parameter properties carry an accessibility modifier
        // (public/private/protected/readonly) in real TS grammars.
        if find_child_by_kind(&param, "accessibility_modifier").is_some() {
            if let Some(pattern) = param.child_by_field_name("pattern") {
                if let Ok(name) = pattern.utf8_text(source) {
                    let (line, character) = node_to_position(text, &pattern);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Property,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: Some(class_path.to_string()),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                }
            }
        }
    }
}

fn collect_param_names<'a>(fn_node: &tree_sitter::Node, source: &'a [u8]) -> Vec<&'a str> {
    let mut names = Vec::new();
    let Some(params) = fn_node.child_by_field_name("parameters") else {
        return names;
    };
    let mut cursor = params.walk();
    for param in params.children(&mut cursor) {
        let pattern = param
            .child_by_field_name("pattern")
            .unwrap_or(param);
        if let Ok(text) = pattern.utf8_text(source) {
            names.push(text);
        }
    }
    names
}

fn declare_params(fn_node: &tree_sitter::Node, source: &[u8], scope: &mut ScopeStack) {
    let Some(params) = fn_node.child_by_field_name("parameters") else {
        return;
    };
    let mut cursor = params.walk();
    for param in params.children(&mut cursor) {
        let pattern = param.child_by_field_name("pattern").unwrap_or(param);
        if let Ok(name) = pattern.utf8_text(source) {
            scope.declare(name);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_variable_declarators(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    container: Option<&str>,
    scope: &mut ScopeStack,
    max_depth: usize,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        if name_node.kind() != "identifier" {
            continue;
        }
        let Ok(name) = name_node.utf8_text(source) else {
            continue;
        };
        let (line, character) = node_to_position(text, &name_node);
        let value = child.child_by_field_name("value");
        let is_function_value = value
            .map(|v| matches!(v.kind(), "arrow_function" | "function"))
            .unwrap_or(false);

        let kind = if is_function_value {
            SymbolKind::Function
        } else {
            SymbolKind::Variable
        };
        let signature_hash = if is_function_value {
            value.map(|v| signature_hash(&collect_param_names(&v, source)))
        } else {
            None
        };

        result.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            uri: uri.to_string(),
            line,
            character,
            container_name: container.map(str::to_string),
            signature_hash,
            domain_metadata: None,
        });

        scope.declare(name);

        if let Some(value) = value {
            if is_function_value {
                scope.push_function(name.to_string());
                declare_params(&value, source, scope);
                if let Some(body) = value.child_by_field_name("body") {
                    walk(&body, source, text, uri, result, container, scope, max_depth.saturating_sub(1));
                }
                scope.pop();
            } else {
                walk(&value, source, text, uri, result, container, scope, max_depth.saturating_sub(1));
            }
        }
    }
}

fn extract_import(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    scope: &mut ScopeStack,
) {
    let (line, _) = node_to_position(text, node);
    let Some(source_node) = node.child_by_field_name("source") else {
        return;
    };
    let Ok(raw) = source_node.utf8_text(source) else {
        return;
    };
    let from_module = raw.trim_matches(|c| c == '"' || c == '\'').to_string();

    let mut imported = Vec::new();
    let mut alias = None;

    if let Some(clause) = find_child_by_kind(node, "import_clause") {
        let mut cursor = clause.walk();
        for child in clause.children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    // default import binding
                    if let Ok(name) = child.utf8_text(source) {
                        declare_import_binding(name, child, text, uri, result, scope);
                        imported.push("default".to_string());
                        alias = Some(name.to_string());
                    }
                }
                "namespace_import" => {
                    if let Some(name_node) = find_child_by_kind(&child, "identifier") {
                        if let Ok(name) = name_node.utf8_text(source) {
                            declare_import_binding(name, name_node, text, uri, result, scope);
                            imported.push("*".to_string());
                            alias = Some(name.to_string());
                        }
                    }
                }
                "named_imports" => {
                    let mut spec_cursor = child.walk();
                    for spec in child.children(&mut spec_cursor) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let name_node = spec.child_by_field_name("name");
                        let alias_node = spec.child_by_field_name("alias");
                        if let Some(name_node) = name_node {
                            if let Ok(name) = name_node.utf8_text(source) {
                                imported.push(name.to_string());
                                let local = alias_node.unwrap_or(name_node);
                                if let Ok(local_name) = local.utf8_text(source) {
                                    declare_import_binding(local_name, local, text, uri, result, scope);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    result.imports.push(ImportInfo {
        from_module,
        imported,
        alias,
        uri: uri.to_string(),
        line,
    });
}

fn declare_import_binding(
    name: &str,
    node: tree_sitter::Node,
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    scope: &mut ScopeStack,
) {
    let (line, character) = node_to_position(text, &node);
    result.symbols.push(Symbol {
        name: name.to_string(),
        kind: SymbolKind::Variable,
        uri: uri.to_string(),
        line,
        character,
        container_name: None,
        signature_hash: None,
        domain_metadata: None,
    });
    scope.declare(name);
}

/// Returns true if `node` was a re-export (`export { a } from "m"` /
/// `export * from "m"`) and has already been fully handled.
fn extract_reexport(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
) -> bool {
    let Some(source_node) = node.child_by_field_name("source") else {
        return false;
    };
    let (line, _) = node_to_position(text, node);
    let Ok(raw) = source_node.utf8_text(source) else {
        return false;
    };
    let from_module = raw.trim_matches(|c| c == '"' || c == '\'').to_string();

    let mut imported = Vec::new();
    let mut alias = None;
    if let Some(clause) = find_child_by_kind(node, "export_clause") {
        let mut cursor = clause.walk();
        for spec in clause.children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            if let Some(name_node) = spec.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    imported.push(name.to_string());
                }
            }
            if let Some(alias_node) = spec.child_by_field_name("alias") {
                if let Ok(name) = alias_node.utf8_text(source) {
                    alias = Some(name.to_string());
                }
            }
        }
    } else {
        imported.push("*".to_string());
    }

    result.re_exports.push(ReExportInfo {
        from_module,
        imported,
        alias,
        uri: uri.to_string(),
        line,
    });
    true
}

/// Recognize NgRx-style `createAction(...)`/`createEffect(...)` call shapes
/// and annotate the enclosing declaration with `domain_metadata`. This is
/// opt-in-only: it never changes what is emitted as symbol vs. reference,
/// it only appends to the most recently pushed symbol when the call is the
/// initializer of a variable declarator (handled by the caller attaching
/// metadata post hoc is avoided here; instead we tag the call itself via a
/// synthetic reference to the `ofType`/`on` target name).
fn extract_domain_metadata(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    scope: &ScopeStack,
) {
    let Some(function_node) = node.child_by_field_name("function") else {
        return;
    };
    let Ok(callee) = function_node.utf8_text(source) else {
        return;
    };

    match callee {
        "ofType" | "on" => {
            let Some(args) = node.child_by_field_name("arguments") else {
                return;
            };
            let mut cursor = args.walk();
            for arg in args.children(&mut cursor) {
                if arg.kind() == "identifier" {
                    if let Ok(name) = arg.utf8_text(source) {
                        let (line, character) = node_to_position(text, &arg);
                        result.references.push(Reference {
                            name: name.to_string(),
                            uri: uri.to_string(),
                            line,
                            character,
                            scope_id: scope.scope_id(),
                            is_local: scope.is_local(name),
                        });
                    }
                }
            }
        }
        "createAction" | "createEffect" => {
            let kind = if callee == "createAction" {
                DomainMetadataKind::Action
            } else {
                DomainMetadataKind::Effect
            };
            let type_string = node
                .child_by_field_name("arguments")
                .and_then(|args| {
                    let mut cursor = args.walk();
                    args.children(&mut cursor)
                        .find(|a| a.kind() == "string")
                        .and_then(|s| s.utf8_text(source).ok())
                        .map(|s| s.trim_matches(|c| c == '"' || c == '\'').to_string())
                });
            if let Some(last) = result.symbols.last_mut() {
                last.domain_metadata = Some(DomainMetadata {
                    kind,
                    type_string,
                });
            }
        }
        _ => {}
    }
}

/// Walk up the parent chain to decide whether `node` sits in a declaration
/// context (and is therefore a `Symbol`, handled by its specific match arm
/// in `walk`) or a usage context (and is therefore a `Reference`).
fn is_reference_context(node: &tree_sitter::Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };

    match parent.kind() {
        "class_declaration" | "abstract_class_declaration" | "interface_declaration"
        | "type_alias_declaration" | "enum_declaration" | "function_declaration"
        | "generator_function_declaration" | "method_definition" | "variable_declarator"
        | "public_field_definition" | "property_signature" | "method_signature"
        | "required_parameter" | "optional_parameter" => {
            if let Some(name_node) = parent.child_by_field_name("name") {
                if name_node.id() == node.id() {
                    return false;
                }
            }
            if let Some(pattern_node) = parent.child_by_field_name("pattern") {
                if pattern_node.id() == node.id() {
                    return false;
                }
            }
            true
        }

        "import_specifier" | "namespace_import" | "import_clause" => false,
        "export_specifier" => {
            // the local name is a reference to an existing binding; the
            // exported-as alias is not.
            parent
                .child_by_field_name("name")
                .map(|n| n.id() != node.id())
                .unwrap_or(true)
        }

        "pair" => parent
            .child_by_field_name("key")
            .map(|k| k.id() != node.id())
            .unwrap_or(true),

        "accessibility_modifier" => false,

        "member_expression" => true,

        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> IndexedFileResult {
        TypeScriptParser.extract("file:///test.ts", source, 500)
    }

    #[test]
    fn extracts_class_with_method() {
        let result = extract("class UserService {\n  save() { return 1; }\n}\n");
        assert!(result.symbols.iter().any(|s| s.name == "UserService" && s.kind == SymbolKind::Class));
        assert!(result
            .symbols
            .iter()
            .any(|s| s.name == "save" && s.container_name.as_deref() == Some("UserService")));
    }

    #[test]
    fn extracts_interface_members() {
        let result = extract("interface Point {\n  x: number;\n  y: number;\n}\n");
        assert_eq!(
            result
                .symbols
                .iter()
                .filter(|s| s.kind == SymbolKind::Property)
                .count(),
            2
        );
    }

    #[test]
    fn distinguishes_module_and_local_declarations() {
        let result = extract("export const x = 1;\nfunction f() { const x = 2; return x; }\nf(); x;\n");
        let module_x = result
            .symbols
            .iter()
            .find(|s| s.name == "x" && s.container_name.is_none());
        assert!(module_x.is_some());
        let local_x = result
            .symbols
            .iter()
            .find(|s| s.name == "x" && s.line == 1);
        assert!(local_x.is_some());

        let local_ref = result
            .references
            .iter()
            .find(|r| r.name == "x" && r.line == 1)
            .expect("local reference to x inside f");
        assert!(local_ref.is_local);

        let module_ref = result
            .references
            .iter()
            .find(|r| r.name == "x" && r.line == 2)
            .expect("module reference to x on last line");
        assert!(!module_ref.is_local);
    }

    #[test]
    fn extracts_named_import() {
        let result = extract("import { formatDate } from \"./utils\";\n");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].from_module, "./utils");
        assert_eq!(result.imports[0].imported, vec!["formatDate".to_string()]);
    }

    #[test]
    fn extracts_reexport() {
        let result = extract("export { a, b as c } from \"./m\";\n");
        assert_eq!(result.re_exports.len(), 1);
        assert_eq!(result.re_exports[0].from_module, "./m");
        assert!(result.re_exports[0].imported.contains(&"a".to_string()));
    }

    #[test]
    fn recognizes_create_action_domain_metadata() {
        let result = extract("const load = createAction(\"[Users] Load\");\n");
        let symbol = result
            .symbols
            .iter()
            .find(|s| s.name == "load")
            .expect("load symbol");
        let metadata = symbol.domain_metadata.as_ref().expect("domain metadata");
        assert_eq!(metadata.kind, DomainMetadataKind::Action);
        assert_eq!(metadata.type_string.as_deref(), Some("[Users] Load"));
    }

    #[test]
    fn absence_of_domain_call_does_not_set_metadata() {
        let result = extract("const load = plainFactory(\"x\");\n");
        let symbol = result.symbols.iter().find(|s| s.name == "load").unwrap();
        assert!(symbol.domain_metadata.is_none());
    }

    #[test]
    fn type_alias_and_enum_are_symbols() {
        let result = extract("type Id = string;\nenum Color { Red, Green }\n");
        assert!(result
            .symbols
            .iter()
            .any(|s| s.name == "Id" && s.kind == SymbolKind::TypeAlias));
        assert!(result
            .symbols
            .iter()
            .any(|s| s.name == "Color" && s.kind == SymbolKind::Enum));
    }

    #[test]
    fn file_with_no_supported_extension_check() {
        assert!(is_supported_source_file(std::path::Path::new("a.ts")));
        assert!(!is_supported_source_file(std::path::Path::new("a.py")));
    }
}
