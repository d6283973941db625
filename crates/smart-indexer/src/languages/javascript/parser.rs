//! Symbol and reference extraction from JavaScript source using tree-sitter.
//!
//! Shares its declaration/usage classification and scope-tracking approach
//! with the TypeScript parser; kept as a separate grammar because
//! tree-sitter-javascript and tree-sitter-typescript diverge on a handful of
//! node kinds (`field_definition` vs `public_field_definition`,
//! prototype-style method assignment, CommonJS `module.exports`).

use std::cell::RefCell;

use crate::languages::typescript::parser::node_to_location;
use crate::parse::{
    find_child_by_kind, signature_hash, Diagnostic, DiagnosticSeverity, IndexedFileResult,
    LanguageParser, ScopeStack,
};
use crate::{DomainMetadata, DomainMetadataKind, ImportInfo, ReExportInfo, Reference, Symbol, SymbolKind};

// Thread-local parser reuse - avoids creating a new parser per file.
thread_local! {
    static JS_PARSER: RefCell<Option<tree_sitter::Parser>> = const { RefCell::new(None) };
}

pub struct JavaScriptParser;

impl LanguageParser for JavaScriptParser {
    fn extract(&self, uri: &str, source: &str, max_depth: usize) -> IndexedFileResult {
        JS_PARSER.with(|parser_opt| {
            let mut parser_ref = parser_opt.borrow_mut();
            if parser_ref.is_none() {
                let mut parser = tree_sitter::Parser::new();
                match parser.set_language(&tree_sitter_javascript::LANGUAGE.into()) {
                    Ok(_) => *parser_ref = Some(parser),
                    Err(e) => {
                        tracing::error!("failed to load JavaScript grammar: {e}");
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
            extract_recursive(
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

fn collect_syntax_errors(node: &tree_sitter::Node, source: &str, result: &mut IndexedFileResult) {
    if node.is_error() || node.is_missing() {
        let (line, character) = node_to_location(source, node);
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

fn qualified_name(name: &str, parent_path: Option<&str>) -> String {
    match parent_path {
        Some(p) => format!("{p}.{name}"),
        None => name.to_string(),
    }
}

fn collect_param_names<'a>(fn_node: &tree_sitter::Node, source: &'a [u8]) -> Vec<&'a str> {
    let mut names = Vec::new();
    let Some(params) = fn_node.child_by_field_name("parameters") else {
        return names;
    };
    let mut cursor = params.walk();
    for param in params.children(&mut cursor) {
        if let Ok(text) = param.utf8_text(source) {
            if param.kind() == "identifier" {
                names.push(text);
            }
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
        if param.kind() == "identifier" {
            if let Ok(name) = param.utf8_text(source) {
                scope.declare(name);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_recursive(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    parent_path: Option<&str>,
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
        "class_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let qualified = qualified_name(name, parent_path);
                    let (line, character) = node_to_location(text, &name_node);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Class,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: parent_path.map(str::to_string),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                    scope.push_container(name.to_string());
                    if let Some(body) = node.child_by_field_name("body") {
                        extract_class_body(&body, source, text, uri, result, &qualified, scope, max_depth - 1);
                    }
                    scope.pop();
                    return;
                }
            }
        }

        "function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let (line, character) = node_to_location(text, &name_node);
                    let params = collect_param_names(node, source);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Function,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: parent_path.map(str::to_string),
                        signature_hash: Some(signature_hash(&params)),
                        domain_metadata: None,
                    });
                    scope.push_function(name.to_string());
                    declare_params(node, source, scope);
                    if let Some(body) = node.child_by_field_name("body") {
                        extract_recursive(&body, source, text, uri, result, parent_path, scope, max_depth - 1);
                    }
                    scope.pop();
                    return;
                }
            }
        }

        "lexical_declaration" | "variable_declaration" => {
            extract_variable_declarations(node, source, text, uri, result, parent_path, scope, max_depth);
            return;
        }

        "export_statement" => {
            if extract_reexport(node, source, text, uri, result) {
                return;
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                let kind = child.kind();
                if kind.ends_with("_declaration") {
                    extract_recursive(&child, source, text, uri, result, parent_path, scope, max_depth - 1);
                }
            }
            return;
        }

        "import_statement" => {
            extract_import_statement(node, source, text, uri, result, scope);
            return;
        }

        "expression_statement" => {
            extract_prototype_method_assignment(node, source, text, uri, result, scope, max_depth);
        }

        "call_expression" => {
            extract_domain_metadata(node, source, text, uri, result, scope);
        }

        "identifier" | "property_identifier" | "shorthand_property_identifier" => {
            if is_reference_context(node) {
                if let Ok(name) = node.utf8_text(source) {
                    let (line, character) = node_to_location(text, node);
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

        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        extract_recursive(&child, source, text, uri, result, parent_path, scope, max_depth - 1);
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_class_body(
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
                        let (line, character) = node_to_location(text, &name_node);
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
                        if let Some(fn_body) = child.child_by_field_name("body") {
                            extract_recursive(
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

            "field_definition" => {
                if let Some(name_node) = child.child_by_field_name("property") {
                    if let Ok(name) = name_node.utf8_text(source) {
                        let (line, character) = node_to_location(text, &name_node);
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
                            extract_recursive(&value, source, text, uri, result, Some(class_path), scope, max_depth);
                        }
                    }
                }
            }

            _ => {
                if max_depth > 0 {
                    extract_recursive(&child, source, text, uri, result, Some(class_path), scope, max_depth - 1);
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_variable_declarations(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    parent_path: Option<&str>,
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
        let qualified = qualified_name(name, parent_path);
        let (line, character) = node_to_location(text, &name_node);
        let value = child.child_by_field_name("value");
        let is_function_value = value
            .map(|v| matches!(v.kind(), "arrow_function" | "function" | "function_expression"))
            .unwrap_or(false);

        let kind = if is_function_value { SymbolKind::Function } else { SymbolKind::Variable };
        let sig_hash = if is_function_value {
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
            container_name: parent_path.map(str::to_string),
            signature_hash: sig_hash,
            domain_metadata: None,
        });
        scope.declare(name);

        if let Some(value) = value {
            if is_function_value {
                scope.push_function(name.to_string());
                declare_params(&value, source, scope);
                if let Some(body) = value.child_by_field_name("body") {
                    extract_recursive(&body, source, text, uri, result, parent_path, scope, max_depth.saturating_sub(1));
                }
                scope.pop();
            } else if value.kind() == "object" {
                extract_object_literal_properties(&value, source, text, uri, result, &qualified, scope, max_depth);
            } else {
                extract_recursive(&value, source, text, uri, result, parent_path, scope, max_depth.saturating_sub(1));
            }
        }
    }
}

/// `const X = { a, b: c }` -> `X.a`, `X.b` member symbols.
#[allow(clippy::too_many_arguments)]
fn extract_object_literal_properties(
    object_node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    object_path: &str,
    scope: &mut ScopeStack,
    max_depth: usize,
) {
    let mut cursor = object_node.walk();
    for child in object_node.children(&mut cursor) {
        match child.kind() {
            "shorthand_property_identifier" => {
                if let Ok(name) = child.utf8_text(source) {
                    let (line, character) = node_to_location(text, &child);
                    result.symbols.push(Symbol {
                        name: name.to_string(),
                        kind: SymbolKind::Property,
                        uri: uri.to_string(),
                        line,
                        character,
                        container_name: Some(object_path.to_string()),
                        signature_hash: None,
                        domain_metadata: None,
                    });
                }
            }
            "pair" => {
                if let Some(key_node) = child.child_by_field_name("key") {
                    if key_node.kind() == "property_identifier" {
                        if let Ok(name) = key_node.utf8_text(source) {
                            let (line, character) = node_to_location(text, &key_node);
                            result.symbols.push(Symbol {
                                name: name.to_string(),
                                kind: SymbolKind::Property,
                                uri: uri.to_string(),
                                line,
                                character,
                                container_name: Some(object_path.to_string()),
                                signature_hash: None,
                                domain_metadata: None,
                            });
                        }
                    }
                }
                if let Some(value_node) = child.child_by_field_name("value") {
                    extract_recursive(&value_node, source, text, uri, result, Some(object_path), scope, max_depth.saturating_sub(1));
                }
            }
            _ => {}
        }
    }
}

/// `Foo.prototype.method = function() {}` - pre-ES6 instance method
/// definition, still common in hand-rolled CommonJS modules.
fn extract_prototype_method_assignment(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    scope: &mut ScopeStack,
    max_depth: usize,
) {
    let Some(assign) = find_child_by_kind(node, "assignment_expression") else {
        return;
    };
    let Some(left) = assign.child_by_field_name("left") else {
        return;
    };
    if left.kind() != "member_expression" {
        return;
    }
    let Some((class_name, method_name, method_name_node)) = extract_prototype_pattern(&left, source) else {
        return;
    };
    let Some(right) = assign.child_by_field_name("right") else {
        return;
    };
    if !matches!(right.kind(), "function_expression" | "arrow_function") {
        return;
    }

    let (line, character) = node_to_location(text, &method_name_node);
    let params = collect_param_names(&right, source);
    result.symbols.push(Symbol {
        name: method_name.clone(),
        kind: SymbolKind::Method,
        uri: uri.to_string(),
        line,
        character,
        container_name: Some(class_name.clone()),
        signature_hash: Some(signature_hash(&params)),
        domain_metadata: None,
    });

    scope.push_function(method_name);
    declare_params(&right, source, scope);
    if let Some(body) = right.child_by_field_name("body") {
        extract_recursive(&body, source, text, uri, result, Some(&class_name), scope, max_depth.saturating_sub(1));
    }
    scope.pop();
}

fn extract_prototype_pattern<'a>(
    node: &'a tree_sitter::Node<'a>,
    source: &[u8],
) -> Option<(String, String, tree_sitter::Node<'a>)> {
    let method_name_node = node.child_by_field_name("property")?;
    let method_name = method_name_node.utf8_text(source).ok()?;

    let obj = node.child_by_field_name("object")?;
    if obj.kind() != "member_expression" {
        return None;
    }
    let proto_prop = obj.child_by_field_name("property")?;
    if proto_prop.utf8_text(source).ok()? != "prototype" {
        return None;
    }

    let class_node = obj.child_by_field_name("object")?;
    if class_node.kind() != "identifier" {
        return None;
    }
    let class_name = class_node.utf8_text(source).ok()?;

    Some((class_name.to_string(), method_name.to_string(), method_name_node))
}

fn extract_import_statement(
    node: &tree_sitter::Node,
    source: &[u8],
    text: &str,
    uri: &str,
    result: &mut IndexedFileResult,
    scope: &mut ScopeStack,
) {
    let (line, _) = node_to_location(text, node);
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
    let (line, character) = node_to_location(text, &node);
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
    let (line, _) = node_to_location(text, node);
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
                        let (line, character) = node_to_location(text, &arg);
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
            let kind = if callee == "createAction" { DomainMetadataKind::Action } else { DomainMetadataKind::Effect };
            let type_string = node.child_by_field_name("arguments").and_then(|args| {
                let mut cursor = args.walk();
                args.children(&mut cursor)
                    .find(|a| a.kind() == "string")
                    .and_then(|s| s.utf8_text(source).ok())
                    .map(|s| s.trim_matches(|c| c == '"' || c == '\'').to_string())
            });
            if let Some(last) = result.symbols.last_mut() {
                last.domain_metadata = Some(DomainMetadata { kind, type_string });
            }
        }
        _ => {}
    }
}

fn is_reference_context(node: &tree_sitter::Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };

    match parent.kind() {
        "function_declaration" | "generator_function_declaration" | "method_definition"
        | "class_declaration" | "variable_declarator" => {
            if let Some(name_node) = parent.child_by_field_name("name") {
                if name_node.id() == node.id() {
                    return false;
                }
            }
            true
        }

        "formal_parameters" => false,
        "import_clause" | "import_specifier" | "namespace_import" | "named_imports" => false,

        "export_specifier" => parent
            .child_by_field_name("name")
            .map(|n| n.id() != node.id())
            .unwrap_or(true),

        "object_pattern" | "array_pattern" | "shorthand_property_identifier_pattern" => false,

        "pair" => parent
            .child_by_field_name("key")
            .map(|k| k.id() != node.id())
            .unwrap_or(true),

        "field_definition" | "public_field_definition" => {
            if let Some(name_node) = parent.child_by_field_name("property") {
                if name_node.id() == node.id() {
                    return false;
                }
            }
            true
        }

        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> IndexedFileResult {
        JavaScriptParser.extract("file:///test.js", source, 500)
    }

    #[test]
    fn extracts_class_and_method() {
        let result = extract(
            "class User {\n  constructor(name) { this.name = name; }\n  greet() { return this.name; }\n}\n",
        );
        assert!(result.symbols.iter().any(|s| s.name == "User" && s.kind == SymbolKind::Class));
        assert!(result
            .symbols
            .iter()
            .any(|s| s.name == "greet" && s.container_name.as_deref() == Some("User")));
    }

    #[test]
    fn extracts_arrow_function_assigned_to_const() {
        let result = extract("export const multiply = (a, b) => a * b;\n");
        let sym = result.symbols.iter().find(|s| s.name == "multiply").expect("multiply");
        assert_eq!(sym.kind, SymbolKind::Function);
    }

    #[test]
    fn extracts_imports_with_named_bindings() {
        let result = extract("import { foo, bar as baz } from './utils';\n");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].from_module, "./utils");
        assert!(result.imports[0].imported.contains(&"foo".to_string()));
        assert!(result.imports[0].imported.contains(&"bar".to_string()));
    }

    #[test]
    fn extracts_prototype_method_assignment() {
        let result = extract(
            "function Component(props) { this.props = props; }\nComponent.prototype.setState = function(s) {};\n",
        );
        let method = result
            .symbols
            .iter()
            .find(|s| s.name == "setState")
            .expect("setState");
        assert_eq!(method.container_name.as_deref(), Some("Component"));
    }

    #[test]
    fn extracts_private_fields() {
        let result = extract("class Counter {\n  #count = 0;\n  increment() { this.#count++; }\n}\n");
        assert!(result.symbols.iter().any(|s| s.name == "#count"));
    }

    #[test]
    fn extracts_references_with_scope() {
        let result = extract(
            "class User {\n  constructor(name) { this.name = name; }\n}\nfunction greet(user) {\n  return user.name;\n}\nfunction main() {\n  const user = new User('a');\n  console.log(greet(user));\n}\n",
        );
        let names: Vec<_> = result.references.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"User"));
        assert!(names.contains(&"greet"));

        let user_ref_in_main = result
            .references
            .iter()
            .find(|r| r.name == "user" && r.scope_id.as_deref() == Some("main"));
        assert!(user_ref_in_main.is_some());
    }

    #[test]
    fn object_literal_properties_become_members() {
        let result = extract("const Children = {\n  map,\n  count,\n};\n");
        assert!(result
            .symbols
            .iter()
            .any(|s| s.name == "map" && s.container_name.as_deref() == Some("Children")));
    }

    #[test]
    fn distinguishes_module_and_local_declarations() {
        let result = extract("const x = 1;\nfunction f() { const x = 2; return x; }\nf(); x;\n");
        let module_x = result
            .symbols
            .iter()
            .find(|s| s.name == "x" && s.container_name.is_none());
        assert!(module_x.is_some());
        let local_x = result.symbols.iter().find(|s| s.name == "x" && s.line == 1);
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
    fn bare_expression_statement_is_a_reference() {
        let result = extract("let x;\nx;\n");
        let bare_ref = result
            .references
            .iter()
            .find(|r| r.name == "x" && r.line == 1)
            .expect("bare expression statement referencing x");
        assert!(!bare_ref.is_local);
    }
}
