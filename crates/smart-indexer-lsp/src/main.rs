//! smart-indexer-lsp: language server exposing the workspace symbol index.
//!
//! This binary wires the library crate's three pieces together for one
//! editor session: `Config::load` for workspace settings, `BackgroundIndex`
//! for the on-disk cache, `DynamicIndex` for open buffers, and the
//! `Orchestrator` that keeps both coherent as editor and filesystem events
//! arrive. Every LSP request reads through the `MergedIndex` façade; no
//! request handler ever talks to either tier directly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;
use notify_debouncer_full::{Debouncer, RecommendedCache};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use smart_indexer::background_index::path_to_uri;
use smart_indexer::merged_index::MergedIndex;
use smart_indexer::orchestrator::Orchestrator;
use smart_indexer::parse::is_supported_source_file;
use smart_indexer::{BackgroundIndex, Config, DynamicIndex, QueryableIndex, Symbol};

/// Custom extension request: a list of exported symbols with no known
/// cross-file reference, excluding anything annotated `@public`/`@api` in
/// its leading comment.
const FIND_DEAD_CODE_METHOD: &str = "smart-indexer/findDeadCode";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindDeadCodeParams {
    /// Reserved for a future per-folder scope; a single-root workspace
    /// ignores it and scans everything the Background Index knows about.
    #[serde(default)]
    workspace_uri: Option<Url>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeadSymbol {
    name: String,
    kind: String,
    uri: String,
    line: u32,
    character: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindDeadCodeResult {
    symbols: Vec<DeadSymbol>,
}

struct Backend {
    client: Client,
    workspace_root: RwLock<Option<PathBuf>>,
    merged: RwLock<Option<Arc<MergedIndex>>>,
    orchestrator: RwLock<Option<Orchestrator>>,
    /// Raw buffer text for open documents, keyed by URI string. The index
    /// tiers only ever see parsed `IndexedFileResult`s; request handlers
    /// that need to locate a word under the cursor (hover, definition,
    /// rename, completion) need the original text too.
    documents: RwLock<HashMap<String, String>>,
    watcher: Mutex<Option<Debouncer<RecommendedWatcher, RecommendedCache>>>,
}

impl Backend {
    fn new(client: Client) -> Self {
        Self {
            client,
            workspace_root: RwLock::new(None),
            merged: RwLock::new(None),
            orchestrator: RwLock::new(None),
            documents: RwLock::new(HashMap::new()),
            watcher: Mutex::new(None),
        }
    }

    async fn merged(&self) -> Option<Arc<MergedIndex>> {
        self.merged.read().await.clone()
    }

    async fn orchestrator(&self) -> Option<Orchestrator> {
        self.orchestrator.read().await.clone()
    }

    /// Open-buffer text if the URI is currently tracked, else read it off
    /// disk. Used for position lookups and the dead-code export/annotation
    /// heuristic.
    async fn read_source(&self, uri: &str) -> Option<String> {
        if let Some(text) = self.documents.read().await.get(uri).cloned() {
            return Some(text);
        }
        let path = uri_to_path(uri)?;
        std::fs::read_to_string(path).ok()
    }

    async fn find_dead_code(&self, _params: FindDeadCodeParams) -> LspResult<FindDeadCodeResult> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(FindDeadCodeResult::default()),
        };
        let background = merged.background();
        let mut seen = std::collections::HashSet::new();
        let mut dead = Vec::new();

        for uri in background.known_uris() {
            let source = match self.read_source(&uri).await {
                Some(s) => s,
                None => continue,
            };
            let lines: Vec<&str> = source.lines().collect();

            for symbol in background.get_file_symbols(&uri) {
                // Only top-level declarations are candidate "exports" —
                // a class method can't be exported on its own.
                if symbol.container_name.is_some() {
                    continue;
                }
                let key = (symbol.uri.clone(), symbol.line, symbol.character);
                if !seen.insert(key) {
                    continue;
                }
                let line_idx = symbol.line as usize;
                let decl_line = lines.get(line_idx).copied().unwrap_or("");
                if !decl_line.trim_start().starts_with("export") {
                    continue;
                }
                let scan_start = line_idx.saturating_sub(3);
                let scan_end = line_idx.min(lines.len());
                let annotated = lines[scan_start..scan_end]
                    .iter()
                    .any(|l| l.contains("@public") || l.contains("@api"));
                if annotated {
                    continue;
                }
                if merged.find_references_by_name(&symbol.name, None).is_empty() {
                    dead.push(DeadSymbol {
                        name: symbol.name.clone(),
                        kind: symbol.kind.to_string(),
                        uri: symbol.uri.clone(),
                        line: symbol.line,
                        character: symbol.character,
                    });
                }
            }
        }

        Ok(FindDeadCodeResult { symbols: dead })
    }
}

fn uri_to_path(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix("file://").map(PathBuf::from)
}

/// Walk `root` under the compiled exclusion, collecting every supported
/// source file as a `file://` URI — the candidate set for the initial scan.
fn discover_source_uris(root: &Path, background: &BackgroundIndex) -> Vec<String> {
    let mut uris = Vec::new();
    for entry in ignore::WalkBuilder::new(root).hidden(false).build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if !path.is_file() || !is_supported_source_file(path) {
            continue;
        }
        if background.is_excluded(path) {
            continue;
        }
        uris.push(path_to_uri(path));
    }
    uris
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Map a UTF-16 `Position` to the byte offset of that column in `line`.
fn byte_offset_for_utf16_column(line: &str, column: u32) -> usize {
    let mut utf16_count = 0u32;
    for (idx, ch) in line.char_indices() {
        if utf16_count >= column {
            return idx;
        }
        utf16_count += ch.len_utf16() as u32;
    }
    line.len()
}

/// The identifier-like word boundaries (byte offsets) around `byte_offset`
/// in `line`, whichever side of a non-word character it falls on.
fn word_bounds_at(line: &str, byte_offset: usize) -> (usize, usize) {
    let before = &line[..byte_offset.min(line.len())];
    let after = &line[byte_offset.min(line.len())..];
    let start = before
        .rfind(|c: char| !is_word_char(c))
        .map(|i| i + before[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1))
        .unwrap_or(0);
    let end = byte_offset + after.find(|c: char| !is_word_char(c)).unwrap_or(after.len());
    (start, end)
}

fn word_at_position(text: &str, position: Position) -> Option<String> {
    let line = text.lines().nth(position.line as usize)?;
    let byte_offset = byte_offset_for_utf16_column(line, position.character);
    let (start, end) = word_bounds_at(line, byte_offset);
    let word = &line[start..end];
    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

/// Just the portion of the word to the left of the cursor — the typed
/// prefix a completion request should match against.
fn prefix_before_position(text: &str, position: Position) -> String {
    let line = match text.lines().nth(position.line as usize) {
        Some(l) => l,
        None => return String::new(),
    };
    let byte_offset = byte_offset_for_utf16_column(line, position.character);
    let (start, _) = word_bounds_at(line, byte_offset);
    line[start..byte_offset.min(line.len())].to_string()
}

fn symbol_location(symbol: &Symbol) -> Option<Location> {
    let uri = Url::parse(&symbol.uri).ok()?;
    let width = symbol.name.chars().count() as u32;
    let start = Position::new(symbol.line, symbol.character);
    let end = Position::new(symbol.line, symbol.character + width);
    Some(Location::new(uri, Range::new(start, end)))
}

fn reference_location(reference: &smart_indexer::Reference) -> Option<Location> {
    let uri = Url::parse(&reference.uri).ok()?;
    let width = reference.name.chars().count() as u32;
    let start = Position::new(reference.line, reference.character);
    let end = Position::new(reference.line, reference.character + width);
    Some(Location::new(uri, Range::new(start, end)))
}

fn to_lsp_symbol_kind(kind: smart_indexer::SymbolKind) -> SymbolKind {
    use smart_indexer::SymbolKind as K;
    match kind {
        K::Class => SymbolKind::CLASS,
        K::Interface => SymbolKind::INTERFACE,
        K::TypeAlias => SymbolKind::TYPE_PARAMETER,
        K::Enum => SymbolKind::ENUM,
        K::Function => SymbolKind::FUNCTION,
        K::Method => SymbolKind::METHOD,
        K::Property => SymbolKind::PROPERTY,
        K::Variable => SymbolKind::VARIABLE,
        K::Parameter => SymbolKind::VARIABLE,
    }
}

fn to_completion_kind(kind: smart_indexer::SymbolKind) -> CompletionItemKind {
    use smart_indexer::SymbolKind as K;
    match kind {
        K::Class => CompletionItemKind::CLASS,
        K::Interface => CompletionItemKind::INTERFACE,
        K::TypeAlias => CompletionItemKind::TYPE_PARAMETER,
        K::Enum => CompletionItemKind::ENUM,
        K::Function => CompletionItemKind::FUNCTION,
        K::Method => CompletionItemKind::METHOD,
        K::Property => CompletionItemKind::PROPERTY,
        K::Variable => CompletionItemKind::VARIABLE,
        K::Parameter => CompletionItemKind::VARIABLE,
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        let root = params
            .root_uri
            .as_ref()
            .and_then(|u| u.to_file_path().ok())
            .or_else(|| {
                params
                    .workspace_folders
                    .as_ref()
                    .and_then(|folders| folders.first())
                    .and_then(|f| f.uri.to_file_path().ok())
            });
        *self.workspace_root.write().await = root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..Default::default()
                    },
                )),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                rename_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string()]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "smart-indexer-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let root = match self.workspace_root.read().await.clone() {
            Some(r) => r,
            None => {
                tracing::warn!("no workspace root provided at initialize; index disabled");
                return;
            }
        };

        let config = match Config::load(&root) {
            Ok(c) => c,
            Err(e) => {
                self.client
                    .log_message(MessageType::ERROR, format!("invalid configuration: {e}"))
                    .await;
                return;
            }
        };

        if config.enable_git_integration {
            smart_indexer::git::ensure_ignored(&root, &format!("{}/", config.cache_directory));
        }
        let cache_root = config.cache_root(&root);
        let exclusion = config.build_exclusion(&root);
        let background = match BackgroundIndex::init(
            root.clone(),
            cache_root,
            smart_indexer::SHARD_VERSION,
            config.max_concurrent_index_jobs,
            config.max_indexed_file_size,
            exclusion,
        ) {
            Ok(b) => b,
            Err(e) => {
                self.client
                    .log_message(MessageType::ERROR, format!("failed to open background index: {e}"))
                    .await;
                return;
            }
        };

        let merged = Arc::new(MergedIndex::new(DynamicIndex::new(), background));
        *self.merged.write().await = Some(merged.clone());

        let debounce = Duration::from_millis(config.debounce_ms);
        let orchestrator = Orchestrator::new(merged.clone(), debounce);
        *self.orchestrator.write().await = Some(orchestrator.clone());

        let uris = discover_source_uris(&root, merged.background());
        let client = self.client.clone();
        let background_for_scan = merged.background().clone();
        let file_count = uris.len();
        tokio::spawn(async move {
            if let Err(e) = background_for_scan.ensure_up_to_date(uris, None).await {
                tracing::warn!("initial workspace scan failed: {e}");
            }
            client
                .log_message(
                    MessageType::INFO,
                    format!("smart-indexer: initial scan of {file_count} files complete"),
                )
                .await;
        });

        if config.enable_background_index {
            let (tx, rx) = std::sync::mpsc::channel();
            match smart_indexer::watch::watch_workspace(&root, debounce, tx) {
                Ok(debouncer) => {
                    *self.watcher.lock().await = Some(debouncer);
                    let handle = tokio::runtime::Handle::current();
                    let orchestrator_for_watch = orchestrator.clone();
                    tokio::task::spawn_blocking(move || {
                        while let Ok((path, kind)) = rx.recv() {
                            handle.block_on(orchestrator_for_watch.filesystem_event(&path, kind));
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!("failed to start file watcher: {e}");
                }
            }
        }

        self.client
            .log_message(MessageType::INFO, "smart-indexer-lsp initialized")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        *self.watcher.lock().await = None;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        let text = params.text_document.text;
        self.documents.write().await.insert(uri.clone(), text.clone());
        if let Some(merged) = self.merged().await {
            merged.dynamic().update(&uri, &text);
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        // Full-document sync: the last content-change event carries the
        // entire buffer, so only it matters.
        let text = match params.content_changes.into_iter().last() {
            Some(change) => change.text,
            None => return,
        };
        self.documents.write().await.insert(uri.clone(), text.clone());
        if let Some(orchestrator) = self.orchestrator().await {
            orchestrator.buffer_changed(&uri, &text).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        let text = match params.text {
            Some(t) => t,
            None => match self.documents.read().await.get(&uri).cloned() {
                Some(t) => t,
                None => return,
            },
        };
        self.documents.write().await.insert(uri.clone(), text.clone());
        if let Some(orchestrator) = self.orchestrator().await {
            orchestrator.buffer_saved(&uri, &text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        self.documents.write().await.remove(&uri);
        if let Some(orchestrator) = self.orchestrator().await {
            orchestrator.buffer_closed(&uri).await;
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> LspResult<Option<GotoDefinitionResponse>> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(None),
        };
        let uri = params.text_document_position_params.text_document.uri.to_string();
        let position = params.text_document_position_params.position;
        let text = match self.read_source(&uri).await {
            Some(t) => t,
            None => return Ok(None),
        };
        let word = match word_at_position(&text, position) {
            Some(w) => w,
            None => return Ok(None),
        };

        let locations: Vec<Location> = merged
            .find_definitions(&word)
            .iter()
            .filter_map(symbol_location)
            .collect();
        if locations.is_empty() {
            Ok(None)
        } else {
            Ok(Some(GotoDefinitionResponse::Array(locations)))
        }
    }

    async fn references(&self, params: ReferenceParams) -> LspResult<Option<Vec<Location>>> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(None),
        };
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;
        let text = match self.read_source(&uri).await {
            Some(t) => t,
            None => return Ok(None),
        };
        let word = match word_at_position(&text, position) {
            Some(w) => w,
            None => return Ok(None),
        };

        let mut locations: Vec<Location> = merged
            .find_references_by_name(&word, None)
            .iter()
            .filter_map(reference_location)
            .collect();
        if params.context.include_declaration {
            locations.extend(merged.find_definitions(&word).iter().filter_map(symbol_location));
        }
        if locations.is_empty() {
            Ok(None)
        } else {
            Ok(Some(locations))
        }
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(None),
        };
        let uri = params.text_document.uri.to_string();
        #[allow(deprecated)]
        let infos: Vec<SymbolInformation> = merged
            .get_file_symbols(&uri)
            .into_iter()
            .filter_map(|s| {
                let location = symbol_location(&s)?;
                Some(SymbolInformation {
                    name: s.name.clone(),
                    kind: to_lsp_symbol_kind(s.kind),
                    tags: None,
                    deprecated: None,
                    location,
                    container_name: s.container_name.clone(),
                })
            })
            .collect();
        Ok(Some(DocumentSymbolResponse::Flat(infos)))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> LspResult<Option<Vec<SymbolInformation>>> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(Some(Vec::new())),
        };
        #[allow(deprecated)]
        let infos: Vec<SymbolInformation> = merged
            .search_symbols(&params.query, 50)
            .into_iter()
            .filter_map(|s| {
                let location = symbol_location(&s)?;
                Some(SymbolInformation {
                    name: s.name.clone(),
                    kind: to_lsp_symbol_kind(s.kind),
                    tags: None,
                    deprecated: None,
                    location,
                    container_name: s.container_name.clone(),
                })
            })
            .collect();
        Ok(Some(infos))
    }

    async fn hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(None),
        };
        let uri = params.text_document_position_params.text_document.uri.to_string();
        let position = params.text_document_position_params.position;
        let text = match self.read_source(&uri).await {
            Some(t) => t,
            None => return Ok(None),
        };
        let word = match word_at_position(&text, position) {
            Some(w) => w,
            None => return Ok(None),
        };

        let definition = match merged.find_definitions(&word).into_iter().next() {
            Some(d) => d,
            None => return Ok(None),
        };

        let mut value = format!("**{}** `{}`", definition.kind, definition.name);
        if let Some(container) = &definition.container_name {
            value.push_str(&format!("\n\nin `{container}`"));
        }
        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            }),
            range: None,
        }))
    }

    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(None),
        };
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;
        let text = match self.read_source(&uri).await {
            Some(t) => t,
            None => return Ok(None),
        };
        let prefix = prefix_before_position(&text, position);
        if prefix.is_empty() {
            return Ok(None);
        }

        let items: Vec<CompletionItem> = merged
            .search_symbols(&prefix, 50)
            .into_iter()
            .map(|s| CompletionItem {
                label: s.name.clone(),
                kind: Some(to_completion_kind(s.kind)),
                detail: s.container_name.clone(),
                ..Default::default()
            })
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn rename(&self, params: RenameParams) -> LspResult<Option<WorkspaceEdit>> {
        let merged = match self.merged().await {
            Some(m) => m,
            None => return Ok(None),
        };
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;
        let text = match self.read_source(&uri).await {
            Some(t) => t,
            None => return Ok(None),
        };
        let word = match word_at_position(&text, position) {
            Some(w) => w,
            None => return Ok(None),
        };
        let new_name = params.new_name;
        let width = word.chars().count() as u32;

        let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::new();
        for symbol in merged.find_definitions(&word) {
            if let Ok(u) = Url::parse(&symbol.uri) {
                let start = Position::new(symbol.line, symbol.character);
                let end = Position::new(symbol.line, symbol.character + width);
                changes.entry(u).or_default().push(TextEdit {
                    range: Range::new(start, end),
                    new_text: new_name.clone(),
                });
            }
        }
        for reference in merged.find_references_by_name(&word, None) {
            if let Ok(u) = Url::parse(&reference.uri) {
                let start = Position::new(reference.line, reference.character);
                let end = Position::new(reference.line, reference.character + width);
                changes.entry(u).or_default().push(TextEdit {
                    range: Range::new(start, end),
                    new_text: new_name.clone(),
                });
            }
        }

        if changes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(WorkspaceEdit {
                changes: Some(changes),
                document_changes: None,
                change_annotations: None,
            }))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("starting smart-indexer-lsp");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method(FIND_DEAD_CODE_METHOD, Backend::find_dead_code)
        .finish();

    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_at_position_simple() {
        let text = "const hello = 42;";
        let pos = Position::new(0, 8);
        assert_eq!(word_at_position(text, pos), Some("hello".to_string()));
    }

    #[test]
    fn word_at_position_at_start_of_word() {
        let text = "function greet() {}";
        let pos = Position::new(0, 9);
        assert_eq!(word_at_position(text, pos), Some("greet".to_string()));
    }

    #[test]
    fn word_at_position_on_whitespace_is_none() {
        let text = "const a = 1;";
        let pos = Position::new(0, 5);
        assert_eq!(word_at_position(text, pos), None);
    }

    #[test]
    fn prefix_before_position_stops_at_cursor() {
        let text = "getUserNa";
        let pos = Position::new(0, 9);
        assert_eq!(prefix_before_position(text, pos), "getUserNa");
    }

    #[test]
    fn prefix_before_position_mid_identifier() {
        let text = "getUserName";
        let pos = Position::new(0, 3);
        assert_eq!(prefix_before_position(text, pos), "get");
    }
}
