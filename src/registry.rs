//! Identity resolution for files and functions
//!
//! The callgrind format compresses repeated strings: `fl=(2) /srv/index.php`
//! binds token `(2)` once, and later lines say just `fl=(2)`. The same
//! applies to function names. Tokens are interned into dense indices, and
//! a function's identity is the pair (file token, name token).
//!
//! Name tokens are file-agnostic: `fn=(3) fun1` makes `(3)` mean `fun1`
//! everywhere in the dump. A node created before its name was known stays
//! pending and is named as soon as any declaration supplies the name.

use crate::graph::{FunctionId, FunctionNode};
use fnv::FnvHashMap;

/// Interned file token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) usize);

/// Interned function-name token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(pub(crate) usize);

/// Composite identity of a function node
///
/// `file` is `None` for functions declared before any `fl=` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionKey {
    pub file: Option<FileId>,
    pub name: NameId,
}

/// Payload of an `fl=`/`fn=`/`cfl=`/`cfn=` line split into token and inline text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    /// Compression token, e.g. `(2)`; the full text for uncompressed dumps
    pub token: &'a str,
    /// Name or path written next to the token, if any
    pub inline: Option<&'a str>,
}

impl<'a> Declaration<'a> {
    /// Split `(id) text` into its parts
    ///
    /// A payload that does not start with a `(N)` token is an uncompressed
    /// declaration: the whole payload is both token and inline text.
    pub fn split(payload: &'a str) -> Self {
        let payload = payload.trim();

        if let Some(close) = compressed_token_end(payload) {
            let (token, rest) = payload.split_at(close + 1);
            let rest = rest.trim();
            return Self {
                token,
                inline: (!rest.is_empty()).then_some(rest),
            };
        }

        Self {
            token: payload,
            inline: (!payload.is_empty()).then_some(payload),
        }
    }
}

/// Byte offset of the `)` closing a leading `(digits)` token
fn compressed_token_end(payload: &str) -> Option<usize> {
    let inner = payload.strip_prefix('(')?;
    let close = inner.find(')')?;
    let digits = &inner[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(close + 1)
}

/// String → dense index interner
#[derive(Debug, Default)]
struct SymbolTable {
    ids: FnvHashMap<String, usize>,
}

impl SymbolTable {
    fn intern(&mut self, token: &str) -> usize {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }
        let id = self.ids.len();
        self.ids.insert(token.to_string(), id);
        id
    }
}

/// File tokens and the paths bound to them
#[derive(Debug, Default)]
pub struct FileTable {
    tokens: SymbolTable,
    paths: FnvHashMap<FileId, String>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern the token of `payload`, binding its inline path if present
    pub fn declare(&mut self, payload: &str) -> FileId {
        let decl = Declaration::split(payload);
        let id = FileId(self.tokens.intern(decl.token));
        if let Some(path) = decl.inline {
            self.paths.entry(id).or_insert_with(|| path.to_string());
        }
        id
    }

    /// Path bound to `id`; empty if the token was never given one
    pub fn path(&self, id: Option<FileId>) -> &str {
        id.and_then(|id| self.paths.get(&id))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Result of a function declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declared {
    pub id: FunctionId,
    pub created: bool,
}

/// Deduplicating store of function nodes
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: Vec<FunctionNode>,
    by_key: FnvHashMap<FunctionKey, FunctionId>,
    name_tokens: SymbolTable,
    names: FnvHashMap<NameId, String>,
    /// Nodes created while their name token was still unbound
    pending: FnvHashMap<NameId, Vec<FunctionId>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_name(&mut self, token: &str) -> NameId {
        NameId(self.name_tokens.intern(token))
    }

    /// Bind `name` to a name token and name any pending nodes
    ///
    /// Returns the nodes whose name was resolved by this call. The first
    /// binding for a token wins.
    pub fn bind_name(&mut self, token: NameId, name: &str) -> Vec<FunctionId> {
        if self.names.contains_key(&token) {
            return Vec::new();
        }
        self.names.insert(token, name.to_string());

        let resolved = self.pending.remove(&token).unwrap_or_default();
        for id in &resolved {
            self.functions[id.0].name = name.to_string();
        }
        resolved
    }

    pub fn name_of(&self, token: NameId) -> Option<&str> {
        self.names.get(&token).map(String::as_str)
    }

    /// Return the node for `key`, creating it on first sight
    pub fn declare(&mut self, key: FunctionKey, file: &str) -> Declared {
        if let Some(&id) = self.by_key.get(&key) {
            return Declared { id, created: false };
        }

        let id = FunctionId(self.functions.len());
        let name = match self.names.get(&key.name) {
            Some(name) => name.clone(),
            None => {
                self.pending.entry(key.name).or_default().push(id);
                String::new()
            }
        };

        self.functions.push(FunctionNode::new(name, file.to_string()));
        self.by_key.insert(key, id);
        Declared { id, created: true }
    }

    /// Existing node for `key`; never creates
    pub fn lookup(&self, key: FunctionKey) -> Option<FunctionId> {
        self.by_key.get(&key).copied()
    }

    pub fn get(&self, id: FunctionId) -> &FunctionNode {
        &self.functions[id.0]
    }

    pub fn get_mut(&mut self, id: FunctionId) -> &mut FunctionNode {
        &mut self.functions[id.0]
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn into_functions(self) -> Vec<FunctionNode> {
        self.functions
    }
}
