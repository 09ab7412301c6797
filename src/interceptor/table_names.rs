//! Table reference scanner.
//!
//! Finds the spans of table names inside a SQL statement without building a
//! full AST. The lexer skips comments and string literals, so keywords and
//! names that only appear inside them are never reported.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::ops::Range;

/// How a table identifier was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    None,
    Double,
    Backtick,
}

impl Quote {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'"' => Some(Quote::Double),
            b'`' => Some(Quote::Backtick),
            _ => None,
        }
    }

    /// Write `name` in this quoting style, doubling embedded quote chars
    pub fn write_quoted(self, name: &str, out: &mut String) {
        let q = match self {
            Quote::None => {
                out.push_str(name);
                return;
            }
            Quote::Double => '"',
            Quote::Backtick => '`',
        };
        out.push(q);
        for c in name.chars() {
            if c == q {
                out.push(q);
            }
            out.push(c);
        }
        out.push(q);
    }
}

/// A table name found in a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef<'a> {
    /// Byte range of the identifier in the statement, quotes included
    pub span: Range<usize>,
    /// Identifier text without quotes, doubled quote characters unescaped
    pub name: Cow<'a, str>,
    pub quote: Quote,
}

pub type TableRefs<'a> = SmallVec<[TableRef<'a>; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    /// FROM, USING: a comma separated table list follows
    ListClause,
    /// JOIN, INTO, UPDATE, TRUNCATE: one table follows
    SingleClause,
    /// IF, NOT, EXISTS, ONLY, LATERAL: skipped in table position
    Modifier,
    /// TABLE starts a list (DROP TABLE a, b) and is skipped in table position
    Table,
    Index,
    On,
    Distinct,
    As,
    /// Functions whose arguments use FROM as a separator
    FromFunction,
    Reserved,
}

const MAX_KEYWORD_LEN: usize = 16;

static KEYWORDS: Lazy<AHashMap<&'static str, Keyword>> = Lazy::new(|| {
    use Keyword::*;
    let mut map = AHashMap::new();
    for kw in ["FROM", "USING"] {
        map.insert(kw, ListClause);
    }
    for kw in ["JOIN", "INTO", "UPDATE", "TRUNCATE"] {
        map.insert(kw, SingleClause);
    }
    for kw in ["IF", "NOT", "EXISTS", "ONLY", "LATERAL"] {
        map.insert(kw, Modifier);
    }
    for kw in ["EXTRACT", "TRIM", "SUBSTRING", "POSITION", "OVERLAY"] {
        map.insert(kw, FromFunction);
    }
    map.insert("TABLE", Table);
    map.insert("INDEX", Index);
    map.insert("ON", On);
    map.insert("DISTINCT", Distinct);
    map.insert("AS", As);
    for kw in [
        "SELECT", "WHERE", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "NATURAL",
        "GROUP", "ORDER", "BY", "HAVING", "LIMIT", "OFFSET", "UNION", "EXCEPT", "INTERSECT",
        "WINDOW", "SET", "VALUES", "RETURNING", "FETCH", "FOR", "WITH", "QUALIFY", "DEFAULT",
        "SKIP", "NOWAIT", "OF", "SAMPLE", "TABLESAMPLE", "ANTI", "SEMI", "POSITIONAL", "ASOF",
        "PIVOT", "UNPIVOT", "WHEN", "THEN", "ELSE", "END", "AND", "OR", "DO", "CONFLICT",
    ] {
        map.insert(kw, Reserved);
    }
    map
});

fn classify(word: &str) -> Option<Keyword> {
    if word.len() > MAX_KEYWORD_LEN {
        return None;
    }
    let mut buf = [0u8; MAX_KEYWORD_LEN];
    for (dst, b) in buf.iter_mut().zip(word.bytes()) {
        *dst = b.to_ascii_uppercase();
    }
    let upper = std::str::from_utf8(&buf[..word.len()]).ok()?;
    KEYWORDS.get(upper).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Quoted(Quote),
    Dot,
    Comma,
    LParen,
    RParen,
    Semicolon,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(sql: &'a str) -> Self {
        Self {
            bytes: sql.as_bytes(),
            pos: 0,
        }
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) {
        let bytes = self.bytes;
        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if bytes[self.pos..].starts_with(b"--") {
                match memchr_newline(&bytes[self.pos..]) {
                    Some(off) => self.pos += off + 1,
                    None => self.pos = bytes.len(),
                }
            } else if bytes[self.pos..].starts_with(b"/*") {
                match find(&bytes[self.pos + 2..], b"*/") {
                    Some(off) => self.pos += off + 4,
                    None => self.pos = bytes.len(),
                }
            } else {
                return;
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_trivia();
        let bytes = self.bytes;
        let start = self.pos;
        let b = *bytes.get(start)?;

        let kind = match b {
            b'\'' => {
                self.pos = skip_string_literal(bytes, start + 1, false);
                TokenKind::Other
            }
            // E'...' takes C-style backslash escapes
            b'E' | b'e' if bytes.get(start + 1) == Some(&b'\'') => {
                self.pos = skip_string_literal(bytes, start + 2, true);
                TokenKind::Other
            }
            b'"' | b'`' => {
                let end = skip_quoted_ident(bytes, start + 1, b);
                self.pos = end;
                match Quote::from_byte(b) {
                    // An unterminated identifier is not reported as a name
                    Some(q) if end > start + 1 && bytes[end - 1] == b => TokenKind::Quoted(q),
                    _ => TokenKind::Other,
                }
            }
            b'.' => {
                self.pos += 1;
                TokenKind::Dot
            }
            b',' => {
                self.pos += 1;
                TokenKind::Comma
            }
            b'(' => {
                self.pos += 1;
                TokenKind::LParen
            }
            b')' => {
                self.pos += 1;
                TokenKind::RParen
            }
            b';' => {
                self.pos += 1;
                TokenKind::Semicolon
            }
            b'0'..=b'9' | b'$' => {
                self.pos += 1;
                while self.pos < bytes.len()
                    && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
                {
                    self.pos += 1;
                }
                TokenKind::Other
            }
            b if is_ident_start(b) => {
                self.pos += 1;
                while self.pos < bytes.len() && is_ident_char(bytes[self.pos]) {
                    self.pos += 1;
                }
                TokenKind::Word
            }
            _ => {
                self.pos += 1;
                TokenKind::Other
            }
        };

        Some(Token {
            kind,
            start,
            end: self.pos,
        })
    }
}

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

#[inline]
fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline]
fn memchr_newline(data: &[u8]) -> Option<usize> {
    data.iter().position(|&b| b == b'\n')
}

#[inline]
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Returns the position just past the closing quote of a '...' literal.
/// A doubled `''` is always an escape; backslash only when `backslash_escapes`.
fn skip_string_literal(bytes: &[u8], mut i: usize, backslash_escapes: bool) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if backslash_escapes => i += 2,
            b'\'' if bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b'\'' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Returns the position just past the closing quote; a doubled quote is an escape
fn skip_quoted_ident(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scan,
    /// A table name is expected next
    ExpectTable { list: bool },
    /// Just read a table name; an alias or `,` may follow in a list clause
    AfterTable { list: bool, alias_seen: bool },
}

/// Find every table reference in `sql`, in source order
pub fn find_table_refs(sql: &str) -> TableRefs<'_> {
    let mut lexer = Lexer::new(sql);
    let mut tokens: Vec<Token> = Vec::new();
    while let Some(tok) = lexer.next_token() {
        tokens.push(tok);
    }

    let mut refs = TableRefs::new();
    let mut state = State::Scan;
    // One entry per open paren: true when FROM inside it is an argument separator
    let mut parens: SmallVec<[bool; 8]> = SmallVec::new();
    let mut index_pending = false;
    let mut prev: Option<Keyword> = None;

    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        let kw = match tok.kind {
            TokenKind::Word => classify(token_text(sql, &tok)),
            _ => None,
        };

        match state {
            State::ExpectTable { list } => match tok.kind {
                TokenKind::Word if matches!(kw, Some(Keyword::Modifier | Keyword::Table)) => {
                    prev = kw;
                    i += 1;
                    continue;
                }
                TokenKind::Word if kw.is_none() => {
                    let (last, next) = qualified_name_end(&tokens, i);
                    refs.push(table_ref(sql, &tokens[last]));
                    state = State::AfterTable {
                        list,
                        alias_seen: false,
                    };
                    prev = None;
                    i = next;
                    continue;
                }
                TokenKind::Quoted(_) => {
                    let (last, next) = qualified_name_end(&tokens, i);
                    refs.push(table_ref(sql, &tokens[last]));
                    state = State::AfterTable {
                        list,
                        alias_seen: false,
                    };
                    prev = None;
                    i = next;
                    continue;
                }
                _ => state = State::Scan,
            },
            State::AfterTable { list, alias_seen } => match tok.kind {
                TokenKind::Comma if list => {
                    state = State::ExpectTable { list };
                    prev = None;
                    i += 1;
                    continue;
                }
                TokenKind::Word if list && kw == Some(Keyword::As) => {
                    prev = kw;
                    i += 1;
                    continue;
                }
                TokenKind::Word | TokenKind::Quoted(_) if list && !alias_seen && kw.is_none() => {
                    state = State::AfterTable {
                        list,
                        alias_seen: true,
                    };
                    prev = None;
                    i += 1;
                    continue;
                }
                _ => state = State::Scan,
            },
            State::Scan => {}
        }

        // Scan state: look for the keywords that introduce a table
        match tok.kind {
            TokenKind::Word => match kw {
                Some(Keyword::ListClause) => {
                    let is_from = token_text(sql, &tok).eq_ignore_ascii_case("FROM");
                    let in_function = parens.last().copied().unwrap_or(false);
                    let distinct_from = prev == Some(Keyword::Distinct);
                    if !(is_from && (in_function || distinct_from)) {
                        state = State::ExpectTable { list: true };
                    }
                }
                Some(Keyword::SingleClause) => state = State::ExpectTable { list: false },
                Some(Keyword::Table) => state = State::ExpectTable { list: true },
                Some(Keyword::Index) => index_pending = true,
                Some(Keyword::On) if index_pending => {
                    index_pending = false;
                    state = State::ExpectTable { list: false };
                }
                _ => {}
            },
            TokenKind::LParen => {
                parens.push(prev == Some(Keyword::FromFunction));
            }
            TokenKind::RParen => {
                parens.pop();
            }
            TokenKind::Semicolon => {
                parens.clear();
                index_pending = false;
            }
            _ => {}
        }

        prev = kw;
        i += 1;
    }

    refs
}

/// For a name starting at `start`, follow `a.b.c` and return the index of
/// the last segment and the index of the token after the name.
fn qualified_name_end(tokens: &[Token], start: usize) -> (usize, usize) {
    let mut last = start;
    let mut i = start + 1;
    while i + 1 < tokens.len()
        && tokens[i].kind == TokenKind::Dot
        && matches!(tokens[i + 1].kind, TokenKind::Word | TokenKind::Quoted(_))
    {
        last = i + 1;
        i += 2;
    }
    (last, i)
}

#[inline]
fn token_text<'a>(sql: &'a str, tok: &Token) -> &'a str {
    &sql[tok.start..tok.end]
}

fn table_ref<'a>(sql: &'a str, tok: &Token) -> TableRef<'a> {
    match tok.kind {
        TokenKind::Quoted(quote) => TableRef {
            span: tok.start..tok.end,
            name: unquote(&sql[tok.start + 1..tok.end - 1], quote),
            quote,
        },
        _ => TableRef {
            span: tok.start..tok.end,
            name: Cow::Borrowed(&sql[tok.start..tok.end]),
            quote: Quote::None,
        },
    }
}

/// Collapse doubled quote characters inside a quoted identifier
fn unquote(inner: &str, quote: Quote) -> Cow<'_, str> {
    let (single, doubled) = match quote {
        Quote::Double => ("\"", "\"\""),
        Quote::Backtick => ("`", "``"),
        Quote::None => return Cow::Borrowed(inner),
    };
    if inner.contains(doubled) {
        Cow::Owned(inner.replace(doubled, single))
    } else {
        Cow::Borrowed(inner)
    }
}
