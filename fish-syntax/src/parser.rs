//! LL(2) recursive-descent parser that builds a flat [`ParseNode`] tree.
//!
//! The grammar is consumed by mutual recursion (the call stack plays the
//! role of the "stack of expected symbols" the specification describes).
//! Each production builds a small in-memory arena node with its own
//! `Vec<usize>` of children; once parsing finishes, [`linearize`] relays
//! the arena out in breadth-first order so that, in the final tree, every
//! node's direct children occupy a contiguous range — the layout the data
//! model promises callers (`child_start`, `child_count`).

use crate::error::{ErrorCode, ParseError};
use crate::node::{NodeTag, NodeType, ParseNode};
use crate::token::{Token, TokenKind};
use crate::tokenizer::{Tokenizer, TokenizerFlags};
use bitflags::bitflags;
use std::collections::VecDeque;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ParseFlags: u8 {
        /// Resynchronize at the next `End`/`Pipe` after an error instead of
        /// aborting the whole parse.
        const CONTINUE_AFTER_ERROR = 1 << 0;
        /// Allow a production to end mid-way (cursor sits inside a partial
        /// command line being typed).
        const ACCEPT_INCOMPLETE = 1 << 1;
        /// Insert comment nodes between jobs instead of discarding them.
        const INCLUDE_COMMENTS = 1 << 2;
    }
}

/// A word-like keyword recognized only when it appears where the grammar
/// expects a keyword (elsewhere it is an ordinary command/argument word).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Keyword {
    If,
    Else,
    End,
    For,
    In,
    While,
    Begin,
    Function,
    Switch,
    Case,
    And,
    Or,
    Not,
    Command,
    Builtin,
}

fn keyword_of(text: &str) -> Option<Keyword> {
    Some(match text {
        "if" => Keyword::If,
        "else" => Keyword::Else,
        "end" => Keyword::End,
        "for" => Keyword::For,
        "in" => Keyword::In,
        "while" => Keyword::While,
        "begin" => Keyword::Begin,
        "function" => Keyword::Function,
        "switch" => Keyword::Switch,
        "case" => Keyword::Case,
        "and" => Keyword::And,
        "or" => Keyword::Or,
        "not" => Keyword::Not,
        "command" => Keyword::Command,
        "builtin" => Keyword::Builtin,
        _ => return None,
    })
}

/// An in-progress arena node, built during the recursive descent.
struct Arena {
    node_type: NodeType,
    tag: NodeTag,
    source_start: usize,
    source_length: usize,
    children: Vec<usize>,
}

/// Output of a full parse.
pub struct ParseOutput {
    pub nodes: Vec<ParseNode>,
    pub errors: Vec<ParseError>,
}

struct Cursor<'s> {
    tokens: Vec<Token>,
    source: &'s str,
    pos: usize,
    include_comments: bool,
}

impl<'s> Cursor<'s> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn take_pending_comment(&mut self) -> Option<Token> {
        if self.include_comments {
            if let Some(t) = self.peek() {
                if t.kind == TokenKind::Comment {
                    return self.advance();
                }
            }
        }
        None
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

/// LL(2) parser over the grammar in the specification.
pub struct Parser<'s> {
    source: &'s str,
    cursor: Cursor<'s>,
    flags: ParseFlags,
    arena: Vec<Arena>,
    errors: Vec<ParseError>,
    /// End offset of the most recently consumed token; used to close off
    /// a node's `source_length` once its production finishes.
    last_consumed_end: usize,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str, flags: ParseFlags) -> Self {
        let mut tflags = TokenizerFlags::empty();
        if flags.contains(ParseFlags::ACCEPT_INCOMPLETE) {
            tflags |= TokenizerFlags::ACCEPT_UNFINISHED;
        }
        if flags.contains(ParseFlags::INCLUDE_COMMENTS) {
            tflags |= TokenizerFlags::SHOW_COMMENTS;
        }
        if flags.contains(ParseFlags::CONTINUE_AFTER_ERROR) {
            tflags |= TokenizerFlags::SQUASH_ERRORS;
        }
        let mut tokenizer = Tokenizer::new(source, tflags);
        let mut tokens = Vec::new();
        while let Some(tok) = tokenizer.next() {
            tokens.push(tok);
        }
        let cursor = Cursor { tokens, source, pos: 0, include_comments: flags.contains(ParseFlags::INCLUDE_COMMENTS) };
        Parser { source, cursor, flags, arena: Vec::new(), errors: Vec::new(), last_consumed_end: 0 }
    }

    /// Parses the whole source as a job list (the root production) and
    /// returns the flat tree plus any accumulated errors.
    pub fn parse(mut self) -> ParseOutput {
        let root = self.new_node(NodeType::JobList, NodeTag::None, self.cursor.pos);
        self.parse_job_list_into(root, true);
        self.close(root);
        self.run_tokenizer_errors();
        self.run_semantic_pass();
        let nodes = linearize(self.arena, root);
        ParseOutput { nodes, errors: self.errors }
    }

    fn new_node(&mut self, node_type: NodeType, tag: NodeTag, token_pos: usize) -> usize {
        let source_start = self.cursor.tokens.get(token_pos).map(|t| t.source_start).unwrap_or(self.source.len());
        let idx = self.arena.len();
        self.arena.push(Arena { node_type, tag, source_start, source_length: 0, children: Vec::new() });
        idx
    }

    fn close(&mut self, idx: usize) {
        let start = self.arena[idx].source_start;
        let end = self.last_consumed_end.max(start);
        self.arena[idx].source_length = end - start;
    }

    fn attach(&mut self, parent: usize, child: usize) {
        self.arena[parent].children.push(child);
    }

    fn keyword_text(&self, tok: &Token) -> Option<Keyword> {
        if tok.kind != TokenKind::String || tok.quote_char.is_some() {
            return None;
        }
        keyword_of(tok.text(self.source))
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        self.cursor.peek().and_then(|t| self.keyword_text(t))
    }

    fn peek_keyword_at(&self, n: usize) -> Option<Keyword> {
        self.cursor.peek_nth(n).and_then(|t| self.keyword_text(t))
    }

    fn error(&mut self, code: ErrorCode, start: usize, length: usize) {
        self.errors.push(ParseError::new(code, code.label(), start, length));
    }

    fn record_consumed(&mut self, tok: &Token) {
        self.last_consumed_end = tok.source_end();
    }
}

// --- grammar productions -----------------------------------------------

impl<'s> Parser<'s> {
    fn parse_job_list_into(&mut self, parent: usize, top_level: bool) {
        loop {
            if let Some(comment) = self.cursor.take_pending_comment() {
                let idx = self.new_node(NodeType::Comment, NodeTag::None, 0);
                self.arena[idx].source_start = comment.source_start;
                self.arena[idx].source_length = comment.source_length;
                self.record_consumed(&comment);
                self.attach(parent, idx);
                continue;
            }
            let Some(tok) = self.cursor.peek().cloned() else { break };
            match tok.kind {
                TokenKind::End => {
                    self.cursor.advance();
                    self.record_consumed(&tok);
                    continue;
                }
                TokenKind::Error => {
                    self.report_tokenizer_error(&tok);
                    self.cursor.advance();
                    self.record_consumed(&tok);
                    if self.flags.contains(ParseFlags::CONTINUE_AFTER_ERROR) {
                        continue;
                    }
                    break;
                }
                _ => {}
            }
            if let Some(kw) = self.keyword_text(&tok) {
                if matches!(kw, Keyword::Else | Keyword::End | Keyword::Case) {
                    if top_level {
                        let code = match kw {
                            Keyword::Else => ErrorCode::UnbalancingElse,
                            Keyword::Case => ErrorCode::UnbalancingCase,
                            _ => ErrorCode::UnbalancingEnd,
                        };
                        self.error(code, tok.source_start, tok.source_length);
                        self.cursor.advance();
                        self.record_consumed(&tok);
                        if self.flags.contains(ParseFlags::CONTINUE_AFTER_ERROR) {
                            continue;
                        }
                    }
                    break;
                }
            }
            let job = self.parse_job();
            self.attach(parent, job);
        }
    }

    fn parse_job(&mut self) -> usize {
        let idx = self.new_node(NodeType::Job, NodeTag::None, self.cursor.pos);
        let first = self.parse_statement();
        self.attach(idx, first);
        while let Some(tok) = self.cursor.peek().cloned() {
            if tok.kind != TokenKind::Pipe {
                break;
            }
            self.cursor.advance();
            self.record_consumed(&tok);
            if self.cursor.peek().map(|t| t.kind) == Some(TokenKind::Pipe) {
                self.error(ErrorCode::DoublePipe, tok.source_start, tok.source_length);
                break;
            }
            let stmt = self.parse_statement();
            self.attach(idx, stmt);
        }
        if let Some(tok) = self.cursor.peek().cloned() {
            if tok.kind == TokenKind::Background {
                self.cursor.advance();
                self.record_consumed(&tok);
                if self.cursor.peek().map(|t| t.kind) == Some(TokenKind::Background) {
                    self.error(ErrorCode::DoubleBackground, tok.source_start, tok.source_length);
                }
            }
        }
        self.close(idx);
        idx
    }

    fn parse_statement(&mut self) -> usize {
        match self.peek_keyword() {
            Some(Keyword::And) => self.parse_boolean_statement(NodeTag::And),
            Some(Keyword::Or) => self.parse_boolean_statement(NodeTag::Or),
            Some(Keyword::Not) => self.parse_boolean_statement(NodeTag::Not),
            Some(Keyword::If) => self.parse_if_statement(),
            Some(Keyword::Switch) => self.parse_switch_statement(),
            Some(Keyword::For) | Some(Keyword::While) | Some(Keyword::Begin) | Some(Keyword::Function) => {
                self.parse_block_statement()
            }
            _ => self.parse_decorated_statement(),
        }
    }

    fn parse_boolean_statement(&mut self, tag: NodeTag) -> usize {
        let idx = self.new_node(NodeType::BooleanStatement, tag, self.cursor.pos);
        let kw = self.cursor.advance().unwrap();
        self.record_consumed(&kw);
        let inner = self.parse_statement();
        self.attach(idx, inner);
        self.close(idx);
        idx
    }

    fn parse_decorated_statement(&mut self) -> usize {
        let idx = self.new_node(NodeType::DecoratedStatement, NodeTag::None, self.cursor.pos);
        // Two-token lookahead: `command --help` is plain (command is the
        // argument), but `command foo` decorates `foo`.
        let tag = match self.peek_keyword() {
            Some(Keyword::Command) if self.decoration_applies(1) => {
                let kw = self.cursor.advance().unwrap();
                self.record_consumed(&kw);
                NodeTag::Command
            }
            Some(Keyword::Builtin) if self.decoration_applies(1) => {
                let kw = self.cursor.advance().unwrap();
                self.record_consumed(&kw);
                NodeTag::Builtin
            }
            _ => NodeTag::None,
        };
        self.arena[idx].tag = tag;
        let plain = self.parse_plain_statement();
        self.attach(idx, plain);
        self.close(idx);
        idx
    }

    /// A decoration keyword only decorates when a second token follows
    /// that is not itself an option-looking word (`command --help` keeps
    /// `command` as the plain statement's own name).
    fn decoration_applies(&self, ahead: usize) -> bool {
        match self.cursor.peek_nth(ahead) {
            Some(t) if t.kind == TokenKind::String => {
                let text = t.text(self.source);
                !text.starts_with('-')
            }
            _ => false,
        }
    }

    fn parse_plain_statement(&mut self) -> usize {
        let idx = self.new_node(NodeType::PlainStatement, NodeTag::None, self.cursor.pos);
        match self.cursor.peek().cloned() {
            Some(tok) if tok.kind == TokenKind::Error => {
                self.report_tokenizer_error(&tok);
                self.cursor.advance();
                self.record_consumed(&tok);
            }
            Some(_) => {
                let tok = self.cursor.advance().unwrap();
                self.record_consumed(&tok);
                self.parse_args_or_redirs(idx);
            }
            None if !self.flags.contains(ParseFlags::ACCEPT_INCOMPLETE) => {
                self.error(ErrorCode::UnexpectedToken, self.source.len(), 0);
            }
            None => {}
        }
        self.close(idx);
        idx
    }

    fn parse_args_or_redirs(&mut self, parent: usize) {
        loop {
            let Some(tok) = self.cursor.peek().cloned() else { break };
            match tok.kind {
                TokenKind::String => {
                    let arg = self.parse_argument();
                    self.attach(parent, arg);
                }
                TokenKind::RedirectOut
                | TokenKind::RedirectAppend
                | TokenKind::RedirectIn
                | TokenKind::RedirectFd
                | TokenKind::RedirectNoClobber => {
                    let r = self.parse_redirection();
                    self.attach(parent, r);
                }
                _ => break,
            }
        }
    }

    fn parse_argument(&mut self) -> usize {
        let idx = self.new_node(NodeType::Argument, NodeTag::None, self.cursor.pos);
        let tok = self.cursor.advance().unwrap();
        self.record_consumed(&tok);
        self.close(idx);
        idx
    }

    fn parse_redirection(&mut self) -> usize {
        let idx = self.new_node(NodeType::Redirection, NodeTag::None, self.cursor.pos);
        let op = self.cursor.advance().unwrap();
        let op_kind = op.kind;
        self.record_consumed(&op);
        let op_node = self.new_node(NodeType::Terminal(op_kind), NodeTag::None, 0);
        self.arena[op_node].source_start = op.source_start;
        self.arena[op_node].source_length = op.source_length;
        self.attach(idx, op_node);
        if let Some(tok) = self.cursor.peek().cloned() {
            if tok.kind == TokenKind::String {
                let target = self.parse_argument();
                self.attach(idx, target);
            } else if !self.flags.contains(ParseFlags::ACCEPT_INCOMPLETE) {
                self.error(ErrorCode::GenericSyntax, op.source_start, op.source_length);
            }
        } else if !self.flags.contains(ParseFlags::ACCEPT_INCOMPLETE) {
            self.error(ErrorCode::GenericSyntax, op.source_start, op.source_length);
        }
        self.close(idx);
        idx
    }

    fn expect_keyword(&mut self, kw: Keyword, code: ErrorCode) -> bool {
        if self.peek_keyword() == Some(kw) {
            let tok = self.cursor.advance().unwrap();
            self.record_consumed(&tok);
            true
        } else if self.flags.contains(ParseFlags::ACCEPT_INCOMPLETE) {
            false
        } else {
            let (start, len) = self
                .cursor
                .peek()
                .map(|t| (t.source_start, t.source_length))
                .unwrap_or((self.source.len(), 0));
            self.error(code, start, len);
            false
        }
    }

    fn parse_if_statement(&mut self) -> usize {
        let idx = self.new_node(NodeType::BlockStatement, NodeTag::None, self.cursor.pos);
        let clause = self.parse_if_clause();
        self.attach(idx, clause);
        let else_clause = self.parse_else_clause();
        if let Some(e) = else_clause {
            self.attach(idx, e);
        }
        self.expect_keyword(Keyword::End, ErrorCode::UnbalancingEnd);
        self.parse_args_or_redirs(idx);
        self.close(idx);
        idx
    }

    fn parse_if_clause(&mut self) -> usize {
        let idx = self.new_node(NodeType::IfClause, NodeTag::None, self.cursor.pos);
        let kw = self.cursor.advance().unwrap(); // "if"
        self.record_consumed(&kw);
        let cond = self.parse_job();
        self.attach(idx, cond);
        self.consume_end_token();
        let body = self.new_node(NodeType::JobList, NodeTag::None, self.cursor.pos);
        self.parse_job_list_into(body, false);
        self.close(body);
        self.attach(idx, body);
        self.close(idx);
        idx
    }

    fn consume_end_token(&mut self) {
        if let Some(tok) = self.cursor.peek().cloned() {
            if tok.kind == TokenKind::End {
                self.cursor.advance();
                self.record_consumed(&tok);
            }
        }
    }

    fn parse_else_clause(&mut self) -> Option<usize> {
        if self.peek_keyword() != Some(Keyword::Else) {
            return None;
        }
        let idx = self.new_node(NodeType::ElseClause, NodeTag::None, self.cursor.pos);
        let kw = self.cursor.advance().unwrap();
        self.record_consumed(&kw);
        if self.peek_keyword() == Some(Keyword::If) {
            let clause = self.parse_if_clause();
            self.attach(idx, clause);
            if let Some(more) = self.parse_else_clause() {
                self.attach(idx, more);
            }
        } else {
            self.consume_end_token();
            let body = self.new_node(NodeType::JobList, NodeTag::None, self.cursor.pos);
            self.parse_job_list_into(body, false);
            self.close(body);
            self.attach(idx, body);
        }
        self.close(idx);
        Some(idx)
    }

    fn parse_switch_statement(&mut self) -> usize {
        let idx = self.new_node(NodeType::BlockStatement, NodeTag::None, self.cursor.pos);
        let kw = self.cursor.advance().unwrap(); // "switch"
        self.record_consumed(&kw);
        if self.cursor.peek().map(|t| t.kind) == Some(TokenKind::String) {
            let value = self.parse_argument();
            self.attach(idx, value);
        }
        self.consume_end_token();
        loop {
            if self.peek_keyword() != Some(Keyword::Case) {
                break;
            }
            let case = self.parse_case_item();
            self.attach(idx, case);
        }
        self.expect_keyword(Keyword::End, ErrorCode::UnbalancingEnd);
        self.parse_args_or_redirs(idx);
        self.close(idx);
        idx
    }

    fn parse_case_item(&mut self) -> usize {
        let idx = self.new_node(NodeType::CaseItem, NodeTag::None, self.cursor.pos);
        let kw = self.cursor.advance().unwrap(); // "case"
        self.record_consumed(&kw);
        let args = self.new_node(NodeType::ArgumentList, NodeTag::None, self.cursor.pos);
        while self.cursor.peek().map(|t| t.kind) == Some(TokenKind::String) {
            let arg = self.parse_argument();
            self.attach(args, arg);
        }
        self.close(args);
        self.attach(idx, args);
        self.consume_end_token();
        let body = self.new_node(NodeType::JobList, NodeTag::None, self.cursor.pos);
        self.parse_job_list_into(body, false);
        self.close(body);
        self.attach(idx, body);
        self.close(idx);
        idx
    }

    fn parse_block_statement(&mut self) -> usize {
        let idx = self.new_node(NodeType::BlockStatement, NodeTag::None, self.cursor.pos);
        let header = self.parse_block_header();
        self.attach(idx, header);
        self.consume_end_token();
        let body = self.new_node(NodeType::JobList, NodeTag::None, self.cursor.pos);
        self.parse_job_list_into(body, false);
        self.close(body);
        self.attach(idx, body);
        self.expect_keyword(Keyword::End, ErrorCode::UnbalancingEnd);
        self.parse_args_or_redirs(idx);
        self.close(idx);
        idx
    }

    fn parse_block_header(&mut self) -> usize {
        match self.peek_keyword() {
            Some(Keyword::For) => {
                let idx = self.new_node(NodeType::ForHeader, NodeTag::None, self.cursor.pos);
                let kw = self.cursor.advance().unwrap();
                self.record_consumed(&kw);
                if self.cursor.peek().map(|t| t.kind) == Some(TokenKind::String) {
                    let var = self.parse_argument();
                    self.attach(idx, var);
                }
                self.expect_keyword(Keyword::In, ErrorCode::UnexpectedToken);
                let list_idx = idx;
                self.parse_args_or_redirs(list_idx);
                self.close(idx);
                idx
            }
            Some(Keyword::While) => {
                let idx = self.new_node(NodeType::WhileHeader, NodeTag::None, self.cursor.pos);
                let kw = self.cursor.advance().unwrap();
                self.record_consumed(&kw);
                let cond = self.parse_statement();
                self.attach(idx, cond);
                self.close(idx);
                idx
            }
            Some(Keyword::Begin) => {
                let idx = self.new_node(NodeType::BeginHeader, NodeTag::None, self.cursor.pos);
                let kw = self.cursor.advance().unwrap();
                self.record_consumed(&kw);
                self.close(idx);
                idx
            }
            Some(Keyword::Function) => {
                let idx = self.new_node(NodeType::FunctionHeader, NodeTag::None, self.cursor.pos);
                let kw = self.cursor.advance().unwrap();
                self.record_consumed(&kw);
                if self.cursor.peek().map(|t| t.kind) == Some(TokenKind::String) {
                    let name = self.parse_argument();
                    self.attach(idx, name);
                }
                while self.cursor.peek().map(|t| t.kind) == Some(TokenKind::String) {
                    let arg = self.parse_argument();
                    self.attach(idx, arg);
                }
                self.close(idx);
                idx
            }
            _ => unreachable!("parse_block_header called without a block keyword"),
        }
    }

    /// Turns a tokenizer-level `Error` token (unterminated quote/subshell,
    /// invalid escape) into a parse error, unless the cursor is in
    /// incomplete-accepting mode (interactive typing mid-construct).
    fn report_tokenizer_error(&mut self, tok: &Token) {
        if self.flags.contains(ParseFlags::ACCEPT_INCOMPLETE) {
            return;
        }
        let code = match tok.error_kind {
            Some(crate::token::TokenErrorKind::UnterminatedQuote) => ErrorCode::TokenizerUnterminatedQuote,
            Some(crate::token::TokenErrorKind::UnterminatedSubshell) => ErrorCode::TokenizerUnterminatedSubshell,
            Some(crate::token::TokenErrorKind::UnterminatedEscape) => ErrorCode::TokenizerUnterminatedEscape,
            _ => ErrorCode::GenericSyntax,
        };
        self.error(code, tok.source_start, tok.source_length);
    }

    /// Catches a tokenizer error token that the job-list loop never saw
    /// because it occurred while parsing a nested production (e.g. inside
    /// an argument list) that stopped short.
    fn run_tokenizer_errors(&mut self) {
        if let Some(tok) = self.cursor.tokens.get(self.cursor.pos).cloned() {
            if tok.kind == TokenKind::Error {
                self.report_tokenizer_error(&tok);
            }
        }
    }

    /// Cross-cutting syntax rules that don't fall out of the grammar
    /// shape alone: a backgrounded job immediately followed by `and`/`or`.
    fn run_semantic_pass(&mut self) {
        // Re-walk the token stream (cheap: tokens are already materialized)
        // looking for `&` directly followed by a `and`/`or` decorated
        // statement as the next job.
        for i in 0..self.cursor.tokens.len() {
            let tok = &self.cursor.tokens[i];
            if tok.kind != TokenKind::Background {
                continue;
            }
            let mut j = i + 1;
            while let Some(t) = self.cursor.tokens.get(j) {
                if t.kind == TokenKind::End {
                    j += 1;
                    continue;
                }
                break;
            }
            if let Some(t) = self.cursor.tokens.get(j) {
                if t.kind == TokenKind::String && t.quote_char.is_none() {
                    let text = t.text(self.source);
                    if text == "and" || text == "or" {
                        self.error(ErrorCode::GenericSyntax, tok.source_start, tok.source_length);
                    }
                }
            }
        }
    }
}

/// Converts the recursive-descent arena into the flat, breadth-first
/// [`ParseNode`] vector the data model promises: every node's direct
/// children occupy one contiguous range.
fn linearize(arena: Vec<Arena>, root: usize) -> Vec<ParseNode> {
    let mut out = Vec::with_capacity(arena.len());
    out.push(ParseNode {
        node_type: arena[root].node_type,
        source_start: arena[root].source_start,
        source_length: arena[root].source_length,
        child_start: 0,
        child_count: 0,
        parent_index: 0,
        tag: arena[root].tag,
    });
    let mut queue = VecDeque::new();
    queue.push_back((root, 0usize));
    while let Some((arena_idx, out_idx)) = queue.pop_front() {
        let children = &arena[arena_idx].children;
        let child_start = out.len();
        for &child_arena_idx in children {
            out.push(ParseNode {
                node_type: arena[child_arena_idx].node_type,
                source_start: arena[child_arena_idx].source_start,
                source_length: arena[child_arena_idx].source_length,
                child_start: 0,
                child_count: 0,
                parent_index: out_idx,
                tag: arena[child_arena_idx].tag,
            });
        }
        out[out_idx].child_start = child_start;
        out[out_idx].child_count = children.len();
        for (offset, &child_arena_idx) in children.iter().enumerate() {
            queue.push_back((child_arena_idx, child_start + offset));
        }
    }
    out
}
