//! Standalone command-line reindenter (spec §6), grounded on
//! `original_source/fish_indent.cpp`'s `indent` function: one pass over
//! the token stream, tracking a tab-stop depth that block keywords push
//! and `end`/`else`/`case` pop.

use fish_syntax::{TokenKind, Tokenizer, TokenizerFlags};

const BLOCK_KEYWORDS: &[&str] = &["if", "for", "while", "function", "begin", "switch"];

/// Reindents `source`, inserting a tab stop per nesting level before each
/// command when `do_indent` is true; when false, only the line-breaking
/// and spacing normalization happens (`--no-indent`).
pub fn reindent(source: &str, do_indent: bool) -> String {
    let mut out = String::new();
    let mut indent: i32 = 0;
    let mut is_command = true;
    let mut prev_kind: Option<TokenKind> = None;
    let mut prev_prev_kind: Option<TokenKind> = None;

    let mut tokenizer = Tokenizer::new(source, TokenizerFlags::SHOW_COMMENTS | TokenizerFlags::ACCEPT_UNFINISHED);
    while let Some(token) = tokenizer.next() {
        let text = token.text(source);
        match token.kind {
            TokenKind::String => {
                if is_command {
                    let mut next_indent = indent;
                    is_command = false;
                    if BLOCK_KEYWORDS.contains(&text) {
                        next_indent = indent + 1;
                    } else if text == "else" || text == "case" {
                        indent -= 1;
                    } else if text == "end" {
                        indent -= 1;
                        next_indent -= 1;
                    }
                    if do_indent && prev_kind != Some(TokenKind::Pipe) {
                        insert_tabs(&mut out, indent);
                    }
                    out.push_str(text);
                    indent = next_indent;
                } else {
                    if prev_kind != Some(TokenKind::RedirectFd) {
                        out.push(' ');
                    }
                    out.push_str(text);
                }
            }
            TokenKind::End => {
                if prev_kind != Some(TokenKind::End) || prev_prev_kind != Some(TokenKind::End) {
                    out.push('\n');
                }
                is_command = true;
            }
            TokenKind::Pipe => {
                out.push(' ');
                push_fd_prefix(&mut out, token.fd, 1, "^", ">");
                out.push_str(" | ");
                is_command = true;
            }
            TokenKind::RedirectOut => {
                out.push(' ');
                push_fd_redirect(&mut out, token.fd, 1, "^", "> ");
            }
            TokenKind::RedirectAppend => {
                out.push(' ');
                push_fd_redirect(&mut out, token.fd, 1, "^^", ">> ");
            }
            TokenKind::RedirectIn => {
                out.push(' ');
                push_fd_number(&mut out, token.fd, 0);
                out.push_str("< ");
            }
            TokenKind::RedirectFd | TokenKind::RedirectNoClobber => {
                out.push(' ');
                push_fd_number(&mut out, token.fd, 1);
                out.push_str(">& ");
            }
            TokenKind::Background => {
                out.push_str("&\n");
                is_command = true;
            }
            TokenKind::Comment => {
                if do_indent {
                    insert_tabs(&mut out, indent);
                }
                out.push_str(text);
            }
            TokenKind::Error => {
                out.push_str(text);
            }
        }
        prev_prev_kind = prev_kind;
        prev_kind = Some(token.kind);
    }
    out
}

fn insert_tabs(out: &mut String, indent: i32) {
    for _ in 0..indent.max(0) {
        out.push('\t');
    }
}

fn push_fd_prefix(out: &mut String, fd: Option<i32>, default: i32, caret: &str, plain: &str) {
    match fd {
        Some(2) => out.push_str(caret),
        Some(f) if f != default => {
            out.push_str(&f.to_string());
            out.push_str(plain);
        }
        _ => {}
    }
}

fn push_fd_number(out: &mut String, fd: Option<i32>, default: i32) {
    if let Some(f) = fd {
        if f != default {
            out.push_str(&f.to_string());
        }
    }
}

fn push_fd_redirect(out: &mut String, fd: Option<i32>, default: i32, caret: &str, plain_with_op: &str) {
    match fd {
        Some(2) => out.push_str(caret),
        Some(f) if f != default => {
            out.push_str(&f.to_string());
            out.push_str(plain_with_op);
        }
        _ => out.push_str(plain_with_op),
    }
}
