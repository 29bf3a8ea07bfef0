//! Rewrite the placeholders found in model-produced SQL into the backend's
//! native `$n` markers, binding the supplied parameters as we go.
//!
//! Three marker styles are accepted:
//!
//! * `?` takes the next parameter that has not been bound yet, in list order.
//! * `:name` takes the parameter called `name`. Using a name twice reuses the same
//!   marker. When no parameter carries that name we fall back to the next unbound
//!   parameter, which is what happens when the model names its markers and its
//!   parameters differently but lists them in the same order.
//! * `$n` refers to the n-th supplied parameter.
//!
//! Parameters matched by some `:name` in the template are reserved for it: neither
//! `?` nor the fallback of an unknown name will take them, wherever they appear.
//!
//! Casts (`::type`), quoted literals (including dollar quoting), quoted identifiers
//! and comments are copied through untouched.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use super::string::{Param, SQL};

/// A placeholder could not be bound to any supplied parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("no parameter supplied for placeholder '{0}'")]
    MissingParameter(String),
}

/// Normalize `template` against `params`. Only the parameters referenced by the
/// template are bound, in the order the rewritten template needs them.
pub fn normalize(template: &str, params: &[Param]) -> Result<SQL, BindError> {
    let tokens = tokenize(strip_trailing_semicolons(template));
    let mut binder = Binder::new(params);
    for token in &tokens {
        if let Token::Named(name) = token {
            binder.reserve(name);
        }
    }

    let mut sql = SQL::new();
    for token in &tokens {
        match token {
            Token::Text(text) => sql.append_syntax(text),
            Token::Named(name) => binder.named(name, &mut sql)?,
            Token::Positional => binder.positional(&mut sql)?,
            Token::Native(digits) => binder.native(digits, &mut sql)?,
        }
    }
    Ok(sql)
}

/// Drop any trailing `;` so the statement can be embedded in a larger one.
pub fn strip_trailing_semicolons(template: &str) -> &str {
    let mut trimmed = template.trim();
    while let Some(rest) = trimmed.strip_suffix(';') {
        trimmed = rest.trim_end();
    }
    trimmed
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Copied to the output as is.
    Text(String),
    Named(String),
    Positional,
    Native(String),
}

fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = vec![];
    let mut text = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        let marker = match c {
            '\'' | '"' => {
                text.push(c);
                copy_until(&mut chars, &mut text, |seen| seen.ends_with(c));
                None
            }
            '-' if chars.peek() == Some(&'-') => {
                text.push(c);
                copy_until(&mut chars, &mut text, |seen| seen.ends_with('\n'));
                None
            }
            '/' if chars.peek() == Some(&'*') => {
                text.push(c);
                if let Some(star) = chars.next() {
                    text.push(star);
                }
                copy_until(&mut chars, &mut text, |seen| seen.ends_with("*/"));
                None
            }
            ':' => match chars.peek() {
                Some(':') => {
                    chars.next();
                    text.push_str("::");
                    None
                }
                Some(&next) if is_identifier_start(next) => {
                    Some(Token::Named(take_while(&mut chars, is_identifier_char)))
                }
                _ => {
                    text.push(c);
                    None
                }
            },
            '?' => Some(Token::Positional),
            '$' if chars.peek().is_some_and(char::is_ascii_digit) => {
                Some(Token::Native(take_while(&mut chars, |d| d.is_ascii_digit())))
            }
            '$' => {
                text.push(c);
                if let Some(tag) = dollar_quote_tag(&mut chars) {
                    let closer = format!("${tag}$");
                    text.push_str(&tag);
                    text.push('$');
                    copy_until(&mut chars, &mut text, |seen| seen.ends_with(&closer));
                }
                None
            }
            _ => {
                text.push(c);
                None
            }
        };
        if let Some(marker) = marker {
            if !text.is_empty() {
                tokens.push(Token::Text(std::mem::take(&mut text)));
            }
            tokens.push(marker);
        }
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// After a `$`, consume the rest of a dollar-quote opener (`$$` or `$tag$`) and
/// return its tag. Nothing is consumed when the input is not an opener.
fn dollar_quote_tag(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut lookahead = chars.clone();
    let mut tag = String::new();
    while let Some(&c) = lookahead.peek() {
        if c == '$' {
            lookahead.next();
            *chars = lookahead;
            return Some(tag);
        }
        let allowed = if tag.is_empty() {
            is_identifier_start(c)
        } else {
            is_identifier_char(c)
        };
        if !allowed {
            return None;
        }
        tag.push(c);
        lookahead.next();
    }
    None
}

struct Binder<'a> {
    supplied: &'a [Param],
    /// The placeholder index each supplied parameter was bound to, if any.
    assigned: Vec<Option<usize>>,
    /// Parameters some `:name` in the template matches by name.
    reserved: Vec<bool>,
    by_name: HashMap<String, usize>,
}

impl<'a> Binder<'a> {
    fn new(supplied: &'a [Param]) -> Self {
        Binder {
            supplied,
            assigned: vec![None; supplied.len()],
            reserved: vec![false; supplied.len()],
            by_name: HashMap::new(),
        }
    }

    fn matching(&self, name: &str) -> Option<usize> {
        self.supplied
            .iter()
            .position(|param| param.name.trim_start_matches(':') == name)
    }

    fn reserve(&mut self, name: &str) {
        if let Some(position) = self.matching(name) {
            self.reserved[position] = true;
        }
    }

    fn positional(&mut self, sql: &mut SQL) -> Result<(), BindError> {
        let position = self
            .next_unbound()
            .ok_or_else(|| BindError::MissingParameter("?".to_string()))?;
        self.bind(position, sql);
        Ok(())
    }

    fn named(&mut self, name: &str, sql: &mut SQL) -> Result<(), BindError> {
        if let Some(&index) = self.by_name.get(name) {
            sql.append_placeholder(index);
            return Ok(());
        }
        let position = self
            .matching(name)
            .or_else(|| self.next_unbound())
            .ok_or_else(|| BindError::MissingParameter(format!(":{name}")))?;
        let index = self.bind(position, sql);
        self.by_name.insert(name.to_string(), index);
        Ok(())
    }

    fn native(&mut self, digits: &str, sql: &mut SQL) -> Result<(), BindError> {
        let position = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|position| *position < self.supplied.len())
            .ok_or_else(|| BindError::MissingParameter(format!("${digits}")))?;
        self.bind(position, sql);
        Ok(())
    }

    fn bind(&mut self, position: usize, sql: &mut SQL) -> usize {
        if let Some(index) = self.assigned[position] {
            sql.append_placeholder(index);
            index
        } else {
            let index = sql.append_param(self.supplied[position].clone());
            self.assigned[position] = Some(index);
            index
        }
    }

    /// The first parameter that is neither bound nor reserved for a name.
    fn next_unbound(&self) -> Option<usize> {
        self.assigned
            .iter()
            .zip(&self.reserved)
            .position(|(assigned, reserved)| assigned.is_none() && !reserved)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn take_while(chars: &mut Peekable<Chars<'_>>, predicate: impl Fn(char) -> bool) -> String {
    let mut taken = String::new();
    while let Some(&c) = chars.peek() {
        if !predicate(c) {
            break;
        }
        taken.push(c);
        chars.next();
    }
    taken
}

/// Copy characters verbatim until `done` holds for what has been copied since the call.
fn copy_until(chars: &mut Peekable<Chars<'_>>, text: &mut String, done: impl Fn(&str) -> bool) {
    let mut seen = String::new();
    for c in chars.by_ref() {
        text.push(c);
        seen.push(c);
        if done(&seen) {
            break;
        }
    }
}
