//! Positional fields and `KEY=value` options of a logical command.

use std::str::FromStr;

use crate::molfile::error::{FieldError, MolfileError};

/// Options of one record in the order they first appeared.
///
/// A key given twice keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<(String, String)>,
}

impl Options {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits option text into key/value pairs.
///
/// Each fragment is tried as `KEY=(...)` first, then `KEY="..."`, then
/// `KEY=token`. Parenthesized values are returned without the parentheses
/// and may contain spaces. An opening parenthesis that is never closed is
/// read as a plain token. Scanning stops at the first fragment that is not
/// an option; that text is returned as the second element.
pub fn parse_options(text: &str) -> (Options, Option<String>) {
    let mut options = Options::default();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        let Some((key, after)) = split_key(rest) else {
            break;
        };
        let (value, remaining) = if let Some(inner) = after.strip_prefix('(') {
            match inner.find(')') {
                Some(close) => (inner[..close].trim().to_owned(), &inner[close + 1..]),
                None => split_token(after),
            }
        } else if after.starts_with('"') {
            split_quoted(after).unwrap_or_else(|| split_token(after))
        } else {
            split_token(after)
        };
        tracing::trace!(key, value = %value, "option");
        options.insert(key, value);
        rest = remaining.trim_start();
    }

    let trailing = (!rest.is_empty()).then(|| rest.to_owned());
    (options, trailing)
}

fn split_key(text: &str) -> Option<(&str, &str)> {
    let eq = text.find('=')?;
    let key = &text[..eq];
    let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| (key, &text[eq + 1..]))
}

fn split_token(text: &str) -> (String, &str) {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    (text[..end].to_owned(), &text[end..])
}

/// Reads a double-quoted value in which `""` stands for one quote.
fn split_quoted(text: &str) -> Option<(String, &str)> {
    let body = text.strip_prefix('"')?;
    let mut value = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '"' {
            value.push(c);
            continue;
        }
        if let Some(&(_, '"')) = chars.peek() {
            chars.next();
            value.push('"');
        } else {
            return Some((value, &body[i + 1..]));
        }
    }
    None
}

/// A count-prefixed list such as `3 1 2 3`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdList {
    /// The leading count, which need not match `ids.len()`.
    pub declared: usize,
    pub ids: Vec<u32>,
}

/// Reads every id after the leading count.
pub fn parse_id_list(value: &str) -> Result<IdList, FieldError> {
    let mut tokens = value.split_whitespace();
    let declared: usize = match tokens.next() {
        Some(token) => token.parse()?,
        None => return Ok(IdList::default()),
    };
    let ids = tokens
        .map(|t| t.parse::<u32>().map_err(FieldError::from))
        .collect::<Result<_, _>>()?;
    Ok(IdList { declared, ids })
}

/// Cursor over the whitespace-separated positional fields of a command.
pub struct Fields<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Fields<'a> {
    pub fn new(text: &'a str, line: usize) -> Self {
        Self {
            rest: text.trim_start(),
            line,
        }
    }

    /// Next field, or a format error naming the missing `field`.
    pub fn next_token(&mut self, field: &str) -> Result<&'a str, MolfileError> {
        if self.rest.is_empty() {
            return Err(MolfileError::format(
                self.line,
                format!("missing {} field", field),
            ));
        }
        let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
        let token = &self.rest[..end];
        self.rest = self.rest[end..].trim_start();
        Ok(token)
    }

    /// Next field converted with [`FromStr`].
    pub fn next_parsed<T>(&mut self, field: &str) -> Result<T, MolfileError>
    where
        T: FromStr,
        T::Err: Into<FieldError>,
    {
        let token = self.next_token(field)?;
        token
            .parse()
            .map_err(|e: T::Err| MolfileError::field(self.line, field, token, e))
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Unconsumed text, usually the option suffix.
    pub fn rest(&self) -> &'a str {
        self.rest
    }
}
