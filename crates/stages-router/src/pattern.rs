//! Route pattern compilation.
//!
//! A pattern is a slash-delimited path template where typed placeholders
//! (`:num`, `:alpha`, `:alnum`, `:any`) stand in for path segments. Wrapping a
//! placeholder in parentheses, as in `constructionStages/(:num)`, turns it into
//! a captured parameter. All other characters match literally.

use regex::{Regex, RegexBuilder};

use crate::RouterError;

/// A typed placeholder recognised inside a route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `:num`, one or more ASCII digits
    Num,
    /// `:alpha`, one or more ASCII letters
    Alpha,
    /// `:alnum`, one or more ASCII letters or digits
    Alnum,
    /// `:any`, any non-empty run of characters other than `/`
    Any,
}

impl Placeholder {
    /// Looks up a placeholder by its name (without the leading colon).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "num" => Some(Self::Num),
            "alpha" => Some(Self::Alpha),
            "alnum" => Some(Self::Alnum),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Regular-expression fragment substituted for this placeholder.
    pub const fn fragment(self) -> &'static str {
        match self {
            Self::Num => "[0-9]+",
            Self::Alpha => "[a-zA-Z]+",
            Self::Alnum => "[a-zA-Z0-9]+",
            Self::Any => "[^/]+",
        }
    }
}

/// Trims leading and trailing slashes, the normal form for both patterns and
/// request paths.
pub fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Compiles a pattern into an anchored, case-insensitive regex.
pub(crate) fn compile(pattern: &str) -> Result<Regex, RouterError> {
    let source = translate(pattern)?;
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|source| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn translate(pattern: &str) -> Result<String, RouterError> {
    let trimmed = normalize(pattern);
    let mut out = String::with_capacity(trimmed.len() + 16);
    out.push('^');

    let mut chars = trimmed.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            ':' => {
                let mut end = start + 1;
                while let Some(&(i, next)) = chars.peek() {
                    if !next.is_ascii_alphabetic() {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let name = &trimmed[start + 1..end];
                let placeholder =
                    Placeholder::from_name(name).ok_or_else(|| RouterError::UnknownPlaceholder {
                        pattern: pattern.to_string(),
                        placeholder: name.to_string(),
                    })?;
                out.push_str(placeholder.fragment());
            }
            '(' | ')' => out.push(c),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    out.push('$');
    Ok(out)
}
