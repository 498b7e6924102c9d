//! `$NAME` / `${NAME}` substitution for credential fields and config paths.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A referenced variable has no value
    Missing(String),
    /// A `$` not followed by `$`, an identifier or `{identifier}`
    InvalidPlaceholder(usize),
}

enum Token<'a> {
    Literal(&'a str),
    Dollar,
    Variable { name: &'a str, raw: &'a str },
    Invalid { position: usize, raw: &'a str },
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn tokenize(template: &str) -> Vec<Token<'_>> {
    let bytes = template.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        if literal_start < i {
            tokens.push(Token::Literal(&template[literal_start..i]));
        }

        let start = i;
        let next = bytes.get(i + 1).copied();
        match next {
            Some(b'$') => {
                tokens.push(Token::Dollar);
                i += 2;
            }
            Some(b'{') => {
                let name_start = i + 2;
                let mut end = name_start;
                while end < bytes.len() && is_ident_continue(bytes[end]) {
                    end += 1;
                }
                let closed = end < bytes.len() && bytes[end] == b'}';
                if closed && end > name_start && is_ident_start(bytes[name_start]) {
                    tokens.push(Token::Variable {
                        name: &template[name_start..end],
                        raw: &template[start..=end],
                    });
                    i = end + 1;
                } else {
                    tokens.push(Token::Invalid {
                        position: start,
                        raw: &template[start..start + 1],
                    });
                    i += 1;
                }
            }
            Some(b) if is_ident_start(b) => {
                let name_start = i + 1;
                let mut end = name_start;
                while end < bytes.len() && is_ident_continue(bytes[end]) {
                    end += 1;
                }
                tokens.push(Token::Variable {
                    name: &template[name_start..end],
                    raw: &template[start..end],
                });
                i = end;
            }
            _ => {
                tokens.push(Token::Invalid {
                    position: start,
                    raw: &template[start..start + 1],
                });
                i += 1;
            }
        }
        literal_start = i;
    }

    if literal_start < bytes.len() {
        tokens.push(Token::Literal(&template[literal_start..]));
    }
    tokens
}

/// Substitute every placeholder in `template` using `lookup`.
///
/// `$$` yields a literal `$`. A variable `lookup` cannot resolve, or a
/// malformed placeholder, is an error.
pub fn substitute<F>(template: &str, lookup: F) -> Result<String, TemplateError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    for token in tokenize(template) {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Dollar => out.push('$'),
            Token::Variable { name, .. } => {
                let value = lookup(name).ok_or_else(|| TemplateError::Missing(name.to_string()))?;
                out.push_str(&value);
            }
            Token::Invalid { position, .. } => {
                return Err(TemplateError::InvalidPlaceholder(position));
            }
        }
    }
    Ok(out)
}

/// Expand placeholders, leaving anything unresolvable untouched.
pub fn expand_lenient<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    for token in tokenize(template) {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Dollar => out.push_str("$$"),
            Token::Variable { name, raw } => match lookup(name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(raw),
            },
            Token::Invalid { raw, .. } => out.push_str(raw),
        }
    }
    out
}

/// Variable lookup backed by the process environment
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
