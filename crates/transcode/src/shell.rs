//! Shell-like tokenization for curl command ingestion.
//!
//! Supports single and double quotes and backslash escapes. Tokens come back
//! cooked: surrounding quotes are removed and escapes resolved, so a payload
//! like `-d "{\"name\":\"John\"}"` yields the literal JSON text.

/// Tokenize input using a simple, shell-like lexer.
///
/// Quoting rules follow the POSIX shell closely enough for curl invocations:
/// single quotes preserve everything verbatim, double quotes honor backslash
/// escapes, and an unquoted backslash escapes the next character.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Quoted empty strings ('' or "") are real tokens.
    let mut token_started = false;
    let mut in_single_quotes = false;
    let mut in_double_quotes = false;
    let mut characters = input.chars().peekable();

    while let Some(character) = characters.next() {
        if in_single_quotes {
            if character == '\'' {
                in_single_quotes = false;
            } else {
                current.push(character);
            }
            continue;
        }

        if in_double_quotes {
            if character == '"' {
                in_double_quotes = false;
            } else if character == '\\' {
                match characters.next() {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                }
            } else {
                current.push(character);
            }
            continue;
        }

        match character {
            '\'' => {
                in_single_quotes = true;
                token_started = true;
            }
            '"' => {
                in_double_quotes = true;
                token_started = true;
            }
            '\\' => {
                token_started = true;
                match characters.next() {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                }
            }
            character if character.is_whitespace() => {
                if token_started || !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                    token_started = false;
                }
            }
            other => {
                token_started = true;
                current.push(other);
            }
        }
    }

    if token_started || !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
