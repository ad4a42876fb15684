//! SQL `LIKE` matching.
//!
//! `%` matches any run of characters, `_` exactly one character and `\`
//! escapes the following character. A trailing `\` matches a literal
//! backslash.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyMany,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        let token = match ch {
            '%' => Token::AnyMany,
            '_' => Token::AnyOne,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            other => Token::Literal(other),
        };
        // Adjacent `%` are equivalent to one.
        if token == Token::AnyMany && tokens.last() == Some(&Token::AnyMany) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

/// Whether `value` matches the `LIKE` pattern `pattern`.
///
/// Runs in `O(len(value) * len(pattern))` time with one row of state, so
/// long inputs cannot exhaust the stack.
pub fn like_match(value: &str, pattern: &str) -> bool {
    let tokens = tokenize(pattern);
    let chars: Vec<char> = value.chars().collect();

    // matched[j]: the first `i` characters match the first `j` tokens.
    let mut matched = vec![false; tokens.len() + 1];
    matched[0] = true;
    for (j, token) in tokens.iter().enumerate() {
        matched[j + 1] = matched[j] && *token == Token::AnyMany;
    }

    for ch in &chars {
        let mut diagonal = matched[0];
        matched[0] = false;
        for (j, token) in tokens.iter().enumerate() {
            let above = matched[j + 1];
            matched[j + 1] = match token {
                Token::AnyMany => above || matched[j],
                Token::AnyOne => diagonal,
                Token::Literal(expected) => diagonal && expected == ch,
            };
            diagonal = above;
        }
    }
    matched[tokens.len()]
}
