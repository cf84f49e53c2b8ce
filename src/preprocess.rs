//! Implicit multiplication: `2x`, `3(y+1)`, `(a)(b)` and `(a)2` get an
//! explicit `*` before tokenizing.

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn insert_implicit_multiplication(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    // true while scanning an identifier, so the digits of `log2` or `x1` are
    // not mistaken for a number literal
    let mut in_ident = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        let next = match chars.peek() {
            Some(&n) => n,
            None => break,
        };

        let after_number = c.is_ascii_digit() && !in_ident;
        let insert = if after_number {
            next.is_ascii_alphabetic() || next == '_' || next == '('
        } else if c == ')' {
            is_ident_char(next) || next == '.' || next == '('
        } else {
            false
        };

        in_ident = if in_ident {
            is_ident_char(c)
        } else {
            c.is_ascii_alphabetic() || c == '_'
        };

        if insert {
            out.push('*');
            in_ident = false;
        }
    }
    out
}
