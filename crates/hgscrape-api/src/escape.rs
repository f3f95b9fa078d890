//! JavaScript string-escape normalization.
//!
//! The router embeds its data records in script literals and escapes
//! punctuation inside them (`InternetGatewayDevice\x2eWANDevice...`). The
//! extraction patterns are written against the unescaped text, so every
//! page body goes through [`unescape_js`] before it leaves this crate.

/// Resolve JavaScript escape sequences in `input`.
///
/// Handles `\xHH`, `\uHHHH`, `\\`, `\"`, `\'`, `\/`, `\n`, `\r`, `\t` and `\0`.
/// Malformed or unknown escapes are kept verbatim, backslash included.
pub fn unescape_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        let Some(kind) = tail.chars().next() else {
            out.push('\\');
            rest = tail;
            break;
        };

        let (decoded, consumed) = match kind {
            'x' => (hex_char(tail.get(1..3)), 3),
            'u' => (hex_char(tail.get(1..5)), 5),
            'n' => (Some('\n'), 1),
            'r' => (Some('\r'), 1),
            't' => (Some('\t'), 1),
            '0' => (Some('\0'), 1),
            '\\' | '"' | '\'' | '/' => (Some(kind), 1),
            _ => (None, 0),
        };

        if let Some(c) = decoded {
            out.push(c);
            rest = &tail[consumed..];
        } else {
            out.push('\\');
            rest = tail;
        }
    }

    out.push_str(rest);
    out
}

fn hex_char(digits: Option<&str>) -> Option<char> {
    let digits = digits?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}
