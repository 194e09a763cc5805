//! Identifier helpers for the Rust host grammar.

use gtrace_ir::Param;

use crate::GenError;

/// Strict, reserved and edition-dependent keywords, plus the wildcard.
const KEYWORDS: &[&str] = &[
    "_", "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Primitive type names. Legal as bindings, but never chosen for one.
const PREDECLARED: &[&str] = &[
    "bool", "char", "f32", "f64", "i128", "i16", "i32", "i64", "i8", "isize", "str", "u128",
    "u16", "u32", "u64", "u8", "usize",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

pub fn is_predeclared(name: &str) -> bool {
    PREDECLARED.contains(&name)
}

/// Whether `s` is a plain (non-raw) identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

pub fn first_char(s: &str) -> Result<&str, GenError> {
    match s.char_indices().nth(1) {
        Some((end, _)) => Ok(&s[..end]),
        None if !s.is_empty() => Ok(s),
        None => Err(GenError::unsupported("empty identifier")),
    }
}

/// `s` with its first character lower-cased.
pub fn unexported(s: &str) -> Result<String, GenError> {
    let head = first_char(s)?;
    let mut out: String = head.to_lowercase();
    out.push_str(&s[head.len()..]);
    Ok(out)
}

/// Reduce arbitrary type text to something usable as an identifier.
///
/// Leading digits and every non identifier character are dropped; if no
/// identifier remains, the result is prefixed with `_`.
pub fn ident(s: &str) -> String {
    let trimmed = s.trim_start_matches(|c: char| c.is_numeric());
    let mut out: String = trimmed
        .chars()
        .filter(|&c| c == '_' || c.is_alphanumeric())
        .collect();
    if !is_identifier(&out) {
        out.insert(0, '_');
    }
    out
}

/// `ConnTrace` -> `conn_trace`, `HTTPTrace` -> `http_trace`.
pub fn snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Base name for a binding that receives `param`.
pub fn param_base(param: &Param) -> Result<String, GenError> {
    match &param.name {
        Some(name) => unexported(name),
        None => unexported(first_char(&ident(param.ty.basename()))?),
    }
}

/// Name of the public shortcut for `hook` of `trace`.
pub fn shortcut_name(trace: &str, hook: &str) -> Result<String, GenError> {
    if trace.is_empty() || hook.is_empty() {
        return Err(GenError::unsupported(format!(
            "shortcut for `{trace}`.`{hook}` needs non-empty names"
        )));
    }
    Ok(format!("{}_{hook}", snake_case(trace)))
}

#[cfg(test)]
mod tests {
    use gtrace_ir::Ty;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keywords_and_predeclared() {
        assert!(is_keyword("fn"));
        assert!(is_keyword("Self"));
        assert!(!is_keyword("t"));
        assert!(is_predeclared("u64"));
        assert!(!is_predeclared("info"));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("h1"));
        assert!(is_identifier("_x"));
        assert!(!is_identifier("1h"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn ident_sanitizes_type_text() {
        assert_eq!(ident("Option<String>"), "OptionString");
        assert_eq!(ident("42abc"), "abc");
        assert_eq!(ident("[u8; 4]"), "u84");
        assert_eq!(ident("()"), "_");
    }

    #[test]
    fn case_helpers() {
        assert_eq!(unexported("Info").ok(), Some("info".to_owned()));
        assert!(unexported("").is_err());
        assert_eq!(first_char("émile").ok(), Some("é"));
        assert_eq!(snake_case("ConnTrace"), "conn_trace");
        assert_eq!(snake_case("HTTPTrace"), "http_trace");
        assert_eq!(snake_case("Trace2Go"), "trace2_go");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn param_base_names() {
        let named = Param::named("Address", Ty::opaque("String"));
        assert_eq!(param_base(&named).ok(), Some("address".to_owned()));

        let unnamed = Param::unnamed(Ty::named("DialStartInfo"));
        assert_eq!(param_base(&unnamed).ok(), Some("d".to_owned()));

        let by_ref = Param::unnamed(Ty::pointer(Ty::opaque("str")));
        assert_eq!(param_base(&by_ref).ok(), Some("s".to_owned()));

        let tuple = Param::unnamed(Ty::opaque("()"));
        assert_eq!(param_base(&tuple).ok(), Some("_".to_owned()));
    }

    #[test]
    fn shortcut_names() {
        assert_eq!(
            shortcut_name("ConnTrace", "on_dial").ok(),
            Some("conn_trace_on_dial".to_owned())
        );
        assert!(matches!(
            shortcut_name("ConnTrace", ""),
            Err(GenError::UnsupportedShape(_))
        ));
    }
}
