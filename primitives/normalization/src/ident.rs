//! Identifier normalization.
//!
//! Service descriptions name things in PascalCase with "conventional" casing
//! of acronyms (`TrailArn`, `InstanceId`). [`exportable`] produces the public
//! type name, [`snake_case`] the field and method identifier.

use std::sync::OnceLock;

use regex::Regex;

/// Acronym fixups, applied in order. Each replacement only produces upper-case
/// letters, so no rule can re-match text rewritten by an earlier one.
const ACRONYM_RULES: &[(&str, &str)] = &[
    (r"Id$", "ID"),
    (r"Id([A-Z])", "ID$1"),
    (r"Arn", "ARN"),
    (r"Uri", "URI"),
    (r"Url", "URL"),
    (r"Ssh", "SSH"),
    (r"Json", "JSON"),
    (r"Ip", "IP"),
    (r"Dns", "DNS"),
    (r"Cpu", "CPU"),
];

static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn rules() -> &'static [(Regex, &'static str)] {
    RULES.get_or_init(|| {
        ACRONYM_RULES
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|re| (re, *replacement))
            })
            .collect()
    })
}

/// Returns the exported (public) form of a raw name.
///
/// The first letter is upper-cased, then the acronym rules are applied in
/// order. The rule sequence is repeated until nothing changes, which makes the
/// function idempotent even for inputs like `IdIdId` where one pass leaves a
/// fresh match behind.
///
/// ```
/// use normalization::exportable;
/// assert_eq!(exportable("TrailId"), "TrailID");
/// assert_eq!(exportable("sshPublicKeyUrl"), "SSHPublicKeyURL");
/// assert_eq!(exportable(&exportable("TrailId")), "TrailID");
/// ```
pub fn exportable(name: &str) -> String {
    let mut chars = name.chars();
    let mut out = match chars.next() {
        None => return String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    };

    loop {
        let mut next = out.clone();
        for (re, replacement) in rules() {
            next = re.replace_all(&next, *replacement).into_owned();
        }
        if next == out {
            return out;
        }
        out = next;
    }
}

/// Rust keywords that can be escaped as raw identifiers.
const RAW_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Converts an identifier to a Rust snake_case identifier.
///
/// Runs of capitals are kept together (`TrailARN` → `trail_arn`,
/// `DBInstanceID` → `db_instance_id`). Characters that cannot appear in an
/// identifier become underscores. Keywords are escaped with `r#`, except
/// `self`, `super` and `crate` which cannot be raw and get a trailing `_`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !(c.is_alphanumeric() || c == '_') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    let out = out.trim_end_matches('_').to_string();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return format!("_{out}");
    }

    match out.as_str() {
        "self" | "super" | "crate" | "Self" => format!("{out}_"),
        "" => "_".to_string(),
        kw if RAW_KEYWORDS.contains(&kw) => format!("r#{kw}"),
        _ => out,
    }
}
