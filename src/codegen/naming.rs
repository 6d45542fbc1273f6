//! Identifier and documentation text transforms.

/// Converts a parameter or operation name to camelCase.
///
/// Names with `-` or `_` separators are lowercased, then joined with
/// each following word capitalized. Names without separators only
/// have their first character lowercased, so that TitleCase names keep
/// their internal capitals.
///
/// # Examples
///
/// ```
/// # use oas_to_k6_clients::codegen::camel_case;
/// assert_eq!(camel_case("api-version"), "apiVersion");
/// assert_eq!(camel_case("api_version"), "apiVersion");
/// assert_eq!(camel_case("ApiVersion"), "apiVersion");
/// ```
pub fn camel_case(s: &str) -> String {
    if !s.contains(['-', '_']) {
        let mut chars = s.chars();
        return match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    let lower = s.trim().to_lowercase();
    let mut words = lower.split(['-', '_']);
    let mut camel = words.next().unwrap_or_default().to_owned();
    for word in words {
        camel.push_str(&capitalize_first(word));
    }
    camel
}

/// Uppercases the first character, leaving the rest unchanged.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits text into lines, treating `\r\n`, `\r`, and `\n` as line breaks.
pub fn split_by_newline(s: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = s;
    while let Some(index) = rest.find(['\r', '\n']) {
        lines.push(&rest[..index]);
        rest = match rest[index..].strip_prefix("\r\n") {
            Some(next) => next,
            None => &rest[index + 1..],
        };
    }
    lines.push(rest);
    lines
}

/// Returns the name of a referenced schema: everything after the
/// last `/` in the reference.
pub fn reference_name(reference: &str) -> &str {
    match reference.rfind('/') {
        Some(index) => &reference[index + 1..],
        None => reference,
    }
}

/// Renders a JSON value as JavaScript would print it. Strings are
/// written raw, and whole floats drop their fraction (`1.0` is `1`).
pub fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        value => value.to_string(),
    }
}
