//! Naming helpers.

/// Derive a type-style display name from a raw mapping name.
///
/// Only ASCII digits, lowercase letters, `_` and `-` are kept. The first
/// kept character and each character following a separator are uppercased,
/// and the separators are dropped.
///
/// ```
/// use fieldmap::util::classify_name;
///
/// assert_eq!(classify_name("name-foo_bar_1!"), "NameFooBar1");
/// ```
pub fn classify_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upcase_next = true;
    for c in name.chars() {
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-') {
            continue;
        }
        if c == '_' || c == '-' {
            upcase_next = true;
            continue;
        }
        if upcase_next {
            out.push(c.to_ascii_uppercase());
            upcase_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
