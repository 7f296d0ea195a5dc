//! Version string comparison.
//!
//! Versions are split in parts on `.`, `-`, `_`, `+` and on every
//! boundary between digits and other characters: `1.0rc1` is `1 0 rc 1`.
//! Numeric parts compare as numbers, others by special form:
//!
//! ```text
//! any other < dev < alpha = a < beta = b < RC = rc < (number) < pl = p
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Compares two version strings.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use vc_norm::context::version_compare;
///
/// assert_eq!(version_compare("1.0.0", "1.0.0"), Ordering::Equal);
/// assert_eq!(version_compare("1.10", "1.9"), Ordering::Greater);
/// assert_eq!(version_compare("1.0rc1", "1.0"), Ordering::Less);
/// assert_eq!(version_compare("1.0-dev", "1.0alpha"), Ordering::Less);
/// ```
pub fn version_compare(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    let a = canonicalize(a);
    let b = canonicalize(b);
    compare_canonical(&a, &b)
}

fn compare_canonical(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        let ordering = match (left.next(), right.next()) {
            (Some(l), Some(r)) => compare_parts(l, r),
            (Some(l), None) => {
                return if starts_with_digit(l) {
                    Ordering::Greater
                } else {
                    compare_canonical(&parts_from(l, left), "#")
                };
            }
            (None, Some(r)) => {
                return if starts_with_digit(r) {
                    Ordering::Less
                } else {
                    compare_canonical("#", &parts_from(r, right))
                };
            }
            (None, None) => return Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// Joins the current part and the remaining ones back into a version.
fn parts_from<'a>(first: &'a str, rest: impl Iterator<Item = &'a str>) -> String {
    let mut parts: Vec<&str> = alloc::vec![first];
    parts.extend(rest);
    parts.join(".")
}

fn compare_parts(l: &str, r: &str) -> Ordering {
    match (starts_with_digit(l), starts_with_digit(r)) {
        (true, true) => number(l).cmp(&number(r)),
        (false, false) => special_form(l).cmp(&special_form(r)),
        (true, false) => special_form("#").cmp(&special_form(r)),
        (false, true) => special_form(l).cmp(&special_form("#")),
    }
}

fn number(part: &str) -> u64 {
    let digits = part
        .find(|c: char| !c.is_ascii_digit())
        .map_or(part, |end| &part[..end]);
    digits.parse().unwrap_or(u64::MAX)
}

#[inline]
fn starts_with_digit(part: &str) -> bool {
    part.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

fn special_form(part: &str) -> i8 {
    const FORMS: [(&str, i8); 10] = [
        ("dev", 0),
        ("alpha", 1),
        ("a", 1),
        ("beta", 2),
        ("b", 2),
        ("RC", 3),
        ("rc", 3),
        ("#", 4),
        ("pl", 5),
        ("p", 5),
    ];
    FORMS
        .iter()
        .find(|(name, _)| part.starts_with(name))
        .map_or(-1, |(_, order)| *order)
}

/// Normalizes separators to `.` and splits digit/non-digit boundaries.
fn canonicalize(version: &str) -> String {
    let mut out = String::with_capacity(version.len() * 2);
    let mut chars = version.chars();
    let Some(first) = chars.next() else {
        return out;
    };
    out.push(first);
    let mut previous = first;

    for c in chars {
        let last_is_dot = out.ends_with('.');
        if matches!(c, '-' | '_' | '+') || !c.is_ascii_alphanumeric() {
            if !last_is_dot {
                out.push('.');
            }
        } else if is_digit(previous) != is_digit(c) && previous != '.' {
            if !last_is_dot {
                out.push('.');
            }
            out.push(c);
        } else {
            out.push(c);
        }
        previous = c;
    }
    out
}

#[inline]
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms() {
        assert_eq!(canonicalize("1.0rc1"), "1.0.rc.1");
        assert_eq!(canonicalize("1.0-dev"), "1.0.dev");
        assert_eq!(canonicalize("1..2"), "1.2");
        assert_eq!(canonicalize("5.2_3+pl1"), "5.2.3.pl.1");
    }

    #[test]
    fn numeric_versions() {
        assert_eq!(version_compare("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(version_compare("0.9.0", "1.0.0"), Ordering::Less);
        assert_eq!(version_compare("2.0.1", "2.0.0"), Ordering::Greater);
        assert_eq!(version_compare("1.5.0", "1.10.0"), Ordering::Less);
        assert_eq!(version_compare("1.0.0", "1.0"), Ordering::Greater);
        assert_eq!(version_compare("1.0", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn special_forms() {
        assert_eq!(version_compare("1.0-dev", "1.0-alpha"), Ordering::Less);
        assert_eq!(version_compare("1.0a", "1.0alpha"), Ordering::Equal);
        assert_eq!(version_compare("1.0beta", "1.0RC1"), Ordering::Less);
        assert_eq!(version_compare("1.0rc1", "1.0"), Ordering::Less);
        assert_eq!(version_compare("1.0pl1", "1.0"), Ordering::Greater);
        assert_eq!(version_compare("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(version_compare("1.0foo", "1.0dev"), Ordering::Less);
    }

    #[test]
    fn empty_versions() {
        assert_eq!(version_compare("", ""), Ordering::Equal);
        assert_eq!(version_compare("", "1"), Ordering::Less);
        assert_eq!(version_compare("1", ""), Ordering::Greater);
    }
}
