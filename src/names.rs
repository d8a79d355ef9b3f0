//! Compound name matching.
//!
//! Lipid names travel between instrument exports, hand-edited index sheets and
//! reference tables, and pick up notation drift on the way: `PC 16:0/18:1`
//! becomes `PC 16:0\18:1`, `TG(16:0/18:1/18:2)[a]` becomes
//! `TG (16:0/18:1/18:2)(a)`, separators gain or lose spaces. The canonical key
//! removes exactly those differences and nothing else (case, digits and
//! letters are preserved).

/// Characters around which whitespace carries no meaning
const SEPARATORS: &[char] = &[':', '/', '-', '(', ')', ',', ';'];

/// Canonical form of a compound name used as a fallback lookup key.
///
/// ```
/// use lipidcalc::names::canonical_key;
///
/// assert_eq!(canonical_key("PC 16:0 / 18:1"), canonical_key("PC 16:0\\18:1"));
/// assert_eq!(canonical_key("TG [a-18:0]"), "TG(a-18:0)");
/// ```
pub fn canonical_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.trim().chars() {
        let ch = match ch {
            '[' | '{' => '(',
            ']' | '}' => ')',
            '\\' => '/',
            other => other,
        };

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space {
            let prev_is_sep = out.chars().last().map_or(true, |p| SEPARATORS.contains(&p));
            if !prev_is_sep && !SEPARATORS.contains(&ch) {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_names_are_stable() {
        assert_eq!(canonical_key("AcylCarnitine 10:0"), "AcylCarnitine 10:0");
        assert_eq!(canonical_key("LPC 18:1 d7"), "LPC 18:1 d7");
    }

    #[test]
    fn test_bracket_and_slash_variants() {
        let a = canonical_key("TG(16:0/18:1/18:2)[a]");
        let b = canonical_key("TG (16:0 \\ 18:1 \\ 18:2) (a)");
        assert_eq!(a, b);
        assert_eq!(a, "TG(16:0/18:1/18:2)(a)");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(canonical_key("  PE   O-  18:0 "), "PE O-18:0");
        assert_eq!(canonical_key("PC 16 : 0"), "PC 16:0");
    }

    #[test]
    fn test_case_is_preserved() {
        assert_ne!(canonical_key("pc 16:0"), canonical_key("PC 16:0"));
    }
}
