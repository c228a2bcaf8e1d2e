//! Hierarchical sort keys for WBS codes
//!
//! A code like `"2.10.a"` splits into maximal runs of digits-and-dots
//! versus other characters; digit runs break on the dot into integer
//! segments compared numerically, so `"2.2"` orders before `"2.10"`.
//! Non-digit segments compare lexically and always order after a numeric
//! segment in the same position, so `"10"` comes before `"10a"`. Used for
//! display ordering only, never identity.

/// One comparable piece of a code
///
/// Variant order carries the numeric-before-text rule through the derived
/// `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Number(u64),
    Text(String),
}

/// Ordered, comparable form of a work-item code
///
/// Field order carries the missing-codes-sort-last rule through the derived
/// `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    missing: bool,
    segments: Vec<Segment>,
}

impl SortKey {
    /// Compose the key for a code; `None`, empty, and whitespace-only codes
    /// sort after every real code
    pub fn from_code(code: Option<&str>) -> Self {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Self {
                missing: true,
                segments: Vec::new(),
            };
        };

        let mut segments = Vec::new();
        let mut run = String::new();
        let mut run_is_numeric = false;
        for ch in code.chars() {
            let numeric = ch.is_ascii_digit() || ch == '.';
            if !run.is_empty() && numeric != run_is_numeric {
                flush_run(&mut run, run_is_numeric, &mut segments);
            }
            run_is_numeric = numeric;
            run.push(ch);
        }
        flush_run(&mut run, run_is_numeric, &mut segments);

        Self {
            missing: false,
            segments,
        }
    }
}

fn flush_run(run: &mut String, numeric: bool, segments: &mut Vec<Segment>) {
    if run.is_empty() {
        return;
    }
    if numeric {
        for part in run.split('.').filter(|p| !p.is_empty()) {
            segments.push(Segment::Number(part.parse().unwrap_or(u64::MAX)));
        }
    } else {
        segments.push(Segment::Text(run.clone()));
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(codes: &[&str]) -> Vec<String> {
        let mut codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        codes.sort_by_cached_key(|c| SortKey::from_code(Some(c)));
        codes
    }

    #[test]
    fn numeric_segments_compare_by_value() {
        assert_eq!(
            sorted(&["2.2", "2.10", "2.1", "10", "2"]),
            vec!["2", "2.1", "2.2", "2.10", "10"]
        );
    }

    #[test]
    fn text_segments_order_after_numeric() {
        assert!(SortKey::from_code(Some("10")) < SortKey::from_code(Some("10a")));
        assert!(SortKey::from_code(Some("10.5")) < SortKey::from_code(Some("10a")));
        assert!(SortKey::from_code(Some("10a")) < SortKey::from_code(Some("10b")));
    }

    #[test]
    fn mixed_codes_preserve_run_order() {
        assert_eq!(
            sorted(&["2.10.b", "2.10.a", "2.2.c", "2.10"]),
            vec!["2.2.c", "2.10", "2.10.a", "2.10.b"]
        );
    }

    #[test]
    fn missing_code_sorts_last() {
        let missing = SortKey::from_code(None);
        let empty = SortKey::from_code(Some("  "));
        assert!(SortKey::from_code(Some("999")) < missing);
        assert!(SortKey::from_code(Some("zzz")) < empty);
        assert_eq!(missing, empty);
    }

    #[test]
    fn consecutive_dots_collapse() {
        assert_eq!(
            SortKey::from_code(Some("2..3")),
            SortKey::from_code(Some("2.3"))
        );
        assert_eq!(
            SortKey::from_code(Some(".2.3.")),
            SortKey::from_code(Some("2.3"))
        );
    }
}
