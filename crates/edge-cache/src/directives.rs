//! `Cache-Control` directive parsing.

use std::collections::BTreeMap;
use std::fmt;

/// Value of a single directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// A directive without `=`, e.g. `no-store`.
    Flag,
    /// A directive with a value, e.g. `max-age=60`. Kept verbatim.
    Value(String),
}

/// Parsed `Cache-Control` header.
///
/// Names are lowercased and de-duplicated, the last occurrence winning.
/// Unknown directives are kept so the set can be written back out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    directives: BTreeMap<String, Directive>,
}

impl CacheControl {
    /// Parse a header value.
    ///
    /// All whitespace is dropped before splitting on commas. Each segment is
    /// split once on `=`; segments with an empty name are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut directives = BTreeMap::new();
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

        for part in compact.split(',') {
            let (name, value) = match part.split_once('=') {
                Some((name, value)) => (name, Directive::Value(value.to_string())),
                None => (part, Directive::Flag),
            };
            if name.is_empty() {
                continue;
            }
            directives.insert(name.to_ascii_lowercase(), value);
        }

        Self { directives }
    }

    /// Parse an optional header value; `None` yields an empty set.
    pub fn from_header(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    /// Look up a directive by (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.directives.get(&name.to_ascii_lowercase())
    }

    /// Check whether a directive is present, with or without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Check if no directives are present.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// `public` is present.
    pub fn public(&self) -> bool {
        self.contains("public")
    }

    /// `private` is present.
    pub fn private(&self) -> bool {
        self.contains("private")
    }

    /// `no-cache` is present.
    pub fn no_cache(&self) -> bool {
        self.contains("no-cache")
    }

    /// `no-store` is present.
    pub fn no_store(&self) -> bool {
        self.contains("no-store")
    }

    /// `must-revalidate` is present.
    pub fn must_revalidate(&self) -> bool {
        self.contains("must-revalidate")
    }

    /// `proxy-revalidate` is present.
    pub fn proxy_revalidate(&self) -> bool {
        self.contains("proxy-revalidate")
    }

    /// `max-age` in seconds, or `None` when absent.
    pub fn max_age(&self) -> Option<i64> {
        self.seconds("max-age")
    }

    /// `s-maxage` in seconds, or `None` when absent.
    pub fn shared_max_age(&self) -> Option<i64> {
        self.seconds("s-maxage")
    }

    /// Subtract an `Age` offset from `max-age` and `s-maxage`, flooring at 0.
    pub fn normalize_max_ages(&mut self, age: i64) {
        if age <= 0 {
            return;
        }
        for name in ["max-age", "s-maxage"] {
            if let Some(current) = self.seconds(name) {
                let adjusted = current.saturating_sub(age).max(0);
                self.directives
                    .insert(name.to_string(), Directive::Value(adjusted.to_string()));
            }
        }
    }

    // A directive present without a value, or with a non-numeric one, reads as 0.
    fn seconds(&self, name: &str) -> Option<i64> {
        match self.directives.get(name)? {
            Directive::Flag => Some(0),
            Directive::Value(value) => Some(parse_seconds(value)),
        }
    }
}

impl fmt::Display for CacheControl {
    /// Canonical form: flags sorted, then `name=value` pairs sorted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        for (name, directive) in &self.directives {
            match directive {
                Directive::Flag => flags.push(name),
                Directive::Value(value) => values.push(format!("{}={}", name, value)),
            }
        }
        flags.sort_unstable();
        values.sort_unstable();

        let parts: Vec<&str> = flags
            .into_iter()
            .chain(values.iter().map(String::as_str))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Leading-integer parse: optional sign then digits; anything else is 0.
pub(crate) fn parse_seconds(value: &str) -> i64 {
    let value = value.trim_matches('"');
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return 0;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Parsing Tests ===

    #[test]
    fn test_parse_empty() {
        assert!(CacheControl::parse("").is_empty());
        assert!(CacheControl::from_header(None).is_empty());
    }

    #[test]
    fn test_parse_flags_and_values() {
        let cc = CacheControl::parse("public, max-age=600, must-revalidate");
        assert!(cc.public());
        assert!(cc.must_revalidate());
        assert!(!cc.private());
        assert_eq!(cc.max_age(), Some(600));
        assert_eq!(cc.len(), 3);
    }

    #[test]
    fn test_parse_extra_directives_keep_max_age() {
        let cc = CacheControl::parse("max-age=600, max-stale=300, min-fresh=570");
        assert_eq!(cc.max_age(), Some(600));
        assert_eq!(
            cc.get("max-stale"),
            Some(&Directive::Value("300".to_string()))
        );
    }

    #[test]
    fn test_parse_case_insensitive_names() {
        let cc = CacheControl::parse("No-Store, Max-Age=5");
        assert!(cc.no_store());
        assert_eq!(cc.max_age(), Some(5));
    }

    #[test]
    fn test_parse_last_occurrence_wins() {
        let cc = CacheControl::parse("max-age=10, max-age=20");
        assert_eq!(cc.max_age(), Some(20));
        assert_eq!(cc.len(), 1);
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let cc = CacheControl::parse(",, private ,=5,");
        assert_eq!(cc.len(), 1);
        assert!(cc.private());
    }

    #[test]
    fn test_parse_removes_all_whitespace() {
        let cc = CacheControl::parse("max-age = 30,\tno-cache");
        assert_eq!(cc.max_age(), Some(30));
        assert!(cc.no_cache());
    }

    #[test]
    fn test_value_split_once() {
        let cc = CacheControl::parse("ext=a=b");
        assert_eq!(cc.get("ext"), Some(&Directive::Value("a=b".to_string())));
    }

    #[test]
    fn test_all_boolean_queries() {
        let cc = CacheControl::parse(
            "public, private, no-cache, no-store, must-revalidate, proxy-revalidate",
        );
        assert!(cc.public());
        assert!(cc.private());
        assert!(cc.no_cache());
        assert!(cc.no_store());
        assert!(cc.must_revalidate());
        assert!(cc.proxy_revalidate());
    }

    // === Numeric Directive Tests ===

    #[test]
    fn test_max_age_absent_is_none() {
        let cc = CacheControl::parse("public");
        assert_eq!(cc.max_age(), None);
        assert_eq!(cc.shared_max_age(), None);
    }

    #[test]
    fn test_shared_max_age() {
        let cc = CacheControl::parse("s-maxage=120, max-age=60");
        assert_eq!(cc.shared_max_age(), Some(120));
        assert_eq!(cc.max_age(), Some(60));
    }

    #[test]
    fn test_non_numeric_max_age_reads_zero() {
        assert_eq!(CacheControl::parse("max-age=soon").max_age(), Some(0));
        assert_eq!(CacheControl::parse("max-age").max_age(), Some(0));
        assert_eq!(CacheControl::parse("max-age=12abc").max_age(), Some(12));
        assert_eq!(CacheControl::parse("max-age=\"15\"").max_age(), Some(15));
    }

    #[test]
    fn test_normalize_max_ages() {
        let mut cc = CacheControl::parse("public, max-age=40, s-maxage=10");
        cc.normalize_max_ages(6);
        assert_eq!(cc.max_age(), Some(34));
        assert_eq!(cc.shared_max_age(), Some(4));
    }

    #[test]
    fn test_normalize_max_ages_floors_at_zero() {
        let mut cc = CacheControl::parse("max-age=5");
        cc.normalize_max_ages(60);
        assert_eq!(cc.max_age(), Some(0));
    }

    #[test]
    fn test_normalize_max_ages_ignores_absent_and_zero_age() {
        let mut cc = CacheControl::parse("public");
        cc.normalize_max_ages(10);
        assert_eq!(cc.max_age(), None);

        let mut cc = CacheControl::parse("max-age=10");
        cc.normalize_max_ages(0);
        assert_eq!(cc.max_age(), Some(10));
    }

    // === Serialization Tests ===

    #[test]
    fn test_to_string_canonical_order() {
        let cc = CacheControl::parse("max-age=600, public, s-maxage=30, no-transform");
        assert_eq!(cc.to_string(), "no-transform, public, max-age=600, s-maxage=30");
    }

    #[test]
    fn test_to_string_empty() {
        assert_eq!(CacheControl::default().to_string(), "");
    }

    #[test]
    fn test_normalize_roundtrip_is_idempotent() {
        let inputs = [
            "public, max-age=600",
            "max-age=600, max-stale=300, min-fresh=570",
            "No-Cache,private , s-maxage=1,x-ext=\"a,b\"",
            ",,",
            "must-revalidate, MAX-AGE=0, max-age=3",
        ];
        for input in inputs {
            let parsed = CacheControl::parse(input);
            let reparsed = CacheControl::parse(&parsed.to_string());
            assert_eq!(reparsed, parsed, "round trip changed {:?}", input);
        }
    }
}
