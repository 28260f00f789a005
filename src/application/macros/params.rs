//! Macro parameter parsing.
//!
//! The text between `{` and `}` of a macro call holds a bare quoted default
//! value and/or named `key="value"` pairs separated by whitespace:
//!
//! ```text
//! %USERINFO{"jdoe" format="$emails"}%
//! ```
//!
//! Handlers look values up through an ordered key list with [`DEFAULT_KEY`]
//! as the pseudo-key of the unnamed parameter, so `%FOO{"x"}%` and
//! `%FOO{key="x"}%` are interchangeable. Parsing never fails; malformed
//! fragments are skipped.

/// Pseudo-key under which the unnamed leading parameter is stored.
pub const DEFAULT_KEY: &str = "_default";

/// Parsed parameter set of a single macro occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroParams {
    values: Vec<(String, String)>,
}

impl MacroParams {
    pub fn parse(raw: &str) -> Self {
        let chars: Vec<char> = raw.chars().collect();
        let mut values: Vec<(String, String)> = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
                continue;
            }
            if c == '"' || c == '\'' {
                let (value, next) = read_quoted(&chars, i);
                if !values.iter().any(|(key, _)| key == DEFAULT_KEY) {
                    values.push((DEFAULT_KEY.to_string(), value));
                }
                i = next;
                continue;
            }

            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            if i == start {
                // stray punctuation
                i += 1;
                continue;
            }
            let key: String = chars[start..i].iter().collect();

            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i >= chars.len() || chars[i] != '=' {
                // bare word without a value
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                let (value, next) = read_quoted(&chars, i);
                values.push((key, value));
                i = next;
            } else {
                let value_start = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                values.push((key, chars[value_start..i].iter().collect()));
            }
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, value)| value.as_str())
    }

    /// First present value over an ordered key list.
    pub fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn first_or<'a>(&'a self, keys: &[&str], default: &'a str) -> &'a str {
        self.first(keys).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_quoted(chars: &[char], open: usize) -> (String, usize) {
    let quote = chars[open];
    let mut i = open + 1;
    let start = i;
    while i < chars.len() && chars[i] != quote {
        i += 1;
    }
    let value: String = chars[start..i].iter().collect();
    // unclosed quotes run to the end
    (value, (i + 1).min(chars.len()))
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_KEY, MacroParams};

    #[test]
    fn bare_quoted_string_is_the_default_parameter() {
        let params = MacroParams::parse(r#""view""#);
        assert_eq!(params.get(DEFAULT_KEY), Some("view"));
    }

    #[test]
    fn named_pairs_are_parsed() {
        let params = MacroParams::parse(r#"then="yes" else="no""#);
        assert_eq!(params.get("then"), Some("yes"));
        assert_eq!(params.get("else"), Some("no"));
    }

    #[test]
    fn default_and_named_mix() {
        let params = MacroParams::parse(r#""istopic Main.WebHome" then="Y" else="N""#);
        assert_eq!(params.get(DEFAULT_KEY), Some("istopic Main.WebHome"));
        assert_eq!(params.get("then"), Some("Y"));
        assert_eq!(params.get("else"), Some("N"));
    }

    #[test]
    fn first_prefers_earlier_keys() {
        let params = MacroParams::parse(r#""fallback" script="edit""#);
        assert_eq!(params.first(&[DEFAULT_KEY, "script"]), Some("fallback"));
        assert_eq!(params.first(&["script", DEFAULT_KEY]), Some("edit"));
        assert_eq!(params.first_or(&["missing"], "dflt"), "dflt");
    }

    #[test]
    fn single_quotes_and_bare_values_are_accepted() {
        let params = MacroParams::parse("web='Main' limit=5");
        assert_eq!(params.get("web"), Some("Main"));
        assert_eq!(params.get("limit"), Some("5"));
    }

    #[test]
    fn unclosed_quote_runs_to_the_end() {
        let params = MacroParams::parse(r#"format="$username"#);
        assert_eq!(params.get("format"), Some("$username"));
    }

    #[test]
    fn second_bare_string_does_not_replace_the_default() {
        let params = MacroParams::parse(r#""first" "second""#);
        assert_eq!(params.get(DEFAULT_KEY), Some("first"));
    }

    #[test]
    fn empty_input_yields_no_values() {
        assert!(MacroParams::parse("").is_empty());
        assert!(MacroParams::parse("   ").is_empty());
    }
}
