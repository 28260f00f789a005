//! Topic identity types.
//!
//! A topic lives inside a web (its namespace) and is addressed by the pair
//! `(web, topic)`. Source markup refers to topics either bare (`WebHome`,
//! resolved against the current web) or qualified (`Main.WebHome`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fully qualified `(web, topic)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicRef {
    pub web: String,
    pub topic: String,
}

impl TopicRef {
    pub fn new(web: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            web: web.into(),
            topic: topic.into(),
        }
    }

    /// Resolve `target` against `default_web`.
    ///
    /// Qualified targets split on the FIRST dot, so `A.B.C` addresses topic
    /// `B.C` in web `A`. Unqualified targets keep the current web.
    pub fn parse(target: &str, default_web: &str) -> Self {
        match target.split_once('.') {
            Some((web, topic)) => Self::new(web, topic),
            None => Self::new(default_web, target),
        }
    }
}

impl fmt::Display for TopicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.web, self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::TopicRef;

    #[test]
    fn parse_qualified_target() {
        let parsed = TopicRef::parse("Sandbox.TestTopic", "Main");
        assert_eq!(parsed, TopicRef::new("Sandbox", "TestTopic"));
    }

    #[test]
    fn parse_unqualified_target_uses_default_web() {
        let parsed = TopicRef::parse("WebHome", "Main");
        assert_eq!(parsed, TopicRef::new("Main", "WebHome"));
    }

    #[test]
    fn parse_splits_on_first_dot_only() {
        let parsed = TopicRef::parse("A.B.C", "Main");
        assert_eq!(parsed, TopicRef::new("A", "B.C"));
    }

    #[test]
    fn display_is_dotted() {
        assert_eq!(TopicRef::new("Main", "WebHome").to_string(), "Main.WebHome");
    }
}
