use std::fmt;

use regex::Regex;

/// A match rule made of one or more regular expressions that must all match.
///
/// Several expressions stand in for look-ahead, which the `regex` crate does
/// not support: "at least eight characters with a lowercase letter" is two
/// expressions rather than one.
#[derive(Clone)]
pub struct Pattern {
    all: Vec<Regex>,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            all: vec![Regex::new(pattern)?],
        })
    }

    pub fn all_of(patterns: &[&str]) -> Result<Self, regex::Error> {
        let all = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { all })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.all.iter().all(|re| re.is_match(value))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.all.iter().map(Regex::as_str))
            .finish()
    }
}
