use std::env;
use std::str::FromStr;

use super::{Error, Result};

/// Environment variable carrying the scenario selector for the binary.
pub const SCENARIO_ENV: &str = "PIPECHECK_SCENARIO";

/// A compiled shell-glob name pattern (`*` matches any run of characters,
/// `?` matches exactly one).
#[derive(Debug, Clone)]
pub struct NamePattern {
    glob: String,
    regex: regex::Regex,
}

impl NamePattern {
    pub fn new(glob: impl AsRef<str>) -> Result<Self> {
        let glob = glob.as_ref();
        let regex =
            regex::Regex::new(&glob_to_regex(glob)).map_err(|source| Error::InvalidPattern {
                pattern: glob.to_owned(),
                source,
            })?;
        Ok(Self {
            glob: glob.to_owned(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_glob(&self) -> &str {
        &self.glob
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 2);
    out.push('^');
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c if "\\.+()[]{}^$|#".contains(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('$');
    out
}

/// Parsed scenario selector of the form `name` or `name:pattern`.
///
/// The optional pattern restricts which pipeline the scenario attaches to,
/// by shell-glob match against the pipeline's node name.
#[derive(Debug, Clone)]
pub struct ScenarioSelector {
    name: String,
    pattern: Option<NamePattern>,
}

impl ScenarioSelector {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> Option<&NamePattern> {
        self.pattern.as_ref()
    }

    /// Whether the selector applies to a pipeline with the given name.
    /// A selector without a pattern applies to every pipeline.
    pub fn matches(&self, node_name: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches(node_name),
            None => true,
        }
    }

    /// Reads the selector from the [`SCENARIO_ENV`] environment variable.
    /// An unset variable is a valid, scenario-less configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::SelectorNotUnicode`] if the variable is set but not UTF-8.
    /// - Parse errors from [`FromStr`].
    pub fn from_env() -> Result<Option<Self>> {
        match env::var(SCENARIO_ENV) {
            Ok(raw) => raw.parse().map(Some),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(Error::SelectorNotUnicode),
        }
    }
}

impl FromStr for ScenarioSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, pattern) = match s.split_once(':') {
            Some((name, pattern)) => (name, Some(pattern)),
            None => (s, None),
        };
        if name.is_empty() {
            return Err(Error::EmptySelector);
        }
        Ok(Self {
            name: name.to_owned(),
            pattern: pattern.map(NamePattern::new).transpose()?,
        })
    }
}
