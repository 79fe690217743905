//! Template substitution from values found in a source config

use crate::platform::ConfigError;
use regex::{NoExpand, Regex};

/// A `{{ placeholder }}` in a template and the pattern that finds its value
#[derive(Debug, Clone)]
pub struct Substitute {
    pub placeholder: String,
    pub pattern: Regex,
}

impl Substitute {
    pub fn new(placeholder: impl Into<String>, pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            placeholder: placeholder.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// First match in `source_config`: capture group 1 if the pattern has one, else the whole match
    pub fn extract<'a>(&self, source_config: &'a str) -> Option<&'a str> {
        let captures = self.pattern.captures(source_config)?;
        captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|m| m.as_str())
    }
}

/// Replace every `{{ placeholder }}` in `template` with the value its pattern finds
///
/// Fails on the first placeholder whose pattern has no match.
pub fn render_substituted(
    template: &str,
    substitutes: &[Substitute],
    source_config: &str,
) -> Result<String, ConfigError> {
    let mut rendered = template.to_string();

    for substitute in substitutes {
        let value = substitute
            .extract(source_config)
            .ok_or_else(|| ConfigError::Substitution {
                placeholder: substitute.placeholder.clone(),
                pattern: substitute.pattern.as_str().to_string(),
            })?;

        let placeholder = Regex::new(&format!(
            r"\{{\{{\s*{}\s*\}}\}}",
            regex::escape(&substitute.placeholder)
        ))?;
        rendered = placeholder
            .replace_all(&rendered, NoExpand(value))
            .into_owned();
    }

    Ok(rendered)
}
