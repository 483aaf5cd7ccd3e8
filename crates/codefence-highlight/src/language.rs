//! Language aliases and render variant selection.

use std::collections::BTreeMap;

/// Built-in short names and the lexer names they expand to.
const BUILTIN_ALIASES: [(&str, &str); 4] = [
    ("ru", "ruby"),
    ("m", "objc"),
    ("pl", "perl"),
    ("yml", "yaml"),
];

/// Suffix selecting [`RenderVariant::Raw`].
pub const RAW_SUFFIX: &str = "-raw";

/// Alias table applied to fence languages before dispatch and cache lookup.
///
/// Starts with the built-in aliases; configuration can add or override
/// entries with [`extend`](Self::extend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageAliases {
    map: BTreeMap<String, String>,
}

impl Default for LanguageAliases {
    fn default() -> Self {
        Self {
            map: BUILTIN_ALIASES
                .iter()
                .map(|(alias, target)| ((*alias).to_owned(), (*target).to_owned()))
                .collect(),
        }
    }
}

impl LanguageAliases {
    /// Add or override aliases.
    #[must_use]
    pub fn extend<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.map
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolve `language` through the table. Unknown names pass through.
    #[must_use]
    pub fn normalize<'a>(&'a self, language: &'a str) -> &'a str {
        self.map.get(language).map_or(language, String::as_str)
    }
}

/// How a code block is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderVariant {
    /// Escaped, line-numbered code with no service call.
    Plain,
    /// Re-emitted verbatim inside back-tick fences.
    Raw,
    /// Sent through the highlighter service (cached).
    Highlighted,
}

impl RenderVariant {
    /// Select the variant for an (already normalised) language.
    ///
    /// Empty or `plain` is [`Plain`](Self::Plain); a `-raw` suffix is
    /// [`Raw`](Self::Raw); everything else is highlighted.
    #[must_use]
    pub fn for_language(language: &str) -> Self {
        if language.is_empty() || language == "plain" {
            Self::Plain
        } else if language.ends_with(RAW_SUFFIX) {
            Self::Raw
        } else {
            Self::Highlighted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aliases() {
        let aliases = LanguageAliases::default();

        assert_eq!(aliases.normalize("ru"), "ruby");
        assert_eq!(aliases.normalize("m"), "objc");
        assert_eq!(aliases.normalize("pl"), "perl");
        assert_eq!(aliases.normalize("yml"), "yaml");
    }

    #[test]
    fn test_unknown_language_passes_through() {
        let aliases = LanguageAliases::default();

        assert_eq!(aliases.normalize("rust"), "rust");
        assert_eq!(aliases.normalize(""), "");
        assert_eq!(aliases.normalize("ru-raw"), "ru-raw");
    }

    #[test]
    fn test_extend_adds_and_overrides() {
        let aliases = LanguageAliases::default().extend([("sh", "bash"), ("m", "matlab")]);

        assert_eq!(aliases.normalize("sh"), "bash");
        assert_eq!(aliases.normalize("m"), "matlab");
        assert_eq!(aliases.normalize("yml"), "yaml");
    }

    #[test]
    fn test_variant_selection() {
        assert_eq!(RenderVariant::for_language(""), RenderVariant::Plain);
        assert_eq!(RenderVariant::for_language("plain"), RenderVariant::Plain);
        assert_eq!(RenderVariant::for_language("ruby-raw"), RenderVariant::Raw);
        assert_eq!(RenderVariant::for_language("ruby"), RenderVariant::Highlighted);
        assert_eq!(RenderVariant::for_language("plaintext"), RenderVariant::Highlighted);
    }
}
