//! Tokenizer error type, following the same hand-rolled `Display` idiom as
//! the teacher's `html_processor::errors::HtmlProcessorError`: a plain enum
//! whose `Display` delegates to a `From<_> for &str` match.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenizerError {
    /// `write` or `end` was called after `end` had already been called.
    WriteAfterEnd,
    /// The dispatch loop reached a state it has no transition for. This is
    /// always a bug in the tokenizer itself, never a property of the input.
    UnreachableState,
}

impl std::error::Error for TokenizerError {
    fn description(&self) -> &str {
        "description() is deprecated; use Display"
    }
}

impl std::fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.into())
    }
}

impl From<TokenizerError> for &str {
    fn from(val: TokenizerError) -> Self {
        match val {
            TokenizerError::WriteAfterEnd => "write called after end",
            TokenizerError::UnreachableState => "dispatch reached an unreachable state",
        }
    }
}

impl From<&TokenizerError> for &str {
    fn from(val: &TokenizerError) -> Self {
        Into::<&str>::into(*val)
    }
}
