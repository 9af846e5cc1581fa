//! The lexical state enumeration driving `Tokenizer::dispatch`.
//!
//! States are grouped the way `spec.md` §4.1 groups them: text/tag dispatch,
//! attributes, declarations/comments/CDATA/PIs, and character references.

/// Whitespace recognised by the tokenizer: space, tab, form feed, CR, LF.
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0c | b'\r' | b'\n')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Text,

    BeforeTagName,
    InTagName,
    BeforeClosingTagName,
    InClosingTagName,
    AfterClosingTagName,

    BeforeAttributeName,
    InAttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    InAttributeValueDq,
    InAttributeValueSq,
    InAttributeValueNq,
    InSelfClosingTag,

    BeforeDeclaration,
    InDeclaration,
    InProcessingInstruction,
    BeforeComment,
    InComment,
    AfterComment1,
    AfterComment2,

    BeforeCdata1,
    BeforeCdata2,
    BeforeCdata3,
    BeforeCdata4,
    BeforeCdata5,
    BeforeCdata6,
    InCdata,
    AfterCdata1,
    AfterCdata2,

    BeforeSpecial,
    BeforeSpecialEnd,

    BeforeEntity,
    BeforeNumericEntity,
    InNamedEntity,
    InNumericEntity,
    InHexEntity,
}

/// The state to which an entity reference returns control once decoded (or
/// abandoned). A strict subset of [`State`] -- see `spec.md` §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BaseState {
    Text,
    InAttributeValueDq,
    InAttributeValueSq,
    InAttributeValueNq,
}

impl BaseState {
    pub(crate) fn as_state(self) -> State {
        match self {
            BaseState::Text => State::Text,
            BaseState::InAttributeValueDq => State::InAttributeValueDq,
            BaseState::InAttributeValueSq => State::InAttributeValueSq,
            BaseState::InAttributeValueNq => State::InAttributeValueNq,
        }
    }

    pub(crate) fn is_attribute_value(self) -> bool {
        !matches!(self, BaseState::Text)
    }
}
