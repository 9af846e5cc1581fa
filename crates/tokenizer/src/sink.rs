//! The callback surface a caller implements to receive lexical events.
//!
//! Every method has a no-op default so callers only override what they need,
//! the same shape as the teacher's `#[php_impl]` surface exposed a fixed set
//! of getters -- here inverted into push callbacks since events are emitted
//! synchronously as they're recognised rather than pulled one at a time.
//!
//! All byte slices borrow directly from the tokenizer's internal buffer and
//! are only valid for the duration of the call; copy anything you need to
//! keep. Offsets are absolute over the whole stream, unaffected by internal
//! buffer compaction.

pub trait Sink {
    /// A run of text content (already entity-decoded, unless disabled).
    fn on_text(&mut self, _text: &str, _start: usize, _end: usize) {}

    /// The name of an opening tag, e.g. `div` in `<div class="x">`.
    fn on_open_tag_name(&mut self, _name: &[u8], _start: usize, _end: usize) {}

    /// The `>` closing an opening tag's attribute list.
    fn on_open_tag_end(&mut self, _end: usize) {}

    /// The `/>` of a self-closing tag. Fires instead of `on_open_tag_end`.
    fn on_self_closing_tag(&mut self, _end: usize) {}

    /// The name of a closing tag, e.g. `div` in `</div>`.
    fn on_close_tag(&mut self, _name: &[u8], _start: usize, _end: usize) {}

    /// An attribute name, e.g. `class` in `class="x"`.
    fn on_attrib_name(&mut self, _name: &[u8], _start: usize, _end: usize) {}

    /// An attribute's value (decoded, unless disabled). Does not fire for a
    /// boolean attribute with no `=`.
    fn on_attrib_data(&mut self, _value: &str, _start: usize, _end: usize) {}

    /// The end of an attribute, whether or not it had a value.
    fn on_attrib_end(&mut self, _end: usize) {}

    /// A comment's contents, excluding the `<!--`/`-->` delimiters.
    fn on_comment(&mut self, _data: &[u8], _start: usize, _end: usize) {}

    /// A CDATA section's contents, excluding the `<![CDATA[`/`]]>` delimiters.
    fn on_cdata(&mut self, _data: &[u8], _start: usize, _end: usize) {}

    /// A declaration such as `<!DOCTYPE html>`, excluding `<!`/`>`.
    fn on_declaration(&mut self, _data: &[u8], _start: usize, _end: usize) {}

    /// A processing instruction such as `<?xml version="1.0"?>`, excluding
    /// the `<?`/`?>` delimiters.
    fn on_processing_instruction(&mut self, _data: &[u8], _start: usize, _end: usize) {}

    /// A recoverable malformation the tokenizer salvaged rather than
    /// rejecting outright, e.g. an unterminated entity reference.
    fn on_error(&mut self, _message: &str, _position: usize) {}

    /// The stream has ended and no more events will follow.
    fn on_end(&mut self, _position: usize) {}
}
