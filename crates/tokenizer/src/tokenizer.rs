//! The resumable state-machine driver: `Tokenizer::write`/`end`/`pause`/
//! `resume`/`reset` plus the per-character dispatch loop described in
//! `spec.md` §4.1-§4.5.
//!
//! Grounded on the teacher's `TagProcessor` in spirit -- a single struct
//! owning all parse state, advanced by a driver loop over a byte buffer --
//! but generalized from the teacher's whole-document `html_bytes: Box<[u8]>`
//! to the spec's chunked, pause/resume-capable buffer (see `buffer.rs`).

use crate::buffer::Buffer;
use crate::error::TokenizerError;
use crate::options::Options;
use crate::sink::Sink;
use crate::special::{closing_match, ClosingMatch, SpecialTagTable};
use crate::state::{is_whitespace, BaseState, State};

/// A streaming, chunk-resumable HTML/XML tokenizer.
///
/// Feed it document text with [`Tokenizer::write`], optionally [`pause`] and
/// [`resume`] it between chunks, and call [`end`] once no more input is
/// coming. Every recognised lexical event is reported synchronously to the
/// [`Sink`] supplied at construction.
///
/// [`pause`]: Tokenizer::pause
/// [`resume`]: Tokenizer::resume
/// [`end`]: Tokenizer::end
pub struct Tokenizer<S: Sink> {
    state: State,
    base_state: BaseState,
    buffer: Buffer,
    index: usize,
    /// `None` is the spec's `-1` sentinel: no section is currently open.
    section_start: Option<usize>,
    special: Option<usize>,
    match_set: Vec<usize>,
    match_depth: usize,
    running: bool,
    ended: bool,
    options: Options,
    specials: SpecialTagTable,
    sink: S,
}

impl<S: Sink> Tokenizer<S> {
    pub fn new(sink: S, options: Options) -> Self {
        let specials = SpecialTagTable::new(&options.special_tag_names);
        Self {
            state: State::Text,
            base_state: BaseState::Text,
            buffer: Buffer::new(),
            index: 0,
            section_start: Some(0),
            special: None,
            match_set: Vec::new(),
            match_depth: 0,
            running: true,
            ended: false,
            options,
            specials,
            sink,
        }
    }

    /// The absolute position, over the whole logical stream, of the next
    /// character the dispatch loop will examine.
    pub fn get_absolute_index(&self) -> usize {
        self.buffer.offset() + self.index
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Appends `chunk` and drives the dispatch loop until the buffer is
    /// exhausted or the tokenizer is paused.
    pub fn write(&mut self, chunk: &[u8]) {
        if self.ended {
            self.report_misuse();
            return;
        }
        self.buffer.append(chunk);
        self.run();
        self.compact();
    }

    /// Clears the running flag; the dispatch loop exits at the next
    /// character boundary and further writes merely append to the buffer.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Sets the running flag and drives any buffered input. If `end` was
    /// already called while paused, finalises the stream.
    pub fn resume(&mut self) {
        self.running = true;
        self.run();
        self.compact();
        if self.ended {
            self.finish();
        }
    }

    /// Optionally writes a final chunk, marks the stream ended, and -- if
    /// currently running -- finalises immediately. If paused, finalisation
    /// is deferred until [`resume`](Tokenizer::resume) is called.
    pub fn end(&mut self, chunk: Option<&[u8]>) {
        if self.ended {
            self.report_misuse();
            return;
        }
        if let Some(c) = chunk {
            self.buffer.append(c);
        }
        self.ended = true;
        if self.running {
            self.run();
            self.compact();
            self.finish();
        }
    }

    /// Restores every field to its constructor defaults, retaining only the
    /// sink and the options the tokenizer was built with.
    pub fn reset(&mut self) {
        self.state = State::Text;
        self.base_state = BaseState::Text;
        self.buffer = Buffer::new();
        self.index = 0;
        self.section_start = Some(0);
        self.special = None;
        self.match_set.clear();
        self.match_depth = 0;
        self.running = true;
        self.ended = false;
    }

    fn report_misuse(&mut self) {
        log::warn!("write/end called after end; reporting onerror");
        let pos = self.get_absolute_index();
        let message: &str = TokenizerError::WriteAfterEnd.into();
        self.sink.on_error(message, pos);
    }

    // ----- driver loop -----------------------------------------------

    fn run(&mut self) {
        while self.running && self.index < self.buffer.len() {
            if self.state == State::Text {
                self.fast_forward_text();
                if self.index >= self.buffer.len() {
                    break;
                }
            }
            let c = self.buffer.as_slice()[self.index];
            self.dispatch(c);
            self.index += 1;
        }
    }

    /// `Text` only reacts to `<` (always) and `&` (when entity decoding is
    /// active); every other byte is a no-op for that state. Skip straight to
    /// the next byte that matters instead of dispatching one at a time,
    /// mirroring the teacher's avoidance of per-byte overhead in its
    /// `strcspn!`-based scans.
    fn fast_forward_text(&mut self) {
        let haystack = &self.buffer.as_slice()[self.index..];
        let found = if self.options.decode_entities && self.special.is_none() {
            memchr::memchr2(b'<', b'&', haystack)
        } else {
            memchr::memchr(b'<', haystack)
        };
        self.index += found.unwrap_or(haystack.len());
    }

    fn dispatch(&mut self, c: u8) {
        match self.state {
            State::Text => self.state_text(c),

            State::BeforeTagName => self.state_before_tag_name(c),
            State::InTagName => self.state_in_tag_name(c),
            State::BeforeClosingTagName => self.state_before_closing_tag_name(c),
            State::InClosingTagName => self.state_in_closing_tag_name(c),
            State::AfterClosingTagName => self.state_after_closing_tag_name(c),

            State::BeforeAttributeName => self.state_before_attribute_name(c),
            State::InAttributeName => self.state_in_attribute_name(c),
            State::AfterAttributeName => self.state_after_attribute_name(c),
            State::BeforeAttributeValue => self.state_before_attribute_value(c),
            State::InAttributeValueDq => self.state_in_attribute_value_quoted(c, b'"'),
            State::InAttributeValueSq => self.state_in_attribute_value_quoted(c, b'\''),
            State::InAttributeValueNq => self.state_in_attribute_value_nq(c),
            State::InSelfClosingTag => self.state_in_self_closing_tag(c),

            State::BeforeDeclaration => self.state_before_declaration(c),
            State::InDeclaration => self.state_in_declaration(c),
            State::InProcessingInstruction => self.state_in_processing_instruction(c),
            State::BeforeComment => self.state_before_comment(c),
            State::InComment => self.state_in_comment(c),
            State::AfterComment1 => self.state_after_comment1(c),
            State::AfterComment2 => self.state_after_comment2(c),

            State::BeforeCdata1 => self.state_before_cdata_letter(c, b'C', State::BeforeCdata2),
            State::BeforeCdata2 => self.state_before_cdata_letter(c, b'D', State::BeforeCdata3),
            State::BeforeCdata3 => self.state_before_cdata_letter(c, b'A', State::BeforeCdata4),
            State::BeforeCdata4 => self.state_before_cdata_letter(c, b'T', State::BeforeCdata5),
            State::BeforeCdata5 => self.state_before_cdata_letter(c, b'A', State::BeforeCdata6),
            State::BeforeCdata6 => self.state_before_cdata6(c),
            State::InCdata => self.state_in_cdata(c),
            State::AfterCdata1 => self.state_after_cdata1(c),
            State::AfterCdata2 => self.state_after_cdata2(c),

            State::BeforeSpecial => self.state_before_special(c),
            State::BeforeSpecialEnd => self.state_before_special_end(c),

            State::BeforeEntity => self.state_before_entity(c),
            State::BeforeNumericEntity => self.state_before_numeric_entity(c),
            State::InNamedEntity => self.state_in_named_entity(c),
            State::InNumericEntity => self.state_in_numeric_entity(c, 10),
            State::InHexEntity => self.state_in_numeric_entity(c, 16),
        }
    }

    // ----- text & tag dispatch ----------------------------------------

    fn state_text(&mut self, c: u8) {
        if c == b'<' {
            // While inside special-tag content, a `<` only *might* begin the
            // matching close tag -- it is not yet known to end the text run,
            // so neither flushing nor moving section_start happens here.
            // Only a confirmed `</name>` match (state_before_special_end)
            // flushes the pending run; anything else is still literal text.
            if self.special.is_none() {
                self.flush_text();
                self.section_start = Some(self.index);
            }
            self.state = State::BeforeTagName;
        } else if c == b'&' && self.options.decode_entities && self.special.is_none() {
            self.flush_text();
            self.base_state = BaseState::Text;
            self.state = State::BeforeEntity;
            self.section_start = Some(self.index);
        }
    }

    fn state_before_tag_name(&mut self, c: u8) {
        if c == b'/' {
            self.state = State::BeforeClosingTagName;
            return;
        }
        if self.special.is_some() {
            // Inside special-tag content only `/` can start the tag that
            // ends it; every other character -- including a second `<` --
            // is still literal text, so section_start is left untouched.
            self.state = State::Text;
            return;
        }
        if c == b'<' {
            self.flush_text();
            self.section_start = Some(self.index);
            return;
        }
        if c == b'>' || is_whitespace(c) {
            self.state = State::Text;
            return;
        }
        if c == b'!' {
            self.state = State::BeforeDeclaration;
            self.section_start = Some(self.index + 1);
            return;
        }
        if c == b'?' {
            self.state = State::InProcessingInstruction;
            self.section_start = Some(self.index + 1);
            return;
        }
        if !self.options.xml_mode {
            let candidates = self.specials.candidates_for_first_byte(c);
            if !candidates.is_empty() {
                self.match_set = candidates;
                self.match_depth = 1;
                self.state = State::BeforeSpecial;
                self.section_start = Some(self.index);
                return;
            }
        }
        self.section_start = Some(self.index);
        self.state = State::InTagName;
    }

    fn state_in_tag_name(&mut self, c: u8) {
        if c == b'/' || c == b'>' || is_whitespace(c) {
            let start = self.section_start.take().expect("tag name section open");
            self.emit_open_tag_name(start, self.index);
            self.state = State::BeforeAttributeName;
            self.index -= 1;
        }
    }

    fn state_before_closing_tag_name(&mut self, c: u8) {
        if is_whitespace(c) {
            return;
        }
        if let Some(idx) = self.special {
            // Feed every character -- including `>` -- to the closing
            // matcher: a bare `</>` inside special-tag content can never be
            // the real close (no special tag name is empty), so it falls
            // out as NoMatch and the text run continues uninterrupted
            // rather than being cut short by a generic `>` shortcut.
            match closing_match(&self.specials, idx, 0, c) {
                ClosingMatch::Matching | ClosingMatch::Matched => {
                    self.match_depth = 1;
                    self.state = State::BeforeSpecialEnd;
                }
                ClosingMatch::NoMatch => {
                    self.index -= 1;
                    self.state = State::Text;
                }
            }
            return;
        }
        if c == b'>' {
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
            return;
        }
        self.section_start = Some(self.index);
        self.state = State::InClosingTagName;
    }

    fn state_in_closing_tag_name(&mut self, c: u8) {
        if c == b'>' || is_whitespace(c) {
            let start = self.section_start.take().expect("closing tag section open");
            self.emit_close_tag(start, self.index);
            self.state = State::AfterClosingTagName;
            self.index -= 1;
        }
    }

    fn state_after_closing_tag_name(&mut self, c: u8) {
        if c == b'>' {
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
        }
    }

    // ----- attributes ---------------------------------------------------

    fn state_before_attribute_name(&mut self, c: u8) {
        if c == b'>' {
            let pos = self.abs(self.index + 1);
            self.sink.on_open_tag_end(pos);
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
        } else if c == b'/' {
            self.state = State::InSelfClosingTag;
        } else if is_whitespace(c) {
            // stay
        } else {
            self.section_start = Some(self.index);
            self.state = State::InAttributeName;
        }
    }

    fn state_in_attribute_name(&mut self, c: u8) {
        if c == b'=' || c == b'/' || c == b'>' || is_whitespace(c) {
            let start = self.section_start.take().expect("attribute name section open");
            self.emit_attrib_name(start, self.index);
            self.state = State::AfterAttributeName;
            self.index -= 1;
        }
    }

    fn state_after_attribute_name(&mut self, c: u8) {
        if c == b'=' {
            self.state = State::BeforeAttributeValue;
        } else if c == b'/' || c == b'>' {
            let pos = self.abs(self.index);
            self.sink.on_attrib_end(pos);
            self.state = State::BeforeAttributeName;
            self.index -= 1;
        } else if is_whitespace(c) {
            // stay
        } else {
            let pos = self.abs(self.index);
            self.sink.on_attrib_end(pos);
            self.section_start = Some(self.index);
            self.state = State::InAttributeName;
        }
    }

    fn state_before_attribute_value(&mut self, c: u8) {
        if c == b'"' {
            self.state = State::InAttributeValueDq;
            self.section_start = Some(self.index + 1);
        } else if c == b'\'' {
            self.state = State::InAttributeValueSq;
            self.section_start = Some(self.index + 1);
        } else if is_whitespace(c) {
            // stay
        } else {
            self.state = State::InAttributeValueNq;
            self.section_start = Some(self.index);
            self.index -= 1;
        }
    }

    fn state_in_attribute_value_quoted(&mut self, c: u8, quote: u8) {
        if c == quote {
            let start = self.section_start.take().expect("attribute value section open");
            if self.index > start {
                self.emit_attrib_data(start, self.index);
            }
            let pos = self.abs(self.index + 1);
            self.sink.on_attrib_end(pos);
            self.state = State::BeforeAttributeName;
        } else if c == b'&' && self.options.decode_entities {
            let start = self.section_start.take().expect("attribute value section open");
            if self.index > start {
                self.emit_attrib_data(start, self.index);
            }
            self.base_state = if quote == b'"' {
                BaseState::InAttributeValueDq
            } else {
                BaseState::InAttributeValueSq
            };
            self.state = State::BeforeEntity;
            self.section_start = Some(self.index);
        }
    }

    fn state_in_attribute_value_nq(&mut self, c: u8) {
        if is_whitespace(c) || c == b'>' {
            let start = self.section_start.take().expect("attribute value section open");
            if self.index > start {
                self.emit_attrib_data(start, self.index);
            }
            let pos = self.abs(self.index);
            self.sink.on_attrib_end(pos);
            self.state = State::BeforeAttributeName;
            self.index -= 1;
        } else if c == b'&' && self.options.decode_entities {
            let start = self.section_start.take().expect("attribute value section open");
            if self.index > start {
                self.emit_attrib_data(start, self.index);
            }
            self.base_state = BaseState::InAttributeValueNq;
            self.state = State::BeforeEntity;
            self.section_start = Some(self.index);
        }
    }

    fn state_in_self_closing_tag(&mut self, c: u8) {
        if c == b'>' {
            let pos = self.abs(self.index + 1);
            self.sink.on_self_closing_tag(pos);
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
        } else if is_whitespace(c) {
            // stay
        } else {
            self.state = State::BeforeAttributeName;
            self.index -= 1;
        }
    }

    // ----- declarations, comments, CDATA, PIs ---------------------------

    fn state_before_declaration(&mut self, c: u8) {
        if c == b'[' {
            self.state = State::BeforeCdata1;
        } else if c == b'-' {
            self.state = State::BeforeComment;
        } else {
            self.state = State::InDeclaration;
        }
    }

    fn state_in_declaration(&mut self, c: u8) {
        if c == b'>' {
            let start = self.section_start.take().expect("declaration section open");
            self.emit_declaration(start, self.index);
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
        }
    }

    fn state_in_processing_instruction(&mut self, c: u8) {
        if c == b'>' {
            let start = self.section_start.take().expect("processing instruction section open");
            self.emit_processing_instruction(start, self.index);
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
        }
    }

    fn state_before_comment(&mut self, c: u8) {
        if c == b'-' {
            self.state = State::InComment;
            self.section_start = Some(self.index + 1);
        } else {
            self.state = State::InDeclaration;
        }
    }

    fn state_in_comment(&mut self, c: u8) {
        if c == b'-' {
            self.state = State::AfterComment1;
        }
    }

    fn state_after_comment1(&mut self, c: u8) {
        self.state = if c == b'-' {
            State::AfterComment2
        } else {
            State::InComment
        };
    }

    fn state_after_comment2(&mut self, c: u8) {
        if c == b'>' {
            let start = self.section_start.take().expect("comment section open");
            let end = self.index - 2;
            self.emit_comment(start, end);
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
        } else if c != b'-' {
            self.state = State::InComment;
        }
    }

    fn state_before_cdata_letter(&mut self, c: u8, expect: u8, next: State) {
        if c == expect {
            self.state = next;
        } else {
            self.state = State::InDeclaration;
            self.index -= 1;
        }
    }

    fn state_before_cdata6(&mut self, c: u8) {
        if c == b'[' {
            self.state = State::InCdata;
            self.section_start = Some(self.index + 1);
        } else {
            self.state = State::InDeclaration;
            self.index -= 1;
        }
    }

    fn state_in_cdata(&mut self, c: u8) {
        if c == b']' {
            self.state = State::AfterCdata1;
        }
    }

    fn state_after_cdata1(&mut self, c: u8) {
        self.state = if c == b']' {
            State::AfterCdata2
        } else {
            State::InCdata
        };
    }

    fn state_after_cdata2(&mut self, c: u8) {
        if c == b'>' {
            let start = self.section_start.take().expect("cdata section open");
            let end = self.index - 2;
            self.emit_cdata(start, end);
            self.state = State::Text;
            self.section_start = Some(self.index + 1);
        } else if c != b']' {
            self.state = State::InCdata;
        }
    }

    // ----- special-tag matcher ------------------------------------------

    fn state_before_special(&mut self, c: u8) {
        let lc = c.to_ascii_lowercase();
        let mut retained = Vec::with_capacity(self.match_set.len());
        let mut matched = None;
        for &idx in &self.match_set {
            let name = self.specials.name(idx);
            if self.match_depth < name.len() {
                if name[self.match_depth] == lc {
                    retained.push(idx);
                }
            } else if c == b'>' || is_whitespace(c) {
                matched = Some(idx);
                break;
            }
        }
        if let Some(idx) = matched {
            log::trace!("entering special-tag content for tag index {idx}");
            self.special = Some(idx);
            self.index -= 1;
            self.state = State::InTagName;
            return;
        }
        if retained.is_empty() {
            self.index -= 1;
            self.state = State::InTagName;
        } else {
            self.match_set = retained;
            self.match_depth += 1;
        }
    }

    fn state_before_special_end(&mut self, c: u8) {
        let idx = self.special.expect("special tag set while matching its close");
        match closing_match(&self.specials, idx, self.match_depth, c) {
            ClosingMatch::Matching => {
                self.match_depth += 1;
            }
            ClosingMatch::Matched => {
                log::trace!("leaving special-tag content for tag index {idx}");
                let name_len = self.specials.name(idx).len();
                let tag_name_start = self.index - name_len;
                // `section_start` still holds the start of the text run
                // that has been accumulating, untouched, since the special
                // tag's content began (or since the last confirmed close);
                // flush it now that `</name>` is confirmed, before
                // overwriting section_start to capture the tag name itself.
                if let Some(text_start) = self.section_start {
                    let text_end = tag_name_start - 2; // before the `</`
                    if text_end > text_start {
                        self.emit_text(text_start, text_end);
                    }
                }
                self.section_start = Some(tag_name_start);
                self.special = None;
                self.state = State::InClosingTagName;
                self.index -= 1;
            }
            ClosingMatch::NoMatch => {
                self.index -= 1;
                self.state = State::Text;
            }
        }
    }

    // ----- entities -------------------------------------------------------

    fn state_before_entity(&mut self, c: u8) {
        if c == b'#' {
            self.state = State::BeforeNumericEntity;
        } else {
            self.state = State::InNamedEntity;
            self.index -= 1;
        }
    }

    fn state_before_numeric_entity(&mut self, c: u8) {
        if c == b'x' || c == b'X' {
            self.state = State::InHexEntity;
        } else {
            self.state = State::InNumericEntity;
            self.index -= 1;
        }
    }

    fn state_in_named_entity(&mut self, c: u8) {
        if c.is_ascii_alphanumeric() {
            return;
        }

        let amp = self.section_start.expect("entity section open");
        let name_start = amp + 1;
        let name = String::from_utf8_lossy(&self.buffer.as_slice()[name_start..self.index]).into_owned();

        if c == b';' {
            let decoded = entities::lookup_strict(&name, self.options.xml_mode).or_else(|| {
                if self.options.xml_mode {
                    None
                } else {
                    entities::lookup_legacy_exact(&name)
                }
            });
            if let Some(replacement) = decoded {
                self.emit_decoded(replacement, amp, self.index + 1);
                self.section_start = Some(self.index + 1);
            }
            // Unrecognised-but-terminated references are left untouched: the
            // accumulated "&name" stays pending and is passed through
            // literally in the next flush.
            self.state = self.base_state.as_state();
            return;
        }

        if self.options.xml_mode || name.is_empty() {
            self.index -= 1;
            self.state = self.base_state.as_state();
            return;
        }

        if self.base_state.is_attribute_value() {
            // Semicolon-less references inside attribute values immediately
            // followed by `=` are deliberately not decoded, to avoid mangling
            // URL query strings.
            if c != b'=' {
                if let Some(replacement) = entities::lookup_legacy_exact(&name) {
                    self.emit_decoded(replacement, amp, self.index);
                    self.section_start = Some(self.index);
                }
            }
            self.index -= 1;
            self.state = self.base_state.as_state();
        } else if let Some((len, replacement)) = entities::lookup_legacy_prefix(&name) {
            self.emit_decoded(replacement, amp, name_start + len);
            self.section_start = Some(name_start + len);
            self.index = name_start + len - 1;
            self.state = self.base_state.as_state();
        } else {
            self.index -= 1;
            self.state = self.base_state.as_state();
        }
    }

    fn state_in_numeric_entity(&mut self, c: u8, radix: u32) {
        let is_digit = if radix == 16 {
            c.is_ascii_hexdigit()
        } else {
            c.is_ascii_digit()
        };
        if is_digit {
            return;
        }

        let amp = self.section_start.expect("entity section open");
        let digits_start = if radix == 16 { amp + 3 } else { amp + 2 };
        let digits = String::from_utf8_lossy(&self.buffer.as_slice()[digits_start..self.index]).into_owned();

        if c == b';' {
            let decoded = entities::decode_numeric(&digits, radix);
            let mut buf = [0u8; 4];
            let text = decoded.encode_utf8(&mut buf).to_string();
            self.emit_decoded(&text, amp, self.index + 1);
            self.section_start = Some(self.index + 1);
            self.state = self.base_state.as_state();
        } else if !self.options.xml_mode {
            let decoded = entities::decode_numeric(&digits, radix);
            let mut buf = [0u8; 4];
            let text = decoded.encode_utf8(&mut buf).to_string();
            self.emit_decoded(&text, amp, self.index);
            self.section_start = Some(self.index);
            self.index -= 1;
            self.state = self.base_state.as_state();
        } else {
            self.index -= 1;
            self.state = self.base_state.as_state();
        }
    }

    // ----- finalisation ---------------------------------------------------

    fn finish(&mut self) {
        if let Some(start) = self.section_start {
            if self.special.is_some()
                && matches!(
                    self.state,
                    State::BeforeTagName | State::BeforeClosingTagName | State::BeforeSpecialEnd
                )
            {
                // Input ended mid-attempt at matching a special tag's close
                // sequence; section_start still marks the start of the text
                // run that has been pending since content began (or since the
                // last confirmed close), so salvage the whole thing as text
                // rather than falling into the generic tag-structural drop
                // below.
                if self.index > start {
                    self.emit_text(start, self.index);
                }
                let pos = self.get_absolute_index();
                self.sink.on_end(pos);
                return;
            }
            match self.state {
                State::InCdata | State::AfterCdata1 | State::AfterCdata2 => {
                    self.emit_cdata(start, self.index);
                }
                State::InComment | State::AfterComment1 | State::AfterComment2 => {
                    self.emit_comment(start, self.index);
                }
                State::InNamedEntity if !self.options.xml_mode => {
                    let name =
                        String::from_utf8_lossy(&self.buffer.as_slice()[start + 1..self.index]).into_owned();
                    if let Some((len, replacement)) = entities::lookup_legacy_prefix(&name) {
                        let consumed_end = start + 1 + len;
                        self.emit_decoded(replacement, start, consumed_end);
                        self.finish_remaining(consumed_end);
                    } else {
                        self.finish_remaining(start);
                    }
                }
                State::InNumericEntity | State::InHexEntity if !self.options.xml_mode => {
                    let radix = if self.state == State::InHexEntity { 16 } else { 10 };
                    let digits_start = if radix == 16 { start + 3 } else { start + 2 };
                    let digits =
                        String::from_utf8_lossy(&self.buffer.as_slice()[digits_start..self.index]).into_owned();
                    let decoded = entities::decode_numeric(&digits, radix);
                    let mut buf = [0u8; 4];
                    let text = decoded.encode_utf8(&mut buf).to_string();
                    self.emit_decoded(&text, start, self.index);
                    self.finish_remaining(self.index);
                }
                State::InTagName
                | State::BeforeTagName
                | State::BeforeClosingTagName
                | State::InClosingTagName
                | State::BeforeAttributeName
                | State::InAttributeName
                | State::AfterAttributeName
                | State::BeforeAttributeValue
                | State::InAttributeValueDq
                | State::InAttributeValueSq
                | State::InAttributeValueNq
                | State::InSelfClosingTag
                | State::BeforeSpecial
                | State::BeforeSpecialEnd => {
                    // Incomplete tag/attribute structure at end-of-input is
                    // salvaged nowhere; it is simply dropped.
                }
                _ => {
                    if self.index > start {
                        self.emit_text(start, self.index);
                    }
                }
            }
        }
        let pos = self.get_absolute_index();
        self.sink.on_end(pos);
    }

    /// Dispatches the bytes from `start` to the current index against the
    /// base state an abandoned entity reference returns to, as §4.5 requires
    /// ("recurse with remaining data against the base state").
    fn finish_remaining(&mut self, start: usize) {
        if self.base_state == BaseState::Text && self.index > start {
            self.emit_text(start, self.index);
        }
        // Attribute-value base states are tag-structural: leftover
        // unconsumed text there is dropped, same as any other incomplete
        // attribute value at end-of-input.
    }

    // ----- buffer compaction ------------------------------------------

    fn flush_text(&mut self) {
        if let Some(start) = self.section_start {
            if self.index > start {
                self.emit_text(start, self.index);
            }
        }
    }

    fn compact(&mut self) {
        let drop_to = match self.section_start {
            None => self.index,
            Some(_) if self.running && self.state == State::Text => {
                self.flush_text();
                self.index
            }
            Some(s) if s == self.index => self.index,
            Some(s) => s,
        };
        if drop_to == 0 {
            return;
        }
        self.buffer.compact(drop_to);
        self.index -= drop_to;
        self.section_start = self.section_start.map(|s| s.saturating_sub(drop_to));
    }

    // ----- emission helpers ---------------------------------------------

    fn abs(&self, local: usize) -> usize {
        self.buffer.offset() + local
    }

    fn emit_text(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let text = String::from_utf8_lossy(&self.buffer.as_slice()[start..end]).into_owned();
        self.sink.on_text(&text, a, b);
    }

    fn emit_decoded(&mut self, text: &str, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        match self.base_state {
            BaseState::Text => self.sink.on_text(text, a, b),
            _ => self.sink.on_attrib_data(text, a, b),
        }
    }

    fn emit_open_tag_name(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let name = self.buffer.as_slice()[start..end].to_vec();
        self.sink.on_open_tag_name(&name, a, b);
    }

    fn emit_close_tag(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let name = self.buffer.as_slice()[start..end].to_vec();
        self.sink.on_close_tag(&name, a, b);
    }

    fn emit_attrib_name(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let name = self.buffer.as_slice()[start..end].to_vec();
        self.sink.on_attrib_name(&name, a, b);
    }

    fn emit_attrib_data(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let text = String::from_utf8_lossy(&self.buffer.as_slice()[start..end]).into_owned();
        self.sink.on_attrib_data(&text, a, b);
    }

    fn emit_comment(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let data = self.buffer.as_slice()[start..end].to_vec();
        self.sink.on_comment(&data, a, b);
    }

    fn emit_cdata(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let data = self.buffer.as_slice()[start..end].to_vec();
        self.sink.on_cdata(&data, a, b);
    }

    fn emit_declaration(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let data = self.buffer.as_slice()[start..end].to_vec();
        self.sink.on_declaration(&data, a, b);
    }

    fn emit_processing_instruction(&mut self, start: usize, end: usize) {
        let (a, b) = (self.abs(start), self.abs(end));
        let data = self.buffer.as_slice()[start..end].to_vec();
        self.sink.on_processing_instruction(&data, a, b);
    }
}
