//! Shared test scaffolding: a [`Sink`] that records every callback as a
//! comparable [`Event`], used across the integration tests the way the
//! teacher's own `html5lib-tests` crate replays fixtures against callbacks.

use html_tokenizer::{Options, Sink, Tokenizer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Text(String),
    OpenTagName(String),
    OpenTagEnd,
    SelfClosingTag,
    CloseTag(String),
    AttribName(String),
    AttribData(String),
    AttribEnd,
    Comment(String),
    Cdata(String),
    Declaration(String),
    ProcessingInstruction(String),
    Error(String),
    End,
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl Sink for RecordingSink {
    fn on_text(&mut self, text: &str, _start: usize, _end: usize) {
        self.events.push(Event::Text(text.to_string()));
    }

    fn on_open_tag_name(&mut self, name: &[u8], _start: usize, _end: usize) {
        self.events.push(Event::OpenTagName(bytes_to_string(name)));
    }

    fn on_open_tag_end(&mut self, _end: usize) {
        self.events.push(Event::OpenTagEnd);
    }

    fn on_self_closing_tag(&mut self, _end: usize) {
        self.events.push(Event::SelfClosingTag);
    }

    fn on_close_tag(&mut self, name: &[u8], _start: usize, _end: usize) {
        self.events.push(Event::CloseTag(bytes_to_string(name)));
    }

    fn on_attrib_name(&mut self, name: &[u8], _start: usize, _end: usize) {
        self.events.push(Event::AttribName(bytes_to_string(name)));
    }

    fn on_attrib_data(&mut self, value: &str, _start: usize, _end: usize) {
        self.events.push(Event::AttribData(value.to_string()));
    }

    fn on_attrib_end(&mut self, _end: usize) {
        self.events.push(Event::AttribEnd);
    }

    fn on_comment(&mut self, data: &[u8], _start: usize, _end: usize) {
        self.events.push(Event::Comment(bytes_to_string(data)));
    }

    fn on_cdata(&mut self, data: &[u8], _start: usize, _end: usize) {
        self.events.push(Event::Cdata(bytes_to_string(data)));
    }

    fn on_declaration(&mut self, data: &[u8], _start: usize, _end: usize) {
        self.events.push(Event::Declaration(bytes_to_string(data)));
    }

    fn on_processing_instruction(&mut self, data: &[u8], _start: usize, _end: usize) {
        self.events.push(Event::ProcessingInstruction(bytes_to_string(data)));
    }

    fn on_error(&mut self, message: &str, _position: usize) {
        self.events.push(Event::Error(message.to_string()));
    }

    fn on_end(&mut self, _position: usize) {
        self.events.push(Event::End);
    }
}

/// Feeds `input` to a fresh tokenizer in one chunk and returns the recorded
/// event trace.
pub fn tokenize(input: &[u8], options: Options) -> Vec<Event> {
    let mut tokenizer = Tokenizer::new(RecordingSink::default(), options);
    tokenizer.write(input);
    tokenizer.end(None);
    tokenizer.sink().events.clone()
}

/// Feeds `input` split at every offset in `splits` (sorted, deduplicated by
/// the caller) across successive `write` calls, then `end`s the stream.
pub fn tokenize_chunked(input: &[u8], splits: &[usize], options: Options) -> Vec<Event> {
    let mut tokenizer = Tokenizer::new(RecordingSink::default(), options);
    let mut prev = 0;
    for &split in splits {
        tokenizer.write(&input[prev..split]);
        prev = split;
    }
    tokenizer.write(&input[prev..]);
    tokenizer.end(None);
    tokenizer.sink().events.clone()
}
