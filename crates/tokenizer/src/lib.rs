//! A streaming, chunk-resumable HTML/XML lexical tokenizer.
//!
//! [`Tokenizer`] accepts document text in arbitrary chunks via
//! [`Tokenizer::write`] and reports a stream of lexical events -- text runs,
//! tag names, attributes, comments, CDATA, declarations, processing
//! instructions, decoded entities -- to a caller-supplied [`Sink`]. It never
//! backtracks over data already handed to the consumer and never builds a
//! tree: tree construction, DOM building, and HTML5-conformant insertion
//! modes are out of scope (see the crate-level `SPEC_FULL.md` in the
//! workspace root for the full contract this crate implements).
//!
//! ```
//! use html_tokenizer::{Options, Sink, Tokenizer};
//!
//! #[derive(Default)]
//! struct Collector(Vec<String>);
//!
//! impl Sink for Collector {
//!     fn on_open_tag_name(&mut self, name: &[u8], _start: usize, _end: usize) {
//!         self.0.push(String::from_utf8_lossy(name).into_owned());
//!     }
//! }
//!
//! let mut tokenizer = Tokenizer::new(Collector::default(), Options::default());
//! tokenizer.write(b"<p class=\"x\">hi</p>");
//! tokenizer.end(None);
//! assert_eq!(tokenizer.sink().0, vec!["p".to_string()]);
//! ```

mod buffer;
mod error;
mod options;
mod sink;
mod special;
mod state;
mod tokenizer;

pub use error::TokenizerError;
pub use options::Options;
pub use sink::Sink;
pub use tokenizer::Tokenizer;
