//! # Timed Lyrics: parsing and playback sync for LRC, SRT and word-timed TTML
//!
//! This crate turns lyric files into one unified model, [`ParsedLyrics`], and answers the
//! question a player asks on every frame: *which line is active right now, are we inside an
//! instrumental break, and how far along is each word?*
//!
//! The main entry points are:
//! - [`parse`]: detects the format (from an extension hint or the content itself) and parses it.
//!   It never fails; unreadable input yields an empty, unsynced document.
//! - [`merge_translations`]: folds a companion document (for example `song.en.ttml`) into a
//!   primary one, line by line.
//! - [`evaluate`]: a pure function from `(document, time, previous active line)` to a
//!   [`SyncState`]. [`SyncSession`] keeps the previous line for you.
//!
//! ## Example
//!
//! ```rust
//! use timed_lyrics::{evaluate, parse, LyricsFormat};
//!
//! let ttml = r#"<tt itunes:timing="Word"><body><div>
//!   <p begin="1.0" end="3.0"><span begin="1.0" end="1.4">Hel</span><span begin="1.4" end="2.0">lo</span> <span begin="2.0" end="3.0">world</span></p>
//!   <p begin="10.0" end="12.0"><span begin="10.0" end="12.0">again</span></p>
//! </div></body></tt>"#;
//!
//! let doc = parse(ttml, Some("song.ttml"));
//! assert_eq!(doc.format, LyricsFormat::Ttml);
//! assert!(doc.has_word_timing);
//!
//! let words = doc.lines[0].words.as_deref().unwrap_or_default();
//! assert_eq!(words[0].text, "Hello");
//! assert!(words[0].is_syllabified());
//!
//! let state = evaluate(&doc, 1.7, None);
//! assert_eq!(state.active_line_index, Some(0));
//! assert!(!state.is_word_complete(0));
//!
//! // The first line ends at 3.0 and the next starts at 10.0: an instrumental gap.
//! let state = evaluate(&doc, 5.0, state.active_line_index);
//! assert!(state.is_in_gap);
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod sync;
pub mod types;

pub use config::{LyricsConfig, ParsingOptions, SyncConfig};
pub use converter::{
    detect_format, merge_all, merge_text_as_translation, merge_translations, parse,
    parse_with_options,
};
pub use error::LyricsError;
pub use sync::{SyncSession, SyncState, evaluate, evaluate_with_config};
pub use types::{LyricsFormat, LyricsLine, LyricsSyllable, LyricsWord, ParsedLyrics};
