/// Tokenising and compiling: turning a line of source text into either
/// immediate stack effects (interpreting mode) or a growing compiled
/// body (between `:` and `;`).
///
/// Execution itself — what happens once a token resolves to a word or
/// a literal — belongs to `inner`; this module only classifies tokens
/// and manages the two states a line of input can be read in.
use crate::internals::body::{self, BodyItem};
use crate::internals::dictionary::{self, Entry, EntryKind};
use crate::kernel::MemoryImage;

/// Split `line` into whitespace-delimited tokens. Any byte `<= 0x20`
/// is a delimiter; runs of delimiters collapse. `HERE`'s sibling
/// system variable, `LASTWS`, records the most recent delimiter byte
/// consumed, matching the original tokeniser's bookkeeping.
pub fn tokenize(mem: &mut MemoryImage, line: &str) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(token) = next_token(mem, bytes, &mut pos) {
        tokens.push(token);
    }
    tokens
}

fn next_token(mem: &mut MemoryImage, bytes: &[u8], pos: &mut usize) -> Option<String> {
    while *pos < bytes.len() && bytes[*pos] <= 0x20 {
        mem.set_last_whitespace(bytes[*pos]);
        *pos += 1;
    }
    if *pos >= bytes.len() {
        return None;
    }
    let start = *pos;
    while *pos < bytes.len() && bytes[*pos] > 0x20 {
        *pos += 1;
    }
    Some(String::from_utf8_lossy(&bytes[start..*pos]).into_owned())
}

/// Parse a token as a 16-bit literal: `0x`-prefixed hex, or base-10
/// with an optional leading `-`. A bare `-` (no digit following) is
/// not a literal — it falls through to dictionary lookup, where it
/// names the subtraction word.
pub fn parse_literal(token: &str) -> Option<u16> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        return u16::from_str_radix(hex, 16).ok();
    }
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let negative = bytes[0] == b'-' && bytes.len() > 1 && bytes[1].is_ascii_digit();
    let digits = if negative { &token[1..] } else { token };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    if !(i16::MIN as i64..=u16::MAX as i64).contains(&value) {
        return None;
    }
    Some(value as u16)
}

#[derive(Debug, Clone, Copy)]
pub enum Classified {
    Word(Entry),
    Literal(u16),
}

/// Classify a token: dictionary lookup first, literal parse second.
/// `None` means neither matched — an unrecognized token.
pub fn classify(mem: &MemoryImage, token: &str) -> Option<Classified> {
    if let Some((entry, _)) = dictionary::find(mem, token) {
        return Some(Classified::Word(entry));
    }
    parse_literal(token).map(Classified::Literal)
}

/// Whether the interpreter is reading a definition's body or
/// executing tokens immediately. `Defining` carries enough state to
/// roll a half-finished definition back if it goes wrong.
#[derive(Debug, Clone, Copy)]
pub enum DefState {
    Idle,
    Defining {
        saved_here: usize,
        saved_current: usize,
    },
}

impl DefState {
    pub fn is_defining(&self) -> bool {
        matches!(self, DefState::Defining { .. })
    }
}

/// `:` — open a new dictionary entry named by the next token and
/// enter defining mode. The header's payload is empty; the body is
/// appended immediately afterward, one item at a time, by `compile`.
pub fn begin_definition(mem: &mut MemoryImage, name: &str) -> DefState {
    let saved_here = mem.here();
    let saved_current = mem.current();
    dictionary::create(mem, name, EntryKind::Compiled, 0);
    DefState::Defining {
        saved_here,
        saved_current,
    }
}

/// `;` — terminate the current definition with a stop marker and
/// return to interpreting mode.
pub fn end_definition(mem: &mut MemoryImage) -> DefState {
    body::write_item(mem, BodyItem::Stop);
    DefState::Idle
}

/// Roll back a definition abandoned mid-way (an unrecognized token was
/// hit while compiling): HERE and CURRENT return to what they were
/// before `:`, so the half-written entry is invisible and its space is
/// reclaimed.
pub fn abort_definition(mem: &mut MemoryImage, state: DefState) -> DefState {
    if let DefState::Defining {
        saved_here,
        saved_current,
    } = state
    {
        mem.set_here(saved_here);
        mem.set_current(saved_current);
    }
    DefState::Idle
}

/// Append a classified token to the body under construction.
pub fn compile(mem: &mut MemoryImage, classified: Classified) {
    let item = match classified {
        Classified::Word(entry) => BodyItem::WordCall(entry.offset),
        Classified::Literal(v) => BodyItem::Literal(v),
    };
    body::write_item(mem, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> MemoryImage {
        let mut mem = MemoryImage::new();
        mem.cold();
        mem
    }

    #[test]
    fn tokenize_splits_on_whitespace_and_collapses_runs() {
        let mut mem = fresh();
        let tokens = tokenize(&mut mem, "  dup   * 7 ");
        assert_eq!(tokens, vec!["dup", "*", "7"]);
    }

    #[test]
    fn tokenize_records_last_whitespace_byte() {
        let mut mem = fresh();
        tokenize(&mut mem, "dup\t*");
        assert_eq!(mem.last_whitespace(), b'\t');
    }

    #[test]
    fn parse_literal_decimal_and_negative() {
        assert_eq!(parse_literal("42"), Some(42));
        assert_eq!(parse_literal("-1"), Some(0xFFFF));
        assert_eq!(parse_literal("-"), None);
        assert_eq!(parse_literal("-dup"), None);
    }

    #[test]
    fn parse_literal_hex() {
        assert_eq!(parse_literal("0xFF"), Some(0xFF));
        assert_eq!(parse_literal("0x10"), Some(16));
    }

    #[test]
    fn parse_literal_out_of_range_is_none() {
        assert_eq!(parse_literal("70000"), None);
        assert_eq!(parse_literal("-40000"), None);
    }

    #[test]
    fn classify_prefers_dictionary_entry_over_numeric_looking_name() {
        let mut mem = fresh();
        dictionary::create(&mut mem, "1", EntryKind::Cell, 2);
        match classify(&mem, "1") {
            Some(Classified::Word(_)) => (),
            other => panic!("expected Word, got {other:?}"),
        }
    }

    #[test]
    fn classify_unknown_token_is_none() {
        let mem = fresh();
        assert!(classify(&mem, "nonesuch").is_none());
    }

    #[test]
    fn definition_round_trip_compiles_dup_times_then_stop() {
        let mut mem = fresh();
        dictionary::create(&mut mem, "dup", EntryKind::Native, 1);
        let dup_offset = mem.current();

        let state = begin_definition(&mut mem, "sq");
        assert!(state.is_defining());
        compile(&mut mem, Classified::Word(dictionary::find(&mem, "dup").unwrap().0));
        compile(&mut mem, Classified::Word(Entry {
            offset: dup_offset,
            kind: EntryKind::Native,
            prev: 0,
        }));
        let state = end_definition(&mut mem);
        assert!(!state.is_defining());

        let (entry, _) = dictionary::find(&mem, "sq").unwrap();
        let (first, next) = body::read_item(&mem, entry.payload());
        assert_eq!(first, BodyItem::WordCall(dup_offset));
        let (second, next2) = body::read_item(&mem, next);
        assert_eq!(second, BodyItem::WordCall(dup_offset));
        let (third, _) = body::read_item(&mem, next2);
        assert_eq!(third, BodyItem::Stop);
    }

    #[test]
    fn abort_definition_rewinds_here_and_current() {
        let mut mem = fresh();
        let before_here = mem.here();
        let before_current = mem.current();
        let state = begin_definition(&mut mem, "oops");
        compile(&mut mem, Classified::Literal(1));
        abort_definition(&mut mem, state);
        assert_eq!(mem.here(), before_here);
        assert_eq!(mem.current(), before_current);
        assert!(dictionary::find(&mem, "oops").is_none());
    }
}
