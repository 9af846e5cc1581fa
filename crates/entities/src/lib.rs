//! Character-reference decoding: named (strict + legacy), numeric, and hex.
//!
//! The named-entity tables are generated at build time by `gen-entities` from
//! `data/entities.json` (see that crate for the codegen). This crate only
//! adds the lookup rules and the numeric code-point remapping table that sit
//! on top of the generated data.

gen_entities::entities_lookup!("crates/entities/data/entities.json");

/// U+FFFD REPLACEMENT CHARACTER.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// The five character references required by XML 1.0. Unlike HTML's named
/// references these have no legacy (semicolon-optional) form, and `apos` has
/// no HTML equivalent at all -- it is deliberately absent from the generated
/// HTML table.
const XML_STRICT: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
];

/// Looks up a semicolon-terminated named reference. `name` must not include
/// the leading `&` or the trailing `;`.
pub fn lookup_strict(name: &str, xml_mode: bool) -> Option<&'static str> {
    if xml_mode {
        XML_STRICT
            .iter()
            .find_map(|(n, v)| if *n == name { Some(*v) } else { None })
    } else {
        STRICT.get(name).copied()
    }
}

/// Looks up a semicolon-optional named reference requiring an exact match of
/// the whole name, rather than the longest-prefix search `lookup_legacy_prefix`
/// performs. Used where a caller must not silently consume a trailing
/// substring of a longer, unrecognised name (see `lookup_legacy_prefix` for the
/// prefix-matching counterpart).
pub fn lookup_legacy_exact(name: &str) -> Option<&'static str> {
    LEGACY.get(name).copied()
}

/// Finds the longest legacy (semicolon-optional) named reference that
/// prefixes `buf`, trying lengths from `min(6, buf.len())` down to 2, as the
/// longest legacy name (e.g. `frac34`) is six characters.
///
/// Returns the matched byte length and its replacement text.
pub fn lookup_legacy_prefix(buf: &str) -> Option<(usize, &'static str)> {
    let max_len = buf.len().min(6);
    for len in (2..=max_len).rev() {
        // `buf` holds only ASCII alphanumerics while a name is accumulating,
        // so byte length and char length coincide here.
        if !buf.is_char_boundary(len) {
            continue;
        }
        if let Some(value) = LEGACY.get(&buf[..len]) {
            return Some((len, value));
        }
    }
    None
}

/// Decodes a run of ASCII digits (`radix` 10 or 16) as a numeric character
/// reference, applying the HTML5 replacement rules below.
pub fn decode_numeric(digits: &str, radix: u32) -> char {
    let value = u32::from_str_radix(digits, radix).unwrap_or(0);
    decode_code_point(value)
}

/// C1 control codes 0x80-0x9F were frequently authored as if the document
/// were Windows-1252 rather than ISO-8859-1; HTML5 numeric character
/// references therefore remap them to their Windows-1252 meaning instead of
/// leaving them as C1 controls. Entries Windows-1252 leaves undefined map to
/// themselves.
static CP1252_REPLACEMENTS: [u32; 32] = [
    0x20AC, // 0x80 -> EURO SIGN (€).
    0x0081, // 0x81 -> (no change).
    0x201A, // 0x82 -> SINGLE LOW-9 QUOTATION MARK (‚).
    0x0192, // 0x83 -> LATIN SMALL LETTER F WITH HOOK (ƒ).
    0x201E, // 0x84 -> DOUBLE LOW-9 QUOTATION MARK („).
    0x2026, // 0x85 -> HORIZONTAL ELLIPSIS (…).
    0x2020, // 0x86 -> DAGGER (†).
    0x2021, // 0x87 -> DOUBLE DAGGER (‡).
    0x02C6, // 0x88 -> MODIFIER LETTER CIRCUMFLEX ACCENT (ˆ).
    0x2030, // 0x89 -> PER MILLE SIGN (‰).
    0x0160, // 0x8A -> LATIN CAPITAL LETTER S WITH CARON (Š).
    0x2039, // 0x8B -> SINGLE LEFT-POINTING ANGLE QUOTATION MARK (‹).
    0x0152, // 0x8C -> LATIN CAPITAL LIGATURE OE (Œ).
    0x008D, // 0x8D -> (no change).
    0x017D, // 0x8E -> LATIN CAPITAL LETTER Z WITH CARON (Ž).
    0x008F, // 0x8F -> (no change).
    0x0090, // 0x90 -> (no change).
    0x2018, // 0x91 -> LEFT SINGLE QUOTATION MARK (‘).
    0x2019, // 0x92 -> RIGHT SINGLE QUOTATION MARK (’).
    0x201C, // 0x93 -> LEFT DOUBLE QUOTATION MARK (“).
    0x201D, // 0x94 -> RIGHT DOUBLE QUOTATION MARK (”).
    0x2022, // 0x95 -> BULLET (•).
    0x2013, // 0x96 -> EN DASH (–).
    0x2014, // 0x97 -> EM DASH (—).
    0x02DC, // 0x98 -> SMALL TILDE (˜).
    0x2122, // 0x99 -> TRADE MARK SIGN (™).
    0x0161, // 0x9A -> LATIN SMALL LETTER S WITH CARON (š).
    0x203A, // 0x9B -> SINGLE RIGHT-POINTING ANGLE QUOTATION MARK (›).
    0x0153, // 0x9C -> LATIN SMALL LIGATURE OE (œ).
    0x009D, // 0x9D -> (no change).
    0x017E, // 0x9E -> LATIN SMALL LETTER Z WITH CARON (ž).
    0x0178, // 0x9F -> LATIN CAPITAL LETTER Y WITH DIAERESIS (Ÿ).
];

/// Maps a raw numeric-character-reference code point to the character it
/// represents, per the HTML5 "numeric character reference end state" table:
/// null, surrogates, and out-of-range values become U+FFFD; the Windows-1252
/// "best fit" range is remapped; everything else passes through unchanged.
pub fn decode_code_point(code_point: u32) -> char {
    if code_point == 0 || code_point > 0x10FFFF || (0xD800..=0xDFFF).contains(&code_point) {
        return REPLACEMENT_CHARACTER;
    }
    if (0x80..=0x9F).contains(&code_point) {
        let replaced = CP1252_REPLACEMENTS[(code_point - 0x80) as usize];
        return char::from_u32(replaced).unwrap_or(REPLACEMENT_CHARACTER);
    }
    char::from_u32(code_point).unwrap_or(REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strict_html_lookup() {
        assert_eq!(lookup_strict("amp", false), Some("&"));
        assert_eq!(lookup_strict("hellip", false), Some("\u{2026}"));
        assert_eq!(lookup_strict("notareal", false), None);
    }

    #[test]
    fn strict_xml_lookup_is_restricted() {
        assert_eq!(lookup_strict("amp", true), Some("&"));
        assert_eq!(lookup_strict("apos", true), Some("'"));
        // hellip is an HTML-only reference; XML mode must not see it.
        assert_eq!(lookup_strict("hellip", true), None);
    }

    #[test]
    fn apos_is_absent_from_html_table() {
        assert_eq!(lookup_strict("apos", false), None);
    }

    #[test]
    fn legacy_exact_rejects_partial_names() {
        assert_eq!(lookup_legacy_exact("not"), Some("\u{AC}"));
        // "notit" isn't a legacy entity itself, even though "not" prefixes it.
        assert_eq!(lookup_legacy_exact("notit"), None);
    }

    #[test]
    fn legacy_prefix_matches_longest_first() {
        // "notit" isn't real, but "not" is a legacy entity (¬); the match
        // should land on length 3, not keep scanning further.
        assert_eq!(lookup_legacy_prefix("notit;"), Some((3, "\u{AC}")));
        assert_eq!(lookup_legacy_prefix("ampersand"), Some((3, "&")));
        assert_eq!(lookup_legacy_prefix("zzz"), None);
    }

    #[test]
    fn numeric_decimal_and_hex() {
        assert_eq!(decode_numeric("65", 10), 'A');
        assert_eq!(decode_numeric("41", 16), 'A');
    }

    #[test]
    fn numeric_cp1252_replacement() {
        assert_eq!(decode_code_point(0x80), '\u{20AC}');
        assert_eq!(decode_code_point(0x95), '\u{2022}');
    }

    #[test]
    fn numeric_surrogate_and_overflow_replaced() {
        assert_eq!(decode_code_point(0xD800), REPLACEMENT_CHARACTER);
        assert_eq!(decode_code_point(0x110000), REPLACEMENT_CHARACTER);
        assert_eq!(decode_code_point(0), REPLACEMENT_CHARACTER);
    }
}
