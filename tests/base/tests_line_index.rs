#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

//! Line and column lookups checked against a naive scan of the source.

use once_cell::sync::Lazy;
use pops::{Locate, Locator, SubLocator, TextRange, TextSize};
use rstest::rstest;

/// A long manifest with lines of varying width and multi-byte text, generated once
static LONG_SOURCE: Lazy<String> = Lazy::new(|| {
    (0..500)
        .map(|i| format!("$v{i} = '{}'\n", "é".repeat(i % 7)))
        .collect()
});

const CORPUS: &[&str] = &[
    "",
    "a",
    "\n",
    "\n\n\n",
    "class a {\n  $x = 1\n}\n",
    "no trailing newline\nlast",
    "crlf\r\nline\r\n",
    "ünïcödé\n  $é = 'ß'\n€",
    "tab\there\n\tand\tthere",
];

fn naive_line(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

fn naive_column(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..offset].chars().count() + 1
}

fn boundaries(source: &str) -> impl Iterator<Item = usize> + '_ {
    (0..=source.len()).filter(|i| source.is_char_boundary(*i))
}

#[test]
fn test_line_index_matches_newline_count() {
    for source in CORPUS {
        let locator = Locator::new(*source, "f.pp");
        assert_eq!(
            locator.line_index().len(),
            source.matches('\n').count() + 1,
            "{source:?}"
        );
        for offset in boundaries(source) {
            let at = TextSize::new(offset as u32);
            assert_eq!(
                locator.line_for_offset(at),
                naive_line(source, offset),
                "line of {offset} in {source:?}"
            );
            assert_eq!(
                locator.column_for_offset(at),
                naive_column(source, offset),
                "column of {offset} in {source:?}"
            );
        }
    }
}

#[test]
fn test_char_offsets_match_char_count() {
    for source in CORPUS {
        let locator = Locator::new(*source, "f.pp");
        for offset in boundaries(source) {
            assert_eq!(
                locator.char_offset(TextSize::new(offset as u32)),
                source[..offset].chars().count(),
                "char offset of {offset} in {source:?}"
            );
        }
    }
}

#[test]
fn test_long_source_line_starts() {
    let source = LONG_SOURCE.as_str();
    let locator = Locator::new(source, "long.pp");
    assert_eq!(locator.line_index().len(), 501);
    let mut line_start = 0;
    for (i, line) in source.split_inclusive('\n').enumerate() {
        let at = TextSize::new(line_start as u32);
        assert_eq!(locator.line_for_offset(at), i + 1);
        assert_eq!(locator.column_for_offset(at), 1);
        let last = TextSize::new((line_start + line.len() - 1) as u32);
        assert_eq!(locator.column_for_offset(last), line.chars().count());
        line_start += line.len();
    }
}

#[test]
fn test_queries_in_any_order_agree() {
    let source = CORPUS[7];
    let locator = Locator::new(source, "f.pp");
    let forward: Vec<_> = boundaries(source)
        .map(|o| locator.line_for_offset(TextSize::new(o as u32)))
        .collect();
    let mut backward: Vec<_> = boundaries(source)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|o| locator.line_for_offset(TextSize::new(o as u32)))
        .collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[rstest]
#[case(0, 3, 3, 20)]
#[case(1, 3, 4, 21)]
#[case(3, 4, 3, 25)]
#[case(4, 4, 4, 26)]
fn test_sub_locator_shifts_into_document(
    #[case] inner: u32,
    #[case] line: usize,
    #[case] column: usize,
    #[case] char_offset: usize,
) {
    // Body "ab\ncd" of a here-doc preceded by two lines, 20 chars and a two-blank margin
    let sub = SubLocator::new("ab\ncd", "f.pp", 2, 20, 2);
    let at = TextSize::new(inner);
    assert_eq!(sub.line_for_offset(at), line);
    assert_eq!(sub.column_for_offset(at), column);
    assert_eq!(sub.char_offset(at), char_offset);
}

#[test]
fn test_position_display() {
    let locator = Locator::new("a\n  b", "site.pp");
    let range = TextRange::new(TextSize::new(4), TextSize::new(5));
    assert_eq!(locator.position(range).to_string(), "site.pp:2:3");
}
