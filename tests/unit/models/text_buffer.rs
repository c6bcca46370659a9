use super::*;

#[test]
fn test_from_str_counts_code_units() {
    let buffer = TextBuffer::from_str("a\u{e9}\u{1F600}");

    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.as_units(), &[0x61, 0xE9, 0xD83D, 0xDE00]);
    assert_eq!(buffer.to_string(), "a\u{e9}\u{1F600}");
}

#[test]
fn test_constructors_stop_at_nul() {
    assert_eq!(TextBuffer::from_str("abc\0def").to_string(), "abc");
    assert_eq!(
        TextBuffer::from_units(vec![0x68, 0x69, 0, 0x7A]).as_units(),
        &[0x68, 0x69]
    );
    assert!(TextBuffer::from_units(vec![0, 1, 2]).is_empty());
}

#[test]
fn test_unpaired_surrogate_is_kept() {
    let buffer = TextBuffer::from_units(vec![0x41, 0xD800, 0x42]);

    assert_eq!(buffer.len(), 3);
    assert!(buffer.has_unpaired_surrogates());
    assert_eq!(buffer.to_string_lossy(), "A\u{FFFD}B");
    assert!(!TextBuffer::from_str("\u{1F600}").has_unpaired_surrogates());
}

#[test]
fn test_slice_is_clamped() {
    let buffer = TextBuffer::from_str("Hello World");

    assert_eq!(buffer.slice(6, 5), TextBuffer::from_str("World").as_units());
    assert_eq!(buffer.slice(9, 10), TextBuffer::from_str("ld").as_units());
    assert!(buffer.slice(42, 1).is_empty());
}

#[test]
fn test_clear_and_conversions() {
    let mut buffer: TextBuffer = String::from("note").into();
    assert_eq!(format!("{buffer:?}"), "TextBuffer(\"note\")");

    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer, TextBuffer::new());
}
