use super::*;
use proptest::prelude::*;

fn units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

#[test]
fn test_detect_by_prefix() {
    assert_eq!(detect(&[0xFF, 0xFE, 0x41, 0x00]), EncodingTag::Utf16Le);
    assert_eq!(detect(&[0xFE, 0xFF, 0x00, 0x41]), EncodingTag::Utf16Be);
    assert_eq!(detect(&[0xEF, 0xBB, 0xBF, b'a']), EncodingTag::Utf8Bom);
    assert_eq!(detect(b"plain"), EncodingTag::Utf8);
    assert_eq!(detect(&[]), EncodingTag::Utf8);
    // a lone 0xFF is not a BOM
    assert_eq!(detect(&[0xFF]), EncodingTag::Utf8);
    // truncated UTF-8 BOM
    assert_eq!(detect(&[0xEF, 0xBB]), EncodingTag::Utf8);
}

#[test]
fn test_decode_utf16le_skips_bom() {
    let bytes = [0xFF, 0xFE, b'H', 0x00, b'i', 0x00, 0x3D, 0xD8, 0x00, 0xDE];
    let decoded = decode(&bytes).unwrap();

    assert_eq!(decoded.encoding, EncodingTag::Utf16Le);
    assert_eq!(decoded.text.as_units(), &[0x48, 0x69, 0xD83D, 0xDE00]);
    assert_eq!(decoded.text.to_string(), "Hi\u{1F600}");
}

#[test]
fn test_decode_utf16le_passes_malformed_units_through() {
    let bytes = [0xFF, 0xFE, 0x00, 0xDC, b'x', 0x00];
    let decoded = decode(&bytes).unwrap();

    assert_eq!(decoded.text.as_units(), &[0xDC00, 0x78]);
}

#[test]
fn test_decode_utf16le_odd_trailing_byte() {
    let decoded = decode(&[0xFF, 0xFE, b'a', 0x00, b'b']).unwrap();
    assert_eq!(decoded.text.to_string(), "ab");

    let decoded = decode(&[0xFF, 0xFE, b'a', 0x00, 0x00]).unwrap();
    assert_eq!(decoded.text.to_string(), "a");
}

#[test]
fn test_decode_utf16le_bom_only_is_empty() {
    let decoded = decode(&UTF16_LE_BOM).unwrap();
    assert_eq!(decoded.encoding, EncodingTag::Utf16Le);
    assert!(decoded.text.is_empty());
}

#[test]
fn test_decode_utf16be_is_unsupported() {
    assert_eq!(
        decode(&[0xFE, 0xFF, 0x00, 0x41]),
        Err(CodecError::UnsupportedEncoding)
    );
    assert_eq!(decode(&UTF16_BE_BOM), Err(CodecError::UnsupportedEncoding));
}

#[test]
fn test_decode_utf8_bom_is_stripped() {
    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice("caf\u{e9}".as_bytes());
    let decoded = decode(&bytes).unwrap();

    assert_eq!(decoded.encoding, EncodingTag::Utf8Bom);
    assert_eq!(decoded.text.to_string(), "caf\u{e9}");
    assert_eq!(decoded.text.len(), 4);
}

#[test]
fn test_decode_utf8_expands_four_byte_sequences() {
    let decoded = decode("a\u{10348}b".as_bytes()).unwrap();

    assert_eq!(decoded.encoding, EncodingTag::Utf8);
    assert_eq!(decoded.text.as_units(), units("a\u{10348}b").as_slice());
    assert_eq!(decoded.text.len(), 4);
}

#[test]
fn test_decode_ascii_is_utf8() {
    let decoded = decode(b"Hello World\r\n").unwrap();

    assert_eq!(decoded.encoding, EncodingTag::Utf8);
    assert_eq!(decoded.text.to_string(), "Hello World\r\n");
}

#[test]
fn test_decode_empty_input() {
    let decoded = decode(&[]).unwrap();

    assert_eq!(decoded.encoding, EncodingTag::Utf8);
    assert!(decoded.text.is_empty());
}

#[test]
fn test_decode_invalid_utf8_fails() {
    // Latin-1 "caf\xe9" is not valid UTF-8, there is no code page fallback
    assert_eq!(
        decode(b"caf\xe9"),
        Err(CodecError::InvalidEncoding { valid_up_to: 3 })
    );
    assert_eq!(
        decode(&[0xEF, 0xBB, 0xBF, b'o', b'k', 0x80]),
        Err(CodecError::InvalidEncoding { valid_up_to: 2 })
    );
    assert!(matches!(
        decode(&[0xC3]),
        Err(CodecError::InvalidEncoding { .. })
    ));
}

#[test]
fn test_decode_utf8_stops_at_nul() {
    let decoded = decode(b"abc\0\xff\xfe").unwrap();
    assert_eq!(decoded.text.to_string(), "abc");
}

#[test]
fn test_encode_utf16le() {
    let text = TextBuffer::from_str("Hi\u{1F600}");
    let bytes = encode(&text, EncodingTag::Utf16Le).unwrap();

    assert_eq!(
        bytes,
        vec![0xFF, 0xFE, b'H', 0x00, b'i', 0x00, 0x3D, 0xD8, 0x00, 0xDE]
    );
}

#[test]
fn test_encode_utf8_with_and_without_bom() {
    let text = TextBuffer::from_str("caf\u{e9}");

    assert_eq!(
        encode(&text, EncodingTag::Utf8Bom).unwrap(),
        vec![0xEF, 0xBB, 0xBF, b'c', b'a', b'f', 0xC3, 0xA9]
    );
    assert_eq!(
        encode(&text, EncodingTag::Utf8).unwrap(),
        "caf\u{e9}".as_bytes()
    );
}

#[test]
fn test_encode_other_tags_fall_back_to_utf8() {
    let text = TextBuffer::from_str("abc");

    for tag in [
        EncodingTag::Unspecified,
        EncodingTag::Ansi,
        EncodingTag::Utf16Be,
    ] {
        assert_eq!(encode(&text, tag).unwrap(), b"abc");
    }
}

#[test]
fn test_encode_utf8_can_grow_past_utf16_size() {
    // three UTF-8 bytes per single code unit
    let text = TextBuffer::from_str("\u{20AC}\u{20AC}");
    let bytes = encode(&text, EncodingTag::Utf8).unwrap();

    assert_eq!(bytes.len(), 6);
    assert!(bytes.len() > text.len() * 2);
}

#[test]
fn test_encode_empty_text() {
    let text = TextBuffer::new();

    assert_eq!(encode(&text, EncodingTag::Utf16Le).unwrap(), vec![0xFF, 0xFE]);
    assert_eq!(encode(&text, EncodingTag::Utf8Bom).unwrap(), UTF8_BOM.to_vec());
    assert!(encode(&text, EncodingTag::Utf8).unwrap().is_empty());
}

#[test]
fn test_unpaired_surrogate_encoding() {
    let lone = [0x61, 0xD800, 0x62];

    assert_eq!(
        encode_units(&lone, EncodingTag::Utf8).unwrap(),
        "a\u{FFFD}b".as_bytes()
    );
    assert_eq!(
        encode_units(&lone, EncodingTag::Utf16Le).unwrap(),
        vec![0xFF, 0xFE, 0x61, 0x00, 0x00, 0xD8, 0x62, 0x00]
    );
}

#[test]
fn test_utf8_len() {
    assert_eq!(utf8_len(&units("")), 0);
    assert_eq!(utf8_len(&units("abc")), 3);
    assert_eq!(utf8_len(&units("\u{e9}\u{20AC}\u{1F600}")), 2 + 3 + 4);
    assert_eq!(utf8_len(&[0xDC00]), 3);
}

#[test]
fn test_tag_ids_labels_and_save_choices() {
    for id in -1..=4 {
        let tag = EncodingTag::from_id(id).unwrap();
        assert_eq!(tag.id(), id);
        assert_eq!(tag.label().parse::<EncodingTag>().unwrap(), tag);
    }
    assert_eq!(EncodingTag::from_id(5), None);

    for (index, tag) in EncodingTag::SAVE_CHOICES.iter().enumerate() {
        assert_eq!(tag.id(), index as i32 + 1);
        assert_eq!(tag.save_choice_index(), Some(index));
        assert!(tag.is_saveable());
    }
    assert_eq!(EncodingTag::Ansi.save_choice_index(), None);
    assert!(!EncodingTag::Utf16Be.is_saveable());
    assert_eq!(EncodingTag::default(), EncodingTag::Unspecified);
}

#[test]
fn test_tag_parse_aliases() {
    assert_eq!("UTF-8".parse::<EncodingTag>(), Ok(EncodingTag::Utf8));
    assert_eq!("utf-8-bom".parse::<EncodingTag>(), Ok(EncodingTag::Utf8Bom));
    assert_eq!("UTF-16 LE".parse::<EncodingTag>(), Ok(EncodingTag::Utf16Le));
    assert_eq!("utf16".parse::<EncodingTag>(), Ok(EncodingTag::Utf16Le));
    assert!("latin1".parse::<EncodingTag>().is_err());
    // numeric ids of the save dialog
    assert_eq!("3".parse::<EncodingTag>(), Ok(EncodingTag::Utf16Le));
    assert_eq!("-1".parse::<EncodingTag>(), Ok(EncodingTag::Unspecified));
    assert!("7".parse::<EncodingTag>().is_err());
}

#[test]
fn test_tag_serde_uses_labels() {
    let json = serde_json::to_string(&EncodingTag::Utf8Bom).unwrap();
    assert_eq!(json, "\"utf8-bom\"");

    let tag: EncodingTag = serde_json::from_str("\"utf16le\"").unwrap();
    assert_eq!(tag, EncodingTag::Utf16Le);
}

#[test]
fn test_bom_matches_encoded_header() {
    let text = TextBuffer::from_str("x");
    for tag in [EncodingTag::Utf8, EncodingTag::Utf8Bom, EncodingTag::Utf16Le] {
        let bytes = encode(&text, tag).unwrap();
        assert!(bytes.starts_with(tag.bom()));
    }
}

fn nul_free_text() -> impl Strategy<Value = String> {
    any::<String>().prop_map(|s| s.replace('\0', ""))
}

proptest! {
    #[test]
    fn prop_round_trip(text in nul_free_text()) {
        // a leading U+FEFF saved without BOM reads back as a BOM
        prop_assume!(!text.starts_with('\u{FEFF}'));
        let buffer = TextBuffer::from_str(&text);
        for tag in EncodingTag::SAVE_CHOICES {
            let bytes = encode(&buffer, tag).unwrap();
            let decoded = decode(&bytes).unwrap();
            prop_assert_eq!(&decoded.text, &buffer);
            prop_assert_eq!(decoded.encoding, tag);
        }
    }

    #[test]
    fn prop_utf16le_reinterprets_remaining_bytes(
        payload in proptest::collection::vec(1u16..=u16::MAX, 0..64)
    ) {
        let mut bytes = UTF16_LE_BOM.to_vec();
        for unit in &payload {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode(&bytes).unwrap();
        prop_assert_eq!(decoded.encoding, EncodingTag::Utf16Le);
        prop_assert_eq!(decoded.text.as_units(), payload.as_slice());
    }

    #[test]
    fn prop_utf16be_always_fails(rest in proptest::collection::vec(any::<u8>(), 0..32)) {
        let mut bytes = UTF16_BE_BOM.to_vec();
        bytes.extend(rest);
        prop_assert_eq!(decode(&bytes), Err(CodecError::UnsupportedEncoding));
    }

    #[test]
    fn prop_plain_utf8_decodes_as_utf8(text in nul_free_text()) {
        prop_assume!(!text.starts_with('\u{FEFF}'));
        let decoded = decode(text.as_bytes()).unwrap();
        prop_assert_eq!(decoded.encoding, EncodingTag::Utf8);
        prop_assert_eq!(decoded.text.to_string(), text);
    }
}
