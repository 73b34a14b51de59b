//! Tests for field-level list and map encoding.

use std::collections::BTreeMap;

use crate::codec::*;

fn map(entries: &[(&str, &[u32])]) -> BTreeMap<String, Vec<u32>> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_vec()))
        .collect()
}

#[test]
fn enquiries_map_encodes_in_documented_form() {
    let enquiries = map(&[("Camp A", &[1, 2]), ("Camp B", &[3])]);

    let encoded = encode_map(&enquiries).unwrap();

    assert_eq!(encoded, "Camp A=1|2*Camp B=3");
    assert_eq!(decode_map(&encoded).unwrap(), enquiries);
}

#[test]
fn empty_map_encodes_to_sentinel() {
    assert_eq!(encode_map(&BTreeMap::new()).unwrap(), "#NULL!");
    assert!(decode_map("#NULL!").unwrap().is_empty());
}

#[test]
fn map_key_with_empty_list_survives() {
    let original = map(&[("Camp A", &[]), ("Camp B", &[4])]);

    let encoded = encode_map(&original).unwrap();

    assert_eq!(encoded, "Camp A=*Camp B=4");
    assert_eq!(decode_map(&encoded).unwrap(), original);
}

#[test]
fn map_roundtrips_various_shapes() {
    let shapes = vec![
        map(&[("Solo", &[42])]),
        map(&[("A", &[1, 2, 3]), ("B", &[0]), ("C", &[7, 7])]),
        map(&[("Spaces are fine", &[10, 20])]),
    ];

    for original in shapes {
        let encoded = encode_map(&original).unwrap();
        assert_eq!(decode_map(&encoded).unwrap(), original, "via {}", encoded);
    }
}

#[test]
fn map_entry_without_separator_is_rejected() {
    let err = decode_map("Camp A=1*Camp B").unwrap_err();
    assert_eq!(err, FieldError::MalformedMapEntry("Camp B".to_string()));
}

#[test]
fn map_with_non_integer_value_is_rejected() {
    let err = decode_map("Camp A=1|x").unwrap_err();
    assert_eq!(err, FieldError::InvalidInteger("x".to_string()));
}

#[test]
fn map_key_with_reserved_character_is_rejected() {
    let err = encode_map(&map(&[("A=B", &[1])])).unwrap_err();
    assert_eq!(
        err,
        ValueError::Delimiter {
            value: "A=B".to_string(),
            delimiter: '='
        }
    );
}

#[test]
fn list_roundtrips() {
    let lists: Vec<Vec<String>> = vec![
        vec![],
        vec!["Orientation".to_string()],
        vec!["Camp A".to_string(), "Camp B".to_string(), "Camp C".to_string()],
        vec!["".to_string()],
        vec!["has=equals".to_string(), "has*star".to_string()],
    ];

    for list in lists {
        let encoded = encode_list(&list).unwrap();
        assert_eq!(decode_list(&encoded), list, "via {:?}", encoded);
    }
}

#[test]
fn empty_list_encodes_to_sentinel() {
    let empty: Vec<String> = vec![];
    assert_eq!(encode_list(&empty).unwrap(), "#NULL!");
    assert!(decode_list("#NULL!").is_empty());
}

#[test]
fn list_item_with_pipe_is_rejected() {
    let err = encode_list(&["a|b"]).unwrap_err();
    assert!(matches!(err, ValueError::Delimiter { delimiter: '|', .. }));
}

#[test]
fn sentinel_is_not_a_legal_list_item() {
    assert_eq!(encode_list(&["#NULL!"]).unwrap_err(), ValueError::Sentinel);
}

#[test]
fn id_list_roundtrips() {
    assert_eq!(encode_id_list(&[]), "#NULL!");
    assert_eq!(encode_id_list(&[5]), "5");
    assert_eq!(encode_id_list(&[1, 2, 3]), "1|2|3");
    assert_eq!(decode_id_list("1|2|3").unwrap(), vec![1, 2, 3]);
    assert!(decode_id_list("#NULL!").unwrap().is_empty());
}

#[test]
fn negative_integer_is_rejected() {
    assert_eq!(
        decode_uint("-1").unwrap_err(),
        FieldError::InvalidInteger("-1".to_string())
    );
}

#[test]
fn optional_uses_sentinel_for_absent_values() {
    assert_eq!(encode_optional(None).unwrap(), "#NULL!");
    assert_eq!(encode_optional(Some("Yes")).unwrap(), "Yes");
    assert_eq!(decode_optional("#NULL!"), None);
    assert_eq!(decode_optional("Yes"), Some("Yes".to_string()));
}

#[test]
fn optional_value_with_comma_is_rejected() {
    assert!(encode_optional(Some("yes, we do")).is_err());
}

#[test]
fn email_splits_id_and_domain() {
    assert_eq!(
        decode_email("YCHERN@e.ntu.edu.sg").unwrap(),
        ("YCHERN".to_string(), "e.ntu.edu.sg".to_string())
    );
    assert!(decode_email("no-at-sign").is_err());
    assert!(decode_email("@e.ntu.edu.sg").is_err());
}

#[test]
fn dates_and_booleans_parse_strictly() {
    let date = decode_date("2024-11-30").unwrap();
    assert_eq!(encode_date(date), "2024-11-30");
    assert!(decode_date("30/11/2024").is_err());

    assert!(decode_bool("true").unwrap());
    assert!(!decode_bool("false").unwrap());
    assert!(decode_bool("TRUE").is_err());
}
