//! Codec tests: round trips, null asymmetry, widening and engine storage forms.

use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

use super::*;

fn codec() -> ValueCodec {
    ValueCodec::default()
}

fn with_guid(storage: GuidStorage) -> ValueCodec {
    ValueCodec::new(CodecOptions {
        guid_storage: storage,
        ..CodecOptions::default()
    })
}

fn round_trip(codec: &ValueCodec, value: Value, declared: SemanticType) {
    let (raw, stored) = codec.to_database(&value, &declared, false).unwrap();
    assert_eq!(raw.stored_type(), stored, "stored type for {declared}");
    assert_eq!(codec.from_database(&raw, &declared).unwrap(), value, "{declared}");
}

#[test]
fn test_round_trips() {
    let codec = codec();
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let cases = vec![
        (Value::Bool(true), SemanticType::Bool),
        (Value::U8(255), SemanticType::U8),
        (Value::I16(i16::MIN), SemanticType::I16),
        (Value::I32(-7), SemanticType::I32),
        (Value::I64(i64::MAX), SemanticType::I64),
        (Value::F32(1.5), SemanticType::F32),
        (Value::F64(-0.25), SemanticType::F64),
        (Value::Decimal(Decimal::new(12345, 3)), SemanticType::Decimal),
        (Value::Enum(3), SemanticType::Enum("Status".into())),
        (Value::Date(day), SemanticType::Date),
        (Value::Time(NaiveTime::from_hms_opt(23, 59, 1).unwrap()), SemanticType::Time),
        (Value::DateTime(day.and_hms_opt(1, 2, 3).unwrap()), SemanticType::DateTime),
        (Value::Color(Color::argb(0x80, 1, 2, 3)), SemanticType::Color),
        (
            Value::TypeDescriptor("acme::orders::Invoice".into()),
            SemanticType::TypeDescriptor,
        ),
        (Value::String("héllo".into()), SemanticType::String),
        (Value::String(String::new()), SemanticType::String),
        (Value::Bytes(vec![0, 1, 255]), SemanticType::Bytes),
        (Value::Svg(SvgImage::new("<svg/>")), SemanticType::SvgImage),
        (
            Value::Bits(BitArray::from_bytes(vec![0b1010_0101, 0xff])),
            SemanticType::BitArray,
        ),
        (
            Value::Bits(BitArray::from_bools(&[true, false, true, false, false, false, false, false, true])),
            SemanticType::BitArray,
        ),
    ];
    for (value, declared) in cases {
        round_trip(&codec, value, declared);
    }
}

#[test]
fn test_zero_values_stay_values() {
    let codec = codec();
    round_trip(&codec, Value::I32(0), SemanticType::I32);
    round_trip(&codec, Value::Bool(false), SemanticType::Bool);
    round_trip(&codec, Value::Enum(0), SemanticType::Enum("Status".into()));
}

#[test]
fn test_null_coalesces_value_types() {
    let codec = codec();
    let status = SemanticType::Enum("Status".into());

    let cases = vec![
        (status.clone(), DbValue::I32(0)),
        (SemanticType::I32, DbValue::I32(0)),
        (SemanticType::I64, DbValue::I64(0)),
        (SemanticType::F64, DbValue::F64(0.0)),
        (SemanticType::Decimal, DbValue::Decimal(Decimal::ZERO)),
        (SemanticType::Bool, DbValue::Bool(false)),
        (SemanticType::String, DbValue::Text(String::new())),
        (SemanticType::Guid, DbValue::Null),
        (SemanticType::Bytes, DbValue::Null),
        (SemanticType::Date, DbValue::Null),
        (SemanticType::Object("Settings".into()), DbValue::Null),
    ];
    for (declared, expected) in cases {
        let (raw, _) = codec.to_database(&Value::Null, &declared, false).unwrap();
        assert_eq!(raw, expected, "null in as {declared}");
    }
}

#[test]
fn test_null_out_is_asymmetric() {
    let codec = codec();
    let read = |target: SemanticType| codec.from_database(&DbValue::Null, &target).unwrap();

    assert_eq!(read(SemanticType::Guid), Value::Guid(Uuid::nil()));
    assert_eq!(read(SemanticType::Enum("Status".into())), Value::Enum(0));
    assert_eq!(read(SemanticType::I16), Value::I16(0));
    assert_eq!(read(SemanticType::Bool), Value::Bool(false));
    assert_eq!(read(SemanticType::String), Value::String(String::new()));
    assert_eq!(read(SemanticType::Image), Value::Null);
    assert_eq!(read(SemanticType::LinkCollection), Value::Null);
}

#[test]
fn test_nil_guid_is_stored_as_null() {
    for storage in [GuidStorage::Native, GuidStorage::Text, GuidStorage::MixedEndianBytes] {
        let (raw, _) = with_guid(storage)
            .to_database(&Value::Guid(Uuid::nil()), &SemanticType::Guid, false)
            .unwrap();
        assert_eq!(raw, DbValue::Null);
    }
}

#[test]
fn test_guid_storage_forms() {
    let id = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
    let guid = Value::Guid(id);

    let (raw, stored) = with_guid(GuidStorage::Native)
        .to_database(&guid, &SemanticType::Guid, false)
        .unwrap();
    assert_eq!((raw, stored), (DbValue::Uuid(id), StoredType::Uuid));

    let (raw, stored) = with_guid(GuidStorage::Text)
        .to_database(&guid, &SemanticType::Guid, false)
        .unwrap();
    assert_eq!(
        (raw, stored),
        (
            DbValue::Text("00112233-4455-6677-8899-aabbccddeeff".into()),
            StoredType::Text
        )
    );

    let (raw, _) = with_guid(GuidStorage::Bytes)
        .to_database(&guid, &SemanticType::Guid, false)
        .unwrap();
    assert_eq!(raw, DbValue::Bytes(id.as_bytes().to_vec()));
}

#[test]
fn test_mixed_endian_guid_round_trip() {
    let codec = with_guid(GuidStorage::MixedEndianBytes);
    let id = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();

    let (raw, stored) = codec.to_database(&Value::Guid(id), &SemanticType::Guid, false).unwrap();
    assert_eq!(stored, StoredType::Bytes);
    assert_eq!(
        raw,
        DbValue::Bytes(vec![
            0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ])
    );
    assert_eq!(codec.from_database(&raw, &SemanticType::Guid).unwrap(), Value::Guid(id));
}

#[test]
fn test_guid_reads_any_stored_form() {
    let codec = codec();
    let id = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
    let from_text = codec
        .from_database(&DbValue::Text(id.to_string()), &SemanticType::Guid)
        .unwrap();
    let from_bytes = codec
        .from_database(&DbValue::Bytes(id.as_bytes().to_vec()), &SemanticType::Guid)
        .unwrap();
    assert_eq!(from_text, Value::Guid(id));
    assert_eq!(from_bytes, Value::Guid(id));
    assert!(codec
        .from_database(&DbValue::Bytes(vec![1, 2, 3]), &SemanticType::Guid)
        .is_err());
}

#[test]
fn test_numeric_widening_on_read() {
    let codec = codec();
    assert_eq!(
        codec.from_database(&DbValue::I64(42), &SemanticType::I32).unwrap(),
        Value::I32(42)
    );
    assert_eq!(
        codec.from_database(&DbValue::Decimal(Decimal::new(70, 1)), &SemanticType::I16).unwrap(),
        Value::I16(7)
    );
    assert_eq!(
        codec.from_database(&DbValue::I32(3), &SemanticType::F64).unwrap(),
        Value::F64(3.0)
    );
    assert_eq!(
        codec.from_database(&DbValue::Text("12".into()), &SemanticType::Enum("Status".into())).unwrap(),
        Value::Enum(12)
    );
    assert_eq!(
        codec.from_database(&DbValue::I64(1), &SemanticType::Bool).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        codec.from_database(&DbValue::Text("f".into()), &SemanticType::Bool).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_out_of_range_reports_context() {
    let codec = codec();
    let err = codec
        .from_database(&DbValue::I64(70_000), &SemanticType::I16)
        .unwrap_err();
    match err {
        DialectError::ValueTranslation {
            direction,
            declared,
            stored,
            reason,
        } => {
            assert_eq!(direction, Direction::FromDatabase);
            assert_eq!(declared, SemanticType::I16);
            assert_eq!(stored, StoredType::I64);
            assert_eq!(reason, "70000 is out of range for i16");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = codec
        .to_database(&Value::F64(2.5), &SemanticType::I32, false)
        .unwrap_err();
    assert!(matches!(
        err,
        DialectError::ValueTranslation {
            direction: Direction::ToDatabase,
            stored: StoredType::I32,
            ..
        }
    ));
}

#[test]
fn test_rules_follow_declared_type() {
    let codec = codec();
    assert!(codec
        .to_database(&Value::String("x".into()), &SemanticType::I32, false)
        .is_err());
    assert!(codec
        .to_database(&Value::I32(1), &SemanticType::String, false)
        .is_err());
    let (raw, _) = codec
        .to_database(&Value::I32(5), &SemanticType::I64, false)
        .unwrap();
    assert_eq!(raw, DbValue::I64(5));
}

#[test]
fn test_temporal_reads_from_text_and_timestamps() {
    let codec = codec();
    let moment = NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(7, 8, 9)
        .unwrap();
    assert_eq!(
        codec.from_database(&DbValue::Text("2024-05-06 07:08:09".into()), &SemanticType::DateTime).unwrap(),
        Value::DateTime(moment)
    );
    assert_eq!(
        codec.from_database(&DbValue::DateTime(moment), &SemanticType::Date).unwrap(),
        Value::Date(moment.date())
    );
    assert_eq!(
        codec.from_database(&DbValue::Text("07:08:09".into()), &SemanticType::Time).unwrap(),
        Value::Time(moment.time())
    );
}

#[test]
fn test_color_accepts_unsigned_packing() {
    let codec = codec();
    let red = Color::rgb(255, 0, 0);
    assert_eq!(
        codec.from_database(&DbValue::I64(0xFFFF_0000), &SemanticType::Color).unwrap(),
        Value::Color(red)
    );
}

#[test]
fn test_image_stored_as_png() {
    let codec = codec();
    let bitmap = Bitmap::new(1, 2, vec![10, 20, 30, 255, 40, 50, 60, 128]).unwrap();
    let (raw, stored) = codec
        .to_database(&Value::Image(bitmap.clone()), &SemanticType::Image, false)
        .unwrap();
    assert_eq!(stored, StoredType::Bytes);
    match &raw {
        DbValue::Bytes(bytes) => assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n"),
        other => panic!("expected bytes, got {other:?}"),
    }
    assert_eq!(codec.from_database(&raw, &SemanticType::Image).unwrap(), Value::Image(bitmap));
}

#[test]
fn test_corrupt_image_is_wrapped() {
    let err = codec()
        .from_database(&DbValue::Bytes(vec![1, 2, 3]), &SemanticType::Image)
        .unwrap_err();
    match err {
        DialectError::ValueTranslation { reason, .. } => {
            assert!(reason.starts_with("PNG decoding failed"), "{reason}")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_link_collection_as_text() {
    let codec = codec();
    let mut links = LinkCollection::new();
    links.push(Some("Home"), "https://example.com");
    let (raw, _) = codec
        .to_database(&Value::Links(links.clone()), &SemanticType::LinkCollection, false)
        .unwrap();
    assert_eq!(raw, DbValue::Text("Home\thttps://example.com".into()));
    assert_eq!(
        codec.from_database(&raw, &SemanticType::LinkCollection).unwrap(),
        Value::Links(links.clone())
    );
    let raw_bytes = DbValue::Bytes(b"Home\thttps://example.com".to_vec());
    assert_eq!(
        codec.from_database(&raw_bytes, &SemanticType::LinkCollection).unwrap(),
        Value::Links(links)
    );

    for (title, url) in [(Some("A\tB"), "https://x"), (Some("A\nB"), "https://x"), (None, "https://x\ny")] {
        let mut bad = LinkCollection::new();
        bad.push(title, url);
        match codec.to_database(&Value::Links(bad), &SemanticType::LinkCollection, false) {
            Err(DialectError::ValueTranslation { direction, reason, .. }) => {
                assert_eq!(direction, Direction::ToDatabase);
                assert!(reason.starts_with("invalid link on line 1"), "{reason}");
            }
            other => panic!("expected a rejected link, got {other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Settings {
    theme: String,
    retries: u32,
}

#[test]
fn test_object_json_fallback() {
    let codec = codec();
    let declared = SemanticType::Object("Settings".into());
    let settings = Settings {
        theme: "dark".into(),
        retries: 3,
    };
    let value = Value::object(&settings).unwrap();

    let (plain, _) = codec.to_database(&value, &declared, false).unwrap();
    assert_eq!(plain, DbValue::Bytes(br#"{"retries":3,"theme":"dark"}"#.to_vec()));

    let (packed, _) = codec.to_database(&value, &declared, true).unwrap();
    match &packed {
        DbValue::Bytes(bytes) => assert_eq!(&bytes[..2], &GZIP_MAGIC),
        other => panic!("expected bytes, got {other:?}"),
    }

    for raw in [plain, packed] {
        let back = codec.from_database(&raw, &declared).unwrap();
        assert_eq!(back.into_object::<Settings>().unwrap().unwrap(), settings);
    }

    let from_text = codec
        .from_database(&DbValue::Text(r#"{"theme":"light","retries":0}"#.into()), &declared)
        .unwrap();
    assert_eq!(
        from_text.into_object::<Settings>().unwrap().unwrap().theme,
        "light"
    );
}

#[test]
fn test_fixed_width_text() {
    let codec = ValueCodec::new(CodecOptions {
        text_policy: TextPolicy::FixedWidth(5),
        ..CodecOptions::default()
    });
    assert!(codec
        .to_database(&Value::String("abcde".into()), &SemanticType::String, false)
        .is_ok());
    assert!(codec
        .to_database(&Value::String("abcdef".into()), &SemanticType::String, false)
        .is_err());
    assert_eq!(
        codec.from_database(&DbValue::Text("ab   ".into()), &SemanticType::String).unwrap(),
        Value::String("ab".into())
    );
    assert_eq!(
        ValueCodec::default()
            .from_database(&DbValue::Text("ab   ".into()), &SemanticType::String)
            .unwrap(),
        Value::String("ab   ".into())
    );

    // CHAR semantics: caller-written trailing blanks read back like padding.
    let (raw, _) = codec
        .to_database(&Value::String("ab ".into()), &SemanticType::String, false)
        .unwrap();
    assert_eq!(raw, DbValue::Text("ab ".into()));
    assert_eq!(
        codec.from_database(&raw, &SemanticType::String).unwrap(),
        Value::String("ab".into())
    );
}

#[test]
fn test_stored_type_mapping() {
    let codec = with_guid(GuidStorage::Text);
    assert_eq!(codec.stored_type(&SemanticType::Enum("E".into())), StoredType::I32);
    assert_eq!(codec.stored_type(&SemanticType::Color), StoredType::I32);
    assert_eq!(codec.stored_type(&SemanticType::Guid), StoredType::Text);
    assert_eq!(codec.stored_type(&SemanticType::Object("O".into())), StoredType::Bytes);
    assert_eq!(codec.stored_type(&SemanticType::LinkCollection), StoredType::Text);
}
