//! Wide-row composite decoding.

use bytes::Bytes;
use cql_entity_mapper::domain::codec::{
    ColumnScalar, Composite, CompositeKeyCodec, DecodeError, KeyValue, RawColumn, WideMapMeta,
    NO_TTL,
};
use cql_entity_mapper::domain::model::{tweet_index_property, user_tag_property};
use cql_entity_mapper::{MetadataError, PropertyKind, PropertyMeta};

fn column(name: Composite, value: impl ColumnScalar, ttl: u32) -> RawColumn {
    RawColumn::from_composite(&name, value.to_column_bytes(), ttl).unwrap()
}

#[test]
fn compound_key_round_trip() {
    let meta = WideMapMeta::<(i32, String), i64>::tuple_key(PropertyMeta::wide_map(
        "scores",
        ["k1", "k2"],
    ))
    .unwrap();
    let codec = CompositeKeyCodec::new();
    let raw = column(
        Composite::new().with_scalar(&5i32).with_scalar(&"x".to_string()),
        42i64,
        300,
    );

    let kv = codec.decode_key_value(&meta, &raw).unwrap();
    assert_eq!(
        kv,
        KeyValue {
            key: (5, "x".to_string()),
            value: 42,
            ttl: 300
        }
    );

    // separate accessors agree with the composed one
    assert_eq!(codec.key_transformer(&meta)(&raw).unwrap(), kv.key);
    assert_eq!(codec.value_transformer(&meta)(&raw).unwrap(), kv.value);
    assert_eq!(codec.ttl_transformer()(&raw), kv.ttl);
    assert_eq!(codec.decode_raw(&raw), 42i64.to_column_bytes());
}

#[test]
fn compound_key_follows_declared_component_order() {
    let meta = WideMapMeta::<(String, i64), String>::tuple_key(tweet_index_property()).unwrap();
    let codec = CompositeKeyCodec::new();
    let raw = column(
        Composite::new()
            .with_scalar(&"2024-03-01".to_string())
            .with_scalar(&7i64),
        "hello".to_string(),
        NO_TTL,
    );

    let kv = codec.decode_key_value(&meta, &raw).unwrap();
    assert_eq!(kv.key, ("2024-03-01".to_string(), 7));
    assert_eq!(kv.value, "hello");
    assert_eq!(kv.ttl, NO_TTL);
}

#[test]
fn single_key_uses_first_component() {
    let meta = WideMapMeta::<String, i32>::single_key(user_tag_property()).unwrap();
    assert!(meta.is_single_key());

    let raw = column(Composite::new().with_scalar(&"rust".to_string()), 3i32, 60);
    let codec = CompositeKeyCodec::new();
    assert_eq!(codec.decode_key(&meta, &raw).unwrap(), "rust");
    assert_eq!(codec.decode_value(&meta, &raw).unwrap(), 3);
    assert_eq!(codec.decode_ttl(&raw), 60);
}

#[test]
fn key_decoding_must_match_the_declared_key_shape() {
    let err = WideMapMeta::<String, String>::single_key(tweet_index_property()).unwrap_err();
    assert_eq!(
        err,
        MetadataError::KeyShapeMismatch {
            property: "tweet_index".into(),
            components: 2,
            shape: "single"
        }
    );

    let err = WideMapMeta::<(String, i64), i32>::tuple_key(user_tag_property()).unwrap_err();
    assert!(matches!(
        err,
        MetadataError::KeyShapeMismatch { components: 1, shape: "compound", .. }
    ));
}

#[test]
fn only_wide_maps_can_be_decoded() {
    let err = WideMapMeta::<String, i64>::single_key(PropertyMeta::counter("likes")).unwrap_err();
    assert_eq!(
        err,
        MetadataError::NotWideMap {
            property: "likes".into(),
            kind: PropertyKind::Counter
        }
    );
    assert!(WideMapMeta::<String, i64>::single_key(PropertyMeta::id("id")).is_err());
}

#[test]
fn bad_value_bytes_surface_a_decode_error() {
    let meta = WideMapMeta::<String, i32>::single_key(user_tag_property()).unwrap();
    let codec = CompositeKeyCodec::new();
    let name = Composite::new().with_scalar(&"rust".to_string());
    let raw = RawColumn::from_composite(&name, Bytes::from_static(&[0, 1]), 0).unwrap();

    let expected = DecodeError::Width {
        type_name: "int",
        expected: 4,
        actual: 2,
    };
    assert_eq!(codec.decode_value(&meta, &raw).unwrap_err(), expected);
    assert_eq!(codec.decode_key_value(&meta, &raw).unwrap_err(), expected);
}

#[test]
fn malformed_names_and_component_counts_fail() {
    let meta = WideMapMeta::<(String, i64), String>::tuple_key(tweet_index_property()).unwrap();
    let codec = CompositeKeyCodec::new();

    let truncated = RawColumn::new(Bytes::from_static(&[0, 9, b'a']), Bytes::new(), 0);
    assert!(matches!(
        codec.decode_key(&meta, &truncated).unwrap_err(),
        DecodeError::Truncated { .. }
    ));

    let extra = column(
        Composite::new()
            .with_scalar(&"2024-03-01".to_string())
            .with_scalar(&7i64)
            .with_scalar(&1i32),
        "x".to_string(),
        0,
    );
    assert_eq!(
        codec.decode_key(&meta, &extra).unwrap_err(),
        DecodeError::ComponentCount {
            property: "tweet_index".into(),
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn transformers_map_lazily_and_restart_cleanly() {
    let meta = WideMapMeta::<String, i64>::single_key(user_tag_property()).unwrap();
    let codec = CompositeKeyCodec::new();
    let row: Vec<RawColumn> = [("a", 1i64, 10u32), ("b", 2, 0), ("c", 3, 30)]
        .into_iter()
        .map(|(k, v, ttl)| column(Composite::new().with_scalar(&k.to_string()), v, ttl))
        .collect();

    let keys = row
        .iter()
        .map(codec.key_transformer(&meta))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(keys, ["a", "b", "c"]);

    let ttls: Vec<u32> = row.iter().map(codec.ttl_transformer()).collect();
    assert_eq!(ttls, [10, 0, 30]);

    let raw: Vec<Bytes> = row.iter().map(codec.raw_transformer()).collect();
    assert_eq!(raw[1], 2i64.to_column_bytes());

    let transform = codec.key_value_transformer(&meta);
    let first: Vec<_> = row.iter().map(&transform).collect();
    let second: Vec<_> = row.iter().map(&transform).collect();
    assert_eq!(first, second);

    assert_eq!(codec.decode_row(&meta, &row).unwrap().len(), 3);
}

#[test]
fn decode_row_stops_at_the_first_bad_column() {
    let meta = WideMapMeta::<String, i64>::single_key(user_tag_property()).unwrap();
    let codec = CompositeKeyCodec::new();
    let good = column(Composite::new().with_scalar(&"ok".to_string()), 1i64, 0);
    let bad = RawColumn::from_composite(
        &Composite::new().with_scalar(&"bad".to_string()),
        Bytes::from_static(b"short"),
        0,
    )
    .unwrap();

    let err = codec.decode_row(&meta, &[good, bad]).unwrap_err();
    assert!(matches!(err, DecodeError::Width { type_name: "bigint", .. }));
}

#[test]
fn readers_share_metadata_across_threads() {
    let meta = WideMapMeta::<(String, i64), String>::tuple_key(tweet_index_property()).unwrap();
    let codec = CompositeKeyCodec::new();

    std::thread::scope(|scope| {
        for reader in 0..4i64 {
            let meta = &meta;
            scope.spawn(move || {
                let raw = column(
                    Composite::new()
                        .with_scalar(&format!("day-{}", reader))
                        .with_scalar(&reader),
                    format!("v{}", reader),
                    0,
                );
                let kv = codec.decode_key_value(&meta, &raw).unwrap();
                assert_eq!(kv.key, (format!("day-{}", reader), reader));
                assert_eq!(kv.value, format!("v{}", reader));
            });
        }
    });
}
