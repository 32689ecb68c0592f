//! Typed decoding from text: records, maps, enums, nulls and ranges.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use catjson::{
    from_str, json_enum, json_record, record_shape, to_string, ErrorKind, JsonError, JsonValue,
    Record, RecordBuilder, SyntaxReason,
};

#[derive(Debug, Default, PartialEq, Clone, Copy)]
enum Color {
    #[default]
    Red,
    Green,
    Blue = 7,
}

json_enum!(Color { Red, Green, Blue });

#[derive(Debug, Default, PartialEq)]
struct Item {
    id: u32,
    label: Option<String>,
    tags: Vec<String>,
}

json_record!(Item { id, label, tags });

#[derive(Debug, Default, PartialEq)]
struct Order {
    number: i64,
    color: Color,
    items: Vec<Item>,
    quantities: HashMap<i32, u16>,
    notes: BTreeMap<String, JsonValue>,
    initial: char,
    finished: u32,
}

fn mark_finished(order: &mut Order) {
    order.finished += 1;
}

json_record!(Order {
    number as "no",
    color,
    items,
    quantities,
    notes,
    initial,
} ; finish = mark_finished);

#[test]
fn decodes_nested_records() {
    let order: Order = from_str(
        r#"{
            "no": -5,
            "color": 7,
            "items": [{"id": 1, "label": "a", "tags": ["x"]}, {"id": 2, "label": null}],
            "quantities": {"1": 3, "-2": 4},
            "notes": {"free": [1, "two"]},
            "initial": "Z"
        }"#,
    )
    .unwrap();

    assert_eq!(order.number, -5);
    assert_eq!(order.color, Color::Blue);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].label.as_deref(), Some("a"));
    assert_eq!(order.items[1].label, None);
    assert_eq!(order.quantities.get(&-2), Some(&4));
    assert_eq!(order.notes["free"][1].as_str(), Some("two"));
    assert_eq!(order.initial, 'Z');
    assert_eq!(order.finished, 1);
}

#[test]
fn trailing_commas_are_syntax_errors() {
    for text in [r#"{"id": 1,}"#, r#"{"id": 1, "tags": ["a",]}"#] {
        let err = from_str::<Item>(text).unwrap_err();
        assert!(
            matches!(
                err,
                JsonError::Syntax {
                    reason: SyntaxReason::TrailingComma(_),
                    ..
                }
            ),
            "{text}: {err}"
        );
    }
}

#[test]
fn unknown_keys_are_skipped() {
    let item: Item = from_str(
        r#"{"zzz": {"deep": [1, {"x": null}]}, "id": 9, "other": "s", "more": [true, false]}"#,
    )
    .unwrap();
    assert_eq!(
        item,
        Item {
            id: 9,
            ..Default::default()
        }
    );
}

#[test]
fn unknown_keys_still_need_valid_syntax() {
    let err = from_str::<Item>(r#"{"zzz": [1,], "id": 9}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn integer_keyed_maps() {
    let map: HashMap<i32, String> = from_str(r#"{"1": "a", "2": "b"}"#).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&1], "a");
    assert_eq!(map[&2], "b");

    let err = from_str::<HashMap<u8, String>>(r#"{"256": "a"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MemberResolution);
}

#[test]
fn null_leaves_non_nullable_members_at_default() {
    let item: Item = from_str(r#"{"id": null, "tags": null, "label": null}"#).unwrap();
    assert_eq!(item, Item::default());
    assert_eq!(from_str::<Vec<Item>>("[null]").unwrap(), vec![Item::default()]);
    assert_eq!(from_str::<Item>("null").unwrap(), Item::default());
}

#[test]
fn numeric_range() {
    assert_eq!(from_str::<u8>("200").unwrap(), 200);
    let err = from_str::<u8>("300").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Overflow);
    assert_eq!(err.offset(), Some(0));
    assert_eq!(from_str::<i8>("-128").unwrap(), i8::MIN);
    assert_eq!(from_str::<i8>("-129").unwrap_err().kind(), ErrorKind::Overflow);
    assert_eq!(from_str::<u64>("18446744073709551615").unwrap(), u64::MAX);
    assert_eq!(from_str::<f32>("0.5").unwrap(), 0.5);
}

#[test]
fn float_range() {
    let err = from_str::<f32>("1e39").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Overflow);
    assert_eq!(err.offset(), Some(0));
    assert_eq!(from_str::<f64>("1e39").unwrap(), 1e39);
    assert_eq!(from_str::<f64>("-1e400").unwrap_err().kind(), ErrorKind::Overflow);
    let err = from_str::<Vec<f32>>("[1, 1e39]").unwrap_err();
    assert!(matches!(err, JsonError::NumberOverflow { offset: Some(4), shape: "f32", .. }));
}

#[test]
fn enums_by_ordinal() {
    assert_eq!(from_str::<Color>("1").unwrap(), Color::Green);
    assert_eq!(from_str::<Color>("7").unwrap(), Color::Blue);
    let err = from_str::<Color>("3").unwrap_err();
    assert!(matches!(err, JsonError::UnknownOrdinal { ordinal: 3, .. }));
    assert_eq!(from_str::<Color>(r#""Red""#).unwrap_err().kind(), ErrorKind::TypeMismatch);
}

#[test]
fn mismatched_tokens() {
    let err = from_str::<Item>(r#"{"id": "1"}"#).unwrap_err();
    assert_eq!(
        err,
        JsonError::TypeMismatch {
            offset: Some(7),
            found: "string",
            shape: "u32"
        }
    );
    assert_eq!(from_str::<Vec<u8>>("{}").unwrap_err().kind(), ErrorKind::TypeMismatch);
    assert_eq!(from_str::<char>(r#""ab""#).unwrap_err().kind(), ErrorKind::TypeMismatch);
    assert_eq!(from_str::<[u8; 2]>("[1]").unwrap_err().kind(), ErrorKind::TypeMismatch);
}

#[test]
fn redecoding_is_idempotent() {
    let text = r#"{"id": 4, "label": "l", "tags": ["a", "b"]}"#;
    let first: Item = from_str(text).unwrap();
    let second: Item = from_str(&to_string(&first).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn finish_hook_runs_once_per_record() {
    let orders: Vec<Order> = from_str(r#"[{}, {"no": 1}, {"no": 2, "no": 3}]"#).unwrap();
    assert!(orders.iter().all(|o| o.finished == 1));
    assert_eq!(orders[2].number, 3);
}

#[derive(Debug, Default)]
struct Temperature {
    celsius: f64,
    assigned: u32,
}

impl Record for Temperature {
    fn describe(members: &mut RecordBuilder<Self>) {
        members
            .field("celsius", |t| &t.celsius, |t| &mut t.celsius)
            .property("celsius", |t| &t.celsius, |t, v| {
                t.celsius = v;
                t.assigned += 1;
            });
    }
}

record_shape!(Temperature);

#[test]
fn properties_take_precedence_over_fields() {
    let t: Temperature = from_str(r#"{"celsius": 21.5}"#).unwrap();
    assert_eq!(t.celsius, 21.5);
    assert_eq!(t.assigned, 1);
}

#[test]
fn duplicate_keys_decode_only_the_last_value() {
    let t: Temperature = from_str(r#"{"celsius": "warm", "celsius": [1], "celsius": 3.5}"#).unwrap();
    assert_eq!(t.celsius, 3.5);
    assert_eq!(t.assigned, 1);

    let item: Item = from_str(r#"{"id": -1, "tags": ["a"], "id": 2}"#).unwrap();
    assert_eq!(item.id, 2);
    assert_eq!(item.tags, ["a"]);

    let map: HashMap<u8, u8> = from_str(r#"{"1": 300, "1": 3}"#).unwrap();
    assert_eq!(map[&1], 3);
}

#[test]
fn duplicate_keys_still_need_valid_syntax() {
    let err = from_str::<Item>(r#"{"id": [1,], "id": 2}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

static DESCRIBE_CALLS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Default)]
struct Counted {
    value: u8,
}

impl Record for Counted {
    fn describe(members: &mut RecordBuilder<Self>) {
        DESCRIBE_CALLS.fetch_add(1, Ordering::SeqCst);
        members.field("value", |c| &c.value, |c| &mut c.value);
    }
}

record_shape!(Counted);

#[test]
fn descriptor_is_built_once_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let text = format!(r#"{{"value": {i}}}"#);
                from_str::<Counted>(&text).unwrap().value
            })
        })
        .collect();
    let mut values: Vec<u8> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    values.sort_unstable();
    assert_eq!(values, (0..8).collect::<Vec<u8>>());
    assert_eq!(DESCRIBE_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn trailing_characters_after_root() {
    let err = from_str::<Item>(r#"{"id": 1} {}"#).unwrap_err();
    assert!(matches!(
        err,
        JsonError::Syntax {
            reason: SyntaxReason::TrailingCharacters,
            ..
        }
    ));
}
