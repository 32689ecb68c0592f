//! Typed encoding.

use std::collections::BTreeMap;
use std::str::FromStr;

use catjson::{
    from_str, json_enum, json_record, to_string, to_string_pretty, to_string_with, EncodeOptions,
};
use indexmap::IndexMap;
use rust_decimal::Decimal;

#[derive(Debug, Default, PartialEq, Clone, Copy)]
enum Mode {
    #[default]
    Off,
    On,
}

json_enum!(Mode { Off, On });

#[derive(Debug, Default, PartialEq)]
struct Invoice {
    id: u64,
    total: Decimal,
    ratio: f32,
    grade: char,
    mode: Mode,
    lines: IndexMap<String, u32>,
    by_day: BTreeMap<i16, Vec<Option<bool>>>,
    memo: Option<String>,
}

json_record!(Invoice {
    id,
    total,
    ratio,
    grade,
    mode,
    lines,
    by_day as "byDay",
    memo,
});

fn sample() -> Invoice {
    let mut lines = IndexMap::new();
    lines.insert("zeta".to_string(), 2);
    lines.insert("alpha".to_string(), 1);
    let mut by_day = BTreeMap::new();
    by_day.insert(-1, vec![Some(true), None]);
    by_day.insert(3, vec![]);
    Invoice {
        id: 10,
        total: Decimal::from_str("12.50").unwrap(),
        ratio: 0.1,
        grade: 'B',
        mode: Mode::On,
        lines,
        by_day,
        memo: None,
    }
}

#[test]
fn compact_record_in_declaration_order() {
    assert_eq!(
        to_string(&sample()).unwrap(),
        r#"{"id":10,"total":12.50,"ratio":0.1,"grade":"B","mode":1,"lines":{"zeta":2,"alpha":1},"byDay":{"-1":[true,null],"3":[]},"memo":null}"#
    );
}

#[test]
fn pretty_record() {
    let text = to_string_pretty(&sample()).unwrap();
    assert!(text.starts_with("{\n  \"id\": 10,\n  \"total\": 12.50,"));
    assert!(text.contains("\n  \"lines\": {\n    \"zeta\": 2,\n    \"alpha\": 1\n  },"));
    assert!(text.contains("\"3\": []"));
    assert!(text.ends_with("\n  \"memo\": null\n}"));
}

#[test]
fn custom_indent_width() {
    let options = EncodeOptions {
        indent: true,
        indent_width: 1,
    };
    assert_eq!(to_string_with(&vec![1u8, 2], &options).unwrap(), "[\n 1,\n 2\n]");
}

#[test]
fn encoded_records_decode_back() {
    let original = sample();
    let decoded: Invoice = from_str(&to_string(&original).unwrap()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn float_edge_cases() {
    assert_eq!(to_string(&vec![f64::NAN, -0.0, 1e21, 2.0]).unwrap(), "[null,0,1000000000000000000000,2]");
    assert_eq!(to_string(&f32::NEG_INFINITY).unwrap(), "-1e308");
}

#[test]
fn strings_are_escaped() {
    let s = "tab\there \"quoted\" \\ \u{7f} é".to_string();
    let text = to_string(&s).unwrap();
    assert_eq!(text, "\"tab\\there \\\"quoted\\\" \\\\ \u{7f} é\"");
    assert_eq!(from_str::<String>(&text).unwrap(), s);
}
