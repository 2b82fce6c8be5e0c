use lendflow_core::types::JsonMap;
use lendflow_core::{transform, TransformationType};
use serde_json::{json, Value};

fn cfg(v: Value) -> JsonMap {
    match v {
        Value::Object(m) => m,
        _ => JsonMap::new(),
    }
}

#[test]
fn phone_dashed_ten_and_eleven_digits() {
    let c = cfg(json!({"format": "dashed"}));
    assert_eq!(
        transform(&json!("5551234567"), TransformationType::FormatPhone, &c),
        json!("555-123-4567")
    );
    assert_eq!(
        transform(&json!("15551234567"), TransformationType::FormatPhone, &c),
        json!("1-555-123-4567")
    );
    assert_eq!(
        transform(&json!("555-1234"), TransformationType::FormatPhone, &c),
        json!("5551234")
    );
}

#[test]
fn phone_parentheses_and_clean() {
    assert_eq!(
        transform(
            &json!("(555) 123 4567"),
            TransformationType::FormatPhone,
            &cfg(json!({"format": "parentheses"}))
        ),
        json!("(555) 123-4567")
    );
    assert_eq!(
        transform(&json!("+1 555.123.4567"), TransformationType::FormatPhone, &JsonMap::new()),
        json!("15551234567")
    );
    assert_eq!(
        transform(&json!(5551234567_u64), TransformationType::FormatPhone, &JsonMap::new()),
        json!("5551234567")
    );
}

#[test]
fn date_reformat_and_failure_passthrough() {
    assert_eq!(
        transform(&json!("2024-03-15"), TransformationType::FormatDate, &JsonMap::new()),
        json!("15/03/2024")
    );
    let c = cfg(json!({"input_format": "%d.%m.%Y", "output_format": "%Y%m%d"}));
    assert_eq!(
        transform(&json!("01.02.1990"), TransformationType::FormatDate, &c),
        json!("19900201")
    );
    assert_eq!(
        transform(&json!("not a date"), TransformationType::FormatDate, &JsonMap::new()),
        json!("not a date")
    );
}

#[test]
fn currency_formats_with_optional_symbol() {
    let c = cfg(json!({"decimal_places": 2, "include_symbol": true, "symbol": "$"}));
    assert_eq!(
        transform(&json!(1234.5), TransformationType::FormatCurrency, &c),
        json!("$1234.50")
    );
    assert_eq!(
        transform(&json!(" 12 "), TransformationType::FormatCurrency, &JsonMap::new()),
        json!("12.00")
    );
    assert_eq!(
        transform(
            &json!(7),
            TransformationType::FormatCurrency,
            &cfg(json!({"decimal_places": 0, "symbol": "EUR"}))
        ),
        json!("7")
    );
}

#[test]
fn currency_failure_returns_string_form() {
    assert_eq!(
        transform(&json!("abc"), TransformationType::FormatCurrency, &JsonMap::new()),
        json!("abc")
    );
    assert_eq!(
        transform(&json!([1]), TransformationType::FormatCurrency, &JsonMap::new()),
        json!("[1]")
    );
}

#[test]
fn split_name_variants() {
    let none = JsonMap::new();
    assert_eq!(
        transform(&json!("John Michael Smith"), TransformationType::SplitName, &none),
        json!({"first_name": "John", "last_name": "Michael Smith"})
    );
    assert_eq!(
        transform(&json!("  Cher "), TransformationType::SplitName, &none),
        json!({"first_name": "Cher", "last_name": ""})
    );
    assert_eq!(transform(&json!("   "), TransformationType::SplitName, &none), json!({}));
    assert_eq!(transform(&json!(42), TransformationType::SplitName, &none), json!(42));
}

#[test]
fn object_mapping_renames_and_drops() {
    let c = cfg(json!({"mapping": {"street": "address_line_1", "zip": "postal_code", "missing": "x"}}));
    assert_eq!(
        transform(
            &json!({"street": "1 Main", "zip": "10001", "extra": true}),
            TransformationType::ObjectMapping,
            &c
        ),
        json!({"address_line_1": "1 Main", "postal_code": "10001"})
    );
    assert_eq!(
        transform(&json!("scalar"), TransformationType::ObjectMapping, &c),
        json!("scalar")
    );
}

#[test]
fn array_formats() {
    assert_eq!(
        transform(
            &json!(["(555) 111-2222", 5553334444_u64]),
            TransformationType::ArrayFormat,
            &cfg(json!({"format": "phone_clean"}))
        ),
        json!(["5551112222", "5553334444"])
    );
    assert_eq!(
        transform(
            &json!(["b", "a", "b", "c", "a"]),
            TransformationType::ArrayFormat,
            &cfg(json!({"format": "unique"}))
        ),
        json!(["b", "a", "c"])
    );
    assert_eq!(
        transform(
            &json!([3, 1.5, 2]),
            TransformationType::ArrayFormat,
            &cfg(json!({"format": "sorted"}))
        ),
        json!([1.5, 2, 3])
    );
    assert_eq!(
        transform(
            &json!([2, "a"]),
            TransformationType::ArrayFormat,
            &cfg(json!({"format": "sorted"}))
        ),
        json!([2, "a"])
    );
}

#[test]
fn conditional_lookup_is_case_insensitive() {
    let c = cfg(json!({"conditions": {"yes": true, "no": false}, "default": null}));
    assert_eq!(transform(&json!("YES"), TransformationType::Conditional, &c), json!(true));
    assert_eq!(transform(&json!("maybe"), TransformationType::Conditional, &c), Value::Null);

    let no_default = cfg(json!({"conditions": {"1": "one"}}));
    assert_eq!(
        transform(&json!(1), TransformationType::Conditional, &no_default),
        json!("one")
    );
    assert_eq!(
        transform(&json!(2), TransformationType::Conditional, &no_default),
        json!(2)
    );
}

#[test]
fn custom_and_none_are_identity_and_null_stays_null() {
    let v = json!({"k": [1, 2]});
    assert_eq!(transform(&v, TransformationType::Custom, &JsonMap::new()), v);
    assert_eq!(transform(&v, TransformationType::None, &JsonMap::new()), v);
    assert_eq!(
        transform(&Value::Null, TransformationType::FormatPhone, &JsonMap::new()),
        Value::Null
    );
}
