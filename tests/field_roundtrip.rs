//! End-to-end field behavior through a persistent store: write an attribute,
//! save, reload, read it back. Mirrors the behaviors the attribute-level
//! cache and codec have to uphold together.

use chrono::{NaiveDate, NaiveTime};
use jsonfield::store::fs::FileStore;
use jsonfield::{JsonField, Materialize, Model, Value};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

fn test_model() -> Model {
    Model::new()
        .with_field(JsonField::new("json"))
        .with_field(JsonField::new("json_null").null(true))
        .with_field(
            JsonField::new("json_eager")
                .materialize(Materialize::Eager)
                .null(true),
        )
}

fn save_reload(dir: &std::path::Path, model: &Model, field: &str, input: Value) -> (Uuid, Value) {
    let mut store = FileStore::new(dir);
    let mut inst = model.instance();
    inst.set(field, input).unwrap();
    let id = inst.id();
    inst.save(&mut store).unwrap();
    let mut loaded = model.load(&store, id).unwrap();
    let value = loaded.get(field).unwrap().cloned().unwrap();
    (id, value)
}

#[test]
fn test_simple_values_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();

    let (_, v) = save_reload(dir.path(), &model, "json", Value::Int(123));
    assert_eq!(v, Value::Int(123));

    let (_, v) = save_reload(
        dir.path(),
        &model,
        "json",
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    );
    assert_eq!(
        v,
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn test_raw_text_decodes_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();
    let mut store = FileStore::new(dir.path());

    let mut inst = model.instance();
    inst.set("json", "{\"test\": [1, 2, 3]}").unwrap();
    let id = inst.id();
    inst.save(&mut store).unwrap();

    let mut loaded = model.load(&store, id).unwrap();
    let expected: Value = [(
        "test".to_string(),
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    )]
    .into_iter()
    .collect();
    assert_eq!(loaded.get("json").unwrap(), Some(&expected));
    assert_eq!(loaded.get_json("json").unwrap(), "{\"test\": [1, 2, 3]}");
}

#[test]
fn test_decimal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();

    // a bare JSON number comes back as an arbitrary-precision decimal
    let (_, v) = save_reload(dir.path(), &model, "json", Value::Float(1.24));
    assert_eq!(v, Value::Decimal(Decimal::from_str("1.24").unwrap()));

    // a Decimal value encodes as a string and comes back as one
    let nested: Value = [(
        "test".to_string(),
        Value::List(vec![[(
            "test".to_string(),
            Value::Decimal(Decimal::from_str("1.24").unwrap()),
        )]
        .into_iter()
        .collect::<Value>()]),
    )]
    .into_iter()
    .collect();
    let (_, v) = save_reload(dir.path(), &model, "json", nested);
    let expected: Value = [(
        "test".to_string(),
        Value::List(vec![[("test".to_string(), Value::Str("1.24".to_string()))]
            .into_iter()
            .collect::<Value>()]),
    )]
    .into_iter()
    .collect();
    assert_eq!(v, expected);
}

#[test]
fn test_time_truncates_to_milliseconds() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();

    let precise = NaiveTime::from_hms_micro_opt(10, 42, 7, 123_456).unwrap();
    let rounded = NaiveTime::from_hms_milli_opt(10, 42, 7, 123).unwrap();
    let (_, v) = save_reload(dir.path(), &model, "json", Value::time(precise));
    assert_eq!(v, Value::time(rounded));

    // nested inside a container
    let tree: Value = [(
        "time".to_string(),
        Value::List(vec![Value::time(precise)]),
    )]
    .into_iter()
    .collect();
    let (_, v) = save_reload(dir.path(), &model, "json", tree);
    let expected: Value = [(
        "time".to_string(),
        Value::List(vec![Value::time(rounded)]),
    )]
    .into_iter()
    .collect();
    assert_eq!(v, expected);
}

#[test]
fn test_date_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();
    let today = NaiveDate::from_ymd_opt(2014, 1, 27).unwrap();

    let (_, v) = save_reload(dir.path(), &model, "json", Value::Date(today));
    assert_eq!(v, Value::Date(today));

    let tree: Value = [("today".to_string(), Value::Date(today))]
        .into_iter()
        .collect();
    let (_, v) = save_reload(dir.path(), &model, "json", tree.clone());
    assert_eq!(v, tree);
}

#[test]
fn test_datetime_truncates_to_milliseconds() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();

    let precise = NaiveDate::from_ymd_opt(2014, 5, 7)
        .unwrap()
        .and_hms_micro_opt(12, 34, 56, 987_654)
        .unwrap();
    let rounded = NaiveDate::from_ymd_opt(2014, 5, 7)
        .unwrap()
        .and_hms_milli_opt(12, 34, 56, 987)
        .unwrap();
    let (_, v) = save_reload(dir.path(), &model, "json", Value::datetime(precise));
    assert_eq!(v, Value::datetime(rounded));
}

#[test]
fn test_datelike_strings_stay_strings_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();
    let mut store = FileStore::new(dir.path());

    for title in [
        "2014-01-27 | Title with date",
        "10:42:07 | Title with date",
        "10:42:07.123 | Title with date",
        "2014-05-07T12:34:56 | Title with date",
    ] {
        let mut inst = model.instance();
        let text = format!("{{\"title\": {}}}", serde_json::to_string(title).unwrap());
        inst.set("json", text.as_str()).unwrap();
        let id = inst.id();
        inst.save(&mut store).unwrap();

        let mut loaded = model.load(&store, id).unwrap();
        let value = loaded.get("json").unwrap().unwrap();
        assert_eq!(
            value.as_map().unwrap().get("title"),
            Some(&Value::Str(title.to_string()))
        );
    }
}

#[test]
fn test_numerical_strings_stay_strings_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();

    let (_, v) = save_reload(
        dir.path(),
        &model,
        "json",
        Value::Str("555".to_string()),
    );
    assert_eq!(v, Value::Str("555".to_string()));
}

#[test]
fn test_nullable_field_suppresses_storage_text() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();
    let mut store = FileStore::new(dir.path());

    let mut inst = model.instance();
    let id = inst.id();
    inst.save(&mut store).unwrap();

    let mut loaded = model.load(&store, id).unwrap();
    // untouched defaults: non-nullable stored "null", nullable stored NULL
    assert_eq!(loaded.get("json").unwrap(), Some(&Value::Null));
    assert_eq!(loaded.get_json("json").unwrap(), "null");
    assert_eq!(loaded.get_json("json_null").unwrap(), "null");
}

#[test]
fn test_eager_field_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let model = test_model();
    let mut store = FileStore::new(dir.path());

    let mut inst = model.instance();
    inst.set("json_eager", "{\"test\": [1, 2, 3]}").unwrap();
    let id = inst.id();
    inst.save(&mut store).unwrap();

    let mut loaded = model.load(&store, id).unwrap();
    let expected: Value = [(
        "test".to_string(),
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    )]
    .into_iter()
    .collect();
    assert_eq!(loaded.get("json_eager").unwrap(), Some(&expected));
}

#[test]
fn test_formfield_built_from_declaration() {
    let evaluating = JsonField::new("json").evaluate_formfield(true);
    let plain = JsonField::new("json");
    let input = "{\"time\": datetime.datetime.now()}";

    assert!(plain.formfield(true).clean(Some(input)).is_err());
    assert!(evaluating.formfield(true).clean(Some(input)).is_ok());

    // optional form field: empty input is simply no value
    assert!(plain.formfield(false).clean(Some("")).unwrap().is_none());
}
