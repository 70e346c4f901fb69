use chrono::{TimeZone, Utc};
use serde_logtext::{to_string, value, Number, ReflectEncoder, Value, ValueMap};

#[test]
fn test_value_macro_null() {
    assert_eq!(value!(null), Value::Null);
}

#[test]
fn test_value_macro_booleans() {
    assert_eq!(value!(true), Value::Bool(true));
    assert_eq!(value!(false), Value::Bool(false));
}

#[test]
fn test_value_macro_numbers() {
    assert_eq!(value!(42), Value::Number(Number::Int(42)));
    assert_eq!(value!(42u64), Value::Number(Number::Uint(42)));
    assert_eq!(value!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(value!(1.5f32), Value::Number(Number::Float32(1.5)));
    assert_eq!(value!(-123), Value::Number(Number::Int(-123)));
}

#[test]
fn test_value_macro_strings() {
    assert_eq!(value!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(value!(""), Value::String(String::new()));

    let owned = String::from("from a variable");
    assert_eq!(value!(owned.clone()), Value::String(owned));
}

#[test]
fn test_value_macro_seq() {
    assert_eq!(value!([]), Value::Seq(vec![]));
    assert_eq!(
        value!([1, "two", null, (-3), [true]]),
        Value::Seq(vec![
            Value::from(1),
            Value::from("two"),
            Value::Null,
            Value::from(-3),
            Value::Seq(vec![Value::Bool(true)]),
        ])
    );
    assert_eq!(value!([1, 2,]).as_seq().map(Vec::len), Some(2));
}

#[test]
fn test_value_macro_map() {
    let v = value!({ "b": 2, "a": 1 });
    let map = v.as_map().unwrap();
    assert!(v.is_map());
    let keys: Vec<_> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["b", "a"]);
    assert_eq!(to_string(&v).unwrap(), r#"{"a":1,"b":2}"#);
}

#[test]
fn test_value_macro_record() {
    let v = value!(@record { "b": 2, "gone": null, "a": 1 });
    assert!(v.is_record());
    assert_eq!(v.as_map().map(ValueMap::len), Some(3));
    assert_eq!(to_string(&v).unwrap(), r#"{"b":2,"a":1}"#);
}

#[test]
fn test_value_macro_nesting() {
    let v = value!({
        "user": (@record { "name": "Ann", "roles": ["admin", "dev"] }),
        "count": 2,
        "tags": [{ "k": "v" }],
    });
    assert_eq!(
        to_string(&v).unwrap(),
        r#"{"count":2,"tags":[{"k":"v"}],"user":{"name":"Ann","roles":["admin","dev"]}}"#
    );
}

#[test]
fn test_value_macro_expressions() {
    let when = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
    let v = value!([(1 + 2), when, (Some(7)), (None::<i32>)]);
    assert_eq!(
        v,
        Value::Seq(vec![
            Value::from(3),
            Value::Time(when),
            Value::from(7),
            Value::Null,
        ])
    );

    let mut enc = ReflectEncoder::new(Vec::new());
    enc.encode_value(&v).unwrap();
    assert_eq!(enc.release(), br#"[3,"2020-01-02T03:04:05Z",7,null]"#);
}
