use chrono::{TimeDelta, TimeZone, Utc};
use num_complex::{Complex32, Complex64};
use serde::Serialize;
use serde_logtext::{
    new_text_encoder, ArrayEncoder, ArrayMarshaler, ArrayMarshalerFn, Caller, CallerFormat,
    DurationFormat, Encoder, EncoderConfig, Entry, Error, Field, FieldValue, Level, LevelFormat,
    ObjectEncoder, ObjectMarshaler, PrimitiveArrayEncoder, Result, TextEncoder, TimeFormat,
};

fn fixed_entry(message: &str) -> Entry {
    Entry::new(Level::Info, message).with_time(Utc.with_ymd_and_hms(2023, 9, 2, 10, 30, 15).unwrap())
}

fn line(config: EncoderConfig, entry: &Entry, fields: &[Field]) -> String {
    TextEncoder::new(config)
        .encode_entry(entry, fields)
        .unwrap()
        .to_string_lossy()
}

fn fields_only(fields: &[Field]) -> String {
    line(EncoderConfig::bare(), &fixed_entry(""), fields)
}

struct User {
    name: &'static str,
    roles: Vec<&'static str>,
}

impl ObjectMarshaler for User {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        enc.add_string("name", self.name);
        enc.add_array("roles", &Roles(&self.roles))
    }
}

struct Roles<'a>(&'a [&'static str]);

impl ArrayMarshaler for Roles<'_> {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        for role in self.0 {
            enc.append_string(role);
        }
        Ok(())
    }
}

#[test]
fn test_default_header() {
    let entry = fixed_entry("hello")
        .with_logger_name("api")
        .with_caller(Caller::new("/path/to/file.go", 123));
    let out = line(EncoderConfig::default(), &entry, &[Field::string("name", "bob")]);
    assert_eq!(
        out,
        "ts=2023-09-02T10:30:15.000+0000 level=INFO logger=api caller=to/file.go:123 msg=hello name=bob"
    );
}

#[test]
fn test_disabled_header_keys_are_omitted() {
    let config = EncoderConfig::new().with_time_key("").with_caller_key("");
    let entry = fixed_entry("hello").with_caller(Caller::new("main.rs", 1));
    let out = line(config, &entry, &[Field::string("name", "bob")]);
    assert_eq!(out, "level=INFO msg=hello name=bob");
}

#[test]
fn test_function_and_stacktrace() {
    let config = EncoderConfig::bare()
        .with_function_key("func")
        .with_caller_key("caller")
        .with_caller_format(CallerFormat::Full)
        .with_message_key("msg")
        .with_stacktrace_key("stack");
    let entry = fixed_entry("boom")
        .with_caller(Caller::new("/src/file.go", 123).with_function("main.run"))
        .with_stack("goroutine 1");
    let out = line(config, &entry, &[Field::int64("code", 2)]);
    assert_eq!(
        out,
        r#"caller=/src/file.go:123 func=main.run msg=boom code=2 stack="goroutine 1""#
    );
}

#[test]
fn test_level_formats() {
    let entry = Entry::new(Level::Warn, "");
    let config = EncoderConfig::bare()
        .with_level_key("level")
        .with_level_format(LevelFormat::Lowercase);
    assert_eq!(line(config, &entry, &[]), "level=warn");

    let silent = LevelFormat::custom(|_, _| {});
    let config = EncoderConfig::bare()
        .with_level_key("level")
        .with_level_format(silent);
    assert_eq!(line(config, &entry, &[]), "level=WARN");
}

#[test]
fn test_time_formats() {
    let entry = fixed_entry("");
    let config = EncoderConfig::bare()
        .with_time_key("ts")
        .with_time_format(TimeFormat::EpochMillis);
    assert_eq!(line(config, &entry, &[]), "ts=1693650615000");

    let config = EncoderConfig::bare()
        .with_time_key("ts")
        .with_time_format(TimeFormat::custom(|t, enc| {
            enc.append_string(&t.format("%Y/%m/%d").to_string())
        }));
    assert_eq!(line(config, &entry, &[]), "ts=2023/09/02");
}

#[test]
fn test_duration_without_formatter_is_nanos() {
    let out = fields_only(&[Field::duration("d", TimeDelta::seconds(90))]);
    assert_eq!(out, "d=90000000000");
}

#[test]
fn test_duration_formats() {
    let d = TimeDelta::seconds(90);
    let config = EncoderConfig::bare().with_duration_format(DurationFormat::String);
    assert_eq!(
        line(config, &fixed_entry(""), &[Field::duration("d", d)]),
        "d=1m30s"
    );

    let config = EncoderConfig::bare().with_duration_format(DurationFormat::Seconds);
    assert_eq!(
        line(config, &fixed_entry(""), &[Field::duration("d", d)]),
        "d=90"
    );

    let config = EncoderConfig::bare().with_duration_format(DurationFormat::custom(|_, _| {}));
    assert_eq!(
        line(config, &fixed_entry(""), &[Field::duration("d", d)]),
        "d=90000000000"
    );
}

#[test]
fn test_time_field_uses_configured_format() {
    let t = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(
        fields_only(&[Field::time("at", t)]),
        "at=2020-01-02T03:04:05Z"
    );
    let config = EncoderConfig::bare().with_time_format(TimeFormat::Iso8601);
    assert_eq!(
        line(config, &fixed_entry(""), &[Field::time("at", t)]),
        "at=2020-01-02T03:04:05.000+0000"
    );
}

#[test]
fn test_arrays() {
    let out = fields_only(&[
        Field::array_of("ints", [1, 2, 3]),
        Field::array_of("strs", ["a", "b"]),
        Field::array_of("empty", Vec::<i64>::new()),
    ]);
    assert_eq!(out, "ints=[1,2,3] strs=[a,b] empty=[]");
}

#[test]
fn test_object_marshaler() {
    let user = User {
        name: "alice",
        roles: vec!["admin", "dev"],
    };
    let out = fields_only(&[Field::object("user", user), Field::bool("ok", true)]);
    assert_eq!(out, "user=name=alice roles=[admin,dev] ok=true");
}

#[test]
fn test_bracketed_objects() {
    let user = User {
        name: "alice",
        roles: vec![],
    };
    let config = EncoderConfig::bare().with_bracket_objects(true);
    let out = line(config, &fixed_entry(""), &[Field::object("user", user)]);
    assert_eq!(out, "user={name=alice roles=[]}");
}

#[test]
fn test_array_of_objects() {
    let users = ArrayMarshalerFn(|enc: &mut dyn ArrayEncoder| {
        for name in ["a", "b"] {
            enc.append_object(&User {
                name,
                roles: vec!["x"],
            })?;
        }
        Ok(())
    });
    let out = fields_only(&[Field::array("users", users)]);
    assert_eq!(out, "users=[name=a roles=[x],name=b roles=[x]]");
}

#[test]
fn test_floats_and_complex() {
    let out = fields_only(&[
        Field::float64("pi", 3.14159),
        Field::float32("f", 2.5),
        Field::float64("nan", f64::NAN),
        Field::float64("inf", f64::INFINITY),
        Field::complex64("c", Complex64::new(1.0, 2.0)),
        Field::complex32("c32", Complex32::new(0.5, -1.0)),
    ]);
    assert_eq!(
        out,
        r#"pi=3.14159 f=2.5 nan="NaN" inf="+Inf" c="1+2i" c32="0.5+-1i""#
    );
}

#[test]
fn test_integer_widths() {
    let out = fields_only(&[
        Field::new("i8", -8i8),
        Field::new("u16", 16u16),
        Field::new("max", u64::MAX),
        Field::new("min", i64::MIN),
    ]);
    assert_eq!(
        out,
        "i8=-8 u16=16 max=18446744073709551615 min=-9223372036854775808"
    );
}

#[test]
fn test_bytes() {
    let out = fields_only(&[
        Field::binary("bin", vec![0xde, 0xad, 0xbe, 0xef]),
        Field::byte_string("text", b"plain".to_vec()),
        Field::byte_string("spaced", b"two words".to_vec()),
    ]);
    assert_eq!(out, r#"bin="3q2+7w==" text=plain spaced="two words""#);
}

#[test]
fn test_reflected_field() {
    #[derive(Serialize)]
    struct Request {
        method: &'static str,
        path: &'static str,
        headers: std::collections::BTreeMap<&'static str, &'static str>,
    }

    let mut headers = std::collections::BTreeMap::new();
    headers.insert("accept", "<json>");
    let req = Request {
        method: "GET",
        path: "/health",
        headers,
    };
    let out = fields_only(&[Field::reflect("req", &req).unwrap()]);
    assert_eq!(
        out,
        r#"req={"method":"GET","path":"/health","headers":{"accept":"<json>"}}"#
    );
}

#[test]
fn test_error_and_display_fields() {
    let err = std::fmt::Error;
    let out = fields_only(&[Field::error(&err), Field::display("addr", &"127.0.0.1:80")]);
    assert_eq!(
        out,
        r#"error="an error occurred when formatting an argument" addr=127.0.0.1:80"#
    );
}

#[test]
fn test_namespace_does_not_change_output() {
    let out = fields_only(&[
        Field::namespace("http"),
        Field::int64("status", 200),
    ]);
    assert_eq!(out, "status=200");
}

#[test]
fn test_context_fields_and_clone_independence() {
    let mut base = TextEncoder::new(EncoderConfig::bare().with_message_key("msg"));
    base.add_string("service", "api");

    let mut a = base.clone_encoder();
    let mut b = base.clone_encoder();
    a.add_int64("a", 1);
    b.add_int64("b", 2);

    let entry = fixed_entry("hi");
    let fields = [Field::bool("done", true)];
    assert_eq!(
        base.encode_entry(&entry, &fields).unwrap().to_string_lossy(),
        "msg=hi service=api done=true"
    );
    assert_eq!(
        a.encode_entry(&entry, &fields).unwrap().to_string_lossy(),
        "msg=hi service=api a=1 done=true"
    );
    assert_eq!(
        b.encode_entry(&entry, &fields).unwrap().to_string_lossy(),
        "msg=hi service=api b=2 done=true"
    );
}

#[test]
fn test_encode_entry_leaves_encoder_untouched() {
    let enc = new_text_encoder(EncoderConfig::bare());
    let entry = fixed_entry("");
    let first = enc
        .encode_entry(&entry, &[Field::int64("n", 1)])
        .unwrap()
        .to_string_lossy();
    let second = enc
        .encode_entry(&entry, &[Field::int64("n", 2)])
        .unwrap()
        .to_string_lossy();
    assert_eq!(first, "n=1");
    assert_eq!(second, "n=2");
}

#[test]
fn test_marshaler_failure_aborts_entry() {
    let failing = ArrayMarshalerFn(|enc: &mut dyn ArrayEncoder| {
        enc.append_int64(1);
        Err(Error::marshal("bad element"))
    });
    let enc = TextEncoder::new(EncoderConfig::bare());
    let res = enc.encode_entry(
        &fixed_entry(""),
        &[Field::int64("before", 0), Field::array("xs", failing), Field::int64("after", 1)],
    );
    assert_eq!(res.unwrap_err(), Error::marshal("bad element"));
}

#[test]
fn test_partial_output_not_rolled_back() {
    let mut enc = TextEncoder::new(EncoderConfig::bare());
    let err = enc
        .add_array(
            "xs",
            &ArrayMarshalerFn(|a: &mut dyn ArrayEncoder| {
                a.append_int64(1);
                Err(Error::marshal("stop"))
            }),
        )
        .unwrap_err();
    assert_eq!(err, Error::marshal("stop"));
    assert_eq!(enc.buffer().to_string_lossy(), "xs=[1]");
}

#[test]
fn test_nested_field_values() {
    let out = fields_only(&[Field::new(
        "mixed",
        vec![
            FieldValue::Int(1),
            FieldValue::String("two".into()),
            FieldValue::Array(vec![FieldValue::Bool(true)]),
            FieldValue::Object(vec![Field::int64("k", 3)]),
        ],
    )]);
    assert_eq!(out, "mixed=[1,two,[true],k=3]");
}

#[test]
fn test_primitive_widths_through_trait_defaults() {
    let mut enc = TextEncoder::new(EncoderConfig::bare());
    enc.add_array(
        "w",
        &ArrayMarshalerFn(|a: &mut dyn ArrayEncoder| {
            a.append_int8(-1);
            a.append_uint8(255);
            a.append_int(7);
            a.append_uintptr(0x10);
            Ok(())
        }),
    )
    .unwrap();
    assert_eq!(enc.buffer().to_string_lossy(), "w=[-1,255,7,16]");
}
