/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// `{ ... }` builds a mapping (rendered with sorted keys), `@record { ... }`
/// builds a record (declaration order, `null` fields left out). Any other
/// expression goes through `Value::from`. Elements and values are single token
/// trees, so wrap anything longer in parentheses: `(-1)`, `(@record { ... })`.
///
/// ```rust
/// use serde_logtext::{value, Value};
///
/// let v = value!({ "name": "bob", "ids": [1, 2], "meta": (@record { "ok": true }) });
/// assert!(v.is_map());
/// assert_eq!(value!(null), Value::Null);
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Seq(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Seq(vec![$($crate::value!($elem)),*])
    };

    (@record { $($key:literal : $value:tt),* $(,)? }) => {
        $crate::Value::Record($crate::__value_map!($($key : $value),*))
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {
        $crate::Value::Map($crate::__value_map!($($key : $value),*))
    };

    (( $($inner:tt)+ )) => {
        $crate::value!($($inner)+)
    };

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __value_map {
    ($($key:literal : $value:tt),*) => {{
        #[allow(unused_mut)]
        let mut map = $crate::ValueMap::new();
        $(
            map.insert(::std::string::ToString::to_string($key), $crate::value!($value));
        )*
        map
    }};
}
