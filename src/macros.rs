/// Construct a [`Value`][crate::Value] using a JSON-like syntax.
///
/// Map keys may be identifiers or string literals. `nil` is written as
/// `None`. Anything else goes through `Value::from`, values made of more
/// than one token need to be wrapped in parentheses, e.g. `count: (-1)`.
///
/// ```
/// let data = tincture::value! {
///     user: { name: "John", tags: ["a", "b"] },
///     "first-visit": true,
///     referrer: None,
/// };
/// ```
#[macro_export]
macro_rules! value {
    ($($tt:tt)*) => {
        $crate::_value!({ $($tt)* })
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! _value {
    (None) => {
        $crate::Value::None
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(::std::vec![$($crate::_value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::Map::new())
    };

    ({ $($tt:tt)+ }) => {
        $crate::Value::Map({
            let mut map = $crate::Map::new();
            $crate::_value!(@entry map $($tt)+);
            map
        })
    };

    // Map entries, munched one key at a time.
    (@entry $map:ident) => {};

    (@entry $map:ident $key:ident : $value:tt $(, $($rest:tt)*)?) => {
        $map.insert(::std::string::String::from(stringify!($key)), $crate::_value!($value));
        $crate::_value!(@entry $map $($($rest)*)?);
    };

    (@entry $map:ident $key:literal : $value:tt $(, $($rest:tt)*)?) => {
        $map.insert(::std::string::String::from($key), $crate::_value!($value));
        $crate::_value!(@entry $map $($($rest)*)?);
    };

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Map, Value};

    #[test]
    fn value_map() {
        let v = value! { x: "hello", "y-z": 1 };
        let exp = Value::from([("x", Value::from("hello")), ("y-z", Value::from(1))]);
        assert_eq!(v, exp);
    }

    #[test]
    fn value_nested() {
        let v = value! {
            list: ["a", None, {}, [1, 2]],
            user: { name: "John" },
        };
        let exp = Value::from([
            (
                "list",
                Value::List(vec![
                    Value::from("a"),
                    Value::None,
                    Value::Map(Map::new()),
                    Value::from([1, 2]),
                ]),
            ),
            ("user", Value::from([("name", "John")])),
        ]);
        assert_eq!(v, exp);
    }
}
