/// Builds a [`Value`](crate::Value) from a Rust-like expression.
///
/// - `( a, b, ... )` builds a tuple; `()` is the unit value
/// - `[ a, b, ... ]` builds an array whose type is taken from the first element
/// - `{ k: v, ... }` builds a dictionary
/// - any other expression is converted through [`ToVariant`](crate::ToVariant)
///
/// Elements are single token trees: literals, identifiers or bracketed
/// groups. A parenthesised list is always a tuple, even with a single
/// element, so negative literals are written `(-1)`. Anything else, such as
/// a boxed variant, goes through a local binding.
///
/// Returns `Result<Value>`: empty arrays and dictionaries have no element
/// type and fail with [`Error::AmbiguousType`](crate::Error::AmbiguousType).
///
/// # Examples
///
/// ```rust
/// use gvariant::variant;
///
/// let value = variant!((1, "a", [true, false])).unwrap();
/// assert_eq!(value.type_string(), "(isab)");
///
/// let dict = variant!({"w": 640u32, "h": 480u32}).unwrap();
/// assert_eq!(dict.type_string(), "a{su}");
/// ```
#[macro_export]
macro_rules! variant {
    (()) => {
        ::std::result::Result::<$crate::Value, $crate::Error>::Ok($crate::Value::new_tuple(
            ::std::vec::Vec::new(),
        ))
    };

    (( $($elem:tt),+ $(,)? )) => {
        (|| -> $crate::Result<$crate::Value> {
            ::std::result::Result::Ok($crate::Value::new_tuple(::std::vec![
                $($crate::variant!($elem)?),+
            ]))
        })()
    };

    ([]) => {
        ::std::result::Result::<$crate::Value, $crate::Error>::Err($crate::Error::ambiguous(
            "empty array has no element type",
        ))
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        (|| -> $crate::Result<$crate::Value> {
            $crate::Value::new_array(
                ::std::option::Option::None,
                ::std::vec![$($crate::variant!($elem)?),+],
            )
        })()
    };

    ({}) => {
        ::std::result::Result::<$crate::Value, $crate::Error>::Err($crate::Error::ambiguous(
            "empty dictionary has no entry type",
        ))
    };

    ({ $($key:tt : $value:tt),+ $(,)? }) => {
        (|| -> $crate::Result<$crate::Value> {
            $crate::Value::new_array(
                ::std::option::Option::None,
                ::std::vec![$(
                    $crate::Value::new_dict_entry(
                        $crate::variant!($key)?,
                        $crate::variant!($value)?,
                    )?
                ),+],
            )
        })()
    };

    ($other:expr) => {
        $crate::ToVariant::to_variant(&$other)
    };
}
