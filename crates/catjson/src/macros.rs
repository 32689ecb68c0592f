/// Implement [`Record`](crate::Record) and [`JsonShape`](crate::JsonShape)
/// for a struct whose members are plain fields.
///
/// Each field is exposed under its own name, or under the literal given
/// with `as`. An optional `finish = path` names a `fn(&mut Self)` run as
/// the decode-finished hook.
///
/// ```
/// use catjson::json_record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct User {
///     id: u64,
///     display_name: String,
/// }
///
/// json_record!(User { id, display_name as "displayName" });
///
/// let user: User = catjson::from_str(r#"{"id": 7, "displayName": "Ada"}"#).unwrap();
/// assert_eq!(user.display_name, "Ada");
/// ```
#[macro_export]
macro_rules! json_record {
    ($ty:ty { $($field:ident $(as $key:literal)?),* $(,)? } $(; finish = $finish:path)?) => {
        impl $crate::Record for $ty {
            fn describe(members: &mut $crate::RecordBuilder<Self>) {
                $(
                    members.field(
                        $crate::__json_key!($field $(, $key)?),
                        |r| &r.$field,
                        |r| &mut r.$field,
                    );
                )*
            }

            $(
                fn on_decode_finished(&mut self) {
                    $finish(self)
                }
            )?
        }

        impl $crate::JsonShape for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::record::<Self>()
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __json_key {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $key:literal) => {
        $key
    };
}

/// Implement [`JsonEnum`](crate::JsonEnum) and
/// [`JsonShape`](crate::JsonShape) for a fieldless enum, using each
/// variant's discriminant as its ordinal. The enum must implement
/// `Default` and `Copy`.
///
/// ```
/// use catjson::json_enum;
///
/// #[derive(Debug, Default, PartialEq, Clone, Copy)]
/// enum Level {
///     #[default]
///     Low,
///     High = 5,
/// }
///
/// json_enum!(Level { Low, High });
///
/// let levels: Vec<Level> = catjson::from_str("[5, 0]").unwrap();
/// assert_eq!(levels, [Level::High, Level::Low]);
/// ```
#[macro_export]
macro_rules! json_enum {
    ($ty:ty { $($variant:ident),* $(,)? }) => {
        impl $crate::JsonEnum for $ty {
            fn from_ordinal(ordinal: i64) -> Option<Self> {
                $(
                    if ordinal == Self::$variant as i64 {
                        return Some(Self::$variant);
                    }
                )*
                None
            }

            fn ordinal(&self) -> i64 {
                *self as i64
            }
        }

        impl $crate::JsonShape for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::enumeration::<Self>()
            }
        }
    };
}

/// Implement [`JsonShape`](crate::JsonShape) for a type with a
/// hand-written [`Record`](crate::Record) impl, e.g. one that registers
/// properties.
#[macro_export]
macro_rules! record_shape {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::JsonShape for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::record::<Self>()
            }
        })+
    };
}
