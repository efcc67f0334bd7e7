//! Declarative helpers for the two shapes the keybase.1 schema repeats
//! everywhere: integer-backed enumerations and string-backed identifiers.

/// Define an integer-backed protocol enumeration.
///
/// The enum travels as its integer value on the wire, and carries the
/// schema name of every variant for `Display` / `FromStr`.
macro_rules! protocol_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in schema order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Schema name of this value.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }

            /// Integer value carried on the wire.
            pub const fn value(self) -> i32 {
                match self {
                    $( $name::$variant => $value ),+
                }
            }
        }

        impl ::core::convert::TryFrom<i32> for $name {
            type Error = $crate::protocol::ParseError;

            fn try_from(v: i32) -> ::core::result::Result<Self, Self::Error> {
                match v {
                    $( $value => Ok($name::$variant), )+
                    other => Err($crate::protocol::ParseError::UnknownEnumValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ::core::convert::From<$name> for i32 {
            fn from(v: $name) -> i32 {
                v.value()
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::protocol::ParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err($crate::protocol::ParseError::UnknownEnumValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, s: S) -> ::core::result::Result<S::Ok, S::Error> {
                s.serialize_i32(self.value())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> ::core::result::Result<Self, D::Error> {
                let raw = <i32 as ::serde::Deserialize>::deserialize(d)?;
                $name::try_from(raw).map_err(::serde::de::Error::custom)
            }
        }
    };
}

/// Define a string-backed identifier newtype.
///
/// No validation happens here; each identifier adds its own checked
/// constructors next to the invocation.
macro_rules! string_id {
    ( $(#[$meta:meta])* $name:ident ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a string without validating it.
            pub fn new_unchecked(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_empty()
            }

            pub fn exists(&self) -> bool {
                !self.is_nil()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}
