//! Helpers for enums that travel as plain strings in pixi output and config

/// Implements `as_str`, `Display`, `FromStr`, `Serialize` and a
/// case-insensitive `Deserialize` for a fieldless enum.
///
/// Usage:
/// ```ignore
/// impl_str_enum!(
///     MyEnum,
///     Variant1 => "variant-1",
///     Variant2 => "variant-2"
/// );
/// ```
#[macro_export]
macro_rules! impl_str_enum {
    ($enum_type:ident, $($variant:ident => $str_val:expr),+ $(,)?) => {
        impl $enum_type {
            /// Every variant, in declaration order
            pub const ALL: &'static [$enum_type] = &[$($enum_type::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str_val,)+
                }
            }
        }

        impl std::fmt::Display for $enum_type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_type {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str_val => Ok(Self::$variant),)+
                    _ => Err(format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        [$($str_val),+].join(", ")
                    )),
                }
            }
        }

        impl serde::Serialize for $enum_type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
