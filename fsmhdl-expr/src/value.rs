//! Logic levels and input bindings.

use crate::error::ExprError;
use crate::symbol::is_identifier;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single bit, as carried by state outputs and bound inputs.
///
/// Only `0`, `"0"`, `false`, `1`, `"1"` and `true` convert into a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogicLevel {
    #[default]
    Low,
    High,
}

impl LogicLevel {
    /// Returns the level as `0` or `1`.
    pub fn as_bit(self) -> u8 {
        match self {
            LogicLevel::Low => 0,
            LogicLevel::High => 1,
        }
    }

    pub fn is_high(self) -> bool {
        self == LogicLevel::High
    }
}

impl From<bool> for LogicLevel {
    fn from(value: bool) -> Self {
        if value {
            LogicLevel::High
        } else {
            LogicLevel::Low
        }
    }
}

impl From<LogicLevel> for bool {
    fn from(level: LogicLevel) -> Self {
        level.is_high()
    }
}

macro_rules! impl_try_from_int {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for LogicLevel {
                type Error = ExprError;

                fn try_from(value: $t) -> Result<Self, Self::Error> {
                    match value {
                        0 => Ok(LogicLevel::Low),
                        1 => Ok(LogicLevel::High),
                        other => Err(ExprError::InvalidValue {
                            value: other.to_string(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_try_from_int!(i32, i64, u8, u32, u64);

impl TryFrom<&str> for LogicLevel {
    type Error = ExprError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "0" => Ok(LogicLevel::Low),
            "1" => Ok(LogicLevel::High),
            other => Err(ExprError::InvalidValue {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_bit())
    }
}

impl Serialize for LogicLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_bit())
    }
}

impl<'de> Deserialize<'de> for LogicLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = LogicLevel;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("one of 0, 1, \"0\", \"1\", false or true")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LogicLevel::from(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                LogicLevel::try_from(v).map_err(E::custom)
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                LogicLevel::try_from(v).map_err(E::custom)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                LogicLevel::try_from(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

/// Input values substituted into expressions, keyed by input name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<String, bool>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style.
    pub fn with(mut self, name: impl Into<String>, level: impl Into<LogicLevel>) -> Self {
        self.insert(name, level);
        self
    }

    /// Binds `name` to `level`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, level: impl Into<LogicLevel>) -> Option<bool> {
        self.0.insert(name.into(), level.into().is_high())
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Parses bindings written as `x=1, y=0` (commas or whitespace separate
    /// entries).
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let mut bindings = Self::new();
        for entry in text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|e| !e.is_empty())
        {
            let (name, value) = entry.split_once('=').ok_or_else(|| ExprError::InvalidValue {
                value: entry.to_string(),
            })?;
            let name = name.trim();
            if !is_identifier(name) {
                return Err(ExprError::InvalidIdentifier {
                    name: name.to_string(),
                });
            }
            let level = match value.trim() {
                "true" => LogicLevel::High,
                "false" => LogicLevel::Low,
                other => LogicLevel::try_from(other)?,
            };
            bindings.insert(name, level);
        }
        Ok(bindings)
    }
}

impl<S, L> FromIterator<(S, L)> for Bindings
where
    S: Into<String>,
    L: Into<LogicLevel>,
{
    fn from_iter<I: IntoIterator<Item = (S, L)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (name, level) in iter {
            bindings.insert(name, level);
        }
        bindings
    }
}
