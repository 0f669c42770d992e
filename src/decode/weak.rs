//! Weakly typed `serde::Deserializer` over a merged value tree.
//!
//! The derived `Deserialize` impl of the target asks for each field through a
//! specific `deserialize_*` method, so coercion is picked by the field's static
//! type rather than by the shape of the incoming value:
//!
//! | field type        | accepts                                              |
//! |-------------------|------------------------------------------------------|
//! | `String`          | strings, numbers and booleans (as text)              |
//! | integers          | numbers, decimal or `0x`/`0o`/`0b` text, bools as 1/0 |
//! | floats            | numbers, decimal text, booleans as 1/0               |
//! | `bool`            | booleans, `1 t T TRUE true True 0 f F FALSE ...`     |
//! | sequences         | sequences, comma separated text, any single scalar   |
//! | structs and maps  | mappings, recursing with the key appended to the path|
//! | `Option<T>`       | null as `None`, anything else coerced as `T`         |
//! | enums             | a variant name, or a one-entry mapping               |

use serde::de::{
    self, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};
use serde_json::{Number, Value};
use std::fmt;

/// Decode failure located at a dotted key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    path: String,
    message: String,
}

impl DecodeError {
    fn at(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Attach `path` unless a deeper frame already did.
    fn or_path(mut self, path: &str) -> Self {
        if self.path.is_empty() {
            self.path = path.to_string();
        }
        self
    }

    /// Dotted key of the offending value; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for DecodeError {}

impl de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self {
            path: String::new(),
            message: msg.to_string(),
        }
    }
}

/// A value plus the dotted key it was found at.
pub struct WeakValue<'a> {
    value: Value,
    path: String,
    delimiter: &'a str,
}

impl<'a> WeakValue<'a> {
    pub fn root(value: Value, delimiter: &'a str) -> Self {
        Self {
            value,
            path: String::new(),
            delimiter,
        }
    }

    fn mismatch(&self, expected: &str) -> DecodeError {
        let found = match &self.value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("boolean `{}`", b),
            Value::Number(n) => format!("number `{}`", n),
            Value::String(s) => format!("string `{}`", s),
            Value::Array(_) => "a sequence".to_string(),
            Value::Object(_) => "a mapping".to_string(),
        };
        DecodeError::at(&self.path, format!("expected {}, found {}", expected, found))
    }

    fn integer(&self) -> Result<Integer, DecodeError> {
        match &self.value {
            Value::Number(n) => number_to_integer(n).ok_or_else(|| self.mismatch("an integer")),
            Value::String(s) => parse_integer(s.trim())
                .ok_or_else(|| self.mismatch("an integer")),
            Value::Bool(b) => Ok(Integer::Unsigned(u64::from(*b))),
            _ => Err(self.mismatch("an integer")),
        }
    }

    fn float(&self) -> Result<f64, DecodeError> {
        match &self.value {
            Value::Number(n) => n.as_f64().ok_or_else(|| self.mismatch("a float")),
            Value::String(s) => {
                let text = s.trim();
                if text.is_empty() {
                    return Ok(0.0);
                }
                text.parse::<f64>().map_err(|_| self.mismatch("a float"))
            }
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            _ => Err(self.mismatch("a float")),
        }
    }

    fn boolean(&self) -> Result<bool, DecodeError> {
        match &self.value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => parse_bool(s.trim()).ok_or_else(|| self.mismatch("a boolean")),
            Value::Number(n) => match n.as_f64() {
                Some(f) => Ok(f != 0.0),
                None => Err(self.mismatch("a boolean")),
            },
            _ => Err(self.mismatch("a boolean")),
        }
    }

    fn text(&self) -> Result<String, DecodeError> {
        match &self.value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok(String::new()),
            _ => Err(self.mismatch("a string")),
        }
    }

    fn visit_integer<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let result = match self.integer()? {
            Integer::Signed(i) => visitor.visit_i64(i),
            Integer::Unsigned(u) => visitor.visit_u64(u),
        };
        result.map_err(|e: DecodeError| e.or_path(&path))
    }

    fn into_elements(self) -> Result<Vec<Value>, DecodeError> {
        match self.value {
            Value::Array(items) => Ok(items),
            Value::String(s) => Ok(split_commas(&s)),
            Value::Null => Ok(Vec::new()),
            Value::Object(_) => Err(self.mismatch("a sequence")),
            scalar => Ok(vec![scalar]),
        }
    }
}

enum Integer {
    Signed(i64),
    Unsigned(u64),
}

fn number_to_integer(n: &Number) -> Option<Integer> {
    if let Some(u) = n.as_u64() {
        return Some(Integer::Unsigned(u));
    }
    if let Some(i) = n.as_i64() {
        return Some(Integer::Signed(i));
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(Integer::Signed(f as i64))
    } else {
        None
    }
}

/// Decimal, or `0x`/`0o`/`0b` prefixed (underscores allowed after a prefix).
fn parse_integer(text: &str) -> Option<Integer> {
    if text.is_empty() {
        return Some(Integer::Unsigned(0));
    }
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if unsigned.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = match split_radix(unsigned) {
        Some((radix, digits)) => {
            let digits = digits.replace('_', "");
            u64::from_str_radix(&digits, radix).ok()?
        }
        None => unsigned.parse::<u64>().ok()?,
    };
    if negative {
        i64::try_from(-i128::from(magnitude)).ok().map(Integer::Signed)
    } else {
        Some(Integer::Unsigned(magnitude))
    }
}

fn split_radix(text: &str) -> Option<(u32, &str)> {
    let prefix = text.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &text[2..]))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "" | "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// The comma hook: `"a, b,c"` becomes `["a", "b", "c"]`, `""` becomes `[]`.
pub fn split_commas(text: &str) -> Vec<Value> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|part| Value::String(part.trim().to_string()))
        .collect()
}

macro_rules! integer_methods {
    (<$de:lifetime> $($method:ident)*) => {
        $(
            fn $method<V: Visitor<$de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                self.visit_integer(visitor)
            }
        )*
    };
}

macro_rules! float_methods {
    (<$de:lifetime> $($method:ident)*) => {
        $(
            fn $method<V: Visitor<$de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                let value = self.float()?;
                visitor.visit_f64(value).map_err(|e: DecodeError| e.or_path(&self.path))
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for WeakValue<'a> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let result = match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(ref n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else {
                    visitor.visit_f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::Array(_) => return self.deserialize_seq(visitor),
            Value::Object(_) => return self.deserialize_map(visitor),
        };
        result.map_err(|e: DecodeError| e.or_path(&path))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let value = self.boolean()?;
        visitor.visit_bool(value).map_err(|e: DecodeError| e.or_path(&self.path))
    }

    integer_methods! {
        <'de>
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
    }

    float_methods! { <'de> deserialize_f32 deserialize_f64 }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let text = self.text()?;
        let mut chars = text.chars();
        let result = match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => visitor.visit_string(text.clone()),
        };
        result.map_err(|e: DecodeError| e.or_path(&self.path))
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let text = self.text()?;
        visitor.visit_string(text).map_err(|e: DecodeError| e.or_path(&self.path))
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value {
            Value::String(s) => visitor
                .visit_byte_buf(s.into_bytes())
                .map_err(|e: DecodeError| e.or_path(&self.path)),
            _ => self.deserialize_seq(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value {
            Value::Null => visitor.visit_none().map_err(|e: DecodeError| e.or_path(&self.path)),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit().map_err(|e: DecodeError| e.or_path(&self.path))
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        visitor
            .visit_newtype_struct(self)
            .map_err(|e: DecodeError| e.or_path(&path))
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let delimiter = self.delimiter;
        let elements = self.into_elements()?;
        let mut access = SeqAccessor {
            iter: elements.into_iter(),
            index: 0,
            path: path.clone(),
            delimiter,
        };
        let value = visitor
            .visit_seq(&mut access)
            .map_err(|e: DecodeError| e.or_path(&path))?;
        let remaining = access.iter.len();
        if remaining == 0 {
            Ok(value)
        } else {
            Err(DecodeError::at(
                &path,
                format!("{} unexpected trailing element(s)", remaining),
            ))
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let entries = match self.value {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            _ => return Err(self.mismatch("a mapping")),
        };
        let path = self.path.clone();
        let mut access = MapAccessor {
            iter: entries.into_iter(),
            pending: None,
            path: self.path,
            delimiter: self.delimiter,
        };
        visitor
            .visit_map(&mut access)
            .map_err(|e: DecodeError| e.or_path(&path))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let path = self.path.clone();
        let delimiter = self.delimiter;
        match self.value {
            Value::String(s) => {
                let variant: de::value::StringDeserializer<DecodeError> =
                    s.trim().to_string().into_deserializer();
                visitor.visit_enum(variant).map_err(|e: DecodeError| e.or_path(&path))
            }
            Value::Object(map) if map.len() == 1 => {
                let Some((variant, content)) = map.into_iter().next() else {
                    return Err(DecodeError::at(&path, "expected a single-entry mapping"));
                };
                let content_path = if path.is_empty() {
                    variant.clone()
                } else {
                    format!("{}{}{}", path, delimiter, variant)
                };
                visitor
                    .visit_enum(EnumAccessor {
                        variant,
                        content: WeakValue {
                            value: content,
                            path: content_path,
                            delimiter,
                        },
                    })
                    .map_err(|e: DecodeError| e.or_path(&path))
            }
            _ => Err(self.mismatch("an enum variant name or a single-entry mapping")),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }
}

struct SeqAccessor<'a> {
    iter: std::vec::IntoIter<Value>,
    index: usize,
    path: String,
    delimiter: &'a str,
}

impl<'de, 'a> SeqAccess<'de> for SeqAccessor<'a> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DecodeError> {
        let Some(value) = self.iter.next() else {
            return Ok(None);
        };
        let path = format!("{}[{}]", self.path, self.index);
        self.index += 1;
        let element = WeakValue {
            value,
            path: path.clone(),
            delimiter: self.delimiter,
        };
        seed.deserialize(element)
            .map(Some)
            .map_err(|e: DecodeError| e.or_path(&path))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapAccessor<'a> {
    iter: serde_json::map::IntoIter,
    pending: Option<(String, Value)>,
    path: String,
    delimiter: &'a str,
}

impl MapAccessor<'_> {
    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", self.path, self.delimiter, key)
        }
    }
}

impl<'de, 'a> MapAccess<'de> for MapAccessor<'a> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        let path = self.child_path(&key);
        let key_value = WeakValue {
            value: Value::String(key),
            path: path.clone(),
            delimiter: self.delimiter,
        };
        let decoded = seed.deserialize(key_value).map_err(|e: DecodeError| e.or_path(&path))?;
        self.pending = Some((path, value));
        Ok(Some(decoded))
    }

    fn next_value_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<T::Value, DecodeError> {
        let Some((path, value)) = self.pending.take() else {
            return Err(de::Error::custom("value requested before key"));
        };
        let element = WeakValue {
            value,
            path: path.clone(),
            delimiter: self.delimiter,
        };
        seed.deserialize(element).map_err(|e: DecodeError| e.or_path(&path))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumAccessor<'a> {
    variant: String,
    content: WeakValue<'a>,
}

impl<'de, 'a> EnumAccess<'de> for EnumAccessor<'a> {
    type Error = DecodeError;
    type Variant = WeakValue<'a>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, WeakValue<'a>), DecodeError> {
        let name: de::value::StringDeserializer<DecodeError> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, self.content))
    }
}

impl<'de, 'a> VariantAccess<'de> for WeakValue<'a> {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), DecodeError> {
        match self.value {
            Value::Null => Ok(()),
            _ => Err(self.mismatch("no content for a unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, DecodeError> {
        let path = self.path.clone();
        seed.deserialize(self).map_err(|e: DecodeError| e.or_path(&path))
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        de::Deserializer::deserialize_map(self, visitor)
    }
}
