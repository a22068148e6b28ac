//! Runtime view of arbitrary values.
//!
//! Any `T: Serialize` is walked by a private serde [`Serializer`](ser::Serializer)
//! into a [`Value`] tree. The tree keeps the primitive type of every scalar
//! (`u8` stays distinguishable from `i32`), struct and variant names, and
//! `Option` as an explicit pointer-like layer. [`std::any::type_name`]
//! supplies the concrete name of the top-level value.

use crate::result::CheckError;
use regex::Regex;
use serde::ser::{self, Serialize, SerializeMap, SerializeStruct, SerializeTuple, Serializer};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Struct name `serde_json::value::RawValue` serializes itself under.
pub(crate) const RAW_JSON_TOKEN: &str = "$serde_json::private::RawValue";

static PATH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*::").expect("path prefix regex"));

const TRANSPARENT_WRAPPERS: [&str; 4] = ["Box<", "Rc<", "Arc<", "Cow<"];

/// A reflected value.
#[derive(Debug, Clone)]
pub enum Value {
    /// `()`: a value that carries nothing
    Unit,
    /// `bool`
    Bool(bool),
    /// Signed integer with its primitive type name
    Int {
        /// Value
        value: i128,
        /// `i8` .. `i128`
        ty: &'static str,
    },
    /// Unsigned integer with its primitive type name
    Uint {
        /// Value
        value: u128,
        /// `u8` .. `u128`
        ty: &'static str,
    },
    /// Floating point number with its primitive type name
    Float {
        /// Value
        value: f64,
        /// `f32` or `f64`
        ty: &'static str,
    },
    /// `char`
    Char(char),
    /// Any string-like value
    Str(String),
    /// Buffer serialized through `serialize_bytes`
    Bytes(Vec<u8>),
    /// `Option::None`
    None,
    /// `Option::Some`
    Some(Box<Value>),
    /// Variable length sequence
    Seq(Vec<Value>),
    /// Tuple or fixed-size array
    Tuple(Vec<Value>),
    /// Map entries in iteration order
    Map(Vec<(Value, Value)>),
    /// `struct Marker;`
    UnitStruct(&'static str),
    /// `struct Meters(f64);`
    Newtype {
        /// Struct name
        name: &'static str,
        /// Wrapped value
        value: Box<Value>,
    },
    /// `struct Pair(i32, i32);`
    TupleStruct {
        /// Struct name
        name: &'static str,
        /// Positional fields
        fields: Vec<Value>,
    },
    /// `struct Point { x: i32, y: i32 }`
    Struct {
        /// Struct name
        name: &'static str,
        /// Named fields in declaration order
        fields: Vec<(&'static str, Value)>,
    },
    /// Enum variant
    Variant {
        /// Enum name
        name: &'static str,
        /// Variant index
        index: u32,
        /// Variant name
        variant: &'static str,
        /// Variant data
        payload: Payload,
    },
    /// `serde_json::value::RawValue`
    RawJson(String),
    /// The value's `Serialize` impl failed
    Unrepresentable(String),
}

/// Data carried by an enum variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `Enum::A`
    Unit,
    /// `Enum::A(x)`
    Newtype(Box<Value>),
    /// `Enum::A(x, y)`
    Tuple(Vec<Value>),
    /// `Enum::A { x, y }`
    Struct(Vec<(&'static str, Value)>),
}

impl Value {
    /// `()` or `None`.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Unit | Self::None)
    }

    /// Strip newtype structs down to the value they wrap.
    #[must_use]
    pub fn peel(&self) -> &Self {
        let mut value = self;
        while let Self::Newtype { value: inner, .. } = value {
            value = inner;
        }
        value
    }

    /// Type tag used to decide whether two values have the same shape.
    #[must_use]
    pub fn shape(&self) -> Cow<'static, str> {
        match self {
            Self::Unit => Cow::Borrowed("()"),
            Self::Bool(_) => Cow::Borrowed("bool"),
            Self::Int { ty, .. } | Self::Uint { ty, .. } | Self::Float { ty, .. } => {
                Cow::Borrowed(ty)
            }
            Self::Char(_) => Cow::Borrowed("char"),
            Self::Str(_) => Cow::Borrowed("str"),
            Self::Bytes(_) => Cow::Borrowed("bytes"),
            Self::None | Self::Some(_) => Cow::Borrowed("Option"),
            Self::Seq(_) => Cow::Borrowed("seq"),
            Self::Tuple(items) => Cow::Owned(format!("tuple({})", items.len())),
            Self::Map(_) => Cow::Borrowed("map"),
            Self::UnitStruct(name)
            | Self::Newtype { name, .. }
            | Self::TupleStruct { name, .. }
            | Self::Struct { name, .. }
            | Self::Variant { name, .. } => Cow::Borrowed(name),
            Self::RawJson(_) => Cow::Borrowed("RawValue"),
            Self::Unrepresentable(_) => Cow::Borrowed("<unrepresentable>"),
        }
    }

    /// Number of elements for containers, bytes for strings.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self.peel() {
            Self::Str(s) | Self::RawJson(s) => Some(s.len()),
            Self::Bytes(b) => Some(b.len()),
            Self::Seq(items) | Self::Tuple(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Sequence elements when every one of them is a `u8`.
    pub(crate) fn as_byte_seq(&self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(b) => Some(b.clone()),
            Self::Seq(items) | Self::Tuple(items) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    Self::Uint { value, ty: "u8" } => u8::try_from(*value).ok(),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Sequence elements when every one of them is a `char`.
    pub(crate) fn as_char_seq(&self) -> Option<String> {
        match self {
            Self::Seq(items) | Self::Tuple(items) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    Self::Char(c) => Some(*c),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

fn map_eq(a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.iter().any(|(k, v)| k == key && v == value))
}

impl PartialEq for Value {
    /// Structural equality. Maps compare regardless of entry order, arrays
    /// equal sequences with the same elements, `NaN` never equals anything.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) | (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int { value: a, ty: ta }, Self::Int { value: b, ty: tb }) => a == b && ta == tb,
            (Self::Uint { value: a, ty: ta }, Self::Uint { value: b, ty: tb }) => {
                a == b && ta == tb
            }
            (Self::Float { value: a, ty: ta }, Self::Float { value: b, ty: tb }) => {
                a == b && ta == tb
            }
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b))
            | (Self::RawJson(a), Self::RawJson(b))
            | (Self::Unrepresentable(a), Self::Unrepresentable(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Some(a), Self::Some(b)) => a == b,
            (Self::Seq(a) | Self::Tuple(a), Self::Seq(b) | Self::Tuple(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => map_eq(a, b),
            (Self::UnitStruct(a), Self::UnitStruct(b)) => a == b,
            (
                Self::Newtype { name: na, value: a },
                Self::Newtype { name: nb, value: b },
            ) => na == nb && a == b,
            (
                Self::TupleStruct { name: na, fields: a },
                Self::TupleStruct { name: nb, fields: b },
            ) => na == nb && a == b,
            (Self::Struct { name: na, fields: a }, Self::Struct { name: nb, fields: b }) => {
                na == nb && a == b
            }
            (
                Self::Variant {
                    name: na,
                    variant: va,
                    payload: a,
                    ..
                },
                Self::Variant {
                    name: nb,
                    variant: vb,
                    payload: b,
                    ..
                },
            ) => na == nb && va == vb && a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    #[allow(clippy::cast_possible_truncation)]
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unit => s.serialize_unit(),
            Self::Bool(v) => s.serialize_bool(*v),
            Self::Int { value, ty } => match *ty {
                "i8" => s.serialize_i8(*value as i8),
                "i16" => s.serialize_i16(*value as i16),
                "i32" => s.serialize_i32(*value as i32),
                "i64" => s.serialize_i64(*value as i64),
                _ => s.serialize_i128(*value),
            },
            Self::Uint { value, ty } => match *ty {
                "u8" => s.serialize_u8(*value as u8),
                "u16" => s.serialize_u16(*value as u16),
                "u32" => s.serialize_u32(*value as u32),
                "u64" => s.serialize_u64(*value as u64),
                _ => s.serialize_u128(*value),
            },
            Self::Float { value, ty } => match *ty {
                "f32" => s.serialize_f32(*value as f32),
                _ => s.serialize_f64(*value),
            },
            Self::Char(c) => s.serialize_char(*c),
            Self::Str(v) => s.serialize_str(v),
            Self::Bytes(v) => s.serialize_bytes(v),
            Self::None => s.serialize_none(),
            Self::Some(v) => s.serialize_some(v.as_ref()),
            Self::Seq(items) => s.collect_seq(items),
            Self::Tuple(items) => {
                let mut tuple = s.serialize_tuple(items.len())?;
                for item in items {
                    tuple.serialize_element(item)?;
                }
                tuple.end()
            }
            Self::Map(entries) => {
                let mut map = s.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::UnitStruct(name) => s.serialize_unit_struct(name),
            Self::Newtype { name, value } => s.serialize_newtype_struct(name, value.as_ref()),
            Self::TupleStruct { name, fields } => {
                use ser::SerializeTupleStruct;
                let mut st = s.serialize_tuple_struct(name, fields.len())?;
                for field in fields {
                    st.serialize_field(field)?;
                }
                st.end()
            }
            Self::Struct { name, fields } => {
                let mut st = s.serialize_struct(name, fields.len())?;
                for (key, field) in fields {
                    st.serialize_field(key, field)?;
                }
                st.end()
            }
            Self::Variant {
                name,
                index,
                variant,
                payload,
            } => match payload {
                Payload::Unit => s.serialize_unit_variant(name, *index, variant),
                Payload::Newtype(v) => {
                    s.serialize_newtype_variant(name, *index, variant, v.as_ref())
                }
                Payload::Tuple(fields) => {
                    use ser::SerializeTupleVariant;
                    let mut tv = s.serialize_tuple_variant(name, *index, variant, fields.len())?;
                    for field in fields {
                        tv.serialize_field(field)?;
                    }
                    tv.end()
                }
                Payload::Struct(fields) => {
                    use ser::SerializeStructVariant;
                    let mut sv =
                        s.serialize_struct_variant(name, *index, variant, fields.len())?;
                    for (key, field) in fields {
                        sv.serialize_field(key, field)?;
                    }
                    sv.end()
                }
            },
            Self::RawJson(json) => {
                let mut st = s.serialize_struct(RAW_JSON_TOKEN, 1)?;
                st.serialize_field(RAW_JSON_TOKEN, json)?;
                st.end()
            }
            Self::Unrepresentable(message) => Err(ser::Error::custom(message)),
        }
    }
}

/// A value together with the name of its static type.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflected {
    /// Reflected value
    pub value: Value,
    /// `std::any::type_name` of the reflected type
    pub type_name: &'static str,
}

impl Reflected {
    /// Type name without module paths.
    #[must_use]
    pub fn short_type(&self) -> String {
        short_type_name(self.type_name)
    }

    /// Type name used to decide if two values are comparable.
    #[must_use]
    pub fn canonical_type(&self) -> String {
        canonical_type_name(&self.short_type())
    }
}

/// Reflect any serializable value. Never fails: a failing `Serialize` impl
/// yields [`Value::Unrepresentable`].
pub fn reflect<T: Serialize + ?Sized>(value: &T) -> Reflected {
    let value = value
        .serialize(ValueSerializer)
        .unwrap_or_else(|err| Value::Unrepresentable(err.to_string()));
    Reflected {
        value,
        type_name: std::any::type_name::<T>(),
    }
}

/// `alloc::vec::Vec<core::option::Option<u8>>` -> `Vec<Option<u8>>`
#[must_use]
pub fn short_type_name(name: &str) -> String {
    PATH_PREFIX.replace_all(name, "").into_owned()
}

/// Drop references and smart pointers that serialize transparently.
#[must_use]
pub fn strip_indirection(mut name: &str) -> &str {
    loop {
        if let Some(rest) = name.strip_prefix("&mut ") {
            name = rest;
            continue;
        }
        if let Some(rest) = name.strip_prefix('&') {
            name = rest;
            continue;
        }
        let unwrapped = TRANSPARENT_WRAPPERS.iter().find_map(|wrapper| {
            name.strip_prefix(wrapper)
                .and_then(|rest| rest.strip_suffix('>'))
        });
        match unwrapped {
            Some(inner) => name = inner,
            None => return name,
        }
    }
}

/// `Option<T>` -> `T`
#[must_use]
pub fn option_inner(name: &str) -> Option<&str> {
    strip_indirection(name)
        .strip_prefix("Option<")
        .and_then(|rest| rest.strip_suffix('>'))
}

/// Canonical form of a short type name: indirections stripped, `str` is
/// `String`, slices and arrays are `Vec`.
#[must_use]
pub fn canonical_type_name(name: &str) -> String {
    let name = strip_indirection(name);
    if name == "str" {
        return "String".to_string();
    }
    if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
        let elem = array_element(inner).unwrap_or(inner);
        return format!("Vec<{}>", canonical_type_name(elem));
    }
    name.to_string()
}

/// `u8; 4` -> `u8`, honoring nested brackets.
fn array_element(inner: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '[' | '<' | '(' => depth += 1,
            ']' | '>' | ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => return Some(inner[..i].trim_end()),
            _ => {}
        }
    }
    None
}

/// `HashMap<String, Vec<u8>>` -> `("HashMap", ["String", "Vec<u8>"])`
#[must_use]
pub fn generic_args(name: &str) -> Option<(&str, Vec<&str>)> {
    let open = name.find('<')?;
    let inner = name[open + 1..].strip_suffix('>')?;
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    Some((&name[..open], args))
}

/// Element type of a canonical `Vec<T>`.
#[must_use]
pub fn element_type(canonical: &str) -> Option<&str> {
    canonical
        .strip_prefix("Vec<")
        .and_then(|rest| rest.strip_suffix('>'))
}

struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = CheckError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = StructBuilder;
    type SerializeStructVariant = StructBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, CheckError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, CheckError> {
        Ok(Value::Int {
            value: v.into(),
            ty: "i8",
        })
    }

    fn serialize_i16(self, v: i16) -> Result<Value, CheckError> {
        Ok(Value::Int {
            value: v.into(),
            ty: "i16",
        })
    }

    fn serialize_i32(self, v: i32) -> Result<Value, CheckError> {
        Ok(Value::Int {
            value: v.into(),
            ty: "i32",
        })
    }

    fn serialize_i64(self, v: i64) -> Result<Value, CheckError> {
        Ok(Value::Int {
            value: v.into(),
            ty: "i64",
        })
    }

    fn serialize_i128(self, v: i128) -> Result<Value, CheckError> {
        Ok(Value::Int {
            value: v,
            ty: "i128",
        })
    }

    fn serialize_u8(self, v: u8) -> Result<Value, CheckError> {
        Ok(Value::Uint {
            value: v.into(),
            ty: "u8",
        })
    }

    fn serialize_u16(self, v: u16) -> Result<Value, CheckError> {
        Ok(Value::Uint {
            value: v.into(),
            ty: "u16",
        })
    }

    fn serialize_u32(self, v: u32) -> Result<Value, CheckError> {
        Ok(Value::Uint {
            value: v.into(),
            ty: "u32",
        })
    }

    fn serialize_u64(self, v: u64) -> Result<Value, CheckError> {
        Ok(Value::Uint {
            value: v.into(),
            ty: "u64",
        })
    }

    fn serialize_u128(self, v: u128) -> Result<Value, CheckError> {
        Ok(Value::Uint {
            value: v,
            ty: "u128",
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Value, CheckError> {
        Ok(Value::Float {
            value: v.into(),
            ty: "f32",
        })
    }

    fn serialize_f64(self, v: f64) -> Result<Value, CheckError> {
        Ok(Value::Float {
            value: v,
            ty: "f64",
        })
    }

    fn serialize_char(self, v: char) -> Result<Value, CheckError> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value, CheckError> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, CheckError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value, CheckError> {
        Ok(Value::None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, CheckError> {
        Ok(Value::Some(Box::new(value.serialize(self)?)))
    }

    fn serialize_unit(self) -> Result<Value, CheckError> {
        Ok(Value::Unit)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, CheckError> {
        Ok(Value::UnitStruct(name))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
    ) -> Result<Value, CheckError> {
        Ok(Value::Variant {
            name,
            index,
            variant,
            payload: Payload::Unit,
        })
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, CheckError> {
        Ok(Value::Newtype {
            name,
            value: Box::new(value.serialize(self)?),
        })
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, CheckError> {
        Ok(Value::Variant {
            name,
            index,
            variant,
            payload: Payload::Newtype(Box::new(value.serialize(self)?)),
        })
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, CheckError> {
        Ok(SeqBuilder::new(SeqKind::Seq, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, CheckError> {
        Ok(SeqBuilder::new(SeqKind::Tuple, len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, CheckError> {
        Ok(SeqBuilder::new(SeqKind::TupleStruct(name), len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, CheckError> {
        Ok(SeqBuilder::new(
            SeqKind::Variant {
                name,
                index,
                variant,
            },
            len,
        ))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, CheckError> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<StructBuilder, CheckError> {
        Ok(StructBuilder {
            name,
            variant: None,
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructBuilder, CheckError> {
        Ok(StructBuilder {
            name,
            variant: Some((index, variant)),
            fields: Vec::with_capacity(len),
        })
    }
}

enum SeqKind {
    Seq,
    Tuple,
    TupleStruct(&'static str),
    Variant {
        name: &'static str,
        index: u32,
        variant: &'static str,
    },
}

struct SeqBuilder {
    kind: SeqKind,
    items: Vec<Value>,
}

impl SeqBuilder {
    fn new(kind: SeqKind, len: usize) -> Self {
        Self {
            kind,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CheckError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        match self.kind {
            SeqKind::Seq => Value::Seq(self.items),
            SeqKind::Tuple => Value::Tuple(self.items),
            SeqKind::TupleStruct(name) => Value::TupleStruct {
                name,
                fields: self.items,
            },
            SeqKind::Variant {
                name,
                index,
                variant,
            } => Value::Variant {
                name,
                index,
                variant,
                payload: Payload::Tuple(self.items),
            },
        }
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = CheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CheckError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CheckError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = CheckError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CheckError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CheckError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CheckError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CheckError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CheckError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CheckError> {
        Ok(self.finish())
    }
}

struct MapBuilder {
    entries: Vec<(Value, Value)>,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = CheckError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CheckError> {
        self.pending_key = Some(key.serialize(ValueSerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CheckError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| <CheckError as ser::Error>::custom("map value without a key"))?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, CheckError> {
        Ok(Value::Map(self.entries))
    }
}

struct StructBuilder {
    name: &'static str,
    variant: Option<(u32, &'static str)>,
    fields: Vec<(&'static str, Value)>,
}

impl StructBuilder {
    fn push<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CheckError> {
        self.fields.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn finish(mut self) -> Value {
        if self.name == RAW_JSON_TOKEN && self.fields.len() == 1 {
            if let Some((_, Value::Str(json))) = self.fields.pop() {
                return Value::RawJson(json);
            }
        }
        match self.variant {
            Some((index, variant)) => Value::Variant {
                name: self.name,
                index,
                variant,
                payload: Payload::Struct(self.fields),
            },
            None => Value::Struct {
                name: self.name,
                fields: self.fields,
            },
        }
    }
}

impl ser::SerializeStruct for StructBuilder {
    type Ok = Value;
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CheckError> {
        self.push(key, value)
    }

    fn end(self) -> Result<Value, CheckError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for StructBuilder {
    type Ok = Value;
    type Error = CheckError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CheckError> {
        self.push(key, value)
    }

    fn end(self) -> Result<Value, CheckError> {
        Ok(self.finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize)]
    struct Meters(f64);

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Circle(f64),
        Rect { w: u32, h: u32 },
    }

    struct Broken;

    impl Serialize for Broken {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(ser::Error::custom("broken on purpose"))
        }
    }

    mod scalars {
        use super::*;

        #[test]
        fn test_primitive_types_are_kept() {
            assert_eq!(reflect(&7u8).value, Value::Uint { value: 7, ty: "u8" });
            assert_eq!(reflect(&-7i64).value, Value::Int { value: -7, ty: "i64" });
            assert_eq!(reflect(&'x').value, Value::Char('x'));
            assert_eq!(reflect("abc").value, Value::Str("abc".into()));
            assert_ne!(reflect(&7u8).value, reflect(&7u16).value);
        }

        #[test]
        fn test_unit_and_option() {
            assert!(reflect(&()).value.is_nil());
            assert!(reflect(&None::<i32>).value.is_nil());
            assert_eq!(
                reflect(&Some(1i32)).value,
                Value::Some(Box::new(Value::Int { value: 1, ty: "i32" }))
            );
        }

        #[test]
        fn test_nan_is_not_equal_to_itself() {
            assert_ne!(reflect(&f64::NAN).value, reflect(&f64::NAN).value);
        }

        #[test]
        fn test_failing_serialize_is_unrepresentable() {
            let r = reflect(&Broken);
            assert!(matches!(r.value, Value::Unrepresentable(ref m) if m.contains("broken on purpose")));
        }
    }

    mod composites {
        use super::*;

        #[test]
        fn test_struct_fields_in_order() {
            let r = reflect(&Point { x: 1, y: 2 });
            match r.value {
                Value::Struct { name, fields } => {
                    assert_eq!(name, "Point");
                    assert_eq!(fields[0].0, "x");
                    assert_eq!(fields[1].0, "y");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_enum_variants() {
            assert!(matches!(
                reflect(&Shape::Dot).value,
                Value::Variant { variant: "Dot", payload: Payload::Unit, .. }
            ));
            assert!(matches!(
                reflect(&Shape::Circle(1.0)).value,
                Value::Variant { variant: "Circle", payload: Payload::Newtype(_), .. }
            ));
            assert!(matches!(
                reflect(&Shape::Rect { w: 1, h: 2 }).value,
                Value::Variant { variant: "Rect", payload: Payload::Struct(_), .. }
            ));
        }

        #[test]
        fn test_newtype_peels() {
            let r = reflect(&Meters(4.5));
            assert_eq!(r.value.shape(), "Meters");
            assert_eq!(
                r.value.peel(),
                &Value::Float {
                    value: 4.5,
                    ty: "f64"
                }
            );
        }

        #[test]
        fn test_map_equality_ignores_order() {
            let hashed: HashMap<i32, i32> = (0..32).map(|i| (i, i * i)).collect();
            let sorted: BTreeMap<i32, i32> = (0..32).map(|i| (i, i * i)).collect();
            assert_eq!(reflect(&hashed).value, reflect(&sorted).value);
        }

        #[test]
        fn test_array_equals_vec() {
            assert_eq!(reflect(&[1, 2, 3]).value, reflect(&vec![1, 2, 3]).value);
        }

        #[test]
        fn test_byte_and_char_sequences() {
            assert_eq!(reflect(&b"hi".to_vec()).value.as_byte_seq(), Some(b"hi".to_vec()));
            assert_eq!(reflect(&vec!['h', 'i']).value.as_char_seq(), Some("hi".into()));
            assert_eq!(reflect(&Vec::<u8>::new()).value.as_byte_seq(), None);
            assert_eq!(reflect(&vec![1i32]).value.as_byte_seq(), None);
        }

        #[test]
        fn test_raw_json_is_recognized() {
            let raw = serde_json::value::RawValue::from_string(r#"{"a":1}"#.to_string()).unwrap();
            assert_eq!(reflect(&raw).value, Value::RawJson(r#"{"a":1}"#.into()));
        }

        #[test]
        fn test_len() {
            assert_eq!(reflect("héllo").value.len(), Some(6));
            assert_eq!(reflect(&vec![1, 2]).value.len(), Some(2));
            assert_eq!(reflect(&Point { x: 1, y: 2 }).value.len(), None);
        }

        #[test]
        fn test_value_serializes_back() {
            let original = reflect(&Shape::Rect { w: 3, h: 4 }).value;
            let again = reflect(&original).value;
            assert_eq!(original, again);
            let json = serde_json::to_string(&reflect(&Point { x: 1, y: 2 }).value).unwrap();
            assert_eq!(json, r#"{"x":1,"y":2}"#);
        }
    }

    mod type_names {
        use super::*;

        #[test]
        fn test_short_type_name() {
            assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec<u8>");
            assert_eq!(
                short_type_name("core::option::Option<alloc::string::String>"),
                "Option<String>"
            );
            assert_eq!(reflect(&String::new()).short_type(), "String");
        }

        #[test]
        fn test_strip_indirection() {
            assert_eq!(strip_indirection("&&mut Box<Rc<i32>>"), "i32");
            assert_eq!(strip_indirection("Cow<str>"), "str");
            assert_eq!(strip_indirection("Option<i32>"), "Option<i32>");
        }

        #[test]
        fn test_option_inner() {
            assert_eq!(option_inner("&Option<Vec<u8>>"), Some("Vec<u8>"));
            assert_eq!(option_inner("Vec<u8>"), None);
        }

        #[test]
        fn test_canonical_type_name() {
            assert_eq!(canonical_type_name("&str"), "String");
            assert_eq!(canonical_type_name("[u8]"), "Vec<u8>");
            assert_eq!(canonical_type_name("[u8; 4]"), "Vec<u8>");
            assert_eq!(canonical_type_name("[[u8; 2]; 3]"), "Vec<Vec<u8>>");
            assert_eq!(canonical_type_name("&[&str]"), "Vec<String>");
            assert_eq!(reflect(&"x").canonical_type(), reflect(&String::new()).canonical_type());
        }

        #[test]
        fn test_generic_args() {
            assert_eq!(
                generic_args("HashMap<String, Vec<(u8, i32)>>"),
                Some(("HashMap", vec!["String", "Vec<(u8, i32)>"]))
            );
            assert_eq!(generic_args("Vec<u8>"), Some(("Vec", vec!["u8"])));
            assert_eq!(generic_args("String"), None);
        }

        #[test]
        fn test_element_type() {
            assert_eq!(element_type("Vec<u8>"), Some("u8"));
            assert_eq!(element_type("String"), None);
        }
    }
}
