//! Predicates behind every checker.
//!
//! Mismatching data yields `false`. Passing a value of a shape a predicate
//! cannot handle (ordering a struct, probing a `Vec<i32>` with a `u8`, a
//! malformed regex) is a bug in the test and panics with
//! `"<predicate>: <what went wrong>"`.

use crate::reflect::{self, Reflected, Value};
use crate::result::{CheckError, CheckResult};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::value::RawValue;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{self, Display};
use std::time::{Duration, SystemTime};

const SEQUENCES: [&str; 6] = ["Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet", "BinaryHeap"];
const MAPS: [&str; 2] = ["HashMap", "BTreeMap"];

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

/// Native equality. Chrono date-times compare by instant here, whatever
/// their zone.
pub fn equal<A: PartialEq<E> + ?Sized, E: ?Sized>(actual: &A, expected: &E) -> bool {
    actual.eq(expected)
}

/// Byte-wise equality of two buffers.
#[must_use]
pub fn bytes_equal(actual: &[u8], expected: &[u8]) -> bool {
    actual == expected
}

/// Structural equality: same canonical type and the same reflected content.
///
/// Diverges from [`equal`] for zoned date-times: the same instant in two
/// zones is `equal` but serializes differently, so it is not `deep_equal`.
pub fn deep_equal<A: Serialize + ?Sized, E: Serialize + ?Sized>(actual: &A, expected: &E) -> bool {
    deep_equal_reflected(&reflect::reflect(actual), &reflect::reflect(expected))
}

/// [`deep_equal`] over already reflected values.
#[must_use]
pub fn deep_equal_reflected(actual: &Reflected, expected: &Reflected) -> bool {
    actual.canonical_type() == expected.canonical_type() && actual.value == expected.value
}

/// `actual` and `expected` have the same static type.
pub fn has_type<A: ?Sized + 'static, E: ?Sized + 'static>(_actual: &A, _expected: &E) -> bool {
    TypeId::of::<A>() == TypeId::of::<E>()
}

// ---------------------------------------------------------------------------
// Zero values
// ---------------------------------------------------------------------------

/// Zero value test.
///
/// Nil, `false`, `0`, `'\0'` and empty strings, sequences, maps and byte
/// buffers are zero. Arrays and tuples are zero when every element is, or,
/// when an element holds a sequence or map, only when empty.
/// Structs are zero when every field is, but only if no field holds a
/// sequence or map at any depth. `Some(_)` and enum variants never are.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Unit | Value::None | Value::UnitStruct(_) => true,
        Value::Bool(v) => !v,
        Value::Int { value, .. } => *value == 0,
        Value::Uint { value, .. } => *value == 0,
        Value::Float { value, .. } => *value == 0.0,
        Value::Char(c) => *c == '\0',
        Value::Str(s) | Value::RawJson(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        Value::Seq(items) => items.is_empty(),
        Value::Map(entries) => entries.is_empty(),
        Value::Tuple(items) if items.iter().all(comparable) => items.iter().all(is_zero),
        Value::Tuple(items) => items.is_empty(),
        Value::Newtype { value, .. } => is_zero(value),
        Value::TupleStruct { fields, .. } => {
            fields.iter().all(comparable) && fields.iter().all(is_zero)
        }
        Value::Struct { fields, .. } => {
            fields.iter().all(|(_, f)| comparable(f)) && fields.iter().all(|(_, f)| is_zero(f))
        }
        Value::Some(_) | Value::Variant { .. } | Value::Unrepresentable(_) => false,
    }
}

/// Serializable zero value test.
pub fn zero<T: Serialize + ?Sized>(value: &T) -> bool {
    is_zero(&reflect::reflect(value).value)
}

fn comparable(value: &Value) -> bool {
    match value {
        Value::Seq(_) | Value::Map(_) | Value::Bytes(_) => false,
        Value::Some(inner) | Value::Newtype { value: inner, .. } => comparable(inner),
        Value::Tuple(items) | Value::TupleStruct { fields: items, .. } => {
            items.iter().all(comparable)
        }
        Value::Struct { fields, .. } => fields.iter().all(|(_, f)| comparable(f)),
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Orderable projection of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Ordinal {
    /// Signed integer
    Int(i128),
    /// Unsigned integer or `char`
    Uint(u128),
    /// Floating point number
    Float(f64),
    /// String
    Text(String),
    /// Point in time
    Instant(DateTime<Utc>),
    /// Length of time
    Span(Duration),
}

impl Ordinal {
    /// Kind name used in contract violation messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "signed integer",
            Self::Uint(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Instant(_) => "instant",
            Self::Span(_) => "duration",
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Uint(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Uint(v) => i128::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Compare two ordinals. `None` when a float is `NaN`.
    ///
    /// # Panics
    ///
    /// When the two kinds cannot be ordered against each other.
    #[must_use]
    pub fn compare(&self, other: &Self, op: &str) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Uint(a), Self::Uint(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Uint(b)) => Some(match u128::try_from(*a) {
                Ok(a) => a.cmp(b),
                Err(_) => Ordering::Less,
            }),
            (Self::Uint(_), Self::Int(_)) => other.compare(self, op).map(Ordering::reverse),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Instant(a), Self::Instant(b)) => Some(a.cmp(b)),
            (Self::Span(a), Self::Span(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => panic!("{op}: cannot order {} against {}", a.kind(), b.kind()),
            },
        }
    }
}

/// Values that can be ordered: numbers, strings, chars, durations and
/// points in time.
pub trait Ordered {
    /// Orderable projection of `self`.
    ///
    /// # Panics
    ///
    /// When `self` has no order, like `None` or a reflected struct.
    fn ordinal(&self) -> Ordinal;
}

macro_rules! ordered_via {
    ($variant:ident, $wide:ty; $($ty:ty),*) => {
        $(
            impl Ordered for $ty {
                #[allow(clippy::cast_lossless, clippy::cast_possible_wrap)]
                fn ordinal(&self) -> Ordinal {
                    Ordinal::$variant(*self as $wide)
                }
            }
        )*
    };
}

ordered_via!(Int, i128; i8, i16, i32, i64, i128, isize);
ordered_via!(Uint, u128; u8, u16, u32, u64, u128, usize);
ordered_via!(Float, f64; f32, f64);

impl Ordered for char {
    fn ordinal(&self) -> Ordinal {
        Ordinal::Uint(u128::from(u32::from(*self)))
    }
}

impl Ordered for str {
    fn ordinal(&self) -> Ordinal {
        Ordinal::Text(self.to_string())
    }
}

impl Ordered for String {
    fn ordinal(&self) -> Ordinal {
        Ordinal::Text(self.clone())
    }
}

impl Ordered for Duration {
    fn ordinal(&self) -> Ordinal {
        Ordinal::Span(*self)
    }
}

impl Ordered for SystemTime {
    fn ordinal(&self) -> Ordinal {
        Ordinal::Instant(DateTime::<Utc>::from(*self))
    }
}

impl<Tz: TimeZone> Ordered for DateTime<Tz> {
    fn ordinal(&self) -> Ordinal {
        Ordinal::Instant(self.with_timezone(&Utc))
    }
}

impl Ordered for NaiveDateTime {
    fn ordinal(&self) -> Ordinal {
        Ordinal::Instant(Utc.from_utc_datetime(self))
    }
}

impl<T: Ordered + ?Sized> Ordered for &T {
    fn ordinal(&self) -> Ordinal {
        (**self).ordinal()
    }
}

impl<T: Ordered + ?Sized> Ordered for Box<T> {
    fn ordinal(&self) -> Ordinal {
        (**self).ordinal()
    }
}

impl<T: Ordered> Ordered for Option<T> {
    fn ordinal(&self) -> Ordinal {
        match self {
            Some(value) => value.ordinal(),
            None => panic!("cannot order None"),
        }
    }
}

impl Ordered for Value {
    fn ordinal(&self) -> Ordinal {
        match self.peel() {
            Self::Int { value, .. } => Ordinal::Int(*value),
            Self::Uint { value, .. } => Ordinal::Uint(*value),
            Self::Float { value, .. } => Ordinal::Float(*value),
            Self::Char(c) => c.ordinal(),
            Self::Str(s) => Ordinal::Text(s.clone()),
            Self::Some(inner) => inner.ordinal(),
            other => panic!("cannot order a value of shape {}", other.shape()),
        }
    }
}

impl Ordered for Reflected {
    fn ordinal(&self) -> Ordinal {
        self.value.ordinal()
    }
}

fn order<A: Ordered + ?Sized, E: Ordered + ?Sized>(op: &str, a: &A, e: &E) -> Option<Ordering> {
    a.ordinal().compare(&e.ordinal(), op)
}

/// `actual < expected`
pub fn less<A: Ordered + ?Sized, E: Ordered + ?Sized>(actual: &A, expected: &E) -> bool {
    order("less", actual, expected) == Some(Ordering::Less)
}

/// `actual <= expected`
pub fn less_or_equal<A: Ordered + ?Sized, E: Ordered + ?Sized>(actual: &A, expected: &E) -> bool {
    matches!(
        order("less_or_equal", actual, expected),
        Some(Ordering::Less | Ordering::Equal)
    )
}

/// `actual > expected`
pub fn greater<A: Ordered + ?Sized, E: Ordered + ?Sized>(actual: &A, expected: &E) -> bool {
    order("greater", actual, expected) == Some(Ordering::Greater)
}

/// `actual >= expected`
pub fn greater_or_equal<A: Ordered + ?Sized, E: Ordered + ?Sized>(
    actual: &A,
    expected: &E,
) -> bool {
    matches!(
        order("greater_or_equal", actual, expected),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

/// `min < actual < max`
pub fn between<A, L, H>(actual: &A, min: &L, max: &H) -> bool
where
    A: Ordered + ?Sized,
    L: Ordered + ?Sized,
    H: Ordered + ?Sized,
{
    order("between", min, actual) == Some(Ordering::Less)
        && order("between", actual, max) == Some(Ordering::Less)
}

/// `min <= actual <= max`
pub fn between_or_equal<A, L, H>(actual: &A, min: &L, max: &H) -> bool
where
    A: Ordered + ?Sized,
    L: Ordered + ?Sized,
    H: Ordered + ?Sized,
{
    let le = |o| matches!(o, Some(Ordering::Less | Ordering::Equal));
    le(order("between_or_equal", min, actual)) && le(order("between_or_equal", actual, max))
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// `|actual - expected| <= delta`.
///
/// Numbers take a numeric delta. Instants take a [`Duration`] delta.
///
/// # Panics
///
/// On a negative or `NaN` delta, and on operands that are neither numbers
/// nor instants.
pub fn in_delta<A, E, D>(actual: &A, expected: &E, delta: &D) -> bool
where
    A: Ordered + ?Sized,
    E: Ordered + ?Sized,
    D: Ordered + ?Sized,
{
    let (a, e, d) = (actual.ordinal(), expected.ordinal(), delta.ordinal());
    match (&a, &e, &d) {
        (Ordinal::Instant(a), Ordinal::Instant(e), Ordinal::Span(d)) => {
            let distance = if a > e { *a - *e } else { *e - *a };
            chrono::Duration::from_std(*d).map_or(true, |d| distance <= d)
        }
        _ => {
            let distance = numeric_distance("in_delta", &a, &e);
            match (&d, distance) {
                (Ordinal::Int(d), _) if *d < 0 => panic!("in_delta: negative delta {d}"),
                (Ordinal::Int(_) | Ordinal::Uint(_), Distance::Exact(distance)) => {
                    let d = d.as_i128().map_or(u128::MAX, i128::unsigned_abs);
                    distance <= d
                }
                (_, distance) => match d.as_f64() {
                    Some(d) if d >= 0.0 => distance.as_f64() <= d,
                    Some(d) => panic!("in_delta: delta must be non-negative, got {d}"),
                    None => panic!("in_delta: delta must be a number, got a {}", d.kind()),
                },
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Distance {
    Exact(u128),
    Approx(f64),
}

impl Distance {
    #[allow(clippy::cast_precision_loss)]
    const fn as_f64(self) -> f64 {
        match self {
            Self::Exact(v) => v as f64,
            Self::Approx(v) => v,
        }
    }
}

fn numeric_distance(op: &str, a: &Ordinal, e: &Ordinal) -> Distance {
    if let (Some(a), Some(e)) = (a.as_i128(), e.as_i128()) {
        if let Some(d) = a.checked_sub(e) {
            return Distance::Exact(d.unsigned_abs());
        }
    }
    match (a.as_f64(), e.as_f64()) {
        (Some(a), Some(e)) => Distance::Approx((a - e).abs()),
        _ => panic!("{op}: expected numbers, got {} and {}", a.kind(), e.kind()),
    }
}

/// Symmetric mean absolute percentage error of a single pair, in `[0, 100]`.
#[must_use]
pub fn smape(actual: f64, expected: f64) -> f64 {
    if actual == 0.0 && expected == 0.0 {
        return 0.0;
    }
    100.0 * (actual - expected).abs() / (actual.abs() + expected.abs())
}

/// SMAPE of `actual` and `expected` is at most `max_smape` percent.
///
/// # Panics
///
/// When `max_smape` is outside `(0, 100]` or an operand is not a number.
pub fn in_smape<A: Ordered + ?Sized, E: Ordered + ?Sized>(
    actual: &A,
    expected: &E,
    max_smape: f64,
) -> bool {
    assert!(
        max_smape > 0.0 && max_smape <= 100.0,
        "in_smape: smape must be in (0, 100], got {max_smape}"
    );
    let (a, e) = (actual.ordinal(), expected.ordinal());
    match (a.as_f64(), e.as_f64()) {
        (Some(a), Some(e)) => smape(a, e) <= max_smape,
        _ => panic!("in_smape: expected numbers, got {} and {}", a.kind(), e.kind()),
    }
}

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

/// Substring, element or map value containment.
///
/// # Panics
///
/// When `container` is not a string, sequence, byte buffer or map, or when
/// the needle type differs from the element type.
pub fn contains<A: Serialize + ?Sized, E: Serialize + ?Sized>(container: &A, needle: &E) -> bool {
    contains_reflected(&reflect::reflect(container), &reflect::reflect(needle))
}

/// [`contains`] over already reflected values.
#[must_use]
pub fn contains_reflected(container: &Reflected, needle: &Reflected) -> bool {
    let sought = needle.value.peel();
    match container.value.peel() {
        Value::Str(haystack) => match sought {
            Value::Str(needle) => haystack.contains(needle.as_str()),
            Value::Char(c) => haystack.contains(*c),
            other => panic!("contains: cannot look for {} in a string", other.shape()),
        },
        Value::Bytes(bytes) => match sought {
            Value::Uint { value, ty: "u8" } => {
                u8::try_from(*value).is_ok_and(|b| bytes.contains(&b))
            }
            other => panic!("contains: cannot look for {} in bytes", other.shape()),
        },
        Value::Seq(items) | Value::Tuple(items) => {
            let declared = element_of(&container.canonical_type(), &SEQUENCES, 0);
            check_element_type("contains", declared, items.iter(), needle);
            items.iter().any(|item| item == &needle.value)
        }
        Value::Map(entries) => {
            let declared = element_of(&container.canonical_type(), &MAPS, 1);
            check_element_type("contains", declared, entries.iter().map(|(_, v)| v), needle);
            entries.iter().any(|(_, v)| v == &needle.value)
        }
        other => panic!("contains: {} is not a container", other.shape()),
    }
}

/// Map key presence.
///
/// # Panics
///
/// When `map` is not a map or the needle type differs from the key type.
pub fn has_key<A: Serialize + ?Sized, K: Serialize + ?Sized>(map: &A, key: &K) -> bool {
    let (map, key) = (reflect::reflect(map), reflect::reflect(key));
    match map.value.peel() {
        Value::Map(entries) => {
            let declared = element_of(&map.canonical_type(), &MAPS, 0);
            check_element_type("has_key", declared, entries.iter().map(|(k, _)| k), &key);
            entries.iter().any(|(k, _)| k == &key.value)
        }
        other => panic!("has_key: {} is not a map", other.shape()),
    }
}

/// Declared element type of a known collection, canonicalized.
fn element_of(container: &str, kinds: &[&str], arg: usize) -> Option<String> {
    if let Some(elem) = reflect::element_type(container) {
        return Some(reflect::canonical_type_name(elem));
    }
    let (base, args) = reflect::generic_args(container)?;
    if !kinds.contains(&base) {
        return None;
    }
    args.get(arg).map(|a| reflect::canonical_type_name(a))
}

fn check_element_type<'a>(
    op: &str,
    declared: Option<String>,
    mut elements: impl Iterator<Item = &'a Value>,
    needle: &Reflected,
) {
    if let Some(declared) = declared {
        let needle_type = needle.canonical_type();
        assert!(
            declared == needle_type,
            "{op}: value of type {needle_type} does not match element type {declared}"
        );
        return;
    }
    let shape = needle.value.shape();
    let mut seen = false;
    let matched = elements.any(|element| {
        seen = true;
        element.shape() == shape
    });
    assert!(
        matched || !seen,
        "{op}: value of shape {shape} does not match the element shape"
    );
}

/// Length of a string (in bytes), sequence, map or byte buffer.
///
/// # Panics
///
/// When the value has no length.
pub fn len<T: Serialize + ?Sized>(value: &T) -> usize {
    let reflected = reflect::reflect(value);
    reflected.value.len().unwrap_or_else(|| {
        panic!(
            "len: {} ({}) has no length",
            reflected.short_type(),
            reflected.value.shape()
        )
    })
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Values with a text form: strings, byte and char sequences, errors (their
/// message) and [`Displayed`] values. `None` has no text.
pub trait Text {
    /// Text form of `self`.
    fn text(&self) -> Option<Cow<'_, str>>;
}

/// Any `Display` value, checked through its rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displayed<T>(pub T);

impl<T: Display> Text for Displayed<T> {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.0.to_string()))
    }
}

impl Text for str {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl Text for String {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl Text for Cow<'_, str> {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl Text for char {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

impl Text for [u8] {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(String::from_utf8_lossy(self))
    }
}

impl Text for Vec<u8> {
    fn text(&self) -> Option<Cow<'_, str>> {
        self.as_slice().text()
    }
}

impl Text for [char] {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.iter().collect()))
    }
}

impl Text for Vec<char> {
    fn text(&self) -> Option<Cow<'_, str>> {
        self.as_slice().text()
    }
}

impl Text for RawValue {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.get()))
    }
}

impl<T: Text + ?Sized> Text for &T {
    fn text(&self) -> Option<Cow<'_, str>> {
        (**self).text()
    }
}

impl<T: Text + ?Sized> Text for Box<T> {
    fn text(&self) -> Option<Cow<'_, str>> {
        (**self).text()
    }
}

impl<T: Text> Text for Option<T> {
    fn text(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(Text::text)
    }
}

/// Errors usable with [`error_is`]. `None` stands for "no error".
pub trait ErrorValue {
    /// `self` as an error, if it is one.
    fn as_error(&self) -> Option<&(dyn Error + 'static)>;
}

impl ErrorValue for dyn Error + 'static {
    fn as_error(&self) -> Option<&(dyn Error + 'static)> {
        Some(self)
    }
}

impl ErrorValue for dyn Error + Send + Sync + 'static {
    fn as_error(&self) -> Option<&(dyn Error + 'static)> {
        Some(self)
    }
}

impl Text for dyn Error + 'static {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

impl Text for dyn Error + Send + Sync + 'static {
    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }
}

macro_rules! error_types {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ErrorValue for $ty {
                fn as_error(&self) -> Option<&(dyn Error + 'static)> {
                    Some(self)
                }
            }

            impl Text for $ty {
                fn text(&self) -> Option<Cow<'_, str>> {
                    Some(Cow::Owned(self.to_string()))
                }
            }
        )*
    };
}

error_types!(
    std::io::Error,
    fmt::Error,
    std::num::ParseIntError,
    std::num::ParseFloatError,
    std::str::Utf8Error,
    std::string::FromUtf8Error,
    serde_json::Error,
    regex::Error,
    CheckError,
);

impl<T: ErrorValue + ?Sized> ErrorValue for &T {
    fn as_error(&self) -> Option<&(dyn Error + 'static)> {
        (**self).as_error()
    }
}

impl<T: ErrorValue + ?Sized> ErrorValue for Box<T> {
    fn as_error(&self) -> Option<&(dyn Error + 'static)> {
        (**self).as_error()
    }
}

impl<T: ErrorValue> ErrorValue for Option<T> {
    fn as_error(&self) -> Option<&(dyn Error + 'static)> {
        self.as_ref().and_then(ErrorValue::as_error)
    }
}

impl<T, E: ErrorValue> ErrorValue for Result<T, E> {
    fn as_error(&self) -> Option<&(dyn Error + 'static)> {
        self.as_ref().err().and_then(ErrorValue::as_error)
    }
}

/// Some error in `actual`'s source chain has the same `Debug` rendering as
/// `expected`. Two missing errors match.
pub fn error_is<A: ErrorValue + ?Sized, E: ErrorValue + ?Sized>(actual: &A, expected: &E) -> bool {
    match (actual.as_error(), expected.as_error()) {
        (None, None) => true,
        (Some(actual), Some(expected)) => {
            let wanted = format!("{expected:?}");
            std::iter::successors(Some(actual), |&err| err.source())
                .any(|err| format!("{err:?}") == wanted)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Compile a regular expression.
///
/// # Errors
///
/// Returns [`CheckError::InvalidPattern`] for a malformed pattern.
pub fn try_compile(pattern: &str) -> CheckResult<Regex> {
    Ok(Regex::new(pattern)?)
}

/// Regular expression source: a pattern string or a compiled [`Regex`].
pub trait Pattern {
    /// Compiled pattern.
    ///
    /// # Panics
    ///
    /// When a pattern string does not compile.
    fn regex(&self) -> Cow<'_, Regex>;
}

impl Pattern for Regex {
    fn regex(&self) -> Cow<'_, Regex> {
        Cow::Borrowed(self)
    }
}

impl Pattern for str {
    fn regex(&self) -> Cow<'_, Regex> {
        match try_compile(self) {
            Ok(regex) => Cow::Owned(regex),
            Err(err) => panic!("is_match: {err}"),
        }
    }
}

impl Pattern for String {
    fn regex(&self) -> Cow<'_, Regex> {
        self.as_str().regex()
    }
}

impl<T: Pattern + ?Sized> Pattern for &T {
    fn regex(&self) -> Cow<'_, Regex> {
        (**self).regex()
    }
}

/// Text form of `actual` matches `pattern`. Values without text never match.
pub fn is_match<A: Text + ?Sized, P: Pattern + ?Sized>(actual: &A, pattern: &P) -> bool {
    let regex = pattern.regex();
    actual.text().is_some_and(|text| regex.is_match(&text))
}

/// Text of `actual` starts with text of `prefix`.
pub fn has_prefix<A: Text + ?Sized, P: Text + ?Sized>(actual: &A, prefix: &P) -> bool {
    match (actual.text(), prefix.text()) {
        (Some(actual), Some(prefix)) => actual.starts_with(prefix.as_ref()),
        _ => false,
    }
}

/// Text of `actual` ends with text of `suffix`.
pub fn has_suffix<A: Text + ?Sized, S: Text + ?Sized>(actual: &A, suffix: &S) -> bool {
    match (actual.text(), suffix.text()) {
        (Some(actual), Some(suffix)) => actual.ends_with(suffix.as_ref()),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Values holding JSON text.
pub trait JsonText {
    /// Raw JSON bytes, `None` for a missing document.
    fn json(&self) -> Option<&[u8]>;
}

impl JsonText for str {
    fn json(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl JsonText for String {
    fn json(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl JsonText for [u8] {
    fn json(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl JsonText for Vec<u8> {
    fn json(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl JsonText for RawValue {
    fn json(&self) -> Option<&[u8]> {
        Some(self.get().as_bytes())
    }
}

impl<T: JsonText + ?Sized> JsonText for &T {
    fn json(&self) -> Option<&[u8]> {
        (**self).json()
    }
}

impl<T: JsonText + ?Sized> JsonText for Box<T> {
    fn json(&self) -> Option<&[u8]> {
        (**self).json()
    }
}

impl<T: JsonText> JsonText for Option<T> {
    fn json(&self) -> Option<&[u8]> {
        self.as_ref().and_then(JsonText::json)
    }
}

/// Parse a JSON document. `Ok(None)` for a missing one.
///
/// # Errors
///
/// Returns [`CheckError::Json`] when the text is not valid JSON.
pub fn parse_json<T: JsonText + ?Sized>(json: &T) -> CheckResult<Option<serde_json::Value>> {
    json.json()
        .map(|bytes| serde_json::from_slice(bytes))
        .transpose()
        .map_err(CheckError::from)
}

/// Both sides are valid JSON documents with equal content. Key order and
/// whitespace do not matter.
pub fn json_equal<A: JsonText + ?Sized, E: JsonText + ?Sized>(actual: &A, expected: &E) -> bool {
    match (parse_json(actual), parse_json(expected)) {
        (Ok(Some(actual)), Ok(Some(expected))) => actual == expected,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Panics
// ---------------------------------------------------------------------------

/// Message of a panic payload.
#[must_use]
pub fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    if let Some(text) = payload.downcast_ref::<String>() {
        return text.clone();
    }
    "Box<dyn Any>".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize)]
    struct Holder {
        items: Vec<i32>,
    }

    fn instant(offset_hours: i32) -> DateTime<FixedOffset> {
        let utc = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        utc.with_timezone(&FixedOffset::east_opt(offset_hours * 3600).unwrap())
    }

    mod equality {
        use super::*;

        #[test]
        fn test_equal_and_deep_equal() {
            assert!(equal(&1, &1));
            assert!(!equal("a", "b"));
            assert!(deep_equal(&vec![1, 2], &[1, 2]));
            assert!(deep_equal("abc", &String::from("abc")));
            assert!(!deep_equal(&1i32, &1i64));
        }

        #[test]
        fn test_instants_in_different_zones() {
            let (utc, east) = (instant(0), instant(3));
            assert!(equal(&utc, &east));
            assert!(!deep_equal(&utc, &east));
        }

        #[test]
        fn test_bytes_equal() {
            assert!(bytes_equal(b"abc", b"abc"));
            assert!(!bytes_equal(b"abc", b"abd"));
        }

        #[test]
        fn test_has_type() {
            assert!(has_type(&1i32, &2i32));
            assert!(!has_type(&1i32, &2i64));
            assert!(has_type("a", "b"));
            assert!(!has_type(&Vec::<u8>::new(), &Vec::<i8>::new()));
        }
    }

    mod zero_values {
        use super::*;

        #[test]
        fn test_nil_and_scalars() {
            assert!(zero(&()));
            assert!(zero(&None::<i32>));
            assert!(zero(&0u8) && zero(&0.0f64) && zero(&false) && zero(""));
            assert!(!zero(&Some(0)));
            assert!(!zero(&-1i64) && !zero("x"));
        }

        #[test]
        fn test_containers() {
            assert!(zero(&Vec::<i32>::new()));
            assert!(zero(&HashMap::<i32, i32>::new()));
            assert!(!zero(&vec![0]));
            assert!(zero(&[0, 0, 0]));
            assert!(!zero(&[0, 1, 0]));
            assert!(!zero(&[Vec::<i32>::new(), Vec::new()]));
            assert!(!zero(&[HashMap::<i32, i32>::new()]));
            let empty: [Vec<i32>; 0] = [];
            assert!(zero(&empty));
        }

        #[test]
        fn test_structs() {
            assert!(zero(&Point { x: 0, y: 0 }));
            assert!(!zero(&Point { x: 0, y: 1 }));
            assert!(!zero(&Holder { items: Vec::new() }));
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn test_numbers() {
            assert!(less(&1i8, &2i8));
            assert!(less(&(u64::MAX - 1), &u64::MAX));
            assert!(greater(&2.5f32, &1.5f32));
            assert!(less(&-1i32, &1u32));
            assert!(less_or_equal(&3, &3) && greater_or_equal(&3, &3));
            assert!(!less(&f64::NAN, &1.0));
        }

        #[test]
        fn test_text_and_time() {
            assert!(less("a", &String::from("b")));
            assert!(less(&'a', &'b'));
            assert!(less(&Duration::from_millis(1), &Duration::from_secs(1)));
            assert!(less(&instant(0), &(instant(5) + chrono::Duration::seconds(1))));
            let now = SystemTime::now();
            assert!(greater(&(now + Duration::from_secs(1)), &now));
        }

        #[test]
        fn test_between() {
            assert!(between(&5, &1, &10));
            assert!(!between(&1, &1, &10));
            assert!(between_or_equal(&1, &1, &10));
            assert!(!between_or_equal(&11, &1, &10));
        }

        #[test]
        #[should_panic(expected = "cannot order")]
        fn test_struct_value_panics() {
            let value = reflect::reflect(&Point { x: 1, y: 2 }).value;
            let _ = less(&value, &value);
        }

        #[test]
        #[should_panic(expected = "cannot order None")]
        fn test_none_panics() {
            let _ = less(&None::<i32>, &Some(1));
        }

        #[test]
        #[should_panic(expected = "less: cannot order string against signed integer")]
        fn test_kind_mismatch_panics() {
            let _ = less("1", &2);
        }
    }

    mod tolerance {
        use super::*;

        #[test]
        fn test_in_delta_numbers() {
            assert!(in_delta(&-42, &-37, &7));
            assert!(!in_delta(&-42, &-37, &3));
            assert!(in_delta(&8u8, &13u8, &7u32));
            assert!(in_delta(&-3.2f32, &-8.2f32, &7.0));
            assert!(!in_delta(&-3.2f32, &-8.2f32, &3.5));
            assert!(in_delta(&u64::MAX, &(u64::MAX - 1), &1));
        }

        #[test]
        fn test_in_delta_instants() {
            let t = instant(0);
            let later = t + chrono::Duration::seconds(5);
            assert!(in_delta(&t, &later, &Duration::from_secs(7)));
            assert!(!in_delta(&later, &t, &Duration::from_secs(3)));
        }

        #[test]
        #[should_panic(expected = "negative delta")]
        fn test_negative_delta_panics() {
            let _ = in_delta(&1, &2, &-1);
        }

        #[test]
        #[should_panic(expected = "expected numbers")]
        fn test_in_delta_text_panics() {
            let _ = in_delta("a", "b", &1);
        }

        #[test]
        fn test_smape() {
            assert!(in_smape(&-42, &-37, 10.0));
            assert!(!in_smape(&-42, &-37, 5.0));
            assert!(in_smape(&0, &0, 0.5));
            assert!(in_smape(&0.0, &0.0, 0.5));
            assert!((smape(1.0, -1.0) - 100.0).abs() < f64::EPSILON);
        }

        #[test]
        #[should_panic(expected = "smape must be in (0, 100]")]
        fn test_smape_zero_panics() {
            let _ = in_smape(&1, &1, 0.0);
        }
    }

    mod containment {
        use super::*;

        #[test]
        fn test_sequences() {
            assert!(contains(&vec![2, 4, 6], &4));
            assert!(!contains(&vec![2, 4, 6], &3));
            assert!(contains(&[2, 4, 6], &6));
            assert!(contains(b"Test".as_slice(), &b'e'));
            assert!(contains(&vec!['T', 'e'], &'e'));
            assert!(!contains(&Vec::<i32>::new(), &1));
        }

        #[test]
        fn test_strings() {
            assert!(contains("", ""));
            assert!(contains("Test", ""));
            assert!(contains(&String::from("Test"), "es"));
            assert!(contains("Test", &'s'));
        }

        #[test]
        fn test_maps_scan_values() {
            let map: HashMap<i32, &str> = [(2, "two"), (5, "five")].into_iter().collect();
            assert!(contains(&map, "five"));
            let map: BTreeMap<&str, i32> = [("two", 2), ("five", 5)].into_iter().collect();
            assert!(contains(&map, &5));
            assert!(!contains(&map, &0));
        }

        #[test]
        #[should_panic(expected = "does not match element type i32")]
        fn test_needle_type_mismatch_panics() {
            let _ = contains(&vec![2, 4, 6], &4u8);
        }

        #[test]
        #[should_panic(expected = "does not match element type")]
        fn test_needle_type_mismatch_on_empty_panics() {
            let _ = contains(&Vec::<i32>::new(), "x");
        }

        #[test]
        #[should_panic(expected = "is not a container")]
        fn test_scalar_container_panics() {
            let _ = contains(&42, &42);
        }

        #[test]
        fn test_has_key() {
            let map: HashMap<i32, &str> = [(2, "two"), (5, "five")].into_iter().collect();
            assert!(has_key(&map, &5));
            assert!(!has_key(&map, &3));
        }

        #[test]
        #[should_panic(expected = "is not a map")]
        fn test_has_key_on_vec_panics() {
            let _ = has_key(&vec![1], &0);
        }

        #[test]
        fn test_len() {
            assert_eq!(len("héllo"), 6);
            assert_eq!(len(&vec!['h', 'é']), 2);
            assert_eq!(len(&HashMap::<i32, i32>::new()), 0);
            assert_eq!(len(&[0u8; 3]), 3);
        }

        #[test]
        #[should_panic(expected = "has no length")]
        fn test_len_of_struct_panics() {
            let _ = len(&Point { x: 1, y: 2 });
        }
    }

    mod text {
        use super::*;

        #[test]
        fn test_is_match() {
            assert!(is_match("hello world", "o w"));
            assert!(is_match(&b"bytes".to_vec(), "^by"));
            assert!(is_match(&vec!['a', 'b'], "ab"));
            assert!(is_match(&Displayed(42), "^42$"));
            assert!(!is_match(&None::<&str>, ""));
            let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
            assert!(is_match(&err, "disk"));
            assert!(is_match("abc", &Regex::new("b").unwrap()));
        }

        #[test]
        #[should_panic(expected = "invalid pattern")]
        fn test_bad_pattern_panics() {
            let _ = is_match("abc", "(");
        }

        #[test]
        fn test_try_compile() {
            assert!(try_compile("a+").is_ok());
            assert!(matches!(try_compile("("), Err(CheckError::InvalidPattern(_))));
        }

        #[test]
        fn test_prefix_suffix() {
            assert!(has_prefix("Sunday Monday", "Sunday"));
            assert!(has_prefix("Sunday Monday", &b"Sun".to_vec()));
            assert!(has_suffix("Sunday Monday", &vec!['d', 'a', 'y']));
            assert!(has_prefix("", ""));
            assert!(!has_prefix(&None::<String>, ""));
            assert!(!has_suffix("", &None::<String>));
        }
    }

    mod errors {
        use super::*;
        use std::io;

        #[derive(Debug)]
        struct Wrapped(io::Error);

        impl Display for Wrapped {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "wrapped: {}", self.0)
            }
        }

        impl Error for Wrapped {
            fn source(&self) -> Option<&(dyn Error + 'static)> {
                Some(&self.0)
            }
        }

        fn eof() -> io::Error {
            io::Error::new(io::ErrorKind::UnexpectedEof, "EOF")
        }

        #[test]
        fn test_error_is_walks_source_chain() {
            let wrapped = Wrapped(eof());
            assert!(error_is(&wrapped as &(dyn Error + 'static), &eof()));
            assert!(!error_is(&eof(), &wrapped as &(dyn Error + 'static)));
        }

        #[test]
        fn test_missing_errors() {
            assert!(error_is(&None::<io::Error>, &None::<io::Error>));
            assert!(!error_is(&Some(eof()), &None::<io::Error>));
            let ok: Result<(), io::Error> = Ok(());
            assert!(error_is(&ok, &None::<io::Error>));
            let failed: Result<(), io::Error> = Err(eof());
            assert!(error_is(&failed, &eof()));
        }
    }

    mod json {
        use super::*;

        #[test]
        fn test_json_equal_ignores_layout() {
            let raw = RawValue::from_string(r#"{"a":1,"b":[2]}"#.to_string()).unwrap();
            let variants: [&dyn JsonText; 3] = [
                &r#"{ "b" : [ 2],"a" :1}  "#,
                &br#"  { "b": [2 ],"a": 1}"#.as_slice(),
                &raw,
            ];
            for actual in variants {
                for expected in variants {
                    assert!(json_equal(actual, expected));
                }
            }
        }

        #[test]
        fn test_invalid_or_missing_json() {
            let invalid = r#"{"a":1,"b":[2]"#;
            assert!(!json_equal(invalid, invalid));
            assert!(!json_equal("", ""));
            assert!(!json_equal(&None::<String>, &None::<String>));
            assert!(matches!(parse_json(invalid), Err(CheckError::Json(_))));
        }
    }

    mod panics {
        use super::*;

        #[test]
        fn test_panic_text() {
            let payload = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
            assert_eq!(panic_text(payload.as_ref()), "static");
            let payload = std::panic::catch_unwind(|| panic!("{}", 42)).unwrap_err();
            assert_eq!(panic_text(payload.as_ref()), "42");
            let payload = std::panic::catch_unwind(|| std::panic::panic_any(7)).unwrap_err();
            assert_eq!(panic_text(payload.as_ref()), "Box<dyn Any>");
        }
    }
}
