//! Human-readable dumps of checked values.
//!
//! A [`Dump`] is produced once per value per failed check. Strings, bytes,
//! chars and raw JSON get special treatment, everything else falls back to
//! a deterministic structural dump (sorted map keys, no addresses).

use crate::diff;
use crate::reflect::{self, Payload, Reflected, Value};
use serde::Serialize;
use std::fmt::{self, Debug, Write as _};

const INDENT: &str = "  ";

/// Rendered text of a value plus the type used to decide diff compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dump {
    text: String,
    indirect_type: Option<String>,
}

impl Dump {
    /// Dump any serializable value.
    #[must_use]
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::from_reflected(reflect::reflect(value))
    }

    /// Dump a value through its `Debug` impl. Used for values that are not
    /// `Serialize`, like errors and panic payloads.
    #[must_use]
    pub fn debug<T: Debug + ?Sized>(value: &T) -> Self {
        let ty = reflect::short_type_name(std::any::type_name::<T>());
        Self {
            text: format!("({ty}) {value:?}"),
            indirect_type: Some(reflect::canonical_type_name(&ty)),
        }
    }

    /// Dump text produced elsewhere, tagged with a type.
    #[must_use]
    pub fn text(ty: &str, text: &str) -> Self {
        Self {
            text: format!("({ty}) (len={}) {}", text.len(), quote(text)),
            indirect_type: Some(reflect::canonical_type_name(ty)),
        }
    }

    /// Dump an already reflected value.
    #[must_use]
    pub fn from_reflected(reflected: Reflected) -> Self {
        let shown = reflected.short_type();
        match reflected.value {
            Value::Unit => Self {
                text: "<nil>".to_string(),
                indirect_type: None,
            },
            Value::None => Self {
                text: format!("({shown}) None"),
                indirect_type: None,
            },
            Value::Some(inner) => {
                let pointee = reflect::option_inner(&shown).unwrap_or(&shown);
                let indirect = reflect::canonical_type_name(pointee);
                Self::render(&shown, indirect, &inner)
            }
            value => {
                let indirect = reflect::canonical_type_name(&shown);
                Self::render(&shown, indirect, &value)
            }
        }
    }

    fn render(shown: &str, indirect: String, value: &Value) -> Self {
        let elem = reflect::element_type(&indirect);
        let text = match value.peel() {
            Value::RawJson(json) => {
                format!("({shown}) (len={}) '\n{}\n'", json.len(), pretty_json(json))
            }
            Value::Uint { value: byte, ty: "u8" } => format!("({shown}) 0x{byte:02X}"),
            Value::Char(c) => format!("({shown}) {c:?}"),
            Value::Str(s) => format!("({shown}) (len={}) {}", s.len(), quote(s)),
            seq @ (Value::Seq(_) | Value::Tuple(_) | Value::Bytes(_)) => {
                render_sequence(shown, elem, seq)
            }
            other => format!("({shown}) {}", structural(other, 0, false)),
        };
        Self {
            text,
            indirect_type: Some(indirect),
        }
    }

    /// Rendered text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Canonical type of the dumped value, `None` for nil values.
    #[must_use]
    pub fn indirect_type(&self) -> Option<&str> {
        self.indirect_type.as_deref()
    }

    /// Dump spans several lines.
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.text.contains('\n')
    }

    /// Unified diff from `expected` to `self`, empty when there is nothing
    /// useful to show.
    #[must_use]
    pub fn diff(&self, expected: &Self, context: usize) -> String {
        if self.indirect_type != expected.indirect_type {
            return String::new();
        }
        if !self.is_multiline() && !expected.is_multiline() {
            return String::new();
        }
        let unified = diff::unified(&expected.text, &self.text, context);
        if unified.is_empty() {
            return String::new();
        }
        format!("\n\nDiff:\n{unified}")
    }
}

impl fmt::Display for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn render_sequence(shown: &str, elem: Option<&str>, seq: &Value) -> String {
    // Only arrays among tuples render as text.
    if matches!(seq, Value::Tuple(_)) && elem.is_none() {
        return format!("({shown}) {}", structural(seq, 0, false));
    }
    if let Some(text) = seq.as_char_seq() {
        return format!("({shown}) (len={}) {}", text.chars().count(), quote(&text));
    }
    let empty = seq.len() == Some(0);
    if empty && elem == Some("char") {
        return format!("({shown}) (len=0) ''");
    }
    let bytes = match seq.as_byte_seq() {
        Some(bytes) => Some(bytes),
        None if empty && (elem == Some("u8") || matches!(seq, Value::Bytes(_))) => Some(Vec::new()),
        None => None,
    };
    match bytes {
        Some(bytes) => match std::str::from_utf8(&bytes) {
            Ok(text) => format!("({shown}) (len={}) {}", bytes.len(), quote(text)),
            Err(_) => format!("({shown}) {}", hexdump(&bytes, 0)),
        },
        None => format!("({shown}) {}", structural(seq, 0, false)),
    }
}

/// Debug-escape `s`, then turn `\n` back into real newlines and `\"` into
/// plain quotes. Multi-line results are wrapped as `'\n...\n'`.
#[must_use]
pub fn quote(s: &str) -> String {
    let escaped = format!("{s:?}");
    let inner = &escaped[1..escaped.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut multiline = false;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => {
                out.push('\n');
                multiline = true;
            }
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    if multiline {
        format!("'\n{out}\n'")
    } else {
        format!("'{out}'")
    }
}

/// Pretty-print a JSON document with two-space indentation, keeping key
/// order. Text that does not parse is returned as is.
fn pretty_json(json: &str) -> String {
    serde_json::from_str::<serde_json::Value>(json)
        .and_then(|doc| serde_json::to_string_pretty(&doc))
        .unwrap_or_else(|_| json.to_string())
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Structural dump. `tagged` prefixes scalars with their type; the top-level
/// value is untagged because its type is already shown.
fn structural(value: &Value, depth: usize, tagged: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, depth, tagged);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, tagged: bool) {
    match value {
        Value::Unit => out.push_str("()"),
        Value::Bool(v) => tag(out, tagged, "bool", v),
        Value::Int { value, ty } => tag(out, tagged, ty, value),
        Value::Uint { value, ty } => tag(out, tagged, ty, value),
        Value::Float { value, ty } => tag(out, tagged, ty, format_args!("{value:?}")),
        Value::Char(c) => tag(out, tagged, "char", format_args!("{c:?}")),
        Value::Str(s) => {
            if tagged {
                out.push_str("(str) ");
            }
            let _ = write!(out, "(len={}) {s:?}", s.len());
        }
        Value::Bytes(bytes) => out.push_str(&hexdump(bytes, depth)),
        Value::None => out.push_str("None"),
        Value::Some(inner) => {
            out.push_str("Some(");
            write_value(out, inner, depth, true);
            out.push(')');
        }
        Value::Seq(items) => match value.as_byte_seq() {
            Some(bytes) => out.push_str(&hexdump(&bytes, depth)),
            None => {
                let _ = write!(out, "(len={}) ", items.len());
                write_items(out, items, depth, ('[', ']'));
            }
        },
        Value::Tuple(items) => write_items(out, items, depth, ('(', ')')),
        Value::Map(entries) => {
            let _ = write!(out, "(len={}) ", entries.len());
            write_map(out, entries, depth);
        }
        Value::UnitStruct(name) => out.push_str(name),
        Value::Newtype { name, value } => {
            if tagged {
                let _ = write!(out, "({name}) ");
            }
            write_value(out, value, depth, false);
        }
        Value::TupleStruct { name, fields } => {
            out.push_str(name);
            write_items(out, fields, depth, ('(', ')'));
        }
        Value::Struct { name, fields } => {
            out.push_str(name);
            out.push(' ');
            write_fields(out, fields, depth);
        }
        Value::Variant {
            name,
            variant,
            payload,
            ..
        } => {
            let _ = write!(out, "{name}::{variant}");
            match payload {
                Payload::Unit => {}
                Payload::Newtype(inner) => {
                    out.push('(');
                    write_value(out, inner, depth, true);
                    out.push(')');
                }
                Payload::Tuple(items) => write_items(out, items, depth, ('(', ')')),
                Payload::Struct(fields) => {
                    out.push(' ');
                    write_fields(out, fields, depth);
                }
            }
        }
        Value::RawJson(json) => {
            if tagged {
                out.push_str("(RawValue) ");
            }
            out.push_str(json);
        }
        Value::Unrepresentable(message) => {
            let _ = write!(out, "<unrepresentable: {message}>");
        }
    }
}

fn tag(out: &mut String, tagged: bool, ty: &str, value: impl fmt::Display) {
    if tagged {
        let _ = write!(out, "({ty}) {value}");
    } else {
        let _ = write!(out, "{value}");
    }
}

fn write_items(out: &mut String, items: &[Value], depth: usize, (open, close): (char, char)) {
    out.push(open);
    if !items.is_empty() {
        out.push('\n');
        for item in items {
            push_indent(out, depth + 1);
            write_value(out, item, depth + 1, true);
            out.push_str(",\n");
        }
        push_indent(out, depth);
    }
    out.push(close);
}

fn write_fields(out: &mut String, fields: &[(&'static str, Value)], depth: usize) {
    out.push('{');
    if !fields.is_empty() {
        out.push('\n');
        for (name, field) in fields {
            push_indent(out, depth + 1);
            let _ = write!(out, "{name}: ");
            write_value(out, field, depth + 1, true);
            out.push_str(",\n");
        }
        push_indent(out, depth);
    }
    out.push('}');
}

fn write_map(out: &mut String, entries: &[(Value, Value)], depth: usize) {
    let mut sorted: Vec<(String, &Value)> = entries
        .iter()
        .map(|(key, value)| (structural(key, depth + 1, true), value))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    out.push('{');
    if !sorted.is_empty() {
        out.push('\n');
        for (key, value) in sorted {
            push_indent(out, depth + 1);
            let _ = write!(out, "{key}: ");
            write_value(out, value, depth + 1, true);
            out.push_str(",\n");
        }
        push_indent(out, depth);
    }
    out.push('}');
}

/// `hexdump -C` style block.
fn hexdump(bytes: &[u8], depth: usize) -> String {
    let mut out = format!("(len={}) {{", bytes.len());
    if bytes.is_empty() {
        out.push('}');
        return out;
    }
    out.push('\n');
    for (line, chunk) in bytes.chunks(16).enumerate() {
        push_indent(&mut out, depth + 1);
        let _ = write!(out, "{:08x}  ", line * 16);
        for i in 0..16 {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{b:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    push_indent(&mut out, depth);
    out.push('}');
    out
}
