//! Cell values and runtime format templates.
//!
//! A template is plain text with one kind of placeholder, the cell value:
//! `{}`, `{0}`, `{:SPEC}` or `{0:SPEC}`. `{{` and `}}` are literal braces.
//!
//! Supported specs (letter case is kept for `E` and `X`):
//! - `N<d>` grouped number (`1,234.50`), default 2 decimals
//! - `F<d>` fixed point, default 2 decimals
//! - `E<d>` scientific (`1.234560E+003`), default 6 decimals
//! - `P<d>` percent (`31.42 %`), default 2 decimals
//! - `D<d>` integer zero-padded to `d` digits
//! - `X` / `x` hexadecimal integer
//! - `.d` precision (decimals for numbers, max chars for text)
//!
//! Specs that do not apply to a value (e.g. `N2` on text) fall back to the
//! value's default text.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Typed value of one table cell, produced by a column accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bool(bool),
    Duration(Duration),
}

impl Value {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Duration(d) => Some(d.as_secs_f64()),
            Value::Text(_) | Value::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Duration(d) => write!(f, "{:.4} s", d.as_secs_f64()),
        }
    }
}

macro_rules! value_from {
    ($variant:ident as $target:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )+
    };
}

value_from!(Int as i64: i8, i16, i32, i64, isize);
value_from!(UInt as u64: u8, u16, u32, u64, usize);
value_from!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

/// Malformed format template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unclosed `{{` at byte {0}")]
    Unclosed(usize),
    #[error("unmatched `}}` at byte {0}")]
    UnmatchedClose(usize),
    #[error("placeholder index `{0}` is out of range; only index 0 is available")]
    BadIndex(String),
    #[error("unknown format spec `{0}`")]
    UnknownSpec(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spec {
    Plain,
    Number(usize),
    Fixed(usize),
    Exponent { decimals: usize, upper: bool },
    Percent(usize),
    Digits(usize),
    Hex { upper: bool },
    Precision(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Arg(Spec),
}

/// Parsed format template, applied to a single [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse a template; errors are configuration errors of the owning column.
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' => {
                    if chars.next_if(|&(_, c)| c == '{').is_some() {
                        literal.push('{');
                        continue;
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(FormatError::Unclosed(pos));
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Arg(parse_placeholder(&inner)?));
                }
                '}' => {
                    if chars.next_if(|&(_, c)| c == '}').is_some() {
                        literal.push('}');
                    } else {
                        return Err(FormatError::UnmatchedClose(pos));
                    }
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    /// Render `value` through the template.
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Arg(spec) => out.push_str(&apply(*spec, value)),
            }
        }
        out
    }
}

fn parse_placeholder(inner: &str) -> Result<Spec, FormatError> {
    let (index, spec) = match inner.split_once(':') {
        Some((index, spec)) => (index.trim(), spec.trim()),
        None => (inner.trim(), ""),
    };
    if !index.is_empty() && index != "0" {
        return Err(FormatError::BadIndex(index.to_string()));
    }
    parse_spec(spec)
}

fn parse_spec(spec: &str) -> Result<Spec, FormatError> {
    let unknown = || FormatError::UnknownSpec(spec.to_string());
    if spec.is_empty() {
        return Ok(Spec::Plain);
    }
    if let Some(digits) = spec.strip_prefix('.') {
        return digits.parse().map(Spec::Precision).map_err(|_| unknown());
    }

    let mut chars = spec.chars();
    let letter = chars.next().ok_or_else(unknown)?;
    let rest = chars.as_str();
    let count = if rest.is_empty() {
        None
    } else {
        Some(rest.parse::<usize>().map_err(|_| unknown())?)
    };

    let spec = match letter {
        'N' | 'n' => Spec::Number(count.unwrap_or(2)),
        'F' | 'f' => Spec::Fixed(count.unwrap_or(2)),
        'E' | 'e' => Spec::Exponent {
            decimals: count.unwrap_or(6),
            upper: letter == 'E',
        },
        'P' | 'p' => Spec::Percent(count.unwrap_or(2)),
        'D' | 'd' => Spec::Digits(count.unwrap_or(0)),
        'X' | 'x' if count.is_none() => Spec::Hex {
            upper: letter == 'X',
        },
        _ => return Err(unknown()),
    };
    Ok(spec)
}

fn apply(spec: Spec, value: &Value) -> String {
    match spec {
        Spec::Plain => value.to_string(),
        Spec::Number(decimals) => match value.as_f64() {
            Some(v) => group_thousands(&format!("{:.*}", decimals, v)),
            None => value.to_string(),
        },
        Spec::Fixed(decimals) => match value.as_f64() {
            Some(v) => format!("{:.*}", decimals, v),
            None => value.to_string(),
        },
        Spec::Exponent { decimals, upper } => match value.as_f64() {
            Some(v) => scientific(v, decimals, upper),
            None => value.to_string(),
        },
        Spec::Percent(decimals) => match value.as_f64() {
            Some(v) => format!("{} %", group_thousands(&format!("{:.*}", decimals, v * 100.0))),
            None => value.to_string(),
        },
        Spec::Digits(width) => match value {
            Value::Int(v) if *v < 0 => format!("-{:0width$}", v.unsigned_abs(), width = width),
            Value::Int(v) => format!("{:0width$}", v, width = width),
            Value::UInt(v) => format!("{:0width$}", v, width = width),
            _ => value.to_string(),
        },
        Spec::Hex { upper } => match (value, upper) {
            (Value::Int(v), true) => format!("{:X}", v),
            (Value::Int(v), false) => format!("{:x}", v),
            (Value::UInt(v), true) => format!("{:X}", v),
            (Value::UInt(v), false) => format!("{:x}", v),
            _ => value.to_string(),
        },
        Spec::Precision(p) => match value {
            Value::Text(s) => s.chars().take(p).collect(),
            Value::Float(v) => format!("{:.*}", p, v),
            Value::Duration(d) => format!("{:.*} s", p, d.as_secs_f64()),
            _ => value.to_string(),
        },
    }
}

/// Insert `,` between groups of three digits of the integer part.
/// Leaves non-numeric renderings (`NaN`, `inf`) untouched.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(number.len() + int_part.len() / 3);
    grouped.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn scientific(v: f64, decimals: usize, upper: bool) -> String {
    let raw = format!("{:.*e}", decimals, v);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return raw;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    let marker = if upper { 'E' } else { 'e' };
    format!("{}{}{}{:03}", mantissa, marker, sign, exponent.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &str, value: impl Into<Value>) -> String {
        Template::parse(template).unwrap().render(&value.into())
    }

    #[test]
    fn number_spec_rounds_and_groups() {
        assert_eq!(render("{0:N2}", 3.14159), "3.14");
        assert_eq!(render("{0:N2}", 1234567.891), "1,234,567.89");
        assert_eq!(render("{0:N0}", -1234.4), "-1,234");
        assert_eq!(render("{0:N}", 12), "12.00");
    }

    #[test]
    fn literal_text_around_placeholder() {
        assert_eq!(render("{0:N4} s", 0.5), "0.5000 s");
        assert_eq!(render("~{}~", "abc"), "~abc~");
        assert_eq!(render("{{{0}}}", 7), "{7}");
    }

    #[test]
    fn fixed_exponent_and_percent() {
        assert_eq!(render("{:F3}", 2.0), "2.000");
        assert_eq!(render("{0:E2}", 1234.5), "1.23E+003");
        assert_eq!(render("{0:e1}", 0.00012), "1.2e-004");
        assert_eq!(render("{0:P1}", 0.31415), "31.4 %");
    }

    #[test]
    fn integer_specs() {
        assert_eq!(render("{0:D5}", 42), "00042");
        assert_eq!(render("{0:D3}", -7), "-007");
        assert_eq!(render("{0:X}", 255u32), "FF");
        assert_eq!(render("{0:x}", 255), "ff");
    }

    #[test]
    fn precision_applies_per_type() {
        assert_eq!(render("{:.1}", 2.26f64), "2.3");
        assert_eq!(render("{:.3}", "abcdef"), "abc");
        assert_eq!(render("{:.2}", Duration::from_millis(1500)), "1.50 s");
        assert_eq!(render("{:.2}", 10), "10");
    }

    #[test]
    fn numeric_spec_on_text_falls_back() {
        assert_eq!(render("{0:N2}", "n/a"), "n/a");
        assert_eq!(render("{0:D4}", 1.5), "1.5");
        assert_eq!(render("{0:N2}", true), "true");
    }

    #[test]
    fn non_finite_numbers_are_not_grouped() {
        assert_eq!(render("{0:N2}", f64::NAN), "NaN");
        assert_eq!(render("{0:N2}", f64::INFINITY), "inf");
    }

    #[test]
    fn default_text_of_values() {
        assert_eq!(Value::from(3.5f64).to_string(), "3.5");
        assert_eq!(Value::from(-3i8).to_string(), "-3");
        assert_eq!(Value::from(Duration::from_millis(12)).to_string(), "0.0120 s");
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert_eq!(Template::parse("{0:N2"), Err(FormatError::Unclosed(0)));
        assert_eq!(Template::parse("ab}"), Err(FormatError::UnmatchedClose(2)));
        assert_eq!(
            Template::parse("{1}"),
            Err(FormatError::BadIndex("1".to_string()))
        );
        assert_eq!(
            Template::parse("{0:Q2}"),
            Err(FormatError::UnknownSpec("Q2".to_string()))
        );
        assert!(Template::parse("{0:Nx}").is_err());
    }
}
