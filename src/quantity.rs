//! Quantity parsing, scaling, and culinary-aware formatting.
//!
//! Independent of every other component: works on quantity strings alone.
//! The parser is a small grammar over three literal forms (integer/decimal,
//! `a/b`, `a b/c`) with a vulgar-fraction glyph pre-pass; unrecognized input
//! yields `None`, never a panic.

use serde::Serialize;

/// Decimal values for the recognized vulgar-fraction glyphs.
const VULGAR_GLYPHS: &[(char, f64)] = &[
    ('¼', 0.25),
    ('½', 0.5),
    ('¾', 0.75),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('⅕', 0.2),
    ('⅖', 0.4),
    ('⅗', 0.6),
    ('⅘', 0.8),
    ('⅙', 1.0 / 6.0),
    ('⅚', 5.0 / 6.0),
    ('⅛', 0.125),
    ('⅜', 0.375),
    ('⅝', 0.625),
    ('⅞', 0.875),
];

/// The fraction ladder used for display rounding. A scaled quantity snaps
/// to the nearest rung; a rung of 1 carries into the integer part.
const LADDER: &[(f64, &str)] = &[
    (0.0, ""),
    (0.125, "⅛"),
    (0.25, "¼"),
    (1.0 / 3.0, "⅓"),
    (0.375, "⅜"),
    (0.5, "½"),
    (0.625, "⅝"),
    (2.0 / 3.0, "⅔"),
    (0.75, "¾"),
    (0.875, "⅞"),
    (1.0, ""),
];

/// Per-unit practical minimums: the smallest amount of a unit worth
/// measuring. Scaling below these draws an advisory, never an error.
const PRACTICAL_MINIMUMS: &[(&str, f64)] = &[
    ("teaspoon", 0.125),
    ("tablespoon", 0.25),
    ("cup", 0.125),
    ("egg", 0.5),
    ("ounce", 0.25),
    ("pound", 0.125),
];

/// A scaled quantity ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledQuantity {
    /// Exact scaled value before display rounding.
    pub value: f64,
    /// Ladder-rounded display string (`"2"`, `"1½"`, `"⅓"`).
    pub display: String,
    /// Practical-minimum advisory, when one applies.
    pub warning: Option<String>,
}

fn glyph_value(ch: char) -> Option<f64> {
    VULGAR_GLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == ch)
        .map(|&(_, value)| value)
}

/// Parses an unsigned integer written in ASCII digits.
fn parse_whole(text: &str) -> Option<f64> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().map(f64::from)
}

/// Parses an integer or decimal literal (`"2"`, `"0.75"`, `".5"`).
fn parse_number(text: &str) -> Option<f64> {
    let mut dots = 0;
    let mut digits = 0;
    for ch in text.chars() {
        match ch {
            '.' => dots += 1,
            c if c.is_ascii_digit() => digits += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Parses a simple fraction literal (`"3/4"`). Zero denominators miss.
fn parse_fraction(text: &str) -> Option<f64> {
    let (numer, denom) = text.split_once('/')?;
    let numer = parse_whole(numer)?;
    let denom = parse_whole(denom)?;
    if denom == 0.0 {
        return None;
    }
    Some(numer / denom)
}

/// Parses a quantity string to its numeric value.
///
/// Recognized forms: integers and decimals (`"2"`, `"1.5"`), simple
/// fractions (`"1/4"`), mixed numbers (`"1 1/2"`), and vulgar-fraction
/// glyphs with an optional leading whole number (`"½"`, `"1½"`, `"1 ½"`).
/// Anything else yields `None`.
#[must_use]
pub fn parse_quantity(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Glyph pre-pass: a recognized glyph must terminate the literal.
    if let Some((pos, ch)) = trimmed
        .char_indices()
        .find(|&(_, ch)| glyph_value(ch).is_some())
    {
        let fraction = glyph_value(ch)?;
        if !trimmed[pos + ch.len_utf8()..].trim().is_empty() {
            return None;
        }
        let lead = trimmed[..pos].trim();
        let whole = if lead.is_empty() {
            0.0
        } else {
            parse_whole(lead)?
        };
        return Some(whole + fraction);
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    match parts.as_slice() {
        [single] => parse_number(single).or_else(|| parse_fraction(single)),
        [whole, fraction] => Some(parse_whole(whole)? + parse_fraction(fraction)?),
        _ => None,
    }
}

/// Scales a parsed quantity. The factor is an unrestricted positive
/// rational; the UI's ¼/½/1/2/4 presets are a caller convention.
#[must_use]
pub fn scale(value: f64, factor: f64) -> f64 {
    value * factor
}

/// Formats a value with culinary ladder rounding.
///
/// The fractional part snaps to the nearest ladder rung by absolute
/// distance; a rung of 1 carries into the integer part. `2.0` renders as
/// `"2"`, `2.4` as `"2⅜"`, `0.3` as `"⅓"`.
#[must_use]
pub fn format_quantity(value: f64) -> String {
    let value = value.max(0.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut whole = value.floor() as u64;
    let fraction = value - value.floor();

    let (_, glyph) = LADDER
        .iter()
        .map(|&(rung, glyph)| ((rung - fraction).abs(), (rung, glyph)))
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, nearest)| nearest)
        .unwrap_or((0.0, ""));

    // Nearest rung of 1 means the fraction rounds up into the next whole.
    if glyph.is_empty() && fraction > 0.5 {
        whole += 1;
    }

    if glyph.is_empty() {
        whole.to_string()
    } else if whole == 0 {
        glyph.to_string()
    } else {
        format!("{whole}{glyph}")
    }
}

/// Canonical unit key for the practical-minimum table.
fn normalize_unit(unit: &str) -> String {
    let lowered = unit.trim().to_lowercase();
    let singular = lowered.strip_suffix('s').unwrap_or(&lowered);
    match singular {
        "tsp" | "t" => "teaspoon",
        "tbsp" | "tbl" => "tablespoon",
        "oz" => "ounce",
        "lb" => "pound",
        other => other,
    }
    .to_string()
}

/// Checks a scaled value against the per-unit practical minimums.
///
/// Returns an advisory string when the amount falls under the unit's
/// minimum, and a distinct advisory for fractional eggs. Advisories
/// annotate the scaling; they never block it.
#[must_use]
pub fn check_practical_minimum(value: f64, unit: &str) -> Option<String> {
    let unit_key = normalize_unit(unit);

    if unit_key == "egg" && value > 0.0 && value.fract() > f64::EPSILON {
        return Some(format!(
            "{} egg is not a whole egg; beat one and measure out a portion",
            format_quantity(value)
        ));
    }

    let &(_, minimum) = PRACTICAL_MINIMUMS
        .iter()
        .find(|(name, _)| *name == unit_key)?;

    if value < minimum {
        Some(format!(
            "{} {unit_key} is below the practical minimum of {minimum} {unit_key}",
            format_quantity(value)
        ))
    } else {
        None
    }
}

/// Parses, scales, and formats a quantity string in one step.
///
/// `unit` feeds the practical-minimum check when present. Unparseable
/// input yields `None` rather than an error.
#[must_use]
pub fn scale_quantity(input: &str, factor: f64, unit: Option<&str>) -> Option<ScaledQuantity> {
    let value = scale(parse_quantity(input)?, factor);
    let display = format_quantity(value);
    let warning = unit.and_then(|u| check_practical_minimum(value, u));
    Some(ScaledQuantity {
        value,
        display,
        warning,
    })
}
