//! Normalization of generated solar plans
//!
//! The generative model is asked for a JSON object, but nothing guarantees
//! the fields it returns are present or correctly typed. Every field is
//! described by a [`FieldSpec`]: a value of the expected JSON type passes
//! through, anything else goes through a lenient coercion, and when that
//! fails too the field's fallback is used. Normalization never fails.

use std::borrow::Cow;

use serde_json::Value;

use crate::models::PlanDraft;

/// How to read one field out of an untrusted object
#[derive(Debug, Clone)]
pub struct FieldSpec<T> {
    pub name: &'static str,
    pub coerce: fn(&Value) -> Option<T>,
    pub fallback: T,
}

impl<T: Clone> FieldSpec<T> {
    /// Read the field from `raw`, falling back when it is missing or unusable
    pub fn apply(&self, raw: &Value) -> T {
        raw.get(self.name)
            .and_then(self.coerce)
            .unwrap_or_else(|| self.fallback.clone())
    }
}

pub const RECOMMENDED_CAPACITY_KW: FieldSpec<f64> = FieldSpec {
    name: "recommended_capacity_kw",
    coerce: coerce_float,
    fallback: 1.0,
};

pub const TOTAL_SOLAR_PANEL: FieldSpec<i64> = FieldSpec {
    name: "total_solar_panel",
    coerce: coerce_integer,
    fallback: 1,
};

pub const PANEL_RATING: FieldSpec<f64> = FieldSpec {
    name: "panel_rating",
    coerce: coerce_float,
    fallback: 300.0,
};

pub const TILT_ANGLE: FieldSpec<f64> = FieldSpec {
    name: "tilt_angle",
    coerce: coerce_float,
    fallback: 20.0,
};

pub const SOLAR_PANEL_TYPE: FieldSpec<Cow<'static, str>> = FieldSpec {
    name: "solar_panel_type",
    coerce: coerce_text,
    fallback: Cow::Borrowed("Monocrystalline"),
};

pub const LOCATION: FieldSpec<Cow<'static, str>> = FieldSpec {
    name: "location",
    coerce: coerce_text,
    fallback: Cow::Borrowed("Unknown Location"),
};

pub const REQUIRED_AREA_SQ_M: FieldSpec<f64> = FieldSpec {
    name: "required_area_sq_m",
    coerce: coerce_float,
    fallback: 10.0,
};

pub const ESTIMATED_MONTHLY_GENERATION_KWH: FieldSpec<f64> = FieldSpec {
    name: "estimated_monthly_generation_kwh",
    coerce: coerce_float,
    fallback: 100.0,
};

pub const ESTIMATED_MONTHLY_SAVINGS_INR: FieldSpec<f64> = FieldSpec {
    name: "estimated_monthly_savings_inr",
    coerce: coerce_float,
    fallback: 1000.0,
};

pub const ESTIMATED_COST_INR: FieldSpec<f64> = FieldSpec {
    name: "estimated_cost_inr",
    coerce: coerce_float,
    fallback: 100_000.0,
};

pub const PAYBACK_PERIOD_YEARS: FieldSpec<f64> = FieldSpec {
    name: "payback_period_years",
    coerce: coerce_float,
    fallback: 5.0,
};

pub const MAINTENANCE_ADVICE: FieldSpec<Cow<'static, str>> = FieldSpec {
    name: "maintenance_advice",
    coerce: coerce_text,
    fallback: Cow::Borrowed("Clean panels regularly."),
};

/// Coerce an arbitrary value into a complete plan
pub fn normalize_plan(raw: &Value) -> PlanDraft {
    PlanDraft {
        recommended_capacity_kw: RECOMMENDED_CAPACITY_KW.apply(raw),
        total_solar_panel: TOTAL_SOLAR_PANEL.apply(raw),
        panel_rating: PANEL_RATING.apply(raw),
        tilt_angle: TILT_ANGLE.apply(raw),
        solar_panel_type: SOLAR_PANEL_TYPE.apply(raw).into_owned(),
        location: LOCATION.apply(raw).into_owned(),
        required_area_sq_m: REQUIRED_AREA_SQ_M.apply(raw),
        estimated_monthly_generation_kwh: ESTIMATED_MONTHLY_GENERATION_KWH.apply(raw),
        estimated_monthly_savings_inr: ESTIMATED_MONTHLY_SAVINGS_INR.apply(raw),
        estimated_cost_inr: ESTIMATED_COST_INR.apply(raw),
        payback_period_years: PAYBACK_PERIOD_YEARS.apply(raw),
        maintenance_advice: MAINTENANCE_ADVICE.apply(raw).into_owned(),
        // Optional: never replaced by a placeholder
        notes: raw.get("notes").and_then(Value::as_str).map(str::to_owned),
    }
}

/// Numbers pass through; strings are parsed by their leading numeric prefix.
/// A parsed zero counts as a failed coercion.
pub fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s).filter(|v| v.is_finite() && *v != 0.0),
        _ => None,
    }
}

/// Integral numbers pass through, fractional ones are truncated toward zero.
/// Strings are parsed by their leading integer prefix.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
        Value::String(s) => parse_leading_integer(s).filter(|v| *v != 0),
        _ => None,
    }
}

/// Non-blank strings pass through
pub fn coerce_text(value: &Value) -> Option<Cow<'static, str>> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Cow::Owned(s.to_owned()))
}

/// Parse the longest numeric prefix of `text` after leading whitespace,
/// e.g. `"3.5 kW"` gives 3.5
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    end = skip_digits(bytes, end);
    let mut digits = end - digits_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = skip_digits(bytes, end + 1);
        digits += fraction_end - (end + 1);
        end = fraction_end;
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_end = skip_digits(bytes, exponent);
        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    s[..end].parse().ok()
}

/// Parse the longest integer prefix of `text` after leading whitespace,
/// e.g. `"12 panels"` gives 12
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let end = skip_digits(bytes, sign);
    if end == sign {
        return None;
    }

    s[..end].parse().ok()
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}
