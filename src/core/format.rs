use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Rounding applied before a number is turned into label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Keep the shortest exact representation of the value.
    #[default]
    None,
    /// Round to `n` digits after the decimal point.
    Decimals(u32),
    /// Round to a multiple of `10^n` (`PowerOfTen(2)` rounds 1234 to 1200).
    PowerOfTen(u32),
}

/// Locale-style number formatting shared by scale labels, data labels and
/// tooltips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub decimal_separator: String,
    pub thousand_separator: String,
    pub rounding: Rounding,
    /// Pads `Rounding::Decimals` results with trailing zeros.
    pub fixed_decimals: bool,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: ".".to_owned(),
            thousand_separator: String::new(),
            rounding: Rounding::None,
            fixed_decimals: false,
        }
    }
}

impl NumberFormat {
    #[must_use]
    pub fn with_separators(
        mut self,
        decimal_separator: impl Into<String>,
        thousand_separator: impl Into<String>,
    ) -> Self {
        self.decimal_separator = decimal_separator.into();
        self.thousand_separator = thousand_separator.into();
        self
    }

    #[must_use]
    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    #[must_use]
    pub fn with_fixed_decimals(mut self, fixed_decimals: bool) -> Self {
        self.fixed_decimals = fixed_decimals;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.decimal_separator.is_empty() {
            return Err(ChartError::InvalidConfig(
                "decimal separator must not be empty".to_owned(),
            ));
        }
        if self.decimal_separator == self.thousand_separator {
            return Err(ChartError::InvalidConfig(format!(
                "decimal and thousand separators must differ (both `{}`)",
                self.decimal_separator
            )));
        }
        if self
            .decimal_separator
            .chars()
            .chain(self.thousand_separator.chars())
            .any(|c| c.is_ascii_digit() || c == '-')
        {
            return Err(ChartError::InvalidConfig(
                "separators must not contain digits or '-'".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Applies the rounding policy without producing text.
#[must_use]
pub fn round_value(value: f64, rounding: Rounding) -> f64 {
    if !value.is_finite() {
        return value;
    }
    match rounding {
        Rounding::None => value,
        Rounding::Decimals(places) => Decimal::from_f64(value)
            .map(|d| d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|d| d.to_f64())
            .unwrap_or(value),
        Rounding::PowerOfTen(exponent) => {
            let unit = 10f64.powi(exponent as i32);
            (value / unit).round() * unit
        }
    }
}

/// Formats `value` with the configured rounding and separators.
///
/// Decimal rounding goes through `rust_decimal` so `1.005` rounds to `1.01`
/// the way a reader expects, not to the binary neighbour `1.00`.
#[must_use]
pub fn format_number(value: f64, format: &NumberFormat) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = match format.rounding {
        Rounding::Decimals(places) => Decimal::from_f64(value).map(|d| {
            let rounded =
                d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
            if format.fixed_decimals {
                let mut padded = rounded;
                padded.rescale(places);
                padded
            } else {
                rounded.normalize()
            }
        }),
        Rounding::None | Rounding::PowerOfTen(_) => {
            Decimal::from_f64(round_value(value, format.rounding)).map(|d| d.normalize())
        }
    }
    .map(|d| d.to_string())
    .unwrap_or_else(|| round_value(value, format.rounding).to_string());

    apply_separators(&digits, format)
}

fn apply_separators(plain: &str, format: &NumberFormat) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut out = String::with_capacity(plain.len() + 8);
    out.push_str(sign);
    let len = integer.len();
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push_str(&format.thousand_separator);
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push_str(&format.decimal_separator);
        out.push_str(fraction);
    }
    out
}

/// Parses text produced by [`format_number`] back into a number.
pub fn unformat(text: &str, format: &NumberFormat) -> ChartResult<f64> {
    let mut plain = text.trim().to_owned();
    if !format.thousand_separator.is_empty() {
        plain = plain.replace(&format.thousand_separator, "");
    }
    if format.decimal_separator != "." {
        plain = plain.replace(&format.decimal_separator, ".");
    }
    plain
        .parse::<f64>()
        .map_err(|_| ChartError::InvalidData(format!("`{text}` is not a formatted number")))
}
