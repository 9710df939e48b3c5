// ============================================================================
// AdInvoice Core - Money Arithmetic
// File: crates/adinvoice-core/src/domain/money.rs
// Description: Line and document totals for proposals and invoices
// ============================================================================

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use validator::ValidationError;

/// Largest value a `NUMERIC(12,2)` amount column holds: 9999999999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Largest value a `NUMERIC(10,2)` quantity column holds: 99999999.99
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, 2);

/// GST rates are percentages
pub const MAX_GST_RATE: Decimal = Decimal::ONE_HUNDRED;

/// Round a monetary amount to 2 decimal places, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computed amounts for a single line item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    pub base: Decimal,
    pub gst: Decimal,
    pub total: Decimal,
}

impl LineAmounts {
    /// `base = quantity * price`, `gst = base * gst_rate / 100`, `total = base + gst`
    ///
    /// Saturates instead of overflowing; inputs are bounded by [`checked_line`]
    /// before they reach storage.
    pub fn compute(quantity: Decimal, price: Decimal, gst_rate: Decimal) -> Self {
        let base = round_money(quantity.saturating_mul(price));
        let gst = round_money(base.saturating_mul(gst_rate) / Decimal::ONE_HUNDRED);
        Self {
            base,
            gst,
            total: base.saturating_add(gst),
        }
    }

    /// Same as [`LineAmounts::compute`], `None` when any step overflows
    pub fn checked(quantity: Decimal, price: Decimal, gst_rate: Decimal) -> Option<Self> {
        let base = round_money(quantity.checked_mul(price)?);
        let gst = round_money(base.checked_mul(gst_rate)?.checked_div(Decimal::ONE_HUNDRED)?);
        Some(Self {
            base,
            gst,
            total: base.checked_add(gst)?,
        })
    }
}

fn amount_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Validator for stored amounts: `0 <= value <= MAX_AMOUNT`
pub(crate) fn valid_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(amount_error("negative", "Value cannot be negative"));
    }
    if *value > MAX_AMOUNT {
        return Err(amount_error("too_large", "Value cannot exceed 9999999999.99"));
    }
    Ok(())
}

/// Validator for GST percentages: `0 <= rate <= 100`
pub(crate) fn valid_gst_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate < Decimal::ZERO || *rate > MAX_GST_RATE {
        return Err(amount_error("gst_rate", "GST rate must be between 0 and 100"));
    }
    Ok(())
}

/// Line amounts that fit the amount columns, or a validation error
pub(crate) fn checked_line(
    quantity: Decimal,
    price: Decimal,
    gst_rate: Decimal,
) -> Result<LineAmounts, ValidationError> {
    LineAmounts::checked(quantity, price, gst_rate)
        .filter(|line| line.total <= MAX_AMOUNT)
        .ok_or_else(|| amount_error("line_total", "Line total cannot exceed 9999999999.99"))
}

/// Grand total of a set of lines, rejected when it would not fit an amount column
pub(crate) fn checked_grand_total<I>(lines: I) -> Result<Decimal, ValidationError>
where
    I: IntoIterator<Item = LineAmounts>,
{
    let mut grand_total = Decimal::ZERO;
    for line in lines {
        grand_total = grand_total
            .checked_add(line.total)
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or_else(|| {
                amount_error("grand_total", "Document total cannot exceed 9999999999.99")
            })?;
    }
    Ok(grand_total)
}

/// Document level totals, always derived from the line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub total_gst: Decimal,
    pub grand_total: Decimal,
}

impl DocumentTotals {
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = LineAmounts>,
    {
        let (subtotal, total_gst) = lines
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(base, gst), line| {
                (base + line.base, gst + line.gst)
            });

        Self {
            subtotal,
            total_gst,
            grand_total: subtotal + total_gst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_line_with_gst() {
        let line = LineAmounts::compute(dec!(3), dec!(100.00), dec!(18));
        assert_eq!(line.base, dec!(300.00));
        assert_eq!(line.gst, dec!(54.00));
        assert_eq!(line.total, dec!(354.00));
    }

    #[test]
    fn test_line_rounds_each_component() {
        let line = LineAmounts::compute(dec!(1.5), dec!(33.33), dec!(5));
        // 49.995 -> 50.00, 2.50
        assert_eq!(line.base, dec!(50.00));
        assert_eq!(line.gst, dec!(2.50));
        assert_eq!(line.total, dec!(52.50));
    }

    #[test]
    fn test_document_totals() {
        let totals = DocumentTotals::from_lines(vec![
            LineAmounts::compute(dec!(2), dec!(50), dec!(0)),
            LineAmounts::compute(dec!(1), dec!(200), dec!(18)),
        ]);
        assert_eq!(totals.subtotal, dec!(300));
        assert_eq!(totals.total_gst, dec!(36));
        assert_eq!(totals.grand_total, dec!(336));
    }

    #[test]
    fn test_column_bounds() {
        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
        assert_eq!(MAX_QUANTITY, dec!(99999999.99));
        assert!(valid_amount(&MAX_AMOUNT).is_ok());
        assert!(valid_amount(&dec!(10000000000.00)).is_err());
        assert!(valid_amount(&dec!(-0.01)).is_err());
        assert!(valid_gst_rate(&dec!(100)).is_ok());
        assert!(valid_gst_rate(&dec!(100.01)).is_err());
    }

    #[test]
    fn test_oversized_line_is_rejected_without_panicking() {
        let huge = Decimal::MAX;
        assert!(LineAmounts::checked(huge, huge, dec!(18)).is_none());
        let saturated = LineAmounts::compute(huge, huge, dec!(18));
        assert_eq!(saturated.total, Decimal::MAX);

        let err = checked_line(dec!(99999999.99), dec!(9999999999.99), dec!(18)).unwrap_err();
        assert_eq!(err.code, "line_total");
        assert!(checked_line(dec!(1), dec!(8474576271.18), dec!(18)).is_ok());
    }

    #[test]
    fn test_document_total_must_fit() {
        let line = LineAmounts::compute(dec!(1), dec!(6000000000), dec!(0));
        assert_eq!(checked_grand_total(vec![line]).unwrap(), dec!(6000000000.00));
        let err = checked_grand_total(vec![line, line]).unwrap_err();
        assert_eq!(err.code, "grand_total");
    }

    #[test]
    fn test_empty_document_is_zero() {
        let totals = DocumentTotals::from_lines(Vec::new());
        assert_eq!(totals, DocumentTotals::default());
    }
}
