use serde::Serialize;

/// Tuition charged per registered credit hour, in cents (100 currency units)
pub const RATE_PER_CREDIT_CENTS: i64 = 100_00;

/// A student's tuition position: what they owe versus what has settled.
///
/// All amounts are in cents. The balance is not clamped and goes negative
/// when a student has overpaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TuitionStatement {
    pub total_credits: i64,
    pub tuition_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
}

impl TuitionStatement {
    pub fn new(total_credits: i64, paid_cents: i64) -> Self {
        let tuition_cents = total_credits * RATE_PER_CREDIT_CENTS;

        Self {
            total_credits,
            tuition_cents,
            paid_cents,
            balance_cents: tuition_cents - paid_cents,
        }
    }
}

/// Formats cents as a currency string, e.g. `1234_56` -> `"$1234.56"`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_statement_balance() {
        let statement = TuitionStatement::new(7, 300_00);
        assert_eq!(statement.tuition_cents, 700_00);
        assert_eq!(statement.balance_cents, 400_00);
    }

    #[test]
    fn test_overpaid_balance_is_negative() {
        let statement = TuitionStatement::new(1, 150_00);
        assert_eq!(statement.balance_cents, -50_00);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1234_56), "$1234.56");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(-50_00), "-$50.00");
    }
}
