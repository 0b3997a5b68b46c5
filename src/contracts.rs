//! GFEX lithium carbonate contract codes: "LC" + 2-digit year + 2-digit
//! month, e.g. "LC2602" = February 2026.

use chrono::NaiveDate;

use crate::types::FutureQuote;

/// Parsed expiry of a contract code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractCode {
    pub year: i32,
    pub month: u32,
}

impl ContractCode {
    /// Parse "LC2602" style codes. Returns None for anything that does not
    /// match the LC + yymm shape.
    pub fn parse(code: &str) -> Option<Self> {
        let digits = code.strip_prefix("LC")?;
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let year = 2000 + digits[0..2].parse::<i32>().ok()?;
        let month = digits[2..4].parse::<u32>().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }

        Some(Self { year, month })
    }

    /// A contract is expired once its delivery month has fully passed.
    /// Contracts delivering in the current month are still active.
    pub fn is_expired(&self, on: NaiveDate) -> bool {
        use chrono::Datelike;
        self.year < on.year() || (self.year == on.year() && self.month < on.month())
    }

    /// Display label for the chart axis, e.g. "Feb-26"
    pub fn month_label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(d) => d.format("%b-%y").to_string(),
            None => String::new(),
        }
    }
}

/// Drop expired contracts from the display list, preserving relative order.
/// Codes that do not parse are kept: their expiry cannot be judged and the
/// curve should not silently lose points over a formatting quirk.
pub fn filter_active(futures: Vec<FutureQuote>, on: NaiveDate) -> Vec<FutureQuote> {
    futures
        .into_iter()
        .filter(|f| match ContractCode::parse(&f.contract) {
            Some(code) => !code.is_expired(on),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn quote(contract: &str) -> FutureQuote {
        let code = ContractCode::parse(contract);
        FutureQuote {
            contract: contract.to_string(),
            month: code.map(|c| c.month_label()).unwrap_or_default(),
            price_cny: Decimal::from(160000),
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            ContractCode::parse("LC2602"),
            Some(ContractCode {
                year: 2026,
                month: 2
            })
        );
        assert_eq!(ContractCode::parse("LC2613"), None); // month 13
        assert_eq!(ContractCode::parse("LC260"), None);
        assert_eq!(ContractCode::parse("LC26021"), None);
        assert_eq!(ContractCode::parse("XX2602"), None);
        assert_eq!(ContractCode::parse("LCabcd"), None);
    }

    #[test]
    fn test_expiry_boundaries() {
        let code = ContractCode::parse("LC2602").unwrap();

        // Past its delivery month
        assert!(code.is_expired(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        // Within its delivery month: still active
        assert!(!code.is_expired(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
        assert!(!code.is_expired(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));

        // Next-year contract is never expired this year
        let next_year = ContractCode::parse("LC2701").unwrap();
        assert!(!next_year.is_expired(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));

        // Prior-year contract is expired even in January
        let last_year = ContractCode::parse("LC2511").unwrap();
        assert!(last_year.is_expired(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_month_label() {
        assert_eq!(ContractCode::parse("LC2602").unwrap().month_label(), "Feb-26");
        assert_eq!(ContractCode::parse("LC2711").unwrap().month_label(), "Nov-27");
    }

    #[test]
    fn test_filter_preserves_order_and_keeps_unparseable() {
        let on = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let futures = vec![
            quote("LC2601"), // expired
            quote("LC2603"), // current month, active
            quote("WHAT"),   // unparseable, kept
            quote("LC2607"),
            quote("LC2602"), // expired
            quote("LC2711"),
        ];

        let active = filter_active(futures, on);
        let contracts: Vec<&str> = active.iter().map(|f| f.contract.as_str()).collect();
        assert_eq!(contracts, vec!["LC2603", "WHAT", "LC2607", "LC2711"]);
    }
}
