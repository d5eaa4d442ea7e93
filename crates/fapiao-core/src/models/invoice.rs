//! Invoice data recovered from a tax-invoice PDF.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three fields used to name an invoice file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFields {
    /// Issue date rendered as `YYYY年MM月DD日`.
    pub date: Option<String>,

    /// Invoice code: 8 digits (paper) or 20 digits (electronic).
    pub code: Option<String>,

    /// Total amount with exactly two decimals.
    pub money: Option<String>,
}

impl InvoiceFields {
    /// The issue date as a calendar date, when it is a real one.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y年%m月%d日").ok()
    }

    /// The amount as a decimal value.
    pub fn money_value(&self) -> Option<Decimal> {
        self.money.as_deref().and_then(|m| Decimal::from_str(m).ok())
    }

    /// Names of the fields that could not be extracted.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.code.is_none() {
            missing.push("code");
        }
        if self.money.is_none() {
            missing.push("money");
        }
        missing
    }

    /// Whether every field was found.
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.code.is_some() && self.money.is_some()
    }
}

/// Which strategy produced a field, and how much it is trusted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSource {
    /// Field name (`date`, `code` or `money`).
    pub field: &'static str,
    /// Name of the winning strategy.
    pub strategy: &'static str,
    /// Confidence of that strategy (0.0 - 1.0).
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_date() {
        let fields = InvoiceFields {
            date: Some("2024年03月13日".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.issue_date(), NaiveDate::from_ymd_opt(2024, 3, 13));
    }

    #[test]
    fn test_partial_date_is_not_a_calendar_date() {
        let fields = InvoiceFields {
            date: Some("2024年03月日".to_string()),
            ..Default::default()
        };
        assert!(fields.issue_date().is_none());
    }

    #[test]
    fn test_missing_fields() {
        let fields = InvoiceFields {
            money: Some("21.00".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.missing_fields(), vec!["date", "code"]);
        assert!(!fields.is_complete());
        assert_eq!(fields.money_value(), Decimal::from_str("21.00").ok());
    }
}
