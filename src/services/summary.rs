//! Aggregation of existing invoices into one summary invoice.

use serde::Serialize;

use crate::error::AppError;
use crate::models::Invoice;
use crate::services::numbering;
use crate::services::tax::{self, round2};

/// An invoice id that could not be included, with the reason.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RejectedInvoice {
    pub invoice_id: i64,
    pub reason: String,
}

/// Result of aggregating the accepted invoices.
#[derive(Debug, Clone)]
pub struct SummaryAggregate {
    pub total_net: f64,
    pub total_tax: f64,
    pub total_gross: f64,
    pub range_text: String,
    pub accepted_ids: Vec<i64>,
    pub rejected: Vec<RejectedInvoice>,
}

/// Aggregate the requested invoices for one profile.
///
/// Ids that are missing or belong to a different profile are collected as
/// rejected instead of failing the whole request. At least one invoice
/// must survive.
pub fn aggregate(
    profile_id: i64,
    requested_ids: &[i64],
    invoices: &[Invoice],
) -> Result<SummaryAggregate, AppError> {
    let mut accepted: Vec<&Invoice> = Vec::new();
    let mut rejected = Vec::new();

    for &id in requested_ids {
        match invoices.iter().find(|inv| inv.id == id) {
            None => rejected.push(RejectedInvoice {
                invoice_id: id,
                reason: "not found".to_string(),
            }),
            Some(invoice) if invoice.profile_id != profile_id => {
                rejected.push(RejectedInvoice {
                    invoice_id: id,
                    reason: "belongs to a different profile".to_string(),
                });
            }
            Some(invoice) => accepted.push(invoice),
        }
    }

    if accepted.is_empty() {
        return Err(AppError::invalid(
            &["body"],
            "No valid invoices found for the given IDs",
        ));
    }

    let mut total_net = 0.0;
    let mut total_tax = 0.0;
    let mut total_gross = 0.0;
    for invoice in &accepted {
        let amounts = tax::compute_amounts(
            invoice.total_amount,
            invoice.tax_rate.unwrap_or(0.0),
            invoice.include_tax,
            invoice.is_gross_amount,
        );
        total_net += amounts.net;
        total_tax += amounts.tax;
        total_gross += amounts.gross;
    }

    let range_text = range_text(&accepted)?;

    Ok(SummaryAggregate {
        total_net: round2(total_net),
        total_tax: round2(total_tax),
        total_gross: round2(total_gross),
        range_text,
        accepted_ids: accepted.iter().map(|inv| inv.id).collect(),
        rejected,
    })
}

/// Covered number range, e.g. `"25 | 0003 - 25 | 0017"`. The sequence is
/// widened to four digits for display.
fn range_text(accepted: &[&Invoice]) -> Result<String, AppError> {
    let parsed: Vec<(&str, u32)> = accepted
        .iter()
        .filter_map(|inv| numbering::parse_number(&inv.number))
        .collect();
    let Some(&(year, first_seq)) = parsed.first() else {
        return Err(AppError::invalid(
            &["body"],
            "No valid invoice numbers found for range calculation",
        ));
    };
    let mut min_seq = first_seq;
    let mut max_seq = first_seq;
    for &(_, seq) in &parsed {
        min_seq = min_seq.min(seq);
        max_seq = max_seq.max(seq);
    }
    Ok(format!("{year} | {min_seq:04} - {year} | {max_seq:04}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn invoice(
        id: i64,
        number: &str,
        profile_id: i64,
        total_amount: f64,
        tax_rate: Option<f64>,
        include_tax: bool,
        is_gross_amount: bool,
    ) -> Invoice {
        Invoice {
            id,
            number: number.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            customer_id: 1,
            profile_id,
            total_amount,
            include_tax,
            tax_rate,
            is_gross_amount,
        }
    }

    #[test]
    fn mixed_gross_and_net_invoices_sum_correctly() {
        let invoices = vec![
            invoice(1, "25 | 001", 1, 119.0, Some(0.19), true, true),
            invoice(2, "25 | 002", 1, 100.0, Some(0.19), true, false),
        ];
        let result = aggregate(1, &[1, 2], &invoices).unwrap();
        assert_eq!(result.total_net, 200.0);
        assert_eq!(result.total_tax, 38.0);
        assert_eq!(result.total_gross, 238.0);
        assert_eq!(result.accepted_ids, vec![1, 2]);
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn missing_and_foreign_invoices_collected_as_rejected() {
        let invoices = vec![
            invoice(1, "25 | 001", 1, 100.0, None, false, false),
            invoice(2, "25 | 002", 2, 100.0, None, false, false),
        ];
        let result = aggregate(1, &[1, 2, 99], &invoices).unwrap();
        assert_eq!(result.accepted_ids, vec![1]);
        assert_eq!(
            result.rejected,
            vec![
                RejectedInvoice {
                    invoice_id: 2,
                    reason: "belongs to a different profile".to_string(),
                },
                RejectedInvoice {
                    invoice_id: 99,
                    reason: "not found".to_string(),
                },
            ]
        );
    }

    #[test]
    fn all_invalid_ids_is_an_error() {
        let invoices = vec![invoice(1, "25 | 001", 2, 100.0, None, false, false)];
        let err = aggregate(1, &[1, 5], &invoices).unwrap_err();
        assert!(err
            .to_string()
            .contains("No valid invoices found for the given IDs"));
    }

    #[test]
    fn range_text_pads_to_four_digits() {
        let invoices = vec![
            invoice(1, "25 | 017", 1, 10.0, None, false, false),
            invoice(2, "25 | 003", 1, 10.0, None, false, false),
            invoice(3, "25 | 104", 1, 10.0, None, false, false),
        ];
        let result = aggregate(1, &[1, 2, 3], &invoices).unwrap();
        assert_eq!(result.range_text, "25 | 0003 - 25 | 0104");
    }

    #[test]
    fn unparsable_numbers_skipped_in_range() {
        let invoices = vec![
            invoice(1, "broken", 1, 10.0, None, false, false),
            invoice(2, "25 | 008", 1, 10.0, None, false, false),
        ];
        let result = aggregate(1, &[1, 2], &invoices).unwrap();
        assert_eq!(result.range_text, "25 | 0008 - 25 | 0008");
    }

    #[test]
    fn no_parsable_numbers_is_an_error() {
        let invoices = vec![invoice(1, "broken", 1, 10.0, None, false, false)];
        let err = aggregate(1, &[1], &invoices).unwrap_err();
        assert!(err
            .to_string()
            .contains("No valid invoice numbers found for range calculation"));
    }

    #[test]
    fn totals_rounded_after_summation() {
        let invoices = vec![
            invoice(1, "25 | 001", 1, 33.335, Some(0.19), true, false),
            invoice(2, "25 | 002", 1, 33.335, Some(0.19), true, false),
        ];
        let result = aggregate(1, &[1, 2], &invoices).unwrap();
        assert_eq!(result.total_net, round2(round2(33.335) + round2(33.335)));
    }
}
