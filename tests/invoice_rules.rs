//! Invoice creation rules: tax derivation, field validation ordering and
//! the item sum tolerance.

use chrono::NaiveDate;
use faktura_service::models::{InvoiceCreate, InvoiceItemCreate, Profile};
use faktura_service::services::tax::compute_amounts;
use faktura_service::AppError;

fn item(quantity: i32, price: f64) -> InvoiceItemCreate {
    InvoiceItemCreate {
        quantity,
        description: "Beratung".to_string(),
        price,
        tax_rate: None,
    }
}

fn request(total_amount: f64, items: Vec<InvoiceItemCreate>) -> InvoiceCreate {
    InvoiceCreate {
        date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        customer_id: 1,
        profile_id: 1,
        total_amount,
        invoice_items: items,
        include_tax: Some(true),
        tax_rate: Some(0.19),
        is_gross_amount: false,
    }
}

fn profile(include_tax: bool, default_tax_rate: f64) -> Profile {
    Profile {
        id: 1,
        name: "Musterfirma".to_string(),
        address: "Hauptstr. 5".to_string(),
        city: "Hamburg".to_string(),
        bank_data: None,
        tax_number: Some("12/345/67890".to_string()),
        include_tax,
        default_tax_rate,
    }
}

#[test]
fn gross_and_net_invoices_agree_on_totals() {
    // 119 gross and 100 net at 19% describe the same economic value.
    let from_gross = compute_amounts(119.0, 0.19, true, true);
    let from_net = compute_amounts(100.0, 0.19, true, false);

    assert_eq!(from_gross.net, from_net.net);
    assert_eq!(from_gross.tax, from_net.tax);
    assert_eq!(from_gross.gross, from_net.gross);
    assert_eq!(from_gross.net + from_gross.tax, from_gross.gross);
}

#[test]
fn tax_exempt_invoice_has_equal_net_and_gross() {
    let amounts = compute_amounts(250.0, 0.0, false, false);
    assert_eq!(amounts.net, 250.0);
    assert_eq!(amounts.tax, 0.0);
    assert_eq!(amounts.gross, 250.0);
}

#[test]
fn validation_reports_first_violated_rule() {
    // An empty item list wins over the negative total.
    let mut req = request(-5.0, vec![]);
    let err = req.validate_fields().unwrap_err();
    assert!(matches!(err, AppError::Validation { ref msg, .. }
        if msg == "invoice_items must not be empty"));

    req.invoice_items = vec![item(1, 10.0)];
    let err = req.validate_fields().unwrap_err();
    assert!(matches!(err, AppError::Validation { ref msg, .. }
        if msg == "total_amount must be >= 0"));
}

#[test]
fn gross_flag_requires_explicit_tax() {
    let mut req = request(119.0, vec![item(1, 119.0)]);
    req.is_gross_amount = true;
    req.include_tax = None;
    let err = req.validate_fields().unwrap_err();
    assert!(matches!(err, AppError::Validation { ref msg, .. }
        if msg == "is_gross_amount can only be True if include_tax is True"));

    req.include_tax = Some(true);
    req.tax_rate = None;
    let err = req.validate_fields().unwrap_err();
    assert!(matches!(err, AppError::Validation { ref msg, .. }
        if msg == "tax_rate must be provided if is_gross_amount is True"));

    req.tax_rate = Some(0.19);
    assert!(req.validate_fields().is_ok());
}

#[test]
fn unset_tax_fields_inherit_profile_defaults() {
    let mut req = request(100.0, vec![item(1, 100.0)]);
    req.include_tax = None;
    req.tax_rate = None;

    let (include_tax, tax_rate) = req.resolve_tax_fields(&profile(true, 0.07));
    assert!(include_tax);
    assert_eq!(tax_rate, Some(0.07));

    let (include_tax, tax_rate) = req.resolve_tax_fields(&profile(false, 0.19));
    assert!(!include_tax);
    assert_eq!(tax_rate, Some(0.0));
}

#[test]
fn explicit_tax_fields_override_profile() {
    let req = request(100.0, vec![item(1, 100.0)]);
    let (include_tax, tax_rate) = req.resolve_tax_fields(&profile(false, 0.07));
    assert!(include_tax);
    assert_eq!(tax_rate, Some(0.19));
}

#[test]
fn item_sum_tolerance_is_exclusive_below_one_cent() {
    // The item sum is rounded to cents before the comparison, so only a
    // sub-half-cent difference survives.
    let req = request(100.0, vec![item(1, 100.004)]);
    assert!(req.check_items_total().is_ok());

    let req = request(100.0, vec![item(1, 99.996)]);
    assert!(req.check_items_total().is_ok());

    // 0.009 raw rounds to a full cent and is rejected.
    let req = request(100.0, vec![item(1, 100.009)]);
    assert!(req.check_items_total().is_err());

    let req = request(100.0, vec![item(1, 100.011)]);
    let err = req.check_items_total().unwrap_err();
    assert!(matches!(err, AppError::Validation { ref msg, .. }
        if msg == "Sum of invoice items exceeds total_amount by more than 0.01."));

    let req = request(100.0, vec![item(1, 99.989)]);
    let err = req.check_items_total().unwrap_err();
    assert!(matches!(err, AppError::Validation { ref msg, .. }
        if msg == "Sum of invoice items is less than total_amount by more than 0.01."));
}

#[test]
fn item_sum_uses_quantities() {
    let req = request(100.0, vec![item(3, 25.0), item(1, 25.0)]);
    assert!(req.check_items_total().is_ok());
}
