//! Net, tax and gross amounts derived from a stored invoice total.

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxAmounts {
    pub net: f64,
    pub tax: f64,
    pub gross: f64,
}

/// Derive the three amounts from a stored total.
///
/// Without tax the total is both net and gross. With tax, the
/// `is_gross_amount` flag decides whether the total is read as gross
/// (tax extracted) or net (tax added). Each amount is rounded
/// independently, so `net + tax` may differ from `gross` by a cent.
pub fn compute_amounts(
    total_amount: f64,
    tax_rate: f64,
    include_tax: bool,
    is_gross_amount: bool,
) -> TaxAmounts {
    if !include_tax || tax_rate == 0.0 {
        let amount = round2(total_amount);
        return TaxAmounts {
            net: amount,
            tax: 0.0,
            gross: amount,
        };
    }

    if is_gross_amount {
        let gross = total_amount;
        let net = gross / (1.0 + tax_rate);
        let tax = gross - net;
        TaxAmounts {
            net: round2(net),
            tax: round2(tax),
            gross: round2(gross),
        }
    } else {
        let net = total_amount;
        let tax = net * tax_rate;
        TaxAmounts {
            net: round2(net),
            tax: round2(tax),
            gross: round2(net + tax),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tax_total_is_net_and_gross() {
        let amounts = compute_amounts(150.0, 0.19, false, false);
        assert_eq!(amounts.net, 150.0);
        assert_eq!(amounts.tax, 0.0);
        assert_eq!(amounts.gross, 150.0);
    }

    #[test]
    fn zero_rate_behaves_like_no_tax() {
        let amounts = compute_amounts(150.0, 0.0, true, false);
        assert_eq!(amounts.net, 150.0);
        assert_eq!(amounts.tax, 0.0);
        assert_eq!(amounts.gross, 150.0);
    }

    #[test]
    fn net_total_adds_tax() {
        let amounts = compute_amounts(100.0, 0.19, true, false);
        assert_eq!(amounts.net, 100.0);
        assert_eq!(amounts.tax, 19.0);
        assert_eq!(amounts.gross, 119.0);
    }

    #[test]
    fn gross_total_extracts_tax() {
        let amounts = compute_amounts(119.0, 0.19, true, true);
        assert_eq!(amounts.net, 100.0);
        assert_eq!(amounts.tax, 19.0);
        assert_eq!(amounts.gross, 119.0);
    }

    #[test]
    fn amounts_rounded_independently() {
        let amounts = compute_amounts(100.0, 0.19, true, true);
        assert_eq!(amounts.net, 84.03);
        assert_eq!(amounts.tax, 15.97);
        assert_eq!(amounts.gross, 100.0);
    }

    #[test]
    fn round2_truncates_to_cents() {
        assert_eq!(round2(1.004), 1.0);
        assert_eq!(round2(1.006), 1.01);
        assert_eq!(round2(-1.006), -1.01);
    }
}
