use crate::domain::gateway::{CreditType, LineItem};
use crate::host::Cart;
use rust_decimal::Decimal;

/// Gateway field limits.
const MAX_DESCRIPTION_LEN: usize = 25;
const MAX_PRODUCT_CODE_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct LineItemBreakdown {
    pub items: Vec<LineItem>,
    pub tax_amount: Decimal,
}

/// Builds the itemized breakdown the gateway requires: one item per cart
/// line, plus checkout-attribute charges, the payment-method surcharge,
/// shipping, and a synthetic discount line whenever the itemized sum plus tax
/// does not reconcile with the charged total. The gateway rejects requests
/// whose items do not sum to the transaction amount.
pub fn build_line_items(cart: &Cart, order_total: Decimal, surcharge: Decimal) -> LineItemBreakdown {
    let mut items = Vec::new();

    for line in &cart.lines {
        items.push(item(line.unit_price, &line.description, &line.sku, line.quantity));
    }

    for charge in &cart.attribute_charges {
        if charge.amount > Decimal::ZERO {
            items.push(item(charge.amount, &charge.label, "checkout", 1));
        }
    }

    if surcharge > Decimal::ZERO {
        items.push(item(surcharge, "Payment fee", "payment", 1));
    }

    if let Some(shipping) = cart.shipping {
        if shipping > Decimal::ZERO {
            items.push(item(shipping, "Shipping rate", "shipping", 1));
        }
    }

    let tax_amount = cart.tax_total.round_dp(2);
    let items_total: Decimal = items
        .iter()
        .map(|i| i.unit_price * Decimal::from(i.quantity))
        .sum();
    let difference = order_total - items_total - tax_amount;
    if difference < Decimal::ZERO {
        items.push(item(difference, "Discount amount", "discounts", 1));
    }

    LineItemBreakdown { items, tax_amount }
}

fn item(price: Decimal, description: &str, product_code: &str, quantity: i32) -> LineItem {
    LineItem {
        quantity,
        description: truncate(description, MAX_DESCRIPTION_LEN),
        measure_unit: "*".to_string(),
        product_code: truncate(product_code, MAX_PRODUCT_CODE_LEN),
        credit_type: CreditType::Debit,
        unit_price: price.round_dp(2),
    }
}

fn truncate(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CartLine, CheckoutCharge};
    use rust_decimal_macros::dec;

    fn cart_with_product(unit_price: Decimal, quantity: i32, tax: Decimal) -> Cart {
        Cart {
            lines: vec![CartLine {
                description: "Build your own computer".to_string(),
                sku: "COMP_CUST".to_string(),
                quantity,
                unit_price,
            }],
            attribute_charges: Vec::new(),
            shipping: None,
            tax_total: tax,
        }
    }

    fn items_total(breakdown: &LineItemBreakdown) -> Decimal {
        breakdown
            .items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum()
    }

    #[test]
    fn matching_totals_produce_no_discount_line() {
        let cart = cart_with_product(dec!(100.00), 1, dec!(8.25));
        let breakdown = build_line_items(&cart, dec!(108.25), Decimal::ZERO);

        assert_eq!(breakdown.items.len(), 1);
        assert_eq!(breakdown.tax_amount, dec!(8.25));
        assert_eq!(items_total(&breakdown) + breakdown.tax_amount, dec!(108.25));
    }

    #[test]
    fn discounted_total_gains_a_negative_reconciliation_line() {
        let cart = cart_with_product(dec!(100.00), 1, Decimal::ZERO);
        let breakdown = build_line_items(&cart, dec!(90.00), Decimal::ZERO);

        assert_eq!(breakdown.items.len(), 2);
        let discount = breakdown.items.last().unwrap();
        assert_eq!(discount.unit_price, dec!(-10.00));
        assert_eq!(discount.product_code, "discounts");
        assert_eq!(items_total(&breakdown), dec!(90.00));
    }

    #[test]
    fn items_plus_tax_reconcile_with_the_order_total() {
        let cart = Cart {
            lines: vec![
                CartLine {
                    description: "Laptop".to_string(),
                    sku: "LP-1".to_string(),
                    quantity: 2,
                    unit_price: dec!(499.99),
                },
                CartLine {
                    description: "Mouse".to_string(),
                    sku: "MS-9".to_string(),
                    quantity: 1,
                    unit_price: dec!(25.50),
                },
            ],
            attribute_charges: vec![CheckoutCharge {
                label: "Gift wrapping (Yes)".to_string(),
                amount: dec!(5.00),
            }],
            shipping: Some(dec!(12.00)),
            tax_total: dec!(84.52),
        };
        // Host applied a 50.00 order-level discount.
        let order_total = dec!(1077.00);
        let breakdown = build_line_items(&cart, order_total, dec!(1.50));

        let reconciled = items_total(&breakdown) + breakdown.tax_amount;
        assert!((reconciled - order_total).abs() <= dec!(0.01));
        assert!(breakdown
            .items
            .iter()
            .any(|i| i.product_code == "discounts" && i.unit_price < Decimal::ZERO));
    }

    #[test]
    fn surcharge_and_shipping_become_items() {
        let cart = Cart {
            lines: Vec::new(),
            attribute_charges: Vec::new(),
            shipping: Some(dec!(10.00)),
            tax_total: Decimal::ZERO,
        };
        let breakdown = build_line_items(&cart, dec!(11.50), dec!(1.50));

        let codes: Vec<&str> = breakdown
            .items
            .iter()
            .map(|i| i.product_code.as_str())
            .collect();
        assert_eq!(codes, vec!["payment", "shipping"]);
    }

    #[test]
    fn descriptions_and_codes_are_truncated_to_gateway_limits() {
        let cart = Cart {
            lines: vec![CartLine {
                description: "An unreasonably verbose product title".to_string(),
                sku: "SKU-WITH-MANY-CHARACTERS".to_string(),
                quantity: 1,
                unit_price: dec!(1.00),
            }],
            attribute_charges: Vec::new(),
            shipping: None,
            tax_total: Decimal::ZERO,
        };
        let breakdown = build_line_items(&cart, dec!(1.00), Decimal::ZERO);

        assert_eq!(breakdown.items[0].description.chars().count(), 25);
        assert_eq!(breakdown.items[0].product_code.chars().count(), 12);
    }

    #[test]
    fn zero_value_attribute_charges_are_skipped() {
        let cart = Cart {
            lines: Vec::new(),
            attribute_charges: vec![CheckoutCharge {
                label: "None".to_string(),
                amount: Decimal::ZERO,
            }],
            shipping: None,
            tax_total: Decimal::ZERO,
        };
        let breakdown = build_line_items(&cart, Decimal::ZERO, Decimal::ZERO);
        assert!(breakdown.items.is_empty());
    }
}
