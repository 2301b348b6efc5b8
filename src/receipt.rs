//! Receipt
//!
//! Tabular rendering of a cart or a placed order for the terminal.

use std::{fmt::Write, io};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    carts::{Cart, CartError, CartTotals},
    catalog::VariantUuid,
    coupons::CouponCode,
    orders::{Order, OrderError, OrderStatus, ShippingMethod},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A line references a variant with no display label.
    #[error("missing label for variant {0}")]
    MissingVariant(VariantUuid),

    /// An amount is too large to display.
    #[error("amount {0} is out of range")]
    OutOfRange(u64),

    /// Wrapped cart failure.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped order failure.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One purchased line as shown on the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    /// Display label, e.g. `Linen Dress (Sand, M)`
    pub label: String,
    /// Units
    pub quantity: u32,
    /// Unit price in minor units
    pub unit_price: u64,
    /// `quantity * unit_price`
    pub line_total: u64,
}

/// Receipt summary for a cart or order.
#[derive(Debug, Clone)]
pub struct Receipt {
    lines: SmallVec<[ReceiptLine; 8]>,
    subtotal: u64,
    discount: u64,
    coupon: Option<CouponCode>,
    shipping: Option<(ShippingMethod, u64)>,
    status: Option<OrderStatus>,
    total: u64,
    currency: &'static Currency,
}

impl Receipt {
    /// Build a receipt for a cart using already computed totals.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::MissingVariant`] when a line has no label, or a
    /// cart error if a line total overflows.
    pub fn from_cart(
        cart: &Cart,
        totals: &CartTotals,
        labels: &FxHashMap<VariantUuid, String>,
        currency: &'static Currency,
    ) -> Result<Self, ReceiptError> {
        let mut lines = SmallVec::new();

        for item in cart.items() {
            lines.push(ReceiptLine {
                label: label_for(labels, item.variant())?,
                quantity: item.quantity(),
                unit_price: item.unit_price(),
                line_total: item.line_total()?,
            });
        }

        Ok(Self {
            lines,
            subtotal: totals.subtotal,
            discount: totals.discount,
            coupon: cart.coupon().cloned(),
            shipping: None,
            status: None,
            total: totals.total,
            currency,
        })
    }

    /// Build a receipt for a placed order.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::MissingVariant`] when a line has no label, or an
    /// order error if a line total overflows.
    pub fn from_order(
        order: &Order,
        labels: &FxHashMap<VariantUuid, String>,
        currency: &'static Currency,
    ) -> Result<Self, ReceiptError> {
        let mut lines = SmallVec::new();

        for item in order.items() {
            lines.push(ReceiptLine {
                label: label_for(labels, item.variant)?,
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total()?,
            });
        }

        Ok(Self {
            lines,
            subtotal: order.subtotal(),
            discount: order.discount_amount(),
            coupon: order.coupon_code().cloned(),
            shipping: Some((order.shipping_method(), order.shipping_cost())),
            status: Some(order.status()),
            total: order.total(),
            currency,
        })
    }

    /// Receipt lines in cart order.
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }

    /// Coupon discount.
    pub fn discount(&self) -> u64 {
        self.discount
    }

    /// Amount due.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Currency used for all monetary values.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Render the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::OutOfRange`] for amounts that cannot be shown
    /// and [`ReceiptError::IO`] when writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Line Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.label.clone(),
                line.quantity.to_string(),
                self.money(line.unit_price)?,
                self.money(line.line_total)?,
            ]);
        }

        write_table(&mut out, builder)?;
        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut rows: SmallVec<[(String, String); 5]> = SmallVec::new();

        rows.push((" Subtotal:".to_string(), format!("{}  ", self.money(self.subtotal)?)));

        if let Some(code) = &self.coupon {
            rows.push((
                format!(" Coupon {code}:"),
                format!("-{}  ", self.money(self.discount)?),
            ));
        }

        if let Some((method, cost)) = self.shipping {
            let label = match method {
                ShippingMethod::FreeDelivery => " Shipping (free delivery):",
                ShippingMethod::PostOffice => " Shipping (post office):",
            };

            rows.push((label.to_string(), format!("{}  ", self.money(cost)?)));
        }

        rows.push((
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}\x1b[0m  ", self.money(self.total)?),
        ));

        if let Some(status) = self.status {
            rows.push((" Status:".to_string(), format!("{status}  ")));
        }

        let label_width = rows
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or_default();

        let value_width = rows
            .iter()
            .map(|(_, value)| visible_width(value))
            .max()
            .unwrap_or_default();

        for (label, value) in &rows {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }

    fn money(&self, amount: u64) -> Result<String, ReceiptError> {
        let minor = i64::try_from(amount).map_err(|_err| ReceiptError::OutOfRange(amount))?;

        Ok(Money::from_minor(minor, self.currency).to_string())
    }
}

fn label_for(
    labels: &FxHashMap<VariantUuid, String>,
    variant: VariantUuid,
) -> Result<String, ReceiptError> {
    labels
        .get(&variant)
        .cloned()
        .ok_or(ReceiptError::MissingVariant(variant))
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark grey.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Width of a string ignoring ANSI escape sequences.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        carts::{CartOwner, CartUuid, CustomerUuid},
        inventory::{InventoryLedger, Stock},
        orders::{Checkout, ShippingRates, finalize_order},
    };

    use super::*;

    fn cart_with_labels() -> TestResult<(Cart, FxHashMap<VariantUuid, String>, VariantUuid)> {
        let variant = VariantUuid::new();
        let mut cart = Cart::new(
            CartUuid::new(),
            CartOwner::Customer(CustomerUuid::new()),
            Timestamp::UNIX_EPOCH,
        );
        cart.add_item(variant, 3, 1_250, Timestamp::UNIX_EPOCH)?;

        let mut labels = FxHashMap::default();
        labels.insert(variant, "Linen Dress (Sand, M)".to_string());

        Ok((cart, labels, variant))
    }

    #[test]
    fn cart_receipt_lists_lines_and_totals() -> TestResult {
        let (cart, labels, _) = cart_with_labels()?;
        let totals = cart.totals(None, Timestamp::UNIX_EPOCH)?;

        let receipt = Receipt::from_cart(&cart, &totals, &labels, USD)?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;
        let output = String::from_utf8(out)?;

        assert_eq!(receipt.lines().len(), 1);
        assert!(output.contains("Linen Dress (Sand, M)"));
        assert!(output.contains("$12.50"));
        assert!(output.contains("$37.50"));
        assert!(output.contains("Subtotal:"));
        assert!(!output.contains("Shipping"));

        Ok(())
    }

    #[test]
    fn order_receipt_includes_shipping_and_status() -> TestResult {
        let (cart, labels, variant) = cart_with_labels()?;
        let mut ledger = InventoryLedger::new();
        ledger.track(variant, Stock::new(5, 5)?);

        let order = finalize_order(
            &cart,
            Checkout {
                shipping_method: ShippingMethod::PostOffice,
                shipping_address: None,
            },
            &ShippingRates { post_office: 500 },
            &mut ledger,
            None,
            Timestamp::UNIX_EPOCH,
        )?;

        let receipt = Receipt::from_order(&order, &labels, USD)?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;
        let output = String::from_utf8(out)?;

        assert_eq!(receipt.total(), 4_250);
        assert!(output.contains("Shipping (post office):"));
        assert!(output.contains("$42.50"));
        assert!(output.contains("pending"));

        Ok(())
    }

    #[test]
    fn missing_label_is_an_error() -> TestResult {
        let (cart, _, variant) = cart_with_labels()?;
        let totals = cart.totals(None, Timestamp::UNIX_EPOCH)?;

        let result = Receipt::from_cart(&cart, &totals, &FxHashMap::default(), USD);

        assert!(matches!(result, Err(ReceiptError::MissingVariant(missing)) if missing == variant));

        Ok(())
    }

    #[test]
    fn visible_width_skips_ansi_sequences() {
        assert_eq!(visible_width("\x1b[1mTotal:\x1b[0m"), 6);
        assert_eq!(visible_width("plain"), 5);
    }
}
