//! Inventory
//!
//! Physical (total) stock versus the share of it exposed for online sale.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::VariantUuid;

/// Errors raised by stock bookkeeping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// Online stock may never exceed total stock.
    #[error("online stock ({online}) exceeds total stock ({total})")]
    OnlineExceedsTotal {
        /// Requested online stock
        online: u32,
        /// Total stock
        total: u32,
    },

    /// Not enough online stock for the requested quantity.
    #[error("insufficient online stock for variant {variant}: requested {requested}, available {available}")]
    Insufficient {
        /// Variant being sold
        variant: VariantUuid,
        /// Quantity requested
        requested: u64,
        /// Online stock currently available
        available: u32,
    },

    /// The variant has no stock record.
    #[error("no stock tracked for variant {0}")]
    Untracked(VariantUuid),

    /// Stock counters would overflow.
    #[error("stock counter overflowed")]
    Overflow,
}

/// Stock levels of a single variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    total: u32,
    online: u32,
}

impl Stock {
    /// Create stock levels.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::OnlineExceedsTotal`] when `online > total`.
    pub fn new(total: u32, online: u32) -> Result<Self, InventoryError> {
        if online > total {
            return Err(InventoryError::OnlineExceedsTotal { online, total });
        }

        Ok(Self { total, online })
    }

    /// Total physical stock.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Stock sellable through the storefront.
    pub fn online(&self) -> u32 {
        self.online
    }

    /// Whether `quantity` units can be sold online.
    pub fn can_sell(&self, quantity: u64) -> bool {
        u64::from(self.online) >= quantity
    }

    fn sell(&mut self, quantity: u32) {
        self.online -= quantity;
    }

    fn release(&mut self, quantity: u32) {
        self.online = self.online.saturating_add(quantity).min(self.total);
    }
}

/// A quantity of one variant moving in or out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLine {
    /// Variant affected
    pub variant: VariantUuid,
    /// Units moved
    pub quantity: u32,
}

/// Stock levels for every tracked variant.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    levels: FxHashMap<VariantUuid, Stock>,
}

impl InventoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or replace) tracking for a variant.
    pub fn track(&mut self, variant: VariantUuid, stock: Stock) {
        self.levels.insert(variant, stock);
    }

    /// Stock levels of a variant.
    pub fn stock(&self, variant: VariantUuid) -> Option<Stock> {
        self.levels.get(&variant).copied()
    }

    /// Check that `quantity` units of `variant` are available online.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Untracked`] or [`InventoryError::Insufficient`].
    pub fn ensure_available(&self, variant: VariantUuid, quantity: u64) -> Result<(), InventoryError> {
        let stock = self
            .levels
            .get(&variant)
            .ok_or(InventoryError::Untracked(variant))?;

        if stock.can_sell(quantity) {
            Ok(())
        } else {
            Err(InventoryError::Insufficient {
                variant,
                requested: quantity,
                available: stock.online,
            })
        }
    }

    /// Sell every line from online stock, or none of them. Total stock is
    /// left to the warehouse.
    ///
    /// Lines for the same variant are summed before checking availability.
    ///
    /// # Errors
    ///
    /// Returns the first availability failure; the ledger is left untouched.
    pub fn commit_sale(&mut self, lines: &[StockLine]) -> Result<(), InventoryError> {
        let demand = aggregate(lines)?;

        for (&variant, &quantity) in &demand {
            self.ensure_available(variant, u64::from(quantity))?;
        }

        for (variant, quantity) in demand {
            if let Some(stock) = self.levels.get_mut(&variant) {
                stock.sell(quantity);
            }
        }

        Ok(())
    }

    /// Return sold units to online stock, never above total stock.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Untracked`] for unknown variants or
    /// [`InventoryError::Overflow`]; the ledger is left untouched.
    pub fn release(&mut self, lines: &[StockLine]) -> Result<(), InventoryError> {
        let returned = aggregate(lines)?;
        let mut updated = Vec::with_capacity(returned.len());

        for (variant, quantity) in returned {
            let mut stock = self.stock(variant).ok_or(InventoryError::Untracked(variant))?;
            stock.release(quantity);
            updated.push((variant, stock));
        }

        self.levels.extend(updated);

        Ok(())
    }

    /// Add physical stock, optionally exposing it online as well.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Untracked`] or [`InventoryError::Overflow`].
    pub fn restock(
        &mut self,
        variant: VariantUuid,
        quantity: u32,
        online: bool,
    ) -> Result<Stock, InventoryError> {
        let stock = self
            .levels
            .get_mut(&variant)
            .ok_or(InventoryError::Untracked(variant))?;

        let total = stock
            .total
            .checked_add(quantity)
            .ok_or(InventoryError::Overflow)?;

        stock.total = total;

        if online {
            stock.online += quantity;
        }

        Ok(*stock)
    }

    /// Change how much of the total stock is sold online.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Untracked`] or [`InventoryError::OnlineExceedsTotal`].
    pub fn set_online(&mut self, variant: VariantUuid, online: u32) -> Result<Stock, InventoryError> {
        let stock = self
            .levels
            .get_mut(&variant)
            .ok_or(InventoryError::Untracked(variant))?;

        *stock = Stock::new(stock.total, online)?;

        Ok(*stock)
    }
}

fn aggregate(lines: &[StockLine]) -> Result<FxHashMap<VariantUuid, u32>, InventoryError> {
    let mut demand = FxHashMap::<VariantUuid, u32>::default();

    for line in lines {
        let entry = demand.entry(line.variant).or_default();
        *entry = entry
            .checked_add(line.quantity)
            .ok_or(InventoryError::Overflow)?;
    }

    Ok(demand)
}
