//! Address book
//!
//! Delivery addresses saved by customers. Each customer has at most one
//! default address.

use std::cmp::Reverse;

use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::{carts::CustomerUuid, orders::Address, uuids::TypedUuid};

/// Saved address UUID
pub type SavedAddressUuid = TypedUuid<SavedAddress>;

/// Address book errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// No such address in the customer's book.
    #[error("address {0} not found")]
    NotFound(SavedAddressUuid),
}

/// An address kept in a customer's book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedAddress {
    /// Saved address id
    pub uuid: SavedAddressUuid,
    /// Owner
    pub customer: CustomerUuid,
    /// Delivery details
    pub address: Address,
    is_default: bool,
}

impl SavedAddress {
    /// Whether this is the customer's default address.
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// Saved addresses of every customer.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: FxHashMap<SavedAddressUuid, SavedAddress>,
}

impl AddressBook {
    /// Create an empty address book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a new address. Saving it as default clears the customer's
    /// previous default.
    pub fn save(
        &mut self,
        customer: CustomerUuid,
        address: Address,
        is_default: bool,
    ) -> SavedAddress {
        if is_default {
            self.clear_default(customer);
        }

        let saved = SavedAddress {
            uuid: SavedAddressUuid::new(),
            customer,
            address,
            is_default,
        };

        self.entries.insert(saved.uuid, saved.clone());

        saved
    }

    /// Make `uuid` the customer's only default address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NotFound`] when the address is missing or
    /// belongs to another customer.
    pub fn set_default(
        &mut self,
        customer: CustomerUuid,
        uuid: SavedAddressUuid,
    ) -> Result<SavedAddress, AddressError> {
        self.owned(customer, uuid)?;
        self.clear_default(customer);

        let saved = self
            .entries
            .get_mut(&uuid)
            .ok_or(AddressError::NotFound(uuid))?;

        saved.is_default = true;

        Ok(saved.clone())
    }

    /// Delete an address from the customer's book.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NotFound`] when the address is missing or
    /// belongs to another customer.
    pub fn remove(
        &mut self,
        customer: CustomerUuid,
        uuid: SavedAddressUuid,
    ) -> Result<SavedAddress, AddressError> {
        self.owned(customer, uuid)?;

        self.entries.remove(&uuid).ok_or(AddressError::NotFound(uuid))
    }

    /// The customer's addresses, default first then oldest first.
    pub fn addresses_of(&self, customer: CustomerUuid) -> Vec<&SavedAddress> {
        let mut addresses: Vec<&SavedAddress> = self
            .entries
            .values()
            .filter(|saved| saved.customer == customer)
            .collect();

        addresses.sort_by_key(|saved| (Reverse(saved.is_default), saved.uuid));

        addresses
    }

    /// The customer's default address, if one is set.
    pub fn default_for(&self, customer: CustomerUuid) -> Option<&SavedAddress> {
        self.entries
            .values()
            .find(|saved| saved.customer == customer && saved.is_default)
    }

    fn owned(
        &self,
        customer: CustomerUuid,
        uuid: SavedAddressUuid,
    ) -> Result<&SavedAddress, AddressError> {
        self.entries
            .get(&uuid)
            .filter(|saved| saved.customer == customer)
            .ok_or(AddressError::NotFound(uuid))
    }

    fn clear_default(&mut self, customer: CustomerUuid) {
        self.entries
            .values_mut()
            .filter(|saved| saved.customer == customer)
            .for_each(|saved| saved.is_default = false);
    }
}
