//! Addresses service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;
use wardrobe::{
    addresses::{SavedAddress, SavedAddressUuid},
    carts::CustomerUuid,
    orders::Address,
};

use crate::{database::Db, domain::addresses::errors::AddressesServiceError};

#[derive(Debug, Clone)]
pub struct MemoryAddressesService {
    db: Db,
}

impl MemoryAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AddressesService for MemoryAddressesService {
    async fn save_address(
        &self,
        customer: CustomerUuid,
        address: Address,
        is_default: bool,
    ) -> Result<SavedAddress, AddressesServiceError> {
        let mut tx = self.db.begin().await;

        let saved = tx.addresses.save(customer, address, is_default);

        tx.commit();

        info!(uuid = %saved.uuid, %customer, is_default, "saved address");

        Ok(saved)
    }

    async fn list_addresses(
        &self,
        customer: CustomerUuid,
    ) -> Result<Vec<SavedAddress>, AddressesServiceError> {
        let tables = self.db.read().await;

        Ok(tables
            .addresses
            .addresses_of(customer)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn default_address(
        &self,
        customer: CustomerUuid,
    ) -> Result<Option<SavedAddress>, AddressesServiceError> {
        let tables = self.db.read().await;

        Ok(tables.addresses.default_for(customer).cloned())
    }

    async fn set_default_address(
        &self,
        customer: CustomerUuid,
        address: SavedAddressUuid,
    ) -> Result<SavedAddress, AddressesServiceError> {
        let mut tx = self.db.begin().await;

        let saved = tx.addresses.set_default(customer, address)?;

        tx.commit();

        info!(uuid = %address, %customer, "set default address");

        Ok(saved)
    }

    async fn remove_address(
        &self,
        customer: CustomerUuid,
        address: SavedAddressUuid,
    ) -> Result<SavedAddress, AddressesServiceError> {
        let mut tx = self.db.begin().await;

        let removed = tx.addresses.remove(customer, address)?;

        tx.commit();

        info!(uuid = %address, %customer, "removed address");

        Ok(removed)
    }
}

#[automock]
#[async_trait]
pub trait AddressesService: Send + Sync {
    /// Save an address; saving it as default replaces the previous default.
    async fn save_address(
        &self,
        customer: CustomerUuid,
        address: Address,
        is_default: bool,
    ) -> Result<SavedAddress, AddressesServiceError>;

    /// The customer's addresses, default first.
    async fn list_addresses(
        &self,
        customer: CustomerUuid,
    ) -> Result<Vec<SavedAddress>, AddressesServiceError>;

    /// The customer's default address, if any.
    async fn default_address(
        &self,
        customer: CustomerUuid,
    ) -> Result<Option<SavedAddress>, AddressesServiceError>;

    /// Make one of the customer's addresses the default.
    async fn set_default_address(
        &self,
        customer: CustomerUuid,
        address: SavedAddressUuid,
    ) -> Result<SavedAddress, AddressesServiceError>;

    /// Delete one of the customer's addresses.
    async fn remove_address(
        &self,
        customer: CustomerUuid,
        address: SavedAddressUuid,
    ) -> Result<SavedAddress, AddressesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use wardrobe::addresses::AddressError;

    use crate::test::TestContext;

    use super::*;

    fn address(street: &str) -> Address {
        Address {
            recipient_name: "Sara".to_string(),
            recipient_phone: "09120000000".to_string(),
            province: "Tehran".to_string(),
            city: "Tehran".to_string(),
            street: street.to_string(),
            postal_code: "1234567890".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn only_one_default_address_per_customer() -> TestResult {
        let ctx = TestContext::new().await;

        let home = ctx
            .addresses
            .save_address(ctx.customer, address("Vali Asr"), true)
            .await?;
        let work = ctx
            .addresses
            .save_address(ctx.customer, address("Enghelab"), true)
            .await?;

        let listed = ctx.addresses.list_addresses(ctx.customer).await?;
        let defaults: Vec<SavedAddressUuid> = listed
            .iter()
            .filter(|saved| saved.is_default())
            .map(|saved| saved.uuid)
            .collect();

        assert_eq!(listed.len(), 2);
        assert_eq!(defaults, [work.uuid]);

        let moved = ctx.addresses.set_default_address(ctx.customer, home.uuid).await?;

        assert!(moved.is_default());
        assert_eq!(
            ctx.addresses
                .default_address(ctx.customer)
                .await?
                .map(|saved| saved.uuid),
            Some(home.uuid)
        );

        Ok(())
    }

    #[tokio::test]
    async fn other_customers_cannot_touch_an_address() -> TestResult {
        let ctx = TestContext::new().await;
        let stranger = CustomerUuid::new();

        let saved = ctx
            .addresses
            .save_address(ctx.customer, address("Vali Asr"), false)
            .await?;

        let result = ctx.addresses.set_default_address(stranger, saved.uuid).await;

        assert!(
            matches!(result, Err(AddressesServiceError::Address(AddressError::NotFound(uuid))) if uuid == saved.uuid),
            "expected NotFound, got {result:?}"
        );

        let result = ctx.addresses.remove_address(stranger, saved.uuid).await;

        assert!(
            matches!(result, Err(AddressesServiceError::Address(AddressError::NotFound(_)))),
            "expected NotFound, got {result:?}"
        );

        assert!(ctx.addresses.list_addresses(stranger).await?.is_empty());

        let removed = ctx.addresses.remove_address(ctx.customer, saved.uuid).await?;

        assert_eq!(removed.uuid, saved.uuid);
        assert!(ctx.addresses.list_addresses(ctx.customer).await?.is_empty());

        Ok(())
    }
}
