//! Catalog service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info, warn};
use wardrobe::{
    catalog::{
        Category, CategoryUuid, Product, ProductUuid, Tag, TagUuid, Variant, VariantUuid,
        price_range, resolve_slug,
    },
    inventory::Stock,
    reviews::approved_for,
};

use crate::{
    database::{Db, Tables},
    domain::catalog::{
        errors::CatalogServiceError,
        models::{NewCategory, NewProduct, NewTag, NewVariant, ProductDetails, ProductSummary, VariantDetails},
        repository::CatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct MemoryCatalogService {
    db: Db,
    repository: CatalogRepository,
}

impl MemoryCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: CatalogRepository::new(),
        }
    }

    fn variant_details(
        tables: &Tables,
        variant: &Variant,
        product: &Product,
        point_in_time: Timestamp,
    ) -> Result<VariantDetails, CatalogServiceError> {
        Ok(VariantDetails {
            variant: variant.clone(),
            unit_price: variant.unit_price(product, point_in_time)?,
            stock: tables.ledger.stock(variant.uuid).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl CatalogService for MemoryCatalogService {
    async fn list_products(
        &self,
        category: Option<String>,
        point_in_time: Timestamp,
    ) -> Result<Vec<ProductSummary>, CatalogServiceError> {
        let tables = self.db.read().await;

        let category = match category {
            Some(slug) => Some(
                self.repository
                    .category_by_slug(&tables, &slug)
                    .map(|category| category.uuid)
                    .ok_or(CatalogServiceError::CategoryNotFound(slug))?,
            ),
            None => None,
        };

        let products = self.repository.active_products(&tables, category);
        let mut summaries = Vec::with_capacity(products.len());

        for product in products {
            let variants = self.repository.variants_of(&tables, product.uuid);

            let in_stock = variants.iter().any(|variant| {
                tables.ledger
                    .stock(variant.uuid)
                    .is_some_and(|stock| stock.online() > 0)
            });

            summaries.push(ProductSummary {
                uuid: product.uuid,
                name: product.name.clone(),
                slug: product.slug.clone(),
                category: product
                    .category
                    .and_then(|category| tables.categories.get(&category))
                    .map(|category| category.slug.clone()),
                discount: product.effective_discount(point_in_time),
                price_range: price_range(product, variants, point_in_time)?,
                in_stock,
                created_at: product.created_at,
            });
        }

        debug!(count = summaries.len(), "listed products");

        Ok(summaries)
    }

    async fn get_product(
        &self,
        slug: String,
        point_in_time: Timestamp,
    ) -> Result<ProductDetails, CatalogServiceError> {
        let tables = self.db.read().await;

        let product = self
            .repository
            .product_by_slug(&tables, &slug)
            .filter(|product| product.is_active)
            .ok_or(CatalogServiceError::NotFound)?;

        let variants = self
            .repository
            .variants_of(&tables, product.uuid)
            .into_iter()
            .map(|variant| Self::variant_details(&tables, variant, product, point_in_time))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(%slug, variants = variants.len(), "loaded product");

        Ok(ProductDetails {
            product: product.clone(),
            category: product
                .category
                .and_then(|category| tables.categories.get(&category))
                .cloned(),
            tags: self.repository.tags_of(&tables, product).into_iter().cloned().collect(),
            discount: product.effective_discount(point_in_time),
            variants,
            reviews: approved_for(tables.reviews.values(), product.uuid)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    async fn get_variant(
        &self,
        variant: VariantUuid,
        point_in_time: Timestamp,
    ) -> Result<VariantDetails, CatalogServiceError> {
        let tables = self.db.read().await;

        let variant = tables
            .variants
            .get(&variant)
            .ok_or(CatalogServiceError::VariantNotFound)?;

        let product = tables
            .products
            .get(&variant.product)
            .ok_or(CatalogServiceError::NotFound)?;

        Self::variant_details(&tables, variant, product, point_in_time)
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, CatalogServiceError> {
        let mut tx = self.db.begin().await;

        let slug = resolve_slug(&category.name, category.slug)?;

        if self.repository.category_by_slug(&tx, &slug).is_some() {
            warn!(%slug, "category slug already exists");
            return Err(CatalogServiceError::AlreadyExists(slug));
        }

        let created = Category {
            uuid: CategoryUuid::new(),
            name: category.name,
            slug,
            description: category.description,
            is_active: true,
        };

        tx.categories.insert(created.uuid, created.clone());
        tx.commit();

        info!(uuid = %created.uuid, slug = %created.slug, "created category");

        Ok(created)
    }

    async fn create_tag(&self, tag: NewTag) -> Result<Tag, CatalogServiceError> {
        let mut tx = self.db.begin().await;

        let slug = resolve_slug(&tag.name, None)?;

        if self.repository.tag_by_slug(&tx, &slug).is_some() {
            return Err(CatalogServiceError::AlreadyExists(slug));
        }

        let created = Tag {
            uuid: TagUuid::new(),
            name: tag.name,
            slug,
        };

        tx.tags.insert(created.uuid, created.clone());
        tx.commit();

        info!(uuid = %created.uuid, slug = %created.slug, "created tag");

        Ok(created)
    }

    async fn create_product(
        &self,
        product: NewProduct,
        created_at: Timestamp,
    ) -> Result<Product, CatalogServiceError> {
        let mut tx = self.db.begin().await;

        let slug = resolve_slug(&product.name, product.slug)?;

        if self.repository.product_by_slug(&tx, &slug).is_some() {
            warn!(%slug, "product slug already exists");
            return Err(CatalogServiceError::AlreadyExists(slug));
        }

        if let Some(category) = product.category
            && !tx.categories.contains_key(&category)
        {
            return Err(CatalogServiceError::CategoryNotFound(category.to_string()));
        }

        if product.tags.iter().any(|tag| !tx.tags.contains_key(tag)) {
            return Err(CatalogServiceError::TagNotFound);
        }

        let created = Product {
            uuid: ProductUuid::new(),
            name: product.name,
            slug,
            category: product.category,
            description: product.description,
            is_active: true,
            tags: product.tags,
            discount: product.discount,
            created_at,
        };

        tx.products.insert(created.uuid, created.clone());
        tx.commit();

        info!(uuid = %created.uuid, slug = %created.slug, "created product");

        Ok(created)
    }

    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, CatalogServiceError> {
        let mut tx = self.db.begin().await;

        if !tx.products.contains_key(&variant.product) {
            return Err(CatalogServiceError::NotFound);
        }

        let duplicate = self
            .repository
            .variants_of(&tx, variant.product)
            .iter()
            .any(|existing| existing.matches(&variant.size, &variant.color));

        if duplicate {
            return Err(CatalogServiceError::DuplicateVariant {
                size: variant.size,
                color: variant.color,
            });
        }

        let created = Variant {
            uuid: VariantUuid::new(),
            product: variant.product,
            size: variant.size,
            color: variant.color,
            price: variant.price,
        };

        tx.ledger.track(created.uuid, variant.stock);
        tx.variants.insert(created.uuid, created.clone());
        tx.commit();

        info!(uuid = %created.uuid, product = %created.product, "created variant");

        Ok(created)
    }

    async fn restock(
        &self,
        variant: VariantUuid,
        quantity: u32,
        online: bool,
    ) -> Result<Stock, CatalogServiceError> {
        let mut tx = self.db.begin().await;

        let stock = tx.ledger.restock(variant, quantity, online)?;
        tx.commit();

        info!(%variant, quantity, online, total = stock.total(), "restocked variant");

        Ok(stock)
    }

    async fn set_online_stock(
        &self,
        variant: VariantUuid,
        online: u32,
    ) -> Result<Stock, CatalogServiceError> {
        let mut tx = self.db.begin().await;

        let stock = tx.ledger.set_online(variant, online)?;
        tx.commit();

        info!(%variant, online, "updated online stock");

        Ok(stock)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Active products, newest first, optionally limited to a category slug.
    async fn list_products(
        &self,
        category: Option<String>,
        point_in_time: Timestamp,
    ) -> Result<Vec<ProductSummary>, CatalogServiceError>;

    /// Retrieve an active product by slug with its variants.
    async fn get_product(
        &self,
        slug: String,
        point_in_time: Timestamp,
    ) -> Result<ProductDetails, CatalogServiceError>;

    /// Retrieve a single variant with price and stock.
    async fn get_variant(
        &self,
        variant: VariantUuid,
        point_in_time: Timestamp,
    ) -> Result<VariantDetails, CatalogServiceError>;

    /// Create a category; the slug must be unique.
    async fn create_category(&self, category: NewCategory) -> Result<Category, CatalogServiceError>;

    /// Create a tag; the slug must be unique.
    async fn create_tag(&self, tag: NewTag) -> Result<Tag, CatalogServiceError>;

    /// Create a product; the slug must be unique.
    async fn create_product(
        &self,
        product: NewProduct,
        created_at: Timestamp,
    ) -> Result<Product, CatalogServiceError>;

    /// Create a variant with its initial stock.
    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, CatalogServiceError>;

    /// Add physical stock, optionally exposing it online.
    async fn restock(
        &self,
        variant: VariantUuid,
        quantity: u32,
        online: bool,
    ) -> Result<Stock, CatalogServiceError>;

    /// Set how much stock is sold online.
    async fn set_online_stock(
        &self,
        variant: VariantUuid,
        online: u32,
    ) -> Result<Stock, CatalogServiceError>;
}
