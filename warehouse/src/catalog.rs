//! Catalog item store: one parameterized store for every product kind.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{app_user, catalog_item};
use crate::error::{Error, Result, is_unique_violation};

/// A product kind served under `/catalog/{slug}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemKind {
    pub slug: &'static str,
    /// Code prefix, e.g. `ZAP` in `ZAP001`.
    pub prefix: &'static str,
    /// Singular noun used in messages.
    pub label: &'static str,
}

pub const ITEM_KINDS: &[ItemKind] = &[
    ItemKind { slug: "shoes", prefix: "ZAP", label: "shoe" },
    ItemKind { slug: "jackets", prefix: "CHA", label: "jacket" },
    ItemKind { slug: "pants", prefix: "PAN", label: "pants" },
    ItemKind { slug: "sportswear", prefix: "DEP", label: "sportswear" },
    ItemKind { slug: "accessories", prefix: "ACC", label: "accessory" },
];

pub fn item_kind(slug: &str) -> Result<&'static ItemKind> {
    ITEM_KINDS
        .iter()
        .find(|k| k.slug == slug)
        .ok_or_else(|| Error::not_found(format!("Unknown item kind: {slug}")))
}

impl ItemKind {
    /// Next code after the highest existing one, zero-padded to three digits.
    fn next_code(&self, existing: &[String]) -> Result<String> {
        let max = existing
            .iter()
            .filter_map(|c| c.strip_prefix(self.prefix))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        let next = max
            .checked_add(1)
            .ok_or_else(|| Error::validation(format!("{} codes are exhausted", self.prefix)))?;
        Ok(format!("{}{:03}", self.prefix, next))
    }
}

/// Escape `LIKE` wildcards so user input matches literally (escape char `\`).
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Create input. Every `Option` except `is_active` is required; missing
/// values are reported as validation errors rather than rejected by serde.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub quantity: Option<i32>,
    pub owner_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub quantity: Option<i32>,
    pub owner_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemSearch {
    pub code: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::validation(format!("Field '{field}' is required")))
}

#[derive(Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, kind: &ItemKind, input: NewItem) -> Result<catalog_item::Model> {
        let name = required(input.name, "name")?;
        let description = required(input.description, "description")?;
        let image = required(input.image, "image")?;
        let quantity = required(input.quantity, "quantity")?;
        let owner_id = required(input.owner_id, "owner_id")?;
        if quantity < 0 {
            return Err(Error::validation("Field 'quantity' must not be negative"));
        }

        let txn = self.db.begin().await?;

        app_user::Entity::find_by_id(owner_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("Owner not found"))?;

        let codes: Vec<String> = catalog_item::Entity::find()
            .select_only()
            .column(catalog_item::Column::Code)
            .filter(catalog_item::Column::Code.starts_with(kind.prefix))
            .into_tuple()
            .all(&txn)
            .await?;
        let code = kind.next_code(&codes)?;

        let now = Utc::now().naive_utc();
        let item = catalog_item::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code),
            kind: Set(kind.slug.to_string()),
            name: Set(name),
            description: Set(description),
            image: Set(image),
            quantity: Set(quantity),
            is_active: Set(input.is_active.unwrap_or(true)),
            owner_id: Set(owner_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::conflict("Item code already taken, retry")
            } else {
                Error::Db(e)
            }
        })?;

        txn.commit().await?;

        tracing::info!(kind = kind.slug, code = %item.code, "created catalog item");
        Ok(item)
    }

    pub async fn list(&self, kind: &ItemKind, is_active: Option<bool>) -> Result<Vec<catalog_item::Model>> {
        self.search(
            kind,
            ItemSearch {
                is_active,
                ..Default::default()
            },
        )
        .await
    }

    pub async fn search(&self, kind: &ItemKind, filter: ItemSearch) -> Result<Vec<catalog_item::Model>> {
        let mut query = catalog_item::Entity::find().filter(catalog_item::Column::Kind.eq(kind.slug));

        if let Some(code) = filter.code.filter(|c| !c.is_empty()) {
            query = query.filter(catalog_item::Column::Code.eq(code));
        }
        if let Some(name) = filter.name.filter(|n| !n.is_empty()) {
            let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(catalog_item::Column::Name)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        if let Some(active) = filter.is_active {
            query = query.filter(catalog_item::Column::IsActive.eq(active));
        }

        Ok(query
            .order_by_asc(catalog_item::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Load an item and check it belongs to `kind`.
    async fn find_of_kind(&self, kind: &ItemKind, id: Uuid) -> Result<catalog_item::Model> {
        let item = catalog_item::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found(format!("{} not found", kind.label)))?;
        if item.kind != kind.slug {
            return Err(Error::validation(format!("This item is not a {}", kind.label)));
        }
        Ok(item)
    }

    /// Apply only the fields present in `patch`.
    pub async fn update(&self, kind: &ItemKind, id: Uuid, patch: ItemPatch) -> Result<catalog_item::Model> {
        let item = self.find_of_kind(kind, id).await?;

        if let Some(owner_id) = patch.owner_id {
            app_user::Entity::find_by_id(owner_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| Error::not_found("Owner not found"))?;
        }
        if patch.quantity.is_some_and(|q| q < 0) {
            return Err(Error::validation("Field 'quantity' must not be negative"));
        }

        let mut model: catalog_item::ActiveModel = item.into();
        if let Some(v) = patch.name {
            model.name = Set(v);
        }
        if let Some(v) = patch.description {
            model.description = Set(v);
        }
        if let Some(v) = patch.image {
            model.image = Set(v);
        }
        if let Some(v) = patch.quantity {
            model.quantity = Set(v);
        }
        if let Some(v) = patch.owner_id {
            model.owner_id = Set(v);
        }
        if let Some(v) = patch.is_active {
            model.is_active = Set(v);
        }
        model.updated_at = Set(Utc::now().naive_utc());

        Ok(model.update(&self.db).await?)
    }

    /// Soft delete.
    pub async fn deactivate(&self, kind: &ItemKind, id: Uuid) -> Result<catalog_item::Model> {
        let item = self.find_of_kind(kind, id).await?;
        if !item.is_active {
            return Err(Error::conflict(format!("The {} is already inactive", kind.label)));
        }

        let mut model: catalog_item::ActiveModel = item.into();
        model.is_active = Set(false);
        model.updated_at = Set(Utc::now().naive_utc());
        Ok(model.update(&self.db).await?)
    }
}
