use crate::error::Error;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a product, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        ProductId(Uuid::new_v4())
    }
}

impl Default for ProductId {
    fn default() -> Self {
        ProductId::new()
    }
}

impl From<Uuid> for ProductId {
    fn from(id: Uuid) -> Self {
        ProductId(id)
    }
}

impl FromStr for ProductId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(ProductId)
            .map_err(|_| Error::precondition(format!("malformed product id `{}`", s)))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Reference to the company (tenant) owning a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        CompanyId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub company_id: CompanyId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Applies `changes` in place. Timestamps are left to the caller.
    pub fn apply(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(sku) = changes.sku {
            self.sku = sku;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
    }
}

/// Fields of a product to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: Option<String>,
    pub active: bool,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Decimal) -> Self {
        NewProduct {
            name: name.into(),
            description: None,
            price,
            sku: None,
            active: true,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sku<S: Into<String>>(mut self, sku: S) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Checks required fields and normalizes blank optional text to `None`.
    pub fn validate(self) -> crate::Result<Self> {
        Ok(NewProduct {
            name: validate_name(self.name)?,
            description: normalize_text(self.description),
            price: validate_price(self.price)?,
            sku: normalize_text(self.sku),
            active: self.active,
        })
    }
}

/// A partial update. `None` leaves a field untouched; for the optional
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub sku: Option<Option<String>>,
    pub active: Option<bool>,
}

impl ProductChanges {
    pub fn active(active: bool) -> Self {
        ProductChanges {
            active: Some(active),
            ..Default::default()
        }
    }

    pub fn price(price: Decimal) -> Self {
        ProductChanges {
            price: Some(price),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.sku.is_none()
            && self.active.is_none()
    }

    pub fn validate(self) -> crate::Result<Self> {
        Ok(ProductChanges {
            name: self.name.map(validate_name).transpose()?,
            description: self.description.map(normalize_text),
            price: self.price.map(validate_price).transpose()?,
            sku: self.sku.map(normalize_text),
            active: self.active,
        })
    }
}

/// The state of the create/edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub sku: String,
    pub active: bool,
}

impl ProductDraft {
    /// A blank form for a new product.
    pub fn new() -> Self {
        ProductDraft {
            name: String::new(),
            description: String::new(),
            price: Decimal::ZERO,
            sku: String::new(),
            active: true,
        }
    }

    /// A form filled with the values of an existing product.
    pub fn from_product(product: &Product) -> Self {
        ProductDraft {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price,
            sku: product.sku.clone().unwrap_or_default(),
            active: product.active,
        }
    }

    pub fn into_new_product(self) -> crate::Result<NewProduct> {
        NewProduct {
            name: self.name,
            description: Some(self.description),
            price: self.price,
            sku: Some(self.sku),
            active: self.active,
        }
        .validate()
    }

    /// Every field of the form is submitted, as the edit form shows them all.
    pub fn into_changes(self) -> crate::Result<ProductChanges> {
        ProductChanges {
            name: Some(self.name),
            description: Some(Some(self.description)),
            price: Some(self.price),
            sku: Some(Some(self.sku)),
            active: Some(self.active),
        }
        .validate()
    }
}

impl Default for ProductDraft {
    fn default() -> Self {
        ProductDraft::new()
    }
}

/// Context of the signed-in user, supplied by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<String>,
    pub company_id: Option<CompanyId>,
}

impl Session {
    pub fn for_company<S: Into<String>>(company_id: S) -> Self {
        Session {
            user: None,
            company_id: Some(CompanyId::new(company_id)),
        }
    }

    pub fn anonymous() -> Self {
        Session::default()
    }
}

fn validate_name(name: String) -> crate::Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("product name is required"));
    }

    Ok(trimmed.to_owned())
}

fn validate_price(price: Decimal) -> crate::Result<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::validation("price cannot be negative"));
    }
    if price.normalize().scale() > 2 {
        return Err(Error::validation("price must have at most 2 decimal places"));
    }

    Ok(price)
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
