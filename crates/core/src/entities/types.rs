use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{contains_ignore_case, Entity, NaturalKey};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A sellable article (product) of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub classification_id: Option<String>,
    pub color_id: Option<String>,
    pub division_id: Option<String>,
    /// Unit price in minor currency units.
    pub unit_price_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Creates a new active article with the given code and name.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            description: None,
            classification_id: None,
            color_id: None,
            division_id: None,
            unit_price_cents: 0,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific ID for this article (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_classification(mut self, classification_id: impl Into<String>) -> Self {
        self.classification_id = Some(classification_id.into());
        self
    }

    pub fn with_color(mut self, color_id: impl Into<String>) -> Self {
        self.color_id = Some(color_id.into());
        self
    }

    pub fn with_division(mut self, division_id: impl Into<String>) -> Self {
        self.division_id = Some(division_id.into());
        self
    }

    pub fn with_unit_price_cents(mut self, cents: i64) -> Self {
        self.unit_price_cents = cents;
        self
    }
}

impl Entity for Article {
    const KIND: &'static str = "article";
    const COLLECTION: &'static str = "articles";

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("code", &self.code)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.code, needle)
            || contains_ignore_case(&self.name, needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains_ignore_case(d, needle))
    }
}

/// A node of the article classification tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub id: String,
    pub code: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Classification {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

impl Entity for Classification {
    const KIND: &'static str = "classification";
    const COLLECTION: &'static str = "classifications";

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("code", &self.code)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.code, needle) || contains_ignore_case(&self.name, needle)
    }
}

/// A legal entity operating in the ERP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub code: String,
    pub name: String,
    pub tax_id: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(code: impl Into<String>, name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            tax_id: tax_id.into(),
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

impl Entity for Company {
    const KIND: &'static str = "company";
    const COLLECTION: &'static str = "companies";

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("code", &self.code)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.code, needle)
            || contains_ignore_case(&self.name, needle)
            || contains_ignore_case(&self.tax_id, needle)
    }
}

/// A customer billed by one of the companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub code: String,
    pub name: String,
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(code: impl Into<String>, name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            tax_id: tax_id.into(),
            email: None,
            phone: None,
            company_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }
}

impl Entity for Customer {
    const KIND: &'static str = "customer";
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("code", &self.code)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.code, needle)
            || contains_ignore_case(&self.name, needle)
            || contains_ignore_case(&self.tax_id, needle)
    }
}

/// A color variant of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: String,
    pub code: String,
    pub name: String,
    /// CSS hex value (e.g. `#FF0000`).
    pub hex: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Color {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            hex: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_hex(mut self, hex: impl Into<String>) -> Self {
        self.hex = Some(hex.into());
        self
    }
}

impl Entity for Color {
    const KIND: &'static str = "color";
    const COLLECTION: &'static str = "colors";

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("code", &self.code)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.code, needle) || contains_ignore_case(&self.name, needle)
    }
}

/// A department store (point of sale) owned by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depstore {
    pub id: String,
    pub code: String,
    pub name: String,
    pub company_id: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Depstore {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            company_id: company_id.into(),
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

impl Entity for Depstore {
    const KIND: &'static str = "depstore";
    const COLLECTION: &'static str = "depstores";

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("code", &self.code)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.code, needle) || contains_ignore_case(&self.name, needle)
    }
}

/// A business division of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub id: String,
    pub code: String,
    pub name: String,
    pub company_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Division {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code: code.into(),
            name: name.into(),
            company_id: company_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Entity for Division {
    const KIND: &'static str = "division";
    const COLLECTION: &'static str = "divisions";

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("code", &self.code)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.code, needle) || contains_ignore_case(&self.name, needle)
    }
}

/// An ERP operator account.
///
/// `password_hash` is skipped on serialization and cleared by
/// [`Entity::redacted`], so profile reads never carry it. Credential checks
/// must use a value fetched from the base repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
            password_hash: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }

    /// Returns true if this value still carries its credential.
    pub fn has_credentials(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

impl Entity for User {
    const KIND: &'static str = "user";
    const COLLECTION: &'static str = "users";
    const CARRIES_SECRETS: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn natural_keys(&self) -> Vec<NaturalKey> {
        vec![NaturalKey::new("username", &self.username)]
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ignore_case(&self.username, needle)
            || contains_ignore_case(&self.email, needle)
            || contains_ignore_case(&self.full_name, needle)
    }

    fn redacted(mut self) -> Self {
        self.password_hash.clear();
        self
    }

    fn retain_secrets(&mut self, stored: &Self) {
        if self.password_hash.is_empty() {
            self.password_hash.clone_from(&stored.password_hash);
        }
    }
}
