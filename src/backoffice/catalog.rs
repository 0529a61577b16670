//! Built-in demo resources.
//!
//! Three resources (`users`, `products`, `orders`) that between them use every
//! value kind, both selection scopes and a few custom validators. The CLI
//! manages these; tests use them as realistic configurations.
//!
//! [`seed`] returns the same records every time.

use crate::error::{EngineError, Result};
use crate::fields::{FieldSpec, FieldValue, ValueKind};
use crate::model::Record;
use crate::schema::{BulkAction, ResourceConfig, SelectionScope};
use chrono::NaiveDate;

/// Names of the catalog resources, in display order.
pub const RESOURCES: &[&str] = &["users", "products", "orders"];

pub fn names() -> impl Iterator<Item = &'static str> {
    RESOURCES.iter().copied()
}

/// Configuration of a catalog resource.
pub fn resource(name: &str) -> Result<ResourceConfig> {
    match name {
        "users" => users(),
        "products" => products(),
        "orders" => orders(),
        other => Err(EngineError::NotFound(format!(
            "resource '{}' (known: {})",
            other,
            RESOURCES.join(", ")
        ))),
    }
}

/// Demo records for a catalog resource.
pub fn seed(name: &str) -> Result<Vec<Record>> {
    match name {
        "users" => Ok(seed_users()),
        "products" => Ok(seed_products()),
        "orders" => Ok(seed_orders()),
        other => Err(EngineError::NotFound(format!("resource '{}'", other))),
    }
}

fn has_at_sign(value: &FieldValue) -> Option<String> {
    match value.as_str() {
        Some(email) if email.contains('@') && !email.starts_with('@') && !email.ends_with('@') => None,
        _ => Some("must be an email address".to_string()),
    }
}

fn not_negative(value: &FieldValue) -> Option<String> {
    match value.as_f64() {
        Some(n) if n < 0.0 => Some("must not be negative".to_string()),
        _ => None,
    }
}

fn whole_number(value: &FieldValue) -> Option<String> {
    match value.as_f64() {
        Some(n) if n.fract() != 0.0 => Some("must be a whole number".to_string()),
        Some(n) if n < 0.0 => Some("must not be negative".to_string()),
        _ => None,
    }
}

fn id_field() -> FieldSpec {
    FieldSpec::new("id", "ID", ValueKind::String)
        .sortable()
        .form(false)
}

fn users() -> Result<ResourceConfig> {
    ResourceConfig::builder("users")
        .singular("user")
        .field(id_field())
        .field(
            FieldSpec::new("name", "Name", ValueKind::String)
                .searchable()
                .sortable()
                .required(),
        )
        .field(
            FieldSpec::new("email", "Email", ValueKind::String)
                .searchable()
                .sortable()
                .required()
                .validator(has_at_sign),
        )
        .field(
            FieldSpec::new("role", "Role", ValueKind::Enum)
                .options([("admin", "Admin"), ("editor", "Editor"), ("viewer", "Viewer")])
                .filterable()
                .sortable()
                .required(),
        )
        .field(FieldSpec::new("active", "Active", ValueKind::Boolean).filterable())
        .field(
            FieldSpec::new("joined", "Joined", ValueKind::Date)
                .sortable()
                .filterable(),
        )
        .field(FieldSpec::new("website", "Website", ValueKind::Url).table(false))
        .field(
            FieldSpec::new("bio", "Bio", ValueKind::TextBlock)
                .searchable()
                .table(false),
        )
        .build()
}

fn products() -> Result<ResourceConfig> {
    ResourceConfig::builder("products")
        .singular("product")
        .field(id_field())
        .field(
            FieldSpec::new("title", "Title", ValueKind::String)
                .searchable()
                .sortable()
                .required(),
        )
        .field(FieldSpec::new("sku", "SKU", ValueKind::String).searchable())
        .field(
            FieldSpec::new("category", "Category", ValueKind::Enum)
                .options([
                    ("hardware", "Hardware"),
                    ("software", "Software"),
                    ("service", "Service"),
                ])
                .filterable()
                .sortable(),
        )
        .field(
            FieldSpec::new("price", "Price", ValueKind::Number)
                .sortable()
                .filterable()
                .required()
                .validator(not_negative),
        )
        .field(
            FieldSpec::new("stock", "Stock", ValueKind::Number)
                .sortable()
                .filterable()
                .validator(whole_number),
        )
        .field(FieldSpec::new("discontinued", "Discontinued", ValueKind::Boolean).filterable())
        .field(
            FieldSpec::new("description", "Description", ValueKind::TextBlock)
                .searchable()
                .table(false),
        )
        .selection_scope(SelectionScope::Persistent)
        .build()
}

fn orders() -> Result<ResourceConfig> {
    ResourceConfig::builder("orders")
        .singular("order")
        .field(id_field())
        .field(
            FieldSpec::new("customer", "Customer", ValueKind::String)
                .searchable()
                .sortable()
                .required(),
        )
        .field(
            FieldSpec::new("status", "Status", ValueKind::Enum)
                .options([
                    ("pending", "Pending"),
                    ("paid", "Paid"),
                    ("shipped", "Shipped"),
                    ("cancelled", "Cancelled"),
                ])
                .filterable()
                .sortable()
                .required(),
        )
        .field(
            FieldSpec::new("total", "Total", ValueKind::Number)
                .sortable()
                .filterable()
                .required()
                .validator(not_negative),
        )
        .field(
            FieldSpec::new("placed", "Placed", ValueKind::Date)
                .sortable()
                .filterable(),
        )
        .field(FieldSpec::new("gift", "Gift", ValueKind::Boolean).filterable())
        .field(
            FieldSpec::new("notes", "Notes", ValueKind::TextBlock)
                .searchable()
                .table(false),
        )
        .page_size(5)
        .bulk_actions([BulkAction::Export])
        .build()
}

fn date(y: i32, m: u32, d: u32) -> FieldValue {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|dt| FieldValue::Date(dt.and_utc()))
        .unwrap_or(FieldValue::Empty)
}

const USERS: &[(&str, &str, &str, bool)] = &[
    ("Ada Lovelace", "ada@example.com", "admin", true),
    ("Grace Hopper", "grace@example.com", "admin", true),
    ("Alan Turing", "alan@example.com", "editor", true),
    ("Katherine Johnson", "katherine@example.com", "editor", true),
    ("Edsger Dijkstra", "edsger@example.com", "viewer", false),
    ("Barbara Liskov", "barbara@example.com", "editor", true),
    ("Donald Knuth", "don@example.com", "viewer", true),
    ("Margaret Hamilton", "margaret@example.com", "admin", true),
    ("Ken Thompson", "ken@example.com", "viewer", false),
    ("Frances Allen", "frances@example.com", "editor", true),
    ("John Backus", "john@example.com", "viewer", true),
    ("Radia Perlman", "radia@example.com", "editor", false),
];

fn seed_users() -> Vec<Record> {
    USERS
        .iter()
        .enumerate()
        .map(|(i, (name, email, role, active))| {
            let n = i as u32;
            let mut record = Record::new((i + 1).to_string())
                .with("name", *name)
                .with("email", *email)
                .with("role", *role)
                .with("active", *active)
                .with("joined", date(2021 + (n % 4) as i32, 1 + n % 12, 1 + (n * 7) % 28));
            if i % 3 == 0 {
                let handle = email.split('@').next().unwrap_or_default();
                record.set("website", format!("https://{}.example.com", handle));
            }
            if i % 2 == 0 {
                record.set("bio", format!("{} joined as {}.\nLikes tidy tables.", name, role));
            }
            record
        })
        .collect()
}

const PRODUCTS: &[(&str, &str, f64, i64)] = &[
    ("Mechanical keyboard", "hardware", 129.0, 42),
    ("USB-C dock", "hardware", 189.5, 7),
    ("Standing desk", "hardware", 649.0, 3),
    ("Monitor arm", "hardware", 89.99, 0),
    ("Code editor licence", "software", 59.0, 1000),
    ("Backup suite", "software", 24.99, 1000),
    ("VPN subscription", "software", 4.5, 1000),
    ("Onboarding workshop", "service", 1200.0, 5),
    ("Support plan", "service", 2499.0, 10),
    ("Laptop stand", "hardware", 39.0, 58),
    ("Noise-cancelling headset", "hardware", 249.0, 12),
];

fn seed_products() -> Vec<Record> {
    PRODUCTS
        .iter()
        .enumerate()
        .map(|(i, (title, category, price, stock))| {
            let mut record = Record::new((i + 1).to_string())
                .with("title", *title)
                .with("sku", format!("{}-{:04}", &category[..2].to_uppercase(), 100 + i * 7))
                .with("category", *category)
                .with("price", *price)
                .with("stock", *stock)
                .with("discontinued", *stock == 0);
            if i % 4 == 1 {
                record.set("description", format!("{}.\nShips within two days.", title));
            }
            record
        })
        .collect()
}

const ORDERS: &[(&str, &str, f64)] = &[
    ("Ada Lovelace", "paid", 318.5),
    ("Grace Hopper", "shipped", 129.0),
    ("Alan Turing", "pending", 59.0),
    ("Katherine Johnson", "cancelled", 649.0),
    ("Ada Lovelace", "shipped", 24.99),
    ("Donald Knuth", "paid", 2499.0),
    ("Barbara Liskov", "pending", 1289.5),
    ("Margaret Hamilton", "paid", 39.0),
    ("Frances Allen", "shipped", 4.5),
    ("Radia Perlman", "pending", 438.0),
    ("John Backus", "paid", 89.99),
    ("Ken Thompson", "cancelled", 1200.0),
    ("Grace Hopper", "paid", 249.0),
];

fn seed_orders() -> Vec<Record> {
    ORDERS
        .iter()
        .enumerate()
        .map(|(i, (customer, status, total))| {
            let n = i as u32;
            let mut record = Record::new(format!("{}", 1001 + i))
                .with("customer", *customer)
                .with("status", *status)
                .with("total", *total)
                .with("placed", date(2024, 1 + n % 12, 1 + (n * 5) % 28))
                .with("gift", i % 5 == 0);
            if *status == "cancelled" {
                record.set("notes", "Cancelled by customer.");
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Participation;
    use crate::form::FormSpec;
    use crate::model::Resource;
    use std::collections::HashSet;

    #[test]
    fn every_resource_builds_and_seeds() {
        for name in names() {
            let config = resource(name).unwrap();
            let records = seed(name).unwrap();
            assert!(records.len() > config.page_size, "{} fits on one page", name);

            let ids: HashSet<_> = records.iter().map(|r| r.id()).collect();
            assert_eq!(ids.len(), records.len(), "{} has duplicate ids", name);
        }
    }

    #[test]
    fn catalog_covers_every_value_kind() {
        let kinds: HashSet<ValueKind> = names()
            .flat_map(|name| resource(name).unwrap().fields)
            .map(|f| f.kind)
            .collect();
        for kind in [
            ValueKind::String,
            ValueKind::Number,
            ValueKind::Boolean,
            ValueKind::Date,
            ValueKind::Enum,
            ValueKind::Url,
            ValueKind::TextBlock,
        ] {
            assert!(kinds.contains(&kind), "{:?} unused", kind);
        }
    }

    #[test]
    fn seeds_pass_their_own_validation() {
        for name in names() {
            let config = resource(name).unwrap();
            let form = FormSpec::create(&config);
            for record in seed(name).unwrap() {
                let input = form.initial_values(&record);
                assert!(form.validate(&input).is_ok(), "{} {} is invalid", name, record.id);
            }
        }
    }

    #[test]
    fn seeding_is_deterministic() {
        assert_eq!(seed("orders").unwrap(), seed("orders").unwrap());
    }

    #[test]
    fn unknown_resource() {
        let err = resource("widgets").unwrap_err();
        assert!(err.to_string().contains("users, products, orders"));
        assert!(seed("widgets").is_err());
    }

    #[test]
    fn email_validator() {
        let config = resource("users").unwrap();
        let email = config.field("email").unwrap();
        let check = email.validator.unwrap();
        assert_eq!(check(&"a@b.c".into()), None);
        assert!(check(&"nope".into()).is_some());
        assert!(config.fields_in(Participation::Search).any(|f| f.key == "bio"));
    }
}
