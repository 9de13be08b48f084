//! Validation of write requests.
//!
//! Validation runs every rule and reports every failure at once. On success it
//! hands back the request in well-typed form ([`ProductDraft`] /
//! [`ProductRevision`]) so nothing downstream has to re-parse it.
//!
//! ## Rules
//!
//! | Field | Rule |
//! |---|---|
//! | `id` (update only) | present, a UUID, not nil |
//! | `name` | not empty or whitespace |
//! | `category` | one of [`ProductCategory::ALL`] |
//! | `unitPrice` | absent, or a number (or decimal string) in `[0, Decimal::MAX]` |
//! | `unitsInStock` | absent, or a whole number in `[0, i32::MAX]` |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::dto::{AddProductRequest, UpdateProductRequest};
use crate::types::{ProductCategory, ProductId};

/// Wire name of the identity field.
pub const FIELD_ID: &str = "id";
/// Wire name of the name field.
pub const FIELD_NAME: &str = "name";
/// Wire name of the category field.
pub const FIELD_CATEGORY: &str = "category";
/// Wire name of the unit price field.
pub const FIELD_UNIT_PRICE: &str = "unitPrice";
/// Wire name of the stock level field.
pub const FIELD_UNITS_IN_STOCK: &str = "unitsInStock";

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

/// One or more rule violations, in field order.
///
/// Never empty. [`ValidationErrors::from_errors`] returns `None` for an empty
/// list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Wrap a list of failures, or `None` if there are none.
    #[must_use]
    pub fn from_errors(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// The individual failures, in the order the rules ran.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any failure concerns `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Group messages by field, as exposed to HTTP callers.
    #[must_use]
    pub fn field_map(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut map: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field)
                .or_default()
                .push(error.message.clone());
        }
        map
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The four mutable product fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub category: ProductCategory,
    pub unit_price: Option<Decimal>,
    pub units_in_stock: Option<i32>,
}

/// A validated update: the target identity plus its new fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRevision {
    pub id: ProductId,
    pub draft: ProductDraft,
}

/// Rule set applied to write requests before they reach storage.
pub trait ProductValidator: Send + Sync {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    fn validate_add(&self, request: &AddProductRequest) -> Result<ProductDraft, ValidationErrors>;

    /// Validate an update request, including its identity.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    fn validate_update(
        &self,
        request: &UpdateProductRequest,
    ) -> Result<ProductRevision, ValidationErrors>;
}

/// The standard product rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProductValidator;

impl ProductValidator for DefaultProductValidator {
    fn validate_add(&self, request: &AddProductRequest) -> Result<ProductDraft, ValidationErrors> {
        let mut errors = Vec::new();
        let draft = check_fields(
            &mut errors,
            &request.name,
            &request.category,
            request.unit_price.as_ref(),
            request.units_in_stock.as_ref(),
        );
        draft.ok_or(ValidationErrors { errors })
    }

    fn validate_update(
        &self,
        request: &UpdateProductRequest,
    ) -> Result<ProductRevision, ValidationErrors> {
        let mut errors = Vec::new();
        let id = check_id(&mut errors, &request.id);
        let draft = check_fields(
            &mut errors,
            &request.name,
            &request.category,
            request.unit_price.as_ref(),
            request.units_in_stock.as_ref(),
        );
        match (id, draft) {
            (Some(id), Some(draft)) => Ok(ProductRevision { id, draft }),
            // a missing part always leaves at least one recorded failure
            _ => Err(ValidationErrors { errors }),
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

fn fail(errors: &mut Vec<FieldError>, field: &'static str, message: impl Into<String>) {
    errors.push(FieldError {
        field,
        message: message.into(),
    });
}

fn check_id(errors: &mut Vec<FieldError>, raw: &str) -> Option<ProductId> {
    if raw.trim().is_empty() {
        fail(errors, FIELD_ID, "Id is required.");
        return None;
    }
    match raw.parse::<ProductId>() {
        Ok(id) if id.is_assigned() => Some(id),
        Ok(_) => {
            fail(errors, FIELD_ID, "Id is required.");
            None
        }
        Err(_) => {
            fail(errors, FIELD_ID, "Id must be a valid UUID.");
            None
        }
    }
}

fn check_fields(
    errors: &mut Vec<FieldError>,
    name: &str,
    category: &str,
    unit_price: Option<&Value>,
    units_in_stock: Option<&Value>,
) -> Option<ProductDraft> {
    let before = errors.len();

    if name.trim().is_empty() {
        fail(errors, FIELD_NAME, "Name must not be empty.");
    }

    let parsed_category = if category.trim().is_empty() {
        fail(errors, FIELD_CATEGORY, "Category is required.");
        None
    } else if let Ok(parsed) = category.parse::<ProductCategory>() {
        Some(parsed)
    } else {
        let allowed: Vec<&str> = ProductCategory::ALL.iter().map(ProductCategory::as_str).collect();
        fail(
            errors,
            FIELD_CATEGORY,
            format!("Category must be one of: {}.", allowed.join(", ")),
        );
        None
    };

    let parsed_price = match unit_price.map(parse_price).transpose() {
        Ok(price) => Some(price),
        Err(message) => {
            fail(errors, FIELD_UNIT_PRICE, message);
            None
        }
    };

    let parsed_units = match units_in_stock.map(parse_units).transpose() {
        Ok(units) => Some(units),
        Err(message) => {
            fail(errors, FIELD_UNITS_IN_STOCK, message);
            None
        }
    };

    if errors.len() != before {
        return None;
    }

    Some(ProductDraft {
        name: name.to_owned(),
        category: parsed_category?,
        unit_price: parsed_price?,
        units_in_stock: parsed_units?,
    })
}

/// Accepts a JSON number or a decimal string. Scientific notation is allowed.
fn parse_price(raw: &Value) -> Result<Decimal, String> {
    let out_of_range = || format!("Unit price must be between 0 and {}.", Decimal::MAX);
    let parse = |text: &str| {
        text.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(text))
    };

    let price = match raw {
        // a number that does not fit a Decimal is out of range, not malformed
        Value::Number(number) => parse(&number.to_string()).map_err(|_| out_of_range())?,
        Value::String(text) => {
            parse(text.trim()).map_err(|_| "Unit price must be a number.".to_string())?
        }
        _ => return Err("Unit price must be a number.".to_string()),
    };

    if price < Decimal::ZERO {
        return Err(out_of_range());
    }
    Ok(price)
}

/// Accepts a whole JSON number. `5.0` counts as whole.
#[allow(clippy::cast_possible_truncation)]
fn parse_units(raw: &Value) -> Result<i32, String> {
    let out_of_range = || format!("Units in stock must be between 0 and {}.", i32::MAX);
    let not_whole = || "Units in stock must be a whole number.".to_string();

    let Value::Number(number) = raw else {
        return Err(not_whole());
    };

    if let Some(units) = number.as_i64() {
        return i32::try_from(units)
            .ok()
            .filter(|units| *units >= 0)
            .ok_or_else(out_of_range);
    }
    if number.is_u64() {
        return Err(out_of_range());
    }

    let units = number.as_f64().ok_or_else(not_whole)?;
    if units.fract() != 0.0 {
        return Err(not_whole());
    }
    if !(0.0..=f64::from(i32::MAX)).contains(&units) {
        return Err(out_of_range());
    }
    Ok(units as i32)
}
