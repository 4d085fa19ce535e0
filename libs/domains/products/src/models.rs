use axum_helpers::errors::FieldErrors;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

pub const WARRANTY_MAX_LEN: u64 = 100;

/// Writable fields in declaration order, used to order registration errors.
pub const PRODUCT_FIELDS: &[&str] = &[
    "name",
    "description",
    "manufacturer",
    "serial_number",
    "date_of_manufacture",
    "warranty_information",
    "category",
];

pub const DUPLICATE_SERIAL_MESSAGE: &str = "product with this serial number already exists.";
const FUTURE_DATE_MESSAGE: &str = "Manufacture date cannot be in the future";
const DATE_FORMAT_MESSAGE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
const BLANK_MESSAGE: &str = "This field may not be blank.";
const NULL_MESSAGE: &str = "This field may not be null.";

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("blank", BLANK_MESSAGE));
    }
    Ok(())
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Rejects malformed dates and dates after today (UTC).
fn manufactured_on_or_before_today(value: &str) -> Result<(), ValidationError> {
    let date = parse_date(value).ok_or_else(|| error_with_message("date", DATE_FORMAT_MESSAGE))?;
    if date > Utc::now().date_naive() {
        return Err(error_with_message("future_date", FUTURE_DATE_MESSAGE));
    }
    Ok(())
}

/// Message used for every `max_length` violation.
pub fn max_length_message(max: u64) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

/// Text fields are stored without surrounding whitespace.
fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| value.map(|s| s.trim().to_string()))
}

/// Like [`trimmed`], but keeps an explicit `null` (`Some(None)`) apart from
/// an absent field (`None`).
fn trimmed_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    trimmed(deserializer).map(Some)
}

fn text_error(value: &str, max: Option<u64>) -> Option<String> {
    if value.is_empty() {
        return Some(BLANK_MESSAGE.to_string());
    }
    match max {
        Some(max) if value.chars().count() as u64 > max => Some(max_length_message(max)),
        _ => None,
    }
}

/// A registered product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    /// Unique across all products
    pub serial_number: String,
    /// `YYYY-MM-DD`, never after the registration date
    pub date_of_manufacture: NaiveDate,
    pub warranty_information: Option<String>,
    pub category: String,
}

/// Registration payload.
///
/// Every field is optional at the type level so a missing field is reported
/// as a field error instead of failing deserialization of the whole body.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterProduct {
    #[validate(
        required(message = "This field is required."),
        length(max = 100, message = "Ensure this field has no more than 100 characters."),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub description: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 100, message = "Ensure this field has no more than 100 characters."),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub manufacturer: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 50, message = "Ensure this field has no more than 50 characters."),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub serial_number: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "manufactured_on_or_before_today")
    )]
    #[schema(example = "2024-01-01")]
    pub date_of_manufacture: Option<String>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    #[serde(default, deserialize_with = "trimmed")]
    pub warranty_information: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 50, message = "Ensure this field has no more than 50 characters."),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub category: Option<String>,
}

/// A fully validated product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub serial_number: String,
    pub date_of_manufacture: NaiveDate,
    pub warranty_information: Option<String>,
    pub category: String,
}

impl RegisterProduct {
    /// Validates the payload and converts it into a [`NewProduct`].
    pub fn into_new_product(self) -> Result<NewProduct, ValidationErrors> {
        self.validate()?;

        // presence and date format were checked by validate()
        let (
            Some(name),
            Some(description),
            Some(manufacturer),
            Some(serial_number),
            Some(date_of_manufacture),
            Some(category),
        ) = (
            self.name,
            self.description,
            self.manufacturer,
            self.serial_number,
            self.date_of_manufacture.as_deref().and_then(parse_date),
            self.category,
        )
        else {
            return Err(ValidationErrors::new());
        };

        Ok(NewProduct {
            name,
            description,
            manufacturer,
            serial_number,
            date_of_manufacture,
            warranty_information: self.warranty_information,
            category,
        })
    }
}

/// Partial update payload, shared by PUT and PATCH.
///
/// Every field tells an absent key (`None`) apart from an explicit `null`
/// (`Some(None)`); only `warranty_information` may be set to `null`.
/// `manufacturer` and `date_of_manufacture` are accepted so they can be
/// validated, but an update carrying either of them is refused.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProduct {
    #[serde(default, deserialize_with = "trimmed_or_null")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "trimmed_or_null")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "trimmed_or_null")]
    #[schema(value_type = Option<String>)]
    pub manufacturer: Option<Option<String>>,
    #[serde(default, deserialize_with = "trimmed_or_null")]
    #[schema(value_type = Option<String>)]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "trimmed_or_null")]
    #[schema(value_type = Option<String>, example = "2024-01-01")]
    pub date_of_manufacture: Option<Option<String>>,
    /// `null` clears the stored value
    #[serde(default, deserialize_with = "trimmed_or_null")]
    #[schema(value_type = Option<String>, nullable)]
    pub warranty_information: Option<Option<String>>,
    #[serde(default, deserialize_with = "trimmed_or_null")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
}

impl UpdateProduct {
    /// Field-level errors, keyed by field name.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let mut report = |field: &str, message: String| {
            errors.entry(field.to_string()).or_default().push(message);
        };

        let required_text = [
            ("name", &self.name, Some(100)),
            ("description", &self.description, None),
            ("manufacturer", &self.manufacturer, Some(100)),
            ("serial_number", &self.serial_number, Some(50)),
            ("category", &self.category, Some(50)),
        ];
        for (field, value, max) in required_text {
            match value {
                None => {}
                Some(None) => report(field, NULL_MESSAGE.to_string()),
                Some(Some(text)) => {
                    if let Some(message) = text_error(text, max) {
                        report(field, message);
                    }
                }
            }
        }

        match &self.date_of_manufacture {
            None => {}
            Some(None) => report("date_of_manufacture", NULL_MESSAGE.to_string()),
            Some(Some(value)) => {
                if let Err(e) = manufactured_on_or_before_today(value) {
                    let message = e
                        .message
                        .map(Cow::into_owned)
                        .unwrap_or_else(|| DATE_FORMAT_MESSAGE.to_string());
                    report("date_of_manufacture", message);
                }
            }
        }

        if let Some(Some(warranty)) = &self.warranty_information {
            if warranty.chars().count() as u64 > WARRANTY_MAX_LEN {
                report("warranty_information", max_length_message(WARRANTY_MAX_LEN));
            }
        }

        errors
    }

    /// Whether the payload names a field that cannot change after registration,
    /// even with a `null` value.
    pub fn touches_immutable_fields(&self) -> bool {
        self.manufacturer.is_some() || self.date_of_manufacture.is_some()
    }

    /// Only meaningful once [`field_errors`](Self::field_errors) came back empty.
    pub fn into_changes(self) -> ProductChanges {
        ProductChanges {
            name: self.name.flatten(),
            description: self.description.flatten(),
            serial_number: self.serial_number.flatten(),
            warranty_information: self.warranty_information,
            category: self.category.flatten(),
        }
    }
}

/// The mutable subset of a product, as applied by the repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub warranty_information: Option<Option<String>>,
    pub category: Option<String>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.serial_number.is_none()
            && self.warranty_information.is_none()
            && self.category.is_none()
    }
}

impl Product {
    pub fn from_new(id: i32, input: NewProduct) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            manufacturer: input.manufacturer,
            serial_number: input.serial_number,
            date_of_manufacture: input.date_of_manufacture,
            warranty_information: input.warranty_information,
            category: input.category,
        }
    }

    pub fn apply_changes(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(serial_number) = changes.serial_number {
            self.serial_number = serial_number;
        }
        if let Some(warranty) = changes.warranty_information {
            self.warranty_information = warranty;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
    }
}

/// Case-insensitive substring filters, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    /// Whitespace-separated terms; each must match name, manufacturer or category
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn search_terms(&self) -> Vec<&str> {
        self.search
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Fields accepted by the `ordering` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Id,
    Name,
    Description,
    Manufacturer,
    SerialNumber,
    DateOfManufacture,
    WarrantyInformation,
    Category,
}

impl ProductField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "manufacturer" => Some(Self::Manufacturer),
            "serial_number" => Some(Self::SerialNumber),
            "date_of_manufacture" => Some(Self::DateOfManufacture),
            "warranty_information" => Some(Self::WarrantyInformation),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    /// Ascending order, with a missing warranty after any present one.
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Description => a.description.cmp(&b.description),
            Self::Manufacturer => a.manufacturer.cmp(&b.manufacturer),
            Self::SerialNumber => a.serial_number.cmp(&b.serial_number),
            Self::DateOfManufacture => a.date_of_manufacture.cmp(&b.date_of_manufacture),
            Self::WarrantyInformation => {
                match (&a.warranty_information, &b.warranty_information) {
                    (Some(x), Some(y)) => x.cmp(y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            Self::Category => a.category.cmp(&b.category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: ProductField,
    pub descending: bool,
}

/// Requested listing order. Ties, and an empty ordering, fall back to id
/// ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductOrdering(Vec<SortKey>);

impl ProductOrdering {
    /// Parses `name,-date_of_manufacture` style input; unknown fields are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let keys = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|term| {
                let (descending, name) = match term.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, term),
                };
                ProductField::parse(name).map(|field| SortKey { field, descending })
            })
            .collect();
        Self(keys)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        self.0
            .iter()
            .map(|key| {
                let ordering = key.field.compare(a, b);
                if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

/// Query string of `GET /products/`.
///
/// Values are kept as strings so that malformed pagination parameters can
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// Substring of the product name (case-insensitive)
    pub name: Option<String>,
    /// Substring of the manufacturer (case-insensitive)
    pub manufacturer: Option<String>,
    /// Substring of the category (case-insensitive)
    pub category: Option<String>,
    /// Terms matched against name, manufacturer and category
    pub search: Option<String>,
    /// Comma-separated fields, `-` prefix for descending (default `id`)
    pub ordering: Option<String>,
    /// 1-based page index
    pub page: Option<String>,
    /// Results per page (default 5, max 100)
    pub page_size: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ListProductsQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            name: non_empty(self.name.clone()),
            manufacturer: non_empty(self.manufacturer.clone()),
            category: non_empty(self.category.clone()),
            search: non_empty(self.search.clone()),
        }
    }

    pub fn ordering(&self) -> ProductOrdering {
        ProductOrdering::parse(self.ordering.as_deref())
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPage {
    /// Total number of products matching the filters
    pub count: u64,
    /// Link to the next page, if any
    pub next: Option<String>,
    /// Link to the previous page, if any
    pub previous: Option<String>,
    pub results: Vec<Product>,
}
