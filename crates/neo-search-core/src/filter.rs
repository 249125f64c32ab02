//! Filter predicates over catalog entries and approach events.
//!
//! A predicate is parsed once from a `field:operator:value` token. The field
//! decides which entity type the predicate targets and how the value is
//! typed:
//!
//! | Field | Target | Attribute | Value | Operators |
//! |-------|--------|-----------|-------|-----------|
//! | `diameter` | entry | minimum estimated diameter (km) | float | `=`, `>`, `>=` |
//! | `is_hazardous` | entry | potentially hazardous flag | bool | `=` |
//! | `distance` | event | miss distance (km) | float | `=`, `>`, `>=` |

use std::fmt;

use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::models::{parse_flag, ApproachEvent, CatalogEntry};

/// A filterable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Diameter,
    Distance,
    IsHazardous,
}

/// Entity type a field lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterTarget {
    Entry,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterOp {
    Eq,
    Gt,
    Ge,
}

/// A typed comparison operand, or a typed attribute read off an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Flag(bool),
}

impl FilterField {
    pub const ALL: [FilterField; 3] = [
        FilterField::Diameter,
        FilterField::Distance,
        FilterField::IsHazardous,
    ];

    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
                CatalogError::unsupported(format!(
                    "filter field '{}' (expected one of: {})",
                    name,
                    known.join(", ")
                ))
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Diameter => "diameter",
            Self::Distance => "distance",
            Self::IsHazardous => "is_hazardous",
        }
    }

    pub fn target(self) -> FilterTarget {
        match self {
            Self::Diameter | Self::IsHazardous => FilterTarget::Entry,
            Self::Distance => FilterTarget::Event,
        }
    }

    fn parse_value(self, raw: &str) -> Result<FilterValue> {
        match self {
            Self::Diameter | Self::Distance => raw
                .trim()
                .parse::<f64>()
                .map(FilterValue::Number)
                .map_err(|_| CatalogError::invalid(self.name(), raw)),
            Self::IsHazardous => parse_flag(self.name(), raw).map(FilterValue::Flag),
        }
    }
}

impl FilterOp {
    pub fn parse(symbol: &str) -> Result<Self> {
        match symbol {
            "=" => Ok(Self::Eq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(CatalogError::unsupported(format!(
                "filter operator '{}' (expected =, >, or >=)",
                other
            ))),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// Read a field off an entity. Returns `None` when the entity does not
/// carry that field.
pub trait Filterable {
    fn field_value(&self, field: FilterField) -> Option<FilterValue>;
}

impl Filterable for CatalogEntry {
    fn field_value(&self, field: FilterField) -> Option<FilterValue> {
        match field {
            FilterField::Diameter => Some(FilterValue::Number(self.diameter_min_km)),
            FilterField::IsHazardous => Some(FilterValue::Flag(self.is_hazardous)),
            FilterField::Distance => None,
        }
    }
}

impl Filterable for ApproachEvent {
    fn field_value(&self, field: FilterField) -> Option<FilterValue> {
        match field {
            FilterField::Distance => Some(FilterValue::Number(self.miss_distance_km)),
            FilterField::Diameter | FilterField::IsHazardous => None,
        }
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn field_value(&self, field: FilterField) -> Option<FilterValue> {
        (**self).field_value(field)
    }
}

/// A single `field operator value` test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPredicate {
    field: FilterField,
    op: FilterOp,
    value: FilterValue,
}

impl FilterPredicate {
    /// Build a predicate, rejecting operand types that do not match the
    /// field and ordering operators on the hazard flag.
    pub fn new(field: FilterField, op: FilterOp, value: FilterValue) -> Result<Self> {
        match (field, value) {
            (FilterField::Diameter | FilterField::Distance, FilterValue::Number(_)) => {}
            (FilterField::IsHazardous, FilterValue::Flag(_)) => {
                if op != FilterOp::Eq {
                    return Err(CatalogError::unsupported(format!(
                        "operator '{}' on is_hazardous (only = is supported)",
                        op.symbol()
                    )));
                }
            }
            _ => return Err(CatalogError::invalid(field.name(), value.to_string())),
        }
        Ok(Self { field, op, value })
    }

    /// Parse a `field:operator:value` token.
    pub fn parse(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.split(':').collect();
        let [field, op, value] = parts.as_slice() else {
            return Err(CatalogError::invalid("filter", token));
        };
        let field = FilterField::parse(field.trim())?;
        let op = FilterOp::parse(op.trim())?;
        let value = field.parse_value(value)?;
        Self::new(field, op, value)
    }

    pub fn field(&self) -> FilterField {
        self.field
    }

    pub fn target(&self) -> FilterTarget {
        self.field.target()
    }

    pub fn op(&self) -> FilterOp {
        self.op
    }

    pub fn value(&self) -> FilterValue {
        self.value
    }

    /// True if `entity` carries the field and the comparison holds.
    pub fn apply<T: Filterable + ?Sized>(&self, entity: &T) -> bool {
        let Some(actual) = entity.field_value(self.field) else {
            return false;
        };
        match (actual, self.value) {
            (FilterValue::Number(a), FilterValue::Number(b)) => match self.op {
                FilterOp::Eq => a == b,
                FilterOp::Gt => a > b,
                FilterOp::Ge => a >= b,
            },
            (FilterValue::Flag(a), FilterValue::Flag(b)) => self.op == FilterOp::Eq && a == b,
            _ => false,
        }
    }

    /// Keep the entities that pass, in input order.
    pub fn apply_many<T: Filterable>(&self, entities: Vec<T>) -> Vec<T> {
        entities.into_iter().filter(|e| self.apply(e)).collect()
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.field().name(), self.op().symbol(), self.value())
    }
}
