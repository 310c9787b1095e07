//! Ordering and paging parameters for list queries

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Field plus direction, parsed from `field` or `field:asc|desc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (field, direction) = match parts.as_slice() {
            [field] => (*field, OrderDirection::Asc),
            [field, "asc"] => (*field, OrderDirection::Asc),
            [field, "desc"] => (*field, OrderDirection::Desc),
            _ => {
                return Err(
                    "Invalid order format. Use 'field', 'field:asc' or 'field:desc'".to_string(),
                );
            }
        };
        if field.is_empty() {
            return Err("Order field must not be empty".to_string());
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Ordering and paging for a filtered listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub order_by: Option<OrderBy>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// One page of a filtered listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_items: u64,
}
