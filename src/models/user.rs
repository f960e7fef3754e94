//! User (patron) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::UserStatus;

/// Patron model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Borrow card number, unique per patron
    pub card_number: String,
    pub status: i16,
    pub create_time: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == i16::from(UserStatus::Active)
    }
}

/// How a borrow request identifies the patron: the admin console sends a
/// single free-form field that is either a numeric patron id or a card
/// number / name. Parsed once, then resolved by exactly one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatronLookup {
    ById(i32),
    ByCard(String),
}

impl PatronLookup {
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i32>() {
            Ok(id) => Some(PatronLookup::ById(id)),
            Err(_) => Some(PatronLookup::ByCard(trimmed.to_string())),
        }
    }
}

/// Create patron request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub card_number: String,
}

/// Update patron request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub card_number: String,
}

/// Paged patron query parameters
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub card_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_input_resolves_by_id() {
        assert_eq!(PatronLookup::parse("42"), Some(PatronLookup::ById(42)));
    }

    #[test]
    fn parse_text_input_resolves_by_card() {
        assert_eq!(
            PatronLookup::parse("LIB-0042"),
            Some(PatronLookup::ByCard("LIB-0042".to_string()))
        );
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(PatronLookup::parse("  7 "), Some(PatronLookup::ById(7)));
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(PatronLookup::parse("   "), None);
        assert_eq!(PatronLookup::parse(""), None);
    }
}
