use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::DbInt;

/// Full `vicidial_list` row as returned by the lead info endpoint
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lead {
    pub lead_id: DbInt,
    pub list_id: DbInt,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_initial: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub alt_phone: Option<String>,
    pub email: Option<String>,
    pub security: Option<String>,
    pub comments: Option<String>,
    pub status: Option<String>,
    pub entry_date: Option<NaiveDateTime>,
    pub modify_date: Option<NaiveDateTime>,
    pub called_count: Option<DbInt>,
    pub rank: Option<DbInt>,
    pub owner: Option<String>,
}

impl Lead {
    pub const SELECT: &'static str = "SELECT lead_id, list_id, phone_number, first_name, last_name, middle_initial, \
        address1, address2, address3, city, state, province, postal_code, country_code, gender, \
        CAST(date_of_birth AS CHAR) AS date_of_birth, alt_phone, email, security, comments, status, \
        entry_date, modify_date, called_count, `rank`, owner FROM vicidial_list";
}

/// Writable lead fields, used both as request body and create response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadInput {
    pub lead_id: i64,
    pub list_id: i64,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: String,
    pub address1: String,
    pub address2: String,
    pub address3: String,
    pub city: String,
    pub state: String,
    pub province: String,
    pub postal_code: String,
    pub country_code: String,
    pub gender: String,
    pub date_of_birth: String,
    pub alt_phone: String,
    pub email: String,
    pub security: String,
    pub comments: String,
    pub status: String,
    pub rank: i64,
    pub owner: String,
}

impl LeadInput {
    /// Empty birth dates go to the DATE column as NULL
    pub fn date_of_birth(&self) -> Option<&str> {
        Some(self.date_of_birth.as_str()).filter(|d| !d.is_empty())
    }
}

/// Row shape of the lead search endpoint
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeadSummary {
    pub lead_id: DbInt,
    pub list_id: DbInt,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub entry_date: Option<NaiveDateTime>,
}

/// Row shape of the status search endpoint
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeadStatusRow {
    pub lead_id: DbInt,
    pub list_id: DbInt,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Callback {
    pub callback_id: DbInt,
    pub lead_id: DbInt,
    pub list_id: Option<DbInt>,
    pub campaign_id: Option<String>,
    pub status: Option<String>,
    pub entry_time: Option<NaiveDateTime>,
    pub callback_time: Option<NaiveDateTime>,
    pub user: Option<String>,
    pub recipient: Option<String>,
    pub comments: Option<String>,
}

/// Columns a caller may read through the single-field lookup.
///
/// Each token maps to fixed SQL text; nothing from the request is ever
/// spliced into the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadField {
    PhoneNumber,
    FirstName,
    LastName,
    Email,
    Status,
    Comments,
    Address1,
    City,
    State,
}

impl LeadField {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "phone_number" => Some(Self::PhoneNumber),
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            "email" => Some(Self::Email),
            "status" => Some(Self::Status),
            "comments" => Some(Self::Comments),
            "address1" => Some(Self::Address1),
            "city" => Some(Self::City),
            "state" => Some(Self::State),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PhoneNumber => "phone_number",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Status => "status",
            Self::Comments => "comments",
            Self::Address1 => "address1",
            Self::City => "city",
            Self::State => "state",
        }
    }

    pub fn select_sql(self) -> &'static str {
        match self {
            Self::PhoneNumber => "SELECT phone_number FROM vicidial_list WHERE lead_id = ?",
            Self::FirstName => "SELECT first_name FROM vicidial_list WHERE lead_id = ?",
            Self::LastName => "SELECT last_name FROM vicidial_list WHERE lead_id = ?",
            Self::Email => "SELECT email FROM vicidial_list WHERE lead_id = ?",
            Self::Status => "SELECT status FROM vicidial_list WHERE lead_id = ?",
            Self::Comments => "SELECT comments FROM vicidial_list WHERE lead_id = ?",
            Self::Address1 => "SELECT address1 FROM vicidial_list WHERE lead_id = ?",
            Self::City => "SELECT city FROM vicidial_list WHERE lead_id = ?",
            Self::State => "SELECT state FROM vicidial_list WHERE lead_id = ?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_round_trips_tokens() {
        for token in ["phone_number", "first_name", "last_name", "email", "status", "comments", "address1", "city", "state"] {
            let field = LeadField::parse(token).unwrap();
            assert_eq!(field.name(), token);
            assert!(field.select_sql().starts_with(&format!("SELECT {} FROM", token)));
        }
    }

    #[test]
    fn rejects_anything_outside_allow_list() {
        for token in ["lead_id", "security", "phone_number; DROP TABLE vicidial_list", "PHONE_NUMBER", "", "*"] {
            assert!(LeadField::parse(token).is_none(), "{} should be rejected", token);
        }
    }

    #[test]
    fn input_defaults_are_blank() {
        let input: LeadInput = serde_json::from_str(r#"{"phone_number":"5551234567","list_id":10}"#).unwrap();
        assert_eq!(input.list_id, 10);
        assert!(input.status.is_empty());
        assert!(input.date_of_birth().is_none());
    }
}
