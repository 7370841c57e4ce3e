use regex::Regex;

use rocket::request::FromParam;
use rocket::serde::{Serialize, Serializer};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Path segment under which the front-end shows a ticket
const TICKET_INFO_PATH: &str = "ticket_info";

/// Returned when a string can't be used as a ticket identifier
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TicketIdError {
    #[error("invalid ticket id {0:?}: expected 1-64 characters of [A-Za-z0-9_-] starting with a letter or digit")]
    Invalid(String),
}

/// Identifies a single ticket.
///
/// Either a number or a short string. Identifiers end up inside URLs, file names
/// and the rendered label, so only `[A-Za-z0-9_-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text printed on the ticket image, e.g. `Ticket #1`
    pub fn label(&self) -> String {
        format!("Ticket #{}", self.0)
    }
}

/// Validate ticket ids using the regex `^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$`
pub fn is_ticket_id_valid(id: &str) -> bool {
    let regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$").unwrap();
    regex.is_match(id)
}

/// Builds the deep link encoded in the QR code: `<origin>/ticket_info/<id>`
pub fn ticket_link(origin: &str, id: &TicketId) -> String {
    format!(
        "{}/{}/{}",
        origin.trim_end_matches('/'),
        TICKET_INFO_PATH,
        id
    )
}

impl FromStr for TicketId {
    type Err = TicketIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_ticket_id_valid(s) {
            Ok(TicketId(s.to_string()))
        } else {
            Err(TicketIdError::Invalid(s.to_string()))
        }
    }
}

impl From<u64> for TicketId {
    fn from(id: u64) -> Self {
        TicketId(id.to_string())
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TicketId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'a> FromParam<'a> for TicketId {
    type Error = TicketIdError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}
