//! Form sanitizing and validation helpers
//!
//! Forms are processed in three steps: every field is trimmed, the
//! `validator` rules run on the trimmed values, then text fields are escaped.
//! Errors are reported in field declaration order.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::book_instance::BookStatus;

/// A single validation failure shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Raw form input that goes through trim, validate and escape
pub trait FormInput: Validate {
    /// Field names in declaration order
    const FIELDS: &'static [&'static str];

    /// Trim whitespace; empty optional fields become `None`
    fn trim(&mut self);

    /// Escape markup-significant characters in text fields
    fn escape(&mut self);
}

/// Trim, validate and escape `form`, returning the failures in field order.
pub fn sanitize<F: FormInput>(form: &mut F) -> Vec<FieldError> {
    form.trim();
    let errors = collect_errors(form);
    form.escape();
    errors
}

fn collect_errors<F: FormInput>(form: &F) -> Vec<FieldError> {
    let Err(errors) = form.validate() else {
        return Vec::new();
    };

    let mut by_field: Vec<(usize, FieldError)> = Vec::new();
    for (name, field_errors) in errors.field_errors() {
        let name = name.to_string();
        let position = F::FIELDS
            .iter()
            .position(|f| *f == name)
            .unwrap_or(F::FIELDS.len());
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            by_field.push((
                position,
                FieldError {
                    field: name.clone(),
                    message,
                },
            ));
        }
    }
    // stable: keeps rule order within a field
    by_field.sort_by_key(|(position, _)| *position);
    by_field.into_iter().map(|(_, e)| e).collect()
}

const ENTITIES: [(char, &str); 8] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('/', "&#x2F;"),
    ('\\', "&#x5C;"),
    ('`', "&#96;"),
];

/// Escape `& < > " ' / \` and backtick as HTML entities
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match ENTITIES.iter().find(|(raw, _)| *raw == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`], used to pre-populate forms with stored text
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match ENTITIES.iter().find(|(_, entity)| rest.starts_with(entity)) {
            Some((raw, entity)) => {
                out.push(*raw);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional field, treating an empty value as absent
pub fn trim_optional(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
}

/// Parse an ISO-8601 date or date-time, keeping the date part.
///
/// Reduced precision (`1815`, `1815-12`) maps to the first day of the
/// period. Basic (`18151210`), ordinal (`1815-344`) and week (`1815-W50-7`)
/// dates are accepted, optionally followed by a time with or without offset.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if !value.is_ascii() {
        return None;
    }
    let (date, time) = match value.find(|c: char| c == 'T' || c == ' ') {
        Some(at) => (&value[..at], Some(&value[at + 1..])),
        None => (value, None),
    };
    let date = calendar_date(date)?;
    match time {
        Some(time) if !valid_time(time) => None,
        _ => Some(date),
    }
}

fn digits(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn calendar_date(value: &str) -> Option<NaiveDate> {
    if value.len() < 4 {
        return None;
    }
    let (year, rest) = value.split_at(4);
    let year = digits(year)? as i32;
    // extended and basic separators cannot be mixed
    let (extended, rest) = match rest.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    if let Some(week) = rest.strip_prefix('W') {
        let (week, day) = match (extended, week.len()) {
            (_, 2) => (week, None),
            (true, 4) if week.as_bytes()[2] == b'-' => (&week[..2], Some(&week[3..])),
            (false, 3) => (&week[..2], Some(&week[2..])),
            _ => return None,
        };
        let weekday = match day {
            Some(day) => *WEEKDAYS.get((digits(day)? as usize).checked_sub(1)?)?,
            None => Weekday::Mon,
        };
        return NaiveDate::from_isoywd_opt(year, digits(week)?, weekday);
    }

    match (extended, rest.len()) {
        (false, 0) => NaiveDate::from_ymd_opt(year, 1, 1),
        (true, 2) => NaiveDate::from_ymd_opt(year, digits(rest)?, 1),
        (_, 3) => NaiveDate::from_yo_opt(year, digits(rest)?),
        (false, 4) => NaiveDate::from_ymd_opt(year, digits(&rest[..2])?, digits(&rest[2..])?),
        (true, 5) if rest.as_bytes()[2] == b'-' => {
            NaiveDate::from_ymd_opt(year, digits(&rest[..2])?, digits(&rest[3..])?)
        }
        _ => None,
    }
}

/// `hh[:mm[:ss[.fff]]]` or the basic form, then an optional `Z` or offset
fn valid_time(value: &str) -> bool {
    let clock = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(clock) => clock,
        None => match value.rfind(|c: char| c == '+' || c == '-') {
            Some(at) if valid_offset(&value[at + 1..]) => &value[..at],
            Some(_) => return false,
            None => value,
        },
    };
    let clock = clock.replace(',', ".");
    if clock.len() == 2 {
        return digits(&clock).is_some_and(|hour| hour < 24);
    }
    ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"]
        .iter()
        .any(|format| NaiveTime::parse_from_str(&clock, format).is_ok())
}

fn valid_offset(value: &str) -> bool {
    let (hours, minutes) = match value.len() {
        2 => (value, "00"),
        4 => value.split_at(2),
        5 if value.as_bytes()[2] == b':' => (&value[..2], &value[3..]),
        _ => return false,
    };
    matches!((digits(hours), digits(minutes)), (Some(h), Some(m)) if h < 24 && m < 60)
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn is_alphanumeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn first_name_chars(value: &str) -> Result<(), ValidationError> {
    if is_alphanumeric(value) {
        Ok(())
    } else {
        Err(failure("alphanumeric", "First name has non-alphanumeric characters."))
    }
}

pub fn family_name_chars(value: &str) -> Result<(), ValidationError> {
    if is_alphanumeric(value) {
        Ok(())
    } else {
        Err(failure("alphanumeric", "Family name has non-alphanumeric characters."))
    }
}

pub fn valid_date_of_birth(value: &str) -> Result<(), ValidationError> {
    parse_iso_date(value)
        .map(|_| ())
        .ok_or_else(|| failure("iso8601", "Invalid date of birth"))
}

pub fn valid_date_of_death(value: &str) -> Result<(), ValidationError> {
    parse_iso_date(value)
        .map(|_| ())
        .ok_or_else(|| failure("iso8601", "Invalid date of death"))
}

pub fn valid_due_back(value: &str) -> Result<(), ValidationError> {
    parse_iso_date(value)
        .map(|_| ())
        .ok_or_else(|| failure("iso8601", "Invalid date"))
}

/// Empty values are left to the length rule
pub fn author_reference(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || Uuid::parse_str(value).is_ok() {
        Ok(())
    } else {
        Err(failure("identifier", "Author must be a valid identifier."))
    }
}

pub fn book_reference(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || Uuid::parse_str(value).is_ok() {
        Ok(())
    } else {
        Err(failure("identifier", "Book must be a valid identifier."))
    }
}

#[allow(clippy::ptr_arg)]
pub fn genre_references(values: &Vec<String>) -> Result<(), ValidationError> {
    if values.iter().all(|v| Uuid::parse_str(v).is_ok()) {
        Ok(())
    } else {
        Err(failure("identifier", "Genre selection is invalid."))
    }
}

pub fn book_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<BookStatus>()
        .map(|_| ())
        .map_err(|_| failure("status", "Invalid status"))
}
