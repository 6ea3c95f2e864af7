// Booking form validation
// Fields are checked in a fixed order and only the first failure is reported.

use crate::error::ValidationError;
use crate::listing::{HostelListing, RoomType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    GuestName,
    Email,
    Phone,
    IndexNumber,
    RoomType,
    Term,
}

impl FormField {
    pub const VALIDATION_ORDER: [FormField; 6] = [
        FormField::GuestName,
        FormField::Email,
        FormField::Phone,
        FormField::IndexNumber,
        FormField::RoomType,
        FormField::Term,
    ];

    // Wording used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            FormField::GuestName => "guest name",
            FormField::Email => "guest email",
            FormField::Phone => "guest phone",
            FormField::IndexNumber => "index number",
            FormField::RoomType => "room type",
            FormField::Term => "academic year",
        }
    }

    // Name of the input element on the booking form
    pub fn form_name(&self) -> &'static str {
        match self {
            FormField::GuestName => "guest-name",
            FormField::Email => "guest-email",
            FormField::Phone => "guest-phone",
            FormField::IndexNumber => "index-number",
            FormField::RoomType => "room-type",
            FormField::Term => "academic-year",
        }
    }

    pub fn from_form_name(name: &str) -> Option<Self> {
        Self::VALIDATION_ORDER
            .into_iter()
            .find(|field| field.form_name() == name)
    }
}

/// Raw values as entered on the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookingForm {
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub index_number: String,
    pub room_type: String,
    pub term: String,
}

impl BookingForm {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::GuestName => &self.guest_name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::IndexNumber => &self.index_number,
            FormField::RoomType => &self.room_type,
            FormField::Term => &self.term,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::GuestName => self.guest_name = value,
            FormField::Email => self.email = value,
            FormField::Phone => self.phone = value,
            FormField::IndexNumber => self.index_number = value,
            FormField::RoomType => self.room_type = value,
            FormField::Term => self.term = value,
        }
    }

    pub fn reset(&mut self) {
        *self = BookingForm::default();
    }
}

/// Validated field set handed to a submission backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSubmission {
    pub listing_id: u32,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub index_number: String,
    pub room_type: RoomType,
    pub term: String,
}

fn index_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("index number pattern is valid"))
}

pub fn is_valid_index_number(value: &str) -> bool {
    index_number_pattern().is_match(value)
}

/// Checks required fields and the index number format.
pub fn validate(form: &BookingForm) -> Result<(), ValidationError> {
    for field in FormField::VALIDATION_ORDER {
        if form.value(field).trim().is_empty() {
            return Err(ValidationError::field(
                field,
                format!("Please fill in {}", field.label()),
            ));
        }
    }

    if !is_valid_index_number(form.index_number.trim()) {
        return Err(ValidationError::field(
            FormField::IndexNumber,
            "Index number should contain only letters and numbers",
        ));
    }

    Ok(())
}

// Full validation against the listing being booked
pub fn validate_submission(
    listing: &HostelListing,
    form: &BookingForm,
) -> Result<BookingSubmission, ValidationError> {
    validate(form)?;

    let room_type = RoomType::new(form.room_type.trim());
    if !listing.has_room_type(&room_type) {
        return Err(ValidationError::field(
            FormField::RoomType,
            format!("{} does not offer room type '{}'", listing.name(), room_type),
        ));
    }

    Ok(BookingSubmission {
        listing_id: listing.id(),
        guest_name: form.guest_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        index_number: form.index_number.trim().to_string(),
        room_type,
        term: form.term.trim().to_string(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::BookingForm;

    pub fn complete_form(room_type: &str) -> BookingForm {
        BookingForm {
            guest_name: "Ama Mensah".to_string(),
            email: "ama@example.com".to_string(),
            phone: "+233 20 000 0000".to_string(),
            index_number: "UEB1234522".to_string(),
            room_type: room_type.to_string(),
            term: "2024-2025".to_string(),
        }
    }
}
