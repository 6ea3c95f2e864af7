// Booking summary computation

use crate::config::BookingConfig;
use crate::dialog::BookingDraft;
use crate::listing::RoomType;
use crate::render::format_price;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSummary {
    pub room_type_label: String,
    pub price: String,
    pub total: String,
    pub duration: String,
}

impl BookingSummary {
    pub fn unset(placeholder: &str) -> Self {
        Self {
            room_type_label: placeholder.to_string(),
            price: placeholder.to_string(),
            total: placeholder.to_string(),
            duration: placeholder.to_string(),
        }
    }
}

/// `4-person` becomes `4 Person`: the first hyphen turns into a space and every word is capitalized.
pub fn humanize_room_type(room_type: &RoomType) -> String {
    let spaced = room_type.as_str().replacen('-', " ", 1);
    let mut humanized = String::with_capacity(spaced.len());
    let mut in_word = false;
    for ch in spaced.chars() {
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        if is_word && !in_word {
            humanized.push(ch.to_ascii_uppercase());
        } else {
            humanized.push(ch);
        }
        in_word = is_word;
    }
    humanized
}

/// `2024-2025` becomes `2024/2025`.
pub fn humanize_term(term: &str) -> String {
    term.replacen('-', "/", 1)
}

// No multi-item totals: the total is always the unit price of the selected room
pub fn compute_summary(draft: &BookingDraft, config: &BookingConfig) -> BookingSummary {
    let mut summary = BookingSummary::unset(&config.unset_placeholder);

    if let Some(room_type) = draft.selected_room_type() {
        if let Some(price) = draft.listing().price_for(room_type) {
            let formatted = format_price(price, &config.currency);
            summary.room_type_label = humanize_room_type(room_type);
            summary.price = formatted.clone();
            summary.total = formatted;
        }
    }

    if let Some(term) = draft.selected_term() {
        summary.duration = humanize_term(term);
    }

    summary
}
