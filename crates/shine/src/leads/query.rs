use std::cmp::Ordering;

use serde::Deserialize;

use super::domain::Booking;
use crate::listing::{matches_terms, ordering_keys, search_terms, OrderingKey};
use crate::validation::Choice;

/// Filters, search and ordering accepted by the booking list and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookingQuery {
    pub service_type: Option<String>,
    pub frequency: Option<String>,
    pub status: Option<String>,
    /// `YYYY-MM-DD`.
    pub selected_date: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BookingSortKey {
    CreatedAt,
    SelectedDate,
    Status,
}

impl BookingSortKey {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(Self::CreatedAt),
            "selected_date" => Some(Self::SelectedDate),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    fn compare(self, a: &Booking, b: &Booking) -> Ordering {
        match self {
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::SelectedDate => a.details.selected_date.cmp(&b.details.selected_date),
            Self::Status => a.status.code().cmp(b.status.code()),
        }
    }
}

/// Newest first, then highest id.
fn newest_first(a: &Booking, b: &Booking) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        let details = &booking.details;
        let exact = [
            (&self.service_type, details.service_type.code().to_string()),
            (&self.frequency, details.frequency.code().to_string()),
            (&self.status, booking.status.code().to_string()),
            (
                &self.selected_date,
                details.selected_date.format("%Y-%m-%d").to_string(),
            ),
        ];
        if exact
            .iter()
            .any(|(wanted, actual)| wanted.as_ref().is_some_and(|wanted| wanted != actual))
        {
            return false;
        }

        let customer = &details.customer;
        let address = &details.address;
        matches_terms(
            &search_terms(self.search.as_deref()),
            &[
                &customer.first_name,
                &customer.last_name,
                &customer.email,
                &customer.phone,
                &address.suburb,
                &address.postcode,
            ],
        )
    }

    pub fn apply(&self, bookings: Vec<Booking>) -> Vec<Booking> {
        let keys = ordering_keys(self.ordering.as_deref(), BookingSortKey::resolve);
        let mut bookings: Vec<Booking> = bookings
            .into_iter()
            .filter(|booking| self.matches(booking))
            .collect();
        bookings.sort_by(|a, b| {
            keys.iter()
                .map(|OrderingKey { key, descending }| {
                    let ordering = key.compare(a, b);
                    if *descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| newest_first(a, b))
        });
        bookings
    }
}
