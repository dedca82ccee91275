use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use super::domain::{
    AccessMethod, Booking, BookingId, BookingStatus, CleanlinessLevel, Frequency, HearAboutUs,
    Parking, ServiceType, StructuredBlob, YesNo,
};
use crate::validation::Choice;

const NOT_APPLICABLE: &str = "N/A";

/// Serializes a blank optional choice as `""`, matching how the form submits it.
fn code_or_blank<T: Choice>(choice: Option<T>) -> &'static str {
    choice.map(Choice::code).unwrap_or_default()
}

fn label_or_na<T: Choice>(choice: Option<T>) -> &'static str {
    choice.map(Choice::label).unwrap_or(NOT_APPLICABLE)
}

/// Flat booking representation returned by create, read and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    pub id: BookingId,
    pub full_name: String,
    pub full_address: String,
    pub total_price: Value,
    pub service_type: ServiceType,
    pub frequency: Frequency,
    pub bedrooms: u16,
    pub bathrooms: u16,
    pub kitchen: u16,
    pub living_dining: u16,
    pub laundry: u16,
    pub storey: u16,
    pub selected_add_ons: StructuredBlob,
    pub add_on_details: StructuredBlob,
    pub selected_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub sms_reminders: bool,
    pub unit_number: String,
    pub street: String,
    pub suburb: String,
    pub postcode: String,
    pub has_pet: &'static str,
    pub hear_about_us: &'static str,
    pub special_notes: String,
    pub cleanliness_level: &'static str,
    pub parking: &'static str,
    pub flexible_date_time: &'static str,
    pub access: &'static str,
    pub price_details: StructuredBlob,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        let details = &booking.details;
        let rooms = details.rooms;
        let customer = &details.customer;
        let address = &details.address;
        let additional = &details.additional;

        Self {
            id: booking.id,
            full_name: booking.full_name(),
            full_address: booking.full_address(),
            total_price: booking.total_price(),
            service_type: details.service_type,
            frequency: details.frequency,
            bedrooms: rooms.bedrooms,
            bathrooms: rooms.bathrooms,
            kitchen: rooms.kitchen,
            living_dining: rooms.living_dining,
            laundry: rooms.laundry,
            storey: rooms.storey,
            selected_add_ons: details.selected_add_ons.clone(),
            add_on_details: details.add_on_details.clone(),
            selected_date: details.selected_date,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            sms_reminders: customer.sms_reminders,
            unit_number: address.unit_number.clone(),
            street: address.street.clone(),
            suburb: address.suburb.clone(),
            postcode: address.postcode.clone(),
            has_pet: code_or_blank::<YesNo>(additional.has_pet),
            hear_about_us: code_or_blank::<HearAboutUs>(additional.hear_about_us),
            special_notes: additional.special_notes.clone(),
            cleanliness_level: code_or_blank::<CleanlinessLevel>(additional.cleanliness_level),
            parking: code_or_blank::<Parking>(additional.parking),
            flexible_date_time: code_or_blank::<YesNo>(additional.flexible_date_time),
            access: code_or_blank::<AccessMethod>(additional.access),
            price_details: details.price_details.clone(),
            status: booking.status,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Admin list columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingListView {
    pub id: BookingId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub service_type: ServiceType,
    pub frequency: Frequency,
    pub selected_date: NaiveDate,
    pub status: BookingStatus,
    pub total_price: Value,
    pub full_address: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Booking> for BookingListView {
    fn from(booking: &Booking) -> Self {
        let details = &booking.details;
        Self {
            id: booking.id,
            full_name: booking.full_name(),
            email: details.customer.email.clone(),
            phone: details.customer.phone.clone(),
            service_type: details.service_type,
            frequency: details.frequency,
            selected_date: details.selected_date,
            status: booking.status,
            total_price: booking.total_price(),
            full_address: booking.full_address(),
            created_at: booking.created_at,
        }
    }
}

/// Human-readable rendering grouped by topic for the office staff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingDetailView {
    pub id: BookingId,
    pub status: BookingStatus,
    pub service_details: ServiceDetails,
    pub customer_information: CustomerInformation,
    pub property_details: PropertyDetails,
    pub additional_information: AdditionalInformation,
    pub add_ons: AddOns,
    pub pricing_details: StructuredBlob,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDetails {
    pub service_type: &'static str,
    pub frequency: &'static str,
    pub preferred_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerInformation {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub sms_reminders: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDetails {
    pub address: String,
    pub unit_number: String,
    pub street: String,
    pub suburb: String,
    pub postcode: String,
    pub bedrooms: u16,
    pub bathrooms: u16,
    pub storeys: u16,
    pub laundries: u16,
    pub kitchen: u16,
    pub living_dining: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalInformation {
    pub has_pet: &'static str,
    pub cleanliness_level: &'static str,
    pub parking: &'static str,
    pub access: &'static str,
    pub flexible_date_time: &'static str,
    pub hear_about_us: &'static str,
    pub special_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddOns {
    pub selected: StructuredBlob,
    pub details: StructuredBlob,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingDetailView {
    fn from(booking: &Booking) -> Self {
        let details = &booking.details;
        let rooms = details.rooms;
        let customer = &details.customer;
        let address = &details.address;
        let additional = &details.additional;

        Self {
            id: booking.id,
            status: booking.status,
            service_details: ServiceDetails {
                service_type: details.service_type.label(),
                frequency: details.frequency.label(),
                preferred_date: details.selected_date,
            },
            customer_information: CustomerInformation {
                name: booking.full_name(),
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
                email: customer.email.clone(),
                phone: customer.phone.clone(),
                sms_reminders: customer.sms_reminders,
            },
            property_details: PropertyDetails {
                address: booking.full_address(),
                unit_number: address.unit_number.clone(),
                street: address.street.clone(),
                suburb: address.suburb.clone(),
                postcode: address.postcode.clone(),
                bedrooms: rooms.bedrooms,
                bathrooms: rooms.bathrooms,
                storeys: rooms.storey,
                laundries: rooms.laundry,
                kitchen: rooms.kitchen,
                living_dining: rooms.living_dining,
            },
            additional_information: AdditionalInformation {
                has_pet: label_or_na(additional.has_pet),
                cleanliness_level: label_or_na(additional.cleanliness_level),
                parking: label_or_na(additional.parking),
                access: label_or_na(additional.access),
                flexible_date_time: label_or_na(additional.flexible_date_time),
                hear_about_us: label_or_na(additional.hear_about_us),
                special_notes: additional.special_notes.clone(),
            },
            add_ons: AddOns {
                selected: details.selected_add_ons.clone(),
                details: details.add_on_details.clone(),
            },
            pricing_details: details.price_details.clone(),
            metadata: Metadata {
                created_at: booking.created_at,
                updated_at: booking.updated_at,
            },
        }
    }
}

/// Aggregate counts; breakdowns only list groups that occur.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingStatistics {
    pub total_bookings: usize,
    pub status_breakdown: BTreeMap<&'static str, usize>,
    pub service_breakdown: BTreeMap<&'static str, usize>,
    pub recent_bookings_30_days: usize,
}
