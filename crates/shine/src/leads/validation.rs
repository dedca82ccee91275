use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{
    AdditionalInfo, Address, BookingDetails, Customer, Frequency, RoomCounts, StructuredBlob,
};
use crate::validation::{
    optional_choice, optional_text, parse_flag, required_choice, required_text, Choice,
    FieldErrors, REQUIRED,
};

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 20;
const PHONE_MIN: usize = 8;
const UNIT_MAX: usize = 50;
const STREET_MAX: usize = 200;
const SUBURB_MAX: usize = 100;
const POSTCODE_MAX: usize = 10;
const ROOM_MAX: i64 = 32_767;

const INVALID_EMAIL: &str = "Enter a valid email address.";
const SHORT_PHONE: &str = "Phone number must be at least 8 digits.";
const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
const INVALID_JSON: &str = "Value must be valid JSON.";
const NOT_AN_OBJECT: &str = "Expected a JSON object.";
const NOT_A_STRING: &str = "Not a valid string.";

/// Booking calculator payload as posted by the public form. Every field arrives
/// loosely typed: text fields also take numbers and booleans, counts and flags also
/// take text. [`Self::validate`] normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSubmission {
    pub service_type: Option<Value>,
    pub frequency: Option<Value>,
    pub bedrooms: Option<Value>,
    pub bathrooms: Option<Value>,
    pub kitchen: Option<Value>,
    pub living_dining: Option<Value>,
    pub laundry: Option<Value>,
    pub storey: Option<Value>,
    pub selected_add_ons: Option<Value>,
    pub add_on_details: Option<Value>,
    pub selected_date: Option<Value>,
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub sms_reminders: Option<Value>,
    pub unit_number: Option<Value>,
    pub street: Option<Value>,
    pub suburb: Option<Value>,
    pub postcode: Option<Value>,
    pub has_pet: Option<Value>,
    pub hear_about_us: Option<Value>,
    pub special_notes: Option<Value>,
    pub cleanliness_level: Option<Value>,
    pub parking: Option<Value>,
    pub flexible_date_time: Option<Value>,
    pub access: Option<Value>,
    pub price_details: Option<Value>,
}

impl BookingSubmission {
    /// Check every field, collecting all failures before returning.
    pub fn validate(self) -> Result<BookingDetails, FieldErrors> {
        let mut errors = FieldErrors::default();

        let service_type = choice(&mut errors, "service_type", self.service_type);
        let frequency = match self.frequency {
            None | Some(Value::Null) => Some(Frequency::Once),
            raw => choice(&mut errors, "frequency", raw),
        };

        let defaults = RoomCounts::default();
        let rooms = RoomCounts {
            bedrooms: room_count(&mut errors, "bedrooms", self.bedrooms, defaults.bedrooms),
            bathrooms: room_count(&mut errors, "bathrooms", self.bathrooms, defaults.bathrooms),
            kitchen: room_count(&mut errors, "kitchen", self.kitchen, defaults.kitchen),
            living_dining: room_count(
                &mut errors,
                "living_dining",
                self.living_dining,
                defaults.living_dining,
            ),
            laundry: room_count(&mut errors, "laundry", self.laundry, defaults.laundry),
            storey: room_count(&mut errors, "storey", self.storey, defaults.storey),
        };

        let selected_add_ons = structured_blob(&mut errors, "selected_add_ons", self.selected_add_ons);
        let add_on_details = structured_blob(&mut errors, "add_on_details", self.add_on_details);
        let price_details = structured_blob(&mut errors, "price_details", self.price_details);

        let selected_date = as_text(&mut errors, "selected_date", self.selected_date, service_date);

        let customer = Customer {
            first_name: text(&mut errors, "first_name", self.first_name, NAME_MAX),
            last_name: text(&mut errors, "last_name", self.last_name, NAME_MAX),
            email: as_text(&mut errors, "email", self.email, email),
            phone: as_text(&mut errors, "phone", self.phone, phone),
            sms_reminders: flag(&mut errors, "sms_reminders", self.sms_reminders, true),
        };

        let address = Address {
            unit_number: optional(&mut errors, "unit_number", self.unit_number, Some(UNIT_MAX)),
            street: text(&mut errors, "street", self.street, STREET_MAX),
            suburb: text(&mut errors, "suburb", self.suburb, SUBURB_MAX),
            postcode: text(&mut errors, "postcode", self.postcode, POSTCODE_MAX),
        };

        let additional = AdditionalInfo {
            has_pet: maybe_choice(&mut errors, "has_pet", self.has_pet),
            hear_about_us: maybe_choice(&mut errors, "hear_about_us", self.hear_about_us),
            special_notes: optional(&mut errors, "special_notes", self.special_notes, None),
            cleanliness_level: maybe_choice(&mut errors, "cleanliness_level", self.cleanliness_level),
            parking: maybe_choice(&mut errors, "parking", self.parking),
            flexible_date_time: maybe_choice(
                &mut errors,
                "flexible_date_time",
                self.flexible_date_time,
            ),
            access: maybe_choice(&mut errors, "access", self.access),
        };

        match (service_type, frequency, selected_date) {
            (Some(service_type), Some(frequency), Some(selected_date)) => {
                errors.finish(BookingDetails {
                    service_type,
                    frequency,
                    rooms,
                    selected_add_ons,
                    add_on_details,
                    selected_date,
                    customer,
                    address,
                    additional,
                    price_details,
                })
            }
            _ => Err(errors),
        }
    }

    /// Partial update: anything omitted or null keeps its stored value.
    pub fn validate_patch(self, current: &BookingDetails) -> Result<BookingDetails, FieldErrors> {
        self.fill_from(current).validate()
    }

    fn fill_from(mut self, current: &BookingDetails) -> Self {
        fn keep(value: &mut Option<Value>, stored: Value) {
            if matches!(value, None | Some(Value::Null)) {
                *value = Some(stored);
            }
        }
        fn keep_choice<T: Choice>(value: &mut Option<Value>, stored: Option<T>) {
            if let Some(stored) = stored {
                keep(value, Value::from(stored.code()));
            }
        }

        let rooms = current.rooms;
        let customer = &current.customer;
        let address = &current.address;
        let additional = &current.additional;

        keep(&mut self.service_type, Value::from(current.service_type.code()));
        keep(&mut self.frequency, Value::from(current.frequency.code()));
        keep(&mut self.bedrooms, Value::from(rooms.bedrooms));
        keep(&mut self.bathrooms, Value::from(rooms.bathrooms));
        keep(&mut self.kitchen, Value::from(rooms.kitchen));
        keep(&mut self.living_dining, Value::from(rooms.living_dining));
        keep(&mut self.laundry, Value::from(rooms.laundry));
        keep(&mut self.storey, Value::from(rooms.storey));
        keep(&mut self.selected_add_ons, Value::Object(current.selected_add_ons.clone()));
        keep(&mut self.add_on_details, Value::Object(current.add_on_details.clone()));
        keep(
            &mut self.selected_date,
            Value::from(current.selected_date.format("%Y-%m-%d").to_string()),
        );
        keep(&mut self.first_name, Value::from(customer.first_name.as_str()));
        keep(&mut self.last_name, Value::from(customer.last_name.as_str()));
        keep(&mut self.email, Value::from(customer.email.as_str()));
        keep(&mut self.phone, Value::from(customer.phone.as_str()));
        keep(&mut self.sms_reminders, Value::from(customer.sms_reminders));
        keep(&mut self.unit_number, Value::from(address.unit_number.as_str()));
        keep(&mut self.street, Value::from(address.street.as_str()));
        keep(&mut self.suburb, Value::from(address.suburb.as_str()));
        keep(&mut self.postcode, Value::from(address.postcode.as_str()));
        keep_choice(&mut self.has_pet, additional.has_pet);
        keep_choice(&mut self.hear_about_us, additional.hear_about_us);
        keep(&mut self.special_notes, Value::from(additional.special_notes.as_str()));
        keep_choice(&mut self.cleanliness_level, additional.cleanliness_level);
        keep_choice(&mut self.parking, additional.parking);
        keep_choice(&mut self.flexible_date_time, additional.flexible_date_time);
        keep_choice(&mut self.access, additional.access);
        keep(&mut self.price_details, Value::Object(current.price_details.clone()));
        self
    }
}

/// Run `check` on the field read as text. Numbers and booleans are spelled out;
/// objects and arrays are a field error and yield `T::default()`.
fn as_text<T: Default>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
    check: impl FnOnce(&mut FieldErrors, Option<String>) -> T,
) -> T {
    let text = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => Some(raw),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => {
            errors.add(field, NOT_A_STRING);
            return T::default();
        }
    };
    check(errors, text)
}

fn text(errors: &mut FieldErrors, field: &str, value: Option<Value>, max: usize) -> String {
    as_text(errors, field, value, |errors, raw| {
        required_text(errors, field, raw, max)
    })
}

fn optional(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
    max: Option<usize>,
) -> String {
    as_text(errors, field, value, |errors, raw| {
        optional_text(errors, field, raw, max)
    })
}

fn choice<T: Choice>(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<T> {
    as_text(errors, field, value, |errors, raw| {
        required_choice(errors, field, raw)
    })
}

fn maybe_choice<T: Choice>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
) -> Option<T> {
    as_text(errors, field, value, |errors, raw| {
        optional_choice(errors, field, raw)
    })
}

fn email(errors: &mut FieldErrors, value: Option<String>) -> String {
    let email = required_text(errors, "email", value, EMAIL_MAX);
    if !email.is_empty() && !email.contains('@') {
        errors.add("email", INVALID_EMAIL);
    }
    email.to_lowercase()
}

fn phone(errors: &mut FieldErrors, value: Option<String>) -> String {
    let phone = required_text(errors, "phone", value, PHONE_MAX);
    if !phone.is_empty() && phone.chars().count() < PHONE_MIN {
        errors.add("phone", SHORT_PHONE);
    }
    phone
}

fn service_date(errors: &mut FieldErrors, value: Option<String>) -> Option<NaiveDate> {
    let Some(raw) = value else {
        errors.add("selected_date", REQUIRED);
        return None;
    };
    let parsed = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok();
    if parsed.is_none() {
        errors.add("selected_date", INVALID_DATE);
    }
    parsed
}

/// Integer room count within `0..=32767`; numeric strings are accepted.
fn room_count(errors: &mut FieldErrors, field: &str, value: Option<Value>, default: u16) -> u16 {
    let parsed = match value {
        None | Some(Value::Null) => return default,
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(raw)) => raw.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match parsed {
        None => {
            errors.add(field, INVALID_INTEGER);
            default
        }
        Some(count) if count < 0 => {
            errors.add(field, "Ensure this value is greater than or equal to 0.");
            default
        }
        Some(count) if count > ROOM_MAX => {
            errors.add(
                field,
                format!("Ensure this value is less than or equal to {ROOM_MAX}."),
            );
            default
        }
        Some(count) => u16::try_from(count).unwrap_or(default),
    }
}

fn flag(errors: &mut FieldErrors, field: &str, value: Option<Value>, default: bool) -> bool {
    let parsed = match value {
        None | Some(Value::Null) => return default,
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Some(Value::String(raw)) => parse_flag(&raw),
        Some(_) => None,
    };

    parsed.unwrap_or_else(|| {
        errors.add(field, INVALID_BOOLEAN);
        default
    })
}

/// Normalize a blob given either as a JSON object or as text holding one. Absent,
/// null and empty values become an empty object.
fn structured_blob(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
) -> StructuredBlob {
    let value = match value {
        Some(Value::String(raw)) if raw.trim().is_empty() => return StructuredBlob::new(),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => parsed,
            Err(_) => {
                errors.add(field, INVALID_JSON);
                return StructuredBlob::new();
            }
        },
        Some(value) => value,
        None => return StructuredBlob::new(),
    };

    match value {
        Value::Object(map) => map,
        Value::Null => StructuredBlob::new(),
        _ => {
            errors.add(field, NOT_AN_OBJECT);
            StructuredBlob::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::domain::CleanlinessLevel;
    use serde_json::json;

    fn submission() -> BookingSubmission {
        BookingSubmission {
            service_type: Some(json!("general")),
            selected_date: Some(json!("2025-07-14")),
            first_name: Some(json!("Jane")),
            last_name: Some(json!("Citizen")),
            email: Some(json!("Jane@Example.com")),
            phone: Some(json!("0400 111 222")),
            street: Some(json!("12 Wattle St")),
            suburb: Some(json!("Fitzroy")),
            postcode: Some(json!("3065")),
            ..BookingSubmission::default()
        }
    }

    #[test]
    fn applies_defaults_and_normalizes_email() {
        let details = submission().validate().expect("valid submission");
        assert_eq!(details.customer.email, "jane@example.com");
        assert_eq!(details.frequency, Frequency::Once);
        assert_eq!(details.rooms, RoomCounts::default());
        assert!(details.customer.sms_reminders);
        assert!(details.selected_add_ons.is_empty());
        assert!(details.price_details.is_empty());
        assert!(details.additional.has_pet.is_none());
    }

    #[test]
    fn short_phone_is_rejected() {
        let mut submission = submission();
        submission.phone = Some(json!("12345"));
        let errors = submission.validate().expect_err("phone too short");
        assert_eq!(errors.messages("phone"), [SHORT_PHONE.to_string()]);
    }

    #[test]
    fn email_needs_an_at_sign() {
        let mut submission = submission();
        submission.email = Some(json!("jane.example.com"));
        let errors = submission.validate().expect_err("bad email");
        assert_eq!(errors.messages("email"), [INVALID_EMAIL.to_string()]);
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let errors = BookingSubmission::default()
            .validate()
            .expect_err("empty submission");
        for field in [
            "service_type",
            "selected_date",
            "first_name",
            "last_name",
            "email",
            "phone",
            "street",
            "suburb",
            "postcode",
        ] {
            assert_eq!(errors.messages(field), [REQUIRED.to_string()], "{field}");
        }
        assert!(!errors.contains("unit_number"));
        assert!(!errors.contains("frequency"));
    }

    #[test]
    fn blobs_accept_encoded_text() {
        let mut submission = submission();
        submission.selected_add_ons = Some(json!("{\"carpet\": true}"));
        submission.add_on_details = Some(Value::Null);
        submission.price_details = Some(json!({ "total": 150 }));

        let details = submission.validate().expect("valid blobs");
        assert_eq!(Value::Object(details.selected_add_ons), json!({ "carpet": true }));
        assert!(details.add_on_details.is_empty());
        assert_eq!(details.price_details.get("total"), Some(&json!(150)));
    }

    #[test]
    fn malformed_blobs_are_rejected() {
        let mut submission = submission();
        submission.selected_add_ons = Some(json!("{carpet: yes"));
        submission.price_details = Some(json!("[1, 2]"));
        submission.add_on_details = Some(json!(["oven"]));

        let errors = submission.validate().expect_err("malformed blobs");
        assert_eq!(errors.messages("selected_add_ons"), [INVALID_JSON.to_string()]);
        assert_eq!(errors.messages("price_details"), [NOT_AN_OBJECT.to_string()]);
        assert_eq!(errors.messages("add_on_details"), [NOT_AN_OBJECT.to_string()]);
    }

    #[test]
    fn room_counts_accept_numeric_text_and_enforce_range() {
        let mut submission = submission();
        submission.bedrooms = Some(json!("3"));
        submission.laundry = Some(json!(2));
        let details = submission.clone().validate().expect("valid counts");
        assert_eq!(details.rooms.bedrooms, 3);
        assert_eq!(details.rooms.laundry, 2);

        submission.bathrooms = Some(json!(-1));
        submission.storey = Some(json!(40_000));
        submission.kitchen = Some(json!("two"));
        let errors = submission.validate().expect_err("bad counts");
        assert!(errors.contains("bathrooms"));
        assert!(errors.contains("storey"));
        assert_eq!(errors.messages("kitchen"), [INVALID_INTEGER.to_string()]);
    }

    #[test]
    fn dates_and_choices_are_checked() {
        let mut submission = submission();
        submission.selected_date = Some(json!("14/07/2025"));
        submission.service_type = Some(json!("window"));
        submission.parking = Some(json!("roof"));
        submission.access = Some(json!(""));

        let errors = submission.validate().expect_err("bad date and choices");
        assert_eq!(errors.messages("selected_date"), [INVALID_DATE.to_string()]);
        assert_eq!(
            errors.messages("service_type"),
            ["\"window\" is not a valid choice.".to_string()]
        );
        assert!(errors.contains("parking"));
        assert!(!errors.contains("access"));
    }

    #[test]
    fn sms_flag_accepts_text() {
        let mut submission = submission();
        submission.sms_reminders = Some(json!("false"));
        assert!(!submission.clone().validate().unwrap().customer.sms_reminders);

        submission.sms_reminders = Some(json!("maybe"));
        let errors = submission.validate().expect_err("bad flag");
        assert_eq!(errors.messages("sms_reminders"), [INVALID_BOOLEAN.to_string()]);
    }

    #[test]
    fn numbers_and_flags_are_read_as_text() {
        let mut submission = submission();
        submission.postcode = Some(json!(3065));
        submission.cleanliness_level = Some(json!(3));
        submission.unit_number = Some(json!(12));

        let details = submission.validate().expect("numeric text fields");
        assert_eq!(details.address.postcode, "3065");
        assert_eq!(details.address.unit_number, "12");
        assert_eq!(
            details.additional.cleanliness_level,
            Some(CleanlinessLevel::NeedsCleaning)
        );
    }

    #[test]
    fn objects_and_arrays_are_field_errors() {
        let mut submission = submission();
        submission.first_name = Some(json!({ "given": "Jane" }));
        submission.parking = Some(json!(["street"]));
        submission.frequency = Some(json!(true));

        let errors = submission.validate().expect_err("structured text fields");
        assert_eq!(errors.messages("first_name"), [NOT_A_STRING.to_string()]);
        assert_eq!(errors.messages("parking"), [NOT_A_STRING.to_string()]);
        assert_eq!(
            errors.messages("frequency"),
            ["\"true\" is not a valid choice.".to_string()]
        );
    }

    #[test]
    fn patch_keeps_stored_values_for_omitted_fields() {
        let mut stored = submission();
        stored.parking = Some(json!("driveway"));
        stored.bedrooms = Some(json!(4));
        stored.price_details = Some(json!({ "total": 210 }));
        let current = stored.validate().expect("stored booking");

        let patch = BookingSubmission {
            phone: Some(json!("0400 999 888")),
            special_notes: Some(Value::Null),
            ..BookingSubmission::default()
        };
        let details = patch.validate_patch(&current).expect("valid patch");
        assert_eq!(details.customer.phone, "0400 999 888");
        assert_eq!(details.customer.email, "jane@example.com");
        assert_eq!(details.rooms.bedrooms, 4);
        assert_eq!(details.additional.parking, current.additional.parking);
        assert_eq!(details.price_details, current.price_details);
        assert_eq!(details.selected_date, current.selected_date);

        let rejected = BookingSubmission {
            phone: Some(json!("123")),
            ..BookingSubmission::default()
        };
        let errors = rejected.validate_patch(&current).expect_err("short phone");
        assert_eq!(errors.messages("phone"), [SHORT_PHONE.to_string()]);
        assert_eq!(errors.as_map().len(), 1);
    }
}
