use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::Choice;

/// Free-form JSON object captured from the booking calculator.
pub type StructuredBlob = Map<String, Value>;

/// Auto-assigned booking identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }
    };
}

choice_enum! {
    ServiceType {
        General => ("general", "General Cleaning"),
        Deep => ("deep", "Deep Cleaning"),
        EndOfLease => ("endOfLease", "End of Lease"),
        MoveIn => ("moveIn", "Move-in Cleaning"),
    }
}

choice_enum! {
    /// How often the clean repeats.
    Frequency {
        Once => ("once", "Just Once"),
        Weekly => ("weekly", "Weekly"),
        Fortnightly => ("fortnightly", "Fortnightly"),
        Monthly => ("monthly", "Monthly"),
    }
}

choice_enum! {
    /// Answer to the pet and flexible-timing questions.
    YesNo {
        Yes => ("yes", "Yes"),
        No => ("no", "No"),
    }
}

choice_enum! {
    /// Marketing channel the customer came through.
    HearAboutUs {
        Google => ("google", "Google Search"),
        Facebook => ("facebook", "Facebook"),
        Instagram => ("instagram", "Instagram"),
        Friend => ("friend", "Friend/Family Referral"),
        Flyer => ("flyer", "Flyer"),
        Other => ("other", "Other"),
    }
}

choice_enum! {
    CleanlinessLevel {
        VeryClean => ("1", "1 - Very Clean"),
        ModeratelyClean => ("2", "2 - Moderately Clean"),
        NeedsCleaning => ("3", "3 - Needs Cleaning"),
        HeavilySoiled => ("4", "4 - Heavily Soiled"),
    }
}

choice_enum! {
    Parking {
        Driveway => ("driveway", "Driveway"),
        Street => ("street", "Street Parking"),
        Garage => ("garage", "Garage"),
        Visitor => ("visitor", "Visitor Parking"),
        Other => ("other", "Other"),
    }
}

choice_enum! {
    /// How the cleaners get into the property.
    AccessMethod {
        Home => ("home", "I will be home"),
        Key => ("key", "Leave a key"),
        Lockbox => ("lockbox", "Lockbox"),
        DoorCode => ("doorcode", "Door code"),
        Other => ("other", "Other"),
    }
}

choice_enum! {
    /// Lead lifecycle. Only explicit status requests move it.
    BookingStatus {
        Pending => ("pending", "Pending"),
        Confirmed => ("confirmed", "Confirmed"),
        Completed => ("completed", "Completed"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomCounts {
    pub bedrooms: u16,
    pub bathrooms: u16,
    pub kitchen: u16,
    pub living_dining: u16,
    pub laundry: u16,
    pub storey: u16,
}

impl Default for RoomCounts {
    fn default() -> Self {
        Self {
            bedrooms: 1,
            bathrooms: 1,
            kitchen: 1,
            living_dining: 1,
            laundry: 0,
            storey: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    /// Stored lowercased.
    pub email: String,
    pub phone: String,
    pub sms_reminders: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    /// Blank when the property has no unit.
    pub unit_number: String,
    pub street: String,
    pub suburb: String,
    pub postcode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdditionalInfo {
    pub has_pet: Option<YesNo>,
    pub hear_about_us: Option<HearAboutUs>,
    pub special_notes: String,
    pub cleanliness_level: Option<CleanlinessLevel>,
    pub parking: Option<Parking>,
    pub flexible_date_time: Option<YesNo>,
    pub access: Option<AccessMethod>,
}

/// Everything a client may write on a booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetails {
    pub service_type: ServiceType,
    pub frequency: Frequency,
    pub rooms: RoomCounts,
    pub selected_add_ons: StructuredBlob,
    pub add_on_details: StructuredBlob,
    pub selected_date: NaiveDate,
    pub customer: Customer,
    pub address: Address,
    pub additional: AdditionalInfo,
    pub price_details: StructuredBlob,
}

/// A stored lead.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub details: BookingDetails,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn full_name(&self) -> String {
        let customer = &self.details.customer;
        format!("{} {}", customer.first_name, customer.last_name)
    }

    /// Unit (when present), street, suburb and postcode joined with ", ".
    pub fn full_address(&self) -> String {
        let address = &self.details.address;
        let mut parts = Vec::with_capacity(4);
        if !address.unit_number.is_empty() {
            parts.push(address.unit_number.as_str());
        }
        parts.extend([
            address.street.as_str(),
            address.suburb.as_str(),
            address.postcode.as_str(),
        ]);
        parts.join(", ")
    }

    /// The `total` member of the pricing blob, or `0` when there is none.
    pub fn total_price(&self) -> Value {
        self.details
            .price_details
            .get("total")
            .cloned()
            .unwrap_or_else(|| Value::from(0))
    }
}
