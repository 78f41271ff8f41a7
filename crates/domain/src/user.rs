use derive_more::Deref;
use uuid::Uuid;

use crate::{Name, Weight};

/// The signed-in user a session is recorded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub name: Name,
    pub weight_unit: WeightUnit,
}

impl User {
    #[must_use]
    pub fn format_weight(&self, weight: Weight) -> String {
        format!("{weight} {}", self.weight_unit)
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(Uuid);

impl UserID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for UserID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Display preference only, weights are stored as entered.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum WeightUnit {
    #[default]
    #[strum(serialize = "kg")]
    Kilogram,
    #[strum(serialize = "lbs")]
    Pound,
}
