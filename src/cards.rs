//! Gift-card records and the static repository that owns them.
//!
//! Cards are loaded once from an embedded document at startup and never
//! mutated afterwards; there is no mark-as-used operation in this core.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Months within which an unused card counts as "expiring soon" for the
/// reminder banner.
pub const EXPIRY_REMINDER_MONTHS: u32 = 1;

const SEED_CARDS_JSON: &str = r#"[
  {
    "id": "1",
    "store": "Amazon",
    "value": 25.0,
    "currency": "€",
    "expiration_date": "2025-01-01",
    "status": "unused",
    "location_tag": "https://www.amazon.de/",
    "tradable": true
  },
  {
    "id": "2",
    "store": "Zalando",
    "value": 15.0,
    "currency": "€",
    "expiration_date": "2024-12-12",
    "status": "used",
    "location_tag": "https://www.zalando.de/",
    "tradable": false
  },
  {
    "id": "3",
    "store": "Target",
    "value": 10.0,
    "currency": "€",
    "expiration_date": "2025-05-20",
    "status": "unused",
    "location_tag": "https://www.target.com/ or nearest store: GPS(40.7128° N, 74.0060° W)",
    "tradable": true
  }
]"#;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Unused,
    Used,
}

impl CardStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Used => "used",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Unused => "Unused",
            Self::Used => "Used",
        }
    }

    #[must_use]
    pub const fn is_unused(self) -> bool {
        matches!(self, Self::Unused)
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Listing filter. `All` is the identity; the other two match on status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterTab {
    #[default]
    All,
    Unused,
    Used,
}

impl FilterTab {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unused => "unused",
            Self::Used => "used",
        }
    }

    #[must_use]
    pub const fn matches(self, status: CardStatus) -> bool {
        match self {
            Self::All => true,
            Self::Unused => matches!(status, CardStatus::Unused),
            Self::Used => matches!(status, CardStatus::Used),
        }
    }
}

/// A stored-value card tied to a single store brand. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftCard {
    pub id: CardId,
    pub store: String,
    pub value: f64,
    pub currency: String,
    pub expiration_date: NaiveDate,
    pub status: CardStatus,
    pub location_tag: String,
    pub tradable: bool,
}

impl GiftCard {
    #[must_use]
    pub fn months_until_expiration(&self, reference: NaiveDate) -> u32 {
        months_until_expiration(self.expiration_date, reference)
    }
}

/// Whole-month difference at `(year, month)` granularity, clamped at zero.
///
/// This is calendar-month subtraction, not day-precise elapsed time: a card
/// expiring next month reports 1 regardless of the day-of-month on either side.
#[must_use]
pub fn months_until_expiration(expiration: NaiveDate, reference: NaiveDate) -> u32 {
    let diff = (i64::from(expiration.year()) - i64::from(reference.year())) * 12
        + (i64::from(expiration.month()) - i64::from(reference.month()));
    u32::try_from(diff.max(0)).unwrap_or(0)
}

/// Order-preserving filter over a card slice. `All` returns every card.
#[must_use]
pub fn filter_cards(cards: &[GiftCard], tab: FilterTab) -> Vec<&GiftCard> {
    cards.iter().filter(|c| tab.matches(c.status)).collect()
}

/// Owns the static card collection, insertion order preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRepository {
    cards: Vec<GiftCard>,
}

impl CardRepository {
    #[must_use]
    pub fn from_cards(cards: Vec<GiftCard>) -> Self {
        Self { cards }
    }

    /// Parses the embedded seed document. Failure surfaces as an error at
    /// `AppStarted` rather than a panic.
    pub fn load_seed() -> Result<Self, serde_json::Error> {
        let cards: Vec<GiftCard> = serde_json::from_str(SEED_CARDS_JSON)?;
        Ok(Self { cards })
    }

    #[must_use]
    pub fn cards(&self) -> &[GiftCard] {
        &self.cards
    }

    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&GiftCard> {
        self.cards.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn filtered(&self, tab: FilterTab) -> Vec<&GiftCard> {
        filter_cards(&self.cards, tab)
    }

    /// Unused cards expiring within `window_months` of `today`, for the
    /// reminder banner.
    #[must_use]
    pub fn expiring_soon(&self, window_months: u32, today: NaiveDate) -> usize {
        self.cards
            .iter()
            .filter(|c| c.status.is_unused())
            .filter(|c| c.months_until_expiration(today) <= window_months)
            .count()
    }
}
