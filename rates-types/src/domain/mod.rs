//! Domain models for the exchange rates service.

pub mod currency;
pub mod date;
pub mod page;
pub mod rate;

pub use currency::{Currency, CurrencyCode, CurrencyId};
pub use date::EffectiveDate;
pub use page::{PageRequest, Pagination};
pub use rate::{CurrencyRate, Rate, RateValue};
