//! AI provider adapters.

mod mock_provider;
mod yandex_provider;

pub use mock_provider::{MockProvider, RecordedCall};
pub use yandex_provider::{YandexConfig, YandexProvider};
