pub mod relay;
pub mod subscriber;

pub use relay::{EventBus, RecipientSubscription, RelayEvent, RelayEventType};
