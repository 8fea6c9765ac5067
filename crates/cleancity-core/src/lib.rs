pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use bus::{EmitReport, EventBus, HandlerError, Subscription};
pub use config::CleanCityConfig;
pub use error::{CleanCityError, Result};
pub use events::{BusEvent, DomainEvent, EventType, PostEvent, PostEventType};
pub use types::*;
