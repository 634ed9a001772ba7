//! ECMAScript `Date` construction: time values, the component and string
//! constructors, `Date.parse`, `Date.UTC` and `Date.now`.

pub mod builtins;
pub mod coercion;
pub mod config;
pub mod error;
pub mod repl;
pub mod time_value;
pub mod types;
pub mod zone;

pub use builtins::date::{ConstructionRequest, DateBuiltin, DateFields, DateObject};
pub use coercion::{Coercion, PreferredType, StandardCoercion};
pub use config::{DateConfig, UtcMode};
pub use error::{DateError, DateResult};
pub use time_value::{Clock, FixedClock, SystemClock, time_clip};
pub use types::JsValue;
pub use zone::HostZone;
