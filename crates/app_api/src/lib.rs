mod context;
mod handlers;
mod requests;
mod responses;
mod validation;

pub use context::AppContext;
pub use handlers::*;
pub use requests::*;
pub use responses::*;
pub use validation::{HOOK_EVENT_TYPES, validate_event};
