mod json;
mod session_user;

pub use json::Json;
pub use session_user::SessionUser;
