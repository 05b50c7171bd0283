mod profile;
mod session;

pub use profile::UserProfile;
pub use session::{derive_title, now, ChatSession, Message, Role, TITLE_MAX_CHARS};
