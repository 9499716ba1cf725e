mod google;
mod session;

pub use google::{google_callback, google_redirect};
pub use session::{current_user, logout};
