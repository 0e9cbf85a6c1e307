pub mod guard;
pub mod layout;
pub mod notifications;
pub mod session_warning;
