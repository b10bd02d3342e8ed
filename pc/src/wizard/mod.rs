//! Interactive wizard loop

mod session;

pub use session::WizardSession;
