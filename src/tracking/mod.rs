mod notifier;
mod session;

pub use notifier::{Notifier, Subscription};
pub use session::TrackingSession;
