pub mod launcher;
pub mod session;

pub use launcher::{launch_session, ChromeLauncher, LaunchSettings};
pub use session::ChromeSession;
