//! Briefing capture: the recording state machine and the resources it drives.

pub mod clock;
pub mod host;
pub mod session;
pub mod state;
