//! Bridge between the Discord chat side and the Lumia automation side.
//!
//! ## Module Structure
//!
//! - `ack`: Acknowledgment debouncing
//! - `channels`: Event and log channel structures
//! - `links`: Traits the bridge uses to talk to each connection
//! - `orchestrator`: Main bridge orchestrator (`Bridge` struct)
//! - `state`: Bridge lifecycle phase

pub mod ack;
pub mod channels;
pub mod links;
pub mod orchestrator;
pub mod state;

pub use channels::{ChannelBundle, DriverChannels};
pub use orchestrator::Bridge;
