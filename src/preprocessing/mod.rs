//! Audio preprocessing
//!
//! - Channel mixing (multichannel to mono)

pub mod channel_mixer;
