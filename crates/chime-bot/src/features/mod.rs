//! Features shipped with the bot.

mod general;

pub use general::General;
