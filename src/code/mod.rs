// Morse code table module
// Character lookup and practice character selection

pub mod random;
pub mod table;

pub use random::{random_character, random_character_with, CategorySelection};
pub use table::{encode, lookup, Category};
