use phf::phf_map;
use serde::{Deserialize, Serialize};

/// International morse code for every supported character, keyed by the
/// uppercase form.
static MORSE_CODE: phf::Map<char, &'static str> = phf_map! {
    // Letters A-Z
    'A' => ".-",
    'B' => "-...",
    'C' => "-.-.",
    'D' => "-..",
    'E' => ".",
    'F' => "..-.",
    'G' => "--.",
    'H' => "....",
    'I' => "..",
    'J' => ".---",
    'K' => "-.-",
    'L' => ".-..",
    'M' => "--",
    'N' => "-.",
    'O' => "---",
    'P' => ".--.",
    'Q' => "--.-",
    'R' => ".-.",
    'S' => "...",
    'T' => "-",
    'U' => "..-",
    'V' => "...-",
    'W' => ".--",
    'X' => "-..-",
    'Y' => "-.--",
    'Z' => "--..",

    // Numbers 0-9
    '0' => "-----",
    '1' => ".----",
    '2' => "..---",
    '3' => "...--",
    '4' => "....-",
    '5' => ".....",
    '6' => "-....",
    '7' => "--...",
    '8' => "---..",
    '9' => "----.",

    // Punctuation
    '.' => ".-.-.-",
    ',' => "--..--",
    '?' => "..--..",
    '/' => "-..-.",
    '-' => "-....-",
    '=' => "-...-",
    '+' => ".-.-.",
    '@' => ".--.-.",
    '(' => "-.--.",
    ')' => "-.--.-",
    ':' => "---...",
    ';' => "-.-.-.",
    '"' => ".-..-.",
    '\'' => ".----.",

    // Accented characters
    'À' => ".--.-",
    'Ä' => ".-.-",
    'Å' => ".--.-",
    'Ą' => ".-.-",
    'Ć' => "-.-..",
    'Ĉ' => "-.-..",
    'Ç' => "-.-..",
    'É' => "..-..",
    'È' => ".-..-",
    'Ę' => "..-..",
    'Ð' => "..--.",
    'Ĝ' => "--.-.",
    'Ĥ' => "----",
    'Ĵ' => ".---.",
    'Ł' => ".-..-",
    'Ń' => "--.--",
    'Ñ' => "--.--",
    'Ó' => "---.",
    'Ö' => "---.",
    'Ø' => "---.",
    'Ś' => "...-...",
    'Ŝ' => "...-.",
    'Š' => "----",
    'Þ' => ".--..",
    'Ü' => "..--",
    'Ŭ' => "..--",
    'Ź' => "--..-.",
    'Ż' => "--..-",
};

/// Groups of practice characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Letters,
    Numbers,
    Punctuation,
    Accented,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Letters,
        Category::Numbers,
        Category::Punctuation,
        Category::Accented,
    ];

    /// Characters belonging to this category, in table order
    pub fn characters(self) -> &'static str {
        match self {
            Category::Letters => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            Category::Numbers => "0123456789",
            Category::Punctuation => ".,?/-=+@():;\"'",
            Category::Accented => "ÀÄÅĄĆĈÇÉÈĘÐĜĤĴŁŃÑÓÖØŚŜŠÞÜŬŹŻ",
        }
    }
}

/// Look up the dot/dash string for a character, ignoring case.
///
/// Returns `None` for characters without a mapping, including ones whose
/// uppercase form is more than one character (e.g. 'ß').
pub fn lookup(character: char) -> Option<&'static str> {
    let mut upper = character.to_uppercase();
    let key = upper.next()?;
    if upper.next().is_some() {
        return None;
    }
    MORSE_CODE.get(&key).copied()
}

/// Every mapped character with its symbol string
pub fn entries() -> impl Iterator<Item = (char, &'static str)> {
    MORSE_CODE.entries().map(|(c, code)| (*c, *code))
}

/// Written morse for a string: symbols separated by spaces, words by " / ".
/// Unmapped characters are left out.
pub fn encode(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.chars().filter_map(lookup).collect::<Vec<_>>().join(" "))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}
