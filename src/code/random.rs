// Random practice character selection
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::table::Category;

/// Which character categories are enabled for practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySelection {
    pub letters: bool,
    pub numbers: bool,
    pub punctuation: bool,
    pub accented: bool,
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self {
            letters: true,
            numbers: false,
            punctuation: false,
            accented: false,
        }
    }
}

impl CategorySelection {
    /// A selection with every category turned off
    pub fn none() -> Self {
        Self {
            letters: false,
            numbers: false,
            punctuation: false,
            accented: false,
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Letters => self.letters,
            Category::Numbers => self.numbers,
            Category::Punctuation => self.punctuation,
            Category::Accented => self.accented,
        }
    }

    /// Concatenated characters of every enabled category.
    /// Falls back to letters when nothing is enabled.
    pub fn pool(&self) -> Vec<char> {
        let pool: Vec<char> = Category::ALL
            .iter()
            .filter(|category| self.is_enabled(**category))
            .flat_map(|category| category.characters().chars())
            .collect();

        if pool.is_empty() {
            Category::Letters.characters().chars().collect()
        } else {
            pool
        }
    }
}

/// Pick a random character from the enabled categories.
///
/// Selection is uniform over the concatenated pool, so larger categories
/// come up proportionally more often.
pub fn random_character(selection: &CategorySelection) -> char {
    random_character_with(&mut rand::thread_rng(), selection)
}

pub fn random_character_with<R: Rng + ?Sized>(rng: &mut R, selection: &CategorySelection) -> char {
    let pool = selection.pool();
    pool[rng.gen_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_selection_falls_back_to_letters() {
        let mut rng = StdRng::seed_from_u64(7);
        let letters = Category::Letters.characters();
        for _ in 0..2_000 {
            let c = random_character_with(&mut rng, &CategorySelection::none());
            assert!(letters.contains(c), "{c:?} is not a letter");
        }
    }

    #[test]
    fn only_enabled_categories_are_picked() {
        let selection = CategorySelection {
            letters: false,
            numbers: true,
            punctuation: false,
            accented: true,
        };
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            let c = random_character_with(&mut rng, &selection);
            assert!(
                Category::Numbers.characters().contains(c)
                    || Category::Accented.characters().contains(c),
                "unexpected {c:?}"
            );
        }
    }

    #[test]
    fn categories_weighted_by_size() {
        let selection = CategorySelection {
            letters: true,
            numbers: true,
            punctuation: false,
            accented: false,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 36_000;
        let numbers = (0..trials)
            .filter(|_| random_character_with(&mut rng, &selection).is_ascii_digit())
            .count();

        // 10 of the 36 pooled characters are digits
        let share = numbers as f64 / trials as f64;
        assert!((share - 10.0 / 36.0).abs() < 0.02, "digit share {share}");
    }

    #[test]
    fn pool_concatenates_in_category_order() {
        let selection = CategorySelection {
            letters: false,
            numbers: true,
            punctuation: true,
            accented: false,
        };
        let pool: String = selection.pool().into_iter().collect();
        assert_eq!(pool, "0123456789.,?/-=+@():;\"'");
    }
}
