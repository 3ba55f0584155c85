//! Random player names: an honorific plus a word from the default deck

use crate::deck::Deck;
use crate::decks::DeckCatalog;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Honorific {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl Honorific {
    pub fn apply(self, word: &str) -> String {
        match self {
            Honorific::Prefix(prefix) => format!("{}{}", prefix, word),
            Honorific::Suffix(suffix) => format!("{}{}", word, suffix),
        }
    }
}

const HONORIFICS: &[Honorific] = &[
    Honorific::Prefix("Mr. "),
    Honorific::Prefix("Ms. "),
    Honorific::Prefix("Miss "),
    Honorific::Prefix("Mrs. "),
    Honorific::Prefix("Mx. "),
    Honorific::Prefix("Master "),
    Honorific::Prefix("Sir "),
    Honorific::Prefix("Dame "),
    Honorific::Prefix("Lord "),
    Honorific::Prefix("Lady "),
    Honorific::Prefix("Dr. "),
    Honorific::Prefix("Prof. "),
    Honorific::Prefix("Madam "),
    Honorific::Prefix("Slayer "),
    Honorific::Prefix("The Honorable "),
    Honorific::Prefix("The Right Honorable "),
    Honorific::Suffix(", Esq."),
    Honorific::Suffix(" the Bold"),
    Honorific::Suffix(" the Unready"),
    Honorific::Suffix(", First of Their Name"),
    Honorific::Suffix(", their Excellency"),
];

/// Build a name like "Dr. Kangaroo" or "Lantern the Bold"
pub fn random_player_name(catalog: &DeckCatalog, rng: &mut StdRng) -> String {
    let mut honorifics = Deck::with_seed("Honorifics", HONORIFICS.to_vec(), rng.gen());
    let mut words = catalog.default_deck(rng);

    match (honorifics.draw_one(), words.draw_one()) {
        (Ok(honorific), Ok(word)) => honorific.apply(&word),
        _ => "Agent".to_string(),
    }
}

/// Short random identifier for a player or an ephemeral peer
pub fn random_id(rng: &mut impl Rng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_names_use_a_deck_word() {
        let catalog = DeckCatalog::builtin();
        let words = &catalog.specs()[0].words;
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..20 {
            let name = random_player_name(&catalog, &mut rng);
            assert!(words.iter().any(|w| name.contains(w.as_str())), "{}", name);
        }
    }

    #[test]
    fn test_honorific_placement() {
        assert_eq!(Honorific::Prefix("Sir ").apply("Knight"), "Sir Knight");
        assert_eq!(Honorific::Suffix(", Esq.").apply("Lawyer"), "Lawyer, Esq.");
    }

    #[test]
    fn test_random_id_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let id = random_id(&mut rng, 10);
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
