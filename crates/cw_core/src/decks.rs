//! Deck variants available to a game
//!
//! The catalog order is stable: built-in decks first, then `[[decks]]` from
//! the config file. The first entry is the fallback when a selection resolves
//! to nothing.

use crate::deck::Deck;
use cw_config::Config;
use rand::rngs::StdRng;
use rand::Rng;

pub const DEFAULT_DECK: &str = "Classic";

const CLASSIC: &[&str] = &[
    "Africa", "Agent", "Air", "Alien", "Amazon", "Angel", "Antarctica", "Apple", "Arm", "Back",
    "Band", "Bank", "Bark", "Beach", "Belt", "Berlin", "Berry", "Board", "Bond", "Boom", "Bow",
    "Box", "Bug", "Canada", "Capital", "Cell", "Center", "China", "Chocolate", "Circle", "Club",
    "Compound", "Copper", "Crash", "Cricket", "Cross", "Death", "Dice", "Dinosaur", "Doctor",
    "Dog", "Dress", "Dwarf", "Eagle", "Egypt", "Engine", "England", "Europe", "Eye", "Fair",
    "Fall", "Fan", "Field", "File", "Film", "Fish", "Flute", "Fly", "Forest", "Fork", "France",
    "Gas", "Ghost", "Giant", "Glass", "Glove", "Gold", "Grass", "Greece", "Green", "Ham",
    "Head", "Himalaya", "Hole", "Hood", "Hook", "Human", "Horseshoe", "Hospital", "Hotel",
    "Ice", "Ice Cream", "India", "Iron", "Ivory", "Jam", "Jet", "Jupiter", "Kangaroo",
    "Ketchup", "Kid", "King", "Kiwi", "Knife", "Knight", "Lab", "Lap", "Laser", "Lawyer",
    "Lead", "Lemon", "Limousine", "Lock", "Log", "Mammoth", "Maple", "March", "Mass",
    "Mercury", "Millionaire", "Model", "Mole", "Moscow", "Mouth", "Mug", "Needle", "Net",
    "New York", "Night", "Note", "Novel", "Nurse", "Nut", "Oil", "Olive", "Olympus", "Opera",
    "Orange", "Paper", "Park", "Part", "Paste", "Phoenix", "Piano", "Telescope", "Teacher",
    "Thumb", "Tick", "Tie", "Time", "Tokyo", "Tooth", "Torch", "Tower", "Track", "Train",
    "Triangle", "Trip", "Trunk", "Tube", "Turkey", "Undertaker", "Unicorn", "Vacuum", "Van",
    "Wake", "Wall", "War", "Washer", "Washington", "Water", "Wave", "Web", "Well", "Whale",
    "Whip", "Wind", "Witch", "Worm", "Yard",
];

const DUET: &[&str] = &[
    "Alaska", "Anchor", "Avalanche", "Bagel", "Bamboo", "Banana", "Barbecue", "Beard", "Bee",
    "Biscuit", "Blacksmith", "Blender", "Blizzard", "Bubble", "Cactus", "Campfire", "Canoe",
    "Castle", "Cloud", "Coconut", "Comet", "Cookie", "Cowboy", "Crayon", "Crystal", "Desert",
    "Dragon", "Drum", "Earthquake", "Elbow", "Feather", "Fireworks", "Gondola", "Guitar",
    "Hammock", "Harbor", "Igloo", "Island", "Jungle", "Kite", "Lantern", "Lighthouse",
    "Mermaid", "Meteor", "Mustache", "Origami", "Pancake", "Parachute", "Penguin", "Pirate",
    "Pyramid", "Rainbow", "Robot", "Saddle", "Sandcastle", "Scarecrow", "Snowman", "Submarine",
    "Tornado", "Volcano",
];

/// One deck variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSpec {
    pub name: String,
    pub words: Vec<String>,
}

impl DeckSpec {
    fn from_static(name: &str, words: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Ordered set of deck variants
#[derive(Debug, Clone)]
pub struct DeckCatalog {
    decks: Vec<DeckSpec>,
}

impl DeckCatalog {
    /// Only the decks shipped with Codeword
    pub fn builtin() -> Self {
        Self {
            decks: vec![
                DeckSpec::from_static(DEFAULT_DECK, CLASSIC),
                DeckSpec::from_static("Duet", DUET),
            ],
        }
    }

    /// Built-in decks followed by the config's custom decks
    pub fn from_config(config: &Config) -> Self {
        let mut catalog = Self::builtin();
        for custom in &config.decks {
            if catalog.get(&custom.name).is_some() {
                tracing::warn!("Ignoring custom deck '{}': name already taken", custom.name);
                continue;
            }
            catalog.decks.push(DeckSpec {
                name: custom.name.clone(),
                words: custom.words.clone(),
            });
        }
        catalog
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decks.iter().map(|d| d.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&DeckSpec> {
        self.decks.iter().find(|d| d.name == name)
    }

    pub fn specs(&self) -> &[DeckSpec] {
        &self.decks
    }

    /// A freshly shuffled copy of the fallback deck
    pub fn default_deck(&self, rng: &mut StdRng) -> Deck<String> {
        let spec = &self.decks[0];
        Deck::with_seed(spec.name.clone(), spec.words.clone(), rng.gen())
    }

    /// Merge every selected deck into one draw pile.
    ///
    /// Decks are merged in catalog order regardless of selection order. Falls
    /// back to the default deck when nothing selected is known.
    pub fn build_composite(&self, selection: &[String], rng: &mut StdRng) -> Deck<String> {
        let mut deck = Deck::with_seed(selection.join(", "), Vec::new(), rng.gen());

        for spec in self.decks.iter().filter(|d| selection.contains(&d.name)) {
            let variant = Deck::with_seed(spec.name.clone(), spec.words.clone(), rng.gen());
            deck.add_deck(&variant);
        }

        if deck.is_empty() {
            tracing::debug!("Deck selection {:?} is empty, using {}", selection, DEFAULT_DECK);
            deck.add_deck(&self.default_deck(rng));
        }

        deck
    }
}

impl Default for DeckCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_config::CustomDeck;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_decks_fill_a_board() {
        let catalog = DeckCatalog::builtin();
        for spec in catalog.specs() {
            assert!(spec.words.len() >= 25, "{} is too small", spec.name);
        }
        assert_eq!(catalog.names().next(), Some(DEFAULT_DECK));
    }

    #[test]
    fn test_composite_merges_selected_decks() {
        let catalog = DeckCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let selection = vec!["Duet".to_string(), DEFAULT_DECK.to_string()];

        let deck = catalog.build_composite(&selection, &mut rng);
        assert_eq!(deck.size(), CLASSIC.len() + DUET.len());
        assert_eq!(deck.name(), "Duet, Classic");
    }

    #[test]
    fn test_unknown_selection_falls_back() {
        let catalog = DeckCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);

        let deck = catalog.build_composite(&["Nope".to_string()], &mut rng);
        assert_eq!(deck.size(), CLASSIC.len());
    }

    #[test]
    fn test_custom_decks_from_config() {
        let mut config = Config::default();
        config.decks.push(CustomDeck {
            name: "Spices".to_string(),
            words: vec!["Cumin".to_string(), "Sumac".to_string()],
        });
        config.decks.push(CustomDeck {
            name: DEFAULT_DECK.to_string(),
            words: vec!["Shadowed".to_string()],
        });

        let catalog = DeckCatalog::from_config(&config);
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec![DEFAULT_DECK, "Duet", "Spices"]);
        assert_eq!(catalog.get(DEFAULT_DECK).unwrap().words.len(), CLASSIC.len());
    }
}
