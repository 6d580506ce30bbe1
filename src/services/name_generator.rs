use rand::{seq::IndexedRandom, Rng};

const COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "teal", "blue", "indigo", "violet", "magenta", "cyan",
    "lime", "olive", "maroon", "silver", "gold", "lavender", "salmon", "turquoise", "plum", "tan",
];

const PRODUCT_ADJECTIVES: &[&str] = &[
    "small", "ergonomic", "rustic", "intelligent", "gorgeous", "incredible", "fantastic",
    "practical", "sleek", "awesome", "generic", "handcrafted", "handmade", "licensed", "refined",
    "unbranded", "tasty", "recycled", "luxurious", "elegant",
];

const FOOD_ADJECTIVES: &[&str] = &[
    "crispy", "crunchy", "juicy", "savory", "spicy", "sweet", "tangy", "zesty", "smoky", "buttery",
    "golden", "hearty", "fluffy", "creamy", "fresh", "mild", "rich", "bitter", "sour", "salty",
];

const ANIMAL_TYPES: &[&str] = &[
    "squirrel", "dog", "cat", "snake", "bear", "lion", "cetacean", "insect", "crocodilia", "cow",
    "bird", "fish", "rabbit", "horse", "otter", "fox", "badger", "owl", "hedgehog", "raccoon",
];

const PRODUCTS: &[&str] = &[
    "chair", "car", "computer", "keyboard", "mouse", "bike", "ball", "gloves", "pants", "shirt",
    "table", "shoes", "hat", "towels", "soap", "tuna", "chicken", "fish", "cheese", "bacon",
];

const FRUITS: &[&str] = &[
    "apple", "apricot", "banana", "blackberry", "blueberry", "cherry", "coconut", "fig", "grape",
    "kiwi", "lemon", "lime", "mango", "melon", "nectarine", "orange", "papaya", "peach", "pear",
    "passion fruit",
];

/// Builds display names like `GoldenOtter` from a fixed vocabulary: one
/// prefix category (color, product adjective, food adjective) and one suffix
/// category (animal, product, fruit) are picked, then one word from each.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    prefixes: [&'static [&'static str]; 3],
    suffixes: [&'static [&'static str]; 3],
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self {
            prefixes: [COLORS, PRODUCT_ADJECTIVES, FOOD_ADJECTIVES],
            suffixes: [ANIMAL_TYPES, PRODUCTS, FRUITS],
        }
    }
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let prefix = pick(&self.prefixes, rng);
        let suffix = pick(&self.suffixes, rng);
        format!("{}{}", capitalize(prefix), capitalize(suffix)).replace(' ', "")
    }

    pub fn random_name(&self) -> String {
        self.generate(&mut rand::rng())
    }
}

fn pick<R: Rng + ?Sized>(categories: &[&'static [&'static str]], rng: &mut R) -> &'static str {
    categories
        .choose(rng)
        .copied()
        .and_then(|words| words.choose(rng))
        .copied()
        .unwrap_or("player")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
