use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

/// Word-bank categories. `Mix` is a sentinel that resolves to a uniformly
/// random concrete category at pick time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FoodNature,
    EverydayObjects,
    Technology,
    ToolsWork,
    Transport,
    Lifestyle,
    Mix,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

const CONCRETE_CATEGORIES: &[Category] = &[
    Category::FoodNature,
    Category::EverydayObjects,
    Category::Technology,
    Category::ToolsWork,
    Category::Transport,
    Category::Lifestyle,
];

impl Category {
    /// Human-readable label shown to players and recorded in round history.
    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodNature => "Food & Nature",
            Category::EverydayObjects => "Everyday Objects",
            Category::Technology => "Technology",
            Category::ToolsWork => "Tools & Work",
            Category::Transport => "Transport",
            Category::Lifestyle => "Lifestyle",
            Category::Mix => "Mix",
        }
    }
}

#[rustfmt::skip]
fn word_pool(category: Category, difficulty: Difficulty) -> &'static [&'static str] {
    use Category::*;
    use Difficulty::*;
    match (category, difficulty) {
        (FoodNature, Easy) => &[
            "Banana", "Apple", "Mango", "Onion", "Potato", "Tomato",
            "Pizza", "Tiger", "Lion", "Parrot",
        ],
        (FoodNature, Medium) => &[
            "Broccoli", "Pineapple", "Watermelon", "Guava", "Spinach",
            "Mushroom", "Lemonade", "Flamingo", "Dolphin", "Crocodile",
        ],
        (FoodNature, Hard) => &[
            "Dragonfruit", "Asparagus", "Pomegranate", "Artichoke", "Durian",
            "Starfruit", "Jackfruit", "Rambutan", "Elk", "Platypus",
        ],
        (EverydayObjects, Easy) => &[
            "Chair", "Spoon", "Shirt", "Pencil", "Pillow", "Bucket",
            "Mirror", "Broom", "Blanket", "Plate",
        ],
        (EverydayObjects, Medium) => &[
            "Curtain", "Cupboard", "Dustbin", "Ladle", "Scissors",
            "Toothbrush", "Stapler", "Eraser", "Handbag", "Sandals",
        ],
        (EverydayObjects, Hard) => &[
            "Colander", "Whisk", "Ironing Board", "Mortar & Pestle",
            "Tweezers", "Flyswatter", "Percolator", "Tongs", "Sieve", "Spatula",
        ],
        (Technology, Easy) => &[
            "Phone", "Laptop", "Charger", "WhatsApp", "Instagram",
            "Camera", "Earphones", "YouTube", "Wi-Fi", "Bluetooth",
        ],
        (Technology, Medium) => &[
            "Smartwatch", "Tablet", "Keyboard", "Powerbank", "Projector",
            "Hotspot", "Screenshot", "Notification", "Google Maps", "QR Code",
        ],
        (Technology, Hard) => &[
            "VPN", "RAM", "SSD", "Hard Drive", "Router",
            "Motherboard", "Firewall", "Bandwidth", "Algorithm", "API",
        ],
        (ToolsWork, Easy) => &[
            "Hammer", "Screwdriver", "Drill", "Saw", "Ladder",
            "Pen", "Stapler", "Notebook", "File", "Ruler",
        ],
        (ToolsWork, Medium) => &[
            "Wrench", "Pliers", "Chisel", "Level", "Measuring Tape",
            "Sandpaper", "Clipboard", "Highlighter", "Printer", "Projector",
        ],
        (ToolsWork, Hard) => &[
            "Soldering Iron", "Jigsaw", "Caliper", "Allen Key",
            "Rivet Gun", "Pneumatic Drill", "Oscilloscope", "Multimeter",
            "Bevel Gauge", "Wire Stripper",
        ],
        (Transport, Easy) => &[
            "Bus", "Car", "Bike", "Train", "Auto", "Cycle",
            "Boat", "Truck", "Scooter", "Van",
        ],
        (Transport, Medium) => &[
            "Metro", "Tractor", "Ferry", "Helicopter", "Ambulance",
            "Tram", "Rickshaw", "Cargo Ship", "Jet Ski", "Monorail",
        ],
        (Transport, Hard) => &[
            "Catamaran", "Hovercraft", "Gondola", "Zeppelin", "Snowmobile",
            "Cable Car", "Hyperloop", "Funicular", "Maglev", "Segway",
        ],
        (Lifestyle, Easy) => &[
            "Cricket", "Swimming", "Cycling", "Dancing", "Cooking",
            "Drawing", "Football", "Running", "Reading", "Singing",
        ],
        (Lifestyle, Medium) => &[
            "Badminton", "Photography", "Gardening", "Camping", "Skating",
            "Yoga", "Surfing", "Boxing", "Knitting", "Hiking",
        ],
        (Lifestyle, Hard) => &[
            "Archery", "Fencing", "Polo", "Kayaking", "Paragliding",
            "Rock Climbing", "Skydiving", "Snorkeling", "Jai Alai", "Curling",
        ],
        // Mix is resolved to a concrete category before lookup.
        (Mix, _) => &[],
    }
}

fn hint_pool(category_label: &str) -> &'static [&'static str] {
    match category_label {
        "Food & Nature" => &[
            "It's something found in nature or a kitchen",
            "You might eat, see, or pet it",
            "Think about the outdoors or a meal",
        ],
        "Everyday Objects" => &[
            "You'd find it at home",
            "It's something people use daily",
            "Look around any room — it's probably there",
        ],
        "Technology" => &[
            "It's related to screens or gadgets",
            "Something digital or electronic",
            "People use this on their phone or computer",
        ],
        "Tools & Work" => &[
            "It's used to build or fix something",
            "You'd find this in an office or workshop",
            "Workers or builders use this",
        ],
        "Transport" => &[
            "It's used to get from one place to another",
            "Something with wheels, wings, or sails",
            "People use this to travel",
        ],
        "Lifestyle" => &[
            "It's an activity people do for fun or fitness",
            "Something sporty or creative",
            "Think of how people spend their free time",
        ],
        _ => &[
            "It's something well-known",
            "Think carefully...",
            "Use your instincts",
        ],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickedWord {
    pub word: String,
    pub category: String,
}

/// Uniformly picks one word for the given category and difficulty,
/// resolving `Mix` to a random concrete category first.
pub fn pick_word(category: Category, difficulty: Difficulty) -> PickedWord {
    let mut rng = thread_rng();
    let resolved = if category == Category::Mix {
        *CONCRETE_CATEGORIES
            .choose(&mut rng)
            .unwrap_or(&Category::FoodNature)
    } else {
        category
    };

    let pool = word_pool(resolved, difficulty);
    let word = pool.choose(&mut rng).copied().unwrap_or_default();

    PickedWord {
        word: word.to_string(),
        category: resolved.label().to_string(),
    }
}

/// Uniformly picks one flavor-text hint for imposters. Unrecognized labels
/// fall back to a generic hint set.
pub fn imposter_hint(category_label: &str) -> String {
    let pool = hint_pool(category_label);
    pool.choose(&mut thread_rng())
        .copied()
        .unwrap_or_default()
        .to_string()
}
