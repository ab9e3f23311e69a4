//! Static ingredient reference data.
//!
//! Categories are an ordered priority list: when an ingredient appears in
//! more than one category, the earlier category wins. The vocabulary is the
//! concatenation of every category's entries, in declaration order, which is
//! also the tie-break order for fuzzy matching.

use once_cell::sync::Lazy;

/// Category reported for ingredients that belong to no category.
pub const DEFAULT_CATEGORY: &str = "other";

const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    (
        "protein",
        &[
            "chicken", "chicken breast", "chicken thighs", "beef", "ground beef", "steak",
            "pork", "bacon", "ham", "sausage", "turkey", "lamb", "tofu", "tempeh", "egg",
            "eggs",
        ],
    ),
    (
        "seafood",
        &[
            "salmon", "tuna", "shrimp", "cod", "tilapia", "crab", "lobster", "scallops",
            "mussels", "clams", "anchovies", "sardines",
        ],
    ),
    (
        "dairy",
        &[
            "milk", "butter", "cheese", "cheddar", "mozzarella", "parmesan", "feta", "cream",
            "heavy cream", "sour cream", "yogurt", "greek yogurt", "cream cheese", "ricotta",
        ],
    ),
    (
        "grain",
        &[
            "rice", "brown rice", "pasta", "spaghetti", "noodles", "bread", "flour", "oats",
            "quinoa", "couscous", "tortilla", "barley", "cornmeal",
        ],
    ),
    (
        "legume",
        &[
            "beans", "black beans", "kidney beans", "chickpeas", "lentils", "peas", "edamame",
        ],
    ),
    (
        "vegetable",
        &[
            "tomato", "potato", "sweet potato", "onion", "red onion", "garlic", "carrot",
            "celery", "broccoli", "cauliflower", "spinach", "kale", "lettuce", "cabbage",
            "cucumber", "zucchini", "eggplant", "bell pepper", "mushroom", "corn",
            "asparagus", "green beans", "leek", "shallot", "pumpkin", "squash", "beet",
            "radish", "artichoke", "jalapeno", "chili pepper",
        ],
    ),
    (
        "fruit",
        &[
            "apple", "banana", "lemon", "lime", "orange", "strawberry", "blueberry",
            "raspberry", "grape", "mango", "pineapple", "peach", "pear", "cherry", "avocado",
            "coconut", "cranberry",
        ],
    ),
    (
        "herb",
        &[
            "basil", "parsley", "cilantro", "mint", "rosemary", "thyme", "oregano", "dill",
            "sage", "chives", "bay leaf",
        ],
    ),
    (
        "spice",
        &[
            "salt", "black pepper", "pepper", "cumin", "paprika", "cinnamon", "nutmeg",
            "turmeric", "ginger", "chili powder", "curry powder", "cayenne", "cloves",
            "vanilla",
        ],
    ),
    (
        "pantry",
        &[
            "olive oil", "vegetable oil", "sesame oil", "coconut oil", "vinegar",
            "balsamic vinegar", "soy sauce", "honey", "maple syrup", "sugar", "brown sugar",
            "baking soda", "baking powder", "mustard", "ketchup", "mayonnaise", "tomato paste",
            "chicken broth", "vegetable broth", "peanut butter", "almonds", "walnuts",
            "peanuts", "cashews", "sesame seeds", "chocolate", "cocoa powder", "yeast",
            "cornstarch",
        ],
    ),
];

const DENYLIST: &[&str] = &[
    "plastic", "metal", "glass", "paper", "cardboard", "rock", "stone", "dirt", "sand",
    "soap", "detergent", "bleach", "shampoo", "toothpaste", "poison", "gasoline", "petrol",
    "diesel", "motor oil", "paint", "glue", "cement", "concrete", "wood", "rubber",
    "battery", "cigarette", "tobacco", "sock", "shoe", "phone", "computer", "pencil",
    "crayon", "styrofoam", "aluminum",
];

/// Shortest input for which "denylist term contains input" is checked.
const MIN_REVERSE_DENY_CHARS: usize = 4;

static BUILTIN: Lazy<IngredientCatalog> = Lazy::new(|| {
    IngredientCatalog::new(
        CATEGORY_TABLE
            .iter()
            .map(|(category, items)| (*category, items.to_vec())),
        DENYLIST.iter().copied(),
    )
});

/// Vocabulary, denylist and category table used by every lookup.
#[derive(Debug, Clone)]
pub struct IngredientCatalog {
    vocabulary: Vec<String>,
    denylist: Vec<String>,
    categories: Vec<(String, Vec<String>)>,
}

impl IngredientCatalog {
    /// Builds a catalog from ordered categories and a denylist.
    ///
    /// Entries are normalized to lowercase; duplicates keep their first position.
    pub fn new<'a, C, D>(categories: C, denylist: D) -> Self
    where
        C: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
        D: IntoIterator<Item = &'a str>,
    {
        let categories: Vec<(String, Vec<String>)> = categories
            .into_iter()
            .map(|(name, items)| {
                (
                    name.to_lowercase(),
                    items.into_iter().map(|i| i.trim().to_lowercase()).collect(),
                )
            })
            .collect();

        let mut vocabulary: Vec<String> = Vec::new();
        for (_, items) in &categories {
            for item in items {
                if !vocabulary.contains(item) {
                    vocabulary.push(item.clone());
                }
            }
        }

        Self {
            vocabulary,
            denylist: denylist.into_iter().map(|d| d.to_lowercase()).collect(),
            categories,
        }
    }

    /// The catalog shipped with the service.
    pub fn builtin() -> &'static IngredientCatalog {
        &BUILTIN
    }

    /// Vocabulary in tie-break order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Exact membership of an already-normalized ingredient.
    pub fn is_known(&self, normalized: &str) -> bool {
        self.vocabulary.iter().any(|v| v == normalized)
    }

    /// Substring match against the denylist in both directions.
    pub fn is_denylisted(&self, normalized: &str) -> bool {
        if normalized.is_empty() {
            return false;
        }
        let reverse = normalized.chars().count() >= MIN_REVERSE_DENY_CHARS;
        self.denylist
            .iter()
            .any(|term| normalized.contains(term.as_str()) || (reverse && term.contains(normalized)))
    }

    /// Category of an ingredient; first category in priority order wins.
    pub fn category_of(&self, ingredient: &str) -> &str {
        let normalized = ingredient.trim().to_lowercase();
        self.categories
            .iter()
            .find(|(_, items)| items.iter().any(|i| *i == normalized))
            .map(|(name, _)| name.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_vocabulary_has_no_duplicates() {
        let vocab = IngredientCatalog::builtin().vocabulary();
        let mut sorted = vocab.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), vocab.len());
    }

    #[test]
    fn category_lookup_uses_priority_order() {
        let catalog = IngredientCatalog::new(
            vec![("first", vec!["corn"]), ("second", vec!["corn", "peas"])],
            Vec::<&str>::new(),
        );
        assert_eq!(catalog.category_of("Corn"), "first");
        assert_eq!(catalog.category_of("peas"), "second");
    }

    #[test]
    fn unknown_category_defaults_to_other() {
        assert_eq!(IngredientCatalog::builtin().category_of("dragonfruit"), DEFAULT_CATEGORY);
        assert_eq!(IngredientCatalog::builtin().category_of("basil"), "herb");
        assert_eq!(IngredientCatalog::builtin().category_of("tomato"), "vegetable");
    }

    #[test]
    fn denylist_matches_both_directions() {
        let catalog = IngredientCatalog::builtin();
        assert!(catalog.is_denylisted("plastic bag"));
        assert!(catalog.is_denylisted("cardb"));
        assert!(!catalog.is_denylisted("oil"));
        assert!(!catalog.is_denylisted("saffron"));
        assert!(!catalog.is_denylisted(""));
    }
}
