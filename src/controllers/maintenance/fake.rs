use rand::Rng;

use crate::models::MimeType;

const FIRST_NAMES: [&str; 24] = [
    "Ada", "Alan", "Beatrice", "Carlos", "Chen", "Dorothy", "Elena", "Farid", "Grace", "Hiro",
    "Ingrid", "James", "Kwame", "Laura", "Mateo", "Nadia", "Oscar", "Priya", "Quentin", "Rosa",
    "Samuel", "Tamsin", "Victor", "Yara",
];

const LAST_NAMES: [&str; 24] = [
    "Abbott", "Bennett", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Hughes", "Ivanova",
    "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov", "Quinn", "Rossi",
    "Schmidt", "Tanaka", "Underwood", "Vasquez", "Whitfield", "Zhang",
];

const WORDS: [&str; 40] = [
    "amber", "anchor", "autumn", "harbor", "beacon", "bridge", "candle", "canyon", "cedar",
    "compass", "delta", "ember", "falcon", "forest", "garden", "glacier", "harvest", "island",
    "journey", "lantern", "meadow", "mirror", "north", "orchard", "paper", "quarry", "river",
    "saddle", "shadow", "signal", "silver", "summit", "thunder", "timber", "valley", "voyage",
    "willow", "winter", "yarrow", "zephyr",
];

const TOP_LEVEL_DOMAINS: [&str; 5] = ["com", "org", "net", "info", "biz"];

pub const LANGUAGES: [&str; 4] = ["en", "fr", "de", "es"];

pub const MAX_DOWNLOAD_COUNT: i32 = 1000;

/// Synthetic catalog values drawn from an explicit random source.
pub struct FakeData<R> {
    rng: R,
}

impl<R: Rng> FakeData<R> {
    pub fn new(rng: R) -> Self {
        FakeData { rng }
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.rng.gen_range(0..items.len())]
    }

    pub fn name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn word(&mut self) -> String {
        self.pick(&WORDS).to_owned()
    }

    /// Roughly `nb_words` words (give or take 40%), capitalized, ending in a
    /// full stop.
    pub fn sentence(&mut self, nb_words: usize) -> String {
        let low = ((nb_words * 6) / 10).max(1);
        let high = ((nb_words * 14) / 10).max(low);
        let count = self.rng.gen_range(low..=high);
        let mut sentence = (0..count)
            .map(|_| self.pick(&WORDS))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(first) = sentence.get(0..1) {
            let upper = first.to_uppercase();
            sentence.replace_range(0..1, &upper);
        }
        sentence.push('.');
        sentence
    }

    pub fn url(&mut self) -> String {
        let domain = self.pick(&WORDS);
        let tld = self.pick(&TOP_LEVEL_DOMAINS);
        if self.rng.gen_bool(0.5) {
            format!("https://www.{}.{}/", domain, tld)
        } else {
            format!("http://{}.{}/", domain, tld)
        }
    }

    pub fn language(&mut self) -> &'static str {
        self.pick(&LANGUAGES)
    }

    pub fn mime_type(&mut self) -> MimeType {
        MimeType::ALL[self.rng.gen_range(0..MimeType::ALL.len())]
    }

    pub fn download_count(&mut self) -> i32 {
        self.rng.gen_range(0..=MAX_DOWNLOAD_COUNT)
    }
}
