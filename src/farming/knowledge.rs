//! Farming knowledge base with keyword-overlap search

use serde::{Deserialize, Serialize};

/// Default number of search results
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// A static knowledge entry
#[derive(Debug, Clone)]
pub struct KnowledgeEntry {
    pub id: &'static str,
    pub content: &'static str,
    pub category: &'static str,
    pub language: &'static str,
    pub keywords: &'static [&'static str],
}

/// A scored search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeHit {
    pub id: String,
    pub content: String,
    pub category: String,
    pub language: String,
    pub keywords: Vec<String>,
    pub score: usize,
}

const BUILTIN_ENTRIES: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        id: "crop-rice-1",
        content: "Rice cultivation requires flooded fields for optimal growth. Plant rice seedlings 2-3 weeks old in rows 20cm apart. Water levels should be maintained at 2-5cm throughout growing season.",
        category: "crops",
        language: "en",
        keywords: &["rice", "paddy", "cultivation", "water", "seedlings"],
    },
    KnowledgeEntry {
        id: "crop-wheat-1",
        content: "Wheat should be sown in November-December in tropical regions. Optimal spacing is 22.5cm between rows. Water requirement is 450-650mm throughout crop cycle.",
        category: "crops",
        language: "en",
        keywords: &["wheat", "sowing", "november", "december", "spacing"],
    },
    KnowledgeEntry {
        id: "crop-maize-1",
        content: "Maize (corn) thrives in well-drained soil with pH 6.0-7.5. Plant seeds 60cm apart in rows. Harvest when moisture content is 20-25% for optimal yield.",
        category: "crops",
        language: "en",
        keywords: &["maize", "corn", "soil", "pH", "harvest"],
    },
    KnowledgeEntry {
        id: "disease-blight-1",
        content: "Late blight in potatoes appears as dark spots on leaves. Prevent with copper-based fungicides. Ensure good air circulation and avoid overhead watering.",
        category: "diseases",
        language: "en",
        keywords: &["blight", "potato", "dark spots", "fungicide", "copper"],
    },
    KnowledgeEntry {
        id: "disease-rust-1",
        content: "Wheat rust shows orange pustules on leaves. Apply propiconazole fungicide at first sign. Use resistant varieties when possible.",
        category: "diseases",
        language: "en",
        keywords: &["rust", "wheat", "orange", "pustules", "propiconazole"],
    },
    KnowledgeEntry {
        id: "pest-aphids-1",
        content: "Aphids cluster on new growth and undersides of leaves. Control with neem oil spray or introduce ladybugs as natural predators.",
        category: "pests",
        language: "en",
        keywords: &["aphids", "leaves", "neem oil", "ladybugs", "predators"],
    },
    KnowledgeEntry {
        id: "pest-bollworm-1",
        content: "Cotton bollworm damages cotton bolls and other crops. Use pheromone traps for monitoring and Bt cotton varieties for resistance.",
        category: "pests",
        language: "en",
        keywords: &["bollworm", "cotton", "pheromone", "traps", "Bt cotton"],
    },
    KnowledgeEntry {
        id: "soil-ph-1",
        content: "Soil pH affects nutrient availability. Most crops prefer pH 6.0-7.0. Add lime to increase pH or sulfur to decrease pH gradually.",
        category: "soil",
        language: "en",
        keywords: &["soil", "pH", "nutrients", "lime", "sulfur"],
    },
    KnowledgeEntry {
        id: "soil-organic-1",
        content: "Organic matter improves soil structure and water retention. Add compost, manure, or green manure crops to increase organic content.",
        category: "soil",
        language: "en",
        keywords: &["organic matter", "soil structure", "compost", "manure", "water retention"],
    },
    KnowledgeEntry {
        id: "weather-monsoon-1",
        content: "Monsoon timing is crucial for crop planning. Early monsoon favors rice and sugarcane. Delayed monsoon may require drought-resistant varieties.",
        category: "weather",
        language: "en",
        keywords: &["monsoon", "crop planning", "rice", "sugarcane", "drought resistant"],
    },
    KnowledgeEntry {
        id: "weather-frost-1",
        content: "Protect crops from frost using water spraying, smoke, or row covers. Plant frost-sensitive crops after last frost date.",
        category: "weather",
        language: "en",
        keywords: &["frost", "protection", "water spraying", "smoke", "row covers"],
    },
    KnowledgeEntry {
        id: "irrigation-drip-1",
        content: "Drip irrigation saves 30-50% water compared to flood irrigation. Best for high-value crops like vegetables and fruits.",
        category: "irrigation",
        language: "en",
        keywords: &["drip irrigation", "water saving", "vegetables", "fruits", "high-value crops"],
    },
    KnowledgeEntry {
        id: "irrigation-timing-1",
        content: "Water crops early morning or evening to reduce evaporation. Critical watering periods include flowering and fruit development stages.",
        category: "irrigation",
        language: "en",
        keywords: &["watering timing", "early morning", "evening", "evaporation", "flowering"],
    },
];

/// In-memory knowledge base searched by linear keyword overlap
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(BUILTIN_ENTRIES.to_vec())
    }
}

impl KnowledgeBase {
    /// Create a knowledge base over the given entries
    #[must_use]
    pub const fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the knowledge base has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search entries by keyword overlap
    ///
    /// Each entry keyword that contains (or is contained in) a query token is
    /// worth two points; each query token found in the content is worth one.
    /// Zero-score entries are dropped and ties keep table order.
    #[must_use]
    pub fn search(&self, query: &str, category: Option<&str>, limit: usize) -> Vec<KnowledgeHit> {
        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &KnowledgeEntry)> = self
            .entries
            .iter()
            .filter(|entry| category.is_none_or(|c| entry.category == c))
            .map(|entry| (score_entry(entry, &tokens), entry))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps table order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, entry)| KnowledgeHit {
                id: entry.id.to_string(),
                content: entry.content.to_string(),
                category: entry.category.to_string(),
                language: entry.language.to_string(),
                keywords: entry.keywords.iter().map(ToString::to_string).collect(),
                score,
            })
            .collect()
    }
}

fn score_entry(entry: &KnowledgeEntry, tokens: &[&str]) -> usize {
    let content = entry.content.to_lowercase();

    let keyword_matches = entry
        .keywords
        .iter()
        .map(|k| k.to_lowercase())
        .filter(|keyword| {
            tokens
                .iter()
                .any(|t| keyword.contains(t) || t.contains(keyword.as_str()))
        })
        .count();

    let content_matches = tokens.iter().filter(|t| content.contains(**t)).count();

    keyword_matches * 2 + content_matches
}
