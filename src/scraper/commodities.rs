//! Commodity and market source tables for the simulated scraper

use serde::Serialize;

/// A market price source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketSource {
    pub name: &'static str,
    pub url: &'static str,
}

pub static SOURCES: &[MarketSource] = &[
    MarketSource { name: "agmarknet", url: "https://agmarknet.gov.in" },
    MarketSource { name: "nafed", url: "https://nafed.india.gov.in" },
    MarketSource { name: "fci", url: "https://fci.gov.in" },
    MarketSource { name: "apmc", url: "https://apmc.gov.in" },
    MarketSource { name: "mandiprices", url: "https://mandiprices.com" },
];

/// A traded commodity and where it sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Commodity {
    pub name: &'static str,
    pub varieties: &'static [&'static str],
    pub category: &'static str,
    pub unit: &'static str,
    /// Typical price band in rupees per unit
    pub price_range: (u32, u32),
    pub states: &'static [&'static str],
}

const QUINTAL: &str = "₹/quintal";

pub static COMMODITIES: &[Commodity] = &[
    Commodity {
        name: "Rice",
        varieties: &["Basmati 1121", "Pusa Basmati", "IR-64", "Swarna", "Sona Masuri", "Ponni", "Gobindobhog"],
        category: "Grains",
        unit: QUINTAL,
        price_range: (2500, 6000),
        states: &["Punjab", "Haryana", "West Bengal", "Uttar Pradesh", "Andhra Pradesh"],
    },
    Commodity {
        name: "Wheat",
        varieties: &["PBW 343", "HD 2967", "WH 147", "Lok 1", "Sharbati", "MP Wheat"],
        category: "Grains",
        unit: QUINTAL,
        price_range: (2000, 2800),
        states: &["Punjab", "Haryana", "Uttar Pradesh", "Madhya Pradesh", "Rajasthan"],
    },
    Commodity {
        name: "Soybean",
        varieties: &["JS 335", "JS 9560", "NRC 37", "MACS 450", "Yellow Soybean"],
        category: "Oilseeds",
        unit: QUINTAL,
        price_range: (3500, 5500),
        states: &["Madhya Pradesh", "Maharashtra", "Rajasthan", "Karnataka"],
    },
    Commodity {
        name: "Cotton",
        varieties: &["Shankar-6", "DCH-32", "Suraj", "RCH-2", "Bt Cotton"],
        category: "Cash Crops",
        unit: QUINTAL,
        price_range: (5000, 8000),
        states: &["Gujarat", "Maharashtra", "Punjab", "Haryana", "Andhra Pradesh"],
    },
    Commodity {
        name: "Sugarcane",
        varieties: &["Co 86032", "Co 238", "Co 0238", "UP 9530", "Premium Grade"],
        category: "Cash Crops",
        unit: QUINTAL,
        price_range: (280, 350),
        states: &["Uttar Pradesh", "Maharashtra", "Karnataka", "Tamil Nadu"],
    },
    Commodity {
        name: "Onion",
        varieties: &["Nashik Red", "Bellary Red", "Pusa Red", "Agrifound Dark Red", "White Onion"],
        category: "Vegetables",
        unit: QUINTAL,
        price_range: (800, 3000),
        states: &["Maharashtra", "Karnataka", "Gujarat", "Rajasthan", "Madhya Pradesh"],
    },
    Commodity {
        name: "Tomato",
        varieties: &["Hybrid Tomato", "Desi Tomato", "Cherry Tomato", "Pusa Ruby", "Arka Vikas"],
        category: "Vegetables",
        unit: QUINTAL,
        price_range: (1000, 4000),
        states: &["Karnataka", "Andhra Pradesh", "Maharashtra", "Gujarat", "Himachal Pradesh"],
    },
    Commodity {
        name: "Potato",
        varieties: &["Jyoti", "Chandramukhi", "Red Potato", "Chipsona", "Kufri Bahar"],
        category: "Vegetables",
        unit: QUINTAL,
        price_range: (800, 2000),
        states: &["Uttar Pradesh", "West Bengal", "Bihar", "Gujarat", "Madhya Pradesh"],
    },
    Commodity {
        name: "Groundnut",
        varieties: &["Bold Groundnut", "Java Groundnut", "TMV 2", "GPBD 4", "Spanish Bold"],
        category: "Oilseeds",
        unit: QUINTAL,
        price_range: (4500, 7000),
        states: &["Gujarat", "Rajasthan", "Tamil Nadu", "Karnataka", "Andhra Pradesh"],
    },
    Commodity {
        name: "Turmeric",
        varieties: &["Erode Turmeric", "Salem Turmeric", "Nizamabad Bulb", "Rajapore", "Sangli Turmeric"],
        category: "Spices",
        unit: QUINTAL,
        price_range: (6000, 12000),
        states: &["Tamil Nadu", "Karnataka", "Andhra Pradesh", "Maharashtra", "Odisha"],
    },
    Commodity {
        name: "Chilli",
        varieties: &["Teja Chilli", "Sannam Chilli", "Byadgi Chilli", "Wonder Hot", "Kashmiri Red"],
        category: "Spices",
        unit: QUINTAL,
        price_range: (8000, 18000),
        states: &["Andhra Pradesh", "Karnataka", "Tamil Nadu", "Maharashtra", "Rajasthan"],
    },
    Commodity {
        name: "Coriander",
        varieties: &["Scooter Coriander", "Eagle Coriander", "Double Parrot", "Badami Coriander"],
        category: "Spices",
        unit: QUINTAL,
        price_range: (7000, 15000),
        states: &["Rajasthan", "Gujarat", "Madhya Pradesh", "Uttar Pradesh"],
    },
    Commodity {
        name: "Cumin",
        varieties: &["Unjha Cumin", "Rajkot Cumin", "Singapore Cumin", "99% Purity", "Sortex Quality"],
        category: "Spices",
        unit: QUINTAL,
        price_range: (25000, 45000),
        states: &["Gujarat", "Rajasthan"],
    },
    Commodity {
        name: "Mustard",
        varieties: &["Rai/Mustard", "Black Mustard", "Pusa Bold", "Varuna", "Rohini"],
        category: "Oilseeds",
        unit: QUINTAL,
        price_range: (4000, 6500),
        states: &["Rajasthan", "Haryana", "Uttar Pradesh", "Madhya Pradesh"],
    },
    Commodity {
        name: "Gram",
        varieties: &["Desi Chana", "Kabuli Chana", "Bold Gram", "Machine Clean", "FAQ Gram"],
        category: "Pulses",
        unit: QUINTAL,
        price_range: (4500, 7000),
        states: &["Madhya Pradesh", "Rajasthan", "Uttar Pradesh", "Karnataka", "Maharashtra"],
    },
    Commodity {
        name: "Tur/Arhar",
        varieties: &["Tur Dal", "Arhar Dal", "FAQ Tur", "Bold Tur", "New Tur"],
        category: "Pulses",
        unit: QUINTAL,
        price_range: (5500, 9000),
        states: &["Karnataka", "Maharashtra", "Madhya Pradesh", "Gujarat", "Uttar Pradesh"],
    },
];

/// Market name suffixes appended to a state name
pub const MARKET_KINDS: &[&str] = &[
    "APMC",
    "Mandi",
    "Agricultural Market",
    "Wholesale Market",
    "Krishi Upaj Mandi",
];

pub const GRADES: &[&str] = &["FAQ", "Premium", "Grade A", "Grade B", "Superior"];

/// Look up a commodity by exact name
#[must_use]
pub fn commodity(name: &str) -> Option<&'static Commodity> {
    COMMODITIES.iter().find(|c| c.name == name)
}
