//! Substring entity extractors
//!
//! Every extractor expects lowercased input and returns the first table entry
//! found in it, or a default.

/// Known cities, English then Hindi spellings
const LOCATIONS: &[&str] = &[
    "delhi",
    "mumbai",
    "bangalore",
    "pune",
    "chennai",
    "hyderabad",
    "दिल्ली",
    "मुंबई",
    "बैंगलोर",
    "पुणे",
    "चेन्नई",
];

const CROPS: &[&str] = &[
    "rice", "wheat", "maize", "corn", "tomato", "potato", "onion", "cotton", "धान", "गेहूं",
    "मक्का", "टमाटर", "आलू", "प्याज", "कपास", "arroz", "trigo", "maíz", "tomate", "papa",
    "cebolla", "algodón",
];

const TASK_CATEGORIES: &[(&str, &[&str])] = &[
    ("planting", &["plant", "sow", "बुआई"]),
    ("irrigation", &["water", "irrigat", "सिंचाई"]),
    ("fertilization", &["fertiliz", "खाद"]),
    ("pest-control", &["pest", "spray", "कीट"]),
    ("harvesting", &["harvest", "कटाई"]),
];

const DESTINATIONS: &[(&str, &[&str])] = &[
    ("tasks", &["task", "कार्य", "tarea"]),
    ("farm", &["farm", "field", "खेत", "granja"]),
    ("market", &["market", "price", "बाज़ार", "mercado"]),
    ("community", &["community", "समुदाय", "comunidad"]),
];

/// Crop value meaning "no specific crop"
pub const GENERAL_CROP: &str = "general";

fn first_match<'a>(text: &str, table: &[&'a str]) -> Option<&'a str> {
    table.iter().copied().find(|needle| text.contains(needle))
}

fn first_rule<'a>(text: &str, rules: &[(&'a str, &[&str])]) -> Option<&'a str> {
    rules
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| text.contains(n)))
        .map(|(name, _)| *name)
}

/// First known city in the text, else `default`, else `"unknown"`
#[must_use]
pub fn extract_location(text: &str, default: &str) -> String {
    first_match(text, LOCATIONS).map_or_else(
        || {
            if default.trim().is_empty() {
                "unknown".to_string()
            } else {
                default.to_string()
            }
        },
        ToString::to_string,
    )
}

/// First known crop in the text, else `"general"`
#[must_use]
pub fn extract_crop_type(text: &str) -> String {
    first_match(text, CROPS).unwrap_or(GENERAL_CROP).to_string()
}

/// Task category for the text, else `"general"`
#[must_use]
pub fn extract_task_category(text: &str) -> String {
    first_rule(text, TASK_CATEGORIES)
        .unwrap_or("general")
        .to_string()
}

/// Navigation destination for the text, else `"home"`
#[must_use]
pub fn extract_destination(text: &str) -> String {
    first_rule(text, DESTINATIONS).unwrap_or("home").to_string()
}

/// Client route for a destination
#[must_use]
pub fn redirect_path(destination: &str) -> &'static str {
    match destination {
        "tasks" => "/tasks",
        "farm" => "/my-farm",
        "market" => "/market-prices",
        "community" => "/community",
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location() {
        assert_eq!(extract_location("weather in pune today", "delhi"), "pune");
        assert_eq!(extract_location("मुंबई का मौसम", "delhi"), "मुंबई");
        assert_eq!(extract_location("weather please", "nagpur"), "nagpur");
        assert_eq!(extract_location("weather please", ""), "unknown");
    }

    #[test]
    fn test_crop_table_order_wins() {
        // "rice" precedes "wheat" in the table regardless of text order
        assert_eq!(extract_crop_type("wheat or rice?"), "rice");
        assert_eq!(extract_crop_type("precio del maíz"), "maíz");
        assert_eq!(extract_crop_type("what should i grow"), GENERAL_CROP);
    }

    #[test]
    fn test_task_category() {
        assert_eq!(extract_task_category("when to sow"), "planting");
        assert_eq!(extract_task_category("irrigation schedule"), "irrigation");
        assert_eq!(extract_task_category("fertilizer task"), "fertilization");
        assert_eq!(extract_task_category("spray task"), "pest-control");
        assert_eq!(extract_task_category("कटाई का काम"), "harvesting");
        assert_eq!(extract_task_category("my tasks"), "general");
    }

    #[test]
    fn test_destination_and_path() {
        assert_eq!(extract_destination("go to my tasks"), "tasks");
        assert_eq!(extract_destination("show me the field"), "farm");
        assert_eq!(extract_destination("ir a mercado"), "market");
        assert_eq!(extract_destination("open community"), "community");
        assert_eq!(extract_destination("open"), "home");

        assert_eq!(redirect_path("farm"), "/my-farm");
        assert_eq!(redirect_path("market"), "/market-prices");
        assert_eq!(redirect_path("home"), "/");
        assert_eq!(redirect_path("elsewhere"), "/");
    }
}
