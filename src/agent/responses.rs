//! Reply templates for each intent

use std::fmt::Write as _;

use super::i18n::{Language, translate};
use crate::db::farm::FarmInfo;
use crate::farming::{
    CropRecommendation, Diagnosis, KnowledgeHit, MarketPrice, TaskPriority, TaskRecommendation,
    Trend, WeatherReport,
};

/// Knowledge search returned nothing
pub const KNOWLEDGE_EMPTY: &str =
    "I don't have specific information about that topic in my knowledge base.";

/// Knowledge search failed
pub const KNOWLEDGE_UNAVAILABLE: &str =
    "I'm having trouble accessing my knowledge base right now. Please try again later.";

const NO_FARMS: &str = "I don't have any farm information for you yet. Please add your farm details in the My Farm section first, so I can provide personalized recommendations based on your land coordinates, soil data, and crop information.";

const FARM_INFO_OUTRO: &str = "I can use this information to provide personalized crop recommendations, weather-based advice, and farming guidance based on your specific location coordinates and soil conditions!";

const fn priority_icon(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "🔴",
        TaskPriority::Medium => "🟡",
        TaskPriority::Low => "🟢",
        TaskPriority::Unknown => "⚪",
    }
}

const fn trend_icon(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "📈",
        Trend::Down => "📉",
        Trend::Stable | Trend::Unknown => "➡️",
    }
}

/// Weather summary with up to three forecast lines and any farming advice
#[must_use]
pub fn weather(language: Language, report: &WeatherReport) -> String {
    let t = |key| translate(language, key);
    let current = &report.current;

    let mut out = format!(
        "{}\n\n📍 {}\n🌡️ {}: {}°C\n💧 {}: {}%\n🌤️ {}\n",
        t("voiceAgent.weatherResponse"),
        report.location,
        t("weather.temperature"),
        current.temperature,
        t("weather.humidity"),
        current.humidity,
        current.description,
    );

    if let Some(speed) = current.wind_speed {
        let _ = writeln!(out, "💨 {}: {speed} m/s", t("weather.windSpeed"));
    }

    if !report.forecast.is_empty() {
        let _ = writeln!(out, "\n{}:", t("weather.forecast"));
        for day in report.forecast.iter().take(3) {
            let _ = writeln!(out, "{}: {}°C, {}", day.date, day.temp, day.description);
        }
    }

    if !report.farming_advice.is_empty() {
        let _ = writeln!(out, "\n{}:", t("weather.farmingAdvice"));
        for advice in &report.farming_advice {
            let _ = writeln!(out, "• {advice}");
        }
    }

    out.trim_end().to_string()
}

/// Top three crop recommendations
#[must_use]
pub fn crop_recommendations(language: Language, crops: &[CropRecommendation]) -> String {
    let t = |key| translate(language, key);

    let blocks: Vec<String> = crops
        .iter()
        .take(3)
        .map(|crop| {
            format!(
                "🌾 {} ({}% suitable)\n📅 {}: {}\n💰 {}: ₹{}/quintal\n📈 {}: {}",
                crop.crop,
                crop.suitability,
                t("task.planting"),
                crop.planting_time,
                t("market.price"),
                crop.market_price,
                t("farm.expectedYield"),
                crop.expected_yield,
            )
        })
        .collect();

    format!(
        "{}\n\n{}",
        t("voiceAgent.cropRecommendationResponse"),
        blocks.join("\n\n")
    )
}

/// Top three tasks with priority icons
#[must_use]
pub fn tasks(language: Language, tasks: &[TaskRecommendation]) -> String {
    let t = |key| translate(language, key);

    let blocks: Vec<String> = tasks
        .iter()
        .take(3)
        .map(|task| {
            format!(
                "{} {}\n📅 {}: {}\n📝 {}",
                priority_icon(task.priority),
                task.task,
                t("task.dueDate"),
                task.due_date,
                task.description,
            )
        })
        .collect();

    format!("{}\n\n{}", t("voiceAgent.taskResponse"), blocks.join("\n\n"))
}

/// Top four prices with trend icons
#[must_use]
pub fn market(language: Language, prices: &[MarketPrice]) -> String {
    let blocks: Vec<String> = prices
        .iter()
        .take(4)
        .map(|price| {
            format!(
                "{} {}: ₹{}/{}\n📍 {} | {}",
                trend_icon(price.trend),
                price.crop,
                price.price,
                price.unit,
                price.market,
                price.date,
            )
        })
        .collect();

    format!(
        "{}\n\n{}",
        translate(language, "voiceAgent.marketPriceResponse"),
        blocks.join("\n\n")
    )
}

/// Diagnosis summary
#[must_use]
pub fn disease(language: Language, diagnosis: &Diagnosis) -> String {
    let t = |key| translate(language, key);
    let list = |items: &[String]| {
        if items.is_empty() {
            t("disease.none").to_string()
        } else {
            items.join(", ")
        }
    };

    let mut out = format!(
        "{}\n\n🦠 {}: {}\n🐛 {}: {}\n\n💡 {}:",
        t("voiceAgent.diseaseResponse"),
        t("disease.possibleDiseases"),
        list(&diagnosis.possible_diseases),
        t("disease.possiblePests"),
        list(&diagnosis.possible_pests),
        t("disease.recommendations"),
    );
    for rec in &diagnosis.recommendations {
        let _ = write!(out, "\n• {rec}");
    }

    out
}

/// Farm portfolio summary with up to three farm blocks
#[must_use]
pub fn farm_info(info: &FarmInfo) -> String {
    if info.farm_info.is_empty() {
        return NO_FARMS.to_string();
    }

    let summary = &info.summary;
    let mut out = String::from("🌾 **Here's your complete farm information:**\n\n");

    out.push_str("📊 **Farm Portfolio Summary:**\n");
    let _ = writeln!(out, "• Total Farms: {}", summary.total_farms);
    let _ = writeln!(out, "• Total Area: {:.2} acres", summary.total_area);
    let _ = writeln!(out, "• Average Farm Size: {:.2} acres", summary.avg_farm_size);
    if !summary.crop_types.is_empty() {
        let _ = writeln!(out, "• Crop Types: {}", summary.crop_types.join(", "));
    }
    if !summary.soil_types.is_empty() {
        let _ = writeln!(out, "• Soil Types: {}", summary.soil_types.join(", "));
    }
    out.push('\n');

    for (index, entry) in info.farm_info.iter().take(3).enumerate() {
        let farm = &entry.farm;
        let _ = writeln!(out, "**Farm {}: {}**", index + 1, farm.name);
        let _ = writeln!(
            out,
            "📍 Location: {:.6}, {:.6}",
            entry.latitude, entry.longitude
        );
        let _ = writeln!(out, "📐 Area: {:.2} acres", farm.total_area);

        if !farm.crop_type.is_empty() {
            let _ = writeln!(out, "🌱 Current Crop: {}", farm.crop_type);
        }
        if !farm.soil_type.is_empty() {
            let _ = writeln!(out, "🌍 Soil Type: {}", farm.soil_type);
        }
        if let Some(soil) = &farm.soil_data {
            if let Some(ph) = soil.ph {
                let _ = writeln!(out, "⚗️ Soil pH: {ph}");
            }
            if let Some(texture) = &soil.texture_class {
                let _ = writeln!(out, "🧱 Soil Texture: {texture}");
            }
        }
        out.push('\n');
    }

    if info.farm_info.len() > 3 {
        let _ = write!(out, "... and {} more farms.\n\n", info.farm_info.len() - 3);
    }

    out.push_str(FARM_INFO_OUTRO);
    out
}

/// Message announcing a navigation
#[must_use]
pub fn navigation(language: Language, destination: &str) -> String {
    let key = match destination {
        "tasks" => "voiceAgent.taskNavigation",
        "farm" => "voiceAgent.farmNavigation",
        "market" => "voiceAgent.marketNavigation",
        "community" => "voiceAgent.communityNavigation",
        _ => "voiceAgent.defaultNavigation",
    };
    translate(language, key).to_string()
}

/// Answer built from knowledge search hits
#[must_use]
pub fn knowledge(hits: &[KnowledgeHit]) -> String {
    if hits.is_empty() {
        return KNOWLEDGE_EMPTY.to_string();
    }

    let context: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
    format!("Based on my farming knowledge:\n\n{}", context.join("\n\n"))
}
