//! Assistant phrase translations
//!
//! English is complete. Hindi and Spanish cover the assistant's own phrases;
//! any missing key falls back to English, then to the key itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported assistant languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Es,
}

impl Language {
    /// All languages, in keyword lookup order
    pub const ALL: [Self; 3] = [Self::En, Self::Hi, Self::Es];

    /// Parse a language code such as `hi` or `es-MX`
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match primary.as_str() {
            "en" => Some(Self::En),
            "hi" => Some(Self::Hi),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Two-letter code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        "voiceAgent.weatherResponse" => "Here's the weather information for your area:",
        "voiceAgent.cropRecommendationResponse" => {
            "Based on your farm conditions, here are my crop recommendations:"
        }
        "voiceAgent.taskResponse" => "I've found some important tasks for you:",
        "voiceAgent.marketPriceResponse" => "Here are the current market prices:",
        "voiceAgent.diseaseResponse" => {
            "Based on the symptoms you described, here's what I found:"
        }
        "voiceAgent.taskNavigation" => {
            "I can help you manage your farming tasks. Let me redirect you to the Tasks section."
        }
        "voiceAgent.farmNavigation" => {
            "To provide accurate recommendations, I need information about your farm. Let me take you to the My Farm section."
        }
        "voiceAgent.marketNavigation" => {
            "Let me show you the latest market prices in the Market Prices section."
        }
        "voiceAgent.communityNavigation" => "Connect with fellow farmers in our Community section.",
        "voiceAgent.defaultNavigation" => "Navigating to the requested section...",
        "voiceAgent.needLandInfo" => {
            "To give you accurate recommendations, I need to know about your land area. Please go to My Farm section first."
        }
        "voiceAgent.processingError" => {
            "Sorry, I had trouble processing your request. Please try again."
        }
        "voiceAgent.cameraDetection" => {
            "I'll help you detect plant diseases using your camera! Let me open the disease detection page where you can scan your plants for health issues."
        }
        "weather.temperature" => "Temperature",
        "weather.humidity" => "Humidity",
        "weather.windSpeed" => "Wind Speed",
        "weather.forecast" => "Weather Forecast",
        "weather.farmingAdvice" => "Farming Advice",
        "task.planting" => "Planting Time",
        "task.dueDate" => "Due Date",
        "market.price" => "Market Price",
        "farm.expectedYield" => "Expected Yield",
        "disease.possibleDiseases" => "Possible diseases",
        "disease.possiblePests" => "Possible pests",
        "disease.recommendations" => "Recommendations",
        "disease.none" => "None identified",
        _ => return None,
    })
}

fn hindi(key: &str) -> Option<&'static str> {
    Some(match key {
        "voiceAgent.weatherResponse" => "आपके क्षेत्र के मौसम की जानकारी:",
        "voiceAgent.cropRecommendationResponse" => {
            "आपके खेत की स्थिति के अनुसार मेरी फसल सिफारिशें:"
        }
        "voiceAgent.taskResponse" => "आपके लिए कुछ महत्वपूर्ण कार्य:",
        "voiceAgent.marketPriceResponse" => "वर्तमान बाज़ार भाव:",
        "voiceAgent.diseaseResponse" => "आपके बताए लक्षणों के आधार पर मुझे यह मिला:",
        "voiceAgent.taskNavigation" => {
            "मैं आपके खेती के कार्यों में मदद कर सकता हूँ। मैं आपको कार्य अनुभाग में ले चलता हूँ।"
        }
        "voiceAgent.farmNavigation" => {
            "सटीक सलाह के लिए मुझे आपके खेत की जानकारी चाहिए। मैं आपको मेरा खेत अनुभाग में ले चलता हूँ।"
        }
        "voiceAgent.marketNavigation" => "बाज़ार भाव अनुभाग में नवीनतम भाव देखें।",
        "voiceAgent.communityNavigation" => "समुदाय अनुभाग में साथी किसानों से जुड़ें।",
        "voiceAgent.defaultNavigation" => "अनुरोधित अनुभाग पर ले जा रहा हूँ...",
        "voiceAgent.needLandInfo" => {
            "सटीक सलाह के लिए मुझे आपकी ज़मीन के क्षेत्रफल की जानकारी चाहिए। कृपया पहले मेरा खेत अनुभाग में जाएँ।"
        }
        "voiceAgent.processingError" => {
            "क्षमा करें, आपके अनुरोध को संसाधित करने में समस्या हुई। कृपया फिर से प्रयास करें।"
        }
        "voiceAgent.cameraDetection" => {
            "मैं कैमरे से पौधों की बीमारी पहचानने में मदद करूँगा! रोग पहचान पृष्ठ खोल रहा हूँ।"
        }
        "weather.temperature" => "तापमान",
        "weather.humidity" => "नमी",
        "weather.windSpeed" => "हवा की गति",
        "weather.forecast" => "मौसम पूर्वानुमान",
        "weather.farmingAdvice" => "खेती सलाह",
        "task.planting" => "बुआई का समय",
        "task.dueDate" => "नियत तारीख",
        "market.price" => "बाज़ार भाव",
        "farm.expectedYield" => "अनुमानित उपज",
        _ => return None,
    })
}

fn spanish(key: &str) -> Option<&'static str> {
    Some(match key {
        "voiceAgent.weatherResponse" => "Esta es la información del clima para tu zona:",
        "voiceAgent.cropRecommendationResponse" => {
            "Según las condiciones de tu granja, estas son mis recomendaciones de cultivos:"
        }
        "voiceAgent.taskResponse" => "Encontré algunas tareas importantes para ti:",
        "voiceAgent.marketPriceResponse" => "Estos son los precios actuales del mercado:",
        "voiceAgent.diseaseResponse" => {
            "Según los síntomas que describiste, esto es lo que encontré:"
        }
        "voiceAgent.taskNavigation" => {
            "Puedo ayudarte a gestionar tus tareas agrícolas. Te llevo a la sección de Tareas."
        }
        "voiceAgent.farmNavigation" => {
            "Para darte recomendaciones precisas necesito información de tu granja. Te llevo a la sección Mi Granja."
        }
        "voiceAgent.marketNavigation" => {
            "Te muestro los últimos precios en la sección de Precios de Mercado."
        }
        "voiceAgent.communityNavigation" => {
            "Conecta con otros agricultores en nuestra sección de Comunidad."
        }
        "voiceAgent.defaultNavigation" => "Navegando a la sección solicitada...",
        "voiceAgent.needLandInfo" => {
            "Para darte recomendaciones precisas necesito conocer el área de tu terreno. Ve primero a la sección Mi Granja."
        }
        "voiceAgent.processingError" => {
            "Lo siento, tuve problemas al procesar tu solicitud. Inténtalo de nuevo."
        }
        "voiceAgent.cameraDetection" => {
            "¡Te ayudaré a detectar enfermedades de las plantas con tu cámara! Abriré la página de detección de enfermedades."
        }
        "weather.temperature" => "Temperatura",
        "weather.humidity" => "Humedad",
        "weather.windSpeed" => "Velocidad del viento",
        "weather.forecast" => "Pronóstico del tiempo",
        "weather.farmingAdvice" => "Consejos agrícolas",
        "task.planting" => "Época de siembra",
        "task.dueDate" => "Fecha límite",
        "market.price" => "Precio de mercado",
        "farm.expectedYield" => "Rendimiento esperado",
        _ => return None,
    })
}

/// Look up a phrase for a language
///
/// Falls back to English, then to `key` itself.
#[must_use]
pub fn translate(language: Language, key: &str) -> &str {
    let localized = match language {
        Language::En => None,
        Language::Hi => hindi(key),
        Language::Es => spanish(key),
    };

    localized.or_else(|| english(key)).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("hi"), Some(Language::Hi));
        assert_eq!(Language::from_code("es-MX"), Some(Language::Es));
        assert_eq!(Language::from_code("EN_us"), Some(Language::En));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn test_localized_lookup() {
        assert_eq!(translate(Language::Es, "weather.humidity"), "Humedad");
        assert_eq!(translate(Language::Hi, "weather.temperature"), "तापमान");
    }

    #[test]
    fn test_falls_back_to_english_then_key() {
        assert_eq!(translate(Language::Hi, "disease.none"), "None identified");
        assert_eq!(translate(Language::Es, "no.such.key"), "no.such.key");
    }

    #[test]
    fn test_every_localized_key_exists_in_english() {
        let keys = [
            "voiceAgent.weatherResponse",
            "voiceAgent.needLandInfo",
            "voiceAgent.cameraDetection",
            "task.dueDate",
            "farm.expectedYield",
        ];
        for key in keys {
            assert!(english(key).is_some(), "{key}");
            assert!(hindi(key).is_some(), "{key}");
            assert!(spanish(key).is_some(), "{key}");
        }
    }
}
