//! Seasonal farming tasks

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Indian cropping seasons by calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    Winter,
    Summer,
    Monsoon,
    PostMonsoon,
}

impl Season {
    /// Season for a 1-based month: 12-2 winter, 3-5 summer, 6-9 monsoon
    #[must_use]
    pub const fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Summer,
            6..=9 => Self::Monsoon,
            _ => Self::PostMonsoon,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Summer => "summer",
            Self::Monsoon => "monsoon",
            Self::PostMonsoon => "post-monsoon",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Ok(Self::Winter),
            "summer" => Ok(Self::Summer),
            "monsoon" => Ok(Self::Monsoon),
            "post-monsoon" | "postmonsoon" => Ok(Self::PostMonsoon),
            other => Err(Error::Validation(format!("Unknown season: {other}"))),
        }
    }
}

/// Task urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    Planting,
    Irrigation,
    Fertilization,
    PestControl,
    Harvesting,
    #[serde(other)]
    General,
}

/// A suggested farming task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecommendation {
    pub task: String,
    pub priority: TaskPriority,
    pub description: String,
    pub due_date: NaiveDate,
    pub category: TaskCategory,
}

type TaskTemplate = (&'static str, TaskPriority, &'static str, u64, TaskCategory);

const MONSOON_TASKS: &[TaskTemplate] = &[
    (
        "Prepare drainage channels",
        TaskPriority::High,
        "Ensure proper drainage to prevent waterlogging during heavy rains",
        7,
        TaskCategory::Irrigation,
    ),
    (
        "Plant rice seedlings",
        TaskPriority::High,
        "Optimal time for rice transplantation",
        3,
        TaskCategory::Planting,
    ),
];

const WINTER_TASKS: &[TaskTemplate] = &[
    (
        "Sow wheat seeds",
        TaskPriority::High,
        "Plant wheat for rabi season harvest",
        5,
        TaskCategory::Planting,
    ),
    (
        "Apply organic fertilizer",
        TaskPriority::Medium,
        "Winter crops need proper nutrition",
        10,
        TaskCategory::Fertilization,
    ),
];

const SUMMER_TASKS: &[TaskTemplate] = &[
    (
        "Install drip irrigation",
        TaskPriority::High,
        "Water conservation is critical in summer",
        2,
        TaskCategory::Irrigation,
    ),
    (
        "Harvest winter crops",
        TaskPriority::High,
        "Complete harvesting before extreme heat",
        1,
        TaskCategory::Harvesting,
    ),
];

/// Tasks for a season, due relative to `today`
///
/// Post-monsoon has no scheduled tasks.
#[must_use]
pub fn seasonal_tasks(season: Season, today: NaiveDate) -> Vec<TaskRecommendation> {
    let templates: &[TaskTemplate] = match season {
        Season::Monsoon => MONSOON_TASKS,
        Season::Winter => WINTER_TASKS,
        Season::Summer => SUMMER_TASKS,
        Season::PostMonsoon => &[],
    };

    templates
        .iter()
        .map(|(task, priority, description, days, category)| TaskRecommendation {
            task: (*task).to_string(),
            priority: *priority,
            description: (*description).to_string(),
            due_date: today.checked_add_days(Days::new(*days)).unwrap_or(today),
            category: *category,
        })
        .collect()
}
