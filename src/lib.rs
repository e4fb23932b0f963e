//! AgroMitra - farming assistant service
//!
//! This library provides:
//! - A multilingual, keyword-driven voice assistant for farmers
//! - The farming backend API it talks to (weather, crops, tasks, prices,
//!   symptom diagnosis, knowledge search)
//! - Soil information from ISRIC SoilGrids with texture classification
//! - Image-based plant disease detection over several providers
//! - Farm records and a community feed stored in SQLite
//! - A simulated market price scraper
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Clients                          │
//! │   Web app  │  CLI (ask / chat)  │  Voice front-end  │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                  AgroMitra API                      │
//! │ Assistant │ Farming │ Soil │ Disease │ Farms │ Mkt  │
//! └──────┬─────────────┬──────────────────────┬─────────┘
//!        │             │                      │
//! ┌──────▼──────┐ ┌────▼──────────────┐ ┌─────▼───────┐
//! │   SQLite    │ │ OpenWeather, ISRIC│ │ Plant.id,   │
//! │ farms, feed │ │ SoilGrids         │ │ Susya,Gemini│
//! └─────────────┘ └───────────────────┘ └─────────────┘
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod db;
pub mod disease;
pub mod error;
pub mod farming;
pub mod geo;
pub mod scraper;
pub mod soil;

pub use agent::{AgentReply, Language, VoiceAgent};
pub use config::Config;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
