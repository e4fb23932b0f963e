//! Farm repository
//!
//! Farms are polygons owned by a user. Area, perimeter, and centre are derived
//! from the boundary on every write. Deletes are soft: the row stays with
//! `is_active = 0` and disappears from every query.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DbPool;
use crate::geo::{LatLng, PolygonMetrics};
use crate::{Error, Result};

/// Soil analysis stored with a farm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sand: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organic_carbon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_class: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_simulated: Option<bool>,
}

/// A stored farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub crop_type: String,
    #[serde(default)]
    pub soil_type: String,
    #[serde(default)]
    pub irrigation_type: String,
    #[serde(default)]
    pub notes: String,
    /// Area in acres
    pub total_area: f64,
    pub area_in_square_meters: f64,
    pub coordinates: Vec<LatLng>,
    #[serde(default)]
    pub perimeter: Option<f64>,
    pub center: LatLng,
    #[serde(default)]
    pub soil_data: Option<SoilSnapshot>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new farm
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFarm {
    pub name: String,
    #[serde(default)]
    pub crop_type: String,
    #[serde(default)]
    pub soil_type: String,
    #[serde(default)]
    pub irrigation_type: String,
    #[serde(default)]
    pub notes: String,
    pub coordinates: Vec<LatLng>,
    #[serde(default)]
    pub soil_data: Option<SoilSnapshot>,
}

/// Partial farm update; unset fields are kept
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmPatch {
    pub name: Option<String>,
    pub crop_type: Option<String>,
    pub soil_type: Option<String>,
    pub irrigation_type: Option<String>,
    pub notes: Option<String>,
    pub coordinates: Option<Vec<LatLng>>,
    pub soil_data: Option<SoilSnapshot>,
}

/// A farm with its centre flattened for the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmInfoEntry {
    #[serde(flatten)]
    pub farm: Farm,
    pub latitude: f64,
    pub longitude: f64,
}

/// Portfolio totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSummary {
    pub total_farms: usize,
    pub total_area: f64,
    pub avg_farm_size: f64,
    pub crop_types: Vec<String>,
    pub soil_types: Vec<String>,
    pub irrigation_types: Vec<String>,
}

/// Farms plus summary, as consumed by the assistant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmInfo {
    pub farm_info: Vec<FarmInfoEntry>,
    pub summary: FarmSummary,
}

impl FarmInfo {
    /// Build the assistant view of a set of farms
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_farms(farms: Vec<Farm>) -> Self {
        let total_area: f64 = farms.iter().map(|f| f.total_area).sum();
        let total_farms = farms.len();

        let summary = FarmSummary {
            total_farms,
            total_area,
            avg_farm_size: if total_farms > 0 {
                total_area / total_farms as f64
            } else {
                0.0
            },
            crop_types: distinct(farms.iter().map(|f| f.crop_type.as_str())),
            soil_types: distinct(farms.iter().map(|f| f.soil_type.as_str())),
            irrigation_types: distinct(farms.iter().map(|f| f.irrigation_type.as_str())),
        };

        let farm_info = farms
            .into_iter()
            .map(|farm| FarmInfoEntry {
                latitude: farm.center.lat,
                longitude: farm.center.lng,
                farm,
            })
            .collect();

        Self { farm_info, summary }
    }
}

/// Non-empty values in first-seen order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values.filter(|v| !v.is_empty()) {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

const FARM_COLUMNS: &str = "id, user_id, name, crop_type, soil_type, irrigation_type, notes, \
     total_area, area_sq_m, perimeter, center_lat, center_lng, coordinates, soil_data, \
     is_active, created_at, updated_at";

/// Raw row before JSON columns are decoded
struct FarmRow {
    id: String,
    user_id: String,
    name: String,
    crop_type: String,
    soil_type: String,
    irrigation_type: String,
    notes: String,
    total_area: f64,
    area_sq_m: f64,
    perimeter: Option<f64>,
    center_lat: f64,
    center_lng: f64,
    coordinates: String,
    soil_data: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl FarmRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            crop_type: row.get(3)?,
            soil_type: row.get(4)?,
            irrigation_type: row.get(5)?,
            notes: row.get(6)?,
            total_area: row.get(7)?,
            area_sq_m: row.get(8)?,
            perimeter: row.get(9)?,
            center_lat: row.get(10)?,
            center_lng: row.get(11)?,
            coordinates: row.get(12)?,
            soil_data: row.get(13)?,
            is_active: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }

    fn into_farm(self) -> Result<Farm> {
        let soil_data = self
            .soil_data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Farm {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            crop_type: self.crop_type,
            soil_type: self.soil_type,
            irrigation_type: self.irrigation_type,
            notes: self.notes,
            total_area: self.total_area,
            area_in_square_meters: self.area_sq_m,
            coordinates: serde_json::from_str(&self.coordinates)?,
            perimeter: self.perimeter,
            center: LatLng::new(self.center_lat, self.center_lng),
            soil_data,
            is_active: self.is_active,
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        })
    }
}

fn validate_boundary(coordinates: &[LatLng]) -> Result<()> {
    if coordinates.len() < 3 {
        return Err(Error::Validation(
            "A farm boundary needs at least 3 points".to_string(),
        ));
    }
    if coordinates
        .iter()
        .any(|p| !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lng))
    {
        return Err(Error::Validation(
            "Farm boundary has out-of-range coordinates".to_string(),
        ));
    }
    Ok(())
}

fn not_found() -> Error {
    Error::NotFound("Farm not found".to_string())
}

/// Farm repository
#[derive(Debug, Clone)]
pub struct FarmRepo {
    pool: DbPool,
}

impl FarmRepo {
    /// Create a new farm repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<super::DbConn> {
        self.pool.get().map_err(|e| Error::Database(e.to_string()))
    }

    /// Create a farm for a user
    ///
    /// # Errors
    ///
    /// Returns error if the name is blank, the boundary is invalid, or the
    /// database operation fails
    pub fn create(&self, user_id: &str, farm: NewFarm) -> Result<Farm> {
        if farm.name.trim().is_empty() {
            return Err(Error::Validation("Farm name is required".to_string()));
        }
        validate_boundary(&farm.coordinates)?;

        let metrics = PolygonMetrics::of(&farm.coordinates);
        let now = Utc::now();

        let record = Farm {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: farm.name.trim().to_string(),
            crop_type: farm.crop_type,
            soil_type: farm.soil_type,
            irrigation_type: farm.irrigation_type,
            notes: farm.notes,
            total_area: metrics.area_acres,
            area_in_square_meters: metrics.area_m2,
            coordinates: farm.coordinates,
            perimeter: Some(metrics.perimeter_m),
            center: metrics.center,
            soil_data: farm.soil_data,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO farms ({FARM_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 1, ?15, ?15)"
            ),
            params![
                record.id,
                record.user_id,
                record.name,
                record.crop_type,
                record.soil_type,
                record.irrigation_type,
                record.notes,
                record.total_area,
                record.area_in_square_meters,
                record.perimeter,
                record.center.lat,
                record.center.lng,
                serde_json::to_string(&record.coordinates)?,
                record
                    .soil_data
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        tracing::info!(farm_id = %record.id, user_id, acres = record.total_area, "farm created");
        Ok(record)
    }

    /// Active farms of a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_active(&self, user_id: &str) -> Result<Vec<Farm>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {FARM_COLUMNS} FROM farms \
                 WHERE user_id = ?1 AND is_active = 1 ORDER BY created_at, rowid"
            ))
            .map_err(|e| Error::Database(e.to_string()))?;

        let rows = stmt
            .query_map([user_id], FarmRow::from_row)
            .map_err(|e| Error::Database(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(FarmRow::into_farm).collect()
    }

    /// Find an active farm by ID
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn get(&self, user_id: &str, farm_id: &str) -> Result<Option<Farm>> {
        find_active(&*self.conn()?, user_id, farm_id)
    }

    /// Apply a partial update and refresh `updated_at`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for unknown or deleted farms, a validation
    /// error for an invalid boundary, or a database error
    pub fn update(&self, user_id: &str, farm_id: &str, patch: FarmPatch) -> Result<Farm> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        let mut farm = find_active(&tx, user_id, farm_id)?.ok_or_else(not_found)?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("Farm name is required".to_string()));
            }
            farm.name = name.trim().to_string();
        }
        if let Some(crop_type) = patch.crop_type {
            farm.crop_type = crop_type;
        }
        if let Some(soil_type) = patch.soil_type {
            farm.soil_type = soil_type;
        }
        if let Some(irrigation_type) = patch.irrigation_type {
            farm.irrigation_type = irrigation_type;
        }
        if let Some(notes) = patch.notes {
            farm.notes = notes;
        }
        if let Some(coordinates) = patch.coordinates {
            validate_boundary(&coordinates)?;
            let metrics = PolygonMetrics::of(&coordinates);
            farm.total_area = metrics.area_acres;
            farm.area_in_square_meters = metrics.area_m2;
            farm.perimeter = Some(metrics.perimeter_m);
            farm.center = metrics.center;
            farm.coordinates = coordinates;
        }
        if let Some(soil_data) = patch.soil_data {
            farm.soil_data = Some(soil_data);
        }
        farm.updated_at = Utc::now();

        let updated = tx
            .execute(
                "UPDATE farms SET name = ?1, crop_type = ?2, soil_type = ?3, irrigation_type = ?4, \
                 notes = ?5, total_area = ?6, area_sq_m = ?7, perimeter = ?8, center_lat = ?9, \
                 center_lng = ?10, coordinates = ?11, soil_data = ?12, updated_at = ?13 \
                 WHERE id = ?14 AND user_id = ?15 AND is_active = 1",
                params![
                    farm.name,
                    farm.crop_type,
                    farm.soil_type,
                    farm.irrigation_type,
                    farm.notes,
                    farm.total_area,
                    farm.area_in_square_meters,
                    farm.perimeter,
                    farm.center.lat,
                    farm.center.lng,
                    serde_json::to_string(&farm.coordinates)?,
                    farm.soil_data
                        .as_ref()
                        .map(serde_json::to_string)
                        .transpose()?,
                    farm.updated_at.to_rfc3339(),
                    farm.id,
                    farm.user_id,
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if updated == 0 {
            return Err(not_found());
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        Ok(farm)
    }

    /// Replace a farm's soil snapshot
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for unknown or deleted farms, or a database error
    pub fn update_soil_data(
        &self,
        user_id: &str,
        farm_id: &str,
        soil_data: SoilSnapshot,
    ) -> Result<Farm> {
        self.update(
            user_id,
            farm_id,
            FarmPatch {
                soil_data: Some(soil_data),
                ..FarmPatch::default()
            },
        )
    }

    /// Soft-delete a farm
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for unknown or already deleted farms, or a
    /// database error
    pub fn delete(&self, user_id: &str, farm_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE farms SET is_active = 0, updated_at = ?1 \
                 WHERE id = ?2 AND user_id = ?3 AND is_active = 1",
                params![Utc::now().to_rfc3339(), farm_id, user_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        if changed == 0 {
            return Err(not_found());
        }

        conn.execute(
            "DELETE FROM selected_farms WHERE user_id = ?1 AND farm_id = ?2",
            [user_id, farm_id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        tracing::info!(farm_id, user_id, "farm deleted");
        Ok(())
    }

    /// Remember the farm a user is working with
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for unknown or deleted farms, or a database error
    pub fn set_selected(&self, user_id: &str, farm_id: &str) -> Result<Farm> {
        let farm = self.get(user_id, farm_id)?.ok_or_else(not_found)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO selected_farms (user_id, farm_id, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(user_id) DO UPDATE SET farm_id = excluded.farm_id, \
             updated_at = excluded.updated_at",
            params![user_id, farm_id, Utc::now().to_rfc3339()],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(farm)
    }

    /// The user's selected farm, if it is still active
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn selected(&self, user_id: &str) -> Result<Option<Farm>> {
        let farm_id: Option<String> = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT farm_id FROM selected_farms WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?
        };

        match farm_id {
            Some(id) => self.get(user_id, &id),
            None => Ok(None),
        }
    }

    /// Farms and portfolio summary for the assistant
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn farm_info_for_assistant(&self, user_id: &str) -> Result<FarmInfo> {
        Ok(FarmInfo::from_farms(self.list_active(user_id)?))
    }
}

fn find_active(conn: &Connection, user_id: &str, farm_id: &str) -> Result<Option<Farm>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {FARM_COLUMNS} FROM farms \
                 WHERE id = ?1 AND user_id = ?2 AND is_active = 1"
            ),
            [farm_id, user_id],
            FarmRow::from_row,
        )
        .optional()
        .map_err(|e| Error::Database(e.to_string()))?;

    row.map(FarmRow::into_farm).transpose()
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
