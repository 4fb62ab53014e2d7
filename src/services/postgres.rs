use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    PreferenceProfile, PriceBand, PropertyAmenities, PropertyCandidate, PropertyLocation, TenantActionKind,
    TenantIdentity,
};
use crate::services::retry::Transient;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Transient for PostgresError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            PostgresError::SqlxError(
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_) | sqlx::Error::Protocol(_)
            )
        )
    }
}

/// Pool tuning, taken from the `[database]` settings
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Projection shared by every property query
const PROPERTY_SELECT: &str = r#"
    SELECT
        p.unit_id, p.unit_number, p.prop_cat_id, p.prop_name, p.prop_type, p.no_of_rooms,
        p.area_code, p.province, p.country, p.address,
        COALESCE(p.rent, 0)::float8 AS rent, p.lease_length,
        l.unit_id AS location_unit_id, l.apt_unit_number, l.street_name, l.community, l.city,
        l.province AS location_province, l.country AS location_country, l.latitude, l.longitude,
        a.unit_id AS amenities_unit_id, a.parking, a.wheelchair_accessibility, a.gym,
        a.kids_playarea, a.party_hall, a.backyard, a.deck, a.in_house_laundry,
        a.visitor_parking, a.pool, a.pet_friendly
    FROM property_data p
    LEFT JOIN location l ON l.unit_id = p.unit_id
    LEFT JOIN amenities a ON a.unit_id = p.unit_id
"#;

/// Property categories a tenant category may be offered
const PREFERRED_CATEGORIES: &str = r#"
    p.prop_cat_id IN (
        SELECT prop_cat_id FROM tenant_preferred_properties WHERE tent_cat_id = $2
    )
"#;

/// PostgreSQL client for properties, price spans and tenant actions
///
/// This is the candidate supplier for the matcher: it returns properties
/// already filtered to a price band and the tenant's property categories.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Connect, then run the embedded migrations
    pub async fn new(database_url: &str, options: PoolOptions) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(options.acquire_timeout)
            .idle_timeout(options.idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Observed (min, max) rent of a city's listings in the tenant's categories
    ///
    /// Returns `None` when the city has no matching listings.
    pub async fn city_rent_span(
        &self,
        city: &str,
        tenant_category_id: i32,
    ) -> Result<Option<PriceBand>, PostgresError> {
        let query = format!(
            r#"
            SELECT MIN(p.rent)::float8 AS min_rent, MAX(p.rent)::float8 AS max_rent
            FROM property_data p
            JOIN location l ON l.unit_id = p.unit_id
            WHERE LOWER(l.city) = LOWER($1) AND p.rent IS NOT NULL AND {PREFERRED_CATEGORIES}
            "#
        );

        let row = sqlx::query(&query)
            .bind(city)
            .bind(tenant_category_id)
            .fetch_one(&self.pool)
            .await?;

        let min_rent: Option<f64> = row.try_get("min_rent")?;
        let max_rent: Option<f64> = row.try_get("max_rent")?;

        tracing::debug!(
            "Rent span for {} (tenant category {}): {:?}..{:?}",
            city,
            tenant_category_id,
            min_rent,
            max_rent
        );

        Ok(min_rent
            .zip(max_rent)
            .map(|(min_rent, max_rent)| PriceBand { min_rent, max_rent }))
    }

    /// Properties of the profile's city whose rent falls in `band`
    pub async fn candidates_in_band(
        &self,
        profile: &PreferenceProfile,
        band: PriceBand,
    ) -> Result<Vec<PropertyCandidate>, PostgresError> {
        let query = format!(
            r#"{PROPERTY_SELECT}
            WHERE LOWER(l.city) = LOWER($1) AND {PREFERRED_CATEGORIES}
              AND p.rent::float8 BETWEEN $3 AND $4
            "#
        );

        let rows = sqlx::query(&query)
            .bind(profile.city())
            .bind(profile.tenant_category_id())
            .bind(band.min_rent)
            .bind(band.max_rent)
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(candidate_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Fetched {} candidates in {} for band {:.2}..{:.2}",
            candidates.len(),
            profile.city(),
            band.min_rent,
            band.max_rent
        );

        Ok(candidates)
    }

    /// Fetch one property by unit id
    pub async fn property_by_unit_id(&self, unit_id: i32) -> Result<PropertyCandidate, PostgresError> {
        let query = format!("{PROPERTY_SELECT} WHERE p.unit_id = $1");

        let row = sqlx::query(&query)
            .bind(unit_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("property {}", unit_id)))?;

        Ok(candidate_from_row(&row)?)
    }

    /// Record a tenant action on a property
    ///
    /// Uses INSERT ... ON CONFLICT so a tenant holds one action row per
    /// property; liking after disliking flips `is_liked`, contacting or
    /// viewing leaves it alone.
    pub async fn record_action(
        &self,
        tenant: &TenantIdentity,
        unit_id: i32,
        kind: TenantActionKind,
    ) -> Result<(), PostgresError> {
        let (column, value) = action_column(kind);
        let (owner, conflict_target) = match tenant {
            TenantIdentity::User(_) => ("user_id", "(user_id, unit_id) WHERE user_id IS NOT NULL"),
            TenantIdentity::Session(_) => ("session_id", "(session_id, unit_id) WHERE user_id IS NULL"),
        };

        let query = format!(
            r#"
            INSERT INTO tenant_actions ({owner}, unit_id, {column}, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT {conflict_target}
            DO UPDATE SET {column} = EXCLUDED.{column}, updated_at = EXCLUDED.updated_at
            "#
        );

        let result = bind_tenant(sqlx::query(&query), tenant)
            .bind(unit_id)
            .bind(value)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                return Err(PostgresError::NotFound(format!("property {}", unit_id)));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!("Recorded tenant action: {} -> {} ({})", tenant, unit_id, kind.as_str());

        Ok(())
    }

    /// Properties a tenant acted on, most recent first
    pub async fn properties_by_action(
        &self,
        tenant: &TenantIdentity,
        kind: TenantActionKind,
    ) -> Result<Vec<PropertyCandidate>, PostgresError> {
        let owner = match tenant {
            TenantIdentity::User(_) => "t.user_id = $1",
            TenantIdentity::Session(_) => "t.session_id = $1 AND t.user_id IS NULL",
        };
        let condition = action_filter(kind);

        let query = format!(
            r#"{PROPERTY_SELECT}
            JOIN tenant_actions t ON t.unit_id = p.unit_id
            WHERE {owner} AND {condition}
            ORDER BY t.updated_at DESC
            "#
        );

        let rows = bind_tenant(sqlx::query(&query), tenant).fetch_all(&self.pool).await?;

        rows.iter()
            .map(candidate_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Flag column an action sets, and the value it sets it to
fn action_column(kind: TenantActionKind) -> (&'static str, bool) {
    match kind {
        TenantActionKind::Liked => ("is_liked", true),
        TenantActionKind::Disliked => ("is_liked", false),
        TenantActionKind::Contacted => ("is_contacted", true),
        TenantActionKind::Viewed => ("is_viewed", true),
    }
}

/// Row filter selecting the properties an action list shows
fn action_filter(kind: TenantActionKind) -> &'static str {
    match kind {
        TenantActionKind::Liked => "t.is_liked = TRUE",
        TenantActionKind::Disliked => "t.is_liked = FALSE",
        TenantActionKind::Contacted => "t.is_contacted = TRUE",
        TenantActionKind::Viewed => "t.is_viewed = TRUE",
    }
}

fn bind_tenant<'q>(
    query: Query<'q, Postgres, PgArguments>,
    tenant: &'q TenantIdentity,
) -> Query<'q, Postgres, PgArguments> {
    match tenant {
        TenantIdentity::User(id) => query.bind(*id),
        TenantIdentity::Session(session) => query.bind(session.as_str()),
    }
}

/// Map a row of [`PROPERTY_SELECT`] into a candidate
fn candidate_from_row(row: &PgRow) -> Result<PropertyCandidate, sqlx::Error> {
    let location = match row.try_get::<Option<i32>, _>("location_unit_id")? {
        Some(_) => Some(PropertyLocation {
            apt_unit_number: row.try_get("apt_unit_number")?,
            street_name: row.try_get("street_name")?,
            community: row.try_get("community")?,
            city: row.try_get("city")?,
            province: row.try_get("location_province")?,
            country: row.try_get("location_country")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
        }),
        None => None,
    };

    let amenities = match row.try_get::<Option<i32>, _>("amenities_unit_id")? {
        Some(_) => Some(PropertyAmenities {
            parking: row.try_get("parking")?,
            wheelchair_accessibility: row.try_get("wheelchair_accessibility")?,
            gym: row.try_get("gym")?,
            kids_playarea: row.try_get("kids_playarea")?,
            party_hall: row.try_get("party_hall")?,
            backyard: row.try_get("backyard")?,
            deck: row.try_get("deck")?,
            in_house_laundry: row.try_get("in_house_laundry")?,
            visitor_parking: row.try_get("visitor_parking")?,
            pool: row.try_get("pool")?,
            pet_friendly: row.try_get("pet_friendly")?,
        }),
        None => None,
    };

    Ok(PropertyCandidate {
        unit_id: row.try_get("unit_id")?,
        unit_number: row.try_get("unit_number")?,
        prop_cat_id: row.try_get("prop_cat_id")?,
        prop_name: row.try_get("prop_name")?,
        prop_type: row.try_get("prop_type")?,
        no_of_rooms: row.try_get("no_of_rooms")?,
        area_code: row.try_get("area_code")?,
        province: row.try_get("province")?,
        country: row.try_get("country")?,
        address: row.try_get("address")?,
        rent: row.try_get("rent")?,
        lease_length: row.try_get("lease_length")?,
        location,
        amenities,
    })
}
