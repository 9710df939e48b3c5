// ============================================================================
// AdInvoice Infrastructure - PostgreSQL User Repository
// File: crates/adinvoice-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use adinvoice_core::domain::{ApplicationStatus, CompanyProfile, NewUser, User, UserRole};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::UserRepository;

use crate::database::{db_error, decode, is_unique_violation};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
    pub tenant_id: Option<i64>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub application_status: String,
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub industry: Option<String>,
    pub experience_years: Option<i32>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub website: Option<String>,
    pub linkedin_profile: Option<String>,
    pub twitter_profile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub alternate_phone: Option<String>,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            full_name: row.full_name,
            role: decode(&row.role, UserRole::parse, "users.role")?,
            tenant_id: row.tenant_id,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            application_status: decode(
                &row.application_status,
                ApplicationStatus::parse,
                "users.application_status",
            )?,
            profile: CompanyProfile {
                company_name: row.company_name,
                designation: row.designation,
                industry: row.industry,
                experience_years: row.experience_years,
                address_line1: row.address_line1,
                address_line2: row.address_line2,
                city: row.city,
                state: row.state,
                country: row.country,
                pincode: row.pincode,
                website: row.website,
                linkedin_profile: row.linkedin_profile,
                twitter_profile: row.twitter_profile,
                date_of_birth: row.date_of_birth,
                alternate_phone: row.alternate_phone,
            },
            profile_completed: row.profile_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = r#"
    id, username, email, phone, password_hash, first_name, last_name, full_name,
    role, tenant_id, is_active, is_superuser, application_status,
    company_name, designation, industry, experience_years, address_line1, address_line2,
    city, state, country, pincode, website, linkedin_profile, twitter_profile,
    date_of_birth, alternate_phone, profile_completed, created_at, updated_at
"#;

fn unique_error(e: sqlx::Error, email: &str, phone: Option<&str>) -> DomainError {
    error!("Database error saving user: {}", e);
    if is_unique_violation(&e) {
        let msg = e.to_string();
        match phone {
            Some(phone) if msg.contains("phone") => DomainError::PhoneAlreadyExists(phone.to_string()),
            _ if msg.contains("username") => {
                DomainError::AlreadyExists("Username already exists".to_string())
            }
            _ => DomainError::EmailAlreadyExists(email.to_string()),
        }
    } else {
        DomainError::DatabaseError(e.to_string())
    }
}

impl PgUserRepository {
    async fn find_one(&self, filter: &str, value: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, filter))
                .bind(value)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("finding user"))?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("finding user by id"))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("LOWER(email) = LOWER($1)", email).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError> {
        self.find_one("phone = $1", phone).await
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let p = &user.profile;
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (
                username, email, phone, password_hash, first_name, last_name, full_name,
                role, is_active, is_superuser, application_status,
                company_name, designation, industry, experience_years, address_line1,
                address_line2, city, state, country, pincode, website, linkedin_profile,
                twitter_profile, date_of_birth, alternate_phone, profile_completed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.application_status.as_str())
        .bind(&p.company_name)
        .bind(&p.designation)
        .bind(&p.industry)
        .bind(p.experience_years)
        .bind(&p.address_line1)
        .bind(&p.address_line2)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.country)
        .bind(&p.pincode)
        .bind(&p.website)
        .bind(&p.linkedin_profile)
        .bind(&p.twitter_profile)
        .bind(p.date_of_birth)
        .bind(&p.alternate_phone)
        .bind(p.is_complete())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_error(e, &user.email, user.phone.as_deref()))?;

        info!("User {} created", row.id);
        row.try_into()
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let p = &user.profile;
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            UPDATE users SET
                username = $2, email = $3, phone = $4, password_hash = $5,
                first_name = $6, last_name = $7, full_name = $8, role = $9,
                tenant_id = $10, is_active = $11, is_superuser = $12,
                application_status = $13, company_name = $14, designation = $15,
                industry = $16, experience_years = $17, address_line1 = $18,
                address_line2 = $19, city = $20, state = $21, country = $22,
                pincode = $23, website = $24, linkedin_profile = $25,
                twitter_profile = $26, date_of_birth = $27, alternate_phone = $28,
                profile_completed = $29, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.tenant_id)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.application_status.as_str())
        .bind(&p.company_name)
        .bind(&p.designation)
        .bind(&p.industry)
        .bind(p.experience_years)
        .bind(&p.address_line1)
        .bind(&p.address_line2)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.country)
        .bind(&p.pincode)
        .bind(&p.website)
        .bind(&p.linkedin_profile)
        .bind(&p.twitter_profile)
        .bind(p.date_of_birth)
        .bind(&p.alternate_phone)
        .bind(user.profile_completed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_error(e, &user.email, user.phone.as_deref()))?;

        row.try_into()
    }

    async fn list_pending(&self) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM users
            WHERE role = 'admin' AND NOT is_superuser AND application_status = 'pending'
            ORDER BY created_at DESC
            "#,
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing pending users"))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count_merchants(&self) -> Result<(i64, i64), DomainError> {
        sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE application_status = 'approved')
            FROM users
            WHERE role = 'admin' AND NOT is_superuser
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("counting merchants"))
    }

    async fn set_tenant(&self, user_id: i64, tenant_id: Option<i64>) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET tenant_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("attaching user to tenant"))?;
        Ok(())
    }

    async fn clear_tenant(&self, tenant_id: i64) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET tenant_id = NULL, updated_at = NOW() WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("detaching users from tenant"))?;
        Ok(())
    }
}
