//! User Storage
//! Mission: Store and look up user accounts with SQLite
//!
//! The authentication pipeline only ever reads from here (one lookup per
//! request); writes happen in the register and admin flows.

use crate::auth::models::{Account, AccountCredential, Role};
use anyhow::{bail, Context, Result};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{info, warn};

/// Account store with SQLite backend.
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                mobile_number TEXT,
                role TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                email_verified INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.create_default_admin(&conn)?;

        Ok(())
    }

    /// Seed a default admin account on first boot so the system is usable.
    fn create_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'ADMIN'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count == 0 {
            let password_hash =
                hash("admin123", DEFAULT_COST).context("Failed to hash password")?;

            conn.execute(
                "INSERT INTO users (email, password_hash, name, mobile_number, role,
                                    is_active, email_verified, created_at)
                 VALUES (?1, ?2, ?3, NULL, ?4, 1, 1, ?5)",
                params![
                    "admin@meditation-center.local",
                    password_hash,
                    "Administrator",
                    Role::Admin.as_str(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("Failed to insert admin user")?;

            info!("Default admin account created (admin@meditation-center.local / admin123)");
            warn!("CHANGE THE DEFAULT ADMIN PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    /// Find an account by numeric id. This is the lookup the authentication
    /// pipeline performs once per request.
    pub fn find_by_id(&self, user_id: i64) -> Result<Option<Account>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT user_id, email, name, mobile_number, role, is_active, email_verified, created_at
             FROM users WHERE user_id = ?1",
        )?;

        let account = stmt
            .query_row(params![user_id], account_from_row)
            .optional()?;

        Ok(account)
    }

    /// Find an account by email, including its password hash. Login only.
    pub fn find_by_email_with_credential(&self, email: &str) -> Result<Option<AccountCredential>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT user_id, email, name, mobile_number, role, is_active, email_verified,
                    created_at, password_hash
             FROM users WHERE email = ?1",
        )?;

        let found = stmt
            .query_row(params![email], |row| {
                Ok(AccountCredential {
                    account: account_from_row(row)?,
                    password_hash: row.get(8)?,
                })
            })
            .optional()?;

        Ok(found)
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Create an account. The password is bcrypt-hashed here; the plaintext
    /// never touches the database.
    pub fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
        mobile_number: Option<&str>,
        role: Role,
    ) -> Result<Account> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;
        let created_at = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (email, password_hash, name, mobile_number, role,
                                is_active, email_verified, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, 0, ?6)",
            params![email, password_hash, name, mobile_number, role.as_str(), created_at],
        )
        .context("Failed to insert user")?;

        let user_id = conn.last_insert_rowid();

        info!(user_id, role = role.as_str(), "created account");

        Ok(Account {
            user_id,
            email: email.to_string(),
            name: name.to_string(),
            mobile_number: mobile_number.map(str::to_string),
            role,
            is_active: true,
            email_verified: false,
            created_at,
        })
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT user_id, email, name, mobile_number, role, is_active, email_verified, created_at
             FROM users ORDER BY user_id",
        )?;

        let accounts = stmt
            .query_map([], account_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Activate or deactivate an account. Deactivation takes effect on the
    /// next request because the pipeline re-reads account status each time.
    pub fn set_active(&self, user_id: i64, is_active: bool) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "UPDATE users SET is_active = ?1 WHERE user_id = ?2",
            params![is_active as i64, user_id],
        )?;

        if rows == 0 {
            bail!("User not found");
        }

        info!(user_id, is_active, "updated account status");
        Ok(())
    }

    pub fn delete_account(&self, user_id: i64) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;

        if rows == 0 {
            bail!("User not found");
        }

        info!(user_id, "deleted account");
        Ok(())
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let role_str: String = row.get(4)?;
    // An unknown role in storage is data corruption, not a mappable value.
    let role = Role::from_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown role '{}'", role_str).into(),
        )
    })?;

    Ok(Account {
        user_id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        mobile_number: row.get(3)?,
        role,
        is_active: row.get::<_, i64>(5)? != 0,
        email_verified: row.get::<_, i64>(6)? != 0,
        created_at: row.get(7)?,
    })
}
