use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. Secret-bearing columns are excluded from
/// JSON responses via `skip_serializing`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub location: String,
    pub occupation: Option<String>,
    pub active: bool,
    #[serde(skip_serializing)]
    pub activation_string: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub changed_password_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Friend entry as embedded in user responses: display fields only.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image: String,
    pub location: String,
    pub occupation: Option<String>,
}

const USER_COLUMNS: &str = r#"
    id, first_name, last_name, image, email, password_hash, location,
    occupation, active, activation_string, password_reset_token,
    password_reset_expires, changed_password_at, created_at
"#;

/// Attributes for a new identity. The password arrives here already hashed;
/// hashing is the service layer's step, not the store's.
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub image: String,
    pub email: String,
    pub password_hash: String,
    pub location: String,
    pub occupation: Option<String>,
    pub activation_string: String,
}

impl User {
    pub async fn create(db: &PgPool, new: &NewUser) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (first_name, last_name, image, email, password_hash, location,
                 occupation, activation_string)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.image)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.location)
        .bind(&new.occupation)
        .bind(&new.activation_string)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE email = $1"#
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list(db: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"#
        ))
        .fetch_all(db)
        .await
    }

    /// Flip an unverified account to active, consuming its activation string.
    /// Single statement, so a string can only be spent once.
    pub async fn activate(
        db: &PgPool,
        activation_string: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET active = TRUE, activation_string = NULL
            WHERE activation_string = $1 AND active = FALSE
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(activation_string)
        .fetch_optional(db)
        .await
    }

    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token = $2, password_reset_expires = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn clear_reset_token(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token = NULL, password_reset_expires = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn find_by_reset_token(
        db: &PgPool,
        token_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE password_reset_token = $1"#
        ))
        .bind(token_hash)
        .fetch_optional(db)
        .await
    }

    /// Store a new password hash, close the reset window, and stamp the
    /// change time.
    pub async fn update_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                password_reset_token = NULL,
                password_reset_expires = NULL,
                changed_password_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Returns true when the pair was inserted, false when it already existed.
    pub async fn add_friend(
        db: &PgPool,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, friend_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_friend(
        db: &PgPool,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"DELETE FROM friendships WHERE user_id = $1 AND friend_id = $2"#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn friends_of(db: &PgPool, user_id: Uuid) -> Result<Vec<FriendProfile>, sqlx::Error> {
        sqlx::query_as::<_, FriendProfile>(
            r#"
            SELECT u.id, u.first_name, u.last_name, u.image, u.location, u.occupation
            FROM friendships f
            JOIN users u ON u.id = f.friend_id
            WHERE f.user_id = $1
            ORDER BY u.first_name, u.last_name
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
