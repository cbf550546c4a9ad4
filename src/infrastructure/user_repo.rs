use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, User, UserCredentials};
use crate::schema::{auth_tokens, users};

use super::models::{NewAuthTokenRow, NewUserRow, UserRow};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(&NewUserRow::from(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    fn email_taken(&self, email: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let taken: bool = diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email)),
        ))
        .get_result(&mut conn)?;
        Ok(taken)
    }

    fn phone_taken(&self, phone: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let taken: bool = diesel::select(diesel::dsl::exists(
            users::table.filter(users::phone.eq(phone)),
        ))
        .get_result(&mut conn)?;
        Ok(taken)
    }

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?;

        Ok(row.map(UserCredentials::from))
    }

    fn token_for(&self, user_id: i64, candidate: &str) -> Result<String, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // One token per user: a concurrent login that got there first wins.
            diesel::insert_into(auth_tokens::table)
                .values(&NewAuthTokenRow {
                    key: candidate,
                    user_id,
                })
                .on_conflict(auth_tokens::user_id)
                .do_nothing()
                .execute(conn)?;

            let key = auth_tokens::table
                .filter(auth_tokens::user_id.eq(user_id))
                .select(auth_tokens::key)
                .first::<String>(conn)?;
            Ok(key)
        })
    }

    fn find_by_token(&self, token: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = auth_tokens::table
            .inner_join(users::table)
            .filter(auth_tokens::key.eq(token))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?;

        Ok(row.map(User::from))
    }
}
