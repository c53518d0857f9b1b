// File: punchpass-core/src/repositories/postgres/members.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::Member;
use punchpass_common::traits::repository_traits::MemberRepository;

pub struct PostgresMemberRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresMemberRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn member_from_row(r: &PgRow) -> Result<Member, Error> {
    Ok(Member {
        member_id: r.try_get("member_id")?,
        display_name: r.try_get("display_name")?,
        card_number: r.try_get("card_number")?,
        phone: r.try_get("phone")?,
        is_active: r.try_get("is_active")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn get_member(&self, member_id: Uuid) -> Result<Option<Member>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT member_id, display_name, card_number, phone, is_active, created_at
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(r) => Ok(Some(member_from_row(&r)?)),
            None => Ok(None),
        }
    }

    async fn find_member_by_card(&self, card_number: &str) -> Result<Option<Member>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT member_id, display_name, card_number, phone, is_active, created_at
            FROM members
            WHERE card_number = $1
            "#,
        )
        .bind(card_number)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(r) => Ok(Some(member_from_row(&r)?)),
            None => Ok(None),
        }
    }
}
