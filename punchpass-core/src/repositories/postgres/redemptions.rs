// File: punchpass-core/src/repositories/postgres/redemptions.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use punchpass_common::error::Error;
use punchpass_common::models::{Actor, Page, RedemptionEvent, Ticket};
use punchpass_common::traits::repository_traits::{
    RedemptionLedgerRepository, RedemptionStore, TicketRepository,
};

const TICKET_COLUMNS: &str = "ticket_id, member_id, ticket_type, total_uses, remaining_uses, \
                              expires_at, last_redeemed_at, created_at";

const EVENT_COLUMNS: &str = "event_id, ticket_id, member_id, store_id, redeemed_by_kind, \
                             redeemed_by_id, redeemed_at";

/// Postgres backend for tickets and the redemption ledger. One struct
/// over one pool so the consume-one-use step can span both tables in a
/// single transaction.
pub struct PostgresRedemptionStore {
    pub pool: Pool<Postgres>,
}

impl PostgresRedemptionStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn ticket_from_row(r: &PgRow) -> Result<Ticket, Error> {
    Ok(Ticket {
        ticket_id: r.try_get("ticket_id")?,
        member_id: r.try_get("member_id")?,
        ticket_type: r.try_get("ticket_type")?,
        total_uses: r.try_get("total_uses")?,
        remaining_uses: r.try_get("remaining_uses")?,
        expires_at: r.try_get("expires_at")?,
        last_redeemed_at: r.try_get("last_redeemed_at")?,
        created_at: r.try_get("created_at")?,
    })
}

fn event_from_row(r: &PgRow) -> Result<RedemptionEvent, Error> {
    let store_id: Uuid = r.try_get("store_id")?;
    let kind: String = r.try_get("redeemed_by_kind")?;
    let actor_id: Uuid = r.try_get("redeemed_by_id")?;
    let redeemed_by = match kind.as_str() {
        "member" => Actor::Member {
            member_id: actor_id,
        },
        "staff" => Actor::Staff {
            staff_id: actor_id,
            store_id,
        },
        other => {
            return Err(Error::Parse(format!(
                "unknown redeemed_by_kind '{other}' in ledger row"
            )));
        }
    };
    Ok(RedemptionEvent {
        event_id: r.try_get("event_id")?,
        ticket_id: r.try_get("ticket_id")?,
        member_id: r.try_get("member_id")?,
        redeemed_by,
        store_id,
        redeemed_at: r.try_get("redeemed_at")?,
    })
}

#[async_trait]
impl TicketRepository for PostgresRedemptionStore {
    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO tickets (
                ticket_id,
                member_id,
                ticket_type,
                total_uses,
                remaining_uses,
                expires_at,
                last_redeemed_at,
                created_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(ticket.ticket_id)
        .bind(ticket.member_id)
        .bind(&ticket.ticket_type)
        .bind(ticket.total_uses)
        .bind(ticket.remaining_uses)
        .bind(ticket.expires_at)
        .bind(ticket.last_redeemed_at)
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, Error> {
        let row_opt = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = $1"
        ))
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(r) => Ok(Some(ticket_from_row(&r)?)),
            None => Ok(None),
        }
    }

    async fn list_tickets_for_member(&self, member_id: Uuid) -> Result<Vec<Ticket>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE member_id = $1 ORDER BY created_at DESC"
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        let mut list = Vec::new();
        for r in rows {
            list.push(ticket_from_row(&r)?);
        }
        Ok(list)
    }

    async fn decrement_and_stamp(
        &self,
        ticket_id: Uuid,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Option<Ticket>, Error> {
        // Single guarded statement: the eligibility predicate and the
        // decrement commit as one atomic unit, so the read-check-write
        // race cannot lose a unit or go below zero.
        let cutoff = now - cooldown;
        let row_opt = sqlx::query(&format!(
            r#"
            UPDATE tickets
            SET remaining_uses = remaining_uses - 1,
                last_redeemed_at = $2
            WHERE ticket_id = $1
              AND remaining_uses > 0
              AND expires_at > $2
              AND (last_redeemed_at IS NULL OR last_redeemed_at <= $3)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket_id)
        .bind(now)
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(r) => Ok(Some(ticket_from_row(&r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RedemptionLedgerRepository for PostgresRedemptionStore {
    async fn append_event(&self, event: &RedemptionEvent) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO redemption_events (
                event_id, ticket_id, member_id, store_id,
                redeemed_by_kind, redeemed_by_id, redeemed_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(event.event_id)
        .bind(event.ticket_id)
        .bind(event.member_id)
        .bind(event.store_id)
        .bind(event.redeemed_by.kind())
        .bind(event.redeemed_by.actor_id())
        .bind(event.redeemed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_member(
        &self,
        member_id: Uuid,
        page: u32,
        per_page: u32,
    ) -> Result<Page<RedemptionEvent>, Error> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM redemption_events WHERE member_id = $1")
                .bind(member_id)
                .fetch_one(&self.pool)
                .await?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);
        let rows = sqlx::query(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM redemption_events
            WHERE member_id = $1
            ORDER BY redeemed_at DESC, event_id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(member_id)
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::new();
        for r in rows {
            items.push(event_from_row(&r)?);
        }
        Ok(Page {
            items,
            page,
            per_page,
            total,
        })
    }

    async fn list_for_store_between(
        &self,
        store_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RedemptionEvent>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM redemption_events
            WHERE store_id = $1
              AND redeemed_at >= $2
              AND redeemed_at < $3
            ORDER BY redeemed_at DESC, event_id DESC
            "#
        ))
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::new();
        for r in rows {
            items.push(event_from_row(&r)?);
        }
        Ok(items)
    }
}

#[async_trait]
impl RedemptionStore for PostgresRedemptionStore {
    async fn redeem_one_use(
        &self,
        ticket_id: Uuid,
        event: &RedemptionEvent,
        cooldown: Duration,
    ) -> Result<Option<Ticket>, Error> {
        let now = event.redeemed_at;
        let cutoff = now - cooldown;

        let mut tx = self.pool.begin().await?;

        let row_opt = sqlx::query(&format!(
            r#"
            UPDATE tickets
            SET remaining_uses = remaining_uses - 1,
                last_redeemed_at = $2
            WHERE ticket_id = $1
              AND remaining_uses > 0
              AND expires_at > $2
              AND (last_redeemed_at IS NULL OR last_redeemed_at <= $3)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket_id)
        .bind(now)
        .bind(cutoff)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row_opt else {
            tx.rollback().await?;
            return Ok(None);
        };
        let ticket = ticket_from_row(&row)?;

        sqlx::query(
            r#"
            INSERT INTO redemption_events (
                event_id, ticket_id, member_id, store_id,
                redeemed_by_kind, redeemed_by_id, redeemed_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(event.event_id)
        .bind(event.ticket_id)
        .bind(event.member_id)
        .bind(event.store_id)
        .bind(event.redeemed_by.kind())
        .bind(event.redeemed_by.actor_id())
        .bind(event.redeemed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(ticket))
    }
}
