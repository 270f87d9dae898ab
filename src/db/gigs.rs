use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::gigs::{self, CreateGig, GigListQuery, GigStatus};
use crate::models::users;

/// Insert a new gig, starting life as `open` with no assignee.
pub async fn insert_gig(
    db: &DatabaseConnection,
    input: CreateGig,
    owner_id: Uuid,
) -> Result<gigs::Model, DbErr> {
    let new_gig = gigs::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        budget: Set(input.budget),
        status: Set(GigStatus::Open),
        owner_id: Set(owner_id),
        assignee_id: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    new_gig.insert(db).await
}

/// Fetch gigs joined with their owner, optionally filtered by title
/// substring and status, newest first.
pub async fn list_gigs_with_owner(
    db: &DatabaseConnection,
    query: &GigListQuery,
) -> Result<Vec<(gigs::Model, Option<users::Model>)>, DbErr> {
    use sea_orm::sea_query::extension::postgres::PgExpr;

    let mut select = gigs::Entity::find();

    if let Some(search) = query.search.as_deref() {
        let search = search.trim();
        if !search.is_empty() {
            // ILIKE for a case-insensitive title match.
            select = select.filter(Expr::col(gigs::Column::Title).ilike(format!("%{search}%")));
        }
    }
    if let Some(status) = query.status.clone() {
        select = select.filter(gigs::Column::Status.eq(status));
    }

    select
        .find_also_related(users::Entity)
        .order_by_desc(gigs::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a single gig by ID. Generic over the connection so the lifecycle
/// engine can read through a transaction handle.
pub async fn get_gig_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).one(conn).await
}

/// Fetch all gigs posted by one owner, newest first.
pub async fn get_gigs_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<gigs::Model>, DbErr> {
    gigs::Entity::find()
        .filter(gigs::Column::OwnerId.eq(owner_id))
        .order_by_desc(gigs::Column::CreatedAt)
        .all(db)
        .await
}

/// Apply field edits to a gig, but only while it is still `open`.
///
/// The status guard keeps an edit from landing on a gig that a concurrent
/// hire assigned after the caller's read; zero rows affected means exactly
/// that. Callers must pass at least one field.
pub async fn update_gig_fields_if_open(
    db: &DatabaseConnection,
    gig_id: Uuid,
    title: Option<String>,
    description: Option<String>,
    budget: Option<f64>,
) -> Result<u64, DbErr> {
    let mut update = gigs::Entity::update_many()
        .filter(gigs::Column::Id.eq(gig_id))
        .filter(gigs::Column::Status.eq(GigStatus::Open));

    if let Some(title) = title {
        update = update.col_expr(gigs::Column::Title, Expr::value(title));
    }
    if let Some(description) = description {
        update = update.col_expr(gigs::Column::Description, Expr::value(description));
    }
    if let Some(budget) = budget {
        update = update.col_expr(gigs::Column::Budget, Expr::value(budget));
    }

    let result = update.exec(db).await?;
    Ok(result.rows_affected)
}

/// Delete a gig, but only while it is still `open`. Its bids go with it via
/// the FK cascade.
///
/// Same guarded shape as the hire claim: a gig that a concurrent hire
/// assigned between the caller's read and this statement matches zero rows
/// instead of being deleted out from under its hired bidder.
pub async fn delete_gig_if_open(db: &DatabaseConnection, id: Uuid) -> Result<u64, DbErr> {
    let result = gigs::Entity::delete_many()
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Atomically claim an open gig for an assignee.
///
/// The status guard in the WHERE clause is the compare-and-swap that decides
/// a hire race: of two concurrent transactions, only the first to commit
/// sees `rows_affected == 1`, the other matches zero rows.
pub async fn assign_gig_if_open<C: ConnectionTrait>(
    conn: &C,
    gig_id: Uuid,
    assignee_id: Uuid,
) -> Result<u64, DbErr> {
    let result = gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(GigStatus::Assigned))
        .col_expr(gigs::Column::AssigneeId, Expr::value(Some(assignee_id)))
        .filter(gigs::Column::Id.eq(gig_id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gigs::GigListQuery;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn title_search_is_case_insensitive() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(gigs::Model, users::Model)>::new()])
            .into_connection();

        let query = GigListQuery {
            search: Some("Logo".to_string()),
            status: None,
        };
        list_gigs_with_owner(&db, &query).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ILIKE"), "title search must use ILIKE: {log}");
    }

    #[tokio::test]
    async fn gig_delete_carries_the_open_status_guard() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let rows = delete_gig_if_open(&db, Uuid::new_v4()).await.unwrap();
        assert_eq!(rows, 1);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE"), "expected a delete statement: {log}");
        assert!(
            log.contains("status"),
            "delete must be conditional on the open status: {log}"
        );
    }

    #[tokio::test]
    async fn gig_update_carries_the_open_status_guard() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let rows = update_gig_fields_if_open(
            &db,
            Uuid::new_v4(),
            Some("New title".to_string()),
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(rows, 1);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("UPDATE"), "expected an update statement: {log}");
        assert!(
            log.contains("status"),
            "edit must be conditional on the open status: {log}"
        );
    }
}
