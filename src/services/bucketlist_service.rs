//! Bucketlist repository: CRUD, uniqueness, search, and pagination over a
//! user's collections.
//!
//! Every lookup is owner-scoped; a bucketlist belonging to someone else is
//! indistinguishable from one that does not exist. The `normalized_name`
//! uniqueness constraint is global across all owners — only the update path
//! probes it per-owner and reports a clean duplicate.

use crate::{
    models::bucketlist::Bucketlist,
    services::{ListParams, Listing, Page, is_unique_violation, normalize_name},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

const COLUMNS: &str =
    "id, name, normalized_name, description, owner, date_created, date_modified";

#[derive(Debug, Error)]
pub enum BucketlistError {
    #[error("bucketlist not found")]
    NotFound,
    #[error("name `{0}` already exists")]
    DuplicateName(String),
    /// Storage-level uniqueness violation not distinguished on this path.
    #[error("{0}")]
    Constraint(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type BucketlistResult<T> = Result<T, BucketlistError>;

#[derive(Clone)]
pub struct BucketlistService {
    db: Arc<SqlitePool>,
}

impl BucketlistService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Fetch one bucketlist scoped by owner. `NotFound` covers both a
    /// missing row and a row owned by someone else.
    pub async fn get(&self, owner: Uuid, id: Uuid) -> BucketlistResult<Bucketlist> {
        sqlx::query_as::<_, Bucketlist>(&format!(
            "SELECT {COLUMNS} FROM bucketlists WHERE id = ? AND owner = ?"
        ))
        .bind(id)
        .bind(owner)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => BucketlistError::NotFound,
            other => BucketlistError::Sqlx(other),
        })
    }

    /// Insert a new bucketlist.
    ///
    /// There is no duplicate pre-check here: the global unique constraint on
    /// `normalized_name` is the arbiter, and a violation surfaces as a
    /// generic constraint failure.
    pub async fn create(
        &self,
        owner: Uuid,
        name: &str,
        description: &str,
    ) -> BucketlistResult<Bucketlist> {
        let bucketlist = Bucketlist {
            id: Uuid::new_v4(),
            name: name.to_string(),
            normalized_name: normalize_name(name),
            description: description.to_string(),
            owner,
            date_created: Utc::now(),
            date_modified: None,
        };

        match sqlx::query(
            "INSERT INTO bucketlists
                 (id, name, normalized_name, description, owner, date_created, date_modified)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(bucketlist.id)
        .bind(&bucketlist.name)
        .bind(&bucketlist.normalized_name)
        .bind(&bucketlist.description)
        .bind(bucketlist.owner)
        .bind(bucketlist.date_created)
        .bind(bucketlist.date_modified)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(bucketlist),
            Err(err) if is_unique_violation(&err) => {
                Err(BucketlistError::Constraint(err.to_string()))
            }
            Err(err) => Err(BucketlistError::Sqlx(err)),
        }
    }

    /// Rename and/or redescribe a bucketlist.
    ///
    /// A changed name is probed against the owner's existing normalized names
    /// first; the probe does not exclude the row being updated, so renaming
    /// only the casing of a name conflicts with itself. Each field is applied
    /// only if it differs, and `date_modified` is stamped on every success.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        name: &str,
        description: &str,
    ) -> BucketlistResult<Bucketlist> {
        let mut bucketlist = self.get(owner, id).await?;

        if bucketlist.name != name {
            let normalized = normalize_name(name);
            let duplicates: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bucketlists WHERE normalized_name = ? AND owner = ?",
            )
            .bind(&normalized)
            .bind(owner)
            .fetch_one(&*self.db)
            .await?;
            if duplicates > 0 {
                return Err(BucketlistError::DuplicateName(name.to_string()));
            }
            bucketlist.name = name.to_string();
            bucketlist.normalized_name = normalized;
        }
        if bucketlist.description != description {
            bucketlist.description = description.to_string();
        }
        bucketlist.date_modified = Some(Utc::now());

        match sqlx::query(
            "UPDATE bucketlists
             SET name = ?, normalized_name = ?, description = ?, date_modified = ?
             WHERE id = ? AND owner = ?",
        )
        .bind(&bucketlist.name)
        .bind(&bucketlist.normalized_name)
        .bind(&bucketlist.description)
        .bind(bucketlist.date_modified)
        .bind(id)
        .bind(owner)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(bucketlist),
            Err(err) if is_unique_violation(&err) => {
                Err(BucketlistError::Constraint(err.to_string()))
            }
            Err(err) => Err(BucketlistError::Sqlx(err)),
        }
    }

    /// Delete a bucketlist; its items go with it via the cascade.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> BucketlistResult<()> {
        let result = sqlx::query("DELETE FROM bucketlists WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BucketlistError::NotFound);
        }
        Ok(())
    }

    /// List an owner's bucketlists.
    ///
    /// Parameter combinations resolve in strict precedence order:
    /// query+limit+page (paginated, filtered), limit+page (paginated),
    /// limit (first `limit` rows, no page metadata), query (all matches),
    /// nothing (everything). A query supplied alongside a bare limit is
    /// ignored, matching that precedence.
    pub async fn list(
        &self,
        owner: Uuid,
        params: ListParams,
    ) -> BucketlistResult<Listing<Bucketlist>> {
        let ListParams { query, limit, page } = params;
        match (query, limit, page) {
            (query, Some(limit), Some(page)) => {
                self.paginate(owner, query.as_deref(), limit.max(1), page.max(1))
                    .await
            }
            (_, Some(limit), None) => {
                let rows = self
                    .select(owner, None, Some(limit.max(1)), None)
                    .await?;
                Ok(Listing::All(rows))
            }
            (Some(query), None, _) => {
                let rows = self.select(owner, Some(&query), None, None).await?;
                Ok(Listing::All(rows))
            }
            (None, None, _) => {
                let rows = self.select(owner, None, None, None).await?;
                Ok(Listing::All(rows))
            }
        }
    }

    async fn paginate(
        &self,
        owner: Uuid,
        query: Option<&str>,
        limit: u32,
        page: u32,
    ) -> BucketlistResult<Listing<Bucketlist>> {
        let total = self.count(owner, query).await?;
        let offset = i64::from(page - 1) * i64::from(limit);
        let rows = self.select(owner, query, Some(limit), Some(offset)).await?;
        Ok(Listing::Page(Page::assemble(rows, total, page, limit)))
    }

    async fn count(&self, owner: Uuid, query: Option<&str>) -> BucketlistResult<i64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM bucketlists WHERE owner = ");
        builder.push_bind(owner);
        if let Some(query) = query {
            builder.push(" AND name LIKE ");
            builder.push_bind(format!("%{query}%"));
        }
        let total: i64 = builder.build_query_scalar().fetch_one(&*self.db).await?;
        Ok(total)
    }

    async fn select(
        &self,
        owner: Uuid,
        query: Option<&str>,
        limit: Option<u32>,
        offset: Option<i64>,
    ) -> BucketlistResult<Vec<Bucketlist>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {COLUMNS} FROM bucketlists WHERE owner = "
        ));
        builder.push_bind(owner);
        if let Some(query) = query {
            builder.push(" AND name LIKE ");
            builder.push_bind(format!("%{query}%"));
        }
        builder.push(" ORDER BY date_created ASC, id ASC");
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(limit));
        }
        if let Some(offset) = offset {
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        }
        let rows: Vec<Bucketlist> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows)
    }
}
