//! Item repository: CRUD, uniqueness, search, and pagination over the items
//! of one bucketlist.
//!
//! Every operation first resolves the parent bucketlist scoped by owner, so
//! a foreign or missing list reads as not-found before any item is touched.
//! As with bucketlists, the `normalized_name` constraint is global while the
//! read-path duplicate probes are scoped to the parent list.

use crate::{
    models::{bucketlist::Bucketlist, item::Item},
    services::{ListParams, Listing, Page, is_unique_violation, normalize_name},
};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

const COLUMNS: &str = "id, name, normalized_name, description, bucketlist_id";

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("bucketlist not found")]
    BucketlistNotFound,
    #[error("item not found")]
    ItemNotFound,
    #[error("item `{0}` already exists in this bucketlist")]
    DuplicateItem(String),
    /// Storage-level uniqueness violation not distinguished on this path.
    #[error("{0}")]
    Constraint(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ItemResult<T> = Result<T, ItemError>;

#[derive(Clone)]
pub struct ItemService {
    db: Arc<SqlitePool>,
}

impl ItemService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Resolve the parent list, owner-scoped. Absent and foreign lists are
    /// both `BucketlistNotFound`.
    async fn fetch_owned_bucketlist(
        &self,
        owner: Uuid,
        bucketlist_id: Uuid,
    ) -> ItemResult<Bucketlist> {
        sqlx::query_as::<_, Bucketlist>(
            "SELECT id, name, normalized_name, description, owner, date_created, date_modified
             FROM bucketlists WHERE id = ? AND owner = ?",
        )
        .bind(bucketlist_id)
        .bind(owner)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ItemError::BucketlistNotFound,
            other => ItemError::Sqlx(other),
        })
    }

    async fn fetch_item(&self, bucketlist_id: Uuid, item_id: Uuid) -> ItemResult<Item> {
        sqlx::query_as::<_, Item>(&format!(
            "SELECT {COLUMNS} FROM items WHERE id = ? AND bucketlist_id = ?"
        ))
        .bind(item_id)
        .bind(bucketlist_id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ItemError::ItemNotFound,
            other => ItemError::Sqlx(other),
        })
    }

    async fn duplicate_in_list(&self, bucketlist_id: Uuid, normalized: &str) -> ItemResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE normalized_name = ? AND bucketlist_id = ?",
        )
        .bind(normalized)
        .bind(bucketlist_id)
        .fetch_one(&*self.db)
        .await?;
        Ok(count > 0)
    }

    /// Add an item to a bucketlist the caller owns.
    ///
    /// A same-named item in this list is reported as `DuplicateItem`; the
    /// global constraint can still fire against another list's item and then
    /// surfaces as a generic constraint failure.
    pub async fn create(
        &self,
        owner: Uuid,
        bucketlist_id: Uuid,
        name: &str,
        description: &str,
    ) -> ItemResult<Item> {
        self.fetch_owned_bucketlist(owner, bucketlist_id).await?;

        let normalized = normalize_name(name);
        if self.duplicate_in_list(bucketlist_id, &normalized).await? {
            return Err(ItemError::DuplicateItem(name.to_string()));
        }

        let item = Item {
            id: Uuid::new_v4(),
            name: name.to_string(),
            normalized_name: normalized,
            description: description.to_string(),
            bucketlist_id,
        };

        match sqlx::query(
            "INSERT INTO items (id, name, normalized_name, description, bucketlist_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.normalized_name)
        .bind(&item.description)
        .bind(item.bucketlist_id)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(item),
            Err(err) if is_unique_violation(&err) => Err(ItemError::Constraint(err.to_string())),
            Err(err) => Err(ItemError::Sqlx(err)),
        }
    }

    /// Rename and/or redescribe an item, mirroring the bucketlist update:
    /// per-list duplicate probe that does not exclude the item itself, fields
    /// applied independently. Items carry no modification timestamp.
    pub async fn update(
        &self,
        owner: Uuid,
        bucketlist_id: Uuid,
        item_id: Uuid,
        name: &str,
        description: &str,
    ) -> ItemResult<Item> {
        self.fetch_owned_bucketlist(owner, bucketlist_id).await?;
        let mut item = self.fetch_item(bucketlist_id, item_id).await?;

        if item.name != name {
            let normalized = normalize_name(name);
            if self.duplicate_in_list(bucketlist_id, &normalized).await? {
                return Err(ItemError::DuplicateItem(name.to_string()));
            }
            item.name = name.to_string();
            item.normalized_name = normalized;
        }
        if item.description != description {
            item.description = description.to_string();
        }

        match sqlx::query(
            "UPDATE items SET name = ?, normalized_name = ?, description = ?
             WHERE id = ? AND bucketlist_id = ?",
        )
        .bind(&item.name)
        .bind(&item.normalized_name)
        .bind(&item.description)
        .bind(item_id)
        .bind(bucketlist_id)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(item),
            Err(err) if is_unique_violation(&err) => Err(ItemError::Constraint(err.to_string())),
            Err(err) => Err(ItemError::Sqlx(err)),
        }
    }

    /// Remove an item from a bucketlist the caller owns.
    pub async fn delete(&self, owner: Uuid, bucketlist_id: Uuid, item_id: Uuid) -> ItemResult<()> {
        self.fetch_owned_bucketlist(owner, bucketlist_id).await?;
        let result = sqlx::query("DELETE FROM items WHERE id = ? AND bucketlist_id = ?")
            .bind(item_id)
            .bind(bucketlist_id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ItemError::ItemNotFound);
        }
        Ok(())
    }

    /// List a bucketlist's items with the same precedence ladder as the
    /// bucketlist listing. The parent list is returned alongside so the
    /// paginated response can embed it.
    pub async fn list(
        &self,
        owner: Uuid,
        bucketlist_id: Uuid,
        params: ListParams,
    ) -> ItemResult<(Bucketlist, Listing<Item>)> {
        let bucketlist = self.fetch_owned_bucketlist(owner, bucketlist_id).await?;

        let ListParams { query, limit, page } = params;
        let listing = match (query, limit, page) {
            (query, Some(limit), Some(page)) => {
                self.paginate(bucketlist_id, query.as_deref(), limit.max(1), page.max(1))
                    .await?
            }
            (_, Some(limit), None) => Listing::All(
                self.select(bucketlist_id, None, Some(limit.max(1)), None)
                    .await?,
            ),
            (Some(query), None, _) => {
                Listing::All(self.select(bucketlist_id, Some(&query), None, None).await?)
            }
            (None, None, _) => Listing::All(self.select(bucketlist_id, None, None, None).await?),
        };
        Ok((bucketlist, listing))
    }

    async fn paginate(
        &self,
        bucketlist_id: Uuid,
        query: Option<&str>,
        limit: u32,
        page: u32,
    ) -> ItemResult<Listing<Item>> {
        let total = self.count(bucketlist_id, query).await?;
        let offset = i64::from(page - 1) * i64::from(limit);
        let rows = self
            .select(bucketlist_id, query, Some(limit), Some(offset))
            .await?;
        Ok(Listing::Page(Page::assemble(rows, total, page, limit)))
    }

    async fn count(&self, bucketlist_id: Uuid, query: Option<&str>) -> ItemResult<i64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM items WHERE bucketlist_id = ");
        builder.push_bind(bucketlist_id);
        if let Some(query) = query {
            builder.push(" AND name LIKE ");
            builder.push_bind(format!("%{query}%"));
        }
        let total: i64 = builder.build_query_scalar().fetch_one(&*self.db).await?;
        Ok(total)
    }

    async fn select(
        &self,
        bucketlist_id: Uuid,
        query: Option<&str>,
        limit: Option<u32>,
        offset: Option<i64>,
    ) -> ItemResult<Vec<Item>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {COLUMNS} FROM items WHERE bucketlist_id = "
        ));
        builder.push_bind(bucketlist_id);
        if let Some(query) = query {
            builder.push(" AND name LIKE ");
            builder.push_bind(format!("%{query}%"));
        }
        builder.push(" ORDER BY rowid ASC");
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(limit));
        }
        if let Some(offset) = offset {
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        }
        let rows: Vec<Item> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::tests::test_pool,
        services::bucketlist_service::{BucketlistService, tests::seeded_owner},
    };

    async fn seeded_list(db: &Arc<SqlitePool>, owner: Uuid, name: &str) -> Uuid {
        BucketlistService::new(db.clone())
            .create(owner, name, "seeded")
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_requires_an_owned_parent() {
        let db = test_pool().await;
        let jane = seeded_owner(&db, "jane").await;
        let joan = seeded_owner(&db, "joan").await;
        let list = seeded_list(&db, jane, "Travel").await;
        let svc = ItemService::new(db);

        assert!(matches!(
            svc.create(joan, list, "Skydive", "someday").await,
            Err(ItemError::BucketlistNotFound)
        ));
        assert!(matches!(
            svc.create(jane, Uuid::new_v4(), "Skydive", "someday").await,
            Err(ItemError::BucketlistNotFound)
        ));
        svc.create(jane, list, "Skydive", "someday").await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_in_same_list_is_rejected() {
        let db = test_pool().await;
        let owner = seeded_owner(&db, "jane").await;
        let list = seeded_list(&db, owner, "Travel").await;
        let svc = ItemService::new(db);

        svc.create(owner, list, "See Paris", "x").await.unwrap();
        assert!(matches!(
            svc.create(owner, list, "see  paris", "y").await,
            Err(ItemError::DuplicateItem(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_across_lists_hits_the_global_constraint() {
        let db = test_pool().await;
        let owner = seeded_owner(&db, "jane").await;
        let first = seeded_list(&db, owner, "Travel").await;
        let second = seeded_list(&db, owner, "Someday").await;
        let svc = ItemService::new(db);

        svc.create(owner, first, "See Paris", "x").await.unwrap();
        assert!(matches!(
            svc.create(owner, second, "See Paris", "y").await,
            Err(ItemError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn update_renames_within_the_list() {
        let db = test_pool().await;
        let owner = seeded_owner(&db, "jane").await;
        let list = seeded_list(&db, owner, "Travel").await;
        let svc = ItemService::new(db);

        let item = svc.create(owner, list, "See Paris", "x").await.unwrap();
        let updated = svc
            .update(owner, list, item.id, "See Rome", "y")
            .await
            .unwrap();
        assert_eq!(updated.name, "See Rome");
        assert_eq!(updated.normalized_name, "seerome");
        assert_eq!(updated.description, "y");
    }

    #[tokio::test]
    async fn update_to_colliding_name_is_rejected() {
        let db = test_pool().await;
        let owner = seeded_owner(&db, "jane").await;
        let list = seeded_list(&db, owner, "Travel").await;
        let svc = ItemService::new(db);

        svc.create(owner, list, "See Paris", "x").await.unwrap();
        let other = svc.create(owner, list, "See Rome", "y").await.unwrap();
        assert!(matches!(
            svc.update(owner, list, other.id, "SEE PARIS", "y").await,
            Err(ItemError::DuplicateItem(_))
        ));
        let unchanged = svc.fetch_item(list, other.id).await.unwrap();
        assert_eq!(unchanged.name, "See Rome");
    }

    #[tokio::test]
    async fn item_lookups_are_scoped_to_the_list() {
        let db = test_pool().await;
        let owner = seeded_owner(&db, "jane").await;
        let first = seeded_list(&db, owner, "Travel").await;
        let second = seeded_list(&db, owner, "Someday").await;
        let svc = ItemService::new(db);

        let item = svc.create(owner, first, "See Paris", "x").await.unwrap();
        assert!(matches!(
            svc.delete(owner, second, item.id).await,
            Err(ItemError::ItemNotFound)
        ));
        svc.delete(owner, first, item.id).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_the_list_cascades_to_items() {
        let db = test_pool().await;
        let owner = seeded_owner(&db, "jane").await;
        let list = seeded_list(&db, owner, "Travel").await;
        let svc = ItemService::new(db.clone());

        svc.create(owner, list, "See Paris", "x").await.unwrap();
        svc.create(owner, list, "See Rome", "y").await.unwrap();

        BucketlistService::new(db.clone())
            .delete(owner, list)
            .await
            .unwrap();

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE bucketlist_id = ?")
            .bind(list)
            .fetch_one(&*db)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(matches!(
            svc.list(owner, list, ListParams::default()).await,
            Err(ItemError::BucketlistNotFound)
        ));
    }

    #[tokio::test]
    async fn listing_mirrors_the_precedence_ladder() {
        let db = test_pool().await;
        let owner = seeded_owner(&db, "jane").await;
        let list = seeded_list(&db, owner, "Travel").await;
        let svc = ItemService::new(db);

        svc.create(owner, list, "See Paris", "a").await.unwrap();
        svc.create(owner, list, "See Rome", "b").await.unwrap();
        svc.create(owner, list, "Hike Andes", "c").await.unwrap();

        let (_, bare_limit) = svc
            .list(
                owner,
                list,
                ListParams {
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(bare_limit, Listing::All(rows) if rows.len() == 2));

        let (bucketlist, paged) = svc
            .list(
                owner,
                list,
                ListParams {
                    query: Some("see".into()),
                    limit: Some(1),
                    page: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(bucketlist.id, list);
        match paged {
            Listing::Page(page) => {
                assert_eq!(page.items.len(), 1);
                assert_eq!(page.pages, 2);
                assert!(page.has_next);
            }
            Listing::All(_) => panic!("query+limit+page must paginate"),
        }
    }
}
