use crate::{
    core::{
        model::file::{File, FileInsert},
        repo::file::{FileQuery, FileRepo},
    },
    error::StowageError,
    map_err,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, name, extension, size, category, owner_id, account_id, shared_with, blob_id, created_at, updated_at";

#[async_trait::async_trait]
impl FileRepo for PgPool {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<File>, StowageError> {
        let file = map_err!(
            sqlx::query_as::<_, SelectFile>(&format!("SELECT {COLUMNS} FROM files WHERE id = $1"))
                .bind(id)
                .fetch_optional(self)
                .await
        );
        file.map(File::try_from).transpose()
    }

    async fn list(&self, params: FileQuery<'_>) -> Result<Vec<File>, StowageError> {
        let FileQuery {
            user_id,
            email,
            categories,
            search,
            sort,
            limit,
        } = params;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM files"));

        query
            .push(" WHERE (owner_id = ")
            .push_bind(user_id)
            .push(" OR ")
            .push_bind(email)
            .push(" = ANY(shared_with))");

        if !categories.is_empty() {
            let categories = categories
                .iter()
                .map(|c| c.as_str().to_string())
                .collect::<Vec<_>>();
            query
                .push(" AND category = ANY(")
                .push_bind(categories)
                .push(")");
        }

        if let Some(search) = search {
            query
                .push(" AND strpos(lower(name), lower(")
                .push_bind(search)
                .push(")) > 0");
        }

        // Sort columns come from a closed set, never from input
        query.push(format!(
            " ORDER BY {} {}, id {}",
            sort.field.column(),
            sort.direction.keyword(),
            sort.direction.keyword(),
        ));

        if let Some(limit) = limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let files: Vec<SelectFile> = map_err!(query.build_query_as().fetch_all(self).await);

        files.into_iter().map(File::try_from).collect()
    }

    async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<File>, StowageError> {
        let files = map_err!(
            sqlx::query_as::<_, SelectFile>(&format!(
                "SELECT {COLUMNS} FROM files WHERE owner_id = $1"
            ))
            .bind(owner_id)
            .fetch_all(self)
            .await
        );
        files.into_iter().map(File::try_from).collect()
    }

    async fn insert(&self, file: FileInsert<'_>) -> Result<File, StowageError> {
        let FileInsert {
            id,
            name,
            extension,
            size,
            category,
            owner_id,
            account_id,
            blob_id,
        } = file;

        let file = map_err!(
            sqlx::query_as::<_, SelectFile>(&format!(
                "INSERT INTO files(id, name, extension, size, category, owner_id, account_id, blob_id)
                 VALUES($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING {COLUMNS}"
            ))
            .bind(id)
            .bind(name)
            .bind(extension)
            .bind(size)
            .bind(category.as_str())
            .bind(owner_id)
            .bind(account_id)
            .bind(blob_id)
            .fetch_one(self)
            .await
        );

        File::try_from(file)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<File>, StowageError> {
        let file = map_err!(
            sqlx::query_as::<_, SelectFile>(&format!(
                "UPDATE files SET name = $1, updated_at = NOW() WHERE id = $2 RETURNING {COLUMNS}"
            ))
            .bind(name)
            .bind(id)
            .fetch_optional(self)
            .await
        );
        file.map(File::try_from).transpose()
    }

    async fn update_shared_with(
        &self,
        id: Uuid,
        emails: &[String],
    ) -> Result<Option<File>, StowageError> {
        let file = map_err!(
            sqlx::query_as::<_, SelectFile>(&format!(
                "UPDATE files SET shared_with = $1, updated_at = NOW() WHERE id = $2 RETURNING {COLUMNS}"
            ))
            .bind(emails)
            .bind(id)
            .fetch_optional(self)
            .await
        );
        file.map(File::try_from).transpose()
    }

    async fn remove_by_id(&self, id: Uuid) -> Result<u64, StowageError> {
        let result = map_err!(
            sqlx::query("DELETE FROM files WHERE id = $1")
                .bind(id)
                .execute(self)
                .await
        );
        Ok(result.rows_affected())
    }
}

/// Row as stored, the category is kept as text.
#[derive(Debug, FromRow)]
struct SelectFile {
    id: Uuid,
    name: String,
    extension: String,
    size: i64,
    category: String,
    owner_id: Uuid,
    account_id: Uuid,
    shared_with: Vec<String>,
    blob_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SelectFile> for File {
    type Error = StowageError;

    fn try_from(row: SelectFile) -> Result<Self, Self::Error> {
        Ok(File {
            category: row.category.parse()?,
            id: row.id,
            name: row.name,
            extension: row.extension,
            size: row.size,
            owner_id: row.owner_id,
            account_id: row.account_id,
            shared_with: row.shared_with,
            blob_id: row.blob_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
#[suitest::suite(pg_file_repo_int)]
mod pg_file_repo_int {
    use crate::{
        app::test::{init_postgres, PostgresContainer},
        core::{
            model::{
                file::{FileCategory, FileInsert, FileSort, SortDirection, SortField},
                user::UserInsert,
            },
            repo::{
                file::{FileQuery, FileRepo},
                user::UserRepo,
            },
        },
    };
    use sqlx::PgPool;
    use suitest::before_all;

    #[before_all]
    async fn setup() -> (PgPool, PostgresContainer) {
        init_postgres().await
    }

    fn query<'a>(user_id: uuid::Uuid, email: &'a str) -> FileQuery<'a> {
        FileQuery {
            user_id,
            email,
            categories: &[],
            search: None,
            sort: FileSort::default(),
            limit: None,
        }
    }

    #[test]
    async fn insert_and_visibility(repo: PgPool) {
        let owner = UserRepo::insert(
            &repo,
            UserInsert::new("Owner One", "owner.one@stowage.test", "avatar"),
        )
        .await
        .unwrap();
        let friend = UserRepo::insert(
            &repo,
            UserInsert::new("Friend One", "friend.one@stowage.test", "avatar"),
        )
        .await
        .unwrap();

        let file = FileRepo::insert(
            &repo,
            FileInsert::new("Report.PDF", 100, owner.id, owner.account_id, "blob-visibility-1"),
        )
        .await
        .unwrap();

        assert_eq!("pdf", file.extension);
        assert_eq!(FileCategory::Document, file.category);
        assert!(file.shared_with.is_empty());

        let fetched = FileRepo::get_by_id(&repo, file.id).await.unwrap().unwrap();
        assert_eq!(file.id, fetched.id);

        let owned = repo.list(query(owner.id, &owner.email)).await.unwrap();
        assert_eq!(1, owned.len());

        let visible = repo.list(query(friend.id, &friend.email)).await.unwrap();
        assert!(visible.is_empty());

        let emails = vec![friend.email.clone()];
        let shared = repo
            .update_shared_with(file.id, &emails)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(emails, shared.shared_with);

        let visible = repo.list(query(friend.id, &friend.email)).await.unwrap();
        assert_eq!(1, visible.len());

        // Sharing does not count as ownership
        let owned = repo.list_owned(friend.id).await.unwrap();
        assert!(owned.is_empty());

        let renamed = repo
            .update_name(file.id, "Summary.pdf")
            .await
            .unwrap()
            .unwrap();
        assert_eq!("Summary.pdf", renamed.name);
        assert_eq!(FileCategory::Document, renamed.category);

        assert_eq!(1, repo.remove_by_id(file.id).await.unwrap());
        assert_eq!(0, repo.remove_by_id(file.id).await.unwrap());
        assert!(FileRepo::get_by_id(&repo, file.id).await.unwrap().is_none());
    }

    #[test]
    async fn filter_sort_and_limit(repo: PgPool) {
        let owner = UserRepo::insert(
            &repo,
            UserInsert::new("Owner Two", "owner.two@stowage.test", "avatar"),
        )
        .await
        .unwrap();

        for (name, size, blob) in [
            ("beta.png", 300, "blob-filter-1"),
            ("alpha.pdf", 100, "blob-filter-2"),
            ("gamma.mp3", 200, "blob-filter-3"),
        ] {
            FileRepo::insert(
                &repo,
                FileInsert::new(name, size, owner.id, owner.account_id, blob),
            )
            .await
            .unwrap();
        }

        let mut params = query(owner.id, &owner.email);
        params.sort = FileSort::new(SortField::Name, SortDirection::Asc);
        let names = repo
            .list(params)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect::<Vec<_>>();
        assert_eq!(vec!["alpha.pdf", "beta.png", "gamma.mp3"], names);

        let mut params = query(owner.id, &owner.email);
        params.sort = FileSort::new(SortField::Size, SortDirection::Desc);
        params.limit = Some(2);
        let sizes = repo
            .list(params)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.size)
            .collect::<Vec<_>>();
        assert_eq!(vec![300, 200], sizes);

        let categories = [FileCategory::Image, FileCategory::Audio];
        let mut params = query(owner.id, &owner.email);
        params.categories = &categories;
        assert_eq!(2, repo.list(params).await.unwrap().len());

        let mut params = query(owner.id, &owner.email);
        params.search = Some("ALP");
        let found = repo.list(params).await.unwrap();
        assert_eq!(1, found.len());
        assert_eq!("alpha.pdf", found[0].name);
    }
}
