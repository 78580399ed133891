use crate::domain::repository::TagRepository;
use crate::domain::types::{CatalogSearch, Tag};
use crate::error::KitchenServiceError;

pub struct SearchTagsUseCase<T: TagRepository> {
    pub repo: T,
}

impl<T: TagRepository> SearchTagsUseCase<T> {
    pub async fn execute(&self, search: CatalogSearch) -> Result<Vec<Tag>, KitchenServiceError> {
        self.repo.search(search.q.as_deref(), search.limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::usecase::catalog::{DEFAULT_CATALOG_LIMIT, catalog_search};

    struct MockTagRepo {
        seen: Mutex<Vec<(Option<String>, u64)>>,
    }

    impl TagRepository for MockTagRepo {
        async fn search(
            &self,
            q: Option<&str>,
            limit: u64,
        ) -> Result<Vec<Tag>, KitchenServiceError> {
            self.seen
                .lock()
                .unwrap()
                .push((q.map(str::to_owned), limit));
            Ok(vec![Tag {
                id: 1,
                slug: "dinner".into(),
                name: "Dinner".into(),
            }])
        }
    }

    #[tokio::test]
    async fn should_pass_normalized_query_and_default_limit() {
        let usecase = SearchTagsUseCase {
            repo: MockTagRepo {
                seen: Mutex::new(vec![]),
            },
        };
        let search = catalog_search(Some(" DIN "), None, DEFAULT_CATALOG_LIMIT, false).unwrap();
        let tags = usecase.execute(search).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(
            *usecase.repo.seen.lock().unwrap(),
            vec![(Some("din".to_owned()), 50)]
        );
    }
}
