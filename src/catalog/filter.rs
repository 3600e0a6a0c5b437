use crate::catalog::{Catalog, CatalogEntry};
use crate::models::progress::ProgressReporter;

/// `(name, description, tags, credit, added, url)`
pub type CatalogRow<'a> = (&'a str, &'a str, &'a [String], &'a str, &'a str, &'a str);

/// Predicate over catalog entries
pub type EntryPredicate<'p> = dyn Fn(&CatalogEntry) -> bool + 'p;

/// Tag and free-text queries over a loaded catalog
pub struct CatalogFilter<'a> {
    catalog: &'a Catalog,
    progress: Option<&'a dyn ProgressReporter>,
}

impl<'a> CatalogFilter<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            progress: None,
        }
    }

    /// Report a checkpoint each time the table is built
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Rows for every entry satisfying all `predicates`, in catalog order
    #[must_use]
    pub fn load_table(&self, predicates: &[&EntryPredicate<'_>]) -> Vec<CatalogRow<'a>> {
        if let Some(progress) = self.progress {
            progress.report("[~] Loading public models ...", 0.5);
        }

        self.catalog
            .voice_models
            .iter()
            .filter(|entry| predicates.iter().all(|predicate| predicate(*entry)))
            .map(CatalogEntry::as_row)
            .collect()
    }

    /// Known tag names in catalog order
    #[must_use]
    pub fn list_tags(&self) -> Vec<&'a str> {
        self.catalog.tag_names()
    }

    /// Every row together with the known tags
    #[must_use]
    pub fn load_table_with_tags(&self) -> (Vec<CatalogRow<'a>>, Vec<&'a str>) {
        (self.load_table(&[]), self.list_tags())
    }

    /// Entries carrying all of `tags` whose text contains `query` (case-insensitive).
    ///
    /// An empty `tags` or `query` does not constrain the result.
    #[must_use]
    pub fn filter_table<S: AsRef<str>>(
        &self,
        tags: &[S],
        query: &str,
    ) -> (Vec<CatalogRow<'a>>, Vec<&'a str>) {
        let needle = query.to_lowercase();

        let tags_predicate =
            |entry: &CatalogEntry| tags.iter().all(|tag| entry.has_tag(tag.as_ref()));
        let query_predicate = |entry: &CatalogEntry| searchable_text(entry).contains(&needle);

        let mut predicates: Vec<&EntryPredicate<'_>> = Vec::with_capacity(2);
        if !tags.is_empty() {
            predicates.push(&tags_predicate);
        }
        if !query.is_empty() {
            predicates.push(&query_predicate);
        }

        (self.load_table(&predicates), self.list_tags())
    }
}

/// Lowercased "name description tags credit added" used for text search
fn searchable_text(entry: &CatalogEntry) -> String {
    format!(
        "{} {} {} {} {}",
        entry.name,
        entry.description,
        entry.tags.join(" "),
        entry.credit,
        entry.added
    )
    .to_lowercase()
}
