use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::dataset::DatasetLoader;
use crate::models::{Category, Tool};
use crate::query::{FilterOptions, SortOption};
use crate::search::filter_and_sort;

/// Browsing state: the loaded dataset plus filters, search text and sort order
///
/// Every setter recomputes the view before returning and publishes it to
/// subscribers, so they only ever see finished results.
pub struct Catalogue {
    tools: Arc<Vec<Tool>>,
    categories: Arc<Vec<Category>>,
    filters: FilterOptions,
    search_query: String,
    sort: SortOption,
    view: watch::Sender<Arc<Vec<Tool>>>,
}

impl Catalogue {
    pub fn new() -> Self {
        let (view, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            tools: Arc::new(Vec::new()),
            categories: Arc::new(Vec::new()),
            filters: FilterOptions::default(),
            search_query: String::new(),
            sort: SortOption::default(),
            view,
        }
    }

    /// Build a catalogue from whatever the loader produces (possibly nothing)
    pub async fn from_loader(loader: &DatasetLoader) -> Self {
        let (tools, categories) =
            futures::future::join(loader.load(), loader.load_categories()).await;

        let mut catalogue = Self::new();
        catalogue.categories = categories;
        catalogue.set_tools(tools);
        catalogue
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Tool>>> {
        self.view.subscribe()
    }

    /// The current filtered and sorted tools
    pub fn view(&self) -> Arc<Vec<Tool>> {
        self.view.borrow().clone()
    }

    pub fn set_tools(&mut self, tools: Arc<Vec<Tool>>) {
        self.tools = tools;
        self.recompute();
    }

    pub fn set_filters(&mut self, filters: FilterOptions) {
        self.filters = filters;
        self.recompute();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.recompute();
    }

    pub fn set_sort_option(&mut self, sort: SortOption) {
        self.sort = sort;
        self.recompute();
    }

    /// Back to no filters, empty search, stars descending
    pub fn clear_filters(&mut self) {
        self.filters = FilterOptions::default();
        self.search_query.clear();
        self.sort = SortOption::default();
        self.recompute();
    }

    pub fn filters(&self) -> &FilterOptions {
        &self.filters
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tool_by_id(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn category_by_id(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Category ids used by at least one tool, sorted
    pub fn available_categories(&self) -> Vec<String> {
        distinct_sorted(self.tools.iter().flat_map(|t| t.categories.iter()))
    }

    pub fn available_platforms(&self) -> Vec<String> {
        distinct_sorted(self.tools.iter().flat_map(|t| t.platforms.iter()))
    }

    pub fn available_licenses(&self) -> Vec<String> {
        distinct_sorted(self.tools.iter().map(|t| &t.license))
    }

    /// Related tools that exist in the dataset; unknown ids are dropped
    pub fn related_tools(&self, tool: &Tool) -> Vec<&Tool> {
        self.resolve_ids(tool.related_tools.as_deref())
    }

    pub fn similar_tools(&self, tool: &Tool) -> Vec<&Tool> {
        self.resolve_ids(tool.similar_tools.as_deref())
    }

    fn resolve_ids(&self, ids: Option<&[String]>) -> Vec<&Tool> {
        let Some(ids) = ids.filter(|ids| !ids.is_empty()) else {
            return Vec::new();
        };
        self.tools.iter().filter(|t| ids.contains(&t.id)).collect()
    }

    fn recompute(&mut self) {
        let view = filter_and_sort(&self.tools, &self.filters, &self.search_query, self.sort);
        debug!("Catalogue view: {} of {} tools", view.len(), self.tools.len());
        self.view.send_replace(Arc::new(view));
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new()
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
