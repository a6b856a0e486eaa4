//! App market list with category filter and paging

use crate::api::AppQuery;
use crate::models::{App, AppSort};

use super::Session;
use super::state::StateCell;

/// Apps requested per page; a shorter page means the list is exhausted
pub const APP_PAGE_SIZE: u32 = 20;

/// App list screen state
#[derive(Debug, Clone, PartialEq)]
pub struct AppListState {
    pub is_loading: bool,
    pub apps: Vec<App>,
    pub categories: Vec<String>,
    /// `None` shows every category
    pub selected_category: Option<String>,
    pub sort: AppSort,
    pub error: Option<String>,
    pub has_more: bool,
    pub current_page: u32,
}

impl Default for AppListState {
    fn default() -> Self {
        Self {
            is_loading: false,
            apps: Vec::new(),
            categories: Vec::new(),
            selected_category: None,
            sort: AppSort::default(),
            error: None,
            has_more: true,
            current_page: 1,
        }
    }
}

/// App list view-model
#[derive(Debug, Clone)]
pub struct AppListViewModel {
    session: Session,
    state: StateCell<AppListState>,
}

impl AppListViewModel {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: StateCell::new(AppListState::default()),
        }
    }

    pub fn state(&self) -> AppListState {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<AppListState> {
        self.state.subscribe()
    }

    pub async fn load_categories(&self) {
        let result = async { self.session.api()?.app_categories().await }.await;
        match result {
            Ok(categories) => self.state.update(|s| s.categories = categories),
            Err(e) => {
                tracing::warn!("Failed to load app categories: {}", e);
                self.state.update(|s| s.error = Some(e.user_message()));
            }
        }
    }

    /// Load the first page, or append the next one when `load_more` is set.
    ///
    /// Does nothing while another load is running, or when asked for more
    /// after the last page.
    pub async fn load_apps(&self, load_more: bool) {
        let started = self.state.try_update(|s| {
            if s.is_loading || (load_more && !s.has_more) {
                return false;
            }
            s.is_loading = true;
            s.error = None;
            true
        });
        if !started {
            tracing::debug!("App list load skipped");
            return;
        }

        let snapshot = self.state.get();
        let page = if load_more {
            snapshot.current_page + 1
        } else {
            1
        };
        let query = AppQuery {
            category: snapshot.selected_category,
            sort: snapshot.sort,
            page,
            page_size: APP_PAGE_SIZE,
        };

        let result = async { self.session.api()?.list_apps(&query).await }.await;
        match result {
            Ok(result) => self.state.update(|s| {
                let fetched = result.list;
                s.has_more = fetched.len() >= APP_PAGE_SIZE as usize;
                if load_more {
                    s.apps.extend(fetched);
                } else {
                    s.apps = fetched;
                }
                s.current_page = page;
                s.is_loading = false;
            }),
            Err(e) => {
                tracing::warn!("Failed to load apps (page {}): {}", page, e);
                self.state.update(|s| {
                    s.error = Some(e.user_message());
                    s.is_loading = false;
                });
            }
        }
    }

    /// Filter by category (`None` for all) and reload from page 1
    pub async fn select_category(&self, category: Option<String>) {
        self.state.update(|s| s.selected_category = category);
        self.load_apps(false).await;
    }

    /// Change the ordering; reloads only if it actually changed
    pub async fn change_sort(&self, sort: AppSort) {
        let changed = self.state.try_update(|s| {
            if s.sort == sort {
                return false;
            }
            s.sort = sort;
            true
        });
        if changed {
            self.load_apps(false).await;
        }
    }

    pub async fn refresh(&self) {
        self.load_apps(false).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, session_with};
    use std::sync::Arc;

    fn vm(fake: &Arc<FakeApi>) -> (tempfile::TempDir, AppListViewModel) {
        // The market is readable without logging in
        let (dir, session) = session_with(fake, false);
        (dir, AppListViewModel::new(session))
    }

    #[tokio::test]
    async fn test_paging_until_exhausted() {
        let fake = Arc::new(FakeApi::new());
        fake.add_apps("games", 45);
        let (_dir, vm) = vm(&fake);

        vm.load_apps(false).await;
        let s = vm.state();
        assert_eq!(s.apps.len(), 20);
        assert!(s.has_more);
        assert_eq!(s.current_page, 1);

        vm.load_apps(true).await;
        assert_eq!(vm.state().apps.len(), 40);
        assert_eq!(vm.state().current_page, 2);

        vm.load_apps(true).await;
        let s = vm.state();
        assert_eq!(s.apps.len(), 45);
        assert!(!s.has_more);
        assert_eq!(s.apps[44].package_name, "com.example.app44");

        vm.load_apps(true).await;
        assert_eq!(fake.calls("list_apps"), 3);
    }

    #[tokio::test]
    async fn test_exactly_one_full_page_still_has_more() {
        let fake = Arc::new(FakeApi::new());
        fake.add_apps("games", 20);
        let (_dir, vm) = vm(&fake);

        vm.load_apps(false).await;
        assert!(vm.state().has_more);
        vm.load_apps(true).await;
        let s = vm.state();
        assert_eq!(s.apps.len(), 20);
        assert!(!s.has_more);
    }

    #[tokio::test]
    async fn test_load_ignored_while_in_flight() {
        let fake = Arc::new(FakeApi::new());
        fake.add_apps("games", 3);
        let (_dir, vm) = vm(&fake);

        vm.state.update(|s| s.is_loading = true);
        vm.load_apps(false).await;
        assert_eq!(fake.calls("list_apps"), 0);
    }

    #[tokio::test]
    async fn test_category_filter_and_sort() {
        let fake = Arc::new(FakeApi::seeded());
        fake.add_apps("games", 3);
        fake.add_apps("tools", 2);
        let (_dir, vm) = vm(&fake);

        vm.load_categories().await;
        assert_eq!(vm.state().categories, vec!["games", "tools"]);

        vm.select_category(Some("tools".to_string())).await;
        assert_eq!(vm.state().apps.len(), 2);

        vm.change_sort(AppSort::Download).await;
        assert_eq!(fake.calls("list_apps"), 1);
        vm.change_sort(AppSort::Rating).await;
        assert_eq!(fake.calls("list_apps"), 2);
        assert_eq!(vm.state().sort, AppSort::Rating);

        vm.select_category(None).await;
        assert_eq!(vm.state().apps.len(), 5);
    }

    #[tokio::test]
    async fn test_errors_are_recorded() {
        let fake = Arc::new(FakeApi::new());
        fake.fail("app_categories");
        fake.fail("list_apps");
        let (_dir, vm) = vm(&fake);

        vm.load_categories().await;
        assert_eq!(vm.state().error.as_deref(), Some("app_categories failed"));

        vm.refresh().await;
        let s = vm.state();
        assert_eq!(s.error.as_deref(), Some("list_apps failed"));
        assert!(!s.is_loading);

        fake.recover("list_apps");
        vm.refresh().await;
        assert_eq!(vm.state().error, None);
    }
}
