//! CRUD dispatch and screen selection for the order status list/detail screens.

use crate::facade::{OrderStatusFacade, PersistenceError};
use crate::model::OrderStatus;
use crate::pagination::{PageWindow, PaginationError, SelectionTracker};

/// Screen the caller should show after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
    Create,
    Edit,
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("row {0} is not on the current page")]
    RowOutOfRange(usize),
}

#[derive(Debug, Clone)]
struct PageCache {
    total: usize,
    items: Vec<OrderStatus>,
}

/// One controller per editing session. Failed store operations leave the
/// window, the selection and the current item exactly as they were.
#[derive(Debug)]
pub struct OrderStatusController<F> {
    facade: F,
    window: PageWindow,
    selection: SelectionTracker,
    current: OrderStatus,
    /// `None` means stale: the next read refetches the page
    page: Option<PageCache>,
}

impl<F: OrderStatusFacade> OrderStatusController<F> {
    pub fn new(facade: F) -> Self {
        Self {
            facade,
            window: PageWindow::default(),
            selection: SelectionTracker::new(),
            current: OrderStatus::default(),
            page: None,
        }
    }

    pub fn with_page_size(facade: F, page_size: usize) -> Result<Self, PaginationError> {
        Ok(Self {
            window: PageWindow::new(page_size)?,
            ..Self::new(facade)
        })
    }

    pub fn facade(&self) -> &F {
        &self.facade
    }

    pub fn facade_mut(&mut self) -> &mut F {
        &mut self.facade
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.selected()
    }

    /// The item being viewed or edited; a blank instance when nothing is selected.
    pub fn selected(&self) -> &OrderStatus {
        &self.current
    }

    /// Row count seen by the last page fetch, if the page is fresh.
    pub fn cached_total(&self) -> Option<usize> {
        self.page.as_ref().map(|p| p.total)
    }

    /// Rows of the current page, fetched only when the cached page is stale.
    pub fn items(&mut self) -> Result<&[OrderStatus], ControllerError> {
        if self.page.is_none() {
            let total = self.facade.count()?;
            // rows may have vanished behind our back; keep the window inside the data
            while self.window.current_offset() >= total && self.window.has_previous() {
                self.window.retreat();
            }
            let facade = &self.facade;
            let items = self
                .window
                .fetch_page(total, |start, end| facade.fetch_range(start, end))?;
            tracing::debug!(
                offset = self.window.current_offset(),
                total,
                rows = items.len(),
                "loaded order status page"
            );
            self.page = Some(PageCache { total, items });
        }
        Ok(self.page.as_ref().map(|p| p.items.as_slice()).unwrap_or_default())
    }

    pub fn recreate_model(&mut self) {
        self.page = None;
    }

    pub fn prepare_list(&mut self) -> View {
        self.recreate_model();
        View::List
    }

    pub fn prepare_view(&mut self, row: usize) -> Result<View, ControllerError> {
        self.select_row(row)?;
        Ok(View::Detail)
    }

    pub fn prepare_edit(&mut self, row: usize) -> Result<View, ControllerError> {
        self.select_row(row)?;
        Ok(View::Edit)
    }

    pub fn prepare_create(&mut self) -> View {
        self.current = OrderStatus::default();
        self.selection.select(None);
        View::Create
    }

    pub fn create(&mut self, item: OrderStatus) -> Result<View, ControllerError> {
        let stored = self.facade.create(&item).inspect_err(|e| {
            tracing::warn!(error = %e, status = %item.status, "create failed");
        })?;
        self.current = stored;
        self.selection.select(None);
        self.recreate_model();
        Ok(View::Detail)
    }

    pub fn update(&mut self, item: OrderStatus) -> Result<View, ControllerError> {
        self.facade.update(&item).inspect_err(|e| {
            tracing::warn!(error = %e, id = ?item.id, "update failed");
        })?;
        self.current = item;
        self.recreate_model();
        Ok(View::Detail)
    }

    /// Delete the row at `row` on the current page and go back to the list.
    pub fn destroy(&mut self, row: usize) -> Result<View, ControllerError> {
        let (_, item) = self.row_item(row)?;
        self.facade.delete(&item).inspect_err(|e| {
            tracing::warn!(error = %e, id = ?item.id, "delete failed");
        })?;
        self.clear_selection();
        self.recreate_model();
        Ok(View::List)
    }

    /// Delete the current item and show whichever item slid into its position,
    /// or the list when none is left to select.
    pub fn destroy_and_view(&mut self) -> Result<View, ControllerError> {
        self.facade.delete(&self.current).inspect_err(|e| {
            tracing::warn!(error = %e, id = ?self.current.id, "delete failed");
        })?;
        self.recreate_model();

        // The row is gone from here on; a failed lookup must not leave it selected
        match self.reconcile_selection() {
            Ok(Some(item)) => {
                self.current = item;
                Ok(View::Detail)
            }
            Ok(None) => {
                self.clear_selection();
                Ok(View::List)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not reselect after delete");
                self.clear_selection();
                Ok(View::List)
            }
        }
    }

    fn reconcile_selection(&mut self) -> Result<Option<OrderStatus>, PersistenceError> {
        let total = self.facade.count()?;
        let facade = &self.facade;
        self.selection.reconcile_after_deletion(
            total,
            |index| facade.fetch_one(index),
            &mut self.window,
        )
    }

    fn clear_selection(&mut self) {
        self.current = OrderStatus::default();
        self.selection.select(None);
    }

    pub fn next(&mut self) -> Result<View, ControllerError> {
        let total = self.facade.count()?;
        self.window.advance(total);
        self.recreate_model();
        Ok(View::List)
    }

    pub fn previous(&mut self) -> View {
        self.window.retreat();
        self.recreate_model();
        View::List
    }

    fn row_item(&mut self, row: usize) -> Result<(usize, OrderStatus), ControllerError> {
        let item = self
            .items()?
            .get(row)
            .cloned()
            .ok_or(ControllerError::RowOutOfRange(row))?;
        Ok((self.window.current_offset() + row, item))
    }

    fn select_row(&mut self, row: usize) -> Result<(), ControllerError> {
        let (index, item) = self.row_item(row)?;
        self.current = item;
        self.selection.select(Some(index));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteFacade;
    use std::cell::Cell;

    /// Store wrapper that can be told to fail every write, or every count
    /// once a delete went through.
    struct Flaky {
        inner: SqliteFacade,
        fail_writes: bool,
        fail_count_after_delete: bool,
        deleted: Cell<bool>,
    }

    impl Flaky {
        fn check(&self) -> Result<(), PersistenceError> {
            if self.fail_writes {
                return Err(PersistenceError::Invalid("injected failure".into()));
            }
            Ok(())
        }
    }

    impl OrderStatusFacade for Flaky {
        fn count(&self) -> Result<usize, PersistenceError> {
            if self.fail_count_after_delete && self.deleted.get() {
                return Err(PersistenceError::Invalid("injected count failure".into()));
            }
            self.inner.count()
        }
        fn fetch_range(&self, start: usize, end: usize) -> Result<Vec<OrderStatus>, PersistenceError> {
            self.inner.fetch_range(start, end)
        }
        fn create(&mut self, item: &OrderStatus) -> Result<OrderStatus, PersistenceError> {
            self.check()?;
            self.inner.create(item)
        }
        fn update(&mut self, item: &OrderStatus) -> Result<(), PersistenceError> {
            self.check()?;
            self.inner.update(item)
        }
        fn delete(&mut self, item: &OrderStatus) -> Result<(), PersistenceError> {
            self.check()?;
            self.inner.delete(item)?;
            self.deleted.set(true);
            Ok(())
        }
    }

    fn controller(rows: usize) -> OrderStatusController<Flaky> {
        let mut inner = SqliteFacade::open_in_memory().unwrap();
        for i in 0..rows {
            inner
                .create(&OrderStatus::new(format!("STATUS_{i:02}"), ""))
                .unwrap();
        }
        OrderStatusController::new(Flaky {
            inner,
            fail_writes: false,
            fail_count_after_delete: false,
            deleted: Cell::new(false),
        })
    }

    fn statuses(c: &mut OrderStatusController<Flaky>) -> Vec<String> {
        c.items().unwrap().iter().map(|s| s.status.clone()).collect()
    }

    fn goto_last_page(c: &mut OrderStatusController<Flaky>) {
        while c.window().has_next(c.facade().count().unwrap()) {
            c.next().unwrap();
        }
    }

    #[test]
    fn pages_through_rows() {
        let mut c = controller(25);
        assert_eq!(statuses(&mut c).len(), 10);
        assert_eq!(c.next().unwrap(), View::List);
        assert_eq!(c.window().current_offset(), 10);
        c.next().unwrap();
        c.next().unwrap();
        assert_eq!(c.window().current_offset(), 20);
        assert_eq!(statuses(&mut c), ["STATUS_20", "STATUS_21", "STATUS_22", "STATUS_23", "STATUS_24"]);
        assert_eq!(c.previous(), View::List);
        assert_eq!(c.window().current_offset(), 10);
    }

    #[test]
    fn page_is_cached_until_recreated() {
        let mut c = controller(3);
        assert_eq!(statuses(&mut c).len(), 3);
        c.facade_mut()
            .inner
            .create(&OrderStatus::new("LATE", ""))
            .unwrap();
        assert_eq!(statuses(&mut c).len(), 3);
        assert_eq!(c.cached_total(), Some(3));
        assert_eq!(c.prepare_list(), View::List);
        assert_eq!(c.cached_total(), None);
        assert_eq!(statuses(&mut c).len(), 4);
    }

    #[test]
    fn prepare_view_selects_absolute_index() {
        let mut c = controller(25);
        c.next().unwrap();
        assert_eq!(c.prepare_view(3).unwrap(), View::Detail);
        assert_eq!(c.selected_index(), Some(13));
        assert_eq!(c.selected().status, "STATUS_13");
        assert_eq!(c.prepare_edit(0).unwrap(), View::Edit);
        assert_eq!(c.selected_index(), Some(10));
    }

    #[test]
    fn out_of_range_row_changes_nothing() {
        let mut c = controller(5);
        c.prepare_view(1).unwrap();
        assert!(matches!(c.prepare_view(7), Err(ControllerError::RowOutOfRange(7))));
        assert!(matches!(c.destroy(7), Err(ControllerError::RowOutOfRange(7))));
        assert_eq!(c.selected_index(), Some(1));
        assert_eq!(c.selected().status, "STATUS_01");
    }

    #[test]
    fn create_shows_stored_item() {
        let mut c = controller(2);
        assert_eq!(c.prepare_create(), View::Create);
        assert!(!c.selected().is_persisted());
        assert_eq!(c.create(OrderStatus::new("ON_HOLD", "Paused")).unwrap(), View::Detail);
        assert!(c.selected().is_persisted());
        assert_eq!(c.selected_index(), None);
        assert_eq!(statuses(&mut c).len(), 3);
    }

    #[test]
    fn update_returns_to_detail() {
        let mut c = controller(2);
        c.prepare_edit(1).unwrap();
        let mut edited = c.selected().clone();
        edited.description = "changed".into();
        assert_eq!(c.update(edited).unwrap(), View::Detail);
        assert_eq!(c.selected().description, "changed");
        assert_eq!(c.items().unwrap()[1].description, "changed");
    }

    #[test]
    fn destroy_from_list() {
        let mut c = controller(3);
        c.prepare_view(0).unwrap();
        assert_eq!(c.destroy(0).unwrap(), View::List);
        assert_eq!(statuses(&mut c), ["STATUS_01", "STATUS_02"]);
        assert_eq!(c.selected_index(), None);
        assert!(!c.selected().is_persisted());
    }

    #[test]
    fn destroy_last_item_views_previous_one() {
        let mut c = controller(25);
        goto_last_page(&mut c);
        c.prepare_view(4).unwrap();
        assert_eq!(c.selected_index(), Some(24));

        assert_eq!(c.destroy_and_view().unwrap(), View::Detail);
        assert_eq!(c.selected_index(), Some(23));
        assert_eq!(c.window().current_offset(), 20);
        assert_eq!(c.selected().status, "STATUS_23");
    }

    #[test]
    fn destroy_in_middle_views_next_item() {
        let mut c = controller(5);
        c.prepare_view(2).unwrap();
        assert_eq!(c.destroy_and_view().unwrap(), View::Detail);
        assert_eq!(c.selected_index(), Some(2));
        assert_eq!(c.selected().status, "STATUS_03");
    }

    #[test]
    fn destroy_emptying_last_page_retreats() {
        let mut c = controller(21);
        goto_last_page(&mut c);
        assert_eq!(c.window().current_offset(), 20);
        c.prepare_view(0).unwrap();

        assert_eq!(c.destroy_and_view().unwrap(), View::Detail);
        assert_eq!(c.window().current_offset(), 10);
        assert_eq!(c.selected_index(), Some(19));
        assert_eq!(c.selected().status, "STATUS_19");
    }

    #[test]
    fn destroy_only_item_goes_to_empty_list() {
        let mut c = controller(1);
        c.prepare_view(0).unwrap();
        assert_eq!(c.destroy_and_view().unwrap(), View::List);
        assert_eq!(c.selected_index(), None);
        assert_eq!(c.window().current_offset(), 0);
        assert!(!c.selected().is_persisted());
        assert!(c.items().unwrap().is_empty());
    }

    #[test]
    fn lookup_failure_after_delete_drops_deleted_item() {
        let mut c = controller(3);
        c.prepare_view(1).unwrap();
        c.facade_mut().fail_count_after_delete = true;

        assert_eq!(c.destroy_and_view().unwrap(), View::List);
        assert!(!c.selected().is_persisted());
        assert_eq!(c.selected_index(), None);
        assert_eq!(c.cached_total(), None);

        c.facade_mut().fail_count_after_delete = false;
        assert_eq!(statuses(&mut c), ["STATUS_00", "STATUS_02"]);
    }

    #[test]
    fn failed_writes_leave_state_untouched() {
        let mut c = controller(25);
        c.next().unwrap();
        c.prepare_view(2).unwrap();
        c.facade_mut().fail_writes = true;

        let before = (c.window().clone(), c.selected_index(), c.selected().clone());
        let snapshot = |c: &OrderStatusController<Flaky>| {
            (c.window().clone(), c.selected_index(), c.selected().clone())
        };

        assert!(c.create(OrderStatus::new("X", "")).is_err());
        assert_eq!(snapshot(&c), before);
        let mut edited = c.selected().clone();
        edited.status = "Y".into();
        assert!(c.update(edited).is_err());
        assert_eq!(snapshot(&c), before);
        assert!(c.destroy(0).is_err());
        assert_eq!(snapshot(&c), before);
        assert!(c.destroy_and_view().is_err());
        assert_eq!(snapshot(&c), before);
        assert_eq!(c.facade().count().unwrap(), 25);
    }

    #[test]
    fn custom_page_size() {
        assert!(OrderStatusController::with_page_size(controller(0).facade, 0).is_err());
        let mut c = OrderStatusController::with_page_size(controller(7).facade, 3).unwrap();
        assert_eq!(statuses(&mut c).len(), 3);
        c.next().unwrap();
        c.next().unwrap();
        assert_eq!(statuses(&mut c), ["STATUS_06"]);
    }
}
