use std::cmp::min;

use order_status_editor::{OrderStatus, OrderStatusController, OrderStatusFacade, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Status,
    Description,
}

pub struct App<F> {
    pub should_quit: bool,

    // UI state
    pub view: View,
    pub status: String,
    pub show_help: bool,

    // Current page snapshot
    pub rows: Vec<OrderStatus>,
    pub total_rows: usize,
    pub sel_row: usize,

    // Create/edit form
    pub draft: OrderStatus,
    pub field: Field,
    pub cursor: usize, // byte cursor in the active field
    /// Screen the form was opened from; Esc goes back there
    pub form_origin: View,

    controller: OrderStatusController<F>,
}

impl<F: OrderStatusFacade> App<F> {
    pub fn new(controller: OrderStatusController<F>) -> Self {
        let mut app = Self {
            should_quit: false,
            view: View::List,
            status: String::new(),
            show_help: false,
            rows: Vec::new(),
            total_rows: 0,
            sel_row: 0,
            draft: OrderStatus::default(),
            field: Field::Status,
            cursor: 0,
            form_origin: View::List,
            controller,
        };
        app.refresh();
        app
    }

    pub fn controller(&self) -> &OrderStatusController<F> {
        &self.controller
    }

    pub fn selected(&self) -> &OrderStatus {
        self.controller.selected()
    }

    /// 1-based page number and page count for the status line.
    pub fn page_position(&self) -> (usize, usize) {
        let window = self.controller.window();
        (
            window.page_index() + 1,
            window.page_count(self.total_rows).max(1),
        )
    }

    /// Pull the current page from the controller (cheap when it is still cached).
    pub fn refresh(&mut self) {
        match self.controller.items() {
            Ok(items) => {
                self.rows = items.to_vec();
                self.total_rows = self.controller.cached_total().unwrap_or(self.rows.len());
                self.sel_row = self.sel_row.min(self.rows.len().saturating_sub(1));
                let (page, pages) = self.page_position();
                self.status = format!(
                    "Order statuses — page {} of {} ({} rows/page), total {}",
                    page,
                    pages,
                    self.controller.window().page_size(),
                    self.total_rows
                );
            }
            Err(e) => {
                self.status = format!("Error: {e}");
            }
        }
    }

    pub fn reload(&mut self) {
        self.controller.recreate_model();
        self.refresh();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ===== List navigation =====

    pub fn move_up(&mut self) {
        if self.sel_row > 0 {
            self.sel_row -= 1;
            return;
        }
        // At top of the page: continue on the previous page
        if self.controller.window().has_previous() {
            self.controller.previous();
            self.refresh();
            self.sel_row = self.rows.len().saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if self.sel_row + 1 < self.rows.len() {
            self.sel_row += 1;
            return;
        }
        if self.controller.window().has_next(self.total_rows) {
            self.next_page();
        }
    }

    pub fn next_page(&mut self) {
        match self.controller.next() {
            Ok(view) => {
                self.view = view;
                self.sel_row = 0;
                self.refresh();
            }
            Err(e) => self.status = format!("Error: {e}"),
        }
    }

    pub fn prev_page(&mut self) {
        self.view = self.controller.previous();
        self.sel_row = 0;
        self.refresh();
    }

    pub fn back_to_list(&mut self) {
        self.view = self.controller.prepare_list();
        self.refresh();
    }

    // ===== CRUD dispatch =====

    pub fn view_selected(&mut self) {
        match self.controller.prepare_view(self.sel_row) {
            Ok(view) => {
                self.view = view;
                self.status = "Viewing order status: e edit, d delete, Esc back".into();
            }
            Err(e) => self.status = format!("Error: {e}"),
        }
    }

    pub fn edit_selected(&mut self) {
        match self.controller.prepare_edit(self.sel_row) {
            Ok(view) => self.begin_form(view),
            Err(e) => self.status = format!("Error: {e}"),
        }
    }

    /// Edit the item shown on the detail screen.
    pub fn edit_current(&mut self) {
        self.begin_form(View::Edit);
    }

    pub fn begin_create(&mut self) {
        let view = self.controller.prepare_create();
        self.begin_form(view);
    }

    pub fn delete_selected(&mut self) {
        if self.rows.is_empty() {
            self.status = "Nothing to delete".into();
            return;
        }
        match self.controller.destroy(self.sel_row) {
            Ok(view) => {
                self.view = view;
                self.refresh();
                self.status = "Order status deleted".into();
            }
            Err(e) => self.status = persistence_message(&e),
        }
    }

    /// Delete the item on the detail screen and show its successor.
    pub fn delete_current(&mut self) {
        match self.controller.destroy_and_view() {
            Ok(view) => {
                self.view = view;
                self.refresh();
                if let (View::Detail, Some(index)) = (view, self.controller.selected_index()) {
                    self.sel_row = index.saturating_sub(self.controller.window().current_offset());
                }
                self.status = "Order status deleted".into();
            }
            Err(e) => self.status = persistence_message(&e),
        }
    }

    fn begin_form(&mut self, view: View) {
        self.form_origin = self.view;
        self.view = view;
        self.draft = self.controller.selected().clone();
        self.field = Field::Status;
        self.cursor = self.draft.status.len();
        self.status = "Tab switch field, Enter save, Esc cancel".into();
    }

    pub fn submit_form(&mut self) {
        let draft = self.draft.clone();
        let (result, done) = match self.view {
            View::Create => (self.controller.create(draft), "Order status created"),
            View::Edit => (self.controller.update(draft), "Order status updated"),
            View::List | View::Detail => return,
        };
        match result {
            Ok(view) => {
                self.view = view;
                self.refresh();
                self.status = done.into();
            }
            // Stay on the form so the input is not lost
            Err(e) => self.status = persistence_message(&e),
        }
    }

    pub fn cancel_form(&mut self) {
        if self.form_origin == View::Detail && self.controller.selected().is_persisted() {
            self.view = View::Detail;
            self.status = "Edit cancelled".into();
        } else {
            self.back_to_list();
        }
    }

    // ===== Form buffer ops =====

    fn active_field(&mut self) -> &mut String {
        match self.field {
            Field::Status => &mut self.draft.status,
            Field::Description => &mut self.draft.description,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            Field::Status => Field::Description,
            Field::Description => Field::Status,
        };
        self.cursor = self.active_field().len();
    }

    pub fn form_insert(&mut self, ch: char) {
        let cursor = self.cursor;
        self.active_field().insert(cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn form_backspace(&mut self) {
        let cursor = self.cursor;
        if cursor > 0 {
            let buf = self.active_field();
            let start = prev_char_boundary(buf, cursor);
            buf.drain(start..cursor);
            self.cursor = start;
        }
    }

    pub fn form_delete(&mut self) {
        let cursor = self.cursor;
        let buf = self.active_field();
        if cursor < buf.len() {
            let end = next_char_boundary(buf, cursor);
            buf.drain(cursor..end);
        }
    }

    pub fn form_left(&mut self) {
        let cursor = self.cursor;
        self.cursor = prev_char_boundary(self.active_field(), cursor);
    }

    pub fn form_right(&mut self) {
        let cursor = self.cursor;
        self.cursor = next_char_boundary(self.active_field(), cursor);
    }

    pub fn form_home(&mut self) {
        self.cursor = 0;
    }

    pub fn form_end(&mut self) {
        self.cursor = self.active_field().len();
    }
}

fn persistence_message(e: &impl std::fmt::Display) -> String {
    format!("A persistence error occurred: {e}")
}

fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(s: &str, idx: usize) -> usize {
    s[idx..]
        .chars()
        .next()
        .map_or(s.len(), |c| min(idx + c.len_utf8(), s.len()))
}
