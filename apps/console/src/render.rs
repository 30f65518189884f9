//! Plain-text rendering of controller state.

use chrono::{DateTime, Utc};
use client_core::PaginationView;
use serde::Serialize;
use shared::protocol::{CourseListItem, EventListItem, NewsListItem, OrderListItem, UserListItem};

/// A list record that can be shown as one table row.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

impl TableRow for UserListItem {
    const HEADERS: &'static [&'static str] = &["ID", "EMAIL", "NICKNAME", "ROLE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.email.clone(),
            optional(self.nickname.as_deref()),
            self.role.map(|role| role.to_string()).unwrap_or_else(|| "-".into()),
        ]
    }
}

impl TableRow for EventListItem {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "TYPE", "LOCATION", "STARTS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.kind.to_string(),
            self.location.to_string(),
            timestamp(&self.start_date),
        ]
    }
}

impl TableRow for NewsListItem {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "PUBLISHED"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.published_at
                .as_ref()
                .map(timestamp)
                .unwrap_or_else(|| "draft".into()),
        ]
    }
}

impl TableRow for CourseListItem {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "PRICE"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.title.clone(), self.price.to_string()]
    }
}

impl TableRow for OrderListItem {
    const HEADERS: &'static [&'static str] =
        &["ID", "USER", "COURSE", "AMOUNT", "STATUS", "CREATED"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.user_id.to_string(),
            self.course_id.to_string(),
            self.amount.to_string(),
            self.status.to_string(),
            timestamp(&self.created_at),
        ]
    }
}

/// Left-aligned columns separated by two spaces, header first.
pub fn table<T: TableRow>(rows: &[T]) -> String {
    let rows: Vec<Vec<String>> = rows.iter().map(T::cells).collect();
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|header| header.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let headers: Vec<String> = T::HEADERS.iter().map(|header| header.to_string()).collect();
    let mut out = String::new();
    for row in std::iter::once(&headers).chain(rows.iter()) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn pagination_footer(view: &PaginationView) -> String {
    format!(
        "page {} of {} ({} per page, {} total)",
        view.current_page,
        view.page_count().max(1),
        view.page_size,
        view.total_items
    )
}

pub fn detail<D: Serialize>(record: &D) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
