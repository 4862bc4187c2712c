//! Column-aligned tables.

use colored::Colorize;

use super::{is_tty, MAX_TABLE_WIDTH};
use crate::utils::{single_line, truncate};

const COLUMN_GAP: usize = 2;
const MIN_COLUMN_WIDTH: usize = 6;

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    max_width: usize,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            max_width: MAX_TABLE_WIDTH,
        }
    }

    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    /// Add a row. Missing cells are blank, extra cells are dropped, and
    /// newlines inside cells are flattened.
    pub fn add_row(&mut self, cells: Vec<String>) {
        let mut row: Vec<String> = cells.iter().map(|c| single_line(c)).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Natural widths, then shrink the widest column one character at a
    /// time until the table fits.
    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let gaps = COLUMN_GAP * widths.len().saturating_sub(1);
        let available = self.max_width.saturating_sub(gaps);
        while widths.iter().sum::<usize>() > available {
            let Some((widest, width)) = widths
                .iter()
                .copied()
                .enumerate()
                .max_by_key(|&(i, w)| (w, std::cmp::Reverse(i)))
            else {
                break;
            };
            if width <= MIN_COLUMN_WIDTH {
                break;
            }
            widths[widest] -= 1;
        }
        widths
    }

    /// Render to a string. The bold header and separator rule are only
    /// drawn for terminals so piped output is just the rows.
    pub fn render(&self, tty: bool) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        let widths = self.column_widths();
        let mut out = String::new();

        if tty {
            out.push_str(&format_line(&self.headers, &widths).bold().to_string());
            out.push('\n');
            let total = widths.iter().sum::<usize>() + COLUMN_GAP * widths.len().saturating_sub(1);
            out.push_str(&"─".repeat(total).dimmed().to_string());
            out.push('\n');
        }

        for row in &self.rows {
            out.push_str(&format_line(row, &widths));
            out.push('\n');
        }
        out
    }

    pub fn print(&self) {
        print!("{}", self.render(is_tty()));
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let gap = " ".repeat(COLUMN_GAP);
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| pad(&truncate(cell, width), width))
        .collect::<Vec<_>>()
        .join(&gap);
    line.trim_end().to_string()
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{s}{}", " ".repeat(width.saturating_sub(len)))
}
