//! Availability Resolver
//!
//! Pure function from (date, party size, floor plan, assignments) to a ranked
//! list of seatings. A seating is one table or a pair of tables; nothing
//! larger is ever proposed.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use shared::models::{DiningTable, TableAssignment, TableCombination};

/// Table ids held by a non-cancelled reservation on `date`
pub fn reserved_table_ids(date: NaiveDate, assignments: &[TableAssignment]) -> HashSet<i64> {
    assignments
        .iter()
        .filter(|a| a.service_date == date && a.status.is_active())
        .map(|a| a.table_id)
        .collect()
}

/// Tables that can be seated on `date`: switched on and not held by anyone.
/// Sorted by table number.
pub fn bookable_tables<'a>(
    date: NaiveDate,
    tables: &'a [DiningTable],
    assignments: &[TableAssignment],
) -> Vec<&'a DiningTable> {
    let reserved = reserved_table_ids(date, assignments);
    let mut bookable: Vec<&DiningTable> = tables
        .iter()
        .filter(|t| t.is_available && !reserved.contains(&t.id))
        .collect();
    bookable.sort_by_key(|t| t.table_number);
    bookable
}

/// Rank every single table and table pair that seats `party_size` on `date`.
///
/// The first entry is the recommendation. Order: total capacity, then number
/// of tables, then table numbers. Returns an empty list when nothing fits or
/// the party size is below one.
pub fn resolve(
    date: NaiveDate,
    party_size: i32,
    tables: &[DiningTable],
    assignments: &[TableAssignment],
) -> Vec<TableCombination> {
    if party_size < 1 {
        return Vec::new();
    }

    let bookable = bookable_tables(date, tables, assignments);
    let mut candidates = Vec::new();

    for (i, first) in bookable.iter().enumerate() {
        if first.capacity >= party_size {
            candidates.push(combination(&[first]));
        }
        for second in &bookable[i + 1..] {
            if first.capacity + second.capacity >= party_size {
                candidates.push(combination(&[first, second]));
            }
        }
    }

    candidates.sort_by(rank);
    candidates
}

fn combination(tables: &[&DiningTable]) -> TableCombination {
    TableCombination {
        tables: tables.iter().map(|t| (*t).clone()).collect(),
        total_capacity: tables.iter().map(|t| t.capacity).sum(),
    }
}

fn rank(a: &TableCombination, b: &TableCombination) -> Ordering {
    a.total_capacity
        .cmp(&b.total_capacity)
        .then_with(|| a.tables.len().cmp(&b.tables.len()))
        .then_with(|| a.table_numbers().cmp(&b.table_numbers()))
}
