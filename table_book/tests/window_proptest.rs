//! Property-based tests for the occupancy-window overlap predicate and the
//! free-table subtraction.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;
use table_book::availability::{TimeWindow, free_tables};
use table_book::reservations::reservation_duration;
use table_book::tables::{Table, TableId};

/// Arbitrary start times across a few years, minute granularity.
fn start_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..(4 * 366 * 24 * 60)).prop_map(|minutes| {
        Utc.timestamp_opt(1_700_000_000 + minutes * 60, 0).unwrap()
    })
}

proptest! {
    /// Overlap is symmetric.
    #[test]
    fn overlap_is_symmetric(s1 in start_time(), s2 in start_time()) {
        let w1 = TimeWindow::starting_at(s1);
        let w2 = TimeWindow::starting_at(s2);
        prop_assert_eq!(w1.overlaps(&w2), w2.overlaps(&w1));
    }

    /// With every window the same fixed length, two windows overlap exactly
    /// when their starts are closer than that length.
    #[test]
    fn equal_length_windows_overlap_iff_starts_are_close(
        s1 in start_time(),
        s2 in start_time(),
    ) {
        let w1 = TimeWindow::starting_at(s1);
        let w2 = TimeWindow::starting_at(s2);
        let gap = (s1 - s2).abs();
        prop_assert_eq!(w1.overlaps(&w2), gap < reservation_duration());
    }

    /// Back-to-back seatings never collide: the window starting exactly at
    /// another's end is free of it.
    #[test]
    fn window_never_overlaps_its_successor(s in start_time()) {
        let current = TimeWindow::starting_at(s);
        let next = TimeWindow::starting_at(current.end);
        prop_assert!(!current.overlaps(&next));
        prop_assert!(current.overlaps(&current));
    }

    /// The free set never contains an occupied table and never invents one.
    #[test]
    fn free_tables_is_a_filtered_subset(
        count in 0usize..12,
        occupied_mask in proptest::collection::vec(any::<bool>(), 0..12),
    ) {
        let tables: Vec<Table> = (0..count)
            .map(|i| Table {
                id: i as TableId + 1,
                number: (count - i) as i32,
                seats: 4,
                is_active: true,
            })
            .collect();
        let occupied: HashSet<TableId> = tables
            .iter()
            .zip(occupied_mask.iter().chain(std::iter::repeat(&false)))
            .filter(|(_, taken)| **taken)
            .map(|(t, _)| t.id)
            .collect();

        let free = free_tables(tables.clone(), &occupied);

        prop_assert!(free.iter().all(|t| !occupied.contains(&t.id)));
        prop_assert_eq!(free.len(), tables.len() - occupied.len());
        prop_assert!(free.windows(2).all(|pair| pair[0].number <= pair[1].number));
    }
}
