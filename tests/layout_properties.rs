//! 列分配与画布尺寸的性质测试。

use proptest::prelude::*;
use search_collage::collage::LayoutConfig;
use search_collage::collage::layout::{ColumnPacker, assign_columns};

proptest! {
    #[test]
    fn canvas_width_depends_only_on_columns_width_and_gap(
        columns_count in 1u32..12,
        column_width in 1u32..800,
        gap in 0u32..64,
    ) {
        let layout = LayoutConfig { columns_count, column_width, gap, background: [255, 255, 255] };

        prop_assert_eq!(layout.canvas_width(), columns_count * column_width + gap * (columns_count + 1));
        prop_assert_eq!(
            layout.column_x(columns_count as usize - 1) + column_width + gap,
            layout.canvas_width()
        );
    }

    #[test]
    fn first_images_land_in_distinct_columns(
        heights in prop::collection::vec(1u32..2000, 1..10),
        gap in 0u32..32,
    ) {
        let columns_count = heights.len();
        let plan = assign_columns(&heights, columns_count, gap).expect("assign");

        for (column, members) in plan.columns.iter().enumerate() {
            prop_assert_eq!(members, &vec![column]);
        }
    }

    #[test]
    fn every_image_is_assigned_exactly_once_in_input_order(
        heights in prop::collection::vec(1u32..2000, 0..60),
        columns_count in 1usize..8,
        gap in 0u32..32,
    ) {
        let plan = assign_columns(&heights, columns_count, gap).expect("assign");

        let mut all: Vec<usize> = plan.columns.iter().flatten().copied().collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..heights.len()).collect::<Vec<_>>());

        for members in &plan.columns {
            prop_assert!(members.windows(2).all(|w| w[0] < w[1]));
        }

        for (column, members) in plan.columns.iter().enumerate() {
            let expected = gap as u64 + members.iter().map(|&i| heights[i] as u64 + gap as u64).sum::<u64>();
            prop_assert_eq!(plan.heights[column], expected);
        }
    }

    #[test]
    fn column_spread_is_bounded_by_last_footprint_on_tallest_column(
        heights in prop::collection::vec(1u32..2000, 1..60),
        columns_count in 1usize..8,
        gap in 0u32..32,
    ) {
        let plan = assign_columns(&heights, columns_count, gap).expect("assign");

        let max = plan.heights.iter().copied().max().unwrap_or(0);
        let min = plan.heights.iter().copied().min().unwrap_or(0);
        let tallest = plan.heights.iter().position(|&h| h == max).expect("non-empty");
        let largest_footprint = heights.iter().map(|&h| h as u64 + gap as u64).max().unwrap_or(0);

        match plan.columns[tallest].last() {
            Some(&last) => {
                let footprint = heights[last] as u64 + gap as u64;
                prop_assert!(max - min <= footprint);
                prop_assert!(max - min <= largest_footprint);
            }
            None => prop_assert_eq!(max, min),
        }
    }

    #[test]
    fn incremental_packer_matches_batch_assignment(
        heights in prop::collection::vec(1u32..500, 0..40),
        columns_count in 1usize..6,
    ) {
        let mut packer = ColumnPacker::new(columns_count, 10).expect("packer");
        let chosen: Vec<usize> = heights.iter().map(|&h| packer.place(h)).collect();
        let incremental = packer.finish();
        let batch = assign_columns(&heights, columns_count, 10).expect("assign");

        prop_assert_eq!(&incremental, &batch);
        for (index, column) in chosen.iter().enumerate() {
            prop_assert!(batch.columns[*column].contains(&index));
        }
    }
}
