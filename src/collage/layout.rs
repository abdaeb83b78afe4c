//! # 列分配模块
//!
//! ## 设计思路
//!
//! 贪心地把每张图放进当前最矮的列，使各列高度尽量接近（受限的多处理器调度问题）。
//! 只依赖图片高度，不接触像素，便于单独测试。
//!
//! ## 实现思路
//!
//! - 小根堆保存 `(height, column_index)`，高度相同时按列号升序出堆，
//!   保证结果可复现：前 `columns_count` 张图严格从左到右依次落入各列。
//! - 每放一张图：弹出最矮列 → 追加图片 → 压回 `height + image_height + gap`。
//! - 列总高统一为 `gap + Σ(image_height + gap)`（顶部一个间距，每张图后一个间距），
//!   与绘制阶段 `y` 从 `gap` 起步、每张图后前进 `image_height + gap` 完全一致。

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::CollageError;

/// 分配结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// 每列按放入顺序保存的图片下标。
    pub columns: Vec<Vec<usize>>,
    /// 每列总高：`gap + Σ(image_height + gap)`。
    pub heights: Vec<u64>,
}

impl ColumnPlan {
    /// 画布高度，即最高列的高度。
    pub fn total_height(&self) -> u64 {
        self.heights.iter().copied().max().unwrap_or(0)
    }
}

/// 逐张放置图片的贪心分配器。
#[derive(Debug, Clone)]
pub struct ColumnPacker {
    heap: BinaryHeap<Reverse<(u64, usize)>>,
    columns: Vec<Vec<usize>>,
    heights: Vec<u64>,
    gap: u64,
    placed: usize,
}

impl ColumnPacker {
    pub fn new(columns_count: usize, gap: u32) -> Result<Self, CollageError> {
        if columns_count == 0 {
            return Err(CollageError::InvalidArgument("columns_count 必须至少为 1".to_string()));
        }

        Ok(Self {
            heap: (0..columns_count).map(|index| Reverse((0, index))).collect(),
            columns: vec![Vec::new(); columns_count],
            heights: vec![gap as u64; columns_count],
            gap: gap as u64,
            placed: 0,
        })
    }

    /// 放入下一张图片，返回其所在列号。
    pub fn place(&mut self, image_height: u32) -> usize {
        let Some(Reverse((current, column))) = self.heap.pop() else {
            unreachable!("packer always holds one heap entry per column");
        };

        let step = image_height as u64 + self.gap;
        self.columns[column].push(self.placed);
        self.heights[column] += step;
        self.heap.push(Reverse((current + step, column)));
        self.placed += 1;

        column
    }

    pub fn finish(self) -> ColumnPlan {
        ColumnPlan {
            columns: self.columns,
            heights: self.heights,
        }
    }
}

/// 按输入顺序为全部图片分配列。
pub fn assign_columns(
    image_heights: &[u32],
    columns_count: usize,
    gap: u32,
) -> Result<ColumnPlan, CollageError> {
    let mut packer = ColumnPacker::new(columns_count, gap)?;
    for &height in image_heights {
        packer.place(height);
    }
    Ok(packer.finish())
}
