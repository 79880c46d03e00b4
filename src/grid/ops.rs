//! Unit-weight convolution and max pooling on a [`VizGrid`].
//!
//! Every weight is 1, so a convolution output cell is the plain sum of the cells it reads.
//! With an identity input that makes provenance traceable by eye.
//!
//! Padding is never materialized. A tap on the zero border adds nothing to a sum and
//! contributes a 0 to a maximum, so only taps inside the real grid are visited. Kernel,
//! stride, padding and dilation are clamped with [`clamp_param`] first, which bounds the
//! size of every output grid.

use std::ops::Range;

use crate::{
    compute::rf_engine::conv_out_size,
    model::layer_params::clamp_param,
};

use super::viz_grid::VizGrid;

/// Kernel offsets along one axis whose tap lands inside the unpadded input of length `len`.
pub(crate) fn tap_range(
    out_idx: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
    len: usize,
) -> Range<usize> {
    let origin = out_idx * stride;
    let lo = if origin >= padding {
        0
    } else {
        (padding - origin).div_ceil(dilation)
    };
    let hi = if origin >= padding + len {
        0
    } else {
        (padding + len - origin).div_ceil(dilation).min(kernel)
    };
    lo..hi.max(lo)
}

/// Unpadded input index read by kernel offset `k` of output `out_idx`.
pub(crate) fn tap_index(
    out_idx: usize,
    k: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> usize {
    out_idx * stride + k * dilation - padding
}

pub fn convolve_unit(
    grid: &VizGrid,
    kernel: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> VizGrid {
    let kernel = clamp_param(kernel, 1);
    let stride = clamp_param(stride, 1);
    let padding = clamp_param(padding, 0);
    let dilation = clamp_param(dilation, 1);

    let out_h = conv_out_size(grid.rows(), kernel, stride, padding, dilation);
    let out_w = conv_out_size(grid.cols(), kernel, stride, padding, dilation);
    let mut out = VizGrid::zeros(out_h, out_w);

    for orow in 0..out_h {
        let rows = tap_range(orow, kernel, stride, padding, dilation, grid.rows());
        for ocol in 0..out_w {
            let cols = tap_range(ocol, kernel, stride, padding, dilation, grid.cols());
            let mut acc = 0i64;
            for kr in rows.clone() {
                let r = tap_index(orow, kr, stride, padding, dilation);
                for kc in cols.clone() {
                    let c = tap_index(ocol, kc, stride, padding, dilation);
                    acc += grid.get(r, c).unwrap_or(0);
                }
            }
            out.set(orow, ocol, acc);
        }
    }
    out
}

pub fn max_pool(grid: &VizGrid, kernel: usize, stride: usize, padding: usize) -> VizGrid {
    let kernel = clamp_param(kernel, 1);
    let stride = clamp_param(stride, 1);
    let padding = clamp_param(padding, 0);

    let out_h = conv_out_size(grid.rows(), kernel, stride, padding, 1);
    let out_w = conv_out_size(grid.cols(), kernel, stride, padding, 1);
    let mut out = VizGrid::zeros(out_h, out_w);

    for orow in 0..out_h {
        let rows = tap_range(orow, kernel, stride, padding, 1, grid.rows());
        for ocol in 0..out_w {
            let cols = tap_range(ocol, kernel, stride, padding, 1, grid.cols());
            let real = rows
                .clone()
                .flat_map(|kr| cols.clone().map(move |kc| (kr, kc)))
                .filter_map(|(kr, kc)| {
                    grid.get(
                        tap_index(orow, kr, stride, padding, 1),
                        tap_index(ocol, kc, stride, padding, 1),
                    )
                })
                .max();
            // a window that is not fully inside the grid also covers border zeros
            let touches_border = rows.len() < kernel || cols.len() < kernel;
            let best = match (real, touches_border) {
                (Some(v), true) => v.max(0),
                (Some(v), false) => v,
                (None, _) => 0,
            };
            out.set(orow, ocol, best);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer_params::MAX_LAYER_PARAM;

    #[test]
    fn unit_conv_identity_kernel_is_noop() {
        let grid = VizGrid::identity(5, 4);
        assert_eq!(convolve_unit(&grid, 1, 1, 0, 1), grid);
    }

    #[test]
    fn unit_pool_identity_window_is_noop() {
        let grid = VizGrid::from_rows(vec![vec![3, -1], vec![7, 2]]);
        assert_eq!(max_pool(&grid, 1, 1, 0), grid);
    }

    #[test]
    fn conv_sums_each_window() {
        let out = convolve_unit(&VizGrid::identity(4, 4), 2, 2, 0, 1);
        assert_eq!(out.to_rows(), vec![vec![10, 18], vec![42, 50]]);
    }

    #[test]
    fn conv_with_padding_counts_border_as_zero() {
        let out = convolve_unit(&VizGrid::identity(2, 2), 2, 1, 1, 1);
        assert_eq!(
            out.to_rows(),
            vec![vec![0, 1, 1], vec![2, 6, 4], vec![2, 5, 3]]
        );
    }

    #[test]
    fn dilated_conv_skips_between_taps() {
        // taps at (0,0) (0,2) (2,0) (2,2) of a 3x3 identity
        let out = convolve_unit(&VizGrid::identity(3, 3), 2, 1, 0, 2);
        assert_eq!(out.to_rows(), vec![vec![2 + 6 + 8]]);
    }

    #[test]
    fn pool_takes_window_maximum() {
        let out = max_pool(&VizGrid::identity(4, 4), 2, 2, 0);
        assert_eq!(out.to_rows(), vec![vec![5, 7], vec![13, 15]]);
    }

    #[test]
    fn pool_padding_contributes_zero() {
        let grid = VizGrid::from_rows(vec![vec![-5, -3], vec![-2, -8]]);
        let out = max_pool(&grid, 2, 2, 1);
        assert_eq!(out.to_rows(), vec![vec![0, 0], vec![0, 0]]);
    }

    #[test]
    fn oversized_kernel_gives_empty_grid() {
        let grid = VizGrid::identity(2, 2);
        assert!(convolve_unit(&grid, 3, 1, 0, 1).is_empty());
        assert!(max_pool(&grid, 3, 1, 0).is_empty());
    }

    #[test]
    fn tap_range_stays_inside_the_real_grid() {
        // k=3 p=1 over a 4 wide axis: first window starts on the border
        assert_eq!(tap_range(0, 3, 1, 1, 1, 4), 1..3);
        assert_eq!(tap_range(1, 3, 1, 1, 1, 4), 0..3);
        assert_eq!(tap_range(3, 3, 1, 1, 1, 4), 0..2);
        // dilated taps at 0, 2, 4 of a 3 wide axis
        assert_eq!(tap_range(0, 3, 1, 0, 2, 3), 0..2);
        // window entirely in the border
        assert!(tap_range(0, 2, 1, 5, 1, 4).is_empty());
    }

    #[test]
    fn huge_parameters_are_clamped_not_overflowed() {
        let grid = VizGrid::identity(4, 4);

        let conv = convolve_unit(&grid, 1, 1, usize::MAX, 1);
        let side = 4 + 2 * MAX_LAYER_PARAM;
        assert_eq!((conv.rows(), conv.cols()), (side, side));
        assert_eq!(conv.as_slice().iter().sum::<i64>(), (0..16).sum::<i64>());

        assert!(convolve_unit(&grid, usize::MAX, usize::MAX, 0, usize::MAX).is_empty());

        // two windows over 4 + 2 * 64: the first sees only border, the second the whole grid
        let pooled = max_pool(&grid, usize::MAX, usize::MAX, usize::MAX);
        assert_eq!(pooled.to_rows(), vec![vec![0, 0], vec![0, 15]]);
    }

    #[test]
    fn empty_input_stays_empty() {
        let empty = VizGrid::zeros(0, 0);
        assert!(convolve_unit(&empty, 1, 1, 0, 1).is_empty());
        assert!(max_pool(&empty, 1, 1, 0).is_empty());
    }
}
