//! Sigma-multiple grids shared by the gridded policies
//!
//! A grid lives in standardized coordinates: every shift axis and range axis
//! is expressed in multiples of its standard deviation. Policies turn those
//! multiples into millimeters and percent with [`ScenarioGrid::shift_mm`] and
//! [`ScenarioGrid::range_values`].

use rsm_core::UncertaintyParameters;
use serde::{Deserialize, Serialize};

/// How per-axis extremes are combined into scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinations {
    /// Star pattern: every axis perturbed alone
    #[default]
    None,

    /// Full product over the shift axes, range perturbed alone
    Shift,

    /// Full product over shift axes and range
    All,
}

/// Shift and range scenarios of one CT phase, in sigma multiples
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScenarioGrid {
    /// Shift multiples per axis; index 0 is the nominal shift
    pub(crate) shifts: Vec<[f64; 3]>,

    /// `(abs, rel)` range multiples; index 0 is the nominal range
    pub(crate) ranges: Vec<[f64; 2]>,

    /// Realized `(shift, range)` pairs
    pub(crate) pairs: Vec<(usize, usize)>,
}

impl ScenarioGrid {
    /// Build grid from the non-zero multiples to visit on every axis
    ///
    /// Axes with a zero standard deviation collapse to the nominal point.
    pub(crate) fn build(
        params: &UncertaintyParameters,
        multiples: &[f64],
        combinations: Combinations,
        combine_range: bool,
    ) -> Self {
        let mut nonzero: Vec<f64> = multiples.iter().copied().filter(|k| *k != 0.0).collect();
        nonzero.sort_by(f64::total_cmp);
        nonzero.dedup();

        let shift_sd = params.shift_sd();
        let axes: [Vec<f64>; 3] = std::array::from_fn(|axis| {
            if shift_sd[axis] > 0.0 {
                nonzero.clone()
            } else {
                Vec::new()
            }
        });

        let shifts = match combinations {
            Combinations::None => star_shifts(&axes),
            Combinations::Shift | Combinations::All => product_shifts(&axes),
        };

        let has_abs = params.range_abs_sd() > 0.0;
        let has_rel = params.range_rel_sd() > 0.0;
        let mut ranges = vec![[0.0, 0.0]];
        if combine_range {
            if has_abs || has_rel {
                ranges.extend(nonzero.iter().map(|k| [*k, *k]));
            }
        } else {
            if has_abs {
                ranges.extend(nonzero.iter().map(|k| [*k, 0.0]));
            }
            if has_rel {
                ranges.extend(nonzero.iter().map(|k| [0.0, *k]));
            }
        }

        let pairs = match combinations {
            Combinations::All => (0..shifts.len())
                .flat_map(|s| (0..ranges.len()).map(move |r| (s, r)))
                .collect(),
            Combinations::None | Combinations::Shift => (0..shifts.len())
                .map(|s| (s, 0))
                .chain((1..ranges.len()).map(|r| (0, r)))
                .collect(),
        };

        Self {
            shifts,
            ranges,
            pairs,
        }
    }

    /// Isocenter shift in mm for a shift scenario
    pub(crate) fn shift_mm(&self, shift: usize, params: &UncertaintyParameters) -> [f64; 3] {
        let sd = params.shift_sd();
        let k = self.shifts[shift];
        [k[0] * sd[0], k[1] * sd[1], k[2] * sd[2]]
    }

    /// `(abs mm, rel %)` range error for a range scenario
    pub(crate) fn range_values(&self, range: usize, params: &UncertaintyParameters) -> (f64, f64) {
        let [ka, kr] = self.ranges[range];
        (ka * params.range_abs_sd(), kr * params.range_rel_sd())
    }
}

fn star_shifts(axes: &[Vec<f64>; 3]) -> Vec<[f64; 3]> {
    let mut shifts = vec![[0.0; 3]];
    for (axis, points) in axes.iter().enumerate() {
        for k in points {
            let mut s = [0.0; 3];
            s[axis] = *k;
            shifts.push(s);
        }
    }
    shifts
}

fn product_shifts(axes: &[Vec<f64>; 3]) -> Vec<[f64; 3]> {
    // Nominal first on every axis so that index 0 is the unshifted scenario
    let with_zero: Vec<Vec<f64>> = axes
        .iter()
        .map(|points| std::iter::once(0.0).chain(points.iter().copied()).collect())
        .collect();

    let mut shifts = Vec::with_capacity(with_zero.iter().map(Vec::len).product());
    for x in &with_zero[0] {
        for y in &with_zero[1] {
            for z in &with_zero[2] {
                shifts.push([*x, *y, *z]);
            }
        }
    }
    shifts
}
