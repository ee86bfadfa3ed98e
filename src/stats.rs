use crate::table::{ObservationTable, TableError};
use serde::{Deserialize, Serialize};

/// Gini coefficient of the present values; `None` when there is nothing to measure.
///
/// Uses the discrete form `1 - 2 * sum((n - i + 0.5) * x_i) / (n * S)` over the
/// ascending values `x_1..x_n` with total `S`. A single value is perfectly equal (0).
/// A zero total makes the ratio meaningless, which is reported as `None` too.
pub fn gini<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut vals: Vec<f64> = values.into_iter().flatten().filter(|v| !v.is_nan()).collect();
    let n = vals.len();
    match n {
        0 => return None,
        1 => return Some(0.0),
        _ => {}
    }
    vals.sort_by(f64::total_cmp);

    let nf = n as f64;
    let sum: f64 = vals.iter().sum();
    let weighted: f64 = vals
        .iter()
        .enumerate()
        .map(|(i, x)| (nf - (i + 1) as f64 + 0.5) * x)
        .sum();
    let g = 1.0 - 2.0 * weighted / (nf * sum);
    g.is_finite().then_some(g)
}

/// One year of a Gini series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GiniPoint {
    pub year: i32,
    pub gini: Option<f64>,
}

/// Yearly Gini coefficients, ascending by year with no duplicates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GiniSeries {
    pub indicator: String,
    pub points: Vec<GiniPoint>,
}

impl GiniSeries {
    pub fn get(&self, year: i32) -> Option<f64> {
        self.points
            .binary_search_by_key(&year, |p| p.year)
            .ok()
            .and_then(|i| self.points[i].gini)
    }

    /// Points with a defined coefficient, for plotting.
    pub fn defined(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points.iter().filter_map(|p| p.gini.map(|g| (p.year, g)))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Gini of `column` for each year present in `table`, including years where the
/// column has no value at all (their coefficient is `None`).
pub fn gini_by_year(table: &ObservationTable, column: &str) -> Result<GiniSeries, TableError> {
    let idx = table.column_index(column)?;
    let points = table
        .years()
        .into_iter()
        .map(|year| GiniPoint {
            year,
            gini: gini(table.year_slice(year).map(|r| r.values[idx])),
        })
        .collect();
    Ok(GiniSeries {
        indicator: column.to_string(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textbook_values() {
        assert_eq!(gini([Some(5.0)]), Some(0.0));
        assert_eq!(gini(Vec::<Option<f64>>::new()), None);
        assert_eq!(gini([None, None]), None);
        let g = gini([Some(1.0), Some(2.0), Some(3.0), Some(4.0)]).unwrap();
        assert!((g - 0.25).abs() < 1e-12);
        // all mass on one member of two
        let g = gini([Some(0.0), Some(10.0)]).unwrap();
        assert!((g - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_total_is_undefined() {
        assert_eq!(gini([Some(0.0), Some(0.0)]), None);
        assert_eq!(gini([Some(0.0)]), Some(0.0));
    }
}
