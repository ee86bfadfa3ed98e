use std::fs;
use std::path::PathBuf;
use wbi_edu::stats::{GiniPoint, GiniSeries};
use wbi_edu::table::{Observation, ObservationTable};
use wbi_edu::viz;

fn sample_series() -> GiniSeries {
    GiniSeries {
        indicator: "primary_enrollment_rate".into(),
        points: vec![
            GiniPoint { year: 2019, gini: Some(0.12) },
            GiniPoint { year: 2020, gini: None },
            GiniPoint { year: 2021, gini: Some(0.18) },
        ],
    }
}

fn sample_table() -> ObservationTable {
    let mut t = ObservationTable::new(vec!["a".into()]);
    for (c, y, v) in [("KE", 2019, 1.0), ("KE", 2020, 2.0), ("SN", 2019, 2.0), ("SN", 2020, 2.5)] {
        t.push(Observation {
            country: c.into(),
            country_name: c.into(),
            year: y,
            values: vec![Some(v)],
        })
        .unwrap();
    }
    t
}

fn write_and_check<F: Fn(&PathBuf)>(maker: F, name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join(name);
    maker(&path);
    let meta = fs::metadata(&path).expect("file created");
    assert!(meta.len() > 0, "chart has content");
}

#[test]
fn gini_chart_svg_and_png() {
    let series = sample_series();
    write_and_check(|p| viz::plot_gini(&series, p, 800, 500, "Inequality").unwrap(), "gini.svg");
    write_and_check(|p| viz::plot_gini(&series, p, 800, 500, "Inequality").unwrap(), "gini.png");
}

#[test]
fn indicator_chart_svg() {
    let t = sample_table();
    write_and_check(|p| viz::plot_indicator(&t, "a", p, 800, 500, "A by country").unwrap(), "a.svg");
}

#[test]
fn nothing_to_plot_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let empty = GiniSeries {
        indicator: "x".into(),
        points: vec![GiniPoint { year: 2000, gini: None }],
    };
    assert!(viz::plot_gini(&empty, dir.path().join("x.svg"), 400, 300, "x").is_err());
    assert!(viz::plot_indicator(&sample_table(), "missing", dir.path().join("y.svg"), 400, 300, "y").is_err());
}
