use wbi_edu::catalog::IndicatorCatalog;
use wbi_edu::models::DataPoint;
use wbi_edu::dashboard::{DashboardView, Selection};
use wbi_edu::table::{Observation, ObservationTable};

const ENR: &str = "primary_enrollment_rate";

/// Four countries over 2008..=2012, enrollment only; SN has no 2012 value.
fn table(cat: &IndicatorCatalog) -> ObservationTable {
    let mut t = ObservationTable::new(cat.names());
    let width = cat.len();
    let data = [
        ("KE", "Kenya", [100.0, 101.0, 102.0, 103.0, 104.0]),
        ("SN", "Senegal", [80.0, 81.0, 82.0, 83.0, f64::NAN]),
        ("NG", "Nigeria", [90.0, 91.0, 92.0, 93.0, 94.0]),
        ("IN", "India", [110.0, 111.0, 112.0, 113.0, 114.0]),
    ];
    for (code, name, vals) in data {
        for (i, v) in vals.iter().enumerate() {
            let mut values = vec![None; width];
            values[0] = (!v.is_nan()).then_some(*v);
            t.push(Observation {
                country: code.into(),
                country_name: name.into(),
                year: 2008 + i as i32,
                values,
            })
            .unwrap();
        }
    }
    t
}

#[test]
fn default_selection_takes_first_three_and_clamps_years() {
    let cat = IndicatorCatalog::education();
    let t = table(&cat);
    let sel = Selection::default_for(&t, &cat);
    assert_eq!(sel.countries, vec!["KE", "SN", "NG"]);
    assert_eq!(sel.years, (2010, 2012));
    assert_eq!(sel.indicator, ENR);
    assert_eq!(sel.export_file_name(), "primary_enrollment_rate_2010_2012.csv");
}

#[test]
fn view_filters_and_summarizes() {
    let cat = IndicatorCatalog::education();
    let t = table(&cat);
    let sel = Selection {
        countries: vec!["KE".into(), "SN".into(), "NG".into()],
        years: (2010, 2012),
        indicator: ENR.into(),
    };
    let view = DashboardView::build(&t, &cat, &sel).unwrap();

    assert_eq!(view.indicator_code, "SE.PRM.ENRR");
    assert!(view.unknown_countries.is_empty());
    assert_eq!(view.filtered.len(), 9);
    assert!(view.filtered.rows().iter().all(|r| r.country != "IN"));

    let years: Vec<i32> = view.gini.points.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2010, 2011, 2012]);
    assert!(view.gini.points.iter().all(|p| p.gini.is_some()));

    // SN has no value in 2012
    let map = view.map.as_ref().unwrap();
    assert_eq!(map.year, 2012);
    assert_eq!(map.entries.len(), 2);
    assert_eq!(view.frames.len(), 3);
    assert_eq!(view.export.len(), 8);

    let ext = view.extremes.as_ref().unwrap();
    assert_eq!(ext.min.country, "NG");
    assert_eq!(ext.max.country, "KE");
    let lines = view.summary_lines();
    assert_eq!(lines[0], "In 2012, NG had the lowest value of primary enrollment rate: 94.00");
    assert_eq!(lines[1], "In 2012, KE had the highest value of primary enrollment rate: 104.00");
}

#[test]
fn empty_end_year_skips_map_and_summary() {
    let cat = IndicatorCatalog::education();
    let t = table(&cat);
    let sel = Selection {
        countries: vec!["SN".into()],
        years: (2011, 2012),
        indicator: ENR.into(),
    };
    let view = DashboardView::build(&t, &cat, &sel).unwrap();
    assert!(view.map.is_none());
    assert!(view.extremes.is_none());
    assert_eq!(view.summary_lines(), vec!["No usable data for primary enrollment rate in 2012."]);
    // single country: each defined year is perfectly equal, 2012 is undefined
    assert_eq!(view.gini.get(2011), Some(0.0));
    assert_eq!(view.gini.points[1].gini, None);
}

#[test]
fn other_indicator_has_only_undefined_gini() {
    let cat = IndicatorCatalog::education();
    let t = table(&cat);
    let mut sel = Selection::default_for(&t, &cat);
    sel.indicator = "school_life_expectancy".into();
    let view = DashboardView::build(&t, &cat, &sel).unwrap();
    assert_eq!(view.gini.points.len(), 3);
    assert!(view.gini.points.iter().all(|p| p.gini.is_none()));
    assert!(view.export.is_empty());
    assert!(view.frames.is_empty());
}

#[test]
fn unknown_indicator_is_rejected() {
    let cat = IndicatorCatalog::education();
    let t = table(&cat);
    let mut sel = Selection::default_for(&t, &cat);
    sel.indicator = "SE.PRM.ENRR".into();
    assert!(DashboardView::build(&t, &cat, &sel).is_err());
}

fn point(iso2: &str, iso3: &str, name: &str, year: i32, value: f64) -> DataPoint {
    DataPoint {
        indicator_id: "SE.PRM.ENRR".into(),
        country_id: iso2.into(),
        country_name: name.into(),
        country_iso3: iso3.into(),
        year,
        value: Some(value),
    }
}

#[test]
fn api_rows_are_selected_by_the_requested_codes() {
    let cat = IndicatorCatalog::education();
    let points = vec![
        point("SN", "SEN", "Senegal", 2023, 80.0),
        point("KE", "KEN", "Kenya", 2023, 100.0),
    ];
    let t = ObservationTable::from_long(&points, &cat);
    let sel = Selection {
        countries: vec!["SN".into(), "ke".into()],
        years: (2023, 2023),
        indicator: ENR.into(),
    };
    let view = DashboardView::build(&t, &cat, &sel).unwrap();

    assert_eq!(view.filtered.len(), 2);
    assert_eq!(view.gini.points.len(), 1);
    assert!((view.gini.get(2023).unwrap() - 1.0 / 18.0).abs() < 1e-12);
    assert_eq!(view.map.as_ref().map(|m| m.entries.len()), Some(2));
    assert!(view.unknown_countries.is_empty());
}

#[test]
fn unknown_selected_countries_are_reported() {
    let cat = IndicatorCatalog::education();
    let t = table(&cat);
    let sel = Selection {
        countries: vec!["KE".into(), "SEN".into(), "ZZ".into()],
        years: (2010, 2012),
        indicator: ENR.into(),
    };
    let view = DashboardView::build(&t, &cat, &sel).unwrap();
    assert_eq!(view.unknown_countries, vec!["SEN", "ZZ"]);
    assert_eq!(view.filtered.countries(), vec!["KE"]);
}
