//! Encoding and preprocessing over the shipped reference dataset.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use airsat::data::{Codebook, read_csv, read_csv_from};
use airsat::pipeline::{FeatureKind, Pipeline};
use approx::assert_abs_diff_eq;

fn data_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/data/flight_sample.csv")
}

fn feature_names() -> Vec<String> {
    [
        "Online boarding",
        "Inflight wifi service",
        "Inflight entertainment",
        "Checkin service",
        "Seat comfort",
        "Age",
        "Flight Distance",
        "Business Travel",
        "Loyal Customer",
        "Class",
    ]
    .map(String::from)
    .to_vec()
}

#[test]
fn reference_csv_reads_with_inferred_column_kinds() {
    let table = read_csv(data_path()).expect("read reference csv");
    assert_eq!(table.n_rows(), 48);
    assert_eq!(table.n_cols(), 11);

    // Ratings and Age come in numeric; missing Age cells are NaN.
    let age = table.column("Age").expect("Age column");
    let ages = age.values().as_numeric().expect("numeric Age");
    assert_eq!(ages.iter().filter(|v| v.is_nan()).count(), 3);

    // Categorical columns stay text until encoded.
    assert!(table.column("Class").expect("Class column").is_text());
    assert!(table.column("satisfaction").expect("label column").is_text());
}

#[test]
fn codebook_assigns_sorted_codes_with_missing_last() {
    let table = read_csv(data_path()).expect("read reference csv");
    let codebook = Codebook::fit(&table);

    assert_eq!(
        codebook.categories("Class").expect("Class fitted"),
        &["Business".to_string(), "Eco".to_string(), "Eco Plus".to_string()]
    );
    assert_eq!(codebook.missing_code("Class"), Some(3));
    assert_eq!(codebook.code("Class", Some("Business")), Some(0.0));
    assert_eq!(codebook.code("Class", Some("Eco")), Some(1.0));
    assert_eq!(codebook.code("Class", Some("Eco Plus")), Some(2.0));
    // Unseen and missing share the sentinel code.
    assert_eq!(codebook.code("Class", Some("First")), Some(3.0));
    assert_eq!(codebook.code("Class", None), Some(3.0));

    assert_eq!(codebook.code("Business Travel", Some("No")), Some(0.0));
    assert_eq!(codebook.code("Business Travel", Some("Yes")), Some(1.0));
    assert_eq!(codebook.code("Loyal Customer", Some("Yes")), Some(1.0));
}

#[test]
fn row_order_does_not_change_the_codebook() {
    let raw = std::fs::read_to_string(data_path()).expect("read reference csv");
    let mut lines: Vec<&str> = raw.lines().collect();
    let header = lines.remove(0);
    lines.reverse();
    let reversed = format!("{header}\n{}\n", lines.join("\n"));

    let forward = Codebook::fit(&read_csv(data_path()).expect("read csv"));
    let backward = Codebook::fit(&read_csv_from(Cursor::new(reversed)).expect("read reversed"));
    assert_eq!(forward, backward);
}

#[test]
fn pipeline_fits_statistics_over_the_reference() {
    let mut table = read_csv(data_path()).expect("read reference csv");
    let codebook = Codebook::fit(&table);
    codebook.apply(&mut table).expect("encode");

    let fitted = Pipeline::new(feature_names())
        .fit(&table, &codebook)
        .expect("fit pipeline");
    assert_eq!(fitted.n_features(), 10);

    // Ratings and Age are numeric, the three categoricals encoded.
    assert_eq!(fitted.kinds()[0], FeatureKind::Numeric);
    assert_eq!(fitted.kinds()[5], FeatureKind::Numeric);
    assert_eq!(fitted.kinds()[7], FeatureKind::Encoded);
    assert_eq!(fitted.kinds()[9], FeatureKind::Encoded);

    // Age: 45 observed values, median 38, range 7..=79.
    let age = &fitted.stats()[5];
    assert_eq!(age.min, 7.0);
    assert_eq!(age.max, 79.0);
    assert_eq!(age.median, 38.0);

    let distance = &fitted.stats()[6];
    assert_eq!(distance.min, 150.0);
    assert_eq!(distance.max, 4983.0);

    // Class frequencies: 18 Business, 20 Eco, 8 Eco Plus, 2 missing.
    let class = fitted.stats()[9].codes.as_ref().expect("code frequencies");
    assert_eq!(class.len(), 4);
    assert_abs_diff_eq!(class[0].1, 18.0 / 48.0, epsilon = 1e-12);
    assert_abs_diff_eq!(class[1].1, 20.0 / 48.0, epsilon = 1e-12);
    assert_abs_diff_eq!(class[2].1, 8.0 / 48.0, epsilon = 1e-12);
    assert_abs_diff_eq!(class[3].1, 2.0 / 48.0, epsilon = 1e-12);
}

#[test]
fn transform_imputes_missing_age_with_the_fitted_median() {
    let mut table = read_csv(data_path()).expect("read reference csv");
    let codebook = Codebook::fit(&table);
    codebook.apply(&mut table).expect("encode");
    let fitted = Pipeline::new(feature_names())
        .fit(&table, &codebook)
        .expect("fit pipeline");

    let matrix = fitted.transform(&table).expect("transform");
    assert_eq!(matrix.shape(), &[10, 48]);

    // Rows 9, 22 and 42 of the CSV have no Age; they take the median.
    for sample in [8, 21, 41] {
        assert_eq!(matrix[[5, sample]], 38.0);
    }
    // Encoded Class values are codes, all below the sentinel + 1.
    for sample in 0..48 {
        let code = matrix[[9, sample]];
        assert!((0.0..=3.0).contains(&code), "bad code {code}");
    }
    // Row 12 has a missing Class; it carries the sentinel, not the median.
    assert_eq!(matrix[[9, 11]], 3.0);
}
