//! Shared fixtures: a synthetic accepted-loans export in a temp directory.

#![allow(dead_code)]

use std::path::Path;

use config::PipelinePaths;
use loan_structs::RAW_FIELDS;
use ml_model::{GbdtParams, TrainingConfig};
use tempfile::TempDir;

pub const TOTAL_ROWS: usize = 400;

/// Rows with an in-progress status, excluded from the normalized table.
pub const UNLABELED_ROWS: usize = TOTAL_ROWS / 10;

fn row(i: usize) -> Vec<String> {
    let rate = 6.0 + ((i * 37) % 20) as f64;
    let bad = rate >= 22.0;
    let status = if i % 10 == 9 {
        "Current"
    } else if bad {
        "Charged Off"
    } else if i % 4 == 0 {
        "Does not meet the credit policy. Status:Fully Paid"
    } else {
        "Fully Paid"
    };
    let grade = ["A", "B", "C", "D", "E"][((rate - 6.0) / 4.0) as usize % 5];
    let emp_length = ["10+ years", "< 1 year", "", "3 years"][i % 4];

    RAW_FIELDS
        .iter()
        .map(|field| match field.name {
            "issue_d" => ["Jan-2015", "Jun-2016", "Dec-2017"][i % 3].to_string(),
            "loan_status" => status.to_string(),
            "loan_amnt" => format!("{}", 1000 + (i * 250) % 30_000),
            "term" => [" 36 months", " 60 months"][i % 2].to_string(),
            "int_rate" => format!("{rate:.2}%"),
            "installment" => format!("{:.2}", 50.0 + (i % 17) as f64 * 12.5),
            "grade" => grade.to_string(),
            "sub_grade" => format!("{grade}{}", 1 + i % 5),
            "emp_length" => emp_length.to_string(),
            "home_ownership" => ["RENT", "MORTGAGE", "OWN"][i % 3].to_string(),
            "annual_inc" => format!("{}", 30_000 + (i * 991) % 90_000),
            "verification_status" => ["Verified", "Not Verified"][i % 2].to_string(),
            "purpose" => ["debt_consolidation", "credit_card", "home_improvement"][i % 3].to_string(),
            "addr_state" => ["CA", "NY", "TX", "WA"][i % 4].to_string(),
            "revol_util" => format!("{:.1}%", (i % 90) as f64 + 0.5),
            "application_type" => "Individual".to_string(),
            _ => format!("{}", i % 7),
        })
        .collect()
}

/// Writes the synthetic export as `accepted_synthetic.csv` under `raw_dir`.
pub fn write_raw_csv(raw_dir: &Path) {
    std::fs::create_dir_all(raw_dir).expect("create raw dir");

    let mut text = String::from("id,");
    text.push_str(
        &RAW_FIELDS
            .iter()
            .map(|field| field.name)
            .collect::<Vec<_>>()
            .join(","),
    );
    text.push_str(",url\n");

    for i in 0..TOTAL_ROWS {
        text.push_str(&format!("{i},{},https://example.com/{i}\n", row(i).join(",")));
    }

    std::fs::write(raw_dir.join("accepted_synthetic.csv"), text).expect("write raw csv");
}

/// A temp project with the synthetic export in place.
pub fn project() -> (TempDir, PipelinePaths) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = PipelinePaths::new(&dir.path().join("data"), &dir.path().join("artifacts"));
    write_raw_csv(&paths.raw_dir);
    (dir, paths)
}

/// Small ensemble so the tests stay fast.
pub fn quick_training() -> TrainingConfig {
    TrainingConfig {
        gbdt: GbdtParams {
            n_estimators: 60,
            learning_rate: 0.2,
            num_leaves: 8,
            min_child_samples: 5,
            ..GbdtParams::default()
        },
        ..TrainingConfig::default()
    }
}
