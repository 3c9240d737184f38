// Shared fixtures for integration tests

use std::fs;
use std::path::{Path, PathBuf};

use mindguard::config::TrainingConfig;

const ROWS: &[(&str, &str)] = &[
    ("Normal", "enjoyed lunch with coworkers and weekend hiking plans feeling grateful relaxed"),
    ("Anxiety", "worried overwhelmed nervous racing heart cannot sleep panic about deadlines"),
    ("Depression", "hopeless numb exhausted staying in bed crying alone nothing matters"),
    ("Bipolar", "manic energy spending sprees wild mood swings then crashing for weeks"),
    ("Suicidal", "dont want to live anymore thinking about ending it writing goodbye letters"),
];

const VARIANTS: &[&str] = &["today", "lately", "honestly", "tonight", "recently", "constantly"];

/// Write a small labeled CSV: each label gets two rows per variant word
pub fn write_dataset(dir: &Path) -> PathBuf {
    let mut csv = String::from(",statement,status\n");
    let mut index = 0;
    for (label, statement) in ROWS {
        for variant in VARIANTS {
            for prefix in ["Honestly,", "Well"] {
                csv.push_str(&format!("{},\"{} {} {}\",{}\n", index, prefix, statement, variant, label));
                index += 1;
            }
        }
    }
    // Rows the loader must drop
    csv.push_str(&format!("{},,Normal\n", index));
    csv.push_str(&format!("{},\"work is stressful\",Stress\n", index + 1));

    let path = dir.join("combined.csv");
    fs::write(&path, csv).expect("write dataset");
    path
}

pub fn training_config() -> TrainingConfig {
    TrainingConfig {
        epochs: 40,
        ..TrainingConfig::default()
    }
}
