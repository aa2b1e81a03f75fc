use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::input::InputError;
use crate::input::groups::load_t60_groups;
use crate::model::LeveneRow;
use crate::stats::levene::levene_median;

// Levene per T60 common to both folders, ascending. Each row is echoed to
// stdout as it is produced; failed T60s are logged and omitted.
pub fn variance_between_folders(left: &Path, right: &Path) -> Result<Vec<LeveneRow>, InputError> {
    let left_groups = load_t60_groups(left)?;
    let right_groups = load_t60_groups(right)?;

    let right_map: HashMap<u64, &Vec<f64>> = right_groups
        .iter()
        .map(|(t60, values)| (t60.to_bits(), values))
        .collect();

    println!("{:<10}{:<15}{:<15}", "T60", "Levene_Stat", "P_Value");

    let mut rows = Vec::new();
    for (t60, left_values) in &left_groups {
        let Some(right_values) = right_map.get(&t60.to_bits()) else {
            continue;
        };
        match levene_median(&[left_values.as_slice(), right_values.as_slice()]) {
            Ok(test) => {
                println!("{:<10}{:<15.5}{:<15.5}", t60, test.statistic, test.p_value);
                rows.push(LeveneRow {
                    t60: *t60,
                    statistic: test.statistic,
                    p_value: test.p_value,
                });
            }
            Err(err) => warn!("Levene test failed for T60 {}: {}", t60, err),
        }
    }
    if rows.is_empty() {
        warn!(
            "no common T60 produced a result between {} and {}",
            left.display(),
            right.display()
        );
    }
    Ok(rows)
}

pub fn write_levene_csv(rows: &[LeveneRow], path: &Path) -> Result<(), InputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["T60", "Levene_Stat", "P_Value"])?;
    for row in rows {
        writer.write_record([
            row.t60.to_string(),
            row.statistic.to_string(),
            row.p_value.to_string(),
        ])?;
    }
    writer.flush()?;
    info!("wrote {} Levene rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/variance.rs"]
mod tests;
