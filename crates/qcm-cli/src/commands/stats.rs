//! The `qcm stats` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use qcm_core::statistics::{JsonStatsFile, StatsRow};
use qcm_core::traits::StatsStore;

use super::Globals;

pub fn execute(globals: &Globals) -> Result<()> {
    let config = globals.resolve()?;
    let store = JsonStatsFile::new(&config.stats_file);

    let rows = store.load().rows();
    if rows.is_empty() {
        println!("No attempts recorded yet.");
        return Ok(());
    }

    println!("{}", stats_table(&rows));
    Ok(())
}

fn stats_table(rows: &[StatsRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Lesson / Exam",
        "Attempts",
        "Questions",
        "Correct",
        "Average",
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.key),
            Cell::new(row.attempts),
            Cell::new(row.total),
            Cell::new(row.correct),
            Cell::new(format!("{:.2}%", row.average_percent)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_key() {
        let rows = vec![
            StatsRow {
                key: "Biochemistry/enzymes".into(),
                attempts: 2,
                total: 10,
                correct: 7,
                average_percent: 70.0,
            },
            StatsRow {
                key: "Biochemistry/Exam-20".into(),
                attempts: 1,
                total: 20,
                correct: 13,
                average_percent: 65.0,
            },
        ];
        let rendered = stats_table(&rows).to_string();
        assert!(rendered.contains("Biochemistry/enzymes"));
        assert!(rendered.contains("Biochemistry/Exam-20"));
        assert!(rendered.contains("70.00%"));
    }
}
