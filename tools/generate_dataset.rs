//! Synthetic Dataset Generator
//!
//! Writes a semicolon separated dataset in the layout the trainer expects,
//! for local experiments when the real dataset is not at hand.
//!
//! Usage: generate-dataset [OUTPUT] [ROWS] [MISSING_RATE] [SEED]

use house_expense_estimator::dataset::columns;
use house_expense_estimator::types::input::{Ownership, Region};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::info;

/// One generated house
struct House {
    ownership: Ownership,
    pet_owner: bool,
    region: Region,
    age_years: u32,
    cosmetic_score: f64,
    children: u32,
    expense: f64,
}

/// Seeded house generator
struct HouseGenerator {
    rng: StdRng,
}

impl HouseGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn generate(&mut self) -> House {
        let ownership = Ownership::ALL[self.rng.gen_range(0..Ownership::ALL.len())];
        let region = Region::ALL[self.rng.gen_range(0..Region::ALL.len())];
        let pet_owner = self.rng.gen_bool(0.35);
        let age_years = self.rng.gen_range(0..120);
        let cosmetic_score: f64 = self.rng.gen_range(5.0..45.0);
        let children = self.rng.gen_range(0..6);

        // Older, shabbier, tenant-occupied houses with pets cost more.
        let mut expense = 0.15
            + 0.002 * age_years as f64
            + 0.006 * cosmetic_score
            + 0.02 * children as f64;
        if ownership == Ownership::Tenant {
            expense += 0.08;
        }
        if pet_owner {
            expense += 0.05;
        }
        expense += match region {
            Region::West => 0.0,
            Region::CentralAnatoliaAndBlackSea => 0.03,
            Region::MediterraneanAndInnerAegean => 0.05,
            Region::EastAndSoutheastAnatolia => 0.07,
        };
        expense += self.rng.gen_range(-0.05..0.05);

        House {
            ownership,
            pet_owner,
            region,
            age_years,
            cosmetic_score,
            children,
            expense: expense.max(0.0),
        }
    }
}

fn write_dataset(path: &Path, rows: usize, missing_rate: f64, seed: u64) -> anyhow::Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    writer.write_record(columns::REQUIRED)?;

    let mut generator = HouseGenerator::new(seed);
    let mut blanked = 0;
    for _ in 0..rows {
        let house = generator.generate();
        let mut record = vec![
            house.ownership.label().to_string(),
            if house.pet_owner { "yes" } else { "no" }.to_string(),
            house.region.label().to_string(),
            house.age_years.to_string(),
            format!("{:.1}", house.cosmetic_score),
            house.children.to_string(),
            format!("{:.4}", house.expense),
        ];
        if generator.rng.gen_bool(missing_rate) {
            let field = generator.rng.gen_range(0..record.len());
            record[field].clear();
            blanked += 1;
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(blanked)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_dataset=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let output = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("data/insurance_modified.csv");
    let rows: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let missing_rate: f64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.01_f64)
        .clamp(0.0, 1.0);
    let seed: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);

    info!(
        output = %output,
        rows = rows,
        missing_rate = missing_rate,
        seed = seed,
        "Generating dataset"
    );

    let blanked = write_dataset(Path::new(output), rows, missing_rate, seed)?;

    info!(
        "Completed! Wrote {} rows to {} ({} with a missing field)",
        rows, output, blanked
    );
    Ok(())
}
