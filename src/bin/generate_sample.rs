use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.range(0, items.len() as u64 - 1) as usize]
    }
}

/// (category, [(product, unit price)])
const CATALOGUE: &[(&str, &[(&str, f64)])] = &[
    ("Gıda", &[("Ekmek", 10.0), ("Peynir", 145.5), ("Zeytin", 89.9), ("Makarna", 22.75)]),
    ("İçecek", &[("Su", 7.5), ("Ayran", 15.0), ("Meyve Suyu", 32.9), ("Çay", 120.0)]),
    ("Temizlik", &[("Deterjan", 210.0), ("Sabun", 39.9), ("Çamaşır Suyu", 54.5)]),
    ("Kişisel Bakım", &[("Şampuan", 99.9), ("Diş Macunu", 64.5), ("Deodorant", 119.0)]),
    ("Atıştırmalık", &[("Çikolata", 27.5), ("Cips", 34.9), ("Kuruyemiş", 159.0)]),
];

/// Relative sales volume per city.
const CITIES: &[(&str, u64)] = &[
    ("İstanbul", 9),
    ("Ankara", 6),
    ("İzmir", 5),
    ("Bursa", 3),
    ("Antalya", 3),
];

const HEADERS: [&str; 7] = [
    "Tarih",
    "Şehir",
    "Kategori",
    "Ürün",
    "Adet",
    "Birim Fiyat",
    "Toplam Satış",
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let output_path = Path::new("data/sales_data.csv");
    if let Some(dir) = output_path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    writer.write_record(HEADERS)?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let mut rows = 0usize;

    // Every day of 2024, a leap year.
    for day in 0..366 {
        let date = start
            .checked_add_days(Days::new(day))
            .context("date out of range")?;
        // Weekends are busier.
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

        for &(city, weight) in CITIES {
            let sales = rng.range(0, weight) + if weekend { weight / 2 } else { 0 };
            for _ in 0..sales {
                let (category, products) = *rng.pick(CATALOGUE);
                let &(product, base_price) = rng.pick(products);
                let quantity = rng.range(1, 6);
                // Prices drift a little from store to store.
                let unit_price = (base_price * (0.9 + 0.2 * rng.next_f64()) * 100.0).round() / 100.0;
                let total = (unit_price * quantity as f64 * 100.0).round() / 100.0;

                writer.write_record([
                    date.format("%Y-%m-%d").to_string(),
                    city.to_string(),
                    category.to_string(),
                    product.to_string(),
                    quantity.to_string(),
                    format!("{unit_price:.2}"),
                    format!("{total:.2}"),
                ])?;
                rows += 1;
            }
        }
    }
    writer.flush()?;

    println!(
        "Wrote {rows} sales across {} cities and {} categories to {}",
        CITIES.len(),
        CATALOGUE.len(),
        output_path.display()
    );
    Ok(())
}
