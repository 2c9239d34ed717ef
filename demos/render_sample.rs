use std::error::Error;

use chrono::{Duration, Utc};
use sales_report::report::REPORT_FILENAME;
use sales_report::{render_sales_report, ReportSettings, SaleRecord};

const SELLERS: &[&str] = &[
    "ana.garcia@technorth.mx",
    "luis.hernandez@technorth.mx",
    "maria.lopez@technorth.mx",
];

fn sample_sales(count: usize) -> Vec<SaleRecord> {
    let now = Utc::now();
    (0..count)
        .map(|index| {
            let subtotal = 250.0 + (index * 37 % 900) as f64;
            let mut record = SaleRecord::new()
                .with_timestamp(now - Duration::hours(index as i64 * 5))
                .with_amounts(subtotal, subtotal * 1.16);
            // every seventh sale has no seller
            if index % 7 != 6 {
                record = record.with_employee_email(SELLERS[index % SELLERS.len()]);
            }
            record
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    let count = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<usize>())
        .transpose()?
        .unwrap_or(80);

    let report = render_sales_report(&sample_sales(count), &ReportSettings::default(), Utc::now())?;
    std::fs::write(REPORT_FILENAME, &report.bytes)?;
    println!(
        "Generated {} ({} sales, {} pages, {} bytes)",
        REPORT_FILENAME,
        report.row_count,
        report.page_count,
        report.bytes.len()
    );
    Ok(())
}
