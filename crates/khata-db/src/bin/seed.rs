//! # Demo Data Generator
//!
//! Fills a Khata database with a small shop's worth of records in every
//! collection, then prints the first page of each.
//!
//! ## Usage
//! ```bash
//! # 30 orders (default) into the configured database
//! cargo run -p khata-db --bin seed
//!
//! # More orders, explicit database file
//! cargo run -p khata-db --bin seed -- --orders 120 --db ./data/khata.db
//! ```
//!
//! ## Generated Data
//! - Stock: hardware and building materials at mixed GST slabs
//! - Orders: spread over January-March 2024, most delivered, some open
//! - Invoices: one per delivered order, most paid in full
//! - Ledger: income for each payment plus monthly rent and wages
//! - GST: GSTR-1 and GSTR-3B drafts for each month, January filed
//! - Staff: four employees with a week of attendance

use std::env;
use std::error::Error;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveTime};
use khata_core::records::{
    AttendanceEntry, AttendanceFilter, AttendanceSort, AttendanceStatus, EntryType,
    FinancialRecord, GstFiling, GstFilingFilter, GstFilingSort, Invoice, InvoiceFilter,
    InvoiceSort, LedgerFilter, LedgerSort, LedgerSummary, LineItem, Order, OrderFilter, OrderSort,
    OrderStatus, ReturnType, StaffFilter, StaffMember, StaffSort, StockFilter, StockItem,
    StockSort,
};
use khata_core::{Money, PaymentMethod, Query};
use khata_db::{Database, KhataConfig};

type SeedResult<T> = Result<T, Box<dyn Error>>;

/// (name, category, unit, quantity, unit cost, selling price, GST rate)
const STOCK: &[(&str, &str, &str, f64, f64, f64, f64)] = &[
    ("TMT Bar 12mm", "Steel", "kg", 1_200.0, 58.0, 66.0, 18.0),
    ("TMT Bar 8mm", "Steel", "kg", 850.0, 60.0, 68.0, 18.0),
    ("OPC Cement 53", "Cement", "bag", 320.0, 340.0, 395.0, 28.0),
    ("PPC Cement", "Cement", "bag", 14.0, 310.0, 365.0, 28.0),
    ("River Sand", "Aggregates", "cft", 2_000.0, 45.0, 60.0, 5.0),
    ("Binding Wire", "Steel", "kg", 0.0, 72.0, 85.0, 18.0),
    ("PVC Pipe 1in", "Plumbing", "pcs", 140.0, 110.0, 145.0, 18.0),
    ("Wall Putty", "Paints", "bag", 60.0, 520.0, 640.0, 18.0),
    ("Exterior Emulsion", "Paints", "ltr", 95.0, 260.0, 330.0, 18.0),
    ("Red Bricks", "Masonry", "pcs", 12_000.0, 7.5, 9.0, 12.0),
];

const CUSTOMERS: &[&str] = &[
    "Sharma Traders",
    "Gupta & Sons",
    "Patel Constructions",
    "Iyer Builders",
    "Singh Hardware",
    "Khan Interiors",
];

/// (name, role, monthly salary)
const STAFF: &[(&str, &str, f64)] = &[
    ("Ramesh Kumar", "Store Manager", 32_000.0),
    ("Sunita Devi", "Accountant", 26_000.0),
    ("Arjun Yadav", "Loader", 15_000.0),
    ("Meena Joshi", "Sales", 18_000.0),
];

#[tokio::main]
async fn main() -> SeedResult<()> {
    let args: Vec<String> = env::args().collect();

    let mut orders_count: usize = 30;
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    orders_count = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Khata Demo Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>     Number of orders to generate (default: 30)");
                println!("  -d, --db <PATH>      Database file (default: from config)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    khata_db::init_tracing();

    let mut config = KhataConfig::load_or_default(config_path);
    if let Some(path) = db_path {
        config.storage.db_path = path;
    }
    let namespace = config.namespace()?;
    let strictness = config.strictness();

    println!("🌱 Khata Demo Data Generator");
    println!("============================");
    println!("Database: {}", config.storage.db_path.display());
    println!("Keys:     {}_<module>_v{}", namespace.app, namespace.version);
    println!("Orders:   {}", orders_count);
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let orders = db.collection::<Order>(&namespace, strictness);
    let existing = orders.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} orders", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let invoices = db.collection::<Invoice>(&namespace, strictness);
    let stock = db.collection::<StockItem>(&namespace, strictness);
    let ledger = db.collection::<FinancialRecord>(&namespace, strictness);
    let filings = db.collection::<GstFiling>(&namespace, strictness);
    let staff = db.collection::<StaffMember>(&namespace, strictness);
    let attendance = db.collection::<AttendanceEntry>(&namespace, strictness);

    let start = date(2024, 1, 1)?;

    // -------------------------------------------------------------------------
    // Stock
    // -------------------------------------------------------------------------
    for &(name, category, unit, qty, cost, price, rate) in STOCK {
        stock
            .create(|id| {
                StockItem::new(id, name, category, unit, qty, cost, price)
                    .with_gst_rate(rate)
                    .with_reorder_level(qty.min(50.0).max(20.0))
            })
            .await?;
    }
    println!("✓ Stock: {} items", STOCK.len());

    // -------------------------------------------------------------------------
    // Orders and invoices
    // -------------------------------------------------------------------------
    let mut paid = Vec::new();
    for n in 0..orders_count {
        let item = STOCK[n % STOCK.len()];
        let quantity = (5 + (n * 7) % 40) as f64;
        let order_date = start + Duration::days((n * 3 % 90) as i64);
        let customer = CUSTOMERS[n % CUSTOMERS.len()];

        let mut order = orders
            .create(|id| {
                Order::new(
                    id,
                    customer,
                    vec![LineItem::new(item.0, quantity, item.5)],
                    item.6,
                    order_date,
                )
                .interstate(n % 5 == 0)
            })
            .await?;

        // Most orders run to delivery; every seventh is still open.
        if n % 7 != 6 {
            for next in [OrderStatus::Processing, OrderStatus::Dispatched, OrderStatus::Delivered] {
                order = orders.try_update(&order.id, |o| o.advance(next)).await?;
            }

            let invoice_date = order_date + Duration::days(1);
            let mut invoice = invoices
                .create(|id| {
                    Invoice::from_order(id, &order, invoice_date)
                        .due_on(invoice_date + Duration::days(15))
                })
                .await?;

            if n % 4 != 3 {
                let method = PaymentMethod::ALL[n % PaymentMethod::ALL.len()];
                let total = invoice.total();
                invoice = invoices
                    .try_update(&invoice.id, |inv| inv.record_payment(total, method))
                    .await?;
                paid.push(invoice);
            }
        }
    }
    println!("✓ Orders: {}", orders.count().await?);
    println!("✓ Invoices: {} ({} paid)", invoices.count().await?, paid.len());

    // -------------------------------------------------------------------------
    // Ledger
    // -------------------------------------------------------------------------
    for invoice in &paid {
        let method = invoice.payment_method.unwrap_or(PaymentMethod::Cash);
        let description = format!("Payment for {}", invoice.id);
        ledger
            .create(|id| {
                FinancialRecord::new(
                    id,
                    EntryType::Income,
                    "Sales",
                    description,
                    invoice.subtotal(),
                    method,
                    invoice.invoice_date,
                )
                .with_gst(invoice.gst_rate, invoice.is_interstate)
            })
            .await?;
    }
    for month in 1..=3u32 {
        let first = date(2024, month, 1)?;
        ledger
            .create(|id| {
                FinancialRecord::new(
                    id,
                    EntryType::Expense,
                    "Rent",
                    "Godown rent",
                    45_000.0,
                    PaymentMethod::BankTransfer,
                    first,
                )
                .with_gst(18.0, false)
            })
            .await?;
        let wages: f64 = STAFF.iter().map(|s| s.2).sum();
        ledger
            .create(|id| {
                FinancialRecord::new(
                    id,
                    EntryType::Expense,
                    "Salaries",
                    "Monthly wages",
                    wages,
                    PaymentMethod::BankTransfer,
                    first,
                )
            })
            .await?;
    }
    let summary = LedgerSummary::summarize(&ledger.all().await?);
    println!(
        "✓ Ledger: income {}, expense {}, net GST payable {}",
        Money::from_rupees(summary.income),
        Money::from_rupees(summary.expense),
        Money::from_rupees(summary.net_gst_payable)
    );

    // -------------------------------------------------------------------------
    // GST filings
    // -------------------------------------------------------------------------
    let all_invoices = invoices.all().await?;
    for month in 1..=3u32 {
        for (k, return_type) in [ReturnType::Gstr1, ReturnType::Gstr3b].into_iter().enumerate() {
            let mut filing =
                GstFiling::prepare(String::new(), return_type, 2024, month, &all_invoices)?;
            if month == 1 {
                filing.mark_filed(date(2024, 2, 10)?, format!("AA07022400{month:02}{k}"))?;
            }
            filings.create(|id| GstFiling { id, ..filing }).await?;
        }
    }
    println!("✓ GST filings: {}", filings.count().await?);

    // -------------------------------------------------------------------------
    // Staff and attendance
    // -------------------------------------------------------------------------
    let joined = date(2023, 6, 1)?;
    let mut members = Vec::new();
    for &(name, role, salary) in STAFF {
        members.push(
            staff
                .create(|id| StaffMember::new(id, name, role, salary, joined))
                .await?,
        );
    }
    let opens = NaiveTime::from_hms_opt(9, 30, 0).ok_or("invalid time")?;
    let closes = NaiveTime::from_hms_opt(19, 0, 0).ok_or("invalid time")?;
    for day in 0..7i64 {
        let on = date(2024, 3, 4)? + Duration::days(day);
        for (n, member) in members.iter().enumerate() {
            let status = match (day as usize + n) % 9 {
                0 => AttendanceStatus::Absent,
                4 => AttendanceStatus::HalfDay,
                8 => AttendanceStatus::Leave,
                _ => AttendanceStatus::Present,
            };
            attendance
                .create(|id| {
                    let entry = AttendanceEntry::new(id, &member.id, on, status);
                    if status == AttendanceStatus::Present {
                        entry.with_times(opens, closes)
                    } else {
                        entry
                    }
                })
                .await?;
        }
    }
    println!(
        "✓ Staff: {} with {} attendance entries",
        members.len(),
        attendance.count().await?
    );

    // -------------------------------------------------------------------------
    // First pages
    // -------------------------------------------------------------------------
    let page_size = config.ui.page_size;
    println!();

    let page = orders
        .page(&Query::from_parts(OrderFilter::default(), OrderSort::Newest), page_size)
        .await?;
    print_header("Orders", page.info());
    for o in page.current_page_slice() {
        println!(
            "  {}  {}  {:<22} {:>14}  {:?}",
            o.id,
            o.order_date,
            o.customer_name,
            Money::from_rupees(o.total()).to_string(),
            o.status
        );
    }

    let page = invoices
        .page(&Query::from_parts(InvoiceFilter::default(), InvoiceSort::BalanceHighToLow), page_size)
        .await?;
    print_header("Invoices", page.info());
    for inv in page.current_page_slice() {
        println!(
            "  {}  {:<22} balance {:>14}  {:?}",
            inv.id,
            inv.customer_name,
            Money::from_rupees(inv.balance_due()).to_string(),
            inv.status
        );
    }

    let page = stock
        .page(&Query::from_parts(StockFilter::default(), StockSort::QuantityLowToHigh), page_size)
        .await?;
    print_header("Stock", page.info());
    for s in page.current_page_slice() {
        println!("  {}  {:<18} {:>8} {:<4} {:?}", s.id, s.name, s.quantity, s.unit, s.status());
    }

    let page = ledger
        .page(&Query::from_parts(LedgerFilter::default(), LedgerSort::AmountHighToLow), page_size)
        .await?;
    print_header("Ledger", page.info());
    for r in page.current_page_slice() {
        println!(
            "  {}  {}  {:<9} {:>14}  {:?}",
            r.id,
            r.date,
            r.category,
            Money::from_rupees(r.total()).to_string(),
            r.entry_type
        );
    }

    let page = filings
        .page(&Query::from_parts(GstFilingFilter::default(), GstFilingSort::PeriodNewest), page_size)
        .await?;
    print_header("GST filings", page.info());
    for f in page.current_page_slice() {
        println!(
            "  {}  {:<8} {}  tax {:>12}  {:?}",
            f.id,
            f.return_type.label(),
            f.period_label(),
            Money::from_rupees(f.total_tax()).to_string(),
            f.status
        );
    }

    let page = staff
        .page(&Query::from_parts(StaffFilter::default(), StaffSort::SalaryHighToLow), page_size)
        .await?;
    print_header("Staff", page.info());
    for m in page.current_page_slice() {
        println!(
            "  {}  {:<14} {:<14} {:>12}",
            m.id,
            m.name,
            m.role,
            Money::from_rupees(m.monthly_salary).to_string()
        );
    }

    let page = attendance
        .page(&Query::from_parts(AttendanceFilter::default(), AttendanceSort::Newest), page_size)
        .await?;
    print_header("Attendance", page.info());
    for a in page.current_page_slice() {
        println!("  {}  {}  {}  {:?}", a.id, a.date, a.staff_id, a.status);
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> SeedResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {year}-{month:02}-{day:02}").into())
}

fn print_header(title: &str, info: khata_core::PageInfo) {
    println!();
    println!(
        "{} (showing {}-{} of {}, page {}/{})",
        title, info.first_item, info.last_item, info.total_items, info.current_page, info.total_pages
    );
}
