// ==========================================
// 教材管理系统 - 命令行入口
// ==========================================
// 用法:
//   textbook-forecast [db_path] [--subject S] [--class C] [--search T]
//                     [--alarms] [--locale de|en] [--json]
// 输出: 汇总报表 + 需补订教材列表
// ==========================================

use std::sync::{Arc, Mutex};

use textbook_forecast::api::{InventoryReport, TextbookApi};
use textbook_forecast::config::ConfigManager;
use textbook_forecast::db::{default_db_path, init_schema, open_sqlite_connection};
use textbook_forecast::engine::report::TextbookFilter;
use textbook_forecast::i18n;
use textbook_forecast::logging;
use textbook_forecast::repository::SqliteTextbookStore;

struct CliOptions {
    db_path: Option<String>,
    filter: TextbookFilter,
    locale: Option<String>,
    json: bool,
}

fn parse_args() -> Result<CliOptions, String> {
    let mut options = CliOptions {
        db_path: None,
        filter: TextbookFilter::default(),
        locale: None,
        json: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--alarms" => options.filter.alarm_only = true,
            "--json" => options.json = true,
            "--subject" | "--class" | "--search" | "--locale" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("{} 需要一个参数", arg))?;
                match arg.as_str() {
                    "--subject" => options.filter.subject = Some(value),
                    "--class" => options.filter.class = Some(value),
                    "--search" => options.filter.text = Some(value),
                    _ => options.locale = Some(value),
                }
            }
            other if other.starts_with("--") => return Err(format!("未知参数: {}", other)),
            other => options.db_path = Some(other.to_string()),
        }
    }

    Ok(options)
}

fn print_report(report: &InventoryReport) {
    println!(
        "{:<20} {:<36} {:<14} {:>6} {:>6} {:>6} {:>6} {:>7}",
        "ISBN", "Titel", "Fach", "Gesamt", "Rück", "Verf.", "Bedarf", "Saldo"
    );
    for row in &report.rows {
        println!(
            "{:<20} {:<36} {:<14} {:>6} {:>6} {:>6} {:>6} {:>7}{}",
            row.isbn,
            truncate(&row.title, 36),
            truncate(&row.subject, 14),
            row.grand_total,
            row.returning_total,
            row.forecast_available,
            row.projected_need,
            row.shortfall,
            if row.alarm { "  !" } else { "" }
        );
    }

    let titles = report.summary.title_count.to_string();
    let copies = report.summary.total_copies.to_string();
    let alarms = report.summary.alarm_count.to_string();
    println!();
    println!(
        "{}",
        i18n::t_with_args(
            "report.summary",
            &[
                ("titles", titles.as_str()),
                ("copies", copies.as_str()),
                ("alarms", alarms.as_str()),
            ],
        )
    );

    if report.alarms.is_empty() {
        return;
    }

    let count = report.alarms.len().to_string();
    let reserve = report.reserve_copies.to_string();
    println!();
    println!(
        "{}",
        i18n::t_with_args(
            "report.alarm_banner",
            &[("count", count.as_str()), ("reserve", reserve.as_str())],
        )
    );
    for row in &report.alarms {
        println!(
            "  {} {} ({}): -{}",
            row.isbn,
            row.title,
            row.class_breakdown,
            row.shortfall.unsigned_abs()
        );
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let options = parse_args()?;
    if let Some(locale) = options.locale.as_deref() {
        i18n::set_locale(locale);
    }

    let db_path = options.db_path.clone().unwrap_or_else(default_db_path);
    tracing::info!(db_path = %db_path, version = textbook_forecast::VERSION, "打开数据库");

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())?.load_forecast_config()?;
    let store = Arc::new(SqliteTextbookStore::from_connection(conn));
    let api = TextbookApi::new(store, config);

    let report = api.get_inventory_report(&options.filter)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
