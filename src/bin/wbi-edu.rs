use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wbi_edu::cache::MemoCache;
use wbi_edu::catalog::{display_label, title_label};
use wbi_edu::config::Config;
use wbi_edu::loader::{LoadOutcome, Offline};
use wbi_edu::{
    Client, DashboardView, DataOrigin, DataSource, IndicatorCatalog, LoadError, Loader, Selection,
    storage, viz,
};

#[derive(Parser, Debug)]
#[command(
    name = "wbi-edu",
    version,
    about = "Education inequality dashboard on World Bank indicators"
)]
struct Cli {
    /// Config file (JSON). Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the cache file location.
    #[arg(long, global = true)]
    cache_file: Option<PathBuf>,
    /// Skip the API and use the cache file only.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the indicator catalog (code and short name).
    Indicators,
    /// Load the data (API or cache) and report where it came from.
    Load,
    /// Build the dashboard for a selection and print it (optionally export and plot).
    Show(ShowArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum GiniFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// ISO2 country codes (e.g. SN,KE) separated by comma or semicolon (default: first three in the data)
    #[arg(short, long)]
    countries: Option<String>,
    /// Year (YYYY) or range (YYYY:YYYY)
    #[arg(short, long)]
    years: Option<String>,
    /// Indicator short name (see `indicators`)
    #[arg(short, long)]
    indicator: Option<String>,
    /// Write the raw-data export CSV. A directory gets the default file name.
    #[arg(long)]
    export: Option<PathBuf>,
    /// Write the Gini series to a file (format by --gini-format or extension).
    #[arg(long)]
    gini_out: Option<PathBuf>,
    #[arg(long, value_enum)]
    gini_format: Option<GiniFormat>,
    /// Chart of the Gini series (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Chart of the indicator per country (.svg or .png).
    #[arg(long)]
    plot_indicator: Option<PathBuf>,
    /// Width of the plots (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plots (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Also print the values of every year (animated map frames).
    #[arg(long, default_value_t = false)]
    frames: bool,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_years(s: &str) -> Option<(i32, i32)> {
    if let Some((a, b)) = s.split_once(':') {
        let start = a.trim().parse::<i32>().ok()?;
        let end = b.trim().parse::<i32>().ok()?;
        Some((start.min(end), start.max(end)))
    } else {
        s.trim().parse::<i32>().ok().map(|y| (y, y))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.cache_file.clone() {
        config.cache_file = path;
    }
    let catalog = IndicatorCatalog::education();

    match cli.cmd {
        Command::Indicators => {
            for (code, name) in catalog.iter() {
                println!("{:<20} {}", code, name);
            }
            Ok(())
        }
        Command::Load => {
            let loaded = load_or_halt(&config, &catalog, cli.offline)?;
            println!(
                "{} rows, {} countries, years {}",
                loaded.table.len(),
                loaded.table.countries().len(),
                loaded
                    .table
                    .year_bounds()
                    .map(|(a, b)| format!("{a}-{b}"))
                    .unwrap_or_else(|| "none".into())
            );
            Ok(())
        }
        Command::Show(args) => {
            let loaded = load_or_halt(&config, &catalog, cli.offline)?;
            cmd_show(&config, &catalog, &loaded, args)
        }
    }
}

/// Load the table, printing the origin notice. Exits when no data is available.
fn load_or_halt(
    config: &Config,
    catalog: &IndicatorCatalog,
    offline: bool,
) -> Result<LoadOutcome> {
    let source: Box<dyn DataSource> = if offline {
        Box::new(Offline)
    } else {
        Box::new(Client::with_base_url(&config.base_url)?.source(config.source))
    };
    let memo = MemoCache::new(chrono::Duration::hours(config.memo_ttl_hours));
    let mut loader = Loader::with_memo(source, &config.cache_file, memo);

    match loader.load(catalog, &config.countries, config.date_range()) {
        Ok(loaded) => {
            match &loaded.origin {
                DataOrigin::Remote => eprintln!("Data loaded from the API."),
                DataOrigin::Memoized => eprintln!("Data loaded from the in-memory cache."),
                DataOrigin::CacheFile { reason } => {
                    eprintln!("API connection failed: {reason}");
                    eprintln!("Local data loaded from {}.", loader.cache_file().display());
                }
            }
            Ok(loaded)
        }
        Err(e @ LoadError::InvalidRequest(_)) => Err(e.into()),
        Err(e) => {
            eprintln!("No data available. Connect to the internet and try again.");
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}

fn cmd_show(
    config: &Config,
    catalog: &IndicatorCatalog,
    loaded: &LoadOutcome,
    args: ShowArgs,
) -> Result<()> {
    let table = &loaded.table;
    let mut selection = Selection::default_for(table, catalog);
    if let Some(c) = &args.countries {
        selection.countries = parse_list(c);
    }
    if let Some(y) = &args.years {
        selection.years =
            parse_years(y).ok_or_else(|| anyhow!("invalid --years, expected YYYY or YYYY:YYYY"))?;
    }
    if let Some(ind) = args.indicator {
        selection.indicator = ind;
    }

    let view = DashboardView::build(table, catalog, &selection)?;
    if !view.unknown_countries.is_empty() {
        eprintln!(
            "Not in the data: {} (known: {})",
            view.unknown_countries.join(", "),
            table.countries().join(", ")
        );
    }
    let label = view.indicator_label();
    let (from, to) = selection.years;

    println!("Indicator: {} ({})", label, view.indicator_code);
    println!("Countries: {}", selection.countries.join(", "));
    println!("Years: {}-{}", from, to);
    println!();
    println!("Gini index of {} by year:", label);
    for p in &view.gini.points {
        println!("  {}  {}", p.year, fmt_opt(p.gini));
    }
    println!();

    match &view.map {
        Some(frame) => {
            println!("{} ({}):", title_label(&selection.indicator), frame.year);
            for e in &frame.entries {
                println!("  {:<5} {:<28} {}", e.country, e.country_name, fmt_opt(Some(e.value)));
            }
        }
        None => println!("No values of {} for {}; map skipped.", label, to),
    }
    if args.frames {
        for frame in &view.frames {
            let cells: Vec<String> = frame
                .entries
                .iter()
                .map(|e| format!("{}={}", e.country, fmt_opt(Some(e.value))))
                .collect();
            println!("  {}: {}", frame.year, cells.join(" "));
        }
    }
    println!();
    for line in view.summary_lines() {
        println!("{line}");
    }

    if let Some(path) = args.export.as_ref() {
        let path = if path.is_dir() {
            path.join(selection.export_file_name())
        } else {
            path.clone()
        };
        storage::save_export_csv(&view.export, &selection.indicator, &path)?;
        eprintln!("Saved {} rows to {}", view.export.len(), path.display());
    }

    if let Some(path) = args.gini_out.as_ref() {
        let fmt = match args.gini_format {
            Some(GiniFormat::Csv) => "csv",
            Some(GiniFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_gini_csv(&view.gini, path)?,
            "json" => storage::save_gini_json(&view.gini, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Wrote Gini series to {}", path.display());
    }

    if args.plot.is_some() || args.plot_indicator.is_some() {
        viz::ensure_fonts_registered(config.font_path.as_deref());
    }
    if let Some(path) = args.plot.as_ref() {
        let title = format!("Inequality in {}", display_label(&selection.indicator));
        match viz::plot_gini(&view.gini, path, args.width, args.height, &title) {
            Ok(()) => eprintln!("Wrote plot to {}", path.display()),
            Err(e) => eprintln!("Gini chart skipped: {e}"),
        }
    }
    if let Some(path) = args.plot_indicator.as_ref() {
        let title = format!("{} ({}-{})", title_label(&selection.indicator), from, to);
        let column = &selection.indicator;
        match viz::plot_indicator(&view.filtered, column, path, args.width, args.height, &title) {
            Ok(()) => eprintln!("Wrote plot to {}", path.display()),
            Err(e) => eprintln!("Indicator chart skipped: {e}"),
        }
    }

    Ok(())
}
