use anyhow::Result;
use chrono::Local;
use clap::{ArgGroup, Args, Parser, Subcommand};
use infodivisas::config::LookupTimeouts;
use infodivisas::converter::Converter;
use infodivisas::format;
use infodivisas::widget::Loadable;
use infodivisas::workflow::{ComparisonMode, ComparisonWorkflow};
use infodivisas::{Client, ClientConfig, IndicatorId, stats, storage, viz};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "infodivisas",
    version,
    about = "Current values, historical comparisons and charts of Chilean indicators (mindicador.cl)"
)]
struct Cli {
    /// API base URL.
    #[arg(long, global = true, default_value = infodivisas::config::DEFAULT_BASE_URL)]
    base_url: String,
    /// Locale for number formatting (es, en, de, fr, pt).
    #[arg(long, global = true, default_value = "es")]
    locale: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every indicator in the current snapshot.
    List,
    /// Show the current value of one indicator.
    Value(IndicatorArg),
    /// Compare the current value with a past date or a past year's average.
    Compare(CompareArgs),
    /// Fetch the last 30 values (and optionally plot, save, and print stats).
    Chart(ChartArgs),
    /// Fetch every value of one year (and optionally save and print stats).
    Year(YearArgs),
    /// Convert between CLP and USD at the current dollar rate.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct IndicatorArg {
    /// Indicator id (dolar, euro, uf, utm, ...).
    #[arg(short, long, default_value = "dolar")]
    indicator: String,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("reference").required(true).args(["date", "year"])))]
struct CompareArgs {
    #[command(flatten)]
    indicator: IndicatorArg,
    /// Past business day (YYYY-MM-DD).
    #[arg(short, long)]
    date: Option<String>,
    /// Past year (YYYY), compared by its average.
    #[arg(short, long)]
    year: Option<String>,
    /// Give up waiting after this many seconds (default 60 for dates, 90 for years).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct ChartArgs {
    #[command(flatten)]
    indicator: IndicatorArg,
    /// Write a bar chart to the given .svg path.
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 400).
    #[arg(long, default_value_t = 400)]
    height: u32,
    /// Save the series to file (.csv or .json).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print series statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct YearArgs {
    #[command(flatten)]
    indicator: IndicatorArg,
    /// Year (YYYY), 2000 or later.
    #[arg(short, long)]
    year: i32,
    /// Save the series to file (.csv or .json).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print series statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("amount").required(true).args(["clp", "usd"])))]
struct ConvertArgs {
    /// Amount in pesos to convert to dollars.
    #[arg(long)]
    clp: Option<String>,
    /// Amount in dollars to convert to pesos.
    #[arg(long)]
    usd: Option<String>,
    /// Use this rate instead of fetching the current dollar value.
    #[arg(long)]
    rate: Option<f64>,
}

fn fmt_opt(v: Option<f64>, locale: &str) -> String {
    match v {
        Some(x) if x.is_finite() => format::amount(x, 2, locale),
        _ => "NA".to_string(),
    }
}

fn parse_indicator(arg: &IndicatorArg) -> Result<IndicatorId> {
    Ok(arg.indicator.parse()?)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = ClientConfig::default().with_base_url(cli.base_url.clone());
    match cli.cmd {
        Command::List => cmd_list(config, &cli.locale),
        Command::Value(args) => cmd_value(config, &args, &cli.locale),
        Command::Compare(args) => cmd_compare(config, args),
        Command::Chart(args) => cmd_chart(config, args, &cli.locale),
        Command::Year(args) => cmd_year(config, args, &cli.locale),
        Command::Convert(args) => cmd_convert(config, args, &cli.locale),
    }
}

fn cmd_list(config: ClientConfig, locale: &str) -> Result<()> {
    let client = Client::new(config)?;
    for (id, s) in client.get_all_indicators()? {
        println!(
            "{:<18} {:<32} {:>14} {:<10} {}",
            id.as_str(),
            s.name,
            format::amount(s.value, 2, locale),
            s.display_unit(),
            format::long_date(s.date)
        );
    }
    Ok(())
}

fn cmd_value(config: ClientConfig, args: &IndicatorArg, locale: &str) -> Result<()> {
    let client = Client::new(config)?;
    let id = parse_indicator(args)?;
    let s = client.get_indicator_value(&id)?;
    println!("{}: {}", s.name, format::money(s.value, 2, &s.display_unit(), locale));
    println!("Última actualización: {}", format::long_date(s.date));
    Ok(())
}

fn cmd_compare(config: ClientConfig, args: CompareArgs) -> Result<()> {
    let client = Client::new(config)?;
    let id = parse_indicator(&args.indicator)?;
    let mut timeouts = LookupTimeouts::default();
    if let Some(secs) = args.timeout_secs {
        timeouts.by_date = Duration::from_secs(secs);
        timeouts.by_year = Duration::from_secs(secs);
    }

    let mut workflow = ComparisonWorkflow::new(id).with_timeouts(timeouts);
    match (&args.date, &args.year) {
        (Some(date), _) => {
            workflow.set_mode(ComparisonMode::Date);
            workflow.set_date(date);
        }
        (None, Some(year)) => {
            workflow.set_mode(ComparisonMode::Year);
            workflow.set_year(year);
        }
        // clap's ArgGroup requires one of them
        (None, None) => anyhow::bail!("either --date or --year is required"),
    }

    let today = Local::now().date_naive();
    workflow.run(&client, None, today);
    let message = workflow.message().unwrap_or_default();
    match workflow.state() {
        Loadable::Success(outcome) => {
            println!(
                "Valor {} {}: ${:.2} {}",
                outcome.reference.name,
                outcome.reference.label.describe(),
                outcome.reference.value,
                outcome.reference.unit
            );
            println!("{}", message);
            Ok(())
        }
        _ => anyhow::bail!(message),
    }
}

fn print_stats(points: &[infodivisas::SeriesPoint], locale: &str) {
    let s = stats::summary(points);
    println!(
        "count={}  min={} max={} mean={} median={}  latest={} change={} ({}%)",
        s.count,
        fmt_opt(s.min, locale),
        fmt_opt(s.max, locale),
        fmt_opt(s.mean, locale),
        fmt_opt(s.median, locale),
        fmt_opt(s.latest, locale),
        fmt_opt(s.change, locale),
        fmt_opt(s.change_pct, locale),
    );
}

fn cmd_chart(config: ClientConfig, args: ChartArgs, locale: &str) -> Result<()> {
    let client = Client::new(config)?;
    let id = parse_indicator(&args.indicator)?;
    let points = client.get_indicator_series(&id)?;

    if let Some(path) = args.out.as_ref() {
        storage::save_by_extension(&points, path)?;
        eprintln!("Saved {} rows to {}", points.len(), path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let title = format!("Histórico {}: últimos {} días hábiles", id.label(), points.len());
        viz::plot_bars(&points, plot_path, args.width, args.height, &title, locale)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    if args.stats {
        print_stats(&points, locale);
    }

    if args.out.is_none() && args.plot.is_none() && !args.stats {
        for p in &points {
            println!("{}  {}", format::short_date(p.date), format::amount(p.value, 2, locale));
        }
    }
    Ok(())
}

fn cmd_year(config: ClientConfig, args: YearArgs, locale: &str) -> Result<()> {
    let client = Client::new(config)?;
    let id = parse_indicator(&args.indicator)?;
    let series = client.get_indicator_by_year(&id, args.year)?;
    println!(
        "{} ({}) {}: {} valores",
        series.name,
        series.display_unit(),
        args.year,
        series.series.len()
    );

    if let Some(path) = args.out.as_ref() {
        storage::save_by_extension(&series.series, path)?;
        eprintln!("Saved {} rows to {}", series.series.len(), path.display());
    }
    if args.stats {
        print_stats(&series.series, locale);
    }
    Ok(())
}

fn cmd_convert(config: ClientConfig, args: ConvertArgs, locale: &str) -> Result<()> {
    let rate = match args.rate {
        Some(r) => r,
        None => Client::new(config)?.get_indicator_value(&IndicatorId::Dolar)?.value,
    };
    let converter = Converter::new(rate)?;
    if let Some(clp) = args.clp.as_deref() {
        let usd = converter
            .clp_field_to_usd(clp)
            .ok_or_else(|| anyhow::anyhow!("invalid CLP amount: {}", clp))?;
        println!("{} CLP = {} USD", clp.trim(), usd);
    }
    if let Some(usd) = args.usd.as_deref() {
        let clp = converter
            .usd_field_to_clp(usd)
            .ok_or_else(|| anyhow::anyhow!("invalid USD amount: {}", usd))?;
        println!("{} USD = {} CLP", usd.trim(), clp);
    }
    eprintln!("1 USD = {} CLP", format::amount(rate, 2, locale));
    Ok(())
}
