//! Command-line interface definitions.
//!
//! The target unit and article count can be given as flags or environment
//! variables. Whatever is missing is asked for interactively.

use clap::Parser;

/// Largest number of articles a single run may request.
pub const MAX_COUNT: usize = 80;

/// Command-line arguments for the Ministry of Education news scraper.
///
/// # Examples
///
/// ```sh
/// # Fully non-interactive
/// edu_news_scraper --unit 體育署 --count 10 -o ./out
///
/// # Prompt for unit and count
/// edu_news_scraper
///
/// # Quick check: three 體育署 articles
/// edu_news_scraper --sample
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Publishing unit to collect (e.g. 體育署, 國教署, 青年署)
    #[arg(short, long, env = "EDU_NEWS_UNIT")]
    pub unit: Option<String>,

    /// Number of articles to collect (1-80)
    #[arg(short = 'n', long, env = "EDU_NEWS_COUNT", value_parser = clap::value_parser!(u16).range(1..=MAX_COUNT as i64))]
    pub count: Option<u16>,

    /// Directory for the JSON output file
    #[arg(short, long, env = "EDU_NEWS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: String,

    /// Optional path to a YAML crawler config
    #[arg(short, long)]
    pub config: Option<String>,

    /// Sample run: collect 3 體育署 articles into test_sports_news_*.json
    #[arg(long, conflicts_with_all = ["unit", "count"])]
    pub sample: bool,

    /// Accept the prompted settings without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}
