use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use colored::*;

mod data;
mod outline;
mod runner;

#[derive(Parser)]
#[command(name = "tagfill")]
#[command(version = "0.1.0")]
#[command(about = "Fill bracket-tagged document templates with data")]
struct Tagfill {
    /// print debug logs
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// render a template with a data file
    Render(RenderArgs),
    /// list the tags of a template without rendering it
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct RenderArgs {
    /// outline template path (one paragraph per line, runs split by tabs)
    template: String,

    /// TOML data file
    #[arg(long)]
    data: String,

    /// output path, stdout when missing
    #[arg(long)]
    out: Option<String>,

    /// only join split tags, substitute nothing
    #[arg(long, default_value_t = false)]
    skip: bool,

    /// use quiet mode
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// outline template path
    template: String,
}

pub fn main() {
    let cli = Tagfill::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Render(args) => {
            let timer = Instant::now();
            let r = runner::render(args);
            let duration = timer.elapsed();
            match r {
                Err(e) => {
                    eprintln!("[tagfill] Render failed: {}", format!("{e:#}").red().bold());
                    std::process::exit(1);
                }
                Ok(summary) => {
                    if !args.quiet {
                        eprintln!();
                        eprintln!(
                            "📕 {} {}",
                            "Sections: ".green().bold(),
                            summary.sections.join(", ").purple().italic()
                        );
                        if !summary.nested.is_empty() {
                            eprintln!(
                                "🔖 {} {}",
                                "Unfilled loop tags: ".yellow().bold(),
                                summary.nested.join(", ").cyan().italic()
                            );
                        }
                        eprintln!(
                            "🧩 {} {}",
                            "Split tags joined: ".blue().bold(),
                            summary.joined.to_string().cyan().italic()
                        );
                        if let Some(out) = &summary.output {
                            eprintln!(
                                "💾 {} {}",
                                "Output: ".blue().bold(),
                                out.purple().italic()
                            );
                        }
                        eprintln!(
                            "⌛️ {} {}",
                            "Render Time: ".purple().bold(),
                            format!("{:?}", duration).green().italic()
                        );
                    }
                }
            }
        }
        Commands::Inspect(args) => match runner::inspect(args) {
            Err(e) => {
                eprintln!("[tagfill] Inspect failed: {}", format!("{e:#}").red().bold());
                std::process::exit(1);
            }
            Ok(tags) => {
                if tags.is_empty() {
                    println!("{}", "no tags found.".yellow().bold());
                }
                for tag in tags {
                    let mut line = format!("#{:<4} {}", tag.block, tag.raw.cyan().bold());
                    if tag.suppress {
                        line.push_str(&format!("  {}", "suppressed".red()));
                    }
                    if let Some(alt) = &tag.alt {
                        line.push_str(&format!("  shown as `{}`", alt.green()));
                    }
                    println!("{line}");
                }
            }
        },
    }
}
