//! Game review CLI
//!
//! Analyzes one game from a PGN file with a local Stockfish and prints a
//! move-quality report.

use anyhow::Context;
use chess_core::pgn;
use tracing::info;

use game_review::engine::stockfish::StockfishSession;
use game_review::viewer::ViewState;
use game_review::{analyze_game, report, AnalysisOptions, Evaluator, ReplayView, ReviewConfig};

const USAGE: &str = "usage: game-review <file.pgn|-> [--game N] [--json] [--board]";

#[derive(Debug, Default)]
struct Args {
    path: Option<String>,
    game: usize,
    json: bool,
    board: bool,
}

/// Parse CLI args by hand
fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        game: 1,
        ..Args::default()
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--game" => {
                args.game = iter
                    .next()
                    .and_then(|v| v.parse().ok())
                    .filter(|n| *n > 0)
                    .context("--game expects a positive number")?;
            }
            "--json" => args.json = true,
            "--board" => args.board = true,
            "-h" | "--help" => anyhow::bail!(USAGE),
            _ if args.path.is_none() => args.path = Some(arg),
            _ => anyhow::bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }
    Ok(args)
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        return std::io::read_to_string(std::io::stdin()).context("reading stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {path}"))
}

fn print_frame(state: &ViewState) {
    let played = state
        .last_move
        .as_ref()
        .map(|m| match m.tag {
            Some(tag) => format!("{} ({})", m.san, tag.as_str()),
            None => m.san.clone(),
        })
        .unwrap_or_else(|| "start".to_string());
    let suggestion = state
        .candidate
        .as_ref()
        .map(|c| format!("  engine: {} {}", c.eval_text, c.pv_san.join(" ")))
        .unwrap_or_default();
    println!("{:>3}/{} {:<16} {}{suggestion}", state.ply, state.total, played, state.fen);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    let path = args.path.as_deref().context(USAGE)?;
    let text = read_input(path)?;

    let games = pgn::split_games(&text);
    let raw = games
        .get(args.game - 1)
        .with_context(|| format!("game {} not found, input holds {}", args.game, games.len()))?;
    let game = pgn::tokenize(raw)?;

    let config = ReviewConfig::load()?;
    let options = AnalysisOptions::from(&config);
    info!(
        stockfish_path = %config.engine.path,
        budget = %options.budget,
        line_count = options.line_count,
        "Config loaded"
    );

    let session = StockfishSession::spawn(&config.engine).await?;
    let mut evaluator = Evaluator::with_line_count(session, config.engine.line_count);
    let result = analyze_game(&mut evaluator, &game, &options, |p| {
        if p.ply % 10 == 0 || p.ply == p.total {
            info!(ply = p.ply, total = p.total, "Progress");
        }
    })
    .await;
    evaluator.close().await;
    let analysis = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", report::render_text(&analysis));
    }

    if args.board {
        let mut view = ReplayView::from_analysis(&analysis)?;
        println!();
        print_frame(view.first());
        for _ in 0..view.total() {
            print_frame(view.next());
        }
    }

    Ok(())
}
