use clap::Parser;
use panel_cutter::render;
use panel_cutter::solver::Solver;
use panel_cutter::types::{Demand, Rect, Solution, Stock};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "panel_cutter",
    about = "Guillotine sheet layout with cut counting"
)]
struct Cli {
    /// Stock sheet dimensions (WxH, e.g. 2440x1220)
    #[arg(long)]
    stock: String,

    /// Pieces as WxH:qty or WxH:qty:label (e.g. 1000x600:6 400x300:2:shelf)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Blade kerf width (default: 0)
    #[arg(long, default_value_t = 0)]
    kerf: u32,

    /// Material trimmed from each sheet edge before cutting (default: 0)
    #[arg(long, default_value_t = 0)]
    trim: u32,

    /// Disable piece rotation
    #[arg(long)]
    no_rotate: bool,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,

    /// Print the solution as JSON
    #[arg(long, conflicts_with = "layout")]
    json: bool,

    /// Log to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let Some((w, h)) = s.split_once('x') else {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    };
    let w = w
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let h = h
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(w, h))
}

fn parse_cut(s: &str, allow_rotate: bool) -> Result<Demand<Option<String>>, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(dims), Some(qty)) = (parts.next(), parts.next()) else {
        return Err(format!("invalid cut '{}', expected WxH:qty[:label]", s));
    };
    let rect = parse_dimensions(dims)?;
    let qty = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if qty == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    Ok(Demand {
        rect,
        qty,
        allow_rotate,
        meta: parts.next().map(str::to_string),
    })
}

fn print_text(solution: &Solution<Option<String>>, layout: bool) {
    for (i, sheet) in solution.sheets.iter().enumerate() {
        println!(
            "Sheet {}: {} cut{}, {:.1}% used",
            i + 1,
            sheet.cut_count,
            if sheet.cut_count == 1 { "" } else { "s" },
            sheet.efficiency_percent(),
        );
        for p in &sheet.placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            let label = p.meta.as_deref().map(|l| format!(" {l}")).unwrap_or_default();
            println!("  {} @ ({}, {}){}{}", p.rect, p.x, p.y, rot, label);
        }
        if layout {
            print!("{}", render::render_sheet(&solution.stock, sheet));
        }
        println!();
    }

    if !solution.unplaced.is_empty() {
        println!("Unplaced (do not fit on an empty sheet):");
        for piece in &solution.unplaced {
            let label = piece.meta.as_deref().map(|l| format!(" {l}")).unwrap_or_default();
            println!("  {}{}", piece.rect, label);
        }
        println!();
    }

    println!(
        "Summary: {} sheet{} used, {} cuts, {:.1}% waste",
        solution.sheet_count(),
        if solution.sheet_count() == 1 { "" } else { "s" },
        solution.total_cuts(),
        solution.total_waste_percent(),
    );
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let rect = parse_dimensions(&cli.stock).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let demands: Vec<Demand<Option<String>>> = cli
        .cuts
        .iter()
        .map(|c| parse_cut(c, !cli.no_rotate))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let stock = Stock::new(rect).with_kerf(cli.kerf).with_trim(cli.trim);
    let solution = Solver::new(stock)
        .and_then(|solver| solver.solve_demands(&demands))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    if cli.json {
        match serde_json::to_string_pretty(&solution) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_text(&solution, cli.layout);
    }

    if !solution.unplaced.is_empty() {
        std::process::exit(2);
    }
}
