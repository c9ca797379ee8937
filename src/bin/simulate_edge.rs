//! House-edge report for the payout schedule
//!
//! Prints the analytic return to player for every cash-out point and, when
//! `--games` is non-zero, checks one strategy by Monte Carlo.

use clap::Parser;
use mines::games::payout::DEFAULT_HOUSE_EDGE;
use mines::games::simulation::{rtp_table, simulate};
use rand::{rngs::StdRng, SeedableRng};

#[derive(Parser, Debug)]
#[command(name = "mines-sim")]
#[command(about = "Payout schedule house-edge analysis", long_about = None)]
struct Args {
    /// Mines on the board (1-24)
    #[arg(long, default_value = "3")]
    mines: usize,

    /// House edge factor applied to the schedule
    #[arg(long, default_value_t = DEFAULT_HOUSE_EDGE)]
    house_edge: f64,

    /// Safe reveals before cashing out in the simulation
    #[arg(long, default_value = "3")]
    reveals: usize,

    /// Simulated games (0 skips the simulation)
    #[arg(long, default_value = "100000")]
    games: u64,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Mines payout analysis");
    println!("=====================");
    println!("Mines: {}  House edge: {}\n", args.mines, args.house_edge);

    println!("{:>8} {:>12}", "reveals", "rtp");
    for (reveals, rtp) in rtp_table(args.mines, args.house_edge)? {
        println!("{:>8} {:>11.2}%", reveals, rtp * 100.0);
    }

    if args.games == 0 {
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = simulate(args.mines, args.house_edge, args.reveals, args.games, &mut rng)?;

    println!("\nSimulation: cash out after {} reveals", report.target_reveals);
    println!("   Games:          {}", report.games);
    println!("   Wins / losses:  {} / {}", report.wins, report.losses);
    println!("   Wagered:        {:.2}", report.total_wagered);
    println!("   Paid out:       {:.2}", report.total_paid_out);
    println!("   RTP:            {:.2}%", report.rtp * 100.0);
    println!("   House profit:   {:.4} per unit bet", report.house_profit_per_game);

    Ok(())
}
