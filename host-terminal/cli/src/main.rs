//! Terminal identification CLI.
//!
//! Reports which terminal emulator hosts the current shell:
//! - Environment-based guess (TERM, COLORTERM, VTE_VERSION, Konsole)
//! - Process-ancestry probe for ambiguous xterm-like environments
//! - The final descriptor handed to a terminal-control layer

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use host_terminal::{
    DetectionConfig, Detector, EnvSnapshot, ProbeError, TerminalDescriptor, TerminalGuess,
    classify,
    discovery::families::FAMILIES,
    env::{COLORTERM, KONSOLE_MARKER, SSH_CONNECTION, TERM, VTE_VERSION},
    probe_parent_terminal_system,
};
use serde::Serialize;

/// Terminal identification utility
#[derive(Parser, Debug)]
#[command(name = "hterm")]
#[command(author, version, about = "Identify the terminal emulator hosting this process")]
#[command(after_help = "\
SHELL COMPLETIONS:
    # Bash
    echo 'source <(COMPLETE=bash hterm)' >> ~/.bashrc

    # Zsh
    hterm --completions zsh > ~/.zfunc/_hterm

ENVIRONMENT:
    HOST_TERMINAL_PREFER_SIGWINCH=1   prefer SIGWINCH for resize handling
    RUST_LOG=host_terminal=debug      trace detection decisions
")]
struct Args {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (show the environment variables that were read)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Prefer SIGWINCH over in-band resize reports
    #[arg(long, global = true)]
    prefer_sigwinch: bool,

    /// Do not listen for SIGWINCH at all
    #[arg(long, global = true, conflicts_with = "prefer_sigwinch")]
    no_sigwinch: bool,

    /// Generate shell completions and exit.
    #[arg(long, value_name = "SHELL", global = true)]
    completions: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the environment only, without looking at processes
    Guess,

    /// Walk the process ancestry only (fails over SSH or when nothing matches)
    Probe,

    /// List every terminal family the detector knows about
    Families,
}

#[derive(Debug, Serialize)]
struct DetectionReport<'a> {
    guess: &'a TerminalGuess,
    terminal: &'a TerminalDescriptor,
}

#[derive(Debug, Serialize)]
struct ProbeFailure {
    error: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Handle dynamic completions (COMPLETE env var)
    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Args::parse();

    if let Some(ref shell_arg) = args.completions {
        return handle_completions(shell_arg);
    }

    let env = EnvSnapshot::from_process();
    let palette = Palette::new(&env);

    match &args.command {
        Some(Command::Guess) => {
            let guess = classify(&env);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&guess)?);
            } else {
                print_guess(&guess, &palette);
                if args.verbose {
                    print_env(&env, &palette);
                }
            }
        }
        Some(Command::Probe) => {
            match probe_parent_terminal_system().await {
                Ok(info) if args.json => println!("{}", serde_json::to_string_pretty(&info)?),
                Ok(info) => {
                    println!("{}Process Probe{}", palette.bold, palette.reset);
                    println!("  App ID:     {}", info.app_id);
                    println!("  App Name:   {}", info.app_name);
                    println!("  PID:        {}", info.pid);
                }
                Err(error) => return probe_failed(&error, args.json),
            }
        }
        Some(Command::Families) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(FAMILIES)?);
            } else {
                print_families(&palette);
            }
        }
        None => {
            let config = resolve_config(&args, &env);
            tracing::debug!(?config, "Resolved detection config");
            let guess = classify(&env);
            let descriptor = Detector::system()
                .with_env(env.clone())
                .with_config(config)
                .describe()
                .await;

            if args.json {
                let report = DetectionReport {
                    guess: &guess,
                    terminal: &descriptor,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_guess(&guess, &palette);
                print_descriptor(&descriptor, &palette);
                if args.verbose {
                    print_env(&env, &palette);
                }
            }
        }
    }

    Ok(())
}

/// Applies the command-line resize flags on top of the environment defaults.
fn resolve_config(args: &Args, env: &EnvSnapshot) -> DetectionConfig {
    let mut config = DetectionConfig::from_env(env);
    if args.prefer_sigwinch {
        config = config.with_prefer_process_sigwinch(true);
    }
    if args.no_sigwinch {
        config = config
            .with_process_sigwinch(false)
            .with_prefer_process_sigwinch(false);
    }
    config
}

fn probe_failed(error: &ProbeError, json: bool) -> color_eyre::Result<()> {
    if json {
        let failure = ProbeFailure {
            error: error.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&failure)?);
    } else {
        eprintln!("error: {error}");
    }
    std::process::exit(1);
}

/// Handles the --completions flag.
fn handle_completions(shell_arg: &str) -> color_eyre::Result<()> {
    let shell = match shell_arg.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "elvish" => Shell::Elvish,
        "fish" => Shell::Fish,
        "powershell" | "pwsh" => Shell::PowerShell,
        "zsh" => Shell::Zsh,
        _ => {
            eprintln!(
                "error: invalid shell '{}'\n\nValid shells: bash, elvish, fish, powershell, zsh",
                shell_arg
            );
            std::process::exit(1);
        }
    };

    let mut cmd = Args::command();
    clap_complete::generate(shell, &mut cmd, "hterm", &mut std::io::stdout());
    Ok(())
}

/// ANSI styles, blanked out when `NO_COLOR` is set.
struct Palette {
    bold: &'static str,
    dim: &'static str,
    reset: &'static str,
    green: &'static str,
    yellow: &'static str,
    blue: &'static str,
}

impl Palette {
    fn new(env: &EnvSnapshot) -> Self {
        if env.names().any(|name| name == "NO_COLOR") {
            return Palette {
                bold: "",
                dim: "",
                reset: "",
                green: "",
                yellow: "",
                blue: "",
            };
        }

        Palette {
            bold: "\x1b[1m",
            dim: "\x1b[2m",
            reset: "\x1b[0m",
            green: "\x1b[32m",
            yellow: "\x1b[33m",
            blue: "\x1b[34m",
        }
    }

    fn yes_no(&self, value: bool) -> String {
        if value {
            format!("{}yes{}", self.green, self.reset)
        } else {
            "no".to_string()
        }
    }

    fn or_na(&self, value: Option<String>) -> String {
        value.unwrap_or_else(|| format!("{}n/a{}", self.dim, self.reset))
    }
}

fn print_guess(guess: &TerminalGuess, p: &Palette) {
    println!();
    println!("{}Terminal Detection{}", p.bold, p.reset);
    println!("{}═══════════════════════════════════════{}", p.dim, p.reset);

    println!("\n{}{}Environment Guess{}", p.bold, p.blue, p.reset);
    println!("  App ID:     {}", p.or_na(guess.app_id.clone()));
    println!("  Generic:    {}", guess.generic);
    println!("  Safe:       {}", p.yes_no(guess.safe));
    println!(
        "  SSH:        {}",
        if guess.ssh {
            format!("{}yes{}", p.yellow, p.reset)
        } else {
            "no".to_string()
        }
    );
}

fn print_descriptor(d: &TerminalDescriptor, p: &Palette) {
    println!("\n{}{}Terminal{}", p.bold, p.blue, p.reset);
    println!("  App ID:     {}", p.or_na(d.app_id.clone()));
    println!("  App Name:   {}", p.or_na(d.app_name.clone()));
    println!("  PID:        {}", p.or_na(d.pid.map(|pid| pid.to_string())));
    println!("  Generic:    {}", d.generic);
    println!("  Source:     {:?}", d.source);
    println!("  SIGWINCH:   {}", p.yes_no(d.process_sigwinch));
    println!("  Prefer it:  {}", p.yes_no(d.prefer_process_sigwinch));
    println!();
}

fn print_env(env: &EnvSnapshot, p: &Palette) {
    println!("{}{}Environment{}", p.bold, p.blue, p.reset);
    for name in [TERM, COLORTERM, VTE_VERSION, SSH_CONNECTION] {
        println!("  {:<15} {}", name, p.or_na(env.get(name).map(String::from)));
    }
    let konsole: Vec<&str> = env.names().filter(|n| n.contains(KONSOLE_MARKER)).collect();
    if !konsole.is_empty() {
        println!("  {:<15} {}", format!("{KONSOLE_MARKER}_*"), konsole.join(", "));
    }
    println!();
}

fn print_families(p: &Palette) {
    println!("{}Known Terminal Families{}", p.bold, p.reset);
    for family in FAMILIES {
        let processes: Vec<&str> = family.process_names.iter().map(|a| a.name).collect();
        println!(
            "\n  {}{}{}{}",
            p.bold,
            family.base,
            p.reset,
            if family.ambiguous {
                format!(" {}(ambiguous){}", p.yellow, p.reset)
            } else {
                String::new()
            }
        );
        println!("    TERM:      {}", family.env_names.join(", "));
        println!("    Processes: {}", processes.join(", "));
        if let Some(needle) = family.process_contains {
            println!("    Matches:   *{}*", needle);
        }
    }
}
