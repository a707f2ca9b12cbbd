//! Inbreeding CLI: coefficient of inbreeding for a pedigree file
//!
//! Commands:
//!   inbreeding calculate: coefficient of inbreeding with breakdown
//!   inbreeding show: print the recorded data of one individual
//!   inbreeding conflicts: individuals recorded with different parents
//!   inbreeding generations: individuals per generation
//!   inbreeding demo: build a pedigree by hand and calculate it

use inbreeding_core::{Code, InbreedingEngine, Parent, PedigreeError, MAX_GENS};
use std::env;
use std::fs;
use std::process;

fn print_usage() {
    println!(
        r#"
Inbreeding v{} — Wright's coefficient of inbreeding

Usage: inbreeding <command> [options]

Commands:
  calculate   <file> [code]     Coefficient for the subject (or the individual at code)
  show        <file> [code]     Print the recorded pedigree below an individual
  conflicts   <file>            List individuals recorded with different sires or dams
  generations <file>            Count individuals per generation
  demo                          Build a sample pedigree and calculate it
  help                          Show this message

Codes are strings of 's' (sire) and 'd' (dam) steps from the subject,
at most {} long: '' is the subject, 'sd' the sire's dam.

Pedigree files are JSON: {{"name": "...", "sire": {{...}}, "dam": {{...}}}}

Examples:
  inbreeding calculate secretariat.json
  inbreeding calculate secretariat.json sd
  inbreeding show secretariat.json ss
"#,
        env!("CARGO_PKG_VERSION"),
        MAX_GENS
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "calculate" => cmd_calculate(&args[2..]),
        "show" => cmd_show(&args[2..]),
        "conflicts" => cmd_conflicts(&args[2..]),
        "generations" => cmd_generations(&args[2..]),
        "demo" => cmd_demo(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("  Error: {}", e);
        process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load a pedigree file named by the first argument.
fn load_engine(args: &[String], usage: &str) -> Result<InbreedingEngine, Box<dyn std::error::Error>> {
    let Some(path) = args.first() else {
        return Err(format!("Usage: inbreeding {}", usage).into());
    };
    let payload = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    Ok(InbreedingEngine::from_payload(&payload)?)
}

/// Code given as the second argument, the subject when absent.
fn code_arg(args: &[String]) -> Result<Code, PedigreeError> {
    args.get(1).map_or(Ok(Code::subject()), |text| Code::parse(text))
}

fn describe(engine: &InbreedingEngine, code: &Code) -> String {
    let name = engine.pedigree().name_at(code).unwrap_or("(unnamed)");
    if code.is_subject() {
        name.to_string()
    } else {
        format!("{} [{}]", name, code)
    }
}

fn cmd_calculate(args: &[String]) -> CliResult {
    let engine = load_engine(args, "calculate <file> [code]")?;
    let code = code_arg(args)?;
    let breakdown = engine.calculate_at(&code)?;
    let digits = engine.config().display_digits;

    println!("  {}", describe(&engine, &code));
    println!();
    for line in breakdown.report(digits).lines() {
        println!("  {}", line);
    }
    if !breakdown.is_inbred() {
        println!();
        println!("  No common ancestors on independent paths");
    }
    Ok(())
}

fn cmd_show(args: &[String]) -> CliResult {
    let engine = load_engine(args, "show <file> [code]")?;
    let code = code_arg(args)?;
    println!("{}", engine.show(&code)?);
    Ok(())
}

fn cmd_conflicts(args: &[String]) -> CliResult {
    let engine = load_engine(args, "conflicts <file>")?;
    let conflicts = engine.conflicts();
    if conflicts.is_empty() {
        println!("  No conflicting parentage recorded");
        return Ok(());
    }
    for conflict in &conflicts {
        println!(
            "  {} has {} {}s recorded: {}",
            conflict.name,
            conflict.recorded.len(),
            match conflict.parent {
                Parent::Sire => "sire",
                Parent::Dam => "dam",
            },
            conflict.recorded.join(", ")
        );
    }
    Ok(())
}

fn cmd_generations(args: &[String]) -> CliResult {
    let engine = load_engine(args, "generations <file>")?;
    let pedigree = engine.pedigree();
    println!("  {:>3}  {:>6}  {:>6}  {:>6}", "gen", "known", "slots", "more");
    for generation in 0..=pedigree.depth() {
        let known = pedigree
            .generation(generation)
            .filter(|code| pedigree.name_at(code).is_some())
            .count();
        println!(
            "  {:>3}  {:>6}  {:>6}  {:>6}",
            generation,
            known,
            1usize << generation,
            pedigree.with_more_ancestry(generation).len()
        );
    }
    let common: Vec<&str> = pedigree.index().common_ancestors().collect();
    if !common.is_empty() {
        println!();
        println!("  Recurring: {}", common.join(", "));
    }
    Ok(())
}

fn cmd_demo() -> CliResult {
    println!("  Building a pedigree with a double cross to one ancestor");
    let mut engine = InbreedingEngine::new();
    let entries = [
        ("", "Foal"),
        ("s", "Sire"),
        ("d", "Dam"),
        ("ss", "Grandsire"),
        ("sss", "Founder"),
        ("ssd", "Mare A"),
        ("sd", "Mare B"),
        ("ds", "Grandsire"),
        ("dd", "Mare C"),
        ("dds", "Founder"),
    ];
    for (text, name) in entries {
        let code = Code::parse(text)?;
        let report = engine.set_name(&code, name);
        if let Some(source) = &report.populated_from {
            println!("  {:<10} copied ancestry of {} from [{}]", name, name, source);
        }
        if report.replication.changes() > 0 {
            println!("  {:<10} replicated to {} other occurrence(s)", name, report.replication.changes());
        }
    }

    println!();
    println!("{}", engine.show(&Code::subject())?);
    println!();
    for line in engine.report().lines() {
        println!("  {}", line);
    }
    Ok(())
}
