use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Whether a failing step stops the run or is only reported.
#[derive(Clone, Copy, PartialEq, Eq)]
enum OnFailure {
    Fail,
    Report,
}

struct Step {
    label: &'static str,
    args: &'static [&'static str],
    on_failure: OnFailure,
}

const STEPS: &[Step] = &[
    Step {
        label: "driver, embedded target (no_std + defmt)",
        args: &[
            "check",
            "-p",
            "dw-hdmi-qp",
            "--target",
            "thumbv7em-none-eabihf",
            "--features",
            "defmt",
        ],
        on_failure: OnFailure::Fail,
    },
    Step {
        label: "platform crate (no_std)",
        args: &[
            "check",
            "-p",
            "platform",
            "--target",
            "thumbv7em-none-eabihf",
            "--no-default-features",
        ],
        on_failure: OnFailure::Fail,
    },
    Step {
        label: "driver, host (std + tracing)",
        args: &["check", "-p", "dw-hdmi-qp", "--features", "std,tracing"],
        on_failure: OnFailure::Fail,
    },
    Step {
        label: "clippy lints",
        args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        on_failure: OnFailure::Report,
    },
    Step {
        label: "code formatting",
        args: &["fmt", "--all", "--check"],
        on_failure: OnFailure::Report,
    },
];

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking DW HDMI QP workspace...".cyan().bold());
    println!();

    let total_start = Instant::now();

    for step in STEPS {
        run_step(step)?;
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

fn run_step(step: &Step) -> Result<()> {
    println!("{}", format!("  Checking {}...", step.label).cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(step.args)
        .output()
        .with_context(|| format!("Failed to run cargo for {}", step.label))?;

    if output.status.success() {
        println!(
            "{}",
            format!(
                "  ✓ {} passed in {:.2}s",
                step.label,
                start.elapsed().as_secs_f64()
            )
            .green()
        );
        println!();
        return Ok(());
    }

    match step.on_failure {
        OnFailure::Fail => {
            eprintln!("{}", format!("  ✗ {} failed", step.label).red().bold());
            eprintln!();
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            anyhow::bail!("{} failed", step.label);
        }
        OnFailure::Report => {
            eprintln!("{}", format!("  ⚠ {} reported issues", step.label).yellow().bold());
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            println!();
            Ok(())
        }
    }
}
