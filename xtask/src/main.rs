use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for rdpglide")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format check, clippy and the full test suite
    Ci {
        /// Skip the test step
        #[arg(long)]
        lint_only: bool,
    },
    /// Run tests
    Test {
        /// Restrict to one component
        #[arg(long, value_enum)]
        module: Option<Module>,
        /// Doc tests only
        #[arg(long, conflicts_with = "module")]
        doc: bool,
        /// Number of proptest cases per property
        #[arg(long)]
        cases: Option<u32>,
    },
    /// Run the texture benchmarks
    Bench {
        /// Only run benchmarks matching this filter
        filter: Option<String>,
    },
    /// Derive and print the combiner state for a G_SETCOMBINE word pair
    Inspect {
        w0: String,
        w1: String,
        /// Cycle type (one, two, copy, fill)
        #[arg(long, default_value = "one")]
        cycle: String,
    },
    /// Install a pre-commit hook running `cargo x ci --lint-only`
    InstallHooks,
}

#[derive(Clone, Copy, ValueEnum)]
enum Module {
    Combiner,
    Texture,
}

impl Module {
    fn filter(self) -> &'static str {
        match self {
            Module::Combiner => "core::combiner",
            Module::Texture => "core::texture",
        }
    }
}

/// One cargo invocation of a pipeline
struct Step {
    name: &'static str,
    args: Vec<String>,
    cases: Option<u32>,
}

impl Step {
    fn new(name: &'static str, args: &[&str]) -> Self {
        Self {
            name,
            args: args.iter().map(|a| a.to_string()).collect(),
            cases: None,
        }
    }

    fn run(&self) -> Result<()> {
        print!("{} {} ... ", "→".blue(), self.name);
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.args(&self.args);
        if let Some(cases) = self.cases {
            cmd.env("PROPTEST_CASES", cases.to_string());
        }
        let status = cmd
            .status()
            .with_context(|| format!("spawning cargo {}", self.args.join(" ")))?;

        if !status.success() {
            println!("{}", "✗".red().bold());
            bail!("{} failed ({})", self.name, status);
        }
        println!("{} ({:.2}s)", "✓".green().bold(), start.elapsed().as_secs_f64());
        Ok(())
    }
}

fn run_pipeline(title: &str, steps: &[Step]) -> Result<()> {
    println!("{}", format!("=== {} ===", title).bold().blue());
    let start = Instant::now();
    for step in steps {
        step.run()?;
    }
    println!(
        "\n{} {}",
        format!("✓ {} passed in", title).green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn test_step(module: Option<Module>, doc: bool, cases: Option<u32>) -> Step {
    let mut step = Step::new("Test", &["test", "--all-features"]);
    if doc {
        step.args.push("--doc".into());
    } else if let Some(module) = module {
        step.args.extend(["--lib".into(), module.filter().into()]);
    }
    step.cases = cases;
    step
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Ci { lint_only } => {
            let mut steps = vec![
                Step::new("Format check", &["fmt", "--all", "--", "--check"]),
                Step::new(
                    "Clippy",
                    &["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"],
                ),
            ];
            if !lint_only {
                steps.push(test_step(None, false, None));
            }
            run_pipeline("CI", &steps)
        }
        Commands::Test { module, doc, cases } => test_step(module, doc, cases).run(),
        Commands::Bench { filter } => {
            let mut step = Step::new("Bench", &["bench", "--bench", "texture_bench"]);
            if let Some(filter) = filter {
                step.args.extend(["--".into(), filter]);
            }
            step.run()
        }
        Commands::Inspect { w0, w1, cycle } => {
            println!("{} Combine {} {} ({} cycle)", "→".blue(), w0.cyan(), w1.cyan(), cycle);
            let mut step = Step::new("Inspect", &["run", "--quiet", "--bin", "rdpglide", "--", "combine"]);
            step.args.extend([w0, w1, "--cycle".into(), cycle]);
            step.run()
        }
        Commands::InstallHooks => install_hooks(),
    }
}

fn install_hooks() -> Result<()> {
    let hook_path = ".git/hooks/pre-commit";
    std::fs::write(hook_path, "#!/bin/sh\nset -e\ncargo x ci --lint-only\n")
        .with_context(|| format!("writing {}", hook_path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(hook_path, std::fs::Permissions::from_mode(0o755))?;
    }

    println!("{} pre-commit hook installed", "✓".green());
    Ok(())
}
