use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// tplprobe – blind server-side template injection prober
#[derive(Parser, Debug)]
#[command(
    name = "tplprobe",
    version,
    about = "tplprobe – blind server-side template injection prober",
    long_about = r#"
tplprobe confirms server-side template injection through an arithmetic
oracle: randomized products that only a real template engine can compute,
isolated from page noise by randomized numeric markers.

DETECTION:
  • Reflection proof in plain text context
  • Context escape search (string/expression/statement/comment closures)
  • Engine identification (jinja2, twig, mako, freemarker)
  • Capability probes: code evaluation, command execution,
    file read, file write

ACTIONS (after a confirmed engine):
  • --os-cmd     run a shell command through the engine
  • --tpl-code   evaluate an expression in the engine's language
  • --read       fetch a remote file
  • --upload     write a local file to --dest on the target

The escalation --level bounds how disruptive the attempted escape
contexts and closures may be (1 = least aggressive, 5 = everything).
"#
)]
pub struct Cli {
    /// Target URL (e.g. http://host/page?name=test)
    pub url: String,

    /// Parameter to inject into
    #[arg(short = 'p', long)]
    pub param: String,

    /// POST body (switches injection to an urlencoded form field)
    #[arg(long)]
    pub data: Option<String>,

    /// HTTP method (defaults to GET, or POST when --data is given)
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Cookie header value
    #[arg(long)]
    pub cookie: Option<String>,

    /// Extra header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Escalation ceiling for contexts and closures (1-5)
    #[arg(long, default_value_t = 1)]
    pub level: u8,

    /// Restrict probing to a single engine
    #[arg(short = 'e', long)]
    pub engine: Option<String>,

    /// Run a shell command through the confirmed engine
    #[arg(long)]
    pub os_cmd: Option<String>,

    /// Evaluate template-language code through the confirmed engine
    #[arg(long)]
    pub tpl_code: Option<String>,

    /// Read a remote file through the confirmed engine
    #[arg(long)]
    pub read: Option<String>,

    /// Upload a local file through the confirmed engine (needs --dest)
    #[arg(long, requires = "dest")]
    pub upload: Option<String>,

    /// Remote destination path for --upload
    #[arg(long)]
    pub dest: Option<String>,

    /// Requests per second (0 = unlimited)
    #[arg(long, default_value_t = 10)]
    pub rate: u32,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the report to a file
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Suppress the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug-level probe logging
    #[arg(short, long)]
    pub verbose: bool,
}
