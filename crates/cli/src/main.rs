use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ssmconfig::{
    MemoryParameterStore, Parameter, ParameterRequest, Paginator, PathPaginator, Request, RequestOptions, Schema,
    normalize_path,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Resolve configuration parameters from a local parameter file.
#[derive(Parser, Debug)]
#[command(name = "ssmconfig", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve named parameters under a path and fail on missing ones
    Resolve(ResolveArgs),
    /// List every parameter under a path
    List(ListArgs),
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// YAML file holding the parameters
    #[arg(long)]
    store: PathBuf,

    /// Base path parameter names are relative to
    #[arg(long, default_value = "/")]
    path: String,

    /// Include parameters below nested paths
    #[arg(long)]
    recursive: bool,

    /// Parameters per page (1-10)
    #[arg(long)]
    page_size: Option<i32>,

    /// Leave SecureString values encrypted
    #[arg(long)]
    no_decryption: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Parameter name that must be present (repeatable)
    #[arg(long = "require", value_name = "NAME")]
    required: Vec<String>,

    /// Parameter name that may be absent (repeatable)
    #[arg(long = "optional", value_name = "NAME")]
    optional: Vec<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl StoreArgs {
    /// Environment options with command line flags applied on top.
    fn request_options(&self) -> Result<RequestOptions> {
        let mut options = RequestOptions::from_env().context("read SSMCONFIG_* environment")?;
        if self.recursive {
            options.recursive = true;
        }
        if self.no_decryption {
            options.with_decryption = false;
        }
        if let Some(page_size) = self.page_size {
            options.page_size = Some(page_size);
        }
        options.validate()?;
        Ok(options)
    }

    fn load_store(&self) -> Result<MemoryParameterStore> {
        MemoryParameterStore::from_yaml_file(&self.store)
            .with_context(|| format!("load parameter store from {}", self.store.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Resolve(args) => {
            let values = resolve(&args, &cancel).await?;
            print_values(&values, args.store.format)
        }
        Command::List(args) => {
            let parameters = list(&args.store, &cancel).await?;
            print_parameters(&parameters, args.store.format)
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Schema over a map keyed by the names given on the command line.
fn resolve_schema(required: &[String], optional: &[String]) -> Schema<BTreeMap<String, String>> {
    let tagged = required
        .iter()
        .map(|name| (name.clone(), name.clone()))
        .chain(optional.iter().map(|name| (name.clone(), format!("{},optional", name))));

    tagged.fold(Schema::new(), |schema, (key, tag)| {
        schema.field(key.clone(), tag, move |values: &mut BTreeMap<String, String>, value: &str| {
            values.insert(key.clone(), value.to_string());
        })
    })
}

async fn resolve(args: &ResolveArgs, cancel: &CancellationToken) -> Result<BTreeMap<String, String>> {
    let store = args.store.load_store()?;
    let options = args.store.request_options()?;
    let schema = resolve_schema(&args.required, &args.optional);
    debug!(path = %args.store.path, fields = schema.len(), "resolving parameters");

    let mut values = BTreeMap::new();
    ParameterRequest::with_schema(&mut values, schema, &args.store.path, store, options)?
        .send(cancel)
        .await?;
    Ok(values)
}

async fn list(args: &StoreArgs, cancel: &CancellationToken) -> Result<Vec<Parameter>> {
    let store = args.load_store()?;
    let options = args.request_options()?;
    let input = options.input_for(&normalize_path(&args.path));
    let mut paginator = PathPaginator::new(store, input, options.paginator_options());

    let mut parameters = Vec::new();
    while paginator.has_more_pages() {
        let page = paginator.next_page(cancel).await?;
        parameters.extend(page.parameters);
    }
    debug!(path = %args.path, count = parameters.len(), "listed parameters");
    Ok(parameters)
}

fn print_values(values: &BTreeMap<String, String>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(values)?),
        OutputFormat::Text => {
            for (name, value) in values {
                println!("{}={}", name, value);
            }
        }
    }
    Ok(())
}

fn print_parameters(parameters: &[Parameter], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(parameters)?),
        OutputFormat::Text => {
            for parameter in parameters {
                println!("{}\t{:?}\t{}", parameter.name, parameter.kind, parameter.value);
            }
        }
    }
    Ok(())
}
