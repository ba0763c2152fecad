use blockplan::prelude::*;
use clap::{Parser, Subcommand};
use std::fs;
use std::time::Instant;

/// Compile block libraries and generate code from block trees
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the block library JSON file
    library_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the toolbox the library's blocks are listed in
    Toolbox {
        /// Optional toolbox JSON to extend instead of an empty one
        #[arg(short, long)]
        base: Option<String>,
    },
    /// Generate code from a block state JSON file (a single block tree or
    /// an array of them)
    Generate {
        state_path: String,

        /// Indent used for nested statements
        #[arg(long, default_value = "  ")]
        indent: String,

        /// Fail instead of commenting out blocks that cannot be generated
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let library_json = fs::read_to_string(&cli.library_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read library file '{}': {}",
            cli.library_path, e
        ))
    });
    let library = BlockLibrary::from_json(&library_json)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    match cli.command {
        Command::Toolbox { base } => print_toolbox(&library, base),
        Command::Generate {
            state_path,
            indent,
            strict,
        } => generate(&library, &state_path, indent, strict),
    }
}

fn print_toolbox(library: &BlockLibrary, base: Option<String>) {
    let mut toolbox = match base {
        Some(path) => {
            let json = fs::read_to_string(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read toolbox file '{}': {}", path, e))
            });
            Toolbox::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse toolbox: {}", e)))
        }
        None => Toolbox::new(),
    };

    let mut host = Host::with_builtins();
    library
        .register(&mut host, &mut toolbox)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to register library: {}", e)));

    let json = serde_json::to_string_pretty(&toolbox)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize toolbox: {}", e)));
    println!("{}", json);
}

fn generate(library: &BlockLibrary, state_path: &str, indent: String, strict: bool) {
    let start = Instant::now();

    let state_json = fs::read_to_string(state_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read block state file '{}': {}",
            state_path, e
        ))
    });
    let value: serde_json::Value = serde_json::from_str(&state_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse block state: {}", e)));
    let states: Vec<BlockState> = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value::<BlockState>(value).map(|state| vec![state])
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Invalid block state: {}", e)));

    let mut host = Host::with_builtins();
    let mut toolbox = Toolbox::new();
    library
        .register(&mut host, &mut toolbox)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to register library: {}", e)));

    let mut workspace = Workspace::new();
    for state in &states {
        workspace
            .append_state(&host, state)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to place blocks: {}", e)));
    }

    let config = GeneratorConfig {
        indent,
        comment_errors: !strict,
    };
    let code = CodeGenerator::with_config(&host, &workspace, config)
        .workspace_to_code()
        .unwrap_or_else(|e| exit_with_error(&format!("Code generation failed: {}", e)));

    print!("{}", code);
    log::info!(
        "Generated code for {} blocks in {:?}",
        workspace.len(),
        start.elapsed()
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
